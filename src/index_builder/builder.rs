use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use anyhow::{Context, Result};

use super::aliases::generate_aliases;
use crate::error::{NutriError, NutriResult};
use crate::food_record::{
    normalize_name, round1, FoodRecord, DEFAULT_SERVING_DESCRIPTION, DEFAULT_SERVING_GRAMS,
};

/// One unprocessed row of the dish table. Macro values are per reference serving;
/// `None` marks a blank or unparseable cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFoodRow {
    pub display_name: String,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// The first malformed row aborts the whole batch.
    #[default]
    FailBatch,
    /// Malformed rows are left out and listed in the report.
    SkipAndReport,
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub on_malformed: MalformedPolicy,
    pub serving_description: String,
    pub serving_grams: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            on_malformed: MalformedPolicy::default(),
            serving_description: DEFAULT_SERVING_DESCRIPTION.to_string(),
            serving_grams: DEFAULT_SERVING_GRAMS,
        }
    }
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub records: Vec<FoodRecord>,
    pub rejected: Vec<NutriError>,
    /// Canonical names produced by more than one row, in first-seen order.
    pub duplicate_names: Vec<String>,
}

fn required(value: Option<f64>, row: usize, field: &'static str) -> NutriResult<f64> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(round1(v)),
        _ => Err(NutriError::MalformedRecord { row, field }),
    }
}

/// Turns one raw row into a record. `row` is the 0-based index used in errors.
pub fn build_record(raw: &RawFoodRow, row: usize, options: &BuildOptions) -> NutriResult<FoodRecord> {
    let name = normalize_name(&raw.display_name);
    if name.is_empty() {
        return Err(NutriError::MalformedRecord { row, field: "name" });
    }

    Ok(FoodRecord {
        id: Some(row + 1),
        aliases: generate_aliases(&raw.display_name),
        serving_description: options.serving_description.clone(),
        serving_grams: options.serving_grams,
        calories: required(raw.calories, row, "calories")?,
        protein: required(raw.protein, row, "protein")?,
        carbs: required(raw.carbs, row, "carbs")?,
        fats: required(raw.fats, row, "fats")?,
        fiber: required(raw.fiber, row, "fiber")?,
        name,
    })
}

/// Builds the lookup table from raw rows, in input order.
pub fn build_records(rows: &[RawFoodRow], options: &BuildOptions) -> NutriResult<BuildReport> {
    let mut report = BuildReport::default();
    let mut seen_names = HashSet::new();

    for (row, raw) in rows.iter().enumerate() {
        let record = match build_record(raw, row, options) {
            Ok(record) => record,
            Err(err) => match options.on_malformed {
                MalformedPolicy::FailBatch => return Err(err),
                MalformedPolicy::SkipAndReport => {
                    tracing::warn!(row, error = %err, "skipping malformed dish row");
                    report.rejected.push(err);
                    continue;
                }
            },
        };

        if !seen_names.insert(record.name.clone()) && !report.duplicate_names.contains(&record.name) {
            tracing::warn!(name = %record.name, row, "duplicate canonical name, first row wins on lookup");
            report.duplicate_names.push(record.name.clone());
        }
        report.records.push(record);
    }

    tracing::info!(
        built = report.records.len(),
        rejected = report.rejected.len(),
        duplicates = report.duplicate_names.len(),
        "alias index built"
    );
    Ok(report)
}

#[derive(Serialize, Deserialize)]
pub(crate) struct KnowledgeBaseDocument {
    #[serde(default)]
    pub foods: Vec<FoodRecord>,
}

/// Writes `{ "foods": [...] }` as pretty JSON.
pub fn save_knowledge_base(records: &[FoodRecord], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    let document = KnowledgeBaseDocument { foods: records.to_vec() };
    let json = serde_json::to_string_pretty(&document)
        .context("Failed to serialize knowledge base")?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write knowledge base to {:?}", output_path))?;
    tracing::info!(foods = records.len(), path = ?output_path, "knowledge base saved");
    Ok(())
}
