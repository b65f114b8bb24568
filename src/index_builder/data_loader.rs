use anyhow::{Result, Context};
use csv::ReaderBuilder;
use std::path::Path;

use super::builder::RawFoodRow;

// Expected column headers of the dish nutrition table
const NAME_COL: &str = "Dish Name";
const KCAL_COL: &str = "Calories (kcal)";
const PROTEIN_COL: &str = "Protein (g)";
const CARB_COL: &str = "Carbohydrates (g)";
const FAT_COL: &str = "Fats (g)";
const FIBRE_COL: &str = "Fibre (g)";

fn parse_optional_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads the raw dish table. Blank or unparseable cells are kept as `None` so the
/// builder can reject the row with its index; nothing is defaulted here except a
/// wholly absent fibre column.
pub fn load_raw_food_rows(csv_path: &Path) -> Result<Vec<RawFoodRow>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Dish CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open dish CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let required = |name: &str| column(name).ok_or_else(|| anyhow::anyhow!("Column '{}' not found", name));

    let name_idx = required(NAME_COL)?;
    let kcal_idx = required(KCAL_COL)?;
    let protein_idx = required(PROTEIN_COL)?;
    let carb_idx = required(CARB_COL)?;
    let fat_idx = required(FAT_COL)?;
    let fibre_idx = column(FIBRE_COL);
    if fibre_idx.is_none() {
        tracing::warn!(column = FIBRE_COL, "column absent, fiber defaults to 0 for every row");
    }

    let mut rows = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record at row index {}", row_index))?;

        let cell = |idx: usize| record.get(idx).and_then(parse_optional_f64);
        rows.push(RawFoodRow {
            display_name: record.get(name_idx).unwrap_or_default().trim().to_string(),
            calories: cell(kcal_idx),
            protein: cell(protein_idx),
            carbs: cell(carb_idx),
            fats: cell(fat_idx),
            fiber: match fibre_idx {
                Some(idx) => cell(idx),
                None => Some(0.0),
            },
        });
    }

    tracing::info!(rows = rows.len(), path = ?csv_path, "loaded raw dish rows");
    Ok(rows)
}
