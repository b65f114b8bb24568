use std::path::Path;

use super::food_lookup::FoodLookup;
use crate::error::{NutriError, NutriResult};
use crate::food_record::FoodRecord;
use crate::index_builder::builder::KnowledgeBaseDocument;

fn unavailable(path: &Path, reason: impl ToString) -> NutriError {
    NutriError::DatabaseUnavailable { path: path.to_path_buf(), reason: reason.to_string() }
}

/// Reads the `{ "foods": [...] }` document in one open-parse-close step.
/// Records with an empty name are dropped.
pub fn load_knowledge_base(path: &Path) -> NutriResult<Vec<FoodRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| unavailable(path, e))?;
    let document: KnowledgeBaseDocument = serde_json::from_str(&content).map_err(|e| unavailable(path, e))?;

    let total = document.foods.len();
    let foods: Vec<FoodRecord> = document
        .foods
        .into_iter()
        .filter(|food| !food.name.trim().is_empty())
        .collect();
    if foods.len() != total {
        tracing::warn!(dropped = total - foods.len(), "ignoring knowledge base entries without a name");
    }
    Ok(foods)
}

impl FoodLookup {
    pub fn try_from_path(path: &Path) -> NutriResult<Self> {
        let foods = load_knowledge_base(path)?;
        tracing::info!(foods = foods.len(), path = ?path, "loaded nutrition database");
        Ok(Self::new(foods))
    }

    /// Like [`FoodLookup::try_from_path`] but never fails: an unreadable or
    /// malformed database yields an empty table, so every `find` returns `None`.
    pub fn from_path(path: &Path) -> Self {
        match Self::try_from_path(path) {
            Ok(lookup) => lookup,
            Err(err) => {
                tracing::warn!(error = %err, "continuing with an empty food table");
                Self::empty()
            }
        }
    }
}
