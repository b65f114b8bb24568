use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_SERVING_DESCRIPTION: &str = "1 serving (100g)";
pub const DEFAULT_SERVING_GRAMS: f64 = 100.0;

/// One entry of the food knowledge base. Macro values are per reference serving.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FoodRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,
    pub name: String,
    #[serde(default)]
    pub aliases: BTreeSet<String>,
    #[serde(alias = "serving_size", default = "default_serving_description")]
    pub serving_description: String,
    #[serde(alias = "serving_size_grams", default = "default_serving_grams")]
    pub serving_grams: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
}

fn default_serving_description() -> String {
    DEFAULT_SERVING_DESCRIPTION.to_string()
}

fn default_serving_grams() -> f64 {
    DEFAULT_SERVING_GRAMS
}

/// The five tracked macros, either per serving or scaled for a quantity.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
}

impl Macros {
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            carbs: self.carbs * multiplier,
            fats: self.fats * multiplier,
            fiber: self.fiber * multiplier,
        }
    }

    pub fn rounded(&self) -> Self {
        Self {
            calories: round1(self.calories),
            protein: round1(self.protein),
            carbs: round1(self.carbs),
            fats: round1(self.fats),
            fiber: round1(self.fiber),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.calories == 0.0
            && self.protein == 0.0
            && self.carbs == 0.0
            && self.fats == 0.0
            && self.fiber == 0.0
    }
}

impl FoodRecord {
    pub fn macros(&self) -> Macros {
        Macros {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
            fiber: self.fiber,
        }
    }
}

/// Rounds to one decimal place, correctly rounded on the exact binary value
/// with ties to even (matches `{:.1}` rendering).
pub fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Lookup key form of a food name: trimmed and lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
