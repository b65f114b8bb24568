use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::food_record::Macros;
use crate::lookup::FoodLookup;

pub const EMPTY_MEAL_MESSAGE: &str = "no food items found";

/// Element-wise sum of all resolved items, rounded once after summation.
pub type NutritionTotals = Macros;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[default]
    Unknown,
}

impl MealType {
    /// Absent or unrecognized meal types map to `Unknown`.
    pub fn parse_or_unknown(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
    }
}

fn default_quantity() -> f64 {
    1.0
}

fn default_unit() -> String {
    "serving".to_string()
}

fn positive_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let quantity = f64::deserialize(deserializer)?;
    if quantity.is_finite() && quantity > 0.0 {
        Ok(quantity)
    } else {
        Err(serde::de::Error::custom(format!("quantity must be a positive number, got {}", quantity)))
    }
}

/// An unresolved food request as produced by the meal-description parser.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MealItemRequest {
    pub food: String,
    #[serde(default = "default_quantity", deserialize_with = "positive_quantity")]
    pub quantity: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl MealItemRequest {
    pub fn new(food: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self { food: food.into(), quantity, unit: unit.into() }
    }

    pub fn has_valid_quantity(&self) -> bool {
        self.quantity.is_finite() && self.quantity > 0.0
    }
}

/// Upstream parser output: a meal type plus items, or an error signal.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ParsedMeal {
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub items: Vec<MealItemRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ParsedMeal {
    pub fn new(meal_type: &str, items: Vec<MealItemRequest>) -> Self {
        Self { meal_type: Some(meal_type.to_string()), items, error: None }
    }
}

/// A meal file holds either one meal object or an array of them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum MealInput {
    One(ParsedMeal),
    Many(Vec<ParsedMeal>),
}

impl MealInput {
    pub fn into_meals(self) -> Vec<ParsedMeal> {
        match self {
            MealInput::One(meal) => vec![meal],
            MealInput::Many(meals) => meals,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResolvedFood {
    /// Canonical name of the matched record.
    pub food: String,
    pub quantity: f64,
    pub unit: String,
    pub serving_description: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
}

impl ResolvedFood {
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

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolvedMealItem {
    Success(ResolvedFood),
    /// Carries the request exactly as received.
    NotFound(MealItemRequest),
}

impl ResolvedMealItem {
    pub fn food(&self) -> &str {
        match self {
            ResolvedMealItem::Success(found) => &found.food,
            ResolvedMealItem::NotFound(request) => &request.food,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ResolvedMealItem::Success(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealStatus {
    Success,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MealResult {
    pub meal_type: MealType,
    pub items: Vec<ResolvedMealItem>,
    pub totals: NutritionTotals,
    pub status: MealStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What the meal history store receives; per-item detail is left out.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MealLogEntry {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub description: String,
    pub totals: NutritionTotals,
}

impl MealResult {
    fn empty(meal_type: MealType, message: String) -> Self {
        Self {
            meal_type,
            items: Vec::new(),
            totals: NutritionTotals::default(),
            status: MealStatus::Error,
            message: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == MealStatus::Success
    }

    pub fn not_found_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_found()).count()
    }

    /// Only successful meals with some non-zero total are worth logging.
    pub fn log_entry(&self, date: NaiveDate, description: &str) -> Option<MealLogEntry> {
        if !self.is_success() || self.totals.is_zero() {
            return None;
        }
        Some(MealLogEntry {
            date,
            meal_type: self.meal_type,
            description: description.to_string(),
            totals: self.totals,
        })
    }
}

/// Resolves each request against the lookup table and totals the matches.
///
/// Unknown foods become `NotFound` entries and never abort the meal. The unit
/// is informational: `quantity` is taken as a number of reference servings.
/// A request with a non-positive or non-finite quantity is reported as
/// `NotFound` and contributes nothing to the totals.
pub fn resolve_items(lookup: &FoodLookup, meal_type: MealType, items: &[MealItemRequest]) -> MealResult {
    if items.is_empty() {
        return MealResult::empty(meal_type, EMPTY_MEAL_MESSAGE.to_string());
    }

    let mut resolved = Vec::with_capacity(items.len());
    let mut totals = NutritionTotals::default();

    for request in items {
        if !request.has_valid_quantity() {
            tracing::warn!(food = %request.food, quantity = request.quantity, "ignoring item with invalid quantity");
            resolved.push(ResolvedMealItem::NotFound(request.clone()));
            continue;
        }
        let Some(record) = lookup.find(&request.food) else {
            tracing::debug!(food = %request.food, "food not found in database");
            resolved.push(ResolvedMealItem::NotFound(request.clone()));
            continue;
        };

        let multiplier = request.quantity;
        let scaled = record.macros().scaled(multiplier);

        macro_rules! accumulate {
            ($($field:ident),*) => {
                $( totals.$field += scaled.$field; )*
            };
        }
        accumulate!(calories, protein, carbs, fats, fiber);

        let rounded = scaled.rounded();
        resolved.push(ResolvedMealItem::Success(ResolvedFood {
            food: record.name.clone(),
            quantity: request.quantity,
            unit: request.unit.clone(),
            serving_description: record.serving_description.clone(),
            calories: rounded.calories,
            protein: rounded.protein,
            carbs: rounded.carbs,
            fats: rounded.fats,
            fiber: rounded.fiber,
        }));
    }

    MealResult {
        meal_type,
        items: resolved,
        totals: totals.rounded(),
        status: MealStatus::Success,
        message: None,
    }
}

/// Resolves a parsed meal. An upstream error is treated as an empty meal.
pub fn resolve_meal(lookup: &FoodLookup, meal: &ParsedMeal) -> MealResult {
    let meal_type = MealType::parse_or_unknown(meal.meal_type.as_deref());
    if let Some(error) = &meal.error {
        tracing::warn!(%error, "meal description could not be parsed upstream");
        return MealResult::empty(meal_type, format!("{} (upstream parse failed: {})", EMPTY_MEAL_MESSAGE, error));
    }
    resolve_items(lookup, meal_type, &meal.items)
}

/// Resolves independent meals in parallel against one shared table.
pub fn resolve_many(lookup: &FoodLookup, meals: &[ParsedMeal]) -> Vec<MealResult> {
    meals.par_iter().map(|meal| resolve_meal(lookup, meal)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food_record::FoodRecord;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn record(name: &str, aliases: &[&str], macros: [f64; 5]) -> FoodRecord {
        FoodRecord {
            id: None,
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            serving_description: "1 serving (100g)".to_string(),
            serving_grams: 100.0,
            calories: macros[0],
            protein: macros[1],
            carbs: macros[2],
            fats: macros[3],
            fiber: macros[4],
        }
    }

    #[test]
    fn test_meal_type_parsing() {
        assert_eq!(MealType::parse_or_unknown(Some("Lunch")), MealType::Lunch);
        assert_eq!(MealType::parse_or_unknown(Some(" DINNER ")), MealType::Dinner);
        assert_eq!(MealType::parse_or_unknown(Some("brunch")), MealType::Unknown);
        assert_eq!(MealType::parse_or_unknown(None), MealType::Unknown);
        assert_eq!(MealType::Snack.to_string(), "snack");
    }

    #[test]
    fn test_empty_meal_is_error_with_zero_totals() {
        let lookup = FoodLookup::new(vec![record("chapati", &["roti"], [80.0, 3.0, 15.0, 1.0, 1.0])]);
        let result = resolve_items(&lookup, MealType::Lunch, &[]);
        assert_eq!(result.status, MealStatus::Error);
        assert!(result.items.is_empty());
        assert!(result.totals.is_zero());
        assert_eq!(result.message.as_deref(), Some(EMPTY_MEAL_MESSAGE));
    }

    #[test]
    fn test_upstream_error_is_not_partially_resolved() {
        let lookup = FoodLookup::new(vec![record("chapati", &["roti"], [80.0, 3.0, 15.0, 1.0, 1.0])]);
        let meal = ParsedMeal {
            meal_type: Some("unknown".to_string()),
            items: vec![MealItemRequest::new("roti", 1.0, "pieces")],
            error: Some("Failed to parse meal description".to_string()),
        };
        let result = resolve_meal(&lookup, &meal);
        assert_eq!(result.status, MealStatus::Error);
        assert!(result.items.is_empty());
        assert!(result.message.unwrap().starts_with(EMPTY_MEAL_MESSAGE));
    }

    #[test]
    fn test_totals_sum_unrounded_values() {
        // Each item rounds to 0.0 on its own; the total must still be 0.2.
        let lookup = FoodLookup::new(vec![record("elaichi", &[], [0.04, 0.04, 0.04, 0.04, 0.04])]);
        let items: Vec<MealItemRequest> = (0..6).map(|_| MealItemRequest::new("elaichi", 1.0, "pinch")).collect();
        let result = resolve_items(&lookup, MealType::Snack, &items);

        for item in &result.items {
            match item {
                ResolvedMealItem::Success(found) => assert_eq!(found.calories, 0.0),
                ResolvedMealItem::NotFound(_) => panic!("expected every item to resolve"),
            }
        }
        // 6 x 4 hundredths = 24 hundredths, rounded once
        assert_eq!(result.totals.calories, 0.2);
        assert_eq!(result.totals.fiber, 0.2);
    }

    #[test]
    fn test_randomized_totals_match_reference() {
        // Values are whole tenths and quantities whole servings, so the
        // reference total is exact in integer tenths.
        let mut rng = StdRng::seed_from_u64(42);
        let tenths: Vec<[i64; 5]> = (0..20)
            .map(|_| {
                let mut macros = [0_i64; 5];
                for value in macros.iter_mut() {
                    *value = rng.gen_range(0..4000);
                }
                macros
            })
            .collect();
        let records: Vec<FoodRecord> = tenths
            .iter()
            .enumerate()
            .map(|(i, t)| record(&format!("dish {}", i), &[], t.map(|v| v as f64 / 10.0)))
            .collect();
        let lookup = FoodLookup::new(records);

        for _ in 0..50 {
            let count = rng.gen_range(1..8);
            let mut items = Vec::new();
            let mut reference = [0_i64; 5];
            for _ in 0..count {
                let idx = rng.gen_range(0..25);
                let quantity = rng.gen_range(1..5_i64);
                if let Some(found) = tenths.get(idx) {
                    for (sum, value) in reference.iter_mut().zip(found) {
                        *sum += value * quantity;
                    }
                }
                items.push(MealItemRequest::new(format!("dish {}", idx), quantity as f64, "serving"));
            }
            let result = resolve_items(&lookup, MealType::Dinner, &items);
            assert_eq!(result.status, MealStatus::Success);
            assert_eq!(result.items.len(), count);
            let totals = result.totals;
            let actual = [totals.calories, totals.protein, totals.carbs, totals.fats, totals.fiber];
            for (got, want) in actual.iter().zip(reference) {
                assert_eq!(*got, want as f64 / 10.0);
            }
        }
    }

    #[test]
    fn test_item_values_round_ties_to_even() {
        let lookup = FoodLookup::new(vec![record("lassi", &[], [80.5, 3.0, 12.0, 0.15, 0.25])]);

        let result = resolve_items(&lookup, MealType::Snack, &[MealItemRequest::new("lassi", 0.5, "glass")]);
        let ResolvedMealItem::Success(found) = &result.items[0] else { panic!("lassi should resolve") };
        assert_eq!(found.calories, 40.2);
        assert_eq!(result.totals.calories, 40.2);

        let result = resolve_items(&lookup, MealType::Snack, &[MealItemRequest::new("lassi", 1.0, "glass")]);
        let ResolvedMealItem::Success(found) = &result.items[0] else { panic!("lassi should resolve") };
        assert_eq!(found.fats, 0.1);
        assert_eq!(found.fiber, 0.2);
    }

    #[test]
    fn test_invalid_quantity_is_not_counted() {
        let lookup = FoodLookup::new(vec![record("chapati", &["roti"], [80.0, 3.0, 15.0, 1.0, 1.0])]);
        let items = vec![
            MealItemRequest::new("roti", 1.0, "pieces"),
            MealItemRequest::new("roti", -2.0, "pieces"),
            MealItemRequest::new("chapati", f64::NAN, "pieces"),
            MealItemRequest::new("chapati", f64::INFINITY, "pieces"),
        ];
        let result = resolve_items(&lookup, MealType::Lunch, &items);

        assert_eq!(result.status, MealStatus::Success);
        assert_eq!(result.not_found_count(), 3);
        assert!(result.items[0].is_found());
        assert_eq!(result.totals.calories, 80.0);
        assert_eq!(result.totals.fiber, 1.0);
        assert!(result.totals.calories.is_finite() && result.totals.fats >= 0.0);
    }

    #[test]
    fn test_log_entry_only_for_meaningful_success() {
        let lookup = FoodLookup::new(vec![record("chapati", &["roti"], [80.0, 3.0, 15.0, 1.0, 1.0])]);
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        let meal = ParsedMeal::new("lunch", vec![MealItemRequest::new("roti", 2.0, "pieces")]);
        let entry = resolve_meal(&lookup, &meal).log_entry(date, "2 rotis for lunch").unwrap();
        assert_eq!(entry.meal_type, MealType::Lunch);
        assert_eq!(entry.totals.calories, 160.0);

        let meal = ParsedMeal::new("lunch", vec![MealItemRequest::new("unicorn meat", 1.0, "serving")]);
        assert!(resolve_meal(&lookup, &meal).log_entry(date, "unicorn").is_none());

        let meal = ParsedMeal::new("lunch", vec![]);
        assert!(resolve_meal(&lookup, &meal).log_entry(date, "nothing").is_none());
    }

    #[test]
    fn test_request_deserialization_defaults_and_validation() {
        let request: MealItemRequest = serde_json::from_str(r#"{"food": "daal"}"#).unwrap();
        assert_eq!(request.quantity, 1.0);
        assert_eq!(request.unit, "serving");

        assert!(serde_json::from_str::<MealItemRequest>(r#"{"food": "daal", "quantity": 0}"#).is_err());
        assert!(serde_json::from_str::<MealItemRequest>(r#"{"food": "daal", "quantity": -2}"#).is_err());
    }

    #[test]
    fn test_meal_input_accepts_object_or_array() {
        let one: MealInput = serde_json::from_str(
            r#"{"meal_type": "dinner", "items": [{"food": "chapati", "quantity": 2, "unit": "pieces"}]}"#,
        )
        .unwrap();
        let meals = one.into_meals();
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].items[0].quantity, 2.0);

        let many: MealInput = serde_json::from_str(
            r#"[{"meal_type": "lunch", "items": []}, {"meal_type": "unknown", "items": [], "error": "Failed to parse meal description"}]"#,
        )
        .unwrap();
        let meals = many.into_meals();
        assert_eq!(meals.len(), 2);
        assert!(meals[1].error.is_some());
    }

    #[test]
    fn test_item_variants_serialize_with_explicit_tag() {
        let item = ResolvedMealItem::NotFound(MealItemRequest::new("unicorn meat", 1.0, "serving"));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["status"], "not_found");
        assert_eq!(json["food"], "unicorn meat");
        assert!(json.get("calories").is_none());
    }

    #[test]
    fn test_resolve_many_keeps_meals_independent() {
        let lookup = FoodLookup::new(vec![
            record("chapati", &["roti"], [80.0, 3.0, 15.0, 1.0, 1.0]),
            record("steamed rice", &["rice"], [130.0, 2.7, 28.0, 0.3, 0.4]),
        ]);
        let meals = vec![
            ParsedMeal::new("breakfast", vec![MealItemRequest::new("roti", 1.0, "pieces")]),
            ParsedMeal::new("lunch", vec![MealItemRequest::new("rice", 2.0, "bowl")]),
            ParsedMeal::new("dinner", vec![]),
        ];
        let results = resolve_many(&lookup, &meals);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].totals.calories, 80.0);
        assert_eq!(results[1].totals.calories, 260.0);
        assert_eq!(results[1].meal_type, MealType::Lunch);
        assert_eq!(results[2].status, MealStatus::Error);
    }
}
