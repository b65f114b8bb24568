use std::fmt;

use crate::food_record::Macros;
use crate::meal_resolver::{MealResult, MealStatus, NutritionTotals, ResolvedMealItem};

const RULE_WIDTH: usize = 70;
const FOOD_WIDTH: usize = 20;
const QTY_WIDTH: usize = 12;
const NUM_WIDTH: usize = 10;
const FATS_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatMode {
    /// Fixed-width columns: food, quantity+unit, calories, protein, carbs, fats.
    #[default]
    Table,
    /// One line per item, no macro detail.
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Found,
    NotFound,
    Total,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormattedRow {
    pub kind: RowKind,
    pub food: String,
    pub quantity: String,
    pub macros: Option<Macros>,
}

/// Presentation-ready view of a [`MealResult`]. Rows keep item order and end
/// with a synthesized `TOTAL` row.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedMeal {
    pub mode: FormatMode,
    pub title: String,
    pub rows: Vec<FormattedRow>,
    pub totals: NutritionTotals,
    pub error: Option<String>,
}

fn quantity_label(quantity: f64, unit: &str) -> String {
    format!("{} {}", quantity, unit)
}

fn fit(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{:<width$}", truncated, width = width)
}

fn grams(value: f64) -> String {
    format!("{:.1}g", value)
}

pub fn format_result(result: &MealResult, mode: FormatMode) -> FormattedMeal {
    let title = format!("Meal: {}", result.meal_type.as_ref().to_uppercase());

    if result.status == MealStatus::Error {
        return FormattedMeal {
            mode,
            title,
            rows: Vec::new(),
            totals: result.totals,
            error: Some(result.message.clone().unwrap_or_else(|| "unknown error".to_string())),
        };
    }

    let mut rows: Vec<FormattedRow> = result
        .items
        .iter()
        .map(|item| match item {
            ResolvedMealItem::Success(found) => FormattedRow {
                kind: RowKind::Found,
                food: found.food.clone(),
                quantity: quantity_label(found.quantity, &found.unit),
                macros: Some(found.macros()),
            },
            ResolvedMealItem::NotFound(request) => FormattedRow {
                kind: RowKind::NotFound,
                food: request.food.clone(),
                quantity: quantity_label(request.quantity, &request.unit),
                macros: None,
            },
        })
        .collect();

    rows.push(FormattedRow {
        kind: RowKind::Total,
        food: "TOTAL".to_string(),
        quantity: String::new(),
        macros: Some(result.totals),
    });

    FormattedMeal { mode, title, rows, totals: result.totals, error: None }
}

impl FormattedRow {
    fn table_line(&self) -> String {
        let lead = format!("{} {}", fit(&self.food, FOOD_WIDTH), fit(&self.quantity, QTY_WIDTH));
        match (self.kind, &self.macros) {
            (RowKind::NotFound, _) | (_, None) => format!("{} NOT FOUND in database", lead),
            (_, Some(m)) => format!(
                "{} {} {} {} {}",
                lead,
                fit(&format!("{:.1}", m.calories), NUM_WIDTH),
                fit(&grams(m.protein), NUM_WIDTH),
                fit(&grams(m.carbs), NUM_WIDTH),
                fit(&grams(m.fats), FATS_WIDTH),
            )
            .trim_end()
            .to_string(),
        }
    }

    fn list_line(&self) -> String {
        match self.kind {
            RowKind::Found => format!("  + {} ({})", self.food, self.quantity),
            RowKind::NotFound => format!("  x {} ({}): not found", self.food, self.quantity),
            RowKind::Total => match &self.macros {
                Some(m) => format!("  TOTAL: {:.1} kcal", m.calories),
                None => "  TOTAL".to_string(),
            },
        }
    }
}

impl FormattedMeal {
    pub fn lines(&self) -> Vec<String> {
        if let Some(error) = &self.error {
            return vec![format!("error: {}", error)];
        }

        let mut out = vec![self.title.clone(), "=".repeat(RULE_WIDTH)];
        let (items, total) = self.rows.split_at(self.rows.len().saturating_sub(1));

        match self.mode {
            FormatMode::Table => {
                out.push(format!(
                    "{} {} {} {} {} {}",
                    fit("Food Item", FOOD_WIDTH),
                    fit("Qty", QTY_WIDTH),
                    fit("Calories", NUM_WIDTH),
                    fit("Protein", NUM_WIDTH),
                    fit("Carbs", NUM_WIDTH),
                    fit("Fats", FATS_WIDTH),
                ).trim_end().to_string());
                out.push("-".repeat(RULE_WIDTH));
                out.extend(items.iter().map(FormattedRow::table_line));
                out.push("-".repeat(RULE_WIDTH));
                out.extend(total.iter().map(FormattedRow::table_line));
            }
            FormatMode::List => {
                out.extend(items.iter().map(FormattedRow::list_line));
                out.push("-".repeat(RULE_WIDTH));
                out.extend(total.iter().map(FormattedRow::list_line));
            }
        }

        out.push("=".repeat(RULE_WIDTH));
        out.push("Nutrition Summary:".to_string());
        out.push(format!("   Calories: {:.1} kcal", self.totals.calories));
        out.push(format!("   Protein:  {:.1}g", self.totals.protein));
        out.push(format!("   Carbs:    {:.1}g", self.totals.carbs));
        out.push(format!("   Fats:     {:.1}g", self.totals.fats));
        out.push(format!("   Fiber:    {:.1}g", self.totals.fiber));
        out
    }
}

impl fmt::Display for FormattedMeal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}
