use anyhow::{Result, Context};
use meal_nutri::cli::{parse_args, Command, OutputFormat};
use meal_nutri::config::Settings;
use meal_nutri::index_builder::{build_records, load_raw_food_rows, save_knowledge_base, BuildOptions, MalformedPolicy};
use meal_nutri::logging::init_logging;
use meal_nutri::lookup::FoodLookup;
use meal_nutri::meal_resolver::{resolve_many, resolve_meal, MealInput};
use meal_nutri::result_formatter::format_result;
use std::path::Path;
use tokio::fs;

const FOODS_ALIAS_PREVIEW: usize = 3;

fn build_index(csv: &Path, output: &Path, skip_malformed: bool) -> Result<()> {
    let rows = load_raw_food_rows(csv)
        .with_context(|| format!("Failed to read dish table from '{}'", csv.display()))?;

    let options = BuildOptions {
        on_malformed: if skip_malformed { MalformedPolicy::SkipAndReport } else { MalformedPolicy::FailBatch },
        ..Default::default()
    };
    let report = build_records(&rows, &options)
        .context("Knowledge base build aborted (use --skip-malformed to skip bad rows)")?;

    for rejected in &report.rejected {
        println!("Skipped: {}", rejected);
    }
    for name in &report.duplicate_names {
        println!("Duplicate name (first row wins on lookup): {}", name);
    }

    save_knowledge_base(&report.records, output)?;
    let lookup = FoodLookup::try_from_path(output)
        .with_context(|| format!("Written knowledge base at '{}' could not be reloaded", output.display()))?;
    println!("Converted {} dishes into '{}'", lookup.len(), output.display());
    Ok(())
}

fn list_foods(lookup: &FoodLookup) {
    println!("Available foods:");
    for (i, food) in lookup.records().iter().enumerate() {
        let aliases: Vec<&str> = food.aliases.iter().take(FOODS_ALIAS_PREVIEW).map(String::as_str).collect();
        let aka = if aliases.is_empty() { "no aliases".to_string() } else { aliases.join(", ") };
        println!("{:3}. {:<30} (aka: {})", i + 1, food.name, aka);
    }
    println!("\nTotal: {} foods", lookup.len());
}

async fn resolve_file(lookup: &FoodLookup, meal_file: &Path, format: OutputFormat) -> Result<()> {
    let content = fs::read_to_string(meal_file)
        .await
        .with_context(|| format!("Failed to read meal file '{}'", meal_file.display()))?;
    let input: MealInput = serde_json::from_str(&content)
        .with_context(|| format!("Meal file '{}' is not a valid meal description", meal_file.display()))?;

    let meals = input.into_meals();
    let results = match meals.as_slice() {
        [meal] => vec![resolve_meal(lookup, meal)],
        _ => resolve_many(lookup, &meals),
    };

    match format.text_mode() {
        Some(mode) => {
            for result in &results {
                println!("{}\n", format_result(result, mode));
            }
        }
        None if results.len() == 1 => println!("{}", serde_json::to_string_pretty(&results[0])?),
        None => println!("{}", serde_json::to_string_pretty(&results)?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::from_env();
    let cli_args = parse_args();
    init_logging(&settings.log_level)?;

    let db_path = cli_args.db.clone().unwrap_or(settings.database_path);

    let load_lookup = || FoodLookup::from_path(&db_path);

    match cli_args.command {
        Command::BuildIndex { csv, output, skip_malformed } => build_index(&csv, &output, skip_malformed)?,
        Command::Find { name } => match load_lookup().find(&name) {
            Some(food) => println!(
                "{} [{}]: {:.1} kcal, {:.1}g protein, {:.1}g carbs, {:.1}g fats, {:.1}g fiber",
                food.name, food.serving_description, food.calories, food.protein, food.carbs, food.fats, food.fiber
            ),
            None => println!("\"{}\" not found in database", name),
        },
        Command::Search { query, limit } => {
            let lookup = load_lookup();
            let matches = lookup.search(&query);
            println!("Found {} items matching '{}':", matches.len(), query);
            for food in matches.iter().take(limit) {
                println!("  - {}", food.name);
            }
        }
        Command::Foods => list_foods(&load_lookup()),
        Command::Resolve { meal_file, format } => resolve_file(&load_lookup(), &meal_file, format).await?,
    }

    Ok(())
}
