use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::result_formatter::FormatMode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the nutrition knowledge base (overrides NUTRI_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the knowledge base JSON from a dish nutrition CSV
    BuildIndex {
        #[arg(short, long)]
        csv: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Skip rows with missing values instead of failing the whole batch
        #[arg(long)]
        skip_malformed: bool,
    },
    /// Resolve a single food name
    Find { name: String },
    /// List foods whose name or aliases contain the query
    Search {
        query: String,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// List every food in the knowledge base
    Foods,
    /// Resolve a meal (or an array of meals) described in a JSON file
    Resolve {
        #[arg(short, long)]
        meal_file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    List,
    Json,
}

impl OutputFormat {
    /// Text rendering mode, `None` for JSON output.
    pub fn text_mode(self) -> Option<FormatMode> {
        match self {
            OutputFormat::Table => Some(FormatMode::Table),
            OutputFormat::List => Some(FormatMode::List),
            OutputFormat::Json => None,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
