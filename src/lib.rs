pub mod cli;
pub mod config;
pub mod error;
pub mod food_record;
pub mod index_builder;
pub mod logging;
pub mod lookup;
pub mod meal_resolver;
pub mod result_formatter;
