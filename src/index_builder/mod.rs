pub mod aliases;
pub mod builder;
pub mod data_loader;

pub use aliases::generate_aliases;
pub use builder::{
    build_record, build_records, save_knowledge_base, BuildOptions, BuildReport, MalformedPolicy, RawFoodRow,
};
pub use data_loader::load_raw_food_rows;
