pub mod food_lookup;
pub mod kb_loader;

pub use food_lookup::FoodLookup;
pub use kb_loader::load_knowledge_base;
