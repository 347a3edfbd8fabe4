//! # Physique Needs
//!
//! Turns free-text meal descriptions into structured food items and nutrient
//! totals, recognised against a food catalog, and keeps a per-user food log.

pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod nutrients;
pub mod observability;
pub mod observability_config;
pub mod pipeline;
pub mod recognition;
pub mod recommend;
pub mod summary;
pub mod text_processing;
pub mod validation;
pub mod vocabulary;

// Re-export types for easier access
pub use catalog::{CatalogError, FoodCatalog, FoodCatalogEntry, InMemoryCatalog};
pub use errors::{AppError, AppResult};
pub use nutrients::{Nutrient, NutrientTotals, NutrientVector};
pub use pipeline::{FoodLogEntry, NutritionPipeline};
pub use recognition::ParsedItem;
pub use text_processing::{FoodMention, MealTextParser, QuantityMatch};
pub use vocabulary::Unit;
