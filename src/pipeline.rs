//! # Nutrition Pipeline
//!
//! Entry points that chain normalization, extraction, association, recognition
//! and aggregation over a single food catalog.

use crate::catalog::FoodCatalog;
use crate::config::ParserConfig;
use crate::errors::{error_logging, AppError, AppResult};
use crate::nutrients::{self, NutrientTotals};
use crate::recognition::{self, ParsedItem};
use crate::text_processing::MealTextParser;
use crate::validation::validate_meal_text;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// The persistence tuple for one logged meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogEntry {
    pub raw_text: String,
    pub items: Vec<ParsedItem>,
    pub totals: NutrientTotals,
}

/// Text-to-nutrient pipeline over a food catalog
///
/// # Examples
///
/// ```
/// use physique_needs::catalog::{FoodCatalogEntry, InMemoryCatalog};
/// use physique_needs::nutrients::{Nutrient, NutrientVector};
/// use physique_needs::pipeline::NutritionPipeline;
///
/// let catalog = InMemoryCatalog::new(vec![FoodCatalogEntry::new("idli", "idlis")
///     .with_nutrients(NutrientVector::new().with(Nutrient::Calories, 52.0))]);
/// let pipeline = NutritionPipeline::new(catalog);
///
/// let entry = pipeline.analyze("4 idli").unwrap();
/// assert_eq!(entry.items[0].quantity, 4.0);
/// assert_eq!(entry.totals.calories(), 208.0);
/// ```
#[derive(Debug, Clone)]
pub struct NutritionPipeline<C> {
    catalog: C,
    parser: MealTextParser,
    config: ParserConfig,
}

impl<C: FoodCatalog> NutritionPipeline<C> {
    pub fn new(catalog: C) -> Self {
        Self::with_config(catalog, ParserConfig::default())
    }

    pub fn with_config(catalog: C, config: ParserConfig) -> Self {
        Self {
            catalog,
            parser: MealTextParser::new(),
            config,
        }
    }

    /// Turn free meal text into merged, recognized items
    ///
    /// Any text is accepted; empty or food-free text yields an empty list.
    #[instrument(skip(self), fields(text_len = text.len()))]
    pub fn parse(&self, text: &str) -> AppResult<Vec<ParsedItem>> {
        let mentions = self.parser.extract_mentions(text);
        recognition::recognize(mentions, &self.catalog, self.config.suggestion_limit)
    }

    /// Sum scaled catalog nutrients over the recognized items
    pub fn compute_totals(&self, items: &[ParsedItem]) -> AppResult<NutrientTotals> {
        nutrients::compute_totals(items, &self.catalog)
    }

    /// Validate, parse and total one meal, ready to be stored
    #[instrument(skip(self, text))]
    pub fn analyze(&self, text: &str) -> AppResult<FoodLogEntry> {
        let validated = validate_meal_text(text, self.config.max_meal_text_chars).map_err(|kind| {
            let error = match kind {
                "empty" => AppError::Validation("Meal text cannot be empty".to_string()),
                _ => AppError::Validation(format!(
                    "Meal text cannot exceed {} characters",
                    self.config.max_meal_text_chars
                )),
            };
            error_logging::log_validation_error(&error, "analyze", None, "meal_text", Some(text));
            error
        })?;

        let items = self.parse(validated)?;
        let totals = self.compute_totals(&items)?;

        info!(
            items = items.len(),
            calories = totals.calories(),
            "Meal analyzed"
        );

        Ok(FoodLogEntry {
            raw_text: text.to_string(),
            items,
            totals,
        })
    }
}
