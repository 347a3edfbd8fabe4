//! # Recognition & Merge
//!
//! Collapses repeated mentions of the same food token and resolves each distinct
//! token against the food catalog.
//!
//! The merge key is the extracted spelling, not the catalog row: "idli" and
//! "idlis" stay separate items even though both resolve to the same food.

use crate::catalog::FoodCatalog;
use crate::errors::{error_logging, AppResult};
use crate::text_processing::FoodMention;
use crate::vocabulary::Unit;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default number of suggestions attached to an unrecognized food
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// One food of a parsed meal, ready for aggregation and persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedItem {
    pub food: String,
    pub quantity: f64,
    pub unit: Option<Unit>,
    pub recognized: bool,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Sum quantities of mentions sharing the same food token
///
/// Order follows the first mention of each token; the first-seen unit is kept.
pub fn merge_mentions(mentions: Vec<FoodMention>) -> Vec<FoodMention> {
    let mut merged: Vec<FoodMention> = Vec::with_capacity(mentions.len());

    for mention in mentions {
        match merged.iter_mut().find(|existing| existing.food == mention.food) {
            Some(existing) => {
                debug!(
                    food = %mention.food,
                    added = mention.quantity,
                    "Merging repeated food mention"
                );
                let sum = existing.quantity + mention.quantity;
                if sum.is_finite() {
                    existing.quantity = sum;
                } else {
                    warn!(food = %mention.food, "Merged quantity out of range, keeping first amount");
                }
            }
            None => merged.push(mention),
        }
    }

    merged
}

/// Merge mentions and resolve each distinct food against the catalog
///
/// Unrecognized foods carry up to `suggestion_limit` catalog names containing the
/// token. A catalog outage aborts with
/// [`crate::errors::AppError::CatalogUnavailable`].
pub fn recognize<C: FoodCatalog + ?Sized>(
    mentions: Vec<FoodMention>,
    catalog: &C,
    suggestion_limit: usize,
) -> AppResult<Vec<ParsedItem>> {
    let merged = merge_mentions(mentions);
    let mut items = Vec::with_capacity(merged.len());

    for mention in merged {
        let recognized = catalog
            .lookup_exact(&mention.food)
            .map_err(|e| {
                error_logging::log_catalog_error(&e, "lookup_exact", &mention.food);
                e
            })?
            .is_some();

        let suggestions = if recognized {
            Vec::new()
        } else {
            catalog
                .suggest(&mention.food, suggestion_limit)
                .map_err(|e| {
                    error_logging::log_catalog_error(&e, "suggest", &mention.food);
                    e
                })?
        };

        crate::observability::record_recognition(recognized);
        debug!(
            food = %mention.food,
            recognized,
            suggestions = suggestions.len(),
            "Resolved food against catalog"
        );

        items.push(ParsedItem {
            food: mention.food,
            quantity: mention.quantity,
            unit: mention.unit,
            recognized,
            suggestions,
        });
    }

    info!(
        items = items.len(),
        recognized = items.iter().filter(|item| item.recognized).count(),
        "Recognition complete"
    );
    Ok(items)
}
