//! # Text Processing Module
//!
//! This module turns a free-text meal description ("I ate 4 idlis and 2 cups rice")
//! into food mentions: a food token, a quantity, and an optional unit.
//!
//! ## Stages
//!
//! 1. **Normalization**: lowercase, split glued number+unit tokens ("1cup" -> "1 cup"),
//!    turn " and " / "&" into commas, drop stopwords
//! 2. **Quantity/unit extraction**: integers, decimals, fractions and number words,
//!    each with an optional unit found within a 12-character window
//! 3. **Food association**: the first word in the 40 characters after the quantity
//!    (or its unit), falling back to the last word before the quantity
//!
//! All offsets handed between stages are byte offsets into the normalized text;
//! every window is measured in characters.

use crate::vocabulary::{
    self, Unit, FOOD_TOKEN_REGEX, FOOD_WINDOW_CHARS, GLUED_UNIT_REGEX, QUANTITY_REGEX, UNIT_REGEX,
    UNIT_WINDOW_CHARS,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// A quantity expression found in normalized text
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityMatch {
    /// The matched quantity text ("2", "1/2", "half")
    pub raw: String,
    /// Numeric value of the quantity, 0 when it could not be parsed
    pub value: f64,
    /// Byte offset where the quantity starts
    pub start: usize,
    /// Byte offset where the quantity ends
    pub end: usize,
    /// Unit bound to this quantity, if one was found inside the window
    pub unit: Option<Unit>,
    /// Byte offset the food search starts from (end of the unit, or of the quantity)
    pub anchor: usize,
}

/// A food token paired with its quantity, before catalog recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodMention {
    pub food: String,
    pub quantity: f64,
    pub unit: Option<Unit>,
}

/// Normalize raw meal text for extraction
///
/// Lowercases, separates a digit from a directly following letter, replaces the
/// conjunction " and " and the "&" symbol with commas, then removes every
/// whitespace-delimited stopword token.
///
/// # Examples
///
/// ```rust
/// use physique_needs::text_processing::normalize_meal_text;
///
/// assert_eq!(normalize_meal_text("I ate 1cup Rice & 2 idlis"), "1 cup rice , 2 idlis");
/// ```
pub fn normalize_meal_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let separated = GLUED_UNIT_REGEX.replace_all(&lowered, "$1 $2");
    let joined = separated.replace(" and ", ",").replace('&', ",");

    let cleaned = joined
        .split_whitespace()
        .filter(|word| !vocabulary::is_stopword(word))
        .collect::<Vec<&str>>()
        .join(" ");

    trace!("Normalized meal text: '{}' -> '{}'", text, cleaned);
    cleaned
}

/// Convert a quantity token to its numeric value
///
/// Number words map through the vocabulary table, "a/b" divides as floating point,
/// anything else is parsed as a decimal. Malformed tokens and zero denominators yield 0.
///
/// # Examples
///
/// ```rust
/// use physique_needs::text_processing::parse_number;
///
/// assert_eq!(parse_number("half"), 0.5);
/// assert_eq!(parse_number("3/4"), 0.75);
/// assert_eq!(parse_number("2.5"), 2.5);
/// assert_eq!(parse_number("1/0"), 0.0);
/// ```
pub fn parse_number(token: &str) -> f64 {
    let token = token.trim().to_lowercase();
    if let Some(value) = vocabulary::number_word_value(&token) {
        return value;
    }

    let value = if token.contains('/') {
        let parts: Vec<&str> = token.split('/').collect();
        if parts.len() != 2 {
            return 0.0;
        }
        match (parts[0].parse::<f64>(), parts[1].parse::<f64>()) {
            (Ok(numerator), Ok(denominator)) if denominator != 0.0 => numerator / denominator,
            _ => {
                debug!("Malformed fraction '{}' coerced to 0", token);
                0.0
            }
        }
    } else {
        token.parse::<f64>().unwrap_or_else(|_| {
            debug!("Unparseable quantity '{}' coerced to 0", token);
            0.0
        })
    };

    // Digit runs past the f64 range parse to infinity
    if !value.is_finite() {
        debug!(digits = token.len(), "Out-of-range quantity coerced to 0");
        return 0.0;
    }
    value
}

/// Number of characters between two byte offsets of `text`
fn char_distance(text: &str, from: usize, to: usize) -> usize {
    text[from..to].chars().count()
}

/// At most `chars` characters of `text` starting at byte offset `start`
fn char_window(text: &str, start: usize, chars: usize) -> &str {
    let rest = &text[start..];
    match rest.char_indices().nth(chars) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}

/// Extracts food mentions from free-text meal descriptions
#[derive(Debug, Clone, Default)]
pub struct MealTextParser;

impl MealTextParser {
    pub fn new() -> Self {
        Self
    }

    /// Find every quantity expression in normalized text, left to right,
    /// and bind the nearest unit when it starts within the unit window.
    pub fn extract_quantities(&self, cleaned: &str) -> Vec<QuantityMatch> {
        QUANTITY_REGEX
            .find_iter(cleaned)
            .map(|m| {
                let raw = m.as_str().to_string();
                let value = parse_number(&raw);

                let (unit, anchor) = match UNIT_REGEX.find_at(cleaned, m.end()) {
                    Some(unit_match)
                        if char_distance(cleaned, m.end(), unit_match.start())
                            < UNIT_WINDOW_CHARS =>
                    {
                        (vocabulary::lookup_unit(unit_match.as_str()), unit_match.end())
                    }
                    Some(unit_match) => {
                        trace!(
                            quantity = %raw,
                            unit = %unit_match.as_str(),
                            "Unit outside window, not bound to quantity"
                        );
                        (None, m.end())
                    }
                    None => (None, m.end()),
                };

                QuantityMatch {
                    raw,
                    value,
                    start: m.start(),
                    end: m.end(),
                    unit,
                    anchor,
                }
            })
            .collect()
    }

    /// Locate the food token for a quantity match
    ///
    /// Looks at the first word within the food window after the anchor; if there is
    /// none, takes the last word before the quantity. Returns `None` when no word is
    /// found or the candidate is a stopword or a unit alias.
    pub fn associate_food(&self, cleaned: &str, quantity: &QuantityMatch) -> Option<String> {
        let after = char_window(cleaned, quantity.anchor, FOOD_WINDOW_CHARS);

        let candidate = FOOD_TOKEN_REGEX
            .find(after)
            .or_else(|| FOOD_TOKEN_REGEX.find_iter(&cleaned[..quantity.start]).last())
            .map(|m| m.as_str());

        match candidate {
            Some(food)
                if !food.is_empty()
                    && !vocabulary::is_stopword(food)
                    && !vocabulary::is_unit_alias(food) =>
            {
                Some(food.to_string())
            }
            Some(food) => {
                debug!(quantity = %quantity.raw, candidate = %food, "Dropping quantity: candidate is not a food");
                None
            }
            None => {
                debug!(quantity = %quantity.raw, "Dropping quantity: no food token found");
                None
            }
        }
    }

    /// Extract all food mentions from raw meal text, in order of appearance
    ///
    /// Quantities without a usable food token are dropped silently; mentions are not
    /// merged here.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use physique_needs::text_processing::MealTextParser;
    /// use physique_needs::vocabulary::Unit;
    ///
    /// let parser = MealTextParser::new();
    /// let mentions = parser.extract_mentions("I ate 2 cups of rice and 4 idlis");
    ///
    /// assert_eq!(mentions.len(), 2);
    /// assert_eq!(mentions[0].food, "rice");
    /// assert_eq!(mentions[0].quantity, 2.0);
    /// assert_eq!(mentions[0].unit, Some(Unit::Cup));
    /// assert_eq!(mentions[1].food, "idlis");
    /// assert_eq!(mentions[1].unit, None);
    /// ```
    pub fn extract_mentions(&self, text: &str) -> Vec<FoodMention> {
        let start_time = std::time::Instant::now();
        let cleaned = normalize_meal_text(text);

        let quantities = self.extract_quantities(&cleaned);
        let quantity_count = quantities.len();

        let mentions: Vec<FoodMention> = quantities
            .into_iter()
            .filter_map(|quantity| {
                let food = self.associate_food(&cleaned, &quantity)?;
                trace!(food = %food, quantity = quantity.value, unit = ?quantity.unit, "Food mention extracted");
                Some(FoodMention {
                    food,
                    quantity: quantity.value,
                    unit: quantity.unit,
                })
            })
            .collect();

        crate::observability::record_text_processing_metrics(
            "extract_mentions",
            start_time.elapsed(),
            text.chars().count(),
            mentions.len(),
        );

        info!(
            quantities = quantity_count,
            mentions = mentions.len(),
            "Extracted food mentions from meal text"
        );
        mentions
    }
}
