//! # Vocabulary Tables
//!
//! The closed word sets the meal-text parser works from: stopwords, number
//! words, and unit aliases, plus the regexes compiled from them.
//!
//! All tables are built once on first access through `lazy_static` and are
//! never mutated afterwards, so they can be shared freely across threads.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Maximum distance, in characters, between the end of a quantity and the
/// start of the unit bound to it. The distance must be strictly smaller.
pub const UNIT_WINDOW_CHARS: usize = 12;

/// Number of characters scanned after a quantity (or its unit) for the food token.
pub const FOOD_WINDOW_CHARS: usize = 40;

/// Words removed from meal text before extraction.
///
/// First-person pronouns, eating verbs, meal-time words and the Tamil
/// transliterated fillers that show up in mixed-language logs ("sapten",
/// "iniku", ...). "of" is dropped so "2 cups of rice" binds to "rice".
const STOPWORDS: &[&str] = &[
    "i", "ate", "eat", "eaten", "eating", "had", "have", "having", "consumed", "consume", "and",
    "nd", "of", "sapten", "sapidu", "saptinga", "sapdran", "iniku", "morning", "evening", "night",
    "breakfast", "lunch", "dinner", "snack", "today",
];

/// Number words and their values. The articles count as one.
const NUMBER_WORDS: &[(&str, f64)] = &[
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("half", 0.5),
    ("quarter", 0.25),
    ("a", 1.0),
    ("an", 1.0),
];

/// Canonical serving units recognised in meal text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "piece")]
    Piece,
    #[serde(rename = "cup")]
    Cup,
    #[serde(rename = "bowl")]
    Bowl,
    #[serde(rename = "slice")]
    Slice,
    #[serde(rename = "tbsp")]
    Tbsp,
    #[serde(rename = "tsp")]
    Tsp,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
}

impl Unit {
    pub const ALL: [Unit; 8] = [
        Unit::Piece,
        Unit::Cup,
        Unit::Bowl,
        Unit::Slice,
        Unit::Tbsp,
        Unit::Tsp,
        Unit::Gram,
        Unit::Kilogram,
    ];

    /// Canonical name, as stored in parsed items
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Piece => "piece",
            Unit::Cup => "cup",
            Unit::Bowl => "bowl",
            Unit::Slice => "slice",
            Unit::Tbsp => "tbsp",
            Unit::Tsp => "tsp",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
        }
    }

    /// Every spelling that resolves to this unit
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Unit::Piece => &["piece", "pieces", "pc", "pcs"],
            Unit::Cup => &["cup", "cups"],
            Unit::Bowl => &["bowl", "bowls"],
            Unit::Slice => &["slice", "slices"],
            Unit::Tbsp => &["tbsp", "tablespoon", "tablespoons"],
            Unit::Tsp => &["tsp", "teaspoon", "teaspoons"],
            Unit::Gram => &["g", "gram", "grams"],
            Unit::Kilogram => &["kg", "kilogram", "kilograms"],
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    static ref STOPWORD_SET: HashSet<&'static str> = STOPWORDS.iter().copied().collect();

    static ref NUMBER_WORD_VALUES: HashMap<&'static str, f64> =
        NUMBER_WORDS.iter().copied().collect();

    static ref UNIT_LOOKUP: HashMap<&'static str, Unit> = Unit::ALL
        .iter()
        .flat_map(|unit| unit.aliases().iter().map(move |alias| (*alias, *unit)))
        .collect();

    /// Integer, decimal, simple fraction or number word, as a whole word.
    /// The fraction alternative comes first so "1/2" is a single quantity.
    pub static ref QUANTITY_REGEX: Regex = Regex::new(&build_quantity_pattern())
        .expect("Quantity pattern should be valid");

    /// Any unit alias, as a whole word
    pub static ref UNIT_REGEX: Regex = Regex::new(&build_unit_pattern())
        .expect("Unit pattern should be valid");

    /// A food-name candidate: a letter followed by letters or digits
    pub static ref FOOD_TOKEN_REGEX: Regex = Regex::new(r"\b[a-zA-Z][a-zA-Z0-9]*\b")
        .expect("Food token pattern should be valid");

    /// A digit glued to a following letter ("1cup")
    pub static ref GLUED_UNIT_REGEX: Regex = Regex::new(r"(\d)([a-zA-Z])")
        .expect("Glued unit pattern should be valid");
}

fn build_quantity_pattern() -> String {
    let words: Vec<String> = sorted_longest_first(NUMBER_WORDS.iter().map(|(word, _)| *word))
        .into_iter()
        .map(|word| regex::escape(word))
        .collect();
    format!(r"\b(?P<num>\d+/\d+|\d+(?:\.\d+)?|{})\b", words.join("|"))
}

fn build_unit_pattern() -> String {
    let aliases: Vec<String> = sorted_longest_first(UNIT_LOOKUP.keys().copied())
        .into_iter()
        .map(|alias| regex::escape(alias))
        .collect();
    format!(r"\b(?:{})\b", aliases.join("|"))
}

// Longest first, then alphabetical, so alternation never settles on a prefix.
fn sorted_longest_first<'a>(words: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut words: Vec<&str> = words.collect();
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    words
}

/// Whether `word` is one of the filler words stripped from meal text
pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}

/// Value of a number word ("two", "half", "an"), if it is one
pub fn number_word_value(word: &str) -> Option<f64> {
    NUMBER_WORD_VALUES.get(word).copied()
}

/// Resolve a unit alias ("cups", "pcs", "grams") to its canonical unit
pub fn lookup_unit(alias: &str) -> Option<Unit> {
    UNIT_LOOKUP.get(alias).copied()
}

/// Whether `word` is any known unit spelling
pub fn is_unit_alias(word: &str) -> bool {
    UNIT_LOOKUP.contains_key(word)
}
