//! # Nutrients
//!
//! Nutrient identifiers, per-unit nutrient vectors from the catalog, the
//! fixed-key totals record, and the aggregator that scales catalog values by
//! parsed quantities.

use crate::catalog::{FoodCatalog, FoodCatalogEntry};
use crate::errors::{error_logging, AppResult};
use crate::recognition::ParsedItem;
use crate::vocabulary::Unit;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Number of tracked nutrients
pub const NUTRIENT_COUNT: usize = 21;

/// Decimal places kept in emitted totals
pub const TOTALS_PRECISION: i32 = 4;

/// Every nutrient tracked per food and per log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Sugar,
    SodiumMg,
    CholesterolMg,
    CalciumMg,
    IronMg,
    VitaminAMcg,
    VitaminB1Mg,
    VitaminB2Mg,
    VitaminB3Mg,
    VitaminB6Mg,
    VitaminB9Mcg,
    VitaminB12Mcg,
    VitaminCMg,
    VitaminDMcg,
    VitaminEMg,
    VitaminKMcg,
}

impl Nutrient {
    pub const ALL: [Nutrient; NUTRIENT_COUNT] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
        Nutrient::Fiber,
        Nutrient::Sugar,
        Nutrient::SodiumMg,
        Nutrient::CholesterolMg,
        Nutrient::CalciumMg,
        Nutrient::IronMg,
        Nutrient::VitaminAMcg,
        Nutrient::VitaminB1Mg,
        Nutrient::VitaminB2Mg,
        Nutrient::VitaminB3Mg,
        Nutrient::VitaminB6Mg,
        Nutrient::VitaminB9Mcg,
        Nutrient::VitaminB12Mcg,
        Nutrient::VitaminCMg,
        Nutrient::VitaminDMcg,
        Nutrient::VitaminEMg,
        Nutrient::VitaminKMcg,
    ];

    /// Key used in emitted totals
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
            Nutrient::Sugar => "sugar",
            Nutrient::SodiumMg => "sodium_mg",
            Nutrient::CholesterolMg => "cholesterol_mg",
            Nutrient::CalciumMg => "calcium_mg",
            Nutrient::IronMg => "iron_mg",
            Nutrient::VitaminAMcg => "vitaminA_mcg",
            Nutrient::VitaminB1Mg => "vitaminB1_mg",
            Nutrient::VitaminB2Mg => "vitaminB2_mg",
            Nutrient::VitaminB3Mg => "vitaminB3_mg",
            Nutrient::VitaminB6Mg => "vitaminB6_mg",
            Nutrient::VitaminB9Mcg => "vitaminB9_mcg",
            Nutrient::VitaminB12Mcg => "vitaminB12_mcg",
            Nutrient::VitaminCMg => "vitaminC_mg",
            Nutrient::VitaminDMcg => "vitaminD_mcg",
            Nutrient::VitaminEMg => "vitaminE_mg",
            Nutrient::VitaminKMcg => "vitaminK_mcg",
        }
    }

    /// Column holding the per-unit value in the `foods` table
    pub fn catalog_column(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories_per_unit",
            Nutrient::Protein => "protein_per_unit",
            Nutrient::Carbs => "carbs_per_unit",
            Nutrient::Fat => "fat_per_unit",
            Nutrient::Fiber => "fiber_per_unit",
            Nutrient::Sugar => "sugar_per_unit",
            Nutrient::SodiumMg => "sodium_per_unit_mg",
            Nutrient::CholesterolMg => "cholesterol_per_unit_mg",
            Nutrient::CalciumMg => "calcium_per_unit_mg",
            Nutrient::IronMg => "iron_per_unit_mg",
            // Vitamin columns carry no "_per_unit" infix
            other => other.key(),
        }
    }

    pub fn from_key(key: &str) -> Option<Nutrient> {
        Nutrient::ALL.iter().copied().find(|n| n.key() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-unit nutrient values of one catalog food; absent values count as zero
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutrientVector {
    values: [Option<f64>; NUTRIENT_COUNT],
}

impl NutrientVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, nutrient: Nutrient, value: f64) -> Self {
        self.set(nutrient, Some(value));
        self
    }

    pub fn set(&mut self, nutrient: Nutrient, value: Option<f64>) {
        self.values[nutrient.index()] = value;
    }

    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        self.values[nutrient.index()]
    }
}

/// Accumulated nutrient amounts; every key is always present
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutrientTotals {
    values: [f64; NUTRIENT_COUNT],
}

impl NutrientTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.values[nutrient.index()]
    }

    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        self.values[nutrient.index()] = value;
    }

    pub fn calories(&self) -> f64 {
        self.get(Nutrient::Calories)
    }

    pub fn protein(&self) -> f64 {
        self.get(Nutrient::Protein)
    }

    pub fn carbs(&self) -> f64 {
        self.get(Nutrient::Carbs)
    }

    pub fn fat(&self) -> f64 {
        self.get(Nutrient::Fat)
    }

    /// Add `vector * factor` into the totals, treating missing values as zero
    pub fn add_scaled(&mut self, vector: &NutrientVector, factor: f64) {
        for nutrient in Nutrient::ALL {
            self.values[nutrient.index()] += vector.get(nutrient).unwrap_or(0.0) * factor;
        }
    }

    /// Whether every value is a finite number
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|value| value.is_finite())
    }

    /// Add another totals record field by field
    pub fn accumulate(&mut self, other: &NutrientTotals) {
        for (total, value) in self.values.iter_mut().zip(other.values.iter()) {
            *total += value;
        }
    }

    /// Copy with every value rounded to `places` decimals
    pub fn rounded(&self, places: i32) -> Self {
        let mut rounded = *self;
        for value in rounded.values.iter_mut() {
            *value = round_to(*value, places);
        }
        rounded
    }

    /// `(key, value)` pairs in fixed nutrient order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        Nutrient::ALL.iter().map(move |n| (n.key(), self.get(*n)))
    }
}

impl Serialize for NutrientTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(NUTRIENT_COUNT))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NutrientTotals {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: HashMap<String, Option<f64>> = HashMap::deserialize(deserializer)?;
        let mut totals = NutrientTotals::new();
        for (key, value) in raw {
            if let Some(nutrient) = Nutrient::from_key(&key) {
                totals.set(nutrient, value.unwrap_or(0.0));
            }
        }
        Ok(totals)
    }
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

/// How many catalog units one parsed quantity represents
///
/// For per-100g foods the quantity is converted to grams (directly for "g",
/// through `grams_per_unit` otherwise) and divided by 100. For per-unit foods the
/// quantity is the factor.
pub fn scaling_factor(entry: &FoodCatalogEntry, quantity: f64, unit: Option<Unit>) -> f64 {
    if !entry.per_100g {
        return quantity;
    }

    let grams = if unit == Some(Unit::Gram) {
        quantity
    } else {
        match entry.grams_per_unit {
            Some(grams_per_unit) => quantity * grams_per_unit,
            None => {
                warn!(
                    food = %entry.name_singular,
                    "Per-100g food has no grams_per_unit, contributing zero"
                );
                0.0
            }
        }
    };
    grams / 100.0
}

/// Compute nutrient totals for recognized parsed items
///
/// Each recognized item is looked up again; a row that has disappeared since
/// recognition contributes nothing. A catalog outage aborts with
/// [`crate::errors::AppError::CatalogUnavailable`]. Totals are rounded to
/// [`TOTALS_PRECISION`] decimals.
pub fn compute_totals<C: FoodCatalog + ?Sized>(
    items: &[ParsedItem],
    catalog: &C,
) -> AppResult<NutrientTotals> {
    let mut totals = NutrientTotals::new();
    let mut contributing = 0usize;

    for item in items.iter().filter(|item| item.recognized) {
        let entry = match catalog.lookup_exact(&item.food) {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                warn!(food = %item.food, "Recognized food no longer in catalog, contributing zero");
                crate::observability::record_catalog_missing_row();
                continue;
            }
            Err(e) => {
                error_logging::log_catalog_error(&e, "compute_totals", &item.food);
                return Err(e.into());
            }
        };

        let factor = scaling_factor(&entry, item.quantity, item.unit);
        debug!(food = %item.food, quantity = item.quantity, unit = ?item.unit, factor, "Scaling catalog nutrients");
        let mut next = totals;
        next.add_scaled(&entry.nutrients, factor);
        if !next.is_finite() {
            warn!(food = %item.food, quantity = item.quantity, "Scaled nutrients overflow, item skipped");
            continue;
        }
        totals = next;
        contributing += 1;
    }

    crate::observability::record_aggregation_metrics(items.len(), contributing);
    Ok(totals.rounded(TOTALS_PRECISION))
}
