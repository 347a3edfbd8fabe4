//! # Food Catalog
//!
//! The read-only reference table the parser recognises foods against.
//!
//! The pipeline only needs two operations from a catalog: a case-insensitive exact
//! lookup on the singular and plural names, and a substring search for suggestions.
//! [`FoodCatalog`] captures that seam; [`InMemoryCatalog`] implements it over a
//! snapshot loaded from the database or from a JSON seed file.

use crate::errors::{error_logging, AppError, AppResult};
use crate::nutrients::{Nutrient, NutrientVector};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A catalog dependency failure (connection lost, store unreachable)
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogError {
    message: String,
}

impl CatalogError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "food catalog unavailable: {}", self.message)
    }
}

impl std::error::Error for CatalogError {}

/// Immutable reference record for one food
#[derive(Debug, Clone, PartialEq)]
pub struct FoodCatalogEntry {
    pub name_singular: String,
    pub name_plural: String,
    /// Natural serving unit label ("piece", "cup")
    pub unit_name: Option<String>,
    /// Nutrients per unit, or per 100 g when `per_100g` is set
    pub nutrients: NutrientVector,
    pub grams_per_unit: Option<f64>,
    pub per_100g: bool,
    pub max_units_per_day: Option<u32>,
    /// Free-text benefits shown next to a planned food
    pub pros: Option<String>,
    /// Free-text drawbacks shown next to a planned food
    pub cons: Option<String>,
}

impl FoodCatalogEntry {
    pub fn new(name_singular: impl Into<String>, name_plural: impl Into<String>) -> Self {
        Self {
            name_singular: name_singular.into(),
            name_plural: name_plural.into(),
            unit_name: None,
            nutrients: NutrientVector::new(),
            grams_per_unit: None,
            per_100g: false,
            max_units_per_day: None,
            pros: None,
            cons: None,
        }
    }

    pub fn with_nutrients(mut self, nutrients: NutrientVector) -> Self {
        self.nutrients = nutrients;
        self
    }

    pub fn with_grams_per_unit(mut self, grams: f64) -> Self {
        self.grams_per_unit = Some(grams);
        self
    }

    pub fn with_per_100g(mut self, per_100g: bool) -> Self {
        self.per_100g = per_100g;
        self
    }

    pub fn with_unit_name(mut self, unit_name: impl Into<String>) -> Self {
        self.unit_name = Some(unit_name.into());
        self
    }

    pub fn with_max_units_per_day(mut self, max_units: u32) -> Self {
        self.max_units_per_day = Some(max_units);
        self
    }

    pub fn with_pros_and_cons(mut self, pros: impl Into<String>, cons: impl Into<String>) -> Self {
        self.pros = Some(pros.into());
        self.cons = Some(cons.into());
        self
    }

    /// Same row checks as records read from a catalog file
    pub fn validate(&self) -> AppResult<()> {
        FoodRecord::from(self).validate()
    }

    /// Case-insensitive match against either name
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.name_singular.to_lowercase() == name || self.name_plural.to_lowercase() == name
    }

    /// Case-insensitive substring match against either name
    pub fn contains_fragment(&self, fragment: &str) -> bool {
        let fragment = fragment.to_lowercase();
        self.name_singular.to_lowercase().contains(&fragment)
            || self.name_plural.to_lowercase().contains(&fragment)
    }
}

/// Lookup operations the pipeline needs from a food catalog
pub trait FoodCatalog {
    /// Exact, case-insensitive match on the singular or plural name
    fn lookup_exact(&self, name: &str) -> Result<Option<FoodCatalogEntry>, CatalogError>;

    /// Up to `limit` singular names containing `fragment`, in storage order
    fn suggest(&self, fragment: &str, limit: usize) -> Result<Vec<String>, CatalogError>;
}

impl<T: FoodCatalog + ?Sized> FoodCatalog for &T {
    fn lookup_exact(&self, name: &str) -> Result<Option<FoodCatalogEntry>, CatalogError> {
        (**self).lookup_exact(name)
    }

    fn suggest(&self, fragment: &str, limit: usize) -> Result<Vec<String>, CatalogError> {
        (**self).suggest(fragment, limit)
    }
}

impl<T: FoodCatalog + ?Sized> FoodCatalog for Arc<T> {
    fn lookup_exact(&self, name: &str) -> Result<Option<FoodCatalogEntry>, CatalogError> {
        (**self).lookup_exact(name)
    }

    fn suggest(&self, fragment: &str, limit: usize) -> Result<Vec<String>, CatalogError> {
        (**self).suggest(fragment, limit)
    }
}

/// Catalog snapshot held in memory, in storage order
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    entries: Vec<FoodCatalogEntry>,
}

impl InMemoryCatalog {
    pub fn new(entries: Vec<FoodCatalogEntry>) -> Self {
        Self { entries }
    }

    /// Build a snapshot, logging and skipping rows that fail validation
    pub fn from_checked(entries: impl IntoIterator<Item = FoodCatalogEntry>) -> Self {
        entries
            .into_iter()
            .filter(|entry| match entry.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(food = %entry.name_singular, error = %e, "Skipping invalid catalog row");
                    false
                }
            })
            .collect()
    }

    pub fn entries(&self) -> &[FoodCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<FoodCatalogEntry> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = FoodCatalogEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FoodCatalog for InMemoryCatalog {
    fn lookup_exact(&self, name: &str) -> Result<Option<FoodCatalogEntry>, CatalogError> {
        let found = self.entries.iter().find(|entry| entry.matches_name(name)).cloned();
        debug!(name = %name, found = found.is_some(), "Catalog exact lookup");
        Ok(found)
    }

    fn suggest(&self, fragment: &str, limit: usize) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.contains_fragment(fragment))
            .take(limit)
            .map(|entry| entry.name_singular.clone())
            .collect())
    }
}

/// One row of the `foods` table, as stored in the database or the seed file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct FoodRecord {
    pub food_name_singular: String,
    pub food_name_plural: Option<String>,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub grams_per_unit: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub per_100g: bool,
    #[serde(default)]
    pub max_units_per_day: Option<u32>,
    #[serde(default)]
    pub pros: Option<String>,
    #[serde(default)]
    pub cons: Option<String>,
    #[serde(default)]
    pub calories_per_unit: Option<f64>,
    #[serde(default)]
    pub protein_per_unit: Option<f64>,
    #[serde(default)]
    pub carbs_per_unit: Option<f64>,
    #[serde(default)]
    pub fat_per_unit: Option<f64>,
    #[serde(default)]
    pub fiber_per_unit: Option<f64>,
    #[serde(default)]
    pub sugar_per_unit: Option<f64>,
    #[serde(default)]
    pub sodium_per_unit_mg: Option<f64>,
    #[serde(default)]
    pub cholesterol_per_unit_mg: Option<f64>,
    #[serde(default)]
    pub calcium_per_unit_mg: Option<f64>,
    #[serde(default)]
    pub iron_per_unit_mg: Option<f64>,
    #[serde(default)]
    pub vitaminA_mcg: Option<f64>,
    #[serde(default)]
    pub vitaminB1_mg: Option<f64>,
    #[serde(default)]
    pub vitaminB2_mg: Option<f64>,
    #[serde(default)]
    pub vitaminB3_mg: Option<f64>,
    #[serde(default)]
    pub vitaminB6_mg: Option<f64>,
    #[serde(default)]
    pub vitaminB9_mcg: Option<f64>,
    #[serde(default)]
    pub vitaminB12_mcg: Option<f64>,
    #[serde(default)]
    pub vitaminC_mg: Option<f64>,
    #[serde(default)]
    pub vitaminD_mcg: Option<f64>,
    #[serde(default)]
    pub vitaminE_mg: Option<f64>,
    #[serde(default)]
    pub vitaminK_mcg: Option<f64>,
}

// MySQL-era dumps store the flag as 0/1.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => value,
        Some(Flag::Int(value)) => value != 0,
        None => false,
    })
}

impl FoodRecord {
    fn nutrient_value(&self, nutrient: Nutrient) -> Option<f64> {
        match nutrient {
            Nutrient::Calories => self.calories_per_unit,
            Nutrient::Protein => self.protein_per_unit,
            Nutrient::Carbs => self.carbs_per_unit,
            Nutrient::Fat => self.fat_per_unit,
            Nutrient::Fiber => self.fiber_per_unit,
            Nutrient::Sugar => self.sugar_per_unit,
            Nutrient::SodiumMg => self.sodium_per_unit_mg,
            Nutrient::CholesterolMg => self.cholesterol_per_unit_mg,
            Nutrient::CalciumMg => self.calcium_per_unit_mg,
            Nutrient::IronMg => self.iron_per_unit_mg,
            Nutrient::VitaminAMcg => self.vitaminA_mcg,
            Nutrient::VitaminB1Mg => self.vitaminB1_mg,
            Nutrient::VitaminB2Mg => self.vitaminB2_mg,
            Nutrient::VitaminB3Mg => self.vitaminB3_mg,
            Nutrient::VitaminB6Mg => self.vitaminB6_mg,
            Nutrient::VitaminB9Mcg => self.vitaminB9_mcg,
            Nutrient::VitaminB12Mcg => self.vitaminB12_mcg,
            Nutrient::VitaminCMg => self.vitaminC_mg,
            Nutrient::VitaminDMcg => self.vitaminD_mcg,
            Nutrient::VitaminEMg => self.vitaminE_mg,
            Nutrient::VitaminKMcg => self.vitaminK_mcg,
        }
    }

    /// Validate a catalog row before it is accepted
    pub fn validate(&self) -> AppResult<()> {
        if self.food_name_singular.trim().is_empty() {
            return Err(AppError::Validation(
                "food_name_singular cannot be empty".to_string(),
            ));
        }

        if let Some(grams) = self.grams_per_unit {
            if grams <= 0.0 {
                return Err(AppError::Validation(format!(
                    "grams_per_unit for '{}' must be positive",
                    self.food_name_singular
                )));
            }
        }

        for nutrient in Nutrient::ALL {
            if let Some(value) = self.nutrient_value(nutrient) {
                if value < 0.0 || !value.is_finite() {
                    return Err(AppError::Validation(format!(
                        "{} for '{}' must be a non-negative number",
                        nutrient.catalog_column(),
                        self.food_name_singular
                    )));
                }
            }
        }

        Ok(())
    }
}

impl From<FoodRecord> for FoodCatalogEntry {
    fn from(record: FoodRecord) -> Self {
        let mut nutrients = NutrientVector::new();
        for nutrient in Nutrient::ALL {
            nutrients.set(nutrient, record.nutrient_value(nutrient));
        }

        let name_plural = record
            .food_name_plural
            .clone()
            .filter(|plural| !plural.trim().is_empty())
            .unwrap_or_else(|| record.food_name_singular.clone());

        FoodCatalogEntry {
            name_singular: record.food_name_singular,
            name_plural,
            unit_name: record.unit_name,
            nutrients,
            grams_per_unit: record.grams_per_unit,
            per_100g: record.per_100g,
            max_units_per_day: record.max_units_per_day,
            pros: record.pros,
            cons: record.cons,
        }
    }
}

impl From<&FoodCatalogEntry> for FoodRecord {
    fn from(entry: &FoodCatalogEntry) -> Self {
        let n = |nutrient| entry.nutrients.get(nutrient);
        FoodRecord {
            food_name_singular: entry.name_singular.clone(),
            food_name_plural: Some(entry.name_plural.clone()),
            unit_name: entry.unit_name.clone(),
            grams_per_unit: entry.grams_per_unit,
            per_100g: entry.per_100g,
            max_units_per_day: entry.max_units_per_day,
            pros: entry.pros.clone(),
            cons: entry.cons.clone(),
            calories_per_unit: n(Nutrient::Calories),
            protein_per_unit: n(Nutrient::Protein),
            carbs_per_unit: n(Nutrient::Carbs),
            fat_per_unit: n(Nutrient::Fat),
            fiber_per_unit: n(Nutrient::Fiber),
            sugar_per_unit: n(Nutrient::Sugar),
            sodium_per_unit_mg: n(Nutrient::SodiumMg),
            cholesterol_per_unit_mg: n(Nutrient::CholesterolMg),
            calcium_per_unit_mg: n(Nutrient::CalciumMg),
            iron_per_unit_mg: n(Nutrient::IronMg),
            vitaminA_mcg: n(Nutrient::VitaminAMcg),
            vitaminB1_mg: n(Nutrient::VitaminB1Mg),
            vitaminB2_mg: n(Nutrient::VitaminB2Mg),
            vitaminB3_mg: n(Nutrient::VitaminB3Mg),
            vitaminB6_mg: n(Nutrient::VitaminB6Mg),
            vitaminB9_mcg: n(Nutrient::VitaminB9Mcg),
            vitaminB12_mcg: n(Nutrient::VitaminB12Mcg),
            vitaminC_mg: n(Nutrient::VitaminCMg),
            vitaminD_mcg: n(Nutrient::VitaminDMcg),
            vitaminE_mg: n(Nutrient::VitaminEMg),
            vitaminK_mcg: n(Nutrient::VitaminKMcg),
        }
    }
}

/// Load a catalog from a JSON array of `foods` rows
pub fn load_catalog_from_path(path: impl AsRef<Path>) -> AppResult<InMemoryCatalog> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        error_logging::log_filesystem_error(&e, "load_catalog", path.to_str());
        AppError::FileSystem(format!("Failed to read catalog '{}': {}", path.display(), e))
    })?;

    let records: Vec<FoodRecord> = serde_json::from_str(&content).map_err(|e| {
        AppError::Config(format!("Failed to parse catalog '{}': {}", path.display(), e))
    })?;

    for record in &records {
        record.validate()?;
    }

    let catalog: InMemoryCatalog = records.into_iter().map(FoodCatalogEntry::from).collect();
    info!(
        path = %path.display(),
        foods = catalog.len(),
        "Loaded food catalog from file"
    );
    Ok(catalog)
}

/// Load the seed catalog from `FOOD_CATALOG_PATH`, falling back to the usual locations
pub fn load_catalog_seed() -> AppResult<InMemoryCatalog> {
    if let Ok(config_path) = std::env::var("FOOD_CATALOG_PATH") {
        info!("Loading food catalog from environment variable: {}", config_path);
        match load_catalog_from_path(&config_path) {
            Ok(catalog) => return Ok(catalog),
            Err(e) => warn!(
                "Failed to load food catalog from '{}': {}. Falling back to default paths.",
                config_path, e
            ),
        }
    }

    let possible_paths = [
        "/app/config/foods.json", // Docker path
        "config/foods.json",      // Local development path
        "../config/foods.json",   // Test path
    ];

    for config_path in &possible_paths {
        if !Path::new(config_path).exists() {
            continue;
        }
        match load_catalog_from_path(config_path) {
            Ok(catalog) => return Ok(catalog),
            Err(e) => {
                warn!(
                    "Failed to load food catalog at '{}': {}. Trying next path.",
                    config_path, e
                );
            }
        }
    }

    Err(AppError::Config(
        "No food catalog found. Set FOOD_CATALOG_PATH or DATABASE_URL".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            FoodCatalogEntry::new("idli", "idlis"),
            FoodCatalogEntry::new("rice", "rice"),
            FoodCatalogEntry::new("fried rice", "fried rice"),
            FoodCatalogEntry::new("Rice Flour Dosa", "rice flour dosas"),
        ])
    }

    #[test]
    fn test_lookup_matches_singular_and_plural_case_insensitively() {
        let catalog = catalog();
        assert_eq!(
            catalog.lookup_exact("IDLIS").unwrap().unwrap().name_singular,
            "idli"
        );
        assert_eq!(
            catalog.lookup_exact("Rice").unwrap().unwrap().name_singular,
            "rice"
        );
        assert!(catalog.lookup_exact("ric").unwrap().is_none());
    }

    #[test]
    fn test_suggest_is_substring_in_storage_order() {
        let catalog = catalog();
        assert_eq!(
            catalog.suggest("ric", 5).unwrap(),
            vec!["rice", "fried rice", "Rice Flour Dosa"]
        );
        assert_eq!(catalog.suggest("ric", 2).unwrap(), vec!["rice", "fried rice"]);
        assert!(catalog.suggest("paneer", 5).unwrap().is_empty());
    }

    #[test]
    fn test_record_accepts_integer_flag_and_missing_plural() {
        let record: FoodRecord = serde_json::from_str(
            r#"{"food_name_singular": "rice", "food_name_plural": null, "per_100g": 1,
                "grams_per_unit": 200, "calories_per_unit": 130, "fat_per_unit": null}"#,
        )
        .unwrap();
        let entry = FoodCatalogEntry::from(record);
        assert!(entry.per_100g);
        assert_eq!(entry.name_plural, "rice");
        assert_eq!(entry.nutrients.get(Nutrient::Calories), Some(130.0));
        assert_eq!(entry.nutrients.get(Nutrient::Fat), None);
    }

    #[test]
    fn test_record_validation() {
        let mut record = FoodRecord {
            food_name_singular: "idli".to_string(),
            ..Default::default()
        };
        assert!(record.validate().is_ok());

        record.grams_per_unit = Some(0.0);
        assert!(record.validate().is_err());
        record.grams_per_unit = Some(55.0);

        record.calories_per_unit = Some(-1.0);
        assert!(record.validate().is_err());
        record.calories_per_unit = Some(52.0);

        record.food_name_singular = "  ".to_string();
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_from_checked_skips_invalid_rows() {
        let catalog = InMemoryCatalog::from_checked(vec![
            FoodCatalogEntry::new("idli", "idlis")
                .with_nutrients(NutrientVector::new().with(Nutrient::Calories, 52.0)),
            FoodCatalogEntry::new("bad", "bads")
                .with_nutrients(NutrientVector::new().with(Nutrient::Fat, -3.0)),
            FoodCatalogEntry::new("rice", "rice").with_grams_per_unit(0.0),
            FoodCatalogEntry::new("egg", "eggs"),
        ]);

        let names: Vec<&str> = catalog
            .entries()
            .iter()
            .map(|entry| entry.name_singular.as_str())
            .collect();
        assert_eq!(names, vec!["idli", "egg"]);
    }

    #[test]
    fn test_record_round_trips_through_entry() {
        let entry = FoodCatalogEntry::new("banana", "bananas")
            .with_nutrients(NutrientVector::new().with(Nutrient::VitaminB6Mg, 0.4))
            .with_max_units_per_day(3)
            .with_pros_and_cons("Quick energy", "High sugar");
        let back = FoodCatalogEntry::from(FoodRecord::from(&entry));
        assert_eq!(back, entry);
    }
}
