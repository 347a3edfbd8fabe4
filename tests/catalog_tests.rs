use physique_needs::catalog::{load_catalog_from_path, FoodCatalog};
use physique_needs::errors::AppError;
use physique_needs::nutrients::Nutrient;
use physique_needs::pipeline::NutritionPipeline;
use physique_needs::recommend::recommend_for_target;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_catalog(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_catalog_from_file() {
    let file = write_catalog(
        r#"[
            {"food_name_singular": "idli", "food_name_plural": "idlis",
             "calories_per_unit": 52, "grams_per_unit": 55, "per_100g": 0},
            {"food_name_singular": "rice", "food_name_plural": "rice",
             "calories_per_unit": 130, "grams_per_unit": 200, "per_100g": true,
             "max_units_per_day": 2}
        ]"#,
    );

    let catalog = load_catalog_from_path(file.path()).unwrap();
    assert_eq!(catalog.len(), 2);

    let idli = catalog.lookup_exact("idlis").unwrap().unwrap();
    assert!(!idli.per_100g);
    assert_eq!(idli.nutrients.get(Nutrient::Calories), Some(52.0));

    let rice = catalog.lookup_exact("RICE").unwrap().unwrap();
    assert!(rice.per_100g);
    assert_eq!(rice.max_units_per_day, Some(2));
}

#[test]
fn test_missing_file_is_filesystem_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_catalog_from_path(dir.path().join("absent.json"));
    assert!(matches!(result, Err(AppError::FileSystem(_))));
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_catalog("{ not json");
    assert!(matches!(
        load_catalog_from_path(file.path()),
        Err(AppError::Config(_))
    ));
}

#[test]
fn test_invalid_row_is_rejected() {
    let file = write_catalog(r#"[{"food_name_singular": "idli", "calories_per_unit": -52}]"#);
    assert!(matches!(
        load_catalog_from_path(file.path()),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn test_seed_catalog_drives_the_pipeline() {
    let catalog = load_catalog_from_path("config/foods.json").unwrap();
    assert!(catalog.len() >= 5);

    let pipeline = NutritionPipeline::new(catalog);
    let entry = pipeline.analyze("I ate 2 cup rice and 4 idlis").unwrap();
    assert_eq!(entry.totals.calories(), 728.0);
}

#[test]
fn test_seed_catalog_recommendation_stays_under_target() {
    let catalog = load_catalog_from_path("config/foods.json").unwrap();
    let plan = recommend_for_target(1800.0, catalog.entries()).unwrap();

    assert!(!plan.recommended_foods.is_empty());
    assert!(plan.total_nutrition.calories <= 1800.0);
    assert_eq!(plan.recommended_foods[0].food, "idli");
    assert_eq!(
        plan.recommended_foods[0].pros.as_deref(),
        Some("Steamed and light on fat")
    );
}
