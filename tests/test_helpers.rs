//! # Test Helper Library
//!
//! Fixture catalog rows and database setup shared by the integration tests.

use physique_needs::catalog::{FoodCatalogEntry, InMemoryCatalog};
use physique_needs::db;
use physique_needs::nutrients::{Nutrient, NutrientVector};
use sqlx::postgres::PgPool;

/// Setup a test database connection pool
///
/// Returns None if DATABASE_URL is not set (graceful skip for integration tests)
pub async fn setup_test_database() -> Result<Option<PgPool>, Box<dyn std::error::Error>> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            println!("⚠️ Skipping database test - DATABASE_URL not set");
            return Ok(None);
        }
    };

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            println!("⚠️ Skipping database test - failed to connect: {}", e);
            return Ok(None);
        }
    };

    if let Err(e) = db::init_database_schema(&pool).await {
        println!("⚠️ Skipping database test - failed to init schema: {}", e);
        return Ok(None);
    }

    Ok(Some(pool))
}

/// Idli: 52 kcal per piece, counted per unit
pub fn idli_entry() -> FoodCatalogEntry {
    FoodCatalogEntry::new("idli", "idlis")
        .with_nutrients(
            NutrientVector::new()
                .with(Nutrient::Calories, 52.0)
                .with(Nutrient::Protein, 2.0)
                .with(Nutrient::Carbs, 11.0)
                .with(Nutrient::Fat, 0.4)
                .with(Nutrient::SodiumMg, 128.0)
                .with(Nutrient::VitaminB9Mcg, 4.0),
        )
        .with_unit_name("piece")
        .with_grams_per_unit(55.0)
        .with_per_100g(false)
        .with_max_units_per_day(6)
}

/// Rice: 130 kcal per 100 g, one cup is 200 g
pub fn rice_entry() -> FoodCatalogEntry {
    FoodCatalogEntry::new("rice", "rice")
        .with_nutrients(
            NutrientVector::new()
                .with(Nutrient::Calories, 130.0)
                .with(Nutrient::Protein, 2.7)
                .with(Nutrient::Carbs, 28.0)
                .with(Nutrient::Fat, 0.3)
                .with(Nutrient::VitaminB3Mg, 1.5),
        )
        .with_unit_name("cup")
        .with_grams_per_unit(200.0)
        .with_per_100g(true)
        .with_max_units_per_day(2)
}

pub fn banana_entry() -> FoodCatalogEntry {
    FoodCatalogEntry::new("banana", "bananas")
        .with_nutrients(
            NutrientVector::new()
                .with(Nutrient::Calories, 105.0)
                .with(Nutrient::Protein, 1.3)
                .with(Nutrient::Carbs, 27.0)
                .with(Nutrient::Fat, 0.4),
        )
        .with_unit_name("piece")
        .with_grams_per_unit(118.0)
        .with_max_units_per_day(2)
}

pub fn dosa_entry() -> FoodCatalogEntry {
    FoodCatalogEntry::new("dosa", "dosas")
        .with_nutrients(
            NutrientVector::new()
                .with(Nutrient::Calories, 133.0)
                .with(Nutrient::Protein, 3.9)
                .with(Nutrient::Carbs, 18.9)
                .with(Nutrient::Fat, 4.7),
        )
        .with_unit_name("piece")
        .with_grams_per_unit(80.0)
        .with_max_units_per_day(3)
}

pub fn egg_entry() -> FoodCatalogEntry {
    FoodCatalogEntry::new("egg", "eggs")
        .with_nutrients(
            NutrientVector::new()
                .with(Nutrient::Calories, 78.0)
                .with(Nutrient::Protein, 6.3)
                .with(Nutrient::Carbs, 0.6)
                .with(Nutrient::Fat, 5.3),
        )
        .with_unit_name("piece")
        .with_grams_per_unit(50.0)
        .with_max_units_per_day(3)
}

/// The five fixture foods, in a fixed order
pub fn fixture_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        idli_entry(),
        rice_entry(),
        banana_entry(),
        dosa_entry(),
        egg_entry(),
    ])
}

/// Generate a unique test user id
pub fn unique_user_id() -> i64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    (nanos % 1_000_000_000) as i64 + 1
}
