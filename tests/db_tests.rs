mod test_helpers;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use physique_needs::catalog::FoodCatalog;
use physique_needs::db::*;
use physique_needs::nutrients::Nutrient;
use physique_needs::pipeline::NutritionPipeline;
use sqlx::PgPool;
use test_helpers::*;

/// Helper macro to skip tests when database is not available
macro_rules! skip_if_no_db {
    ($test_fn:expr) => {
        match setup_test_database().await {
            Ok(Some(pool)) => $test_fn(&pool).await,
            Ok(None) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("Test database setup failed: {}", e)),
        }
    };
}

#[tokio::test]
async fn test_schema_init_is_idempotent() -> Result<()> {
    skip_if_no_db!(test_schema_init_is_idempotent_impl)
}

async fn test_schema_init_is_idempotent_impl(pool: &PgPool) -> Result<()> {
    init_database_schema(pool).await?;
    init_database_schema(pool).await?;
    Ok(())
}

#[tokio::test]
async fn test_food_catalog_round_trip() -> Result<()> {
    skip_if_no_db!(test_food_catalog_round_trip_impl)
}

async fn test_food_catalog_round_trip_impl(pool: &PgPool) -> Result<()> {
    let suffix = unique_user_id();
    let mut rice = rice_entry();
    rice.name_singular = format!("rice{}", suffix);
    rice.name_plural = rice.name_singular.clone();
    rice = rice.with_pros_and_cons("Cheap energy", "Low fiber");

    let id = insert_food(pool, &rice).await?;
    // Upsert keeps the same row
    assert_eq!(insert_food(pool, &rice).await?, id);

    let catalog = load_food_catalog(pool).await?;
    let loaded = catalog
        .lookup_exact(&rice.name_singular)?
        .context("inserted food should be in the catalog")?;

    assert!(loaded.per_100g);
    assert_eq!(loaded.grams_per_unit, Some(200.0));
    assert_eq!(loaded.max_units_per_day, Some(2));
    assert_eq!(loaded.nutrients.get(Nutrient::Calories), Some(130.0));
    assert_eq!(loaded.nutrients.get(Nutrient::VitaminB3Mg), Some(1.5));
    assert_eq!(loaded.nutrients.get(Nutrient::VitaminKMcg), None);
    assert_eq!(loaded.pros.as_deref(), Some("Cheap energy"));
    assert_eq!(loaded.cons.as_deref(), Some("Low fiber"));

    sqlx::query("DELETE FROM foods WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_invalid_food_rows_are_skipped_on_load() -> Result<()> {
    skip_if_no_db!(test_invalid_food_rows_are_skipped_on_load_impl)
}

async fn test_invalid_food_rows_are_skipped_on_load_impl(pool: &PgPool) -> Result<()> {
    let suffix = unique_user_id();
    let mut egg = egg_entry();
    egg.name_singular = format!("egg{}", suffix);
    egg.name_plural = format!("eggs{}", suffix);
    egg.nutrients.set(Nutrient::Fat, Some(-5.3));

    let id = insert_food(pool, &egg).await?;
    let catalog = load_food_catalog(pool).await?;
    assert!(catalog.lookup_exact(&egg.name_singular)?.is_none());

    sqlx::query("DELETE FROM foods WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_food_log_operations() -> Result<()> {
    skip_if_no_db!(test_food_log_operations_impl)
}

async fn test_food_log_operations_impl(pool: &PgPool) -> Result<()> {
    let user_id = unique_user_id();
    let pipeline = NutritionPipeline::new(fixture_catalog());

    let breakfast = pipeline.analyze("4 idlis")?;
    let lunch = pipeline.analyze("2 cup rice and 1 egg")?;

    let first = save_food_log(pool, user_id, &breakfast).await?;
    let second = save_food_log(pool, user_id, &lunch).await?;
    assert!(second > first);

    let recent = list_recent_food_logs(pool, user_id, 10).await?;
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, second);
    assert_eq!(recent[0].entry, lunch);
    assert_eq!(recent[1].entry.totals.calories(), 208.0);

    let json = serde_json::to_value(&recent[0])?;
    assert_eq!(json["id"], second);
    assert_eq!(json["raw_text"], "2 cup rice and 1 egg");
    assert!(json["created_at"].is_string());
    assert!(json["totals"]["calories"].is_number());

    let limited = list_recent_food_logs(pool, user_id, 1).await?;
    assert_eq!(limited.len(), 1);

    let now = Utc::now();
    let window = list_food_logs_between(
        pool,
        user_id,
        now - Duration::hours(1),
        now + Duration::hours(1),
    )
    .await?;
    assert_eq!(window.len(), 2);
    assert_eq!(window[0].id, first);

    let past = list_food_logs_between(
        pool,
        user_id,
        now - Duration::days(3),
        now - Duration::days(2),
    )
    .await?;
    assert!(past.is_empty());

    sqlx::query("DELETE FROM user_food_logs WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
