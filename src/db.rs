use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use std::time::{Duration, Instant};
use tracing::{debug, info, Instrument};

use crate::catalog::{FoodCatalogEntry, InMemoryCatalog};
use crate::config::DatabaseConfig;
use crate::errors::error_logging;
use crate::nutrients::{Nutrient, NutrientTotals, NutrientVector};
use crate::observability::{db_span, record_db_metrics};
use crate::pipeline::FoodLogEntry;
use crate::recognition::ParsedItem;

/// Leading non-nutrient columns of the `foods` table, in select order
const FOOD_BASE_COLUMNS: [&str; 8] = [
    "food_name_singular",
    "food_name_plural",
    "unit_name",
    "grams_per_unit",
    "per_100g",
    "max_units_per_day",
    "pros",
    "cons",
];

/// A meal log as stored in `user_food_logs`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredFoodLog {
    pub id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub entry: FoodLogEntry,
    pub created_at: DateTime<Utc>,
}

/// Open a connection pool using the configured limits
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let url = config
        .url
        .as_deref()
        .context("DATABASE_URL must be set for this command")?;

    info!(
        max_connections = config.max_connections,
        "Connecting to PostgreSQL"
    );

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(url)
        .await
        .map_err(|e| {
            error_logging::log_database_error(&e, "connect", None, None);
            e
        })
        .context("Failed to connect to PostgreSQL")
}

fn nutrient_columns() -> impl Iterator<Item = &'static str> {
    Nutrient::ALL.iter().map(|nutrient| nutrient.catalog_column())
}

fn food_columns() -> Vec<&'static str> {
    FOOD_BASE_COLUMNS
        .iter()
        .copied()
        .chain(nutrient_columns())
        .collect()
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema");

    let nutrient_ddl: String = nutrient_columns()
        .map(|column| format!(",\n            {} DOUBLE PRECISION", column))
        .collect();

    // Create foods table
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS foods (
            id BIGSERIAL PRIMARY KEY,
            food_name_singular VARCHAR(255) UNIQUE NOT NULL,
            food_name_plural VARCHAR(255),
            unit_name VARCHAR(50),
            grams_per_unit DOUBLE PRECISION,
            per_100g BOOLEAN NOT NULL DEFAULT FALSE,
            max_units_per_day INTEGER,
            pros TEXT,
            cons TEXT{}
        )",
        nutrient_ddl
    ))
    .execute(pool)
    .await
    .context("Failed to create foods table")?;

    // Tables created before the plan notes existed
    sqlx::query("ALTER TABLE foods ADD COLUMN IF NOT EXISTS pros TEXT, ADD COLUMN IF NOT EXISTS cons TEXT")
        .execute(pool)
        .await
        .context("Failed to add plan note columns to foods")?;

    // Create user_food_logs table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS user_food_logs (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL,
            raw_text TEXT NOT NULL,
            parsed_json JSONB NOT NULL,
            totals_json JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create user_food_logs table")?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS user_food_logs_user_created_idx ON user_food_logs(user_id, created_at)",
    )
    .execute(pool)
    .await
    .context("Failed to create user_food_logs index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

fn entry_from_row(row: &PgRow) -> Result<FoodCatalogEntry> {
    let name_singular: String = row.try_get(0).context("Invalid food_name_singular")?;
    let name_plural: Option<String> = row.try_get(1).context("Invalid food_name_plural")?;
    let unit_name: Option<String> = row.try_get(2).context("Invalid unit_name")?;
    let grams_per_unit: Option<f64> = row.try_get(3).context("Invalid grams_per_unit")?;
    let per_100g: bool = row.try_get(4).context("Invalid per_100g")?;
    let max_units_per_day: Option<i32> = row.try_get(5).context("Invalid max_units_per_day")?;
    let pros: Option<String> = row.try_get(6).context("Invalid pros")?;
    let cons: Option<String> = row.try_get(7).context("Invalid cons")?;

    let mut nutrients = NutrientVector::new();
    for (offset, nutrient) in Nutrient::ALL.iter().enumerate() {
        let value: Option<f64> = row
            .try_get(FOOD_BASE_COLUMNS.len() + offset)
            .with_context(|| format!("Invalid {}", nutrient.catalog_column()))?;
        nutrients.set(*nutrient, value);
    }

    let name_plural = name_plural
        .filter(|plural| !plural.trim().is_empty())
        .unwrap_or_else(|| name_singular.clone());

    Ok(FoodCatalogEntry {
        name_singular,
        name_plural,
        unit_name,
        nutrients,
        grams_per_unit,
        per_100g,
        max_units_per_day: max_units_per_day.and_then(|max| u32::try_from(max).ok()),
        pros,
        cons,
    })
}

/// Load the whole `foods` table as an in-memory catalog snapshot, ordered by id
pub async fn load_food_catalog(pool: &PgPool) -> Result<InMemoryCatalog> {
    let start = Instant::now();
    let sql = format!("SELECT {} FROM foods ORDER BY id", food_columns().join(", "));

    let rows = sqlx::query(&sql)
        .fetch_all(pool)
        .instrument(db_span("load_food_catalog", "foods"))
        .await
        .map_err(|e| {
            error_logging::log_database_error(&e, "load_food_catalog", None, None);
            e
        })
        .context("Failed to load food catalog")?;

    let entries = rows.iter().map(entry_from_row).collect::<Result<Vec<_>>>()?;
    let catalog = InMemoryCatalog::from_checked(entries);

    record_db_metrics("load_food_catalog", start.elapsed());
    info!(foods = catalog.len(), "Loaded food catalog from database");
    Ok(catalog)
}

/// Insert or update a catalog row keyed on its singular name
pub async fn insert_food(pool: &PgPool, entry: &FoodCatalogEntry) -> Result<i64> {
    debug!(food = %entry.name_singular, "Upserting catalog food");

    let columns = food_columns();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    let updates: Vec<String> = columns
        .iter()
        .skip(1)
        .map(|column| format!("{} = EXCLUDED.{}", column, column))
        .collect();
    let sql = format!(
        "INSERT INTO foods ({}) VALUES ({}) ON CONFLICT (food_name_singular) DO UPDATE SET {} RETURNING id",
        columns.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    );

    let mut query = sqlx::query(&sql)
        .bind(&entry.name_singular)
        .bind(&entry.name_plural)
        .bind(&entry.unit_name)
        .bind(entry.grams_per_unit)
        .bind(entry.per_100g)
        .bind(
            entry
                .max_units_per_day
                .map(|max| i32::try_from(max).unwrap_or(i32::MAX)),
        )
        .bind(&entry.pros)
        .bind(&entry.cons);
    for nutrient in Nutrient::ALL {
        query = query.bind(entry.nutrients.get(nutrient));
    }

    let row = query
        .fetch_one(pool)
        .await
        .map_err(|e| {
            error_logging::log_database_error(
                &e,
                "insert_food",
                None,
                Some(&[("food", &entry.name_singular)]),
            );
            e
        })
        .with_context(|| format!("Failed to insert food '{}'", entry.name_singular))?;

    let food_id: i64 = row.get(0);
    debug!(food_id = %food_id, "Catalog food stored");
    Ok(food_id)
}

/// Persist one analyzed meal for a user
pub async fn save_food_log(pool: &PgPool, user_id: i64, entry: &FoodLogEntry) -> Result<i64> {
    debug!(user_id = %user_id, items = entry.items.len(), "Saving food log");
    let start = Instant::now();

    let row = sqlx::query(
        "INSERT INTO user_food_logs (user_id, raw_text, parsed_json, totals_json) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(user_id)
    .bind(&entry.raw_text)
    .bind(Json(&entry.items))
    .bind(Json(&entry.totals))
    .fetch_one(pool)
    .instrument(db_span("save_food_log", "user_food_logs"))
    .await
    .map_err(|e| {
        error_logging::log_database_error(&e, "save_food_log", Some(user_id), None);
        e
    })
    .context("Failed to insert food log")?;

    let log_id: i64 = row.get(0);
    record_db_metrics("save_food_log", start.elapsed());
    info!(user_id = %user_id, log_id = %log_id, "Food log saved");
    Ok(log_id)
}

fn log_from_row(row: &PgRow) -> Result<StoredFoodLog> {
    let items: Json<Vec<ParsedItem>> = row.try_get(3).context("Invalid parsed_json")?;
    let totals: Json<NutrientTotals> = row.try_get(4).context("Invalid totals_json")?;

    Ok(StoredFoodLog {
        id: row.try_get(0).context("Invalid id")?,
        user_id: row.try_get(1).context("Invalid user_id")?,
        entry: FoodLogEntry {
            raw_text: row.try_get(2).context("Invalid raw_text")?,
            items: items.0,
            totals: totals.0,
        },
        created_at: row.try_get(5).context("Invalid created_at")?,
    })
}

/// List a user's most recent logs, newest first
pub async fn list_recent_food_logs(
    pool: &PgPool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<StoredFoodLog>> {
    debug!(user_id = %user_id, limit = %limit, "Listing recent food logs");
    let start = Instant::now();

    let rows = sqlx::query(
        "SELECT id, user_id, raw_text, parsed_json, totals_json, created_at
         FROM user_food_logs
         WHERE user_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT $2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        error_logging::log_database_error(
            &e,
            "list_recent_food_logs",
            Some(user_id),
            Some(&[("limit", &limit)]),
        );
        e
    })
    .context("Failed to list recent food logs")?;

    let logs = rows.iter().map(log_from_row).collect::<Result<Vec<_>>>()?;
    record_db_metrics("list_recent_food_logs", start.elapsed());
    Ok(logs)
}

/// List a user's logs with `from <= created_at < to`, oldest first
pub async fn list_food_logs_between(
    pool: &PgPool,
    user_id: i64,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<StoredFoodLog>> {
    debug!(user_id = %user_id, from = %from, to = %to, "Listing food logs in range");
    let start = Instant::now();

    let rows = sqlx::query(
        "SELECT id, user_id, raw_text, parsed_json, totals_json, created_at
         FROM user_food_logs
         WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
         ORDER BY created_at, id",
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        error_logging::log_database_error(&e, "list_food_logs_between", Some(user_id), None);
        e
    })
    .context("Failed to list food logs in range")?;

    let logs = rows.iter().map(log_from_row).collect::<Result<Vec<_>>>()?;
    record_db_metrics("list_food_logs_between", start.elapsed());
    Ok(logs)
}
