use anyhow::{Context, Result};
use chrono::{Duration, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use physique_needs::catalog::{self, InMemoryCatalog};
use physique_needs::config::AppConfig;
use physique_needs::db;
use physique_needs::errors::error_logging;
use physique_needs::observability;
use physique_needs::pipeline::NutritionPipeline;
use physique_needs::recommend::recommend_for_target;
use physique_needs::summary::{
    daily_totals, last_seven_days, DailySummary, Goal, MacroProgress, MacroTargets, WeeklySummary,
};
use physique_needs::validation::{validate_calorie_target, validate_user_id};
use serde::Serialize;
use sqlx::postgres::PgPool;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "physique-needs",
    about = "Turn meal descriptions into nutrient totals and keep a food log"
)]
struct Cli {
    /// Dump the Prometheus metrics snapshot to stderr before exiting
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse meal text into recognized items
    Parse { text: String },
    /// Parse meal text and compute nutrient totals
    Analyze { text: String },
    /// Analyze meal text and store it in the user's food log
    Log {
        #[arg(long)]
        user_id: i64,
        text: String,
    },
    /// Show the user's most recent food logs, newest first
    Logs {
        #[arg(long)]
        user_id: i64,
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(i64).range(1..=100))]
        limit: i64,
    },
    /// Today's intake against a calorie target
    Today {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        target: f64,
        #[arg(long, default_value = "maintain")]
        goal: Goal,
    },
    /// Last seven days against a calorie target
    Weekly {
        #[arg(long)]
        user_id: i64,
        #[arg(long)]
        target: f64,
    },
    /// Suggest whole-unit foods that approach a calorie target
    Recommend {
        #[arg(long)]
        target_calories: f64,
    },
    /// Create the database tables
    InitDb,
    /// Load the seed catalog file into the foods table
    SeedDb,
}

#[derive(Serialize)]
struct TodayReport {
    summary: DailySummary,
    macro_targets: MacroTargets,
    macro_progress: MacroProgress,
}

#[derive(Serialize)]
struct LoggedMeal<'a> {
    id: i64,
    #[serde(flatten)]
    entry: &'a physique_needs::FoodLogEntry,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn load_seed_catalog(config: &AppConfig) -> Result<InMemoryCatalog> {
    let catalog = match &config.catalog_path {
        Some(path) => catalog::load_catalog_from_path(path)?,
        None => catalog::load_catalog_seed()?,
    };
    Ok(catalog)
}

/// Catalog snapshot from the database when configured, otherwise from the seed file
async fn load_catalog(config: &AppConfig, pool: Option<&PgPool>) -> Result<InMemoryCatalog> {
    match pool {
        Some(pool) => db::load_food_catalog(pool).await,
        None => load_seed_catalog(config),
    }
}

async fn require_pool(config: &AppConfig, pool: Option<PgPool>) -> Result<PgPool> {
    match pool {
        Some(pool) => Ok(pool),
        None => db::connect(&config.database).await,
    }
}

async fn run(command: Command, config: &AppConfig) -> Result<()> {
    let pool = match config.database.url {
        Some(_) => Some(db::connect(&config.database).await?),
        None => None,
    };

    match command {
        Command::Parse { text } => {
            let catalog = load_catalog(config, pool.as_ref()).await?;
            let pipeline = NutritionPipeline::with_config(catalog, config.parser.clone());
            print_json(&pipeline.parse(&text)?)?;
        }
        Command::Analyze { text } => {
            let catalog = load_catalog(config, pool.as_ref()).await?;
            let pipeline = NutritionPipeline::with_config(catalog, config.parser.clone());
            print_json(&pipeline.analyze(&text)?)?;
        }
        Command::Log { user_id, text } => {
            let user_id = validate_user_id(user_id)?;
            let pool = require_pool(config, pool).await?;
            let catalog = db::load_food_catalog(&pool).await?;
            let pipeline = NutritionPipeline::with_config(catalog, config.parser.clone());

            let entry = pipeline.analyze(&text)?;
            let id = db::save_food_log(&pool, user_id, &entry).await?;
            print_json(&LoggedMeal { id, entry: &entry })?;
        }
        Command::Logs { user_id, limit } => {
            let user_id = validate_user_id(user_id)?;
            let pool = require_pool(config, pool).await?;
            print_json(&db::list_recent_food_logs(&pool, user_id, limit).await?)?;
        }
        Command::Today {
            user_id,
            target,
            goal,
        } => {
            let user_id = validate_user_id(user_id)?;
            let target = validate_calorie_target(target)?;
            let pool = require_pool(config, pool).await?;

            let start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
            let logs = db::list_food_logs_between(&pool, user_id, start, start + Duration::days(1))
                .await?;
            let consumed = daily_totals(&logs);
            let macro_targets = MacroTargets::from_calories(target);

            print_json(&TodayReport {
                summary: DailySummary::new(target, &consumed, goal),
                macro_progress: MacroProgress::new(&macro_targets, &consumed),
                macro_targets,
            })?;
        }
        Command::Weekly { user_id, target } => {
            let user_id = validate_user_id(user_id)?;
            let target = validate_calorie_target(target)?;
            let pool = require_pool(config, pool).await?;

            let today = Utc::now().date_naive();
            let start = (today - Duration::days(6)).and_time(NaiveTime::MIN).and_utc();
            let end = (today + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();
            let logs = db::list_food_logs_between(&pool, user_id, start, end).await?;

            print_json(&WeeklySummary::from_days(target, last_seven_days(&logs, today)))?;
        }
        Command::Recommend { target_calories } => {
            let catalog = load_catalog(config, pool.as_ref()).await?;
            print_json(&recommend_for_target(target_calories, catalog.entries())?)?;
        }
        Command::InitDb => {
            let pool = require_pool(config, pool).await?;
            db::init_database_schema(&pool).await?;
        }
        Command::SeedDb => {
            let pool = require_pool(config, pool).await?;
            db::init_database_schema(&pool).await?;

            let seed = load_seed_catalog(config)?;
            for entry in seed.entries() {
                db::insert_food(&pool, entry).await?;
            }
            info!(foods = seed.len(), "Seeded foods table");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    let metrics_handle = observability::init_observability(&config.observability)?;

    if let Err(e) = config.validate() {
        error_logging::log_config_error(&e, "environment", "validate_app_config");
        return Err(anyhow::anyhow!(
            "Configuration validation failed: {}. Please check your environment.",
            e
        ));
    }
    info!("{}", config.summary());

    let result = run(cli.command, &config).await;

    if cli.print_metrics {
        match &metrics_handle {
            Some(handle) => eprintln!("{}", handle.render()),
            None => eprintln!("# metrics disabled (ENABLE_METRICS=false)"),
        }
    }

    result
}
