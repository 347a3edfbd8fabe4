//! # Intake Summaries
//!
//! Daily, macro and weekly views over stored food logs, measured against an
//! externally supplied calorie target.

use crate::db::StoredFoodLog;
use crate::errors::AppError;
use crate::nutrients::{round_to, NutrientTotals, TOTALS_PRECISION};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Days covered by a weekly summary
pub const WEEK_DAYS: usize = 7;

/// Met days needed for a week to count as good progress
pub const GOOD_WEEK_MIN_DAYS: usize = 5;

/// The user's body-composition goal, used to pick advice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Loss,
    Gain,
    #[default]
    Maintain,
}

impl FromStr for Goal {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "loss" | "lose" => Ok(Goal::Loss),
            "gain" => Ok(Goal::Gain),
            "maintain" | "maintenance" => Ok(Goal::Maintain),
            other => Err(AppError::Validation(format!(
                "Unknown goal '{}'. Must be one of: loss, gain, maintain",
                other
            ))),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Goal::Loss => "loss",
            Goal::Gain => "gain",
            Goal::Maintain => "maintain",
        };
        f.write_str(name)
    }
}

/// Sum the totals of a set of stored logs
pub fn daily_totals(logs: &[StoredFoodLog]) -> NutrientTotals {
    let mut totals = NutrientTotals::new();
    for log in logs {
        totals.accumulate(&log.entry.totals);
    }
    totals.rounded(TOTALS_PRECISION)
}

/// Advice lines for a day's intake
pub fn generate_advice(consumed: f64, target: f64, goal: Goal) -> Vec<String> {
    let mut advice = Vec::new();

    if consumed > target {
        advice.push("You exceeded your daily calorie target.".to_string());
    } else {
        advice.push("Calories are under control.".to_string());
    }

    match goal {
        Goal::Loss => {
            advice.push("Avoid rice at night.".to_string());
            advice.push("Increase protein intake.".to_string());
        }
        Goal::Gain => {
            advice.push("Increase protein & carbs.".to_string());
            advice.push("Add banana post-workout.".to_string());
        }
        Goal::Maintain => {}
    }

    advice
}

/// Today's intake against the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub daily_target: f64,
    pub consumed: f64,
    pub remaining: f64,
    pub exceeded: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub advice: Vec<String>,
}

impl DailySummary {
    pub fn new(target: f64, consumed: &NutrientTotals, goal: Goal) -> Self {
        let calories = consumed.calories();
        let remaining = target - calories;

        Self {
            daily_target: target,
            consumed: calories,
            remaining: remaining.max(0.0),
            exceeded: (-remaining).max(0.0),
            protein: round_to(consumed.protein(), 2),
            carbs: round_to(consumed.carbs(), 2),
            fat: round_to(consumed.fat(), 2),
            advice: generate_advice(calories, target, goal),
        }
    }
}

/// Daily macro targets derived from a calorie target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl MacroTargets {
    /// Split calories 25/45/30 across protein, carbs and fat, in grams
    pub fn from_calories(target: f64) -> Self {
        Self {
            calories: target,
            protein: round_to(target * 0.25 / 4.0, 1),
            carbs: round_to(target * 0.45 / 4.0, 1),
            fat: round_to(target * 0.30 / 9.0, 1),
        }
    }
}

/// Whole-number percent of target reached, capped at 100
pub fn progress_percent(value: f64, target: f64) -> u32 {
    if target <= 0.0 {
        return 0;
    }
    let percent = (value / target * 100.0).trunc();
    percent.clamp(0.0, 100.0) as u32
}

/// Percent of each macro target reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroProgress {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl MacroProgress {
    pub fn new(targets: &MacroTargets, consumed: &NutrientTotals) -> Self {
        Self {
            calories: progress_percent(consumed.calories(), targets.calories),
            protein: progress_percent(consumed.protein(), targets.protein),
            carbs: progress_percent(consumed.carbs(), targets.carbs),
            fat: progress_percent(consumed.fat(), targets.fat),
        }
    }
}

/// Totals for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: NaiveDate,
    pub totals: NutrientTotals,
}

/// Group logs by calendar day of `created_at`, keeping only the seven days ending `today`
pub fn last_seven_days(logs: &[StoredFoodLog], today: NaiveDate) -> Vec<DaySummary> {
    let first_day = today - Duration::days(WEEK_DAYS as i64 - 1);
    let mut by_day: BTreeMap<NaiveDate, NutrientTotals> = BTreeMap::new();

    for log in logs {
        let day = log.created_at.date_naive();
        if day < first_day || day > today {
            continue;
        }
        by_day
            .entry(day)
            .or_default()
            .accumulate(&log.entry.totals);
    }

    by_day
        .into_iter()
        .map(|(day, totals)| DaySummary {
            day,
            totals: totals.rounded(TOTALS_PRECISION),
        })
        .collect()
}

/// Seven-day averages and consistency against the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub average_calories: f64,
    pub average_protein: f64,
    pub average_carbs: f64,
    pub average_fat: f64,
    pub consistency_percent: u32,
    pub days_met: usize,
    pub good_progress: bool,
    pub status: String,
    pub days: Vec<DaySummary>,
}

impl WeeklySummary {
    /// Averages divide by seven regardless of how many days have logs
    pub fn from_days(target: f64, days: Vec<DaySummary>) -> Self {
        let average = |value: fn(&NutrientTotals) -> f64| {
            round_to(
                days.iter().map(|d| value(&d.totals)).sum::<f64>() / WEEK_DAYS as f64,
                2,
            )
        };

        let days_met = days
            .iter()
            .filter(|d| d.totals.calories() > 0.0 && d.totals.calories() <= target)
            .count();
        let good_progress = days_met >= GOOD_WEEK_MIN_DAYS;

        Self {
            average_calories: average(NutrientTotals::calories),
            average_protein: average(NutrientTotals::protein),
            average_carbs: average(NutrientTotals::carbs),
            average_fat: average(NutrientTotals::fat),
            consistency_percent: (days_met * 100 / WEEK_DAYS) as u32,
            days_met,
            good_progress,
            status: if good_progress {
                "Good progress".to_string()
            } else {
                "Needs improvement".to_string()
            },
            days,
        }
    }
}
