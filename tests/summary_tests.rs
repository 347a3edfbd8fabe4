use chrono::{NaiveDate, TimeZone, Utc};
use physique_needs::db::StoredFoodLog;
use physique_needs::nutrients::{Nutrient, NutrientTotals};
use physique_needs::pipeline::FoodLogEntry;
use physique_needs::summary::{
    daily_totals, last_seven_days, DailySummary, Goal, WeeklySummary, WEEK_DAYS,
};

fn stored(id: i64, day: u32, hour: u32, calories: f64, protein: f64) -> StoredFoodLog {
    let mut totals = NutrientTotals::new();
    totals.set(Nutrient::Calories, calories);
    totals.set(Nutrient::Protein, protein);

    StoredFoodLog {
        id,
        user_id: 7,
        entry: FoodLogEntry {
            raw_text: format!("meal {}", id),
            items: Vec::new(),
            totals,
        },
        created_at: Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap(),
    }
}

#[test]
fn test_daily_totals_sum_all_logs() {
    let logs = vec![stored(1, 10, 8, 400.0, 12.5), stored(2, 10, 13, 650.5, 20.0)];
    let totals = daily_totals(&logs);
    assert_eq!(totals.calories(), 1050.5);
    assert_eq!(totals.protein(), 32.5);

    assert_eq!(daily_totals(&[]).calories(), 0.0);
}

#[test]
fn test_daily_summary_from_logs() {
    let logs = vec![stored(1, 10, 8, 1200.0, 40.0), stored(2, 10, 20, 1000.0, 30.0)];
    let summary = DailySummary::new(2000.0, &daily_totals(&logs), Goal::Gain);

    assert_eq!(summary.consumed, 2200.0);
    assert_eq!(summary.remaining, 0.0);
    assert_eq!(summary.exceeded, 200.0);
    assert_eq!(summary.advice[0], "You exceeded your daily calorie target.");
    assert_eq!(summary.advice.len(), 3);
}

#[test]
fn test_last_seven_days_groups_and_filters() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    let logs = vec![
        stored(1, 2, 9, 900.0, 0.0),   // eight days back, excluded
        stored(2, 4, 9, 1500.0, 0.0),  // first day of the window
        stored(3, 9, 8, 700.0, 0.0),
        stored(4, 9, 19, 800.0, 0.0),
        stored(5, 10, 12, 1900.0, 0.0),
    ];

    let days = last_seven_days(&logs, today);
    assert_eq!(days.len(), 3);
    assert_eq!(days[0].day, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());
    assert_eq!(days[1].totals.calories(), 1500.0);
    assert_eq!(days[2].day, today);
}

#[test]
fn test_weekly_summary_from_logs() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    let logs: Vec<StoredFoodLog> = (4..=10)
        .map(|day| stored(day as i64, day, 12, 1800.0 + day as f64 * 10.0, 50.0))
        .collect();

    let summary = WeeklySummary::from_days(1870.0, last_seven_days(&logs, today));

    assert_eq!(summary.days.len(), WEEK_DAYS);
    // 1840..=1900 by 10: four days at or under 1870
    assert_eq!(summary.days_met, 4);
    assert_eq!(summary.consistency_percent, 57);
    assert!(!summary.good_progress);
    assert_eq!(summary.average_calories, 1870.0);
    assert_eq!(summary.average_protein, 50.0);
}

#[test]
fn test_stored_log_json_is_flat() {
    let json = serde_json::to_value(stored(3, 10, 8, 400.0, 12.5)).unwrap();

    assert_eq!(json["id"], 3);
    assert_eq!(json["user_id"], 7);
    assert_eq!(json["raw_text"], "meal 3");
    assert_eq!(json["totals"]["calories"], 400.0);
    assert_eq!(json["created_at"], "2026-03-10T08:00:00Z");
}
