use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;

pub const QUALIFYING_DAY_STEPS: u64 = 10_000;
pub const STREAK_MIN_DAILY_STEPS: u64 = 1;
pub const STREAK_MAX_DAYS: u32 = 365;

pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn day_key(ts_seconds: i64) -> String {
    Utc.timestamp_opt(ts_seconds, 0)
        .single()
        .map(|dt| dt.date_naive().format(DAY_KEY_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Consecutive calendar days with any counted activity, walking backward
/// from `today` (or yesterday when today is empty), capped at one year.
pub fn calculate_streak(daily_steps: &BTreeMap<String, u64>, today: NaiveDate) -> u32 {
    if daily_steps.is_empty() {
        return 0;
    }

    let steps_on = |day: NaiveDate| -> u64 {
        daily_steps
            .get(&day.format(DAY_KEY_FORMAT).to_string())
            .copied()
            .unwrap_or(0)
    };

    let mut day = if steps_on(today) >= STREAK_MIN_DAILY_STEPS {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while streak < STREAK_MAX_DAYS && steps_on(day) >= STREAK_MIN_DAILY_STEPS {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

/// Days whose aggregate met the 10,000-step qualifying threshold.
pub fn goal_days(daily_steps: &BTreeMap<String, u64>) -> u32 {
    daily_steps
        .values()
        .filter(|steps| **steps >= QUALIFYING_DAY_STEPS)
        .count() as u32
}

/// Stable descending rank over totals; equal totals keep their input order.
/// Returns 1-based ranks aligned with the reordered totals.
pub fn rank_by_total(totals: &[u64]) -> Vec<(u32, usize)> {
    let mut order: Vec<usize> = (0..totals.len()).collect();
    order.sort_by(|a, b| totals[*b].cmp(&totals[*a]));
    order
        .into_iter()
        .enumerate()
        .map(|(position, index)| (position as u32 + 1, index))
        .collect()
}
