//! Focus statistics
//!
//! Lifetime counters plus a per-day tally of completed focus sessions.
//! Everything except [`StatsRecord::record_focus`] is a pure read over the
//! record:
//! - today's and this week's counts
//! - the last N days as chart rows
//! - achievement thresholds

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Persisted statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsRecord {
    /// Lifetime completed focus sessions
    pub completed_pomodoros: u64,
    /// Lifetime focus time in seconds
    pub total_focus_time: u64,
    /// Completed focus sessions per ISO date (`YYYY-MM-DD`)
    pub daily_pomodoros: BTreeMap<String, u64>,
}

/// One chart row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    /// Short weekday name ("Mon", "Tue", ...)
    pub label: String,
    pub count: u64,
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl StatsRecord {
    /// Count one completed focus session of `seconds` on `date`
    pub fn record_focus(&mut self, date: NaiveDate, seconds: u64) {
        self.completed_pomodoros += 1;
        self.total_focus_time += seconds;
        *self.daily_pomodoros.entry(date_key(date)).or_insert(0) += 1;
    }

    /// Sessions completed on `date`
    pub fn count_on(&self, date: NaiveDate) -> u64 {
        self.daily_pomodoros.get(&date_key(date)).copied().unwrap_or(0)
    }

    pub fn today_count(&self, today: NaiveDate) -> u64 {
        self.count_on(today)
    }

    /// Sessions over the 7 calendar days ending `today`
    pub fn week_count(&self, today: NaiveDate) -> u64 {
        (0..7).map(|i| self.count_on(today - Duration::days(i))).sum()
    }

    /// The `days` days ending `today`, oldest first
    pub fn daily_series(&self, today: NaiveDate, days: u32) -> Vec<DayCount> {
        (0..days as i64)
            .rev()
            .map(|i| {
                let date = today - Duration::days(i);
                DayCount {
                    date,
                    label: date.format("%a").to_string(),
                    count: self.count_on(date),
                }
            })
            .collect()
    }

    /// Whether the lifetime counter matches the daily tally. History from
    /// before daily tracking can make this false.
    pub fn is_consistent(&self) -> bool {
        self.completed_pomodoros == self.daily_pomodoros.values().sum::<u64>()
    }

    /// Achievements unlocked as of `today`
    pub fn achievements(&self, today: NaiveDate) -> Vec<Achievement> {
        Achievement::ALL
            .into_iter()
            .filter(|a| a.is_unlocked(self, today))
            .collect()
    }
}

/// Milestones shown with the statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    FirstPomodoro,
    GettingStarted,
    FocusMaster,
    PomodoroPro,
    ProductiveDay,
    ProductiveWeek,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstPomodoro,
        Achievement::GettingStarted,
        Achievement::FocusMaster,
        Achievement::PomodoroPro,
        Achievement::ProductiveDay,
        Achievement::ProductiveWeek,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstPomodoro => "First Pomodoro",
            Achievement::GettingStarted => "Getting Started",
            Achievement::FocusMaster => "Focus Master",
            Achievement::PomodoroPro => "Pomodoro Pro",
            Achievement::ProductiveDay => "Productive Day",
            Achievement::ProductiveWeek => "Productive Week",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstPomodoro => "Completed your first pomodoro",
            Achievement::GettingStarted => "Completed 10 pomodoros",
            Achievement::FocusMaster => "Completed 50 pomodoros",
            Achievement::PomodoroPro => "Completed 100 pomodoros",
            Achievement::ProductiveDay => "Completed 8 pomodoros in a day",
            Achievement::ProductiveWeek => "Completed 25 pomodoros in a week",
        }
    }

    pub fn is_unlocked(&self, stats: &StatsRecord, today: NaiveDate) -> bool {
        match self {
            Achievement::FirstPomodoro => stats.completed_pomodoros >= 1,
            Achievement::GettingStarted => stats.completed_pomodoros >= 10,
            Achievement::FocusMaster => stats.completed_pomodoros >= 50,
            Achievement::PomodoroPro => stats.completed_pomodoros >= 100,
            Achievement::ProductiveDay => stats.today_count(today) >= 8,
            Achievement::ProductiveWeek => stats.week_count(today) >= 25,
        }
    }
}
