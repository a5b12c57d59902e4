//! Timer settings
//!
//! Durations, the long-break goal, auto-start toggles and the alarm choice.
//! The persisted field names match the blobs written by earlier versions of
//! the app (`pomodoroTime`, `shortBreakTime`, ...).

use serde::{Deserialize, Serialize};

use crate::session::Mode;

/// Alarm sound played when a session expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSound {
    #[default]
    Bell,
    Digital,
    Kitchen,
    Bird,
}

impl AlarmSound {
    pub const ALL: [AlarmSound; 4] = [
        AlarmSound::Bell,
        AlarmSound::Digital,
        AlarmSound::Kitchen,
        AlarmSound::Bird,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSound::Bell => "bell",
            AlarmSound::Digital => "digital",
            AlarmSound::Kitchen => "kitchen",
            AlarmSound::Bird => "bird",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bell" => Some(AlarmSound::Bell),
            "digital" => Some(AlarmSound::Digital),
            "kitchen" => Some(AlarmSound::Kitchen),
            "bird" => Some(AlarmSound::Bird),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            AlarmSound::Bell => "Bell",
            AlarmSound::Digital => "Digital",
            AlarmSound::Kitchen => "Kitchen Timer",
            AlarmSound::Bird => "Bird",
        }
    }
}

pub const DEFAULT_ALARM_VOLUME: f64 = 0.7;

/// Longest duration whose length in seconds still fits the countdown
pub const MAX_MINUTES: u32 = u32::MAX / 60;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Focus duration in minutes
    #[serde(rename = "pomodoroTime", alias = "pomodoroMinutes")]
    pub pomodoro_minutes: u32,
    /// Short break duration in minutes
    #[serde(rename = "shortBreakTime", alias = "shortBreakMinutes")]
    pub short_break_minutes: u32,
    /// Long break duration in minutes
    #[serde(rename = "longBreakTime", alias = "longBreakMinutes")]
    pub long_break_minutes: u32,
    /// Focus sessions per long-break cycle
    pub pomodoro_goal: u32,
    pub auto_start_breaks: bool,
    pub auto_start_pomodoros: bool,
    pub alarm_sound: AlarmSound,
    /// Alarm volume in [0, 1]
    pub alarm_volume: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pomodoro_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            pomodoro_goal: 4,
            auto_start_breaks: true,
            auto_start_pomodoros: true,
            alarm_sound: AlarmSound::Bell,
            alarm_volume: DEFAULT_ALARM_VOLUME,
        }
    }
}

impl SessionConfig {
    /// Duration of a mode in minutes
    pub fn minutes_for(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Focus => self.pomodoro_minutes,
            Mode::ShortBreak => self.short_break_minutes,
            Mode::LongBreak => self.long_break_minutes,
        }
    }

    /// Duration of a mode in seconds. Exact for normalized settings.
    pub fn seconds_for(&self, mode: Mode) -> u32 {
        self.minutes_for(mode).saturating_mul(60)
    }

    /// Coerce out-of-range values: durations into 1..=[`MAX_MINUTES`], goal
    /// to at least 1, volume into [0, 1]
    pub fn normalized(mut self) -> Self {
        self.pomodoro_minutes = self.pomodoro_minutes.clamp(1, MAX_MINUTES);
        self.short_break_minutes = self.short_break_minutes.clamp(1, MAX_MINUTES);
        self.long_break_minutes = self.long_break_minutes.clamp(1, MAX_MINUTES);
        self.pomodoro_goal = self.pomodoro_goal.max(1);
        self.alarm_volume = if self.alarm_volume.is_nan() {
            DEFAULT_ALARM_VOLUME
        } else {
            self.alarm_volume.clamp(0.0, 1.0)
        };
        self
    }
}

/// Parse a minutes/goal field the way the settings form does: take the
/// leading integer, fall back to 1 when there is none, never go below 1.
/// Values too large for a `u32` saturate.
pub fn coerce_minutes(input: &str) -> u32 {
    let trimmed = input.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let leading: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if leading.is_empty() || negative {
        return 1;
    }

    // Only overflow can fail here, the string is all digits
    let value = leading.parse::<u64>().unwrap_or(u64::MAX);
    u32::try_from(value).unwrap_or(u32::MAX).max(1)
}
