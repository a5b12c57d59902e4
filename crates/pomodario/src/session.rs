//! Session state machine
//!
//! Pure transitions over the countdown: which mode is active, how much time
//! is left, and whether it is counting. Side effects (alarms, statistics,
//! tick scheduling) are applied by [`crate::timer::Timer`].

use serde::{Deserialize, Serialize};

use crate::settings::SessionConfig;

/// Timer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    /// Work interval ("pomodoro")
    #[serde(rename = "pomodoro")]
    Focus,
    ShortBreak,
    LongBreak,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::ShortBreak => "short",
            Mode::LongBreak => "long",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "focus" | "pomodoro" | "f" => Some(Mode::Focus),
            "short" | "shortbreak" | "short-break" | "s" => Some(Mode::ShortBreak),
            "long" | "longbreak" | "long-break" | "l" => Some(Mode::LongBreak),
            _ => None,
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "Pomodoro",
            Mode::ShortBreak => "Short Break",
            Mode::LongBreak => "Long Break",
        }
    }

    /// Encouragement shown under the clock
    pub fn prompt(&self) -> &'static str {
        match self {
            Mode::Focus => "Time to focus!",
            Mode::ShortBreak => "Take a short break!",
            Mode::LongBreak => "Take a long break!",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Mode::Focus)
    }
}

/// Result of an expiry transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expiry {
    /// Mode whose countdown reached zero
    pub finished: Mode,
    /// Mode entered afterwards
    pub next: Mode,
    /// Whether the next mode started counting on its own
    pub auto_started: bool,
}

/// Live countdown state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub mode: Mode,
    pub seconds_remaining: u32,
    pub running: bool,
    pub paused: bool,
    /// Focus sessions completed since startup; decides short vs long break
    pub completed_focus_in_cycle: u32,
}

impl SessionState {
    /// A stopped Focus session at full duration
    pub fn new(config: &SessionConfig) -> Self {
        Self::in_mode(Mode::Focus, config)
    }

    /// A stopped session in `mode` at full duration
    pub fn in_mode(mode: Mode, config: &SessionConfig) -> Self {
        Self {
            mode,
            seconds_remaining: config.seconds_for(mode),
            running: false,
            paused: false,
            completed_focus_in_cycle: 0,
        }
    }

    /// Whether a tick source should be active
    pub fn is_counting(&self) -> bool {
        self.running && !self.paused && self.seconds_remaining > 0
    }

    /// Whether the countdown has run out while running
    pub fn is_expired(&self) -> bool {
        self.running && self.seconds_remaining == 0
    }

    /// Stop and enter `target` at its full duration
    pub fn switch_to(&mut self, target: Mode, config: &SessionConfig) {
        self.mode = target;
        self.seconds_remaining = config.seconds_for(target);
        self.running = false;
        self.paused = false;
    }

    /// Pause when running, otherwise start or resume
    pub fn toggle_run(&mut self) {
        if self.running {
            self.running = false;
            self.paused = true;
        } else {
            self.running = true;
            self.paused = false;
        }
    }

    /// Stop and restore the full duration of the current mode
    pub fn reset(&mut self, config: &SessionConfig) {
        self.switch_to(self.mode, config);
    }

    /// Count down one second. Returns false when not counting.
    pub fn tick(&mut self) -> bool {
        if !self.is_counting() {
            return false;
        }
        self.seconds_remaining -= 1;
        true
    }

    /// Leave an expired mode for the next one in the cycle.
    pub fn complete(&mut self, config: &SessionConfig) -> Expiry {
        let finished = self.mode;

        let (next, auto_start) = match finished {
            Mode::Focus => {
                self.completed_focus_in_cycle += 1;
                let goal = config.pomodoro_goal.max(1);
                if self.completed_focus_in_cycle % goal == 0 {
                    (Mode::LongBreak, config.auto_start_breaks)
                } else {
                    (Mode::ShortBreak, config.auto_start_breaks)
                }
            }
            Mode::ShortBreak | Mode::LongBreak => (Mode::Focus, config.auto_start_pomodoros),
        };

        self.mode = next;
        self.seconds_remaining = config.seconds_for(next);
        self.running = auto_start;
        self.paused = false;

        Expiry {
            finished,
            next,
            auto_started: auto_start,
        }
    }

    /// Follow a settings change: the current mode restarts at its new
    /// duration when that duration changed. Returns whether it did.
    pub fn apply_config(&mut self, old: &SessionConfig, new: &SessionConfig) -> bool {
        if old.seconds_for(self.mode) == new.seconds_for(self.mode) {
            return false;
        }
        self.seconds_remaining = new.seconds_for(self.mode);
        true
    }

    /// Elapsed share of the current mode, 0-100, against the configured
    /// duration
    pub fn progress_percent(&self, config: &SessionConfig) -> f64 {
        let total = config.seconds_for(self.mode);
        if total == 0 {
            return 100.0;
        }
        let elapsed = total.saturating_sub(self.seconds_remaining);
        (elapsed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }
}
