//! pomodario - Pomodoro timer with task tracking and focus statistics
//!
//! "One thing at a time, twenty-five minutes at a time."
//!
//! The library holds the timer core:
//! - A countdown cycling through focus, short break and long break
//! - A task checklist kept next to the timer
//! - Lifetime and per-day statistics with achievements
//! - Settings for durations, auto-start and the alarm
//!
//! Storage, tick scheduling, alarms, notifications and the clock are ports
//! ([`Storage`], [`Scheduler`], [`AlarmPlayer`], [`Notifier`], [`Clock`])
//! so the state machine runs the same under tests as in the CLI.

pub mod alert;
pub mod clock;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod store;
pub mod tasks;
pub mod timer;

pub use alert::{Alert, AlarmPlayer, DesktopNotifier, Notifier, SoundFilePlayer};
pub use clock::{Clock, FixedClock, SystemClock};
pub use scheduler::{ManualScheduler, Scheduler, TickHandle, TokioScheduler};
pub use session::{Expiry, Mode, SessionState};
pub use settings::{AlarmSound, SessionConfig};
pub use stats::{Achievement, StatsRecord};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::PomoStore;
pub use tasks::{Task, TaskList, TaskPatch};
pub use timer::{Ports, TickOutcome, Timer};
