//! Pomodario Core - Shared functionality for the Pomodario crates
//!
//! Standard locations, the application config file, and the small
//! formatting helpers the timer display and statistics share.

pub mod config;
pub mod format;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
