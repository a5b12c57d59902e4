//! pomodario-notify - Desktop notifications for Pomodario
//!
//! Shows a short desktop notification when a focus session or a break
//! ends. Works on macOS (osascript/terminal-notifier), Linux
//! (notify-send/kdialog), and WSL. Hosts without any supported notifier
//! simply get no notification.
//!
//! Detect a [`Backend`] once and reuse it. [`Backend::send`] returns as soon
//! as the notifier process has started.

mod backend;

pub use backend::{Backend, Notification, Urgency};

/// Default notification title
pub const DEFAULT_TITLE: &str = "Pomodario";
