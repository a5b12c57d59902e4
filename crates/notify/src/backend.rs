//! Notification backends for different platforms

use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Notification urgency levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

/// A notification to display
#[derive(Debug, Clone, Default)]
pub struct Notification {
    /// Notification title
    pub title: String,
    /// Notification message/body
    pub message: String,
    /// Icon name or path (optional)
    pub icon: Option<String>,
    /// Urgency level
    pub urgency: Urgency,
    /// Auto-dismiss timeout in seconds (optional)
    pub timeout: Option<u32>,
    /// Whether the notifier should play its own sound
    pub sound: bool,
}

impl Notification {
    /// Create a new notification with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: crate::DEFAULT_TITLE.to_string(),
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the icon
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the urgency
    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    /// Set the timeout
    pub fn with_timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Ask the notifier to play its own sound
    pub fn with_sound(mut self) -> Self {
        self.sound = true;
        self
    }
}

/// Available notification backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// macOS terminal-notifier
    TerminalNotifier,
    /// macOS osascript
    Osascript,
    /// Linux notify-send
    NotifySend,
    /// KDE kdialog
    Kdialog,
    /// WSL PowerShell
    Wsl,
}

impl Backend {
    /// Detect the best available backend for the current platform
    pub fn detect() -> Option<Self> {
        #[cfg(target_os = "macos")]
        {
            if Self::command_exists("terminal-notifier") {
                return Some(Self::TerminalNotifier);
            }
            return Some(Self::Osascript);
        }

        #[cfg(target_os = "linux")]
        {
            if std::env::var("WSL_DISTRO_NAME").is_ok() {
                return Some(Self::Wsl);
            }
            if Self::command_exists("notify-send") {
                return Some(Self::NotifySend);
            }
            if Self::command_exists("kdialog") {
                return Some(Self::Kdialog);
            }
            return None;
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    /// Check if a command exists
    pub fn command_exists(cmd: &str) -> bool {
        Command::new("which")
            .arg(cmd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Get the name of this backend
    pub fn name(&self) -> &'static str {
        match self {
            Self::TerminalNotifier => "terminal-notifier",
            Self::Osascript => "osascript",
            Self::NotifySend => "notify-send",
            Self::Kdialog => "kdialog",
            Self::Wsl => "wsl",
        }
    }

    /// Send a notification using this backend. The notifier runs detached;
    /// a failing exit status is logged once the process is reaped.
    pub fn send(&self, notification: &Notification) -> Result<()> {
        // WSL PowerShell toasts fail for reasons outside our control
        let report_failure = *self != Self::Wsl;
        spawn_detached(self.command(notification), self.name(), report_failure)
    }

    /// Build the platform command for a notification
    fn command(&self, notification: &Notification) -> Command {
        match self {
            Self::TerminalNotifier => {
                let mut cmd = Command::new("terminal-notifier");
                cmd.args([
                    "-title",
                    &notification.title,
                    "-message",
                    &notification.message,
                    "-group",
                    "pomodario",
                ]);
                if let Some(icon) = &notification.icon {
                    cmd.args(["-appIcon", icon]);
                }
                if notification.sound {
                    cmd.args(["-sound", "default"]);
                }
                cmd
            }
            Self::Osascript => {
                let mut cmd = Command::new("osascript");
                cmd.args(["-e", &osascript_source(notification)]);
                cmd
            }
            Self::NotifySend => {
                let mut cmd = Command::new("notify-send");
                cmd.args(["--app-name", "pomodario"]);
                cmd.args(["--urgency", notification.urgency.as_str()]);
                if let Some(icon) = &notification.icon {
                    cmd.args(["--icon", icon]);
                }
                if let Some(timeout) = notification.timeout {
                    cmd.args(["--expire-time", &(timeout * 1000).to_string()]);
                }
                cmd.args([&notification.title, &notification.message]);
                cmd
            }
            Self::Kdialog => {
                let timeout = notification.timeout.unwrap_or(5);
                let mut cmd = Command::new("kdialog");
                cmd.args([
                    "--passivepopup",
                    &notification.message,
                    &timeout.to_string(),
                    "--title",
                    &notification.title,
                ]);
                cmd
            }
            Self::Wsl => {
                let mut cmd = Command::new("powershell.exe");
                cmd.args(["-Command", &powershell_toast(notification)]);
                cmd
            }
        }
    }
}

/// Start `cmd` and reap it on a background thread
fn spawn_detached(mut cmd: Command, name: &'static str, report_failure: bool) -> Result<()> {
    let mut child = cmd
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to start {}", name))?;

    std::thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() && report_failure => {
            tracing::warn!("{} failed with status: {}", name, status);
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Failed to wait for {}: {}", name, e),
    });
    Ok(())
}

fn osascript_source(notification: &Notification) -> String {
    let title = notification.title.replace('"', r#"\""#);
    let message = notification.message.replace('"', r#"\""#);

    let mut script = format!(r#"display notification "{}" with title "{}""#, message, title);
    if notification.sound {
        script.push_str(r#" sound name "default""#);
    }
    script
}

fn powershell_toast(notification: &Notification) -> String {
    let title = notification.title.replace('\'', "''");
    let message = notification.message.replace('\'', "''");

    format!(
        r#"[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null; $template = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02); $template.GetElementsByTagName('text')[0].AppendChild($template.CreateTextNode('{}')) | Out-Null; $template.GetElementsByTagName('text')[1].AppendChild($template.CreateTextNode('{}')) | Out-Null; [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier('Pomodario').Show([Windows.UI.Notifications.ToastNotification]::new($template))"#,
        title, message
    )
}
