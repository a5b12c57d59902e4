//! Expiry alerts: alarm sound and desktop notification
//!
//! Both are fire-and-forget. The timer logs their failures and carries on.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result};
use pomodario_notify::{Backend, Notification, Urgency};
use rodio::{Decoder, OutputStream, Sink};

use crate::session::Mode;
use crate::settings::AlarmSound;

/// Plays the alarm sound
pub trait AlarmPlayer: Send + Sync {
    fn play(&self, sound: AlarmSound, volume: f64) -> Result<()>;
}

/// What just finished, for the notification text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    FocusComplete,
    BreakComplete,
}

impl Alert {
    pub fn for_finished(mode: Mode) -> Self {
        if mode.is_break() {
            Alert::BreakComplete
        } else {
            Alert::FocusComplete
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Alert::FocusComplete => "Pomodoro complete",
            Alert::BreakComplete => "Break over",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Alert::FocusComplete => "Pomodoro complete! Time for a break.",
            Alert::BreakComplete => "Break complete! Time to focus.",
        }
    }

    fn urgency(&self) -> Urgency {
        match self {
            Alert::FocusComplete => Urgency::Critical,
            Alert::BreakComplete => Urgency::Normal,
        }
    }
}

/// Shows a system notification
pub trait Notifier: Send + Sync {
    fn notify(&self, alert: Alert) -> Result<()>;
}

/// Plays `<sounds_dir>/<sound>.wav` on the default audio device, or rings
/// the terminal bell when the file is missing or no device opens
pub struct SoundFilePlayer {
    sounds_dir: PathBuf,
}

impl SoundFilePlayer {
    pub fn new(sounds_dir: PathBuf) -> Self {
        Self { sounds_dir }
    }

    pub fn sound_file(&self, sound: AlarmSound) -> PathBuf {
        self.sounds_dir.join(format!("{}.wav", sound.as_str()))
    }
}

impl AlarmPlayer for SoundFilePlayer {
    fn play(&self, sound: AlarmSound, volume: f64) -> Result<()> {
        let Some(volume) = sink_volume(volume) else {
            return Ok(());
        };

        let file = self.sound_file(sound);
        if !file.exists() {
            tracing::debug!(file = %file.display(), "alarm file missing, ringing bell");
            return ring_bell();
        }

        // The output stream is not Send, so it lives and dies on its own thread
        thread::Builder::new()
            .name("alarm".to_string())
            .spawn(move || {
                if let Err(e) = play_file(&file, volume) {
                    tracing::warn!("Alarm playback failed: {:#}", e);
                    let _ = ring_bell();
                }
            })
            .context("Failed to start alarm thread")?;
        Ok(())
    }
}

/// Sink volume for a configured alarm volume; `None` means muted
fn sink_volume(volume: f64) -> Option<f32> {
    if volume.is_nan() || volume <= 0.0 {
        return None;
    }
    Some(volume.min(1.0) as f32)
}

/// Decode and play `path` to the end
fn play_file(path: &Path, volume: f32) -> Result<()> {
    let (_stream, handle) =
        OutputStream::try_default().context("Failed to create audio output stream")?;
    let sink = Sink::try_new(&handle).context("Failed to create audio sink")?;

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    sink.set_volume(volume);
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

fn ring_bell() -> Result<()> {
    let mut stderr = std::io::stderr();
    stderr.write_all(b"\x07").context("Failed to ring terminal bell")?;
    stderr.flush().context("Failed to ring terminal bell")
}

/// Desktop notifications through `pomodario-notify`
pub struct DesktopNotifier {
    backend: Option<Backend>,
}

impl DesktopNotifier {
    /// Detects the notification backend once. A disabled notifier never
    /// shows anything.
    pub fn new(enabled: bool) -> Self {
        let backend = if enabled { Backend::detect() } else { None };
        tracing::debug!(backend = ?backend.map(|b| b.name()), "notification backend");
        Self { backend }
    }

    fn notification(alert: Alert) -> Notification {
        Notification::new(alert.message())
            .with_title(format!("{} - {}", pomodario_notify::DEFAULT_TITLE, alert.title()))
            .with_urgency(alert.urgency())
            .with_timeout(10)
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, alert: Alert) -> Result<()> {
        match self.backend {
            Some(backend) => backend.send(&Self::notification(alert)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_messages() {
        assert_eq!(Alert::for_finished(Mode::Focus), Alert::FocusComplete);
        assert_eq!(Alert::for_finished(Mode::ShortBreak), Alert::BreakComplete);
        assert_eq!(Alert::for_finished(Mode::LongBreak), Alert::BreakComplete);
        assert_eq!(
            Alert::FocusComplete.message(),
            "Pomodoro complete! Time for a break."
        );
        assert_eq!(Alert::BreakComplete.message(), "Break complete! Time to focus.");
        assert_eq!(Alert::BreakComplete.title(), "Break over");
    }

    #[test]
    fn test_sound_file_path() {
        let player = SoundFilePlayer::new(PathBuf::from("/opt/sounds"));
        assert_eq!(
            player.sound_file(AlarmSound::Kitchen),
            PathBuf::from("/opt/sounds/kitchen.wav")
        );
    }

    #[test]
    fn test_sink_volume_follows_setting() {
        assert_eq!(sink_volume(0.2), Some(0.2));
        assert_eq!(sink_volume(0.7), Some(0.7));
        assert_eq!(sink_volume(1.5), Some(1.0));
        assert_eq!(sink_volume(0.0), None);
        assert_eq!(sink_volume(-1.0), None);
        assert_eq!(sink_volume(f64::NAN), None);
    }

    #[test]
    fn test_muted_alarm_is_noop() {
        let player = SoundFilePlayer::new(PathBuf::from("/nonexistent"));
        assert!(player.play(AlarmSound::Bell, 0.0).is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_bell() {
        let player = SoundFilePlayer::new(PathBuf::from("/nonexistent"));
        assert!(player.play(AlarmSound::Bird, 0.5).is_ok());
    }

    #[test]
    fn test_undecodable_file_does_not_fail_the_caller() {
        let dir = std::env::temp_dir().join(format!("pomodario_alarm_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bell.wav"), b"not a wav file").unwrap();

        let player = SoundFilePlayer::new(dir.clone());
        assert!(player.play(AlarmSound::Bell, 0.5).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_notification_content() {
        let n = DesktopNotifier::notification(Alert::FocusComplete);
        assert_eq!(n.title, "Pomodario - Pomodoro complete");
        assert_eq!(n.message, "Pomodoro complete! Time for a break.");
        assert_eq!(n.urgency, Urgency::Critical);
        assert_eq!(n.timeout, Some(10));

        let n = DesktopNotifier::notification(Alert::BreakComplete);
        assert_eq!(n.urgency, Urgency::Normal);
    }

    #[test]
    fn test_disabled_notifier_is_silent() {
        let notifier = DesktopNotifier::new(false);
        assert!(notifier.backend.is_none());
        assert!(notifier.notify(Alert::FocusComplete).is_ok());
    }
}
