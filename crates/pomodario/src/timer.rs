//! The Pomodoro timer
//!
//! Wires the [`SessionState`] machine to its collaborators: settings, task
//! list and statistics stores, the tick scheduler, the alarm and
//! notification alerts, and the clock.
//!
//! After every command or expiry the timer recomputes whether it should be
//! counting; any existing tick source is cancelled before a new one is
//! scheduled, so at most one countdown is ever live. Ticks from a cancelled
//! source are ignored.
//!
//! The alarm and notification run on a background thread, so a slow audio
//! device or notifier never holds up the countdown.
//!
//! Mutators change in-memory state and the tick schedule first, then
//! persist. A persistence error is returned after the state change has
//! already taken effect.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Result;

use crate::alert::{Alert, AlarmPlayer, Notifier};
use crate::clock::Clock;
use crate::scheduler::{Scheduler, TickHandle};
use crate::session::{Expiry, Mode, SessionState};
use crate::settings::SessionConfig;
use crate::stats::{Achievement, StatsRecord};
use crate::store::PomoStore;
use crate::tasks::{Task, TaskList, TaskPatch};

/// What a delivered tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale handle or not counting
    Ignored,
    /// One second elapsed
    Counted { remaining: u32 },
    /// The countdown ran out on this tick
    Expired(Expiry),
}

/// External collaborators of the timer
pub struct Ports {
    pub store: PomoStore,
    pub scheduler: Box<dyn Scheduler>,
    pub alarm: Arc<dyn AlarmPlayer>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Box<dyn Clock>,
}

/// Pomodoro timer with its task list and statistics
pub struct Timer {
    config: SessionConfig,
    state: SessionState,
    tasks: TaskList,
    stats: StatsRecord,
    ticker: Option<TickHandle>,
    alerts: Option<JoinHandle<()>>,
    ports: Ports,
}

impl Timer {
    /// Load persisted settings, tasks and stats and start in a stopped
    /// Focus session
    pub fn load(ports: Ports) -> Self {
        let config = ports.store.load_settings();
        let tasks = ports.store.load_tasks();
        let stats = ports.store.load_stats();
        let state = SessionState::new(&config);

        tracing::debug!(
            tasks = tasks.len(),
            completed = stats.completed_pomodoros,
            "timer loaded"
        );

        Self {
            config,
            state,
            tasks,
            stats,
            ticker: None,
            alerts: None,
            ports,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn stats(&self) -> &StatsRecord {
        &self.stats
    }

    /// Handle of the live tick source, if counting
    pub fn ticker(&self) -> Option<TickHandle> {
        self.ticker
    }

    /// Elapsed share of the current mode, 0-100
    pub fn progress_percent(&self) -> f64 {
        self.state.progress_percent(&self.config)
    }

    // --- session commands ---

    /// Switch to `target`. While running, `confirm` is asked first and a
    /// `false` answer leaves everything unchanged. Returns whether the
    /// switch happened.
    pub fn switch_mode(&mut self, target: Mode, confirm: impl FnOnce() -> bool) -> bool {
        if self.state.running && !confirm() {
            tracing::debug!(target = target.as_str(), "mode switch declined");
            return false;
        }

        self.state.switch_to(target, &self.config);
        self.resync_ticker();
        tracing::info!(mode = target.as_str(), "mode switched");
        true
    }

    /// Start, resume or pause
    pub fn toggle_run(&mut self) {
        self.state.toggle_run();
        self.resync_ticker();
        tracing::debug!(
            running = self.state.running,
            paused = self.state.paused,
            "run toggled"
        );
    }

    /// Stop and restore the full duration of the current mode
    pub fn reset(&mut self) {
        self.state.reset(&self.config);
        self.resync_ticker();
    }

    /// Handle a tick delivered by the scheduler
    pub fn handle_tick(&mut self, handle: TickHandle) -> Result<TickOutcome> {
        if self.ticker != Some(handle) {
            tracing::trace!(handle = handle.id(), "stale tick ignored");
            return Ok(TickOutcome::Ignored);
        }

        if !self.state.tick() {
            return Ok(TickOutcome::Ignored);
        }

        if self.state.is_expired() {
            return self.expire().map(TickOutcome::Expired);
        }

        Ok(TickOutcome::Counted {
            remaining: self.state.seconds_remaining,
        })
    }

    fn expire(&mut self) -> Result<Expiry> {
        let finished = self.state.mode;
        self.sound_alarm(finished);

        let mut focus_recorded = false;
        if finished == Mode::Focus {
            let today = self.ports.clock.today();
            let seconds = u64::from(self.config.seconds_for(Mode::Focus));
            self.stats.record_focus(today, seconds);
            focus_recorded = true;
        }

        let expiry = self.state.complete(&self.config);
        self.resync_ticker();

        tracing::info!(
            finished = expiry.finished.as_str(),
            next = expiry.next.as_str(),
            auto_started = expiry.auto_started,
            "session expired"
        );

        if focus_recorded {
            self.ports.store.save_stats(&self.stats)?;
        }
        Ok(expiry)
    }

    fn sound_alarm(&mut self, finished: Mode) {
        let alarm = Arc::clone(&self.ports.alarm);
        let notifier = Arc::clone(&self.ports.notifier);
        let (sound, volume) = (self.config.alarm_sound, self.config.alarm_volume);
        let alert = Alert::for_finished(finished);

        let spawned = thread::Builder::new()
            .name("alert".to_string())
            .spawn(move || {
                if let Err(e) = alarm.play(sound, volume) {
                    tracing::warn!("Alarm playback failed: {:#}", e);
                }
                if let Err(e) = notifier.notify(alert) {
                    tracing::warn!("Notification failed: {:#}", e);
                }
            });

        match spawned {
            Ok(handle) => self.alerts = Some(handle),
            Err(e) => tracing::warn!("Failed to start alert thread: {}", e),
        }
    }

    /// Block until the most recent expiry's alarm and notification have
    /// been dispatched
    pub fn wait_for_alerts(&mut self) {
        if let Some(handle) = self.alerts.take() {
            let _ = handle.join();
        }
    }

    fn resync_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            self.ports.scheduler.cancel(handle);
        }
        if self.state.is_counting() {
            self.ticker = Some(self.ports.scheduler.schedule_tick());
        }
    }

    // --- settings ---

    /// Replace the settings. The current mode restarts at its new duration
    /// if that duration changed.
    pub fn save_settings(&mut self, config: SessionConfig) -> Result<()> {
        let config = config.normalized();
        let old = std::mem::replace(&mut self.config, config);

        if self.state.apply_config(&old, &self.config) {
            tracing::debug!(
                mode = self.state.mode.as_str(),
                seconds = self.state.seconds_remaining,
                "current mode resized"
            );
            self.resync_ticker();
        }

        self.ports.store.save_settings(&self.config)?;
        Ok(())
    }

    // --- tasks ---

    /// Add a task. Blank text is a no-op returning `None`.
    pub fn add_task(&mut self, text: &str) -> Result<Option<Task>> {
        let now = self.ports.clock.now();
        let Some(task) = self.tasks.add(text, now).cloned() else {
            return Ok(None);
        };
        self.ports.store.save_tasks(&self.tasks)?;
        Ok(Some(task))
    }

    pub fn update_task(&mut self, id: i64, patch: TaskPatch) -> Result<bool> {
        let updated = self.tasks.update(id, patch);
        if updated {
            self.ports.store.save_tasks(&self.tasks)?;
        }
        Ok(updated)
    }

    pub fn delete_task(&mut self, id: i64) -> Result<bool> {
        let deleted = self.tasks.delete(id);
        if deleted {
            self.ports.store.save_tasks(&self.tasks)?;
        }
        Ok(deleted)
    }

    pub fn toggle_task(&mut self, id: i64) -> Result<bool> {
        let toggled = self.tasks.toggle_complete(id);
        if toggled {
            self.ports.store.save_tasks(&self.tasks)?;
        }
        Ok(toggled)
    }

    // --- statistics ---

    pub fn today_count(&self) -> u64 {
        self.stats.today_count(self.ports.clock.today())
    }

    pub fn week_count(&self) -> u64 {
        self.stats.week_count(self.ports.clock.today())
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        self.stats.achievements(self.ports.clock.today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::scheduler::ManualScheduler;
    use crate::settings::AlarmSound;
    use crate::storage::{MemoryStorage, Storage};
    use crate::store::{SETTINGS_KEY, STATS_KEY, TASKS_KEY};
    use anyhow::bail;
    use chrono::{Local, NaiveDate, TimeZone};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Mutex};
    use std::time::{Duration, Instant};

    #[derive(Clone, Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl Recorder {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl AlarmPlayer for Recorder {
        fn play(&self, sound: AlarmSound, volume: f64) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("alarm:{}:{}", sound.as_str(), volume));
            if self.fail {
                bail!("no audio device");
            }
            Ok(())
        }
    }

    impl Notifier for Recorder {
        fn notify(&self, alert: Alert) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("notify:{}", alert.message()));
            if self.fail {
                bail!("permission denied");
            }
            Ok(())
        }
    }

    /// Holds every notification until released
    struct StalledNotifier {
        release: Mutex<mpsc::Receiver<()>>,
        delivered: Arc<AtomicBool>,
    }

    impl Notifier for StalledNotifier {
        fn notify(&self, _alert: Alert) -> Result<()> {
            let _ = self
                .release
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5));
            self.delivered.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Harness {
        timer: Timer,
        storage: MemoryStorage,
        scheduler: ManualScheduler,
        alerts: Recorder,
        clock: FixedClock,
    }

    impl Harness {
        fn new(config: SessionConfig) -> Self {
            Self::with_alerts(config, Recorder::default())
        }

        fn with_alerts(config: SessionConfig, alerts: Recorder) -> Self {
            let storage = MemoryStorage::new();
            storage
                .save(SETTINGS_KEY, &serde_json::to_string(&config).unwrap())
                .unwrap();

            let scheduler = ManualScheduler::new();
            let clock = FixedClock::new(Local.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap());

            let timer = Timer::load(Ports {
                store: PomoStore::new(Box::new(storage.clone())),
                scheduler: Box::new(scheduler.clone()),
                alarm: Arc::new(alerts.clone()),
                notifier: Arc::new(alerts.clone()),
                clock: Box::new(clock.clone()),
            });

            Self {
                timer,
                storage,
                scheduler,
                alerts,
                clock,
            }
        }

        /// Deliver one tick from the live source
        fn tick(&mut self) -> TickOutcome {
            let handle = self.scheduler.current().expect("no live tick source");
            self.timer.handle_tick(handle).unwrap()
        }

        /// Tick until the countdown expires, then let its alerts finish
        fn run_until_expiry(&mut self) -> Expiry {
            loop {
                match self.tick() {
                    TickOutcome::Counted { .. } => continue,
                    TickOutcome::Expired(expiry) => {
                        self.timer.wait_for_alerts();
                        return expiry;
                    }
                    TickOutcome::Ignored => panic!("tick ignored while counting"),
                }
            }
        }
    }

    fn one_minute() -> SessionConfig {
        SessionConfig {
            pomodoro_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_loads_defaults_when_storage_empty() {
        let storage = MemoryStorage::new();
        let timer = Timer::load(Ports {
            store: PomoStore::new(Box::new(storage)),
            scheduler: Box::new(ManualScheduler::new()),
            alarm: Arc::new(Recorder::default()),
            notifier: Arc::new(Recorder::default()),
            clock: Box::new(FixedClock::new(Local::now())),
        });

        assert_eq!(timer.config(), &SessionConfig::default());
        assert_eq!(timer.state().mode, Mode::Focus);
        assert_eq!(timer.state().seconds_remaining, 1500);
        assert!(timer.tasks().is_empty());
        assert_eq!(timer.stats(), &StatsRecord::default());
        assert!(timer.ticker().is_none());
    }

    #[test]
    fn test_start_schedules_single_source() {
        let mut h = Harness::new(SessionConfig::default());

        h.timer.toggle_run();
        assert_eq!(h.scheduler.active().len(), 1);
        assert_eq!(h.timer.ticker(), h.scheduler.current());

        h.timer.toggle_run();
        assert!(h.scheduler.active().is_empty());
        assert!(h.timer.state().paused);

        h.timer.toggle_run();
        assert_eq!(h.scheduler.active().len(), 1);
        assert_eq!(h.scheduler.scheduled_count(), 2);
    }

    #[test]
    fn test_pause_keeps_remaining_time() {
        let mut h = Harness::new(SessionConfig::default());
        h.timer.toggle_run();
        for _ in 0..10 {
            h.tick();
        }

        h.timer.toggle_run();
        assert_eq!(h.timer.state().seconds_remaining, 1490);
        assert!(!h.timer.state().running);

        h.timer.toggle_run();
        assert_eq!(
            h.tick(),
            TickOutcome::Counted { remaining: 1489 }
        );
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut h = Harness::new(SessionConfig::default());
        h.timer.toggle_run();
        let old = h.scheduler.current().unwrap();

        h.timer.toggle_run();
        h.timer.toggle_run();

        assert_eq!(h.timer.handle_tick(old).unwrap(), TickOutcome::Ignored);
        assert_eq!(h.timer.state().seconds_remaining, 1500);
    }

    #[test]
    fn test_reset_for_any_mode() {
        let cfg = SessionConfig {
            long_break_minutes: 20,
            ..Default::default()
        };
        let mut h = Harness::new(cfg);
        h.timer.switch_mode(Mode::LongBreak, || true);
        h.timer.toggle_run();
        for _ in 0..5 {
            h.tick();
        }

        h.timer.reset();
        assert_eq!(h.timer.state().seconds_remaining, 20 * 60);
        assert!(!h.timer.state().running);
        assert!(!h.timer.state().paused);
        assert!(h.scheduler.active().is_empty());
    }

    #[test]
    fn test_expiry_fires_exactly_once_on_last_tick() {
        let mut h = Harness::new(SessionConfig {
            auto_start_breaks: false,
            ..one_minute()
        });
        h.timer.toggle_run();

        for expected in (1..60).rev() {
            assert_eq!(h.tick(), TickOutcome::Counted { remaining: expected });
            assert!(h.alerts.events().is_empty());
        }

        let outcome = h.tick();
        h.timer.wait_for_alerts();
        assert_eq!(
            outcome,
            TickOutcome::Expired(Expiry {
                finished: Mode::Focus,
                next: Mode::ShortBreak,
                auto_started: false,
            })
        );
        assert_eq!(
            h.alerts.events(),
            vec![
                "alarm:bell:0.7".to_string(),
                "notify:Pomodoro complete! Time for a break.".to_string(),
            ]
        );

        // Not counting any more: no source, nothing re-fires
        assert!(h.scheduler.active().is_empty());
        assert_eq!(h.timer.stats().completed_pomodoros, 1);
        assert!(!h.timer.state().running);
        assert_eq!(h.timer.state().seconds_remaining, 60);
    }

    #[test]
    fn test_focus_expiry_updates_stats() {
        let mut h = Harness::new(one_minute());
        h.timer.toggle_run();
        h.run_until_expiry();

        let stats = h.timer.stats();
        assert_eq!(stats.completed_pomodoros, 1);
        assert_eq!(stats.total_focus_time, 60);
        assert_eq!(stats.daily_pomodoros.get("2024-01-01"), Some(&1));
        assert_eq!(h.timer.today_count(), 1);
        assert_eq!(h.timer.week_count(), 1);
        assert_eq!(h.timer.achievements(), vec![Achievement::FirstPomodoro]);

        let saved: StatsRecord =
            serde_json::from_str(&h.storage.load(STATS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(&saved, stats);
    }

    #[test]
    fn test_break_expiry_does_not_touch_stats() {
        let mut h = Harness::new(one_minute());
        h.timer.switch_mode(Mode::ShortBreak, || true);
        h.timer.toggle_run();

        let expiry = h.run_until_expiry();
        assert_eq!(expiry.next, Mode::Focus);
        assert_eq!(h.timer.stats(), &StatsRecord::default());
        assert!(h.storage.load(STATS_KEY).unwrap().is_none());
        assert_eq!(
            h.alerts.events().last().map(String::as_str),
            Some("notify:Break complete! Time to focus.")
        );
    }

    #[test]
    fn test_daily_key_uses_date_at_expiry() {
        let mut h = Harness::new(one_minute());
        h.clock
            .set(Local.with_ymd_and_hms(2024, 3, 9, 23, 59, 30).unwrap());
        h.timer.toggle_run();
        for _ in 0..30 {
            h.tick();
        }
        h.clock
            .set(Local.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        h.run_until_expiry();

        assert_eq!(h.timer.stats().daily_pomodoros.get("2024-03-10"), Some(&1));
        assert!(h.timer.stats().daily_pomodoros.get("2024-03-09").is_none());
    }

    #[test]
    fn test_cycle_with_auto_start() {
        let mut h = Harness::new(SessionConfig {
            pomodoro_goal: 2,
            ..one_minute()
        });
        h.timer.toggle_run();

        let mut breaks = Vec::new();
        for _ in 0..4 {
            let focus_end = h.run_until_expiry();
            assert!(focus_end.auto_started);
            breaks.push(focus_end.next);

            let break_end = h.run_until_expiry();
            assert_eq!(break_end.next, Mode::Focus);
            assert!(h.timer.state().running);
        }

        assert_eq!(
            breaks,
            vec![
                Mode::ShortBreak,
                Mode::LongBreak,
                Mode::ShortBreak,
                Mode::LongBreak
            ]
        );
        assert_eq!(h.timer.stats().completed_pomodoros, 4);
        assert_eq!(h.timer.state().completed_focus_in_cycle, 4);
        // One live source at a time throughout
        assert_eq!(h.scheduler.active().len(), 1);
    }

    #[test]
    fn test_auto_start_pomodoros_off() {
        let mut h = Harness::new(SessionConfig {
            auto_start_pomodoros: false,
            ..one_minute()
        });
        h.timer.switch_mode(Mode::LongBreak, || true);
        h.timer.toggle_run();

        let expiry = h.run_until_expiry();
        assert_eq!(expiry.next, Mode::Focus);
        assert!(!expiry.auto_started);
        assert!(!h.timer.state().running);
        assert!(h.timer.ticker().is_none());
    }

    #[test]
    fn test_alert_failures_are_swallowed() {
        let mut h = Harness::with_alerts(one_minute(), Recorder::failing());
        h.timer.toggle_run();

        let expiry = h.run_until_expiry();
        assert_eq!(expiry.next, Mode::ShortBreak);
        assert_eq!(h.alerts.events().len(), 2);
        assert_eq!(h.timer.stats().completed_pomodoros, 1);
    }

    #[test]
    fn test_slow_notifier_does_not_hold_up_expiry() {
        let (release, stalled) = mpsc::channel();
        let delivered = Arc::new(AtomicBool::new(false));
        let scheduler = ManualScheduler::new();
        let mut timer = Timer::load(Ports {
            store: PomoStore::new(Box::new(MemoryStorage::new())),
            scheduler: Box::new(scheduler.clone()),
            alarm: Arc::new(Recorder::default()),
            notifier: Arc::new(StalledNotifier {
                release: Mutex::new(stalled),
                delivered: Arc::clone(&delivered),
            }),
            clock: Box::new(FixedClock::new(Local::now())),
        });
        timer.save_settings(one_minute()).unwrap();
        timer.toggle_run();

        let start = Instant::now();
        let mut outcome = TickOutcome::Ignored;
        for _ in 0..60 {
            outcome = timer.handle_tick(scheduler.current().unwrap()).unwrap();
        }
        assert!(start.elapsed() < Duration::from_secs(2));
        assert!(matches!(
            outcome,
            TickOutcome::Expired(Expiry {
                next: Mode::ShortBreak,
                auto_started: true,
                ..
            })
        ));
        assert!(!delivered.load(Ordering::SeqCst));

        // The break is already counting while the notification is stuck
        assert_eq!(scheduler.active().len(), 1);
        assert_eq!(
            timer.handle_tick(scheduler.current().unwrap()).unwrap(),
            TickOutcome::Counted { remaining: 59 }
        );
        assert_eq!(timer.stats().completed_pomodoros, 1);

        release.send(()).unwrap();
        timer.wait_for_alerts();
        assert!(delivered.load(Ordering::SeqCst));
    }

    #[test]
    fn test_switch_while_running_needs_confirmation() {
        let mut h = Harness::new(SessionConfig::default());
        h.timer.toggle_run();
        h.tick();
        let before = h.timer.state().clone();

        let switched = h.timer.switch_mode(Mode::LongBreak, || false);
        assert!(!switched);
        assert_eq!(h.timer.state(), &before);
        assert_eq!(h.scheduler.active().len(), 1);

        let switched = h.timer.switch_mode(Mode::LongBreak, || true);
        assert!(switched);
        assert_eq!(h.timer.state().mode, Mode::LongBreak);
        assert_eq!(h.timer.state().seconds_remaining, 900);
        assert!(!h.timer.state().running);
        assert!(h.scheduler.active().is_empty());
    }

    #[test]
    fn test_switch_while_stopped_skips_confirmation() {
        let mut h = Harness::new(SessionConfig::default());
        let switched = h
            .timer
            .switch_mode(Mode::ShortBreak, || panic!("should not ask"));
        assert!(switched);
        assert_eq!(h.timer.state().seconds_remaining, 300);
    }

    #[test]
    fn test_save_settings_resizes_current_mode() {
        let mut h = Harness::new(SessionConfig::default());
        h.timer.toggle_run();
        h.tick();

        let unrelated = SessionConfig {
            long_break_minutes: 30,
            ..SessionConfig::default()
        };
        h.timer.save_settings(unrelated).unwrap();
        assert_eq!(h.timer.state().seconds_remaining, 1499);

        let longer = SessionConfig {
            pomodoro_minutes: 45,
            ..h.timer.config().clone()
        };
        h.timer.save_settings(longer).unwrap();
        assert_eq!(h.timer.state().seconds_remaining, 45 * 60);
        assert!(h.timer.state().running);
        assert_eq!(h.scheduler.active().len(), 1);

        let saved: SessionConfig =
            serde_json::from_str(&h.storage.load(SETTINGS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(saved.pomodoro_minutes, 45);
        assert_eq!(saved.long_break_minutes, 30);
    }

    #[test]
    fn test_save_settings_coerces_values() {
        let mut h = Harness::new(SessionConfig::default());
        h.timer
            .save_settings(SessionConfig {
                pomodoro_minutes: 0,
                pomodoro_goal: 0,
                ..SessionConfig::default()
            })
            .unwrap();

        assert_eq!(h.timer.config().pomodoro_minutes, 1);
        assert_eq!(h.timer.config().pomodoro_goal, 1);
        assert_eq!(h.timer.state().seconds_remaining, 60);
    }

    #[test]
    fn test_task_operations_persist() {
        let mut h = Harness::new(SessionConfig::default());

        assert!(h.timer.add_task("").unwrap().is_none());
        assert!(h.timer.add_task("   ").unwrap().is_none());
        assert!(h.storage.load(TASKS_KEY).unwrap().is_none());

        let task = h.timer.add_task("Write report").unwrap().unwrap();
        assert!(!task.completed);
        assert_eq!(h.timer.tasks().len(), 1);

        assert!(h.timer.toggle_task(task.id).unwrap());
        assert!(h
            .timer
            .update_task(task.id, TaskPatch::text("Write final report"))
            .unwrap());
        assert!(!h.timer.delete_task(task.id + 1).unwrap());

        let saved: TaskList =
            serde_json::from_str(&h.storage.load(TASKS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(&saved, h.timer.tasks());
        let only = saved.iter().next().unwrap();
        assert!(only.completed);
        assert_eq!(only.text, "Write final report");

        assert!(h.timer.delete_task(task.id).unwrap());
        assert!(h.timer.tasks().is_empty());
    }

    #[test]
    fn test_progress_follows_configured_duration() {
        let mut h = Harness::new(SessionConfig {
            pomodoro_minutes: 2,
            ..SessionConfig::default()
        });
        h.timer.toggle_run();
        for _ in 0..60 {
            h.tick();
        }
        assert_eq!(h.timer.progress_percent(), 50.0);
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            h.clock.today()
        );
    }
}
