//! Tick scheduling port
//!
//! The timer asks for a periodic tick source whenever it should be
//! counting and cancels it whenever it should not. Each source is
//! identified by a [`TickHandle`]; ticks are delivered as that handle so a
//! tick from a source that has since been cancelled can be told apart and
//! dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Identifies one scheduled tick source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A source of periodic ticks
pub trait Scheduler: Send {
    /// Start a periodic tick source
    fn schedule_tick(&mut self) -> TickHandle;

    /// Stop a tick source. Unknown handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// Tokio-backed scheduler: each source is a task that sends its handle on
/// a channel once per period
pub struct TokioScheduler {
    period: Duration,
    next_id: u64,
    tx: UnboundedSender<TickHandle>,
    tasks: HashMap<TickHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Create a scheduler and the receiver its ticks arrive on.
    ///
    /// Must be used from within a tokio runtime.
    pub fn new(period: Duration) -> (Self, UnboundedReceiver<TickHandle>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            period,
            next_id: 0,
            tx,
            tasks: HashMap::new(),
        };
        (scheduler, rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);

        let tx = self.tx.clone();
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(handle).is_err() {
                    break;
                }
            }
        });

        tracing::trace!(handle = handle.id(), "tick source scheduled");
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            tracing::trace!(handle = handle.id(), "tick source cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    active: Vec<TickHandle>,
    scheduled: u64,
    cancelled: u64,
}

/// Scheduler that only records requests; ticks are delivered by hand.
/// Clones share state, so a caller can inspect a scheduler it handed off.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ManualState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Handles of the sources currently running
    pub fn active(&self) -> Vec<TickHandle> {
        self.with_state(|s| s.active.clone())
    }

    /// The single running source, if exactly one is running
    pub fn current(&self) -> Option<TickHandle> {
        self.with_state(|s| match s.active.as_slice() {
            [only] => Some(*only),
            _ => None,
        })
    }

    /// Total sources ever scheduled
    pub fn scheduled_count(&self) -> u64 {
        self.with_state(|s| s.scheduled)
    }

    /// Total sources cancelled
    pub fn cancelled_count(&self) -> u64 {
        self.with_state(|s| s.cancelled)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_tick(&mut self) -> TickHandle {
        self.with_state(|s| {
            s.next_id += 1;
            s.scheduled += 1;
            let handle = TickHandle(s.next_id);
            s.active.push(handle);
            handle
        })
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.with_state(|s| {
            let before = s.active.len();
            s.active.retain(|h| *h != handle);
            if s.active.len() != before {
                s.cancelled += 1;
            }
        })
    }
}
