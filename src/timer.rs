//! Recurring tick timers behind a small scheduler port.
//!
//! The session engine only ever sees "timer `h` ticked". Whether that tick
//! came from the wall clock or from a test calling `due` is the scheduler's
//! business.

use std::time::{Duration, Instant};

/// Period of both exam clocks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Session-wide countdown.
    Global,
    /// Elapsed-time counter for the question on screen.
    Question,
}

/// Cancellation handle for one scheduled recurring timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    kind: TimerKind,
    id: u64,
}

impl TimerHandle {
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Schedules recurring ticks. Cancelling an unknown or already cancelled
/// handle is a no-op.
pub trait Scheduler {
    fn schedule_tick(&mut self, kind: TimerKind, interval: Duration) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
}

/// Reports which live timers have fired, in scheduling order.
pub trait TickSource {
    fn due(&mut self, now: Instant) -> Vec<TimerHandle>;
}

#[derive(Debug, Clone)]
struct Scheduled {
    handle: TimerHandle,
    interval: Duration,
    next_due: Instant,
}

/// Wall-clock scheduler polled by the terminal event loop.
#[derive(Debug, Default)]
pub struct IntervalScheduler {
    next_id: u64,
    timers: Vec<Scheduled>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.timers.len()
    }

    fn schedule_at(&mut self, kind: TimerKind, interval: Duration, now: Instant) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle {
            kind,
            id: self.next_id,
        };
        self.timers.push(Scheduled {
            handle,
            interval,
            next_due: now + interval,
        });
        handle
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_tick(&mut self, kind: TimerKind, interval: Duration) -> TimerHandle {
        self.schedule_at(kind, interval, Instant::now())
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
    }
}

impl TickSource for IntervalScheduler {
    /// One handle per elapsed interval, so a late poll catches up instead of
    /// losing seconds.
    fn due(&mut self, now: Instant) -> Vec<TimerHandle> {
        let mut fired = Vec::new();
        for timer in self.timers.iter_mut() {
            if timer.interval.is_zero() {
                continue;
            }
            while timer.next_due <= now {
                fired.push(timer.handle);
                timer.next_due += timer.interval;
            }
        }
        fired
    }
}

/// Deterministic scheduler for tests: every poll fires each live timer
/// exactly once, so one `due` call stands for one elapsed second.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    live: Vec<TimerHandle>,
    scheduled_total: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> &[TimerHandle] {
        &self.live
    }

    pub fn live_count(&self, kind: TimerKind) -> usize {
        self.live.iter().filter(|h| h.kind == kind).count()
    }

    /// How many timers were ever scheduled.
    pub fn scheduled_total(&self) -> usize {
        self.scheduled_total
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_tick(&mut self, kind: TimerKind, _interval: Duration) -> TimerHandle {
        self.next_id += 1;
        self.scheduled_total += 1;
        let handle = TimerHandle {
            kind,
            id: self.next_id,
        };
        self.live.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.live.retain(|h| *h != handle);
    }
}

impl TickSource for ManualScheduler {
    fn due(&mut self, _now: Instant) -> Vec<TimerHandle> {
        self.live.clone()
    }
}

/// The pair of live exam timers. Holds at most one handle per kind.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimerSet {
    global: Option<TimerHandle>,
    question: Option<TimerHandle>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the timer of `kind`, cancelling any existing one
    /// of that kind first.
    pub fn start<S: Scheduler>(&mut self, scheduler: &mut S, kind: TimerKind) -> TimerHandle {
        self.stop(scheduler, kind);
        let handle = scheduler.schedule_tick(kind, TICK_INTERVAL);
        *self.slot(kind) = Some(handle);
        handle
    }

    /// Returns whether a timer was actually running.
    pub fn stop<S: Scheduler>(&mut self, scheduler: &mut S, kind: TimerKind) -> bool {
        match self.slot(kind).take() {
            Some(handle) => {
                scheduler.cancel(handle);
                true
            }
            None => false,
        }
    }

    pub fn stop_all<S: Scheduler>(&mut self, scheduler: &mut S) {
        self.stop(scheduler, TimerKind::Question);
        self.stop(scheduler, TimerKind::Global);
    }

    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.global == Some(handle) || self.question == Some(handle)
    }

    pub fn is_running(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Global => self.global.is_some(),
            TimerKind::Question => self.question.is_some(),
        }
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::Global => &mut self.global,
            TimerKind::Question => &mut self.question,
        }
    }
}
