//! Sweep overlay animation.
//!
//! The controller alternates between two timers. While idle, a single idle
//! timer is pending; when it fires a sweep starts and a frame timer takes its
//! place. Each frame tick is handed to exactly one render call as a
//! [`FrameTick`], and that render advances the sweep, re-arming either the
//! next frame or, once the sweep passes the progress angle, the idle timer.

use std::time::{Duration, Instant};

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// One-shot timer service provided by the host.
pub trait Scheduler {
    /// Schedule a timer that fires once after `delay`.
    fn after(&mut self, delay: Duration) -> TimerHandle;
    /// Drop a pending timer. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

// ============================================================================
// TIMER QUEUE
// ============================================================================

/// Deadline-ordered one-shot timers over an externally advanced clock.
#[derive(Debug)]
pub struct TimerQueue {
    now: Instant,
    next_id: u64,
    pending: Vec<(Instant, TimerHandle)>,
}

impl TimerQueue {
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(deadline, _)| *deadline).min()
    }

    /// Move the clock to `now` (never backwards) and pop the earliest timer
    /// that is due, if any.
    pub fn pop_due(&mut self, now: Instant) -> Option<TimerHandle> {
        self.now = self.now.max(now);
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, (deadline, _))| *deadline <= self.now)
            .min_by_key(|(_, (deadline, handle))| (*deadline, handle.0))
            .map(|(index, _)| index)?;
        Some(self.pending.remove(index).1)
    }
}

impl Scheduler for TimerQueue {
    fn after(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push((self.now + delay, handle));
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|(_, pending)| *pending != handle);
    }
}

// ============================================================================
// CONTROLLER
// ============================================================================

/// Timing of the sweep cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    /// Wait between the end of one sweep and the start of the next.
    pub idle_period: Duration,
    /// Delay between overlay frames while sweeping.
    pub frame_interval: Duration,
    /// Degrees the overlay advances per frame.
    pub step_degrees: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            idle_period: Duration::from_millis(1000),
            frame_interval: Duration::from_millis(5),
            step_degrees: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationPhase {
    /// No timer pending; the widget is hidden or was never shown.
    Stopped,
    /// Waiting for the idle timer.
    Idle,
    /// Overlay leading edge at `angle` degrees, frame timer pending.
    Sweeping { angle: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Idle,
    Frame,
}

/// Permission to render one overlay frame. Produced by a frame timer and
/// consumed by the render it triggers.
#[derive(Debug)]
#[must_use = "a frame tick must be passed to the render it triggers"]
pub struct FrameTick {
    _private: (),
}

#[derive(Debug)]
pub struct AnimationController {
    config: AnimationConfig,
    phase: AnimationPhase,
    armed: Option<(TimerHandle, TimerKind)>,
}

impl AnimationController {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            phase: AnimationPhase::Stopped,
            armed: None,
        }
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn is_sweeping(&self) -> bool {
        matches!(self.phase, AnimationPhase::Sweeping { .. })
    }

    /// Current overlay leading edge; 0 outside a sweep.
    pub fn sweep_angle(&self) -> f64 {
        match self.phase {
            AnimationPhase::Sweeping { angle } => angle,
            _ => 0.0,
        }
    }

    pub fn has_pending_timer(&self) -> bool {
        self.armed.is_some()
    }

    /// Begin waiting for the first sweep. No-op when already running.
    pub fn start(&mut self, scheduler: &mut dyn Scheduler) {
        if self.phase != AnimationPhase::Stopped {
            return;
        }
        self.phase = AnimationPhase::Idle;
        self.arm(scheduler, TimerKind::Idle);
    }

    /// Cancel whichever timer is pending and drop any sweep in flight.
    pub fn stop(&mut self, scheduler: &mut dyn Scheduler) {
        if let Some((handle, _)) = self.armed.take() {
            scheduler.cancel(handle);
        }
        self.phase = AnimationPhase::Stopped;
    }

    /// Dispatch a fired timer. Returns a tick when a frame should be rendered.
    pub fn on_timer(&mut self, handle: TimerHandle, scheduler: &mut dyn Scheduler) -> Option<FrameTick> {
        let kind = match self.armed {
            Some((armed, kind)) if armed == handle => kind,
            _ => return None,
        };
        self.armed = None;

        match (kind, self.phase) {
            (TimerKind::Idle, AnimationPhase::Idle) => {
                tracing::trace!("sweep started");
                self.phase = AnimationPhase::Sweeping { angle: 0.0 };
                self.arm(scheduler, TimerKind::Frame);
                None
            }
            (TimerKind::Frame, AnimationPhase::Sweeping { .. }) => Some(FrameTick { _private: () }),
            _ => None,
        }
    }

    /// Advance the sweep for one ticked frame against the progress angle
    /// `target`. Returns the overlay span to draw, or `None` once the sweep
    /// has passed the target and the controller went back to idle.
    pub fn advance(&mut self, tick: FrameTick, target: f64, scheduler: &mut dyn Scheduler) -> Option<f64> {
        let FrameTick { .. } = tick;
        let AnimationPhase::Sweeping { angle } = self.phase else {
            return None;
        };

        if angle <= target {
            self.phase = AnimationPhase::Sweeping {
                angle: angle + self.config.step_degrees,
            };
            self.arm(scheduler, TimerKind::Frame);
            Some(angle)
        } else {
            tracing::trace!(angle, target, "sweep finished");
            self.phase = AnimationPhase::Idle;
            self.arm(scheduler, TimerKind::Idle);
            None
        }
    }

    fn arm(&mut self, scheduler: &mut dyn Scheduler, kind: TimerKind) {
        if let Some((stale, _)) = self.armed.take() {
            scheduler.cancel(stale);
        }
        let delay = match kind {
            TimerKind::Idle => self.config.idle_period,
            TimerKind::Frame => self.config.frame_interval,
        };
        self.armed = Some((scheduler.after(delay), kind));
    }
}
