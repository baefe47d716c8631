//! Timer engine implementation.
//!
//! The timer engine is a deadline-based state machine. It does not use
//! internal threads - the caller delivers ticks by calling `tick()` with the
//! token it got when the tick source was armed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --tick(0s left)--> Expired
//!                 Running --pause--> Paused --start--> Running
//! {Running, Paused, Expired} --reset--> Paused
//! {any} --delete--> Idle
//! ```
//!
//! Remaining time is recomputed on every tick from an absolute deadline,
//! so late or coalesced ticks never accumulate drift.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SystemClock);
//! engine.set_input(DurationInput::new(0, 0, 5));
//! engine.start();
//! // Once per second:
//! if let Some(token) = engine.tick_token() {
//!     engine.tick(token); // Returns Some(Event::TimerExpired) at zero
//! }
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::tick::{ScheduleSlot, ScheduleToken};
use crate::clock::Clock;
use crate::duration::{format_hms, DurationInput};
use crate::events::Event;
use crate::progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// No session exists yet.
    Idle,
    Running,
    Paused,
    /// Remaining time reached zero. Only `reset` or `delete` leave it.
    Expired,
}

/// A started countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    original_secs: u64,
    remaining_secs: u64,
    state: TimerState,
}

impl TimerSession {
    pub fn original_secs(&self) -> u64 {
        self.original_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn state(&self) -> TimerState {
        self.state
    }
}

type ExpiryListener = Box<dyn FnMut(&TimerSession) + Send>;

/// Core countdown engine.
///
/// Owns the session and the tick source. All commands are no-ops (returning
/// `None`) when they do not apply to the current state.
pub struct TimerEngine<C> {
    clock: C,
    input: DurationInput,
    session: Option<TimerSession>,
    /// Instant at which a running session reaches zero.
    deadline: Option<Instant>,
    /// Exact time left while the session is not running.
    remainder: Duration,
    ticks: ScheduleSlot,
    on_expire: Option<ExpiryListener>,
}

impl<C: Clock> TimerEngine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            input: DurationInput::zero(),
            session: None,
            deadline: None,
            remainder: Duration::ZERO,
            ticks: ScheduleSlot::new(),
            on_expire: None,
        }
    }

    /// Register the callback invoked once each time a session expires.
    /// Replaces any previous listener.
    pub fn on_expire<F>(&mut self, listener: F)
    where
        F: FnMut(&TimerSession) + Send + 'static,
    {
        self.on_expire = Some(Box::new(listener));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.session.map(|s| s.state).unwrap_or(TimerState::Idle)
    }

    pub fn session(&self) -> Option<&TimerSession> {
        self.session.as_ref()
    }

    pub fn has_started(&self) -> bool {
        self.session.is_some()
    }

    pub fn input(&self) -> DurationInput {
        self.input
    }

    pub fn original_secs(&self) -> u64 {
        self.session.map(|s| s.original_secs).unwrap_or(0)
    }

    pub fn remaining_secs(&self) -> u64 {
        self.session.map(|s| s.remaining_secs).unwrap_or(0)
    }

    /// Seconds shown to the user: the countdown once started, the pending
    /// input before that.
    pub fn display_secs(&self) -> u64 {
        match self.session {
            Some(session) => session.remaining_secs,
            None => self.input.total_secs(),
        }
    }

    pub fn formatted_time(&self) -> String {
        format_hms(self.display_secs())
    }

    /// 0.0 .. 1.0 fraction of the session still remaining; 1.0 when unstarted.
    pub fn fraction(&self) -> f64 {
        match self.session {
            Some(session) => progress::fraction(session.original_secs, session.remaining_secs),
            None => 1.0,
        }
    }

    pub fn can_start(&self) -> bool {
        match self.session {
            Some(session) => session.remaining_secs > 0,
            None => !self.input.is_zero(),
        }
    }

    /// Whether a reset would change anything.
    pub fn can_reset(&self) -> bool {
        self.session
            .map(|s| s.remaining_secs != s.original_secs)
            .unwrap_or(false)
    }

    /// Token the tick source was armed with, while running.
    pub fn tick_token(&self) -> Option<ScheduleToken> {
        self.ticks.token()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the pending input. Takes effect for the next new session.
    pub fn set_input(&mut self, input: DurationInput) {
        self.input = input;
    }

    pub fn start(&mut self) -> Option<Event> {
        if !self.can_start() {
            debug!("start ignored: nothing to count down");
            return None;
        }
        match self.session {
            None => {
                let duration_secs = self.input.total_secs();
                self.session = Some(TimerSession {
                    original_secs: duration_secs,
                    remaining_secs: duration_secs,
                    state: TimerState::Running,
                });
                self.arm(Duration::from_secs(duration_secs));
                info!(duration_secs, "timer started");
                Some(Event::TimerStarted {
                    duration_secs,
                    at: Utc::now(),
                })
            }
            Some(mut session) if session.state == TimerState::Paused => {
                session.state = TimerState::Running;
                self.session = Some(session);
                self.arm(self.remainder);
                info!(remaining_secs = session.remaining_secs, "timer resumed");
                Some(Event::TimerResumed {
                    remaining_secs: session.remaining_secs,
                    at: Utc::now(),
                })
            }
            // Already running.
            Some(_) => None,
        }
    }

    /// Stop the countdown, keeping the exact time left (sub-second part
    /// included) for the next resume. A pause that lands on or after the
    /// deadline expires the session instead.
    pub fn pause(&mut self) -> Option<Event> {
        if self.state() != TimerState::Running {
            return None;
        }
        let deadline = self.deadline?;
        let left = deadline.saturating_duration_since(self.clock.now());
        if left.is_zero() {
            return self.expire();
        }

        let session = self.session.as_mut()?;
        session.state = TimerState::Paused;
        session.remaining_secs = ceil_secs(left).min(session.remaining_secs);
        let remaining_secs = session.remaining_secs;
        self.disarm();
        self.remainder = left;
        info!(remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs,
            at: Utc::now(),
        })
    }

    /// Restore the full duration and stop. Does not resume.
    pub fn reset(&mut self) -> Option<Event> {
        let session = self.session.as_mut()?;
        session.remaining_secs = session.original_secs;
        session.state = TimerState::Paused;
        let remaining_secs = session.remaining_secs;
        self.disarm();
        self.remainder = Duration::from_secs(remaining_secs);
        info!(remaining_secs, "timer reset");
        Some(Event::TimerReset {
            remaining_secs,
            at: Utc::now(),
        })
    }

    /// Drop the session and clear the input. No-op when there is neither.
    pub fn delete(&mut self) -> Option<Event> {
        if self.session.is_none() && self.input.is_zero() {
            return None;
        }
        self.disarm();
        self.session = None;
        self.remainder = Duration::ZERO;
        self.input = DurationInput::zero();
        info!("timer deleted");
        Some(Event::TimerDeleted { at: Utc::now() })
    }

    /// Deliver one tick. Returns `Some(Event::TimerExpired)` when the
    /// session reaches zero, `Some(Event::TimerTicked)` when the remaining
    /// time changed, and `None` for stale or redundant ticks.
    pub fn tick(&mut self, token: ScheduleToken) -> Option<Event> {
        if !self.ticks.is_current(token) {
            debug!(generation = token.generation(), "stale tick ignored");
            return None;
        }
        let deadline = self.deadline?;
        let now = self.clock.now();
        let session = self.session.as_mut()?;
        if session.state != TimerState::Running {
            return None;
        }

        let left = ceil_secs(deadline.saturating_duration_since(now));
        let remaining_secs = left.min(session.remaining_secs);
        if remaining_secs == 0 {
            return self.expire();
        }
        if remaining_secs == session.remaining_secs {
            return None;
        }
        session.remaining_secs = remaining_secs;
        Some(Event::TimerTicked {
            remaining_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Running -> Expired. Disarms and notifies the listener.
    fn expire(&mut self) -> Option<Event> {
        let session = self.session.as_mut()?;
        session.remaining_secs = 0;
        session.state = TimerState::Expired;
        let expired = *session;
        self.disarm();
        self.remainder = Duration::ZERO;
        info!(duration_secs = expired.original_secs, "timer expired");
        if let Some(listener) = self.on_expire.as_mut() {
            listener(&expired);
        }
        Some(Event::TimerExpired {
            duration_secs: expired.original_secs,
            at: Utc::now(),
        })
    }

    fn arm(&mut self, left: Duration) {
        self.deadline = Some(self.clock.now() + left);
        let token = self.ticks.arm();
        debug!(generation = token.generation(), "tick source armed");
    }

    fn disarm(&mut self) {
        self.deadline = None;
        if self.ticks.disarm() {
            debug!("tick source disarmed");
        }
    }
}

impl<C> fmt::Debug for TimerEngine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerEngine")
            .field("input", &self.input)
            .field("session", &self.session)
            .field("deadline", &self.deadline)
            .field("remainder", &self.remainder)
            .field("ticks", &self.ticks)
            .field("on_expire", &self.on_expire.is_some())
            .finish()
    }
}

/// Whole seconds, rounding any fraction up.
fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
