//! Expiry alarm.
//!
//! The alarm goes active when the timer expires (unless the mode is
//! `None`) and goes inactive again either when the user interacts or when
//! the fixed auto-dismiss window runs out, whichever comes first.
//!
//! ```text
//! Inactive --trigger--> Active --dismiss(Interaction | Timeout)--> Inactive
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::events::Event;
use crate::timer::{ScheduleSlot, ScheduleToken};

/// How long an alarm stays active without interaction.
pub const AUTO_DISMISS_AFTER: Duration = Duration::from_secs(10);

/// Visual cadence of the alarm. Only `None` changes behaviour: it disables
/// triggering altogether.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmMode {
    None,
    Fade,
    Slow,
    #[default]
    Fast,
}

impl AlarmMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AlarmMode::None => "none",
            AlarmMode::Fade => "fade",
            AlarmMode::Slow => "slow",
            AlarmMode::Fast => "fast",
        }
    }

    pub fn is_enabled(self) -> bool {
        self != AlarmMode::None
    }
}

impl fmt::Display for AlarmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AlarmMode::None),
            "fade" => Ok(AlarmMode::Fade),
            "slow" => Ok(AlarmMode::Slow),
            "fast" => Ok(AlarmMode::Fast),
            other => Err(format!("unknown alarm mode: {other}")),
        }
    }
}

/// Why an alarm stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissReason {
    /// Any user input.
    Interaction,
    /// The auto-dismiss window elapsed.
    Timeout,
}

/// A ringing alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmSession {
    pub mode: AlarmMode,
    pub active: bool,
    pub deadline: Instant,
}

/// Owns the alarm state and its auto-dismiss timeout.
#[derive(Debug)]
pub struct AlarmController<C> {
    clock: C,
    mode: AlarmMode,
    session: Option<AlarmSession>,
    timeout: ScheduleSlot,
}

impl<C: Clock> AlarmController<C> {
    pub fn new(clock: C, mode: AlarmMode) -> Self {
        Self {
            clock,
            mode,
            session: None,
            timeout: ScheduleSlot::new(),
        }
    }

    pub fn mode(&self) -> AlarmMode {
        self.mode
    }

    /// Select the mode used by future triggers. A ringing alarm keeps the
    /// mode it was triggered with.
    pub fn set_mode(&mut self, mode: AlarmMode) {
        self.mode = mode;
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some_and(|s| s.active)
    }

    pub fn session(&self) -> Option<&AlarmSession> {
        self.session.as_ref()
    }

    /// Token and instant of the pending auto-dismiss, while active.
    pub fn timeout(&self) -> Option<(ScheduleToken, Instant)> {
        let token = self.timeout.token()?;
        let session = self.session?;
        Some((token, session.deadline))
    }

    /// Start ringing. No-op when the mode is `None` or already ringing.
    pub fn trigger(&mut self) -> Option<Event> {
        if !self.mode.is_enabled() {
            debug!("alarm disabled, not triggering");
            return None;
        }
        if self.is_active() {
            return None;
        }
        let deadline = self.clock.now() + AUTO_DISMISS_AFTER;
        self.session = Some(AlarmSession {
            mode: self.mode,
            active: true,
            deadline,
        });
        self.timeout.arm();
        info!(mode = %self.mode, "alarm triggered");
        Some(Event::AlarmTriggered {
            mode: self.mode,
            at: Utc::now(),
        })
    }

    /// Stop ringing. Idempotent.
    pub fn dismiss(&mut self, reason: DismissReason) -> Option<Event> {
        let session = self.session.take()?;
        self.timeout.disarm();
        info!(mode = %session.mode, ?reason, "alarm dismissed");
        Some(Event::AlarmDismissed {
            reason,
            at: Utc::now(),
        })
    }

    /// Any user input dismisses the alarm.
    pub fn interact(&mut self) -> Option<Event> {
        self.dismiss(DismissReason::Interaction)
    }

    /// Deliver the auto-dismiss timeout. Stale tokens and early firings are
    /// ignored.
    pub fn on_timeout(&mut self, token: ScheduleToken) -> Option<Event> {
        if !self.timeout.is_current(token) {
            debug!(generation = token.generation(), "stale alarm timeout ignored");
            return None;
        }
        let deadline = self.session?.deadline;
        if self.clock.now() < deadline {
            return None;
        }
        self.dismiss(DismissReason::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn controller(mode: AlarmMode) -> (AlarmController<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (AlarmController::new(clock.clone(), mode), clock)
    }

    #[test]
    fn trigger_activates_and_times_out_after_ten_seconds() {
        let (mut alarm, clock) = controller(AlarmMode::Slow);
        assert!(alarm.trigger().is_some());
        assert!(alarm.is_active());
        let (token, _) = alarm.timeout().unwrap();

        clock.advance_secs(9);
        assert!(alarm.on_timeout(token).is_none());
        assert!(alarm.is_active());

        clock.advance_secs(1);
        assert!(matches!(
            alarm.on_timeout(token),
            Some(Event::AlarmDismissed { reason: DismissReason::Timeout, .. })
        ));
        assert!(!alarm.is_active());
    }

    #[test]
    fn mode_none_never_triggers() {
        let (mut alarm, _clock) = controller(AlarmMode::None);
        assert!(alarm.trigger().is_none());
        assert!(!alarm.is_active());
        assert!(alarm.timeout().is_none());
    }

    #[test]
    fn interaction_cancels_pending_timeout() {
        let (mut alarm, clock) = controller(AlarmMode::Fade);
        alarm.trigger();
        let (token, _) = alarm.timeout().unwrap();

        clock.advance_secs(3);
        assert!(matches!(
            alarm.interact(),
            Some(Event::AlarmDismissed { reason: DismissReason::Interaction, .. })
        ));
        assert!(!alarm.is_active());

        clock.advance_secs(7);
        assert!(alarm.on_timeout(token).is_none());
    }

    #[test]
    fn dismiss_is_idempotent() {
        let (mut alarm, _clock) = controller(AlarmMode::Fast);
        assert!(alarm.dismiss(DismissReason::Interaction).is_none());
        alarm.trigger();
        assert!(alarm.dismiss(DismissReason::Interaction).is_some());
        assert!(alarm.dismiss(DismissReason::Timeout).is_none());
    }

    #[test]
    fn retrigger_while_active_keeps_deadline() {
        let (mut alarm, clock) = controller(AlarmMode::Fast);
        alarm.trigger();
        let (_, deadline) = alarm.timeout().unwrap();
        clock.advance_secs(4);
        assert!(alarm.trigger().is_none());
        assert_eq!(alarm.timeout().unwrap().1, deadline);
    }

    #[test]
    fn set_mode_applies_to_next_trigger() {
        let (mut alarm, _clock) = controller(AlarmMode::Fast);
        alarm.trigger();
        alarm.set_mode(AlarmMode::Slow);
        assert_eq!(alarm.session().unwrap().mode, AlarmMode::Fast);

        alarm.interact();
        alarm.trigger();
        assert_eq!(alarm.session().unwrap().mode, AlarmMode::Slow);
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("FAST".parse::<AlarmMode>(), Ok(AlarmMode::Fast));
        assert_eq!("none".parse::<AlarmMode>(), Ok(AlarmMode::None));
        assert!("loud".parse::<AlarmMode>().is_err());
    }
}
