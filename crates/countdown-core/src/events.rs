use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmMode, DismissReason};

/// Every state change in the engine or alarm produces an Event.
/// Displays and listeners subscribe to them; commands that change nothing
/// produce none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A new session was created from the pending input.
    TimerStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// A paused session was set running again.
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Remaining time dropped on a tick without reaching zero.
    TimerTicked {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerExpired {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerDeleted {
        at: DateTime<Utc>,
    },
    AlarmTriggered {
        mode: AlarmMode,
        at: DateTime<Utc>,
    },
    AlarmDismissed {
        reason: DismissReason,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Stable name of the event kind, as used in the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerResumed { .. } => "timer_resumed",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerTicked { .. } => "timer_ticked",
            Event::TimerExpired { .. } => "timer_expired",
            Event::TimerReset { .. } => "timer_reset",
            Event::TimerDeleted { .. } => "timer_deleted",
            Event::AlarmTriggered { .. } => "alarm_triggered",
            Event::AlarmDismissed { .. } => "alarm_dismissed",
        }
    }
}
