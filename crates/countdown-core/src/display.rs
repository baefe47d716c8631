//! What the renderer sees.
//!
//! [`DisplayState`] is a plain snapshot recomputed from the engine and
//! alarm on every refresh; nothing in it is cached between refreshes.

use serde::{Deserialize, Serialize};

use crate::alarm::AlarmMode;
use crate::progress::StrokeGeometry;
use crate::timer::TimerState;

/// Title shown whenever the timer is not running.
pub const IDLE_TITLE: &str = "Countdown";

/// Snapshot handed to the display collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub state: TimerState,
    /// Zero-padded `HH:MM:SS`.
    pub formatted_time: String,
    pub remaining_secs: u64,
    pub original_secs: u64,
    pub fraction: f64,
    pub progress: StrokeGeometry,
    pub alarming: bool,
    pub alarm_mode: AlarmMode,
    pub can_start: bool,
    pub can_reset: bool,
}

impl DisplayState {
    /// Window/page title for this snapshot.
    pub fn title(&self) -> String {
        if self.state == TimerState::Running {
            self.formatted_time.clone()
        } else {
            IDLE_TITLE.to_string()
        }
    }
}

/// Port through which the engine publishes to the UI.
pub trait DisplayPort: Send {
    fn render(&mut self, view: &DisplayState);

    fn set_title(&mut self, _title: &str) {} // default no-op
}

/// Display that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDisplay;

impl DisplayPort for NullDisplay {
    fn render(&mut self, _view: &DisplayState) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{geometry, IndicatorShape, ProgressShape};

    fn view(state: TimerState) -> DisplayState {
        DisplayState {
            state,
            formatted_time: "00:01:05".into(),
            remaining_secs: 65,
            original_secs: 120,
            fraction: 65.0 / 120.0,
            progress: geometry(ProgressShape::for_indicator(IndicatorShape::Ring), 65.0 / 120.0),
            alarming: false,
            alarm_mode: AlarmMode::Fast,
            can_start: true,
            can_reset: true,
        }
    }

    #[test]
    fn title_shows_countdown_only_while_running() {
        assert_eq!(view(TimerState::Running).title(), "00:01:05");
        assert_eq!(view(TimerState::Paused).title(), IDLE_TITLE);
        assert_eq!(view(TimerState::Expired).title(), IDLE_TITLE);
        assert_eq!(view(TimerState::Idle).title(), IDLE_TITLE);
    }
}
