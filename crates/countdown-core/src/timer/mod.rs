mod engine;
mod tick;

pub use engine::{TimerEngine, TimerSession, TimerState};
pub use tick::{ScheduleSlot, ScheduleToken};
