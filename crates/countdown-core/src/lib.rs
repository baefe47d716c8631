//! # Countdown Core Library
//!
//! This library provides the engine behind a single countdown timer with a
//! progress indicator and an expiry alarm. Rendering, persistence and the
//! window title are collaborators reached through ports, so the engine runs
//! and tests without any UI.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A deadline-based state machine; the caller delivers
//!   ticks, and stale ticks are rejected by generation tokens
//! - **Alarm**: Triggered on expiry, dismissed by interaction or after a
//!   fixed 10 second window
//! - **Progress**: Pure geometry for ring and square indicators
//! - **Storage**: JSON key-value preferences and TOML engine configuration
//! - **Runtime**: A single tokio task driving ticks, timeouts and commands
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core countdown state machine
//! - [`AlarmController`]: Alarm state machine
//! - [`Countdown`]: Engine, alarm and preferences wired together
//! - [`runtime::spawn`]: Real-time driver

pub mod alarm;
pub mod clock;
pub mod countdown;
pub mod display;
pub mod duration;
pub mod error;
pub mod events;
pub mod logging;
pub mod progress;
pub mod runtime;
pub mod storage;
pub mod timer;

pub use alarm::{AlarmController, AlarmMode, AlarmSession, DismissReason, AUTO_DISMISS_AFTER};
pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::Countdown;
pub use display::{DisplayPort, DisplayState, NullDisplay, IDLE_TITLE};
pub use duration::{format_hms, DurationInput};
pub use error::{ConfigError, CoreError, SettingsError};
pub use events::Event;
pub use progress::{IndicatorShape, ProgressShape, StrokeGeometry};
pub use runtime::{Command, CountdownHandle};
pub use storage::{Config, FileStore, MemoryStore, Preferences, SettingsStore};
pub use timer::{ScheduleToken, TimerEngine, TimerSession, TimerState};
