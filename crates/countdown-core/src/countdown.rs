//! The countdown: timer engine, alarm and preferences wired together.
//!
//! [`Countdown`] is what a UI talks to. It forwards user commands to the
//! engine, triggers the alarm from inside the same tick that expires the
//! timer, keeps preferences in the settings store, and pushes a fresh
//! [`DisplayState`] to the display port after every change.
//!
//! Every user command counts as an interaction: a ringing alarm is
//! dismissed before the command itself is applied.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::alarm::{AlarmController, AlarmMode};
use crate::clock::{Clock, SystemClock};
use crate::display::{DisplayPort, DisplayState};
use crate::duration::DurationInput;
use crate::error::{self, SettingsError};
use crate::events::Event;
use crate::progress::{self, IndicatorShape, ProgressShape};
use crate::storage::{self, Config, FileStore, Preferences, SettingsStore};
use crate::timer::{ScheduleToken, TimerEngine, TimerSession, TimerState};

pub struct Countdown<C> {
    engine: TimerEngine<C>,
    alarm: AlarmController<C>,
    prefs: Preferences,
    store: Box<dyn SettingsStore>,
    display: Box<dyn DisplayPort>,
}

impl<C: Clock + Clone> Countdown<C> {
    /// Build a countdown from stored preferences. The last-used duration
    /// becomes the pending input.
    pub fn new(clock: C, store: Box<dyn SettingsStore>, display: Box<dyn DisplayPort>) -> Self {
        let prefs = Preferences::load(store.as_ref());
        let mut engine = TimerEngine::new(clock.clone());
        engine.set_input(prefs.duration);
        let alarm = AlarmController::new(clock, prefs.alarm_mode);

        let mut countdown = Self {
            engine,
            alarm,
            prefs,
            store,
            display,
        };
        countdown.refresh();
        countdown
    }

    /// Build a countdown whose preferences live in `dir`, at the settings
    /// file named by `config`. Creates `dir` if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` holds an invalid value or `dir` cannot
    /// be created.
    pub fn open_in(
        clock: C,
        dir: &Path,
        config: &Config,
        display: Box<dyn DisplayPort>,
    ) -> error::Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(dir)?;
        let store = FileStore::open(config.settings_path_in(dir));
        info!(path = %store.path().display(), "settings store opened");
        Ok(Self::new(clock, Box::new(store), display))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine<C> {
        &self.engine
    }

    pub fn alarm(&self) -> &AlarmController<C> {
        &self.alarm
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn state(&self) -> TimerState {
        self.engine.state()
    }

    pub fn is_alarming(&self) -> bool {
        self.alarm.is_active()
    }

    pub fn tick_token(&self) -> Option<ScheduleToken> {
        self.engine.tick_token()
    }

    /// Pending alarm auto-dismiss, if the alarm is ringing.
    pub fn alarm_timeout(&self) -> Option<(ScheduleToken, Instant)> {
        self.alarm.timeout()
    }

    pub fn view(&self) -> DisplayState {
        let fraction = self.engine.fraction();
        let shape = ProgressShape::for_indicator(self.prefs.indicator.shape);
        DisplayState {
            state: self.engine.state(),
            formatted_time: self.engine.formatted_time(),
            remaining_secs: self.engine.remaining_secs(),
            original_secs: self.engine.original_secs(),
            fraction,
            progress: progress::geometry(shape, fraction),
            alarming: self.alarm.is_active(),
            alarm_mode: self.alarm.mode(),
            can_start: self.engine.can_start(),
            can_reset: self.engine.can_reset(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Register the listener called when a session expires. Replaces any
    /// listener registered before; the alarm is triggered regardless.
    pub fn on_expire<F>(&mut self, listener: F)
    where
        F: FnMut(&TimerSession) + Send + 'static,
    {
        self.engine.on_expire(listener);
    }

    pub fn set_input(&mut self, input: DurationInput) -> Vec<Event> {
        self.command(|countdown| {
            countdown.engine.set_input(input);
            None
        })
    }

    pub fn start(&mut self) -> Vec<Event> {
        self.command(|countdown| {
            let starts_session = !countdown.engine.has_started();
            let event = countdown.engine.start()?;
            if starts_session {
                countdown.prefs.duration = countdown.engine.input();
                let result = countdown.prefs.save_duration(countdown.store.as_mut());
                log_persist_failure("duration", result);
            }
            Some(event)
        })
    }

    pub fn pause(&mut self) -> Vec<Event> {
        self.command(|countdown| countdown.engine.pause())
    }

    pub fn reset(&mut self) -> Vec<Event> {
        self.command(|countdown| countdown.engine.reset())
    }

    pub fn delete(&mut self) -> Vec<Event> {
        self.command(|countdown| countdown.engine.delete())
    }

    /// A user input that is not a command (key press, click, ...).
    pub fn interact(&mut self) -> Vec<Event> {
        self.command(|_| None)
    }

    pub fn set_alarm_mode(&mut self, mode: AlarmMode) -> Vec<Event> {
        self.command(|countdown| {
            countdown.alarm.set_mode(mode);
            countdown.prefs.alarm_mode = mode;
            let result = countdown.prefs.save_alarm_mode(countdown.store.as_mut());
            log_persist_failure("alarm", result);
            None
        })
    }

    pub fn set_indicator_shape(&mut self, shape: IndicatorShape) -> Vec<Event> {
        self.command(|countdown| {
            countdown.prefs.indicator.shape = shape;
            let result = countdown.prefs.save_indicator(countdown.store.as_mut());
            log_persist_failure("indicator", result);
            None
        })
    }

    pub fn set_indicator_color(&mut self, color: impl Into<String>) -> Vec<Event> {
        let color = color.into();
        self.command(|countdown| {
            countdown.prefs.indicator.color = color;
            let result = countdown.prefs.save_indicator(countdown.store.as_mut());
            log_persist_failure("indicator", result);
            None
        })
    }

    /// Deliver a periodic tick. Expiry and the alarm trigger it causes are
    /// applied together before this returns.
    pub fn tick(&mut self, token: ScheduleToken) -> Vec<Event> {
        let mut events = Vec::new();
        if let Some(event) = self.engine.tick(token) {
            let expired = matches!(event, Event::TimerExpired { .. });
            events.push(event);
            if expired {
                events.extend(self.alarm.trigger());
            }
            self.refresh();
        }
        events
    }

    /// Deliver the alarm's auto-dismiss timeout.
    pub fn alarm_timeout_elapsed(&mut self, token: ScheduleToken) -> Vec<Event> {
        let events: Vec<Event> = self.alarm.on_timeout(token).into_iter().collect();
        if !events.is_empty() {
            self.refresh();
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn command<F>(&mut self, apply: F) -> Vec<Event>
    where
        F: FnOnce(&mut Self) -> Option<Event>,
    {
        let mut events: Vec<Event> = self.alarm.interact().into_iter().collect();
        if let Some(event) = apply(self) {
            let expired = matches!(event, Event::TimerExpired { .. });
            events.push(event);
            if expired {
                events.extend(self.alarm.trigger());
            }
        }
        self.refresh();
        events
    }

    fn refresh(&mut self) {
        let view = self.view();
        self.display.render(&view);
        self.display.set_title(&view.title());
    }
}

impl Countdown<SystemClock> {
    /// Real-time countdown with preferences in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory is unusable or `config` is
    /// invalid.
    pub fn open(config: &Config, display: Box<dyn DisplayPort>) -> error::Result<Self> {
        Self::open_in(SystemClock, &storage::data_dir()?, config, display)
    }
}

fn log_persist_failure(key: &str, result: Result<(), SettingsError>) {
    if let Err(err) = result {
        warn!(key, error = %err, "failed to persist setting");
    }
}
