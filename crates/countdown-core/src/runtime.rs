//! Tokio driver for a [`Countdown`].
//!
//! One task owns the countdown and multiplexes every event source through a
//! single `select!`: commands from handles, the periodic tick while the
//! engine is running, and the alarm's auto-dismiss deadline while it rings.
//! Nothing else touches the countdown, so no locking is needed and a tick
//! can never interleave with a command.

use std::future::pending;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::alarm::AlarmMode;
use crate::clock::Clock;
use crate::countdown::Countdown;
use crate::display::DisplayState;
use crate::duration::DurationInput;
use crate::events::Event;
use crate::progress::IndicatorShape;
use crate::timer::ScheduleToken;

const EVENT_CAPACITY: usize = 64;

/// Shortest tick period the driver accepts; shorter requests are raised to it.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// A user command for the driver task.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetInput(DurationInput),
    Start,
    Pause,
    Reset,
    Delete,
    Interact,
    SetAlarmMode(AlarmMode),
    SetIndicatorShape(IndicatorShape),
    SetIndicatorColor(String),
    Shutdown,
}

/// Cloneable handle to a running driver.
#[derive(Debug, Clone)]
pub struct CountdownHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<DisplayState>,
    events: broadcast::Sender<Event>,
}

impl CountdownHandle {
    /// Queue a command. Returns `false` once the driver has stopped.
    pub fn send(&self, command: Command) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn start(&self) -> bool {
        self.send(Command::Start)
    }

    pub fn pause(&self) -> bool {
        self.send(Command::Pause)
    }

    pub fn reset(&self) -> bool {
        self.send(Command::Reset)
    }

    pub fn delete(&self) -> bool {
        self.send(Command::Delete)
    }

    pub fn interact(&self) -> bool {
        self.send(Command::Interact)
    }

    pub fn shutdown(&self) -> bool {
        self.send(Command::Shutdown)
    }

    /// Latest display snapshot.
    pub fn view(&self) -> DisplayState {
        self.view.borrow().clone()
    }

    /// Receiver that is notified on every display change.
    pub fn watch(&self) -> watch::Receiver<DisplayState> {
        self.view.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

/// Spawn the driver task on the current tokio runtime.
///
/// `tick_interval` is raised to [`MIN_TICK_INTERVAL`] if shorter.
pub fn spawn<C>(countdown: Countdown<C>, tick_interval: Duration) -> (CountdownHandle, JoinHandle<()>)
where
    C: Clock + Clone + 'static,
{
    let tick_interval = tick_interval.max(MIN_TICK_INTERVAL);
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(countdown.view());
    let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

    let handle = CountdownHandle {
        commands: command_tx,
        view: view_rx,
        events: event_tx.clone(),
    };
    let task = tokio::spawn(run(countdown, tick_interval, command_rx, view_tx, event_tx));
    (handle, task)
}

async fn run<C>(
    mut countdown: Countdown<C>,
    tick_interval: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    view: watch::Sender<DisplayState>,
    events: broadcast::Sender<Event>,
) where
    C: Clock + Clone,
{
    info!(?tick_interval, "countdown driver started");
    let mut ticker: Option<(ScheduleToken, Interval)> = None;

    loop {
        // Follow the engine's tick source: a new arming gets a fresh
        // interval, a disarm drops it.
        match countdown.tick_token() {
            Some(token) if ticker.as_ref().map(|(t, _)| *t) != Some(token) => {
                let mut interval = interval_at(Instant::now() + tick_interval, tick_interval);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker = Some((token, interval));
            }
            Some(_) => {}
            None => ticker = None,
        }
        let alarm_timeout = countdown.alarm_timeout();

        let emitted = tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => apply(&mut countdown, command),
            },
            token = next_tick(&mut ticker) => countdown.tick(token),
            token = alarm_deadline(alarm_timeout) => countdown.alarm_timeout_elapsed(token),
        };

        for event in emitted {
            debug!(kind = event.kind(), "event");
            // No subscribers is fine.
            let _ = events.send(event);
        }
        // Preference changes alter the view without emitting events.
        let next = countdown.view();
        view.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    info!("countdown driver stopped");
}

fn apply<C: Clock + Clone>(countdown: &mut Countdown<C>, command: Command) -> Vec<Event> {
    match command {
        Command::SetInput(input) => countdown.set_input(input),
        Command::Start => countdown.start(),
        Command::Pause => countdown.pause(),
        Command::Reset => countdown.reset(),
        Command::Delete => countdown.delete(),
        Command::Interact => countdown.interact(),
        Command::SetAlarmMode(mode) => countdown.set_alarm_mode(mode),
        Command::SetIndicatorShape(shape) => countdown.set_indicator_shape(shape),
        Command::SetIndicatorColor(color) => countdown.set_indicator_color(color),
        // Handled by the loop.
        Command::Shutdown => Vec::new(),
    }
}

async fn next_tick(ticker: &mut Option<(ScheduleToken, Interval)>) -> ScheduleToken {
    match ticker {
        Some((token, interval)) => {
            interval.tick().await;
            *token
        }
        None => pending().await,
    }
}

async fn alarm_deadline(timeout: Option<(ScheduleToken, std::time::Instant)>) -> ScheduleToken {
    match timeout {
        Some((token, deadline)) => {
            sleep_until(Instant::from_std(deadline)).await;
            token
        }
        None => pending().await,
    }
}
