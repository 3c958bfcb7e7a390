//! Countdown timer widget.
//!
//! The widget counts whole seconds down from an initial value (10 by default)
//! while it is running, stops by itself at zero, and can be started, stopped
//! and reset by the user.
//!
//! # Lifecycle
//!
//! ```text
//!   Idle --start--> Running --tick (remaining > 1)--> Running
//!    ^  \             |  \
//!    |   reset        |   tick (remaining == 1)
//!    |                |        \
//!    +------stop------+         Expired --reset--> Idle
//! ```
//!
//! Every scheduled tick is owned by the widget instance through a
//! [`TickGuard`]. Leaving `Running` in any way (stop, reset, expiry, or
//! dropping the widget) drops the guard, which cancels the pending tick
//! command so it resolves without delivering a message.
//!
//! # bubbletea-rs Integration
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use lifecycle_widgets::countdown::{self, TimeoutMsg};
//! use lifecycle_widgets::Component;
//!
//! struct App {
//!     countdown: countdown::Model,
//!     done: bool,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut countdown = countdown::new(10);
//!         countdown.focus();
//!         (Self { countdown, done: false }, None)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         if let Some(timeout) = msg.downcast_ref::<TimeoutMsg>() {
//!             if timeout.id == self.countdown.id() {
//!                 self.done = true;
//!             }
//!         }
//!         self.countdown.update(&msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.countdown.view()
//!     }
//! }
//! ```

use crate::key::{self, Binding};
use crate::Component;
use bubbletea_rs::{tick as bubbletea_tick, Cmd, KeyMsg, Model as BubbleTeaModel, Msg};
use crossterm::event::KeyCode;
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Seconds on the clock for a fresh or reset widget.
pub const DEFAULT_SECONDS: u32 = 10;

/// Delay between ticks.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Observable state of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerState {
    /// Seconds left on the clock. Never negative.
    pub remaining_seconds: u32,
    /// Whether a tick is currently scheduled.
    pub is_running: bool,
}

/// The three states of the countdown state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not running, time left on the clock.
    Idle,
    /// Counting down.
    Running,
    /// Reached zero. Only `reset` leaves this state.
    Expired,
}

impl TimerState {
    /// Derives the state machine phase.
    pub fn phase(&self) -> Phase {
        if self.is_running {
            Phase::Running
        } else if self.remaining_seconds == 0 {
            Phase::Expired
        } else {
            Phase::Idle
        }
    }
}

/// Delivered once per elapsed interval while the countdown runs.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// Id of the countdown that scheduled this tick.
    pub id: i64,
    tag: i64,
}

/// Actions that can be sent to a countdown as a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Same as [`Model::start`].
    Start,
    /// Same as [`Model::stop`].
    Stop,
    /// Same as [`Model::reset`].
    Reset,
}

/// Message form of the start/stop/reset operations.
///
/// An id of zero addresses every countdown.
#[derive(Debug, Clone)]
pub struct ControlMsg {
    /// Target countdown, or zero for all.
    pub id: i64,
    /// What to do.
    pub action: Action,
}

/// Sent once when a countdown reaches zero by itself.
#[derive(Debug, Clone)]
pub struct TimeoutMsg {
    /// Id of the countdown that expired.
    pub id: i64,
}

/// Ownership of one scheduled tick.
///
/// The command created alongside the guard wraps a `bubbletea_rs::tick` and
/// checks the shared flag once the interval has passed. Dropping the guard
/// sets the flag, so a cancelled tick resolves to no message at all.
#[derive(Debug)]
pub struct TickGuard {
    cancelled: Arc<AtomicBool>,
}

impl TickGuard {
    fn arm(msg: TickMsg, interval: Duration) -> (Self, Cmd) {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let tick = bubbletea_tick(interval, move |_| Box::new(msg.clone()) as Msg);
        let cmd: Cmd = Box::pin(async move {
            let msg = tick.await;
            if flag.load(Ordering::SeqCst) {
                return None;
            }
            msg
        });
        (Self { cancelled }, cmd)
    }

    /// Whether the tick owned by this guard has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TickGuard {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Key bindings for the three controls.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Start counting down.
    pub start: Binding,
    /// Pause the countdown.
    pub stop: Binding,
    /// Put the initial value back on the clock.
    pub reset: Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            start: Binding::new(vec![KeyCode::Char('s')]).with_help("s", "start"),
            stop: Binding::new(vec![KeyCode::Char('p'), KeyCode::Char(' ')])
                .with_help("p", "stop"),
            reset: Binding::new(vec![KeyCode::Char('r')]).with_help("r", "reset"),
        }
    }
}

impl key::KeyMap for KeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.start, &self.stop, &self.reset]
    }
}

/// Styles for the rendered widget.
#[derive(Debug, Clone)]
pub struct Styles {
    /// The remaining-seconds readout.
    pub seconds: Style,
    /// Phase label.
    pub phase: Style,
    /// An available control.
    pub control: Style,
    /// A control that cannot be used in the current phase.
    pub disabled: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            seconds: Style::new().bold(true),
            phase: Style::new().foreground(Color::from("241")),
            control: Style::new().foreground(Color::from("212")),
            disabled: Style::new().foreground(Color::from("238")),
        }
    }
}

/// The countdown widget.
#[derive(Debug)]
pub struct Model {
    /// Value restored by [`Model::reset`].
    pub initial_seconds: u32,
    /// Delay between ticks.
    pub interval: Duration,
    /// Key bindings. Their enabled flags follow the running state.
    pub keymap: KeyMap,
    /// Rendering styles.
    pub styles: Styles,
    state: TimerState,
    id: i64,
    tag: i64,
    guard: Option<TickGuard>,
    focus: bool,
}

/// Creates a stopped countdown with one-second ticks.
pub fn new(seconds: u32) -> Model {
    new_with_interval(seconds, DEFAULT_INTERVAL)
}

/// Creates a stopped countdown with a custom tick interval.
///
/// The interval only changes how long a tick takes; each tick still removes
/// one second from the clock.
pub fn new_with_interval(seconds: u32, interval: Duration) -> Model {
    let mut m = Model {
        initial_seconds: seconds,
        interval,
        keymap: KeyMap::default(),
        styles: Styles::default(),
        state: TimerState {
            remaining_seconds: seconds,
            is_running: false,
        },
        id: next_id(),
        tag: 0,
        guard: None,
        focus: false,
    };
    m.sync_keymap();
    m
}

impl Default for Model {
    fn default() -> Self {
        new(DEFAULT_SECONDS)
    }
}

impl Model {
    /// Unique id of this instance.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Current state snapshot.
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Seconds left on the clock.
    pub fn remaining_seconds(&self) -> u32 {
        self.state.remaining_seconds
    }

    /// Whether the countdown is running.
    pub fn running(&self) -> bool {
        self.state.is_running
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Whether a tick is currently owned by this instance.
    pub fn tick_scheduled(&self) -> bool {
        self.guard.is_some()
    }

    /// Starts counting down.
    ///
    /// Returns the command that delivers the first tick. Does nothing and
    /// returns `None` when already running or when no time is left.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lifecycle_widgets::countdown::{self, Phase};
    ///
    /// let mut timer = countdown::new(10);
    /// assert!(timer.start().is_some());
    /// assert_eq!(timer.phase(), Phase::Running);
    ///
    /// // A second start does not arm a second tick chain.
    /// assert!(timer.start().is_none());
    ///
    /// let mut spent = countdown::new(0);
    /// assert!(spent.start().is_none());
    /// ```
    pub fn start(&mut self) -> Option<Cmd> {
        if self.state.is_running || self.state.remaining_seconds == 0 {
            return None;
        }
        self.state.is_running = true;
        self.tag += 1;
        info!(
            id = self.id,
            remaining = self.state.remaining_seconds,
            "countdown started"
        );
        let cmd = self.schedule();
        self.sync_keymap();
        Some(cmd)
    }

    /// Pauses the countdown and cancels the pending tick.
    ///
    /// The remaining time is kept, so a later [`Model::start`] resumes from
    /// it. Stopping a countdown that is not running does nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lifecycle_widgets::countdown;
    ///
    /// let mut timer = countdown::new(10);
    /// let _tick = timer.start();
    /// timer.stop();
    /// assert!(!timer.running());
    /// assert!(!timer.tick_scheduled());
    /// assert_eq!(timer.remaining_seconds(), 10);
    /// ```
    pub fn stop(&mut self) {
        if !self.state.is_running {
            return;
        }
        self.state.is_running = false;
        self.cancel();
        info!(
            id = self.id,
            remaining = self.state.remaining_seconds,
            "countdown stopped"
        );
        self.sync_keymap();
    }

    /// Restores the initial value and cancels any pending tick.
    ///
    /// Valid from every phase, including `Expired`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lifecycle_widgets::countdown::{self, Phase};
    ///
    /// let mut timer = countdown::new(25);
    /// let _tick = timer.start();
    /// timer.reset();
    /// assert_eq!(timer.remaining_seconds(), 25);
    /// assert_eq!(timer.phase(), Phase::Idle);
    /// ```
    pub fn reset(&mut self) {
        self.state = TimerState {
            remaining_seconds: self.initial_seconds,
            is_running: false,
        };
        self.cancel();
        info!(id = self.id, remaining = self.initial_seconds, "countdown reset");
        self.sync_keymap();
    }

    /// Releases the scheduled tick. Called on every way out of `Running`.
    pub fn teardown(&mut self) {
        self.state.is_running = false;
        self.cancel();
        self.sync_keymap();
    }

    /// Builds a tick message addressed to the current tick chain.
    pub(crate) fn tick_msg(&self) -> TickMsg {
        TickMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    /// Sends a control action as a message.
    pub fn control(&self, action: Action) -> Cmd {
        let id = self.id;
        Box::pin(async move { Some(Box::new(ControlMsg { id, action }) as Msg) })
    }

    fn schedule(&mut self) -> Cmd {
        let (guard, cmd) = TickGuard::arm(self.tick_msg(), self.interval);
        self.guard = Some(guard);
        cmd
    }

    fn cancel(&mut self) {
        if let Some(guard) = self.guard.take() {
            debug!(id = self.id, tag = self.tag, "cancelling scheduled tick");
            drop(guard);
        }
    }

    fn sync_keymap(&mut self) {
        self.keymap.start.set_enabled(!self.state.is_running);
        self.keymap.stop.set_enabled(self.state.is_running);
    }

    fn tick(&mut self) -> Option<Cmd> {
        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        debug!(
            id = self.id,
            remaining = self.state.remaining_seconds,
            "countdown tick"
        );

        if self.state.remaining_seconds > 0 {
            return Some(self.schedule());
        }

        self.state.is_running = false;
        self.cancel();
        self.sync_keymap();
        info!(id = self.id, "countdown expired");
        let id = self.id;
        Some(Box::pin(async move {
            Some(Box::new(TimeoutMsg { id }) as Msg)
        }))
    }

    fn apply(&mut self, action: Action) -> Option<Cmd> {
        match action {
            Action::Start => self.start(),
            Action::Stop => {
                self.stop();
                None
            }
            Action::Reset => {
                self.reset();
                None
            }
        }
    }

    /// Handles ticks, control messages and, while focused, key presses.
    ///
    /// # Arguments
    ///
    /// * `msg` - Any message. Ticks addressed to another instance, ticks from
    ///   an earlier start, and ticks arriving while stopped are ignored.
    ///   A [`ControlMsg`] is applied when its id matches or is `0`.
    ///
    /// # Returns
    ///
    /// The next tick command while running, a [`TimeoutMsg`] command on
    /// expiry, or `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_rs::Msg;
    /// use lifecycle_widgets::countdown::{self, Action, ControlMsg};
    ///
    /// let mut timer = countdown::new(10);
    /// let start: Msg = Box::new(ControlMsg { id: timer.id(), action: Action::Start });
    /// assert!(timer.update(&start).is_some());
    /// assert!(timer.running());
    ///
    /// let stop_all: Msg = Box::new(ControlMsg { id: 0, action: Action::Stop });
    /// assert!(timer.update(&stop_all).is_none());
    /// assert!(!timer.running());
    /// ```
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        if let Some(tick) = msg.downcast_ref::<TickMsg>() {
            if !self.state.is_running || tick.id != self.id {
                return None;
            }
            // A tick from an earlier start belongs to a cancelled chain.
            if tick.tag != self.tag {
                return None;
            }
            return self.tick();
        }

        if let Some(control) = msg.downcast_ref::<ControlMsg>() {
            if control.id != 0 && control.id != self.id {
                return None;
            }
            return self.apply(control.action);
        }

        if !self.focus {
            return None;
        }

        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keymap.start.matches(key_msg) {
                return self.apply(Action::Start);
            } else if self.keymap.stop.matches(key_msg) {
                return self.apply(Action::Stop);
            } else if self.keymap.reset.matches(key_msg) {
                return self.apply(Action::Reset);
            }
        }

        None
    }

    fn render_control(&self, label: &str, binding: &Binding) -> String {
        let style = if binding.enabled() {
            &self.styles.control
        } else {
            &self.styles.disabled
        };
        style.clone().inline(true).render(&format!("[ {} ]", label))
    }

    /// Renders the readout, the phase, and the three controls.
    pub fn view(&self) -> String {
        let seconds = self
            .styles
            .seconds
            .clone()
            .inline(true)
            .render(&format!("{}s", self.state.remaining_seconds));
        let phase = match self.phase() {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Expired => "expired",
        };
        let phase = self.styles.phase.clone().inline(true).render(phase);
        let controls = [
            self.render_control("start", &self.keymap.start),
            self.render_control("stop", &self.keymap.stop),
            self.render_control("reset", &self.keymap.reset),
        ]
        .join(" ");

        format!("{} {}\n{}", seconds, phase, controls)
    }
}

impl Component for Model {
    fn focus(&mut self) -> Option<Cmd> {
        self.focus = true;
        None
    }

    fn blur(&mut self) {
        self.focus = false;
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        if self.guard.is_some() {
            debug!(id = self.id, "countdown dropped while running");
        }
        self.cancel();
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        let mut model = Model::default();
        model.focus = true;
        let cmd = model.start();
        (model, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        Model::update(self, &msg)
    }

    fn view(&self) -> String {
        Model::view(self)
    }
}
