#![warn(missing_docs)]

//! # lifecycle-widgets
//!
//! Small terminal widgets for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! that each make one state or lifecycle primitive visible: a countdown
//! whose scheduled tick is owned and cancelled by the widget, counters whose
//! changes drive dependency-tracked effects, memoized computations with
//! visible recompute counts, and handler-identity badges.
//!
//! Every widget follows the Elm Architecture: state lives in a model,
//! `update()` applies messages, `view()` renders a string.
//!
//! ## Components
//!
//! | Component | Module | Shows |
//! |-----------|--------|-------|
//! | `StatePanel` | [`state`] | string state, replaced vs mutated objects, batched updates |
//! | `Countdown` | [`countdown`] | scheduled ticks with scoped cancellation |
//! | `Counter`, `ClampedCounter` | [`counter`] | effects keyed on state changes |
//! | `MemoPanel`, `ThemePanel` | [`memo`] | memoized values and stable identities |
//! | `CallbackPanel` | [`callback`] | handler identity across parent renders |
//!
//! ## Running a countdown
//!
//! ```rust
//! use lifecycle_widgets::prelude::*;
//!
//! let mut countdown = countdown_new(10);
//! assert_eq!(countdown.remaining_seconds(), 10);
//! assert_eq!(countdown.phase(), Phase::Idle);
//!
//! countdown.reset();
//! assert!(!countdown.running());
//! ```

pub mod app;
pub mod callback;
pub mod config;
pub mod countdown;
pub mod counter;
pub mod effect;
pub mod error;
pub mod help;
pub mod identity;
pub mod key;
pub mod logging;
pub mod memo;
pub mod state;
pub mod textinput;

use bubbletea_rs::Cmd;

/// Keyboard focus for widgets.
///
/// Widgets only react to key presses while focused; timer ticks and control
/// messages are handled regardless of focus.
///
/// ```rust
/// use lifecycle_widgets::prelude::*;
///
/// let mut countdown = countdown_new(5);
/// assert!(!countdown.focused());
/// countdown.focus();
/// assert!(countdown.focused());
/// countdown.blur();
/// assert!(!countdown.focused());
/// ```
pub trait Component {
    /// Gives the component keyboard focus. May return a command to run.
    fn focus(&mut self) -> Option<Cmd>;

    /// Removes keyboard focus.
    fn blur(&mut self);

    /// Whether the component has keyboard focus.
    fn focused(&self) -> bool;
}

pub use app::App;
pub use callback::{Callback, CallbackCell, CallbackPanel, ChildCard, Strategy};
pub use config::Config;
pub use countdown::{
    new as countdown_new, new_with_interval as countdown_new_with_interval, Action, ControlMsg,
    Model as Countdown, Phase, TickMsg as CountdownTickMsg, TimeoutMsg, TimerState,
};
pub use counter::{ClampedCounter, Counter};
pub use effect::{Effect, Trigger};
pub use error::{Error, Result};
pub use identity::Ident;
pub use memo::{Memo, MemoPanel, ThemePanel};
pub use state::{StateCell, StatePanel};

/// Commonly used types in one import.
pub mod prelude {
    pub use crate::countdown::{
        new as countdown_new, new_with_interval as countdown_new_with_interval, Action,
        ControlMsg, Model as Countdown, Phase, TimeoutMsg, TimerState,
    };
    pub use crate::counter::{ClampedCounter, Counter};
    pub use crate::effect::{Effect, Trigger};
    pub use crate::key::{Binding, KeyMap};
    pub use crate::memo::Memo;
    pub use crate::state::StateCell;
    pub use crate::Component;
}
