//! Type-safe key bindings shared by every widget.
//!
//! A [`Binding`] groups one or more key presses under a help entry and can be
//! disabled at runtime. Widgets use the enabled flag to mirror which controls
//! are currently available, so a disabled binding neither matches key presses
//! nor shows up in the help line.
//!
//! ```rust
//! use lifecycle_widgets::key::Binding;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let start = Binding::new(vec![KeyCode::Char('s')]).with_help("s", "start");
//! let quit = Binding::new(vec![(KeyCode::Char('c'), KeyModifiers::CONTROL)])
//!     .with_help("ctrl+c", "quit");
//!
//! assert!(start.enabled());
//! assert_eq!(quit.help().desc, "quit");
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key press: a key code plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifiers that must be held.
    pub modifiers: KeyModifiers,
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, modifiers): (KeyCode, KeyModifiers)) -> Self {
        Self { code, modifiers }
    }
}

impl KeyPress {
    fn matches(&self, msg: &KeyMsg) -> bool {
        if self.code != msg.key {
            return false;
        }
        // Shift is folded into the character for printable keys.
        let held = msg.modifiers.difference(KeyModifiers::SHIFT);
        let wanted = self.modifiers.difference(KeyModifiers::SHIFT);
        held == wanted
    }
}

/// Help text attached to a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short key label, e.g. `"s"` or `"ctrl+c"`.
    pub key: String,
    /// What the key does.
    pub desc: String,
}

/// A set of key presses bound to one action.
#[derive(Debug, Clone)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates an enabled binding for the given key presses.
    pub fn new<K: Into<KeyPress>>(keys: Vec<K>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            help: Help::default(),
            disabled: false,
        }
    }

    /// Sets the help entry shown by [`crate::help::Model`].
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// Returns the help entry.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Returns the bound key presses.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// Whether the binding currently responds to key presses.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// Returns true when the binding is enabled and one of its keys matches.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled() && self.keys.iter().any(|k| k.matches(msg))
    }
}

/// Anything that can describe its bindings for the help line.
pub trait KeyMap {
    /// Bindings for the compact single-line help.
    fn short_help(&self) -> Vec<&Binding>;

    /// Bindings grouped into columns for the expanded help.
    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![self.short_help()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers,
        }
    }

    #[test]
    fn test_binding_matches_plain_key() {
        let b = Binding::new(vec![KeyCode::Char('s')]);
        assert!(b.matches(&press(KeyCode::Char('s'), KeyModifiers::NONE)));
        assert!(!b.matches(&press(KeyCode::Char('x'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_binding_respects_modifiers() {
        let b = Binding::new(vec![(KeyCode::Char('c'), KeyModifiers::CONTROL)]);
        assert!(b.matches(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!b.matches(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_shift_is_ignored_for_characters() {
        let b = Binding::new(vec![KeyCode::Char('?')]);
        assert!(b.matches(&press(KeyCode::Char('?'), KeyModifiers::SHIFT)));
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let mut b = Binding::new(vec![KeyCode::Enter]).with_help("enter", "go");
        b.set_enabled(false);
        assert!(!b.enabled());
        assert!(!b.matches(&press(KeyCode::Enter, KeyModifiers::NONE)));

        b.set_enabled(true);
        assert!(b.matches(&press(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn test_binding_without_keys_is_disabled() {
        let b: Binding = Binding::new(Vec::<KeyCode>::new());
        assert!(!b.enabled());
    }
}
