//! Counters whose changes drive effects.
//!
//! [`Counter`] logs each new count through an on-change effect.
//! [`ClampedCounter`] uses the same mechanism to enforce a ceiling: its
//! effect notices a count above the maximum, raises a notice and writes the
//! maximum back, so the visible count never stays above it.

use crate::effect::Effect;
use crate::key::{self, Binding};
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use crossterm::event::KeyCode;
use lipgloss_extras::prelude::*;
use tracing::{info, warn};

/// Ceiling for [`ClampedCounter`].
pub const MAX_CLICKS: u32 = 5;

/// Key bindings for [`Counter`].
#[derive(Debug, Clone)]
pub struct CounterKeyMap {
    /// Add one.
    pub increment: Binding,
    /// Subtract one.
    pub decrement: Binding,
    /// Back to zero.
    pub reset: Binding,
}

impl Default for CounterKeyMap {
    fn default() -> Self {
        Self {
            increment: Binding::new(vec![KeyCode::Char('+'), KeyCode::Char('=')])
                .with_help("+", "increment"),
            decrement: Binding::new(vec![KeyCode::Char('-')]).with_help("-", "decrement"),
            reset: Binding::new(vec![KeyCode::Char('0')]).with_help("0", "zero"),
        }
    }
}

impl key::KeyMap for CounterKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.increment, &self.decrement, &self.reset]
    }
}

/// A plain counter.
#[derive(Debug, Clone)]
pub struct Counter {
    /// Key bindings.
    pub keymap: CounterKeyMap,
    count: i64,
    logged: Effect<i64>,
    focus: bool,
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl Counter {
    /// Creates a counter at zero and runs its effect for the initial value.
    pub fn new() -> Self {
        let mut counter = Self {
            keymap: CounterKeyMap::default(),
            count: 0,
            logged: Effect::on_change(),
            focus: false,
        };
        counter.commit();
        counter
    }

    /// Current count.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// How many times the change effect has run.
    pub fn effect_runs(&self) -> usize {
        self.logged.runs()
    }

    /// Adds one.
    pub fn increment(&mut self) {
        self.count += 1;
        self.commit();
    }

    /// Subtracts one.
    pub fn decrement(&mut self) {
        self.count -= 1;
        self.commit();
    }

    /// Back to zero.
    pub fn reset(&mut self) {
        self.count = 0;
        self.commit();
    }

    fn commit(&mut self) {
        self.logged
            .run(&self.count, |count| info!(count = *count, "count changed"));
    }

    /// Handles key presses while focused.
    pub fn update(&mut self, msg: &Msg) {
        if !self.focus {
            return;
        }
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keymap.increment.matches(key_msg) {
                self.increment();
            } else if self.keymap.decrement.matches(key_msg) {
                self.decrement();
            } else if self.keymap.reset.matches(key_msg) {
                self.reset();
            }
        }
    }

    /// Renders `Count: N`.
    pub fn view(&self) -> String {
        format!("Count: {}", self.count)
    }
}

impl Component for Counter {
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

/// Key bindings for [`ClampedCounter`].
#[derive(Debug, Clone)]
pub struct ClampedKeyMap {
    /// Count one click.
    pub click: Binding,
    /// Clear clicks and the notice.
    pub reset: Binding,
}

impl Default for ClampedKeyMap {
    fn default() -> Self {
        Self {
            click: Binding::new(vec![KeyCode::Char('c')]).with_help("c", "click"),
            reset: Binding::new(vec![KeyCode::Char('x')]).with_help("x", "clear clicks"),
        }
    }
}

impl key::KeyMap for ClampedKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.click, &self.reset]
    }
}

/// A click counter that refuses to stay above its maximum.
#[derive(Debug, Clone)]
pub struct ClampedCounter {
    /// Key bindings.
    pub keymap: ClampedKeyMap,
    /// Style of the over-limit notice.
    pub notice_style: Style,
    clicks: u32,
    max: u32,
    notice: Option<String>,
    guard: Effect<u32>,
    focus: bool,
}

impl Default for ClampedCounter {
    fn default() -> Self {
        Self::new(MAX_CLICKS)
    }
}

impl ClampedCounter {
    /// Creates a counter that clamps at `max`.
    pub fn new(max: u32) -> Self {
        let mut counter = Self {
            keymap: ClampedKeyMap::default(),
            notice_style: Style::new().foreground(Color::from("203")),
            clicks: 0,
            max,
            notice: None,
            guard: Effect::on_change(),
            focus: false,
        };
        counter.commit();
        counter
    }

    /// Current click count.
    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// The ceiling.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Notice raised by the last over-limit click, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Counts a click. Past the maximum, the count snaps back and a notice is raised.
    pub fn click(&mut self) {
        self.clicks += 1;
        self.commit();
    }

    /// Clears the clicks and any notice.
    pub fn reset(&mut self) {
        self.clicks = 0;
        self.notice = None;
        self.commit();
    }

    fn commit(&mut self) {
        let max = self.max;
        let mut over = false;
        self.guard.run(&self.clicks, |clicks| {
            info!(clicks = *clicks, max, "click count changed");
            over = *clicks > max;
        });
        if over {
            warn!(max, "click limit reached");
            self.notice = Some(format!("at most {} clicks are allowed", max));
            self.clicks = max;
            self.commit();
        }
    }

    /// Handles key presses while focused.
    pub fn update(&mut self, msg: &Msg) {
        if !self.focus {
            return;
        }
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keymap.click.matches(key_msg) {
                self.click();
            } else if self.keymap.reset.matches(key_msg) {
                self.reset();
            }
        }
    }

    /// Renders the count and, after an over-limit click, the notice.
    pub fn view(&self) -> String {
        let mut out = format!("Clicks: {} / {}", self.clicks, self.max);
        if let Some(notice) = &self.notice {
            out.push('\n');
            out.push_str(&self.notice_style.clone().inline(true).render(notice));
        }
        out
    }
}

impl Component for ClampedCounter {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(c: char) -> Msg {
        Box::new(KeyMsg {
            key: KeyCode::Char(c),
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_counter_operations() {
        let mut counter = Counter::new();
        counter.increment();
        counter.increment();
        counter.decrement();
        assert_eq!(counter.count(), 1);
        counter.reset();
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.view(), "Count: 0");
    }

    #[test]
    fn test_counter_effect_runs_per_change() {
        let mut counter = Counter::new();
        assert_eq!(counter.effect_runs(), 1);
        counter.increment();
        assert_eq!(counter.effect_runs(), 2);
        // Zeroing an already-zero counter is not a change.
        counter.decrement();
        counter.reset();
        counter.reset();
        assert_eq!(counter.effect_runs(), 3);
    }

    #[test]
    fn test_counter_keys_need_focus() {
        let mut counter = Counter::new();
        counter.update(&key('+'));
        assert_eq!(counter.count(), 0);

        counter.focus();
        counter.update(&key('+'));
        counter.update(&key('='));
        counter.update(&key('-'));
        assert_eq!(counter.count(), 1);
        counter.update(&key('0'));
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_clamped_counter_under_limit() {
        let mut counter = ClampedCounter::default();
        for _ in 0..5 {
            counter.click();
        }
        assert_eq!(counter.clicks(), 5);
        assert!(counter.notice().is_none());
    }

    #[test]
    fn test_clamped_counter_snaps_back() {
        let mut counter = ClampedCounter::default();
        for _ in 0..6 {
            counter.click();
        }
        assert_eq!(counter.clicks(), 5);
        assert_eq!(counter.notice(), Some("at most 5 clicks are allowed"));

        counter.click();
        assert_eq!(counter.clicks(), 5);
    }

    #[test]
    fn test_clamped_counter_reset_clears_notice() {
        let mut counter = ClampedCounter::new(2);
        counter.focus();
        for _ in 0..3 {
            counter.update(&key('c'));
        }
        assert!(counter.notice().is_some());

        counter.update(&key('x'));
        assert_eq!(counter.clicks(), 0);
        assert!(counter.notice().is_none());
        assert_eq!(counter.view(), "Clicks: 0 / 2");
    }

    #[test]
    fn test_clamped_view_shows_notice() {
        let mut counter = ClampedCounter::new(1);
        counter.click();
        counter.click();
        let view = strip_ansi_escapes::strip_str(counter.view());
        assert!(view.starts_with("Clicks: 1 / 1"));
        assert!(view.contains("at most 1 clicks are allowed"));
    }
}
