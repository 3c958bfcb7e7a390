//! Memoized computations.
//!
//! [`Memo`] caches one value for one dependency and recomputes only when the
//! dependency changes. Two panels show what that buys:
//!
//! - [`MemoPanel`] runs an expensive computation next to a cheap one. The
//!   naive column recomputes the expensive value on every render, even when
//!   only the cheap counter moved; the memoized column recomputes it only when
//!   its own counter moves.
//! - [`ThemePanel`] builds a theme object for an effect to watch. The naive
//!   column builds a new object on every render, so the effect fires when only
//!   the font size changed; the memoized column keeps the same object until
//!   dark mode is toggled.

use crate::effect::Effect;
use crate::identity::Ident;
use crate::key::{self, Binding};
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use crossterm::event::KeyCode;
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use std::hint::black_box;
use tracing::{debug, info};

/// Iterations burned by [`heavy_work`] unless configured otherwise.
pub const DEFAULT_HEAVY_ITERATIONS: u64 = 30_000_000;

/// Smallest font size the theme panel allows.
pub const MIN_FONT_SIZE: u16 = 10;

/// A single-slot cache keyed on a dependency value.
#[derive(Debug, Clone)]
pub struct Memo<D, T> {
    cache: Option<(D, T)>,
    computations: usize,
}

impl<D, T> Default for Memo<D, T> {
    fn default() -> Self {
        Self {
            cache: None,
            computations: 0,
        }
    }
}

impl<D: PartialEq + Clone, T> Memo<D, T> {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `deps`, computing it with `f` if the
    /// dependency changed since the last call.
    pub fn get<F: FnOnce(&D) -> T>(&mut self, deps: &D, f: F) -> &T {
        if !matches!(&self.cache, Some((cached, _)) if cached == deps) {
            self.cache = None;
        }
        let computations = &mut self.computations;
        let (_, value) = self.cache.get_or_insert_with(|| {
            *computations += 1;
            (deps.clone(), f(deps))
        });
        value
    }

    /// The cached value, if any, without touching dependencies.
    pub fn peek(&self) -> Option<&T> {
        self.cache.as_ref().map(|(_, value)| value)
    }

    /// How many times the value has been computed.
    pub fn computations(&self) -> usize {
        self.computations
    }
}

/// Burns `iterations` loop turns, then labels the result.
pub fn heavy_work(n: u32, iterations: u64) -> String {
    debug!(n, iterations, "heavy work running");
    let mut acc = 0u64;
    for i in 0..iterations {
        acc = black_box(acc.wrapping_add(i));
    }
    black_box(acc);
    format!("heavy work run {} times", n)
}

/// Labels the result immediately.
pub fn light_work(n: u32) -> String {
    debug!(n, "light work running");
    format!("light work run {} times", n)
}

/// Key bindings for [`MemoPanel`].
#[derive(Debug, Clone)]
pub struct MemoKeyMap {
    /// Bump the heavy counter.
    pub heavy: Binding,
    /// Bump the light counter.
    pub light: Binding,
}

impl Default for MemoKeyMap {
    fn default() -> Self {
        Self {
            heavy: Binding::new(vec![KeyCode::Char('h')]).with_help("h", "heavy +1"),
            light: Binding::new(vec![KeyCode::Char('l')]).with_help("l", "light +1"),
        }
    }
}

impl key::KeyMap for MemoKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.heavy, &self.light]
    }
}

/// Naive vs memoized expensive computation.
#[derive(Debug, Clone)]
pub struct MemoPanel {
    /// Loop turns per heavy computation.
    pub heavy_iterations: u64,
    /// Key bindings.
    pub keymap: MemoKeyMap,
    heavy: u32,
    light: u32,
    renders: usize,
    naive_heavy: String,
    naive_light: String,
    naive_heavy_runs: usize,
    memo_heavy: Memo<u32, String>,
    memo_light: Memo<u32, String>,
    focus: bool,
}

impl Default for MemoPanel {
    fn default() -> Self {
        Self::new(DEFAULT_HEAVY_ITERATIONS)
    }
}

impl MemoPanel {
    /// Creates the panel and performs the first render.
    pub fn new(heavy_iterations: u64) -> Self {
        let mut panel = Self {
            heavy_iterations,
            keymap: MemoKeyMap::default(),
            heavy: 0,
            light: 0,
            renders: 0,
            naive_heavy: String::new(),
            naive_light: String::new(),
            naive_heavy_runs: 0,
            memo_heavy: Memo::new(),
            memo_light: Memo::new(),
            focus: false,
        };
        panel.render();
        panel
    }

    /// Bumps the heavy counter and re-renders.
    pub fn bump_heavy(&mut self) {
        self.heavy += 1;
        self.render();
    }

    /// Bumps the light counter and re-renders.
    pub fn bump_light(&mut self) {
        self.light += 1;
        self.render();
    }

    /// Number of renders so far.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Heavy computations done by the naive column.
    pub fn naive_heavy_runs(&self) -> usize {
        self.naive_heavy_runs
    }

    /// Heavy computations done by the memoized column.
    pub fn memo_heavy_runs(&self) -> usize {
        self.memo_heavy.computations()
    }

    fn render(&mut self) {
        self.renders += 1;
        let iterations = self.heavy_iterations;

        self.naive_heavy = heavy_work(self.heavy, iterations);
        self.naive_heavy_runs += 1;
        self.naive_light = light_work(self.light);

        self.memo_heavy.get(&self.heavy, |n| heavy_work(*n, iterations));
        self.memo_light.get(&self.light, |n| light_work(*n));

        info!(
            renders = self.renders,
            naive_heavy_runs = self.naive_heavy_runs,
            memo_heavy_runs = self.memo_heavy.computations(),
            "memo panel rendered"
        );
    }

    /// Handles key presses while focused.
    pub fn update(&mut self, msg: &Msg) {
        if !self.focus {
            return;
        }
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keymap.heavy.matches(key_msg) {
                self.bump_heavy();
            } else if self.keymap.light.matches(key_msg) {
                self.bump_light();
            }
        }
    }

    /// Renders both columns side by side.
    pub fn view(&self) -> String {
        let title = Style::new().bold(true);
        let column = Style::new().padding(0, 4, 0, 0);

        let naive = format!(
            "{}\n{}\n{}\nheavy runs: {}",
            title.clone().inline(true).render("naive"),
            self.naive_heavy,
            self.naive_light,
            self.naive_heavy_runs
        );
        let memo = format!(
            "{}\n{}\n{}\nheavy runs: {}",
            title.inline(true).render("memoized"),
            self.memo_heavy.peek().map(String::as_str).unwrap_or_default(),
            self.memo_light.peek().map(String::as_str).unwrap_or_default(),
            self.memo_heavy.computations()
        );

        let naive = column.render(&naive);
        lipgloss::join_horizontal(lipgloss::TOP, &[naive.as_str(), memo.as_str()])
    }
}

impl Component for MemoPanel {
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

/// Colour scheme watched by the theme effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Dark background.
    Dark,
    /// Light background.
    Light,
}

impl Mode {
    fn from_dark(dark: bool) -> Self {
        if dark {
            Mode::Dark
        } else {
            Mode::Light
        }
    }

    /// Upper-case label.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Dark => "DARK",
            Mode::Light => "LIGHT",
        }
    }
}

/// The object an effect depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Current mode.
    pub mode: Mode,
}

/// Key bindings for [`ThemePanel`].
#[derive(Debug, Clone)]
pub struct ThemeKeyMap {
    /// Font size up by two.
    pub font_up: Binding,
    /// Font size down by two.
    pub font_down: Binding,
    /// Flip dark mode.
    pub toggle_dark: Binding,
}

impl Default for ThemeKeyMap {
    fn default() -> Self {
        Self {
            font_up: Binding::new(vec![KeyCode::Char(']')]).with_help("]", "font +2"),
            font_down: Binding::new(vec![KeyCode::Char('[')]).with_help("[", "font -2"),
            toggle_dark: Binding::new(vec![KeyCode::Char('d')]).with_help("d", "dark mode"),
        }
    }
}

impl key::KeyMap for ThemeKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.font_up, &self.font_down, &self.toggle_dark]
    }
}

/// Object dependencies with and without a memoized identity.
#[derive(Debug, Clone)]
pub struct ThemePanel {
    /// Key bindings.
    pub keymap: ThemeKeyMap,
    dark: bool,
    font_size: u16,
    naive_theme: Ident<Theme>,
    naive_effect: Effect<Ident<Theme>>,
    memo_theme: Memo<bool, Ident<Theme>>,
    memo_effect: Effect<Ident<Theme>>,
    focus: bool,
}

impl Default for ThemePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemePanel {
    /// Dark mode, font size 14, first render done.
    pub fn new() -> Self {
        let mut panel = Self {
            keymap: ThemeKeyMap::default(),
            dark: true,
            font_size: 14,
            naive_theme: Ident::new(Theme { mode: Mode::Dark }),
            naive_effect: Effect::on_change(),
            memo_theme: Memo::new(),
            memo_effect: Effect::on_change(),
            focus: false,
        };
        panel.render();
        panel
    }

    /// Current font size.
    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    /// Whether dark mode is on.
    pub fn dark(&self) -> bool {
        self.dark
    }

    /// Runs of the effect watching the naive theme.
    pub fn naive_effect_runs(&self) -> usize {
        self.naive_effect.runs()
    }

    /// Runs of the effect watching the memoized theme.
    pub fn memo_effect_runs(&self) -> usize {
        self.memo_effect.runs()
    }

    /// Font size up by two.
    pub fn font_up(&mut self) {
        self.font_size += 2;
        self.render();
    }

    /// Font size down by two, never below [`MIN_FONT_SIZE`].
    pub fn font_down(&mut self) {
        self.font_size = self.font_size.saturating_sub(2).max(MIN_FONT_SIZE);
        self.render();
    }

    /// Flips dark mode.
    pub fn toggle_dark(&mut self) {
        self.dark = !self.dark;
        self.render();
    }

    fn render(&mut self) {
        let mode = Mode::from_dark(self.dark);

        self.naive_theme = Ident::new(Theme { mode });
        self.naive_effect.run(&self.naive_theme, |theme| {
            info!(mode = theme.get().mode.label(), "theme effect (naive)")
        });

        let theme = self
            .memo_theme
            .get(&self.dark, |dark| {
                Ident::new(Theme {
                    mode: Mode::from_dark(*dark),
                })
            })
            .clone();
        self.memo_effect.run(&theme, |theme| {
            info!(mode = theme.get().mode.label(), "theme effect (memoized)")
        });
    }

    /// Handles key presses while focused.
    pub fn update(&mut self, msg: &Msg) {
        if !self.focus {
            return;
        }
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keymap.font_up.matches(key_msg) {
                self.font_up();
            } else if self.keymap.font_down.matches(key_msg) {
                self.font_down();
            } else if self.keymap.toggle_dark.matches(key_msg) {
                self.toggle_dark();
            }
        }
    }

    /// Renders font size, mode swatch and effect counts for both columns.
    pub fn view(&self) -> String {
        let mode = Mode::from_dark(self.dark);
        let swatch = Style::new()
            .foreground(Color::from(if self.dark { "#222222" } else { "#ffffff" }))
            .inline(true)
            .render("████");
        let column = Style::new().padding(0, 4, 0, 0);

        let naive = format!(
            "naive object\nfont: {}  mode: {} {}\neffect runs: {}",
            self.font_size,
            mode.label(),
            swatch,
            self.naive_effect.runs()
        );
        let memo = format!(
            "memoized object\nfont: {}  mode: {} {}\neffect runs: {}",
            self.font_size,
            mode.label(),
            swatch,
            self.memo_effect.runs()
        );

        let naive = column.render(&naive);
        lipgloss::join_horizontal(lipgloss::TOP, &[naive.as_str(), memo.as_str()])
    }
}

impl Component for ThemePanel {
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

    #[test]
    fn test_memo_caches_per_dependency() {
        let mut memo: Memo<u32, String> = Memo::new();
        assert_eq!(memo.get(&1, |n| format!("v{}", n)), "v1");
        assert_eq!(memo.get(&1, |_| "recomputed".to_string()), "v1");
        assert_eq!(memo.computations(), 1);

        assert_eq!(memo.get(&2, |n| format!("v{}", n)), "v2");
        assert_eq!(memo.computations(), 2);
        assert_eq!(memo.peek().map(String::as_str), Some("v2"));
    }

    #[test]
    fn test_memo_recomputes_after_returning_to_old_dependency() {
        let mut memo: Memo<bool, u8> = Memo::new();
        memo.get(&true, |_| 1);
        memo.get(&false, |_| 2);
        memo.get(&true, |_| 3);
        assert_eq!(memo.peek(), Some(&3));
        assert_eq!(memo.computations(), 3);
    }

    #[test]
    fn test_work_labels() {
        assert_eq!(heavy_work(3, 10), "heavy work run 3 times");
        assert_eq!(light_work(0), "light work run 0 times");
    }

    #[test]
    fn test_memo_panel_skips_heavy_on_light_change() {
        let mut panel = MemoPanel::new(10);
        assert_eq!(panel.naive_heavy_runs(), 1);
        assert_eq!(panel.memo_heavy_runs(), 1);

        panel.bump_light();
        panel.bump_light();
        assert_eq!(panel.naive_heavy_runs(), 3);
        assert_eq!(panel.memo_heavy_runs(), 1);

        panel.bump_heavy();
        assert_eq!(panel.naive_heavy_runs(), 4);
        assert_eq!(panel.memo_heavy_runs(), 2);
        assert_eq!(panel.renders(), 4);
    }

    #[test]
    fn test_memo_panel_view() {
        let mut panel = MemoPanel::new(10);
        panel.bump_heavy();
        let view = strip_ansi_escapes::strip_str(panel.view());
        assert!(view.contains("naive"));
        assert!(view.contains("memoized"));
        assert!(view.contains("heavy work run 1 times"));
        assert!(view.contains("light work run 0 times"));
    }

    #[test]
    fn test_theme_naive_effect_fires_on_font_change() {
        let mut panel = ThemePanel::new();
        assert_eq!(panel.naive_effect_runs(), 1);
        assert_eq!(panel.memo_effect_runs(), 1);

        panel.font_up();
        panel.font_down();
        assert_eq!(panel.naive_effect_runs(), 3);
        assert_eq!(panel.memo_effect_runs(), 1);

        panel.toggle_dark();
        assert_eq!(panel.naive_effect_runs(), 4);
        assert_eq!(panel.memo_effect_runs(), 2);
        assert!(!panel.dark());
    }

    #[test]
    fn test_font_size_floor() {
        let mut panel = ThemePanel::new();
        for _ in 0..5 {
            panel.font_down();
        }
        assert_eq!(panel.font_size(), MIN_FONT_SIZE);
        panel.font_up();
        assert_eq!(panel.font_size(), MIN_FONT_SIZE + 2);
    }

    #[test]
    fn test_theme_view() {
        let mut panel = ThemePanel::new();
        panel.toggle_dark();
        let view = strip_ansi_escapes::strip_str(panel.view());
        assert!(view.contains("mode: LIGHT"));
        assert!(view.contains("font: 14"));
    }
}
