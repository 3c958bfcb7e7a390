//! Handler identity across parent renders.
//!
//! A parent hands each child card a [`Callback`]. Whether the child sees a
//! new handler after the parent re-renders depends on how the parent keeps
//! it:
//!
//! - [`Strategy::Fresh`] builds a new handler on every render.
//! - [`Strategy::Stable`] builds it once.
//! - [`Strategy::Deps`] builds a new one only when its dependency changes.
//!
//! Each [`ChildCard`] skips re-rendering when its props (label and handler
//! identity) are unchanged, counts the renders it does perform, and counts
//! how many distinct handlers it has seen. Its colour swatch is derived from
//! the handler identity, so the colour changes exactly when the identity does.

use crate::effect::Effect;
use crate::identity::Ident;
use crate::key::{self, Binding};
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use crossterm::event::KeyCode;
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use tracing::debug;

/// A click handler, compared by identity.
pub type Callback = Ident<()>;

/// How a parent keeps a handler between renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// New handler every render.
    Fresh,
    /// One handler for the parent's lifetime.
    Stable,
    /// New handler whenever the dependency changes.
    Deps,
}

impl Strategy {
    /// Short description used as the card title.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Fresh => "no memo",
            Strategy::Stable => "memo []",
            Strategy::Deps => "memo [c3]",
        }
    }
}

/// Produces the handler for each parent render according to a [`Strategy`].
#[derive(Debug, Clone)]
pub struct CallbackCell {
    strategy: Strategy,
    current: Option<(u64, Callback)>,
}

impl CallbackCell {
    /// An empty cell.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            current: None,
        }
    }

    /// The strategy.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Returns the handler for this render.
    ///
    /// `dep` only matters for [`Strategy::Deps`].
    pub fn get(&mut self, dep: u64) -> Callback {
        let keep = match (&self.current, self.strategy) {
            (None, _) | (_, Strategy::Fresh) => false,
            (Some(_), Strategy::Stable) => true,
            (Some((last, _)), Strategy::Deps) => *last == dep,
        };
        if !keep {
            self.current = Some((dep, Callback::new(())));
        }
        match &self.current {
            Some((_, callback)) => callback.clone(),
            None => Callback::new(()),
        }
    }
}

/// Hue in degrees for a handler identity.
pub fn hue_for(id: u64) -> u16 {
    ((id.wrapping_mul(137)) % 360) as u16
}

/// Converts HSL (hue in degrees, saturation and lightness in 0..=1) to `#rrggbb`.
pub fn hsl_to_hex(hue: u16, saturation: f64, lightness: f64) -> String {
    let h = f64::from(hue % 360) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u8 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", to_byte(r), to_byte(g), to_byte(b))
}

/// A child that only re-renders when its props change.
#[derive(Debug, Clone)]
pub struct ChildCard {
    label: String,
    handler: Option<Callback>,
    renders: usize,
    identity: Effect<Callback>,
    hue: u16,
}

impl Default for ChildCard {
    fn default() -> Self {
        Self::new()
    }
}

impl ChildCard {
    /// A card that has not rendered yet.
    pub fn new() -> Self {
        Self {
            label: String::new(),
            handler: None,
            renders: 0,
            identity: Effect::on_change(),
            hue: 0,
        }
    }

    /// Offers new props. Returns whether the card re-rendered.
    pub fn render(&mut self, label: String, handler: &Callback) -> bool {
        let same_props = self.renders > 0
            && self.label == label
            && self.handler.as_ref() == Some(handler);
        if same_props {
            return false;
        }

        self.renders += 1;
        self.label = label;
        self.handler = Some(handler.clone());

        let hue = &mut self.hue;
        self.identity.run(handler, |callback| {
            *hue = hue_for(callback.id());
            debug!(handler = callback.id(), "child saw a new handler");
        });
        true
    }

    /// Renders performed.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Distinct handlers seen, counting the first.
    pub fn identity_changes(&self) -> usize {
        self.identity.runs()
    }

    /// The current swatch hue.
    pub fn hue(&self) -> u16 {
        self.hue
    }

    /// The current label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Renders the card.
    pub fn view(&self, selected: bool) -> String {
        let title = if selected {
            Style::new().bold(true).foreground(Color::from("212"))
        } else {
            Style::new().bold(true)
        };
        let swatch = Style::new()
            .foreground(Color::from(hsl_to_hex(self.hue, 0.7, 0.7).as_str()))
            .inline(true)
            .render("██████████");
        format!(
            "{}\n{}\nrenders: {}\nhandler changes: {}",
            title.inline(true).render(&self.label),
            swatch,
            self.renders,
            self.identity.runs()
        )
    }
}

/// Key bindings for [`CallbackPanel`].
#[derive(Debug, Clone)]
pub struct CallbackKeyMap {
    /// Re-render the parent without changing any child state.
    pub rerender: Binding,
    /// Select the card on the left.
    pub left: Binding,
    /// Select the card on the right.
    pub right: Binding,
    /// Click the selected card's button.
    pub click: Binding,
}

impl Default for CallbackKeyMap {
    fn default() -> Self {
        Self {
            rerender: Binding::new(vec![KeyCode::Char('u')]).with_help("u", "re-render parent"),
            left: Binding::new(vec![KeyCode::Left, KeyCode::Char('h')]).with_help("←/h", "left"),
            right: Binding::new(vec![KeyCode::Right, KeyCode::Char('l')])
                .with_help("→/l", "right"),
            click: Binding::new(vec![KeyCode::Enter]).with_help("enter", "click child"),
        }
    }
}

impl key::KeyMap for CallbackKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.rerender, &self.left, &self.right, &self.click]
    }
}

/// A parent with three children, one per [`Strategy`].
#[derive(Debug, Clone)]
pub struct CallbackPanel {
    /// Key bindings.
    pub keymap: CallbackKeyMap,
    parent_renders: u64,
    clicks: [u64; 3],
    cells: [CallbackCell; 3],
    cards: [ChildCard; 3],
    selected: usize,
    focus: bool,
}

impl Default for CallbackPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackPanel {
    /// Creates the panel and performs the first render.
    pub fn new() -> Self {
        let mut panel = Self {
            keymap: CallbackKeyMap::default(),
            parent_renders: 0,
            clicks: [0; 3],
            cells: [
                CallbackCell::new(Strategy::Fresh),
                CallbackCell::new(Strategy::Stable),
                CallbackCell::new(Strategy::Deps),
            ],
            cards: [ChildCard::new(), ChildCard::new(), ChildCard::new()],
            selected: 0,
            focus: false,
        };
        panel.render();
        panel
    }

    /// Re-renders the parent without touching child state.
    pub fn rerender(&mut self) {
        self.parent_renders += 1;
        self.render();
    }

    /// Clicks the button on card `index` (0..3).
    pub fn click(&mut self, index: usize) {
        if let Some(count) = self.clicks.get_mut(index) {
            *count += 1;
            self.render();
        }
    }

    /// Parent re-render requests so far.
    pub fn parent_renders(&self) -> u64 {
        self.parent_renders
    }

    /// Click counts per card.
    pub fn clicks(&self) -> [u64; 3] {
        self.clicks
    }

    /// The cards.
    pub fn cards(&self) -> &[ChildCard; 3] {
        &self.cards
    }

    /// Index of the selected card.
    pub fn selected(&self) -> usize {
        self.selected
    }

    fn render(&mut self) {
        let c3 = self.clicks[2];
        for (i, (cell, card)) in self.cells.iter_mut().zip(self.cards.iter_mut()).enumerate() {
            let handler = cell.get(c3);
            let label = format!(
                "{} (c{} clicks: {})",
                cell.strategy().label(),
                i + 1,
                self.clicks[i]
            );
            card.render(label, &handler);
        }
    }

    /// Handles key presses while focused.
    pub fn update(&mut self, msg: &Msg) {
        if !self.focus {
            return;
        }
        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keymap.rerender.matches(key_msg) {
                self.rerender();
            } else if self.keymap.left.matches(key_msg) {
                self.selected = self.selected.saturating_sub(1);
            } else if self.keymap.right.matches(key_msg) {
                self.selected = (self.selected + 1).min(self.cards.len() - 1);
            } else if self.keymap.click.matches(key_msg) {
                self.click(self.selected);
            }
        }
    }

    /// Renders the parent line and the three cards side by side.
    pub fn view(&self) -> String {
        let column = Style::new().padding(0, 3, 0, 0);
        let cards: Vec<String> = self
            .cards
            .iter()
            .enumerate()
            .map(|(i, card)| column.clone().render(&card.view(i == self.selected)))
            .collect();
        let parts: Vec<&str> = cards.iter().map(String::as_str).collect();
        format!(
            "parent re-renders: {}\n\n{}",
            self.parent_renders,
            lipgloss::join_horizontal(lipgloss::TOP, &parts)
        )
    }
}

impl Component for CallbackPanel {
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

    fn press(code: KeyCode) -> Msg {
        Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_cell_strategies() {
        let mut fresh = CallbackCell::new(Strategy::Fresh);
        assert_ne!(fresh.get(0), fresh.get(0));

        let mut stable = CallbackCell::new(Strategy::Stable);
        let first = stable.get(0);
        assert_eq!(stable.get(1), first);

        let mut deps = CallbackCell::new(Strategy::Deps);
        let a = deps.get(0);
        assert_eq!(deps.get(0), a);
        assert_ne!(deps.get(1), a);
    }

    #[test]
    fn test_card_skips_render_for_same_props() {
        let mut card = ChildCard::new();
        let handler = Callback::new(());
        assert!(card.render("x".to_string(), &handler));
        assert!(!card.render("x".to_string(), &handler));
        assert!(card.render("y".to_string(), &handler));
        assert_eq!(card.renders(), 2);
        assert_eq!(card.identity_changes(), 1);
    }

    #[test]
    fn test_card_hue_follows_identity() {
        let mut card = ChildCard::new();
        let a = Callback::new(());
        card.render("x".to_string(), &a);
        assert_eq!(card.hue(), hue_for(a.id()));

        card.render("y".to_string(), &a);
        assert_eq!(card.hue(), hue_for(a.id()));

        let b = Callback::new(());
        card.render("y".to_string(), &b);
        assert_eq!(card.hue(), hue_for(b.id()));
        assert_eq!(card.identity_changes(), 2);
    }

    #[test]
    fn test_parent_rerender_only_moves_fresh_card() {
        let mut panel = CallbackPanel::new();
        for _ in 0..3 {
            panel.rerender();
        }
        let cards = panel.cards();
        assert_eq!(cards[0].renders(), 4);
        assert_eq!(cards[0].identity_changes(), 4);
        assert_eq!(cards[1].renders(), 1);
        assert_eq!(cards[1].identity_changes(), 1);
        assert_eq!(cards[2].renders(), 1);
        assert_eq!(cards[2].identity_changes(), 1);
    }

    #[test]
    fn test_clicks_change_labels_and_dependent_handler() {
        let mut panel = CallbackPanel::new();

        panel.click(1);
        assert_eq!(panel.cards()[1].renders(), 2);
        assert_eq!(panel.cards()[1].identity_changes(), 1);
        assert_eq!(panel.cards()[2].renders(), 1);

        panel.click(2);
        assert_eq!(panel.cards()[2].renders(), 2);
        assert_eq!(panel.cards()[2].identity_changes(), 2);
        assert_eq!(panel.cards()[1].renders(), 2);
        assert_eq!(panel.clicks(), [0, 1, 1]);
    }

    #[test]
    fn test_keys_select_and_click() {
        let mut panel = CallbackPanel::new();
        panel.focus();
        panel.update(&press(KeyCode::Right));
        panel.update(&press(KeyCode::Right));
        panel.update(&press(KeyCode::Right));
        assert_eq!(panel.selected(), 2);
        panel.update(&press(KeyCode::Enter));
        assert_eq!(panel.clicks(), [0, 0, 1]);

        panel.update(&press(KeyCode::Left));
        assert_eq!(panel.selected(), 1);
        panel.update(&press(KeyCode::Char('u')));
        assert_eq!(panel.parent_renders(), 1);
    }

    #[test]
    fn test_hsl_to_hex() {
        assert_eq!(hsl_to_hex(0, 1.0, 0.5), "#ff0000");
        assert_eq!(hsl_to_hex(120, 1.0, 0.5), "#00ff00");
        assert_eq!(hsl_to_hex(240, 1.0, 0.5), "#0000ff");
    }

    #[test]
    fn test_view_lists_cards() {
        let panel = CallbackPanel::new();
        let view = strip_ansi_escapes::strip_str(panel.view());
        assert!(view.contains("parent re-renders: 0"));
        assert!(view.contains("no memo (c1 clicks: 0)"));
        assert!(view.contains("memo [c3] (c3 clicks: 0)"));
        assert!(view.contains("handler changes: 1"));
    }
}
