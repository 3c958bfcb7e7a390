//! State updates and when they become visible.
//!
//! [`StatePanel`] hosts three small demos:
//!
//! - a name field whose text is string state; an on-change effect logs every
//!   edit;
//! - a user object held under an [`Ident`]. Replacing it with a new object is
//!   seen by the identity effect and re-renders; mutating it in place keeps
//!   the identity, so the rendered copy goes stale;
//! - a [`StateCell`] that queues updates and applies them together, showing
//!   why three `set(snapshot + 1)` calls add one while three
//!   `update(|prev| prev + 1)` calls add three.

use crate::effect::Effect;
use crate::identity::Ident;
use crate::key::{self, Binding};
use crate::textinput;
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use crossterm::event::KeyCode;
use lipgloss_extras::prelude::*;
use tracing::{info, warn};

/// A queued state change.
#[derive(Debug, Clone, Copy)]
pub enum Update<T> {
    /// Replace the value.
    Replace(T),
    /// Derive the value from the latest one.
    Apply(fn(T) -> T),
}

/// A value whose updates are queued and applied together on [`flush`].
///
/// [`flush`]: StateCell::flush
///
/// # Examples
///
/// ```rust
/// use lifecycle_widgets::state::StateCell;
///
/// let mut count = StateCell::new(0);
/// let snapshot = *count.get();
/// for _ in 0..3 {
///     count.set(snapshot + 1);
/// }
/// count.flush();
/// assert_eq!(*count.get(), 1);
///
/// for _ in 0..3 {
///     count.update(|prev| prev + 1);
/// }
/// count.flush();
/// assert_eq!(*count.get(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct StateCell<T> {
    value: T,
    pending: Vec<Update<T>>,
    commits: usize,
}

impl<T: Clone> StateCell<T> {
    /// A cell holding `value` with nothing queued.
    pub fn new(value: T) -> Self {
        Self {
            value,
            pending: Vec::new(),
            commits: 0,
        }
    }

    /// The committed value. Queued updates are not visible until `flush`.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Queues a replacement.
    pub fn set(&mut self, value: T) {
        self.pending.push(Update::Replace(value));
    }

    /// Queues a change computed from the latest value at flush time.
    pub fn update(&mut self, f: fn(T) -> T) {
        self.pending.push(Update::Apply(f));
    }

    /// Number of queued updates.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// How many flushes applied at least one update.
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Applies the queued updates in order. Returns false when nothing was queued.
    pub fn flush(&mut self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        for update in self.pending.drain(..) {
            self.value = match update {
                Update::Replace(value) => value,
                Update::Apply(f) => f(self.value.clone()),
            };
        }
        self.commits += 1;
        true
    }
}

/// The object in the immutability demo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: u32,
}

impl Default for User {
    fn default() -> Self {
        Self {
            name: "John".to_string(),
            age: 20,
        }
    }
}

/// The rows of the panel, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    /// The name field.
    Name,
    /// The age field.
    Age,
    /// Buttons for the object and batching demos.
    Actions,
}

impl Row {
    fn above(self) -> Row {
        match self {
            Row::Name | Row::Age => Row::Name,
            Row::Actions => Row::Age,
        }
    }

    fn below(self) -> Row {
        match self {
            Row::Name => Row::Age,
            Row::Age | Row::Actions => Row::Actions,
        }
    }
}

/// Key bindings for [`StatePanel`].
#[derive(Debug, Clone)]
pub struct StateKeyMap {
    /// Select the row above.
    pub up: Binding,
    /// Select the row below.
    pub down: Binding,
    /// Replace the user with a new object carrying the typed age.
    pub replace: Binding,
    /// Write the typed age into the existing user object.
    pub mutate: Binding,
    /// Add one three times from the render snapshot.
    pub add_from_snapshot: Binding,
    /// Add one three times from the latest value.
    pub add_from_latest: Binding,
    /// Set the batched value back to zero.
    pub zero: Binding,
}

impl Default for StateKeyMap {
    fn default() -> Self {
        Self {
            up: Binding::new(vec![KeyCode::Up]).with_help("↑", "up"),
            down: Binding::new(vec![KeyCode::Down]).with_help("↓", "down"),
            replace: Binding::new(vec![KeyCode::Char('n')]).with_help("n", "new object"),
            mutate: Binding::new(vec![KeyCode::Char('m')]).with_help("m", "mutate in place"),
            add_from_snapshot: Binding::new(vec![KeyCode::Char('w')])
                .with_help("w", "+3 from snapshot"),
            add_from_latest: Binding::new(vec![KeyCode::Char('f')])
                .with_help("f", "+3 from latest"),
            zero: Binding::new(vec![KeyCode::Char('0')]).with_help("0", "zero"),
        }
    }
}

impl key::KeyMap for StateKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![
            &self.up,
            &self.down,
            &self.replace,
            &self.mutate,
            &self.add_from_snapshot,
            &self.add_from_latest,
            &self.zero,
        ]
    }
}

/// Text, object and batched state on one page.
#[derive(Debug, Clone)]
pub struct StatePanel {
    /// Key bindings.
    pub keymap: StateKeyMap,
    /// Style of the row marker and notices.
    pub accent: Style,
    name: textinput::Model,
    age: textinput::Model,
    name_effect: Effect<String>,
    user: Ident<User>,
    shown: User,
    user_effect: Effect<Ident<User>>,
    notice: Option<String>,
    batch: StateCell<i64>,
    row: Row,
    focus: bool,
}

impl Default for StatePanel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatePanel {
    /// Creates the panel and runs its effects for the initial values.
    pub fn new() -> Self {
        let mut name = textinput::new();
        name.set_placeholder("type a name");
        name.set_char_limit(32);

        let mut age = textinput::new();
        age.set_placeholder("new age");
        age.set_char_filter(|c| c.is_ascii_digit());
        age.set_char_limit(3);

        let user = Ident::new(User::default());
        let mut panel = Self {
            keymap: StateKeyMap::default(),
            accent: Style::new().foreground(Color::from("212")),
            name,
            age,
            name_effect: Effect::on_change(),
            shown: user.get().clone(),
            user,
            user_effect: Effect::on_change(),
            notice: None,
            batch: StateCell::new(0),
            row: Row::Name,
            focus: false,
        };
        panel.commit();
        panel.sync_rows();
        panel
    }

    /// Text in the name field.
    pub fn name(&self) -> String {
        self.name.value()
    }

    /// How many times the name effect has run.
    pub fn name_effect_runs(&self) -> usize {
        self.name_effect.runs()
    }

    /// The user object as stored.
    pub fn user(&self) -> &User {
        self.user.get()
    }

    /// The user as of the last re-render.
    pub fn shown(&self) -> &User {
        &self.shown
    }

    /// Whether the rendered user lags behind the stored one.
    pub fn stale(&self) -> bool {
        self.shown != *self.user.get()
    }

    /// The batched value.
    pub fn batch_value(&self) -> i64 {
        *self.batch.get()
    }

    /// Notice from the last object update, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// The selected row.
    pub fn row(&self) -> Row {
        self.row
    }

    /// Whether typed characters go to a text field.
    pub fn typing(&self) -> bool {
        self.focus && matches!(self.row, Row::Name | Row::Age)
    }

    /// Bindings for the help line, including the active field's keys.
    pub fn help_groups(&self) -> Vec<Vec<&Binding>> {
        use crate::key::KeyMap as _;
        let mut groups = vec![self.keymap.short_help()];
        match self.row {
            Row::Name => groups.push(self.name.keymap.short_help()),
            Row::Age => groups.push(self.age.keymap.short_help()),
            Row::Actions => {}
        }
        groups
    }

    /// Selects a row and moves field focus to it.
    pub fn select(&mut self, row: Row) {
        self.row = row;
        self.sync_rows();
    }

    fn typed_age(&mut self) -> Option<u32> {
        match self.age.value().parse::<u32>() {
            Ok(age) => {
                self.notice = None;
                self.age.reset();
                Some(age)
            }
            Err(_) => {
                self.notice = Some("type an age first".to_string());
                None
            }
        }
    }

    /// Replaces the user with a new object carrying the typed age.
    pub fn replace_age(&mut self) {
        if let Some(age) = self.typed_age() {
            let next = User {
                age,
                ..self.user.get().clone()
            };
            self.user = Ident::new(next);
            self.commit();
        }
    }

    /// Writes the typed age into the existing object. The identity is
    /// unchanged, so the rendered copy is not refreshed.
    pub fn mutate_age(&mut self) {
        if let Some(age) = self.typed_age() {
            self.user.get_mut().age = age;
            self.commit();
            if self.stale() {
                warn!(
                    stored = self.user.get().age,
                    shown = self.shown.age,
                    "user mutated in place; identity unchanged, view not refreshed"
                );
                self.notice = Some("mutated in place: same identity, no re-render".to_string());
            }
        }
    }

    /// Queues `set(snapshot + 1)` three times, then flushes.
    pub fn add_three_from_snapshot(&mut self) {
        let snapshot = *self.batch.get();
        for _ in 0..3 {
            self.batch.set(snapshot + 1);
        }
        self.flush_batch();
    }

    /// Queues `update(|prev| prev + 1)` three times, then flushes.
    pub fn add_three_from_latest(&mut self) {
        for _ in 0..3 {
            self.batch.update(|prev| prev + 1);
        }
        self.flush_batch();
    }

    /// Sets the batched value to zero.
    pub fn zero(&mut self) {
        self.batch.set(0);
        self.flush_batch();
    }

    fn flush_batch(&mut self) {
        let before = *self.batch.get();
        let queued = self.batch.pending();
        self.batch.flush();
        info!(before, after = *self.batch.get(), queued, "batched updates applied");
    }

    fn commit(&mut self) {
        self.name_effect
            .run(&self.name.value(), |text| info!(text = %text, "input changed"));

        let shown = &mut self.shown;
        self.user_effect.run(&self.user, |user| {
            *shown = user.get().clone();
            info!(name = %user.get().name, age = user.get().age, "user replaced");
        });
    }

    fn sync_rows(&mut self) {
        self.name.blur();
        self.age.blur();
        if self.focus {
            match self.row {
                Row::Name => {
                    self.name.focus();
                }
                Row::Age => {
                    self.age.focus();
                }
                Row::Actions => {}
            }
        }

        let actions = self.row == Row::Actions;
        self.keymap.replace.set_enabled(actions);
        self.keymap.mutate.set_enabled(actions);
        self.keymap.add_from_snapshot.set_enabled(actions);
        self.keymap.add_from_latest.set_enabled(actions);
        self.keymap.zero.set_enabled(actions);
        self.keymap.up.set_enabled(self.row != Row::Name);
        self.keymap.down.set_enabled(self.row != Row::Actions);
    }

    /// Handles key presses while focused.
    pub fn update(&mut self, msg: &Msg) {
        if !self.focus {
            return;
        }
        let Some(key_msg) = msg.downcast_ref::<KeyMsg>() else {
            return;
        };

        if self.keymap.up.matches(key_msg) {
            self.select(self.row.above());
            return;
        } else if self.keymap.down.matches(key_msg) {
            self.select(self.row.below());
            return;
        }

        match self.row {
            Row::Name => {
                self.name.update(msg);
                self.commit();
            }
            Row::Age => self.age.update(msg),
            Row::Actions => {
                if self.keymap.replace.matches(key_msg) {
                    self.replace_age();
                } else if self.keymap.mutate.matches(key_msg) {
                    self.mutate_age();
                } else if self.keymap.add_from_snapshot.matches(key_msg) {
                    self.add_three_from_snapshot();
                } else if self.keymap.add_from_latest.matches(key_msg) {
                    self.add_three_from_latest();
                } else if self.keymap.zero.matches(key_msg) {
                    self.zero();
                }
            }
        }
    }

    fn marker(&self, row: Row) -> String {
        if self.focus && self.row == row {
            self.accent.clone().inline(true).render("> ")
        } else {
            "  ".to_string()
        }
    }

    /// Renders the three demos.
    pub fn view(&self) -> String {
        let name = self.name.value();
        let mut lines = vec![
            format!("Name: {}", if name.is_empty() { "(none)" } else { name.as_str() }),
            format!("{}{}", self.marker(Row::Name), self.name.view()),
            String::new(),
            format!("User: {}, age {}", self.shown.name, self.shown.age),
            format!("{}{}", self.marker(Row::Age), self.age.view()),
        ];
        if let Some(notice) = &self.notice {
            lines.push(format!("  {}", self.accent.clone().inline(true).render(notice)));
        }
        lines.push(String::new());
        lines.push(format!("Batched: {}", self.batch.get()));
        lines.push(format!(
            "{}[n] new object  [m] mutate  [w] +3 snapshot  [f] +3 latest  [0] zero",
            self.marker(Row::Actions)
        ));
        lines.join("\n")
    }
}

impl Component for StatePanel {
    fn focus(&mut self) -> Option<Cmd> {
        self.focus = true;
        self.sync_rows();
        None
    }

    fn blur(&mut self) {
        self.focus = false;
        self.sync_rows();
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

    fn type_str(panel: &mut StatePanel, s: &str) {
        for c in s.chars() {
            panel.update(&press(KeyCode::Char(c)));
        }
    }

    fn focused() -> StatePanel {
        let mut panel = StatePanel::new();
        panel.focus();
        panel
    }

    #[test]
    fn test_state_cell_queues_until_flush() {
        let mut cell = StateCell::new(5);
        cell.set(7);
        assert_eq!(*cell.get(), 5);
        assert_eq!(cell.pending(), 1);
        assert!(cell.flush());
        assert_eq!(*cell.get(), 7);
        assert!(!cell.flush());
        assert_eq!(cell.commits(), 1);
    }

    #[test]
    fn test_snapshot_updates_add_one() {
        let mut panel = StatePanel::new();
        panel.add_three_from_snapshot();
        assert_eq!(panel.batch_value(), 1);
        panel.add_three_from_snapshot();
        assert_eq!(panel.batch_value(), 2);
    }

    #[test]
    fn test_latest_updates_add_three() {
        let mut panel = StatePanel::new();
        panel.add_three_from_latest();
        assert_eq!(panel.batch_value(), 3);
        panel.add_three_from_snapshot();
        assert_eq!(panel.batch_value(), 4);
        panel.zero();
        assert_eq!(panel.batch_value(), 0);
    }

    #[test]
    fn test_name_edits_run_the_effect() {
        let mut panel = focused();
        assert_eq!(panel.name_effect_runs(), 1);
        type_str(&mut panel, "Jo");
        assert_eq!(panel.name(), "Jo");
        assert_eq!(panel.name_effect_runs(), 3);

        // Cursor movement does not change the text.
        panel.update(&press(KeyCode::Left));
        assert_eq!(panel.name_effect_runs(), 3);

        panel.update(&press(KeyCode::Backspace));
        assert_eq!(panel.name(), "o");
        assert_eq!(panel.name_effect_runs(), 4);
    }

    #[test]
    fn test_new_object_re_renders() {
        let mut panel = focused();
        panel.select(Row::Age);
        type_str(&mut panel, "31");
        panel.select(Row::Actions);
        panel.update(&press(KeyCode::Char('n')));

        assert_eq!(panel.user().age, 31);
        assert_eq!(panel.shown().age, 31);
        assert_eq!(panel.shown().name, "John");
        assert!(!panel.stale());
        assert!(panel.notice().is_none());
    }

    #[test]
    fn test_mutation_in_place_goes_stale() {
        let mut panel = focused();
        panel.select(Row::Age);
        type_str(&mut panel, "42");
        panel.select(Row::Actions);
        panel.update(&press(KeyCode::Char('m')));

        assert_eq!(panel.user().age, 42);
        assert_eq!(panel.shown().age, 20);
        assert!(panel.stale());
        assert!(panel.notice().is_some());

        // A later replacement picks up the stored value and re-renders.
        panel.select(Row::Age);
        type_str(&mut panel, "43");
        panel.select(Row::Actions);
        panel.replace_age();
        assert_eq!(panel.shown().age, 43);
        assert!(!panel.stale());
    }

    #[test]
    fn test_object_update_without_age_raises_notice() {
        let mut panel = StatePanel::new();
        panel.replace_age();
        assert_eq!(panel.notice(), Some("type an age first"));
        assert_eq!(panel.user().age, 20);
    }

    #[test]
    fn test_age_field_accepts_digits_only() {
        let mut panel = focused();
        panel.select(Row::Age);
        type_str(&mut panel, "4a2");
        panel.select(Row::Actions);
        panel.replace_age();
        assert_eq!(panel.user().age, 42);
    }

    #[test]
    fn test_row_navigation_and_typing() {
        let mut panel = focused();
        assert!(panel.typing());
        assert!(!panel.keymap.up.enabled());

        panel.update(&press(KeyCode::Down));
        assert_eq!(panel.row(), Row::Age);
        panel.update(&press(KeyCode::Down));
        assert_eq!(panel.row(), Row::Actions);
        assert!(!panel.typing());
        assert!(panel.keymap.replace.enabled());

        // Action keys are not typed into the name field.
        panel.update(&press(KeyCode::Char('w')));
        assert_eq!(panel.name(), "");
        assert_eq!(panel.batch_value(), 1);

        panel.update(&press(KeyCode::Up));
        assert_eq!(panel.row(), Row::Age);
        assert!(!panel.keymap.replace.enabled());
    }

    #[test]
    fn test_keys_need_focus() {
        let mut panel = StatePanel::new();
        type_str(&mut panel, "abc");
        assert_eq!(panel.name(), "");
        assert!(!panel.typing());
    }

    #[test]
    fn test_view() {
        let mut panel = focused();
        let view = strip_ansi_escapes::strip_str(panel.view());
        assert!(view.contains("Name: (none)"));
        assert!(view.contains("User: John, age 20"));
        assert!(view.contains("Batched: 0"));

        type_str(&mut panel, "Ann");
        let view = strip_ansi_escapes::strip_str(panel.view());
        assert!(view.contains("Name: Ann"));
    }
}
