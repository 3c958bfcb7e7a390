//! Single-line text input.
//!
//! A trimmed-down text field: a prompt, an optional placeholder, a cursor
//! that can move within the value, and the usual readline-style editing keys.
//! The value is stored as a `Vec<char>` so the cursor position is always a
//! character index.
//!
//! An optional character filter restricts what can be typed, which is how
//! numeric fields are built:
//!
//! ```rust
//! use lifecycle_widgets::textinput;
//! use lifecycle_widgets::Component;
//!
//! let mut age = textinput::new();
//! age.set_char_filter(|c| c.is_ascii_digit());
//! age.set_char_limit(3);
//! age.focus();
//!
//! age.set_value("4x21");
//! assert_eq!(age.value(), "421");
//! ```

use crate::key::{self, Binding};
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;

/// Predicate deciding which characters the input accepts.
pub type CharFilter = fn(char) -> bool;

/// Editing and movement bindings.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Move cursor one character right.
    pub character_forward: Binding,
    /// Move cursor one character left.
    pub character_backward: Binding,
    /// Delete one character backward.
    pub delete_character_backward: Binding,
    /// Delete one character forward.
    pub delete_character_forward: Binding,
    /// Delete from cursor to end of line.
    pub delete_after_cursor: Binding,
    /// Delete from start of line to cursor.
    pub delete_before_cursor: Binding,
    /// Move to start of line.
    pub line_start: Binding,
    /// Move to end of line.
    pub line_end: Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            character_forward: Binding::new(vec![
                (KeyCode::Right, KeyModifiers::NONE),
                (KeyCode::Char('f'), KeyModifiers::CONTROL),
            ])
            .with_help("→", "right"),
            character_backward: Binding::new(vec![
                (KeyCode::Left, KeyModifiers::NONE),
                (KeyCode::Char('b'), KeyModifiers::CONTROL),
            ])
            .with_help("←", "left"),
            delete_character_backward: Binding::new(vec![
                (KeyCode::Backspace, KeyModifiers::NONE),
                (KeyCode::Char('h'), KeyModifiers::CONTROL),
            ])
            .with_help("backspace", "delete"),
            delete_character_forward: Binding::new(vec![
                (KeyCode::Delete, KeyModifiers::NONE),
                (KeyCode::Char('d'), KeyModifiers::CONTROL),
            ]),
            delete_after_cursor: Binding::new(vec![(KeyCode::Char('k'), KeyModifiers::CONTROL)]),
            delete_before_cursor: Binding::new(vec![(KeyCode::Char('u'), KeyModifiers::CONTROL)])
                .with_help("ctrl+u", "clear"),
            line_start: Binding::new(vec![
                (KeyCode::Home, KeyModifiers::NONE),
                (KeyCode::Char('a'), KeyModifiers::CONTROL),
            ]),
            line_end: Binding::new(vec![
                (KeyCode::End, KeyModifiers::NONE),
                (KeyCode::Char('e'), KeyModifiers::CONTROL),
            ]),
        }
    }
}

impl key::KeyMap for KeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![
            &self.character_backward,
            &self.character_forward,
            &self.delete_character_backward,
            &self.delete_before_cursor,
        ]
    }
}

/// The text input model.
#[derive(Debug, Clone)]
pub struct Model {
    /// Text shown before the value.
    pub prompt: String,
    /// Style for the prompt.
    pub prompt_style: Style,
    /// Style for the typed text.
    pub text_style: Style,
    /// Text shown while the value is empty.
    pub placeholder: String,
    /// Style for the placeholder.
    pub placeholder_style: Style,
    /// Style for the character under the cursor.
    pub cursor_style: Style,
    /// Maximum number of characters. Zero means no limit.
    pub char_limit: usize,
    /// Key bindings.
    pub keymap: KeyMap,
    char_filter: Option<CharFilter>,
    value: Vec<char>,
    pos: usize,
    focus: bool,
}

/// Creates an empty, unfocused input with a `"> "` prompt.
pub fn new() -> Model {
    Model {
        prompt: "> ".to_string(),
        prompt_style: Style::new(),
        text_style: Style::new(),
        placeholder: String::new(),
        placeholder_style: Style::new().foreground(Color::from("240")),
        cursor_style: Style::new().reverse(true),
        char_limit: 0,
        keymap: KeyMap::default(),
        char_filter: None,
        value: Vec::new(),
        pos: 0,
        focus: false,
    }
}

impl Default for Model {
    fn default() -> Self {
        new()
    }
}

impl Model {
    /// Replaces the value, applying the filter and the character limit, and
    /// moves the cursor to the end.
    pub fn set_value(&mut self, s: &str) {
        self.value.clear();
        self.pos = 0;
        self.insert(s.chars());
    }

    /// The current value.
    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    /// Cursor position as a character index.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor, clamped to the value.
    pub fn set_cursor(&mut self, pos: usize) {
        self.pos = pos.min(self.value.len());
    }

    /// Moves the cursor to the start.
    pub fn cursor_start(&mut self) {
        self.set_cursor(0);
    }

    /// Moves the cursor to the end.
    pub fn cursor_end(&mut self) {
        self.set_cursor(self.value.len());
    }

    /// Sets the placeholder text.
    pub fn set_placeholder(&mut self, placeholder: &str) {
        self.placeholder = placeholder.to_string();
    }

    /// Limits the value to `limit` characters. Zero removes the limit.
    pub fn set_char_limit(&mut self, limit: usize) {
        self.char_limit = limit;
    }

    /// Restricts typed characters to those accepted by `filter`.
    pub fn set_char_filter(&mut self, filter: CharFilter) {
        self.char_filter = Some(filter);
    }

    /// Clears the value.
    pub fn reset(&mut self) {
        self.value.clear();
        self.pos = 0;
    }

    fn insert<I: IntoIterator<Item = char>>(&mut self, chars: I) {
        for c in chars {
            if self.char_limit > 0 && self.value.len() >= self.char_limit {
                break;
            }
            if let Some(accept) = self.char_filter {
                if !accept(c) {
                    continue;
                }
            }
            self.value.insert(self.pos, c);
            self.pos += 1;
        }
    }

    fn delete_before_cursor(&mut self) {
        self.value.drain(..self.pos);
        self.pos = 0;
    }

    fn delete_after_cursor(&mut self) {
        self.value.truncate(self.pos);
    }

    /// Applies editing keys and typed characters while focused.
    pub fn update(&mut self, msg: &Msg) {
        if !self.focus {
            return;
        }
        let Some(key_msg) = msg.downcast_ref::<KeyMsg>() else {
            return;
        };

        if self.keymap.delete_character_backward.matches(key_msg) {
            if self.pos > 0 {
                self.value.remove(self.pos - 1);
                self.pos -= 1;
            }
        } else if self.keymap.delete_character_forward.matches(key_msg) {
            if self.pos < self.value.len() {
                self.value.remove(self.pos);
            }
        } else if self.keymap.delete_after_cursor.matches(key_msg) {
            self.delete_after_cursor();
        } else if self.keymap.delete_before_cursor.matches(key_msg) {
            self.delete_before_cursor();
        } else if self.keymap.character_backward.matches(key_msg) {
            self.set_cursor(self.pos.saturating_sub(1));
        } else if self.keymap.character_forward.matches(key_msg) {
            self.set_cursor(self.pos + 1);
        } else if self.keymap.line_start.matches(key_msg) {
            self.cursor_start();
        } else if self.keymap.line_end.matches(key_msg) {
            self.cursor_end();
        } else if let KeyCode::Char(c) = key_msg.key {
            // Shift is folded into the character; control and alt are commands.
            if !key_msg
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            {
                self.insert([c]);
            }
        }
    }

    fn render_cursor(&self, c: char) -> String {
        if self.focus {
            self.cursor_style.clone().inline(true).render(&c.to_string())
        } else {
            self.text_style.clone().inline(true).render(&c.to_string())
        }
    }

    fn placeholder_view(&self) -> String {
        let mut chars = self.placeholder.chars();
        let mut v = String::new();
        if let Some(first) = chars.next() {
            if self.focus {
                v.push_str(&self.cursor_style.clone().inline(true).render(&first.to_string()));
            } else {
                v.push_str(
                    &self
                        .placeholder_style
                        .clone()
                        .inline(true)
                        .render(&first.to_string()),
                );
            }
        }
        let rest: String = chars.collect();
        if !rest.is_empty() {
            v.push_str(&self.placeholder_style.clone().inline(true).render(&rest));
        }
        v
    }

    /// Renders the prompt, the value and the cursor.
    pub fn view(&self) -> String {
        let prompt = self.prompt_style.clone().inline(true).render(&self.prompt);

        if self.value.is_empty() && !self.placeholder.is_empty() {
            return format!("{}{}", prompt, self.placeholder_view());
        }

        let before: String = self.value[..self.pos].iter().collect();
        let mut v = self.text_style.clone().inline(true).render(&before);
        match self.value.get(self.pos) {
            Some(&c) => {
                v.push_str(&self.render_cursor(c));
                let after: String = self.value[self.pos + 1..].iter().collect();
                v.push_str(&self.text_style.clone().inline(true).render(&after));
            }
            None if self.focus => v.push_str(&self.render_cursor(' ')),
            None => {}
        }
        format!("{}{}", prompt, v)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Msg {
        Box::new(KeyMsg {
            key: code,
            modifiers,
        })
    }

    fn type_str(input: &mut Model, s: &str) {
        for c in s.chars() {
            input.update(&press(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn focused() -> Model {
        let mut input = new();
        input.focus();
        input
    }

    #[test]
    fn test_typing_requires_focus() {
        let mut input = new();
        type_str(&mut input, "abc");
        assert_eq!(input.value(), "");

        input.focus();
        type_str(&mut input, "abc");
        assert_eq!(input.value(), "abc");
        assert_eq!(input.position(), 3);
    }

    #[test]
    fn test_shifted_characters_are_typed() {
        let mut input = focused();
        input.update(&press(KeyCode::Char('J'), KeyModifiers::SHIFT));
        type_str(&mut input, "o");
        assert_eq!(input.value(), "Jo");
    }

    #[test]
    fn test_control_characters_are_not_typed() {
        let mut input = focused();
        type_str(&mut input, "ab");
        input.update(&press(KeyCode::Char('x'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "ab");
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut input = focused();
        type_str(&mut input, "ac");
        input.update(&press(KeyCode::Left, KeyModifiers::NONE));
        type_str(&mut input, "b");
        assert_eq!(input.value(), "abc");
        assert_eq!(input.position(), 2);
    }

    #[test]
    fn test_deletion_keys() {
        let mut input = focused();
        type_str(&mut input, "hello");
        input.update(&press(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.value(), "hell");

        input.update(&press(KeyCode::Home, KeyModifiers::NONE));
        input.update(&press(KeyCode::Delete, KeyModifiers::NONE));
        assert_eq!(input.value(), "ell");

        input.update(&press(KeyCode::Right, KeyModifiers::NONE));
        input.update(&press(KeyCode::Char('k'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "e");

        input.update(&press(KeyCode::End, KeyModifiers::NONE));
        input.update(&press(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "");
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut input = focused();
        input.update(&press(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(input.value(), "");
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn test_char_limit_and_filter() {
        let mut input = focused();
        input.set_char_filter(|c| c.is_ascii_digit());
        input.set_char_limit(3);
        type_str(&mut input, "1a2b34");
        assert_eq!(input.value(), "123");
    }

    #[test]
    fn test_set_value_moves_cursor_to_end() {
        let mut input = new();
        input.set_value("hi");
        assert_eq!(input.position(), 2);
        input.set_cursor(10);
        assert_eq!(input.position(), 2);
        input.reset();
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_view() {
        let mut input = new();
        input.set_placeholder("your name");
        assert_eq!(strip_ansi_escapes::strip_str(input.view()), "> your name");

        input.set_value("Ann");
        assert_eq!(strip_ansi_escapes::strip_str(input.view()), "> Ann");

        input.focus();
        assert_eq!(strip_ansi_escapes::strip_str(input.view()), "> Ann ");
    }
}
