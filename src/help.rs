//! Help line generated from a widget's key bindings.
//!
//! Every page of the demo renders a help line under its widgets. The line is
//! built from the page's [`KeyMap`], so bindings that a widget has disabled
//! (for example "start" while the countdown is running) drop out of the help
//! automatically.
//!
//! ```rust
//! use lifecycle_widgets::help::Model;
//! use lifecycle_widgets::key::{Binding, KeyMap};
//! use crossterm::event::KeyCode;
//!
//! struct Keys {
//!     quit: Binding,
//! }
//!
//! impl KeyMap for Keys {
//!     fn short_help(&self) -> Vec<&Binding> {
//!         vec![&self.quit]
//!     }
//! }
//!
//! let keys = Keys { quit: Binding::new(vec![KeyCode::Char('q')]).with_help("q", "quit") };
//! let help = Model::new().with_width(40);
//! assert!(help.view(&keys).contains("quit"));
//! ```

use crate::key::{Binding, KeyMap};
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;

/// Styles used when rendering help.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Style of the truncation marker.
    pub ellipsis: Style,
    /// Key labels.
    pub key: Style,
    /// Descriptions.
    pub desc: Style,
    /// Separators between items and columns.
    pub separator: Style,
}

impl Default for Styles {
    fn default() -> Self {
        use lipgloss::AdaptiveColor;

        let key_style = Style::new().foreground(AdaptiveColor {
            Light: "#909090",
            Dark: "#626262",
        });
        let desc_style = Style::new().foreground(AdaptiveColor {
            Light: "#B2B2B2",
            Dark: "#4A4A4A",
        });
        let sep_style = Style::new().foreground(AdaptiveColor {
            Light: "#DDDADA",
            Dark: "#3C3C3C",
        });

        Self {
            ellipsis: sep_style.clone(),
            key: key_style,
            desc: desc_style,
            separator: sep_style,
        }
    }
}

/// Help view state.
#[derive(Debug, Clone)]
pub struct Model {
    /// Render the multi-column help instead of the single line.
    pub show_all: bool,
    /// Maximum width; zero means unbounded.
    pub width: usize,
    /// Separator between short help items.
    pub short_separator: String,
    /// Separator between full help columns.
    pub full_separator: String,
    /// Marker appended when items are cut off.
    pub ellipsis: String,
    /// Rendering styles.
    pub styles: Styles,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            show_all: false,
            width: 0,
            short_separator: " • ".to_string(),
            full_separator: "    ".to_string(),
            ellipsis: "…".to_string(),
            styles: Styles::default(),
        }
    }
}

impl Model {
    /// Creates a help model with default styles and no width limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Renders help for the given key map.
    pub fn view<K: KeyMap + ?Sized>(&self, keymap: &K) -> String {
        if self.show_all {
            self.full_help_view(keymap.full_help())
        } else {
            self.short_help_view(keymap.short_help())
        }
    }

    fn item(&self, binding: &Binding) -> String {
        let help = binding.help();
        let key_part = self.styles.key.clone().inline(true).render(&help.key);
        let desc_part = self.styles.desc.clone().inline(true).render(&help.desc);
        format!("{} {}", key_part, desc_part)
    }

    /// Renders enabled bindings on one line, truncating at `width`.
    pub fn short_help_view(&self, bindings: Vec<&Binding>) -> String {
        let separator = self
            .styles
            .separator
            .clone()
            .inline(true)
            .render(&self.short_separator);

        let mut builder = String::new();
        let mut total_width = 0;

        for kb in bindings.into_iter().filter(|b| b.enabled()) {
            let sep = if total_width > 0 { separator.as_str() } else { "" };
            let item_str = format!("{}{}", sep, self.item(kb));
            let item_width = lipgloss::width_visible(&item_str);

            if let Some(tail) = self.should_add_item(total_width, item_width) {
                builder.push_str(&tail);
                break;
            }

            total_width += item_width;
            builder.push_str(&item_str);
        }
        builder
    }

    /// Renders each group as a column of enabled bindings.
    pub fn full_help_view(&self, groups: Vec<Vec<&Binding>>) -> String {
        let separator = self
            .styles
            .separator
            .clone()
            .inline(true)
            .render(&self.full_separator);

        let mut columns = Vec::new();
        let mut total_width = 0;

        for group in groups.iter().filter(|g| should_render_column(g)) {
            let col_str = group
                .iter()
                .filter(|b| b.enabled())
                .map(|b| self.item(b))
                .collect::<Vec<_>>()
                .join("\n");
            let col_width = col_str
                .lines()
                .map(lipgloss::width_visible)
                .max()
                .unwrap_or(0);

            // Every column after the first is preceded by the separator.
            let sep_width = if columns.is_empty() {
                0
            } else {
                lipgloss::width_visible(&separator)
            };

            if let Some(tail) = self.should_add_item(total_width + sep_width, col_width) {
                if !tail.is_empty() {
                    columns.push(tail);
                }
                break;
            }

            total_width += sep_width + col_width;
            columns.push(col_str);
        }

        let mut parts: Vec<&str> = Vec::new();
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                parts.push(separator.as_str());
            }
            parts.push(col.as_str());
        }
        lipgloss::join_horizontal(lipgloss::TOP, &parts)
    }

    fn should_add_item(&self, total_width: usize, item_width: usize) -> Option<String> {
        if self.width > 0 && total_width + item_width > self.width {
            let tail = format!(
                " {}",
                self.styles
                    .ellipsis
                    .clone()
                    .inline(true)
                    .render(&self.ellipsis)
            );
            if total_width + lipgloss::width_visible(&tail) < self.width {
                return Some(tail);
            }
            return Some(String::new());
        }
        None
    }
}

/// A column is worth rendering if any binding in it is enabled.
pub fn should_render_column(bindings: &[&Binding]) -> bool {
    bindings.iter().any(|b| b.enabled())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    struct Keys {
        start: Binding,
        stop: Binding,
        quit: Binding,
    }

    impl KeyMap for Keys {
        fn short_help(&self) -> Vec<&Binding> {
            vec![&self.start, &self.stop, &self.quit]
        }

        fn full_help(&self) -> Vec<Vec<&Binding>> {
            vec![vec![&self.start, &self.stop], vec![&self.quit]]
        }
    }

    fn keys() -> Keys {
        Keys {
            start: Binding::new(vec![KeyCode::Char('s')]).with_help("s", "start"),
            stop: Binding::new(vec![KeyCode::Char('p')]).with_help("p", "stop"),
            quit: Binding::new(vec![KeyCode::Char('q')]).with_help("q", "quit"),
        }
    }

    fn plain(s: &str) -> String {
        strip_ansi_escapes::strip_str(s)
    }

    #[test]
    fn test_short_help_lists_enabled_bindings() {
        let view = plain(&Model::new().view(&keys()));
        assert_eq!(view, "s start • p stop • q quit");
    }

    #[test]
    fn test_short_help_skips_disabled() {
        let mut k = keys();
        k.stop.set_enabled(false);
        let view = plain(&Model::new().view(&k));
        assert_eq!(view, "s start • q quit");
    }

    #[test]
    fn test_short_help_truncates_with_ellipsis() {
        let view = plain(&Model::new().with_width(12).view(&keys()));
        assert!(view.starts_with("s start"));
        assert!(view.ends_with('…'));
        assert!(!view.contains("quit"));
    }

    #[test]
    fn test_full_help_renders_columns() {
        let mut help = Model::new();
        help.show_all = true;
        let view = plain(&help.view(&keys()));
        let first_line = view.lines().next().unwrap_or_default();
        assert!(first_line.contains("s start"));
        assert!(first_line.contains("q quit"));
        assert!(view.contains("p stop"));
    }

    #[test]
    fn test_full_help_counts_separator_against_width() {
        struct Columns {
            a: Binding,
            b: Binding,
        }

        impl KeyMap for Columns {
            fn short_help(&self) -> Vec<&Binding> {
                vec![&self.a, &self.b]
            }

            fn full_help(&self) -> Vec<Vec<&Binding>> {
                vec![vec![&self.a], vec![&self.b]]
            }
        }

        let columns = Columns {
            a: Binding::new(vec![KeyCode::Char('a')]).with_help("a", "aaaa"),
            b: Binding::new(vec![KeyCode::Char('b')]).with_help("b", "bbbb"),
        };
        let mut help = Model::new().with_width(13);
        help.show_all = true;

        let view = plain(&help.view(&columns));
        for line in view.lines() {
            assert!(
                lipgloss::width_visible(line) <= 13,
                "line {:?} is wider than 13",
                line
            );
        }
        assert!(view.contains("a aaaa"));
        assert!(!view.contains("b bbbb"));
    }

    #[test]
    fn test_column_with_only_disabled_bindings_is_hidden() {
        let mut k = keys();
        k.quit.set_enabled(false);
        assert!(!should_render_column(&[&k.quit]));

        let mut help = Model::new();
        help.show_all = true;
        assert!(!plain(&help.view(&k)).contains("quit"));
    }
}
