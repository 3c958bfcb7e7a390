//! The demo shell: four pages of widgets behind a tab bar.
//!
//! | Page | Widgets |
//! |------|---------|
//! | State | [`StatePanel`] |
//! | Effects | [`Counter`], [`ClampedCounter`], countdown |
//! | Memo | [`MemoPanel`], [`ThemePanel`] |
//! | Callback | [`CallbackPanel`] |
//!
//! Only the widgets on the active page are focused, so key bindings of
//! different pages never compete. While a text field has focus, `q` and `?`
//! are typed rather than handled; `ctrl+c` always quits. The countdown keeps
//! ticking while another page is shown; quitting tears it down, which cancels its pending tick.

use crate::callback::CallbackPanel;
use crate::config::Config;
use crate::countdown;
use crate::counter::{ClampedCounter, Counter};
use crate::effect::Effect;
use crate::help;
use crate::key::{Binding, KeyMap};
use crate::memo::{MemoPanel, ThemePanel};
use crate::state::StatePanel;
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Model as BubbleTeaModel, Msg, WindowSizeMsg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;
use tracing::{debug, info};

/// The pages, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Text, object and batched state.
    State,
    /// Counters and the countdown.
    Effects,
    /// Memoized computations.
    Memo,
    /// Handler identity.
    Callback,
}

impl Page {
    /// All pages in tab order.
    pub const ALL: [Page; 4] = [Page::State, Page::Effects, Page::Memo, Page::Callback];

    /// Tab title.
    pub fn title(&self) -> &'static str {
        match self {
            Page::State => "state",
            Page::Effects => "effects",
            Page::Memo => "memo",
            Page::Callback => "callback",
        }
    }

    fn index(&self) -> usize {
        match self {
            Page::State => 0,
            Page::Effects => 1,
            Page::Memo => 2,
            Page::Callback => 3,
        }
    }

    /// The page after this one, wrapping around.
    pub fn next(&self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    /// The page before this one, wrapping around.
    pub fn prev(&self) -> Page {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

/// Application-level key bindings.
#[derive(Debug, Clone)]
pub struct AppKeyMap {
    /// Next page.
    pub next_page: Binding,
    /// Previous page.
    pub prev_page: Binding,
    /// Toggle the expanded help.
    pub help: Binding,
    /// Quit. Disabled while a text field has focus.
    pub quit: Binding,
    /// Quit, even while typing.
    pub force_quit: Binding,
}

impl Default for AppKeyMap {
    fn default() -> Self {
        Self {
            next_page: Binding::new(vec![KeyCode::Tab]).with_help("tab", "next page"),
            prev_page: Binding::new(vec![KeyCode::BackTab]).with_help("shift+tab", "prev page"),
            help: Binding::new(vec![KeyCode::Char('?')]).with_help("?", "more"),
            quit: Binding::new(vec![KeyCode::Char('q')]).with_help("q", "quit"),
            force_quit: Binding::new(vec![(KeyCode::Char('c'), KeyModifiers::CONTROL)])
                .with_help("ctrl+c", "force quit"),
        }
    }
}

/// Bindings of the active page plus the application bindings.
struct PageHelp<'a> {
    groups: Vec<Vec<&'a Binding>>,
}

impl KeyMap for PageHelp<'_> {
    fn short_help(&self) -> Vec<&Binding> {
        self.groups.iter().flatten().copied().collect()
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        self.groups.clone()
    }
}

/// The demo application model.
#[derive(Debug)]
pub struct App {
    /// Help view state.
    pub help: help::Model,
    /// Application key bindings.
    pub keymap: AppKeyMap,
    page: Page,
    state: StatePanel,
    counter: Counter,
    clamped: ClampedCounter,
    countdown: countdown::Model,
    memo: MemoPanel,
    theme: ThemePanel,
    callbacks: CallbackPanel,
    mounted: Effect<()>,
    rendered: Effect<()>,
    quitting: bool,
}

impl App {
    /// Builds every page from the configuration and focuses the first page.
    pub fn new(config: &Config) -> Self {
        let mut app = Self {
            help: help::Model::new(),
            keymap: AppKeyMap::default(),
            page: Page::State,
            state: StatePanel::new(),
            counter: Counter::new(),
            clamped: ClampedCounter::default(),
            countdown: countdown::new_with_interval(config.seconds, config.interval()),
            memo: MemoPanel::new(config.heavy_iterations),
            theme: ThemePanel::new(),
            callbacks: CallbackPanel::new(),
            mounted: Effect::on_mount(),
            rendered: Effect::always(),
            quitting: false,
        };
        app.mounted.run(&(), |_| info!("demo mounted"));
        app.focus_page();
        app
    }

    /// The active page.
    pub fn page(&self) -> Page {
        self.page
    }

    /// Whether quit was requested.
    pub fn quitting(&self) -> bool {
        self.quitting
    }

    /// The countdown widget.
    pub fn countdown(&self) -> &countdown::Model {
        &self.countdown
    }

    /// The counter widget.
    pub fn counter(&self) -> &Counter {
        &self.counter
    }

    /// The state page.
    pub fn state(&self) -> &StatePanel {
        &self.state
    }

    /// How many messages the app has processed.
    pub fn renders(&self) -> usize {
        self.rendered.runs()
    }

    /// Switches to `page` and moves focus there.
    pub fn show(&mut self, page: Page) {
        if self.page != page {
            debug!(from = self.page.title(), to = page.title(), "page switched");
        }
        self.page = page;
        self.focus_page();
    }

    fn focus_page(&mut self) {
        self.state.blur();
        self.counter.blur();
        self.clamped.blur();
        self.countdown.blur();
        self.memo.blur();
        self.theme.blur();
        self.callbacks.blur();

        match self.page {
            Page::State => {
                self.state.focus();
            }
            Page::Effects => {
                self.counter.focus();
                self.clamped.focus();
                self.countdown.focus();
            }
            Page::Memo => {
                self.memo.focus();
                self.theme.focus();
            }
            Page::Callback => {
                self.callbacks.focus();
            }
        }
        self.sync_keymap();
    }

    fn sync_keymap(&mut self) {
        let typing = self.page == Page::State && self.state.typing();
        self.keymap.quit.set_enabled(!typing);
        self.keymap.help.set_enabled(!typing);
    }

    fn page_help(&self) -> PageHelp<'_> {
        let mut groups = match self.page {
            Page::State => self.state.help_groups(),
            Page::Effects => vec![
                self.counter.keymap.short_help(),
                self.clamped.keymap.short_help(),
                self.countdown.keymap.short_help(),
            ],
            Page::Memo => vec![
                self.memo.keymap.short_help(),
                self.theme.keymap.short_help(),
            ],
            Page::Callback => vec![self.callbacks.keymap.short_help()],
        };
        groups.push(vec![
            &self.keymap.next_page,
            &self.keymap.prev_page,
            &self.keymap.help,
            &self.keymap.quit,
            &self.keymap.force_quit,
        ]);
        PageHelp { groups }
    }

    /// Routes one message to the application and its widgets.
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        self.rendered.run(&(), |_| {});

        if let Some(size) = msg.downcast_ref::<WindowSizeMsg>() {
            self.help.width = usize::from(size.width);
            return None;
        }

        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if self.keymap.quit.matches(key_msg) || self.keymap.force_quit.matches(key_msg) {
                self.quitting = true;
                self.countdown.teardown();
                info!("quit requested");
                return Some(bubbletea_rs::quit());
            } else if self.keymap.next_page.matches(key_msg) {
                self.show(self.page.next());
                return None;
            } else if self.keymap.prev_page.matches(key_msg) {
                self.show(self.page.prev());
                return None;
            } else if self.keymap.help.matches(key_msg) {
                self.help.show_all = !self.help.show_all;
                return None;
            }
        }

        let cmd = self.countdown.update(msg);
        self.state.update(msg);
        self.counter.update(msg);
        self.clamped.update(msg);
        self.memo.update(msg);
        self.theme.update(msg);
        self.callbacks.update(msg);
        self.sync_keymap();
        cmd
    }

    fn tabs(&self) -> String {
        let active = Style::new()
            .bold(true)
            .foreground(Color::from("212"))
            .underline(true);
        let inactive = Style::new().foreground(Color::from("241"));
        Page::ALL
            .iter()
            .map(|page| {
                let style = if *page == self.page { &active } else { &inactive };
                style.clone().inline(true).render(page.title())
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn section(title: &str, body: &str) -> String {
        let heading = Style::new().bold(true).inline(true).render(title);
        format!("{}\n{}", heading, body)
    }

    /// Renders the tab bar, the active page and the help line.
    pub fn view(&self) -> String {
        let body = match self.page {
            Page::State => Self::section("State updates", &self.state.view()),
            Page::Effects => [
                Self::section("Counter", &self.counter.view()),
                Self::section("Click limit", &self.clamped.view()),
                Self::section("Countdown", &self.countdown.view()),
            ]
            .join("\n\n"),
            Page::Memo => [
                Self::section("Heavy computation", &self.memo.view()),
                Self::section("Object dependency", &self.theme.view()),
            ]
            .join("\n\n"),
            Page::Callback => Self::section("Handler identity", &self.callbacks.view()),
        };
        format!(
            "{}\n\n{}\n\n{}\n",
            self.tabs(),
            body,
            self.help.view(&self.page_help())
        )
    }
}

impl BubbleTeaModel for App {
    fn init() -> (Self, Option<Cmd>) {
        (App::new(&Config::current()), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        App::update(self, &msg)
    }

    fn view(&self) -> String {
        App::view(self)
    }
}
