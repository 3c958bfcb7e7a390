//! Dependency-tracked side effects.
//!
//! An [`Effect`] remembers the dependency value it last ran with and decides
//! whether the side effect is due for the current one:
//!
//! - [`Trigger::Mount`] runs once, on the first evaluation.
//! - [`Trigger::EveryRender`] runs on every evaluation.
//! - [`Trigger::OnChange`] runs on the first evaluation and whenever the
//!   dependency differs from the previous evaluation.
//!
//! ```rust
//! use lifecycle_widgets::effect::Effect;
//!
//! let mut effect = Effect::on_change();
//! let mut seen = Vec::new();
//! for count in [0, 0, 1, 1, 2] {
//!     effect.run(&count, |c| seen.push(*c));
//! }
//! assert_eq!(seen, vec![0, 1, 2]);
//! assert_eq!(effect.runs(), 3);
//! ```

/// When an effect fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First evaluation only.
    Mount,
    /// Every evaluation.
    EveryRender,
    /// First evaluation and every dependency change.
    OnChange,
}

/// A side effect gated on its dependencies.
#[derive(Debug, Clone)]
pub struct Effect<D> {
    trigger: Trigger,
    last: Option<D>,
    runs: usize,
}

impl<D: PartialEq + Clone> Effect<D> {
    /// Creates an effect with the given trigger.
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            last: None,
            runs: 0,
        }
    }

    /// Runs once.
    pub fn on_mount() -> Self {
        Self::new(Trigger::Mount)
    }

    /// Runs on every evaluation.
    pub fn always() -> Self {
        Self::new(Trigger::EveryRender)
    }

    /// Runs when the dependency changes.
    pub fn on_change() -> Self {
        Self::new(Trigger::OnChange)
    }

    /// The trigger policy.
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Whether `run` would call its closure for these dependencies.
    pub fn is_due(&self, deps: &D) -> bool {
        match self.trigger {
            Trigger::Mount => self.runs == 0,
            Trigger::EveryRender => true,
            Trigger::OnChange => self.last.as_ref() != Some(deps),
        }
    }

    /// Calls `f` if the effect is due and records `deps`.
    ///
    /// # Arguments
    ///
    /// * `deps` - The dependency value for this evaluation.
    /// * `f` - The side effect. It receives the dependencies it runs for.
    ///
    /// # Returns
    ///
    /// Whether `f` was called.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lifecycle_widgets::effect::Effect;
    ///
    /// let mut title = Effect::on_change();
    /// let mut log = Vec::new();
    ///
    /// assert!(title.run(&"draft", |t| log.push(format!("title: {t}"))));
    /// assert!(!title.run(&"draft", |t| log.push(format!("title: {t}"))));
    /// assert!(title.run(&"final", |t| log.push(format!("title: {t}"))));
    /// assert_eq!(log, ["title: draft", "title: final"]);
    /// ```
    pub fn run<F: FnOnce(&D)>(&mut self, deps: &D, f: F) -> bool {
        let due = self.is_due(deps);
        self.last = Some(deps.clone());
        if due {
            self.runs += 1;
            f(deps);
        }
        due
    }

    /// How many times the effect has run.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Forgets the recorded dependencies, as if the owner were mounted again.
    pub fn reset(&mut self) {
        self.last = None;
        self.runs = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_runs_once() {
        let mut effect = Effect::on_mount();
        let mut calls = 0;
        for n in 0..5 {
            effect.run(&n, |_| calls += 1);
        }
        assert_eq!(calls, 1);
        assert_eq!(effect.runs(), 1);
    }

    #[test]
    fn test_always_runs_every_time() {
        let mut effect = Effect::always();
        for _ in 0..4 {
            assert!(effect.run(&(), |_| {}));
        }
        assert_eq!(effect.runs(), 4);
    }

    #[test]
    fn test_on_change_skips_equal_deps() {
        let mut effect = Effect::on_change();
        assert!(effect.run(&"a".to_string(), |_| {}));
        assert!(!effect.run(&"a".to_string(), |_| {}));
        assert!(effect.run(&"ab".to_string(), |_| {}));
        assert_eq!(effect.runs(), 2);
    }

    #[test]
    fn test_is_due_does_not_record() {
        let effect: Effect<i32> = Effect::on_change();
        assert!(effect.is_due(&1));
        assert!(effect.is_due(&1));
        assert_eq!(effect.runs(), 0);
    }

    #[test]
    fn test_reset_behaves_like_remount() {
        let mut effect = Effect::on_mount();
        effect.run(&1, |_| {});
        assert!(!effect.is_due(&1));
        effect.reset();
        assert!(effect.is_due(&1));
    }
}
