//! Values compared by identity rather than by content.
//!
//! Two [`Ident`]s are equal only when one is a clone of the other, the way
//! two references to the same object are equal. Building a new `Ident` from
//! an equal value still produces a different identity, which is exactly what
//! makes an unmemoized object look "changed" to an effect on every render.

use std::sync::atomic::{AtomicU64, Ordering};

static LAST_IDENTITY: AtomicU64 = AtomicU64::new(0);

fn next_identity() -> u64 {
    LAST_IDENTITY.fetch_add(1, Ordering::SeqCst) + 1
}

/// A value tagged with a process-unique identity.
#[derive(Debug, Clone)]
pub struct Ident<T> {
    id: u64,
    value: T,
}

impl<T> Ident<T> {
    /// Wraps a value under a fresh identity.
    pub fn new(value: T) -> Self {
        Self {
            id: next_identity(),
            value,
        }
    }

    /// The identity number.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The wrapped value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutable access to the wrapped value. The identity does not change, so
    /// anything comparing identities will not notice the edit.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> PartialEq for Ident<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Ident<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_values_have_distinct_identities() {
        let a = Ident::new("DARK");
        let b = Ident::new("DARK");
        assert_eq!(a.get(), b.get());
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_shares_identity() {
        let a = Ident::new(3);
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_mutation_keeps_identity() {
        let mut a = Ident::new(20);
        let before = a.clone();
        *a.get_mut() = 21;
        assert_eq!(a, before);
        assert_eq!(*a.get(), 21);
    }
}
