//! String interning pool.
//!
//! Equal inputs map to the same stable handle, so that activity labels and
//! other repeated strings are stored once. A handle outlives any individual
//! `intern` call as long as the pool itself is alive.

use std::collections::HashMap;
use std::sync::Arc;

/// A stable, cheaply-cloneable reference into the interning pool.
pub type StableRef = Arc<str>;

/// Deduplicates strings behind reference-counted handles.
#[derive(Debug, Default)]
pub struct StringPool {
    entries: HashMap<Arc<str>, ()>,
}

impl StringPool {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Interns `s`, returning a handle shared by every prior call with an
    /// equal string.
    pub fn intern(&mut self, s: &str) -> StableRef {
        if let Some((key, _)) = self.entries.get_key_value(s) {
            return key.clone();
        }
        let arc: Arc<str> = Arc::from(s);
        self.entries.insert(arc.clone(), ());
        arc
    }

    /// Number of distinct strings currently interned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_share_identity() {
        let mut pool = StringPool::new();
        let a = pool.intern("alpha");
        let b = pool.intern("alpha");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn distinct_strings_get_distinct_handles() {
        let mut pool = StringPool::new();
        let a = pool.intern("alpha");
        let b = pool.intern("beta");
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(pool.len(), 2);
    }
}
