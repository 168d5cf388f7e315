//! State identifiers: ordered sequences of attribute values, interned through
//! a pool so that identity within one pool reduces to handle equality.

use crate::attr::AttributeValue;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// An ordered sequence of attribute values identifying one transition-system
/// state. Two identifiers compare equal iff they have the same length and
/// pairwise-equal elements; ordering is lexicographic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct StateId(Vec<AttributeValue>);

impl StateId {
    pub fn empty() -> Self {
        StateId(Vec::new())
    }

    pub fn from_values(values: Vec<AttributeValue>) -> Self {
        StateId(values)
    }

    /// Appends a value, returning the extended identifier.
    pub fn append(&self, value: AttributeValue) -> Self {
        let mut v = self.0.clone();
        v.push(value);
        StateId(v)
    }

    /// Returns the sub-sequence `[from, to)`.
    pub fn extract(&self, from: usize, to: usize) -> Self {
        StateId(self.0[from..to.min(self.0.len())].to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[AttributeValue] {
        &self.0
    }
}

impl PartialOrd for StateId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StateId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// A stable, cheaply-cloneable handle into a [`StateIdPool`]. Within one pool,
/// identity is pointer equality on the interned allocation.
pub type StateIdHandle = Arc<StateId>;

/// Interns [`StateId`] values so that equal sequences deduplicate to the same
/// handle, and owns the distinguished initial identifier (the empty sequence).
#[derive(Debug)]
pub struct StateIdPool {
    entries: HashMap<StateId, StateIdHandle>,
    initial: StateIdHandle,
}

impl Default for StateIdPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StateIdPool {
    pub fn new() -> Self {
        let initial: StateIdHandle = Arc::new(StateId::empty());
        let mut entries = HashMap::new();
        entries.insert(StateId::empty(), initial.clone());
        StateIdPool { entries, initial }
    }

    /// The pool's distinguished initial identifier (the empty sequence).
    pub fn initial(&self) -> StateIdHandle {
        self.initial.clone()
    }

    /// Interns `id`, returning the canonical handle for equal sequences.
    pub fn intern(&mut self, id: StateId) -> StateIdHandle {
        if let Some(handle) = self.entries.get(&id) {
            return handle.clone();
        }
        let handle: StateIdHandle = Arc::new(id.clone());
        self.entries.insert(id, handle.clone());
        handle
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parikh-vector specialization of state identity: a commutative multiset of
/// activities rather than an ordered sequence. The pool maintains a
/// pool-wide activity-name to vector-index map so that all Parikh identities
/// it produces share index assignments.
#[derive(Debug, Default)]
pub struct ParikhIdentityPool {
    activity_index: HashMap<Arc<str>, usize>,
    pool: StateIdPool,
}

impl ParikhIdentityPool {
    pub fn new() -> Self {
        Self {
            activity_index: HashMap::new(),
            pool: StateIdPool::new(),
        }
    }

    fn index_for(&mut self, activity: &str) -> usize {
        if let Some(&idx) = self.activity_index.get(activity) {
            return idx;
        }
        let idx = self.activity_index.len();
        self.activity_index.insert(Arc::from(activity), idx);
        idx
    }

    /// Given the current multiset of activity counts and a newly observed
    /// activity, returns the interned handle for the resulting state identity.
    /// The identity is the full counts vector, in activity-index order.
    pub fn advance(&mut self, counts: &mut Vec<i64>, activity: &str) -> StateIdHandle {
        let idx = self.index_for(activity);
        if counts.len() <= idx {
            counts.resize(idx + 1, 0);
        }
        counts[idx] += 1;
        let values = counts.iter().map(|&c| AttributeValue::Int64(c)).collect();
        self.pool.intern(StateId::from_values(values))
    }

    pub fn initial(&self) -> StateIdHandle {
        self.pool.initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_sequences_intern_to_same_handle() {
        let mut pool = StateIdPool::new();
        let a = pool.intern(StateId::from_values(vec![AttributeValue::from("A")]));
        let b = pool.intern(StateId::from_values(vec![AttributeValue::from("A")]));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_sequences_get_distinct_handles() {
        let mut pool = StateIdPool::new();
        let a = pool.intern(StateId::from_values(vec![AttributeValue::from("A")]));
        let b = pool.intern(StateId::from_values(vec![AttributeValue::from("B")]));
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn lexicographic_ordering() {
        let a = StateId::from_values(vec![AttributeValue::Int32(1)]);
        let b = StateId::from_values(vec![AttributeValue::Int32(1), AttributeValue::Int32(2)]);
        assert!(a < b);
    }

    #[test]
    fn parikh_identity_counts_occurrences() {
        let mut pool = ParikhIdentityPool::new();
        let mut counts = Vec::new();
        pool.advance(&mut counts, "A");
        pool.advance(&mut counts, "B");
        let id = pool.advance(&mut counts, "A");
        assert_eq!(
            id.values(),
            &[AttributeValue::Int64(2), AttributeValue::Int64(1)]
        );
    }
}
