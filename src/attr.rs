//! Discriminated-union attribute value used for activity labels, state-identity
//! components, and arbitrary user payloads attached to states, transitions,
//! positions and arcs.

use std::cmp::Ordering;
use std::sync::Arc;

/// A single attribute value.
///
/// Owned strings and byte arrays are reference-counted: cloning an
/// `AttributeValue` clones the handle, never the payload.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum AttributeValue {
    /// No value at all. Distinct from every other variant, including the
    /// zero-valued numeric ones.
    Empty,
    Char(i8),
    UChar(u8),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    /// Opaque handle; never dereferenced by this crate. Equality and ordering
    /// are by the numeric tag only.
    VoidPtr(usize),
    /// Borrowed C-style string; comparisons use the string's own ordering.
    CStr(Arc<str>),
    /// Reference-counted owned string.
    OwnedString(Arc<String>),
    /// Reference-counted byte array.
    ByteArray(Arc<Vec<u8>>),
    /// Opaque reference-counted object, compared only by allocation identity.
    #[serde(skip)]
    DestrObj(Arc<dyn std::any::Any + Send + Sync>),
}

impl Default for AttributeValue {
    fn default() -> Self {
        AttributeValue::Empty
    }
}

/// Stable discriminant used for cross-kind ordering and canonical tagging.
fn kind_rank(v: &AttributeValue) -> u8 {
    match v {
        AttributeValue::Empty => 0,
        AttributeValue::Char(_) => 1,
        AttributeValue::UChar(_) => 2,
        AttributeValue::Int32(_) => 3,
        AttributeValue::UInt32(_) => 4,
        AttributeValue::Int64(_) => 5,
        AttributeValue::UInt64(_) => 6,
        AttributeValue::Double(_) => 7,
        AttributeValue::VoidPtr(_) => 8,
        AttributeValue::CStr(_) => 9,
        AttributeValue::OwnedString(_) => 10,
        AttributeValue::ByteArray(_) => 11,
        AttributeValue::DestrObj(_) => 12,
    }
}

impl AttributeValue {
    /// Returns the canonical string form of this value, used for display and
    /// for DOT-label emission.
    pub fn canonical_string(&self) -> String {
        match self {
            AttributeValue::Empty => String::new(),
            AttributeValue::Char(c) => c.to_string(),
            AttributeValue::UChar(c) => c.to_string(),
            AttributeValue::Int32(n) => n.to_string(),
            AttributeValue::UInt32(n) => n.to_string(),
            AttributeValue::Int64(n) => n.to_string(),
            AttributeValue::UInt64(n) => n.to_string(),
            AttributeValue::Double(d) => d.to_string(),
            AttributeValue::VoidPtr(p) => format!("0x{:x}", p),
            AttributeValue::CStr(s) => s.to_string(),
            AttributeValue::OwnedString(s) => s.as_ref().clone(),
            AttributeValue::ByteArray(b) => {
                b.iter().map(|byte| format!("{:02x}", byte)).collect()
            }
            AttributeValue::DestrObj(obj) => format!("<obj@{:p}>", Arc::as_ptr(obj)),
        }
    }

    /// Compares two values, requiring they be of the same kind. Returns `None`
    /// if the kinds differ.
    pub fn cmp_same_kind(&self, other: &Self) -> Option<Ordering> {
        use AttributeValue::*;
        match (self, other) {
            (Empty, Empty) => Some(Ordering::Equal),
            (Char(a), Char(b)) => Some(a.cmp(b)),
            (UChar(a), UChar(b)) => Some(a.cmp(b)),
            (Int32(a), Int32(b)) => Some(a.cmp(b)),
            (UInt32(a), UInt32(b)) => Some(a.cmp(b)),
            (Int64(a), Int64(b)) => Some(a.cmp(b)),
            (UInt64(a), UInt64(b)) => Some(a.cmp(b)),
            (Double(a), Double(b)) => a.partial_cmp(b),
            (VoidPtr(a), VoidPtr(b)) => Some(a.cmp(b)),
            (CStr(a), CStr(b)) => Some(a.cmp(b)),
            (OwnedString(a), OwnedString(b)) => Some(a.cmp(b)),
            (ByteArray(a), ByteArray(b)) => Some(a.cmp(b)),
            (DestrObj(a), DestrObj(b)) => Some(Arc::as_ptr(a).cast::<()>().cmp(&Arc::as_ptr(b).cast::<()>())),
            _ => None,
        }
    }

    /// Compares two values of possibly different kinds: integer kinds are
    /// coerced to `i128` first, everything else falls back to tag order.
    pub fn cmp_cross_kind(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (self.as_integer(), other.as_integer()) {
            return a.cmp(&b);
        }
        if kind_rank(self) == kind_rank(other) {
            if let Some(ord) = self.cmp_same_kind(other) {
                return ord;
            }
        }
        kind_rank(self).cmp(&kind_rank(other))
    }

    fn as_integer(&self) -> Option<i128> {
        match self {
            AttributeValue::Char(c) => Some(*c as i128),
            AttributeValue::UChar(c) => Some(*c as i128),
            AttributeValue::Int32(n) => Some(*n as i128),
            AttributeValue::UInt32(n) => Some(*n as i128),
            AttributeValue::Int64(n) => Some(*n as i128),
            AttributeValue::UInt64(n) => Some(*n as i128),
            _ => None,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_cross_kind(other) == Ordering::Equal
    }
}

impl Eq for AttributeValue {}

impl PartialOrd for AttributeValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_cross_kind(other))
    }
}

impl Ord for AttributeValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_cross_kind(other)
    }
}

impl std::hash::Hash for AttributeValue {
    /// Must agree with `cmp_cross_kind`'s equality (`PartialEq`): integer
    /// kinds hash by their coerced `i128` value under one shared tag, since
    /// `Int32(5) == Int64(5)` there. Every other kind hashes by `kind_rank`
    /// plus its own payload, matching `cmp_same_kind`'s strict comparison.
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if let Some(n) = self.as_integer() {
            0u8.hash(state);
            n.hash(state);
            return;
        }
        kind_rank(self).hash(state);
        match self {
            AttributeValue::Empty => {}
            AttributeValue::Char(_)
            | AttributeValue::UChar(_)
            | AttributeValue::Int32(_)
            | AttributeValue::UInt32(_)
            | AttributeValue::Int64(_)
            | AttributeValue::UInt64(_) => unreachable!("handled by as_integer above"),
            AttributeValue::Double(d) => d.to_bits().hash(state),
            AttributeValue::VoidPtr(p) => p.hash(state),
            AttributeValue::CStr(s) => s.hash(state),
            AttributeValue::OwnedString(s) => s.hash(state),
            AttributeValue::ByteArray(b) => b.hash(state),
            AttributeValue::DestrObj(o) => Arc::as_ptr(o).cast::<()>().hash(state),
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_string())
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::OwnedString(Arc::new(s.to_string()))
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Int64(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_kind_equality() {
        let a = AttributeValue::from("alpha");
        let b = AttributeValue::from("alpha");
        assert_eq!(a, b);
        assert_ne!(a, AttributeValue::from("beta"));
    }

    #[test]
    fn empty_equals_only_empty() {
        assert_eq!(AttributeValue::Empty, AttributeValue::Empty);
        assert_ne!(AttributeValue::Empty, AttributeValue::Int32(0));
    }

    #[test]
    fn cross_kind_numeric_coercion() {
        let a = AttributeValue::Int32(5);
        let b = AttributeValue::Int64(5);
        assert_eq!(a.cmp_cross_kind(&b), Ordering::Equal);
    }

    #[test]
    fn cross_kind_equal_values_hash_equal() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let a = AttributeValue::Int32(5);
        let b = AttributeValue::Int64(5);
        assert_eq!(a, b);

        let hash_of = |v: &AttributeValue| {
            let mut h = DefaultHasher::new();
            v.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash_of(&a), hash_of(&b));

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn owned_string_clone_shares_allocation() {
        let a = AttributeValue::from("shared");
        let b = a.clone();
        if let (AttributeValue::OwnedString(x), AttributeValue::OwnedString(y)) = (&a, &b) {
            assert!(Arc::ptr_eq(x, y));
        } else {
            panic!("expected OwnedString");
        }
    }

    #[test]
    fn canonical_string_form() {
        assert_eq!(AttributeValue::Int32(42).canonical_string(), "42");
        assert_eq!(AttributeValue::Empty.canonical_string(), "");
    }

    #[test]
    fn total_order_is_consistent() {
        let mut values = vec![
            AttributeValue::Int32(3),
            AttributeValue::Int32(1),
            AttributeValue::Int32(2),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                AttributeValue::Int32(1),
                AttributeValue::Int32(2),
                AttributeValue::Int32(3)
            ]
        );
    }
}
