//! Parikh vector and matrix (component K): integer vectors indexed by
//! activity, with the arithmetic the region synthesizer needs to test for
//! linear dependence among candidate regions.

/// A resizable vector of integer activity counts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParikhVector {
    values: Vec<i64>,
}

impl ParikhVector {
    pub fn new() -> Self {
        ParikhVector { values: Vec::new() }
    }

    pub fn from_values(values: Vec<i64>) -> Self {
        ParikhVector { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> i64 {
        self.values.get(index).copied().unwrap_or(0)
    }

    pub fn add(&mut self, index: usize, delta: i64) {
        self.resize(index + 1);
        self.values[index] += delta;
    }

    /// Grows the vector to at least `len` entries, zero-filled. Never shrinks.
    pub fn resize(&mut self, len: usize) {
        if self.values.len() < len {
            self.values.resize(len, 0);
        }
    }

    /// Resizes to exactly `len`, truncating if necessary. Use sparingly: most
    /// callers want the grow-only [`resize`](Self::resize).
    pub fn force_resize(&mut self, len: usize) {
        self.values.resize(len, 0);
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }

    /// Subtracts a multiple of `other` from `self` such that position `k`
    /// becomes zero, then divides the result by its row gcd.
    pub fn substract_suffix(&mut self, k: usize, other: &ParikhVector) {
        let width = self.len().max(other.len());
        self.resize(width);
        let mut other = other.clone();
        other.resize(width);

        let pivot = other.get(k);
        if pivot == 0 {
            return;
        }
        let self_k = self.get(k);
        if self_k % pivot != 0 {
            // No integer multiple zeroes position k exactly; scale both sides
            // so the elimination stays exact, matching whole-vector arithmetic.
            for i in 0..width {
                self.values[i] = self.values[i] * pivot - other.get(i) * self_k;
            }
        } else {
            let multiple = self_k / pivot;
            for i in 0..width {
                self.values[i] -= multiple * other.get(i);
            }
        }
        self.reduce();
    }

    /// Divides every entry by the gcd of all entries, leaving the vector
    /// unchanged if it is all zero or already reduced.
    fn reduce(&mut self) {
        let g = self
            .values
            .iter()
            .fold(0i64, |acc, &v| gcd(acc, v.unsigned_abs() as i64));
        if g > 1 {
            for v in &mut self.values {
                *v /= g;
            }
        }
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// The scalar (dot) product of two Parikh vectors, treating missing trailing
/// entries as zero.
pub fn scalar_product(a: &ParikhVector, b: &ParikhVector) -> i64 {
    let width = a.len().max(b.len());
    (0..width).map(|i| a.get(i) * b.get(i)).sum()
}

/// The pointwise difference `a - b`, treating missing trailing entries as
/// zero; the result has length `max(a.len(), b.len())`.
pub fn difference(a: &ParikhVector, b: &ParikhVector) -> ParikhVector {
    let width = a.len().max(b.len());
    ParikhVector::from_values((0..width).map(|i| a.get(i) - b.get(i)).collect())
}

/// A list of Parikh vectors maintained in row-echelon form over the integers,
/// supporting a membership test: does a candidate vector lie in the span of
/// the rows, modulo the elimination order used to build the matrix?
#[derive(Debug, Default)]
pub struct ParikhMatrix {
    rows: Vec<ParikhVector>,
}

impl ParikhMatrix {
    pub fn new() -> Self {
        ParikhMatrix { rows: Vec::new() }
    }

    pub fn rows(&self) -> &[ParikhVector] {
        &self.rows
    }

    /// Inserts `v` into the matrix, eliminating it against existing rows
    /// pivot-by-pivot; a row that reduces to zero carries no new information
    /// and is dropped rather than stored.
    pub fn insert(&mut self, mut v: ParikhVector) {
        for row in &self.rows {
            if let Some(pivot) = first_nonzero(row) {
                if v.get(pivot) != 0 {
                    v.substract_suffix(pivot, row);
                }
            }
        }
        if !v.is_zero() {
            self.rows.push(v);
        }
    }

    /// True if `v` reduces to the zero vector against the current rows, i.e.
    /// it lies in their span under this matrix's elimination order.
    pub fn contains(&self, v: &ParikhVector) -> bool {
        let mut candidate = v.clone();
        for row in &self.rows {
            if let Some(pivot) = first_nonzero(row) {
                if candidate.get(pivot) != 0 {
                    candidate.substract_suffix(pivot, row);
                }
            }
        }
        candidate.is_zero()
    }
}

fn first_nonzero(v: &ParikhVector) -> Option<usize> {
    v.values().iter().position(|&x| x != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_only_grows() {
        let mut v = ParikhVector::from_values(vec![1, 2, 3]);
        v.resize(1);
        assert_eq!(v.len(), 3);
        v.resize(5);
        assert_eq!(v.len(), 5);
    }

    #[test]
    fn difference_plus_subtrahend_recovers_original() {
        let a = ParikhVector::from_values(vec![2, 1]);
        let b = ParikhVector::from_values(vec![1, 1]);
        let d = difference(&a, &b);
        let mut recovered = d.clone();
        for i in 0..b.len() {
            recovered.add(i, b.get(i));
        }
        assert_eq!(recovered, a);
    }

    #[test]
    fn scalar_product_is_symmetric() {
        let a = ParikhVector::from_values(vec![2, 3]);
        let b = ParikhVector::from_values(vec![4, 5]);
        assert_eq!(scalar_product(&a, &b), scalar_product(&b, &a));
    }

    #[test]
    fn substract_suffix_zeroes_pivot_position() {
        let mut a = ParikhVector::from_values(vec![2, 1, 0, 0]);
        let b = ParikhVector::from_values(vec![1, 1, 0, 0]);
        a.substract_suffix(0, &b);
        assert_eq!(a.get(0), 0);
    }

    #[test]
    fn matrix_detects_membership_in_span() {
        let mut m = ParikhMatrix::new();
        m.insert(ParikhVector::from_values(vec![1, 0]));
        m.insert(ParikhVector::from_values(vec![0, 1]));
        assert!(m.contains(&ParikhVector::from_values(vec![3, 4])));
    }

    #[test]
    fn matrix_rejects_vector_outside_span() {
        let mut m = ParikhMatrix::new();
        m.insert(ParikhVector::from_values(vec![1, 1, 0]));
        m.insert(ParikhVector::from_values(vec![0, 1, 1]));
        assert!(!m.contains(&ParikhVector::from_values(vec![1, 0, 0])));
    }
}
