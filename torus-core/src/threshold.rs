//! Quorum sizes and threshold agreement.

use std::collections::HashMap;

use derive_getters::Getters;

/// The fault tolerance and reconstruction threshold of a network.
///
/// For `n` nodes, up to `t = floor(n/4)` may be faulty and `k = 2t + 1`
/// shares are needed to reconstruct a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Getters)]
pub struct Threshold {
    /// The number of nodes.
    n: usize,
    /// The number of tolerated faulty nodes.
    t: usize,
    /// The number of shares needed to reconstruct.
    k: usize,
}

impl Threshold {
    /// Computes the thresholds for a network of `n` nodes.
    pub fn new(n: usize) -> Self {
        let t = n / 4;
        Self { n, t, k: 2 * t + 1 }
    }

    /// The number of commitment acknowledgements needed before requesting shares.
    pub fn commitment_quorum(&self) -> usize {
        self.k + self.t
    }

    /// The number of matching answers needed for a lookup: a simple majority.
    pub fn lookup_quorum(&self) -> usize {
        self.n / 2 + 1
    }
}

/// Returns the first value reported by at least `threshold` of the responses.
///
/// Comparison is exact equality on the serialized value. Absent values never count.
pub fn threshold_same<T>(values: &[Option<T>], threshold: usize) -> Option<T>
where
    T: AsRef<str> + Clone,
{
    if threshold == 0 {
        return None;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        let count = counts.entry(value.as_ref()).or_insert(0);
        *count += 1;
        if *count == threshold {
            return Some(value.clone());
        }
    }
    None
}
