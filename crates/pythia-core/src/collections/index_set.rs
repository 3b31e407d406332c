use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{PythiaError, PythiaResult};

/// A uniqueness-enforcing set of sample indices.
///
/// Backed by a sorted `Vec<usize>`: membership is a binary search,
/// iteration is ascending, and ownership of an index moves (not copies)
/// on `update` / `difference_update`.
///
/// Duplicate `add`s and discards of absent elements are no-ops that are
/// reported through the return value and a `tracing::warn!`, so a caller
/// can detect redundant queries without aborting the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<usize>", into = "Vec<usize>")]
pub struct IndexSet {
    indices: Vec<usize>,
}

impl IndexSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any iterable of indices, deduplicating.
    ///
    /// Warns with the duplicate count when the input repeats elements.
    pub fn from_indices<I: IntoIterator<Item = usize>>(data: I) -> Self {
        let raw: Vec<usize> = data.into_iter().collect();
        let given = raw.len();
        let mut indices = raw;
        indices.sort_unstable();
        indices.dedup();
        if indices.len() != given {
            warn!(
                duplicates = given - indices.len(),
                "duplicate elements in the given data, deduplicated"
            );
        }
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, value: usize) -> bool {
        self.indices.binary_search(&value).is_ok()
    }

    /// Indices in ascending order.
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Insert `value`. Returns `false` (and warns) when already present.
    pub fn add(&mut self, value: usize) -> bool {
        match self.indices.binary_search(&value) {
            Ok(_) => {
                warn!(value, "element is already in the collection, skip");
                false
            }
            Err(pos) => {
                self.indices.insert(pos, value);
                true
            }
        }
    }

    /// Remove `value`. Returns `false` (and warns) when absent.
    pub fn discard(&mut self, value: usize) -> bool {
        match self.indices.binary_search(&value) {
            Ok(pos) => {
                self.indices.remove(pos);
                true
            }
            Err(_) => {
                warn!(value, "element to discard is not in the collection, skip");
                false
            }
        }
    }

    /// Bulk `add`. Returns how many elements were actually inserted.
    pub fn update<I: IntoIterator<Item = usize>>(&mut self, other: I) -> usize {
        other.into_iter().filter(|&v| self.add(v)).count()
    }

    /// Bulk `discard`. Returns how many elements were actually removed.
    pub fn difference_update<I: IntoIterator<Item = usize>>(&mut self, other: I) -> usize {
        other.into_iter().filter(|&v| self.discard(v)).count()
    }

    /// Remove and return the largest index, if any.
    pub fn pop(&mut self) -> Option<usize> {
        self.indices.pop()
    }

    /// A subset of `round(rate * len)` indices drawn without replacement.
    ///
    /// `rate` must be strictly between 0 and 1.
    pub fn random_sampling<R: Rng + ?Sized>(&self, rate: f64, rng: &mut R) -> PythiaResult<IndexSet> {
        if !(rate > 0.0 && rate < 1.0) {
            return Err(PythiaError::InvalidSamplingRate { rate });
        }
        let amount = (rate * self.len() as f64).round() as usize;
        let picked = rand::seq::index::sample(rng, self.len(), amount);
        Ok(IndexSet::from_indices(
            picked.iter().map(|i| self.indices[i]),
        ))
    }
}

impl From<Vec<usize>> for IndexSet {
    fn from(data: Vec<usize>) -> Self {
        Self::from_indices(data)
    }
}

impl From<IndexSet> for Vec<usize> {
    fn from(set: IndexSet) -> Self {
        set.indices
    }
}

impl FromIterator<usize> for IndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_indices(iter)
    }
}

impl<'a> IntoIterator for &'a IndexSet {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn construction_deduplicates() {
        let set = IndexSet::from_indices([3, 1, 2, 3, 1]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn duplicate_add_is_reported_not_fatal() {
        let mut set = IndexSet::from_indices([1, 2]);
        assert!(!set.add(1));
        assert!(set.add(5));
        assert_eq!(set.as_slice(), &[1, 2, 5]);
    }

    #[test]
    fn discard_of_absent_element_is_reported() {
        let mut set = IndexSet::from_indices([1, 2]);
        assert!(!set.discard(7));
        assert!(set.discard(2));
        assert_eq!(set.as_slice(), &[1]);
    }

    #[test]
    fn update_then_difference_update_restores_original() {
        let original = IndexSet::from_indices([0, 1, 2]);
        let mut set = original.clone();
        set.update([10, 11]);
        set.difference_update([10, 11]);
        assert_eq!(set, original);
    }

    #[test]
    fn random_sampling_rejects_degenerate_rates() {
        let set = IndexSet::from_indices(0..10);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(set.random_sampling(0.0, &mut rng).is_err());
        assert!(set.random_sampling(1.0, &mut rng).is_err());
        assert!(set.random_sampling(-0.2, &mut rng).is_err());
    }

    #[test]
    fn random_sampling_draws_without_replacement() {
        let set = IndexSet::from_indices(0..10);
        let mut rng = StdRng::seed_from_u64(7);
        let sampled = set.random_sampling(0.3, &mut rng).unwrap();
        assert_eq!(sampled.len(), 3);
        for v in sampled.iter() {
            assert!(set.contains(v));
        }
    }
}
