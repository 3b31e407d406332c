//! Shared score-ranking helpers.

use pythia_core::{IndexSet, PythiaError, PythiaResult};

/// Pick the `batch_size` best-scored members of `unlabeled`.
///
/// `scores` is one-to-one with `unlabeled.as_slice()`; `maximal` decides
/// whether "best" means largest (top-k) or smallest (bottom-k).
pub fn select_by_scores(
    unlabeled: &IndexSet,
    scores: &[f64],
    batch_size: usize,
    maximal: bool,
) -> PythiaResult<IndexSet> {
    if batch_size == 0 {
        return Err(PythiaError::InvalidBatchSize { batch_size });
    }
    if scores.len() != unlabeled.len() {
        return Err(PythiaError::ShapeMismatch {
            expected: format!("{} scores", unlabeled.len()),
            actual: format!("{} scores", scores.len()),
        });
    }
    if unlabeled.len() <= batch_size {
        return Ok(unlabeled.clone());
    }
    let mut ranked: Vec<(usize, f64)> = unlabeled.iter().zip(scores.iter().copied()).collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    let chosen = if maximal {
        &ranked[ranked.len() - batch_size..]
    } else {
        &ranked[..batch_size]
    };
    Ok(chosen.iter().map(|&(idx, _)| idx).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_largest_when_maximal() {
        let unlabeled = IndexSet::from_indices([10, 11, 12, 13]);
        let scores = [0.1, 0.9, 0.2, 0.8];
        let chosen = select_by_scores(&unlabeled, &scores, 2, true).unwrap();
        assert_eq!(chosen.as_slice(), &[11, 13]);
    }

    #[test]
    fn picks_smallest_when_minimal() {
        let unlabeled = IndexSet::from_indices([10, 11, 12, 13]);
        let scores = [0.1, 0.9, 0.2, 0.8];
        let chosen = select_by_scores(&unlabeled, &scores, 2, false).unwrap();
        assert_eq!(chosen.as_slice(), &[10, 12]);
    }

    #[test]
    fn small_pool_returned_whole() {
        let unlabeled = IndexSet::from_indices([10, 11]);
        let chosen = select_by_scores(&unlabeled, &[0.5, 0.5], 5, true).unwrap();
        assert_eq!(chosen, unlabeled);
    }

    #[test]
    fn zero_batch_size_is_fatal() {
        let unlabeled = IndexSet::from_indices([10]);
        assert!(select_by_scores(&unlabeled, &[0.5], 0, true).is_err());
    }
}
