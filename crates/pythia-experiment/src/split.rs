//! Data-split helpers producing per-fold index partitions.

use ndarray::ArrayView1;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use pythia_core::{ExperimentConfig, IndexSet, PythiaError, PythiaResult};

/// Retries when the initial labeled set must cover every class.
const MAX_SPLIT_ATTEMPTS: usize = 100;

/// One fold's train/test partition plus the initial labeled/unlabeled split
/// of the training pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldSplit {
    pub train_idx: IndexSet,
    pub test_idx: IndexSet,
    pub labeled: IndexSet,
    pub unlabeled: IndexSet,
}

fn distinct_classes(y: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut classes: Vec<f64> = y.to_vec();
    classes.sort_by(f64::total_cmp);
    classes.dedup();
    classes
}

fn covers_all_classes(y: ArrayView1<'_, f64>, labeled: &[usize], classes: &[f64]) -> bool {
    classes
        .iter()
        .all(|&c| labeled.iter().any(|&i| y[i] == c))
}

/// Produce `config.fold_count` independent splits of `y.len()` samples.
///
/// Each fold holds out `test_ratio` of the samples and labels
/// `initial_label_rate` of the remaining training pool (at least one
/// sample). With `require_all_classes` the labeled prefix is reshuffled
/// until it contains every class of `y`, up to a bounded number of
/// attempts.
pub fn split<R: Rng + ?Sized>(
    y: ArrayView1<'_, f64>,
    config: &ExperimentConfig,
    rng: &mut R,
) -> PythiaResult<Vec<FoldSplit>> {
    if !(config.test_ratio > 0.0 && config.test_ratio < 1.0) {
        return Err(PythiaError::InvalidSamplingRate {
            rate: config.test_ratio,
        });
    }
    if !(config.initial_label_rate > 0.0 && config.initial_label_rate < 1.0) {
        return Err(PythiaError::InvalidSamplingRate {
            rate: config.initial_label_rate,
        });
    }
    let n = y.len();
    let train_size = ((1.0 - config.test_ratio) * n as f64).round() as usize;
    let labeled_size = ((config.initial_label_rate * train_size as f64).round() as usize).max(1);
    // A pool so small the rounded train split can not hold even the
    // one mandatory labeled sample is a caller error, not a panic.
    if labeled_size > train_size {
        return Err(PythiaError::PartitionMismatch {
            labeled: labeled_size,
            unlabeled: train_size.saturating_sub(labeled_size),
            expected: train_size,
        });
    }
    let classes = distinct_classes(y);
    let mut folds = Vec::with_capacity(config.fold_count);
    for fold in 0..config.fold_count {
        let mut perm: Vec<usize> = (0..n).collect();
        let mut attempts = 0;
        let (train, test) = loop {
            perm.shuffle(rng);
            attempts += 1;
            let (train, test) = perm.split_at(train_size);
            if !config.require_all_classes
                || covers_all_classes(y, &train[..labeled_size], &classes)
            {
                break (train.to_vec(), test.to_vec());
            }
            if attempts >= MAX_SPLIT_ATTEMPTS {
                return Err(PythiaError::SplitInfeasible { attempts });
            }
        };
        debug!(fold, train = train.len(), test = test.len(), labeled = labeled_size, "fold split");
        folds.push(FoldSplit {
            train_idx: IndexSet::from_indices(train.iter().copied()),
            test_idx: IndexSet::from_indices(test.iter().copied()),
            labeled: IndexSet::from_indices(train[..labeled_size].iter().copied()),
            unlabeled: IndexSet::from_indices(train[labeled_size..].iter().copied()),
        });
    }
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn two_class_labels(n: usize) -> Array1<f64> {
        Array1::from_iter((0..n).map(|i| (i % 2) as f64))
    }

    #[test]
    fn fold_partitions_the_sample_range() {
        let y = two_class_labels(100);
        let config = ExperimentConfig {
            test_ratio: 0.3,
            initial_label_rate: 0.1,
            fold_count: 3,
            ..ExperimentConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        let folds = split(y.view(), &config, &mut rng).unwrap();
        assert_eq!(folds.len(), 3);
        for fold in &folds {
            assert_eq!(fold.train_idx.len(), 70);
            assert_eq!(fold.test_idx.len(), 30);
            assert_eq!(fold.labeled.len(), 7);
            assert_eq!(fold.unlabeled.len(), 63);
            let mut all: Vec<usize> = fold.train_idx.iter().chain(fold.test_idx.iter()).collect();
            all.sort_unstable();
            assert_eq!(all, (0..100).collect::<Vec<_>>());
            for idx in &fold.labeled {
                assert!(fold.train_idx.contains(idx));
                assert!(!fold.unlabeled.contains(idx));
            }
        }
    }

    #[test]
    fn labeled_set_covers_every_class_when_required() {
        let y = two_class_labels(40);
        let config = ExperimentConfig {
            test_ratio: 0.25,
            initial_label_rate: 0.1,
            fold_count: 5,
            require_all_classes: true,
            ..ExperimentConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        for fold in split(y.view(), &config, &mut rng).unwrap() {
            let labeled: Vec<usize> = fold.labeled.iter().collect();
            assert!(labeled.iter().any(|&i| y[i] == 0.0));
            assert!(labeled.iter().any(|&i| y[i] == 1.0));
        }
    }

    #[test]
    fn tiny_pool_with_large_test_ratio_is_an_error_not_a_panic() {
        // rounds to an empty train split, which can not hold the one
        // mandatory labeled sample
        let y = two_class_labels(3);
        let config = ExperimentConfig {
            test_ratio: 0.9,
            initial_label_rate: 0.5,
            ..ExperimentConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let err = split(y.view(), &config, &mut rng).unwrap_err();
        assert!(matches!(err, PythiaError::PartitionMismatch { .. }));
    }

    #[test]
    fn invalid_ratios_are_rejected() {
        let y = two_class_labels(10);
        let mut rng = StdRng::seed_from_u64(0);
        let bad_test = ExperimentConfig {
            test_ratio: 1.0,
            ..ExperimentConfig::default()
        };
        assert!(split(y.view(), &bad_test, &mut rng).is_err());
        let bad_rate = ExperimentConfig {
            initial_label_rate: 0.0,
            ..ExperimentConfig::default()
        };
        assert!(split(y.view(), &bad_rate, &mut rng).is_err());
    }
}
