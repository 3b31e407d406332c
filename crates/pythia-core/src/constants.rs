//! Workspace-wide defaults.

/// Samples requested from the query strategy per iteration.
pub const DEFAULT_BATCH_SIZE: usize = 1;

/// How many recorded iterations trigger one progress line.
pub const DEFAULT_PRINT_INTERVAL: usize = 1;

/// Fraction of the pool held out for testing.
pub const DEFAULT_TEST_RATIO: f64 = 0.3;

/// Fraction of the training pool labeled before the first query.
pub const DEFAULT_INITIAL_LABEL_RATE: f64 = 0.05;

/// Folds produced by the split helper when none are requested.
pub const DEFAULT_FOLD_COUNT: usize = 1;
