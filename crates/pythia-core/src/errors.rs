//! Central error type for the workspace.
//!
//! Duplicate adds and discards of absent elements are *not* errors: the
//! collections report them through their return values and a `tracing::warn!`
//! so a caller can detect redundant queries without aborting the run.

/// Result alias used across every pythia crate.
pub type PythiaResult<T> = Result<T, PythiaError>;

/// All fatal failures the orchestration core can raise.
#[derive(Debug, thiserror::Error)]
pub enum PythiaError {
    #[error("label index {label} is out of bound {label_size}")]
    LabelOutOfBounds { label: usize, label_size: usize },

    #[error("label size can not be inferred from example-only references, provide it explicitly")]
    LabelSizeUnknown,

    #[error("entry index {index} is out of bound {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("iteration {iteration} is out of bound {len}")]
    IterationOutOfRange { iteration: usize, len: usize },

    #[error("metric names {actual:?} do not match the declared metrics {expected:?}")]
    MetricMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("initial point has already been set")]
    InitialPointAlreadySet,

    #[error("initial point must be set before the first entry is appended")]
    InitialPointTooLate,

    #[error("sampling rate {rate} must be strictly between 0 and 1")]
    InvalidSamplingRate { rate: f64 },

    #[error("required component '{name}' can not be empty")]
    MissingComponent { name: &'static str },

    #[error("at least one performance metric is required")]
    EmptyMetrics,

    #[error("batch size must be greater than 0, received {batch_size}")]
    InvalidBatchSize { batch_size: usize },

    #[error("stop threshold {value} is outside the valid range [{min}, {max}]")]
    ThresholdOutOfRange { value: f64, min: f64, max: f64 },

    #[error("labeled ({labeled}) and unlabeled ({unlabeled}) sets must partition the {expected} training samples")]
    PartitionMismatch {
        labeled: usize,
        unlabeled: usize,
        expected: usize,
    },

    #[error("field '{field}' is not recorded in every ledger entry")]
    MissingField { field: &'static str },

    #[error("no initial labeled set covering every class was found after {attempts} attempts")]
    SplitInfeasible { attempts: usize },

    #[error("model '{model}' does not provide probabilistic predictions")]
    ProbaUnsupported { model: String },

    #[error("expected an array of shape {expected}, received {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("committee needs at least 2 members, received {size}")]
    CommitteeTooSmall { size: usize },

    #[error("model error: {reason}")]
    Model { reason: String },

    #[error("oracle error: {reason}")]
    Oracle { reason: String },
}
