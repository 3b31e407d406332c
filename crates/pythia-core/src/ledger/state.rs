use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collections::IndexSet;
use crate::constants;
use crate::errors::{PythiaError, PythiaResult};
use crate::ledger::entry::{LedgerEntry, MetricValue, PerfValue};

/// The label/unlabeled partition after some number of iterations,
/// reconstructed by replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub train_idx: IndexSet,
    pub test_idx: IndexSet,
    pub labeled: IndexSet,
    pub unlabeled: IndexSet,
}

/// Append-only history of one experimental round.
///
/// Owns immutable snapshots of the initial index partition, the declared
/// metric-name list, and the entry sequence. Cost and query-count
/// accumulators are maintained in O(1) on append. Historical workspaces are
/// reconstructed by replaying entries from the initial snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    round: usize,
    train_idx: IndexSet,
    test_idx: IndexSet,
    init_labeled: IndexSet,
    init_unlabeled: IndexSet,
    metric_names: Vec<String>,
    entries: Vec<LedgerEntry>,
    initial_point: Option<Vec<MetricValue>>,
    total_cost: f64,
    queried_count: usize,
    batch_size: usize,
    verbose: bool,
    print_interval: usize,
    created_at: DateTime<Utc>,
}

impl Ledger {
    /// Start a ledger for experimental round `round`.
    ///
    /// `metric_names` declares the shape every entry must match; it can not
    /// be empty.
    pub fn new(
        round: usize,
        train_idx: IndexSet,
        test_idx: IndexSet,
        init_labeled: IndexSet,
        init_unlabeled: IndexSet,
        metric_names: Vec<String>,
    ) -> PythiaResult<Self> {
        if metric_names.is_empty() {
            return Err(PythiaError::EmptyMetrics);
        }
        Ok(Self {
            round,
            train_idx,
            test_idx,
            init_labeled,
            init_unlabeled,
            metric_names,
            entries: Vec::new(),
            initial_point: None,
            total_cost: 0.0,
            queried_count: 0,
            batch_size: 0,
            verbose: true,
            print_interval: constants::DEFAULT_PRINT_INTERVAL,
            created_at: Utc::now(),
        })
    }

    /// Control the progress line emitted on append.
    pub fn with_verbosity(mut self, verbose: bool, print_interval: usize) -> Self {
        self.verbose = verbose;
        self.print_interval = print_interval.max(1);
        self
    }

    /// Record the performance measured before any querying.
    ///
    /// May be called at most once, and only before the first append.
    pub fn set_initial_point(&mut self, perf: Vec<MetricValue>) -> PythiaResult<()> {
        if self.initial_point.is_some() {
            return Err(PythiaError::InitialPointAlreadySet);
        }
        if !self.entries.is_empty() {
            return Err(PythiaError::InitialPointTooLate);
        }
        self.initial_point = Some(perf);
        Ok(())
    }

    pub fn initial_point(&self) -> Option<&[MetricValue]> {
        self.initial_point.as_deref()
    }

    /// Append an iteration record.
    ///
    /// Accumulators update in O(1) from the entry's own totals; when verbose,
    /// a one-line progress summary is emitted.
    pub fn add_entry(&mut self, entry: LedgerEntry) -> PythiaResult<()> {
        let actual: Vec<String> = entry.metrics().iter().map(|m| m.name.clone()).collect();
        if actual != self.metric_names {
            return Err(PythiaError::MetricMismatch {
                expected: self.metric_names.clone(),
                actual,
            });
        }
        self.total_cost += entry.cost().unwrap_or(0.0);
        self.queried_count += entry.selected().len();
        self.entries.push(entry);

        if self.verbose && self.len() % self.print_interval == 0 {
            info!(
                round = self.round,
                queries = self.len(),
                cost = self.total_cost,
                "{}",
                self.summary_line()
            );
        }
        Ok(())
    }

    /// Shared reference to the `index`-th entry.
    pub fn entry(&self, index: usize) -> PythiaResult<&LedgerEntry> {
        self.entries.get(index).ok_or(PythiaError::OutOfBounds {
            index,
            len: self.entries.len(),
        })
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of queries recorded so far.
    pub fn query_count(&self) -> usize {
        self.entries.len()
    }

    /// Total indices queried across all entries.
    pub fn queried_sample_count(&self) -> usize {
        self.queried_count
    }

    /// Cumulative cost across all entries.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn metric_names(&self) -> &[String] {
        &self.metric_names
    }

    pub fn init_labeled(&self) -> &IndexSet {
        &self.init_labeled
    }

    pub fn init_unlabeled(&self) -> &IndexSet {
        &self.init_unlabeled
    }

    pub fn train_idx(&self) -> &IndexSet {
        &self.train_idx
    }

    pub fn test_idx(&self) -> &IndexSet {
        &self.test_idx
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The common batch size confirmed by [`Self::check_batch_size`];
    /// `None` until a check has succeeded.
    pub fn batch_size(&self) -> Option<usize> {
        (self.batch_size > 0).then_some(self.batch_size)
    }

    /// True iff every entry except the last has the same batch size.
    ///
    /// Gates downstream aggregation over fold matrices; records the common
    /// batch size on success.
    pub fn check_batch_size(&mut self) -> bool {
        let head = match self.entries.split_last() {
            Some((_, head)) => head,
            None => return true,
        };
        let mut sizes = head.iter().map(|e| e.batch_size());
        match sizes.next() {
            None => true,
            Some(first) => {
                if sizes.all(|s| s == first) {
                    self.batch_size = first;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<LedgerEntry> {
        let entry = self.entries.pop();
        if let Some(e) = &entry {
            self.total_cost -= e.cost().unwrap_or(0.0);
            self.queried_count -= e.selected().len();
        }
        entry
    }

    /// Reconstruct the workspace after `iteration` queries by replaying
    /// entries `0..iteration` from the initial snapshots. Read-only.
    ///
    /// `None` means the current iteration.
    pub fn workspace(&self, iteration: Option<usize>) -> PythiaResult<Workspace> {
        let iteration = iteration.unwrap_or(self.entries.len());
        if iteration > self.entries.len() {
            return Err(PythiaError::IterationOutOfRange {
                iteration,
                len: self.entries.len(),
            });
        }
        let mut labeled = self.init_labeled.clone();
        let mut unlabeled = self.init_unlabeled.clone();
        for entry in &self.entries[..iteration] {
            unlabeled.difference_update(entry.selected());
            labeled.update(entry.selected());
        }
        Ok(Workspace {
            train_idx: self.train_idx.clone(),
            test_idx: self.test_idx.clone(),
            labeled,
            unlabeled,
        })
    }

    /// [`Self::workspace`], then truncate the ledger to the first
    /// `iteration` entries (destructive rewind).
    pub fn recover_workspace(&mut self, iteration: Option<usize>) -> PythiaResult<Workspace> {
        let workspace = self.workspace(iteration)?;
        let iteration = iteration.unwrap_or(self.entries.len());
        self.entries.truncate(iteration);
        self.refresh_accumulators();
        Ok(workspace)
    }

    /// Mean and population standard deviation of the `metric_index`-th
    /// declared metric across all entries.
    ///
    /// `(0, 0)` when the ledger is empty; `(NaN, NaN)` when any recorded
    /// value is vector-valued.
    pub fn current_performance(&self, metric_index: usize) -> (f64, f64) {
        if self.entries.is_empty() {
            return (0.0, 0.0);
        }
        let mut values = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            match entry.metrics().get(metric_index).map(|m| &m.value) {
                Some(PerfValue::Scalar(v)) => values.push(*v),
                _ => return (f64::NAN, f64::NAN),
            }
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    }

    /// One-line progress summary: initially-labeled share, query count,
    /// cumulative cost, and mean ± stdev per declared metric.
    pub fn summary_line(&self) -> String {
        let pool = self.init_labeled.len() + self.init_unlabeled.len();
        let labeled_pct = if pool == 0 {
            0.0
        } else {
            100.0 * self.init_labeled.len() as f64 / pool as f64
        };
        let mut line = format!(
            "round {} | initially labeled {} ({:.2}% of all) | queries {} | cost {}",
            self.round,
            self.init_labeled.len(),
            labeled_pct,
            self.entries.len(),
            self.total_cost,
        );
        for (i, name) in self.metric_names.iter().enumerate() {
            let (mean, std) = self.current_performance(i);
            line.push_str(&format!(" | {name}: {mean:.3} ± {std:.2}"));
        }
        line
    }

    fn refresh_accumulators(&mut self) {
        self.total_cost = self.entries.iter().filter_map(|e| e.cost()).sum();
        self.queried_count = self.entries.iter().map(|e| e.selected().len()).sum();
    }
}
