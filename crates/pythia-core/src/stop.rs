//! Pluggable termination policies for the active-learning loop.
//!
//! A closed set of variants, each owning an accumulated counter next to its
//! construction-time threshold so `reset()` can restore the initial state.
//! Policies are consulted once per iteration boundary — `TimeLimit` is
//! coarse-grained, never preemptive.

use std::time::Instant;

use crate::errors::{PythiaError, PythiaResult};
use crate::ledger::Ledger;

/// When to stop querying.
#[derive(Debug, Clone)]
pub enum StopPolicy {
    /// Stop after `threshold` recorded iterations.
    MaxIteration { threshold: usize, current: usize },
    /// Stop when the cumulative query cost reaches `threshold`.
    CostLimit { threshold: f64, accumulated: f64 },
    /// Stop when `threshold` percent of the initial unlabeled pool has been
    /// consumed. `threshold = 100` is the pool-exhausted specialization.
    PercentOfUnlabel { threshold: f64, consumed: f64 },
    /// Stop after `threshold_secs` seconds of wall-clock time.
    TimeLimit { threshold_secs: f64, started: Instant },
}

impl StopPolicy {
    pub fn max_iteration(threshold: usize) -> Self {
        StopPolicy::MaxIteration {
            threshold,
            current: 0,
        }
    }

    pub fn cost_limit(threshold: f64) -> Self {
        StopPolicy::CostLimit {
            threshold,
            accumulated: 0.0,
        }
    }

    /// `threshold` is a percentage and must lie in `[0, 100]`.
    pub fn percent_of_unlabel(threshold: f64) -> PythiaResult<Self> {
        if !(0.0..=100.0).contains(&threshold) {
            return Err(PythiaError::ThresholdOutOfRange {
                value: threshold,
                min: 0.0,
                max: 100.0,
            });
        }
        Ok(StopPolicy::PercentOfUnlabel {
            threshold,
            consumed: 0.0,
        })
    }

    /// Stop only when the unlabeled pool is exhausted.
    pub fn unlabel_set_empty() -> Self {
        StopPolicy::PercentOfUnlabel {
            threshold: 100.0,
            consumed: 0.0,
        }
    }

    /// The clock starts at construction.
    pub fn time_limit(threshold_secs: f64) -> Self {
        StopPolicy::TimeLimit {
            threshold_secs,
            started: Instant::now(),
        }
    }

    /// Should the loop terminate now?
    pub fn is_stop(&self) -> bool {
        match self {
            StopPolicy::MaxIteration { threshold, current } => current >= threshold,
            StopPolicy::CostLimit {
                threshold,
                accumulated,
            } => accumulated >= threshold,
            StopPolicy::PercentOfUnlabel {
                threshold,
                consumed,
            } => consumed >= threshold,
            StopPolicy::TimeLimit {
                threshold_secs,
                started,
            } => started.elapsed().as_secs_f64() >= *threshold_secs,
        }
    }

    /// Refresh the accumulated counter from the ledger.
    ///
    /// `TimeLimit` is a no-op: time advances independently of the ledger.
    pub fn update_information(&mut self, ledger: &Ledger) -> PythiaResult<()> {
        match self {
            StopPolicy::MaxIteration { current, .. } => {
                *current = ledger.query_count();
            }
            StopPolicy::CostLimit { accumulated, .. } => {
                *accumulated = ledger.total_cost();
            }
            StopPolicy::PercentOfUnlabel { consumed, .. } => {
                let initial = ledger.workspace(Some(0))?.unlabeled.len();
                let current = ledger.workspace(None)?.unlabeled.len();
                *consumed = if initial == 0 {
                    100.0
                } else {
                    100.0 * (initial - current) as f64 / initial as f64
                };
            }
            StopPolicy::TimeLimit { .. } => {}
        }
        Ok(())
    }

    /// Restore the accumulated counter to its construction-time value
    /// without changing the threshold.
    pub fn reset(&mut self) {
        match self {
            StopPolicy::MaxIteration { current, .. } => *current = 0,
            StopPolicy::CostLimit { accumulated, .. } => *accumulated = 0.0,
            StopPolicy::PercentOfUnlabel { consumed, .. } => *consumed = 0.0,
            StopPolicy::TimeLimit { started, .. } => *started = Instant::now(),
        }
    }
}
