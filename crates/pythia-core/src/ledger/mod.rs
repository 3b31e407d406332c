//! Append-only record of an active-learning run.
//!
//! One [`LedgerEntry`] per iteration, one [`Ledger`] per experimental round
//! (fold), one [`LedgerSet`] per experiment. Past label/unlabeled states are
//! reconstructed by replaying the entry list — never cached — so a replay
//! always matches the ledger exactly, including after a truncating rewind.

mod entry;
mod ledger_set;
mod state;

pub use entry::{LedgerEntry, MetricValue, PerfValue};
pub use ledger_set::{EntryField, LedgerSet};
pub use state::{Ledger, Workspace};
