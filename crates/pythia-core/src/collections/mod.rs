//! Index containers for active learning.
//!
//! [`IndexSet`] partitions the sample pool (labeled vs unlabeled);
//! [`LabelIndexSet`] tracks `(example, label)` pairs in the multi-label
//! setting. Both enforce uniqueness and report — rather than fail on —
//! redundant mutations.

mod index_set;
mod label_index_set;

pub use index_set::IndexSet;
pub use label_index_set::{LabelIndexSet, LabelRef, MemOrder};
