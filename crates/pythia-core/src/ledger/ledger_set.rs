use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::{PythiaError, PythiaResult};
use crate::ledger::entry::LedgerEntry;
use crate::ledger::state::Ledger;

/// A projectable field of a [`LedgerEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryField {
    Selected,
    Performance,
    QueriedLabels,
    Cost,
}

/// Read-only collection of completed ledgers, one per fold of an
/// experiment, projecting entry fields into matrices for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSet {
    method_name: String,
    folds: Vec<Ledger>,
}

impl LedgerSet {
    pub fn new(method_name: impl Into<String>, folds: Vec<Ledger>) -> Self {
        Self {
            method_name: method_name.into(),
            folds,
        }
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn len(&self) -> usize {
        self.folds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folds.is_empty()
    }

    pub fn fold(&self, index: usize) -> PythiaResult<&Ledger> {
        self.folds.get(index).ok_or(PythiaError::OutOfBounds {
            index,
            len: self.folds.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ledger> {
        self.folds.iter()
    }

    /// Project `fields` out of every entry of every fold.
    ///
    /// One row per fold. With exactly one field, a fold's row is prefixed
    /// with its initial point when present; with several fields, each cell
    /// is an array of the values in field order.
    pub fn extract_matrix(&self, fields: &[EntryField]) -> PythiaResult<Vec<Vec<Value>>> {
        if fields.is_empty() {
            return Err(PythiaError::MissingField { field: "(none requested)" });
        }
        let mut matrix = Vec::with_capacity(self.folds.len());
        for ledger in &self.folds {
            let mut row = Vec::with_capacity(ledger.len() + 1);
            if let [field] = fields {
                if let Some(initial) = ledger.initial_point() {
                    row.push(json!(initial));
                }
                for entry in ledger.iter() {
                    row.push(Self::project(entry, *field)?);
                }
            } else {
                for entry in ledger.iter() {
                    let cell: Vec<Value> = fields
                        .iter()
                        .map(|f| Self::project(entry, *f))
                        .collect::<PythiaResult<_>>()?;
                    row.push(Value::Array(cell));
                }
            }
            matrix.push(row);
        }
        Ok(matrix)
    }

    fn project(entry: &LedgerEntry, field: EntryField) -> PythiaResult<Value> {
        match field {
            EntryField::Selected => Ok(json!(entry.selected().as_slice())),
            EntryField::Performance => Ok(json!(entry.metrics())),
            EntryField::QueriedLabels => entry
                .queried_labels()
                .map(|l| json!(l))
                .ok_or(PythiaError::MissingField {
                    field: "queried_labels",
                }),
            EntryField::Cost => entry
                .cost()
                .map(|c| json!(c))
                .ok_or(PythiaError::MissingField { field: "cost" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::IndexSet;
    use crate::ledger::entry::MetricValue;

    fn fold(initial: Option<f64>, accs: &[f64]) -> Ledger {
        let mut ledger = Ledger::new(
            0,
            IndexSet::from_indices(0..10),
            IndexSet::from_indices(10..12),
            IndexSet::from_indices(0..2),
            IndexSet::from_indices(2..10),
            vec!["accuracy".to_string()],
        )
        .unwrap()
        .with_verbosity(false, 1);
        if let Some(p) = initial {
            ledger
                .set_initial_point(vec![MetricValue::scalar("accuracy", p)])
                .unwrap();
        }
        for (i, &acc) in accs.iter().enumerate() {
            let entry = LedgerEntry::new(
                IndexSet::from_indices([2 + i]),
                ledger.metric_names(),
                vec![MetricValue::scalar("accuracy", acc)],
                Some(vec![1.0]),
                Some(1.0),
            )
            .unwrap();
            ledger.add_entry(entry).unwrap();
        }
        ledger
    }

    #[test]
    fn single_field_prefixes_initial_point() {
        let set = LedgerSet::new("uncertainty", vec![fold(Some(0.5), &[0.6, 0.7])]);
        let matrix = set.extract_matrix(&[EntryField::Performance]).unwrap();
        assert_eq!(matrix.len(), 1);
        // initial point + 2 entries
        assert_eq!(matrix[0].len(), 3);
    }

    #[test]
    fn no_initial_point_no_prefix() {
        let set = LedgerSet::new("uncertainty", vec![fold(None, &[0.6])]);
        let matrix = set.extract_matrix(&[EntryField::Cost]).unwrap();
        assert_eq!(matrix[0], vec![json!(1.0)]);
    }

    #[test]
    fn multi_field_cells_are_tuples_without_prefix() {
        let set = LedgerSet::new("uncertainty", vec![fold(Some(0.5), &[0.6])]);
        let matrix = set
            .extract_matrix(&[EntryField::Selected, EntryField::Cost])
            .unwrap();
        assert_eq!(matrix[0].len(), 1);
        assert_eq!(matrix[0][0], json!([[2], 1.0]));
    }
}
