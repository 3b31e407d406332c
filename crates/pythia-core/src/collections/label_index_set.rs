use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{PythiaError, PythiaResult};

/// A reference to labels of one example, in the multi-label setting.
///
/// Mirrors the three addressable shapes of a label query:
/// every label of an example, one specific label, or a subset of labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelRef {
    /// `(i,)` — all `label_size` labels of example `i`.
    All(usize),
    /// `(i, l)` — one label of example `i`.
    One(usize, usize),
    /// `(i, [l1, l2, ...])` — a subset of labels of example `i`.
    Many(usize, Vec<usize>),
}

/// Linearization order for 1-d index conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemOrder {
    /// C-style: `index = example * label_size + label`.
    RowMajor,
    /// Matlab-style: `index = example + label * instance_count`.
    ColMajor { instance_count: usize },
}

/// A set of `(example, label)` pairs with a fixed label-space size.
///
/// Every stored `label` satisfies `label < label_size`. Shorthand
/// [`LabelRef::All`] references expand to `label_size` individual pairs on
/// insertion, and [`LabelIndexSet::integrate`] collapses full coverage back
/// into the shorthand. Sorted-vec backed, like [`super::IndexSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelIndexSet {
    pairs: Vec<(usize, usize)>,
    label_size: usize,
}

impl LabelIndexSet {
    /// An empty set over a label space of `label_size` classes.
    pub fn with_label_size(label_size: usize) -> Self {
        Self {
            pairs: Vec::new(),
            label_size,
        }
    }

    /// Build from label references.
    ///
    /// When `label_size` is `None` it is inferred as the largest label id
    /// seen plus one; inference fails with [`PythiaError::LabelSizeUnknown`]
    /// if every reference is an example-only [`LabelRef::All`].
    pub fn from_refs<I>(refs: I, label_size: Option<usize>) -> PythiaResult<Self>
    where
        I: IntoIterator<Item = LabelRef>,
    {
        let refs: Vec<LabelRef> = refs.into_iter().collect();
        let label_size = match label_size {
            Some(size) => size,
            None => Self::infer_label_size(&refs)?,
        };
        let mut set = Self::with_label_size(label_size);
        for r in refs {
            set.add(r)?;
        }
        Ok(set)
    }

    /// Largest label id seen plus one; errors when no reference carries one.
    pub fn infer_label_size(refs: &[LabelRef]) -> PythiaResult<usize> {
        refs.iter()
            .filter_map(|r| match r {
                LabelRef::All(_) => None,
                LabelRef::One(_, l) => Some(*l),
                LabelRef::Many(_, ls) => ls.iter().max().copied(),
            })
            .max()
            .map(|l| l + 1)
            .ok_or(PythiaError::LabelSizeUnknown)
    }

    /// Decompose references into individual `(example, label)` pairs,
    /// validating every label id against `label_size`.
    pub fn flatten(refs: &[LabelRef], label_size: usize) -> PythiaResult<Vec<(usize, usize)>> {
        let mut pairs = Vec::new();
        for r in refs {
            match r {
                LabelRef::All(i) => pairs.extend((0..label_size).map(|l| (*i, l))),
                LabelRef::One(i, l) => {
                    Self::check_label(*l, label_size)?;
                    pairs.push((*i, *l));
                }
                LabelRef::Many(i, ls) => {
                    for &l in ls {
                        Self::check_label(l, label_size)?;
                        pairs.push((*i, l));
                    }
                }
            }
        }
        Ok(pairs)
    }

    /// Group the stored pairs by example and collapse where possible:
    /// full `[0, label_size)` coverage becomes [`LabelRef::All`], a single
    /// label [`LabelRef::One`], anything else [`LabelRef::Many`].
    ///
    /// `flatten(integrate(pairs)) == pairs` for any stored pair set.
    pub fn integrate(&self) -> Vec<LabelRef> {
        let mut refs = Vec::new();
        let mut i = 0;
        while i < self.pairs.len() {
            let example = self.pairs[i].0;
            let mut labels = Vec::new();
            while i < self.pairs.len() && self.pairs[i].0 == example {
                labels.push(self.pairs[i].1);
                i += 1;
            }
            if labels.len() == self.label_size {
                refs.push(LabelRef::All(example));
            } else if labels.len() == 1 {
                refs.push(LabelRef::One(example, labels[0]));
            } else {
                refs.push(LabelRef::Many(example, labels));
            }
        }
        refs
    }

    pub fn label_size(&self) -> usize {
        self.label_size
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains(&self, example: usize, label: usize) -> bool {
        self.pairs.binary_search(&(example, label)).is_ok()
    }

    /// Pairs in ascending `(example, label)` order.
    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().copied()
    }

    /// Insert the pairs referenced by `value`.
    ///
    /// Returns how many pairs were actually inserted; duplicates warn and
    /// are skipped. Out-of-range label ids are fatal.
    pub fn add(&mut self, value: LabelRef) -> PythiaResult<usize> {
        let pairs = Self::flatten(std::slice::from_ref(&value), self.label_size)?;
        Ok(pairs.into_iter().filter(|&p| self.insert_pair(p)).count())
    }

    /// Remove the pairs referenced by `value`.
    ///
    /// Returns how many pairs were actually removed; absent pairs warn and
    /// are skipped. Out-of-range label ids are fatal.
    pub fn discard(&mut self, value: LabelRef) -> PythiaResult<usize> {
        let pairs = Self::flatten(std::slice::from_ref(&value), self.label_size)?;
        Ok(pairs.into_iter().filter(|&p| self.remove_pair(p)).count())
    }

    /// Bulk [`Self::add`].
    pub fn update<I: IntoIterator<Item = LabelRef>>(&mut self, other: I) -> PythiaResult<usize> {
        let mut inserted = 0;
        for r in other {
            inserted += self.add(r)?;
        }
        Ok(inserted)
    }

    /// Bulk [`Self::discard`].
    pub fn difference_update<I: IntoIterator<Item = LabelRef>>(
        &mut self,
        other: I,
    ) -> PythiaResult<usize> {
        let mut removed = 0;
        for r in other {
            removed += self.discard(r)?;
        }
        Ok(removed)
    }

    /// Boolean mask over `shape = (n_samples, n_classes)` with stored pairs
    /// set to `true`.
    pub fn matrix_mask(&self, shape: (usize, usize)) -> PythiaResult<Array2<bool>> {
        self.check_shape(shape)?;
        let mut mask = Array2::from_elem(shape, false);
        for &(i, l) in &self.pairs {
            mask[(i, l)] = true;
        }
        Ok(mask)
    }

    /// Dense mask with `fill` at stored pairs and `0.0` elsewhere.
    pub fn matrix_mask_filled(&self, shape: (usize, usize), fill: f64) -> PythiaResult<Array2<f64>> {
        self.check_shape(shape)?;
        let mut mask = Array2::zeros(shape);
        for &(i, l) in &self.pairs {
            mask[(i, l)] = fill;
        }
        Ok(mask)
    }

    /// Linearized 1-d indices of the stored pairs.
    pub fn one_dim_indices(&self, order: MemOrder) -> Vec<usize> {
        self.pairs
            .iter()
            .map(|&(i, l)| match order {
                MemOrder::RowMajor => i * self.label_size + l,
                MemOrder::ColMajor { instance_count } => i + l * instance_count,
            })
            .collect()
    }

    /// Rebuild a set from linearized indices over `shape = (n_samples,
    /// n_classes)`.
    pub fn from_one_dim_indices(
        indices: &[usize],
        shape: (usize, usize),
        order: MemOrder,
    ) -> PythiaResult<Self> {
        let (rows, cols) = shape;
        let mut set = Self::with_label_size(cols);
        for &idx in indices {
            if idx >= rows * cols {
                return Err(PythiaError::OutOfBounds {
                    index: idx,
                    len: rows * cols,
                });
            }
            let (example, label) = match order {
                MemOrder::RowMajor => (idx / cols, idx % cols),
                MemOrder::ColMajor { .. } => (idx % rows, idx / rows),
            };
            set.insert_pair((example, label));
        }
        Ok(set)
    }

    /// Build from a boolean element mask; `label_size` is the column count.
    pub fn from_mask(mask: ArrayView2<'_, bool>) -> Self {
        let mut set = Self::with_label_size(mask.ncols());
        for ((i, l), &known) in mask.indexed_iter() {
            if known {
                set.insert_pair((i, l));
            }
        }
        set
    }

    /// Unique example ids referenced by any stored pair.
    pub fn instance_indices(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.pairs.iter().map(|&(i, _)| i).collect();
        ids.dedup();
        ids
    }

    /// Examples whose entire label row is present.
    pub fn complete_instances(&self) -> Vec<usize> {
        self.integrate()
            .into_iter()
            .filter_map(|r| match r {
                LabelRef::All(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Examples with at least one, but not all, labels present.
    pub fn partial_instances(&self) -> Vec<usize> {
        self.integrate()
            .into_iter()
            .filter_map(|r| match r {
                LabelRef::All(_) => None,
                LabelRef::One(i, _) | LabelRef::Many(i, _) => Some(i),
            })
            .collect()
    }

    fn check_label(label: usize, label_size: usize) -> PythiaResult<()> {
        if label >= label_size {
            return Err(PythiaError::LabelOutOfBounds { label, label_size });
        }
        Ok(())
    }

    fn check_shape(&self, shape: (usize, usize)) -> PythiaResult<()> {
        match self.pairs.last() {
            Some(&(i, _)) if i >= shape.0 => Err(PythiaError::ShapeMismatch {
                expected: format!("at least ({}, {})", i + 1, self.label_size),
                actual: format!("({}, {})", shape.0, shape.1),
            }),
            _ if shape.1 < self.label_size => Err(PythiaError::ShapeMismatch {
                expected: format!("(_, {})", self.label_size),
                actual: format!("({}, {})", shape.0, shape.1),
            }),
            _ => Ok(()),
        }
    }

    fn insert_pair(&mut self, pair: (usize, usize)) -> bool {
        match self.pairs.binary_search(&pair) {
            Ok(_) => {
                warn!(
                    example = pair.0,
                    label = pair.1,
                    "pair is already in the collection, skip"
                );
                false
            }
            Err(pos) => {
                self.pairs.insert(pos, pair);
                true
            }
        }
    }

    fn remove_pair(&mut self, pair: (usize, usize)) -> bool {
        match self.pairs.binary_search(&pair) {
            Ok(pos) => {
                self.pairs.remove(pos);
                true
            }
            Err(_) => {
                warn!(
                    example = pair.0,
                    label = pair.1,
                    "pair to discard is not in the collection, skip"
                );
                false
            }
        }
    }
}
