//! Batch arguments and per-element results.

use crate::error::{WaterError, WaterResult};
use crate::property::Evaluated;
use rayon::prelude::*;

/// One batch argument: a scalar broadcast to every element, or one value per element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Samples<'a> {
    Scalar(f64),
    Slice(&'a [f64]),
}

impl Samples<'_> {
    /// `None` for a scalar, which takes the length of the other argument.
    pub fn len(&self) -> Option<usize> {
        match self {
            Samples::Scalar(_) => None,
            Samples::Slice(values) => Some(values.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    pub fn get(&self, index: usize) -> f64 {
        match self {
            Samples::Scalar(value) => *value,
            Samples::Slice(values) => values[index],
        }
    }
}

impl From<f64> for Samples<'_> {
    fn from(value: f64) -> Self {
        Samples::Scalar(value)
    }
}

impl<'a> From<&'a [f64]> for Samples<'a> {
    fn from(values: &'a [f64]) -> Self {
        Samples::Slice(values)
    }
}

impl<'a> From<&'a Vec<f64>> for Samples<'a> {
    fn from(values: &'a Vec<f64>) -> Self {
        Samples::Slice(values.as_slice())
    }
}

impl<'a, const N: usize> From<&'a [f64; N]> for Samples<'a> {
    fn from(values: &'a [f64; N]) -> Self {
        Samples::Slice(values.as_slice())
    }
}

/// Number of query points for an enthalpy/pressure pair, or `LengthMismatch`.
pub fn broadcast_len(enthalpies: &Samples<'_>, pressures: &Samples<'_>) -> WaterResult<usize> {
    match (enthalpies.len(), pressures.len()) {
        (None, None) => Ok(1),
        (Some(n), None) | (None, Some(n)) => Ok(n),
        (Some(n), Some(m)) if n == m => Ok(n),
        (Some(n), Some(m)) => Err(WaterError::LengthMismatch {
            enthalpies: n,
            pressures: m,
        }),
    }
}

/// Evaluate `f` for every index in `0..len`, in input order.
pub(crate) fn dispatch<T, F>(len: usize, parallel: bool, f: F) -> Vec<WaterResult<Evaluated<T>>>
where
    T: Send,
    F: Fn(usize) -> WaterResult<Evaluated<T>> + Sync + Send,
{
    if parallel {
        (0..len).into_par_iter().map(f).collect()
    } else {
        (0..len).map(f).collect()
    }
}

/// Results of a batch query, one entry per input point, in input order.
///
/// A failed entry does not affect its neighbours.
#[derive(Debug)]
pub struct Batch<T> {
    entries: Vec<WaterResult<Evaluated<T>>>,
}

impl<T> Batch<T> {
    pub(crate) fn new(entries: Vec<WaterResult<Evaluated<T>>>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WaterResult<Evaluated<T>>] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&WaterResult<Evaluated<T>>> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WaterResult<Evaluated<T>>> {
        self.entries.iter()
    }

    /// Successful values, `None` where the element failed.
    pub fn values(&self) -> impl Iterator<Item = Option<&T>> + '_ {
        self.entries
            .iter()
            .map(|entry| entry.as_ref().ok().map(|e| &e.value))
    }

    /// `(index, error)` of every failed element.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &WaterError)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.as_ref().err().map(|err| (i, err)))
    }

    pub fn clamped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Ok(e) if e.clamped))
            .count()
    }

    pub fn into_entries(self) -> Vec<WaterResult<Evaluated<T>>> {
        self.entries
    }

    /// All values with their clamp flags, or the first failure tagged with its index.
    pub fn into_evaluated(self) -> WaterResult<Vec<Evaluated<T>>> {
        self.entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.map_err(|source| WaterError::Element {
                    index,
                    source: Box::new(source),
                })
            })
            .collect()
    }

    /// All values, or the first failure tagged with its index.
    pub fn into_values(self) -> WaterResult<Vec<T>> {
        Ok(self
            .into_evaluated()?
            .into_iter()
            .map(|e| e.value)
            .collect())
    }
}

impl<T> IntoIterator for Batch<T> {
    type Item = WaterResult<Evaluated<T>>;
    type IntoIter = std::vec::IntoIter<WaterResult<Evaluated<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Batch<T> {
    type Item = &'a WaterResult<Evaluated<T>>;
    type IntoIter = std::slice::Iter<'a, WaterResult<Evaluated<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
