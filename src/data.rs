//! Data
//!
//! Labelled samples and small helpers for counting labels over them.
use serde::{Deserialize, Serialize};

/// A raw input value together with its derived binary label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample<X> {
    pub raw: X,
    pub label: bool,
}

impl<X> Sample<X> {
    pub fn new(raw: X, label: bool) -> Self {
        Sample { raw, label }
    }
}

/// Label every raw item, keeping the input order.
pub fn label_samples<X, I, F>(items: I, labeller: F) -> Vec<Sample<X>>
where
    I: IntoIterator<Item = X>,
    F: Fn(&X) -> bool,
{
    items
        .into_iter()
        .map(|raw| {
            let label = labeller(&raw);
            Sample::new(raw, label)
        })
        .collect()
}

/// Fallible version of [`label_samples`], stops at the first labelling error.
/// The error carries the position of the offending item.
pub fn try_label_samples<X, I, F, E>(items: I, labeller: F) -> Result<Vec<Sample<X>>, (usize, E)>
where
    I: IntoIterator<Item = X>,
    F: Fn(&X) -> Result<bool, E>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(i, raw)| match labeller(&raw) {
            Ok(label) => Ok(Sample::new(raw, label)),
            Err(e) => Err((i, e)),
        })
        .collect()
}

/// Number of positive labels among the samples selected by `index`.
pub fn positive_count<X>(samples: &[Sample<X>], index: &[usize]) -> usize {
    index.iter().filter(|&&i| samples[i].label).count()
}
