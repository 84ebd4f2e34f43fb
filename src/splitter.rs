//! Splitter
//!
//! Named splitting functions, the set of splitters still available to a node,
//! and the search for the candidate split that most reduces label entropy.
use crate::constants::INITIAL_BEST_ENTROPY;
use crate::data::Sample;
use crate::errors::TreeError;
use crate::utils::weighted_entropy;
use hashbrown::{HashMap, HashSet};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::marker::PhantomData;

/// Discrete value a splitter maps a raw item to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SplitKey {
    Bool(bool),
    Int(i64),
    Category(String),
}

impl From<bool> for SplitKey {
    fn from(v: bool) -> Self {
        SplitKey::Bool(v)
    }
}

impl From<i64> for SplitKey {
    fn from(v: i64) -> Self {
        SplitKey::Int(v)
    }
}

impl From<i32> for SplitKey {
    fn from(v: i32) -> Self {
        SplitKey::Int(v as i64)
    }
}

impl From<u8> for SplitKey {
    fn from(v: u8) -> Self {
        SplitKey::Int(v as i64)
    }
}

impl From<&str> for SplitKey {
    fn from(v: &str) -> Self {
        SplitKey::Category(v.to_owned())
    }
}

impl From<String> for SplitKey {
    fn from(v: String) -> Self {
        SplitKey::Category(v)
    }
}

impl Display for SplitKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SplitKey::Bool(v) => write!(f, "{}", v),
            SplitKey::Int(v) => write!(f, "{}", v),
            SplitKey::Category(v) => write!(f, "{}", v),
        }
    }
}

/// A named function partitioning raw items by a derived key.
pub trait Splitter<X> {
    /// Name used for display, and as the splitter's identity.
    fn name(&self) -> &str;
    /// Map a raw item to its split key.
    fn apply(&self, value: &X) -> SplitKey;
}

/// A splitter backed by a closure.
pub struct FnSplitter<X, K, F> {
    name: String,
    func: F,
    _marker: PhantomData<fn(&X) -> K>,
}

impl<X, K, F> FnSplitter<X, K, F>
where
    F: Fn(&X) -> K,
    K: Into<SplitKey>,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        FnSplitter {
            name: name.into(),
            func,
            _marker: PhantomData,
        }
    }
}

impl<X, K, F> Splitter<X> for FnSplitter<X, K, F>
where
    F: Fn(&X) -> K,
    K: Into<SplitKey>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, value: &X) -> SplitKey {
        (self.func)(value).into()
    }
}

/// Box up a named closure as a splitter.
pub fn splitter<X, K, F>(name: impl Into<String>, func: F) -> Box<dyn Splitter<X>>
where
    X: 'static,
    K: Into<SplitKey> + 'static,
    F: Fn(&X) -> K + 'static,
{
    Box::new(FnSplitter::new(name, func))
}

/// All splitters known to a tree, in registration order.
pub struct SplitterRegistry<X> {
    splitters: Vec<Box<dyn Splitter<X>>>,
}

impl<X> SplitterRegistry<X> {
    /// Register splitters, names must be unique.
    pub fn new<I>(splitters: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = Box<dyn Splitter<X>>>,
    {
        let splitters: Vec<Box<dyn Splitter<X>>> = splitters.into_iter().collect();
        {
            let mut names = HashSet::with_capacity(splitters.len());
            for s in &splitters {
                if !names.insert(s.name()) {
                    return Err(TreeError::DuplicateSplitter(s.name().to_string()));
                }
            }
        }
        Ok(SplitterRegistry { splitters })
    }

    pub fn len(&self) -> usize {
        self.splitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splitters.is_empty()
    }

    pub fn get(&self, idx: usize) -> &dyn Splitter<X> {
        self.splitters[idx].as_ref()
    }

    pub fn name(&self, idx: usize) -> &str {
        self.splitters[idx].name()
    }

    /// Index of the splitter registered under `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.splitters.iter().position(|s| s.name() == name)
    }

    /// Every registered splitter, as the starting set for the root.
    pub fn all(&self) -> AvailableSplitters {
        AvailableSplitters {
            indices: (0..self.splitters.len()).collect(),
        }
    }
}

/// Splitters a node and its descendants may still use.
/// Indices point into the [`SplitterRegistry`] and stay in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvailableSplitters {
    indices: Vec<usize>,
}

impl AvailableSplitters {
    /// The same set with `idx` removed.
    pub fn without(&self, idx: usize) -> Self {
        AvailableSplitters {
            indices: self.indices.iter().copied().filter(|&i| i != idx).collect(),
        }
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.indices.contains(&idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Samples sharing one split key.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitGroup {
    pub key: SplitKey,
    pub index: Vec<usize>,
    pub n_positive: usize,
}

/// The winning split for a node.
#[derive(Debug, Clone)]
pub struct SplitCandidate {
    pub splitter: usize,
    pub impurity: f64,
    pub groups: Vec<SplitGroup>,
}

/// Group the samples in `index` by the key `splitter` assigns them.
/// Groups appear in the order their key is first seen.
pub fn partition<X>(splitter: &dyn Splitter<X>, samples: &[Sample<X>], index: &[usize]) -> Vec<SplitGroup> {
    let mut groups: Vec<SplitGroup> = Vec::new();
    let mut lookup: HashMap<SplitKey, usize> = HashMap::new();
    for &i in index {
        let sample = &samples[i];
        let key = splitter.apply(&sample.raw);
        let g = match lookup.get(&key) {
            Some(g) => *g,
            None => {
                lookup.insert(key.clone(), groups.len());
                groups.push(SplitGroup {
                    key,
                    index: Vec::new(),
                    n_positive: 0,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[g];
        group.index.push(i);
        if sample.label {
            group.n_positive += 1;
        }
    }
    groups
}

/// Evaluate every available splitter, in registration order, and keep the
/// one with the lowest weighted entropy.
///
/// A candidate only counts if it produces more than one group, every group
/// holds more than `threshold / (2 * n_groups)` samples, and it is strictly
/// better than the best candidate so far, so the first of equally good
/// splitters wins.
pub fn find_best_split<X>(
    registry: &SplitterRegistry<X>,
    available: &AvailableSplitters,
    samples: &[Sample<X>],
    index: &[usize],
    threshold: usize,
) -> Option<SplitCandidate> {
    let mut best: Option<SplitCandidate> = None;
    let mut best_impurity = INITIAL_BEST_ENTROPY;
    for s in available.iter() {
        let groups = partition(registry.get(s), samples, index);
        let impurity = weighted_entropy(groups.iter().map(|g| (g.n_positive, g.index.len())));
        let min_size = threshold as f64 / (groups.len() * 2) as f64;
        if groups.len() > 1 && impurity < best_impurity && groups.iter().all(|g| g.index.len() as f64 > min_size) {
            best_impurity = impurity;
            best = Some(SplitCandidate {
                splitter: s,
                impurity,
                groups,
            });
        } else {
            trace!(
                "Rejected splitter \"{}\": {} groups, entropy {:.3}",
                registry.name(s),
                groups.len(),
                impurity
            );
        }
    }
    best
}
