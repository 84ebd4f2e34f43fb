//! Errors
//!
//! Custom error types used throughout the `entropy_tree` crate.
use thiserror::Error;

/// Errors that can occur while building a tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The dataset handed to the tree contained no samples.
    #[error("Cannot build a tree from an empty dataset.")]
    EmptyDataset,
    /// Two splitters were registered under the same name.
    #[error("A splitter named \"{0}\" is already registered, splitter names must be unique.")]
    DuplicateSplitter(String),
    /// The labelling function failed on one of the raw items.
    #[error("Unable to label sample {index}: {source}")]
    Labeller {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The configuration could not be parsed.
    #[error("Invalid tree configuration: {0}")]
    InvalidConfig(String),
}
