//! Tree Configuration
//!
//! Parameters controlling how a tree is grown.
use crate::constants::DEFAULT_THRESHOLD;
use crate::errors::TreeError;
use crate::grower::GrowPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for building a [`crate::Tree`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TreeConfig {
    /// Minimum number of samples a node needs before a split is attempted.
    /// Also bounds the size of the smallest acceptable group of a split.
    pub threshold: usize,
    /// Order in which pending nodes are evaluated.
    pub grow_policy: GrowPolicy,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            threshold: DEFAULT_THRESHOLD,
            grow_policy: GrowPolicy::default(),
        }
    }
}

impl TreeConfig {
    /// Parse a configuration from JSON, missing fields take their defaults.
    pub fn from_json(json_str: &str) -> Result<Self, TreeError> {
        serde_json::from_str::<TreeConfig>(json_str).map_err(|e| TreeError::InvalidConfig(e.to_string()))
    }

    pub fn json_dump(&self) -> Result<String, TreeError> {
        serde_json::to_string(self).map_err(|e| TreeError::InvalidConfig(e.to_string()))
    }

    /// Set the threshold.
    /// * `threshold` - Minimum sample count to attempt a split.
    pub fn set_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the grow policy.
    /// * `grow_policy` - Order in which pending nodes are evaluated.
    pub fn set_grow_policy(mut self, grow_policy: GrowPolicy) -> Self {
        self.grow_policy = grow_policy;
        self
    }
}
