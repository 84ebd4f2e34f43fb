use crate::splitter::{AvailableSplitters, SplitKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The split chosen for an internal node.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct NodeSplit {
    /// Index of the splitter in the tree's registry.
    pub splitter: usize,
    /// Weighted entropy of the children.
    pub post_split_impurity: f64,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Node {
    pub num: usize,
    pub depth: usize,
    /// Split keys taken along the path from the root.
    pub features: Vec<SplitKey>,
    /// Edge labels along the path from the root, ending with this node's own.
    pub values: Vec<String>,
    /// Positions of this node's samples in the tree's dataset.
    pub index: Vec<usize>,
    pub n_positive: usize,
    pub is_leaf: bool,
    pub impurity: f64,
    pub best_child_positive_rate: f64,
    pub split: Option<NodeSplit>,
    pub children: Vec<usize>,
    pub parent_node: Option<usize>,
    pub available_splitters: AvailableSplitters,
}

impl Node {
    /// Number of samples that reached this node.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Label of the edge leading into this node.
    pub fn label(&self) -> &str {
        self.values.last().map(String::as_str).unwrap_or_default()
    }

    /// Entropy removed by this node's split, zero for leaves.
    pub fn entropy_decrease(&self) -> f64 {
        match &self.split {
            Some(s) => self.impurity - s.post_split_impurity,
            None => 0.0,
        }
    }

    /// Update all the info that is needed if this node becomes a
    /// parent node.
    pub fn make_parent_node(&mut self, splitter: usize, post_split_impurity: f64) {
        self.is_leaf = false;
        self.split = Some(NodeSplit {
            splitter,
            post_split_impurity,
        });
    }
}

/// Label for the edge into the child holding `key` after splitting with `name`.
pub fn edge_label(name: &str, key: &SplitKey) -> String {
    match key {
        SplitKey::Bool(true) => name.to_string(),
        SplitKey::Bool(false) => format!("NOT {}", name),
        other => format!("{}={}", name, other),
    }
}

impl fmt::Display for Node {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.split {
            None => write!(
                f,
                "{}:leaf[{}],entropy={:.3},rate={:.3},n={}",
                self.num,
                self.label(),
                self.impurity,
                self.best_child_positive_rate,
                self.len()
            ),
            Some(s) => write!(
                f,
                "{}:[{}] splitter={},entropy={:.3}->{:.3},children={:?},n={}",
                self.num,
                self.label(),
                s.splitter,
                self.impurity,
                s.post_split_impurity,
                self.children,
                self.len()
            ),
        }
    }
}
