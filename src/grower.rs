use serde::Deserialize;
use serde::Serialize;

use crate::splitter::{AvailableSplitters, SplitKey};
use std::collections::VecDeque;

/// A node whose samples are known but which has not been evaluated yet.
#[derive(Debug, Clone)]
pub struct PendingNode {
    pub parent_node: Option<usize>,
    pub depth: usize,
    pub features: Vec<SplitKey>,
    pub values: Vec<String>,
    pub index: Vec<usize>,
    pub available_splitters: AvailableSplitters,
}

/// Trait for handling the growth of the tree.
pub trait Grower {
    /// Add a node to the grower.
    fn add_node(&mut self, node: PendingNode);
    /// Get the next node to evaluate, `None` once the grower is empty.
    fn get_next_node(&mut self) -> Option<PendingNode>;
    /// Add the children of one node, they are handed out in the given order.
    fn add_siblings(&mut self, nodes: Vec<PendingNode>);
}

impl Grower for Vec<PendingNode> {
    fn add_node(&mut self, node: PendingNode) {
        self.push(node);
    }

    fn get_next_node(&mut self) -> Option<PendingNode> {
        self.pop()
    }

    fn add_siblings(&mut self, nodes: Vec<PendingNode>) {
        self.extend(nodes.into_iter().rev());
    }
}

impl Grower for VecDeque<PendingNode> {
    fn add_node(&mut self, node: PendingNode) {
        self.push_front(node);
    }

    fn get_next_node(&mut self) -> Option<PendingNode> {
        self.pop_back()
    }

    fn add_siblings(&mut self, nodes: Vec<PendingNode>) {
        nodes.into_iter().for_each(|n| self.push_front(n));
    }
}

/// Order in which pending nodes are evaluated.
/// Only node numbering depends on it, the finished tree is the same.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrowPolicy {
    /// Finish a subtree before moving on to its siblings.
    #[default]
    DepthFirst,
    /// Evaluate the tree level by level.
    BreadthFirst,
}

impl GrowPolicy {
    pub fn grower(&self) -> Box<dyn Grower> {
        match self {
            GrowPolicy::DepthFirst => Box::new(Vec::new()),
            GrowPolicy::BreadthFirst => Box::new(VecDeque::new()),
        }
    }
}
