use crate::config::TreeConfig;
use crate::constants::ROOT_LABEL;
use crate::data::{label_samples, positive_count, try_label_samples, Sample};
use crate::errors::TreeError;
use crate::grower::PendingNode;
use crate::node::{edge_label, Node};
use crate::render::{render_lines, Line, Style, BAR, ELBOW, SPACE, SPLIT_PADDING, TEE};
use crate::splitter::{find_best_split, Splitter, SplitterRegistry};
use crate::utils::{entropy, positive_rate};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{self, Display};

/// A binary classification tree grown by greedily picking, at every node,
/// the splitter that most reduces label entropy.
pub struct Tree<X> {
    samples: Vec<Sample<X>>,
    splitters: SplitterRegistry<X>,
    nodes: Vec<Node>,
    config: TreeConfig,
}

impl<X> Tree<X> {
    /// Label `data` with `labeller` and grow a tree using `splitters`.
    /// Nodes with fewer than `threshold` samples are not split.
    pub fn new<I, F, S>(data: I, labeller: F, splitters: S, threshold: usize) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = X>,
        F: Fn(&X) -> bool,
        S: IntoIterator<Item = Box<dyn Splitter<X>>>,
    {
        Self::fit(data, labeller, splitters, &TreeConfig::default().set_threshold(threshold))
    }

    pub fn fit<I, F, S>(data: I, labeller: F, splitters: S, config: &TreeConfig) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = X>,
        F: Fn(&X) -> bool,
        S: IntoIterator<Item = Box<dyn Splitter<X>>>,
    {
        Self::from_samples(label_samples(data, labeller), splitters, config)
    }

    /// Same as [`Tree::fit`] with a labeller that may fail. The first
    /// failure aborts construction.
    pub fn try_fit<I, F, E, S>(data: I, labeller: F, splitters: S, config: &TreeConfig) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = X>,
        F: Fn(&X) -> Result<bool, E>,
        E: Into<Box<dyn Error + Send + Sync>>,
        S: IntoIterator<Item = Box<dyn Splitter<X>>>,
    {
        let samples = try_label_samples(data, labeller).map_err(|(index, e)| TreeError::Labeller {
            index,
            source: e.into(),
        })?;
        Self::from_samples(samples, splitters, config)
    }

    /// Grow a tree over samples that are already labelled.
    pub fn from_samples<S>(samples: Vec<Sample<X>>, splitters: S, config: &TreeConfig) -> Result<Self, TreeError>
    where
        S: IntoIterator<Item = Box<dyn Splitter<X>>>,
    {
        if samples.is_empty() {
            return Err(TreeError::EmptyDataset);
        }
        let splitters = SplitterRegistry::new(splitters)?;
        if splitters.is_empty() {
            warn!("No splitters provided, the tree will be a single leaf.");
        }

        let mut tree = Tree {
            samples,
            splitters,
            nodes: Vec::new(),
            config: config.clone(),
        };
        tree.grow();
        info!(
            "Built tree with {} nodes, {} leaves and depth {} from {} samples.",
            tree.nodes.len(),
            tree.n_leaves(),
            tree.depth(),
            tree.samples.len()
        );
        Ok(tree)
    }

    fn grow(&mut self) {
        let threshold = self.config.threshold;
        let mut growable = self.config.grow_policy.grower();
        growable.add_node(PendingNode {
            parent_node: None,
            depth: 0,
            features: Vec::new(),
            values: vec![ROOT_LABEL.to_string()],
            index: (0..self.samples.len()).collect(),
            available_splitters: self.splitters.all(),
        });

        while let Some(pending) = growable.get_next_node() {
            let num = self.nodes.len();
            let n = pending.index.len();
            let n_positive = positive_count(&self.samples, &pending.index);
            let mut node = Node {
                num,
                depth: pending.depth,
                features: pending.features,
                values: pending.values,
                index: pending.index,
                n_positive,
                is_leaf: true,
                impurity: entropy(n_positive, n),
                best_child_positive_rate: positive_rate(n_positive, n),
                split: None,
                children: Vec::new(),
                parent_node: pending.parent_node,
                available_splitters: pending.available_splitters,
            };
            if let Some(parent) = node.parent_node {
                self.nodes[parent].children.push(num);
            }

            if n >= threshold {
                let best = find_best_split(
                    &self.splitters,
                    &node.available_splitters,
                    &self.samples,
                    &node.index,
                    threshold,
                );
                if let Some(candidate) = best {
                    let name = self.splitters.name(candidate.splitter);
                    debug!(
                        "Splitting node {} on \"{}\" into {} groups, entropy {:.3} -> {:.3}.",
                        num,
                        name,
                        candidate.groups.len(),
                        node.impurity,
                        candidate.impurity
                    );
                    node.make_parent_node(candidate.splitter, candidate.impurity);
                    let available = node.available_splitters.without(candidate.splitter);
                    let children: Vec<PendingNode> = candidate
                        .groups
                        .into_iter()
                        .map(|group| {
                            let mut features = node.features.clone();
                            let mut values = node.values.clone();
                            values.push(edge_label(name, &group.key));
                            features.push(group.key);
                            PendingNode {
                                parent_node: Some(num),
                                depth: node.depth + 1,
                                features,
                                values,
                                index: group.index,
                                available_splitters: available.clone(),
                            }
                        })
                        .collect();
                    growable.add_siblings(children);
                }
            }
            self.nodes.push(node);
        }
        self.sort_children();
    }

    /// Order every node's children by descending positive rate and lift
    /// the best rate into the parent. Children always carry a larger number
    /// than their parent, so walking backwards visits them first.
    fn sort_children(&mut self) {
        for num in (0..self.nodes.len()).rev() {
            if self.nodes[num].is_leaf {
                continue;
            }
            let mut children = std::mem::take(&mut self.nodes[num].children);
            children.sort_by(|a, b| {
                self.nodes[*b]
                    .best_child_positive_rate
                    .total_cmp(&self.nodes[*a].best_child_positive_rate)
            });
            if let Some(&first) = children.first() {
                self.nodes[num].best_child_positive_rate = self.nodes[first].best_child_positive_rate;
            }
            self.nodes[num].children = children;
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    pub fn node(&self, num: usize) -> Option<&Node> {
        self.nodes.get(num)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children.iter().map(move |&c| &self.nodes[c])
    }

    pub fn parent(&self, node: &Node) -> Option<&Node> {
        node.parent_node.map(|p| &self.nodes[p])
    }

    /// The labelled dataset the tree was grown from.
    pub fn samples(&self) -> &[Sample<X>] {
        &self.samples
    }

    /// Samples that reached `node`.
    pub fn node_samples<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Sample<X>> + 'a {
        node.index.iter().map(move |&i| &self.samples[i])
    }

    pub fn splitter_name(&self, idx: usize) -> &str {
        self.splitters.name(idx)
    }

    /// Name of the splitter `node` was split on.
    pub fn split_name(&self, node: &Node) -> Option<&str> {
        node.split.map(|s| self.splitters.name(s.splitter))
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf).count()
    }

    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    pub fn threshold(&self) -> usize {
        self.config.threshold
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut print_buffer: Vec<(usize, String, String)> = vec![(0, "   ".to_string(), " ".repeat(8))];
        while let Some((idx, prefix, body)) = print_buffer.pop() {
            let node = &self.nodes[idx];
            match &node.split {
                None => {
                    let rate = positive_rate(node.n_positive, node.len());
                    debug_assert_eq!(rate, node.best_child_positive_rate);
                    lines.push(
                        Line::new()
                            .plain(prefix)
                            .styled(format!("{}.", node.label()), Style::Leaf)
                            .plain(format!(" Entropy: {:.3}", node.impurity)),
                    );
                    let mut summary = Line::new()
                        .plain(body.as_str())
                        .styled(format!("Positive Rate = {:.3}", rate), Style::LeafSummary);
                    if node.is_empty() {
                        summary = summary.styled(" - 0 data", Style::Warning);
                    }
                    lines.push(summary.styled(format!(" (n={})", node.len()), Style::LeafSummary));
                    lines.push(Line::new().plain(body));
                }
                Some(split) => {
                    lines.push(Line::new().plain(format!("{}{}. Entropy: {:.3}", prefix, node.label(), node.impurity)));
                    lines.push(Line::new().plain(body.as_str()).styled("Split", Style::Split).plain(format!(
                        " using \"{}\". Entropy Decrease = {:.3} ({:.3} ─> {:.3})",
                        self.splitters.name(split.splitter),
                        node.entropy_decrease(),
                        node.impurity,
                        split.post_split_impurity
                    )));
                    let last = node.children.len().saturating_sub(1);
                    for (i, &child) in node.children.iter().enumerate().rev() {
                        let (connector, indent) = if i == last { (ELBOW, SPACE) } else { (TEE, BAR) };
                        let child_prefix = format!("{}{}", body, connector);
                        let child_body = format!("{}{}{}", body, indent, SPLIT_PADDING);
                        print_buffer.push((child, child_prefix, child_body));
                    }
                }
            }
        }
        lines
    }

    /// Draw the tree, with ANSI colours when `colored` is set.
    pub fn render(&self, colored: bool) -> String {
        render_lines(&self.lines(), colored)
    }

    pub fn ansi_str(&self) -> String {
        self.render(true)
    }
}

impl<X> Display for Tree<X> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grower::GrowPolicy;
    use crate::render::strip_ansi;
    use crate::splitter::{splitter, SplitKey};
    use crate::utils::precision_round;
    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;

    type Item = (i64, i64);

    fn item_splitters() -> Vec<Box<dyn Splitter<Item>>> {
        vec![
            splitter("a_big", |x: &Item| x.0 > 50),
            splitter("a_mod", |x: &Item| x.0 % 3),
            splitter("b_even", |x: &Item| x.1 % 2 == 0),
            splitter("b_band", |x: &Item| x.1 / 25),
            splitter("colour", |x: &Item| ["red", "green", "blue"][((x.0 + x.1) % 3) as usize]),
        ]
    }

    fn random_tree(seed: u64, n: usize, config: &TreeConfig) -> Tree<Item> {
        let mut rng = StdRng::seed_from_u64(seed);
        let data: Vec<Item> = (0..n).map(|_| (rng.gen_range(0..100), rng.gen_range(0..100))).collect();
        Tree::fit(data, |x| (x.0 > 60 && x.1 % 2 == 0) || (x.0 + x.1) % 7 == 0, item_splitters(), config).unwrap()
    }

    #[test]
    fn test_tree_parity_split() {
        let tree = Tree::new(
            0..100_i64,
            |x| x % 2 == 0,
            vec![splitter("field > 50", |x: &i64| *x > 50)],
            50,
        )
        .unwrap();
        let root = tree.root();
        assert!(!root.is_leaf);
        assert_eq!(tree.split_name(root), Some("field > 50"));
        assert_eq!(root.impurity, 1.0);

        // 51..=99 holds 24 evens out of 49, 0..=50 holds 26 evens out of 51.
        let h = |p: f64| -p * p.log2() - (1.0 - p) * (1.0 - p).log2();
        let weighted = (49.0 * h(24.0 / 49.0) + 51.0 * h(26.0 / 51.0)) / 100.0;
        assert_eq!(precision_round(root.entropy_decrease(), 3), precision_round(1.0 - weighted, 3));
        let expected = format!("Entropy Decrease = {:.3}", 1.0 - weighted);
        assert!(tree.to_string().contains(&expected));

        // Both children are leaves, no splitters remain.
        assert_eq!(tree.n_leaves(), 2);
        let children: Vec<&Node> = tree.children(root).collect();
        assert_eq!(children[0].label(), "NOT field > 50");
        assert_eq!(children[0].best_child_positive_rate, 26.0 / 51.0);
        assert_eq!(children[1].label(), "field > 50");
        assert_eq!(root.best_child_positive_rate, 26.0 / 51.0);
    }

    #[test]
    fn test_tree_below_threshold_is_leaf() {
        let tree = Tree::new(0..10_i64, |x| x % 2 == 0, vec![splitter("even", |x: &i64| x % 2 == 0)], 50).unwrap();
        assert!(tree.root().is_leaf);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.root().best_child_positive_rate, 0.5);
        assert_eq!(tree.threshold(), 50);
    }

    #[test]
    fn test_tree_single_group_splitters_is_leaf() {
        let tree = Tree::new(
            0..200_i64,
            |x| x % 2 == 0,
            vec![
                splitter("positive", |x: &i64| *x >= 0),
                splitter("small", |x: &i64| *x < 1000),
                splitter("kind", |_: &i64| "number"),
            ],
            50,
        )
        .unwrap();
        assert!(tree.root().is_leaf);
        assert!(tree.root().split.is_none());
    }

    #[test]
    fn test_tree_render_exact() {
        let tree = Tree::new(0..8_i64, |x| *x < 3, vec![splitter("small", |x: &i64| *x < 4)], 4).unwrap();
        let expected = [
            "   Root root. Entropy: 0.954",
            "        Split using \"small\". Entropy Decrease = 0.549 (0.954 ─> 0.406)",
            "        ├── small. Entropy: 0.811",
            "        │       Positive Rate = 0.750 (n=4)",
            "        │       ",
            "        └── NOT small. Entropy: 0.000",
            "                Positive Rate = 0.000 (n=4)",
            "                ",
        ]
        .join("\n");
        assert_eq!(tree.render(false), expected);
        assert_eq!(tree.to_string(), expected);
        assert_eq!(strip_ansi(&tree.ansi_str()), expected);
        assert!(tree.ansi_str().contains("\x1b[94msmall.\x1b[0m Entropy: 0.811"));
    }

    #[test]
    fn test_tree_categorical_labels() {
        let tree = Tree::new(
            0..90_i64,
            |x| x % 3 == 0,
            vec![splitter("colour", |x: &i64| ["red", "green", "blue"][(x % 3) as usize])],
            30,
        )
        .unwrap();
        let root = tree.root();
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.split.map(|s| s.post_split_impurity), Some(0.0));
        let first = tree.node(root.children[0]).unwrap();
        assert_eq!(first.label(), "colour=red");
        assert_eq!(first.features, vec![SplitKey::from("red")]);
        assert_eq!(first.values, vec!["Root root".to_string(), "colour=red".to_string()]);
        assert_eq!(tree.parent(first).map(|p| p.num), Some(0));
        assert!(tree.node_samples(first).all(|s| s.raw % 3 == 0 && s.label));
    }

    #[test]
    fn test_tree_render_empty_leaf() {
        let tree = Tree {
            samples: vec![Sample::new(1_i64, true)],
            splitters: SplitterRegistry::new(Vec::new()).unwrap(),
            nodes: vec![Node {
                num: 0,
                depth: 0,
                features: Vec::new(),
                values: vec![ROOT_LABEL.to_string()],
                index: Vec::new(),
                n_positive: 0,
                is_leaf: true,
                impurity: 0.0,
                best_child_positive_rate: 0.0,
                split: None,
                children: Vec::new(),
                parent_node: None,
                available_splitters: Default::default(),
            }],
            config: TreeConfig::default(),
        };
        let expected = [
            "   Root root. Entropy: 0.000",
            "        Positive Rate = 0.000 - 0 data (n=0)",
            "        ",
        ]
        .join("\n");
        assert_eq!(tree.render(false), expected);
        assert_eq!(strip_ansi(&tree.ansi_str()), expected);
        assert!(tree.ansi_str().contains("\x1b[93m - 0 data\x1b[0m"));
    }

    #[test]
    fn test_tree_empty_dataset() {
        let tree = Tree::new(Vec::<i64>::new(), |x| *x > 0, vec![splitter("pos", |x: &i64| *x > 0)], 50);
        assert!(matches!(tree, Err(TreeError::EmptyDataset)));
    }

    #[test]
    fn test_tree_duplicate_splitters() {
        let tree = Tree::new(
            0..10_i64,
            |x| *x > 0,
            vec![splitter("pos", |x: &i64| *x > 0), splitter("pos", |x: &i64| *x > 1)],
            50,
        );
        assert!(matches!(tree, Err(TreeError::DuplicateSplitter(_))));
    }

    #[test]
    fn test_tree_try_fit_labeller_error() {
        let data = vec!["1", "0", "oops", "1"];
        let tree = Tree::try_fit(
            data,
            |s| s.parse::<u8>().map(|v| v == 1),
            vec![splitter("first", |s: &&str| *s == "1")],
            &TreeConfig::default(),
        );
        match tree {
            Err(TreeError::Labeller { index, .. }) => assert_eq!(index, 2),
            _ => panic!("expected a labeller error"),
        }
    }

    #[test]
    fn test_tree_partitions_are_exact() {
        let tree = random_tree(0, 400, &TreeConfig::default().set_threshold(20));
        assert!(!tree.root().is_leaf);
        for node in tree.nodes() {
            if node.is_leaf {
                assert!(node.children.is_empty());
                continue;
            }
            let total: usize = tree.children(node).map(|c| c.len()).sum();
            assert_eq!(total, node.len());
            let mut parent_index = node.index.clone();
            let mut child_index: Vec<usize> = tree.children(node).flat_map(|c| c.index.iter().copied()).collect();
            parent_index.sort_unstable();
            child_index.sort_unstable();
            assert_eq!(parent_index, child_index);
        }
    }

    #[test]
    fn test_tree_splitters_used_once_per_path() {
        let tree = random_tree(1, 600, &TreeConfig::default().set_threshold(10));
        for node in tree.nodes() {
            let mut used = Vec::new();
            let mut current = tree.parent(node);
            while let Some(ancestor) = current {
                let s = ancestor.split.map(|s| s.splitter).unwrap();
                assert!(!node.available_splitters.contains(s));
                used.push(s);
                current = tree.parent(ancestor);
            }
            if let Some(split) = node.split {
                assert!(!used.contains(&split.splitter));
            }
            let mut dedup = used.clone();
            dedup.sort_unstable();
            dedup.dedup();
            assert_eq!(dedup.len(), used.len());
        }
    }

    #[test]
    fn test_tree_positive_rates_and_order() {
        let tree = random_tree(2, 500, &TreeConfig::default().set_threshold(15));
        for node in tree.nodes() {
            if node.is_leaf {
                let pos = tree.node_samples(node).filter(|s| s.label).count();
                assert_eq!(node.best_child_positive_rate, pos as f64 / node.len() as f64);
            } else {
                let rates: Vec<f64> = tree.children(node).map(|c| c.best_child_positive_rate).collect();
                assert!(rates.windows(2).all(|w| w[0] >= w[1]));
                let max = rates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                assert_eq!(node.best_child_positive_rate, max);
            }
        }
    }

    #[test]
    fn test_tree_render_modes_match() {
        let tree = random_tree(3, 400, &TreeConfig::default().set_threshold(20));
        assert_eq!(strip_ansi(&tree.render(true)), tree.render(false));
        assert_ne!(tree.render(true), tree.render(false));
    }

    #[test]
    fn test_tree_grow_policy_same_shape() {
        let depth_first = random_tree(4, 500, &TreeConfig::default().set_threshold(15));
        let breadth_first = random_tree(
            4,
            500,
            &TreeConfig::default().set_threshold(15).set_grow_policy(GrowPolicy::BreadthFirst),
        );
        assert_eq!(depth_first.nodes().len(), breadth_first.nodes().len());
        assert_eq!(depth_first.render(false), breadth_first.render(false));
    }

    #[test]
    fn test_tree_no_splitters() {
        let tree = Tree::new(0..100_i64, |x| x % 2 == 0, Vec::new(), 50).unwrap();
        assert!(tree.root().is_leaf);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.n_leaves(), 1);
    }
}
