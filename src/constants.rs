/// Minimum number of samples a node needs before any split is attempted.
pub const DEFAULT_THRESHOLD: usize = 50;
/// Edge label carried by the root node.
pub const ROOT_LABEL: &str = "Root root";
/// Starting point for the best-candidate search; above any binary entropy.
pub const INITIAL_BEST_ENTROPY: f64 = 100.0;
