
// Modules
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod grower;
pub mod node;
pub mod render;
pub mod splitter;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use config::TreeConfig;
pub use data::Sample;
pub use errors::TreeError;
pub use splitter::{splitter, FnSplitter, SplitKey, Splitter};
pub use tree::Tree;
