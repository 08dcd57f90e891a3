pub mod errors;
pub mod graph;
pub mod node;

pub use errors::{BayesNetError, Result};
pub use graph::Network;
pub use node::Node;
