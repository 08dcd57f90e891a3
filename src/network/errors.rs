//! Error types for network construction, fitting and inference.

use thiserror::Error;

/// Errors raised by the graph engine and the learners built on top of it.
///
/// Every error is raised synchronously by the call that violates the contract.
/// Nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BayesNetError {
    /// A node with this name already exists in the network.
    #[error("duplicate node name '{0}'")]
    DuplicateName(String),

    /// The named node (or dataset variable) does not exist.
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    /// The requested edge would close a directed cycle.
    #[error("cycle detected: {0}")]
    Cycle(String),

    /// Two collections that must agree in size do not.
    #[error("dimension mismatch in {context}: expected {expected}, found {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Prediction or introspection was requested before `fit`.
    #[error("model has not been fitted")]
    NotFitted,

    /// A variable that must vary has fewer than two states.
    #[error("variable '{name}' has {cardinality} state(s); at least 2 are required")]
    DegenerateVariable { name: String, cardinality: usize },

    /// An observed code lies outside `[0, cardinality)`.
    #[error("state {state} of '{variable}' is out of range (cardinality {cardinality})")]
    InvalidState {
        variable: String,
        state: usize,
        cardinality: usize,
    },

    #[error("invalid sample weights: {0}")]
    InvalidWeights(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BayesNetError {
    pub(crate) fn dimension(context: impl Into<String>, expected: usize, found: usize) -> Self {
        BayesNetError::DimensionMismatch {
            context: context.into(),
            expected,
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, BayesNetError>;
