//! Supervised discretization of continuous features.

pub mod mdlp;

pub use mdlp::{Mdlp, factorize};
