pub mod classifiers;
pub mod common;
pub mod dataset;
pub mod discretization;
pub mod metrics;
pub mod network;

pub use classifiers::aode::{Aode, AodeLd, SignificanceMode};
pub use classifiers::discretized::{Discretized, KdbLd, SpodeLd};
pub use classifiers::factory::{Model, ModelConfig};
pub use classifiers::kdb::Kdb;
pub use classifiers::spode::Spode;
pub use classifiers::tan::Tan;
pub use classifiers::{Classifier, ModelSummary};
pub use dataset::{ContinuousDataset, Dataset, RawDataset, TrainingSet};
pub use network::{BayesNetError, Network, Node};
