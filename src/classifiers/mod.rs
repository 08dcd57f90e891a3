//! Classifiers built on the graph engine, and the capability set they share.

pub mod aode;
pub mod discretized;
pub mod ensemble;
pub mod factory;
pub mod kdb;
pub mod proposal;
pub mod spode;
pub mod tan;
pub mod voting;

use crate::dataset::{Dataset, TrainingSet};
use crate::network::graph::accuracy;
use crate::network::{BayesNetError, Network, Result};
use log::info;
use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::Serialize;
use std::ops::Add;

/// Size of a fitted model, summed over members for ensembles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub nodes: usize,
    pub edges: usize,
    pub states: usize,
    pub cpt_cells: usize,
}

impl ModelSummary {
    pub fn of(network: &Network) -> Self {
        ModelSummary {
            nodes: network.num_nodes(),
            edges: network.num_edges(),
            states: network.num_states(),
            cpt_cells: network.num_cpt_cells(),
        }
    }
}

impl Add for ModelSummary {
    type Output = ModelSummary;

    fn add(self, other: ModelSummary) -> ModelSummary {
        ModelSummary {
            nodes: self.nodes + other.nodes,
            edges: self.edges + other.edges,
            states: self.states + other.states,
            cpt_cells: self.cpt_cells + other.cpt_cells,
        }
    }
}

/// The capability set every learner provides: fit, predict, predict_proba,
/// score and describe.
///
/// `Data` is the training view the learner consumes and `Value` the element
/// type of the sample matrices it predicts on (`usize` codes or raw `f64`).
pub trait Classifier: Send + Sync {
    type Data: TrainingSet;
    type Value: Copy + Send + Sync;

    fn fit(&mut self, data: &Self::Data) -> Result<()>;

    fn is_fitted(&self) -> bool;

    /// One posterior row per sample.
    fn predict_proba(&self, samples: ArrayView2<'_, Self::Value>) -> Result<Array2<f64>>;

    fn predict(&self, samples: ArrayView2<'_, Self::Value>) -> Result<Vec<usize>> {
        let proba = self.predict_proba(samples)?;
        Ok(proba.axis_iter(Axis(0)).map(voting::argmax).collect())
    }

    /// Fraction of samples whose prediction matches `labels`.
    fn score(&self, samples: ArrayView2<'_, Self::Value>, labels: ArrayView1<'_, usize>) -> Result<f64> {
        if labels.len() != samples.nrows() {
            return Err(BayesNetError::dimension("labels", samples.nrows(), labels.len()));
        }
        let predictions = self.predict(samples)?;
        Ok(accuracy(&predictions, labels))
    }

    fn describe(&self) -> ModelSummary;

    /// `"node -> children"` lines.
    fn show(&self) -> Vec<String>;

    /// Graphviz lines.
    fn graph(&self, title: &str) -> Vec<String>;

    /// The single network behind this classifier, if there is one.
    fn network(&self) -> Option<&Network> {
        None
    }

    /// Re-estimates the model on re-coded data. Learners backed by a single
    /// network keep their structure and only re-estimate the CPTs.
    fn refit(&mut self, data: &Self::Data) -> Result<()> {
        self.fit(data)
    }
}

/// Learns a DAG over the dataset's variables; CPTs are estimated afterwards.
pub trait StructureLearner: Send + Sync {
    fn name(&self) -> &'static str;

    fn learn_structure(&self, data: &Dataset) -> Result<Network>;
}

/// A classifier made of one network whose structure comes from `S`.
#[derive(Debug, Clone)]
pub struct BayesNetClassifier<S> {
    structure: S,
    network: Network,
}

impl<S: StructureLearner> BayesNetClassifier<S> {
    pub fn with_structure(structure: S) -> Self {
        BayesNetClassifier {
            structure,
            network: Network::new(),
        }
    }

    pub fn structure(&self) -> &S {
        &self.structure
    }

    pub fn topological_order(&self) -> Result<Vec<String>> {
        self.network.topological_order()
    }

    fn learn(&self, data: &Dataset) -> Result<Network> {
        require_varying_class(data)?;
        let mut network = self.structure.learn_structure(data)?;
        network.fit(data)?;
        Ok(network)
    }
}

impl<S: StructureLearner> Classifier for BayesNetClassifier<S> {
    type Data = Dataset;
    type Value = usize;

    /// Learns a fresh structure and fits it. The previous network is kept
    /// until both steps succeed, but is no longer reported as fitted.
    fn fit(&mut self, data: &Dataset) -> Result<()> {
        match self.learn(data) {
            Ok(network) => {
                info!(
                    "{}: learned {} edges over {} nodes",
                    self.structure.name(),
                    network.num_edges(),
                    network.num_nodes()
                );
                self.network = network;
                Ok(())
            }
            Err(e) => {
                self.network.mark_unfitted();
                Err(e)
            }
        }
    }

    fn is_fitted(&self) -> bool {
        self.network.is_fitted()
    }

    fn predict_proba(&self, samples: ArrayView2<'_, usize>) -> Result<Array2<f64>> {
        self.network.predict_proba(samples)
    }

    fn predict(&self, samples: ArrayView2<'_, usize>) -> Result<Vec<usize>> {
        self.network.predict(samples)
    }

    fn describe(&self) -> ModelSummary {
        ModelSummary::of(&self.network)
    }

    fn show(&self) -> Vec<String> {
        self.network.show()
    }

    fn graph(&self, title: &str) -> Vec<String> {
        self.network.graph(title)
    }

    fn network(&self) -> Option<&Network> {
        Some(&self.network)
    }

    fn refit(&mut self, data: &Dataset) -> Result<()> {
        if self.network.num_nodes() == 0 {
            return self.fit(data);
        }
        self.network.fit(data)
    }
}

/// Adds the class node first, then one node per feature in the given order.
pub(crate) fn add_class_and_features(network: &mut Network, data: &Dataset, order: &[usize]) -> Result<()> {
    let class = data.class_name();
    network.add_node(class, data.n_classes())?;
    network.set_class(class)?;
    for &i in order {
        let name = &data.features()[i];
        let cardinality = data
            .cardinality(name)
            .ok_or_else(|| BayesNetError::UnknownNode(name.clone()))?;
        network.add_node(name, cardinality)?;
    }
    Ok(())
}

pub(crate) fn require_varying_class(data: &impl TrainingSet) -> Result<()> {
    if data.n_classes() < 2 {
        return Err(BayesNetError::DegenerateVariable {
            name: data.class_name().to_string(),
            cardinality: data.n_classes(),
        });
    }
    Ok(())
}
