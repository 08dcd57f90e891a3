//! k-dependence Bayesian classifier.
//!
//! Features are added in decreasing order of I(feature; class). Each one gets
//! the class as a parent plus up to `k` already-added features, chosen by the
//! highest I(feature; other | class) above `theta`.

use super::{BayesNetClassifier, StructureLearner, add_class_and_features};
use crate::dataset::{Dataset, TrainingSet};
use crate::metrics::{Metrics, argsort_descending};
use crate::network::{BayesNetError, Network, Result};
use log::{debug, info};
use ndarray::ArrayView2;

pub const DEFAULT_K: usize = 2;
pub const DEFAULT_THETA: f64 = 0.03;

#[derive(Debug, Clone, PartialEq)]
pub struct KdbStructure {
    k: usize,
    theta: f64,
}

pub type Kdb = BayesNetClassifier<KdbStructure>;

impl Kdb {
    pub fn new(k: usize, theta: f64) -> Self {
        BayesNetClassifier::with_structure(KdbStructure { k, theta })
    }
}

impl Default for Kdb {
    fn default() -> Self {
        Kdb::new(DEFAULT_K, DEFAULT_THETA)
    }
}

impl KdbStructure {
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Builds the DAG from precomputed scores: `class_mi[i]` = I(Xi; C) and
    /// `conditional_mi[[i, j]]` = I(Xi; Xj | C).
    pub fn structure_from_scores(
        &self,
        data: &Dataset,
        class_mi: &[f64],
        conditional_mi: ArrayView2<'_, f64>,
    ) -> Result<Network> {
        let n = data.n_features();
        if class_mi.len() != n {
            return Err(BayesNetError::dimension("class mutual information", n, class_mi.len()));
        }
        if conditional_mi.shape() != [n, n] {
            return Err(BayesNetError::dimension(
                "conditional mutual information",
                n * n,
                conditional_mi.len(),
            ));
        }

        let order = argsort_descending(class_mi);
        let features = data.features();
        info!(
            "KDB(k={}) feature order: {:?}",
            self.k,
            order.iter().map(|&i| features[i].as_str()).collect::<Vec<_>>()
        );

        let mut network = Network::new();
        add_class_and_features(&mut network, data, &order)?;
        let class = data.class_name();
        let mut processed: Vec<usize> = Vec::with_capacity(n);
        for &idx in &order {
            network.add_edge(class, &features[idx])?;
            for parent in self.select_parents(idx, &processed, conditional_mi) {
                debug!(
                    "KDB edge {} -> {} (I = {:.6})",
                    features[parent],
                    features[idx],
                    conditional_mi[[idx, parent]]
                );
                network.add_edge(&features[parent], &features[idx])?;
            }
            processed.push(idx);
        }
        Ok(network)
    }

    /// Up to `k` processed features with the highest conditional mutual
    /// information above `theta`; ties keep processing order.
    fn select_parents(&self, idx: usize, processed: &[usize], conditional_mi: ArrayView2<'_, f64>) -> Vec<usize> {
        let mut candidates = processed.to_vec();
        candidates.sort_by(|&a, &b| conditional_mi[[idx, b]].total_cmp(&conditional_mi[[idx, a]]));
        candidates
            .into_iter()
            .take_while(|&j| conditional_mi[[idx, j]] > self.theta)
            .take(self.k)
            .collect()
    }
}

impl StructureLearner for KdbStructure {
    fn name(&self) -> &'static str {
        "KDB"
    }

    fn learn_structure(&self, data: &Dataset) -> Result<Network> {
        let metrics = Metrics::new(data);
        let class_mi = metrics.class_mutual_information();
        let conditional_mi = metrics.conditional_edge_weights();
        self.structure_from_scores(data, &class_mi, conditional_mi.view())
    }
}
