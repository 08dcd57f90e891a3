use super::{BayesNetClassifier, StructureLearner, add_class_and_features};
use crate::dataset::{Dataset, TrainingSet};
use crate::network::{BayesNetError, Network, Result};

/// Super-parent one-dependence estimator: the class and the super-parent are
/// roots, every other feature has exactly those two parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpodeStructure {
    root: usize,
}

pub type Spode = BayesNetClassifier<SpodeStructure>;

impl Spode {
    pub fn new(root: usize) -> Self {
        BayesNetClassifier::with_structure(SpodeStructure { root })
    }
}

impl SpodeStructure {
    pub fn root(&self) -> usize {
        self.root
    }
}

impl StructureLearner for SpodeStructure {
    fn name(&self) -> &'static str {
        "SPODE"
    }

    fn learn_structure(&self, data: &Dataset) -> Result<Network> {
        let n = data.n_features();
        if self.root >= n {
            return Err(BayesNetError::dimension("super-parent index", n, self.root));
        }
        let features = data.features();
        let root = &features[self.root];
        let cardinality = data.cardinality(root).unwrap_or(0);
        if cardinality < 2 {
            return Err(BayesNetError::DegenerateVariable {
                name: root.clone(),
                cardinality,
            });
        }

        let mut network = Network::new();
        let order: Vec<usize> = (0..n).collect();
        add_class_and_features(&mut network, data, &order)?;
        let class = data.class_name();
        for (i, feature) in features.iter().enumerate() {
            network.add_edge(class, feature)?;
            if i != self.root {
                network.add_edge(root, feature)?;
            }
        }
        Ok(network)
    }
}
