use super::{BayesNetClassifier, StructureLearner, add_class_and_features};
use crate::dataset::{Dataset, TrainingSet};
use crate::metrics::{Metrics, maximum_spanning_tree};
use crate::network::{BayesNetError, Network, Result};
use log::debug;

/// Tree-augmented naive Bayes: the class is a parent of every feature and the
/// features form the maximum spanning tree of I(Xi; Xj | class), directed away
/// from `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TanStructure {
    root: usize,
}

pub type Tan = BayesNetClassifier<TanStructure>;

impl Tan {
    pub fn new(root: usize) -> Self {
        BayesNetClassifier::with_structure(TanStructure { root })
    }
}

impl StructureLearner for TanStructure {
    fn name(&self) -> &'static str {
        "TAN"
    }

    fn learn_structure(&self, data: &Dataset) -> Result<Network> {
        let n = data.n_features();
        if n > 0 && self.root >= n {
            return Err(BayesNetError::dimension("tree root index", n, self.root));
        }
        let mut network = Network::new();
        let order: Vec<usize> = (0..n).collect();
        add_class_and_features(&mut network, data, &order)?;
        let features = data.features();
        for feature in features {
            network.add_edge(data.class_name(), feature)?;
        }
        let weights = Metrics::new(data).conditional_edge_weights();
        for (parent, child) in maximum_spanning_tree(weights.view(), self.root) {
            debug!("TAN edge {} -> {}", features[parent], features[child]);
            network.add_edge(&features[parent], &features[child])?;
        }
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::Classifier;
    use ndarray::array;

    #[test]
    fn test_tree_spans_all_features() {
        let data = Dataset::from_samples(
            array![[0, 0, 1, 0], [1, 1, 0, 1], [1, 1, 1, 0], [0, 0, 0, 1], [1, 0, 1, 1], [0, 1, 0, 0]],
            array![0, 1, 1, 0, 1, 0],
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            "class",
        )
        .unwrap();
        let mut tan = Tan::new(0);
        tan.fit(&data).unwrap();
        let network = tan.network().unwrap();
        // n class edges plus n - 1 tree edges
        assert_eq!(network.num_edges(), 7);
        assert_eq!(network.parents("a").unwrap(), vec!["class"]);
        for feature in ["b", "c", "d"] {
            assert_eq!(network.parents(feature).unwrap().len(), 2);
        }
        let proba = tan.predict_proba(data.samples()).unwrap();
        assert_eq!(proba.shape(), &[6, 2]);
    }
}
