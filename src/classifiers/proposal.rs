//! Local discretization proposal.
//!
//! The raw features are first cut against the class alone. Once a structure
//! is known, every feature with two or more non-class parents is cut again
//! against the joint of the class and its parents' current codes.

use crate::dataset::{ContinuousDataset, Dataset, TrainingSet};
use crate::discretization::{Mdlp, factorize};
use crate::network::{BayesNetError, Network, Result};
use log::{debug, info};
use ndarray::{Array1, Array2};
use std::collections::BTreeMap;

/// Discretizer state scoped to one fit: the raw data, one discretizer per
/// feature and the discrete view they currently produce.
#[derive(Debug)]
pub struct Proposal<'a> {
    data: &'a ContinuousDataset,
    discretizers: Vec<Mdlp>,
    discrete: Dataset,
}

impl<'a> Proposal<'a> {
    /// Fits one discretizer per feature against the class labels.
    pub fn fit_local_discretization(data: &'a ContinuousDataset) -> Result<Self> {
        let labels = data.labels();
        let mut samples = Array2::zeros((data.n_samples(), data.n_features()));
        let mut states = BTreeMap::new();
        let mut discretizers = Vec::with_capacity(data.n_features());
        for (i, name) in data.features().iter().enumerate() {
            let mut mdlp = Mdlp::new();
            mdlp.fit(data.column(i), labels)?;
            samples.column_mut(i).assign(&mdlp.transform(data.column(i)));
            debug!("{}: {} states after initial discretization", name, mdlp.n_states());
            states.insert(name.clone(), mdlp.n_states());
            discretizers.push(mdlp);
        }
        states.insert(data.class_name().to_string(), data.n_classes());

        let discrete = Dataset::new(
            samples,
            labels.to_owned(),
            data.features().to_vec(),
            data.class_name(),
            states,
        )?
        .with_weights(data.weights().to_owned())?;
        Ok(Proposal {
            data,
            discretizers,
            discrete,
        })
    }

    /// The discrete view produced by the current discretizers.
    pub fn dataset(&self) -> &Dataset {
        &self.discrete
    }

    pub fn discretizers(&self) -> &[Mdlp] {
        &self.discretizers
    }

    /// Single refinement pass in topological order. Returns the features
    /// whose codes were replaced; their CPTs must be re-estimated.
    pub fn local_discretization_proposal(&mut self, network: &Network) -> Result<Vec<String>> {
        let class = network.class_name();
        let mut refined = Vec::new();
        for name in network.topological_order()? {
            if class == Some(name.as_str()) {
                continue;
            }
            let parents: Vec<usize> = network
                .parents(&name)?
                .into_iter()
                .filter(|&p| Some(p) != class)
                .map(|p| self.feature_index(p))
                .collect::<Result<_>>()?;
            if parents.len() < 2 {
                continue;
            }
            let index = self.feature_index(&name)?;
            let joint = self.joint_labels(&parents);
            let mdlp = &mut self.discretizers[index];
            mdlp.fit(self.data.column(index), joint.view())?;
            let codes = mdlp.transform(self.data.column(index));
            let n_states = mdlp.n_states();
            debug!("{}: re-discretized on {} parents into {} states", name, parents.len(), n_states);
            self.discrete.replace_feature(index, codes, n_states)?;
            refined.push(name);
        }
        info!("local discretization refined {} features", refined.len());
        Ok(refined)
    }

    pub fn into_discretizers(self) -> Vec<Mdlp> {
        self.discretizers
    }

    /// Per-sample tuple (class, parent codes...) factorized to dense codes.
    fn joint_labels(&self, parents: &[usize]) -> Array1<usize> {
        let labels = self.discrete.labels();
        let keys: Vec<Vec<usize>> = (0..self.discrete.n_samples())
            .map(|row| {
                std::iter::once(labels[row])
                    .chain(parents.iter().map(|&p| self.discrete.samples()[[row, p]]))
                    .collect()
            })
            .collect();
        factorize(&keys)
    }

    fn feature_index(&self, name: &str) -> Result<usize> {
        self.discrete
            .feature_index(name)
            .ok_or_else(|| BayesNetError::UnknownNode(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn continuous() -> ContinuousDataset {
        ContinuousDataset::new(
            array![
                [1.0, 1.0, 1.0],
                [1.5, 2.0, 2.0],
                [2.0, 1.5, 3.0],
                [2.5, 2.5, 4.0],
                [10.0, 10.0, 10.0],
                [10.5, 11.0, 11.0],
                [11.0, 10.5, 12.0],
                [11.5, 11.5, 13.0]
            ],
            Array1::from(vec![0, 0, 0, 0, 1, 1, 1, 1]),
            vec!["x0".into(), "x1".into(), "x2".into()],
            "class",
        )
        .unwrap()
    }

    fn network(edges: &[(&str, &str)]) -> Network {
        let mut network = Network::new();
        network.add_node("class", 2).unwrap();
        network.set_class("class").unwrap();
        for name in ["x0", "x1", "x2"] {
            network.add_node(name, 2).unwrap();
            network.add_edge("class", name).unwrap();
        }
        for (p, c) in edges {
            network.add_edge(p, c).unwrap();
        }
        network
    }

    #[test]
    fn test_initial_discretization_against_class() {
        let data = continuous();
        let proposal = Proposal::fit_local_discretization(&data).unwrap();
        let discrete = proposal.dataset();
        assert_eq!(discrete.cardinality("class"), Some(2));
        for (i, name) in ["x0", "x1", "x2"].iter().enumerate() {
            assert_eq!(discrete.cardinality(name), Some(proposal.discretizers()[i].n_states()));
            assert_eq!(discrete.column(i).to_vec(), vec![0, 0, 0, 0, 1, 1, 1, 1]);
        }
    }

    #[test]
    fn test_only_nodes_with_two_feature_parents_are_refined() {
        let data = continuous();
        let mut proposal = Proposal::fit_local_discretization(&data).unwrap();
        let before = proposal.dataset().column(0).to_owned();
        let refined = proposal
            .local_discretization_proposal(&network(&[("x0", "x2"), ("x1", "x2")]))
            .unwrap();
        assert_eq!(refined, vec!["x2".to_string()]);
        assert_eq!(proposal.dataset().column(0), before);
        let discretizers = proposal.into_discretizers();
        assert_eq!(discretizers.len(), 3);
    }

    #[test]
    fn test_single_feature_parent_is_left_alone() {
        let data = continuous();
        let mut proposal = Proposal::fit_local_discretization(&data).unwrap();
        let refined = proposal.local_discretization_proposal(&network(&[("x0", "x2")])).unwrap();
        assert!(refined.is_empty());
    }

    #[test]
    fn test_refined_states_match_discretizer() {
        let data = continuous();
        let mut proposal = Proposal::fit_local_discretization(&data).unwrap();
        proposal
            .local_discretization_proposal(&network(&[("x0", "x2"), ("x1", "x2")]))
            .unwrap();
        let states = proposal.discretizers()[2].n_states();
        assert_eq!(proposal.dataset().cardinality("x2"), Some(states));
        assert!(proposal.dataset().column(2).iter().all(|&c| c < states));
    }
}
