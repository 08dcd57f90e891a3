//! Averaged one-dependence estimators: one SPODE per feature, each feature in
//! turn acting as the super-parent.

use super::discretized::SpodeLd;
use super::ensemble::Ensemble;
use super::spode::Spode;
use super::{Classifier, ModelSummary};
use crate::dataset::{ContinuousDataset, Dataset, TrainingSet};
use crate::metrics::Metrics;
use crate::network::Result;
use log::{debug, info};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Below this total the features carry no usable information about the class.
const MIN_TOTAL_SIGNIFICANCE: f64 = 1e-12;

/// How member weights are derived when combining predictions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceMode {
    #[default]
    Uniform,
    /// I(super-parent; class).
    MutualInformation,
}

#[derive(Debug, Clone)]
pub struct Aode {
    ensemble: Ensemble<Spode>,
    significance: SignificanceMode,
}

impl Aode {
    pub fn new(predict_voting: bool) -> Self {
        Aode {
            ensemble: Ensemble::new(predict_voting),
            significance: SignificanceMode::default(),
        }
    }

    pub fn with_significance(mut self, significance: SignificanceMode) -> Self {
        self.significance = significance;
        self
    }

    pub fn ensemble(&self) -> &Ensemble<Spode> {
        &self.ensemble
    }

    fn significances(&self, data: &Dataset) -> Vec<f64> {
        let n = data.n_features();
        match self.significance {
            SignificanceMode::Uniform => vec![1.0; n],
            SignificanceMode::MutualInformation => {
                let mi = Metrics::new(data).class_mutual_information();
                if mi.iter().sum::<f64>() > MIN_TOTAL_SIGNIFICANCE {
                    mi
                } else {
                    debug!("all features independent of the class, using uniform significance");
                    vec![1.0; n]
                }
            }
        }
    }
}

impl Classifier for Aode {
    type Data = Dataset;
    type Value = usize;

    fn fit(&mut self, data: &Dataset) -> Result<()> {
        let models = (0..data.n_features()).map(Spode::new).collect();
        let significances = self.significances(data);
        info!("AODE: fitting {} one-dependence estimators", data.n_features());
        self.ensemble.fit_models(models, data, significances)
    }

    fn is_fitted(&self) -> bool {
        self.ensemble.is_fitted()
    }

    fn predict_proba(&self, samples: ArrayView2<'_, usize>) -> Result<Array2<f64>> {
        self.ensemble.predict_proba(samples)
    }

    fn predict(&self, samples: ArrayView2<'_, usize>) -> Result<Vec<usize>> {
        self.ensemble.predict(samples)
    }

    fn describe(&self) -> ModelSummary {
        self.ensemble.describe()
    }

    fn show(&self) -> Vec<String> {
        self.ensemble.show()
    }

    fn graph(&self, title: &str) -> Vec<String> {
        self.ensemble.graph(title)
    }
}

/// AODE on continuous input. Every member discretizes the data on its own
/// and refines the cuts against its own structure.
#[derive(Debug, Clone)]
pub struct AodeLd {
    ensemble: Ensemble<SpodeLd>,
}

impl AodeLd {
    pub fn new(predict_voting: bool) -> Self {
        AodeLd {
            ensemble: Ensemble::new(predict_voting),
        }
    }

    pub fn ensemble(&self) -> &Ensemble<SpodeLd> {
        &self.ensemble
    }
}

impl Classifier for AodeLd {
    type Data = ContinuousDataset;
    type Value = f64;

    fn fit(&mut self, data: &ContinuousDataset) -> Result<()> {
        let n = data.n_features();
        let models = (0..n).map(|i| SpodeLd::with_local_proposal(Spode::new(i))).collect();
        info!("AODELd: fitting {} locally discretized estimators", n);
        self.ensemble.fit_models(models, data, vec![1.0; n])
    }

    fn is_fitted(&self) -> bool {
        self.ensemble.is_fitted()
    }

    fn predict_proba(&self, samples: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.ensemble.predict_proba(samples)
    }

    fn predict(&self, samples: ArrayView2<'_, f64>) -> Result<Vec<usize>> {
        self.ensemble.predict(samples)
    }

    fn describe(&self) -> ModelSummary {
        self.ensemble.describe()
    }

    fn show(&self) -> Vec<String> {
        self.ensemble.show()
    }

    fn graph(&self, title: &str) -> Vec<String> {
        self.ensemble.graph(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::BayesNetError;
    use ndarray::{Array1, array};

    fn dataset(samples: Array2<usize>) -> Dataset {
        let labels = array![0, 1, 1, 0, 1, 0, 1, 0];
        Dataset::from_samples(
            samples,
            labels,
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            "class",
        )
        .unwrap()
    }

    fn samples() -> Array2<usize> {
        array![
            [0, 1, 1, 0],
            [1, 1, 0, 1],
            [1, 0, 1, 1],
            [0, 0, 0, 0],
            [1, 1, 1, 0],
            [0, 1, 0, 1],
            [1, 0, 0, 1],
            [0, 0, 1, 0]
        ]
    }

    #[test]
    fn test_one_member_per_feature() {
        let data = dataset(samples());
        let mut aode = Aode::new(true);
        aode.fit(&data).unwrap();
        assert_eq!(aode.ensemble().models().len(), 4);
        for (i, model) in aode.ensemble().models().iter().enumerate() {
            assert_eq!(model.structure().root(), i);
        }
        assert_eq!(aode.predict(data.samples()).unwrap().len(), 8);
    }

    #[test]
    fn test_members_not_rooted_at_a_feature_ignore_its_data() {
        let original = dataset(samples());
        let mut perturbed_samples = samples();
        perturbed_samples
            .column_mut(2)
            .assign(&Array1::from(vec![1, 0, 0, 1, 0, 1, 1, 0]));
        let perturbed = dataset(perturbed_samples);

        let mut first = Aode::new(false);
        first.fit(&original).unwrap();
        let mut second = Aode::new(false);
        second.fit(&perturbed).unwrap();

        let pairs = first.ensemble().models().iter().zip(second.ensemble().models());
        for (root, (a, b)) in pairs.enumerate() {
            if root == 2 {
                continue;
            }
            let (a, b) = (a.network().unwrap(), b.network().unwrap());
            for node in ["class", "a", "b", "d"] {
                assert_eq!(a.cpt(node).unwrap(), b.cpt(node).unwrap(), "root {} node {}", root, node);
            }
        }
    }

    #[test]
    fn test_mutual_information_significance() {
        let data = dataset(samples());
        let mut aode = Aode::new(true).with_significance(SignificanceMode::MutualInformation);
        aode.fit(&data).unwrap();
        let expected = Metrics::new(&data).class_mutual_information();
        for (got, want) in aode.ensemble().significances().iter().zip(&expected) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!((expected[0] - std::f64::consts::LN_2).abs() < 1e-9);
    }

    #[test]
    fn test_independent_features_fall_back_to_uniform() {
        let data = Dataset::from_samples(
            array![[0, 1], [0, 1], [1, 0], [1, 0]],
            array![0, 1, 0, 1],
            vec!["a".into(), "b".into()],
            "class",
        )
        .unwrap();
        let mut aode = Aode::new(true).with_significance(SignificanceMode::MutualInformation);
        aode.fit(&data).unwrap();
        assert_eq!(aode.ensemble().significances(), &[1.0, 1.0]);
    }

    #[test]
    fn test_degenerate_feature_aborts_ensemble() {
        let data = Dataset::from_samples(
            array![[0, 0], [1, 0], [1, 0]],
            array![0, 1, 1],
            vec!["a".into(), "constant".into()],
            "class",
        )
        .unwrap();
        let mut aode = Aode::new(true);
        let err = aode.fit(&data).unwrap_err();
        assert!(matches!(err, BayesNetError::DegenerateVariable { .. }));
        assert!(!aode.is_fitted());
    }

    #[test]
    fn test_aode_ld_on_continuous_input() {
        let labels: Array1<usize> = (0..10).map(|i| i % 2).collect();
        let samples = Array2::from_shape_fn((10, 3), |(i, j)| (i % 2) as f64 * 5.0 + (i + j) as f64 * 0.01);
        let data = ContinuousDataset::new(samples, labels, vec!["x".into(), "y".into(), "z".into()], "class")
            .unwrap();
        let mut aode = AodeLd::new(true);
        aode.fit(&data).unwrap();
        assert_eq!(aode.ensemble().models().len(), 3);
        assert_eq!(aode.score(data.samples(), data.labels()).unwrap(), 1.0);
    }
}
