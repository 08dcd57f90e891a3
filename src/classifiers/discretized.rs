use super::kdb::Kdb;
use super::proposal::Proposal;
use super::spode::Spode;
use super::{Classifier, ModelSummary, require_varying_class};
use crate::dataset::{ContinuousDataset, Dataset};
use crate::discretization::Mdlp;
use crate::network::{BayesNetError, Network, Result};
use log::info;
use ndarray::{Array2, ArrayView2};

/// Runs a discrete classifier on continuous input.
///
/// Fitting cuts every feature with MDLP against the class, fits the inner
/// classifier and, when the local proposal is enabled and the inner model is
/// a single network, refines the cuts of multi-parent features and
/// re-estimates the CPTs. The fitted discretizers then map raw samples to
/// codes at prediction time.
#[derive(Debug, Clone)]
pub struct Discretized<C> {
    classifier: C,
    local_proposal: bool,
    discretizers: Vec<Mdlp>,
    fitted: bool,
}

pub type KdbLd = Discretized<Kdb>;
pub type SpodeLd = Discretized<Spode>;

impl<C> Discretized<C>
where
    C: Classifier<Data = Dataset, Value = usize>,
{
    /// Global discretization only.
    pub fn new(classifier: C) -> Self {
        Discretized {
            classifier,
            local_proposal: false,
            discretizers: Vec::new(),
            fitted: false,
        }
    }

    pub fn with_local_proposal(classifier: C) -> Self {
        Discretized {
            local_proposal: true,
            ..Discretized::new(classifier)
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn discretizers(&self) -> &[Mdlp] {
        &self.discretizers
    }

    /// Maps raw samples to the codes the inner classifier was fitted on.
    pub fn transform(&self, samples: ArrayView2<'_, f64>) -> Result<Array2<usize>> {
        if !self.fitted {
            return Err(BayesNetError::NotFitted);
        }
        if samples.ncols() != self.discretizers.len() {
            return Err(BayesNetError::dimension(
                "sample width",
                self.discretizers.len(),
                samples.ncols(),
            ));
        }
        Ok(Array2::from_shape_fn(samples.dim(), |(i, j)| {
            self.discretizers[j].transform_value(samples[[i, j]])
        }))
    }
}

impl<C> Classifier for Discretized<C>
where
    C: Classifier<Data = Dataset, Value = usize>,
{
    type Data = ContinuousDataset;
    type Value = f64;

    fn fit(&mut self, data: &ContinuousDataset) -> Result<()> {
        self.fitted = false;
        require_varying_class(data)?;
        let mut proposal = Proposal::fit_local_discretization(data)?;
        self.classifier.fit(proposal.dataset())?;

        let refined = match self.classifier.network() {
            Some(network) if self.local_proposal => proposal.local_discretization_proposal(network)?,
            _ => Vec::new(),
        };
        if !refined.is_empty() {
            info!("re-estimating CPTs after refining {:?}", refined);
            self.classifier.refit(proposal.dataset())?;
        }

        self.discretizers = proposal.into_discretizers();
        self.fitted = true;
        Ok(())
    }

    fn is_fitted(&self) -> bool {
        self.fitted && self.classifier.is_fitted()
    }

    fn predict_proba(&self, samples: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        let codes = self.transform(samples)?;
        self.classifier.predict_proba(codes.view())
    }

    fn predict(&self, samples: ArrayView2<'_, f64>) -> Result<Vec<usize>> {
        let codes = self.transform(samples)?;
        self.classifier.predict(codes.view())
    }

    fn describe(&self) -> ModelSummary {
        self.classifier.describe()
    }

    fn show(&self) -> Vec<String> {
        self.classifier.show()
    }

    fn graph(&self, title: &str) -> Vec<String> {
        self.classifier.graph(title)
    }

    fn network(&self) -> Option<&Network> {
        self.classifier.network()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::TrainingSet;
    use ndarray::{Array1, array};

    fn separable(n: usize) -> ContinuousDataset {
        let labels: Array1<usize> = (0..n).map(|i| i % 2).collect();
        let samples = Array2::from_shape_fn((n, 3), |(i, j)| {
            (i % 2) as f64 * 10.0 + ((i * (j + 1)) % 5) as f64 * 0.1
        });
        ContinuousDataset::new(samples, labels, vec!["x0".into(), "x1".into(), "x2".into()], "class").unwrap()
    }

    #[test]
    fn test_kdb_ld_learns_separable_data() {
        let data = separable(12);
        let mut model = KdbLd::with_local_proposal(Kdb::new(2, 0.0));
        model.fit(&data).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.discretizers().len(), 3);
        assert_eq!(model.score(data.samples(), data.labels()).unwrap(), 1.0);
        let proba = model.predict_proba(array![[0.2, 0.1, 0.3], [10.1, 10.4, 10.0]].view()).unwrap();
        assert!(proba[[0, 0]] > 0.5);
        assert!(proba[[1, 1]] > 0.5);
    }

    #[test]
    fn test_not_fitted_and_width_checks() {
        let data = separable(8);
        let mut model = SpodeLd::with_local_proposal(Spode::new(0));
        assert_eq!(model.transform(data.samples()), Err(BayesNetError::NotFitted));
        model.fit(&data).unwrap();
        let err = model.predict(array![[1.0, 2.0]].view()).unwrap_err();
        assert!(matches!(err, BayesNetError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_constant_class_is_degenerate() {
        let samples = array![[1.0], [2.0], [3.0]];
        let data = ContinuousDataset::new(samples, array![0, 0, 0], vec!["x".into()], "class").unwrap();
        let mut model = Discretized::new(Kdb::default());
        assert!(matches!(
            model.fit(&data),
            Err(BayesNetError::DegenerateVariable { .. })
        ));
        assert!(!model.is_fitted());
    }
}
