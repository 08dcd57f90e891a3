use super::{Classifier, ModelSummary, voting};
use crate::dataset::TrainingSet;
use crate::network::{BayesNetError, Result};
use log::info;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rayon::prelude::*;

/// An ordered list of independently fitted members, each with a significance
/// used when their predictions are combined.
///
/// Members are fitted and queried on rayon worker threads. Each member owns
/// its CPTs and only reads the shared training data, so the join after the
/// parallel section is the only synchronization point.
#[derive(Debug, Clone)]
pub struct Ensemble<M> {
    models: Vec<M>,
    significances: Vec<f64>,
    predict_voting: bool,
    n_classes: usize,
    fitted: bool,
}

impl<M: Classifier> Ensemble<M> {
    /// With `predict_voting` the members vote with their labels; otherwise
    /// their probabilities are averaged.
    pub fn new(predict_voting: bool) -> Self {
        Ensemble {
            models: Vec::new(),
            significances: Vec::new(),
            predict_voting,
            n_classes: 0,
            fitted: false,
        }
    }

    pub fn models(&self) -> &[M] {
        &self.models
    }

    pub fn significances(&self) -> &[f64] {
        &self.significances
    }

    pub fn predict_voting(&self) -> bool {
        self.predict_voting
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Fits every member in parallel and replaces the previous members only
    /// if all of them succeed. The first failure aborts the whole fit.
    pub fn fit_models(&mut self, mut models: Vec<M>, data: &M::Data, significances: Vec<f64>) -> Result<()> {
        self.fitted = false;
        if models.is_empty() {
            return Err(BayesNetError::InvalidConfig(
                "an ensemble needs at least one member".to_string(),
            ));
        }
        if significances.len() != models.len() {
            return Err(BayesNetError::dimension("significances", models.len(), significances.len()));
        }
        models.par_iter_mut().try_for_each(|model| model.fit(data))?;
        info!("ensemble fitted with {} members", models.len());
        self.models = models;
        self.significances = significances;
        self.n_classes = data.n_classes();
        self.fitted = true;
        Ok(())
    }

    /// `m x num_models` matrix of the class state each member predicts.
    pub fn votes(&self, samples: ArrayView2<'_, M::Value>) -> Result<Array2<usize>> {
        self.require_fitted()?;
        let columns: Vec<Vec<usize>> = self
            .models
            .par_iter()
            .map(|model| model.predict(samples))
            .collect::<Result<_>>()?;
        let mut votes = Array2::zeros((samples.nrows(), self.models.len()));
        for (mut column, predicted) in votes.axis_iter_mut(Axis(1)).zip(columns) {
            column.assign(&Array1::from(predicted));
        }
        Ok(votes)
    }

    pub fn predict_proba(&self, samples: ArrayView2<'_, M::Value>) -> Result<Array2<f64>> {
        self.require_fitted()?;
        if self.predict_voting {
            let votes = self.votes(samples)?;
            let mut scores = voting::vote_scores(votes.view(), &self.significances, self.n_classes);
            voting::normalize_rows(&mut scores);
            return Ok(scores);
        }
        let probabilities: Vec<Array2<f64>> = self
            .models
            .par_iter()
            .map(|model| model.predict_proba(samples))
            .collect::<Result<_>>()?;
        voting::average_probabilities(&probabilities, &self.significances).ok_or(BayesNetError::NotFitted)
    }

    pub fn predict(&self, samples: ArrayView2<'_, M::Value>) -> Result<Vec<usize>> {
        self.require_fitted()?;
        if self.predict_voting {
            let votes = self.votes(samples)?;
            return Ok(voting::vote(votes.view(), &self.significances, self.n_classes));
        }
        let proba = self.predict_proba(samples)?;
        Ok(proba.axis_iter(Axis(0)).map(voting::argmax).collect())
    }

    pub fn describe(&self) -> ModelSummary {
        self.models
            .iter()
            .map(Classifier::describe)
            .fold(ModelSummary::default(), |acc, s| acc + s)
    }

    pub fn show(&self) -> Vec<String> {
        self.models.iter().flat_map(Classifier::show).collect()
    }

    pub fn graph(&self, title: &str) -> Vec<String> {
        self.models
            .iter()
            .enumerate()
            .flat_map(|(i, model)| model.graph(&format!("{}_{}", title, i)))
            .collect()
    }

    fn require_fitted(&self) -> Result<()> {
        if !self.fitted {
            return Err(BayesNetError::NotFitted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::spode::Spode;
    use crate::dataset::Dataset;
    use ndarray::array;

    fn dataset() -> Dataset {
        Dataset::from_samples(
            array![[0, 1, 1], [1, 0, 1], [1, 1, 0], [0, 0, 0], [1, 1, 1], [0, 0, 1]],
            array![0, 1, 1, 0, 1, 0],
            vec!["a".into(), "b".into(), "c".into()],
            "class",
        )
        .unwrap()
    }

    #[test]
    fn test_not_fitted() {
        let ensemble: Ensemble<Spode> = Ensemble::new(true);
        let samples = array![[0, 1, 1]];
        assert_eq!(ensemble.predict(samples.view()), Err(BayesNetError::NotFitted));
    }

    #[test]
    fn test_vote_matrix_shape() {
        let data = dataset();
        let mut ensemble = Ensemble::new(true);
        let models = vec![Spode::new(0), Spode::new(1), Spode::new(2)];
        ensemble.fit_models(models, &data, vec![1.0; 3]).unwrap();
        let votes = ensemble.votes(data.samples()).unwrap();
        assert_eq!(votes.shape(), &[6, 3]);
        let proba = ensemble.predict_proba(data.samples()).unwrap();
        for row in proba.axis_iter(Axis(0)) {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
        assert_eq!(ensemble.describe().nodes, 12);
    }

    #[test]
    fn test_member_failure_aborts_fit() {
        let data = dataset();
        let mut ensemble = Ensemble::new(false);
        ensemble
            .fit_models(vec![Spode::new(0), Spode::new(1)], &data, vec![1.0; 2])
            .unwrap();
        let err = ensemble
            .fit_models(vec![Spode::new(0), Spode::new(7)], &data, vec![1.0; 2])
            .unwrap_err();
        assert!(matches!(err, BayesNetError::DimensionMismatch { .. }));
        assert!(!ensemble.is_fitted());
        assert_eq!(ensemble.predict(data.samples()), Err(BayesNetError::NotFitted));
    }

    #[test]
    fn test_significance_length_checked() {
        let data = dataset();
        let mut ensemble = Ensemble::new(true);
        let err = ensemble.fit_models(vec![Spode::new(0)], &data, vec![]).unwrap_err();
        assert!(matches!(err, BayesNetError::DimensionMismatch { .. }));
    }
}
