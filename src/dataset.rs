use crate::network::errors::{BayesNetError, Result};
use log::info;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// Read access shared by the discrete and the continuous training views.
///
/// Ensembles only need the label side of the data to size their vote buckets,
/// so they are generic over this trait rather than over a concrete matrix type.
pub trait TrainingSet: Sync {
    fn n_samples(&self) -> usize;
    fn n_features(&self) -> usize;
    fn features(&self) -> &[String];
    fn class_name(&self) -> &str;
    fn labels(&self) -> ArrayView1<'_, usize>;
    fn weights(&self) -> ArrayView1<'_, f64>;
    fn n_classes(&self) -> usize;
}

/// An `m x n` matrix of discrete codes plus labels, weights and the state
/// count of every variable.
///
/// The states of a variable are the codes `0..cardinality`. Cardinalities are
/// given up front so that states absent from the sample still get a CPT row.
#[derive(Debug, Clone)]
pub struct Dataset {
    samples: Array2<usize>,
    labels: Array1<usize>,
    weights: Array1<f64>,
    features: Vec<String>,
    class_name: String,
    states: BTreeMap<String, usize>,
}

impl Dataset {
    pub fn new(
        samples: Array2<usize>,
        labels: Array1<usize>,
        features: Vec<String>,
        class_name: &str,
        states: BTreeMap<String, usize>,
    ) -> Result<Self> {
        if labels.len() != samples.nrows() {
            return Err(BayesNetError::dimension("labels", samples.nrows(), labels.len()));
        }
        if features.len() != samples.ncols() {
            return Err(BayesNetError::dimension("feature names", samples.ncols(), features.len()));
        }
        check_unique_names(&features, class_name)?;

        let class_cardinality = lookup_cardinality(&states, class_name)?;
        for &label in labels.iter() {
            check_state(class_name, label, class_cardinality)?;
        }
        for (column, name) in samples.axis_iter(Axis(1)).zip(&features) {
            let cardinality = lookup_cardinality(&states, name)?;
            for &code in column.iter() {
                check_state(name, code, cardinality)?;
            }
        }

        let weights = Array1::ones(samples.nrows());
        Ok(Dataset {
            samples,
            labels,
            weights,
            features,
            class_name: class_name.to_string(),
            states,
        })
    }

    /// Builds a dataset whose cardinalities are inferred as `max(code) + 1`.
    pub fn from_samples(
        samples: Array2<usize>,
        labels: Array1<usize>,
        features: Vec<String>,
        class_name: &str,
    ) -> Result<Self> {
        if features.len() != samples.ncols() {
            return Err(BayesNetError::dimension("feature names", samples.ncols(), features.len()));
        }
        let mut states = BTreeMap::new();
        for (column, name) in samples.axis_iter(Axis(1)).zip(&features) {
            states.insert(name.clone(), inferred_cardinality(column));
        }
        states.insert(class_name.to_string(), inferred_cardinality(labels.view()));
        Self::new(samples, labels, features, class_name, states)
    }

    /// Replaces the default unit weights.
    pub fn with_weights(mut self, weights: Array1<f64>) -> Result<Self> {
        validate_weights(&weights, self.samples.nrows())?;
        self.weights = weights;
        Ok(self)
    }

    pub fn samples(&self) -> ArrayView2<'_, usize> {
        self.samples.view()
    }

    pub fn column(&self, feature: usize) -> ArrayView1<'_, usize> {
        self.samples.column(feature)
    }

    pub fn states(&self) -> &BTreeMap<String, usize> {
        &self.states
    }

    pub fn cardinality(&self, name: &str) -> Option<usize> {
        self.states.get(name).copied()
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }

    /// Overwrites the codes of one feature together with its state count.
    pub fn replace_feature(&mut self, feature: usize, codes: Array1<usize>, cardinality: usize) -> Result<()> {
        if feature >= self.features.len() {
            return Err(BayesNetError::dimension("feature index", self.features.len(), feature));
        }
        if codes.len() != self.samples.nrows() {
            return Err(BayesNetError::dimension("feature codes", self.samples.nrows(), codes.len()));
        }
        let name = &self.features[feature];
        for &code in codes.iter() {
            check_state(name, code, cardinality)?;
        }
        self.samples.column_mut(feature).assign(&codes);
        self.states.insert(name.clone(), cardinality);
        Ok(())
    }
}

impl TrainingSet for Dataset {
    fn n_samples(&self) -> usize {
        self.samples.nrows()
    }

    fn n_features(&self) -> usize {
        self.samples.ncols()
    }

    fn features(&self) -> &[String] {
        &self.features
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn labels(&self) -> ArrayView1<'_, usize> {
        self.labels.view()
    }

    fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    fn n_classes(&self) -> usize {
        self.states[&self.class_name]
    }
}

/// Raw feature values before discretization.
#[derive(Debug, Clone)]
pub struct ContinuousDataset {
    samples: Array2<f64>,
    labels: Array1<usize>,
    weights: Array1<f64>,
    features: Vec<String>,
    class_name: String,
}

impl ContinuousDataset {
    pub fn new(
        samples: Array2<f64>,
        labels: Array1<usize>,
        features: Vec<String>,
        class_name: &str,
    ) -> Result<Self> {
        if labels.len() != samples.nrows() {
            return Err(BayesNetError::dimension("labels", samples.nrows(), labels.len()));
        }
        if features.len() != samples.ncols() {
            return Err(BayesNetError::dimension("feature names", samples.ncols(), features.len()));
        }
        check_unique_names(&features, class_name)?;
        if let Some(bad) = samples.iter().find(|v| !v.is_finite()) {
            return Err(BayesNetError::InvalidConfig(format!(
                "sample values must be finite, found {}",
                bad
            )));
        }
        let weights = Array1::ones(samples.nrows());
        Ok(ContinuousDataset {
            samples,
            labels,
            weights,
            features,
            class_name: class_name.to_string(),
        })
    }

    pub fn with_weights(mut self, weights: Array1<f64>) -> Result<Self> {
        validate_weights(&weights, self.samples.nrows())?;
        self.weights = weights;
        Ok(self)
    }

    pub fn samples(&self) -> ArrayView2<'_, f64> {
        self.samples.view()
    }

    pub fn column(&self, feature: usize) -> ArrayView1<'_, f64> {
        self.samples.column(feature)
    }

    /// Reads a [`RawDataset`] JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| BayesNetError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        let raw: RawDataset = serde_json::from_str(&text)
            .map_err(|e| BayesNetError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        let data = raw.into_dataset()?;
        info!(
            "loaded {} samples with {} features from {}",
            data.n_samples(),
            data.n_features(),
            path.display()
        );
        Ok(data)
    }

    /// Shuffles the rows with a seeded generator and returns
    /// `(train, test)`, the test part holding `round(m * test_ratio)` rows.
    pub fn train_test_split(&self, test_ratio: f64, seed: u64) -> (Self, Self) {
        let mut rows: Vec<usize> = (0..self.n_samples()).collect();
        rows.shuffle(&mut StdRng::seed_from_u64(seed));
        let n_test = ((self.n_samples() as f64) * test_ratio.clamp(0.0, 1.0)).round() as usize;
        let (test, train) = rows.split_at(n_test);
        (self.select_rows(train), self.select_rows(test))
    }

    /// Copies the given rows, in the given order, into a new dataset.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        ContinuousDataset {
            samples: self.samples.select(Axis(0), rows),
            labels: self.labels.select(Axis(0), rows),
            weights: self.weights.select(Axis(0), rows),
            features: self.features.clone(),
            class_name: self.class_name.clone(),
        }
    }
}

impl TrainingSet for ContinuousDataset {
    fn n_samples(&self) -> usize {
        self.samples.nrows()
    }

    fn n_features(&self) -> usize {
        self.samples.ncols()
    }

    fn features(&self) -> &[String] {
        &self.features
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn labels(&self) -> ArrayView1<'_, usize> {
        self.labels.view()
    }

    fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    fn n_classes(&self) -> usize {
        inferred_cardinality(self.labels.view())
    }
}

/// Row-major serialized form of a [`ContinuousDataset`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDataset {
    pub features: Vec<String>,
    pub class_name: String,
    pub samples: Vec<Vec<f64>>,
    pub labels: Vec<usize>,
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

impl RawDataset {
    pub fn into_dataset(self) -> Result<ContinuousDataset> {
        let n_features = self.features.len();
        let n_samples = self.samples.len();
        let mut flat = Vec::with_capacity(n_samples * n_features);
        for row in &self.samples {
            if row.len() != n_features {
                return Err(BayesNetError::dimension("sample row", n_features, row.len()));
            }
            flat.extend_from_slice(row);
        }
        let samples = Array2::from_shape_vec((n_samples, n_features), flat)
            .map_err(|e| BayesNetError::InvalidConfig(e.to_string()))?;
        let dataset = ContinuousDataset::new(
            samples,
            Array1::from(self.labels),
            self.features,
            &self.class_name,
        )?;
        match self.weights {
            Some(weights) => dataset.with_weights(Array1::from(weights)),
            None => Ok(dataset),
        }
    }
}

fn inferred_cardinality(codes: ArrayView1<'_, usize>) -> usize {
    codes.iter().max().map_or(1, |&max| max + 1)
}

fn lookup_cardinality(states: &BTreeMap<String, usize>, name: &str) -> Result<usize> {
    match states.get(name) {
        None => Err(BayesNetError::UnknownNode(name.to_string())),
        Some(0) => Err(BayesNetError::DegenerateVariable {
            name: name.to_string(),
            cardinality: 0,
        }),
        Some(&cardinality) => Ok(cardinality),
    }
}

fn check_state(variable: &str, state: usize, cardinality: usize) -> Result<()> {
    if state >= cardinality {
        return Err(BayesNetError::InvalidState {
            variable: variable.to_string(),
            state,
            cardinality,
        });
    }
    Ok(())
}

fn check_unique_names(features: &[String], class_name: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for name in features.iter().map(String::as_str).chain(std::iter::once(class_name)) {
        if !seen.insert(name) {
            return Err(BayesNetError::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}

fn validate_weights(weights: &Array1<f64>, n_samples: usize) -> Result<()> {
    if weights.len() != n_samples {
        return Err(BayesNetError::dimension("weights", n_samples, weights.len()));
    }
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(BayesNetError::InvalidWeights(format!(
            "weights must be finite and non-negative, found {}",
            bad
        )));
    }
    Ok(())
}
