//! Hyperparameter parsing and the tagged set of learners the binaries use.

use super::aode::{Aode, AodeLd, SignificanceMode};
use super::discretized::{Discretized, KdbLd};
use super::kdb::{DEFAULT_K, DEFAULT_THETA, Kdb};
use super::spode::Spode;
use super::tan::Tan;
use super::{Classifier, ModelSummary};
use crate::dataset::ContinuousDataset;
use crate::network::{BayesNetError, Network, Result};
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_k() -> usize {
    DEFAULT_K
}

fn default_theta() -> f64 {
    DEFAULT_THETA
}

fn default_true() -> bool {
    true
}

/// `{"model": "kdb", "k": 2, "theta": 0.03}`. Missing keys take the
/// per-model defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelConfig {
    Kdb {
        #[serde(default = "default_k")]
        k: usize,
        #[serde(default = "default_theta")]
        theta: f64,
    },
    KdbLd {
        #[serde(default = "default_k")]
        k: usize,
        #[serde(default = "default_theta")]
        theta: f64,
    },
    Tan {
        #[serde(default)]
        root: usize,
    },
    Spode {
        #[serde(default)]
        root: usize,
    },
    Aode {
        #[serde(default)]
        predict_voting: bool,
        #[serde(default)]
        significance: SignificanceMode,
    },
    AodeLd {
        #[serde(default = "default_true")]
        predict_voting: bool,
    },
}

impl ModelConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ModelConfig = serde_json::from_str(json).map_err(|e| BayesNetError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Combines a model name with a JSON object of hyperparameters. An empty
    /// string means all defaults.
    pub fn from_parts(model: &str, hyperparameters: &str) -> Result<Self> {
        let mut value: Value = if hyperparameters.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(hyperparameters).map_err(|e| BayesNetError::InvalidConfig(e.to_string()))?
        };
        let object = value.as_object_mut().ok_or_else(|| {
            BayesNetError::InvalidConfig(format!("hyperparameters must be a JSON object, got {}", hyperparameters))
        })?;
        object.insert("model".to_string(), Value::String(model.to_lowercase()));
        let config: ModelConfig =
            serde_json::from_value(value).map_err(|e| BayesNetError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ModelConfig::Kdb { theta, .. } | ModelConfig::KdbLd { theta, .. } => {
                if !theta.is_finite() || *theta < 0.0 {
                    return Err(BayesNetError::InvalidConfig(format!(
                        "theta must be finite and non-negative, found {}",
                        theta
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn build(&self) -> Result<Model> {
        self.validate()?;
        let model = match *self {
            ModelConfig::Kdb { k, theta } => Model::Kdb(Discretized::new(Kdb::new(k, theta))),
            ModelConfig::KdbLd { k, theta } => Model::KdbLd(KdbLd::with_local_proposal(Kdb::new(k, theta))),
            ModelConfig::Tan { root } => Model::Tan(Discretized::new(Tan::new(root))),
            ModelConfig::Spode { root } => Model::Spode(Discretized::new(Spode::new(root))),
            ModelConfig::Aode {
                predict_voting,
                significance,
            } => Model::Aode(Discretized::new(
                Aode::new(predict_voting).with_significance(significance),
            )),
            ModelConfig::AodeLd { predict_voting } => Model::AodeLd(AodeLd::new(predict_voting)),
        };
        Ok(model)
    }
}

/// Every learner, behind the continuous-input interface. Discrete learners
/// are wrapped in a class-supervised discretization.
#[derive(Debug, Clone)]
pub enum Model {
    Kdb(Discretized<Kdb>),
    KdbLd(KdbLd),
    Tan(Discretized<Tan>),
    Spode(Discretized<Spode>),
    Aode(Discretized<Aode>),
    AodeLd(AodeLd),
}

impl Model {
    pub fn name(&self) -> &'static str {
        match self {
            Model::Kdb(_) => "KDB",
            Model::KdbLd(_) => "KDBLd",
            Model::Tan(_) => "TAN",
            Model::Spode(_) => "SPODE",
            Model::Aode(_) => "AODE",
            Model::AodeLd(_) => "AODELd",
        }
    }

    fn as_classifier(&self) -> &dyn Classifier<Data = ContinuousDataset, Value = f64> {
        match self {
            Model::Kdb(m) => m,
            Model::KdbLd(m) => m,
            Model::Tan(m) => m,
            Model::Spode(m) => m,
            Model::Aode(m) => m,
            Model::AodeLd(m) => m,
        }
    }

    fn as_classifier_mut(&mut self) -> &mut dyn Classifier<Data = ContinuousDataset, Value = f64> {
        match self {
            Model::Kdb(m) => m,
            Model::KdbLd(m) => m,
            Model::Tan(m) => m,
            Model::Spode(m) => m,
            Model::Aode(m) => m,
            Model::AodeLd(m) => m,
        }
    }
}

impl Classifier for Model {
    type Data = ContinuousDataset;
    type Value = f64;

    fn fit(&mut self, data: &ContinuousDataset) -> Result<()> {
        self.as_classifier_mut().fit(data)
    }

    fn is_fitted(&self) -> bool {
        self.as_classifier().is_fitted()
    }

    fn predict_proba(&self, samples: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.as_classifier().predict_proba(samples)
    }

    fn predict(&self, samples: ArrayView2<'_, f64>) -> Result<Vec<usize>> {
        self.as_classifier().predict(samples)
    }

    fn describe(&self) -> ModelSummary {
        self.as_classifier().describe()
    }

    fn show(&self) -> Vec<String> {
        self.as_classifier().show()
    }

    fn graph(&self, title: &str) -> Vec<String> {
        self.as_classifier().graph(title)
    }

    fn network(&self) -> Option<&Network> {
        self.as_classifier().network()
    }
}
