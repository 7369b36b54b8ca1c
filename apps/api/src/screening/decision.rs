//! Selection decision: a pre-trained binary classifier over
//! (experience, skills count, quiz score).
//!
//! `AppState` holds an `Option<Arc<dyn DecisionModel>>`, loaded once at startup.
//! A missing or failing model never blocks a submission: the decision falls back
//! to "not selected" and the fallback is recorded.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::screening::provenance::Sourced;

pub const FEATURE_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("I/O error loading model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model file is malformed: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Model is invalid: {0}")]
    Invalid(String),

    #[error("Prediction failed: {0}")]
    Prediction(String),
}

/// Classifier inputs, in the order the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub experience: f64,
    pub skills: f64,
    pub quiz: f64,
}

impl Features {
    pub fn new(experience: i64, skills: i64, quiz: i64) -> Self {
        Self {
            experience: experience as f64,
            skills: skills as f64,
            quiz: quiz as f64,
        }
    }

    pub fn as_array(&self) -> [f64; FEATURE_COUNT] {
        [self.experience, self.skills, self.quiz]
    }
}

/// Implement this to swap classifier backends without touching handlers.
pub trait DecisionModel: Send + Sync {
    /// Returns the predicted class, 0 or 1.
    fn predict(&self, features: &Features) -> Result<u8, DecisionError>;
}

/// Logistic regression over standardised features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub means: [f64; FEATURE_COUNT],
    pub scales: [f64; FEATURE_COUNT],
    pub weights: [f64; FEATURE_COUNT],
    pub bias: f64,
}

impl LogisticModel {
    pub fn load(path: &Path) -> Result<Self, DecisionError> {
        let raw = std::fs::read_to_string(path)?;
        let model: LogisticModel = serde_json::from_str(&raw)?;
        model.validate()?;
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<(), DecisionError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), DecisionError> {
        let all_finite = self
            .means
            .iter()
            .chain(&self.scales)
            .chain(&self.weights)
            .chain(std::iter::once(&self.bias))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(DecisionError::Invalid("non-finite parameter".into()));
        }
        if self.scales.iter().any(|s| *s <= 0.0) {
            return Err(DecisionError::Invalid("feature scale must be positive".into()));
        }
        Ok(())
    }

    /// Probability of the positive class.
    pub fn probability(&self, features: &Features) -> f64 {
        let x = features.as_array();
        let z = (0..FEATURE_COUNT)
            .map(|i| self.weights[i] * (x[i] - self.means[i]) / self.scales[i])
            .sum::<f64>()
            + self.bias;
        sigmoid(z)
    }
}

impl DecisionModel for LogisticModel {
    fn predict(&self, features: &Features) -> Result<u8, DecisionError> {
        if features.as_array().iter().any(|v| !v.is_finite()) {
            return Err(DecisionError::Prediction("non-finite feature".into()));
        }
        Ok(u8::from(self.probability(features) >= 0.5))
    }
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Loads the model at startup. Absence is logged, not fatal.
pub fn load_decision_model(path: &Path) -> Option<Arc<dyn DecisionModel>> {
    match LogisticModel::load(path) {
        Ok(model) => {
            info!("Decision model loaded from {}", path.display());
            Some(Arc::new(model))
        }
        Err(e) => {
            error!(
                "Failed to load decision model from {}: {e}. Every candidate will default to not selected; run `api train` to create it.",
                path.display()
            );
            None
        }
    }
}

/// The selection flag for a candidate, 0 with `Source::Fallback` when no prediction is possible.
pub fn decide(model: Option<&dyn DecisionModel>, features: &Features) -> Sourced<i64> {
    let Some(model) = model else {
        error!("No decision model loaded; defaulting to not selected");
        return Sourced::fallback(0);
    };
    match model.predict(features) {
        Ok(class) => Sourced::model(i64::from(class)),
        Err(e) => {
            error!("Model prediction error: {e}; defaulting to not selected");
            Sourced::fallback(0)
        }
    }
}
