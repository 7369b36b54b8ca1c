//! Offline training for the decision model (`api train`).
//!
//! Synthetic hiring data: experience 0..=20, skills 1..=20, quiz 30..=100,
//! latent score `2·exp + 3·skills + 0.8·quiz + N(0, 15)`, labelled positive at
//! or above the 65th percentile (about 35% selected). A fixed seed makes the
//! dataset, and therefore the fitted model, reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::screening::decision::{sigmoid, Features, LogisticModel, FEATURE_COUNT};

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SAMPLES: usize = 1000;
const NOISE_STD_DEV: f64 = 15.0;
const SELECTION_PERCENTILE: f64 = 65.0;
const LEARNING_RATE: f64 = 0.1;
const EPOCHS: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub features: Features,
    pub selected: u8,
}

/// Standard normal draw via Box–Muller.
fn standard_normal(rng: &mut StdRng) -> f64 {
    // 1 - U keeps the log argument in (0, 1].
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Linear-interpolation percentile of `values` (0 – 100).
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

pub fn generate_synthetic_data(samples: usize, seed: u64) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);

    let features: Vec<Features> = (0..samples)
        .map(|_| {
            Features::new(
                rng.random_range(0..=20),
                rng.random_range(1..=20),
                rng.random_range(30..=100),
            )
        })
        .collect();

    let scores: Vec<f64> = features
        .iter()
        .map(|f| {
            f.experience * 2.0
                + f.skills * 3.0
                + f.quiz * 0.8
                + standard_normal(&mut rng) * NOISE_STD_DEV
        })
        .collect();

    let threshold = percentile(&scores, SELECTION_PERCENTILE);

    features
        .into_iter()
        .zip(scores)
        .map(|(features, score)| Sample {
            features,
            selected: u8::from(score >= threshold),
        })
        .collect()
}

/// Full-batch gradient descent on standardised features. Deterministic.
pub fn fit_logistic(samples: &[Sample]) -> LogisticModel {
    let n = samples.len().max(1) as f64;
    let rows: Vec<[f64; FEATURE_COUNT]> = samples.iter().map(|s| s.features.as_array()).collect();

    let mut means = [0.0; FEATURE_COUNT];
    let mut scales = [1.0; FEATURE_COUNT];
    for j in 0..FEATURE_COUNT {
        means[j] = rows.iter().map(|r| r[j]).sum::<f64>() / n;
        let variance = rows.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / n;
        if variance > 0.0 {
            scales[j] = variance.sqrt();
        }
    }

    let standardized: Vec<[f64; FEATURE_COUNT]> = rows
        .iter()
        .map(|r| {
            let mut z = [0.0; FEATURE_COUNT];
            for j in 0..FEATURE_COUNT {
                z[j] = (r[j] - means[j]) / scales[j];
            }
            z
        })
        .collect();

    let mut weights = [0.0; FEATURE_COUNT];
    let mut bias = 0.0;

    for _ in 0..EPOCHS {
        let mut grad_w = [0.0; FEATURE_COUNT];
        let mut grad_b = 0.0;
        for (x, sample) in standardized.iter().zip(samples) {
            let z = (0..FEATURE_COUNT).map(|j| weights[j] * x[j]).sum::<f64>() + bias;
            let err = sigmoid(z) - f64::from(sample.selected);
            for j in 0..FEATURE_COUNT {
                grad_w[j] += err * x[j];
            }
            grad_b += err;
        }
        for j in 0..FEATURE_COUNT {
            weights[j] -= LEARNING_RATE * grad_w[j] / n;
        }
        bias -= LEARNING_RATE * grad_b / n;
    }

    LogisticModel {
        means,
        scales,
        weights,
        bias,
    }
}

/// Fraction of samples the model classifies correctly.
pub fn accuracy(model: &LogisticModel, samples: &[Sample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let correct = samples
        .iter()
        .filter(|s| u8::from(model.probability(&s.features) >= 0.5) == s.selected)
        .count();
    correct as f64 / samples.len() as f64
}
