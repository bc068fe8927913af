//! # Logistic Regression
//!
//! Binary L2-regularized logistic regression with optional class-balanced
//! sample weights. Minimizes
//!
//! ```text
//! 0.5 * ||w||² + C * Σ s_i * logloss(y_i, w·x_i + b)
//! ```
//!
//! with a damped Newton method (Cholesky solve + backtracking line search).
//! The intercept is not penalized.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, ScamScopeError};
use crate::types::{Prediction, ScamLabel};

/// Ridge added to the intercept's curvature so the Hessian stays definite
/// when every sample is confidently classified.
const INTERCEPT_JITTER: f64 = 1e-10;
const ARMIJO: f64 = 1e-4;
const MAX_HALVINGS: usize = 40;

/// Per-class sample weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassWeight {
    /// Every sample weighs 1.
    Uniform,
    /// Weight `n / (2 * count_of_class)`, so both classes contribute equally.
    Balanced,
}

/// Solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticConfig {
    /// Inverse regularization strength.
    pub c: f64,
    /// Newton iteration cap.
    pub max_iter: usize,
    /// Stop when the largest gradient component falls below
    /// `tol * max(1, initial largest component)`.
    pub tol: f64,
    pub class_weight: ClassWeight,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-6,
            class_weight: ClassWeight::Balanced,
        }
    }
}

/// Outcome of a solver run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    pub converged: bool,
    pub objective: f64,
}

/// Fitted binary classifier. Class 1 is [`ScamLabel::Scam`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

/// Non-zero entries of one sample, ascending by column, intercept last.
struct SparseRow {
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseRow {
    fn new(row: &[f64]) -> Self {
        let mut indices = Vec::new();
        let mut values = Vec::new();
        for (j, &v) in row.iter().enumerate() {
            if v != 0.0 {
                indices.push(j);
                values.push(v);
            }
        }
        indices.push(row.len());
        values.push(1.0);
        Self { indices, values }
    }

    fn dot(&self, theta: &[f64]) -> f64 {
        self.indices
            .iter()
            .zip(&self.values)
            .map(|(&j, &v)| theta[j] * v)
            .sum()
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn sample_weights(y: &[ScamLabel], class_weight: ClassWeight) -> Result<Vec<f64>> {
    let mut counts = [0usize; ScamLabel::NUM_CLASSES];
    for label in y {
        counts[label.index()] += 1;
    }
    let present = counts.iter().filter(|&&c| c > 0).count();
    if present < ScamLabel::NUM_CLASSES {
        return Err(ScamScopeError::SingleClass { found: present });
    }
    Ok(match class_weight {
        ClassWeight::Uniform => vec![1.0; y.len()],
        ClassWeight::Balanced => {
            let n = y.len() as f64;
            let per_class: Vec<f64> = counts
                .iter()
                .map(|&c| n / (ScamLabel::NUM_CLASSES as f64 * c as f64))
                .collect();
            y.iter().map(|label| per_class[label.index()]).collect()
        }
    })
}

/// In-place Cholesky factorization of the lower triangle of a `p × p`
/// row-major matrix.
fn cholesky(a: &mut [f64], p: usize) -> Result<()> {
    for j in 0..p {
        let mut diag = a[j * p + j];
        for k in 0..j {
            diag -= a[j * p + k] * a[j * p + k];
        }
        if diag <= 0.0 || !diag.is_finite() {
            return Err(ScamScopeError::Model(
                "Hessian is not positive definite".into(),
            ));
        }
        let diag = diag.sqrt();
        a[j * p + j] = diag;
        for i in (j + 1)..p {
            let mut sum = a[i * p + j];
            for k in 0..j {
                sum -= a[i * p + k] * a[j * p + k];
            }
            a[i * p + j] = sum / diag;
        }
    }
    Ok(())
}

/// Solves `L Lᵀ x = b` given the factor from [`cholesky`].
fn cholesky_solve(l: &[f64], p: usize, b: &[f64]) -> Vec<f64> {
    let mut y = b.to_vec();
    for i in 0..p {
        let mut sum = y[i];
        for k in 0..i {
            sum -= l[i * p + k] * y[k];
        }
        y[i] = sum / l[i * p + i];
    }
    for i in (0..p).rev() {
        let mut sum = y[i];
        for k in (i + 1)..p {
            sum -= l[k * p + i] * y[k];
        }
        y[i] = sum / l[i * p + i];
    }
    y
}

struct Problem<'a> {
    rows: Vec<SparseRow>,
    targets: Vec<f64>,
    weights: Vec<f64>,
    n_features: usize,
    config: &'a LogisticConfig,
}

impl Problem<'_> {
    fn objective(&self, theta: &[f64]) -> f64 {
        let penalty = 0.5 * theta[..self.n_features].iter().map(|w| w * w).sum::<f64>();
        let loss: f64 = self
            .rows
            .iter()
            .zip(&self.targets)
            .zip(&self.weights)
            .map(|((row, &y), &s)| {
                let z = row.dot(theta);
                s * (softplus(z) - y * z)
            })
            .sum();
        penalty + self.config.c * loss
    }

    /// Gradient and lower-triangular Hessian at `theta`.
    fn derivatives(&self, theta: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let p = self.n_features + 1;
        let mut grad = vec![0.0; p];
        let mut hess = vec![0.0; p * p];
        let c = self.config.c;

        for ((row, &y), &s) in self.rows.iter().zip(&self.targets).zip(&self.weights) {
            let prob = sigmoid(row.dot(theta));
            let residual = c * s * (prob - y);
            let curvature = c * s * prob * (1.0 - prob);
            for (a, (&ia, &va)) in row.indices.iter().zip(&row.values).enumerate() {
                grad[ia] += residual * va;
                if curvature == 0.0 {
                    continue;
                }
                for (&ib, &vb) in row.indices[..=a].iter().zip(&row.values[..=a]) {
                    hess[ia * p + ib] += curvature * va * vb;
                }
            }
        }

        for j in 0..self.n_features {
            grad[j] += theta[j];
            hess[j * p + j] += 1.0;
        }
        hess[self.n_features * p + self.n_features] += INTERCEPT_JITTER;

        (grad, hess)
    }
}

impl LogisticRegression {
    /// Fits the classifier on dense feature rows.
    ///
    /// # Errors
    ///
    /// - `ScamScopeError::SingleClass` if `y` lacks one of the two classes.
    /// - `ScamScopeError::Model` on ragged input or a numerically singular system.
    pub fn fit(x: &[Vec<f64>], y: &[ScamLabel], config: &LogisticConfig) -> Result<(Self, FitReport)> {
        if x.len() != y.len() {
            return Err(ScamScopeError::Model(format!(
                "{} feature rows but {} labels",
                x.len(),
                y.len()
            )));
        }
        let n_features = x.first().map_or(0, Vec::len);
        if x.iter().any(|row| row.len() != n_features) {
            return Err(ScamScopeError::Model("feature rows have unequal length".into()));
        }
        let weights = sample_weights(y, config.class_weight)?;

        let problem = Problem {
            rows: x.iter().map(|row| SparseRow::new(row)).collect(),
            targets: y.iter().map(|label| label.index() as f64).collect(),
            weights,
            n_features,
            config,
        };

        let p = n_features + 1;
        let mut theta = vec![0.0; p];
        let mut objective = problem.objective(&theta);
        let mut threshold = None;
        let mut report = FitReport {
            iterations: 0,
            converged: false,
            objective,
        };

        for iteration in 0..config.max_iter {
            let (grad, mut hess) = problem.derivatives(&theta);
            let grad_max = grad.iter().fold(0.0f64, |m, g| m.max(g.abs()));
            let stop_at = *threshold.get_or_insert(config.tol * grad_max.max(1.0));
            debug!(iteration, objective, grad_max, "newton step");
            if grad_max <= stop_at {
                report.converged = true;
                break;
            }

            cholesky(&mut hess, p)?;
            let step = cholesky_solve(&hess, p, &grad);
            let decrement: f64 = grad.iter().zip(&step).map(|(g, s)| g * s).sum();

            let mut t = 1.0;
            let mut candidate = theta.clone();
            let mut accepted = false;
            for _ in 0..MAX_HALVINGS {
                for ((c, th), s) in candidate.iter_mut().zip(&theta).zip(&step) {
                    *c = th - t * s;
                }
                let value = problem.objective(&candidate);
                if value <= objective - ARMIJO * t * decrement {
                    objective = value;
                    accepted = true;
                    break;
                }
                t *= 0.5;
            }

            report.iterations = iteration + 1;
            if !accepted {
                // No descent possible at machine precision: treat as optimum.
                report.converged = true;
                break;
            }
            theta = candidate;
        }

        report.objective = objective;
        if !report.converged {
            warn!(
                iterations = report.iterations,
                "logistic regression did not converge; increase max_iter"
            );
        }

        let intercept = theta[n_features];
        theta.truncate(n_features);
        Ok((
            Self {
                coef: theta,
                intercept,
            },
            report,
        ))
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.coef.len()
    }

    /// Raw score `w·x + b`.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` if `row` has the wrong dimension.
    pub fn decision_function(&self, row: &[f64]) -> Result<f64> {
        if row.len() != self.coef.len() {
            return Err(ScamScopeError::Model(format!(
                "expected {} features, got {}",
                self.coef.len(),
                row.len()
            )));
        }
        Ok(self.coef.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + self.intercept)
    }

    /// `[P(Non-Scam), P(Scam)]` for one row.
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` if `row` has the wrong dimension.
    pub fn predict_proba(&self, row: &[f64]) -> Result<[f64; 2]> {
        let p = sigmoid(self.decision_function(row)?);
        Ok([1.0 - p, p])
    }

    /// Class with the higher probability; ties go to `NonScam`. Same rule as
    /// [`Prediction::from_scam_probability`].
    ///
    /// # Errors
    ///
    /// Returns `ScamScopeError::Model` if `row` has the wrong dimension.
    pub fn predict(&self, row: &[f64]) -> Result<ScamLabel> {
        let [_, p_scam] = self.predict_proba(row)?;
        Ok(Prediction::from_scam_probability(p_scam).prediction)
    }
}
