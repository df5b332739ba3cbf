//! Linear discriminant analysis with a shared (pooled) covariance matrix.
//!
//! Each class gets a linear score `x . w_c + b_c`, where
//! `w_c = S^+ mu_c` and `b_c = -mu_c . S^+ mu_c / 2 + ln(prior_c)`. `S^+` is
//! the pseudo-inverse of the pooled within-class covariance, so collinear
//! features (common after discretization) do not make the fit fail.
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;

use crate::config::{ModelConfig, ModelType};
use crate::data_handling::{ClassCounts, Diagnosis};
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_prediction_width, check_training_data, fit_error, wrong_params};

/// Discriminant of one class.
#[derive(Clone, Debug)]
struct ClassDiscriminant {
    coef: DVector<f64>,
    intercept: f64,
}

impl ClassDiscriminant {
    fn score(&self, row: &DVector<f64>) -> f64 {
        self.coef.dot(row) + self.intercept
    }
}

pub struct LdaClassifier {
    /// Indexed by `Diagnosis::index()`.
    discriminants: Option<[ClassDiscriminant; 2]>,
    n_features: usize,
    params: ModelConfig,
}

impl LdaClassifier {
    pub fn new(params: ModelConfig) -> Self {
        LdaClassifier {
            discriminants: None,
            n_features: 0,
            params,
        }
    }
}

fn class_mean(x: &Array2<f64>, y: &[Diagnosis], label: Diagnosis) -> DVector<f64> {
    let mut mean = DVector::<f64>::zeros(x.ncols());
    let mut n = 0usize;
    for (row, _) in x.outer_iter().zip(y).filter(|(_, l)| **l == label) {
        for (m, v) in mean.iter_mut().zip(row.iter()) {
            *m += v;
        }
        n += 1;
    }
    if n > 0 {
        mean /= n as f64;
    }
    mean
}

impl ClassifierModel for LdaClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[Diagnosis]) -> Result<()> {
        let ModelType::Lda { tolerance } = self.params.model_type else {
            return Err(wrong_params(&self.params.name, "lda"));
        };
        check_training_data(&self.params.name, x, y)?;

        let (n_samples, n_features) = x.dim();
        let counts = ClassCounts::from_labels(y);
        let means = Diagnosis::ALL.map(|label| class_mean(x, y, label));

        let mut scatter = DMatrix::<f64>::zeros(n_features, n_features);
        for (row, label) in x.outer_iter().zip(y) {
            let centered =
                DVector::from_iterator(n_features, row.iter().copied()) - &means[label.index()];
            scatter += &centered * centered.transpose();
        }
        let dof = n_samples.saturating_sub(2).max(1) as f64;
        let pooled = scatter / dof;

        let precision = pooled
            .pseudo_inverse(tolerance)
            .map_err(|e| fit_error(&self.params.name, e))?;
        if precision.iter().any(|v| !v.is_finite()) {
            return Err(fit_error(
                &self.params.name,
                "pooled covariance pseudo-inverse is not finite",
            ));
        }

        let discriminants = Diagnosis::ALL.map(|label| {
            let mean = &means[label.index()];
            let coef = &precision * mean;
            let prior = counts.get(label) as f64 / n_samples as f64;
            let intercept = -0.5 * mean.dot(&coef) + prior.ln();
            ClassDiscriminant { coef, intercept }
        });

        self.n_features = n_features;
        self.discriminants = Some(discriminants);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Diagnosis>> {
        let [benign, malignant] = self
            .discriminants
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.params.name.clone()))?;
        check_prediction_width(self.n_features, x)?;

        Ok(x
            .outer_iter()
            .map(|row| {
                let row = DVector::from_iterator(row.len(), row.iter().copied());
                if malignant.score(&row) > benign.score(&row) {
                    Diagnosis::Malignant
                } else {
                    Diagnosis::Benign
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.params.name
    }
}
