//! Variance-ranked projection (principal component analysis).
//!
//! The covariance matrix of the training data is decomposed with a symmetric
//! eigen solver; the eigenvectors with the largest eigenvalues become the
//! projection basis.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::{check_width, FittedTransform, Transform};
use crate::error::{PipelineError, Result};

/// Convergence tolerance and iteration cap of the eigen solver.
const EIGEN_EPS: f64 = 1e-12;
const EIGEN_MAX_ITER: usize = 10_000;

#[derive(Clone, Copy, Debug)]
pub struct Pca {
    pub n_components: usize,
}

impl Pca {
    pub fn new(n_components: usize) -> Self {
        Self { n_components }
    }
}

impl Default for Pca {
    fn default() -> Self {
        Self::new(10)
    }
}

/// One retained principal component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrincipalComponent {
    /// 0-based rank by explained variance.
    pub index: usize,
    /// Unit-length loading vector over the input features.
    pub weights: Vec<f64>,
    /// Eigenvalue of the training covariance matrix.
    pub explained_variance: f64,
    /// Eigenvalue divided by the sum of all eigenvalues.
    pub explained_variance_ratio: f64,
}

/// Fitted projection: training mean and the retained basis.
#[derive(Clone, Debug, PartialEq)]
pub struct PcaModel {
    mean: Array1<f64>,
    /// Shape: (n_features, n_components); column `i` is component `i`.
    basis: Array2<f64>,
    explained_variance: Vec<f64>,
    explained_variance_ratio: Vec<f64>,
    condition_estimate: f64,
}

impl Transform for Pca {
    type Fitted = PcaModel;

    fn fit(&self, x: ArrayView2<f64>) -> Result<PcaModel> {
        let (n_samples, n_features) = x.dim();
        if n_samples < 2 || n_features == 0 {
            return Err(PipelineError::EmptyDataset("pca (needs at least 2 samples)"));
        }
        if self.n_components == 0 || self.n_components > n_samples.min(n_features) {
            return Err(PipelineError::config(format!(
                "n_components must lie in [1, {}] for a {}x{} matrix, got {}",
                n_samples.min(n_features),
                n_samples,
                n_features,
                self.n_components
            )));
        }

        let mean = x
            .mean_axis(Axis(0))
            .ok_or(PipelineError::EmptyDataset("pca"))?;
        let centered = &x - &mean;
        let cov = centered.t().dot(&centered) / (n_samples as f64 - 1.0);

        let condition_estimate = diagonal_condition(&cov);
        if cov.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::NumericalInstability {
                condition_estimate,
                detail: "covariance matrix contains non-finite values".to_string(),
            });
        }

        let matrix = DMatrix::from_fn(n_features, n_features, |i, j| cov[(i, j)]);
        let eigen = SymmetricEigen::try_new(matrix, EIGEN_EPS, EIGEN_MAX_ITER).ok_or_else(|| {
            PipelineError::NumericalInstability {
                condition_estimate,
                detail: format!(
                    "symmetric eigen solver did not converge within {} iterations",
                    EIGEN_MAX_ITER
                ),
            }
        })?;

        if eigen.eigenvalues.iter().any(|v| !v.is_finite())
            || eigen.eigenvectors.iter().any(|v| !v.is_finite())
        {
            return Err(PipelineError::NumericalInstability {
                condition_estimate,
                detail: "eigendecomposition produced non-finite values".to_string(),
            });
        }

        // Rounding can leave tiny negative eigenvalues on a singular matrix.
        let eigenvalues: Vec<f64> = eigen.eigenvalues.iter().map(|v| v.max(0.0)).collect();
        let total: f64 = eigenvalues.iter().sum();
        if total <= 0.0 {
            return Err(PipelineError::NumericalInstability {
                condition_estimate,
                detail: "training data has zero total variance".to_string(),
            });
        }

        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]).then(a.cmp(&b)));

        let mut basis = Array2::<f64>::zeros((n_features, self.n_components));
        let mut explained_variance = Vec::with_capacity(self.n_components);
        for (slot, &idx) in order.iter().take(self.n_components).enumerate() {
            let column = eigen.eigenvectors.column(idx);
            let sign = dominant_sign(column.iter().copied());
            for (row, w) in column.iter().enumerate() {
                basis[(row, slot)] = sign * w;
            }
            explained_variance.push(eigenvalues[idx]);
        }
        let explained_variance_ratio = explained_variance.iter().map(|v| v / total).collect();

        let smallest = eigenvalues
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let condition_estimate = if smallest > 0.0 {
            eigenvalues[order[0]] / smallest
        } else {
            f64::INFINITY
        };

        log::debug!(
            "PCA kept {} of {} components, condition estimate {:.3e}",
            self.n_components,
            n_features,
            condition_estimate
        );

        Ok(PcaModel {
            mean,
            basis,
            explained_variance,
            explained_variance_ratio,
            condition_estimate,
        })
    }
}

/// Sign that makes the largest-magnitude entry positive (first one on ties).
fn dominant_sign(values: impl Iterator<Item = f64>) -> f64 {
    let mut best = 0.0f64;
    for v in values {
        if v.abs() > best.abs() {
            best = v;
        }
    }
    if best < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Ratio of the largest to the smallest variance on the diagonal; a cheap
/// stand-in when the eigenvalues are unavailable.
fn diagonal_condition(cov: &Array2<f64>) -> f64 {
    let diag = cov.diag();
    let max = diag.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = diag.iter().copied().fold(f64::INFINITY, f64::min);
    if min > 0.0 {
        max / min
    } else {
        f64::INFINITY
    }
}

impl PcaModel {
    pub fn n_components(&self) -> usize {
        self.basis.ncols()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    /// Largest over smallest eigenvalue of the training covariance.
    pub fn condition_estimate(&self) -> f64 {
        self.condition_estimate
    }

    pub fn components(&self) -> Vec<PrincipalComponent> {
        (0..self.n_components())
            .map(|i| PrincipalComponent {
                index: i,
                weights: self.basis.column(i).to_vec(),
                explained_variance: self.explained_variance[i],
                explained_variance_ratio: self.explained_variance_ratio[i],
            })
            .collect()
    }
}

impl FittedTransform for PcaModel {
    fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    fn apply(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_width("pca", self.mean.len(), x)?;
        let centered = &x - &self.mean;
        Ok(centered.dot(&self.basis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn dominant_direction_is_found() {
        // points spread along y = x with a little noise across it
        let x = array![
            [-2.0, -2.1],
            [-1.0, -0.9],
            [0.0, 0.1],
            [1.0, 0.9],
            [2.0, 2.1],
        ];
        let model = Pca::new(1).fit(x.view()).unwrap();
        let w = model.components()[0].weights.clone();
        let inv_sqrt2 = 1.0 / 2f64.sqrt();
        assert!((w[0] - inv_sqrt2).abs() < 0.05, "w = {:?}", w);
        assert!((w[1] - inv_sqrt2).abs() < 0.05, "w = {:?}", w);
        assert!(model.explained_variance_ratio()[0] > 0.95);
    }

    #[test]
    fn projection_of_training_mean_is_origin() {
        let x = array![[1.0, 2.0, 0.5], [3.0, 1.0, 0.0], [2.0, 4.0, 1.5], [0.0, 0.0, 2.0]];
        let model = Pca::new(2).fit(x.view()).unwrap();
        let mean = model.mean().clone().insert_axis(Axis(0));
        let projected = model.apply(mean.view()).unwrap();
        assert!(projected.iter().all(|v| v.abs() < 1e-10));
    }

    #[test]
    fn too_many_components_is_invalid() {
        let x = array![[1.0, 2.0], [3.0, 1.0], [2.0, 4.0]];
        assert!(matches!(
            Pca::new(3).fit(x.view()),
            Err(PipelineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_variance_is_numerically_unstable() {
        let x = array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
        assert!(matches!(
            Pca::new(1).fit(x.view()),
            Err(PipelineError::NumericalInstability { .. })
        ));
    }
}
