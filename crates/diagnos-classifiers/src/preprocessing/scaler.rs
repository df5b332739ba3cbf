//! Per-column mean/std standardization.
//!
//! Used twice by the feature pipeline: once on the raw training features and
//! once (as the rescaler) on the balanced, discretized training features.

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::{check_width, FittedTransform, Transform};
use crate::error::{PipelineError, Result};

/// Standard scaler (per-column mean/std) fitted on a training matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Scaler {
    /// Standard deviations at or below this are treated as zero.
    pub const MIN_STD: f64 = 1e-12;
}

/// Fit-time settings of a standardization stage.
#[derive(Clone, Copy, Debug)]
pub struct Standardizer {
    stage: &'static str,
}

impl Standardizer {
    pub fn new() -> Self {
        Self {
            stage: "standardizer",
        }
    }

    /// The second standardization pass, named separately in errors.
    pub fn rescaler() -> Self {
        Self { stage: "rescaler" }
    }
}

impl Default for Standardizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for Standardizer {
    type Fitted = Scaler;

    fn fit(&self, x: ArrayView2<f64>) -> Result<Scaler> {
        fit_scaler(x, self.stage)
    }
}

impl FittedTransform for Scaler {
    fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    fn apply(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        transform_all(x, self)
    }
}

/// Fit a `Scaler` from a matrix where rows are samples and columns are
/// features. Uses the population standard deviation.
fn fit_scaler(x: ArrayView2<f64>, stage: &'static str) -> Result<Scaler> {
    let (nrows, ncols) = x.dim();
    if nrows == 0 || ncols == 0 {
        return Err(PipelineError::EmptyDataset(stage));
    }

    let nrows_f = nrows as f64;
    let mean: Vec<f64> = x.sum_axis(Axis(0)).iter().map(|s| s / nrows_f).collect();

    let mut std = vec![0.0f64; ncols];
    for row in x.outer_iter() {
        for (c, v) in row.iter().enumerate() {
            let d = v - mean[c];
            std[c] += d * d;
        }
    }
    for (feature, s) in std.iter_mut().enumerate() {
        *s = (*s / nrows_f).sqrt();
        if !s.is_finite() || !mean[feature].is_finite() || *s <= Scaler::MIN_STD {
            return Err(PipelineError::DegenerateFeature { stage, feature });
        }
    }

    Ok(Scaler { mean, std })
}

/// Transform all rows using the provided `Scaler` and return a new matrix.
fn transform_all(x: ArrayView2<f64>, sc: &Scaler) -> Result<Array2<f64>> {
    check_width("scaler", sc.mean.len(), x)?;
    let mut out = x.to_owned();
    for mut row in out.outer_iter_mut() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = (*v - sc.mean[c]) / sc.std[c];
        }
    }
    Ok(out)
}
