//! Uniform-width binning of each feature into ordinal bucket indices.

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::{check_width, FittedTransform, Transform};
use crate::error::{PipelineError, Result};

/// Relative and absolute slack added to a value before locating its bin, so
/// that values sitting on an edge land in the upper bin despite rounding.
const EDGE_RTOL: f64 = 1e-5;
const EDGE_ATOL: f64 = 1e-8;

#[derive(Clone, Copy, Debug)]
pub struct Discretizer {
    pub n_bins: usize,
}

impl Discretizer {
    pub fn new(n_bins: usize) -> Self {
        Self { n_bins }
    }
}

impl Default for Discretizer {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Per-feature bin edges: `n_bins + 1` ascending values spanning the
/// training column's `[min, max]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinEdges {
    pub n_bins: usize,
    pub edges: Vec<Vec<f64>>,
}

impl Transform for Discretizer {
    type Fitted = BinEdges;

    fn fit(&self, x: ArrayView2<f64>) -> Result<BinEdges> {
        if self.n_bins < 2 {
            return Err(PipelineError::config(format!(
                "discretizer needs at least 2 bins, got {}",
                self.n_bins
            )));
        }
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(PipelineError::EmptyDataset("discretizer"));
        }

        let mut edges = Vec::with_capacity(x.ncols());
        for (feature, column) in x.axis_iter(Axis(1)).enumerate() {
            let (min, max) = column
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                });
            if !min.is_finite() || !max.is_finite() || max <= min {
                return Err(PipelineError::DegenerateFeature {
                    stage: "discretizer",
                    feature,
                });
            }
            let width = (max - min) / self.n_bins as f64;
            let mut col_edges: Vec<f64> =
                (0..=self.n_bins).map(|i| min + width * i as f64).collect();
            col_edges[self.n_bins] = max;
            edges.push(col_edges);
        }

        Ok(BinEdges {
            n_bins: self.n_bins,
            edges,
        })
    }
}

impl BinEdges {
    /// Ordinal bin of `value` for `feature`, clipped to `[0, n_bins - 1]`.
    pub fn bin_of(&self, feature: usize, value: f64) -> usize {
        let shifted = value + EDGE_ATOL + EDGE_RTOL * value.abs();
        let upper_edges = &self.edges[feature][1..];
        upper_edges
            .partition_point(|&edge| edge <= shifted)
            .min(self.n_bins - 1)
    }
}

impl FittedTransform for BinEdges {
    fn n_features_in(&self) -> usize {
        self.edges.len()
    }

    fn apply(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        check_width("discretizer", self.edges.len(), x)?;
        let mut out = x.to_owned();
        for mut row in out.outer_iter_mut() {
            for (feature, v) in row.iter_mut().enumerate() {
                *v = self.bin_of(feature, *v) as f64;
            }
        }
        Ok(out)
    }
}
