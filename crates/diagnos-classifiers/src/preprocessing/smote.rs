//! Synthetic minority oversampling (SMOTE).
//!
//! Synthetic rows are interpolated between a minority sample and one of its
//! k nearest same-class neighbors until both classes have the same count.
//! Only ever applied to the training partition.

use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data_handling::{ClassCounts, Dataset, Diagnosis};
use crate::error::{PipelineError, Result};
use crate::neighbors::k_nearest;

#[derive(Clone, Copy, Debug)]
pub struct Smote {
    pub k_neighbors: usize,
    pub seed: u64,
}

impl Default for Smote {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            seed: 42,
        }
    }
}

/// What the balancer did to the training partition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// `None` when the classes were already balanced.
    pub minority: Option<Diagnosis>,
    pub before: ClassCounts,
    pub after: ClassCounts,
    pub synthetic: usize,
}

impl Smote {
    pub fn new(k_neighbors: usize, seed: u64) -> Self {
        Self { k_neighbors, seed }
    }

    /// Oversample the minority class of `dataset`.
    pub fn balance(&self, dataset: &Dataset) -> Result<(Dataset, BalanceSummary)> {
        let (x, y, summary) = self.fit_resample(dataset.x().view(), dataset.y())?;
        let balanced = Dataset::new(x, y, dataset.feature_names().to_vec())?;
        Ok((balanced, summary))
    }

    /// Return the original rows followed by the synthetic minority rows.
    pub fn fit_resample(
        &self,
        x: ArrayView2<f64>,
        y: &[Diagnosis],
    ) -> Result<(Array2<f64>, Vec<Diagnosis>, BalanceSummary)> {
        if x.nrows() != y.len() {
            return Err(PipelineError::ShapeMismatch {
                context: "balancer labels",
                expected: x.nrows(),
                found: y.len(),
            });
        }
        if self.k_neighbors == 0 {
            return Err(PipelineError::config("k_neighbors must be at least 1"));
        }

        let before = ClassCounts::from_labels(y);
        let required = self.k_neighbors + 1;

        // A missing class can never be balanced.
        for label in Diagnosis::ALL {
            if before.get(label) == 0 {
                return Err(PipelineError::InsufficientMinoritySamples {
                    minority: label,
                    available: 0,
                    required,
                });
            }
        }

        let Some(minority) = before.minority() else {
            log::debug!("Training classes already balanced ({} each)", before.benign);
            return Ok((
                x.to_owned(),
                y.to_vec(),
                BalanceSummary {
                    minority: None,
                    before,
                    after: before,
                    synthetic: 0,
                },
            ));
        };

        let n_minority = before.get(minority);
        if n_minority < required {
            return Err(PipelineError::InsufficientMinoritySamples {
                minority,
                available: n_minority,
                required,
            });
        }
        let n_synthetic = before.get(minority.other()) - n_minority;

        let minority_rows: Vec<usize> = y
            .iter()
            .enumerate()
            .filter_map(|(i, &label)| (label == minority).then_some(i))
            .collect();
        let minority_x = x.select(Axis(0), &minority_rows);

        let neighbors: Vec<Vec<usize>> = (0..n_minority)
            .map(|i| k_nearest(minority_x.view(), minority_x.row(i), self.k_neighbors, Some(i)))
            .collect();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let n_features = x.ncols();
        let mut data: Vec<f64> = Vec::with_capacity((x.nrows() + n_synthetic) * n_features);
        data.extend(x.iter().copied());

        for _ in 0..n_synthetic {
            let sample = rng.gen_range(0..n_minority);
            let neighbor = neighbors[sample][rng.gen_range(0..self.k_neighbors)];
            let delta: f64 = rng.gen();

            let base = minority_x.row(sample);
            let toward = minority_x.row(neighbor);
            data.extend(base.iter().zip(toward.iter()).map(|(b, t)| b + delta * (t - b)));
        }

        let n_rows = x.nrows() + n_synthetic;
        let out = Array2::from_shape_vec((n_rows, n_features), data).map_err(|_| {
            PipelineError::ShapeMismatch {
                context: "balanced matrix",
                expected: n_rows * n_features,
                found: 0,
            }
        })?;
        let mut labels = y.to_vec();
        labels.extend(std::iter::repeat(minority).take(n_synthetic));

        let after = ClassCounts::from_labels(&labels);
        log::debug!(
            "SMOTE generated {} synthetic {} rows (k = {}): {} benign / {} malignant",
            n_synthetic,
            minority,
            self.k_neighbors,
            after.benign,
            after.malignant
        );

        Ok((
            out,
            labels,
            BalanceSummary {
                minority: Some(minority),
                before,
                after,
                synthetic: n_synthetic,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(benign: usize, malignant: usize) -> Vec<Diagnosis> {
        let mut y = vec![Diagnosis::Benign; benign];
        y.extend(vec![Diagnosis::Malignant; malignant]);
        y
    }

    #[test]
    fn synthetic_rows_lie_between_minority_samples() {
        let x = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [2.0, 0.0],
            [3.0, 0.0],
            [4.0, 0.0],
            [10.0, 10.0],
            [10.0, 12.0],
        ];
        let y = labels(5, 2);
        let (out, out_y, summary) = Smote::new(1, 3).fit_resample(x.view(), &y).unwrap();

        assert_eq!(out.nrows(), 10);
        assert_eq!(summary.synthetic, 3);
        assert_eq!(summary.after.benign, summary.after.malignant);
        assert!(out_y[7..].iter().all(|l| *l == Diagnosis::Malignant));
        for row in out.outer_iter().skip(7) {
            assert!((row[0] - 10.0).abs() < 1e-12);
            assert!(row[1] >= 10.0 && row[1] <= 12.0);
        }
        // originals untouched and first
        assert_eq!(out.row(6).to_vec(), vec![10.0, 12.0]);
    }

    #[test]
    fn too_few_minority_samples_fails() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [9.0], [8.0]];
        let y = labels(4, 2);
        match Smote::new(2, 0).fit_resample(x.view(), &y) {
            Err(PipelineError::InsufficientMinoritySamples {
                minority,
                available,
                required,
            }) => {
                assert_eq!(minority, Diagnosis::Malignant);
                assert_eq!(available, 2);
                assert_eq!(required, 3);
            }
            other => panic!("expected InsufficientMinoritySamples, got {:?}", other),
        }
    }

    #[test]
    fn balanced_input_is_unchanged() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = labels(2, 2);
        let (out, out_y, summary) = Smote::new(1, 0).fit_resample(x.view(), &y).unwrap();
        assert_eq!(out, x);
        assert_eq!(out_y, y);
        assert_eq!(summary.minority, None);
    }

    #[test]
    fn same_seed_same_samples() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0], [20.0], [21.0], [23.0]];
        let y = labels(6, 3);
        let a = Smote::new(2, 11).fit_resample(x.view(), &y).unwrap();
        let b = Smote::new(2, 11).fit_resample(x.view(), &y).unwrap();
        assert_eq!(a.0, b.0);
    }
}
