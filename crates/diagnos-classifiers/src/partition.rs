//! Seeded train/validation/test partitioning.
//!
//! The split is done in two passes with the same seed: the test partition is
//! carved out of the full dataset, then the validation partition out of what
//! remains. Rounding leftovers always end up in the training partition.
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::SplitConfig;
use crate::data_handling::Dataset;
use crate::error::{PipelineError, Result};

/// Three disjoint partitions of a dataset, plus the source row indices of each.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub validation: Dataset,
    pub test: Dataset,
    pub train_indices: Vec<usize>,
    pub validation_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Partition sizes implied by a config for `n` records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSizes {
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

impl SplitSizes {
    pub fn compute(n: usize, config: &SplitConfig) -> Result<Self> {
        config.validate()?;
        let test = (config.test_fraction * n as f64).round() as usize;
        let remaining = n.saturating_sub(test);
        let validation = (config.validation_fraction * remaining as f64).round() as usize;
        let train = remaining.saturating_sub(validation);

        if test == 0 || validation == 0 || train == 0 || test + validation + train != n {
            return Err(PipelineError::config(format!(
                "fractions ({}, {}) leave an empty partition for {} records \
                 (train {}, validation {}, test {})",
                config.test_fraction, config.validation_fraction, n, train, validation, test
            )));
        }
        Ok(Self {
            train,
            validation,
            test,
        })
    }
}

/// Shuffle `indices` in place with a fresh RNG seeded from `seed`.
fn seeded_shuffle(indices: &mut [usize], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
}

/// Split `dataset` into train, validation and test partitions.
///
/// Identical `dataset` and `config.seed` always produce identical membership.
pub fn split(dataset: &Dataset, config: &SplitConfig) -> Result<Split> {
    if dataset.is_empty() {
        return Err(PipelineError::EmptyDataset("split"));
    }
    let sizes = SplitSizes::compute(dataset.len(), config)?;

    let mut all: Vec<usize> = (0..dataset.len()).collect();
    seeded_shuffle(&mut all, config.seed);
    let (test_indices, rest) = all.split_at(sizes.test);

    let mut rest = rest.to_vec();
    seeded_shuffle(&mut rest, config.seed);
    let (validation_indices, train_indices) = rest.split_at(sizes.validation);

    log::debug!(
        "Partitioned {} records with seed {}: train {}, validation {}, test {}",
        dataset.len(),
        config.seed,
        train_indices.len(),
        validation_indices.len(),
        test_indices.len()
    );

    Ok(Split {
        train: dataset.select(train_indices),
        validation: dataset.select(validation_indices),
        test: dataset.select(test_indices),
        train_indices: train_indices.to_vec(),
        validation_indices: validation_indices.to_vec(),
        test_indices: test_indices.to_vec(),
    })
}
