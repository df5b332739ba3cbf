//! End-to-end run: partition, fit the feature pipeline on the training
//! partition, fit every model once, then score validation and test.
use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::data_handling::{ClassCounts, Dataset};
use crate::error::Result;
use crate::evaluation::{EvaluationResult, Harness, SplitKind};
use crate::partition::split;
use crate::preprocessing::{BalanceSummary, FeaturePipeline, PrincipalComponent};

/// Class counts of each partition as produced by the partitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub train: ClassCounts,
    pub validation: ClassCounts,
    pub test: ClassCounts,
}

/// Everything a report needs about one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub seed: u64,
    pub n_records: usize,
    pub n_features: usize,
    pub partitions: PartitionSummary,
    pub balance: BalanceSummary,
    pub components: Vec<PrincipalComponent>,
    /// Largest over smallest training covariance eigenvalue; `None` when
    /// the covariance is singular.
    pub condition_estimate: Option<f64>,
    pub validation: Vec<EvaluationResult>,
    pub test: Vec<EvaluationResult>,
}

impl RunSummary {
    pub fn results(&self, split: SplitKind) -> &[EvaluationResult] {
        match split {
            SplitKind::Validation => &self.validation,
            SplitKind::Test => &self.test,
        }
    }

    /// Class counts of a held-out partition, before any transformation.
    pub fn partition_counts(&self, split: SplitKind) -> &ClassCounts {
        match split {
            SplitKind::Validation => &self.partitions.validation,
            SplitKind::Test => &self.partitions.test,
        }
    }

    /// Name of the model with the highest positive-class F1 on `split`,
    /// first in registry order on ties.
    pub fn best_model(&self, split: SplitKind) -> Option<&str> {
        self.results(split)
            .iter()
            .fold(None, |best: Option<&EvaluationResult>, r| match best {
                Some(b) if b.f1 >= r.f1 => Some(b),
                _ => Some(r),
            })
            .map(|r| r.model.as_str())
    }
}

pub fn run(dataset: &Dataset, config: &PipelineConfig) -> Result<RunSummary> {
    config.validate()?;
    config.preprocessing.check_feature_count(dataset.n_features())?;
    dataset.log_summary("Input");

    let split = split(dataset, &config.split)?;
    split.train.log_summary("Train");
    split.validation.log_summary("Validation");
    split.test.log_summary("Test");

    let pipeline = FeaturePipeline::new(config.preprocessing.clone());
    let (fitted, train) = pipeline.fit_transform(&split.train)?;
    let validation = fitted.apply(&split.validation)?;
    let test = fitted.apply(&split.test)?;
    log::info!(
        "Balanced training partition: {} benign / {} malignant ({} synthetic)",
        fitted.balance().after.benign,
        fitted.balance().after.malignant,
        fitted.balance().synthetic
    );

    log::info!("Fitting {} models", config.models.len());
    let harness = Harness::new(&config.harness)?;
    let models = harness.fit_models(&config.models, train.x(), train.y())?;

    log::info!("Scoring on validation partition");
    let validation_results =
        harness.score_models(&models, validation.x(), validation.y(), SplitKind::Validation)?;
    log::info!("Scoring on test partition");
    let test_results = harness.score_models(&models, test.x(), test.y(), SplitKind::Test)?;

    Ok(RunSummary {
        seed: config.split.seed,
        n_records: dataset.len(),
        n_features: dataset.n_features(),
        partitions: PartitionSummary {
            train: split.train.class_counts(),
            validation: split.validation.class_counts(),
            test: split.test.class_counts(),
        },
        balance: fitted.balance().clone(),
        components: fitted.components(),
        condition_estimate: Some(fitted.reducer().condition_estimate())
            .filter(|c| c.is_finite()),
        validation: validation_results,
        test: test_results,
    })
}
