//! Trains every registry variant on the same training data and scores it on
//! a held-out partition.
//!
//! Variants are independent, so fitting and scoring fan out over a rayon
//! pool. `collect` on an indexed parallel iterator keeps registry order.
use ndarray::Array2;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::{HarnessConfig, ModelConfig};
use crate::data_handling::Diagnosis;
use crate::error::{PipelineError, Result};
use crate::evaluation::metrics::{EvaluationResult, SplitKind};
use crate::models::{build_model, ClassifierModel, ModelRegistry};

/// A fitted registry entry, only used for prediction from here on.
pub struct TrainedModel {
    name: String,
    model: Box<dyn ClassifierModel>,
}

impl TrainedModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<Diagnosis>> {
        self.model.predict(x)
    }
}

/// Worker pool shared by every fit and score call of one run.
///
/// With `n_threads` unset the global rayon pool is used.
pub struct Harness {
    pool: Option<ThreadPool>,
}

impl Harness {
    pub fn new(config: &HarnessConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.n_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| {
                        PipelineError::config(format!("failed to build thread pool: {}", e))
                    })?,
            ),
            None => None,
        };
        Ok(Self { pool })
    }

    /// Worker threads available to the harness.
    pub fn n_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Fit a fresh instance of every registry entry on `(x, y)`.
    pub fn fit_models(
        &self,
        registry: &ModelRegistry,
        x: &Array2<f64>,
        y: &[Diagnosis],
    ) -> Result<Vec<TrainedModel>> {
        registry.validate()?;
        check_labels("training labels", x, y)?;

        let configs: Vec<&ModelConfig> = registry.iter().collect();
        self.install(|| {
            configs
                .par_iter()
                .map(|cfg| -> Result<TrainedModel> {
                    let mut model = build_model(cfg);
                    log::trace!("Fitting {} on {} rows", cfg.name, x.nrows());
                    model.fit(x, y)?;
                    log::trace!("Fitted {}", cfg.name);
                    Ok(TrainedModel {
                        name: cfg.name.clone(),
                        model,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
    }

    /// Score already fitted models on `(x, y)`, in the order given.
    pub fn score_models(
        &self,
        models: &[TrainedModel],
        x: &Array2<f64>,
        y: &[Diagnosis],
        split: SplitKind,
    ) -> Result<Vec<EvaluationResult>> {
        check_labels("evaluation labels", x, y)?;

        let results: Vec<EvaluationResult> = self.install(|| {
            models
                .par_iter()
                .map(|trained| {
                    let predicted = trained.predict(x)?;
                    EvaluationResult::compute(trained.name(), split, y, &predicted)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        for result in &results {
            for flag in &result.undefined {
                log::warn!("{} ({}): {}", result.model, split, flag);
            }
            log::debug!(
                "{} ({}): accuracy {:.4}, f1 {:.4}",
                result.model,
                split,
                result.accuracy,
                result.f1
            );
        }
        Ok(results)
    }
}

fn check_labels(context: &'static str, x: &Array2<f64>, y: &[Diagnosis]) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeMismatch {
            context,
            expected: x.nrows(),
            found: y.len(),
        });
    }
    Ok(())
}

/// Fit a fresh instance of every registry entry on `(x, y)`.
pub fn fit_models(
    registry: &ModelRegistry,
    x: &Array2<f64>,
    y: &[Diagnosis],
    config: &HarnessConfig,
) -> Result<Vec<TrainedModel>> {
    Harness::new(config)?.fit_models(registry, x, y)
}

/// Score already fitted models on `(x, y)`, in the order given.
pub fn score_models(
    models: &[TrainedModel],
    x: &Array2<f64>,
    y: &[Diagnosis],
    split: SplitKind,
    config: &HarnessConfig,
) -> Result<Vec<EvaluationResult>> {
    Harness::new(config)?.score_models(models, x, y, split)
}

/// Fit every registry entry on the training data and score it on the
/// evaluation data.
pub fn evaluate(
    registry: &ModelRegistry,
    train_x: &Array2<f64>,
    train_y: &[Diagnosis],
    eval_x: &Array2<f64>,
    eval_y: &[Diagnosis],
    split: SplitKind,
    config: &HarnessConfig,
) -> Result<Vec<EvaluationResult>> {
    let harness = Harness::new(config)?;
    let models = harness.fit_models(registry, train_x, train_y)?;
    harness.score_models(&models, eval_x, eval_y, split)
}
