use thiserror::Error;

use crate::data_handling::Diagnosis;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal failures of a pipeline run.
///
/// Ill-defined metrics are not errors: they are recorded on the result as
/// [`crate::evaluation::metrics::UndefinedMetric`] flags.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{stage}: feature {feature} has zero spread on the training partition")]
    DegenerateFeature { stage: &'static str, feature: usize },

    #[error(
        "cannot oversample {minority}: {available} samples available, at least {required} needed"
    )]
    InsufficientMinoritySamples {
        minority: Diagnosis,
        available: usize,
        required: usize,
    },

    #[error("eigendecomposition failed (condition estimate {condition_estimate:.3e}): {detail}")]
    NumericalInstability {
        condition_estimate: f64,
        detail: String,
    },

    #[error("shape mismatch in {context}: expected {expected}, found {found}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{0}: dataset is empty")]
    EmptyDataset(&'static str),

    #[error("model '{0}' used before fit")]
    NotFitted(String),

    #[error("failed to fit model '{model}': {reason}")]
    ModelFit { model: String, reason: String },
}

impl PipelineError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        PipelineError::InvalidConfiguration(msg.into())
    }
}
