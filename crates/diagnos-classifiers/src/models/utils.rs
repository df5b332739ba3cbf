//! Helpers shared by the classifier wrappers: input checks and label
//! conversion to and from the integer/boolean encodings linfa expects.
use std::fmt::Display;

use ndarray::{Array1, Array2};

use crate::data_handling::{ClassCounts, Diagnosis};
use crate::error::{PipelineError, Result};

/// Validate training inputs shared by every estimator.
///
/// Every variant here is a binary classifier, so both classes must be
/// present.
pub fn check_training_data(model: &str, x: &Array2<f64>, y: &[Diagnosis]) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(PipelineError::ShapeMismatch {
            context: "training labels",
            expected: x.nrows(),
            found: y.len(),
        });
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(PipelineError::EmptyDataset("model training"));
    }
    let counts = ClassCounts::from_labels(y);
    if counts.benign == 0 || counts.malignant == 0 {
        return Err(fit_error(
            model,
            format!(
                "training data must contain both classes ({} benign / {} malignant)",
                counts.benign, counts.malignant
            ),
        ));
    }
    Ok(())
}

/// Check that a prediction matrix has the width the model was fitted on.
pub fn check_prediction_width(expected: usize, x: &Array2<f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(PipelineError::ShapeMismatch {
            context: "prediction features",
            expected,
            found: x.ncols(),
        });
    }
    Ok(())
}

pub fn fit_error(model: &str, reason: impl Display) -> PipelineError {
    PipelineError::ModelFit {
        model: model.to_string(),
        reason: reason.to_string(),
    }
}

pub fn wrong_params(model: &str, expected: &str) -> PipelineError {
    PipelineError::config(format!(
        "model '{}' expected {} parameters",
        model, expected
    ))
}

/// Labels as class indices (benign 0, malignant 1).
pub fn to_class_indices(y: &[Diagnosis]) -> Array1<usize> {
    y.iter().map(|l| l.index()).collect()
}

pub fn from_class_indices(model: &str, preds: &Array1<usize>) -> Result<Vec<Diagnosis>> {
    preds
        .iter()
        .map(|&idx| {
            Diagnosis::from_index(idx)
                .ok_or_else(|| fit_error(model, format!("predicted unknown class index {}", idx)))
        })
        .collect()
}

/// Labels as booleans (`true` for malignant).
pub fn to_bool_labels(y: &[Diagnosis]) -> Array1<bool> {
    y.iter().map(|l| l.is_positive()).collect()
}

pub fn from_bool_labels(preds: &Array1<bool>) -> Vec<Diagnosis> {
    preds
        .iter()
        .map(|&p| if p { Diagnosis::Malignant } else { Diagnosis::Benign })
        .collect()
}
