//! Binary classification metrics with malignant as the positive class.
//!
//! A ratio whose denominator is zero is reported as 0 and recorded as an
//! [`UndefinedMetric`] instead of failing the run.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data_handling::Diagnosis;
use crate::error::{PipelineError, Result};

/// Which held-out partition a result was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitKind {
    Validation,
    Test,
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitKind::Validation => write!(f, "validation"),
            SplitKind::Test => write!(f, "test"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Precision,
    Recall,
    F1,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Precision => write!(f, "precision"),
            MetricKind::Recall => write!(f, "recall"),
            MetricKind::F1 => write!(f, "f1"),
        }
    }
}

/// A metric that had a zero denominator for `class` and was set to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UndefinedMetric {
    pub metric: MetricKind,
    pub class: Diagnosis,
}

impl fmt::Display for UndefinedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is ill-defined for class {} and was set to 0",
            self.metric, self.class
        )
    }
}

/// Counts of actual (rows) against predicted (columns) labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(actual: &[Diagnosis], predicted: &[Diagnosis]) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(PipelineError::ShapeMismatch {
                context: "predicted labels",
                expected: actual.len(),
                found: predicted.len(),
            });
        }
        let mut cm = ConfusionMatrix::default();
        for (a, p) in actual.iter().zip(predicted) {
            match (a, p) {
                (Diagnosis::Benign, Diagnosis::Benign) => cm.tn += 1,
                (Diagnosis::Benign, Diagnosis::Malignant) => cm.fp += 1,
                (Diagnosis::Malignant, Diagnosis::Benign) => cm.fn_ += 1,
                (Diagnosis::Malignant, Diagnosis::Malignant) => cm.tp += 1,
            }
        }
        Ok(cm)
    }

    /// `[[tn, fp], [fn, tp]]`: benign first on both axes.
    pub fn table(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.tn + self.tp) as f64 / total as f64
        }
    }

    /// (true positives, false positives, false negatives) when `class` is
    /// treated as positive.
    fn counts_for(&self, class: Diagnosis) -> (usize, usize, usize) {
        match class {
            Diagnosis::Malignant => (self.tp, self.fp, self.fn_),
            Diagnosis::Benign => (self.tn, self.fn_, self.fp),
        }
    }

    /// Precision, recall and F1 for `class`, flagging zero denominators.
    pub fn class_report(&self, class: Diagnosis, undefined: &mut Vec<UndefinedMetric>) -> ClassReport {
        let (tp, fp, fn_) = self.counts_for(class);
        let mut ratio = |num: usize, den: usize, metric: MetricKind| {
            if den == 0 {
                undefined.push(UndefinedMetric { metric, class });
                0.0
            } else {
                num as f64 / den as f64
            }
        };
        let precision_undefined = tp + fp == 0;
        let recall_undefined = tp + fn_ == 0;
        let precision = ratio(tp, tp + fp, MetricKind::Precision);
        let recall = ratio(tp, tp + fn_, MetricKind::Recall);

        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            if precision_undefined || recall_undefined {
                undefined.push(UndefinedMetric {
                    metric: MetricKind::F1,
                    class,
                });
            }
            0.0
        };

        ClassReport {
            label: class,
            precision,
            recall,
            f1,
            support: tp + fn_,
        }
    }
}

/// Per-class precision/recall/F1 with the number of actual rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    pub label: Diagnosis,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl AveragedMetrics {
    fn macro_average(reports: &[ClassReport]) -> Self {
        let n = reports.len().max(1) as f64;
        AveragedMetrics {
            precision: reports.iter().map(|r| r.precision).sum::<f64>() / n,
            recall: reports.iter().map(|r| r.recall).sum::<f64>() / n,
            f1: reports.iter().map(|r| r.f1).sum::<f64>() / n,
        }
    }

    fn weighted_average(reports: &[ClassReport]) -> Self {
        let total: usize = reports.iter().map(|r| r.support).sum();
        if total == 0 {
            return AveragedMetrics::default();
        }
        let weighted = |f: fn(&ClassReport) -> f64| {
            reports
                .iter()
                .map(|r| f(r) * r.support as f64)
                .sum::<f64>()
                / total as f64
        };
        AveragedMetrics {
            precision: weighted(|r| r.precision),
            recall: weighted(|r| r.recall),
            f1: weighted(|r| r.f1),
        }
    }
}

/// Metrics of one model on one held-out partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub model: String,
    pub split: SplitKind,
    pub accuracy: f64,
    /// Positive-class (malignant) precision.
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
    /// Benign first, then malignant.
    pub class_reports: Vec<ClassReport>,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
    pub undefined: Vec<UndefinedMetric>,
}

impl EvaluationResult {
    pub fn compute(
        model: impl Into<String>,
        split: SplitKind,
        actual: &[Diagnosis],
        predicted: &[Diagnosis],
    ) -> Result<Self> {
        let confusion = ConfusionMatrix::from_predictions(actual, predicted)?;
        let mut undefined = Vec::new();
        let class_reports: Vec<ClassReport> = Diagnosis::ALL
            .iter()
            .map(|&class| confusion.class_report(class, &mut undefined))
            .collect();
        let positive = class_reports[Diagnosis::Malignant.index()];

        Ok(EvaluationResult {
            model: model.into(),
            split,
            accuracy: confusion.accuracy(),
            precision: positive.precision,
            recall: positive.recall,
            f1: positive.f1,
            confusion,
            macro_avg: AveragedMetrics::macro_average(&class_reports),
            weighted_avg: AveragedMetrics::weighted_average(&class_reports),
            class_reports,
            undefined,
        })
    }

    /// Undefined flags for the positive class only.
    pub fn positive_undefined(&self) -> impl Iterator<Item = &UndefinedMetric> {
        self.undefined.iter().filter(|u| u.class.is_positive())
    }
}
