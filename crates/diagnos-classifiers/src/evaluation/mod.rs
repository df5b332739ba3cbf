pub mod harness;
pub mod metrics;

pub use harness::{evaluate, fit_models, score_models, Harness, TrainedModel};
pub use metrics::{
    AveragedMetrics, ClassReport, ConfusionMatrix, EvaluationResult, MetricKind, SplitKind,
    UndefinedMetric,
};
