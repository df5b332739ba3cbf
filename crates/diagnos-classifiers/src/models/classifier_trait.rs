use ndarray::Array2;

use crate::data_handling::Diagnosis;
use crate::error::Result;

/// Uniform contract for every classifier variant in the registry.
///
/// Implementations are fitted exactly once and then only used for
/// prediction, so `predict` takes `&self` and fitted models can be scored
/// from several threads at once.
pub trait ClassifierModel: Send + Sync {
    /// Fit the model on a feature matrix (rows are samples) and its labels.
    fn fit(&mut self, x: &Array2<f64>, y: &[Diagnosis]) -> Result<()>;

    /// Predict one label per row. Fails with `NotFitted` before `fit`.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Diagnosis>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
