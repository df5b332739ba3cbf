use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::data_handling::Diagnosis;
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{
    check_prediction_width, check_training_data, fit_error, from_class_indices,
    to_class_indices, wrong_params,
};

/// L2-regularized logistic regression (linfa-logistic).
pub struct LogisticClassifier {
    model: Option<FittedLogisticRegression<f64, usize>>,
    n_features: usize,
    params: ModelConfig,
}

impl LogisticClassifier {
    pub fn new(params: ModelConfig) -> Self {
        LogisticClassifier {
            model: None,
            n_features: 0,
            params,
        }
    }
}

impl ClassifierModel for LogisticClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[Diagnosis]) -> Result<()> {
        let ModelType::Logistic {
            alpha,
            max_iterations,
        } = self.params.model_type
        else {
            return Err(wrong_params(&self.params.name, "logistic"));
        };
        check_training_data(&self.params.name, x, y)?;

        let dataset = Dataset::new(x.clone(), to_class_indices(y));
        let model = LogisticRegression::default()
            .alpha(alpha)
            .max_iterations(max_iterations)
            .fit(&dataset)
            .map_err(|e| fit_error(&self.params.name, e))?;

        self.n_features = x.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Diagnosis>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.params.name.clone()))?;
        check_prediction_width(self.n_features, x)?;
        let predictions: Array1<usize> = model.predict(x);
        from_class_indices(&self.params.name, &predictions)
    }

    fn name(&self) -> &str {
        &self.params.name
    }
}
