use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::data_handling::Diagnosis;
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{
    check_prediction_width, check_training_data, fit_error, from_bool_labels, to_bool_labels,
    wrong_params,
};

/// Support vector machine (linfa-svm), malignant as the positive class.
pub struct SVMClassifier {
    model: Option<Svm<f64, bool>>,
    n_features: usize,
    params: ModelConfig,
}

impl SVMClassifier {
    pub fn new(params: ModelConfig) -> Self {
        SVMClassifier {
            model: None,
            n_features: 0,
            params,
        }
    }
}

/// Gaussian kernel width derived from the data: `n_features * Var(X)`.
///
/// linfa's kernel is `exp(-|a - b|^2 / eps)`, so this matches a gamma of
/// `1 / (n_features * Var(X))`.
fn scaled_gaussian_eps(x: &Array2<f64>) -> f64 {
    let n = x.len() as f64;
    let mean = x.sum() / n;
    let var = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let eps = x.ncols() as f64 * var;
    if eps.is_finite() && eps > 0.0 {
        eps
    } else {
        1.0
    }
}

impl ClassifierModel for SVMClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[Diagnosis]) -> Result<()> {
        let ModelType::Svm {
            eps,
            c,
            kernel,
            gaussian_kernel_eps,
            polynomial_kernel_constant,
            polynomial_kernel_degree,
        } = &self.params.model_type
        else {
            return Err(wrong_params(&self.params.name, "svm"));
        };
        check_training_data(&self.params.name, x, y)?;

        let (c1, c2) = *c;
        let params: SvmParams<f64, bool> = Svm::<f64, bool>::params().eps(*eps).pos_neg_weights(c1, c2);

        // Chain the kernel configuration based on the kernel type
        let params = match kernel.as_str() {
            "linear" => params.linear_kernel(),
            "gauss" => {
                let width = gaussian_kernel_eps.unwrap_or_else(|| scaled_gaussian_eps(x));
                log::trace!("{}: gaussian kernel eps {:.4}", self.params.name, width);
                params.gaussian_kernel(width)
            }
            "poly" => params.polynomial_kernel(*polynomial_kernel_constant, *polynomial_kernel_degree),
            other => {
                return Err(PipelineError::config(format!(
                    "svm: unsupported kernel '{}'. Valid options are: linear, gauss, poly",
                    other
                )))
            }
        };

        let dataset = Dataset::new(x.clone(), to_bool_labels(y));
        let model = params
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
        let predictions: Array1<bool> = model.predict(x);
        Ok(from_bool_labels(&predictions))
    }

    fn name(&self) -> &str {
        &self.params.name
    }
}
