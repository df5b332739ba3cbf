use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PipelineError, Result};
use crate::models::registry::ModelRegistry;

/// Central configuration for a pipeline run.
///
/// The seed, split fractions, stage sizes and the model registry are the only
/// knobs; nothing is read from the environment.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub split: SplitConfig,
    pub preprocessing: PreprocessingConfig,
    pub harness: HarnessConfig,
    pub models: ModelRegistry,
}

impl PipelineConfig {
    /// Check every section before any computation starts.
    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        self.preprocessing.validate()?;
        self.harness.validate()?;
        self.models.validate()
    }

    /// Use the same seed for partitioning and oversampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.split.seed = seed;
        self.preprocessing.seed = seed;
        self
    }
}

/// Train/validation/test partition parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SplitConfig {
    pub seed: u64,
    /// Fraction of all records held out for the test partition.
    pub test_fraction: f64,
    /// Fraction of the remaining records held out for validation.
    pub validation_fraction: f64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.15,
            validation_fraction: 0.1765,
        }
    }
}

impl SplitConfig {
    pub fn new(seed: u64, test_fraction: f64, validation_fraction: f64) -> Self {
        Self {
            seed,
            test_fraction,
            validation_fraction,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("test_fraction", self.test_fraction),
            ("validation_fraction", self.validation_fraction),
        ] {
            if !value.is_finite() || value <= 0.0 || value >= 1.0 {
                return Err(PipelineError::config(format!(
                    "{} must lie in (0, 1), got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Feature pipeline stage parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Uniform bins per feature in the discretizer.
    pub n_bins: usize,
    /// Same-class neighbors considered when synthesizing minority samples.
    pub k_neighbors: usize,
    /// Principal components retained by the reducer.
    pub n_components: usize,
    /// Seed of the oversampling RNG.
    pub seed: u64,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            n_bins: 10,
            k_neighbors: 5,
            n_components: 10,
            seed: 42,
        }
    }
}

impl PreprocessingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_bins < 2 {
            return Err(PipelineError::config(format!(
                "n_bins must be at least 2, got {}",
                self.n_bins
            )));
        }
        if self.k_neighbors == 0 {
            return Err(PipelineError::config("k_neighbors must be at least 1"));
        }
        if self.n_components == 0 {
            return Err(PipelineError::config("n_components must be at least 1"));
        }
        Ok(())
    }

    /// The projection cannot keep more components than there are features.
    pub fn check_feature_count(&self, n_features: usize) -> Result<()> {
        if self.n_components > n_features {
            return Err(PipelineError::config(format!(
                "n_components ({}) exceeds the number of features ({})",
                self.n_components, n_features
            )));
        }
        Ok(())
    }
}

/// Evaluation harness parameters.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Worker threads for model training/scoring. `None` uses every core.
    pub n_threads: Option<usize>,
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_threads == Some(0) {
            return Err(PipelineError::config("n_threads must be at least 1"));
        }
        Ok(())
    }
}

/// A named classifier variant.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub name: String,

    #[serde(flatten)]
    pub model_type: ModelType,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            name: name.into(),
            model_type,
        }
    }
}

/// Supported classifier variants and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelType {
    Logistic {
        alpha: f64,
        max_iterations: u64,
    },
    Lda {
        /// Singular values below this are dropped by the pseudo-inverse.
        tolerance: f64,
    },
    Tree {
        max_depth: Option<usize>,
        min_weight_split: f32,
    },
    Knn {
        k: usize,
    },
    NaiveBayes {
        var_smoothing: f64,
    },
    Svm {
        eps: f64,
        c: (f64, f64),
        kernel: String,
        /// `None` derives the width from the training data
        /// (`n_features * Var(X)`).
        gaussian_kernel_eps: Option<f64>,
        polynomial_kernel_constant: f64,
        polynomial_kernel_degree: f64,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::Logistic {
            alpha: 1.0,
            max_iterations: 100,
        }
    }
}

impl ModelType {
    /// Short identifier used by `FromStr` and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelType::Logistic { .. } => "logistic",
            ModelType::Lda { .. } => "lda",
            ModelType::Tree { .. } => "tree",
            ModelType::Knn { .. } => "knn",
            ModelType::NaiveBayes { .. } => "naive_bayes",
            ModelType::Svm { .. } => "svm",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ModelType::Logistic { alpha, max_iterations } => {
                if !alpha.is_finite() || *alpha < 0.0 || *max_iterations == 0 {
                    return Err(PipelineError::config(
                        "logistic: alpha must be >= 0 and max_iterations > 0",
                    ));
                }
            }
            ModelType::Lda { tolerance } => {
                if !tolerance.is_finite() || *tolerance <= 0.0 {
                    return Err(PipelineError::config("lda: tolerance must be > 0"));
                }
            }
            ModelType::Tree { max_depth, min_weight_split } => {
                if *max_depth == Some(0) || *min_weight_split < 0.0 {
                    return Err(PipelineError::config(
                        "tree: max_depth must be > 0 and min_weight_split >= 0",
                    ));
                }
            }
            ModelType::Knn { k } => {
                if *k == 0 {
                    return Err(PipelineError::config("knn: k must be at least 1"));
                }
            }
            ModelType::NaiveBayes { var_smoothing } => {
                if !var_smoothing.is_finite() || *var_smoothing < 0.0 {
                    return Err(PipelineError::config(
                        "naive_bayes: var_smoothing must be >= 0",
                    ));
                }
            }
            ModelType::Svm { eps, c, kernel, gaussian_kernel_eps, .. } => {
                if *eps <= 0.0 || c.0 <= 0.0 || c.1 <= 0.0 {
                    return Err(PipelineError::config("svm: eps and c must be > 0"));
                }
                if !matches!(kernel.as_str(), "linear" | "gauss" | "poly") {
                    return Err(PipelineError::config(format!(
                        "svm: unsupported kernel '{}'. Valid options are: linear, gauss, poly",
                        kernel
                    )));
                }
                if matches!(gaussian_kernel_eps, Some(v) if *v <= 0.0) {
                    return Err(PipelineError::config("svm: gaussian_kernel_eps must be > 0"));
                }
            }
        }
        Ok(())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic" => Ok(ModelType::default()),
            "lda" => Ok(ModelType::Lda { tolerance: 1e-4 }),
            "tree" => Ok(ModelType::Tree {
                max_depth: None,
                min_weight_split: 2.0,
            }),
            "knn" => Ok(ModelType::Knn { k: 5 }),
            "naive_bayes" => Ok(ModelType::NaiveBayes {
                var_smoothing: 1e-9,
            }),
            "svm" => Ok(ModelType::Svm {
                eps: 1e-3,
                c: (1.0, 1.0),
                kernel: "gauss".to_string(),
                gaussian_kernel_eps: None,
                polynomial_kernel_constant: 1.0,
                polynomial_kernel_degree: 3.0,
            }),
            _ => Err(format!(
                "Unknown model type: {}. Valid options are: logistic, lda, tree, knn, naive_bayes, svm",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn fractions_outside_unit_interval_are_rejected() {
        for (t, v) in [(0.0, 0.2), (1.0, 0.2), (0.2, -0.1), (0.2, f64::NAN)] {
            let cfg = SplitConfig::new(1, t, v);
            assert!(matches!(
                cfg.validate(),
                Err(PipelineError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn stage_sizes_are_checked() {
        let mut cfg = PreprocessingConfig::default();
        cfg.n_bins = 1;
        assert!(cfg.validate().is_err());
        let mut cfg = PreprocessingConfig::default();
        cfg.n_components = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn components_are_bounded_by_feature_count() {
        let cfg = PreprocessingConfig {
            n_components: 5,
            ..PreprocessingConfig::default()
        };
        assert!(cfg.check_feature_count(5).is_ok());
        assert!(matches!(
            cfg.check_feature_count(4),
            Err(PipelineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn model_type_from_str_round_trips_kind() {
        for kind in ["logistic", "lda", "tree", "knn", "naive_bayes", "svm"] {
            let mt: ModelType = kind.parse().unwrap();
            assert_eq!(mt.kind(), kind);
            assert!(mt.validate().is_ok());
        }
        assert!("xgboost".parse::<ModelType>().is_err());
    }

    #[test]
    fn with_seed_sets_both_seeds() {
        let cfg = PipelineConfig::default().with_seed(7);
        assert_eq!(cfg.split.seed, 7);
        assert_eq!(cfg.preprocessing.seed, 7);
    }
}
