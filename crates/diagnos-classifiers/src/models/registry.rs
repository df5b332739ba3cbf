//! Ordered list of classifier variants evaluated by the harness.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelType};
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::factory::build_model;

/// Named classifier configurations. Results are always reported in this
/// order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct ModelRegistry {
    models: Vec<ModelConfig>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let entries = [
            ("Logistic Regression", "logistic"),
            ("Linear Discriminant Analysis", "lda"),
            ("Decision Tree", "tree"),
            ("K-Nearest Neighbors", "knn"),
            ("Naive Bayes", "naive_bayes"),
            ("Support Vector Machine", "svm"),
        ];
        let models = entries
            .iter()
            .filter_map(|(name, kind)| {
                kind.parse::<ModelType>()
                    .ok()
                    .map(|model_type| ModelConfig::new(*name, model_type))
            })
            .collect();
        Self { models }
    }
}

impl ModelRegistry {
    pub fn new(models: Vec<ModelConfig>) -> Self {
        Self { models }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelConfig> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    /// Non-empty, unique names, valid hyper-parameters.
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(PipelineError::config("model registry is empty"));
        }
        let mut seen = HashSet::new();
        for model in &self.models {
            if model.name.trim().is_empty() {
                return Err(PipelineError::config("model names must not be empty"));
            }
            if !seen.insert(model.name.as_str()) {
                return Err(PipelineError::config(format!(
                    "duplicate model name '{}'",
                    model.name
                )));
            }
            model.model_type.validate()?;
        }
        Ok(())
    }

    /// Fresh, unfitted classifiers in registry order.
    pub fn instantiate(&self) -> Vec<Box<dyn ClassifierModel>> {
        self.models.iter().map(build_model).collect()
    }
}

impl<'a> IntoIterator for &'a ModelRegistry {
    type Item = &'a ModelConfig;
    type IntoIter = std::slice::Iter<'a, ModelConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}

impl FromIterator<ModelConfig> for ModelRegistry {
    fn from_iter<I: IntoIterator<Item = ModelConfig>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
