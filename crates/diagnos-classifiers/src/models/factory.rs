use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::knn::KnnClassifier;
use crate::models::lda::LdaClassifier;
use crate::models::logistic::LogisticClassifier;
use crate::models::naive_bayes::NaiveBayesClassifier;
use crate::models::svm::SVMClassifier;
use crate::models::tree::DecisionTreeClassifier;

/// Build a fresh, unfitted classifier from a `ModelConfig`.
pub fn build_model(params: &ModelConfig) -> Box<dyn ClassifierModel> {
    match params.model_type {
        ModelType::Logistic { .. } => Box::new(LogisticClassifier::new(params.clone())),
        ModelType::Lda { .. } => Box::new(LdaClassifier::new(params.clone())),
        ModelType::Tree { .. } => Box::new(DecisionTreeClassifier::new(params.clone())),
        ModelType::Knn { .. } => Box::new(KnnClassifier::new(params.clone())),
        ModelType::NaiveBayes { .. } => Box::new(NaiveBayesClassifier::new(params.clone())),
        ModelType::Svm { .. } => Box::new(SVMClassifier::new(params.clone())),
    }
}
