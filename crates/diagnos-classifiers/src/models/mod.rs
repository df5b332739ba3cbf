pub mod classifier_trait;
pub mod factory;
pub mod knn;
pub mod lda;
pub mod logistic;
pub mod naive_bayes;
pub mod registry;
pub mod svm;
pub mod tree;
pub mod utils;

pub use classifier_trait::ClassifierModel;
pub use factory::build_model;
pub use registry::ModelRegistry;
