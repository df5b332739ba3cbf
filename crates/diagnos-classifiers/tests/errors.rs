//! One scenario per fatal error kind.
mod common;

use diagnos_classifiers::config::{ModelConfig, ModelType, PipelineConfig, PreprocessingConfig};
use diagnos_classifiers::data_handling::{Dataset, Diagnosis, Record};
use diagnos_classifiers::evaluation::{fit_models, ConfusionMatrix};
use diagnos_classifiers::models::{build_model, ModelRegistry};
use diagnos_classifiers::preprocessing::{
    Discretizer, FeaturePipeline, FittedTransform, Pca, Smote, Standardizer, Transform,
};
use diagnos_classifiers::runner::run;
use diagnos_classifiers::PipelineError;
use ndarray::{array, Array2};

#[test]
fn empty_registry_is_invalid_configuration() {
    let mut config = PipelineConfig::default();
    config.models = ModelRegistry::new(vec![]);
    let ds = common::synthetic_dataset(40, 20, 4, 31);
    assert!(matches!(
        run(&ds, &config),
        Err(PipelineError::InvalidConfiguration(_))
    ));
}

#[test]
fn constant_training_column_is_degenerate() {
    let ds = common::synthetic_dataset(40, 20, 3, 32);
    let mut x: Array2<f64> = ds.x().clone();
    x.column_mut(1).fill(4.2);
    let ds = Dataset::new(x, ds.y().to_vec(), vec![]).unwrap();
    assert!(matches!(
        FeaturePipeline::default().fit(&ds),
        Err(PipelineError::DegenerateFeature {
            stage: "standardizer",
            feature: 1
        })
    ));
    assert!(matches!(
        Discretizer::new(4).fit(array![[1.0], [1.0]].view()),
        Err(PipelineError::DegenerateFeature { .. })
    ));
}

#[test]
fn too_few_minority_rows_cannot_be_oversampled() {
    let ds = common::synthetic_dataset(11, 3, 5, 33);
    match Smote::new(5, 42).balance(&ds) {
        Err(PipelineError::InsufficientMinoritySamples {
            minority,
            available,
            required,
        }) => {
            assert_eq!(minority, Diagnosis::Malignant);
            assert_eq!(available, 3);
            assert_eq!(required, 6);
        }
        other => panic!("expected InsufficientMinoritySamples, got {:?}", other.map(|_| ())),
    }

    let single_class = Dataset::new(array![[0.0], [1.0], [2.0]], common::labels(3, 0), vec![]).unwrap();
    assert!(matches!(
        Smote::new(1, 0).balance(&single_class),
        Err(PipelineError::InsufficientMinoritySamples { available: 0, .. })
    ));
}

#[test]
fn zero_variance_projection_is_numerically_unstable() {
    let x = Array2::<f64>::from_elem((5, 3), 2.0);
    assert!(matches!(
        Pca::new(2).fit(x.view()),
        Err(PipelineError::NumericalInstability { .. })
    ));
}

#[test]
fn wrong_width_is_a_shape_mismatch() {
    let ds = common::synthetic_dataset(20, 20, 4, 34);
    let scaler = Standardizer::new().fit(ds.x().view()).unwrap();
    assert!(matches!(
        scaler.apply(array![[1.0, 2.0]].view()),
        Err(PipelineError::ShapeMismatch { expected: 4, found: 2, .. })
    ));
    assert!(matches!(
        ConfusionMatrix::from_predictions(&common::labels(2, 0), &common::labels(1, 0)),
        Err(PipelineError::ShapeMismatch { .. })
    ));
}

#[test]
fn empty_input_is_reported() {
    assert!(matches!(
        Dataset::from_records(&[] as &[Record], vec![]),
        Err(PipelineError::EmptyDataset(_))
    ));
    let empty = Array2::<f64>::zeros((0, 3));
    assert!(matches!(
        Standardizer::new().fit(empty.view()),
        Err(PipelineError::EmptyDataset(_))
    ));
}

#[test]
fn predicting_before_fit_is_not_fitted() {
    for kind in ["logistic", "lda", "tree", "knn", "naive_bayes", "svm"] {
        let model = build_model(&ModelConfig::new(kind, kind.parse().unwrap()));
        assert!(
            matches!(model.predict(&array![[0.0]]), Err(PipelineError::NotFitted(_))),
            "{} predicted before fit",
            kind
        );
    }
}

#[test]
fn single_class_training_fails_model_fit() {
    let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 2.0]];
    let y = common::labels(3, 0);
    let registry = ModelRegistry::default();
    assert!(matches!(
        fit_models(&registry, &x, &y, &Default::default()),
        Err(PipelineError::ModelFit { .. })
    ));
}

#[test]
fn too_many_components_is_invalid_configuration() {
    let ds = common::synthetic_dataset(40, 20, 4, 35);
    let pipeline = FeaturePipeline::new(PreprocessingConfig {
        n_components: 5,
        ..PreprocessingConfig::default()
    });
    assert!(matches!(
        pipeline.fit(&ds),
        Err(PipelineError::InvalidConfiguration(_))
    ));
    assert!(ModelType::Knn { k: 0 }.validate().is_err());
}

#[test]
fn component_count_is_checked_before_any_stage_runs() {
    // too few malignant rows for SMOTE as well: the configuration error wins
    let ds = common::synthetic_dataset(36, 4, 4, 5);
    let mut config = PipelineConfig::default();
    config.preprocessing.n_components = 50;
    assert!(matches!(
        run(&ds, &config),
        Err(PipelineError::InvalidConfiguration(_))
    ));

    let pipeline = FeaturePipeline::new(PreprocessingConfig {
        n_components: 50,
        ..PreprocessingConfig::default()
    });
    assert!(matches!(
        pipeline.fit(&ds),
        Err(PipelineError::InvalidConfiguration(_))
    ));
}
