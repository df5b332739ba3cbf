mod common;

use diagnos_classifiers::config::{PreprocessingConfig, SplitConfig};
use diagnos_classifiers::data_handling::{Dataset, Diagnosis};
use diagnos_classifiers::partition::split;
use diagnos_classifiers::preprocessing::{
    FeaturePipeline, FittedTransform, Pca, Smote, Standardizer, Transform,
};
use ndarray::{Array2, Axis};

fn small_config() -> PreprocessingConfig {
    PreprocessingConfig {
        n_bins: 10,
        k_neighbors: 3,
        n_components: 4,
        seed: 42,
    }
}

#[test]
fn standardized_training_columns_have_unit_scale() {
    let ds = common::synthetic_dataset(40, 25, 6, 10);
    let scaler = Standardizer::new().fit(ds.x().view()).unwrap();
    let z = scaler.apply(ds.x().view()).unwrap();
    for col in z.axis_iter(Axis(1)) {
        let mean = col.mean().unwrap();
        let std = col.std(0.0);
        assert!(mean.abs() < 1e-9, "mean = {}", mean);
        assert!((std - 1.0).abs() < 1e-9, "std = {}", std);
    }
}

#[test]
fn eleven_to_three_balances_to_twenty_two() {
    let ds = common::synthetic_dataset(11, 3, 5, 11);
    let (balanced, summary) = Smote::new(2, 42).balance(&ds).unwrap();
    assert_eq!(balanced.len(), 22);
    let counts = balanced.class_counts();
    assert_eq!(counts.benign, 11);
    assert_eq!(counts.malignant, 11);
    assert_eq!(summary.minority, Some(Diagnosis::Malignant));
    assert_eq!(summary.synthetic, 8);
    // originals first, unchanged
    for i in 0..ds.len() {
        assert_eq!(balanced.row(i), ds.row(i));
    }
}

#[test]
fn pca_on_standardized_matrix_keeps_two_unit_components() {
    let ds = common::synthetic_dataset(30, 30, 10, 12);
    let z = Standardizer::new()
        .fit(ds.x().view())
        .unwrap()
        .apply(ds.x().view())
        .unwrap();
    let model = Pca::new(2).fit(z.view()).unwrap();
    let components = model.components();

    assert_eq!(components.len(), 2);
    for pc in &components {
        assert_eq!(pc.weights.len(), 10);
    }
    let dot = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f64>();
    assert!((dot(&components[0].weights, &components[0].weights) - 1.0).abs() < 1e-8);
    assert!((dot(&components[1].weights, &components[1].weights) - 1.0).abs() < 1e-8);
    assert!(dot(&components[0].weights, &components[1].weights).abs() < 1e-8);

    let ratios = model.explained_variance_ratio();
    assert!(ratios[0] >= ratios[1]);
    assert!(ratios.iter().sum::<f64>() <= 1.0 + 1e-12);
    assert!(ratios.iter().all(|r| *r >= 0.0));
}

#[test]
fn explained_variance_ratios_never_increase() {
    let ds = common::synthetic_dataset(40, 25, 10, 17);
    let z = Standardizer::new()
        .fit(ds.x().view())
        .unwrap()
        .apply(ds.x().view())
        .unwrap();
    let model = Pca::new(6).fit(z.view()).unwrap();

    let ratios = model.explained_variance_ratio();
    assert_eq!(ratios.len(), 6);
    assert!(ratios.windows(2).all(|w| w[0] >= w[1]), "{:?}", ratios);
    assert!(ratios.iter().sum::<f64>() <= 1.0 + 1e-12);
}

#[test]
fn pipeline_balances_training_and_projects_every_partition() {
    let ds = common::synthetic_dataset(70, 30, 8, 13);
    let split = split(&ds, &SplitConfig::default()).unwrap();
    let (fitted, train) = FeaturePipeline::new(small_config())
        .fit_transform(&split.train)
        .unwrap();

    let counts = train.class_counts();
    assert_eq!(counts.benign, counts.malignant);
    assert_eq!(train.n_features(), 4);
    assert_eq!(train.feature_names()[0], "PC1");

    let validation = fitted.apply(&split.validation).unwrap();
    assert_eq!(validation.len(), split.validation.len());
    assert_eq!(validation.y(), split.validation.y());
    assert_eq!(validation.n_features(), 4);
    assert_eq!(fitted.n_features_in(), 8);
    assert_eq!(fitted.n_features_out(), 4);
}

#[test]
fn fitted_parameters_ignore_held_out_rows() {
    let ds = common::synthetic_dataset(60, 30, 6, 14);
    let config = SplitConfig::default();
    let first = split(&ds, &config).unwrap();

    // same rows in train, wildly different validation/test rows
    let mut x: Array2<f64> = ds.x().clone();
    for &idx in first.validation_indices.iter().chain(&first.test_indices) {
        x.row_mut(idx).mapv_inplace(|v| v * 100.0 + 7.0);
    }
    let perturbed = Dataset::new(x, ds.y().to_vec(), ds.feature_names().to_vec()).unwrap();
    let second = split(&perturbed, &config).unwrap();
    assert_eq!(first.train_indices, second.train_indices);

    let pipeline = FeaturePipeline::new(small_config());
    let a = pipeline.fit(&first.train).unwrap();
    let b = pipeline.fit(&second.train).unwrap();
    assert_eq!(a.standardizer(), b.standardizer());
    assert_eq!(a.discretizer(), b.discretizer());
    assert_eq!(a.rescaler(), b.rescaler());
    assert_eq!(a.reducer(), b.reducer());
    assert_eq!(a.balance(), b.balance());
}

#[test]
fn fitting_twice_gives_identical_parameters() {
    let ds = common::synthetic_dataset(50, 25, 6, 15);
    let pipeline = FeaturePipeline::new(small_config());
    let a = pipeline.fit(&ds).unwrap();
    let b = pipeline.fit(&ds).unwrap();
    assert_eq!(a.reducer(), b.reducer());
    assert_eq!(
        a.apply_matrix(ds.x().view()).unwrap(),
        b.apply_matrix(ds.x().view()).unwrap()
    );
}
