//! Fit-once/apply-many feature transformations.
//!
//! Every stage learns its parameters from the training partition only and
//! returns them as an immutable value. The fitted pipeline replays the same
//! stages on validation and test data without refitting, and never
//! oversamples them.
pub mod discretizer;
pub mod pca;
pub mod scaler;
pub mod smote;

use ndarray::{Array2, ArrayView2};

use crate::config::PreprocessingConfig;
use crate::data_handling::Dataset;
use crate::error::{PipelineError, Result};

pub use discretizer::{BinEdges, Discretizer};
pub use pca::{Pca, PcaModel, PrincipalComponent};
pub use scaler::{Scaler, Standardizer};
pub use smote::{BalanceSummary, Smote};

/// A stage before fitting: learns parameters from a training matrix.
pub trait Transform {
    type Fitted: FittedTransform;

    fn fit(&self, x: ArrayView2<f64>) -> Result<Self::Fitted>;
}

/// Parameters learned by a stage; applies them to any matrix.
pub trait FittedTransform: Send + Sync {
    fn n_features_in(&self) -> usize;

    fn apply(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;
}

pub(crate) fn check_width(context: &'static str, expected: usize, x: ArrayView2<f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(PipelineError::ShapeMismatch {
            context,
            expected,
            found: x.ncols(),
        });
    }
    Ok(())
}

/// Unfitted pipeline: standardize, discretize, balance, rescale, reduce.
#[derive(Clone, Debug, Default)]
pub struct FeaturePipeline {
    config: PreprocessingConfig,
}

/// Parameters of every stage, learned from one training partition.
#[derive(Clone, Debug)]
pub struct FittedPipeline {
    standardizer: Scaler,
    discretizer: BinEdges,
    rescaler: Scaler,
    reducer: PcaModel,
    balance: BalanceSummary,
}

impl FeaturePipeline {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    /// Fit every stage on `train` and return the fitted pipeline together
    /// with the transformed, class-balanced training set.
    pub fn fit_transform(&self, train: &Dataset) -> Result<(FittedPipeline, Dataset)> {
        self.config.validate()?;
        if train.is_empty() {
            return Err(PipelineError::EmptyDataset("feature pipeline"));
        }
        self.config.check_feature_count(train.n_features())?;

        let standardizer = Standardizer::new().fit(train.x().view())?;
        let standardized = standardizer.apply(train.x().view())?;

        let discretizer = Discretizer::new(self.config.n_bins).fit(standardized.view())?;
        let discretized = train.with_features(discretizer.apply(standardized.view())?)?;
        log::debug!(
            "Discretized {} features into {} bins",
            discretized.n_features(),
            self.config.n_bins
        );

        let (balanced, balance) =
            Smote::new(self.config.k_neighbors, self.config.seed).balance(&discretized)?;

        let rescaler = Standardizer::rescaler().fit(balanced.x().view())?;
        let rescaled = rescaler.apply(balanced.x().view())?;

        let reducer = Pca::new(self.config.n_components).fit(rescaled.view())?;
        let reduced = reducer.apply(rescaled.view())?;

        log::info!(
            "Fitted feature pipeline on {} training rows ({} after balancing), {} -> {} features",
            train.len(),
            balanced.len(),
            train.n_features(),
            reducer.n_components()
        );

        let fitted = FittedPipeline {
            standardizer,
            discretizer,
            rescaler,
            reducer,
            balance,
        };
        let train_out = balanced.with_prefixed_features(reduced, "PC")?;
        Ok((fitted, train_out))
    }

    pub fn fit(&self, train: &Dataset) -> Result<FittedPipeline> {
        self.fit_transform(train).map(|(fitted, _)| fitted)
    }
}

impl FittedPipeline {
    /// Stages replayed by `apply`, in order. The balancer is not among them.
    fn stages(&self) -> [&dyn FittedTransform; 4] {
        [
            &self.standardizer,
            &self.discretizer,
            &self.rescaler,
            &self.reducer,
        ]
    }

    /// Transform a feature matrix with the fitted parameters.
    pub fn apply_matrix(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        let mut current = x.to_owned();
        for stage in self.stages() {
            current = stage.apply(current.view())?;
        }
        Ok(current)
    }

    /// Transform a dataset; labels and row order are preserved.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset> {
        let x = self.apply_matrix(dataset.x().view())?;
        dataset.with_prefixed_features(x, "PC")
    }

    pub fn n_features_in(&self) -> usize {
        self.standardizer.n_features_in()
    }

    pub fn n_features_out(&self) -> usize {
        self.reducer.n_components()
    }

    pub fn standardizer(&self) -> &Scaler {
        &self.standardizer
    }

    pub fn discretizer(&self) -> &BinEdges {
        &self.discretizer
    }

    pub fn rescaler(&self) -> &Scaler {
        &self.rescaler
    }

    pub fn reducer(&self) -> &PcaModel {
        &self.reducer
    }

    pub fn balance(&self) -> &BalanceSummary {
        &self.balance
    }

    pub fn components(&self) -> Vec<PrincipalComponent> {
        self.reducer.components()
    }
}
