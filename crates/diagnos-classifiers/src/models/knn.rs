use ndarray::Array2;

use crate::config::{ModelConfig, ModelType};
use crate::data_handling::Diagnosis;
use crate::error::{PipelineError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_prediction_width, check_training_data, fit_error, wrong_params};
use crate::neighbors::k_nearest;

/// k-nearest-neighbors majority vote under Euclidean distance.
///
/// Fitting only memorizes the training rows. A tied vote goes to benign.
pub struct KnnClassifier {
    train: Option<(Array2<f64>, Vec<Diagnosis>)>,
    k: usize,
    params: ModelConfig,
}

impl KnnClassifier {
    pub fn new(params: ModelConfig) -> Self {
        KnnClassifier {
            train: None,
            k: 0,
            params,
        }
    }
}

impl ClassifierModel for KnnClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[Diagnosis]) -> Result<()> {
        let ModelType::Knn { k } = self.params.model_type else {
            return Err(wrong_params(&self.params.name, "knn"));
        };
        check_training_data(&self.params.name, x, y)?;
        if k == 0 || k > x.nrows() {
            return Err(fit_error(
                &self.params.name,
                format!("k = {} needs between 1 and {} training rows", k, x.nrows()),
            ));
        }
        self.k = k;
        self.train = Some((x.clone(), y.to_vec()));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Diagnosis>> {
        let (train_x, train_y) = self
            .train
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(self.params.name.clone()))?;
        check_prediction_width(train_x.ncols(), x)?;

        Ok(x
            .outer_iter()
            .map(|row| {
                let neighbors = k_nearest(train_x.view(), row, self.k, None);
                let malignant = neighbors
                    .iter()
                    .filter(|&&i| train_y[i].is_positive())
                    .count();
                if 2 * malignant > neighbors.len() {
                    Diagnosis::Malignant
                } else {
                    Diagnosis::Benign
                }
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.params.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn knn(k: usize) -> KnnClassifier {
        KnnClassifier::new(ModelConfig::new("K-Nearest Neighbors", ModelType::Knn { k }))
    }

    #[test]
    fn majority_of_neighbors_wins() {
        let x = array![[0.0], [0.5], [1.0], [10.0], [10.5], [11.0]];
        let y = [
            Diagnosis::Benign,
            Diagnosis::Benign,
            Diagnosis::Benign,
            Diagnosis::Malignant,
            Diagnosis::Malignant,
            Diagnosis::Malignant,
        ];
        let mut model = knn(3);
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&array![[0.2], [10.9], [4.0]]).unwrap();
        assert_eq!(
            preds,
            vec![Diagnosis::Benign, Diagnosis::Malignant, Diagnosis::Benign]
        );
    }

    #[test]
    fn tied_vote_is_benign() {
        let x = array![[0.0], [2.0]];
        let y = [Diagnosis::Malignant, Diagnosis::Benign];
        let mut model = knn(2);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&array![[1.0]]).unwrap(), vec![Diagnosis::Benign]);
    }

    #[test]
    fn k_larger_than_training_set_fails() {
        let x = array![[0.0], [1.0]];
        let y = [Diagnosis::Benign, Diagnosis::Malignant];
        assert!(matches!(
            knn(3).fit(&x, &y),
            Err(PipelineError::ModelFit { .. })
        ));
    }

    #[test]
    fn predict_before_fit_fails() {
        assert!(matches!(
            knn(1).predict(&array![[0.0]]),
            Err(PipelineError::NotFitted(_))
        ));
    }
}
