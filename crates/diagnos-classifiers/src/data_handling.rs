//! Data structures for labeled diagnostic feature tables.
//!
//! This module defines `Diagnosis`, `Record` and `Dataset`. A `Dataset` is
//! immutable once built: every operation that narrows or transforms it
//! returns a new value.
use std::fmt;
use std::str::FromStr;

use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Binary diagnostic label. `Malignant` is the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    Benign,
    Malignant,
}

impl Diagnosis {
    /// Both labels in table order (benign first).
    pub const ALL: [Diagnosis; 2] = [Diagnosis::Benign, Diagnosis::Malignant];

    pub fn index(self) -> usize {
        match self {
            Diagnosis::Benign => 0,
            Diagnosis::Malignant => 1,
        }
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Diagnosis::Benign),
            1 => Some(Diagnosis::Malignant),
            _ => None,
        }
    }

    pub fn is_positive(self) -> bool {
        self == Diagnosis::Malignant
    }

    pub fn other(self) -> Self {
        match self {
            Diagnosis::Benign => Diagnosis::Malignant,
            Diagnosis::Malignant => Diagnosis::Benign,
        }
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnosis::Benign => write!(f, "Benign"),
            Diagnosis::Malignant => write!(f, "Malignant"),
        }
    }
}

impl FromStr for Diagnosis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "b" | "benign" | "0" => Ok(Diagnosis::Benign),
            "m" | "malignant" | "1" => Ok(Diagnosis::Malignant),
            other => Err(format!("Unknown diagnosis label: '{}'", other)),
        }
    }
}

/// A single labeled feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub features: Vec<f64>,
    pub label: Diagnosis,
}

impl Record {
    pub fn new(features: Vec<f64>, label: Diagnosis) -> Self {
        Self { features, label }
    }
}

/// Per-class row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub benign: usize,
    pub malignant: usize,
}

impl ClassCounts {
    pub fn from_labels(y: &[Diagnosis]) -> Self {
        let malignant = y.iter().filter(|l| l.is_positive()).count();
        ClassCounts {
            benign: y.len() - malignant,
            malignant,
        }
    }

    pub fn get(&self, label: Diagnosis) -> usize {
        match label {
            Diagnosis::Benign => self.benign,
            Diagnosis::Malignant => self.malignant,
        }
    }

    pub fn total(&self) -> usize {
        self.benign + self.malignant
    }

    /// The smaller class, or `None` when both classes have the same count.
    pub fn minority(&self) -> Option<Diagnosis> {
        match self.benign.cmp(&self.malignant) {
            std::cmp::Ordering::Less => Some(Diagnosis::Benign),
            std::cmp::Ordering::Greater => Some(Diagnosis::Malignant),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// An ordered, immutable table of labeled records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array2<f64>,
    y: Vec<Diagnosis>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset from a feature matrix (rows are records) and labels.
    ///
    /// When `feature_names` is empty, names are generated as `feature_<i>`.
    pub fn new(x: Array2<f64>, y: Vec<Diagnosis>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(PipelineError::ShapeMismatch {
                context: "dataset labels",
                expected: x.nrows(),
                found: y.len(),
            });
        }
        let feature_names = if feature_names.is_empty() {
            (0..x.ncols()).map(|i| format!("feature_{}", i)).collect()
        } else {
            feature_names
        };
        if feature_names.len() != x.ncols() {
            return Err(PipelineError::ShapeMismatch {
                context: "dataset feature names",
                expected: x.ncols(),
                found: feature_names.len(),
            });
        }
        Ok(Self {
            x,
            y,
            feature_names,
        })
    }

    /// Build a dataset from records that all share the same dimensionality.
    pub fn from_records(records: &[Record], feature_names: Vec<String>) -> Result<Self> {
        let first = records
            .first()
            .ok_or(PipelineError::EmptyDataset("Dataset::from_records"))?;
        let n_features = first.features.len();

        let mut data = Vec::with_capacity(records.len() * n_features);
        let mut labels = Vec::with_capacity(records.len());
        for record in records {
            if record.features.len() != n_features {
                return Err(PipelineError::ShapeMismatch {
                    context: "record features",
                    expected: n_features,
                    found: record.features.len(),
                });
            }
            data.extend_from_slice(&record.features);
            labels.push(record.label);
        }

        let x = Array2::from_shape_vec((records.len(), n_features), data).map_err(|_| {
            PipelineError::ShapeMismatch {
                context: "record matrix",
                expected: records.len() * n_features,
                found: labels.len() * n_features,
            }
        })?;
        Self::new(x, labels, feature_names)
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &[Diagnosis] {
        &self.y
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn row(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.x.row(idx)
    }

    pub fn record(&self, idx: usize) -> Record {
        Record::new(self.x.row(idx).to_vec(), self.y[idx])
    }

    pub fn class_counts(&self) -> ClassCounts {
        ClassCounts::from_labels(&self.y)
    }

    /// Rows at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select(Axis(0), indices),
            y: indices.iter().map(|&i| self.y[i]).collect(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Same labels, new feature matrix of the same width.
    pub fn with_features(&self, x: Array2<f64>) -> Result<Dataset> {
        Dataset::new(x, self.y.clone(), self.feature_names.clone())
    }

    /// Same labels, new feature matrix with columns named `<prefix><n>`
    /// (1-based), e.g. the output of a projection.
    pub fn with_prefixed_features(&self, x: Array2<f64>, prefix: &str) -> Result<Dataset> {
        let names = (0..x.ncols()).map(|i| format!("{}{}", prefix, i + 1)).collect();
        Dataset::new(x, self.y.clone(), names)
    }

    pub fn log_summary(&self, name: &str) {
        let counts = self.class_counts();
        log::info!(
            "{}: {} records ({} benign / {} malignant), {} features",
            name,
            self.len(),
            counts.benign,
            counts.malignant,
            self.n_features()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Dataset {
        let records = vec![
            Record::new(vec![1.0, 2.0], Diagnosis::Benign),
            Record::new(vec![3.0, 4.0], Diagnosis::Malignant),
            Record::new(vec![5.0, 6.0], Diagnosis::Benign),
        ];
        Dataset::from_records(&records, vec![]).unwrap()
    }

    #[test]
    fn from_records_builds_matrix_in_order() {
        let ds = toy();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.x()[(1, 1)], 4.0);
        assert_eq!(ds.feature_names(), &["feature_0", "feature_1"]);
        assert_eq!(ds.record(2).label, Diagnosis::Benign);
    }

    #[test]
    fn from_records_rejects_ragged_rows() {
        let records = vec![
            Record::new(vec![1.0, 2.0], Diagnosis::Benign),
            Record::new(vec![3.0], Diagnosis::Malignant),
        ];
        assert!(matches!(
            Dataset::from_records(&records, vec![]),
            Err(PipelineError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn empty_records_are_rejected() {
        assert!(matches!(
            Dataset::from_records(&[], vec![]),
            Err(PipelineError::EmptyDataset(_))
        ));
    }

    #[test]
    fn select_and_counts() {
        let ds = toy();
        let sub = ds.select(&[2, 1]);
        assert_eq!(sub.y(), &[Diagnosis::Benign, Diagnosis::Malignant]);
        assert_eq!(sub.x()[(0, 0)], 5.0);
        let counts = ds.class_counts();
        assert_eq!(counts.benign, 2);
        assert_eq!(counts.malignant, 1);
        assert_eq!(counts.minority(), Some(Diagnosis::Malignant));
    }

    #[test]
    fn diagnosis_parses_common_spellings() {
        assert_eq!("M".parse::<Diagnosis>().unwrap(), Diagnosis::Malignant);
        assert_eq!(" b ".parse::<Diagnosis>().unwrap(), Diagnosis::Benign);
        assert_eq!("malignant".parse::<Diagnosis>().unwrap(), Diagnosis::Malignant);
        assert!("x".parse::<Diagnosis>().is_err());
    }
}
