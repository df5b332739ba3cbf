//! diagnos-classifiers: feature pipeline and evaluation harness for tabular
//! diagnostic data.
//!
//! The crate splits a labeled dataset into train/validation/test partitions,
//! fits a chain of feature transformations on the training partition only
//! (standardization, uniform discretization, SMOTE balancing, rescaling and a
//! variance-ranked projection), trains a registry of classifier variants and
//! scores each of them on the held-out partitions.
//!
//! Fitted stage parameters are plain immutable values returned by `fit` and
//! threaded into `apply`, so nothing fitted on the training partition can be
//! refitted on validation or test data by accident.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod io;
pub mod models;
pub mod neighbors;
pub mod partition;
pub mod preprocessing;
pub mod report;
pub mod runner;

pub use error::{PipelineError, Result};
