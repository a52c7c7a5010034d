//! Pipeline step traits

use crate::error::{ClassifierError, Result};
use crate::search::{ParamValue, Params};
use ndarray::Array2;
use std::fmt;

/// Class label
pub type Label = i64;

/// Data flowing between pipeline steps
#[derive(Debug, Clone)]
pub enum Features {
    /// Raw text documents
    Documents(Vec<String>),
    /// Numeric sample-by-feature matrix
    Matrix(Array2<f64>),
}

impl Features {
    pub fn n_samples(&self) -> usize {
        match self {
            Features::Documents(docs) => docs.len(),
            Features::Matrix(m) => m.nrows(),
        }
    }

    /// Borrow as documents or fail
    pub fn as_documents(&self) -> Result<&[String]> {
        match self {
            Features::Documents(docs) => Ok(docs),
            Features::Matrix(_) => Err(ClassifierError::ValidationError(
                "expected raw documents, got a numeric matrix".to_string(),
            )),
        }
    }

    /// Take the numeric matrix or fail
    pub fn into_matrix(self) -> Result<Array2<f64>> {
        match self {
            Features::Matrix(m) => Ok(m),
            Features::Documents(_) => Err(ClassifierError::ValidationError(
                "expected a numeric matrix, got raw documents".to_string(),
            )),
        }
    }
}

/// Unsupervised stage that maps features to features
pub trait Transformer: Send + Sync + fmt::Debug {
    /// Learn state from `input` and return its transformation
    fn fit_transform(&mut self, input: Features) -> Result<Features>;

    /// Transform with previously learned state
    fn transform(&self, input: Features) -> Result<Features>;

    /// Set one hyperparameter by its unqualified name
    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()>;

    /// Current hyperparameters by unqualified name
    fn params(&self) -> Params;

    fn clone_box(&self) -> Box<dyn Transformer>;
}

/// Supervised final stage
pub trait Estimator: Send + Sync + fmt::Debug {
    fn fit(&mut self, x: &Array2<f64>, y: &[Label]) -> Result<()>;

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Label>>;

    /// Set one hyperparameter by its unqualified name
    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()>;

    /// Current hyperparameters by unqualified name
    fn params(&self) -> Params;

    fn clone_box(&self) -> Box<dyn Estimator>;
}

impl Clone for Box<dyn Transformer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Clone for Box<dyn Estimator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Error for a value a step does not accept
pub fn invalid_param(name: &str, value: &ParamValue, reason: impl Into<String>) -> ClassifierError {
    ClassifierError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Error for a name a step does not know; the pipeline fills in the step name
pub fn unknown_param(name: &str) -> ClassifierError {
    ClassifierError::UnknownParameter {
        step: String::new(),
        name: name.to_string(),
    }
}

/// Require a float parameter, optionally bounded below
pub fn expect_float(name: &str, value: &ParamValue, min_exclusive: Option<f64>) -> Result<f64> {
    let v = value
        .as_float()
        .ok_or_else(|| invalid_param(name, value, "expected a number"))?;
    if !v.is_finite() {
        return Err(invalid_param(name, value, "must be finite"));
    }
    if let Some(min) = min_exclusive {
        if v <= min {
            return Err(invalid_param(name, value, format!("must be > {}", min)));
        }
    }
    Ok(v)
}

/// Require a positive integer parameter
pub fn expect_positive_int(name: &str, value: &ParamValue) -> Result<usize> {
    match value.as_usize() {
        Some(v) if v > 0 => Ok(v),
        _ => Err(invalid_param(name, value, "expected a positive integer")),
    }
}

pub fn expect_bool(name: &str, value: &ParamValue) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| invalid_param(name, value, "expected true or false"))
}
