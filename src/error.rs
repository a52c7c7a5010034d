//! Error types for the newsgroups classifier

use thiserror::Error;

/// Result type alias for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Broad category of a [`ClassifierError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The pipeline, grid or search settings are invalid
    Configuration,
    /// Something failed while fitting or loading data
    Execution,
    /// A fit result was requested before a successful fit
    NotAvailable,
}

/// Main error type for the classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Unknown pipeline step '{step}' referenced by parameter '{param}'")]
    UnknownStep { step: String, param: String },

    #[error("Step '{step}' has no parameter '{name}'")]
    UnknownParameter { step: String, name: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: String,
        #[source]
        source: Box<ClassifierError>,
    },

    #[error("Candidate {index} ({params}) failed on fold {fold}: {source}")]
    CandidateFailed {
        index: usize,
        params: String,
        fold: usize,
        #[source]
        source: Box<ClassifierError>,
    },

    #[error("None of the {n_candidates} candidates produced a valid score; first failure: {first_failure}")]
    NoValidCandidate {
        n_candidates: usize,
        first_failure: String,
    },

    #[error("{0} is not available before a successful fit")]
    NotAvailable(&'static str),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ClassifierError {
    /// Wrap an error with the name of the pipeline stage that produced it
    pub fn in_stage(stage: impl Into<String>, source: ClassifierError) -> Self {
        ClassifierError::StageFailed {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// Classify the error, looking through stage and candidate wrappers
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassifierError::ConfigError(_)
            | ClassifierError::InvalidParameter { .. }
            | ClassifierError::UnknownStep { .. }
            | ClassifierError::UnknownParameter { .. } => ErrorKind::Configuration,
            ClassifierError::NotAvailable(_) => ErrorKind::NotAvailable,
            ClassifierError::StageFailed { source, .. }
            | ClassifierError::CandidateFailed { source, .. } => match source.kind() {
                ErrorKind::Configuration => ErrorKind::Configuration,
                _ => ErrorKind::Execution,
            },
            _ => ErrorKind::Execution,
        }
    }

    /// Whether the error stems from invalid configuration
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Whether the error signals a fit result that does not exist yet
    pub fn is_not_available(&self) -> bool {
        self.kind() == ErrorKind::NotAvailable
    }
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ClassifierError {
    fn from(err: ndarray::ShapeError) -> Self {
        ClassifierError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClassifierError::NotAvailable("best_score");
        assert_eq!(err.to_string(), "best_score is not available before a successful fit");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ClassifierError = io_err.into();
        assert!(matches!(err, ClassifierError::IoError(_)));
        assert_eq!(err.kind(), ErrorKind::Execution);
    }

    #[test]
    fn test_kind_looks_through_stage() {
        let inner = ClassifierError::InvalidParameter {
            name: "max_df".into(),
            value: "-1".into(),
            reason: "must be positive".into(),
        };
        let err = ClassifierError::in_stage("vect", inner);
        assert!(err.is_configuration());
        assert!(err.to_string().contains("vect"));

        let err = ClassifierError::in_stage("clf", ClassifierError::TrainingError("boom".into()));
        assert_eq!(err.kind(), ErrorKind::Execution);
    }

    #[test]
    fn test_not_available_kind() {
        assert!(ClassifierError::NotAvailable("best_params").is_not_available());
        assert!(!ClassifierError::ModelNotFitted.is_not_available());
    }
}
