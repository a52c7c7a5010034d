//! Grid search configuration

use crate::error::{ClassifierError, Result};
use crate::training::Scoring;
use serde::{Deserialize, Serialize};

/// What to do when a candidate fails on a fold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScore {
    /// Mark the candidate invalid and keep searching
    #[default]
    Skip,
    /// Abort the search
    Raise,
}

/// Configuration for exhaustive cross-validated search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of cross-validation folds
    pub cv_folds: usize,

    /// Number of parallel workers (None = all available)
    pub n_jobs: Option<usize>,

    /// Progress verbosity; 0 is silent
    pub verbose: u8,

    /// Metric to maximize
    pub scoring: Scoring,

    pub error_score: ErrorScore,

    /// Seed for shuffled splits
    pub random_state: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cv_folds: 5,
            n_jobs: None,
            verbose: 1,
            scoring: Scoring::Accuracy,
            error_score: ErrorScore::Skip,
            random_state: Some(42),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the fold count
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Builder method to set the worker count
    pub fn with_n_jobs(mut self, n: usize) -> Self {
        self.n_jobs = Some(n);
        self
    }

    pub fn with_verbose(mut self, level: u8) -> Self {
        self.verbose = level;
        self
    }

    pub fn with_scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_error_score(mut self, error_score: ErrorScore) -> Self {
        self.error_score = error_score;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Reject settings the search cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.cv_folds < 2 {
            return Err(ClassifierError::ConfigError(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.n_jobs == Some(0) {
            return Err(ClassifierError::ConfigError(
                "n_jobs must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.cv_folds, 5);
        assert_eq!(config.n_jobs, None);
        assert_eq!(config.verbose, 1);
        assert_eq!(config.error_score, ErrorScore::Skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(SearchConfig::new().with_cv_folds(1).validate().is_err());
        let err = SearchConfig::new().with_n_jobs(0).validate().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"cv_folds": 3, "error_score": "raise"}"#).unwrap();
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.error_score, ErrorScore::Raise);
        assert_eq!(config.scoring, Scoring::Accuracy);
    }
}
