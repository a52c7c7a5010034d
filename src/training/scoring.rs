//! Classification scoring metrics

use crate::error::{ClassifierError, Result};
use crate::pipeline::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Metric used to rank candidates; higher is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scoring {
    /// Fraction of correctly classified samples
    #[default]
    Accuracy,
    /// Unweighted mean of per-class F1 scores
    F1Macro,
}

impl Scoring {
    /// Score predictions against ground truth
    pub fn score(&self, y_true: &[Label], y_pred: &[Label]) -> Result<f64> {
        if y_true.len() != y_pred.len() {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} predictions", y_true.len()),
                actual: format!("{} predictions", y_pred.len()),
            });
        }
        if y_true.is_empty() {
            return Err(ClassifierError::ValidationError(
                "cannot score an empty set of predictions".to_string(),
            ));
        }

        Ok(match self {
            Scoring::Accuracy => accuracy(y_true, y_pred),
            Scoring::F1Macro => f1_macro(y_true, y_pred),
        })
    }
}

impl fmt::Display for Scoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scoring::Accuracy => write!(f, "accuracy"),
            Scoring::F1Macro => write!(f, "f1_macro"),
        }
    }
}

fn accuracy(y_true: &[Label], y_pred: &[Label]) -> f64 {
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

fn f1_macro(y_true: &[Label], y_pred: &[Label]) -> f64 {
    let classes: BTreeSet<Label> = y_true.iter().chain(y_pred).copied().collect();

    let total: f64 = classes
        .iter()
        .map(|&c| {
            let tp = y_true.iter().zip(y_pred).filter(|(&t, &p)| t == c && p == c).count() as f64;
            let fp = y_true.iter().zip(y_pred).filter(|(&t, &p)| t != c && p == c).count() as f64;
            let fn_ = y_true.iter().zip(y_pred).filter(|(&t, &p)| t == c && p != c).count() as f64;
            let denom = 2.0 * tp + fp + fn_;
            if denom > 0.0 { 2.0 * tp / denom } else { 0.0 }
        })
        .sum();

    total / classes.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let score = Scoring::Accuracy.score(&[0, 1, 1, 0], &[0, 1, 0, 0]).unwrap();
        assert!((score - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_f1_macro_perfect() {
        let score = Scoring::F1Macro.score(&[0, 1, 2], &[0, 1, 2]).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_f1_macro_partial() {
        // class 0: tp=1 fp=1 fn=0 -> 2/3; class 1: tp=0 fp=0 fn=1 -> 0
        let score = Scoring::F1Macro.score(&[0, 1], &[0, 0]).unwrap();
        assert!((score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let err = Scoring::Accuracy.score(&[0, 1], &[0]).unwrap_err();
        assert!(matches!(err, ClassifierError::ShapeError { .. }));
    }

    #[test]
    fn test_serde_names() {
        let s: Scoring = serde_json::from_str("\"f1_macro\"").unwrap();
        assert_eq!(s, Scoring::F1Macro);
        assert_eq!(Scoring::default().to_string(), "accuracy");
    }
}
