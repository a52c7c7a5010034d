//! Model training module
//!
//! Provides the pieces a grid search needs to fit and judge a candidate:
//! - Stochastic Gradient Descent (SGD) linear classifier
//! - K-Fold and Stratified K-Fold splitters
//! - Scoring functions

pub mod cross_validation;
pub mod scoring;
pub mod sgd;

pub use cross_validation::{CrossValidator, CVStrategy, CVSplit, CVResults};
pub use scoring::Scoring;
pub use sgd::{LearningRateSchedule, Penalty, SGDClassifier, SGDConfig, SGDLoss};
