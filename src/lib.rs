//! Newsgroups Classifier - grid-searched text classification
//!
//! This crate runs an exhaustive, cross-validated hyperparameter search over a
//! text pipeline and reports the best configuration it found:
//! - Bag-of-words counting and tf-idf weighting
//! - Linear classification by stochastic gradient descent
//! - Parallel grid search with stratified K-fold validation
//! - A summary report of the search
//!
//! # Modules
//!
//! ## Core
//! - [`pipeline`] - Named feature-extraction steps followed by a classifier
//! - [`search`] - Parameter grids, grid search and fit metrics
//! - [`classifier`] - The newsgroups classifier with its defaults
//!
//! ## Building blocks
//! - [`feature_engineering`] - Tokenizer, count vectorizer, tf-idf
//! - [`training`] - SGD classifier, cross-validation, scoring
//!
//! ## Utilities
//! - [`utils`] - Corpus loading and thread pools
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core
pub mod pipeline;
pub mod search;
pub mod classifier;

// Building blocks
pub mod feature_engineering;
pub mod training;

// Utilities
pub mod utils;
pub mod cli;

pub use error::{ClassifierError, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ClassifierError, ErrorKind, Result};

    // Pipeline
    pub use crate::pipeline::{Estimator, Features, Label, Pipeline, PipelineBuilder, Transformer};

    // Search
    pub use crate::search::{
        ErrorScore, GridSearch, Metrics, ParamGrid, ParamValue, Params, SearchConfig, SearchResult,
        SummaryReport,
    };

    // Classifier
    pub use crate::classifier::{default_param_grid, default_pipeline, NewsGroupsClassifier};

    // Feature engineering
    pub use crate::feature_engineering::{CountVectorizer, TfidfTransformer};

    // Training
    pub use crate::training::{SGDClassifier, SGDConfig, Scoring};

    // Data loading
    pub use crate::utils::{NewsgroupsLoader, TextDataset};
}
