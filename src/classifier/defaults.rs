//! Default pipeline and parameter grid

use crate::error::Result;
use crate::feature_engineering::{CountVectorizer, TfidfTransformer};
use crate::pipeline::Pipeline;
use crate::search::ParamGrid;
use crate::training::{SGDClassifier, SGDConfig};

/// `vect` counts → `tfidf` weighting → `clf` linear SGD without early stopping
pub fn default_pipeline() -> Result<Pipeline> {
    let sgd = SGDConfig {
        tol: None,
        ..SGDConfig::default()
    };

    Pipeline::builder()
        .transformer("vect", CountVectorizer::new())
        .transformer("tfidf", TfidfTransformer::new())
        .estimator("clf", SGDClassifier::new(sgd))
        .build()
}

/// Three document-frequency ceilings with a short, fixed epoch budget
pub fn default_param_grid() -> ParamGrid {
    ParamGrid::new()
        .add("vect__max_df", vec![0.5, 0.75, 1.0])
        .add("clf__max_iter", vec![5])
}
