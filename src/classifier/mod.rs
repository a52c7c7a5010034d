//! Newsgroups text classifier
//!
//! Wraps a [`GridSearch`] over a text pipeline. Omitted pipeline or grid
//! fall back to [`default_pipeline`] and [`default_param_grid`].
//!
//! ```no_run
//! use newsgroups_classifier::classifier::NewsGroupsClassifier;
//!
//! let docs = vec!["god and faith".to_string(), "rocket launch".to_string()];
//! let mut clf = NewsGroupsClassifier::new(None, None)?;
//! clf.fit(&docs, &[0, 1])?;
//! println!("{}", clf.summary()?);
//! # Ok::<(), newsgroups_classifier::ClassifierError>(())
//! ```

mod defaults;

pub use defaults::{default_param_grid, default_pipeline};

use crate::error::Result;
use crate::pipeline::{Label, Pipeline};
use crate::search::{GridSearch, Metrics, ParamGrid, Params, SearchConfig, SearchResult, SummaryReport};
use std::fmt;

/// Grid-searched text classifier with a summary report
#[derive(Debug, Clone)]
pub struct NewsGroupsClassifier {
    search: GridSearch,
}

impl NewsGroupsClassifier {
    /// Classifier with the default search configuration
    pub fn new(pipeline: Option<Pipeline>, grid: Option<ParamGrid>) -> Result<Self> {
        Self::builder().pipeline_opt(pipeline).grid_opt(grid).build()
    }

    /// Default pipeline, grid and search configuration
    pub fn default_config() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn builder() -> NewsGroupsClassifierBuilder {
        NewsGroupsClassifierBuilder::default()
    }

    /// Search the grid on `documents` and keep the best pipeline
    pub fn fit(&mut self, documents: &[String], labels: &[Label]) -> Result<&SearchResult> {
        self.search.fit(documents, labels)
    }

    pub fn is_fitted(&self) -> bool {
        self.search.result().is_some()
    }

    pub fn search(&self) -> &GridSearch {
        &self.search
    }

    pub fn metrics(&self) -> Metrics<'_> {
        self.search.metrics()
    }

    pub fn best_estimator(&self) -> Result<&Pipeline> {
        self.search.metrics().best_estimator()
    }

    pub fn best_params(&self) -> Result<&Params> {
        self.search.metrics().best_params()
    }

    pub fn best_score(&self) -> Result<f64> {
        self.search.metrics().best_score()
    }

    pub fn summary(&self) -> Result<SummaryReport> {
        self.search.metrics().summary()
    }

    /// Write the summary report to stdout
    pub fn print_summary(&self) -> Result<()> {
        print!("{}", self.summary()?);
        Ok(())
    }
}

impl fmt::Display for NewsGroupsClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Newsgroups Classifier")
    }
}

/// Builder for [`NewsGroupsClassifier`]
#[derive(Debug, Default)]
pub struct NewsGroupsClassifierBuilder {
    pipeline: Option<Pipeline>,
    grid: Option<ParamGrid>,
    config: SearchConfig,
}

impl NewsGroupsClassifierBuilder {
    pub fn pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    fn pipeline_opt(mut self, pipeline: Option<Pipeline>) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn grid(mut self, grid: ParamGrid) -> Self {
        self.grid = Some(grid);
        self
    }

    fn grid_opt(mut self, grid: Option<ParamGrid>) -> Self {
        self.grid = grid;
        self
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<NewsGroupsClassifier> {
        let pipeline = match self.pipeline {
            Some(p) => p,
            None => default_pipeline()?,
        };
        let grid = self.grid.unwrap_or_else(default_param_grid);
        Ok(NewsGroupsClassifier {
            search: GridSearch::new(pipeline, grid, self.config)?,
        })
    }
}
