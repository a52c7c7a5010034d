//! Exhaustive cross-validated search over a parameter grid

use super::config::{ErrorScore, SearchConfig};
use super::grid::{format_params, ParamGrid, Params};
use super::metrics::Metrics;
use crate::error::{ClassifierError, Result};
use crate::pipeline::{Label, Pipeline};
use crate::training::{CVResults, CVSplit, CVStrategy, CrossValidator, Scoring};
use crate::utils::{parallel_map_with_config, ParallelConfig};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Cross-validation outcome of one parameter combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    pub params: Params,
    /// Score per fold; `None` where the fold failed
    pub fold_scores: Vec<Option<f64>>,
    /// Mean over folds; `None` when any fold failed
    pub mean_score: Option<f64>,
    pub std_score: Option<f64>,
    /// 1 is best; invalid candidates share the rank after the last valid one
    pub rank: usize,
}

impl CandidateResult {
    pub fn is_valid(&self) -> bool {
        self.mean_score.is_some()
    }
}

/// Outcome of a successful search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Pipeline set to the best parameters and refit on all data
    pub best_estimator: Pipeline,
    /// Best values for exactly the grid's parameter names
    pub best_params: Params,
    /// Mean cross-validated score of the best candidate
    pub best_score: f64,
    pub best_index: usize,
    pub cv_results: Vec<CandidateResult>,
    pub n_splits: usize,
    pub elapsed_secs: f64,
}

/// Exhaustive grid search over a pipeline
#[derive(Debug, Clone)]
pub struct GridSearch {
    pipeline: Pipeline,
    grid: ParamGrid,
    config: SearchConfig,
    result: Option<SearchResult>,
}

impl GridSearch {
    /// Validate `config` and `grid` against `pipeline` and set up the search
    ///
    /// Every candidate value is applied to a scratch copy of the pipeline, so
    /// unknown steps, unknown parameters and rejected values surface here
    /// rather than during fit.
    pub fn new(pipeline: Pipeline, grid: ParamGrid, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        grid.validate()?;

        let mut scratch = pipeline.clone();
        for (name, values) in grid.iter() {
            for value in values.values() {
                scratch.set_param(name, value)?;
            }
        }

        Ok(Self {
            pipeline,
            grid,
            config,
            result: None,
        })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Result of the last successful fit
    pub fn result(&self) -> Option<&SearchResult> {
        self.result.as_ref()
    }

    pub fn metrics(&self) -> Metrics<'_> {
        Metrics::new(self)
    }

    /// Run the search on `documents` and `labels`
    ///
    /// Blocks until every candidate has been evaluated on every fold and the
    /// best one refit. On failure the previous result, if any, is kept.
    pub fn fit(&mut self, documents: &[String], labels: &[Label]) -> Result<&SearchResult> {
        let start = Instant::now();
        let splits = self.make_splits(documents, labels)?;
        let candidates = self.grid.candidates();
        let n_splits = splits.len();

        if self.config.verbose >= 1 {
            tracing::info!(
                "Fitting {} folds for each of {} candidates, totalling {} fits",
                n_splits,
                candidates.len(),
                n_splits * candidates.len()
            );
        }

        let tasks: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..n_splits).map(move |f| (c, f)))
            .collect();

        let pool_config = ParallelConfig {
            n_threads: self.config.n_jobs,
        };
        let pipeline = &self.pipeline;
        let scoring = self.config.scoring;
        let outcomes = parallel_map_with_config(tasks, &pool_config, |(c, f)| {
            let score = evaluate(pipeline, &candidates[c], &splits[f], documents, labels, scoring);
            (c, f, score)
        })?;

        let mut fold_scores: Vec<Vec<Option<f64>>> = vec![vec![None; n_splits]; candidates.len()];
        let mut first_failure: Option<ClassifierError> = None;
        for (c, f, outcome) in outcomes {
            match outcome {
                Ok(score) => fold_scores[c][f] = Some(score),
                Err(source) => {
                    let err = ClassifierError::CandidateFailed {
                        index: c,
                        params: format_params(&candidates[c]),
                        fold: f,
                        source: Box::new(source),
                    };
                    if self.config.error_score == ErrorScore::Raise {
                        return Err(err);
                    }
                    tracing::warn!("{}; candidate skipped", err);
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                }
            }
        }

        let mut cv_results: Vec<CandidateResult> = candidates
            .into_iter()
            .zip(fold_scores)
            .map(|(params, scores)| {
                let complete: Option<Vec<f64>> = scores.iter().copied().collect();
                let stats = complete.map(CVResults::from_scores);
                CandidateResult {
                    params,
                    fold_scores: scores,
                    mean_score: stats.as_ref().map(|s| s.mean_score),
                    std_score: stats.as_ref().map(|s| s.std_score),
                    rank: 0,
                }
            })
            .collect();

        let ranking = rank_candidates(&mut cv_results);
        let best_index = match ranking.first() {
            Some(&idx) => idx,
            None => {
                return Err(ClassifierError::NoValidCandidate {
                    n_candidates: cv_results.len(),
                    first_failure: first_failure
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "no candidate was scored".to_string()),
                })
            }
        };

        if self.config.verbose >= 2 {
            for (idx, candidate) in cv_results.iter().enumerate() {
                match (candidate.mean_score, candidate.std_score) {
                    (Some(mean), Some(std)) => tracing::info!(
                        "[{}] {} mean={:.4} std={:.4} rank={}",
                        idx,
                        format_params(&candidate.params),
                        mean,
                        std,
                        candidate.rank
                    ),
                    _ => tracing::info!("[{}] {} invalid", idx, format_params(&candidate.params)),
                }
            }
        }

        let best = &cv_results[best_index];
        let best_params = best.params.clone();
        let best_score = best.mean_score.unwrap_or(f64::NAN);

        let mut best_estimator = self.pipeline.clone();
        best_estimator.set_params(&best_params)?;
        best_estimator.fit(documents, labels)?;

        let elapsed_secs = start.elapsed().as_secs_f64();
        if self.config.verbose >= 1 {
            tracing::info!(
                best_score,
                best_params = %format_params(&best_params),
                elapsed_secs,
                "Grid search complete"
            );
        }

        Ok(&*self.result.insert(SearchResult {
            best_estimator,
            best_params,
            best_score,
            best_index,
            cv_results,
            n_splits,
            elapsed_secs,
        }))
    }

    fn make_splits(&self, documents: &[String], labels: &[Label]) -> Result<Vec<CVSplit>> {
        if documents.len() != labels.len() {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} labels", documents.len()),
                actual: format!("{} labels", labels.len()),
            });
        }
        let n_samples = documents.len();
        if n_samples < 2 {
            return Err(ClassifierError::ValidationError(format!(
                "cross-validation needs at least 2 samples, got {}",
                n_samples
            )));
        }

        let mut n_splits = self.config.cv_folds;
        if n_samples < n_splits {
            tracing::warn!(
                n_samples,
                cv_folds = n_splits,
                "Fewer samples than folds; using {} folds",
                n_samples
            );
            n_splits = n_samples;
        }

        let mut cv = CrossValidator::new(CVStrategy::StratifiedKFold {
            n_splits,
            shuffle: false,
        });
        if let Some(seed) = self.config.random_state {
            cv = cv.with_random_state(seed);
        }
        cv.split(n_samples, Some(labels))
    }
}

/// Fit a fresh copy of `pipeline` with `params` on the split's training part
/// and score it on the held-out part
fn evaluate(
    pipeline: &Pipeline,
    params: &Params,
    split: &CVSplit,
    documents: &[String],
    labels: &[Label],
    scoring: Scoring,
) -> Result<f64> {
    let mut model = pipeline.clone();
    model.set_params(params)?;

    let train_docs: Vec<String> = split.train_indices.iter().map(|&i| documents[i].clone()).collect();
    let train_labels: Vec<Label> = split.train_indices.iter().map(|&i| labels[i]).collect();
    model.fit(&train_docs, &train_labels)?;

    let test_docs: Vec<String> = split.test_indices.iter().map(|&i| documents[i].clone()).collect();
    let test_labels: Vec<Label> = split.test_indices.iter().map(|&i| labels[i]).collect();
    model.score(&test_docs, &test_labels, scoring)
}

/// Assign ranks and return valid candidate indices, best first
///
/// Higher mean wins; equal means keep grid order.
fn rank_candidates(results: &mut [CandidateResult]) -> Vec<usize> {
    let mut order: Vec<(usize, f64)> = results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.mean_score.map(|m| (i, m)))
        .collect();
    order.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let n_valid = order.len();
    for r in results.iter_mut() {
        r.rank = n_valid + 1;
    }
    for (pos, &(idx, _)) in order.iter().enumerate() {
        results[idx].rank = pos + 1;
    }
    order.into_iter().map(|(i, _)| i).collect()
}
