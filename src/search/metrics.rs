//! Read-only view over a search's best results

use super::grid::{ParamGrid, Params};
use super::grid_search::{GridSearch, SearchResult};
use crate::error::{ClassifierError, Result};
use crate::pipeline::Pipeline;
use serde::Serialize;
use std::fmt;

/// Fit metrics of a [`GridSearch`]
///
/// Every accessor fails with [`ClassifierError::NotAvailable`] until the
/// search has completed a fit.
#[derive(Debug, Clone, Copy)]
pub struct Metrics<'a> {
    search: &'a GridSearch,
}

impl<'a> Metrics<'a> {
    pub fn new(search: &'a GridSearch) -> Self {
        Self { search }
    }

    fn result(&self, field: &'static str) -> Result<&'a SearchResult> {
        self.search.result().ok_or(ClassifierError::NotAvailable(field))
    }

    /// Pipeline with the highest mean validation score, refit on all data
    pub fn best_estimator(&self) -> Result<&'a Pipeline> {
        Ok(&self.result("best_estimator")?.best_estimator)
    }

    /// Values chosen for each grid parameter
    pub fn best_params(&self) -> Result<&'a Params> {
        Ok(&self.result("best_params")?.best_params)
    }

    /// Mean cross-validated score of the best estimator
    pub fn best_score(&self) -> Result<f64> {
        Ok(self.result("best_score")?.best_score)
    }

    /// Structured report of the search; `Display` renders it as text
    pub fn summary(&self) -> Result<SummaryReport> {
        let result = self.result("summary")?;
        Ok(SummaryReport {
            step_names: self.search.pipeline().step_names(),
            grid: self.search.grid().clone(),
            best_score: result.best_score,
            best_params: result.best_params.clone(),
        })
    }
}

/// Summary of a finished search
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub step_names: Vec<String>,
    pub grid: ParamGrid,
    pub best_score: f64,
    pub best_params: Params,
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "CLASSIFICATION SUMMARY REPORT:")?;
        writeln!(f, "{}", "=".repeat(30))?;
        writeln!(f)?;

        let steps: Vec<String> = self.step_names.iter().map(|s| format!("'{}'", s)).collect();
        writeln!(f, "Pipeline:")?;
        writeln!(f, "\t [{}]", steps.join(", "))?;
        writeln!(f)?;

        writeln!(f, "Parameters:")?;
        for (name, values) in self.grid.iter() {
            writeln!(f, "\t{} : {}", name, values)?;
        }
        writeln!(f)?;

        writeln!(f, "Best score:")?;
        writeln!(f, "\t{}", self.best_score)?;
        writeln!(f)?;

        writeln!(f, "Best parameters set:")?;
        for (name, value) in &self.best_params {
            writeln!(f, "\t{} : {}", name, value)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ParamValue;

    fn report() -> SummaryReport {
        let mut best_params = Params::new();
        best_params.insert("clf__max_iter".into(), ParamValue::Int(5));
        best_params.insert("vect__max_df".into(), ParamValue::Float(1.0));
        SummaryReport {
            step_names: vec!["vect".into(), "tfidf".into(), "clf".into()],
            grid: ParamGrid::new()
                .add("vect__max_df", vec![0.5, 0.75, 1.0])
                .add("clf__max_iter", vec![5]),
            best_score: 0.75,
            best_params,
        }
    }

    #[test]
    fn test_report_text() {
        let text = report().to_string();
        let expected = "\nCLASSIFICATION SUMMARY REPORT:\n\
                        ==============================\n\n\
                        Pipeline:\n\t ['vect', 'tfidf', 'clf']\n\n\
                        Parameters:\n\
                        \tclf__max_iter : (5,)\n\
                        \tvect__max_df : (0.5, 0.75, 1.0)\n\n\
                        Best score:\n\t0.75\n\n\
                        Best parameters set:\n\
                        \tclf__max_iter : 5\n\
                        \tvect__max_df : 1.0\n\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["best_score"], 0.75);
        assert_eq!(json["grid"]["clf__max_iter"], serde_json::json!([5]));
        assert_eq!(json["step_names"][2], "clf");
    }
}
