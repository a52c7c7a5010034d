//! Exhaustive hyperparameter search
//!
//! - [`ParamGrid`]: candidate values per `<step>__<param>` name
//! - [`GridSearch`]: cross-validated evaluation of every combination
//! - [`Metrics`]: best results and the summary report

mod config;
mod grid;
mod grid_search;
mod metrics;

pub use config::{ErrorScore, SearchConfig};
pub use grid::{
    format_params, split_param_name, Candidates, ParamGrid, ParamValue, Params, STEP_SEPARATOR,
};
pub use grid_search::{CandidateResult, GridSearch, SearchResult};
pub use metrics::{Metrics, SummaryReport};
