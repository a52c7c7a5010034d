//! Parallel processing utilities

use crate::error::{ClassifierError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for parallel processing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Number of threads (None = use all available)
    pub n_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of threads
    pub fn with_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n);
        self
    }

    /// Get the number of threads to use
    pub fn num_threads(&self) -> usize {
        self.n_threads.unwrap_or_else(rayon::current_num_threads)
    }

    /// Build a dedicated pool of [`num_threads`](Self::num_threads) workers
    pub fn build_pool(&self) -> Result<rayon::ThreadPool> {
        if self.n_threads == Some(0) {
            return Err(ClassifierError::ThreadPoolError(
                "thread count must be at least 1".to_string(),
            ));
        }
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads())
            .thread_name(|i| format!("grid-search-{}", i))
            .build()
            .map_err(|e| ClassifierError::ThreadPoolError(e.to_string()))
    }
}

/// Parallel map on a pool sized by `config`
pub fn parallel_map_with_config<T, U, F>(items: Vec<T>, config: &ParallelConfig, f: F) -> Result<Vec<U>>
where
    T: Send + Sync,
    U: Send,
    F: Fn(T) -> U + Send + Sync,
{
    let pool = config.build_pool()?;
    Ok(pool.install(|| items.into_par_iter().map(f).collect()))
}
