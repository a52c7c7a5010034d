//! Utility functions and types

pub mod data_loader;
mod parallel;

pub use data_loader::{strip_headers, NewsgroupsLoader, TextDataset};
pub use parallel::{parallel_map_with_config, ParallelConfig};
