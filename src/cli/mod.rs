//! Command-line interface for training and inspecting the newsgroups classifier

use clap::{Parser, Subcommand};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::classifier::{default_param_grid, default_pipeline, NewsGroupsClassifier};
use crate::search::{ParamGrid, SearchConfig};
use crate::utils::NewsgroupsLoader;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

pub const DEFAULT_CATEGORIES: &str = "alt.atheism,talk.religion.misc";

#[derive(Parser)]
#[command(name = "newsgroups-classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Grid-searched text classification for newsgroup corpora")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the parameter grid on a corpus and print the summary report
    Train {
        /// Corpus root with one directory per category
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Comma-separated category names
        #[arg(short, long, value_delimiter = ',', default_value = DEFAULT_CATEGORIES)]
        categories: Vec<String>,

        /// JSON file with `search` settings and an optional `grid`
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of cross-validation folds
        #[arg(long)]
        cv_folds: Option<usize>,

        /// Number of parallel workers (default: all cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Drop message headers before vectorizing
        #[arg(long)]
        strip_headers: bool,

        /// Also write the summary report as JSON
        #[arg(long)]
        report_json: Option<PathBuf>,
    },

    /// Print the default pipeline steps and parameter grid as JSON
    Defaults,
}

/// Contents of a `--config` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainFileConfig {
    pub search: SearchConfig,
    pub grid: Option<ParamGrid>,
}

impl TrainFileConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
        Ok(serde_json::from_str(&text)?)
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(
    data_dir: &Path,
    categories: &[String],
    config_path: Option<&Path>,
    cv_folds: Option<usize>,
    jobs: Option<usize>,
    strip_headers: bool,
    report_json: Option<&Path>,
) -> anyhow::Result<()> {
    section("Train");

    let mut file_config = match config_path {
        Some(path) => TrainFileConfig::from_file(path)?,
        None => TrainFileConfig::default(),
    };
    if let Some(folds) = cv_folds {
        file_config.search.cv_folds = folds;
    }
    if let Some(n) = jobs {
        file_config.search.n_jobs = Some(n);
    }

    step_run("Loading corpus");
    let start = Instant::now();
    let dataset = NewsgroupsLoader::new(data_dir)
        .with_strip_headers(strip_headers)
        .load(categories)?;
    step_done(&format!(
        "{} documents in {} categories, {:?}",
        dataset.len(),
        dataset.target_names.len(),
        start.elapsed()
    ));

    let mut builder = NewsGroupsClassifier::builder().config(file_config.search.clone());
    if let Some(grid) = file_config.grid {
        builder = builder.grid(grid);
    }
    let mut classifier = builder.build()?;

    kv("Classifier", &classifier.to_string());
    kv("Categories", &dataset.target_names.join(", "));
    kv("Candidates", &classifier.search().grid().n_candidates().to_string());
    kv("Folds", &file_config.search.cv_folds.to_string());
    println!();

    step_run("Searching grid");
    let start = Instant::now();
    classifier.fit(&dataset.data, &dataset.target)?;
    step_done(&format!("{:?}", start.elapsed()));

    let report = classifier.summary()?;
    print!("{}", report);

    if let Some(path) = report_json {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        step_ok(&format!("Report written to {}", path.display()));
    }

    Ok(())
}

pub fn cmd_defaults() -> anyhow::Result<()> {
    let pipeline = default_pipeline()?;
    let doc = serde_json::json!({
        "steps": pipeline.step_names(),
        "grid": default_param_grid(),
        "search": SearchConfig::default(),
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_args() {
        let cli = Cli::parse_from([
            "newsgroups-classifier",
            "train",
            "--data-dir",
            "/tmp/corpus",
            "--categories",
            "sci.space,rec.autos",
            "--jobs",
            "2",
        ]);
        match cli.command {
            Commands::Train { data_dir, categories, jobs, strip_headers, .. } => {
                assert_eq!(data_dir, PathBuf::from("/tmp/corpus"));
                assert_eq!(categories, vec!["sci.space", "rec.autos"]);
                assert_eq!(jobs, Some(2));
                assert!(!strip_headers);
            }
            Commands::Defaults => panic!("expected train"),
        }
    }

    #[test]
    fn test_default_categories() {
        let cli = Cli::parse_from(["newsgroups-classifier", "train", "-d", "corpus"]);
        match cli.command {
            Commands::Train { categories, .. } => {
                assert_eq!(categories, vec!["alt.atheism", "talk.religion.misc"]);
            }
            Commands::Defaults => panic!("expected train"),
        }
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        fs::write(
            &path,
            r#"{"search": {"cv_folds": 3}, "grid": {"clf__alpha": [0.001, 0.0001]}}"#,
        )
        .unwrap();

        let config = TrainFileConfig::from_file(&path).unwrap();
        assert_eq!(config.search.cv_folds, 3);
        assert_eq!(config.grid.unwrap().n_candidates(), 2);
    }
}
