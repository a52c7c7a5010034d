//! Corpus loading utilities
//!
//! Reads a 20 Newsgroups-style directory tree, one sub-directory per category
//! holding one message per file:
//!
//! ```text
//! root/
//!   alt.atheism/
//!     49960
//!     51060
//!   talk.religion.misc/
//!     82757
//! ```

use crate::error::{ClassifierError, Result};
use crate::pipeline::Label;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Documents with their integer targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDataset {
    pub data: Vec<String>,
    /// Index into `target_names`
    pub target: Vec<Label>,
    /// Category names, sorted
    pub target_names: Vec<String>,
    /// Source file of each document
    pub filenames: Vec<PathBuf>,
}

impl TextDataset {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Loader for a newsgroups corpus on disk
#[derive(Debug, Clone)]
pub struct NewsgroupsLoader {
    root: PathBuf,
    strip_headers: bool,
    shuffle: bool,
    random_state: u64,
}

impl NewsgroupsLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            strip_headers: false,
            shuffle: true,
            random_state: 42,
        }
    }

    /// Drop each message's header block (everything up to the first blank line)
    pub fn with_strip_headers(mut self, strip: bool) -> Self {
        self.strip_headers = strip;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Category directories available under the root, sorted
    pub fn available_categories(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| read_error(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load the given categories, or every category when `categories` is empty
    pub fn load(&self, categories: &[String]) -> Result<TextDataset> {
        let start = Instant::now();
        let available = self.available_categories()?;

        let mut target_names: Vec<String> = if categories.is_empty() {
            available.clone()
        } else {
            categories.to_vec()
        };
        target_names.sort();
        target_names.dedup();

        if let Some(missing) = target_names.iter().find(|c| !available.contains(c)) {
            return Err(ClassifierError::DataError(format!(
                "category '{}' not found under {}",
                missing,
                self.root.display()
            )));
        }
        if target_names.is_empty() {
            return Err(ClassifierError::DataError(format!(
                "no categories found under {}",
                self.root.display()
            )));
        }

        let mut records: Vec<(String, Label, PathBuf)> = Vec::new();
        for (target, name) in target_names.iter().enumerate() {
            for path in message_files(&self.root.join(name))? {
                let bytes = fs::read(&path).map_err(|e| read_error(&path, e))?;
                let text = String::from_utf8_lossy(&bytes);
                let text = if self.strip_headers {
                    strip_headers(&text).to_string()
                } else {
                    text.into_owned()
                };
                records.push((text, target as Label, path));
            }
        }

        if self.shuffle {
            records.shuffle(&mut ChaCha8Rng::seed_from_u64(self.random_state));
        }

        let mut dataset = TextDataset {
            data: Vec::with_capacity(records.len()),
            target: Vec::with_capacity(records.len()),
            target_names,
            filenames: Vec::with_capacity(records.len()),
        };
        for (text, target, path) in records {
            dataset.data.push(text);
            dataset.target.push(target);
            dataset.filenames.push(path);
        }

        tracing::info!(
            documents = dataset.len(),
            categories = dataset.target_names.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded corpus from {}",
            self.root.display()
        );
        Ok(dataset)
    }
}

/// Text after the first blank line, or the whole text when there is none
pub fn strip_headers(text: &str) -> &str {
    let unix = text.find("\n\n").map(|i| i + 2);
    let windows = text.find("\r\n\r\n").map(|i| i + 4);
    let cut = match (unix, windows) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    };
    match cut {
        Some(i) => &text[i..],
        None => text,
    }
}

fn read_error(path: &Path, err: std::io::Error) -> ClassifierError {
    ClassifierError::DataError(format!("cannot read {}: {}", path.display(), err))
}

/// Regular files directly under `dir`, sorted by path
fn message_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| read_error(dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}
