//! Text feature extraction

use crate::error::{ClassifierError, Result};
use crate::pipeline::{
    expect_bool, expect_positive_int, invalid_param, unknown_param, Features, Transformer,
};
use crate::search::{ParamValue, Params};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Word tokenizer: runs of two or more word characters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextTokenizer {
    lowercase: bool,
    min_token_length: usize,
    stop_words: HashSet<String>,
}

impl TextTokenizer {
    pub fn new() -> Self {
        Self {
            lowercase: true,
            min_token_length: 2,
            stop_words: HashSet::new(),
        }
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn with_min_length(mut self, len: usize) -> Self {
        self.min_token_length = len.max(1);
        self
    }

    pub fn with_english_stop_words(mut self) -> Self {
        self.stop_words = ENGLISH_STOP_WORDS.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn without_stop_words(mut self) -> Self {
        self.stop_words.clear();
        self
    }

    pub fn uses_stop_words(&self) -> bool {
        !self.stop_words.is_empty()
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let processed = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        processed
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|s| s.chars().count() >= self.min_token_length)
            .filter(|s| !self.stop_words.contains(*s))
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for TextTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Document-frequency bound, either relative or absolute
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DocFrequency {
    /// Fraction of documents in `[0, 1]`
    Proportion(f64),
    /// Absolute number of documents
    Count(usize),
}

impl DocFrequency {
    fn from_param(name: &str, value: &ParamValue) -> Result<Self> {
        match value {
            ParamValue::Float(p) if (0.0..=1.0).contains(p) => Ok(DocFrequency::Proportion(*p)),
            ParamValue::Int(c) if *c >= 0 => Ok(DocFrequency::Count(*c as usize)),
            _ => Err(invalid_param(
                name,
                value,
                "expected a float in [0.0, 1.0] or a non-negative integer",
            )),
        }
    }

    fn to_param(self) -> ParamValue {
        match self {
            DocFrequency::Proportion(p) => ParamValue::Float(p),
            DocFrequency::Count(c) => ParamValue::Int(c as i64),
        }
    }

    fn resolve(self, n_docs: usize) -> f64 {
        match self {
            DocFrequency::Proportion(p) => p * n_docs as f64,
            DocFrequency::Count(c) => c as f64,
        }
    }
}

/// Count-based text vectorizer
///
/// Vocabulary terms are ordered lexicographically; column `j` of the output
/// counts occurrences of `feature_names()[j]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountVectorizer {
    tokenizer: TextTokenizer,
    vocabulary: HashMap<String, usize>,
    feature_names: Vec<String>,
    max_features: Option<usize>,
    min_df: DocFrequency,
    max_df: DocFrequency,
    ngram_range: (usize, usize),
    binary: bool,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self {
            tokenizer: TextTokenizer::new(),
            vocabulary: HashMap::new(),
            feature_names: Vec::new(),
            max_features: None,
            min_df: DocFrequency::Count(1),
            max_df: DocFrequency::Proportion(1.0),
            ngram_range: (1, 1),
            binary: false,
        }
    }

    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n);
        self
    }

    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.ngram_range = (min.max(1), max.max(min.max(1)));
        self
    }

    pub fn with_max_df(mut self, max_df: DocFrequency) -> Self {
        self.max_df = max_df;
        self
    }

    pub fn with_min_df(mut self, min_df: DocFrequency) -> Self {
        self.min_df = min_df;
        self
    }

    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TextTokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    fn generate_ngrams(&self, tokens: &[String]) -> Vec<String> {
        let mut ngrams = Vec::new();

        for n in self.ngram_range.0..=self.ngram_range.1 {
            if tokens.len() >= n {
                for window in tokens.windows(n) {
                    ngrams.push(window.join(" "));
                }
            }
        }

        ngrams
    }

    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        let n_docs = documents.len();
        if n_docs == 0 {
            return Err(ClassifierError::ValidationError(
                "cannot fit a vectorizer on an empty corpus".to_string(),
            ));
        }

        let max_doc_count = self.max_df.resolve(n_docs);
        let min_doc_count = self.min_df.resolve(n_docs);
        if max_doc_count < min_doc_count {
            return Err(ClassifierError::ValidationError(format!(
                "max_df ({:?}) corresponds to fewer documents than min_df ({:?})",
                self.max_df, self.min_df
            )));
        }

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut term_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let ngrams = self.generate_ngrams(&self.tokenizer.tokenize(doc));

            let mut unique: HashSet<&String> = HashSet::new();
            for ngram in &ngrams {
                *term_freq.entry(ngram.clone()).or_insert(0) += 1;
                if unique.insert(ngram) {
                    *doc_freq.entry(ngram.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut kept: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| {
                let df = *df as f64;
                df >= min_doc_count && df <= max_doc_count
            })
            .map(|(term, _)| {
                let tf = term_freq.get(&term).copied().unwrap_or(0);
                (term, tf)
            })
            .collect();

        if kept.is_empty() {
            return Err(ClassifierError::ValidationError(
                "after pruning, no terms remain; try a lower min_df or a higher max_df".to_string(),
            ));
        }

        if let Some(max_n) = self.max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            kept.truncate(max_n);
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        self.vocabulary = terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        self.feature_names = terms;

        tracing::debug!(
            n_docs,
            n_features = self.feature_names.len(),
            "Fitted count vectorizer"
        );
        Ok(())
    }

    pub fn transform(&self, documents: &[String]) -> Result<Array2<f64>> {
        if self.vocabulary.is_empty() {
            return Err(ClassifierError::ModelNotFitted);
        }

        let mut result = Array2::zeros((documents.len(), self.vocabulary.len()));

        for (doc_idx, doc) in documents.iter().enumerate() {
            let ngrams = self.generate_ngrams(&self.tokenizer.tokenize(doc));
            for ngram in &ngrams {
                if let Some(&idx) = self.vocabulary.get(ngram) {
                    if self.binary {
                        result[[doc_idx, idx]] = 1.0;
                    } else {
                        result[[doc_idx, idx]] += 1.0;
                    }
                }
            }
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, documents: &[String]) -> Result<Array2<f64>> {
        self.fit(documents)?;
        self.transform(documents)
    }

    pub fn get_feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for CountVectorizer {
    fn fit_transform(&mut self, input: Features) -> Result<Features> {
        let docs = input.as_documents()?;
        CountVectorizer::fit_transform(self, docs).map(Features::Matrix)
    }

    fn transform(&self, input: Features) -> Result<Features> {
        let docs = input.as_documents()?;
        CountVectorizer::transform(self, docs).map(Features::Matrix)
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match name {
            "max_df" => self.max_df = DocFrequency::from_param(name, value)?,
            "min_df" => self.min_df = DocFrequency::from_param(name, value)?,
            "max_features" => {
                self.max_features = match value {
                    ParamValue::None => None,
                    _ => Some(expect_positive_int(name, value)?),
                }
            }
            "ngram_range" => match value.as_pair() {
                Some((lo, hi)) if lo >= 1 && lo <= hi => self.ngram_range = (lo, hi),
                _ => return Err(invalid_param(name, value, "expected (min_n, max_n) with 1 <= min_n <= max_n")),
            },
            "binary" => self.binary = expect_bool(name, value)?,
            "lowercase" => {
                let lowercase = expect_bool(name, value)?;
                self.tokenizer = self.tokenizer.clone().with_lowercase(lowercase);
            }
            "stop_words" => {
                self.tokenizer = match value {
                    ParamValue::None => self.tokenizer.clone().without_stop_words(),
                    ParamValue::Text(s) if s == "english" => {
                        self.tokenizer.clone().with_english_stop_words()
                    }
                    _ => return Err(invalid_param(name, value, "expected \"english\" or None")),
                }
            }
            _ => return Err(unknown_param(name)),
        }
        self.vocabulary.clear();
        self.feature_names.clear();
        Ok(())
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert("max_df".into(), self.max_df.to_param());
        params.insert("min_df".into(), self.min_df.to_param());
        params.insert(
            "max_features".into(),
            self.max_features.map(|n| n as i64).into(),
        );
        params.insert("ngram_range".into(), ParamValue::Pair(self.ngram_range.0, self.ngram_range.1));
        params.insert("binary".into(), ParamValue::Bool(self.binary));
        params.insert("lowercase".into(), ParamValue::Bool(self.tokenizer.lowercase));
        params.insert(
            "stop_words".into(),
            if self.tokenizer.uses_stop_words() {
                ParamValue::from("english")
            } else {
                ParamValue::None
            },
        );
        params
    }

    fn clone_box(&self) -> Box<dyn Transformer> {
        Box::new(self.clone())
    }
}

/// Row normalisation applied after tf-idf weighting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Norm {
    L1,
    L2,
}

/// Re-weights a count matrix by inverse document frequency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfTransformer {
    idf: Option<Array1<f64>>,
    n_features: Option<usize>,
    norm: Option<Norm>,
    use_idf: bool,
    smooth_idf: bool,
    sublinear_tf: bool,
}

impl TfidfTransformer {
    pub fn new() -> Self {
        Self {
            idf: None,
            n_features: None,
            norm: Some(Norm::L2),
            use_idf: true,
            smooth_idf: true,
            sublinear_tf: false,
        }
    }

    pub fn with_norm(mut self, norm: Option<Norm>) -> Self {
        self.norm = norm;
        self
    }

    pub fn with_use_idf(mut self, use_idf: bool) -> Self {
        self.use_idf = use_idf;
        self
    }

    pub fn with_sublinear_tf(mut self, sublinear_tf: bool) -> Self {
        self.sublinear_tf = sublinear_tf;
        self
    }

    pub fn fit(&mut self, counts: &Array2<f64>) -> Result<()> {
        let n_docs = counts.nrows() as f64;
        let n_features = counts.ncols();

        self.idf = if self.use_idf {
            let idf = counts
                .axis_iter(Axis(1))
                .map(|column| {
                    let df = column.iter().filter(|&&v| v > 0.0).count() as f64;
                    if self.smooth_idf {
                        ((n_docs + 1.0) / (df + 1.0)).ln() + 1.0
                    } else {
                        (n_docs / df.max(1.0)).ln() + 1.0
                    }
                })
                .collect::<Array1<f64>>();
            Some(idf)
        } else {
            None
        };
        self.n_features = Some(n_features);
        Ok(())
    }

    pub fn transform(&self, counts: &Array2<f64>) -> Result<Array2<f64>> {
        let n_features = self.n_features.ok_or(ClassifierError::ModelNotFitted)?;
        if counts.ncols() != n_features {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} features", n_features),
                actual: format!("{} features", counts.ncols()),
            });
        }

        let mut tf = counts.clone();

        if self.sublinear_tf {
            tf.mapv_inplace(|v| if v > 0.0 { 1.0 + v.ln() } else { 0.0 });
        }

        if let Some(idf) = &self.idf {
            for mut row in tf.rows_mut() {
                row *= idf;
            }
        }

        if let Some(norm) = self.norm {
            for mut row in tf.rows_mut() {
                let length = match norm {
                    Norm::L1 => row.iter().map(|v| v.abs()).sum::<f64>(),
                    Norm::L2 => row.iter().map(|&v| v * v).sum::<f64>().sqrt(),
                };
                if length > 0.0 {
                    row /= length;
                }
            }
        }

        Ok(tf)
    }

    pub fn fit_transform(&mut self, counts: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(counts)?;
        self.transform(counts)
    }

    pub fn idf(&self) -> Option<&Array1<f64>> {
        self.idf.as_ref()
    }
}

impl Default for TfidfTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for TfidfTransformer {
    fn fit_transform(&mut self, input: Features) -> Result<Features> {
        let counts = input.into_matrix()?;
        TfidfTransformer::fit_transform(self, &counts).map(Features::Matrix)
    }

    fn transform(&self, input: Features) -> Result<Features> {
        let counts = input.into_matrix()?;
        TfidfTransformer::transform(self, &counts).map(Features::Matrix)
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        match name {
            "norm" => {
                self.norm = match value {
                    ParamValue::None => None,
                    ParamValue::Text(s) if s == "l1" => Some(Norm::L1),
                    ParamValue::Text(s) if s == "l2" => Some(Norm::L2),
                    _ => return Err(invalid_param(name, value, "expected \"l1\", \"l2\" or None")),
                }
            }
            "use_idf" => self.use_idf = expect_bool(name, value)?,
            "smooth_idf" => self.smooth_idf = expect_bool(name, value)?,
            "sublinear_tf" => self.sublinear_tf = expect_bool(name, value)?,
            _ => return Err(unknown_param(name)),
        }
        self.idf = None;
        self.n_features = None;
        Ok(())
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        params.insert(
            "norm".into(),
            match self.norm {
                Some(Norm::L1) => ParamValue::from("l1"),
                Some(Norm::L2) => ParamValue::from("l2"),
                None => ParamValue::None,
            },
        );
        params.insert("use_idf".into(), ParamValue::Bool(self.use_idf));
        params.insert("smooth_idf".into(), ParamValue::Bool(self.smooth_idf));
        params.insert("sublinear_tf".into(), ParamValue::Bool(self.sublinear_tf));
        params
    }

    fn clone_box(&self) -> Box<dyn Transformer> {
        Box::new(self.clone())
    }
}
