//! Feature extraction for raw text

pub mod text_features;

pub use text_features::{CountVectorizer, DocFrequency, Norm, TextTokenizer, TfidfTransformer};
