//! Parameter grid definition for exhaustive search

use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Separator between step name and parameter name (`vect__max_df`)
pub const STEP_SEPARATOR: &str = "__";

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Pair(usize, usize),
    Text(String),
}

impl ParamValue {
    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get as int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as non-negative count
    pub fn as_usize(&self) -> Option<usize> {
        self.as_int().and_then(|v| usize::try_from(v).ok())
    }

    /// Get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get as pair
    pub fn as_pair(&self) -> Option<(usize, usize)> {
        match self {
            ParamValue::Pair(a, b) => Some((*a, *b)),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ParamValue::None)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::None => write!(f, "None"),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Pair(a, b) => write!(f, "({}, {})", a, b),
            ParamValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<(usize, usize)> for ParamValue {
    fn from(v: (usize, usize)) -> Self {
        ParamValue::Pair(v.0, v.1)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::None, Into::into)
    }
}

/// Concrete parameter settings keyed by qualified name
pub type Params = BTreeMap<String, ParamValue>;

/// Render a parameter set as `a=1, b=2`
pub fn format_params(params: &Params) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a qualified parameter name into step and parameter
pub fn split_param_name(name: &str) -> Result<(&str, &str)> {
    match name.split_once(STEP_SEPARATOR) {
        Some((step, param)) if !step.is_empty() && !param.is_empty() => Ok((step, param)),
        _ => Err(ClassifierError::ConfigError(format!(
            "parameter '{}' must be of the form <step>{}<param>",
            name, STEP_SEPARATOR
        ))),
    }
}

/// Candidate values for one grid entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidates(pub Vec<ParamValue>);

impl Candidates {
    pub fn values(&self) -> &[ParamValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: &ParamValue) -> bool {
        self.0.contains(value)
    }
}

impl fmt::Display for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Search space for exhaustive grid search
///
/// Maps `step__param` names to the values to try. Every combination across all
/// entries is a candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamGrid {
    entries: BTreeMap<String, Candidates>,
}

impl ParamGrid {
    /// Create a new empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry to the grid, replacing any previous entry of the same name
    pub fn add<V: Into<ParamValue>>(mut self, name: impl Into<String>, values: Vec<V>) -> Self {
        self.insert(name, values);
        self
    }

    /// Insert an entry in place
    pub fn insert<V: Into<ParamValue>>(&mut self, name: impl Into<String>, values: Vec<V>) {
        let values = values.into_iter().map(Into::into).collect();
        self.entries.insert(name.into(), Candidates(values));
    }

    /// Entry names in iteration order
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Candidate values for a name
    pub fn get(&self, name: &str) -> Option<&Candidates> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Candidates)> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of candidate combinations (product of entry sizes)
    pub fn n_candidates(&self) -> usize {
        self.entries.values().map(Candidates::len).product()
    }

    /// Check entry names and sizes
    pub fn validate(&self) -> Result<()> {
        for (name, values) in &self.entries {
            split_param_name(name)?;
            if values.is_empty() {
                return Err(ClassifierError::ConfigError(format!(
                    "parameter '{}' has no candidate values",
                    name
                )));
            }
            let distinct = values
                .values()
                .iter()
                .enumerate()
                .filter(|&(i, v)| !values.values()[..i].contains(v))
                .count();
            if distinct < values.len() {
                tracing::warn!(
                    param = %name,
                    values = %values,
                    "Grid entry contains duplicate values; they will be evaluated repeatedly"
                );
            }
        }
        Ok(())
    }

    /// All candidate combinations
    ///
    /// Names are visited in sorted order with the last name varying fastest.
    /// An empty grid yields a single empty combination.
    pub fn candidates(&self) -> Vec<Params> {
        let mut combos: Vec<Params> = vec![Params::new()];
        for (name, values) in &self.entries {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values.values() {
                    let mut c = combo.clone();
                    c.insert(name.clone(), value.clone());
                    next.push(c);
                }
            }
            combos = next;
        }
        combos
    }
}

impl fmt::Display for ParamGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_builder() {
        let grid = ParamGrid::new()
            .add("vect__max_df", vec![0.5, 0.75, 1.0])
            .add("clf__max_iter", vec![5, 10])
            .add("tfidf__norm", vec!["l1", "l2"]);

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.n_candidates(), 12);
        assert_eq!(grid.names(), vec!["clf__max_iter", "tfidf__norm", "vect__max_df"]);
    }

    #[test]
    fn test_cartesian_product_order() {
        let grid = ParamGrid::new()
            .add("a__x", vec![1, 2])
            .add("b__y", vec!["p", "q", "r"]);

        let combos = grid.candidates();
        assert_eq!(combos.len(), 6);
        assert_eq!(combos[0]["a__x"], ParamValue::Int(1));
        assert_eq!(combos[0]["b__y"], ParamValue::from("p"));
        assert_eq!(combos[1]["b__y"], ParamValue::from("q"));
        assert_eq!(combos[3]["a__x"], ParamValue::Int(2));

        for combo in &combos {
            assert_eq!(combo.len(), 2);
        }
    }

    #[test]
    fn test_empty_grid_has_one_candidate() {
        let grid = ParamGrid::new();
        assert_eq!(grid.n_candidates(), 1);
        assert_eq!(grid.candidates(), vec![Params::new()]);
    }

    #[test]
    fn test_validation() {
        let grid = ParamGrid::new().add("max_df", vec![0.5]);
        assert!(grid.validate().is_err());

        let empty: Vec<f64> = Vec::new();
        let grid = ParamGrid::new().add("vect__max_df", empty);
        assert!(grid.validate().is_err());

        let grid = ParamGrid::new().add("clf__max_iter", vec![5, 5]);
        assert!(grid.validate().is_ok());
        assert_eq!(grid.n_candidates(), 2);
    }

    #[test]
    fn test_split_param_name() {
        assert_eq!(split_param_name("vect__max_df").unwrap(), ("vect", "max_df"));
        assert_eq!(
            split_param_name("vect__ngram__range").unwrap(),
            ("vect", "ngram__range")
        );
        assert!(split_param_name("__max_df").is_err());
        assert!(split_param_name("vect__").is_err());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(ParamValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ParamValue::Float(0.75).to_string(), "0.75");
        assert_eq!(ParamValue::None.to_string(), "None");
        assert_eq!(ParamValue::Pair(1, 2).to_string(), "(1, 2)");
        assert_eq!(
            Candidates(vec![0.5.into(), 1.0.into()]).to_string(),
            "(0.5, 1.0)"
        );
        assert_eq!(Candidates(vec![5.into()]).to_string(), "(5,)");
    }

    #[test]
    fn test_grid_json() {
        let json = r#"{"vect__max_df": [0.5, 1.0], "vect__ngram_range": [[1, 1], [1, 2]],
                       "clf__tol": [null], "clf__max_iter": [5], "tfidf__norm": ["l2"]}"#;
        let grid: ParamGrid = serde_json::from_str(json).unwrap();

        assert_eq!(grid.n_candidates(), 4);
        assert_eq!(grid.get("clf__max_iter").unwrap().values(), &[ParamValue::Int(5)]);
        assert_eq!(grid.get("clf__tol").unwrap().values(), &[ParamValue::None]);
        assert_eq!(
            grid.get("vect__ngram_range").unwrap().values()[1],
            ParamValue::Pair(1, 2)
        );
        assert_eq!(grid.get("vect__max_df").unwrap().values()[1], ParamValue::Float(1.0));
    }
}
