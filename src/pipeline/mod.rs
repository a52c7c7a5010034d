//! Named-step text classification pipeline
//!
//! A [`Pipeline`] chains one or more [`Transformer`] stages (feature
//! extraction) with a final [`Estimator`]. Hyperparameters are addressed as
//! `<step>__<param>`, so a grid entry such as `vect__max_df` reaches the
//! `max_df` parameter of the step named `vect`.

mod step;

pub use step::{
    expect_bool, expect_float, expect_positive_int, invalid_param, unknown_param, Estimator,
    Features, Label, Transformer,
};

use crate::error::{ClassifierError, Result};
use crate::search::{split_param_name, ParamValue, Params, STEP_SEPARATOR};
use crate::training::Scoring;

/// Ordered feature-extraction stages followed by a classifier
#[derive(Debug, Clone)]
pub struct Pipeline {
    transformers: Vec<(String, Box<dyn Transformer>)>,
    estimator: (String, Box<dyn Estimator>),
    is_fitted: bool,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<String> {
        self.transformers
            .iter()
            .map(|(name, _)| name.clone())
            .chain(std::iter::once(self.estimator.0.clone()))
            .collect()
    }

    pub fn has_step(&self, name: &str) -> bool {
        self.estimator.0 == name || self.transformers.iter().any(|(n, _)| n == name)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Set a parameter addressed as `<step>__<param>`
    ///
    /// Resets the fitted state.
    pub fn set_param(&mut self, qualified: &str, value: &ParamValue) -> Result<()> {
        let (step, param) = split_param_name(qualified)?;

        let outcome = if self.estimator.0 == step {
            self.estimator.1.set_param(param, value)
        } else if let Some((_, t)) = self.transformers.iter_mut().find(|(n, _)| n == step) {
            t.set_param(param, value)
        } else {
            return Err(ClassifierError::UnknownStep {
                step: step.to_string(),
                param: qualified.to_string(),
            });
        };

        self.is_fitted = false;
        outcome.map_err(|e| qualify(e, step))
    }

    /// Set several qualified parameters
    pub fn set_params(&mut self, params: &Params) -> Result<()> {
        for (name, value) in params {
            self.set_param(name, value)?;
        }
        Ok(())
    }

    /// All parameters of all steps, qualified by step name
    pub fn get_params(&self) -> Params {
        let mut all = Params::new();
        let steps = self
            .transformers
            .iter()
            .map(|(n, t)| (n, t.params()))
            .chain(std::iter::once((&self.estimator.0, self.estimator.1.params())));

        for (step, params) in steps {
            for (name, value) in params {
                all.insert(format!("{}{}{}", step, STEP_SEPARATOR, name), value);
            }
        }
        all
    }

    /// Fit every stage in order on `documents` and `labels`
    pub fn fit(&mut self, documents: &[String], labels: &[Label]) -> Result<()> {
        if documents.len() != labels.len() {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} labels", documents.len()),
                actual: format!("{} labels", labels.len()),
            });
        }

        self.is_fitted = false;
        let mut features = Features::Documents(documents.to_vec());
        for (name, transformer) in &mut self.transformers {
            features = transformer
                .fit_transform(features)
                .map_err(|e| ClassifierError::in_stage(name.as_str(), e))?;
        }

        let (name, estimator) = &mut self.estimator;
        let x = features
            .into_matrix()
            .map_err(|e| ClassifierError::in_stage(name.as_str(), e))?;
        estimator
            .fit(&x, labels)
            .map_err(|e| ClassifierError::in_stage(name.as_str(), e))?;

        self.is_fitted = true;
        Ok(())
    }

    /// Predict labels for `documents`
    pub fn predict(&self, documents: &[String]) -> Result<Vec<Label>> {
        if !self.is_fitted {
            return Err(ClassifierError::ModelNotFitted);
        }

        let mut features = Features::Documents(documents.to_vec());
        for (name, transformer) in &self.transformers {
            features = transformer
                .transform(features)
                .map_err(|e| ClassifierError::in_stage(name.as_str(), e))?;
        }

        let (name, estimator) = &self.estimator;
        let x = features
            .into_matrix()
            .map_err(|e| ClassifierError::in_stage(name.as_str(), e))?;
        estimator
            .predict(&x)
            .map_err(|e| ClassifierError::in_stage(name.as_str(), e))
    }

    /// Score predictions for `documents` against `labels`
    pub fn score(&self, documents: &[String], labels: &[Label], scoring: Scoring) -> Result<f64> {
        let predicted = self.predict(documents)?;
        scoring.score(labels, &predicted)
    }
}

fn qualify(err: ClassifierError, step: &str) -> ClassifierError {
    match err {
        ClassifierError::UnknownParameter { name, .. } => ClassifierError::UnknownParameter {
            step: step.to_string(),
            name,
        },
        ClassifierError::InvalidParameter { name, value, reason } => {
            ClassifierError::InvalidParameter {
                name: format!("{}{}{}", step, STEP_SEPARATOR, name),
                value,
                reason,
            }
        }
        other => ClassifierError::in_stage(step, other),
    }
}

/// Builder for [`Pipeline`]
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    transformers: Vec<(String, Box<dyn Transformer>)>,
    estimator: Option<(String, Box<dyn Estimator>)>,
}

impl PipelineBuilder {
    /// Append a transformer stage
    pub fn transformer<T: Transformer + 'static>(mut self, name: impl Into<String>, step: T) -> Self {
        self.transformers.push((name.into(), Box::new(step)));
        self
    }

    /// Set the final estimator stage
    pub fn estimator<E: Estimator + 'static>(mut self, name: impl Into<String>, step: E) -> Self {
        self.estimator = Some((name.into(), Box::new(step)));
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let estimator = self.estimator.ok_or_else(|| {
            ClassifierError::ConfigError("pipeline needs a final estimator step".to_string())
        })?;

        let mut seen: Vec<&str> = Vec::new();
        let names = self
            .transformers
            .iter()
            .map(|(n, _)| n.as_str())
            .chain(std::iter::once(estimator.0.as_str()));
        for name in names {
            if name.is_empty() || name.contains(STEP_SEPARATOR) {
                return Err(ClassifierError::ConfigError(format!(
                    "invalid step name '{}': must be non-empty and must not contain '{}'",
                    name, STEP_SEPARATOR
                )));
            }
            if seen.contains(&name) {
                return Err(ClassifierError::ConfigError(format!(
                    "duplicate step name '{}'",
                    name
                )));
            }
            seen.push(name);
        }

        Ok(Pipeline {
            transformers: self.transformers,
            estimator,
            is_fitted: false,
        })
    }
}
