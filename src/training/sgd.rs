//! Stochastic Gradient Descent (SGD) linear classifier
//!
//! Supports multiple loss functions, penalties and learning rate schedules.
//! Processes one sample at a time; more than two classes are handled
//! one-vs-rest with one binary problem per class.

use crate::error::{ClassifierError, Result};
use crate::pipeline::{
    expect_bool, expect_float, expect_positive_int, invalid_param, unknown_param, Estimator, Label,
};
use crate::search::{ParamValue, Params};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SGDLoss {
    Hinge,          // linear SVM
    Log,            // logistic regression
    ModifiedHuber,  // smooth hinge
    SquaredHinge,
    Perceptron,
}

impl SGDLoss {
    pub fn name(&self) -> &'static str {
        match self {
            SGDLoss::Hinge => "hinge",
            SGDLoss::Log => "log_loss",
            SGDLoss::ModifiedHuber => "modified_huber",
            SGDLoss::SquaredHinge => "squared_hinge",
            SGDLoss::Perceptron => "perceptron",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "hinge" => Some(SGDLoss::Hinge),
            "log_loss" | "log" => Some(SGDLoss::Log),
            "modified_huber" => Some(SGDLoss::ModifiedHuber),
            "squared_hinge" => Some(SGDLoss::SquaredHinge),
            "perceptron" => Some(SGDLoss::Perceptron),
            _ => None,
        }
    }

    /// Loss of raw prediction `p` for signed target `y`
    fn loss(&self, p: f64, y: f64) -> f64 {
        let z = p * y;
        match self {
            SGDLoss::Hinge => (1.0 - z).max(0.0),
            SGDLoss::Log => {
                if z > 18.0 {
                    (-z).exp()
                } else if z < -18.0 {
                    -z
                } else {
                    (1.0 + (-z).exp()).ln()
                }
            }
            SGDLoss::ModifiedHuber => {
                if z >= 1.0 {
                    0.0
                } else if z >= -1.0 {
                    (1.0 - z) * (1.0 - z)
                } else {
                    -4.0 * z
                }
            }
            SGDLoss::SquaredHinge => {
                let m = (1.0 - z).max(0.0);
                m * m
            }
            SGDLoss::Perceptron => (-z).max(0.0),
        }
    }

    /// Derivative of the loss with respect to `p`
    fn dloss(&self, p: f64, y: f64) -> f64 {
        let z = p * y;
        match self {
            SGDLoss::Hinge => if z <= 1.0 { -y } else { 0.0 },
            SGDLoss::Log => {
                if z > 18.0 {
                    -y * (-z).exp()
                } else if z < -18.0 {
                    -y
                } else {
                    -y / (z.exp() + 1.0)
                }
            }
            SGDLoss::ModifiedHuber => {
                if z >= 1.0 {
                    0.0
                } else if z >= -1.0 {
                    -2.0 * (1.0 - z) * y
                } else {
                    -4.0 * y
                }
            }
            SGDLoss::SquaredHinge => {
                let m = 1.0 - z;
                if m > 0.0 { -2.0 * y * m } else { 0.0 }
            }
            SGDLoss::Perceptron => if z <= 0.0 { -y } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Penalty {
    L2,
    L1,
    ElasticNet,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LearningRateSchedule {
    Constant,
    Optimal,     // 1 / (alpha * (t0 + t))
    InvScaling,  // eta0 / t^power_t
}

impl LearningRateSchedule {
    fn name(&self) -> &'static str {
        match self {
            LearningRateSchedule::Constant => "constant",
            LearningRateSchedule::Optimal => "optimal",
            LearningRateSchedule::InvScaling => "invscaling",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SGDConfig {
    pub loss: SGDLoss,
    pub penalty: Option<Penalty>,
    pub alpha: f64,
    pub l1_ratio: f64,      // ElasticNet mixing (0 = L2, 1 = L1)
    pub max_iter: usize,
    /// Stop once the epoch loss fails to improve by `tol`; `None` always runs `max_iter` epochs
    pub tol: Option<f64>,
    pub n_iter_no_change: usize,
    pub shuffle: bool,
    pub learning_rate: LearningRateSchedule,
    pub eta0: f64,
    pub power_t: f64,       // For InvScaling schedule
    pub fit_intercept: bool,
    /// Seed for epoch shuffling; `None` seeds from entropy on every fit
    pub random_state: Option<u64>,
}

impl Default for SGDConfig {
    fn default() -> Self {
        Self {
            loss: SGDLoss::Hinge,
            penalty: Some(Penalty::L2),
            alpha: 0.0001,
            l1_ratio: 0.15,
            max_iter: 1000,
            tol: Some(1e-3),
            n_iter_no_change: 5,
            shuffle: true,
            learning_rate: LearningRateSchedule::Optimal,
            eta0: 0.01,
            power_t: 0.5,
            fit_intercept: true,
            random_state: Some(42),
        }
    }
}

impl SGDConfig {
    /// Share of the penalty applied as L1
    fn l1_share(&self) -> f64 {
        match self.penalty {
            Some(Penalty::L1) => 1.0,
            Some(Penalty::ElasticNet) => self.l1_ratio,
            Some(Penalty::L2) | None => 0.0,
        }
    }

    fn regularization(&self) -> f64 {
        if self.penalty.is_some() { self.alpha } else { 0.0 }
    }
}

fn soft_threshold(val: f64, threshold: f64) -> f64 {
    if val > threshold { val - threshold }
    else if val < -threshold { val + threshold }
    else { 0.0 }
}

/// One binary problem: learned weights, intercept and epochs run
struct BinaryFit {
    weights: Array1<f64>,
    intercept: f64,
    n_iter: usize,
}

// ============ SGD Classifier ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SGDClassifier {
    pub config: SGDConfig,
    classes: Vec<Label>,
    /// One row per binary problem
    coef: Option<Array2<f64>>,
    intercept: Array1<f64>,
    n_iter: usize,
}

impl SGDClassifier {
    pub fn new(config: SGDConfig) -> Self {
        Self {
            config,
            classes: Vec::new(),
            coef: None,
            intercept: Array1::zeros(0),
            n_iter: 0,
        }
    }

    /// Classes seen during fit, sorted
    pub fn classes(&self) -> &[Label] {
        &self.classes
    }

    /// Largest number of epochs run by any binary problem in the last fit
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    pub fn coef(&self) -> Option<&Array2<f64>> {
        self.coef.as_ref()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &[Label]) -> Result<()> {
        let n = x.nrows();
        let p = x.ncols();
        if n == 0 {
            return Err(ClassifierError::TrainingError("Empty dataset".into()));
        }
        if y.len() != n {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} labels", n),
                actual: format!("{} labels", y.len()),
            });
        }
        self.validate_config()?;

        let mut classes: Vec<Label> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        // Unseeded fits draw a fresh seed, so repeated fits shuffle differently
        let seed = self.config.random_state.unwrap_or_else(rand::random);

        let fits: Vec<BinaryFit> = match classes.len() {
            1 => {
                tracing::warn!(
                    class = classes[0],
                    "Training data holds a single class; the classifier will always predict it"
                );
                vec![BinaryFit { weights: Array1::zeros(p), intercept: 0.0, n_iter: 0 }]
            }
            2 => {
                let y_signed: Vec<f64> = y.iter().map(|&v| if v == classes[1] { 1.0 } else { -1.0 }).collect();
                vec![self.fit_binary(x, &y_signed, seed)]
            }
            _ => classes
                .par_iter()
                .enumerate()
                .map(|(k, &class)| {
                    let y_signed: Vec<f64> = y.iter().map(|&v| if v == class { 1.0 } else { -1.0 }).collect();
                    self.fit_binary(x, &y_signed, seed.wrapping_add(k as u64))
                })
                .collect(),
        };

        let mut coef = Array2::zeros((fits.len(), p));
        let mut intercept = Array1::zeros(fits.len());
        for (k, fit) in fits.iter().enumerate() {
            coef.row_mut(k).assign(&fit.weights);
            intercept[k] = fit.intercept;
        }

        self.n_iter = fits.iter().map(|f| f.n_iter).max().unwrap_or(0);
        self.classes = classes;
        self.coef = Some(coef);
        self.intercept = intercept;
        Ok(())
    }

    fn validate_config(&self) -> Result<()> {
        let c = &self.config;
        if c.alpha < 0.0 {
            return Err(invalid_param("alpha", &ParamValue::Float(c.alpha), "must be >= 0"));
        }
        if c.learning_rate == LearningRateSchedule::Optimal && c.alpha <= 0.0 {
            return Err(invalid_param(
                "alpha",
                &ParamValue::Float(c.alpha),
                "the optimal learning rate needs a positive alpha",
            ));
        }
        if c.learning_rate != LearningRateSchedule::Optimal && c.eta0 <= 0.0 {
            return Err(invalid_param("eta0", &ParamValue::Float(c.eta0), "must be > 0"));
        }
        Ok(())
    }

    fn fit_binary(&self, x: &Array2<f64>, y: &[f64], seed: u64) -> BinaryFit {
        let c = &self.config;
        let n = x.nrows();

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut w: Array1<f64> = Array1::zeros(x.ncols());
        let mut b = 0.0;
        let mut indices: Vec<usize> = (0..n).collect();

        // The optimal schedule scales with alpha even when no penalty is applied
        let alpha = c.alpha;
        let reg = c.regularization();
        let l1_share = c.l1_share();

        // Initial step for the optimal schedule, from the loss at a typical weight
        let optimal_init = if c.learning_rate == LearningRateSchedule::Optimal {
            let typw = (1.0 / alpha.sqrt()).sqrt();
            let initial_eta0 = typw / c.loss.dloss(-typw, 1.0).abs().max(1.0);
            1.0 / (initial_eta0 * alpha)
        } else {
            0.0
        };

        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;
        let mut t = 1.0;
        let mut n_iter = 0;

        for epoch in 0..c.max_iter {
            if c.shuffle {
                indices.shuffle(&mut rng);
            }
            let mut epoch_loss = 0.0;

            for &i in &indices {
                let xi: ArrayView1<f64> = x.row(i);
                let yi = y[i];
                let pred = xi.dot(&w) + b;

                let eta = match c.learning_rate {
                    LearningRateSchedule::Constant => c.eta0,
                    LearningRateSchedule::Optimal => 1.0 / (alpha * (optimal_init + t - 1.0)),
                    LearningRateSchedule::InvScaling => c.eta0 / t.powf(c.power_t),
                };

                epoch_loss += c.loss.loss(pred, yi);
                let dloss = c.loss.dloss(pred, yi).clamp(-1e12, 1e12);

                if reg > 0.0 && l1_share < 1.0 {
                    w *= (1.0 - (1.0 - l1_share) * eta * reg).max(0.0);
                }
                if dloss != 0.0 {
                    w.scaled_add(-eta * dloss, &xi);
                    if c.fit_intercept {
                        b -= eta * dloss;
                    }
                }
                if reg > 0.0 && l1_share > 0.0 {
                    let threshold = eta * reg * l1_share;
                    w.mapv_inplace(|v| soft_threshold(v, threshold));
                }
                t += 1.0;
            }

            n_iter = epoch + 1;
            epoch_loss /= n as f64;

            if let Some(tol) = c.tol {
                if epoch_loss > best_loss - tol {
                    no_improvement += 1;
                } else {
                    no_improvement = 0;
                }
                if epoch_loss < best_loss {
                    best_loss = epoch_loss;
                }
                if no_improvement >= c.n_iter_no_change {
                    break;
                }
            }
        }

        if c.tol.is_some() && n_iter == c.max_iter {
            tracing::debug!(max_iter = c.max_iter, "SGD reached max_iter before converging");
        }

        BinaryFit { weights: w, intercept: b, n_iter }
    }

    /// Raw scores, one column per binary problem
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let coef = self.coef.as_ref().ok_or(ClassifierError::ModelNotFitted)?;
        if x.ncols() != coef.ncols() {
            return Err(ClassifierError::ShapeError {
                expected: format!("{} features", coef.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(x.dot(&coef.t()) + &self.intercept)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<Label>> {
        let scores = self.decision_function(x)?;

        let labels = match self.classes.len() {
            1 => vec![self.classes[0]; x.nrows()],
            2 => scores
                .column(0)
                .iter()
                .map(|&s| if s > 0.0 { self.classes[1] } else { self.classes[0] })
                .collect(),
            _ => scores
                .axis_iter(Axis(0))
                .map(|row| {
                    let mut best = 0;
                    for (k, &s) in row.iter().enumerate() {
                        if s > row[best] {
                            best = k;
                        }
                    }
                    self.classes[best]
                })
                .collect(),
        };
        Ok(labels)
    }
}

impl Default for SGDClassifier {
    fn default() -> Self {
        Self::new(SGDConfig::default())
    }
}

impl Estimator for SGDClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[Label]) -> Result<()> {
        SGDClassifier::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<Label>> {
        SGDClassifier::predict(self, x)
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<()> {
        let c = &mut self.config;
        match name {
            "loss" => {
                c.loss = value
                    .as_str()
                    .and_then(SGDLoss::parse)
                    .ok_or_else(|| invalid_param(name, value, "unknown loss"))?
            }
            "penalty" => {
                c.penalty = match value {
                    ParamValue::None => None,
                    ParamValue::Text(s) if s == "l2" => Some(Penalty::L2),
                    ParamValue::Text(s) if s == "l1" => Some(Penalty::L1),
                    ParamValue::Text(s) if s == "elasticnet" => Some(Penalty::ElasticNet),
                    _ => return Err(invalid_param(name, value, "expected \"l2\", \"l1\", \"elasticnet\" or None")),
                }
            }
            "alpha" => c.alpha = expect_float(name, value, None).and_then(|v| {
                if v < 0.0 { Err(invalid_param(name, value, "must be >= 0")) } else { Ok(v) }
            })?,
            "l1_ratio" => {
                let v = expect_float(name, value, None)?;
                if !(0.0..=1.0).contains(&v) {
                    return Err(invalid_param(name, value, "must be in [0, 1]"));
                }
                c.l1_ratio = v;
            }
            "max_iter" => c.max_iter = expect_positive_int(name, value)?,
            "tol" => {
                c.tol = match value {
                    ParamValue::None => None,
                    _ => Some(expect_float(name, value, None)?),
                }
            }
            "n_iter_no_change" => c.n_iter_no_change = expect_positive_int(name, value)?,
            "shuffle" => c.shuffle = expect_bool(name, value)?,
            "learning_rate" => {
                c.learning_rate = match value.as_str() {
                    Some("constant") => LearningRateSchedule::Constant,
                    Some("optimal") => LearningRateSchedule::Optimal,
                    Some("invscaling") => LearningRateSchedule::InvScaling,
                    _ => return Err(invalid_param(name, value, "expected \"constant\", \"optimal\" or \"invscaling\"")),
                }
            }
            "eta0" => c.eta0 = expect_float(name, value, Some(0.0))?,
            "power_t" => c.power_t = expect_float(name, value, None)?,
            "fit_intercept" => c.fit_intercept = expect_bool(name, value)?,
            "random_state" => {
                c.random_state = match value {
                    ParamValue::None => None,
                    ParamValue::Int(v) if *v >= 0 => Some(*v as u64),
                    _ => return Err(invalid_param(name, value, "expected a non-negative integer or None")),
                }
            }
            _ => return Err(unknown_param(name)),
        }
        self.coef = None;
        self.classes.clear();
        Ok(())
    }

    fn params(&self) -> Params {
        let c = &self.config;
        let mut params = Params::new();
        params.insert("loss".into(), ParamValue::from(c.loss.name()));
        params.insert(
            "penalty".into(),
            match c.penalty {
                Some(Penalty::L2) => ParamValue::from("l2"),
                Some(Penalty::L1) => ParamValue::from("l1"),
                Some(Penalty::ElasticNet) => ParamValue::from("elasticnet"),
                None => ParamValue::None,
            },
        );
        params.insert("alpha".into(), ParamValue::Float(c.alpha));
        params.insert("l1_ratio".into(), ParamValue::Float(c.l1_ratio));
        params.insert("max_iter".into(), ParamValue::Int(c.max_iter as i64));
        params.insert("tol".into(), c.tol.into());
        params.insert("n_iter_no_change".into(), ParamValue::Int(c.n_iter_no_change as i64));
        params.insert("shuffle".into(), ParamValue::Bool(c.shuffle));
        params.insert("learning_rate".into(), ParamValue::from(c.learning_rate.name()));
        params.insert("eta0".into(), ParamValue::Float(c.eta0));
        params.insert("power_t".into(), ParamValue::Float(c.power_t));
        params.insert("fit_intercept".into(), ParamValue::Bool(c.fit_intercept));
        params.insert(
            "random_state".into(),
            c.random_state.map(|s| s as i64).into(),
        );
        params
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_classification_data() -> (Array2<f64>, Vec<Label>) {
        let x = Array2::from_shape_fn((100, 2), |(i, j)| {
            let base = if i < 50 { -1.0 } else { 1.0 };
            base + (i * 2 + j) as f64 / 1000.0
        });
        let y = (0..100).map(|i| if i < 50 { 0 } else { 1 }).collect();
        (x, y)
    }

    fn make_multiclass_data() -> (Array2<f64>, Vec<Label>) {
        let centers = [(0.0, 5.0), (5.0, 0.0), (-5.0, -5.0)];
        let x = Array2::from_shape_fn((90, 2), |(i, j)| {
            let (cx, cy) = centers[i / 30];
            let jitter = ((i % 30) as f64 - 15.0) / 30.0;
            if j == 0 { cx + jitter } else { cy - jitter }
        });
        let y = (0..90).map(|i| (i / 30) as Label).collect();
        (x, y)
    }

    fn accuracy(pred: &[Label], truth: &[Label]) -> f64 {
        pred.iter().zip(truth).filter(|(p, t)| p == t).count() as f64 / truth.len() as f64
    }

    #[test]
    fn test_sgd_classifier_hinge() {
        let (x, y) = make_classification_data();
        let mut model = SGDClassifier::default();
        model.fit(&x, &y).unwrap();
        let preds = model.predict(&x).unwrap();
        let acc = accuracy(&preds, &y);
        assert!(acc > 0.95, "Accuracy too low: {}", acc);
        assert_eq!(model.classes(), &[0, 1]);
    }

    #[test]
    fn test_sgd_classifier_log() {
        let (x, y) = make_classification_data();
        let config = SGDConfig { loss: SGDLoss::Log, max_iter: 200, ..Default::default() };
        let mut model = SGDClassifier::new(config);
        model.fit(&x, &y).unwrap();
        let acc = accuracy(&model.predict(&x).unwrap(), &y);
        assert!(acc > 0.95, "Accuracy too low: {}", acc);
    }

    #[test]
    fn test_sgd_multiclass_one_vs_rest() {
        let (x, y) = make_multiclass_data();
        let mut model = SGDClassifier::default();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.coef().unwrap().nrows(), 3);
        let acc = accuracy(&model.predict(&x).unwrap(), &y);
        assert!(acc > 0.9, "Accuracy too low: {}", acc);
    }

    #[test]
    fn test_tol_none_runs_every_epoch() {
        let (x, y) = make_classification_data();
        let config = SGDConfig { max_iter: 5, tol: None, ..Default::default() };
        let mut model = SGDClassifier::new(config);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.n_iter(), 5);
    }

    #[test]
    fn test_single_class_is_constant() {
        let x = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let mut model = SGDClassifier::default();
        model.fit(&x, &[7, 7]).unwrap();
        assert_eq!(model.predict(&x).unwrap(), vec![7, 7]);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = SGDClassifier::default();
        let x = Array2::zeros((1, 2));
        assert!(matches!(model.predict(&x), Err(ClassifierError::ModelNotFitted)));
    }

    #[test]
    fn test_params_round_trip_through_setters() {
        let mut model = SGDClassifier::default();
        model.set_param("tol", &ParamValue::None).unwrap();
        model.set_param("max_iter", &ParamValue::Int(5)).unwrap();
        model.set_param("penalty", &ParamValue::from("elasticnet")).unwrap();

        let params = Estimator::params(&model);
        assert_eq!(params["tol"], ParamValue::None);
        assert_eq!(params["max_iter"], ParamValue::Int(5));
        assert_eq!(params["penalty"], ParamValue::from("elasticnet"));

        assert!(model.set_param("max_iter", &ParamValue::Int(0)).is_err());
        assert!(model.set_param("loss", &ParamValue::from("nope")).is_err());
        assert!(model.set_param("l1_ratio", &ParamValue::Float(2.0)).is_err());
    }

    #[test]
    fn test_optimal_schedule_needs_alpha() {
        let (x, y) = make_classification_data();
        let config = SGDConfig { alpha: 0.0, ..Default::default() };
        let mut model = SGDClassifier::new(config);
        let err = model.fit(&x, &y).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidParameter { ref name, .. } if name == "alpha"));
    }

    #[test]
    fn test_optimal_schedule_without_penalty() {
        let (x, y) = make_classification_data();
        let config = SGDConfig { penalty: None, random_state: Some(7), ..Default::default() };
        let mut model = SGDClassifier::new(config);
        model.fit(&x, &y).unwrap();

        assert!(accuracy(&model.predict(&x).unwrap(), &y) > 0.8);
        assert!(model.coef().unwrap().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_unseeded_fits_succeed() {
        let (x, y) = make_classification_data();
        let config = SGDConfig { random_state: None, ..Default::default() };
        let mut first = SGDClassifier::new(config.clone());
        let mut second = SGDClassifier::new(config);
        first.fit(&x, &y).unwrap();
        second.fit(&x, &y).unwrap();
        assert_eq!(first.predict(&x).unwrap().len(), y.len());
        assert_eq!(second.predict(&x).unwrap().len(), y.len());
    }
}
