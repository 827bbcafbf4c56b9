//! Candidate regression models.
//!
//! Every model works on a dense row-major feature matrix (`&[Vec<f64>]`)
//! and a target slice, and is used through the object-safe [`Regressor`]
//! trait once fitted. [`ModelKind`] enumerates the candidates the trainer
//! evaluates and knows how to fit each one.

pub mod boosting;
pub mod forest;
pub mod kernel;
pub mod linear;
pub mod tree;

use crate::error::{ForecastError, Result};
use std::fmt;
use std::str::FromStr;

pub use boosting::{BoostingParams, GradientBoosting};
pub use forest::{ForestParams, RandomForest};
pub use kernel::{KernelParams, KernelRidge};
pub use linear::LinearRegression;
pub use tree::{RegressionTree, TreeParams};

/// Candidate model families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    RandomForest,
    GradientBoosting,
    LinearRegression,
    KernelRidge,
}

impl ModelKind {
    /// All candidates in evaluation order. Ties in selection go to the
    /// earlier entry.
    pub const ALL: [ModelKind; 4] = [
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
        ModelKind::LinearRegression,
        ModelKind::KernelRidge,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoosting => "gradient_boosting",
            ModelKind::LinearRegression => "linear_regression",
            ModelKind::KernelRidge => "kernel_ridge",
        }
    }

    /// Whether features must be standardised before fitting and prediction.
    pub fn requires_scaling(&self) -> bool {
        matches!(self, ModelKind::KernelRidge)
    }

    /// Fit this model family on `x`/`y`.
    pub fn fit(&self, x: &[Vec<f64>], y: &[f64], params: &ModelParams) -> Result<Box<dyn Regressor>> {
        Ok(match self {
            ModelKind::RandomForest => Box::new(RandomForest::fit(x, y, &params.forest)?),
            ModelKind::GradientBoosting => Box::new(GradientBoosting::fit(x, y, &params.boosting)?),
            ModelKind::LinearRegression => Box::new(LinearRegression::fit(x, y)?),
            ModelKind::KernelRidge => Box::new(KernelRidge::fit(x, y, &params.kernel)?),
        })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "random_forest" | "rf" => Ok(ModelKind::RandomForest),
            "gradient_boosting" | "gbr" => Ok(ModelKind::GradientBoosting),
            "linear_regression" | "linear" | "ols" => Ok(ModelKind::LinearRegression),
            "kernel_ridge" | "svr" | "kernel" => Ok(ModelKind::KernelRidge),
            _ => Err(ForecastError::invalid_parameter(
                "model",
                s,
                "expected one of random_forest, gradient_boosting, linear_regression, kernel_ridge",
            )),
        }
    }
}

/// Hyperparameters for every candidate family.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelParams {
    pub forest: ForestParams,
    pub boosting: BoostingParams,
    pub kernel: KernelParams,
}

/// A fitted regression model.
pub trait Regressor: fmt::Debug + Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Number of feature columns the model was fitted on.
    fn n_features(&self) -> usize;

    fn predict_row(&self, row: &[f64]) -> Result<f64>;

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        x.iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Check a training matrix and return its column count.
pub(crate) fn validate_training_data(x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    if x.is_empty() {
        return Err(ForecastError::InvalidInput(
            "training matrix has no rows".to_string(),
        ));
    }
    if x.len() != y.len() {
        return Err(ForecastError::InvalidInput(format!(
            "feature rows and targets must have the same length: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    let n_features = x[0].len();
    if n_features == 0 {
        return Err(ForecastError::InvalidInput(
            "training matrix has no columns".to_string(),
        ));
    }
    if let Some(i) = x.iter().position(|row| row.len() != n_features) {
        return Err(ForecastError::InvalidInput(format!(
            "row {} has {} columns, expected {}",
            i,
            x[i].len(),
            n_features
        )));
    }
    if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidInput(
            "training data contains non-finite values".to_string(),
        ));
    }
    Ok(n_features)
}

pub(crate) fn check_row(expected: usize, row: &[f64]) -> Result<()> {
    if row.len() != expected {
        return Err(ForecastError::InferenceFailure(format!(
            "feature row has {} columns, model expects {}",
            row.len(),
            expected
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_round_trips_through_name() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
        }
        assert_eq!("SVR".parse::<ModelKind>().unwrap(), ModelKind::KernelRidge);
        assert!("arima".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_only_kernel_requires_scaling() {
        let scaled: Vec<_> = ModelKind::ALL
            .iter()
            .filter(|k| k.requires_scaling())
            .collect();
        assert_eq!(scaled, vec![&ModelKind::KernelRidge]);
    }

    #[test]
    fn test_every_kind_fits_and_reports_itself() {
        let x: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let y: Vec<f64> = (0..12).map(|i| 10.0 + i as f64).collect();
        let params = ModelParams::default();
        for kind in ModelKind::ALL {
            let model = kind.fit(&x, &y, &params).unwrap();
            assert_eq!(model.kind(), kind);
            assert_eq!(model.n_features(), 2);
            assert_eq!(model.predict(&x).unwrap().len(), 12);
        }
    }

    #[test]
    fn test_validate_training_data() {
        assert!(validate_training_data(&[], &[]).is_err());
        assert!(validate_training_data(&[vec![1.0]], &[1.0, 2.0]).is_err());
        assert!(validate_training_data(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]).is_err());
        assert!(validate_training_data(&[vec![f64::NAN]], &[1.0]).is_err());
        assert_eq!(
            validate_training_data(&[vec![1.0, 2.0], vec![3.0, 4.0]], &[1.0, 2.0]).unwrap(),
            2
        );
    }
}
