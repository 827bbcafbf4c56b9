//! Gradient boosting with squared loss.

use super::tree::{RegressionTree, TreeParams};
use super::{check_row, validate_training_data, ModelKind, Regressor};
use crate::error::{ForecastError, Result};

/// Gradient boosting settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub tree: TreeParams,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            tree: TreeParams {
                max_depth: Some(3),
                ..TreeParams::default()
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoosting {
    init: f64,
    learning_rate: f64,
    stages: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoosting {
    /// Start from the target mean and fit each stage to the current residuals.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &BoostingParams) -> Result<Self> {
        let n_features = validate_training_data(x, y)?;
        if params.n_estimators == 0 {
            return Err(ForecastError::invalid_parameter(
                "n_estimators",
                0,
                "must be positive",
            ));
        }
        if !(params.learning_rate > 0.0 && params.learning_rate.is_finite()) {
            return Err(ForecastError::invalid_parameter(
                "learning_rate",
                params.learning_rate,
                "must be a positive finite number",
            ));
        }

        let init = y.iter().sum::<f64>() / y.len() as f64;
        let mut fitted = vec![init; y.len()];
        let mut stages = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(t, f)| t - f).collect();
            let tree = RegressionTree::fit_indices(x, &residuals, (0..y.len()).collect(), &params.tree);
            for (f, row) in fitted.iter_mut().zip(x) {
                *f += params.learning_rate * tree.predict_row(row);
            }
            stages.push(tree);
        }

        Ok(Self {
            init,
            learning_rate: params.learning_rate,
            stages,
            n_features,
        })
    }

    pub fn n_stages(&self) -> usize {
        self.stages.len()
    }
}

impl Regressor for GradientBoosting {
    fn kind(&self) -> ModelKind {
        ModelKind::GradientBoosting
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        check_row(self.n_features, row)?;
        let boost: f64 = self.stages.iter().map(|t| t.predict_row(row)).sum();
        Ok(self.init + self.learning_rate * boost)
    }
}
