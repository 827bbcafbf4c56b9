//! Predictor configuration.

use crate::error::{ForecastError, Result};
use crate::regressors::{BoostingParams, ForestParams, KernelParams, ModelKind, ModelParams};

/// Options for a [`crate::PricePredictor`] session.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorOptions {
    /// Share of feature rows used for training, the rest is held out (0-1)
    pub train_fraction: f64,
    /// Half-width of the forecast bounds as a share of the value
    pub interval_ratio: f64,
    /// Models evaluated during training, in tie-break order
    pub candidates: Vec<ModelKind>,
    /// Random forest settings (including the bootstrap seed)
    pub forest: ForestParams,
    /// Gradient boosting settings
    pub boosting: BoostingParams,
    /// RBF kernel ridge settings
    pub kernel: KernelParams,
}

impl Default for PredictorOptions {
    fn default() -> Self {
        Self {
            train_fraction: 0.8,
            interval_ratio: 0.2,
            candidates: ModelKind::ALL.to_vec(),
            forest: ForestParams::default(),
            boosting: BoostingParams::default(),
            kernel: KernelParams::default(),
        }
    }
}

impl PredictorOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ForecastError::invalid_parameter(
                "train_fraction",
                self.train_fraction,
                "must be in (0, 1)",
            ));
        }
        if !(self.interval_ratio >= 0.0 && self.interval_ratio.is_finite()) {
            return Err(ForecastError::invalid_parameter(
                "interval_ratio",
                self.interval_ratio,
                "must be a non-negative finite number",
            ));
        }
        if self.candidates.is_empty() {
            return Err(ForecastError::invalid_parameter(
                "candidates",
                "[]",
                "at least one model is required",
            ));
        }
        if self.forest.n_estimators == 0 {
            return Err(ForecastError::invalid_parameter(
                "forest.n_estimators",
                0,
                "must be positive",
            ));
        }
        if self.boosting.n_estimators == 0 {
            return Err(ForecastError::invalid_parameter(
                "boosting.n_estimators",
                0,
                "must be positive",
            ));
        }
        if !(self.boosting.learning_rate > 0.0 && self.boosting.learning_rate.is_finite()) {
            return Err(ForecastError::invalid_parameter(
                "boosting.learning_rate",
                self.boosting.learning_rate,
                "must be a positive finite number",
            ));
        }
        if !(self.kernel.gamma > 0.0 && self.kernel.gamma.is_finite()) {
            return Err(ForecastError::invalid_parameter(
                "kernel.gamma",
                self.kernel.gamma,
                "must be a positive finite number",
            ));
        }
        if !(self.kernel.c > 0.0 && self.kernel.c.is_finite()) {
            return Err(ForecastError::invalid_parameter(
                "kernel.c",
                self.kernel.c,
                "must be a positive finite number",
            ));
        }
        Ok(())
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            forest: self.forest,
            boosting: self.boosting,
            kernel: self.kernel,
        }
    }
}
