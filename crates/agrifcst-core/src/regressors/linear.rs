//! Ordinary least squares via anofox-regression.

use super::{check_row, validate_training_data, ModelKind, Regressor};
use crate::error::{ForecastError, Result};
use anofox_regression::prelude::*;
// The local `Regressor` shadows the prelude trait that provides `fit`
use anofox_regression::Regressor as _;

/// Fitted OLS model with intercept.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Fit `y = intercept + X * beta`.
    ///
    /// Coefficients the solver reports as non-finite (aliased columns) are
    /// treated as zero.
    pub fn fit(x: &[Vec<f64>], y: &[f64]) -> Result<Self> {
        let k = validate_training_data(x, y)?;
        let n = y.len();

        // Design matrix: n_obs rows × k columns
        let x_mat = faer::Mat::from_fn(n, k, |i, j| x[i][j]);
        let y_col = faer::Col::from_fn(n, |i| y[i]);

        let fitted = OlsRegressor::builder()
            .with_intercept(true)
            .build()
            .fit(&x_mat, &y_col)
            .map_err(|_| ForecastError::ComputationError("OLS fit failed".to_string()))?;

        // The intercept is reported separately from the beta coefficients
        let intercept = fitted.intercept().unwrap_or(0.0);
        let coeffs_col = fitted.coefficients();
        let coefficients: Vec<f64> = (0..coeffs_col.nrows())
            .map(|i| coeffs_col[i])
            .map(|c| if c.is_finite() { c } else { 0.0 })
            .collect();

        if !intercept.is_finite() {
            return Err(ForecastError::ComputationError(
                "OLS intercept is not finite".to_string(),
            ));
        }
        if coefficients.len() != k {
            return Err(ForecastError::ComputationError(format!(
                "OLS returned {} coefficients for {} features",
                coefficients.len(),
                k
            )));
        }

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

impl Regressor for LinearRegression {
    fn kind(&self) -> ModelKind {
        ModelKind::LinearRegression
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        check_row(self.coefficients.len(), row)?;
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(beta, v)| beta * v)
                .sum::<f64>())
    }
}
