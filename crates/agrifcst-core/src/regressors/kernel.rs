//! RBF kernel ridge regression.
//!
//! Solves `(K + I / C) alpha = y - mean(y)` with a Cholesky factorisation,
//! where `K[i][j] = exp(-gamma * |x_i - x_j|^2)`. Distances are only
//! meaningful on standardised inputs, so this model always runs behind a
//! [`crate::scaler::StandardScaler`].

use super::{check_row, validate_training_data, ModelKind, Regressor};
use crate::error::{ForecastError, Result};
use faer::linalg::solvers::Solve;
use faer::{Mat, Side};

/// Kernel settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams {
    /// RBF width
    pub gamma: f64,
    /// Inverse regularisation strength
    pub c: f64,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self { gamma: 0.1, c: 100.0 }
    }
}

#[derive(Debug, Clone)]
pub struct KernelRidge {
    support: Vec<Vec<f64>>,
    dual: Vec<f64>,
    offset: f64,
    gamma: f64,
}

fn rbf(a: &[f64], b: &[f64], gamma: f64) -> f64 {
    let dist2: f64 = a.iter().zip(b).map(|(u, v)| (u - v).powi(2)).sum();
    (-gamma * dist2).exp()
}

impl KernelRidge {
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &KernelParams) -> Result<Self> {
        validate_training_data(x, y)?;
        if !(params.gamma > 0.0 && params.gamma.is_finite()) {
            return Err(ForecastError::invalid_parameter(
                "gamma",
                params.gamma,
                "must be a positive finite number",
            ));
        }
        if !(params.c > 0.0 && params.c.is_finite()) {
            return Err(ForecastError::invalid_parameter(
                "c",
                params.c,
                "must be a positive finite number",
            ));
        }

        let n = y.len();
        let ridge = 1.0 / params.c;
        let offset = y.iter().sum::<f64>() / n as f64;

        let gram = Mat::from_fn(n, n, |i, j| {
            rbf(&x[i], &x[j], params.gamma) + if i == j { ridge } else { 0.0 }
        });
        let rhs = Mat::from_fn(n, 1, |i, _| y[i] - offset);

        let llt = gram.llt(Side::Lower).map_err(|_| {
            ForecastError::ComputationError("kernel matrix is not positive definite".to_string())
        })?;
        let alpha = llt.solve(rhs.as_ref());

        let dual: Vec<f64> = (0..n).map(|i| alpha[(i, 0)]).collect();
        if dual.iter().any(|a| !a.is_finite()) {
            return Err(ForecastError::ComputationError(
                "kernel solve produced non-finite weights".to_string(),
            ));
        }

        Ok(Self {
            support: x.to_vec(),
            dual,
            offset,
            gamma: params.gamma,
        })
    }
}

impl Regressor for KernelRidge {
    fn kind(&self) -> ModelKind {
        ModelKind::KernelRidge
    }

    fn n_features(&self) -> usize {
        self.support.first().map_or(0, Vec::len)
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        check_row(self.n_features(), row)?;
        let k: f64 = self
            .support
            .iter()
            .zip(&self.dual)
            .map(|(s, a)| a * rbf(s, row, self.gamma))
            .sum();
        Ok(self.offset + k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolates_smooth_function() {
        let x: Vec<Vec<f64>> = (0..25).map(|i| vec![i as f64 / 5.0 - 2.5]).collect();
        let y: Vec<f64> = x.iter().map(|r| r[0].powi(2)).collect();
        let model = KernelRidge::fit(&x, &y, &KernelParams { gamma: 1.0, c: 1e4 }).unwrap();

        for (row, target) in x.iter().zip(&y) {
            assert!((model.predict_row(row).unwrap() - target).abs() < 0.05);
        }
    }

    #[test]
    fn test_far_points_fall_back_to_mean() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0]];
        let y = vec![1.0, 2.0, 3.0];
        let model = KernelRidge::fit(&x, &y, &KernelParams::default()).unwrap();
        let far = model.predict_row(&[1e3]).unwrap();
        assert!((far - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_params() {
        let x = vec![vec![0.0], vec![1.0]];
        let y = vec![1.0, 2.0];
        assert!(KernelRidge::fit(&x, &y, &KernelParams { gamma: 0.0, c: 1.0 }).is_err());
        assert!(KernelRidge::fit(&x, &y, &KernelParams { gamma: 1.0, c: -1.0 }).is_err());
    }
}
