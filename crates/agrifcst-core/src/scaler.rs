//! Column standardisation for models that need unit-scale inputs.

use crate::error::{ForecastError, Result};
use statrs::statistics::Statistics;

/// Per-column z-score transform fitted on a training matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations.
    ///
    /// Constant columns get a scale of 1 so they transform to zero.
    pub fn fit(x: &[Vec<f64>]) -> Result<Self> {
        let Some(first) = x.first() else {
            return Err(ForecastError::InvalidInput(
                "Cannot fit scaler on an empty matrix".to_string(),
            ));
        };
        let n_cols = first.len();
        if x.iter().any(|row| row.len() != n_cols) {
            return Err(ForecastError::InvalidInput(
                "All rows must have the same number of columns".to_string(),
            ));
        }

        let mut means = Vec::with_capacity(n_cols);
        let mut scales = Vec::with_capacity(n_cols);
        for j in 0..n_cols {
            let column: Vec<f64> = x.iter().map(|row| row[j]).collect();
            let std = column.iter().population_std_dev();
            means.push(column.iter().mean());
            scales.push(if std.is_finite() && std > f64::EPSILON {
                std
            } else {
                1.0
            });
        }

        Ok(Self { means, scales })
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.means.len() {
            return Err(ForecastError::InvalidInput(format!(
                "Scaler expects {} features, got {}",
                self.means.len(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(v, (mean, scale))| (v - mean) / scale)
            .collect())
    }

    pub fn transform(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        x.iter().map(|row| self.transform_row(row)).collect()
    }
}
