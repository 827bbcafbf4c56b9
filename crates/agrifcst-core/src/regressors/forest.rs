//! Bagged ensemble of regression trees.

use super::tree::{RegressionTree, TreeParams};
use super::{check_row, validate_training_data, ModelKind, Regressor};
use crate::error::{ForecastError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random forest settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub tree: TreeParams,
    /// Seed for bootstrap sampling
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            tree: TreeParams::default(),
            random_state: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Grow `n_estimators` trees, each on a bootstrap sample of the rows.
    ///
    /// Sampling is driven by a single seeded generator, so the same input
    /// always gives the same forest.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &ForestParams) -> Result<Self> {
        let n_features = validate_training_data(x, y)?;
        if params.n_estimators == 0 {
            return Err(ForecastError::invalid_parameter(
                "n_estimators",
                0,
                "must be positive",
            ));
        }

        let n = y.len();
        let mut rng = StdRng::seed_from_u64(params.random_state);
        let trees = (0..params.n_estimators)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit_indices(x, y, sample, &params.tree)
            })
            .collect();

        Ok(Self { trees, n_features })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        check_row(self.n_features, row)?;
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}
