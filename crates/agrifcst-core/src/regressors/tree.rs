//! Least-squares regression tree (CART).

use crate::error::Result;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Maximum depth, `None` grows until leaves are pure or too small
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs to be split
    pub min_samples_split: usize,
    /// Minimum samples on each side of a split
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted tree stored as a flat node arena; node 0 is the root.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    /// Fit on all rows of `x`.
    pub fn fit(x: &[Vec<f64>], y: &[f64], params: &TreeParams) -> Result<Self> {
        super::validate_training_data(x, y)?;
        Ok(Self::fit_indices(x, y, (0..y.len()).collect(), params))
    }

    /// Fit on the rows named by `indices`; repeats are allowed (bootstrap).
    ///
    /// Callers must have validated `x` and `y` and pass a non-empty index set.
    pub(crate) fn fit_indices(
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        params: &TreeParams,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(x, y, indices, 0, params);
        tree
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        depth: usize,
        params: &TreeParams,
    ) -> usize {
        let node_idx = self.nodes.len();
        let n = indices.len() as f64;
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let mean = sum / n;
        self.nodes.push(Node::Leaf { value: mean });

        let sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();
        let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || indices.len() < params.min_samples_split || sse <= 1e-12 {
            return node_idx;
        }

        let Some(split) = best_split(x, y, &indices, params.min_samples_leaf) else {
            return node_idx;
        };
        // Must improve on the parent's sum^2 / n
        if split.score <= sum * sum / n + 1e-12 {
            return node_idx;
        }

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[i][split.feature] <= split.threshold);

        let left = self.grow(x, y, left_idx, depth + 1, params);
        let right = self.grow(x, y, right_idx, depth + 1, params);
        self.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_idx
    }
}

/// Exhaustive search over features and distinct thresholds.
///
/// Score is `sum_l^2 / n_l + sum_r^2 / n_r`; maximising it minimises
/// the children's summed squared error.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    min_leaf: usize,
) -> Option<SplitCandidate> {
    let n = indices.len();
    let min_leaf = min_leaf.max(1);
    let total: f64 = indices.iter().map(|&i| y[i]).sum();
    let n_features = x[indices[0]].len();
    let mut best: Option<SplitCandidate> = None;

    for feature in 0..n_features {
        let mut pairs: Vec<(f64, f64)> = indices.iter().map(|&i| (x[i][feature], y[i])).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        for k in 1..n {
            left_sum += pairs[k - 1].1;
            if pairs[k - 1].0 >= pairs[k].0 || k < min_leaf || n - k < min_leaf {
                continue;
            }
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / k as f64 + right_sum * right_sum / (n - k) as f64;
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: 0.5 * (pairs[k - 1].0 + pairs[k].0),
                    score,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_function_is_learned_exactly() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 7.0 }).collect();
        let tree = RegressionTree::fit(&x, &y, &TreeParams::default()).unwrap();

        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.predict_row(&[2.0]), 1.0);
        assert_eq!(tree.predict_row(&[4.4]), 1.0);
        assert_eq!(tree.predict_row(&[4.6]), 7.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x: Vec<Vec<f64>> = (0..16).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..16).map(|i| i as f64).collect();
        let params = TreeParams {
            max_depth: Some(2),
            ..TreeParams::default()
        };
        let tree = RegressionTree::fit(&x, &y, &params).unwrap();
        assert_eq!(tree.n_leaves(), 4);

        let full = RegressionTree::fit(&x, &y, &TreeParams::default()).unwrap();
        assert_eq!(full.n_leaves(), 16);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64, 1.0]).collect();
        let y = vec![3.0; 5];
        let tree = RegressionTree::fit(&x, &y, &TreeParams::default()).unwrap();
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict_row(&[100.0, 0.0]), 3.0);
    }
}
