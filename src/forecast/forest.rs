//! Random forest regression
//!
//! Bagged CART regression trees: each tree is grown on a bootstrap sample,
//! splits minimize the summed squared error of the children, and every feature
//! is considered at every split. Trees grow until leaves are pure or hold a
//! single sample. The forest prediction is the mean of the tree predictions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Hard stop on tree depth
const MAX_DEPTH: usize = 32;

/// Nodes with fewer samples become leaves
const MIN_SAMPLES_SPLIT: usize = 2;

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }
}

/// A single regression tree
#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
}

impl RegressionTree {
    /// Grow a tree over the rows selected by `indices` (repeats allowed)
    pub fn fit(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Self {
        let mut indices = indices.to_vec();
        Self {
            root: grow(x, y, &mut indices, 0),
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.root.predict(row)
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

fn grow(x: &[Vec<f64>], y: &[f64], indices: &mut [usize], depth: usize) -> Node {
    let n = indices.len();
    let sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let mean = if n > 0 { sum / n as f64 } else { 0.0 };

    if n < MIN_SAMPLES_SPLIT || depth >= MAX_DEPTH {
        return Node::Leaf(mean);
    }

    let parent_sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();
    if parent_sse <= f64::EPSILON {
        return Node::Leaf(mean);
    }

    let Some(best) = best_split(x, y, indices, parent_sse) else {
        return Node::Leaf(mean);
    };

    let (mut left_idx, mut right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[i][best.feature] <= best.threshold);

    Node::Split {
        feature: best.feature,
        threshold: best.threshold,
        left: Box::new(grow(x, y, &mut left_idx, depth + 1)),
        right: Box::new(grow(x, y, &mut right_idx, depth + 1)),
    }
}

/// Exhaustive search over features and midpoints between distinct sorted values
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &mut [usize],
    parent_sse: f64,
) -> Option<BestSplit> {
    let n = indices.len();
    let width = x.get(indices[0]).map(|r| r.len()).unwrap_or(0);
    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();

    let mut best: Option<BestSplit> = None;

    for feature in 0..width {
        indices.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for pos in 0..n - 1 {
            let yi = y[indices[pos]];
            left_sum += yi;
            left_sq += yi * yi;

            let here = x[indices[pos]][feature];
            let next = x[indices[pos + 1]][feature];
            if next <= here {
                continue;
            }

            let left_n = (pos + 1) as f64;
            let right_n = (n - pos - 1) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            let improves = sse < parent_sse - 1e-12;
            let better = best.as_ref().map_or(true, |b| sse < b.sse);
            if improves && better {
                best = Some(BestSplit {
                    feature,
                    threshold: (here + next) / 2.0,
                    sse,
                });
            }
        }
    }

    best
}

/// Bagged ensemble of regression trees with a reproducible seed
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    seed: u64,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            seed,
            trees: Vec::new(),
        }
    }

    /// Fit the ensemble. Rows and targets must have equal length.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) {
        let n = x.len().min(y.len());
        self.trees.clear();
        if n == 0 {
            return;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        for _ in 0..self.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            self.trees.push(RegressionTree::fit(x, y, &sample));
        }
    }

    /// Mean prediction across trees; 0 before fitting
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        total / self.trees.len() as f64
    }

    pub fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_fits_step_function_exactly() {
        let x: Vec<Vec<f64>> = (0..8).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..8).map(|i| if i < 4 { 1.0 } else { 5.0 }).collect();
        let indices: Vec<usize> = (0..8).collect();

        let tree = RegressionTree::fit(&x, &y, &indices);
        assert_eq!(tree.predict(&[0.0]), 1.0);
        assert_eq!(tree.predict(&[3.0]), 1.0);
        assert_eq!(tree.predict(&[4.0]), 5.0);
        assert_eq!(tree.predict(&[100.0]), 5.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![i as f64, 1.0]).collect();
        let y = vec![2.5; 5];
        let tree = RegressionTree::fit(&x, &y, &[0, 1, 2, 3, 4]);
        assert!(matches!(tree.root, Node::Leaf(v) if (v - 2.5).abs() < 1e-12));
    }

    #[test]
    fn test_forest_is_reproducible() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| 0.3 * i as f64 + (i % 3) as f64).collect();

        let mut a = RandomForestRegressor::new(100, 42);
        let mut b = RandomForestRegressor::new(100, 42);
        a.fit(&x, &y);
        b.fit(&x, &y);

        assert_eq!(a.n_trees(), 100);
        assert_eq!(a.predict(&x), b.predict(&x));
    }

    #[test]
    fn test_forest_predictions_stay_within_target_range() {
        let x: Vec<Vec<f64>> = (0..15).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..15).map(|i| 2.0 + i as f64 * 0.5).collect();
        let mut forest = RandomForestRegressor::new(50, 7);
        forest.fit(&x, &y);

        for p in forest.predict(&[vec![-10.0], vec![7.0], vec![50.0]]) {
            assert!((2.0..=9.0).contains(&p));
        }
    }

    #[test]
    fn test_unfitted_forest_predicts_zero() {
        let forest = RandomForestRegressor::new(10, 1);
        assert_eq!(forest.predict_row(&[1.0, 2.0]), 0.0);
    }
}
