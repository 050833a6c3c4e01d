//! Second-order regression tree used as the weak learner of the boosted ensemble.
//!
//! Trees are grown on binned features with gradient / hessian statistics. A leaf
//! predicts `sum(g) / sum(h)`: with unit hessians this is the mean residual
//! (squared error), with `h = p(1 - p)` it is the Newton step for log-loss.

use crate::binning::FeatureBins;

/// Splits must improve the objective by more than this.
const MIN_GAIN: f64 = 1e-12;
const MIN_HESSIAN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    Split {
        feature: usize,
        /// Rows with `x[feature] <= threshold` go left.
        threshold: f64,
        left: usize,
        right: usize,
        gain: f64,
        n_samples: usize,
    },
    Leaf {
        value: f64,
        n_samples: usize,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

/// Per-row training statistics the tree is fitted to.
pub struct GradientStats<'a> {
    pub gradients: &'a [f64],
    pub hessians: &'a [f64],
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Grow a tree over `rows` of the binned matrix.
    pub fn fit(
        binned: &[u8],
        bins: &FeatureBins,
        stats: &GradientStats<'_>,
        rows: &[usize],
        params: TreeParams,
    ) -> Self {
        let mut builder = Builder {
            binned,
            bins,
            n_features: bins.n_features(),
            stats,
            params,
            nodes: Vec::new(),
        };
        builder.build(rows, 0);
        Self { nodes: builder.nodes }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split { feature, threshold, left, right, .. } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Add each split's gain to its feature's slot.
    pub fn accumulate_gains(&self, totals: &mut [f64]) {
        for node in &self.nodes {
            if let TreeNode::Split { feature, gain, .. } = node {
                totals[*feature] += gain;
            }
        }
    }
}

struct SplitCandidate {
    feature: usize,
    bin: usize,
    gain: f64,
}

struct Builder<'a> {
    binned: &'a [u8],
    bins: &'a FeatureBins,
    n_features: usize,
    stats: &'a GradientStats<'a>,
    params: TreeParams,
    nodes: Vec<TreeNode>,
}

impl Builder<'_> {
    fn build(&mut self, rows: &[usize], depth: usize) -> usize {
        let (g_sum, h_sum) = self.sums(rows);
        let leaf = TreeNode::Leaf {
            value: leaf_value(g_sum, h_sum),
            n_samples: rows.len(),
        };

        if depth >= self.params.max_depth
            || rows.len() < 2
            || rows.len() < 2 * self.params.min_samples_leaf
        {
            self.nodes.push(leaf);
            return self.nodes.len() - 1;
        }

        let Some(best) = self.best_split(rows, g_sum, h_sum) else {
            self.nodes.push(leaf);
            return self.nodes.len() - 1;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .copied()
            .partition(|&r| self.binned[r * self.n_features + best.feature] as usize <= best.bin);

        // placeholder, replaced once both children exist
        let node_idx = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { value: 0.0, n_samples: 0 });

        let left = self.build(&left_rows, depth + 1);
        let right = self.build(&right_rows, depth + 1);

        self.nodes[node_idx] = TreeNode::Split {
            feature: best.feature,
            threshold: self.bins.threshold(best.feature, best.bin),
            left,
            right,
            gain: best.gain,
            n_samples: rows.len(),
        };
        node_idx
    }

    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &r| {
            (g + self.stats.gradients[r], h + self.stats.hessians[r])
        })
    }

    fn best_split(&self, rows: &[usize], g_sum: f64, h_sum: f64) -> Option<SplitCandidate> {
        if h_sum <= MIN_HESSIAN {
            return None;
        }
        let parent_score = g_sum * g_sum / h_sum;
        let min_leaf = self.params.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..self.n_features {
            let n_bins = self.bins.n_bins(feature);
            if n_bins < 2 {
                continue;
            }

            let mut hist = vec![(0.0_f64, 0.0_f64, 0_usize); n_bins];
            for &r in rows {
                let slot = &mut hist[self.binned[r * self.n_features + feature] as usize];
                slot.0 += self.stats.gradients[r];
                slot.1 += self.stats.hessians[r];
                slot.2 += 1;
            }

            let (mut g_left, mut h_left, mut n_left) = (0.0, 0.0, 0usize);
            for (bin, &(g, h, n)) in hist.iter().enumerate().take(n_bins - 1) {
                g_left += g;
                h_left += h;
                n_left += n;
                let n_right = rows.len() - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let g_right = g_sum - g_left;
                let h_right = h_sum - h_left;
                if h_left <= MIN_HESSIAN || h_right <= MIN_HESSIAN {
                    continue;
                }

                let gain = g_left * g_left / h_left + g_right * g_right / h_right - parent_score;
                let improves = match &best {
                    Some(b) => gain > b.gain,
                    None => gain > MIN_GAIN,
                };
                if improves {
                    best = Some(SplitCandidate { feature, bin, gain });
                }
            }
        }
        best
    }
}

fn leaf_value(g_sum: f64, h_sum: f64) -> f64 {
    if h_sum > MIN_HESSIAN {
        g_sum / h_sum
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fit_plain(data: &[f64], n_features: usize, targets: &[f64], params: TreeParams) -> RegressionTree {
        let bins = FeatureBins::fit(data, n_features, 64);
        let binned = bins.transform(data);
        let hessians = vec![1.0; targets.len()];
        let rows: Vec<usize> = (0..targets.len()).collect();
        let stats = GradientStats { gradients: targets, hessians: &hessians };
        RegressionTree::fit(&binned, &bins, &stats, &rows, params)
    }

    #[test]
    fn test_step_function_recovered() {
        let data: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let targets: Vec<f64> = data.iter().map(|&x| if x < 10.0 { 1.0 } else { 5.0 }).collect();
        let tree = fit_plain(&data, 1, &targets, TreeParams { max_depth: 1, min_samples_leaf: 1 });
        assert_eq!(tree.predict(&[3.0]), 1.0);
        assert_eq!(tree.predict(&[15.0]), 5.0);
        match &tree.nodes()[0] {
            TreeNode::Split { threshold, .. } => assert_eq!(*threshold, 9.5),
            other => panic!("expected split, got {other:?}"),
        }
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let data: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let mut targets = vec![0.0; 10];
        targets[0] = 100.0;
        let tree = fit_plain(&data, 1, &targets, TreeParams { max_depth: 3, min_samples_leaf: 3 });
        for node in tree.nodes() {
            if let TreeNode::Leaf { n_samples, .. } = node {
                assert!(*n_samples >= 3);
            }
        }
    }

    #[test]
    fn test_uninformative_feature_not_used() {
        // feature 0 is noise-free signal, feature 1 is constant
        let data: Vec<f64> = (0..30).flat_map(|i| [i as f64, 2.0]).collect();
        let targets: Vec<f64> = (0..30).map(|i| if i % 30 < 15 { -1.0 } else { 1.0 }).collect();
        let tree = fit_plain(&data, 2, &targets, TreeParams { max_depth: 2, min_samples_leaf: 1 });
        let mut gains = vec![0.0; 2];
        tree.accumulate_gains(&mut gains);
        assert!(gains[0] > 0.0);
        assert_eq!(gains[1], 0.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let data: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let targets = vec![0.25; 12];
        let tree = fit_plain(&data, 1, &targets, TreeParams { max_depth: 4, min_samples_leaf: 1 });
        assert_eq!(tree.nodes().len(), 1);
        assert!((tree.predict(&[100.0]) - 0.25).abs() < 1e-12);
    }
}
