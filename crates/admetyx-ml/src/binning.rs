//! Per-feature histogram binning.
//!
//! Split search runs over bin boundaries instead of every distinct value. Each
//! feature gets at most `max_bins - 1` cut points placed midway between distinct
//! training values; a value `x` falls in bin `b` where `b` is the number of cuts
//! strictly below `x`. Hence `bin(x) <= b` exactly when `x <= cuts[b]`, which lets
//! a tree trained on bins predict on raw values with the same `<=` comparison.

/// Upper bound on bins per feature; bin indices are stored as `u8`.
pub const MAX_BINS_LIMIT: usize = 256;

#[derive(Debug, Clone)]
pub struct FeatureBins {
    cuts: Vec<Vec<f64>>,
}

impl FeatureBins {
    /// Compute cut points from row-major `data`. Inputs must already be finite.
    pub fn fit(data: &[f64], n_features: usize, max_bins: usize) -> Self {
        let n_samples = data.len() / n_features.max(1);
        let max_bins = max_bins.clamp(2, MAX_BINS_LIMIT);

        let cuts = (0..n_features)
            .map(|feat| {
                let mut values: Vec<f64> =
                    (0..n_samples).map(|i| data[i * n_features + feat]).collect();
                values.sort_by(|a, b| a.total_cmp(b));
                values.dedup();
                quantile_cuts(&values, max_bins)
            })
            .collect();

        Self { cuts }
    }

    pub fn n_features(&self) -> usize {
        self.cuts.len()
    }

    /// Number of bins for a feature (cuts + 1).
    pub fn n_bins(&self, feature: usize) -> usize {
        self.cuts[feature].len() + 1
    }

    /// Raw-value threshold separating bins `<= bin` from the rest.
    pub fn threshold(&self, feature: usize, bin: usize) -> f64 {
        self.cuts[feature][bin]
    }

    pub fn bin_of(&self, feature: usize, value: f64) -> u8 {
        self.cuts[feature].partition_point(|c| *c < value) as u8
    }

    /// Bin every value of row-major `data`.
    pub fn transform(&self, data: &[f64]) -> Vec<u8> {
        let n_features = self.n_features();
        data.iter()
            .enumerate()
            .map(|(i, &v)| self.bin_of(i % n_features, v))
            .collect()
    }
}

/// `distinct` is sorted and deduplicated.
fn quantile_cuts(distinct: &[f64], max_bins: usize) -> Vec<f64> {
    let u = distinct.len();
    if u < 2 {
        return Vec::new();
    }
    if u <= max_bins {
        return distinct.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    }
    (1..max_bins)
        .map(|q| {
            let idx = q * u / max_bins;
            (distinct[idx - 1] + distinct[idx]) / 2.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_few_distinct_values_get_midpoints() {
        // one feature, values 0..=3
        let data = vec![0.0, 1.0, 2.0, 3.0, 3.0, 1.0];
        let bins = FeatureBins::fit(&data, 1, 64);
        assert_eq!(bins.n_bins(0), 4);
        assert_eq!(bins.threshold(0, 0), 0.5);
        assert_eq!(bins.bin_of(0, 0.0), 0);
        assert_eq!(bins.bin_of(0, 3.0), 3);
    }

    #[test]
    fn test_bin_threshold_consistency() {
        let data: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.37).sin() * 100.0).collect();
        let bins = FeatureBins::fit(&data, 1, 16);
        assert_eq!(bins.n_bins(0), 16);
        for &x in &data {
            let b = bins.bin_of(0, x) as usize;
            for split in 0..bins.n_bins(0) - 1 {
                assert_eq!(b <= split, x <= bins.threshold(0, split));
            }
        }
    }

    #[test]
    fn test_constant_feature_single_bin() {
        let data = vec![1.0, 5.0, 1.0, 6.0, 1.0, 7.0];
        let bins = FeatureBins::fit(&data, 2, 8);
        assert_eq!(bins.n_bins(0), 1);
        assert_eq!(bins.n_bins(1), 3);
        assert_eq!(bins.transform(&data), vec![0, 0, 0, 1, 0, 2]);
    }
}
