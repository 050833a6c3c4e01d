//! K-fold cross-validation.
//!
//! Closure-based: the caller supplies `FnMut(&[usize], &[usize]) -> Result<f64>`
//! receiving train/test index splits and returning a score, so any model with any
//! `fit` signature can be evaluated.

use crate::error::{MlError, Result};
use crate::sampling;

/// Result for a single fold.
#[derive(Debug, Clone)]
pub struct FoldResult {
    pub fold: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub score: f64,
}

/// Aggregated cross-validation result.
#[derive(Debug, Clone)]
pub struct CvResult {
    pub folds: Vec<FoldResult>,
    pub mean_score: f64,
    pub std_score: f64,
}

/// Shuffle `0..n_samples` with `seed`, cut into `k` contiguous folds and evaluate
/// each fold against the remaining `k - 1`.
///
/// # Errors
///
/// Fails if `k < 2`, `k > n_samples`, or the evaluation closure fails.
pub fn cross_validate_kfold<F>(n_samples: usize, k: usize, seed: u64, mut eval_fn: F) -> Result<CvResult>
where
    F: FnMut(&[usize], &[usize]) -> Result<f64>,
{
    if k < 2 {
        return Err(MlError::InvalidConfig("k must be at least 2".into()));
    }
    if k > n_samples {
        return Err(MlError::InvalidInput(format!("k ({k}) > n_samples ({n_samples})")));
    }

    let mut rng = sampling::seeded(seed);
    let indices = sampling::shuffled_indices(&mut rng, n_samples);

    // first n % k folds take one extra sample
    let base = n_samples / k;
    let extra = n_samples % k;
    let mut bounds = Vec::with_capacity(k + 1);
    bounds.push(0);
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        bounds.push(bounds[fold] + size);
    }

    let mut folds = Vec::with_capacity(k);
    for fold in 0..k {
        let test = &indices[bounds[fold]..bounds[fold + 1]];
        let train: Vec<usize> = indices[..bounds[fold]]
            .iter()
            .chain(&indices[bounds[fold + 1]..])
            .copied()
            .collect();
        let score = eval_fn(&train, test)?;
        folds.push(FoldResult { fold, n_train: train.len(), n_test: test.len(), score });
    }

    let mean_score = folds.iter().map(|f| f.score).sum::<f64>() / k as f64;
    let std_score =
        (folds.iter().map(|f| (f.score - mean_score).powi(2)).sum::<f64>() / k as f64).sqrt();

    Ok(CvResult { folds, mean_score, std_score })
}

/// Fraction of predictions equal to the labels.
pub fn accuracy(labels: &[f64], predicted: &[f64]) -> f64 {
    if labels.is_empty() || labels.len() != predicted.len() {
        return 0.0;
    }
    let correct = labels.iter().zip(predicted).filter(|(a, b)| a == b).count();
    correct as f64 / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_folds_partition_all_samples() {
        let mut seen = vec![0usize; 23];
        let result = cross_validate_kfold(23, 5, 42, |train, test| {
            assert_eq!(train.len() + test.len(), 23);
            for &i in test {
                seen[i] += 1;
            }
            Ok(test.len() as f64)
        })
        .unwrap();
        assert_eq!(seen, vec![1; 23]);
        let sizes: Vec<usize> = result.folds.iter().map(|f| f.n_test).collect();
        assert_eq!(sizes, vec![5, 5, 5, 4, 4]);
    }

    #[test]
    fn test_mean_and_std() {
        let mut scores = vec![1.0, 0.0].into_iter().cycle();
        let result = cross_validate_kfold(10, 2, 0, |_, _| Ok(scores.next().unwrap_or(0.0))).unwrap();
        assert!((result.mean_score - 0.5).abs() < 1e-12);
        assert!((result.std_score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_k() {
        assert!(cross_validate_kfold(10, 1, 0, |_, _| Ok(0.0)).is_err());
        assert!(cross_validate_kfold(3, 5, 0, |_, _| Ok(0.0)).is_err());
    }

    #[test]
    fn test_closure_error_propagates() {
        let err = cross_validate_kfold(10, 2, 0, |_, _| Err(MlError::DegenerateData("x".into())))
            .unwrap_err();
        assert!(matches!(err, MlError::DegenerateData(_)));
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[1.0, 0.0, 1.0, 1.0], &[1.0, 1.0, 1.0, 0.0]), 0.5);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }
}
