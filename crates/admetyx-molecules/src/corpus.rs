//! Synthetic training corpora.
//!
//! No labelled dataset ships with the engine, so both models learn from corpora
//! drawn here at startup. The corpora encode medicinal-chemistry rules of thumb,
//! not measurements: the classifier learns "looks like it sits inside the
//! Lipinski / Veber ranges" and each ADMET regressor learns the documented
//! target function below. Every bias parameter is a named constant so what the
//! models learn can be audited.
//!
//! Same seed and sample count always produce an identical corpus.

use admetyx_common::descriptors::{CLASSIFIER_FEATURES, REGRESSOR_FEATURES};
use admetyx_common::AdmetEndpoint;
use admetyx_ml::sampling::{self, chance, gaussian, uniform, uniform_int};
use rand::Rng;

/// Half-open sampling interval `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

const fn iv(lo: f64, hi: f64) -> Interval {
    Interval { lo, hi }
}

// ── Classifier corpus: drug-like population ─────────────────────────────────

pub const DRUG_LIKE_MW: Interval = iv(150.0, 500.0);
pub const DRUG_LIKE_LOGP: Interval = iv(-1.0, 5.0);
pub const DRUG_LIKE_HBD: Interval = iv(0.0, 6.0);
pub const DRUG_LIKE_HBA: Interval = iv(0.0, 11.0);
pub const DRUG_LIKE_TPSA: Interval = iv(20.0, 130.0);
pub const DRUG_LIKE_ROTATABLE: Interval = iv(0.0, 9.0);
pub const DRUG_LIKE_QED: Interval = iv(0.40, 0.95);

// ── Classifier corpus: decoy population ─────────────────────────────────────

/// Chance that a decoy feature is drawn from a violating region. Otherwise it is
/// drawn from the drug-like interval, which gives the two populations overlap.
pub const DECOY_VIOLATION_RATE: f64 = 0.6;
/// Chance that a violating decoy feature lands in the high region rather than the low one.
pub const DECOY_HIGH_SIDE_RATE: f64 = 0.5;

/// Violating regions as (high, low) intervals.
pub const DECOY_MW: (Interval, Interval) = (iv(500.0, 900.0), iv(50.0, 150.0));
pub const DECOY_LOGP: (Interval, Interval) = (iv(5.0, 12.0), iv(-5.0, -1.5));
pub const DECOY_HBD: (Interval, Interval) = (iv(6.0, 15.0), iv(0.0, 3.0));
pub const DECOY_HBA: (Interval, Interval) = (iv(11.0, 20.0), iv(0.0, 2.0));
pub const DECOY_TPSA: (Interval, Interval) = (iv(140.0, 250.0), iv(5.0, 20.0));
pub const DECOY_ROTATABLE: Interval = iv(10.0, 20.0);
/// Decoy QED always comes from here; it overlaps the drug-like interval on [0.40, 0.55).
pub const DECOY_QED: Interval = iv(0.05, 0.55);

/// Standard deviation of the Gaussian jitter added to every classifier feature.
pub const FEATURE_JITTER_SD: f64 = 0.01;

// ── Regressor corpus ────────────────────────────────────────────────────────

pub const REGRESSOR_MW: Interval = iv(100.0, 700.0);
pub const REGRESSOR_LOGP: Interval = iv(-3.0, 8.0);
pub const REGRESSOR_HBD: Interval = iv(0.0, 12.0);
pub const REGRESSOR_HBA: Interval = iv(0.0, 16.0);
pub const REGRESSOR_TPSA: Interval = iv(5.0, 250.0);
pub const REGRESSOR_ROTATABLE: Interval = iv(0.0, 18.0);
pub const REGRESSOR_QED: Interval = iv(0.05, 0.95);
pub const REGRESSOR_FSP3: Interval = iv(0.0, 1.0);

/// Mixed into the training seed so the regressor corpus is not correlated with
/// the classifier corpus.
pub const REGRESSOR_SEED_SALT: u64 = 0x00AD_3E7D;

// regressor feature columns
const MW: usize = 0;
const LOGP: usize = 1;
const HBD: usize = 2;
const HBA: usize = 3;
const TPSA: usize = 4;
const ROTATABLE: usize = 5;
const QED: usize = 6;
const FSP3: usize = 7;

/// `weight * norm(x[feature])` where `norm` clips `(x - lo) / (hi - lo)` to
/// [0, 1], reversed when `invert` is set.
#[derive(Debug, Clone, Copy)]
pub struct TargetTerm {
    pub feature: usize,
    pub weight: f64,
    pub lo: f64,
    pub hi: f64,
    pub invert: bool,
}

const fn term(feature: usize, weight: f64, lo: f64, hi: f64, invert: bool) -> TargetTerm {
    TargetTerm { feature, weight, lo, hi, invert }
}

/// Noisy generating function of one endpoint score.
#[derive(Debug, Clone, Copy)]
pub struct TargetFunction {
    pub endpoint: AdmetEndpoint,
    pub terms: &'static [TargetTerm],
    pub noise_sd: f64,
    pub clip: (f64, f64),
}

/// Target functions, in `AdmetEndpoint::ALL` order.
///
/// - Absorption: low MW, moderate LogP and low TPSA are favourable
/// - Distribution: moderate LogP, high fsp3 and few acceptors
/// - Metabolism: high fsp3, low LogP and good QED mean a more stable compound
/// - Excretion: low MW favours renal clearance
/// - Toxicity (as a safety score): low LogP and good QED are safer
pub const TARGET_FUNCTIONS: [TargetFunction; 5] = [
    TargetFunction {
        endpoint: AdmetEndpoint::Absorption,
        terms: &[
            term(MW, 0.6, 150.0, 450.0, true),
            term(LOGP, 0.2, -0.5, 4.5, false),
            term(TPSA, 0.2, 20.0, 100.0, true),
        ],
        noise_sd: 0.06,
        clip: (0.05, 0.98),
    },
    TargetFunction {
        endpoint: AdmetEndpoint::Distribution,
        terms: &[
            term(LOGP, 0.4, 1.0, 4.5, false),
            term(FSP3, 0.4, 0.0, 1.0, false),
            term(HBA, 0.2, 0.0, 8.0, true),
        ],
        noise_sd: 0.07,
        clip: (0.05, 0.95),
    },
    TargetFunction {
        endpoint: AdmetEndpoint::Metabolism,
        terms: &[
            term(FSP3, 0.5, 0.0, 1.0, false),
            term(LOGP, 0.3, 0.0, 3.5, true),
            term(QED, 0.2, 0.0, 1.0, false),
        ],
        noise_sd: 0.07,
        clip: (0.05, 0.95),
    },
    TargetFunction {
        endpoint: AdmetEndpoint::Excretion,
        terms: &[
            term(MW, 0.7, 100.0, 400.0, true),
            term(HBD, 0.2, 0.0, 5.0, false),
            term(ROTATABLE, 0.1, 0.0, 8.0, true),
        ],
        noise_sd: 0.07,
        clip: (0.05, 0.95),
    },
    TargetFunction {
        endpoint: AdmetEndpoint::Toxicity,
        terms: &[
            term(LOGP, 0.4, 0.0, 3.5, true),
            term(QED, 0.3, 0.0, 1.0, false),
            term(HBA, 0.2, 0.0, 8.0, true),
            term(TPSA, 0.1, 30.0, 120.0, false),
        ],
        noise_sd: 0.06,
        clip: (0.05, 0.95),
    },
];

fn norm(x: f64, lo: f64, hi: f64, invert: bool) -> f64 {
    let v = ((x - lo) / (hi - lo)).clamp(0.0, 1.0);
    if invert {
        1.0 - v
    } else {
        v
    }
}

impl TargetFunction {
    /// Noise-free score for a regressor feature row.
    pub fn base(&self, row: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.weight * norm(row[t.feature], t.lo, t.hi, t.invert))
            .sum()
    }
}

// ── Corpora ─────────────────────────────────────────────────────────────────

/// Labelled classifier samples, row-major over `CLASSIFIER_FEATURES`.
#[derive(Debug, Clone)]
pub struct ClassifierCorpus {
    pub features: Vec<f64>,
    /// 1.0 = drug-like, 0.0 = decoy
    pub labels: Vec<f64>,
}

impl ClassifierCorpus {
    pub const N_FEATURES: usize = CLASSIFIER_FEATURES.len();

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Regressor samples, row-major over `REGRESSOR_FEATURES`, with one target
/// column per endpoint in `AdmetEndpoint::ALL` order.
#[derive(Debug, Clone)]
pub struct RegressorCorpus {
    pub features: Vec<f64>,
    pub targets: [Vec<f64>; 5],
}

impl RegressorCorpus {
    pub const N_FEATURES: usize = REGRESSOR_FEATURES.len();

    pub fn len(&self) -> usize {
        self.targets[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets[0].is_empty()
    }
}

fn draw<R: Rng>(rng: &mut R, interval: Interval, integer: bool) -> f64 {
    if integer {
        uniform_int(rng, interval.lo as u32, interval.hi as u32)
    } else {
        uniform(rng, interval.lo, interval.hi)
    }
}

fn decoy_feature<R: Rng>(rng: &mut R, drug_like: Interval, violating: (Interval, Interval), integer: bool) -> f64 {
    if chance(rng, DECOY_VIOLATION_RATE) {
        let side = if chance(rng, DECOY_HIGH_SIDE_RATE) { violating.0 } else { violating.1 };
        draw(rng, side, integer)
    } else {
        draw(rng, drug_like, integer)
    }
}

/// `n / 2` drug-like samples followed by `n - n / 2` decoys.
pub fn classifier_corpus(n: usize, seed: u64) -> ClassifierCorpus {
    let mut rng = sampling::seeded(seed);
    let n_pos = n / 2;
    let mut features = Vec::with_capacity(n * ClassifierCorpus::N_FEATURES);
    let mut labels = Vec::with_capacity(n);

    for _ in 0..n_pos {
        features.extend_from_slice(&[
            draw(&mut rng, DRUG_LIKE_MW, false),
            draw(&mut rng, DRUG_LIKE_LOGP, false),
            draw(&mut rng, DRUG_LIKE_HBD, true),
            draw(&mut rng, DRUG_LIKE_HBA, true),
            draw(&mut rng, DRUG_LIKE_TPSA, false),
            draw(&mut rng, DRUG_LIKE_ROTATABLE, true),
            draw(&mut rng, DRUG_LIKE_QED, false),
        ]);
        labels.push(1.0);
    }

    for _ in n_pos..n {
        let rotatable = if chance(&mut rng, DECOY_VIOLATION_RATE) {
            draw(&mut rng, DECOY_ROTATABLE, true)
        } else {
            draw(&mut rng, DRUG_LIKE_ROTATABLE, true)
        };
        features.extend_from_slice(&[
            decoy_feature(&mut rng, DRUG_LIKE_MW, DECOY_MW, false),
            decoy_feature(&mut rng, DRUG_LIKE_LOGP, DECOY_LOGP, false),
            decoy_feature(&mut rng, DRUG_LIKE_HBD, DECOY_HBD, true),
            decoy_feature(&mut rng, DRUG_LIKE_HBA, DECOY_HBA, true),
            decoy_feature(&mut rng, DRUG_LIKE_TPSA, DECOY_TPSA, false),
            rotatable,
            draw(&mut rng, DECOY_QED, false),
        ]);
        labels.push(0.0);
    }

    for value in features.iter_mut() {
        *value += gaussian(&mut rng, 0.0, FEATURE_JITTER_SD);
    }

    ClassifierCorpus { features, labels }
}

/// Uniform descriptor draws scored by `TARGET_FUNCTIONS`, with Gaussian noise and clipping.
pub fn regressor_corpus(n: usize, seed: u64) -> RegressorCorpus {
    let mut rng = sampling::seeded(seed ^ REGRESSOR_SEED_SALT);
    let mut features = Vec::with_capacity(n * RegressorCorpus::N_FEATURES);
    let mut targets: [Vec<f64>; 5] = std::array::from_fn(|_| Vec::with_capacity(n));

    for _ in 0..n {
        let row = [
            draw(&mut rng, REGRESSOR_MW, false),
            draw(&mut rng, REGRESSOR_LOGP, false),
            draw(&mut rng, REGRESSOR_HBD, true),
            draw(&mut rng, REGRESSOR_HBA, true),
            draw(&mut rng, REGRESSOR_TPSA, false),
            draw(&mut rng, REGRESSOR_ROTATABLE, true),
            draw(&mut rng, REGRESSOR_QED, false),
            draw(&mut rng, REGRESSOR_FSP3, false),
        ];
        for (column, f) in targets.iter_mut().zip(TARGET_FUNCTIONS.iter()) {
            let noisy = f.base(&row) + gaussian(&mut rng, 0.0, f.noise_sd);
            column.push(noisy.clamp(f.clip.0, f.clip.1));
        }
        features.extend_from_slice(&row);
    }

    RegressorCorpus { features, targets }
}
