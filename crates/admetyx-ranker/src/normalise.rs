//! Score normalisation functions.

use admetyx_molecules::RuleReport;

/// Rule compliance in [0, 1].
///
/// `family_share` of the value is the fraction of rule families passed; the rest is
/// the fraction of individual criteria satisfied. Both parts only grow when a
/// compound satisfies more, so compliance is monotone in rule satisfaction.
pub fn rule_compliance(report: &RuleReport, family_share: f64) -> f64 {
    let share = family_share.clamp(0.0, 1.0);
    let families = report.families();
    let family_fraction = report.families_passed() as f64 / families.len() as f64;
    let total = report.total_criteria();
    let criteria_fraction = if total == 0 {
        1.0
    } else {
        report.criteria_satisfied() as f64 / total as f64
    };
    share * family_fraction + (1.0 - share) * criteria_fraction
}

/// Integer ranking key: scores closer than `epsilon` usually share a key.
///
/// A zero epsilon keys on the exact bit pattern order of the score. Non-zero
/// epsilons are bounded by `MIN_TIE_EPSILON` and `MAX_TIE_EPSILON` in config
/// validation, which keeps the quantised key of a [0, 1] score inside `i64`.
pub fn tie_key(score: f64, epsilon: f64) -> i64 {
    if epsilon > 0.0 {
        (score / epsilon).round() as i64
    } else {
        // order-preserving map of f64 onto i64
        let bits = score.to_bits() as i64;
        bits ^ (((bits >> 63) as u64) >> 1) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admetyx_common::config::{RuleThresholds, MAX_TIE_EPSILON, MIN_TIE_EPSILON};
    use admetyx_common::DescriptorVector;
    use admetyx_molecules::assess_rules;
    use pretty_assertions::assert_eq;

    fn descriptors() -> DescriptorVector {
        DescriptorVector {
            mw: 320.0,
            logp: 2.5,
            hbd: 2,
            hba: 5,
            tpsa: 75.0,
            rotatable_bonds: 5,
            qed: 0.7,
            fsp3: 0.35,
            heavy_atoms: 23,
            molar_refractivity: 88.0,
        }
    }

    #[test]
    fn test_full_compliance_is_one() {
        let report = assess_rules(&descriptors(), &RuleThresholds::default());
        assert!((rule_compliance(&report, 0.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_compliance_blends_families_and_criteria() {
        let mut d = descriptors();
        d.tpsa = 150.0; // Veber fails on one criterion
        let report = assess_rules(&d, &RuleThresholds::default());
        let c = rule_compliance(&report, 0.5);
        let expected = 0.5 * (2.0 / 3.0) + 0.5 * (9.0 / 10.0);
        assert!((c - expected).abs() < 1e-12);
        assert!((rule_compliance(&report, 1.0) - 2.0 / 3.0).abs() < 1e-12);
        assert!((rule_compliance(&report, 0.0) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_tie_key_orders_scores() {
        assert_eq!(tie_key(0.5, 1e-3), tie_key(0.5 + 1e-5, 1e-3));
        assert!(tie_key(0.6, 1e-3) > tie_key(0.5, 1e-3));
        assert!(tie_key(0.6, 0.0) > tie_key(0.5, 0.0));
        assert!(tie_key(-0.1, 0.0) < tie_key(0.0, 0.0));
        assert!(tie_key(0.5 + 1e-12, 0.0) > tie_key(0.5, 0.0));
    }

    #[test]
    fn test_tie_key_distinct_at_epsilon_bounds() {
        let scores = [0.0, 0.1020, 0.5, 0.7483, 1.0];
        for eps in [MIN_TIE_EPSILON, MAX_TIE_EPSILON] {
            let keys: Vec<i64> = scores.iter().map(|&s| tie_key(s, eps)).collect();
            assert!(keys.windows(2).all(|w| w[0] < w[1]), "eps = {eps}: {keys:?}");
            assert!(keys[4] < i64::MAX);
        }
        assert_eq!(tie_key(1.0, MIN_TIE_EPSILON), 1_000_000_000_000_000);
    }
}
