//! Invariants that hold across the whole parameter domain.

use proptest::prelude::*;

use streambalance::balance::{calculate_ratio, calculate_tilt_angle, get_imbalance_index};
use streambalance::config::{Params, RegimeTable};
use streambalance::mapping::map_log;
use streambalance::pattern::Pattern;
use streambalance::rng::Seed;
use streambalance::{compute_seed, evaluate_balance, generate_geometry};

fn domain() -> impl Strategy<Value = f64> {
    1.0f64..=100.0
}

fn pattern() -> impl Strategy<Value = Pattern> {
    prop_oneof![
        Just(Pattern::Straight),
        Just(Pattern::Meandering),
        Just(Pattern::Braided),
    ]
}

proptest! {
    #[test]
    fn map_log_is_bounded_and_increasing(a in domain(), b in domain()) {
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        prop_assert!(map_log(lo) >= 0.1 - 1e-12 && map_log(hi) <= 100.0 + 1e-9);
        if lo < hi {
            prop_assert!(map_log(lo) < map_log(hi));
        }
    }

    #[test]
    fn ratio_monotone_in_supply(
        qs in domain(),
        dq in 0.0f64..50.0,
        d50 in domain(),
        qw in domain(),
        s in domain(),
    ) {
        let qs2 = (qs + dq).min(100.0);
        prop_assert!(calculate_ratio(qs2, d50, qw, s) >= calculate_ratio(qs, d50, qw, s));
    }

    #[test]
    fn ratio_antitone_in_discharge(
        qs in domain(),
        d50 in domain(),
        qw in domain(),
        dq in 0.0f64..50.0,
        s in domain(),
    ) {
        let qw2 = (qw + dq).min(100.0);
        prop_assert!(calculate_ratio(qs, d50, qw2, s) <= calculate_ratio(qs, d50, qw, s));
    }

    #[test]
    fn imbalance_is_odd_under_inversion(r in 1e-4f64..=100.0) {
        let t = RegimeTable::default();
        let sum = get_imbalance_index(r, &t) + get_imbalance_index(1.0 / r, &t);
        prop_assert!(sum.abs() < 1e-9, "sum = {}", sum);
    }

    #[test]
    fn tilt_is_bounded(r in 1e-6f64..1e6) {
        let a = calculate_tilt_angle(r, &RegimeTable::default());
        prop_assert!((-30.0 - 1e-9..=30.0 + 1e-9).contains(&a));
    }

    #[test]
    fn evaluation_is_deterministic(qs in domain(), d50 in domain(), qw in domain(), s in domain()) {
        let p = Params::new(qs, d50, qw, s).unwrap();
        let a = evaluate_balance(&p);
        let b = evaluate_balance(&p);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(compute_seed(&p, a.ratio), compute_seed(&p, b.ratio));
        prop_assert!(a.imbalance_index.is_finite());
    }

    #[test]
    fn geometry_is_reproducible(
        qs in domain(), d50 in domain(), qw in domain(), s in domain(),
        pattern in pattern(), seed in 0.0f64..1e6,
    ) {
        let p = Params::new(qs, d50, qw, s).unwrap();
        let seed = Seed::new(seed).unwrap();
        let a = generate_geometry(pattern, &p, seed);
        let b = generate_geometry(pattern, &p, seed);
        prop_assert!(!a.is_empty());
        prop_assert_eq!(a, b);
    }
}
