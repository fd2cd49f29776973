//! Deterministic randomness for geometry. No stateful RNG: every draw is a
//! pure function of a real-valued sub-seed, so features never share a stream.
use serde::Serialize;

use crate::config::Params;
use crate::error::{BalanceError, Result};

/// Seed values are folded into this range so `sin` keeps full precision.
const SEED_MODULUS: u64 = 1_000_000;

#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// `frac(sin(n) · 10000)`: a hash onto [0, 1), not a statistical PRNG.
#[inline]
pub fn pseudo_random(n: f64) -> f64 {
    let x = n.sin() * 10000.0;
    let r = x - x.floor();
    // x - floor(x) rounds up to 1.0 for tiny negative x.
    if r >= 1.0 { 0.0 } else { r }
}

/// Uniform draw in `[lo, hi)`.
#[inline]
pub fn range(n: f64, lo: f32, hi: f32) -> f32 {
    lo + (hi - lo) * pseudo_random(n) as f32
}

/// Symmetric draw in `[-amp, amp)`.
#[inline]
pub fn jitter(n: f64, amp: f32) -> f32 {
    (pseudo_random(n) as f32 - 0.5) * 2.0 * amp
}

/// Base seed for one geometry frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Seed(f64);

impl Seed {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(BalanceError::InvalidSeed(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Sub-seed for one feature. Offsets are fixed per feature so a change in
    /// one feature's count never shifts another feature's draws.
    #[inline]
    pub fn at(self, offset: f64) -> f64 {
        self.0 + offset
    }
}

/// Stable hash of the four parameters and the ratio.
pub fn compute_seed(params: &Params, ratio: f64) -> Seed {
    let inputs = [params.qs(), params.d50(), params.qw(), params.s(), ratio];
    let h = inputs
        .iter()
        .fold(0x5EED_BA1A_0000_0001u64, |h, v| splitmix64(h ^ v.to_bits()));
    Seed((h % SEED_MODULUS) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_random_stays_in_unit_interval() {
        for i in -2000..2000 {
            let r = pseudo_random(i as f64 * 0.731);
            assert!((0.0..1.0).contains(&r), "r = {r}");
        }
    }

    #[test]
    fn pseudo_random_is_a_pure_function() {
        assert_eq!(pseudo_random(12.5).to_bits(), pseudo_random(12.5).to_bits());
        assert_ne!(pseudo_random(12.5), pseudo_random(12.6));
    }

    #[test]
    fn seed_rejects_non_finite() {
        assert!(Seed::new(f64::NAN).is_err());
        assert!(Seed::new(f64::INFINITY).is_err());
        assert_eq!(Seed::new(3.0).unwrap().at(0.5), 3.5);
    }

    #[test]
    fn compute_seed_is_stable_and_sensitive() {
        let p = Params::default();
        let a = compute_seed(&p, 1.0);
        assert_eq!(a, compute_seed(&p, 1.0));
        assert_ne!(a, compute_seed(&p, 1.0001));
        let q = Params::new(50.0, 50.0, 50.0, 51.0).unwrap();
        assert_ne!(a, compute_seed(&q, 1.0));
        assert!(a.value() < SEED_MODULUS as f64);
    }

    #[test]
    fn infinite_ratio_still_hashes() {
        let s = compute_seed(&Params::default(), f64::INFINITY);
        assert!(s.value().is_finite());
    }
}
