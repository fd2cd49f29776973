pub mod balance;
pub mod config;
pub mod error;
pub mod flow;
pub mod geometry;
pub mod mapping;
pub mod pattern;
pub mod render;
pub mod rng;

use std::time::Instant;

use serde::Serialize;

use balance::BalanceResult;
use config::{Calibration, Layout, Params, PatternTable};
use error::Result;
use geometry::GeometryFrame;
use pattern::Pattern;
use rng::Seed;

pub use error::BalanceError;

/// Everything one recompute step produces for a parameter set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub params: Params,
    pub balance: BalanceResult,
    pub pattern: Pattern,
    pub seed: Seed,
    pub frame: GeometryFrame,
}

#[derive(Clone, Debug, Serialize)]
pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

/// Ratio, imbalance index, regime, tilt and processes with default constants.
pub fn evaluate_balance(params: &Params) -> BalanceResult {
    balance::evaluate(params, &Calibration::default())
}

pub fn evaluate_balance_with(params: &Params, cal: &Calibration) -> BalanceResult {
    balance::evaluate(params, cal)
}

pub fn classify_pattern(params: &Params, ratio: f64) -> Pattern {
    pattern::classify(params, ratio, &PatternTable::default())
}

pub fn classify_pattern_with(params: &Params, ratio: f64, table: &PatternTable) -> Pattern {
    pattern::classify(params, ratio, table)
}

/// Geometry on the default layout. Identical inputs give identical frames.
pub fn generate_geometry(pattern: Pattern, params: &Params, seed: Seed) -> GeometryFrame {
    geometry::generate(&Layout::default(), pattern, params, seed)
}

pub fn generate_geometry_in(
    layout: &Layout,
    pattern: Pattern,
    params: &Params,
    seed: Seed,
) -> Result<GeometryFrame> {
    layout.validate()?;
    Ok(geometry::generate(layout, pattern, params, seed))
}

pub fn compute_seed(params: &Params, ratio: f64) -> Seed {
    rng::compute_seed(params, ratio)
}

/// The single synchronous recompute step run on every parameter change.
pub fn recompute(
    params: &Params,
    cal: &Calibration,
    layout: &Layout,
) -> Result<(Evaluation, Vec<Timing>)> {
    layout.validate()?;
    let mut timings = Vec::new();
    let total_start = Instant::now();

    // 1. Balance
    let t = Instant::now();
    let balance = balance::evaluate(params, cal);
    timings.push(Timing {
        name: "balance",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 2. Seed from all inputs and the ratio
    let seed = rng::compute_seed(params, balance.ratio);

    // 3. Pattern
    let t = Instant::now();
    let pattern = pattern::classify(params, balance.ratio, &cal.pattern);
    timings.push(Timing {
        name: "pattern",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    // 4. Geometry
    let t = Instant::now();
    let frame = geometry::generate(layout, pattern, params, seed);
    timings.push(Timing {
        name: "geometry",
        ms: t.elapsed().as_secs_f64() * 1000.0,
    });

    timings.push(Timing {
        name: "TOTAL",
        ms: total_start.elapsed().as_secs_f64() * 1000.0,
    });

    tracing::debug!(
        ratio = balance.ratio,
        regime = %balance.regime,
        %pattern,
        seed = seed.value(),
        primitives = frame.len(),
        "recomputed"
    );

    let evaluation = Evaluation {
        params: *params,
        balance,
        pattern,
        seed,
        frame,
    };
    Ok((evaluation, timings))
}
