//! Supply/transport balance: ratio, imbalance index, regime, tilt and the
//! list of active channel processes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Calibration, Params, ProcessTable, RegimeTable};
use crate::mapping::{map_log, map_slope};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    Degradation,
    Equilibrium,
    Aggradation,
}

impl Regime {
    pub fn label(self) -> &'static str {
        match self {
            Regime::Degradation => "Degradation",
            Regime::Equilibrium => "Equilibrium",
            Regime::Aggradation => "Aggradation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Regime::Degradation => "Transport capacity exceeds supply; the bed lowers.",
            Regime::Equilibrium => "Supply and transport capacity are in balance.",
            Regime::Aggradation => "Supply exceeds transport capacity; the bed builds up.",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the ordered process list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Process {
    pub name: &'static str,
    pub regime: Regime,
}

/// Everything derived from a parameter set by the balance engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceResult {
    /// `f64::INFINITY` when the transport term is zero.
    pub ratio: f64,
    pub imbalance_index: f64,
    pub regime: Regime,
    pub tilt_angle_deg: f64,
    pub stream_power: f64,
    pub active_processes: Vec<Process>,
}

impl BalanceResult {
    pub fn is_degenerate(&self) -> bool {
        self.ratio.is_infinite()
    }
}

impl fmt::Display for BalanceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Regime:        {}", self.regime)?;
        writeln!(f, "               {}", self.regime.description())?;
        writeln!(f, "Balance ratio: {:.3}", self.ratio)?;
        writeln!(f, "Imbalance:     {:+.3}", self.imbalance_index)?;
        writeln!(f, "Tilt:          {:+.1}°", self.tilt_angle_deg)?;
        writeln!(f, "Stream power:  {:.3}", self.stream_power)?;
        write!(f, "Processes:")?;
        for p in &self.active_processes {
            write!(f, "\n  - {}", p.name)?;
        }
        Ok(())
    }
}

/// Supply term over transport term. A zero transport term yields
/// `f64::INFINITY` instead of an error.
pub fn calculate_ratio(qs: f64, d50: f64, qw: f64, s: f64) -> f64 {
    let sediment_term = qs * map_log(d50);
    let water_term = qw * map_slope(s);
    if water_term == 0.0 {
        return f64::INFINITY;
    }
    sediment_term / water_term
}

/// `log10` of the ratio, clamped first so the result is always finite.
pub fn get_imbalance_index(ratio: f64, table: &RegimeTable) -> f64 {
    // NaN only arises from a caller bug; treat it as the low clamp.
    let r = if ratio.is_nan() { table.ratio_min } else { ratio };
    r.clamp(table.ratio_min, table.ratio_max).log10()
}

pub fn get_state(ratio: f64, table: &RegimeTable) -> Regime {
    let index = get_imbalance_index(ratio, table);
    if index < -table.dead_band {
        Regime::Degradation
    } else if index > table.dead_band {
        Regime::Aggradation
    } else {
        Regime::Equilibrium
    }
}

/// Beam tilt in degrees. Supply-heavy (ratio > 1) tilts negative.
pub fn calculate_tilt_angle(ratio: f64, table: &RegimeTable) -> f64 {
    let r = if ratio.is_nan() { 1.0 } else { ratio };
    let clamped = r.clamp(table.tilt_ratio_min, table.tilt_ratio_max);
    let deg = clamped.ln() * (table.max_tilt_deg / std::f64::consts::LN_10);
    -deg.clamp(-table.max_tilt_deg, table.max_tilt_deg)
}

/// Normalized stream power proxy in [0, 1]. Gates processes only.
#[inline]
pub fn calculate_stream_power(qw: f64, s: f64) -> f64 {
    (qw * s) / 10000.0
}

/// Ordered list of processes for the regime implied by `ratio`. The order is
/// part of the contract: most universal process first.
pub fn get_active_processes(
    ratio: f64,
    qw: f64,
    s: f64,
    regime_table: &RegimeTable,
    table: &ProcessTable,
) -> Vec<Process> {
    let regime = get_state(ratio, regime_table);
    let power = calculate_stream_power(qw, s);
    let mut out = Vec::with_capacity(4);
    let mut push = |name| out.push(Process { name, regime });

    match regime {
        Regime::Degradation => {
            push("Bed incision");
            if power > table.bank_erosion_power {
                push("Bank erosion");
            }
            if power > table.knickpoint_power {
                push("Knickpoint migration");
            }
            if ratio < table.armoring_ratio {
                push("Bed armoring");
            }
        }
        Regime::Aggradation => {
            push("Bar formation");
            if ratio > table.widening_ratio {
                push("Channel widening");
            }
            if ratio > table.avulsion_ratio {
                push("Avulsion risk");
            }
            push("Overbank deposition");
        }
        Regime::Equilibrium => {
            push("Sediment transport balance");
            push("Dynamic equilibrium");
        }
    }
    out
}

pub fn evaluate(params: &Params, cal: &Calibration) -> BalanceResult {
    let ratio = calculate_ratio(params.qs(), params.d50(), params.qw(), params.s());
    let result = BalanceResult {
        ratio,
        imbalance_index: get_imbalance_index(ratio, &cal.regime),
        regime: get_state(ratio, &cal.regime),
        tilt_angle_deg: calculate_tilt_angle(ratio, &cal.regime),
        stream_power: calculate_stream_power(params.qw(), params.s()),
        active_processes: get_active_processes(
            ratio,
            params.qw(),
            params.s(),
            &cal.regime,
            &cal.processes,
        ),
    };
    if result.is_degenerate() {
        tracing::warn!(?params, "transport term is zero; ratio is infinite");
    }
    result
}
