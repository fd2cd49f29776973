use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Params, PatternTable};

/// Channel planform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    Straight,
    Meandering,
    Braided,
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pattern::Straight => "Straight",
            Pattern::Meandering => "Meandering",
            Pattern::Braided => "Braided",
        })
    }
}

/// Capped contribution of excess supply to braiding.
pub fn aggradation_factor(ratio: f64, table: &PatternTable) -> f64 {
    if ratio > 1.0 {
        ((ratio - 1.0) * table.aggradation_gain).min(table.aggradation_cap)
    } else {
        0.0
    }
}

/// Load-dominant braiding index. Discharge and slope are left out on purpose:
/// more stream power raises transport capacity, which works against braiding.
pub fn braiding_index(qs: f64, d50: f64, ratio: f64, table: &PatternTable) -> f64 {
    let sediment_load = qs / 100.0;
    let grain_size = d50 / 100.0;
    sediment_load * table.load_weight
        + grain_size * table.grain_weight
        + aggradation_factor(ratio, table)
}

/// First match wins: braided, then straight, else meandering.
pub fn get_channel_pattern(
    qs: f64,
    d50: f64,
    qw: f64,
    _s: f64,
    ratio: f64,
    table: &PatternTable,
) -> Pattern {
    let discharge = qw / 100.0;
    if braiding_index(qs, d50, ratio, table) > table.braiding_threshold {
        Pattern::Braided
    } else if discharge < table.straight_discharge {
        Pattern::Straight
    } else {
        Pattern::Meandering
    }
}

pub fn classify(params: &Params, ratio: f64, table: &PatternTable) -> Pattern {
    get_channel_pattern(params.qs(), params.d50(), params.qw(), params.s(), ratio, table)
}
