//! Consumer-side flow animation over a generated frame.
//!
//! The core never advances anything itself. A single owning view builds a
//! [`FlowOverlay`] from a frame's path metadata and drives it on a fixed tick.

use std::time::Duration;

use serde::Serialize;

use crate::geometry::{GeometryFrame, PrimitiveId};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FlowState {
    pub id: PrimitiveId,
    pub length: f32,
    pub speed: f32,
    /// Distance travelled along the path, in `[0, length)`.
    pub offset: f32,
}

#[derive(Clone, Debug)]
pub struct FlowOverlay {
    tick: Duration,
    ticks: u64,
    states: Vec<FlowState>,
    cancelled: bool,
}

impl FlowOverlay {
    /// A zero `tick` is treated as one millisecond.
    pub fn from_frame(frame: &GeometryFrame, tick: Duration) -> Self {
        let states = frame
            .flow_paths()
            .map(|(p, meta)| FlowState {
                id: p.id,
                length: meta.length,
                speed: meta.speed,
                offset: 0.0,
            })
            .collect();
        Self {
            tick: tick.max(Duration::from_millis(1)),
            ticks: 0,
            states,
            cancelled: false,
        }
    }

    /// Set the overlay to the state for `elapsed` total time since start.
    /// Calling twice with the same value yields the same state. Returns
    /// `false` once cancelled.
    pub fn advance_to(&mut self, elapsed: Duration) -> bool {
        if self.cancelled {
            return false;
        }
        let ticks = (elapsed.as_nanos() / self.tick.as_nanos()) as u64;
        self.ticks = ticks;
        for s in &mut self.states {
            let offset = if s.length > 0.0 {
                ((s.speed as f64 * ticks as f64) % s.length as f64) as f32
            } else {
                0.0
            };
            // f32 rounding can land exactly on `length`.
            s.offset = if offset >= s.length { 0.0 } else { offset };
        }
        true
    }

    /// Stop all further advancing. Idempotent.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn states(&self) -> &[FlowState] {
        &self.states
    }

    pub fn offset(&self, id: PrimitiveId) -> Option<f32> {
        self.states.iter().find(|s| s.id == id).map(|s| s.offset)
    }
}
