use crate::config::{Params, Rect};
use crate::mapping::lerp_param;
use crate::rng::{Seed, jitter};

use super::{CHANNEL, Feature, Primitive, PrimitiveId, Shape, Style, floodplain, flow_speed};

const OFF_STRAIGHT: f64 = 200.0;
const SEGMENTS: usize = 24;
const SEGMENT_JITTER: f32 = 2.0;

pub fn channel_width(qw: f64) -> f32 {
    lerp_param(qw, 6.0, 24.0)
}

/// A single thin channel; per-segment jitter only.
pub fn straight_channel(region: Rect, params: &Params, seed: Seed) -> Vec<Primitive> {
    let cy = region.cy();
    let points: Vec<[f32; 2]> = (0..=SEGMENTS)
        .map(|i| {
            let x = region.x + region.w * i as f32 / SEGMENTS as f32;
            let y = cy + jitter(seed.at(OFF_STRAIGHT + i as f64 * 0.37), SEGMENT_JITTER);
            [x, y]
        })
        .collect();

    vec![
        floodplain(region),
        Primitive::new(
            PrimitiveId::new(Feature::Channel, 0),
            Shape::Path { points, closed: false },
            Style::stroked(CHANNEL, channel_width(params.qw()), 1.0),
        )
        .with_flow(flow_speed(params)),
    ]
}
