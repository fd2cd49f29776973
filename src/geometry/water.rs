use std::f32::consts::TAU;

use crate::config::{Params, Rect};
use crate::mapping::lerp_param;
use crate::rng::{Seed, pseudo_random};

use super::{CONTAINER, Feature, Primitive, PrimitiveId, Shape, Style, WATER};

const OFF_WAVE: f64 = 50.0;
const SURFACE_SAMPLES: usize = 48;

/// Fraction of the container height filled with water.
pub fn fill_fraction(qw: f64) -> f32 {
    lerp_param(qw, 0.15, 0.85)
}

/// Surface wave amplitude in pixels.
pub fn wave_amplitude(s: f64) -> f32 {
    lerp_param(s, 1.0, 8.0)
}

/// Number of full waves across the surface. Steps in bands of slope.
pub fn wave_count(s: f64) -> u32 {
    if s < 25.0 {
        1
    } else if s < 50.0 {
        2
    } else if s < 75.0 {
        3
    } else {
        4
    }
}

pub fn water_fill(region: Rect, params: &Params, seed: Seed) -> Vec<Primitive> {
    let level = region.bottom() - fill_fraction(params.qw()) * region.h;
    let amp = wave_amplitude(params.s());
    let waves = wave_count(params.s()) as f32;
    let phase = pseudo_random(seed.at(OFF_WAVE)) as f32 * TAU;

    let mut surface: Vec<[f32; 2]> = (0..=SURFACE_SAMPLES)
        .map(|i| {
            let t = i as f32 / SURFACE_SAMPLES as f32;
            let y = level + amp * (TAU * waves * t + phase).sin();
            [region.x + t * region.w, y.max(region.y)]
        })
        .collect();
    surface.push([region.right(), region.bottom()]);
    surface.push([region.x, region.bottom()]);

    // Open-topped vessel.
    let container = vec![
        [region.x, region.y],
        [region.x, region.bottom()],
        [region.right(), region.bottom()],
        [region.right(), region.y],
    ];

    vec![
        Primitive::new(
            PrimitiveId::new(Feature::WaterFill, 0),
            Shape::Path { points: surface, closed: true },
            Style::filled(WATER, 0.85),
        ),
        Primitive::new(
            PrimitiveId::new(Feature::Container, 0),
            Shape::Path { points: container, closed: false },
            Style::stroked(CONTAINER, 3.0, 1.0),
        ),
    ]
}
