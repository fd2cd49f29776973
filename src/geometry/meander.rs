use std::f32::consts::TAU;

use crate::config::{Params, Rect};
use crate::mapping::lerp_param;
use crate::rng::{Seed, jitter, pseudo_random, range};

use super::{
    BAR_SAND, CHANNEL, Feature, Primitive, PrimitiveId, Shape, Style, floodplain, flow_speed,
};

const OFF_MEANDER: f64 = 300.0;
const OFF_MID_BAR: f64 = 400.0;
const MID_BAR_STRIDE: f64 = 3.7;
const SAMPLES: usize = 96;
/// Full wavelengths across the region.
const BENDS: f32 = 2.5;
const MIN_SINUOSITY: f64 = 1.05;
/// Point bars form only on bends at least this sinuous.
pub const POINT_BAR_SINUOSITY: f64 = 1.2;
/// Mid-channel bars start above this load/grain factor.
pub const MID_BAR_ONSET: f64 = 0.35;
const MAX_MID_BARS: f64 = 6.0;

/// Discharge raises curvature, sediment load suppresses it.
pub fn sinuosity(qs: f64, qw: f64) -> f64 {
    (1.1 + 0.5 * (qw / 100.0) - 0.2 * (qs / 100.0)).max(MIN_SINUOSITY)
}

pub fn mid_bar_factor(qs: f64, d50: f64) -> f64 {
    0.6 * (qs / 100.0) + 0.4 * (d50 / 100.0)
}

/// Mid-channel bar count and size scale for a factor; zero bars at or below
/// the onset, then a continuous ramp.
pub fn mid_bar_ramp(factor: f64) -> (usize, f32) {
    if factor <= MID_BAR_ONSET {
        return (0, 0.0);
    }
    let t = ((factor - MID_BAR_ONSET) / (1.0 - MID_BAR_ONSET)).min(1.0);
    let count = 1 + (t * MAX_MID_BARS).floor() as usize;
    (count, (0.25 + 0.55 * t) as f32)
}

pub fn channel_width(qw: f64) -> f32 {
    lerp_param(qw, 8.0, 28.0)
}

fn centerline(region: Rect, sinuosity: f64, phase: f32) -> Vec<[f32; 2]> {
    let amp = ((sinuosity - 1.0) as f32 * 2.0).min(1.0) * region.h * 0.4;
    (0..=SAMPLES)
        .map(|i| {
            let t = i as f32 / SAMPLES as f32;
            [region.x + t * region.w, region.cy() + amp * (TAU * BENDS * t + phase).sin()]
        })
        .collect()
}

/// Indices of strict three-point local extrema; `true` marks a maximum in y.
fn extrema(points: &[[f32; 2]]) -> Vec<(usize, bool)> {
    points
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let (a, b, c) = (w[0][1], w[1][1], w[2][1]);
            if b > a && b >= c {
                Some((i + 1, true))
            } else if b < a && b <= c {
                Some((i + 1, false))
            } else {
                None
            }
        })
        .collect()
}

pub fn meandering_channel(region: Rect, params: &Params, seed: Seed) -> Vec<Primitive> {
    let sinu = sinuosity(params.qs(), params.qw());
    let width = channel_width(params.qw());
    let phase = pseudo_random(seed.at(OFF_MEANDER)) as f32 * TAU;
    let line = centerline(region, sinu, phase);

    let mut out = vec![floodplain(region)];

    // Point bars sit on the inner bank of each bend.
    if sinu >= POINT_BAR_SINUOSITY {
        let rx = width * (0.8 + (sinu - POINT_BAR_SINUOSITY) as f32 * 3.0);
        let ry = width * 0.45;
        for (k, (i, is_max)) in extrema(&line).into_iter().enumerate() {
            let [x, y] = line[i];
            let shift = width * 0.5 + ry * 0.6;
            let cy = if is_max { y - shift } else { y + shift };
            out.push(Primitive::new(
                PrimitiveId::new(Feature::PointBar, k),
                Shape::Ellipse { cx: x, cy, rx, ry, rotation: 0.0 },
                Style::filled(BAR_SAND, 0.95),
            ));
        }
    }

    out.push(
        Primitive::new(
            PrimitiveId::new(Feature::Channel, 0),
            Shape::Path { points: line.clone(), closed: false },
            Style::stroked(CHANNEL, width, 1.0),
        )
        .with_flow(flow_speed(params)),
    );

    // Mid-channel bars drawn over the water, ramping toward the braided look.
    let (count, scale) = mid_bar_ramp(mid_bar_factor(params.qs(), params.d50()));
    for k in 0..count {
        let s = seed.at(OFF_MID_BAR + MID_BAR_STRIDE * k as f64);
        let along = (k + 1) as f32 / (count + 1) as f32;
        let i = ((along * SAMPLES as f32) as i64 + jitter(s, 3.0).round() as i64)
            .clamp(1, SAMPLES as i64 - 1) as usize;
        let [x, y] = line[i];
        let dx = line[i + 1][0] - line[i - 1][0];
        let dy = line[i + 1][1] - line[i - 1][1];
        let size = width * scale * range(s + 0.1, 0.9, 1.3);
        out.push(Primitive::new(
            PrimitiveId::new(Feature::MidBar, k),
            Shape::Ellipse {
                cx: x + jitter(s + 0.2, width * 0.1),
                cy: y + jitter(s + 0.3, width * 0.1),
                rx: size * 0.8,
                ry: size * 0.3,
                rotation: dy.atan2(dx),
            },
            Style::filled(BAR_SAND, 0.9),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> Rect {
        Rect::new(20.0, 290.0, 760.0, 210.0)
    }

    #[test]
    fn sinuosity_formula_and_floor() {
        assert!((sinuosity(50.0, 50.0) - 1.25).abs() < 1e-12);
        assert!((sinuosity(0.0, 100.0) - 1.6).abs() < 1e-12);
        assert_eq!(sinuosity(100.0, 1.0), MIN_SINUOSITY);
        assert!(sinuosity(20.0, 80.0) > sinuosity(20.0, 40.0));
        assert!(sinuosity(80.0, 60.0) < sinuosity(20.0, 60.0));
    }

    #[test]
    fn extrema_detection() {
        let pts = [[0.0, 0.0], [1.0, 2.0], [2.0, 1.0], [3.0, -1.0], [4.0, 0.0]];
        assert_eq!(extrema(&pts), vec![(1, true), (3, false)]);
    }

    #[test]
    fn point_bars_need_sinuosity() {
        let seed = Seed::new(31.0).unwrap();
        // sinuosity 1.1 + 0.1 - 0.1 = 1.1: no point bars.
        let low = Params::new(50.0, 20.0, 20.0, 50.0).unwrap();
        let frame = meandering_channel(region(), &low, seed);
        assert!(frame.iter().all(|p| p.id.feature != Feature::PointBar));
        // sinuosity 1.1 + 0.45 - 0.04 = 1.51: one bar per bend.
        let high = Params::new(20.0, 20.0, 90.0, 50.0).unwrap();
        let frame = meandering_channel(region(), &high, seed);
        let bars = frame.iter().filter(|p| p.id.feature == Feature::PointBar).count();
        assert!((4..=6).contains(&bars), "bars = {bars}");
    }

    #[test]
    fn mid_bars_ramp_continuously() {
        assert_eq!(mid_bar_ramp(0.35), (0, 0.0));
        let (n0, s0) = mid_bar_ramp(0.36);
        let (n1, s1) = mid_bar_ramp(0.7);
        let (n2, s2) = mid_bar_ramp(1.0);
        assert_eq!(n0, 1);
        assert!(s0 < 0.3, "first bars start small: {s0}");
        assert!(n1 > n0 && n2 > n1);
        assert!(s1 > s0 && s2 > s1);
        assert_eq!(n2, 7);
    }

    #[test]
    fn mid_bars_follow_inputs() {
        let seed = Seed::new(8.0).unwrap();
        let count = |qs, d50| {
            let p = Params::new(qs, d50, 60.0, 50.0).unwrap();
            meandering_channel(region(), &p, seed)
                .iter()
                .filter(|p| p.id.feature == Feature::MidBar)
                .count()
        };
        assert_eq!(count(20.0, 20.0), 0);
        assert!(count(70.0, 60.0) >= 1);
        assert!(count(100.0, 100.0) > count(70.0, 60.0));
    }
}
