use std::f32::consts::TAU;

use crate::config::{Params, Rect};
use crate::mapping::lerp_param;
use crate::rng::{Seed, jitter, pseudo_random, range};

use super::{
    CHANNEL, CORRIDOR, Feature, GRAVEL, Primitive, PrimitiveId, Shape, Style, floodplain,
    flow_speed, rect_points,
};

const OFF_THREAD: f64 = 1000.0;
const THREAD_STRIDE: f64 = 50.0;
const OFF_PATCH: f64 = 3000.0;
const PATCH_STRIDE: f64 = 3.1;
const OFF_LINK: f64 = 4000.0;
const LINK_STRIDE: f64 = 5.3;
const SAMPLES: usize = 64;
const POINT_JITTER: f32 = 1.5;

pub fn thread_count(qw: f64) -> usize {
    (2.0 + 4.0 * qw / 100.0).round() as usize
}

pub fn patch_count(d50: f64) -> usize {
    (12.0 + 36.0 * d50 / 100.0).round() as usize
}

pub fn connector_count(threads: usize, qs: f64) -> usize {
    if threads < 2 {
        return 0;
    }
    ((threads - 1) as f64 * (1.0 + 2.0 * qs / 100.0)).round() as usize
}

/// Gravel corridor centred in the region; wider with more load.
pub fn corridor(region: Rect, qs: f64) -> Rect {
    let h = region.h * lerp_param(qs, 0.5, 0.85);
    Rect::new(region.x, region.cy() - h * 0.5, region.w, h)
}

/// One weaving thread: two superposed sines plus per-point jitter, clamped
/// inside the corridor.
fn thread(corr: Rect, base_y: f32, margin: f32, s: f64) -> Vec<[f32; 2]> {
    let a1 = corr.h * 0.12 * range(s + 0.1, 0.7, 1.3);
    let a2 = corr.h * 0.05 * range(s + 0.2, 0.7, 1.3);
    let f1 = range(s + 0.3, 1.0, 2.5);
    let f2 = range(s + 0.4, 3.5, 6.0);
    let p1 = pseudo_random(s + 0.5) as f32 * TAU;
    let p2 = pseudo_random(s + 0.6) as f32 * TAU;
    let lo = corr.y + margin;
    let hi = (corr.bottom() - margin).max(lo);

    (0..=SAMPLES)
        .map(|i| {
            let t = i as f32 / SAMPLES as f32;
            let y = base_y
                + a1 * (TAU * f1 * t + p1).sin()
                + a2 * (TAU * f2 * t + p2).sin()
                + jitter(s + 10.0 + i as f64 * 0.37, POINT_JITTER);
            [corr.x + t * corr.w, y.clamp(lo, hi)]
        })
        .collect()
}

pub fn braided_channel(region: Rect, params: &Params, seed: Seed) -> Vec<Primitive> {
    let corr = corridor(region, params.qs());
    let mut out = vec![
        floodplain(region),
        Primitive::new(
            PrimitiveId::new(Feature::Corridor, 0),
            Shape::Path { points: rect_points(corr), closed: true },
            Style::filled(CORRIDOR, 1.0),
        ),
    ];

    let grain = 0.6 + 0.8 * (params.d50() / 100.0) as f32;
    for k in 0..patch_count(params.d50()) {
        let s = seed.at(OFF_PATCH + PATCH_STRIDE * k as f64);
        let r = range(s + 0.2, 3.0, 9.0) * grain;
        out.push(Primitive::new(
            PrimitiveId::new(Feature::Texture, k),
            Shape::Ellipse {
                cx: range(s, corr.x + r, corr.right() - r),
                cy: range(s + 0.1, corr.y + r, corr.bottom() - r),
                rx: r,
                ry: r * range(s + 0.3, 0.5, 0.9),
                rotation: jitter(s + 0.4, std::f32::consts::PI),
            },
            Style::filled(GRAVEL[k % GRAVEL.len()], 0.7),
        ));
    }

    let n = thread_count(params.qw());
    let base_width = lerp_param(params.qw(), 2.0, 7.0);
    let speed = flow_speed(params);
    let mut lines = Vec::with_capacity(n);
    for j in 0..n {
        let s = seed.at(OFF_THREAD + THREAD_STRIDE * j as f64);
        let width = base_width * range(s + 0.7, 0.7, 1.3);
        let base_y = corr.y + corr.h * (j + 1) as f32 / (n + 1) as f32;
        let line = thread(corr, base_y, width * 0.5 + 2.0, s);
        out.push(
            Primitive::new(
                PrimitiveId::new(Feature::Thread, j),
                Shape::Path { points: line.clone(), closed: false },
                Style::stroked(CHANNEL, width, 0.95),
            )
            .with_flow(speed * range(s + 0.8, 0.7, 1.3)),
        );
        lines.push(line);
    }

    // Anastomosis links between neighbouring threads.
    for k in 0..connector_count(n, params.qs()) {
        let s = seed.at(OFF_LINK + LINK_STRIDE * k as f64);
        let a = k % (n - 1);
        let i = 2 + (pseudo_random(s) * (SAMPLES - 6) as f64) as usize;
        let points = vec![lines[a][i], lines[a + 1][i + 3]];
        out.push(Primitive::new(
            PrimitiveId::new(Feature::Connector, k),
            Shape::Path { points, closed: false },
            Style::stroked(CHANNEL, base_width * 0.6, 0.8),
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
    fn counts_follow_linear_formulas() {
        assert_eq!(thread_count(1.0), 2);
        assert_eq!(thread_count(50.0), 4);
        assert_eq!(thread_count(100.0), 6);
        assert_eq!(patch_count(1.0), 12);
        assert_eq!(patch_count(100.0), 48);
        assert_eq!(connector_count(4, 50.0), 6);
        assert_eq!(connector_count(1, 50.0), 0);
    }

    #[test]
    fn threads_stay_in_corridor() {
        let params = Params::new(100.0, 100.0, 100.0, 100.0).unwrap();
        let corr = corridor(region(), params.qs());
        let prims = braided_channel(region(), &params, Seed::new(555.0).unwrap());
        let threads: Vec<_> = prims.iter().filter(|p| p.id.feature == Feature::Thread).collect();
        assert_eq!(threads.len(), 6);
        for t in threads {
            let Shape::Path { points, .. } = &t.shape else {
                panic!("thread should be a path");
            };
            assert_eq!(points.len(), SAMPLES + 1);
            assert!(points.iter().all(|p| p[1] >= corr.y && p[1] <= corr.bottom()));
            assert!(t.flow.is_some());
        }
    }

    #[test]
    fn connectors_join_adjacent_threads() {
        let params = Params::new(80.0, 60.0, 50.0, 50.0).unwrap();
        let prims = braided_channel(region(), &params, Seed::new(12.0).unwrap());
        let n = prims.iter().filter(|p| p.id.feature == Feature::Connector).count();
        assert_eq!(n, connector_count(thread_count(50.0), 80.0));
    }

    #[test]
    fn thread_draws_independent_of_patch_count() {
        let seed = Seed::new(90.0).unwrap();
        let fine = braided_channel(region(), &Params::new(70.0, 10.0, 60.0, 50.0).unwrap(), seed);
        let coarse = braided_channel(region(), &Params::new(70.0, 90.0, 60.0, 50.0).unwrap(), seed);
        let threads = |v: &[Primitive]| -> Vec<Primitive> {
            v.iter().filter(|p| p.id.feature == Feature::Thread).cloned().collect()
        };
        assert_ne!(
            fine.iter().filter(|p| p.id.feature == Feature::Texture).count(),
            coarse.iter().filter(|p| p.id.feature == Feature::Texture).count()
        );
        assert_eq!(threads(&fine), threads(&coarse));
    }
}
