use crate::config::{Params, Rect};
use crate::mapping::lerp_param;
use crate::rng::{Seed, jitter, pseudo_random, range};

use super::{Feature, Primitive, PrimitiveId, SEDIMENT, Shape, Style};

const OFF_ROCK: f64 = 10.0;
const ROCK_STRIDE: f64 = 7.0;
const PER_LAYER: usize = 3;
/// Each layer is this much narrower than the one below.
const LAYER_NARROWING: f32 = 0.18;
const MIN_LAYER_SCALE: f32 = 0.4;

pub fn rock_count(qs: f64) -> usize {
    lerp_param(qs, 2.0, 12.0).round() as usize
}

pub fn base_radius(d50: f64) -> f32 {
    lerp_param(d50, 4.0, 16.0)
}

/// Rocks stacked in layers of three, returned back-to-front (lowest first)
/// so higher rocks occlude the ones beneath them.
pub fn sediment_pile(region: Rect, params: &Params, seed: Seed) -> Vec<Primitive> {
    let n = rock_count(params.qs());
    let r0 = base_radius(params.d50());
    let floor_y = region.bottom() - r0;
    let spacing = r0 * 2.1;

    let mut rocks = Vec::with_capacity(n);
    for i in 0..n {
        let layer = i / PER_LAYER;
        let slot = i % PER_LAYER;
        let in_layer = (n - layer * PER_LAYER).min(PER_LAYER);
        let scale = (1.0 - LAYER_NARROWING * layer as f32).max(MIN_LAYER_SCALE);
        let s = seed.at(OFF_ROCK + ROCK_STRIDE * i as f64);

        let offset = slot as f32 - (in_layer - 1) as f32 * 0.5;
        let cx = region.cx() + offset * spacing * scale + jitter(s, r0 * 0.25);
        let cy = floor_y - layer as f32 * r0 * 1.6 + jitter(s + 0.1, r0 * 0.15);
        let size = r0 * range(s + 0.2, 0.85, 1.15);
        let rotation = jitter(s + 0.3, 35f32.to_radians());
        let aspect = range(s + 0.4, 0.65, 1.0);
        let pick = (pseudo_random(s + 0.5) * SEDIMENT.len() as f64) as usize;
        let shade = SEDIMENT[pick % SEDIMENT.len()];

        rocks.push(Primitive::new(
            PrimitiveId::new(Feature::Rock, i),
            Shape::Ellipse { cx, cy, rx: size, ry: size * aspect, rotation },
            Style::filled(shade, 1.0),
        ));
    }

    rocks.sort_by(|a, b| {
        b.shape.center()[1]
            .total_cmp(&a.shape.center()[1])
            .then(a.id.index.cmp(&b.id.index))
    });
    rocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> Rect {
        Rect::new(0.0, 0.0, 240.0, 200.0)
    }

    #[test]
    fn count_and_size_scale_with_inputs() {
        assert_eq!(rock_count(1.0), 2);
        assert_eq!(rock_count(100.0), 12);
        assert!(rock_count(60.0) >= rock_count(40.0));
        assert_eq!(base_radius(1.0), 4.0);
        assert_eq!(base_radius(100.0), 16.0);
    }

    #[test]
    fn rocks_are_drawn_lowest_first() {
        let params = Params::new(100.0, 70.0, 50.0, 50.0).unwrap();
        let rocks = sediment_pile(region(), &params, Seed::new(99.0).unwrap());
        assert_eq!(rocks.len(), 12);
        for pair in rocks.windows(2) {
            assert!(pair[0].shape.center()[1] >= pair[1].shape.center()[1]);
        }
        // Bottom layer precedes the top layer.
        let pos = |idx: u32| rocks.iter().position(|r| r.id.index == idx).unwrap();
        assert!(pos(0) < pos(11));
    }

    #[test]
    fn rock_draws_do_not_depend_on_count() {
        let seed = Seed::new(1234.0).unwrap();
        let small = sediment_pile(region(), &Params::new(40.0, 50.0, 50.0, 50.0).unwrap(), seed);
        let large = sediment_pile(region(), &Params::new(90.0, 50.0, 50.0, 50.0).unwrap(), seed);
        assert!(large.len() > small.len());
        for idx in 0..3 {
            let id = PrimitiveId::new(Feature::Rock, idx);
            let a = small.iter().find(|r| r.id == id).unwrap();
            let b = large.iter().find(|r| r.id == id).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn rocks_stay_inside_region_horizontally() {
        let params = Params::new(100.0, 100.0, 50.0, 50.0).unwrap();
        for r in sediment_pile(region(), &params, Seed::new(7.0).unwrap()) {
            let [cx, _] = r.shape.center();
            assert!(cx > 0.0 && cx < 240.0);
        }
    }
}
