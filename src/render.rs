use rayon::prelude::*;

use crate::balance::BalanceResult;
use crate::config::Layout;
use crate::geometry::{Feature, GeometryFrame, Primitive, PrimitiveId, Shape, Style, bounds};

const BACKGROUND: [u8; 4] = [236, 240, 232, 255];
const BEAM: [u8; 3] = [60, 60, 66];
const PIVOT: [u8; 3] = [96, 96, 104];

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 3], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

/// Balance beam and pivot, rotated by the tilt angle (positive = clockwise
/// on screen, so a supply-heavy negative tilt drops the pile side).
pub fn beam(layout: &Layout, balance: &BalanceResult) -> ([f32; 2], [f32; 2]) {
    let cx = (layout.pile.cx() + layout.water.cx()) * 0.5;
    let cy = layout.pile.bottom().max(layout.water.bottom()) + 16.0;
    let half = (layout.water.cx() - layout.pile.cx()) * 0.5;
    let theta = (balance.tilt_angle_deg as f32).to_radians();
    let (s, c) = theta.sin_cos();
    ([cx - half * c, cy - half * s], [cx + half * c, cy + half * s])
}

/// Per-primitive data precomputed once per frame.
struct Prepared<'a> {
    prim: &'a Primitive,
    y0: f32,
    y1: f32,
}

fn prepare(prim: &Primitive) -> Prepared<'_> {
    let pad = prim.style.stroke_width * 0.5 + 1.0;
    let (y0, y1) = match &prim.shape {
        Shape::Ellipse { cy, rx, ry, .. } => {
            let r = rx.max(*ry);
            (cy - r, cy + r)
        }
        Shape::Circle { cy, r, .. } => (cy - r, cy + r),
        Shape::Path { points, .. } => {
            let b = bounds(points);
            (b.y, b.bottom())
        }
    };
    Prepared { prim, y0: y0 - pad, y1: y1 + pad }
}

#[inline]
fn blend(px: &mut [u8], color: [u8; 3], alpha: f32) {
    let cur = [px[0], px[1], px[2], px[3]];
    px.copy_from_slice(&lerp_color(cur, color, alpha));
}

#[inline]
fn seg_dist2(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let (abx, aby) = (b[0] - a[0], b[1] - a[1]);
    let len2 = abx * abx + aby * aby;
    let t = if len2 > 0.0 {
        (((p[0] - a[0]) * abx + (p[1] - a[1]) * aby) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let dx = a[0] + abx * t - p[0];
    let dy = a[1] + aby * t - p[1];
    dx * dx + dy * dy
}

fn fill_polygon_row(
    row: &mut [u8],
    w: usize,
    py: f32,
    points: &[[f32; 2]],
    color: [u8; 3],
    alpha: f32,
) {
    let mut xs: Vec<f32> = Vec::new();
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        if (a[1] <= py) != (b[1] <= py) {
            xs.push(a[0] + (py - a[1]) / (b[1] - a[1]) * (b[0] - a[0]));
        }
    }
    xs.sort_by(f32::total_cmp);
    for span in xs.chunks_exact(2) {
        let x0 = (span[0] - 0.5).ceil().max(0.0) as usize;
        let x1 = (span[1] - 0.5).floor();
        if x1 < 0.0 {
            continue;
        }
        let x1 = (x1 as usize).min(w - 1);
        for x in x0..=x1 {
            blend(&mut row[x * 4..x * 4 + 4], color, alpha);
        }
    }
}

fn stroke_row(
    row: &mut [u8],
    w: usize,
    py: f32,
    points: &[[f32; 2]],
    closed: bool,
    style: &Style,
    color: [u8; 3],
) {
    let hw = (style.stroke_width * 0.5).max(0.5);
    let n = points.len();
    let segs = if closed { n } else { n.saturating_sub(1) };
    let mut hit = vec![false; w];
    for i in 0..segs {
        let a = points[i];
        let b = points[(i + 1) % n];
        if py < a[1].min(b[1]) - hw || py > a[1].max(b[1]) + hw {
            continue;
        }
        let x0 = (a[0].min(b[0]) - hw).floor().max(0.0) as usize;
        let x1 = ((a[0].max(b[0]) + hw).ceil() as usize).min(w.saturating_sub(1));
        for x in x0..=x1 {
            if !hit[x] && seg_dist2([x as f32 + 0.5, py], a, b) <= hw * hw {
                hit[x] = true;
            }
        }
    }
    for (x, _) in hit.iter().enumerate().filter(|(_, h)| **h) {
        blend(&mut row[x * 4..x * 4 + 4], color, style.opacity);
    }
}

fn ellipse_row(row: &mut [u8], w: usize, py: f32, shape: [f32; 5], color: [u8; 3], alpha: f32) {
    let [cx, cy, rx, ry, rot] = shape;
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let (s, c) = rot.sin_cos();
    let r = rx.max(ry);
    let x0 = (cx - r).floor().max(0.0) as usize;
    let x1 = ((cx + r).ceil().max(0.0) as usize).min(w.saturating_sub(1));
    for x in x0..=x1 {
        let dx = x as f32 + 0.5 - cx;
        let dy = py - cy;
        // Rotate into the ellipse frame.
        let u = dx * c + dy * s;
        let v = -dx * s + dy * c;
        if (u / rx).powi(2) + (v / ry).powi(2) <= 1.0 {
            blend(&mut row[x * 4..x * 4 + 4], color, alpha);
        }
    }
}

fn paint_row(row: &mut [u8], w: usize, y: usize, p: &Prepared<'_>) {
    let py = y as f32 + 0.5;
    if py < p.y0 || py > p.y1 {
        return;
    }
    let style = &p.prim.style;
    match &p.prim.shape {
        Shape::Ellipse { cx, cy, rx, ry, rotation } => {
            if let Some(fill) = style.fill {
                ellipse_row(row, w, py, [*cx, *cy, *rx, *ry, *rotation], fill, style.opacity);
            }
        }
        Shape::Circle { cx, cy, r } => {
            if let Some(fill) = style.fill {
                ellipse_row(row, w, py, [*cx, *cy, *r, *r, 0.0], fill, style.opacity);
            }
        }
        Shape::Path { points, closed } => {
            if let (Some(fill), true) = (style.fill, *closed) {
                fill_polygon_row(row, w, py, points, fill, style.opacity);
            }
            if let Some(stroke) = style.stroke {
                stroke_row(row, w, py, points, *closed, style, stroke);
            }
        }
    }
}

/// Rasterize a frame plus the balance beam into RGBA, in frame order.
pub fn render_frame(frame: &GeometryFrame, balance: &BalanceResult, layout: &Layout) -> Vec<u8> {
    let w = layout.width;
    let h = layout.height;

    let (a, b) = beam(layout, balance);
    let pivot_top = [(a[0] + b[0]) * 0.5, (a[1] + b[1]) * 0.5];
    let extras = [
        Primitive::new(
            PrimitiveId::new(Feature::Container, 1),
            Shape::Path {
                points: vec![
                    pivot_top,
                    [pivot_top[0] + 14.0, pivot_top[1] + 24.0],
                    [pivot_top[0] - 14.0, pivot_top[1] + 24.0],
                ],
                closed: true,
            },
            Style::filled(PIVOT, 1.0),
        ),
        Primitive::new(
            PrimitiveId::new(Feature::Container, 2),
            Shape::Path { points: vec![a, b], closed: false },
            Style::stroked(BEAM, 5.0, 1.0),
        ),
    ];

    let prepared: Vec<Prepared<'_>> =
        frame.primitives.iter().chain(extras.iter()).map(prepare).collect();

    let mut rgba = vec![0u8; w * h * 4];
    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(y, row)| {
        for px in row.chunks_exact_mut(4) {
            px.copy_from_slice(&BACKGROUND);
        }
        for p in &prepared {
            paint_row(row, w, y, p);
        }
    });

    rgba
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Calibration, Params};
    use crate::geometry::generate;
    use crate::pattern::Pattern;
    use crate::rng::Seed;

    fn pixel(rgba: &[u8], w: usize, x: usize, y: usize) -> [u8; 4] {
        let i = (y * w + x) * 4;
        [rgba[i], rgba[i + 1], rgba[i + 2], rgba[i + 3]]
    }

    #[test]
    fn renders_full_canvas() {
        let layout = Layout::default();
        let params = Params::default();
        let balance = crate::balance::evaluate(&params, &Calibration::default());
        let frame = generate(&layout, Pattern::Meandering, &params, Seed::new(1.0).unwrap());
        let rgba = render_frame(&frame, &balance, &layout);
        assert_eq!(rgba.len(), layout.width * layout.height * 4);
        // Top-left corner is outside every region.
        assert_eq!(pixel(&rgba, layout.width, 2, 2), BACKGROUND);
        // Floodplain covers the channel region.
        let inside = pixel(&rgba, layout.width, 25, (layout.channel.y + 2.0) as usize);
        assert_ne!(inside, BACKGROUND);
    }

    #[test]
    fn rendering_is_deterministic() {
        let layout = Layout::default();
        let params = Params::new(90.0, 90.0, 60.0, 40.0).unwrap();
        let balance = crate::balance::evaluate(&params, &Calibration::default());
        let frame = generate(&layout, Pattern::Braided, &params, Seed::new(2.0).unwrap());
        let first = render_frame(&frame, &balance, &layout);
        assert_eq!(first, render_frame(&frame, &balance, &layout));
    }

    #[test]
    fn beam_drops_supply_side_when_supply_heavy() {
        let layout = Layout::default();
        let params = Params::new(100.0, 100.0, 10.0, 10.0).unwrap();
        let balance = crate::balance::evaluate(&params, &Calibration::default());
        assert!(balance.tilt_angle_deg < 0.0);
        let (left, right) = beam(&layout, &balance);
        assert!(left[1] > right[1], "pile end should sit lower");
    }
}
