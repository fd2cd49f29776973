//! Seeded procedural geometry. Every generator is a pure function of
//! (region, params, seed); frames are rebuilt from scratch on each change.

pub mod braided;
pub mod meander;
pub mod pile;
pub mod straight;
pub mod water;

use std::fmt;

use serde::Serialize;

use crate::balance::calculate_stream_power;
use crate::config::{Layout, Params, Rect};
use crate::pattern::Pattern;
use crate::rng::Seed;

// Palette
pub const SEDIMENT: [[u8; 3]; 4] = [
    [139, 115, 85],
    [160, 130, 98],
    [120, 100, 76],
    [176, 150, 112],
];
pub const GRAVEL: [[u8; 3]; 3] = [[168, 152, 128], [150, 136, 116], [186, 172, 146]];
pub const WATER: [u8; 3] = [52, 120, 190];
pub const CHANNEL: [u8; 3] = [64, 140, 205];
pub const CONTAINER: [u8; 3] = [70, 70, 80];
pub const FLOODPLAIN: [u8; 3] = [120, 160, 96];
pub const CORRIDOR: [u8; 3] = [196, 182, 150];
pub const BAR_SAND: [u8; 3] = [222, 204, 160];

/// Which feature a primitive belongs to. Together with an index this forms a
/// stable identity that consumers can diff across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Rock,
    Container,
    WaterFill,
    Floodplain,
    Channel,
    PointBar,
    MidBar,
    Corridor,
    Texture,
    Thread,
    Connector,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::Rock => "rock",
            Feature::Container => "container",
            Feature::WaterFill => "water_fill",
            Feature::Floodplain => "floodplain",
            Feature::Channel => "channel",
            Feature::PointBar => "point_bar",
            Feature::MidBar => "mid_bar",
            Feature::Corridor => "corridor",
            Feature::Texture => "texture",
            Feature::Thread => "thread",
            Feature::Connector => "connector",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PrimitiveId {
    pub feature: Feature,
    pub index: u32,
}

impl PrimitiveId {
    pub fn new(feature: Feature, index: usize) -> Self {
        Self { feature, index: index as u32 }
    }
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.feature.name(), self.index)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// `rotation` in radians.
    Ellipse { cx: f32, cy: f32, rx: f32, ry: f32, rotation: f32 },
    Circle { cx: f32, cy: f32, r: f32 },
    Path { points: Vec<[f32; 2]>, closed: bool },
}

impl Shape {
    /// Centre for round shapes, bounding-box centre for paths.
    pub fn center(&self) -> [f32; 2] {
        match self {
            Shape::Ellipse { cx, cy, .. } | Shape::Circle { cx, cy, .. } => [*cx, *cy],
            Shape::Path { points, .. } => {
                let b = bounds(points);
                [b.cx(), b.cy()]
            }
        }
    }

    /// Width and height of the unrotated extent.
    pub fn size(&self) -> [f32; 2] {
        match self {
            Shape::Ellipse { rx, ry, .. } => [rx * 2.0, ry * 2.0],
            Shape::Circle { r, .. } => [r * 2.0, r * 2.0],
            Shape::Path { points, .. } => {
                let b = bounds(points);
                [b.w, b.h]
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Style {
    pub fill: Option<[u8; 3]>,
    pub stroke: Option<[u8; 3]>,
    pub stroke_width: f32,
    pub opacity: f32,
}

impl Style {
    pub fn filled(color: [u8; 3], opacity: f32) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
            stroke_width: 0.0,
            opacity,
        }
    }

    pub fn stroked(color: [u8; 3], width: f32, opacity: f32) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            stroke_width: width,
            opacity,
        }
    }
}

/// Path metadata for the consumer-owned flow animation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FlowMeta {
    pub length: f32,
    /// Pixels per animation tick.
    pub speed: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Primitive {
    pub id: PrimitiveId,
    pub shape: Shape,
    pub style: Style,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<FlowMeta>,
}

impl Primitive {
    pub fn new(id: PrimitiveId, shape: Shape, style: Style) -> Self {
        Self { id, shape, style, flow: None }
    }

    pub fn with_flow(mut self, speed: f32) -> Self {
        if let Shape::Path { points, .. } = &self.shape {
            self.flow = Some(FlowMeta { length: path_length(points), speed });
        }
        self
    }
}

/// One complete, freshly generated set of primitives.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeometryFrame {
    pub pattern: Pattern,
    pub seed: Seed,
    pub primitives: Vec<Primitive>,
}

impl GeometryFrame {
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.id == id)
    }

    pub fn of(&self, feature: Feature) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().filter(move |p| p.id.feature == feature)
    }

    pub fn count(&self, feature: Feature) -> usize {
        self.of(feature).count()
    }

    /// Primitives that carry flow metadata, in frame order.
    pub fn flow_paths(&self) -> impl Iterator<Item = (&Primitive, FlowMeta)> {
        self.primitives.iter().filter_map(|p| p.flow.map(|f| (p, f)))
    }
}

pub fn path_length(points: &[[f32; 2]]) -> f32 {
    points
        .windows(2)
        .map(|w| {
            let dx = w[1][0] - w[0][0];
            let dy = w[1][1] - w[0][1];
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

pub fn bounds(points: &[[f32; 2]]) -> Rect {
    if points.is_empty() {
        return Rect::new(0.0, 0.0, 0.0, 0.0);
    }
    let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
    for p in points {
        x0 = x0.min(p[0]);
        y0 = y0.min(p[1]);
        x1 = x1.max(p[0]);
        y1 = y1.max(p[1]);
    }
    Rect::new(x0, y0, x1 - x0, y1 - y0)
}

/// Closed rectangle outline of a region.
pub fn rect_points(r: Rect) -> Vec<[f32; 2]> {
    vec![[r.x, r.y], [r.right(), r.y], [r.right(), r.bottom()], [r.x, r.bottom()]]
}

/// Shared background for every channel pattern.
pub fn floodplain(region: Rect) -> Primitive {
    Primitive::new(
        PrimitiveId::new(Feature::Floodplain, 0),
        Shape::Path { points: rect_points(region), closed: true },
        Style::filled(FLOODPLAIN, 1.0),
    )
}

/// Flow speed in pixels per tick, driven by stream power.
pub fn flow_speed(params: &Params) -> f32 {
    0.5 + 4.0 * calculate_stream_power(params.qw(), params.s()) as f32
}

/// Build a full frame: supply pan, transport pan, then the channel planform.
pub fn generate(layout: &Layout, pattern: Pattern, params: &Params, seed: Seed) -> GeometryFrame {
    let mut primitives = pile::sediment_pile(layout.pile, params, seed);
    primitives.extend(water::water_fill(layout.water, params, seed));
    let channel = match pattern {
        Pattern::Straight => straight::straight_channel(layout.channel, params, seed),
        Pattern::Meandering => meander::meandering_channel(layout.channel, params, seed),
        Pattern::Braided => braided::braided_channel(layout.channel, params, seed),
    };
    primitives.extend(channel);

    tracing::debug!(
        %pattern,
        seed = seed.value(),
        primitives = primitives.len(),
        "generated geometry frame"
    );

    GeometryFrame { pattern, seed, primitives }
}
