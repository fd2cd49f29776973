use serde::{Deserialize, Serialize};

use crate::error::{BalanceError, Result};

/// Lower bound of every input parameter.
pub const PARAM_MIN: f64 = 1.0;
/// Upper bound of every input parameter.
pub const PARAM_MAX: f64 = 100.0;

/// The four bounded inputs. Constructed only through [`Params::new`], so every
/// value that reaches the core is known to be inside [1, 100].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParams")]
pub struct Params {
    qs: f64,
    d50: f64,
    qw: f64,
    s: f64,
}

/// Unchecked wire form of [`Params`].
#[derive(Deserialize)]
struct RawParams {
    qs: f64,
    d50: f64,
    qw: f64,
    s: f64,
}

impl TryFrom<RawParams> for Params {
    type Error = BalanceError;

    fn try_from(raw: RawParams) -> Result<Self> {
        Params::new(raw.qs, raw.d50, raw.qw, raw.s)
    }
}

fn check(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && (PARAM_MIN..=PARAM_MAX).contains(&value) {
        Ok(value)
    } else {
        Err(BalanceError::DomainViolation { name, value })
    }
}

/// Value used for a parameter that was not given at all.
pub const PARAM_DEFAULT: f64 = 50.0;

/// Parse one optional command-line value. An absent value falls back to
/// [`PARAM_DEFAULT`]; a present but malformed one is an error.
pub fn parse_param(name: &'static str, raw: Option<&str>) -> Result<f64> {
    match raw {
        None => Ok(PARAM_DEFAULT),
        Some(text) => text.trim().parse().map_err(|_| BalanceError::InvalidArgument {
            name,
            raw: text.to_string(),
        }),
    }
}

impl Params {
    /// Build from positional arguments `Qs D50 Qw S`, as given on the command line.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let get = |i: usize| args.get(i).map(String::as_str);
        Self::new(
            parse_param("Qs", get(0))?,
            parse_param("D50", get(1))?,
            parse_param("Qw", get(2))?,
            parse_param("S", get(3))?,
        )
    }

    pub fn new(qs: f64, d50: f64, qw: f64, s: f64) -> Result<Self> {
        Ok(Self {
            qs: check("Qs", qs)?,
            d50: check("D50", d50)?,
            qw: check("Qw", qw)?,
            s: check("S", s)?,
        })
    }

    /// Sediment discharge.
    pub fn qs(&self) -> f64 {
        self.qs
    }

    /// Median grain size.
    pub fn d50(&self) -> f64 {
        self.d50
    }

    /// Water discharge.
    pub fn qw(&self) -> f64 {
        self.qw
    }

    /// Slope.
    pub fn s(&self) -> f64 {
        self.s
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            qs: PARAM_DEFAULT,
            d50: PARAM_DEFAULT,
            qw: PARAM_DEFAULT,
            s: PARAM_DEFAULT,
        }
    }
}

/// Constants for regime classification and the tilt metaphor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeTable {
    /// Half-width of the equilibrium band on the log10 imbalance index.
    pub dead_band: f64,
    /// Ratio clamp applied before log10.
    pub ratio_min: f64,
    pub ratio_max: f64,
    /// Ratio clamp applied before the tilt transform.
    pub tilt_ratio_min: f64,
    pub tilt_ratio_max: f64,
    pub max_tilt_deg: f64,
}

impl Default for RegimeTable {
    fn default() -> Self {
        Self {
            dead_band: 0.05,
            ratio_min: 0.01,
            ratio_max: 100.0,
            tilt_ratio_min: 0.1,
            tilt_ratio_max: 10.0,
            max_tilt_deg: 30.0,
        }
    }
}

/// Gates for the active-process list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessTable {
    pub bank_erosion_power: f64,
    pub knickpoint_power: f64,
    pub armoring_ratio: f64,
    pub widening_ratio: f64,
    pub avulsion_ratio: f64,
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self {
            bank_erosion_power: 0.3,
            knickpoint_power: 0.5,
            armoring_ratio: 0.5,
            widening_ratio: 1.5,
            avulsion_ratio: 2.0,
        }
    }
}

/// Weights and thresholds for pattern selection. Tuned independently of
/// [`RegimeTable`] even though both read the balance ratio.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTable {
    pub load_weight: f64,
    pub grain_weight: f64,
    pub aggradation_gain: f64,
    pub aggradation_cap: f64,
    pub braiding_threshold: f64,
    pub straight_discharge: f64,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self {
            load_weight: 0.35,
            grain_weight: 0.25,
            aggradation_gain: 0.3,
            aggradation_cap: 0.3,
            braiding_threshold: 0.5,
            straight_discharge: 0.15,
        }
    }
}

/// All tunable constants, loadable from a (possibly partial) JSON file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub regime: RegimeTable,
    pub processes: ProcessTable,
    pub pattern: PatternTable,
}

impl Calibration {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Axis-aligned drawing region in canvas pixels (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn cx(&self) -> f32 {
        self.x + self.w * 0.5
    }

    #[inline]
    pub fn cy(&self) -> f32 {
        self.y + self.h * 0.5
    }
}

/// Longest canvas side accepted by [`Layout::validate`].
pub const MAX_CANVAS_SIDE: usize = 8192;
/// Pixel budget of one canvas (64 MiB of RGBA).
pub const MAX_CANVAS_PIXELS: usize = 4096 * 4096;

/// Where each visual lives on the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub width: usize,
    pub height: usize,
    /// Supply-side pan.
    pub pile: Rect,
    /// Transport-side pan.
    pub water: Rect,
    pub channel: Rect,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 800,
            height: 520,
            pile: Rect::new(40.0, 40.0, 240.0, 200.0),
            water: Rect::new(520.0, 40.0, 240.0, 200.0),
            channel: Rect::new(20.0, 290.0, 760.0, 210.0),
        }
    }
}

impl Layout {
    /// Scale the default layout to a different canvas size.
    pub fn scaled(width: usize, height: usize) -> Result<Self> {
        let base = Self::default();
        let sx = width as f32 / base.width as f32;
        let sy = height as f32 / base.height as f32;
        let scale = |r: Rect| Rect::new(r.x * sx, r.y * sy, r.w * sx, r.h * sy);
        let layout = Self {
            width,
            height,
            pile: scale(base.pile),
            water: scale(base.water),
            channel: scale(base.channel),
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BalanceError::InvalidLayout(format!(
                "canvas {}x{} is empty",
                self.width, self.height
            )));
        }
        let pixels = self.width.checked_mul(self.height);
        if self.width > MAX_CANVAS_SIDE
            || self.height > MAX_CANVAS_SIDE
            || pixels.is_none_or(|n| n > MAX_CANVAS_PIXELS)
        {
            return Err(BalanceError::InvalidLayout(format!(
                "canvas {}x{} exceeds {MAX_CANVAS_SIDE} per side or {MAX_CANVAS_PIXELS} px",
                self.width, self.height
            )));
        }
        for (name, r) in [("pile", self.pile), ("water", self.water), ("channel", self.channel)] {
            let finite = r.x.is_finite() && r.y.is_finite() && r.w.is_finite() && r.h.is_finite();
            if !finite || r.w <= 0.0 || r.h <= 0.0 {
                return Err(BalanceError::InvalidLayout(format!(
                    "{name} region {r:?} must be finite with positive size"
                )));
            }
        }
        Ok(())
    }
}
