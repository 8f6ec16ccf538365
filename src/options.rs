//! Heatmap configuration.
//!
//! [`Options`] is the full configuration a heatmap renders with.
//! [`OptionsPatch`] is a partial update: every field is optional and
//! [`Options::merge`] replaces exactly the fields that are set (the gradient
//! and the grayscale roles are replaced as whole values, never merged
//! stop-by-stop).
//!
//! Both types (de)serialize with camelCase keys, so a JSON config such as
//!
//! ```json
//! { "blendMode": "overlay", "radius": 10, "gradient": { "0.0": "blue", "1.0": "red" } }
//! ```
//!
//! can be loaded straight into an `OptionsPatch`.

use serde::{Deserialize, Serialize};

use crate::color::Rgba8;
use crate::comp_op::CompOp;
use crate::gradient_lut::{stops_as_map, GradientStop};
use crate::points::SignClass;

/// Brush colors, one per sign class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grayscale {
    pub negative: Rgba8,
    pub neutral: Rgba8,
    pub positive: Rgba8,
}

impl Grayscale {
    pub fn color(&self, class: SignClass) -> Rgba8 {
        match class {
            SignClass::Negative => self.negative,
            SignClass::Neutral => self.neutral,
            SignClass::Positive => self.positive,
        }
    }
}

impl Default for Grayscale {
    fn default() -> Self {
        Self {
            negative: Rgba8::new_opaque(0x00, 0x00, 0x00),
            neutral: Rgba8::new_opaque(0x80, 0x80, 0x80),
            positive: Rgba8::new_opaque(0xFF, 0xFF, 0xFF),
        }
    }
}

/// The stock five-stop gradient.
pub fn default_gradient() -> Vec<GradientStop> {
    vec![
        GradientStop::new(0.0, Rgba8::new(204, 0, 0, 255)),
        GradientStop::new(0.25, Rgba8::new(255, 178, 0, 191)),
        GradientStop::new(0.5, Rgba8::new(0, 243, 255, 64)),
        GradientStop::new(0.75, Rgba8::new(180, 255, 0, 191)),
        GradientStop::new(1.0, Rgba8::new(0, 214, 96, 255)),
    ]
}

/// Full heatmap configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    /// Compositing mode used while stamping brushes.
    pub blend_mode: CompOp,
    /// Weight that maps to full stamp opacity.
    pub max: f64,
    /// Radius of the solid part of a brush, in pixels.
    pub radius: f64,
    /// Blur applied around the brush disc, in pixels.
    pub blur: f64,
    #[serde(with = "stops_as_map")]
    pub gradient: Vec<GradientStop>,
    /// Remap the grayscale buffer through the gradient after stamping.
    pub colorize: bool,
    pub grayscale: Grayscale,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            blend_mode: CompOp::Overlay,
            max: 1.0,
            radius: 25.0,
            blur: 15.0,
            gradient: default_gradient(),
            colorize: true,
            grayscale: Grayscale::default(),
        }
    }
}

impl Options {
    /// Shallow-merge a patch into these options.
    pub fn merge(&mut self, patch: OptionsPatch) {
        let OptionsPatch {
            blend_mode,
            max,
            radius,
            blur,
            gradient,
            colorize,
            grayscale,
        } = patch;
        if let Some(v) = blend_mode {
            self.blend_mode = v;
        }
        if let Some(v) = max {
            self.max = v;
        }
        if let Some(v) = radius {
            self.radius = v;
        }
        if let Some(v) = blur {
            self.blur = v;
        }
        if let Some(v) = gradient {
            self.gradient = v;
        }
        if let Some(v) = colorize {
            self.colorize = v;
        }
        if let Some(v) = grayscale {
            self.grayscale = v;
        }
    }

    /// Distance from a point's position to the brush edge:
    /// `radius + blur`.
    pub fn extent(&self) -> f64 {
        self.radius + self.blur
    }
}

/// Partial [`Options`] update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend_mode: Option<CompOp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(with = "stops_as_map::option", skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Vec<GradientStop>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<Grayscale>,
}

impl OptionsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blend_mode(mut self, v: CompOp) -> Self {
        self.blend_mode = Some(v);
        self
    }

    pub fn max(mut self, v: f64) -> Self {
        self.max = Some(v);
        self
    }

    pub fn radius(mut self, v: f64) -> Self {
        self.radius = Some(v);
        self
    }

    pub fn blur(mut self, v: f64) -> Self {
        self.blur = Some(v);
        self
    }

    pub fn gradient(mut self, v: Vec<GradientStop>) -> Self {
        self.gradient = Some(v);
        self
    }

    pub fn colorize(mut self, v: bool) -> Self {
        self.colorize = Some(v);
        self
    }

    pub fn grayscale(mut self, v: Grayscale) -> Self {
        self.grayscale = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<Options> for OptionsPatch {
    fn from(o: Options) -> Self {
        Self {
            blend_mode: Some(o.blend_mode),
            max: Some(o.max),
            radius: Some(o.radius),
            blur: Some(o.blur),
            gradient: Some(o.gradient),
            colorize: Some(o.colorize),
            grayscale: Some(o.grayscale),
        }
    }
}
