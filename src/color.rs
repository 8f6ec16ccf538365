//! 8-bit RGBA color and CSS color-string parsing.
//!
//! [`Rgba8`] is the single color type used throughout the heatmap pipeline.
//! Colors held by the options (gradient stops, grayscale roles) are straight
//! (non-premultiplied); pixels stored in a
//! [`RenderingBuffer`](crate::rendering_buffer::RenderingBuffer) are
//! premultiplied. Conversions between the two go through
//! [`Rgba8::premultiplied`] and [`Rgba8::demultiplied`].
//!
//! Parsing accepts the CSS forms gradient stops are usually written in:
//! `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()` (comma or
//! space separated, numbers or percentages), a table of named colors and
//! `transparent`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Round a non-negative double to the nearest unsigned integer.
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

// ============================================================================
// Rgba8
// ============================================================================

/// RGBA color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new_opaque(0, 0, 0);
    pub const WHITE: Self = Self::new_opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn with_opacity(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Components in RGBA memory order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_slice(p: &[u8]) -> Self {
        Self::new(p[0], p[1], p[2], p[3])
    }

    pub fn to_double(v: u8) -> f64 {
        v as f64 / Self::BASE_MASK as f64
    }

    /// Convert a `[0, 1]` double to a component, saturating out-of-range input.
    pub fn from_double(v: f64) -> u8 {
        if v.is_nan() {
            return 0;
        }
        uround(v.clamp(0.0, 1.0) * Self::BASE_MASK as f64) as u8
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == Self::BASE_MASK as u8
    }

    /// Fixed-point multiply, exact over u8.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    /// Straight to premultiplied.
    pub fn premultiplied(self) -> Self {
        match self.a {
            0 => Self::TRANSPARENT,
            255 => self,
            a => Self::new(
                Self::multiply(self.r, a),
                Self::multiply(self.g, a),
                Self::multiply(self.b, a),
                a,
            ),
        }
    }

    /// Premultiplied to straight, rounding to nearest.
    pub fn demultiplied(self) -> Self {
        match self.a {
            0 => Self::TRANSPARENT,
            255 => self,
            a => {
                let a32 = a as u32;
                let demul = |c: u8| ((c as u32 * Self::BASE_MASK + a32 / 2) / a32).min(255) as u8;
                Self::new(demul(self.r), demul(self.g), demul(self.b), a)
            }
        }
    }

    /// Interpolate between `self` and `c` by `k` in `[0, 1]`, componentwise
    /// on straight values.
    pub fn gradient(&self, c: &Rgba8, k: f64) -> Rgba8 {
        let k = k.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| uround(a as f64 + (b as f64 - a as f64) * k) as u8;
        Rgba8::new(
            mix(self.r, c.r),
            mix(self.g, c.g),
            mix(self.b, c.b),
            mix(self.a, c.a),
        )
    }

    /// Parse a CSS color string.
    pub fn parse(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let invalid = || Error::InvalidColor(s.to_string());

        if let Some(hex) = lower.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(invalid);
        }
        if let Some(body) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
        {
            let body = body.strip_suffix(')').ok_or_else(invalid)?;
            return parse_rgb_function(body).ok_or_else(invalid);
        }
        named_color(&lower).ok_or_else(invalid)
    }

    /// Parse a CSS color string, falling back to transparent black.
    pub fn parse_lossy(s: &str) -> Self {
        match Self::parse(s) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("{e}; using transparent");
                Self::TRANSPARENT
            }
        }
    }

    /// CSS serialization: `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(&self) -> String {
        if self.is_opaque() {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                Self::to_double(self.a)
            )
        }
    }
}

impl FromStr for Rgba8 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl Serialize for Rgba8 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CssColorVisitor;

        impl Visitor<'_> for CssColorVisitor {
            type Value = Rgba8;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a CSS color string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Rgba8, E> {
                Ok(Rgba8::parse_lossy(v))
            }
        }

        deserializer.deserialize_str(CssColorVisitor)
    }
}

// ============================================================================
// CSS parsing helpers
// ============================================================================

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Rgba8::new_opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Rgba8::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Rgba8::new_opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba8::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Body of `rgb(...)` / `rgba(...)` without the parentheses. Both the legacy
/// comma syntax and the space syntax with an optional `/ alpha` are accepted.
fn parse_rgb_function(body: &str) -> Option<Rgba8> {
    let (channels, slash_alpha) = match body.split_once('/') {
        Some((c, a)) => (c, Some(a.trim())),
        None => (body, None),
    };
    let parts: Vec<&str> = if channels.contains(',') {
        channels.split(',').map(str::trim).collect()
    } else {
        channels.split_whitespace().collect()
    };
    let alpha = match (parts.len(), slash_alpha) {
        (3, a) => a,
        (4, None) => Some(parts[3]),
        _ => return None,
    };
    let a = match alpha {
        Some(a) => parse_alpha(a)?,
        None => 255,
    };
    Some(Rgba8::new(
        parse_channel(parts[0])?,
        parse_channel(parts[1])?,
        parse_channel(parts[2])?,
        a,
    ))
}

fn parse_channel(s: &str) -> Option<u8> {
    if let Some(pct) = s.strip_suffix('%') {
        let v: f64 = pct.trim().parse().ok()?;
        return Some(Rgba8::from_double(v / 100.0));
    }
    let v: f64 = s.parse().ok()?;
    if v.is_nan() {
        return None;
    }
    Some(v.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(s: &str) -> Option<u8> {
    let v = match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0,
        None => s.parse::<f64>().ok()?,
    };
    if v.is_nan() {
        return None;
    }
    Some(Rgba8::from_double(v))
}

fn named_color(name: &str) -> Option<Rgba8> {
    let c = match name {
        "transparent" => Rgba8::TRANSPARENT,
        "black" => Rgba8::new_opaque(0, 0, 0),
        "silver" => Rgba8::new_opaque(192, 192, 192),
        "gray" | "grey" => Rgba8::new_opaque(128, 128, 128),
        "white" => Rgba8::new_opaque(255, 255, 255),
        "maroon" => Rgba8::new_opaque(128, 0, 0),
        "red" => Rgba8::new_opaque(255, 0, 0),
        "purple" => Rgba8::new_opaque(128, 0, 128),
        "fuchsia" | "magenta" => Rgba8::new_opaque(255, 0, 255),
        "green" => Rgba8::new_opaque(0, 128, 0),
        "lime" => Rgba8::new_opaque(0, 255, 0),
        "olive" => Rgba8::new_opaque(128, 128, 0),
        "yellow" => Rgba8::new_opaque(255, 255, 0),
        "navy" => Rgba8::new_opaque(0, 0, 128),
        "blue" => Rgba8::new_opaque(0, 0, 255),
        "teal" => Rgba8::new_opaque(0, 128, 128),
        "aqua" | "cyan" => Rgba8::new_opaque(0, 255, 255),
        "orange" => Rgba8::new_opaque(255, 165, 0),
        "darkgray" | "darkgrey" => Rgba8::new_opaque(169, 169, 169),
        "lightgray" | "lightgrey" => Rgba8::new_opaque(211, 211, 211),
        "dimgray" | "dimgrey" => Rgba8::new_opaque(105, 105, 105),
        _ => return None,
    };
    Some(c)
}

// ============================================================================
// Tests
// ============================================================================
