//! Canvas compositing operations.
//!
//! [`CompOp`] covers the `globalCompositeOperation` modes of a 2D canvas:
//! the Porter–Duff operators plus the separable blend modes from the W3C
//! Compositing and Blending Level 1 module. All math runs on premultiplied `[0, 1]`
//! doubles; the separable modes evaluate their blend function `B(Cb, Cs)` on
//! un-premultiplied colors and combine with source-over:
//!
//! ```text
//! co = cs·(1 − αb) + cb·(1 − αs) + αs·αb·B(Cb, Cs)
//! αo = αs + αb − αs·αb
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgba8;
use crate::error::Error;
use crate::rendering_buffer::{RenderingBuffer, BPP};

// ============================================================================
// CompOp enum
// ============================================================================

/// Compositing operation, named after the canvas `globalCompositeOperation`
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompOp {
    #[default]
    SourceOver,
    SourceIn,
    SourceOut,
    SourceAtop,
    DestinationOver,
    DestinationIn,
    DestinationOut,
    DestinationAtop,
    Lighter,
    Copy,
    Xor,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl CompOp {
    pub const ALL: [CompOp; 22] = [
        CompOp::SourceOver,
        CompOp::SourceIn,
        CompOp::SourceOut,
        CompOp::SourceAtop,
        CompOp::DestinationOver,
        CompOp::DestinationIn,
        CompOp::DestinationOut,
        CompOp::DestinationAtop,
        CompOp::Lighter,
        CompOp::Copy,
        CompOp::Xor,
        CompOp::Multiply,
        CompOp::Screen,
        CompOp::Overlay,
        CompOp::Darken,
        CompOp::Lighten,
        CompOp::ColorDodge,
        CompOp::ColorBurn,
        CompOp::HardLight,
        CompOp::SoftLight,
        CompOp::Difference,
        CompOp::Exclusion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompOp::SourceOver => "source-over",
            CompOp::SourceIn => "source-in",
            CompOp::SourceOut => "source-out",
            CompOp::SourceAtop => "source-atop",
            CompOp::DestinationOver => "destination-over",
            CompOp::DestinationIn => "destination-in",
            CompOp::DestinationOut => "destination-out",
            CompOp::DestinationAtop => "destination-atop",
            CompOp::Lighter => "lighter",
            CompOp::Copy => "copy",
            CompOp::Xor => "xor",
            CompOp::Multiply => "multiply",
            CompOp::Screen => "screen",
            CompOp::Overlay => "overlay",
            CompOp::Darken => "darken",
            CompOp::Lighten => "lighten",
            CompOp::ColorDodge => "color-dodge",
            CompOp::ColorBurn => "color-burn",
            CompOp::HardLight => "hard-light",
            CompOp::SoftLight => "soft-light",
            CompOp::Difference => "difference",
            CompOp::Exclusion => "exclusion",
        }
    }

    /// True when a fully transparent source leaves the destination as is,
    /// so blank source pixels can be skipped.
    pub fn preserves_dst_under_clear_src(&self) -> bool {
        !matches!(
            self,
            CompOp::SourceIn
                | CompOp::SourceOut
                | CompOp::DestinationIn
                | CompOp::DestinationAtop
                | CompOp::Copy
        )
    }
}

impl FromStr for CompOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let name = s.trim();
        CompOp::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownCompOp(s.to_string()))
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Premultiplied f64 RGBA working space
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct PremulRgba {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl PremulRgba {
    #[inline]
    fn from_pix(p: &[u8]) -> Self {
        Self {
            r: Rgba8::to_double(p[0]),
            g: Rgba8::to_double(p[1]),
            b: Rgba8::to_double(p[2]),
            a: Rgba8::to_double(p[3]),
        }
    }

    #[inline]
    fn scaled(self, k: f64) -> Self {
        Self {
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
            a: self.a * k,
        }
    }

    #[inline]
    fn plus(self, o: Self) -> Self {
        Self {
            r: self.r + o.r,
            g: self.g + o.g,
            b: self.b + o.b,
            a: self.a + o.a,
        }
    }

    /// Clamp to `[0, 1]` keeping color ≤ alpha, and write back.
    #[inline]
    fn store(self, p: &mut [u8]) {
        let a = self.a.clamp(0.0, 1.0);
        p[0] = Rgba8::from_double(self.r.clamp(0.0, a));
        p[1] = Rgba8::from_double(self.g.clamp(0.0, a));
        p[2] = Rgba8::from_double(self.b.clamp(0.0, a));
        p[3] = Rgba8::from_double(a);
    }
}

// ============================================================================
// Separable blend functions, B(Cb, Cs) on straight colors
// ============================================================================

#[inline]
fn multiply(cb: f64, cs: f64) -> f64 {
    cb * cs
}

#[inline]
fn screen(cb: f64, cs: f64) -> f64 {
    cb + cs - cb * cs
}

#[inline]
fn hard_light(cb: f64, cs: f64) -> f64 {
    if cs <= 0.5 {
        multiply(cb, 2.0 * cs)
    } else {
        screen(cb, 2.0 * cs - 1.0)
    }
}

#[inline]
fn soft_light(cb: f64, cs: f64) -> f64 {
    if cs <= 0.5 {
        cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
    } else {
        let d = if cb <= 0.25 {
            ((16.0 * cb - 12.0) * cb + 4.0) * cb
        } else {
            cb.sqrt()
        };
        cb + (2.0 * cs - 1.0) * (d - cb)
    }
}

#[inline]
fn color_dodge(cb: f64, cs: f64) -> f64 {
    if cb <= 0.0 {
        0.0
    } else if cs >= 1.0 {
        1.0
    } else {
        (cb / (1.0 - cs)).min(1.0)
    }
}

#[inline]
fn color_burn(cb: f64, cs: f64) -> f64 {
    if cb >= 1.0 {
        1.0
    } else if cs <= 0.0 {
        0.0
    } else {
        1.0 - ((1.0 - cb) / cs).min(1.0)
    }
}

fn separable_fn(op: CompOp) -> Option<fn(f64, f64) -> f64> {
    let f: fn(f64, f64) -> f64 = match op {
        CompOp::Multiply => multiply,
        CompOp::Screen => screen,
        CompOp::Overlay => |cb, cs| hard_light(cs, cb),
        CompOp::Darken => f64::min,
        CompOp::Lighten => f64::max,
        CompOp::ColorDodge => color_dodge,
        CompOp::ColorBurn => color_burn,
        CompOp::HardLight => hard_light,
        CompOp::SoftLight => soft_light,
        CompOp::Difference => |cb, cs| (cb - cs).abs(),
        CompOp::Exclusion => |cb, cs| cb + cs - 2.0 * cb * cs,
        _ => return None,
    };
    Some(f)
}

#[inline]
fn blend_separable(blend: fn(f64, f64) -> f64, s: PremulRgba, d: PremulRgba) -> PremulRgba {
    let sada = s.a * d.a;
    let s1a = 1.0 - s.a;
    let d1a = 1.0 - d.a;
    let channel = |sc: f64, dc: f64| {
        let mut co = sc * d1a + dc * s1a;
        if sada > 0.0 {
            co += sada * blend(dc / d.a, sc / s.a);
        }
        co
    };
    PremulRgba {
        r: channel(s.r, d.r),
        g: channel(s.g, d.g),
        b: channel(s.b, d.b),
        a: s.a + d.a - sada,
    }
}

// ============================================================================
// Per-pixel and per-image compositing
// ============================================================================

/// Composite one premultiplied source pixel onto `dst` (4 bytes) with `op`,
/// after scaling the source by `alpha` (`[0, 1]`).
#[inline]
pub fn blend_pixel(op: CompOp, dst: &mut [u8], src: &[u8], alpha: f64) {
    let s = PremulRgba::from_pix(src).scaled(alpha);
    let d = PremulRgba::from_pix(dst);

    let out = match op {
        CompOp::SourceOver => s.plus(d.scaled(1.0 - s.a)),
        CompOp::SourceIn => s.scaled(d.a),
        CompOp::SourceOut => s.scaled(1.0 - d.a),
        CompOp::SourceAtop => {
            let mut o = s.scaled(d.a).plus(d.scaled(1.0 - s.a));
            o.a = d.a;
            o
        }
        CompOp::DestinationOver => d.plus(s.scaled(1.0 - d.a)),
        CompOp::DestinationIn => d.scaled(s.a),
        CompOp::DestinationOut => d.scaled(1.0 - s.a),
        CompOp::DestinationAtop => {
            let mut o = d.scaled(s.a).plus(s.scaled(1.0 - d.a));
            o.a = s.a;
            o
        }
        CompOp::Lighter => s.plus(d),
        CompOp::Copy => s,
        CompOp::Xor => s.scaled(1.0 - d.a).plus(d.scaled(1.0 - s.a)),
        other => match separable_fn(other) {
            Some(f) => blend_separable(f, s, d),
            None => s.plus(d.scaled(1.0 - s.a)),
        },
    };
    out.store(dst);
}

/// Composite `src` onto `dst` with its top-left corner at `(dx, dy)`.
///
/// Only the intersection of the source rectangle with the destination is
/// touched. `alpha` is the global opacity and saturates to `[0, 1]`.
pub fn composite(
    dst: &mut RenderingBuffer,
    src: &RenderingBuffer,
    dx: i32,
    dy: i32,
    op: CompOp,
    alpha: f64,
) {
    let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    let skip_clear = op.preserves_dst_under_clear_src();
    if skip_clear && alpha <= 0.0 {
        return;
    }

    let x0 = dx.max(0);
    let y0 = dy.max(0);
    let x1 = (dx as i64 + src.width() as i64).min(dst.width() as i64) as i32;
    let y1 = (dy as i64 + src.height() as i64).min(dst.height() as i64) as i32;
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for y in y0..y1 {
        let src_row = src.row_slice((y - dy) as u32);
        let dst_row = dst.row_slice_mut(y as u32);
        for x in x0..x1 {
            let so = (x - dx) as usize * BPP;
            let s = &src_row[so..so + BPP];
            if skip_clear && s[3] == 0 {
                continue;
            }
            let doff = x as usize * BPP;
            blend_pixel(op, &mut dst_row[doff..doff + BPP], s, alpha);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
