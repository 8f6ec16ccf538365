//! Brush cache: pre-rendered blurred circular stamps, one per sign class.
//!
//! A stamp is a square premultiplied raster of side `2 * (radius + blur)`
//! (truncated to whole pixels). It holds a disc of `radius` pixels in the
//! role color, centered on the square and blurred with a Gaussian of
//! standard deviation `blur / 2`, so alpha is opaque in the middle and fades
//! out towards `radius + blur`.
//!
//! The disc is blurred in a working buffer padded by `blur` on every side and
//! then cropped, so the filter sees transparent surroundings instead of the
//! raster edge. Working buffers wider than [`MAX_BRUSH_SIDE`] are not
//! allocated; the stamp is left empty and nothing is drawn for it.

use crate::blur::recursive_blur_rgba32;
use crate::color::Rgba8;
use crate::options::{Grayscale, Options};
use crate::points::SignClass;
use crate::rendering_buffer::RenderingBuffer;

/// Largest working raster side, margin included. Wider stamps come out
/// empty.
pub const MAX_BRUSH_SIDE: u32 = 4096;

/// Fill an anti-aliased disc centered at `(cx, cy)`.
///
/// Coverage is estimated from the distance between the pixel center and the
/// circle, which is exact to within a few percent along the edge.
fn render_disc(buf: &mut RenderingBuffer, cx: f64, cy: f64, radius: f64, color: Rgba8) {
    if !(radius > 0.0) || buf.is_empty() {
        return;
    }
    let y0 = (cy - radius - 1.0).floor().max(0.0) as u32;
    let y1 = ((cy + radius + 1.0).ceil().max(0.0) as u32).min(buf.height());
    let x0 = (cx - radius - 1.0).floor().max(0.0) as u32;
    let x1 = ((cx + radius + 1.0).ceil().max(0.0) as u32).min(buf.width());

    for y in y0..y1 {
        let dy = y as f64 + 0.5 - cy;
        for x in x0..x1 {
            let dx = x as f64 + 0.5 - cx;
            let cover = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
            if cover > 0.0 {
                let a = Rgba8::multiply(color.a, Rgba8::from_double(cover));
                buf.set_pixel(x, y, color.with_opacity(a).premultiplied());
            }
        }
    }
}

/// Render one stamp.
pub fn render_brush(radius: f64, blur: f64, color: Rgba8) -> RenderingBuffer {
    let radius = if radius.is_finite() { radius.max(0.0) } else { 0.0 };
    let blur = if blur.is_finite() { blur.max(0.0) } else { 0.0 };
    let extent = radius + blur;
    let side_f = (2.0 * extent).floor();
    let pad_f = blur.ceil();
    if !(side_f + 2.0 * pad_f <= MAX_BRUSH_SIDE as f64) {
        log::warn!(
            "brush radius={} blur={} exceeds {}px, stamp left empty",
            radius,
            blur,
            MAX_BRUSH_SIDE
        );
        return RenderingBuffer::default();
    }
    let side = side_f as u32;
    let pad = pad_f as u32;

    let mut work = RenderingBuffer::new(side + 2 * pad, side + 2 * pad);
    let center = extent + pad as f64;
    render_disc(&mut work, center, center, radius, color);
    recursive_blur_rgba32(&mut work, blur);
    work.crop(pad, pad, side, side)
}

/// The three stamps for one set of options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BrushSet {
    pub negative: RenderingBuffer,
    pub neutral: RenderingBuffer,
    pub positive: RenderingBuffer,
}

impl BrushSet {
    pub fn render(radius: f64, blur: f64, grayscale: &Grayscale) -> Self {
        Self {
            negative: render_brush(radius, blur, grayscale.negative),
            neutral: render_brush(radius, blur, grayscale.neutral),
            positive: render_brush(radius, blur, grayscale.positive),
        }
    }

    pub fn get(&self, class: SignClass) -> &RenderingBuffer {
        match class {
            SignClass::Negative => &self.negative,
            SignClass::Neutral => &self.neutral,
            SignClass::Positive => &self.positive,
        }
    }
}

/// Lazily rebuilt [`BrushSet`].
#[derive(Debug, Clone)]
pub struct BrushCache {
    brushes: BrushSet,
    dirty: bool,
}

impl Default for BrushCache {
    fn default() -> Self {
        Self {
            brushes: BrushSet::default(),
            dirty: true,
        }
    }
}

impl BrushCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the stamps if invalidated, then return them.
    pub fn ensure(&mut self, options: &Options) -> &BrushSet {
        if self.dirty {
            log::debug!(
                "rebuilding brushes: radius={} blur={}",
                options.radius,
                options.blur
            );
            self.brushes = BrushSet::render(options.radius, options.blur, &options.grayscale);
            self.dirty = false;
        }
        &self.brushes
    }
}
