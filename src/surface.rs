//! Drawing surfaces.
//!
//! [`Surface`] is the set of 2D-context capabilities the heatmap pipeline
//! needs from its host: compositing state, clearing, drawing a raster at an
//! offset and reading/writing pixels. [`PixelSurface`] is a software
//! implementation over a premultiplied [`RenderingBuffer`] with the same
//! semantics as a canvas 2D context for those calls.

use crate::color::Rgba8;
use crate::comp_op::{composite, CompOp};
use crate::rendering_buffer::{RenderingBuffer, BPP};

// ============================================================================
// ImageData
// ============================================================================

/// Straight-alpha RGBA pixels, row-major, four bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl ImageData {
    /// Transparent image of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BPP],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let off = (y as usize * self.width as usize + x as usize) * BPP;
        Rgba8::from_slice(&self.data[off..off + BPP])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, c: Rgba8) {
        let off = (y as usize * self.width as usize + x as usize) * BPP;
        self.data[off..off + BPP].copy_from_slice(&c.to_array());
    }
}

// ============================================================================
// Surface trait
// ============================================================================

/// Raster target the heatmap draws onto.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Compositing mode for subsequent [`Surface::draw_image`] calls.
    fn set_comp_op(&mut self, op: CompOp);

    /// Opacity multiplier for subsequent [`Surface::draw_image`] calls.
    /// Implementations decide how values outside `[0, 1]` are treated.
    fn set_global_alpha(&mut self, alpha: f64);

    /// Reset a rectangle to transparent black, ignoring comp op and alpha.
    fn clear_rect(&mut self, x: i32, y: i32, w: u32, h: u32);

    /// Composite a premultiplied raster with its top-left corner at
    /// `(dx, dy)` under the current comp op and global alpha.
    fn draw_image(&mut self, image: &RenderingBuffer, dx: f64, dy: f64);

    /// Read a rectangle as straight-alpha RGBA. Pixels outside the surface
    /// read as transparent black.
    fn get_image_data(&self, x: i32, y: i32, w: u32, h: u32) -> ImageData;

    /// Write straight-alpha RGBA with its top-left corner at `(x, y)`,
    /// ignoring comp op and alpha. Pixels falling outside are dropped.
    fn put_image_data(&mut self, image: &ImageData, x: i32, y: i32);
}

impl<T: Surface + ?Sized> Surface for &mut T {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn set_comp_op(&mut self, op: CompOp) {
        (**self).set_comp_op(op)
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        (**self).set_global_alpha(alpha)
    }

    fn clear_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        (**self).clear_rect(x, y, w, h)
    }

    fn draw_image(&mut self, image: &RenderingBuffer, dx: f64, dy: f64) {
        (**self).draw_image(image, dx, dy)
    }

    fn get_image_data(&self, x: i32, y: i32, w: u32, h: u32) -> ImageData {
        (**self).get_image_data(x, y, w, h)
    }

    fn put_image_data(&mut self, image: &ImageData, x: i32, y: i32) {
        (**self).put_image_data(image, x, y)
    }
}

impl<T: Surface + ?Sized> Surface for Box<T> {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn set_comp_op(&mut self, op: CompOp) {
        (**self).set_comp_op(op)
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        (**self).set_global_alpha(alpha)
    }

    fn clear_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        (**self).clear_rect(x, y, w, h)
    }

    fn draw_image(&mut self, image: &RenderingBuffer, dx: f64, dy: f64) {
        (**self).draw_image(image, dx, dy)
    }

    fn get_image_data(&self, x: i32, y: i32, w: u32, h: u32) -> ImageData {
        (**self).get_image_data(x, y, w, h)
    }

    fn put_image_data(&mut self, image: &ImageData, x: i32, y: i32) {
        (**self).put_image_data(image, x, y)
    }
}

// ============================================================================
// PixelSurface
// ============================================================================

/// Visible intersection of a `w` x `h` rectangle at `(x, y)` with a
/// `bw` x `bh` buffer, as `(x0, y0, x1, y1)` in buffer coordinates.
fn clip_rect(x: i32, y: i32, w: u32, h: u32, bw: u32, bh: u32) -> Option<(u32, u32, u32, u32)> {
    let x0 = (x as i64).max(0);
    let y0 = (y as i64).max(0);
    let x1 = (x as i64 + w as i64).min(bw as i64);
    let y1 = (y as i64 + h as i64).min(bh as i64);
    if x0 >= x1 || y0 >= y1 {
        None
    } else {
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// In-memory software surface.
///
/// Global alpha saturates to `[0, 1]`; a NaN alpha draws nothing. Image
/// offsets are rounded to whole pixels.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    buf: RenderingBuffer,
    comp_op: CompOp,
    global_alpha: f64,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buf: RenderingBuffer::new(width, height),
            comp_op: CompOp::SourceOver,
            global_alpha: 1.0,
        }
    }

    /// Change the size. Like resizing a canvas, this drops the content.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buf = RenderingBuffer::new(width, height);
    }

    pub fn buffer(&self) -> &RenderingBuffer {
        &self.buf
    }

    pub fn comp_op(&self) -> CompOp {
        self.comp_op
    }

    pub fn global_alpha(&self) -> f64 {
        self.global_alpha
    }

    /// Straight-alpha pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        self.buf.pixel(x, y).demultiplied()
    }

    /// Fill everything with a straight-alpha color.
    pub fn fill(&mut self, c: Rgba8) {
        self.buf.clear(c.premultiplied());
    }
}

impl Surface for PixelSurface {
    fn width(&self) -> u32 {
        self.buf.width()
    }

    fn height(&self) -> u32 {
        self.buf.height()
    }

    fn set_comp_op(&mut self, op: CompOp) {
        self.comp_op = op;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.global_alpha = alpha;
    }

    fn clear_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
        let Some((x0, y0, x1, y1)) = clip_rect(x, y, w, h, self.buf.width(), self.buf.height())
        else {
            return;
        };
        for row in y0..y1 {
            self.buf.row_slice_mut(row)[x0 as usize * BPP..x1 as usize * BPP].fill(0);
        }
    }

    fn draw_image(&mut self, image: &RenderingBuffer, dx: f64, dy: f64) {
        if image.is_empty() || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        let dx = dx.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        let dy = dy.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        composite(&mut self.buf, image, dx, dy, self.comp_op, self.global_alpha);
    }

    fn get_image_data(&self, x: i32, y: i32, w: u32, h: u32) -> ImageData {
        let mut out = ImageData::new(w, h);
        let Some((x0, y0, x1, y1)) = clip_rect(x, y, w, h, self.buf.width(), self.buf.height())
        else {
            return out;
        };
        for by in y0..y1 {
            for bx in x0..x1 {
                let c = self.buf.pixel(bx, by).demultiplied();
                out.set_pixel((bx as i64 - x as i64) as u32, (by as i64 - y as i64) as u32, c);
            }
        }
        out
    }

    fn put_image_data(&mut self, image: &ImageData, x: i32, y: i32) {
        let Some((x0, y0, x1, y1)) = clip_rect(
            x,
            y,
            image.width,
            image.height,
            self.buf.width(),
            self.buf.height(),
        ) else {
            return;
        };
        for by in y0..y1 {
            for bx in x0..x1 {
                let c = image.pixel((bx as i64 - x as i64) as u32, (by as i64 - y as i64) as u32);
                self.buf.set_pixel(bx, by, c.premultiplied());
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
