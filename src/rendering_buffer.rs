//! Rendering buffer: owned RGBA32 pixel storage with row access.
//!
//! Pixels are stored top-down, four bytes per pixel in R, G, B, A order, and
//! are premultiplied by alpha. Rows are tightly packed (`stride = width * 4`).
//! All access is bounds-checked; out-of-range rows panic like slice indexing.

use crate::color::Rgba8;

/// Bytes per pixel.
pub const BPP: usize = 4;

/// Owned premultiplied RGBA32 raster.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderingBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl RenderingBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0; width as usize * height as usize * BPP],
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.width as usize * BPP
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get a safe immutable slice for row `y`.
    pub fn row_slice(&self, y: u32) -> &[u8] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }

    /// Get a safe mutable slice for row `y`.
    pub fn row_slice_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(
            y < self.height,
            "row {} out of bounds (height={})",
            y,
            self.height
        );
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let off = x as usize * BPP;
        Rgba8::from_slice(&self.row_slice(y)[off..off + BPP])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, c: Rgba8) {
        let off = x as usize * BPP;
        self.row_slice_mut(y)[off..off + BPP].copy_from_slice(&c.to_array());
    }

    /// Fill the whole buffer with a premultiplied color.
    pub fn clear(&mut self, c: Rgba8) {
        let px = c.to_array();
        for chunk in self.data.chunks_exact_mut(BPP) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Copy the `w` x `h` region at `(x, y)` into a new buffer. Parts of the
    /// region outside this buffer come out transparent.
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> RenderingBuffer {
        let mut out = RenderingBuffer::new(w, h);
        let copy_w = self.width.saturating_sub(x).min(w) as usize;
        if copy_w == 0 {
            return out;
        }
        let copy_h = self.height.saturating_sub(y).min(h);
        for row in 0..copy_h {
            let src_off = x as usize * BPP;
            let src = &self.row_slice(y + row)[src_off..src_off + copy_w * BPP];
            out.row_slice_mut(row)[..copy_w * BPP].copy_from_slice(src);
        }
        out
    }
}
