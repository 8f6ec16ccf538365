//! Recursive (IIR) Gaussian blur for premultiplied RGBA32 buffers.
//!
//! Young–van Vliet recursive Gaussian approximation: a causal pass followed
//! by an anti-causal pass per line, first along rows then along columns. The
//! cost per pixel does not depend on the radius, which keeps brush rebuilds
//! cheap for large blur values.
//!
//! The `radius` argument follows the canvas `shadowBlur` convention: the
//! Gaussian standard deviation is `radius / 2`.

use crate::rendering_buffer::{RenderingBuffer, BPP};

/// Filter coefficients for one blur radius.
#[derive(Debug, Clone, Copy)]
struct RecursiveCoeffs {
    b: f64,
    b1: f64,
    b2: f64,
    b3: f64,
}

impl RecursiveCoeffs {
    /// `None` when the radius is too small to have any visible effect.
    fn new(radius: f64) -> Option<Self> {
        if !(radius >= 0.62) {
            return None;
        }
        let s = radius * 0.5;
        let q = if s < 2.5 {
            3.97156 - 4.14554 * (1.0 - 0.26891 * s).sqrt()
        } else {
            0.98711 * s - 0.96330
        };
        let q2 = q * q;
        let q3 = q2 * q;

        let b0 = 1.0 / (1.578250 + 2.444130 * q + 1.428100 * q2 + 0.422205 * q3);
        let b1 = (2.44413 * q + 2.85619 * q2 + 1.26661 * q3) * b0;
        let b2 = (-1.42810 * q2 - 1.26661 * q3) * b0;
        let b3 = (0.422205 * q3) * b0;
        Some(Self {
            b: 1.0 - (b1 + b2 + b3),
            b1,
            b2,
            b3,
        })
    }

    #[inline]
    fn step(&self, c: [f64; 4], p1: [f64; 4], p2: [f64; 4], p3: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for i in 0..4 {
            out[i] = self.b * c[i] + self.b1 * p1[i] + self.b2 * p2[i] + self.b3 * p3[i];
        }
        out
    }

    /// Filter one line in place. Edges are extended with the boundary value.
    fn filter_line(&self, line: &mut [[f64; 4]], fwd: &mut Vec<[f64; 4]>) {
        let n = line.len();
        if n < 3 {
            return;
        }
        fwd.clear();
        fwd.resize(n, [0.0; 4]);

        let first = line[0];
        fwd[0] = self.step(first, first, first, first);
        fwd[1] = self.step(line[1], fwd[0], fwd[0], fwd[0]);
        fwd[2] = self.step(line[2], fwd[1], fwd[0], fwd[0]);
        for x in 3..n {
            fwd[x] = self.step(line[x], fwd[x - 1], fwd[x - 2], fwd[x - 3]);
        }

        let last = n - 1;
        line[last] = self.step(fwd[last], fwd[last], fwd[last], fwd[last]);
        line[last - 1] = self.step(fwd[last - 1], line[last], line[last], line[last]);
        line[last - 2] = self.step(fwd[last - 2], line[last - 1], line[last], line[last]);
        for x in (0..last - 2).rev() {
            line[x] = self.step(fwd[x], line[x + 1], line[x + 2], line[x + 3]);
        }
    }
}

#[inline]
fn load(p: &[u8]) -> [f64; 4] {
    [p[0] as f64, p[1] as f64, p[2] as f64, p[3] as f64]
}

/// Store a filtered pixel, keeping the premultiplied invariant (color ≤ alpha).
#[inline]
fn store(p: &mut [u8], c: [f64; 4]) {
    let a = c[3].round().clamp(0.0, 255.0);
    p[3] = a as u8;
    for i in 0..3 {
        p[i] = c[i].round().clamp(0.0, a) as u8;
    }
}

/// Apply a recursive Gaussian blur to the whole buffer in place.
pub fn recursive_blur_rgba32(rbuf: &mut RenderingBuffer, radius: f64) {
    recursive_blur_rgba32_x(rbuf, radius);
    recursive_blur_rgba32_y(rbuf, radius);
}

/// Horizontal pass.
pub fn recursive_blur_rgba32_x(rbuf: &mut RenderingBuffer, radius: f64) {
    let Some(coeffs) = RecursiveCoeffs::new(radius) else {
        return;
    };
    let w = rbuf.width() as usize;
    if w < 3 {
        return;
    }
    let mut line = vec![[0.0; 4]; w];
    let mut fwd = Vec::with_capacity(w);
    for y in 0..rbuf.height() {
        let row = rbuf.row_slice_mut(y);
        for (dst, px) in line.iter_mut().zip(row.chunks_exact(BPP)) {
            *dst = load(px);
        }
        coeffs.filter_line(&mut line, &mut fwd);
        for (c, px) in line.iter().zip(row.chunks_exact_mut(BPP)) {
            store(px, *c);
        }
    }
}

/// Vertical pass.
pub fn recursive_blur_rgba32_y(rbuf: &mut RenderingBuffer, radius: f64) {
    let Some(coeffs) = RecursiveCoeffs::new(radius) else {
        return;
    };
    let h = rbuf.height() as usize;
    if h < 3 {
        return;
    }
    let stride = rbuf.stride();
    let mut line = vec![[0.0; 4]; h];
    let mut fwd = Vec::with_capacity(h);
    let data = rbuf.data_mut();
    for x in 0..stride / BPP {
        let col = x * BPP;
        for (y, dst) in line.iter_mut().enumerate() {
            let off = y * stride + col;
            *dst = load(&data[off..off + BPP]);
        }
        coeffs.filter_line(&mut line, &mut fwd);
        for (y, c) in line.iter().enumerate() {
            let off = y * stride + col;
            store(&mut data[off..off + BPP], *c);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;

    #[test]
    fn test_small_radius_is_noop() {
        let mut buf = RenderingBuffer::new(5, 5);
        buf.set_pixel(2, 2, Rgba8::WHITE);
        let before = buf.clone();
        recursive_blur_rgba32(&mut buf, 0.5);
        assert_eq!(buf, before);
    }

    #[test]
    fn test_uniform_buffer_unchanged() {
        let mut buf = RenderingBuffer::new(16, 16);
        buf.clear(Rgba8::new(100, 100, 100, 200));
        recursive_blur_rgba32(&mut buf, 6.0);
        for y in 0..16 {
            for x in 0..16 {
                let p = buf.pixel(x, y);
                assert!((p.a as i32 - 200).abs() <= 1, "a={} at {x},{y}", p.a);
            }
        }
    }

    #[test]
    fn test_spreads_and_falls_off() {
        let mut buf = RenderingBuffer::new(41, 41);
        for y in 15..26 {
            for x in 15..26 {
                buf.set_pixel(x, y, Rgba8::WHITE);
            }
        }
        recursive_blur_rgba32(&mut buf, 8.0);

        let center = buf.pixel(20, 20).a;
        let edge = buf.pixel(25, 20).a;
        let outside = buf.pixel(30, 20).a;
        let far = buf.pixel(0, 20).a;
        assert!(center > edge, "center={center} edge={edge}");
        assert!(edge > outside, "edge={edge} outside={outside}");
        assert!(outside > far, "outside={outside} far={far}");
        assert!(far <= 1, "far={far}");
    }

    #[test]
    fn test_keeps_premultiplied_invariant() {
        let mut buf = RenderingBuffer::new(20, 20);
        buf.set_pixel(10, 10, Rgba8::new(255, 128, 0, 255));
        recursive_blur_rgba32(&mut buf, 4.0);
        for px in buf.data().chunks(4) {
            assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3], "{px:?}");
        }
    }

    #[test]
    fn test_blur_is_symmetric() {
        let mut buf = RenderingBuffer::new(31, 31);
        buf.set_pixel(15, 15, Rgba8::WHITE);
        recursive_blur_rgba32(&mut buf, 5.0);
        let v = buf.pixel(15, 12).a as i32;
        let h = buf.pixel(12, 15).a as i32;
        assert!((v - h).abs() <= 2, "v={v} h={h}");
    }
}
