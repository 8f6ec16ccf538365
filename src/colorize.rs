//! Grayscale-to-gradient colorization.
//!
//! Works on straight-alpha RGBA bytes as read back from a surface. The red
//! channel of each stamped pixel is its grayscale intensity and selects the
//! gradient entry; the gradient alpha is scaled by the pixel's own alpha in
//! 8.8 fixed point, `floor(A_grad * a / 256)`. Pixels with zero alpha are
//! left exactly as they are.

use crate::gradient_lut::GradientLut;
use crate::rendering_buffer::BPP;

/// Colorize a straight-alpha RGBA byte buffer in place.
pub fn colorize(pixels: &mut [u8], lut: &GradientLut) {
    for px in pixels.chunks_exact_mut(BPP) {
        let alpha = px[3];
        if alpha == 0 {
            continue;
        }
        let c = lut.get(px[0]);
        px[0] = c.r;
        px[1] = c.g;
        px[2] = c.b;
        px[3] = ((c.a as u32 * alpha as u32) >> 8) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::gradient_lut::GradientStop;

    fn ramp() -> GradientLut {
        GradientLut::build(&[
            GradientStop::new(0.0, Rgba8::new(0, 0, 255, 128)),
            GradientStop::new(1.0, Rgba8::new(255, 0, 0, 255)),
        ])
    }

    #[test]
    fn test_maps_red_channel_through_lut() {
        let lut = ramp();
        let mut px = [255, 7, 7, 255, 0, 9, 9, 255];
        colorize(&mut px, &lut);
        assert_eq!(&px[..4], &[255, 0, 0, 254]);
        assert_eq!(&px[4..], &[0, 0, 255, 127]);
    }

    #[test]
    fn test_fixed_point_alpha() {
        let lut = ramp();
        for a in [1u8, 2, 100, 128, 200, 255] {
            let mut px = [255, 0, 0, a];
            colorize(&mut px, &lut);
            let expected = ((255.0 / 256.0) * (a as f64 / 256.0) * 256.0).floor() as u8;
            assert_eq!(px[3], expected, "a={a}");
        }
    }

    #[test]
    fn test_transparent_pixels_untouched() {
        let lut = ramp();
        let mut px = [12, 34, 56, 0, 200, 200, 200, 0];
        colorize(&mut px, &lut);
        assert_eq!(px, [12, 34, 56, 0, 200, 200, 200, 0]);
    }

    #[test]
    fn test_ignores_trailing_partial_pixel() {
        let lut = ramp();
        let mut px = [255, 0, 0, 255, 9, 9];
        colorize(&mut px, &lut);
        assert_eq!(&px[4..], &[9, 9]);
    }
}
