// Point-file parsing and PNG output for the heatmap-render CLI.

use agg_heatmap::{Heatmap, OptionsPatch, PixelSurface, Point, Surface};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("line {line}: {msg}")]
    Points { line: usize, msg: String },
    #[error("options: {0}")]
    Options(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
}

// ============================================================================
// Point files
// ============================================================================

/// Parse whitespace-separated `x y weight [sign]` lines.
///
/// Blank lines and lines starting with `#` are skipped. A missing sign
/// column means neutral.
pub fn parse_points(text: &str) -> Result<Vec<Point>, RenderError> {
    let mut points = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let err = |msg: String| RenderError::Points { line: idx + 1, msg };
        let fields = line
            .split_whitespace()
            .map(|f| f.parse::<f64>().map_err(|_| err(format!("not a number: {f:?}"))))
            .collect::<Result<Vec<f64>, _>>()?;
        let point = match fields[..] {
            [x, y, w] => Point::new(x, y, w, 0.0),
            [x, y, w, s] => Point::new(x, y, w, s),
            _ => return Err(err(format!("expected 3 or 4 columns, got {}", fields.len()))),
        };
        points.push(point);
    }
    Ok(points)
}

/// Parse a JSON options patch, e.g. `{"radius": 10, "blendMode": "lighter"}`.
pub fn parse_options(json: &str) -> Result<OptionsPatch, RenderError> {
    Ok(serde_json::from_str(json)?)
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render(
    points: Vec<Point>,
    width: u32,
    height: u32,
    patch: OptionsPatch,
    min_opacity: Option<f64>,
) -> PixelSurface {
    let mut heatmap = Heatmap::new(PixelSurface::new(width, height));
    heatmap.set_options(patch).set_points(points).render(min_opacity);
    heatmap.into_surface()
}

/// Straight-alpha copy of the surface as an `image` buffer.
pub fn to_rgba_image(surface: &PixelSurface) -> image::RgbaImage {
    let (w, h) = (surface.width(), surface.height());
    let data = surface.get_image_data(0, 0, w, h);
    image::RgbaImage::from_fn(w, h, |x, y| image::Rgba(data.pixel(x, y).to_array()))
}

pub fn save_png(path: &Path, surface: &PixelSurface) -> Result<(), RenderError> {
    to_rgba_image(surface).save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}
