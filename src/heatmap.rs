//! The heatmap renderer.
//!
//! [`Heatmap`] owns its point set, options and derived rasters, and draws
//! onto a [`Surface`]. A render is one full pass:
//!
//! 1. rebuild the brush stamps and the gradient table if options changed,
//! 2. restore the paint order (ascending sign) if points changed,
//! 3. clear the surface and stamp every point under the blend mode, with
//!    opacity `max(weight / max, min_opacity)`,
//! 4. read the pixels back, colorize them through the gradient table and
//!    write them back.

use crate::brush::BrushCache;
use crate::colorize::colorize;
use crate::error::{Error, Result};
use crate::gradient_lut::GradientLut;
use crate::options::{Options, OptionsPatch};
use crate::points::{Point, PointStore, SignClass};
use crate::rendering_buffer::RenderingBuffer;
use crate::surface::Surface;

/// Opacity floor used when [`Heatmap::render`] is given `None`.
pub const DEFAULT_MIN_OPACITY: f64 = 0.05;

/// Lazily rebuilt [`GradientLut`].
#[derive(Debug, Clone)]
struct GradientCache {
    lut: GradientLut,
    dirty: bool,
}

impl GradientCache {
    fn new() -> Self {
        Self {
            lut: GradientLut::default(),
            dirty: true,
        }
    }

    fn ensure(&mut self, options: &Options) -> &GradientLut {
        if self.dirty {
            log::debug!("rebuilding gradient: {} stops", options.gradient.len());
            self.lut = GradientLut::build(&options.gradient);
            self.dirty = false;
        }
        &self.lut
    }
}

/// Weighted, signed point heatmap bound to a drawing surface.
#[derive(Debug)]
pub struct Heatmap<S: Surface> {
    surface: S,
    width: u32,
    height: u32,
    points: PointStore,
    options: Options,
    brushes: BrushCache,
    gradient: GradientCache,
}

impl<S: Surface> Heatmap<S> {
    /// Bind a heatmap with default options and no points to `surface`.
    pub fn new(surface: S) -> Self {
        let width = surface.width();
        let height = surface.height();
        Self {
            surface,
            width,
            height,
            points: PointStore::new(),
            options: Options::default(),
            brushes: BrushCache::new(),
            gradient: GradientCache::new(),
        }
    }

    /// Resolve a surface by identifier and bind to it.
    ///
    /// Fails with [`Error::SurfaceNotFound`] when `lookup` yields nothing.
    pub fn from_lookup<F>(id: &str, lookup: F) -> Result<Self>
    where
        F: FnOnce(&str) -> Option<S>,
    {
        match lookup(id) {
            Some(surface) => Ok(Self::new(surface)),
            None => Err(Error::SurfaceNotFound(id.to_string())),
        }
    }

    /// Replace all points.
    pub fn set_points<I, P>(&mut self, points: I) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Point>,
    {
        self.points.set(points);
        self
    }

    pub fn add_point(&mut self, point: impl Into<Point>) -> &mut Self {
        self.points.push(point);
        self
    }

    pub fn clear_points(&mut self) -> &mut Self {
        self.points.clear();
        self
    }

    /// Merge `patch` into the options and drop the derived brushes and
    /// gradient table.
    pub fn set_options(&mut self, patch: OptionsPatch) -> &mut Self {
        log::debug!("merging options: {patch:?}");
        self.options.merge(patch);
        self.brushes.invalidate();
        self.gradient.dirty = true;
        self
    }

    /// Snapshot of the current options.
    pub fn options(&self) -> Options {
        self.options.clone()
    }

    /// Re-read the surface dimensions, e.g. after the host resized it.
    pub fn notify_resize(&mut self) -> &mut Self {
        self.width = self.surface.width();
        self.height = self.surface.height();
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn points(&self) -> &[Point] {
        self.points.as_slice()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Current gradient table, rebuilt first if stale.
    pub fn gradient_lut(&mut self) -> &GradientLut {
        self.gradient.ensure(&self.options)
    }

    /// Current brush stamp for a sign class, rebuilt first if stale.
    pub fn brush(&mut self, class: SignClass) -> &RenderingBuffer {
        self.brushes.ensure(&self.options).get(class)
    }

    /// Render with the default opacity floor.
    pub fn draw(&mut self) -> &mut Self {
        self.render(None)
    }

    /// Render all points, replacing the surface content.
    ///
    /// Each stamp gets opacity `max(weight / max, min_opacity)`, where
    /// `min_opacity` defaults to [`DEFAULT_MIN_OPACITY`]. There is no upper
    /// bound here; the surface decides what opacities above 1 mean.
    pub fn render(&mut self, min_opacity: Option<f64>) -> &mut Self {
        let min_opacity = min_opacity.unwrap_or(DEFAULT_MIN_OPACITY);
        let extent = self.options.extent();
        let max = self.options.max;
        let (width, height) = (self.width, self.height);

        let brushes = self.brushes.ensure(&self.options);
        let lut = self.gradient.ensure(&self.options);
        self.points.ensure_sorted();

        log::trace!(
            "rendering {} points onto {}x{}",
            self.points.len(),
            width,
            height
        );

        let surface = &mut self.surface;
        surface.set_comp_op(self.options.blend_mode);
        surface.clear_rect(0, 0, width, height);

        for p in self.points.iter() {
            surface.set_global_alpha((p.weight / max).max(min_opacity));
            surface.draw_image(brushes.get(p.sign_class()), p.x - extent, p.y - extent);
        }

        let mut image = surface.get_image_data(0, 0, width, height);
        if self.options.colorize {
            colorize(&mut image.data, lut);
        }
        surface.put_image_data(&image, 0, 0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::comp_op::CompOp;
    use crate::surface::{ImageData, PixelSurface};

    /// Records every call so tests can check the pipeline's use of the
    /// surface.
    #[derive(Debug, Default)]
    struct RecordingSurface {
        width: u32,
        height: u32,
        calls: Vec<String>,
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn set_comp_op(&mut self, op: CompOp) {
            self.calls.push(format!("op {op}"));
        }

        fn set_global_alpha(&mut self, alpha: f64) {
            self.calls.push(format!("alpha {alpha}"));
        }

        fn clear_rect(&mut self, x: i32, y: i32, w: u32, h: u32) {
            self.calls.push(format!("clear {x} {y} {w} {h}"));
        }

        fn draw_image(&mut self, image: &RenderingBuffer, dx: f64, dy: f64) {
            self.calls
                .push(format!("draw {}x{} at {dx} {dy}", image.width(), image.height()));
        }

        fn get_image_data(&self, _x: i32, _y: i32, w: u32, h: u32) -> ImageData {
            ImageData::new(w, h)
        }

        fn put_image_data(&mut self, image: &ImageData, x: i32, y: i32) {
            self.calls
                .push(format!("put {}x{} at {x} {y}", image.width, image.height));
        }
    }

    fn recording(w: u32, h: u32) -> Heatmap<RecordingSurface> {
        Heatmap::new(RecordingSurface {
            width: w,
            height: h,
            calls: Vec::new(),
        })
    }

    #[test]
    fn test_pipeline_call_sequence() {
        let mut hm = recording(20, 10);
        hm.set_options(OptionsPatch::new().radius(2.0).blur(1.0).max(4.0))
            .add_point((5.0, 5.0, 2.0, 1.0))
            .add_point((8.0, 4.0, 0.0, -1.0))
            .render(None);

        assert_eq!(
            hm.surface().calls,
            [
                "op overlay",
                "clear 0 0 20 10",
                "alpha 0.05",
                "draw 6x6 at 5 1",
                "alpha 0.5",
                "draw 6x6 at 2 2",
                "put 20x10 at 0 0",
            ]
        );
    }

    #[test]
    fn test_opacity_floor_and_no_upper_clamp() {
        let mut hm = recording(10, 10);
        hm.set_points([(1.0, 1.0, 0.1, 0.0), (1.0, 1.0, 3.0, 0.0)])
            .render(Some(0.25));
        let alphas: Vec<&String> = hm
            .surface()
            .calls
            .iter()
            .filter(|c| c.starts_with("alpha"))
            .collect();
        assert_eq!(alphas, ["alpha 0.25", "alpha 3"]);
    }

    #[test]
    fn test_nan_opacity_uses_floor() {
        let mut hm = recording(10, 10);
        hm.set_options(OptionsPatch::new().max(0.0))
            .add_point((1.0, 1.0, 0.0, 0.0))
            .add_point((1.0, 1.0, f64::NAN, 0.0))
            .draw();
        let alphas: Vec<&String> = hm
            .surface()
            .calls
            .iter()
            .filter(|c| c.starts_with("alpha"))
            .collect();
        assert_eq!(alphas, ["alpha 0.05", "alpha 0.05"]);
    }

    #[test]
    fn test_from_lookup() {
        let found = Heatmap::from_lookup("heat", |id| {
            (id == "heat").then(|| PixelSurface::new(4, 4))
        });
        assert!(found.is_ok());

        let missing = Heatmap::<PixelSurface>::from_lookup("nope", |_| None);
        assert_eq!(
            missing.err(),
            Some(Error::SurfaceNotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_options_snapshot_is_detached() {
        let mut hm = Heatmap::new(PixelSurface::new(4, 4));
        let mut snapshot = hm.options();
        snapshot.radius = 99.0;
        assert_eq!(hm.options().radius, 25.0);
        hm.set_options(OptionsPatch::new().radius(3.0));
        assert_eq!(hm.options().radius, 3.0);
    }

    #[test]
    fn test_set_options_rebuilds_brushes() {
        let mut hm = Heatmap::new(PixelSurface::new(4, 4));
        assert_eq!(hm.brush(SignClass::Positive).width(), 80);
        hm.set_options(OptionsPatch::new().radius(10.0).blur(5.0));
        assert_eq!(hm.brush(SignClass::Positive).width(), 30);
    }

    #[test]
    fn test_set_options_rebuilds_gradient() {
        let mut hm = Heatmap::new(PixelSurface::new(4, 4));
        assert_eq!(hm.gradient_lut().get(255), Rgba8::new(0, 214, 96, 255));
        hm.set_options(OptionsPatch::new().gradient(vec![
            crate::gradient_lut::GradientStop::css(0.0, "black"),
            crate::gradient_lut::GradientStop::css(1.0, "white"),
        ]));
        assert_eq!(hm.gradient_lut().get(255), Rgba8::WHITE);
    }

    #[test]
    fn test_huge_radius_draws_nothing() {
        let mut hm = Heatmap::new(PixelSurface::new(10, 10));
        hm.set_options(OptionsPatch::new().radius(3.0e9).blur(15.0))
            .add_point((5.0, 5.0, 1.0, 1.0))
            .draw();
        assert!(hm.brush(SignClass::Positive).is_empty());
        assert_eq!(hm.surface().pixel(5, 5), Rgba8::TRANSPARENT);
    }

    #[test]
    fn test_notify_resize() {
        let mut hm = Heatmap::new(PixelSurface::new(4, 4));
        hm.surface_mut().resize(7, 9);
        assert_eq!((hm.width(), hm.height()), (4, 4));
        hm.notify_resize();
        assert_eq!((hm.width(), hm.height()), (7, 9));
    }

    #[test]
    fn test_points_sorted_on_render() {
        let mut hm = Heatmap::new(PixelSurface::new(8, 8));
        hm.set_options(OptionsPatch::new().radius(1.0).blur(0.0))
            .add_point((1.0, 1.0, 1.0, 1.0))
            .add_point((2.0, 2.0, 1.0, 0.0))
            .add_point((3.0, 3.0, 1.0, -1.0));
        assert_eq!(hm.points()[0].sign, 1.0);
        hm.draw();
        let signs: Vec<f64> = hm.points().iter().map(|p| p.sign).collect();
        assert_eq!(signs, [-1.0, 0.0, 1.0]);
    }
}
