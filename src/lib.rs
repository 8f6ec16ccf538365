//! # agg-heatmap
//!
//! Density heatmaps from weighted, signed 2D points, rendered in pure Rust
//! with AGG-style premultiplied RGBA compositing.
//!
//! Each point is stamped as a blurred circular brush. The sign of the point
//! picks one of three grayscale brushes (negative, neutral, positive), its
//! weight sets the stamp opacity. Stamps are blended into an intensity
//! buffer, which is then remapped through a 256-entry gradient table.
//!
//! ## Architecture
//!
//! 1. **Options**: radius, blur, blend mode, weight normalization, gradient
//!    stops, colorize toggle, brush colors
//! 2. **Brush cache**: three blurred stamps, rebuilt when options change
//! 3. **Gradient table**: 256-entry LUT, rebuilt when options change
//! 4. **Point store**: points, lazily stable-sorted by sign before drawing
//! 5. **Compositor**: stamps, reads back, colorizes and writes back through
//!    the [`Surface`] trait
//!
//! ```
//! use agg_heatmap::{Heatmap, OptionsPatch, PixelSurface};
//!
//! let mut heatmap = Heatmap::new(PixelSurface::new(100, 100));
//! heatmap
//!     .set_options(OptionsPatch::new().radius(10.0).blur(5.0))
//!     .add_point((50.0, 50.0, 1.0, 1.0))
//!     .draw();
//! assert!(heatmap.surface().pixel(50, 50).a > 0);
//! ```

// Foundation
pub mod color;
pub mod error;
pub mod rendering_buffer;

// Raster operations
pub mod blur;
pub mod comp_op;
pub mod gradient_lut;

// Heatmap pipeline
pub mod brush;
pub mod colorize;
pub mod heatmap;
pub mod options;
pub mod points;
pub mod surface;

pub use color::Rgba8;
pub use comp_op::CompOp;
pub use error::{Error, Result};
pub use gradient_lut::{GradientLut, GradientStop};
pub use heatmap::{Heatmap, DEFAULT_MIN_OPACITY};
pub use options::{Grayscale, Options, OptionsPatch};
pub use points::{Point, PointStore, SignClass};
pub use rendering_buffer::RenderingBuffer;
pub use surface::{ImageData, PixelSurface, Surface};
