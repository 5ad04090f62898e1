//! `raster`
//!
//! An RGBA pixel buffer that shapes are filled into, backed by a `tiny_skia` pixmap.

use std::{io::Cursor, path::Path};

use image::{ImageFormat, ImageResult, Rgba, RgbaImage};
use resvg::tiny_skia::{self, FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::colour::Colour;

/// Distance of the cubic control points from a corner's end points, as a fraction of the radius,
/// for a bezier approximation of a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// A pixel buffer, initially fully transparent.
///
/// Every fill paints opaquely, so a later shape replaces whatever an earlier one left under it.
pub struct Canvas {
    /// The pixels, stored premultiplied.
    pixmap: Pixmap,
    /// Whether shape edges are anti-aliased.
    anti_alias: bool,
}

impl Canvas {
    /// Creates a transparent canvas.
    ///
    /// # Arguments
    /// * `width`: Width in pixels.
    /// * `height`: Height in pixels.
    ///
    /// # Returns
    /// `None` if either dimension is zero or the buffer would be too large.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Canvas {
            pixmap: Pixmap::new(width, height)?,
            anti_alias: false,
        })
    }

    /// Sets whether shape edges are anti-aliased. Off by default, so pixels are either
    /// covered or not depending on whether their centre falls inside the shape.
    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        self.anti_alias = anti_alias;
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Fills the whole canvas with a rounded rectangle.
    ///
    /// # Arguments
    /// * `radius`: Corner radius in pixels, clamped to half the shorter side. Zero gives square corners.
    /// * `colour`: The fill colour.
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_rounded_rect(&mut self, radius: f32, colour: Colour) {
        let width = self.width() as f32;
        let height = self.height() as f32;

        match rounded_rect_path(width, height, radius) {
            Some(path) => self.fill(&path, colour),
            None => log::debug!("Rounded rectangle {width}x{height} r={radius} is empty"),
        }
    }

    /// Fills a closed polygon using the non-zero winding rule.
    ///
    /// # Arguments
    /// * `points`: The vertices, in pixels. The polygon is closed back to the first point.
    /// * `colour`: The fill colour.
    pub fn fill_polygon<I>(&mut self, points: I, colour: Colour)
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        let mut builder = PathBuilder::new();
        for (index, (x, y)) in points.into_iter().enumerate() {
            if index == 0 {
                builder.move_to(x, y);
            } else {
                builder.line_to(x, y);
            }
        }
        builder.close();

        match builder.finish() {
            Some(path) => self.fill(&path, colour),
            None => log::debug!("Skipping polygon with too few points to fill"),
        }
    }

    /// Paints a path opaquely.
    fn fill(&mut self, path: &tiny_skia::Path, colour: Colour) {
        let mut paint = Paint::default();
        paint.set_color_rgba8(colour.red(), colour.green(), colour.blue(), u8::MAX);
        paint.anti_alias = self.anti_alias;

        self.pixmap.fill_path(
            path,
            &paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Reads a pixel as straight (not premultiplied) RGBA.
    ///
    /// # Returns
    /// `None` if the coordinates are outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let colour = self.pixmap.pixel(x, y)?.demultiply();
        Some([colour.red(), colour.green(), colour.blue(), colour.alpha()])
    }

    /// Copies the canvas into an 8-bit-per-channel RGBA image.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width(), self.height(), |x, y| {
            Rgba(self.pixel(x, y).unwrap_or_default())
        })
    }

    /// Encodes the canvas as an RGBA PNG.
    ///
    /// # Errors
    /// An [`image::ImageError`] if encoding fails.
    pub fn encode_png(&self) -> ImageResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.to_rgba_image().write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Writes the canvas to an RGBA PNG file, replacing any file already at `path`.
    ///
    /// # Errors
    /// An [`image::ImageError`] if the file cannot be encoded or written.
    pub fn save_png(&self, path: &Path) -> ImageResult<()> {
        self.to_rgba_image().save_with_format(path, ImageFormat::Png)
    }
}

/// Builds a rectangle from (0, 0) to (`width`, `height`) with rounded corners.
///
/// # Arguments
/// * `width`: Width of the rectangle.
/// * `height`: Height of the rectangle.
/// * `radius`: Corner radius, clamped to half the shorter side. Non-positive radii give square corners.
///
/// # Returns
/// The path, or `None` for a degenerate rectangle.
fn rounded_rect_path(width: f32, height: f32, radius: f32) -> Option<tiny_skia::Path> {
    let r = radius.min(width.min(height) / 2.0);
    if r.is_nan() || r <= 0.0 {
        return Some(PathBuilder::from_rect(tiny_skia::Rect::from_xywh(
            0.0, 0.0, width, height,
        )?));
    }

    let k = r * KAPPA;
    let mut builder = PathBuilder::new();
    builder.move_to(r, 0.0);
    builder.line_to(width - r, 0.0);
    builder.cubic_to(width - r + k, 0.0, width, r - k, width, r);
    builder.line_to(width, height - r);
    builder.cubic_to(width, height - r + k, width - r + k, height, width - r, height);
    builder.line_to(r, height);
    builder.cubic_to(r - k, height, 0.0, height - r + k, 0.0, height - r);
    builder.line_to(0.0, r);
    builder.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
    builder.close();
    builder.finish()
}
