//! `render`
//!
//! Rasterizes a [`Document`] into a square icon.
//!
//! The artwork is approximated with flat fills: the background rectangle takes the colour of
//! the gradient's first stop rather than a real gradient, and every polygon is filled white.

use serde::{Deserialize, Serialize};

use crate::{
    colour::{Colour, DEFAULT_BACKGROUND, WHITE},
    document::Document,
    raster::Canvas,
    RenderError,
};

/// Options controlling rasterization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Anti-alias shape edges. Off by default, giving hard pixel-centre edges.
    pub anti_alias: bool,
}

/// Gets the solid colour the background is filled with.
///
/// # Returns
/// The first gradient stop's colour, or [`DEFAULT_BACKGROUND`] if there is no stop or it has no colour.
pub fn background_colour(document: &Document) -> Colour {
    document
        .first_stop()
        .and_then(|stop| stop.colour)
        .unwrap_or(DEFAULT_BACKGROUND)
}

/// Gets the corner radius of the background in pixels.
///
/// # Arguments
/// * `document`: The icon.
/// * `scale`: Pixels per viewBox unit.
///
/// # Returns
/// The scaled radius, or `None` if the document has no background rectangle.
pub fn scaled_corner_radius(document: &Document, scale: f32) -> Option<f32> {
    document
        .background()
        .map(|rectangle| rectangle.corner_radius * scale)
}

/// Renders a document into a `size` x `size` canvas.
///
/// # Arguments
/// * `document`: The icon to draw.
/// * `size`: Width and height of the output in pixels.
/// * `options`: Rasterization options.
///
/// # Returns
/// The filled canvas.
///
/// # Errors
/// [`RenderError::InvalidSize`] if a canvas of `size` pixels cannot be created.
pub fn render(
    document: &Document,
    size: u32,
    options: RenderOptions,
) -> Result<Canvas, RenderError> {
    let mut canvas = Canvas::new(size, size).ok_or(RenderError::InvalidSize(size))?;
    canvas.set_anti_alias(options.anti_alias);

    if let Some(view_box) = document.view_box() {
        if view_box.height != view_box.width {
            log::warn!(
                "viewBox is {}x{}, scaling both axes by its width",
                view_box.width,
                view_box.height
            );
        }
    }

    let scale = document.scale_for(size);

    if let Some(radius) = scaled_corner_radius(document, scale) {
        let colour = background_colour(document);
        log::debug!("Filling {size}px background {colour} with radius {radius}");
        canvas.fill_rounded_rect(radius, colour);
    } else {
        log::debug!("No background rectangle, leaving the background transparent");
    }

    for polygon in document.polygons() {
        canvas.fill_polygon(
            polygon
                .points
                .iter()
                .map(|point| (point.x * scale, point.y * scale)),
            WHITE,
        );
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Element, GradientStop, Point, Polygon, Rectangle, ViewBox};

    const OPAQUE_WHITE: [u8; 4] = [255, 255, 255, 255];

    /// A 100 unit wide document holding a background and the given polygons.
    fn document_with(radius: Option<f32>, polygons: &[&[(f32, f32)]]) -> Document {
        let mut elements = vec![];
        if let Some(corner_radius) = radius {
            elements.push(Element::Rectangle(Rectangle { corner_radius }));
        }
        for points in polygons {
            elements.push(Element::Polygon(Polygon {
                points: points.iter().copied().map(Point::from).collect(),
            }));
        }

        Document::new(
            Some(ViewBox {
                min_x: 0.0,
                min_y: 0.0,
                width: 100.0,
                height: 100.0,
            }),
            elements,
        )
    }

    /// Every pixel of the canvas with its coordinates.
    fn pixels(canvas: &Canvas) -> Vec<(u32, u32, [u8; 4])> {
        canvas
            .to_rgba_image()
            .enumerate_pixels()
            .map(|(x, y, pixel)| (x, y, pixel.0))
            .collect()
    }

    #[test]
    fn test_scaled_corner_radius() {
        let document = document_with(Some(20.0), &[]);
        let radius = scaled_corner_radius(&document, document.scale_for(128)).unwrap();
        assert!((radius - 25.6).abs() < 1e-4, "radius was {radius}");

        assert_eq!(scaled_corner_radius(&document_with(None, &[]), 1.0), None);
    }

    #[test]
    fn test_background_colour_defaults() {
        let document = document_with(Some(0.0), &[]);
        assert_eq!(background_colour(&document), [11, 53, 113]);

        let document = Document::new(
            None,
            vec![Element::GradientStop(GradientStop { colour: None })],
        );
        assert_eq!(background_colour(&document), DEFAULT_BACKGROUND);
    }

    #[test]
    fn test_first_stop_wins() {
        let document = Document::new(
            None,
            vec![
                Element::GradientStop(GradientStop {
                    colour: Some(Colour([1, 2, 3])),
                }),
                Element::Rectangle(Rectangle { corner_radius: 0.0 }),
                Element::GradientStop(GradientStop {
                    colour: Some(Colour([4, 5, 6])),
                }),
            ],
        );

        let canvas = render(&document, 4, RenderOptions::default()).unwrap();
        assert_eq!(canvas.pixel(0, 0), Some([1, 2, 3, 255]));
    }

    #[test]
    fn test_no_polygons_means_no_white() {
        let canvas = render(&document_with(Some(20.0), &[]), 64, RenderOptions::default()).unwrap();

        for (x, y, pixel) in pixels(&canvas) {
            assert!(
                pixel == [11, 53, 113, 255] || pixel == [0, 0, 0, 0],
                "({x}, {y}) is {pixel:?}"
            );
        }
        assert_eq!(canvas.pixel(32, 32), Some([11, 53, 113, 255]));
    }

    #[test]
    fn test_no_rectangle_means_transparent() {
        let canvas = render(&document_with(None, &[]), 32, RenderOptions::default()).unwrap();
        assert!(pixels(&canvas).iter().all(|(_, _, pixel)| *pixel == [0, 0, 0, 0]));
    }

    #[test]
    fn test_zero_radius_has_opaque_corners() {
        let canvas = render(&document_with(Some(0.0), &[]), 32, RenderOptions::default()).unwrap();
        for (x, y) in [(0, 0), (31, 0), (0, 31), (31, 31)] {
            assert_eq!(canvas.pixel(x, y), Some([11, 53, 113, 255]), "({x}, {y})");
        }
    }

    #[test]
    fn test_rounded_radius_has_transparent_corners() {
        let canvas = render(&document_with(Some(20.0), &[]), 128, RenderOptions::default()).unwrap();
        for (x, y) in [(0, 0), (127, 0), (0, 127), (127, 127)] {
            assert_eq!(canvas.pixel(x, y), Some([0, 0, 0, 0]), "({x}, {y})");
        }
    }

    #[test]
    fn test_triangle_at_unit_scale() {
        let document = document_with(Some(0.0), &[&[(23.0, 50.0), (47.0, 34.0), (47.0, 66.0)]]);
        let canvas = render(&document, 100, RenderOptions::default()).unwrap();

        let white: Vec<_> = pixels(&canvas)
            .into_iter()
            .filter(|(_, _, pixel)| *pixel == OPAQUE_WHITE)
            .collect();
        assert!(!white.is_empty());
        for (x, y, _) in &white {
            assert!((23..=47).contains(x), "x = {x}");
            assert!((34..=66).contains(y), "y = {y}");
        }

        // Centroid of the triangle.
        assert_eq!(canvas.pixel(39, 50), Some(OPAQUE_WHITE));
    }

    #[test]
    fn test_coordinates_scale_with_size() {
        let square: &[(f32, f32)] = &[(25.0, 25.0), (75.0, 25.0), (75.0, 75.0), (25.0, 75.0)];
        let document = document_with(Some(0.0), &[square]);

        for size in [16, 32, 64, 200] {
            let canvas = render(&document, size, RenderOptions::default()).unwrap();
            let white: Vec<_> = pixels(&canvas)
                .into_iter()
                .filter(|(_, _, pixel)| *pixel == OPAQUE_WHITE)
                .map(|(x, y, _)| (x, y))
                .collect();

            let min = white.iter().map(|(x, _)| *x).min().unwrap();
            let max = white.iter().map(|(x, _)| *x).max().unwrap();
            assert_eq!(min, size / 4, "left edge at {size}px");
            assert_eq!(max, size * 3 / 4 - 1, "right edge at {size}px");
        }
    }

    #[test]
    fn test_view_box_width_sets_scale() {
        let document = Document::new(
            Some(ViewBox {
                min_x: 0.0,
                min_y: 0.0,
                width: 10.0,
                height: 10.0,
            }),
            vec![Element::Polygon(Polygon {
                points: vec![
                    Point::from((0.0, 0.0)),
                    Point::from((5.0, 0.0)),
                    Point::from((5.0, 5.0)),
                    Point::from((0.0, 5.0)),
                ],
            })],
        );

        let canvas = render(&document, 20, RenderOptions::default()).unwrap();
        assert_eq!(canvas.pixel(9, 9), Some(OPAQUE_WHITE));
        assert_eq!(canvas.pixel(10, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_invalid_size() {
        assert!(matches!(
            render(&document_with(None, &[]), 0, RenderOptions::default()),
            Err(RenderError::InvalidSize(0))
        ));
    }

    #[test]
    fn test_render_is_deterministic() {
        let document = document_with(Some(12.5), &[&[(23.0, 50.0), (47.0, 34.0), (47.0, 66.0)]]);
        for options in [RenderOptions::default(), RenderOptions { anti_alias: true }] {
            let first = render(&document, 64, options).unwrap().encode_png().unwrap();
            let second = render(&document, 64, options).unwrap().encode_png().unwrap();
            assert_eq!(first, second, "{options:?}");
        }
    }
}
