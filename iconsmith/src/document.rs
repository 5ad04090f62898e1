//! `document`
//!
//! The subset of SVG that icons are authored in, and the parser that reads it.
//!
//! Only three kinds of element matter: the background `<rect>`, any number of
//! `<polygon>`s and the `<stop>`s of a gradient. Everything else in the markup is
//! ignored. Parsing produces a flat list of [`Element`]s in document order, which
//! the renderer then consumes without ever touching the markup again.

use serde::{Deserialize, Serialize};

use crate::colour::Colour;

/// The SVG namespace. Elements in any other namespace are ignored.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// The viewBox width assumed when the document does not declare a viewBox.
pub const DEFAULT_VIEW_BOX_WIDTH: f32 = 100.0;

/// Errors that can occur while reading the markup into a [`Document`].
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The input is not well-formed XML.
    #[error("document is not well-formed markup: {0}")]
    Markup(#[from] roxmltree::Error),
    /// The viewBox does not hold four numbers, or its width cannot be used as a scale.
    #[error("invalid viewBox {0:?}")]
    InvalidViewBox(String),
    /// A numeric attribute holds something that is not a finite number.
    #[error("attribute `{attribute}` of <{element}> is not a number: {value:?}")]
    InvalidNumber {
        /// The element the attribute belongs to.
        element: &'static str,
        /// The attribute name.
        attribute: &'static str,
        /// The offending value.
        value: String,
    },
    /// A colour attribute is not a hex colour.
    #[error("invalid colour {0:?}, expected #RRGGBB or #RGB")]
    InvalidColour(String),
    /// A polygon's point list could not be read.
    #[error("polygon {index} has a malformed point list: {source}")]
    ShapeGeometry {
        /// Index of the polygon among the document's polygons, from 0.
        index: usize,
        /// What was wrong with the point list.
        source: GeometryError,
    },
}

/// Errors in a polygon's `points` attribute.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    /// A whitespace separated entry is not exactly one `x,y` pair.
    #[error("{0:?} is not an x,y pair")]
    MalformedPair(String),
    /// One half of a pair is not a finite number.
    #[error("{0:?} is not a coordinate")]
    InvalidCoordinate(String),
}

/// Options controlling how tolerant parsing is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Drop polygons with a malformed point list instead of failing the whole document.
    pub skip_malformed_polygons: bool,
}

/// The coordinate space that all shapes are declared in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    /// Left edge.
    pub min_x: f32,
    /// Top edge.
    pub min_y: f32,
    /// Width. [`Document::parse`] only accepts finite, positive widths; values built by hand
    /// are not checked.
    pub width: f32,
    /// Height.
    pub height: f32,
}

/// A point in viewBox units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Horizontal axis.
    pub x: f32,
    /// Vertical axis, +y is down.
    pub y: f32,
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Point { x, y }
    }
}

/// The background rectangle. Only its corner radius is used, it always covers the whole icon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    /// The `rx` attribute, in viewBox units.
    pub corner_radius: f32,
}

/// A filled polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// The vertices in order, in viewBox units.
    pub points: Vec<Point>,
}

/// One stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// The `stop-color`, if the stop declares one.
    pub colour: Option<Colour>,
}

/// A shape declaration, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A `<rect>`.
    Rectangle(Rectangle),
    /// A `<polygon>`.
    Polygon(Polygon),
    /// A gradient `<stop>`.
    GradientStop(GradientStop),
}

/// A parsed icon document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The declared viewBox, if any.
    view_box: Option<ViewBox>,
    /// Every recognised element in document order.
    elements: Vec<Element>,
}

impl Document {
    /// Creates a document from already parsed parts.
    ///
    /// The parts are kept as given. Unlike [`Document::parse`], a viewBox with a zero, negative
    /// or non-finite width is not rejected, and [`Document::scale_for`] will not be finite for it.
    ///
    /// # Arguments
    /// * `view_box`: The coordinate space, `None` for the default 100 unit wide space.
    /// * `elements`: The shapes in document order.
    pub fn new(view_box: Option<ViewBox>, elements: Vec<Element>) -> Self {
        Document { view_box, elements }
    }

    /// Parses icon markup with the default, strict, options.
    ///
    /// # Errors
    /// A [`ParseError`] if the markup is malformed or an attribute the renderer needs is invalid.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Self::parse_with_options(text, ParseOptions::default())
    }

    /// Parses icon markup.
    ///
    /// # Arguments
    /// * `text`: The SVG markup.
    /// * `options`: How tolerant to be of malformed polygons.
    ///
    /// # Returns
    /// The parsed document if successful, otherwise an error.
    ///
    /// # Errors
    /// A [`ParseError`] if the markup is malformed or an attribute the renderer needs is invalid.
    pub fn parse_with_options(text: &str, options: ParseOptions) -> Result<Self, ParseError> {
        let mut xml_options = roxmltree::ParsingOptions::default();
        xml_options.allow_dtd = true;
        let xml = roxmltree::Document::parse_with_options(text, xml_options)?;

        let view_box = xml
            .root_element()
            .attribute("viewBox")
            .map(parse_view_box)
            .transpose()?;

        let mut elements = Vec::new();
        let mut polygon_index = 0;
        for node in xml.descendants().filter(is_svg_element) {
            match node.tag_name().name() {
                "rect" => {
                    let corner_radius = match node.attribute("rx") {
                        Some(value) => parse_number("rect", "rx", value)?,
                        None => 0.0,
                    };
                    elements.push(Element::Rectangle(Rectangle { corner_radius }));
                }
                "polygon" => {
                    let index = polygon_index;
                    polygon_index += 1;

                    match parse_points(node.attribute("points").unwrap_or_default()) {
                        Ok(points) => elements.push(Element::Polygon(Polygon { points })),
                        Err(source) if options.skip_malformed_polygons => {
                            log::warn!("Skipping polygon {index}: {source}");
                        }
                        Err(source) => return Err(ParseError::ShapeGeometry { index, source }),
                    }
                }
                "stop" => {
                    let colour = stop_colour(&node).map(Colour::from_hex).transpose()?;
                    elements.push(Element::GradientStop(GradientStop { colour }));
                }
                _ => {}
            }
        }

        log::debug!(
            "Parsed document with {} elements, viewBox {view_box:?}",
            elements.len()
        );

        Ok(Document { view_box, elements })
    }

    /// Gets the declared viewBox.
    pub fn view_box(&self) -> Option<ViewBox> {
        self.view_box
    }

    /// Gets all elements in document order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Width of the coordinate space, falling back to [`DEFAULT_VIEW_BOX_WIDTH`].
    pub fn view_box_width(&self) -> f32 {
        self.view_box
            .map_or(DEFAULT_VIEW_BOX_WIDTH, |view_box| view_box.width)
    }

    /// The factor that maps viewBox units onto a `size` pixel wide icon.
    ///
    /// # Arguments
    /// * `size`: Width of the target icon in pixels.
    ///
    /// # Returns
    /// `size / viewBox width`, used for both axes.
    #[allow(clippy::cast_precision_loss)]
    pub fn scale_for(&self, size: u32) -> f32 {
        size as f32 / self.view_box_width()
    }

    /// The background rectangle, the first `<rect>` in the document.
    pub fn background(&self) -> Option<&Rectangle> {
        self.elements.iter().find_map(|element| match element {
            Element::Rectangle(rectangle) => Some(rectangle),
            _ => None,
        })
    }

    /// All polygons, in document order.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.elements.iter().filter_map(|element| match element {
            Element::Polygon(polygon) => Some(polygon),
            _ => None,
        })
    }

    /// The first gradient stop in the document.
    pub fn first_stop(&self) -> Option<&GradientStop> {
        self.elements.iter().find_map(|element| match element {
            Element::GradientStop(stop) => Some(stop),
            _ => None,
        })
    }
}

/// Whether a node is an element in the SVG namespace.
/// Elements with no namespace at all are treated as SVG too.
fn is_svg_element(node: &roxmltree::Node<'_, '_>) -> bool {
    node.is_element()
        && node
            .tag_name()
            .namespace()
            .map_or(true, |namespace| namespace == SVG_NAMESPACE)
}

/// Reads the colour of a `<stop>`, from the attribute or, failing that, its inline style.
fn stop_colour<'a>(node: &roxmltree::Node<'a, '_>) -> Option<&'a str> {
    node.attribute("stop-color").or_else(|| {
        node.attribute("style")?
            .split(';')
            .filter_map(|declaration| declaration.split_once(':'))
            .find(|(property, _)| property.trim() == "stop-color")
            .map(|(_, value)| value.trim())
    })
}

/// Parses a `viewBox` attribute.
///
/// # Arguments
/// * `value`: Four numbers separated by whitespace and/or commas.
///
/// # Errors
/// [`ParseError::InvalidViewBox`] if there are not exactly four numbers or the width is not positive.
fn parse_view_box(value: &str) -> Result<ViewBox, ParseError> {
    let invalid = || ParseError::InvalidViewBox(value.to_string());

    let numbers = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|field| !field.is_empty())
        .map(|field| field.parse::<f32>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    let [min_x, min_y, width, height] = numbers[..] else {
        return Err(invalid());
    };
    if !width.is_finite() || width <= 0.0 {
        return Err(invalid());
    }

    Ok(ViewBox {
        min_x,
        min_y,
        width,
        height,
    })
}

/// Parses a finite number attribute.
fn parse_number(
    element: &'static str,
    attribute: &'static str,
    value: &str,
) -> Result<f32, ParseError> {
    match value.trim().parse::<f32>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(ParseError::InvalidNumber {
            element,
            attribute,
            value: value.to_string(),
        }),
    }
}

/// Parses a polygon point list such as `"23,50 47,34 47,66"`.
///
/// Pairs are separated by whitespace, and the two halves of a pair by a single comma.
///
/// # Arguments
/// * `value`: The `points` attribute.
///
/// # Returns
/// The points in order, empty for an empty attribute.
///
/// # Errors
/// A [`GeometryError`] naming the first entry that could not be read.
pub fn parse_points(value: &str) -> Result<Vec<Point>, GeometryError> {
    value
        .split_whitespace()
        .map(|pair| {
            let mut halves = pair.split(',');
            let (Some(x), Some(y), None) = (halves.next(), halves.next(), halves.next()) else {
                return Err(GeometryError::MalformedPair(pair.to_string()));
            };
            Ok(Point {
                x: parse_coordinate(x)?,
                y: parse_coordinate(y)?,
            })
        })
        .collect()
}

/// Parses one half of a point pair.
fn parse_coordinate(value: &str) -> Result<f32, GeometryError> {
    match value.parse::<f32>() {
        Ok(coordinate) if coordinate.is_finite() => Ok(coordinate),
        _ => Err(GeometryError::InvalidCoordinate(value.to_string())),
    }
}
