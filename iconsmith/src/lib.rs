//! `iconsmith`
//!
//! Renders a hand-authored SVG icon into the PNG sizes of a macOS iconset, and retouches
//! existing PNG icon assets.

pub mod colour;
pub mod document;
pub mod iconset;
pub mod raster;
pub mod render;
pub mod retouch;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub use colour::Colour;
pub use document::{Document, ParseError, ParseOptions};
pub use iconset::{generate_iconset, Iconset, IconsetConfig, IconsetEntry, IconsetReport};
pub use raster::Canvas;
pub use render::{render, RenderOptions};

/// Errors that can occur when rendering an icon to a file.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The source document could not be parsed.
    #[error("failed to parse icon document: {0}")]
    DocumentParse(#[from] ParseError),
    /// A canvas of this size cannot be created.
    #[error("cannot render an icon {0} pixels wide")]
    InvalidSize(u32),
    /// Failed to read the source document.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The document path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// Failed to create an output directory.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        /// The directory path.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// Failed to encode or write the PNG.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The output path.
        path: PathBuf,
        /// The underlying error.
        source: image::ImageError,
    },
}

/// Reads and parses an icon document.
///
/// # Arguments
/// * `path`: The SVG file.
/// * `options`: Parsing options.
///
/// # Returns
/// The parsed document if successful, otherwise a [`RenderError`].
///
/// # Errors
/// [`RenderError::Read`] if the file cannot be read, [`RenderError::DocumentParse`] if it cannot be parsed.
pub fn load_document(path: &Path, options: ParseOptions) -> Result<Document, RenderError> {
    let text = fs::read_to_string(path).map_err(|source| RenderError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Document::parse_with_options(&text, options)?)
}

/// Renders a document at one size and writes it to a PNG, replacing any existing file.
///
/// # Arguments
/// * `document`: The icon to render.
/// * `size`: Width and height in pixels.
/// * `png_path`: Where to write the PNG.
/// * `options`: Rasterization options.
///
/// # Returns
/// `Ok(())` if the PNG was written, otherwise a [`RenderError`].
///
/// # Errors
/// [`RenderError::InvalidSize`] for an unusable size, [`RenderError::Write`] if the file cannot be written.
pub fn render_to_file(
    document: &Document,
    size: u32,
    png_path: &Path,
    options: RenderOptions,
) -> Result<(), RenderError> {
    let canvas = render(document, size, options)?;
    canvas
        .save_png(png_path)
        .map_err(|source| RenderError::Write {
            path: png_path.to_path_buf(),
            source,
        })?;

    log::info!("Created {} ({size}x{size})", png_path.display());
    Ok(())
}

/// Reads an SVG icon and renders it at one size to a PNG file, with default options.
///
/// # Arguments
/// * `svg_path`: The icon document.
/// * `size`: Width and height in pixels.
/// * `png_path`: Where to write the PNG.
///
/// # Errors
/// Any [`RenderError`] from reading, parsing, rendering or writing.
pub fn render_file(svg_path: &Path, size: u32, png_path: &Path) -> Result<(), RenderError> {
    let document = load_document(svg_path, ParseOptions::default())?;
    render_to_file(&document, size, png_path, RenderOptions::default())
}
