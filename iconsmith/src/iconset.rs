//! `iconset`
//!
//! The sizes and file names making up an iconset, and generating all of them from one document.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{load_document, render_to_file, ParseOptions, RenderError, RenderOptions};

/// One PNG of an iconset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconsetEntry {
    /// Width and height in pixels.
    pub size: u32,
    /// File name within the iconset directory.
    pub file_name: String,
}

impl IconsetEntry {
    /// Creates an entry.
    pub fn new(size: u32, file_name: impl Into<String>) -> Self {
        IconsetEntry {
            size,
            file_name: file_name.into(),
        }
    }
}

/// An ordered list of icons to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iconset(Vec<IconsetEntry>);

impl Iconset {
    /// Creates an iconset from a list of entries.
    pub fn new(entries: Vec<IconsetEntry>) -> Self {
        Iconset(entries)
    }

    /// The icons `iconutil` expects in a macOS `AppIcon.iconset`.
    ///
    /// Each nominal size also has an `@2x` variant at twice the pixel size, so several
    /// pixel sizes appear twice under different names.
    pub fn macos() -> Self {
        [
            (16, "icon_16x16.png"),
            (32, "icon_16x16@2x.png"),
            (32, "icon_32x32.png"),
            (64, "icon_32x32@2x.png"),
            (128, "icon_128x128.png"),
            (256, "icon_128x128@2x.png"),
            (256, "icon_256x256.png"),
            (512, "icon_256x256@2x.png"),
            (512, "icon_512x512.png"),
            (1024, "icon_512x512@2x.png"),
        ]
        .into_iter()
        .map(|(size, file_name)| IconsetEntry::new(size, file_name))
        .collect()
    }

    /// Keeps only the icons no larger than `max_size` pixels.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.0.retain(|entry| entry.size <= max_size);
        self
    }

    /// Gets the entries in order.
    pub fn entries(&self) -> &[IconsetEntry] {
        &self.0
    }

    /// Number of icons.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no icons.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Iconset {
    fn default() -> Self {
        Iconset::macos()
    }
}

impl FromIterator<IconsetEntry> for Iconset {
    fn from_iter<T: IntoIterator<Item = IconsetEntry>>(iter: T) -> Self {
        Iconset(iter.into_iter().collect())
    }
}

/// Errors that can occur when loading an iconset manifest.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The manifest file could not be read.
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        /// The manifest path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The manifest is not valid JSON for an [`IconsetConfig`].
    #[error("invalid manifest: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Everything needed to generate an iconset, loadable from a JSON manifest.
///
/// Every field is optional in the manifest:
///
/// ```json
/// {
///     "icons": [{ "size": 16, "file_name": "icon_16x16.png" }],
///     "render": { "anti_alias": false },
///     "parse": { "skip_malformed_polygons": false }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconsetConfig {
    /// The icons to render, the macOS set by default.
    pub icons: Iconset,
    /// Rasterization options.
    pub render: RenderOptions,
    /// Parsing options.
    pub parse: ParseOptions,
}

impl IconsetConfig {
    /// Parses a JSON manifest.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] if the JSON does not describe a config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON manifest from a file.
    ///
    /// # Errors
    /// [`ConfigError::Read`] if the file cannot be read, [`ConfigError::Invalid`] if it is not a config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// An icon that could not be generated.
#[derive(Debug)]
pub struct IconFailure {
    /// The icon that failed.
    pub entry: IconsetEntry,
    /// Why it failed.
    pub error: RenderError,
}

/// The outcome of generating an iconset.
#[derive(Debug, Default)]
pub struct IconsetReport {
    /// Paths of the PNGs that were written, in manifest order.
    pub written: Vec<PathBuf>,
    /// Icons that failed, in manifest order.
    pub failures: Vec<IconFailure>,
}

impl IconsetReport {
    /// Whether every icon was written.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renders every icon of an iconset from one SVG document.
///
/// An icon that fails is logged and recorded in the report, and the remaining icons are
/// still rendered. Existing files are overwritten.
///
/// # Arguments
/// * `svg_path`: The icon document.
/// * `out_dir`: The iconset directory, created if it does not exist.
/// * `config`: The icons to render and how.
///
/// # Returns
/// A report of the written files and the failures.
///
/// # Errors
/// A [`RenderError`] if the document cannot be loaded or the directory cannot be created,
/// in which case nothing is written.
pub fn generate_iconset(
    svg_path: &Path,
    out_dir: &Path,
    config: &IconsetConfig,
) -> Result<IconsetReport, RenderError> {
    let document = load_document(svg_path, config.parse)?;
    fs::create_dir_all(out_dir).map_err(|source| RenderError::CreateDirectory {
        path: out_dir.to_path_buf(),
        source,
    })?;

    log::info!(
        "Converting {} to {} icon sizes",
        svg_path.display(),
        config.icons.len()
    );

    let mut report = IconsetReport::default();
    for entry in config.icons.entries() {
        let png_path = out_dir.join(&entry.file_name);
        match render_to_file(&document, entry.size, &png_path, config.render) {
            Ok(()) => report.written.push(png_path),
            Err(error) => {
                log::error!("Error creating {}: {error}", entry.file_name);
                report.failures.push(IconFailure {
                    entry: entry.clone(),
                    error,
                });
            }
        }
    }

    Ok(report)
}
