//! `retouch`
//!
//! Pixel-level fixes for PNG icons that have already been exported.

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, RgbaImage};

use crate::{colour::WHITE, raster::Canvas};

/// The default threshold for [`make_white_transparent`].
pub const DEFAULT_WHITE_THRESHOLD: u8 = 240;

/// Opaque white.
const OPAQUE_WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Errors that can occur when retouching a file.
#[derive(Debug, thiserror::Error)]
pub enum RetouchError {
    /// The image could not be opened, decoded, encoded or written.
    #[error("failed to process {}: {source}", path.display())]
    Image {
        /// The image path.
        path: PathBuf,
        /// The underlying error.
        source: image::ImageError,
    },
}

/// Makes white and near-white pixels fully transparent.
///
/// # Arguments
/// * `image`: The image to modify in place.
/// * `threshold`: Pixels whose red, green and blue are all at least this become `(255, 255, 255, 0)`.
///
/// # Returns
/// The number of pixels made transparent.
pub fn make_white_transparent(image: &mut RgbaImage, threshold: u8) -> usize {
    let mut changed = 0;
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if r >= threshold && g >= threshold && b >= threshold {
            *pixel = Rgba([255, 255, 255, 0]);
            changed += 1;
        }
    }
    changed
}

/// Whether a pixel looks like the icon's blue background.
fn is_background_blue(Rgba([r, g, b, a]): Rgba<u8>) -> bool {
    a > 200 && b > 100 && r < 100 && g < 100
}

/// Whether a pixel is a white that has lost some or all of its opacity.
fn is_faded_white(Rgba([r, g, b, a]): Rgba<u8>) -> bool {
    a < u8::MAX && r >= 200 && g >= 200 && b >= 200
}

/// Restores white shapes that were wrongly made transparent.
///
/// A faded white pixel is made opaque white if any of its eight neighbours is background blue,
/// which keeps the white outside the icon's rounded corners transparent. Neighbours are read
/// from the image as it was before this call, so restored pixels do not spread further.
///
/// # Arguments
/// * `image`: The image to modify in place.
///
/// # Returns
/// The number of pixels restored.
pub fn restore_white(image: &mut RgbaImage) -> usize {
    let original = image.clone();
    let (width, height) = original.dimensions();

    let next_to_background = |x: u32, y: u32| {
        (-1_i64..=1)
            .flat_map(|dy| (-1_i64..=1).map(move |dx| (dx, dy)))
            .filter(|&offset| offset != (0, 0))
            .filter_map(|(dx, dy)| {
                let nx = u32::try_from(i64::from(x) + dx).ok()?;
                let ny = u32::try_from(i64::from(y) + dy).ok()?;
                (nx < width && ny < height).then(|| *original.get_pixel(nx, ny))
            })
            .any(is_background_blue)
    };

    let mut restored = 0;
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if is_faded_white(*pixel) && next_to_background(x, y) {
            *pixel = OPAQUE_WHITE;
            restored += 1;
        }
    }
    restored
}

/// The two play-button style triangles of the icon, in pixels.
///
/// # Arguments
/// * `width`: Image width.
/// * `height`: Image height.
///
/// # Returns
/// The left-pointing and right-pointing triangles.
#[allow(clippy::cast_precision_loss)]
pub fn triangles(width: u32, height: u32) -> [[(f32, f32); 3]; 2] {
    let cx = (width / 2) as f32;
    let cy = (height / 2) as f32;

    [
        [
            (cx * 0.23, cy),
            (cx * 0.77, cy * 0.34),
            (cx * 0.77, cy * 1.66),
        ],
        [
            (cx * 1.77, cy),
            (cx * 1.23, cy * 0.34),
            (cx * 1.23, cy * 1.66),
        ],
    ]
}

/// Paints the icon's two triangles solid white.
///
/// # Arguments
/// * `image`: The image to modify in place.
///
/// # Returns
/// The number of pixels inside the triangles.
pub fn fill_triangles(image: &mut RgbaImage) -> usize {
    let (width, height) = image.dimensions();
    let Some(mut mask) = Canvas::new(width, height) else {
        return 0;
    };
    for triangle in triangles(width, height) {
        mask.fill_polygon(triangle, WHITE);
    }

    let mut filled = 0;
    for (x, y, pixel) in image.enumerate_pixels_mut() {
        if mask.pixel(x, y).is_some_and(|[_, _, _, alpha]| alpha > 0) {
            *pixel = OPAQUE_WHITE;
            filled += 1;
        }
    }
    filled
}

/// Opens a PNG, applies an edit and writes it back over the original file.
///
/// # Arguments
/// * `path`: The PNG to edit.
/// * `edit`: The edit to apply, returning the number of pixels it changed.
///
/// # Returns
/// The number of pixels changed.
///
/// # Errors
/// [`RetouchError::Image`] if the file cannot be read or written.
pub fn retouch_file<F>(path: &Path, edit: F) -> Result<usize, RetouchError>
where
    F: FnOnce(&mut RgbaImage) -> usize,
{
    let image_error = |source| RetouchError::Image {
        path: path.to_path_buf(),
        source,
    };

    let mut image = image::open(path).map_err(image_error)?.to_rgba8();
    let changed = edit(&mut image);
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(image_error)?;

    log::info!("Processed {} ({changed} pixels changed)", path.display());
    Ok(changed)
}

/// The outcome of retouching the PNG files of one or more directories.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetouchReport {
    /// Files edited and written back.
    pub processed: usize,
    /// Files that could not be edited, plus directories that could not be read.
    pub failed: usize,
}

impl RetouchReport {
    /// Whether nothing failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl std::ops::Add for RetouchReport {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        RetouchReport {
            processed: self.processed + other.processed,
            failed: self.failed + other.failed,
        }
    }
}

impl std::iter::Sum for RetouchReport {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(RetouchReport::default(), |total, report| total + report)
    }
}

/// Applies an edit to every `.png` file in a directory, in name order.
///
/// Files that fail are logged and skipped. A directory that cannot be read counts as one failure.
///
/// # Arguments
/// * `dir`: The directory to process. Subdirectories are not entered.
/// * `edit`: The edit to apply to each image.
///
/// # Returns
/// How many files were processed and how many failed.
pub fn retouch_directory<F>(dir: &Path, mut edit: F) -> RetouchReport
where
    F: FnMut(&mut RgbaImage) -> usize,
{
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            log::error!("Directory not found: {} ({err})", dir.display());
            return RetouchReport {
                processed: 0,
                failed: 1,
            };
        }
    };

    let mut png_files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "png"))
        .collect();
    png_files.sort();

    log::info!("Processing {} PNG files in {}", png_files.len(), dir.display());

    let mut report = RetouchReport::default();
    for png_file in &png_files {
        match retouch_file(png_file, &mut edit) {
            Ok(_) => report.processed += 1,
            Err(err) => {
                log::error!("{err}");
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: Rgba<u8> = Rgba([11, 53, 113, 255]);
    const CLEAR: Rgba<u8> = Rgba([255, 255, 255, 0]);

    #[test]
    fn test_make_white_transparent() {
        let mut image = RgbaImage::from_pixel(3, 1, BLUE);
        image.put_pixel(0, 0, Rgba([250, 245, 241, 255]));
        image.put_pixel(1, 0, Rgba([250, 245, 239, 255]));

        assert_eq!(make_white_transparent(&mut image, DEFAULT_WHITE_THRESHOLD), 1);
        assert_eq!(*image.get_pixel(0, 0), CLEAR);
        assert_eq!(*image.get_pixel(1, 0), Rgba([250, 245, 239, 255]), "below threshold");
        assert_eq!(*image.get_pixel(2, 0), BLUE);
    }

    #[test]
    fn test_make_white_transparent_threshold() {
        let mut image = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 255]));
        assert_eq!(make_white_transparent(&mut image, 201), 0);
        assert_eq!(make_white_transparent(&mut image, 200), 1);
        assert_eq!(*image.get_pixel(0, 0), CLEAR);
    }

    #[test]
    fn test_restore_white_next_to_background() {
        let mut image = RgbaImage::from_pixel(3, 3, BLUE);
        image.put_pixel(1, 1, CLEAR);

        assert_eq!(restore_white(&mut image), 1);
        assert_eq!(*image.get_pixel(1, 1), OPAQUE_WHITE);
    }

    #[test]
    fn test_restore_white_diagonal_neighbour() {
        let mut image = RgbaImage::from_pixel(2, 2, CLEAR);
        image.put_pixel(1, 1, BLUE);

        assert_eq!(restore_white(&mut image), 3);
        assert_eq!(*image.get_pixel(0, 0), OPAQUE_WHITE);
    }

    #[test]
    fn test_restore_white_ignores_isolated_pixels() {
        let mut image = RgbaImage::from_pixel(5, 1, CLEAR);
        image.put_pixel(0, 0, BLUE);

        // Only the pixel touching the blue one is restored, the change does not cascade.
        assert_eq!(restore_white(&mut image), 1);
        assert_eq!(*image.get_pixel(1, 0), OPAQUE_WHITE);
        assert_eq!(*image.get_pixel(2, 0), CLEAR);
    }

    #[test]
    fn test_restore_white_only_touches_faded_white() {
        let mut image = RgbaImage::from_pixel(3, 1, BLUE);
        // Dark and transparent, not a faded white.
        image.put_pixel(1, 0, Rgba([0, 0, 0, 0]));
        assert_eq!(restore_white(&mut image), 0);

        // Semi-transparent white next to a not-quite-opaque blue.
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([11, 53, 113, 200]));
        image.put_pixel(1, 0, Rgba([230, 230, 230, 128]));
        assert_eq!(restore_white(&mut image), 0);
    }

    #[test]
    fn test_triangles() {
        let [left, right] = triangles(512, 512);
        assert_eq!(left[0], (256.0 * 0.23, 256.0));
        assert_eq!(right[0], (256.0 * 1.77, 256.0));
        assert_eq!(left[1], (256.0 * 0.77, 256.0 * 0.34));
        assert_eq!(right[2], (256.0 * 1.23, 256.0 * 1.66));
    }

    #[test]
    fn test_fill_triangles() {
        let mut image = RgbaImage::from_pixel(100, 100, BLUE);
        let filled = fill_triangles(&mut image);

        assert!(filled > 0);
        // Inside the left triangle, between the triangles, and inside the right triangle.
        assert_eq!(*image.get_pixel(30, 50), OPAQUE_WHITE);
        assert_eq!(*image.get_pixel(50, 50), BLUE);
        assert_eq!(*image.get_pixel(70, 50), OPAQUE_WHITE);
        assert_eq!(*image.get_pixel(0, 0), BLUE);

        let white = image.pixels().filter(|pixel| **pixel == OPAQUE_WHITE).count();
        assert_eq!(white, filled);
    }

    #[test]
    fn test_retouch_directory() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png"] {
            RgbaImage::from_pixel(2, 2, OPAQUE_WHITE)
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut seen = Vec::new();
        let report = retouch_directory(dir.path(), |image| {
            seen.push(image.dimensions());
            make_white_transparent(image, DEFAULT_WHITE_THRESHOLD)
        });

        assert_eq!(
            report,
            RetouchReport {
                processed: 2,
                failed: 1
            },
            "the broken file is skipped and counted"
        );
        assert!(!report.is_success());
        assert_eq!(seen.len(), 2);

        let reopened = image::open(dir.path().join("a.png")).unwrap().to_rgba8();
        assert!(reopened.pixels().all(|pixel| *pixel == CLEAR));
    }

    #[test]
    fn test_retouch_empty_directory_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let report = retouch_directory(dir.path(), |_| 0);

        assert_eq!(report, RetouchReport::default());
        assert!(report.is_success(), "nothing to do is not a failure");
    }

    #[test]
    fn test_retouch_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let report = retouch_directory(&missing, |_| 0);
        assert_eq!(
            report,
            RetouchReport {
                processed: 0,
                failed: 1
            }
        );

        let total: RetouchReport = [report, retouch_directory(dir.path(), |_| 0)]
            .into_iter()
            .sum();
        assert!(!total.is_success(), "a missing directory fails the whole run");
    }
}
