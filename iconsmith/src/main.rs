//! `iconsmith`
//!
//! Command line front end: renders SVG icons to PNG iconsets and retouches PNG icons.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use iconsmith::{
    generate_iconset, load_document, render_to_file,
    retouch::{self, RetouchReport, DEFAULT_WHITE_THRESHOLD},
    IconsetConfig, ParseOptions, RenderOptions,
};

/// Renders SVG icons to PNG iconsets and retouches PNG icons.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// What to do.
    #[command(subcommand)]
    command: Command,
}

/// The available operations.
#[derive(Subcommand)]
enum Command {
    /// Render an SVG icon at a single size.
    Render {
        /// The SVG icon.
        svg: PathBuf,
        /// Width and height of the PNG in pixels.
        size: u32,
        /// Where to write the PNG.
        output: PathBuf,
        /// Anti-alias shape edges.
        #[arg(long)]
        anti_alias: bool,
        /// Skip polygons with a malformed point list instead of failing.
        #[arg(long)]
        skip_malformed_polygons: bool,
    },
    /// Render an SVG icon at every size of an iconset.
    Iconset {
        /// The SVG icon.
        svg: PathBuf,
        /// The iconset directory, such as `AppIcon.iconset`.
        out_dir: PathBuf,
        /// A JSON manifest of the icons to render, the macOS set by default.
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Only render icons up to this many pixels wide.
        #[arg(long)]
        max_size: Option<u32>,
        /// Anti-alias shape edges.
        #[arg(long)]
        anti_alias: bool,
    },
    /// Make white and near-white pixels transparent in every PNG of the given directories.
    Transparent {
        /// Directories of PNG files.
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
        /// Pixels with all of red, green and blue at or above this become transparent.
        #[arg(long, default_value_t = DEFAULT_WHITE_THRESHOLD)]
        threshold: u8,
    },
    /// Restore white pixels next to the blue background in every PNG of the given directories.
    RestoreWhite {
        /// Directories of PNG files.
        #[arg(required = true)]
        dirs: Vec<PathBuf>,
    },
    /// Paint the two triangles of the icon white in each given PNG.
    FillTriangles {
        /// PNG files to modify in place.
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let succeeded = match args.command {
        Command::Render {
            svg,
            size,
            output,
            anti_alias,
            skip_malformed_polygons,
        } => render(
            &svg,
            size,
            &output,
            ParseOptions {
                skip_malformed_polygons,
            },
            RenderOptions { anti_alias },
        ),
        Command::Iconset {
            svg,
            out_dir,
            manifest,
            max_size,
            anti_alias,
        } => iconset(&svg, &out_dir, manifest, max_size, anti_alias),
        Command::Transparent { dirs, threshold } => {
            let report: RetouchReport = dirs
                .iter()
                .map(|dir| {
                    retouch::retouch_directory(dir, |image| {
                        retouch::make_white_transparent(image, threshold)
                    })
                })
                .sum();
            println!(
                "Done! Processed {} icons total, {} failed.",
                report.processed, report.failed
            );
            report.is_success()
        }
        Command::RestoreWhite { dirs } => {
            let report: RetouchReport = dirs
                .iter()
                .map(|dir| retouch::retouch_directory(dir, retouch::restore_white))
                .sum();
            println!(
                "Done! Fixed {} icons total, {} failed.",
                report.processed, report.failed
            );
            report.is_success()
        }
        Command::FillTriangles { files } => {
            let mut all_ok = true;
            for file in &files {
                if let Err(err) = retouch::retouch_file(file, retouch::fill_triangles) {
                    log::error!("{err}");
                    all_ok = false;
                }
            }
            all_ok
        }
    };

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Renders a single icon.
///
/// # Returns
/// `true` if the PNG was written.
fn render(
    svg: &Path,
    size: u32,
    output: &Path,
    parse_options: ParseOptions,
    render_options: RenderOptions,
) -> bool {
    let result = load_document(svg, parse_options)
        .and_then(|document| render_to_file(&document, size, output, render_options));

    match result {
        Ok(()) => true,
        Err(err) => {
            log::error!("Error creating {}: {err}", output.display());
            false
        }
    }
}

/// Generates an iconset, printing a summary.
///
/// # Returns
/// `true` if every icon was written.
fn iconset(
    svg: &Path,
    out_dir: &Path,
    manifest: Option<PathBuf>,
    max_size: Option<u32>,
    anti_alias: bool,
) -> bool {
    let mut config = match manifest {
        Some(path) => match IconsetConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("{err}");
                return false;
            }
        },
        None => IconsetConfig::default(),
    };
    if let Some(max_size) = max_size {
        config.icons = config.icons.with_max_size(max_size);
    }
    config.render.anti_alias |= anti_alias;

    match generate_iconset(svg, out_dir, &config) {
        Ok(report) => {
            println!(
                "Done! Created {} of {} icons in {}",
                report.written.len(),
                config.icons.len(),
                out_dir.display()
            );
            report.is_success()
        }
        Err(err) => {
            log::error!("{err}");
            false
        }
    }
}
