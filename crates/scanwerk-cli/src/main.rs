// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — command-line document detection and cropping.
//
// Entry point. Initialises logging, loads the scan configuration and runs one
// subcommand against an image file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use scanwerk_core::config::ScanConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::types::{CornerPoints, Point2D};
use scanwerk_document::{CoordinateHint, CropRequest, DocumentScanner, resolve_path};
use tracing::error;

#[derive(Parser)]
#[command(name = "scanwerk")]
#[command(about = "Find a document in a photo and straighten it")]
#[command(version)]
struct Cli {
    /// JSON scan configuration; unspecified fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the document outline and print its corners.
    Detect {
        /// Path or file:// URI of the photo.
        image: String,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Rectify the photo to the given corners.
    Crop(CropArgs),

    /// Detect and rectify in one step.
    Scan {
        /// Path or file:// URI of the photo.
        image: String,

        /// Directory for the output JPEG (defaults to the photo's directory).
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct CropArgs {
    /// Path or file:// URI of the photo.
    image: String,

    /// Top-left corner as `x,y`.
    #[arg(long, value_parser = parse_corner, allow_hyphen_values = true)]
    top_left: Point2D,

    /// Top-right corner as `x,y`.
    #[arg(long, value_parser = parse_corner, allow_hyphen_values = true)]
    top_right: Point2D,

    /// Bottom-right corner as `x,y`.
    #[arg(long, value_parser = parse_corner, allow_hyphen_values = true)]
    bottom_right: Point2D,

    /// Bottom-left corner as `x,y`.
    #[arg(long, value_parser = parse_corner, allow_hyphen_values = true)]
    bottom_left: Point2D,

    /// Coordinate space of the corners.
    #[arg(long, value_enum, default_value_t = SpaceArg::Original)]
    space: SpaceArg,

    /// Directory for the output JPEG (defaults to the photo's directory).
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SpaceArg {
    Original,
    Working,
    Infer,
}

impl From<SpaceArg> for CoordinateHint {
    fn from(value: SpaceArg) -> Self {
        match value {
            SpaceArg::Original => CoordinateHint::Original,
            SpaceArg::Working => CoordinateHint::Working,
            SpaceArg::Infer => CoordinateHint::Infer,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Command failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };

    match cli.command {
        Commands::Detect { image, json } => {
            let report = DocumentScanner::new(config)?.find_document(&image)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if let Some(c) = report.corners {
                println!("top-left      {:.1},{:.1}", c.top_left.x, c.top_left.y);
                println!("top-right     {:.1},{:.1}", c.top_right.x, c.top_right.y);
                println!("bottom-right  {:.1},{:.1}", c.bottom_right.x, c.bottom_right.y);
                println!("bottom-left   {:.1},{:.1}", c.bottom_left.x, c.bottom_left.y);
            } else {
                println!("no document found");
            }
        }

        Commands::Crop(args) => {
            let request = CropRequest::new(
                CornerPoints {
                    top_left: args.top_left,
                    top_right: args.top_right,
                    bottom_right: args.bottom_right,
                    bottom_left: args.bottom_left,
                },
                args.space.into(),
            );
            let out_dir = output_dir(args.out_dir, &args.image)?;
            let output = DocumentScanner::new(config)?.crop(&args.image, &request, out_dir)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Scan { image, out_dir } => {
            let out_dir = output_dir(out_dir, &image)?;
            let scan = DocumentScanner::new(config)?.scan(&image, out_dir)?;
            println!("{}", serde_json::to_string_pretty(&scan)?);
        }
    }

    Ok(())
}

/// Parse an `x,y` corner argument.
fn parse_corner(value: &str) -> Result<Point2D> {
    let malformed = || ScanwerkError::Input(format!("corner `{value}` is not of the form x,y"));

    let (x, y) = value.split_once(',').ok_or_else(malformed)?;
    let x: f64 = x.trim().parse().map_err(|_| malformed())?;
    let y: f64 = y.trim().parse().map_err(|_| malformed())?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(malformed());
    }
    Ok(Point2D::new(x, y))
}

/// `--out-dir` if given, otherwise the directory holding the photo.
fn output_dir(explicit: Option<PathBuf>, image: &str) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let photo = resolve_path(image)?;
    Ok(photo
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}
