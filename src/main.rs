use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use boxcount::{BoxCounter, DetectorConfig};

#[derive(Parser)]
#[command(name = "boxcount")]
#[command(about = "Count square boxes of a known size in an image")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// JSON detector configuration (missing fields keep their defaults)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Exclusive lower bound on width/height
    #[arg(long)]
    aspect_min: Option<f64>,

    /// Exclusive upper bound on width/height
    #[arg(long)]
    aspect_max: Option<f64>,

    /// Exclusive lower bound on width*height in pixels
    #[arg(long)]
    area_min: Option<u64>,

    /// Exclusive upper bound on width*height in pixels
    #[arg(long)]
    area_max: Option<u64>,

    /// Write the annotated image to this path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Save debug outputs to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

impl Cli {
    fn detector_config(&self) -> anyhow::Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::from_json_file(path)?,
            None => DetectorConfig::default(),
        };

        let t = &mut config.thresholds;
        if let Some(v) = self.aspect_min {
            t.aspect_min = v;
        }
        if let Some(v) = self.aspect_max {
            t.aspect_max = v;
        }
        if let Some(v) = self.area_min {
            t.area_min = v;
        }
        if let Some(v) = self.area_max {
            t.area_max = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.detector_config()?;

    let img = boxcount::source::load_image(&args.image_path)?;
    tracing::info!(path = %args.image_path.display(), width = img.width(), height = img.height(), "image loaded");

    let mut counter = BoxCounter::new(config)?;
    if let Some(debug_dir) = args.debug_out.clone() {
        counter = counter.with_debug(debug_dir)?;
    }

    let result = counter.count(&img)?;

    if let Some(output) = &args.output {
        result
            .annotated
            .save(output)
            .with_context(|| format!("failed to save annotated image to {}", output.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.report())?);
        return Ok(());
    }

    println!("\n=== Box Count Results ===");
    println!("Total boxes: {}", result.count);

    if !result.boxes.is_empty() && args.verbose {
        println!("\nDetected boxes:");
        for (i, rect) in result.boxes.iter().enumerate() {
            println!(
                "  Box {} at ({}, {}) - {}x{}, area {}",
                i + 1,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                rect.area()
            );
        }
    }

    Ok(())
}
