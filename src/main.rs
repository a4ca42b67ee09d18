use std::path::PathBuf;

use anyhow::{Context, Result};
use canvas_normalize::batch::{plan_jobs, run_batch};
use canvas_normalize::config::NormalizeConfig;
use canvas_normalize::{Color, Strategy};
use clap::Parser;

/// Normalize images onto a fixed-size JPEG canvas:
/// - letterbox: fit the canvas width, center vertically, pad with background
/// - cover-crop: fill the whole canvas, crop the centered overflow
#[derive(Parser, Debug)]
#[command(name = "canvasnorm")]
#[command(about = "🖼️ Normalize images onto a fixed-size JPEG canvas")]
#[command(long_about = "Decode JPEG, PNG or GIF images, place each on a fixed-size canvas and write it as JPEG.
Files are processed concurrently; each input becomes <stem>.jpg in the output directory.")]
struct Args {
    /// Input image files
    #[arg(required = true, help = "Images to normalize (JPEG, PNG or GIF, detected from content)")]
    inputs: Vec<PathBuf>,

    /// Output directory, created if missing
    #[arg(short, long, default_value = "images")]
    out_dir: PathBuf,

    /// Canvas width in pixels
    #[arg(long, env = "CANVASNORM_WIDTH", default_value_t = 800)]
    width: u32,

    /// Canvas height in pixels
    #[arg(long, env = "CANVASNORM_HEIGHT", default_value_t = 1200)]
    height: u32,

    /// JPEG quality
    #[arg(short, long, env = "CANVASNORM_QUALITY", default_value = "70",
          help = "JPEG quality: 1-100, or a preset: low (40), medium (70), high (85), max (95)")]
    quality: String,

    /// Canvas strategy
    #[arg(short, long, value_enum, env = "CANVASNORM_STRATEGY", default_value_t = Strategy::Letterbox)]
    strategy: Strategy,

    /// Background color
    #[arg(short, long, env = "CANVASNORM_BACKGROUND", default_value = "#000000",
          help = "Background color as #rgb, #rrggbb or #rrggbbaa")]
    background: Color,

    /// Largest accepted input file
    #[arg(long, default_value = "64M", help = "Largest accepted input file: bytes, or with K/M/G suffix")]
    max_input: String,

    /// Largest accepted decoded RGBA size
    #[arg(long, default_value = "256M", help = "Largest accepted decoded RGBA size: bytes, or with K/M/G suffix")]
    max_decoded: String,

    /// Print one JSON report per input on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let quality = parse_quality(&args.quality)?;

    let mut config = NormalizeConfig::new(args.width, args.height, quality, args.strategy, args.background);
    config.max_input_bytes = usize::try_from(parse_size(&args.max_input)?)
        .context("Input size limit does not fit in memory on this platform")?;
    config.max_decoded_bytes = parse_size(&args.max_decoded)?;
    config.validate().map_err(anyhow::Error::msg)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create output directory '{}'", args.out_dir.display()))?;

    let jobs = plan_jobs(&args.inputs, &args.out_dir);
    log::info!(
        "normalizing {} image(s) onto {}x{} ({})",
        jobs.len(),
        config.target_width,
        config.target_height,
        config.strategy.as_str()
    );

    let reports = run_batch(jobs, &config).await;
    let mut failed = 0;
    for report in &reports {
        match &report.result {
            Ok(path) => log::info!("{} -> {}", report.input.display(), path.display()),
            Err(e) => {
                failed += 1;
                log::error!("{}: {:#}", report.input.display(), e);
            }
        }
        if args.json {
            println!("{}", report.to_json());
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} image(s) failed", failed, reports.len());
    }
    Ok(())
}

/// Parse a quality number or preset name into a JPEG quality value
fn parse_quality(quality: &str) -> Result<u8> {
    if let Ok(value) = quality.parse::<u8>() {
        return Ok(value);
    }
    match quality.to_lowercase().as_str() {
        "low" => Ok(40),
        "medium" => Ok(70),
        "high" => Ok(85),
        "max" => Ok(95),
        _ => Err(anyhow::anyhow!("Invalid quality: {}. Use 1-100 or: low, medium, high, max", quality)),
    }
}

/// Parse a size string like "512K", "64M", "1G" into bytes
fn parse_size(size: &str) -> Result<u64> {
    if let Ok(bytes) = size.parse::<u64>() {
        return Ok(bytes);
    }

    let len = size.len();
    if len < 2 {
        return Err(anyhow::anyhow!("Invalid size format: {}", size));
    }

    let (num_str, unit) = size.split_at(len - 1);
    let num: u64 = num_str.parse().map_err(|_| anyhow::anyhow!("Invalid number in size: {}", num_str))?;

    let factor: u64 = match unit.to_ascii_uppercase().as_str() {
        "K" => 1 << 10,
        "M" => 1 << 20,
        "G" => 1 << 30,
        _ => return Err(anyhow::anyhow!("Invalid size unit: {}. Use 'K', 'M' or 'G'", unit)),
    };
    num.checked_mul(factor)
        .ok_or_else(|| anyhow::anyhow!("Size too large: {}", size))
}
