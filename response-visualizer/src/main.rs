use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn, LevelFilter};
use rayon::prelude::*;
use response_common::{ResponseData, RESPONSE_FILE};
use std::path::PathBuf;
use std::time::Instant;

mod encode;
mod render;
mod scene;
mod timeline;

use encode::{rgba_to_yuv420, VideoWriter};
use render::{parse_color, Colors, Renderer};
use scene::{CurvePath, SCENE_HEIGHT, SCENE_WIDTH};
use timeline::Timeline;

/// Command-line arguments for the visualizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input response file (.json) written by the step response engine
    #[arg(short, long, default_value = RESPONSE_FILE)]
    input: PathBuf,

    /// Output video file path (.mp4)
    #[arg(short, long, default_value = "step_response.mp4")]
    output: PathBuf,

    /// Width of the output video in pixels (height follows the 5:3 scene)
    #[arg(long, default_value_t = 1000)]
    width: u32,

    /// Frames per second for the output video
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Background color - a color name or hex code
    #[arg(long, default_value = "#111111")]
    bg_color: String,

    /// Axis and tick color
    #[arg(long, default_value = "#dddddd")]
    axis_color: String,

    /// Response curve and tracker color
    #[arg(long, default_value = "#e6a700")]
    curve_color: String,

    /// Number of frames rendered in parallel before encoding
    #[arg(long, default_value_t = 10)]
    chunk_size: usize,

    /// Also save the final frame as a PNG image
    #[arg(long)]
    still: Option<PathBuf>,
}

/// Output size for a requested width, both dimensions rounded down to even.
fn output_dimensions(width: u32) -> Result<(u32, u32)> {
    let width = width - width % 2;
    let height = (width as f64 * SCENE_HEIGHT / SCENE_WIDTH).round() as u32;
    let height = height - height % 2;
    if width == 0 || height == 0 {
        anyhow::bail!("Output width {} is too small.", width);
    }
    Ok((width, height))
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    Builder::from_default_env()
        .filter(None, LevelFilter::Info)
        .init();

    run_with_args(args)
}

fn run_with_args(args: Args) -> Result<()> {
    info!("Starting Response Visualizer...");
    info!("Input file: {}", args.input.display());
    info!("Output video: {}", args.output.display());

    if args.fps == 0 {
        anyhow::bail!("--fps must be positive.");
    }
    let chunk_size = if args.chunk_size == 0 {
        warn!("Chunk size 0 is invalid, rendering one frame at a time.");
        1
    } else {
        args.chunk_size
    };
    let (width, height) = output_dimensions(args.width)?;
    info!("Video dimensions: {}x{} @ {} fps", width, height, args.fps);

    // --- Load Response Data ---
    let data = ResponseData::load(&args.input)?;
    info!(
        "Loaded {} points up to t = {:.2} s (peak {:.3} at {:.1}% of the window)",
        data.points.len(),
        data.end_time(),
        data.peak_value,
        data.peak_time_percentage * 100.0
    );
    let curve = CurvePath::from_data(&data.points)?;
    debug!("Curve arc length: {:.1} scene units", curve.total_length());

    // --- Set up Colors ---
    let colors = Colors::new(
        parse_color(&args.bg_color)?,
        parse_color(&args.axis_color)?,
        parse_color(&args.curve_color)?,
    );

    let renderer = Renderer::new(width, height, colors, curve)?;
    let timeline = Timeline::new(data.peak_time_percentage, data.peak_value);
    let total_frames = timeline.frame_count(args.fps);
    info!(
        "Animation length: {:.2} s ({} frames)",
        timeline.total_duration(),
        total_frames
    );

    // --- Render and Encode ---
    let mut writer = VideoWriter::new(width, height, args.fps)?;
    let progress_bar = ProgressBar::new(total_frames as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) [{eta}]")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let start_time = Instant::now();
    let fps = args.fps as f64;
    let mut last_frame = None;
    let frame_indices: Vec<usize> = (0..total_frames).collect();

    for chunk in frame_indices.chunks(chunk_size) {
        // Frames within a chunk render in parallel; encoding stays in order
        let mut frames: Vec<_> = chunk
            .par_iter()
            .map(|&i| renderer.draw_frame(&timeline.state_at(i as f64 / fps)))
            .collect();
        let yuv_frames: Vec<Vec<u8>> = frames.par_iter().map(rgba_to_yuv420).collect();

        for yuv in yuv_frames {
            writer.encode_yuv(yuv)?;
            progress_bar.inc(1);
        }
        last_frame = frames.pop();
    }
    progress_bar.finish_with_message(format!("Encoded {} frames", writer.frame_count()));

    let description = format!(
        "Second-order step response - peak {:.3} at {:.1}%",
        data.peak_value,
        data.peak_time_percentage * 100.0
    );
    let video_bytes = writer.finish(&args.output, &description)?;

    if let Some(still_path) = &args.still {
        match &last_frame {
            Some(frame) => {
                frame
                    .save(still_path)
                    .with_context(|| format!("Failed to save still frame to {}", still_path.display()))?;
                info!("Final frame saved to {}", still_path.display());
            }
            None => warn!("No frames were rendered; skipping still image."),
        }
    }

    let duration = start_time.elapsed();
    info!(
        "Video generation completed in {:.2?} ({:.1} frames per second)",
        duration,
        total_frames as f64 / duration.as_secs_f64()
    );
    info!("Output saved to: {} ({} KB)", args.output.display(), video_bytes / 1024);

    Ok(())
}
