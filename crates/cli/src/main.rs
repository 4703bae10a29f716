use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use shadowtouch_core::pipeline::infrastructure::latest_frame_worker::LatestFrameWorker;
use shadowtouch_core::pipeline::pipeline_logger::StageTimingLogger;
use shadowtouch_core::pipeline::touch_pipeline::{FrameReport, TouchPipeline};
use shadowtouch_core::shared::config::{ShadowPolarity, TouchConfig};
use shadowtouch_core::shared::frame::Frame;
use shadowtouch_core::shared::region::Region;
use shadowtouch_core::touch::infrastructure::rect_key_layout::{RectKeyLayout, QWERTY_LABELS};
use shadowtouch_core::video::domain::frame_source::{FrameSource, SequenceInfo};
use shadowtouch_core::video::infrastructure::image_sequence_reader::{
    load_frame, ImageSequenceReader,
};

const MAX_GRID_KEYS: u32 = 1024;

/// Detects fingertip touches on a projected keyboard from a recorded
/// image sequence.
#[derive(Parser)]
#[command(name = "shadowtouch")]
struct Cli {
    /// Directory of frames (png/jpg/bmp), replayed in lexical order.
    frames_dir: PathBuf,

    /// Empty-scene image used as the shadow reference (default: first frame).
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Image with the hand centered in view, used to calibrate skin color.
    #[arg(long)]
    calibrate: Option<PathBuf>,

    /// Frame rate used to timestamp the sequence.
    #[arg(long, default_value = "30")]
    fps: f64,

    /// JSON file with pipeline settings; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keyboard grid spanning the whole frame, as COLSxROWS.
    #[arg(long, default_value = "10x4", value_parser = parse_key_grid)]
    key_grid: (u32, u32),

    /// Reject touches whose shadow tip lies on a different key.
    #[arg(long)]
    require_shadow_match: bool,

    /// Count only pixels that got darker than the reference as shadow.
    #[arg(long)]
    darker_only: bool,

    /// Process on a worker thread that skips frames it cannot keep up with.
    #[arg(long)]
    drop_stale: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if !cli.frames_dir.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames_dir.display()).into());
    }

    let config = load_config(&cli)?;
    let mut reader = ImageSequenceReader::new(cli.fps)?;
    let info = reader.open(&cli.frames_dir)?;

    let (cols, rows) = cli.key_grid;
    let labels: &[&str] = if cols * rows == QWERTY_LABELS.len() as u32 {
        &QWERTY_LABELS
    } else {
        &[]
    };
    let layout = RectKeyLayout::grid(
        Region::new(0, 0, info.width as i32, info.height as i32),
        cols,
        rows,
        labels,
    );
    let mut pipeline = TouchPipeline::from_config(
        &config,
        Box::new(layout),
        Box::new(StageTimingLogger::default()),
    )?;
    pipeline.set_expected_frames(Some(info.total_frames));

    if let Some(path) = &cli.calibrate {
        let frame = load_frame(path, 0, Duration::ZERO)?;
        if !pipeline.calibrate(&frame) {
            log::warn!("Calibration image {} held no usable pixels", path.display());
        }
    }
    if let Some(path) = &cli.reference {
        let frame = load_frame(path, 0, Duration::ZERO)?;
        check_size(&frame, &info, path)?;
        pipeline.capture_reference(&frame);
        log::info!("Shadow reference captured from {}", path.display());
    }

    let pipeline = if cli.drop_stale {
        run_worker(pipeline, &mut reader)?
    } else {
        run_sync(pipeline, &mut reader)?
    };
    reader.close();
    pipeline.logger().summary();
    Ok(())
}

fn run_sync(
    mut pipeline: TouchPipeline,
    reader: &mut ImageSequenceReader,
) -> Result<TouchPipeline, Box<dyn std::error::Error>> {
    let mut out = io::stdout().lock();
    for frame in reader.frames() {
        let frame = frame?;
        if !pipeline.has_reference() {
            log::info!("Shadow reference captured from frame #{}", frame.index());
            pipeline.capture_reference(&frame);
        }
        print_event(&mut out, &pipeline.process(&frame))?;
    }
    Ok(pipeline)
}

fn run_worker(
    pipeline: TouchPipeline,
    reader: &mut ImageSequenceReader,
) -> Result<TouchPipeline, Box<dyn std::error::Error>> {
    let mut out = io::stdout().lock();
    let mut needs_reference = !pipeline.has_reference();
    let worker = LatestFrameWorker::spawn(pipeline);

    for frame in reader.frames() {
        let frame = frame?;
        if needs_reference {
            log::info!("Shadow reference captured from frame #{}", frame.index());
            worker.capture_reference(frame.clone())?;
            needs_reference = false;
        }
        worker.submit(frame)?;
        for report in worker.results().try_iter() {
            print_event(&mut out, &report)?;
        }
    }

    let dropped = worker.dropped_frames();
    let (pipeline, results) = worker.shutdown()?;
    for report in results.try_iter() {
        print_event(&mut out, &report)?;
    }
    if dropped > 0 {
        log::info!("Skipped {dropped} stale frames");
    }
    Ok(pipeline)
}

fn print_event(out: &mut impl Write, report: &FrameReport) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(event) = &report.event {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<TouchConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {e}", path.display()))?;
            serde_json::from_str::<TouchConfig>(&text)
                .map_err(|e| format!("Invalid config {}: {e}", path.display()))?
        }
        None => TouchConfig::default(),
    };
    if cli.require_shadow_match {
        config.validator.require_shadow_validation = true;
    }
    if cli.darker_only {
        config.shadow.polarity = ShadowPolarity::DarkerOnly;
    }
    config.validate()?;
    Ok(config)
}

fn check_size(frame: &Frame, info: &SequenceInfo, path: &Path) -> Result<(), String> {
    if (frame.width(), frame.height()) != (info.width, info.height) {
        return Err(format!(
            "Reference {} is {}x{}, frames are {}x{}",
            path.display(),
            frame.width(),
            frame.height(),
            info.width,
            info.height
        ));
    }
    Ok(())
}

fn parse_key_grid(s: &str) -> Result<(u32, u32), String> {
    let (cols, rows) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected COLSxROWS, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("grid size must be a positive integer, got '{v}'"))
    };
    let (cols, rows) = (parse(cols)?, parse(rows)?);
    match cols.checked_mul(rows) {
        Some(keys) if keys <= MAX_GRID_KEYS => Ok((cols, rows)),
        _ => Err(format!("grid {cols}x{rows} exceeds {MAX_GRID_KEYS} keys")),
    }
}
