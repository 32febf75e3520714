//! Offline analysis: the live per-frame pipeline walked over WAV files.
//!
//! Files are selected by glob pattern and analyzed independently; one bad
//! file is logged and skipped without stopping the batch.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use crate::analysis::SpectralPeak;
use crate::config::AppConfig;
use crate::doppler::Gesture;
use crate::error::AudioError;
use crate::metrics::SessionMetrics;
use crate::pipeline::FrameAnalyzer;
use crate::utils::format_duration;
use crate::wav::WavReader;

#[derive(Debug)]
pub struct OfflineArgs {
    /// Glob pattern selecting the WAV files to analyze.
    pub input_pattern: String,
    /// Print every analyzed frame instead of only the per-file summary.
    pub per_frame: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GestureTally {
    pub toward: u64,
    pub away: u64,
    pub none: u64,
}

/// What one file's frame walk produced.
#[derive(Debug)]
pub struct FileSummary {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub duration_secs: f32,
    pub frames: u64,
    pub max_level_db: f32,
    pub loudest_peak: Option<SpectralPeak>,
    pub gestures: GestureTally,
}

/// Analyze every file matching the pattern.
pub fn run_offline_analysis(args: &OfflineArgs, config: &AppConfig) -> Result<()> {
    tracing::info!(pattern = %args.input_pattern, "starting offline analysis");

    let paths: Vec<PathBuf> = glob::glob(&args.input_pattern)
        .context("Failed to read glob pattern")?
        .filter_map(|entry| entry.ok())
        .collect();

    if paths.is_empty() {
        tracing::warn!(pattern = %args.input_pattern, "no files matched");
        return Ok(());
    }

    tracing::info!(files = paths.len(), "found files to analyze");

    let mut metrics = config
        .metrics
        .enabled
        .then(|| SessionMetrics::new(&config.metrics));

    for path in &paths {
        match analyze_file(path, config, args.per_frame, metrics.as_mut()) {
            Ok(summary) => print_summary(&summary),
            Err(e) => tracing::error!(path = %path.display(), "analysis failed: {:#}", e),
        }
    }

    if let Some(metrics) = &metrics {
        println!("{}", metrics.summary().render());
    }

    Ok(())
}

/// Walk one file in live-sized hops and run the frame analyzer over each
/// window. The hop is the number of samples the live path would capture
/// between ticks.
pub fn analyze_file(
    path: &Path,
    config: &AppConfig,
    per_frame: bool,
    mut metrics: Option<&mut SessionMetrics>,
) -> Result<FileSummary> {
    let wav = WavReader::from_file(path)?;

    let buffer_size = config.analyzer.buffer_size;
    if wav.samples.len() < buffer_size {
        return Err(AudioError::BufferTooShort {
            needed: buffer_size,
            actual: wav.samples.len(),
        }
        .into());
    }

    let mut analyzer = FrameAnalyzer::new(&config.analyzer, &config.gesture, wav.sample_rate as f32)
        .context("Failed to build frame analyzer")?;

    let hop = ((wav.sample_rate as f64 / config.analyzer.fps).round() as usize).max(1);

    let mut summary = FileSummary {
        path: path.to_path_buf(),
        sample_rate: wav.sample_rate,
        duration_secs: wav.duration_secs(),
        frames: 0,
        max_level_db: f32::NEG_INFINITY,
        loudest_peak: None,
        gestures: GestureTally::default(),
    };

    let mut start = 0usize;
    while start + buffer_size <= wav.samples.len() {
        let window = &wav.samples[start..start + buffer_size];
        let frame_start = Instant::now();
        let analysis = analyzer.analyze(window).context("Frame analysis failed")?;

        summary.frames += 1;
        summary.max_level_db = summary.max_level_db.max(analysis.level_db);

        if let Some(peak) = analysis.peaks.first {
            let louder = summary
                .loudest_peak
                .map_or(true, |best| peak.magnitude_db > best.magnitude_db);
            if louder {
                summary.loudest_peak = Some(peak);
            }
        }

        let gesture = analysis.gesture.map(|reading| reading.gesture);
        match gesture {
            Some(Gesture::Toward) => summary.gestures.toward += 1,
            Some(Gesture::Away) => summary.gestures.away += 1,
            Some(Gesture::None) => summary.gestures.none += 1,
            None => {}
        }

        if let Some(metrics) = metrics.as_deref_mut() {
            metrics.record_frame(frame_start.elapsed(), gesture);
        }

        if per_frame {
            let timestamp = start as f32 / wav.sample_rate as f32;
            println!(
                "  [{}] {} | {}",
                format_duration(timestamp),
                analysis.peaks_line(),
                analysis.gesture_line()
            );
        }

        start += hop;
    }

    if let Some(metrics) = metrics.as_deref_mut() {
        metrics.record_file();
    }

    tracing::info!(
        path = %path.display(),
        frames = summary.frames,
        max_level_db = summary.max_level_db,
        "file analyzed"
    );

    Ok(summary)
}

fn print_summary(summary: &FileSummary) {
    println!("== {} ==", summary.path.display());
    println!(
        "  {} Hz, {}, {} frames",
        summary.sample_rate,
        format_duration(summary.duration_secs),
        summary.frames
    );
    println!("  max level   {:.1} dB", summary.max_level_db);
    match &summary.loudest_peak {
        Some(peak) => println!("  loudest     {peak}"),
        None => println!("  loudest     -"),
    }
    println!(
        "  gestures    toward {}, away {}, none {}",
        summary.gestures.toward, summary.gestures.away, summary.gestures.none
    );
}
