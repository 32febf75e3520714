//! Terminal front ends for the live capture modes.

use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::capture;
use crate::config::AppConfig;
use crate::error::WorkerError;
use crate::metrics::SessionMetrics;
use crate::pipeline::FrameAnalyzer;
#[cfg(feature = "audio_playback")]
use crate::tone::ToneEmitter;
use crate::worker::{self, FrameReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Peaks and level per frame; no tone, no gesture output.
    Spectrum,
    /// Peaks plus the Doppler classification; emits the reference tone.
    Doppler,
}

/// Capture the microphone and print the two loudest peaks per frame.
pub fn run_live(config: &AppConfig, duration: Option<f64>) -> Result<()> {
    run_capture(config, duration, Mode::Spectrum)
}

/// Emit the reference tone (when an output device exists) and print the
/// Doppler classification with every frame.
pub fn run_doppler(config: &AppConfig, duration: Option<f64>) -> Result<()> {
    run_capture(config, duration, Mode::Doppler)
}

fn run_capture(config: &AppConfig, duration: Option<f64>, mode: Mode) -> Result<()> {
    let (capture, source) = capture::start_capture(&config.capture, config.analyzer.buffer_size)
        .context("Failed to start microphone capture")?;
    let sample_rate = capture.sample_rate() as f32;

    let analyzer = FrameAnalyzer::new(&config.analyzer, &config.gesture, sample_rate)
        .context("Failed to build frame analyzer")?;

    println!(
        "capturing '{}' at {} Hz ({} samples/window, {:.2} Hz/bin, {:.1} fps)",
        capture.device_name(),
        capture.sample_rate(),
        config.analyzer.buffer_size,
        analyzer.resolution_hz(),
        config.analyzer.fps,
    );

    #[cfg(feature = "audio_playback")]
    let mut emitter = ToneEmitter::new();
    #[cfg(feature = "audio_playback")]
    if mode == Mode::Doppler {
        if config.playback.enabled {
            match emitter.start(config.gesture.tone_hz, config.playback.amplitude) {
                Ok(()) => println!("emitting {:.0} Hz reference tone", config.gesture.tone_hz),
                Err(e) => {
                    tracing::warn!(error = %e, "tone playback unavailable, continuing listen-only")
                }
            }
        } else {
            tracing::info!("tone playback disabled, listening only");
        }
    }
    #[cfg(not(feature = "audio_playback"))]
    if mode == Mode::Doppler {
        tracing::warn!("built without audio_playback, listening only");
    }

    let (reports, worker_handle) =
        worker::spawn_analysis_worker(source, analyzer, config.analyzer.fps);

    let mut metrics = config
        .metrics
        .enabled
        .then(|| SessionMetrics::new(&config.metrics));
    let deadline = duration.map(|secs| Instant::now() + Duration::from_secs_f64(secs));
    let mut disconnected = false;

    loop {
        let report = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                match reports.recv_timeout(deadline - now) {
                    Ok(report) => report,
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
            None => match reports.recv() {
                Ok(report) => report,
                Err(_) => {
                    disconnected = true;
                    break;
                }
            },
        };

        print_report(&report, mode);
        if let Some(metrics) = metrics.as_mut() {
            metrics.record_frame(report.elapsed, report.analysis.gesture.map(|r| r.gesture));
        }
    }

    drop(reports);
    drop(capture);
    #[cfg(feature = "audio_playback")]
    emitter.stop();

    if disconnected {
        // the worker already ended on its own; harvest a panic if there was one
        if let Err(panic) = worker_handle.join() {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(WorkerError::Panicked { reason }.into());
        }
        return Err(WorkerError::ChannelDisconnected.into());
    }
    // normal shutdown: the worker notices the dropped receiver on its next
    // frame and exits; no need to block on it here
    drop(worker_handle);

    if let Some(metrics) = &metrics {
        println!("{}", metrics.summary().render());
    }

    Ok(())
}

fn print_report(report: &FrameReport, mode: Mode) {
    match mode {
        Mode::Spectrum => println!("[{:5}] {}", report.seq, report.analysis.peaks_line()),
        Mode::Doppler => println!(
            "[{:5}] {} | {}",
            report.seq,
            report.analysis.peaks_line(),
            report.analysis.gesture_line()
        ),
    }
}
