//! Background analysis worker: drain, window, analyze, sleep out the tick.

use std::sync::mpsc::{channel, Receiver};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::capture::{SampleSource, SlidingWindow};
use crate::pipeline::{FrameAnalysis, FrameAnalyzer};

/// One analyzed frame, sent to the consuming thread.
#[derive(Debug)]
pub struct FrameReport {
    /// Monotonic frame counter, starting at zero.
    pub seq: u64,
    pub analysis: FrameAnalysis,
    /// Time spent draining the source and analyzing this frame.
    pub elapsed: Duration,
}

/// Spawn a thread that drains `source` into a sliding window and analyzes
/// it `fps` times per second.
///
/// Ticks before the window has seen a full buffer of real samples produce
/// no report. A tick that overruns is not made up later; the next one
/// simply starts immediately. The worker exits when the receiver is
/// dropped.
pub fn spawn_analysis_worker<S>(
    mut source: S,
    mut analyzer: FrameAnalyzer,
    fps: f64,
) -> (Receiver<FrameReport>, JoinHandle<()>)
where
    S: SampleSource + Send + 'static,
{
    let (tx, rx) = channel::<FrameReport>();

    let handle = thread::spawn(move || {
        let tick = Duration::from_secs_f64(1.0 / fps);
        let mut window = SlidingWindow::new(analyzer.buffer_size());
        let mut drained = Vec::new();
        let mut seq = 0u64;
        let mut skipped = 0u64;

        tracing::info!(
            fps,
            buffer_size = analyzer.buffer_size(),
            "analysis worker started"
        );

        loop {
            let tick_start = Instant::now();

            drained.clear();
            source.drain_into(&mut drained);
            window.push(&drained);

            if window.is_warm() {
                if skipped > 0 {
                    tracing::debug!(skipped, "window warm, starting analysis");
                    skipped = 0;
                }

                match analyzer.analyze(window.samples()) {
                    Ok(analysis) => {
                        let report = FrameReport {
                            seq,
                            analysis,
                            elapsed: tick_start.elapsed(),
                        };
                        seq += 1;
                        if tx.send(report).is_err() {
                            tracing::debug!("report receiver dropped, worker shutting down");
                            break;
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "frame analysis failed"),
                }
            } else {
                skipped += 1;
            }

            if let Some(remaining) = tick.checked_sub(tick_start.elapsed()) {
                thread::sleep(remaining);
            }
        }

        tracing::info!(frames = seq, "analysis worker exiting");
    });

    (rx, handle)
}
