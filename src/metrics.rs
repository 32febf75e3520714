//! Session metrics collection
//!
//! Frame-latency percentiles via an HDR histogram plus atomic counters for
//! frames, gestures, and files. Cheap enough to stay on by default.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;

use crate::config::MetricsConfig;
use crate::doppler::Gesture;
use crate::utils::format_duration;

#[derive(Debug)]
pub struct SessionMetrics {
    frame_latency_ms: Histogram<u64>,
    frames_analyzed: AtomicU64,
    gestures_toward: AtomicU64,
    gestures_away: AtomicU64,
    gestures_none: AtomicU64,
    files_processed: AtomicU64,
    started: Instant,
}

/// Point-in-time snapshot of the session counters.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub frame_p50_ms: u64,
    pub frame_p95_ms: u64,
    pub frame_p99_ms: u64,
    pub mean_frame_ms: f64,
    pub frames_analyzed: u64,
    pub gestures_toward: u64,
    pub gestures_away: u64,
    pub gestures_none: u64,
    pub files_processed: u64,
    pub uptime_secs: f64,
}

impl SessionMetrics {
    /// Build from a validated [`MetricsConfig`].
    pub fn new(config: &MetricsConfig) -> Self {
        let frame_latency_ms = Histogram::new_with_bounds(
            1,
            config.histogram_max_ms.max(2),
            config.histogram_precision,
        )
        .expect("Histogram creation should succeed");

        Self {
            frame_latency_ms,
            frames_analyzed: AtomicU64::new(0),
            gestures_toward: AtomicU64::new(0),
            gestures_away: AtomicU64::new(0),
            gestures_none: AtomicU64::new(0),
            files_processed: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Record one analyzed frame and its gesture outcome.
    pub fn record_frame(&mut self, elapsed: Duration, gesture: Option<Gesture>) {
        let ms = elapsed.as_millis() as u64;
        if let Err(e) = self.frame_latency_ms.record(ms.max(1)) {
            tracing::warn!("Failed to record frame latency: {}", e);
        }

        self.frames_analyzed.fetch_add(1, Ordering::Relaxed);

        match gesture {
            Some(Gesture::Toward) => {
                self.gestures_toward.fetch_add(1, Ordering::Relaxed);
            }
            Some(Gesture::Away) => {
                self.gestures_away.fetch_add(1, Ordering::Relaxed);
            }
            Some(Gesture::None) => {
                self.gestures_none.fetch_add(1, Ordering::Relaxed);
            }
            None => {}
        }
    }

    /// Count one fully analyzed file.
    pub fn record_file(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frame_p50_ms: self.frame_latency_ms.value_at_quantile(0.5),
            frame_p95_ms: self.frame_latency_ms.value_at_quantile(0.95),
            frame_p99_ms: self.frame_latency_ms.value_at_quantile(0.99),
            mean_frame_ms: self.frame_latency_ms.mean(),
            frames_analyzed: self.frames_analyzed.load(Ordering::Relaxed),
            gestures_toward: self.gestures_toward.load(Ordering::Relaxed),
            gestures_away: self.gestures_away.load(Ordering::Relaxed),
            gestures_none: self.gestures_none.load(Ordering::Relaxed),
            files_processed: self.files_processed.load(Ordering::Relaxed),
            uptime_secs: self.started.elapsed().as_secs_f64(),
        }
    }

    /// Reset every counter and the histogram.
    pub fn reset(&mut self) {
        self.frame_latency_ms.clear();
        self.frames_analyzed.store(0, Ordering::Relaxed);
        self.gestures_toward.store(0, Ordering::Relaxed);
        self.gestures_away.store(0, Ordering::Relaxed);
        self.gestures_none.store(0, Ordering::Relaxed);
        self.files_processed.store(0, Ordering::Relaxed);
        self.started = Instant::now();
    }
}

impl MetricsSummary {
    /// Multi-line human-readable rendering for end-of-session output.
    pub fn render(&self) -> String {
        format!(
            "session metrics:\n  frames analyzed  {}\n  frame latency    p50 {} ms, p95 {} ms, p99 {} ms (mean {:.1} ms)\n  gestures         toward {}, away {}, none {}\n  files processed  {}\n  uptime           {}",
            self.frames_analyzed,
            self.frame_p50_ms,
            self.frame_p95_ms,
            self.frame_p99_ms,
            self.mean_frame_ms,
            self.gestures_toward,
            self.gestures_away,
            self.gestures_none,
            self.files_processed,
            format_duration(self.uptime_secs as f32),
        )
    }
}
