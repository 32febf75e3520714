//! Per-frame orchestration: spectrum, level, peaks, gesture.

use crate::analysis::{self, PeakPair, SpectralPeak};
use crate::config::{AnalyzerConfig, GestureConfig};
use crate::doppler::{DopplerDetector, GestureReading};
use crate::error::AnalysisError;
use crate::spectrum::SpectrumProcessor;

/// Everything derived from one window of samples.
#[derive(Debug, Clone)]
pub struct FrameAnalysis {
    /// Half-length magnitude spectrum in dB.
    pub spectrum_db: Vec<f32>,
    /// RMS level of the time-domain window in dB.
    pub level_db: f32,
    /// The two loudest batch maxima of this frame.
    pub peaks: PeakPair,
    /// The previous frame's pair, for observing peak movement.
    pub previous_peaks: PeakPair,
    /// Doppler classification; `None` only when the spectrum was empty.
    pub gesture: Option<GestureReading>,
}

impl FrameAnalysis {
    /// "level ... | peak 1 ... | peak 2 ..." for terminal frame lines.
    pub fn peaks_line(&self) -> String {
        fn peak_text(peak: Option<SpectralPeak>) -> String {
            peak.map_or_else(|| "-".to_string(), |p| p.to_string())
        }

        format!(
            "level {:7.1} dB | peak 1 {} | peak 2 {}",
            self.level_db,
            peak_text(self.peaks.first),
            peak_text(self.peaks.second),
        )
    }

    /// Dominant frequency, shift, drift, and gesture label; "-" for a frame
    /// without a reading.
    pub fn gesture_line(&self) -> String {
        match &self.gesture {
            Some(reading) => format!(
                "{:.1} Hz (shift {:+.1} Hz, drift {:+.1} Hz) {}",
                reading.dominant_hz, reading.shift_hz, reading.drift_hz, reading.gesture
            ),
            None => "-".to_string(),
        }
    }
}

/// Runs the full analysis chain over successive windows, carrying the
/// cross-frame trackers (previous peaks, previous dominant frequency).
pub struct FrameAnalyzer {
    spectrum: SpectrumProcessor,
    doppler: DopplerDetector,
    batch_size: usize,
    previous_peaks: PeakPair,
}

impl FrameAnalyzer {
    /// Validate the parameter set against the capture sample rate and plan
    /// the FFT. The gesture tone must sit below the Nyquist limit, otherwise
    /// the classifier could never observe it.
    pub fn new(
        analyzer: &AnalyzerConfig,
        gesture: &GestureConfig,
        sample_rate: f32,
    ) -> Result<Self, AnalysisError> {
        if analyzer.batch_size == 0 {
            return Err(AnalysisError::InvalidBatchSize);
        }

        let nyquist_hz = sample_rate / 2.0;
        if gesture.tone_hz >= nyquist_hz {
            return Err(AnalysisError::ToneAboveNyquist {
                frequency_hz: gesture.tone_hz,
                nyquist_hz,
            });
        }

        Ok(Self {
            spectrum: SpectrumProcessor::new(analyzer.buffer_size, sample_rate)?,
            doppler: DopplerDetector::new(gesture.tone_hz, gesture.tolerance_hz)?,
            batch_size: analyzer.batch_size,
            previous_peaks: PeakPair::default(),
        })
    }

    pub fn buffer_size(&self) -> usize {
        self.spectrum.buffer_size()
    }

    pub fn spectrum_len(&self) -> usize {
        self.spectrum.spectrum_len()
    }

    pub fn resolution_hz(&self) -> f32 {
        self.spectrum.resolution_hz()
    }

    pub fn sample_rate(&self) -> f32 {
        self.spectrum.sample_rate()
    }

    /// Analyze one window of exactly `buffer_size()` samples.
    pub fn analyze(&mut self, time_data: &[f32]) -> Result<FrameAnalysis, AnalysisError> {
        let mut spectrum_db = Vec::with_capacity(self.spectrum.spectrum_len());
        self.spectrum.process(time_data, &mut spectrum_db)?;

        let level_db = analysis::level_db(time_data);
        let resolution_hz = self.spectrum.resolution_hz();
        let peaks = analysis::find_top_peaks(&spectrum_db, self.batch_size, resolution_hz);
        let gesture = self.doppler.classify(&spectrum_db, resolution_hz);
        let previous_peaks = std::mem::replace(&mut self.previous_peaks, peaks);

        Ok(FrameAnalysis {
            spectrum_db,
            level_db,
            peaks,
            previous_peaks,
            gesture,
        })
    }

    /// Clear the cross-frame trackers.
    pub fn reset(&mut self) {
        self.previous_peaks = PeakPair::default();
        self.doppler.reset();
    }
}
