//! Doppler-shift gesture detection against an emitted ultrasonic tone.
//!
//! The speaker plays a steady tone and a hand moving near the device
//! reflects it with a small frequency shift. Classification is a threshold
//! on the difference between the received dominant frequency and the
//! emitted one: a positive shift means motion toward the device.

use std::fmt;

use crate::error::AnalysisError;

/// Tone emitted for motion detection, just above hearing range.
pub const DEFAULT_TONE_HZ: f32 = 21_000.0;

/// Shifts smaller than this count as stationary.
pub const DEFAULT_TOLERANCE_HZ: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    None,
    Toward,
    Away,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "no motion"),
            Self::Toward => write!(f, "toward device"),
            Self::Away => write!(f, "away from device"),
        }
    }
}

/// One frame's classification and the numbers behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureReading {
    pub gesture: Gesture,
    /// Received dominant frequency in Hz.
    pub dominant_hz: f32,
    /// Magnitude of the dominant bin in dB.
    pub dominant_db: f32,
    /// Dominant minus emitted frequency.
    pub shift_hz: f32,
    /// Dominant minus the previous frame's dominant; zero on the first frame.
    pub drift_hz: f32,
}

/// Full-spectrum argmax: the loudest bin and its magnitude.
/// Ties keep the earlier bin.
pub fn dominant_frequency(spectrum_db: &[f32]) -> Option<(usize, f32)> {
    if spectrum_db.is_empty() {
        return None;
    }
    let mut best_bin = 0;
    for (bin, &magnitude) in spectrum_db.iter().enumerate().skip(1) {
        if magnitude > spectrum_db[best_bin] {
            best_bin = bin;
        }
    }
    Some((best_bin, spectrum_db[best_bin]))
}

/// Threshold classifier over successive dominant-frequency readings.
#[derive(Debug, Clone)]
pub struct DopplerDetector {
    emitted_hz: f32,
    tolerance_hz: f32,
    previous_dominant_hz: Option<f32>,
}

impl DopplerDetector {
    /// Both parameters must be finite and positive.
    pub fn new(emitted_hz: f32, tolerance_hz: f32) -> Result<Self, AnalysisError> {
        if !emitted_hz.is_finite() || emitted_hz <= 0.0 {
            return Err(AnalysisError::InvalidToneFrequency {
                frequency_hz: emitted_hz,
            });
        }
        if !tolerance_hz.is_finite() || tolerance_hz <= 0.0 {
            return Err(AnalysisError::InvalidTolerance { tolerance_hz });
        }

        Ok(Self {
            emitted_hz,
            tolerance_hz,
            previous_dominant_hz: None,
        })
    }

    pub fn emitted_hz(&self) -> f32 {
        self.emitted_hz
    }

    pub fn tolerance_hz(&self) -> f32 {
        self.tolerance_hz
    }

    /// Dominant frequency seen on the previous frame, once there was one.
    pub fn previous_dominant_hz(&self) -> Option<f32> {
        self.previous_dominant_hz
    }

    /// Classify one spectrum frame. Returns `None` only for an empty
    /// spectrum; every classified frame updates the dominant-frequency
    /// tracker.
    pub fn classify(&mut self, spectrum_db: &[f32], resolution_hz: f32) -> Option<GestureReading> {
        let (bin, dominant_db) = dominant_frequency(spectrum_db)?;
        let dominant_hz = bin as f32 * resolution_hz;
        let shift_hz = dominant_hz - self.emitted_hz;

        let gesture = if shift_hz.abs() < self.tolerance_hz {
            Gesture::None
        } else if shift_hz > 0.0 {
            Gesture::Toward
        } else {
            Gesture::Away
        };

        let drift_hz = self
            .previous_dominant_hz
            .map_or(0.0, |previous| dominant_hz - previous);
        self.previous_dominant_hz = Some(dominant_hz);

        Some(GestureReading {
            gesture,
            dominant_hz,
            dominant_db,
            shift_hz,
            drift_hz,
        })
    }

    /// Forget the previous frame's dominant frequency.
    pub fn reset(&mut self) {
        self.previous_dominant_hz = None;
    }
}
