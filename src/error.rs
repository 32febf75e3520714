//! Error types for audiolab
//!
//! Structured error hierarchy: one top-level error wrapping per-domain
//! enums, so callers can match on the failure class without string
//! inspection.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AudiolabError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from audio device handling and WAV decoding
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load WAV file '{}': {source}", path.display())]
    LoadFailed {
        path: PathBuf,
        source: hound::Error,
    },

    #[error("Invalid sample rate: {rate} Hz (supported: 8000-192000 Hz)")]
    InvalidSampleRate { rate: u32 },

    #[error("Unsupported channel count: {channels} (only mono and stereo)")]
    UnsupportedChannels { channels: u16 },

    #[error("Unsupported sample format: {bits}-bit {format} (only 16-bit integer PCM)")]
    UnsupportedSampleFormat { bits: u16, format: &'static str },

    #[error("WAV file '{}' contains no samples", path.display())]
    EmptyFile { path: PathBuf },

    #[error("Audio too short: need {needed} samples, got {actual}")]
    BufferTooShort { needed: usize, actual: usize },

    #[error("No default audio input device available")]
    NoInputDevice,

    #[error("Audio output unavailable: {reason}")]
    PlaybackInitFailed { reason: String },

    #[error("Audio input stream error: {0}")]
    StreamError(String),
}

/// Errors from spectral analysis and gesture classification
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid buffer size: {size} (must be a power of two, at least 64)")]
    InvalidBufferSize { size: usize },

    #[error("Window length mismatch: expected {expected} samples, got {actual}")]
    WindowSizeMismatch { expected: usize, actual: usize },

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Invalid tone frequency: {frequency_hz} Hz (must be positive)")]
    InvalidToneFrequency { frequency_hz: f32 },

    #[error("Invalid shift tolerance: {tolerance_hz} Hz (must be positive)")]
    InvalidTolerance { tolerance_hz: f32 },

    #[error("Tone at {frequency_hz} Hz is at or above the Nyquist limit ({nyquist_hz} Hz)")]
    ToneAboveNyquist { frequency_hz: f32, nyquist_hz: f32 },

    #[error("FFT processing failed: {reason}")]
    FftFailed { reason: String },
}

/// Errors from configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from '{}': {reason}", path.display())]
    LoadFailed { path: PathBuf, reason: String },

    #[error("Failed to save config to '{}': {reason}", path.display())]
    SaveFailed { path: PathBuf, reason: String },

    #[error("Failed to parse config: {reason}")]
    ParseFailed { reason: String },

    #[error("Failed to serialize config: {reason}")]
    SerializationFailed { reason: String },

    #[error("Invalid configuration: {reason}")]
    ValidationFailed { reason: String },
}

/// Errors from the background analysis worker
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Analysis worker panicked: {reason}")]
    Panicked { reason: String },

    #[error("Analysis worker disconnected unexpectedly")]
    ChannelDisconnected,
}

impl AudiolabError {
    /// Whether the session can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Audio(AudioError::BufferTooShort { .. })
                | Self::Audio(AudioError::StreamError(_))
                | Self::Audio(AudioError::PlaybackInitFailed { .. })
                | Self::Config(_)
        )
    }

    /// One-line message suitable for terminal display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Audio(e) => format!("Audio problem: {e}"),
            Self::Analysis(e) => format!("Analysis problem: {e}"),
            Self::Config(e) => format!("Configuration problem: {e}"),
            Self::Worker(e) => format!("Worker problem: {e}"),
            Self::Io(e) => format!("File system problem: {e}"),
        }
    }
}

impl AnalysisError {
    /// Suggested fix for errors a user can act on.
    pub fn recovery_hint(&self) -> Option<&'static str> {
        match self {
            Self::InvalidBufferSize { .. } => {
                Some("Use a power-of-two buffer size such as 4096 or 16384")
            }
            Self::InvalidBatchSize => Some("Set batch_size to at least 1"),
            Self::ToneAboveNyquist { .. } => {
                Some("Lower the tone frequency or capture at a higher sample rate")
            }
            _ => None,
        }
    }
}

/// Convenience Result alias using AudiolabError
pub type Result<T, E = AudiolabError> = std::result::Result<T, E>;
