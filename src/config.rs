//! Application configuration with TOML persistence
//!
//! Sectioned config mirroring the analysis pipeline: capture, analyzer,
//! gesture, playback, metrics. Every field has a default, so a partial
//! file (or no file at all) still yields a working setup.

use crate::doppler::{DEFAULT_TOLERANCE_HZ, DEFAULT_TONE_HZ};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Built-in analysis window length in samples.
pub const DEFAULT_BUFFER_SIZE: usize = 16_384;

/// Built-in batch width for the peak search.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Built-in analysis rate in frames per second.
pub const DEFAULT_FPS: f64 = 5.0;

/// Microphone capture settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Ring buffer capacity as a multiple of the analysis window.
    pub ring_multiple: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { ring_multiple: 4 }
    }
}

/// Per-frame analysis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Window length in samples; a power of two between 64 and 262144.
    pub buffer_size: usize,
    /// Bins per batch in the local-maximum peak search.
    pub batch_size: usize,
    /// Analysis frames per second.
    pub fps: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            batch_size: DEFAULT_BATCH_SIZE,
            fps: DEFAULT_FPS,
        }
    }
}

/// Doppler gesture classifier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Emitted reference tone in Hz.
    pub tone_hz: f32,
    /// Shifts smaller than this count as no motion, in Hz.
    pub tolerance_hz: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tone_hz: DEFAULT_TONE_HZ,
            tolerance_hz: DEFAULT_TOLERANCE_HZ,
        }
    }
}

/// Tone playback settings
#[cfg(feature = "audio_playback")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Whether the Doppler mode emits its reference tone.
    pub enabled: bool,
    /// Tone amplitude from 0.0 to 1.0.
    pub amplitude: f32,
}

#[cfg(feature = "audio_playback")]
impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            amplitude: 0.5,
        }
    }
}

/// Session metrics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether to collect and print session metrics.
    pub enabled: bool,
    /// HDR histogram significant figures, 1 to 5.
    pub histogram_precision: u8,
    /// Largest recordable frame latency in milliseconds.
    pub histogram_max_ms: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            histogram_precision: 2,
            histogram_max_ms: 1000,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[cfg(feature = "audio_playback")]
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializationFailed {
                reason: e.to_string(),
            })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        std::fs::write(path, contents).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Default configuration file path under the platform config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("audiolab")
            .join("config.toml")
    }

    /// Check every section against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let buffer_size = self.analyzer.buffer_size;
        if buffer_size < 64 || buffer_size > 262_144 || !buffer_size.is_power_of_two() {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "analyzer.buffer_size must be a power of two between 64 and 262144, got {buffer_size}"
                ),
            });
        }

        if self.analyzer.batch_size == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "analyzer.batch_size must be at least 1".to_string(),
            });
        }

        if !(0.5..=120.0).contains(&self.analyzer.fps) {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "analyzer.fps must be between 0.5 and 120, got {}",
                    self.analyzer.fps
                ),
            });
        }

        if !self.gesture.tone_hz.is_finite() || self.gesture.tone_hz <= 0.0 {
            return Err(ConfigError::ValidationFailed {
                reason: format!("gesture.tone_hz must be positive, got {}", self.gesture.tone_hz),
            });
        }

        if !self.gesture.tolerance_hz.is_finite() || self.gesture.tolerance_hz <= 0.0 {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "gesture.tolerance_hz must be positive, got {}",
                    self.gesture.tolerance_hz
                ),
            });
        }

        if self.capture.ring_multiple == 0 {
            return Err(ConfigError::ValidationFailed {
                reason: "capture.ring_multiple must be at least 1".to_string(),
            });
        }

        #[cfg(feature = "audio_playback")]
        if !(0.0..=1.0).contains(&self.playback.amplitude) {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "playback.amplitude must be between 0.0 and 1.0, got {}",
                    self.playback.amplitude
                ),
            });
        }

        if !(1..=5).contains(&self.metrics.histogram_precision) {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "metrics.histogram_precision must be between 1 and 5, got {}",
                    self.metrics.histogram_precision
                ),
            });
        }

        if !(2..=3_600_000).contains(&self.metrics.histogram_max_ms) {
            return Err(ConfigError::ValidationFailed {
                reason: format!(
                    "metrics.histogram_max_ms must be between 2 and 3600000, got {}",
                    self.metrics.histogram_max_ms
                ),
            });
        }

        Ok(())
    }
}

// Minimal platform config-dir lookup, avoiding an extra dependency.
mod dirs {
    use std::path::PathBuf;

    pub fn config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join("Library").join("Application Support"))
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            std::env::var_os("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        }
        #[cfg(windows)]
        {
            std::env::var_os("APPDATA").map(PathBuf::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analyzer.buffer_size, 16_384);
        assert_eq!(config.analyzer.batch_size, 50);
        assert_eq!(config.analyzer.fps, 5.0);
        assert_eq!(config.gesture.tone_hz, 21_000.0);
        assert_eq!(config.gesture.tolerance_hz, 10.0);
    }

    #[test]
    fn rejects_non_power_of_two_buffer() {
        let mut config = AppConfig::default();
        config.analyzer.buffer_size = 10_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("buffer_size"));
    }

    #[test]
    fn rejects_zero_batch_size() {
        let mut config = AppConfig::default();
        config.analyzer.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_fps() {
        let mut config = AppConfig::default();
        config.analyzer.fps = 0.0;
        assert!(config.validate().is_err());
        config.analyzer.fps = 500.0;
        assert!(config.validate().is_err());
        config.analyzer.fps = 20.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_gesture_parameters() {
        let mut config = AppConfig::default();
        config.gesture.tone_hz = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.gesture.tolerance_hz = 0.0;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "audio_playback")]
    #[test]
    fn rejects_out_of_range_amplitude() {
        let mut config = AppConfig::default();
        config.playback.amplitude = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("amplitude"));
    }

    #[test]
    fn rejects_bad_histogram_settings() {
        let mut config = AppConfig::default();
        config.metrics.histogram_precision = 9;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.metrics.histogram_max_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_roundtrip_preserves_fields() {
        let mut config = AppConfig::default();
        config.analyzer.batch_size = 19;
        config.gesture.tolerance_hz = 22.0;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.analyzer.batch_size, 19);
        assert_eq!(parsed.gesture.tolerance_hz, 22.0);
        assert_eq!(parsed.analyzer.buffer_size, config.analyzer.buffer_size);
    }

    #[test]
    fn partial_file_fills_missing_sections_with_defaults() {
        let parsed: AppConfig = toml::from_str("[analyzer]\nbatch_size = 19\n").unwrap();
        assert_eq!(parsed.analyzer.batch_size, 19);
        assert_eq!(parsed.analyzer.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(parsed.gesture.tone_hz, DEFAULT_TONE_HZ);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.analyzer.fps = 20.0;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.analyzer.fps, 20.0);
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let config = AppConfig::load_or_default(Path::new("/nonexistent/audiolab.toml"));
        assert_eq!(config.analyzer.buffer_size, DEFAULT_BUFFER_SIZE);
    }

    #[test]
    fn default_path_is_under_audiolab() {
        let path = AppConfig::default_path();
        assert!(path.to_string_lossy().contains("audiolab"));
        assert!(path.ends_with("audiolab/config.toml") || path.ends_with("config.toml"));
    }

    #[test]
    fn invalid_file_fails_validation_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analyzer]\nbuffer_size = 12345\n").unwrap();

        assert!(matches!(
            AppConfig::load_from_file(&path),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }
}
