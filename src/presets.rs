//! Built-in analysis presets
//!
//! Named parameter sets covering the common setups, from slow
//! high-resolution spectrum inspection to fast gesture response.

use crate::config::AppConfig;
use crate::doppler::{DEFAULT_TOLERANCE_HZ, DEFAULT_TONE_HZ};

/// A named set of analyzer and gesture parameters.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerPreset {
    pub name: &'static str,
    pub description: &'static str,
    /// Window length in samples.
    pub buffer_size: usize,
    /// Bins per batch in the peak search.
    pub batch_size: usize,
    /// Analysis frames per second.
    pub fps: f64,
    /// Gesture reference tone in Hz.
    pub tone_hz: f32,
    /// Gesture dead zone in Hz.
    pub tolerance_hz: f32,
}

/// All built-in presets, in display order.
pub const PRESETS: &[AnalyzerPreset] = &[
    AnalyzerPreset {
        name: "Spectrum Lab",
        description: "Wide 16k window with five updates per second",
        buffer_size: 16_384,
        batch_size: 50,
        fps: 5.0,
        tone_hz: DEFAULT_TONE_HZ,
        tolerance_hz: DEFAULT_TOLERANCE_HZ,
    },
    AnalyzerPreset {
        name: "Motion Detector",
        description: "Narrow peak batches tuned for the Doppler classifier",
        buffer_size: 16_384,
        batch_size: 19,
        fps: 5.0,
        tone_hz: DEFAULT_TONE_HZ,
        tolerance_hz: DEFAULT_TOLERANCE_HZ,
    },
    AnalyzerPreset {
        name: "Fast Response",
        description: "Short window, twenty updates per second, wider dead zone",
        buffer_size: 4096,
        batch_size: 25,
        fps: 20.0,
        tone_hz: DEFAULT_TONE_HZ,
        tolerance_hz: 22.0,
    },
    AnalyzerPreset {
        name: "High Resolution",
        description: "32k window for sub-2 Hz bins at two updates per second",
        buffer_size: 32_768,
        batch_size: 100,
        fps: 2.0,
        tone_hz: DEFAULT_TONE_HZ,
        tolerance_hz: 5.0,
    },
];

impl AnalyzerPreset {
    /// Copy this preset's values into `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        config.analyzer.buffer_size = self.buffer_size;
        config.analyzer.batch_size = self.batch_size;
        config.analyzer.fps = self.fps;
        config.gesture.tone_hz = self.tone_hz;
        config.gesture.tolerance_hz = self.tolerance_hz;
    }
}

/// Find a preset by name, ignoring case.
pub fn find_preset(name: &str) -> Option<&'static AnalyzerPreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// The preset a config currently matches, if any.
pub fn matches_preset(config: &AppConfig) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|preset| preset_matches(preset, config))
        .map(|preset| preset.name)
}

fn preset_matches(preset: &AnalyzerPreset, config: &AppConfig) -> bool {
    const EPSILON_F32: f32 = 0.001;
    const EPSILON_F64: f64 = 0.001;

    preset.buffer_size == config.analyzer.buffer_size
        && preset.batch_size == config.analyzer.batch_size
        && (preset.fps - config.analyzer.fps).abs() < EPSILON_F64
        && (preset.tone_hz - config.gesture.tone_hz).abs() < EPSILON_F32
        && (preset.tolerance_hz - config.gesture.tolerance_hz).abs() < EPSILON_F32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_names_are_unique() {
        for (i, a) in PRESETS.iter().enumerate() {
            for b in &PRESETS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn find_preset_ignores_case() {
        assert!(find_preset("motion detector").is_some());
        assert!(find_preset("MOTION DETECTOR").is_some());
        assert!(find_preset("Motion Detector").is_some());
        assert!(find_preset("nonexistent").is_none());
    }

    #[test]
    fn default_config_matches_spectrum_lab() {
        let config = AppConfig::default();
        assert_eq!(matches_preset(&config), Some("Spectrum Lab"));
    }

    #[test]
    fn apply_makes_the_config_match() {
        let mut config = AppConfig::default();
        let preset = find_preset("Fast Response").unwrap();
        preset.apply(&mut config);

        assert_eq!(config.analyzer.buffer_size, 4096);
        assert_eq!(config.analyzer.fps, 20.0);
        assert_eq!(config.gesture.tolerance_hz, 22.0);
        assert_eq!(matches_preset(&config), Some("Fast Response"));
    }

    #[test]
    fn custom_settings_match_nothing() {
        let mut config = AppConfig::default();
        config.analyzer.batch_size = 37;
        assert_eq!(matches_preset(&config), None);
    }

    #[test]
    fn every_preset_passes_validation() {
        for preset in PRESETS {
            let mut config = AppConfig::default();
            preset.apply(&mut config);
            assert!(
                config.validate().is_ok(),
                "preset '{}' should validate",
                preset.name
            );
        }
    }
}
