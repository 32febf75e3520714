//! Command-line interface and config resolution.
//!
//! Precedence for every knob: explicit flag, then named preset, then config
//! file, then built-in default.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::presets;

/// Microphone spectrum and Doppler-gesture analyzer.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Apply a named parameter preset (see `audiolab presets`)
    #[arg(short, long, global = true)]
    pub preset: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture the microphone and report the two loudest spectral peaks
    Live(LiveArgs),
    /// Emit an ultrasonic tone and classify motion from its Doppler shift
    Doppler(DopplerArgs),
    /// Run the same per-frame analysis offline over WAV files
    Analyze(AnalyzeArgs),
    /// List the built-in parameter presets
    Presets,
}

/// Analyzer overrides shared by every mode.
#[derive(Args, Debug, Default)]
pub struct AnalyzerOverrides {
    /// Analysis frames per second
    #[arg(long)]
    pub fps: Option<f64>,

    /// Window length in samples (power of two)
    #[arg(long)]
    pub buffer_size: Option<usize>,

    /// Bins per batch in the local-maximum peak search
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl AnalyzerOverrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(fps) = self.fps {
            config.analyzer.fps = fps;
        }
        if let Some(buffer_size) = self.buffer_size {
            config.analyzer.buffer_size = buffer_size;
        }
        if let Some(batch_size) = self.batch_size {
            config.analyzer.batch_size = batch_size;
        }
    }
}

#[derive(Args, Debug)]
pub struct LiveArgs {
    #[command(flatten)]
    pub analyzer: AnalyzerOverrides,

    /// Stop after this many seconds instead of running until interrupted
    #[arg(long)]
    pub duration: Option<f64>,
}

#[derive(Args, Debug)]
pub struct DopplerArgs {
    #[command(flatten)]
    pub analyzer: AnalyzerOverrides,

    /// Stop after this many seconds instead of running until interrupted
    #[arg(long)]
    pub duration: Option<f64>,

    /// Emitted tone frequency in Hz
    #[arg(long)]
    pub tone_hz: Option<f32>,

    /// Doppler shifts smaller than this count as no motion, in Hz
    #[arg(long)]
    pub tolerance_hz: Option<f32>,

    /// Listen only, never emit the tone
    #[arg(long)]
    pub mute: bool,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Glob pattern of WAV files to analyze
    #[arg(required = true)]
    pub pattern: String,

    /// Print every analyzed frame, not only the per-file summary
    #[arg(long)]
    pub per_frame: bool,

    #[command(flatten)]
    pub analyzer: AnalyzerOverrides,

    /// Reference tone frequency for the gesture classifier, in Hz
    #[arg(long)]
    pub tone_hz: Option<f32>,

    /// Doppler shifts smaller than this count as no motion, in Hz
    #[arg(long)]
    pub tolerance_hz: Option<f32>,
}

impl Cli {
    /// Resolve the effective configuration for this invocation.
    pub fn resolve_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config from '{}'", path.display()))?,
            None => {
                let path = AppConfig::default_path();
                if path.exists() {
                    AppConfig::load_or_default(&path)
                } else {
                    AppConfig::default()
                }
            }
        };

        if let Some(name) = &self.preset {
            let preset = presets::find_preset(name).ok_or_else(|| {
                anyhow::anyhow!("Unknown preset '{name}'; run `audiolab presets` to list them")
            })?;
            preset.apply(&mut config);
        }

        match &self.command {
            Command::Live(args) => args.analyzer.apply(&mut config),
            Command::Doppler(args) => {
                args.analyzer.apply(&mut config);
                if let Some(tone_hz) = args.tone_hz {
                    config.gesture.tone_hz = tone_hz;
                }
                if let Some(tolerance_hz) = args.tolerance_hz {
                    config.gesture.tolerance_hz = tolerance_hz;
                }
                #[cfg(feature = "audio_playback")]
                if args.mute {
                    config.playback.enabled = false;
                }
            }
            Command::Analyze(args) => {
                args.analyzer.apply(&mut config);
                if let Some(tone_hz) = args.tone_hz {
                    config.gesture.tone_hz = tone_hz;
                }
                if let Some(tolerance_hz) = args.tolerance_hz {
                    config.gesture.tolerance_hz = tolerance_hz;
                }
            }
            Command::Presets => {}
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_doppler_overrides() {
        let cli = Cli::parse_from([
            "audiolab", "doppler", "--tone-hz", "19000", "--mute", "--fps", "10",
        ]);
        match cli.command {
            Command::Doppler(args) => {
                assert_eq!(args.tone_hz, Some(19000.0));
                assert!(args.mute);
                assert_eq!(args.analyzer.fps, Some(10.0));
                assert_eq!(args.analyzer.buffer_size, None);
            }
            _ => panic!("expected doppler subcommand"),
        }
    }

    #[test]
    fn parses_analyze_pattern() {
        let cli = Cli::parse_from(["audiolab", "analyze", "captures/*.wav", "--per-frame"]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.pattern, "captures/*.wav");
                assert!(args.per_frame);
            }
            _ => panic!("expected analyze subcommand"),
        }
    }

    #[test]
    fn preset_applies_before_flag_overrides() {
        let cli = Cli::parse_from(["audiolab", "--preset", "motion detector", "live", "--fps", "8"]);
        let config = cli.resolve_config().expect("resolvable config");
        assert_eq!(config.analyzer.batch_size, 19);
        assert_eq!(config.analyzer.fps, 8.0);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let cli = Cli::parse_from(["audiolab", "--preset", "warp speed", "live"]);
        let err = cli.resolve_config().unwrap_err();
        assert!(err.to_string().contains("Unknown preset"));
    }

    #[test]
    fn invalid_override_fails_validation() {
        let cli = Cli::parse_from(["audiolab", "live", "--buffer-size", "12345"]);
        assert!(cli.resolve_config().is_err());
    }

    #[cfg(feature = "audio_playback")]
    #[test]
    fn mute_disables_playback() {
        let cli = Cli::parse_from(["audiolab", "doppler", "--mute"]);
        let config = cli.resolve_config().expect("resolvable config");
        assert!(!config.playback.enabled);
    }

    #[test]
    fn global_preset_works_after_the_subcommand() {
        let cli = Cli::parse_from(["audiolab", "live", "--preset", "High Resolution"]);
        let config = cli.resolve_config().expect("resolvable config");
        assert_eq!(config.analyzer.buffer_size, 32_768);
    }
}
