use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use audiolab::cli::{Cli, Command};
use audiolab::offline::{run_offline_analysis, OfflineArgs};
use audiolab::{app, presets, AppConfig};

fn main() -> Result<()> {
    // frame lines go to stdout; logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    match &cli.command {
        Command::Live(args) => app::run_live(&config, args.duration),
        Command::Doppler(args) => app::run_doppler(&config, args.duration),
        Command::Analyze(args) => run_offline_analysis(
            &OfflineArgs {
                input_pattern: args.pattern.clone(),
                per_frame: args.per_frame,
            },
            &config,
        ),
        Command::Presets => {
            print_presets(&config);
            Ok(())
        }
    }
}

fn print_presets(config: &AppConfig) {
    let active = presets::matches_preset(config);
    for preset in presets::PRESETS {
        let marker = if active == Some(preset.name) { "*" } else { " " };
        println!(
            "{} {:<16} {:>6} samples / batch {:>3} / {:>4.1} fps / tone {:.0} Hz (±{:.0} Hz)",
            marker,
            preset.name,
            preset.buffer_size,
            preset.batch_size,
            preset.fps,
            preset.tone_hz,
            preset.tolerance_hz
        );
        println!("      {}", preset.description);
    }
}
