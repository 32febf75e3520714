// Library interface for audiolab components

pub mod analysis;
pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod doppler;
pub mod error;
pub mod metrics;
pub mod offline;
pub mod pipeline;
pub mod presets;
pub mod spectrum;
#[cfg(feature = "audio_playback")]
pub mod tone;
pub mod utils;
pub mod wav;
pub mod worker;

// Test fixtures for synthetic audio generation
pub mod test_fixtures;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AnalysisError, AudioError, AudiolabError, Result};
