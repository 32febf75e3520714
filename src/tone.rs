//! Ultrasonic tone playback for the Doppler detector.
//!
//! rodio owns the output device; this wraps it with explicit state so the
//! caller can start once, degrade to listen-only when no output exists,
//! and stop cleanly.

use std::fmt;

use rodio::source::SineWave;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::AudioError;

/// Playback state of the tone emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitterState {
    /// No tone playing, no device held
    Idle,
    /// Tone is playing
    Emitting,
    /// Tone suspended, device still held
    Paused,
    /// Output device could not be opened
    Failed,
}

impl fmt::Display for EmitterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Emitting => write!(f, "Emitting"),
            Self::Paused => write!(f, "Paused"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

impl EmitterState {
    pub fn is_emitting(&self) -> bool {
        matches!(self, Self::Emitting)
    }

    pub fn can_resume(&self) -> bool {
        matches!(self, Self::Paused)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Plays an endless sine tone through the default output device.
pub struct ToneEmitter {
    output: Option<(OutputStream, Sink)>,
    state: EmitterState,
    frequency_hz: f32,
}

impl Default for ToneEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneEmitter {
    pub fn new() -> Self {
        Self {
            output: None,
            state: EmitterState::Idle,
            frequency_hz: 0.0,
        }
    }

    pub fn state(&self) -> EmitterState {
        self.state
    }

    /// Frequency of the last started tone in Hz.
    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    /// Open the default output device and start the tone. Starting while
    /// already emitting is a no-op.
    pub fn start(&mut self, frequency_hz: f32, amplitude: f32) -> Result<(), AudioError> {
        if self.state.is_emitting() {
            return Ok(());
        }

        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                self.state = EmitterState::Failed;
                return Err(AudioError::PlaybackInitFailed {
                    reason: e.to_string(),
                });
            }
        };

        let sink = Sink::connect_new(stream.mixer());
        sink.append(SineWave::new(frequency_hz).amplify(amplitude));

        self.output = Some((stream, sink));
        self.state = EmitterState::Emitting;
        self.frequency_hz = frequency_hz;
        tracing::info!(frequency_hz, amplitude, "tone emission started");
        Ok(())
    }

    /// Suspend the tone without releasing the output device.
    pub fn pause(&mut self) {
        if let Some((_, sink)) = &self.output {
            if self.state.is_emitting() {
                sink.pause();
                self.state = EmitterState::Paused;
            }
        }
    }

    /// Continue a paused tone.
    pub fn resume(&mut self) {
        if let Some((_, sink)) = &self.output {
            if self.state.can_resume() {
                sink.play();
                self.state = EmitterState::Emitting;
            }
        }
    }

    /// Stop the tone and release the output device.
    pub fn stop(&mut self) {
        if let Some((_, sink)) = self.output.take() {
            sink.stop();
            tracing::debug!(frequency_hz = self.frequency_hz, "tone emission stopped");
        }
        self.state = EmitterState::Idle;
    }
}
