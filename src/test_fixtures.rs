//! Synthetic audio fixtures for development and testing
//!
//! Deterministic signals with known spectral content, so tests never depend
//! on audio hardware or committed binary files.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::path::Path;

use crate::capture::SampleSource;

/// Generate a pure sine wave at the given frequency.
pub fn generate_sine_wave(
    frequency: f32,
    duration_secs: f32,
    sample_rate: u32,
    amplitude: f32,
) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Generate a linear chirp sweeping from `start_freq` to `end_freq`.
pub fn generate_chirp(
    start_freq: f32,
    end_freq: f32,
    duration_secs: f32,
    sample_rate: u32,
    amplitude: f32,
) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let progress = t / duration_secs;
            let instantaneous = start_freq + (end_freq - start_freq) * progress * 0.5;
            amplitude * (2.0 * PI * instantaneous * t).sin()
        })
        .collect()
}

/// Deterministic pseudo-random noise derived from the sample index.
pub fn generate_white_noise(duration_secs: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    (0..num_samples)
        .map(|i| {
            let hashed = (i as u32).wrapping_mul(2_654_435_761);
            let unit = (hashed >> 8) as f32 / 8_388_608.0 - 1.0;
            amplitude * unit
        })
        .collect()
}

/// Two simultaneous tones, the first at 0.6 amplitude and the second at
/// 0.3, for top-two peak tests.
pub fn generate_two_tone(
    freq_a: f32,
    freq_b: f32,
    duration_secs: f32,
    sample_rate: u32,
) -> Vec<f32> {
    let a = generate_sine_wave(freq_a, duration_secs, sample_rate, 0.6);
    let b = generate_sine_wave(freq_b, duration_secs, sample_rate, 0.3);
    a.iter().zip(b.iter()).map(|(&x, &y)| x + y).collect()
}

fn write_samples<W: std::io::Write + std::io::Seek>(
    target: W,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::new(target, spec).expect("create wav writer");
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

/// Write samples as a 16-bit integer PCM WAV at `path`.
pub fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
    let file = std::fs::File::create(path).expect("create wav file");
    write_samples(std::io::BufWriter::new(file), samples, sample_rate, channels);
}

/// Create a temporary 16-bit integer PCM WAV file.
pub fn create_test_wav_file(
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    write_samples(&mut file, samples, sample_rate, channels);
    file
}

/// A [`SampleSource`] that hands out pre-baked chunks, one per drain call.
pub struct ScriptedSource {
    chunks: VecDeque<Vec<f32>>,
    sample_rate: u32,
}

impl ScriptedSource {
    pub fn new(sample_rate: u32, chunks: Vec<Vec<f32>>) -> Self {
        Self {
            chunks: chunks.into(),
            sample_rate,
        }
    }

    /// Chunks not yet handed out.
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }
}

impl SampleSource for ScriptedSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn drain_into(&mut self, out: &mut Vec<f32>) {
        if let Some(chunk) = self.chunks.pop_front() {
            out.extend(chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_wave_has_expected_length_and_amplitude() {
        let signal = generate_sine_wave(440.0, 1.0, 44100, 0.5);
        assert_eq!(signal.len(), 44100);

        let peak = signal.iter().fold(0.0f32, |a, &s| a.max(s.abs()));
        assert!((peak - 0.5).abs() < 0.01);
    }

    #[test]
    fn chirp_has_expected_length() {
        let signal = generate_chirp(100.0, 1000.0, 0.5, 8000, 0.8);
        assert_eq!(signal.len(), 4000);
        assert!(signal.iter().all(|s| s.abs() <= 0.8 + 1e-6));
    }

    #[test]
    fn white_noise_is_deterministic_and_bounded() {
        let a = generate_white_noise(0.1, 8000, 0.5);
        let b = generate_white_noise(0.1, 8000, 0.5);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| s.abs() <= 0.5 + 1e-6));
        assert!(a.iter().any(|&s| s.abs() > 0.01));
    }

    #[test]
    fn two_tone_mixes_both_components() {
        let signal = generate_two_tone(440.0, 1200.0, 0.1, 44100);
        assert_eq!(signal.len(), 4410);
        let peak = signal.iter().fold(0.0f32, |a, &s| a.max(s.abs()));
        assert!(peak > 0.5);
    }

    #[test]
    fn scripted_source_drains_in_order_then_runs_dry() {
        let mut source = ScriptedSource::new(8000, vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(source.sample_rate(), 8000);
        assert_eq!(source.remaining(), 2);

        let mut out = Vec::new();
        source.drain_into(&mut out);
        assert_eq!(out, vec![1.0, 2.0]);

        source.drain_into(&mut out);
        assert_eq!(out, vec![1.0, 2.0, 3.0]);
        assert_eq!(source.remaining(), 0);

        source.drain_into(&mut out);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn written_wav_loads_back() {
        let signal = generate_sine_wave(440.0, 0.1, 44100, 0.5);
        let file = create_test_wav_file(&signal, 44100, 1);

        let wav = crate::wav::WavReader::from_file(file.path()).expect("readable fixture");
        assert_eq!(wav.sample_rate, 44100);
        assert_eq!(wav.samples.len(), signal.len());
    }
}
