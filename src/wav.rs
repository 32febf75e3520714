use crate::error::{AudioError, Result};
use hound::WavReader as HoundReader;
use std::path::Path;
use std::sync::Arc;

/// WAV file loaded as normalized mono samples.
///
/// Samples are `f32` in `[-1.0, 1.0]`, shared via `Arc` so multiple
/// consumers can hold the buffer without copying. Stereo files are averaged
/// to mono so offline analysis matches the live capture path.
#[derive(Debug)]
pub struct WavReader {
    /// Mono samples normalized to `[-1.0, 1.0]`.
    pub samples: Arc<[f32]>,
    /// Original sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count of the source file (1 or 2).
    pub channels: u16,
}

impl WavReader {
    /// Load and decode a 16-bit integer PCM WAV file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use audiolab::wav::WavReader;
    ///
    /// let reader = WavReader::from_file("capture.wav")?;
    /// println!("{} samples at {} Hz", reader.samples.len(), reader.sample_rate);
    /// # Ok::<(), audiolab::AudiolabError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// [`AudioError::LoadFailed`] if the file cannot be opened.
    /// [`AudioError::InvalidSampleRate`] outside 8 kHz to 192 kHz.
    /// [`AudioError::UnsupportedChannels`] for more than two channels.
    /// [`AudioError::UnsupportedSampleFormat`] for anything but 16-bit integer PCM.
    /// [`AudioError::EmptyFile`] if the file holds no samples.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut reader = HoundReader::open(path).map_err(|source| AudioError::LoadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let spec = reader.spec();

        if !(8000..=192_000).contains(&spec.sample_rate) {
            return Err(AudioError::InvalidSampleRate {
                rate: spec.sample_rate,
            }
            .into());
        }

        if spec.channels == 0 || spec.channels > 2 {
            return Err(AudioError::UnsupportedChannels {
                channels: spec.channels,
            }
            .into());
        }

        if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
            return Err(AudioError::UnsupportedSampleFormat {
                bits: spec.bits_per_sample,
                format: match spec.sample_format {
                    hound::SampleFormat::Int => "integer",
                    hound::SampleFormat::Float => "float",
                },
            }
            .into());
        }

        let raw: Vec<f32> = reader
            .samples::<i16>()
            .map(|s| s.unwrap_or(0) as f32 / i16::MAX as f32)
            .collect();

        if raw.is_empty() {
            return Err(AudioError::EmptyFile {
                path: path.to_path_buf(),
            }
            .into());
        }

        let samples: Arc<[f32]> = match spec.channels {
            1 => raw.into(),
            _ => raw
                .chunks_exact(2)
                .map(|pair| (pair[0] + pair[1]) * 0.5)
                .collect::<Vec<f32>>()
                .into(),
        };

        tracing::info!(
            path = %path.display(),
            sample_rate = spec.sample_rate,
            channels = spec.channels,
            samples = samples.len(),
            "loaded WAV file"
        );

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    /// Length of the mono buffer in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }
}
