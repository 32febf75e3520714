//! Microphone capture: cpal stream, lock-free ring, fresh-window assembly.
//!
//! The device callback downmixes to mono and pushes into a ring buffer;
//! the analysis side drains the ring into a [`SlidingWindow`] that always
//! holds the freshest `buffer_size` samples.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use ringbuf::{Consumer, HeapRb};

use crate::config::CaptureConfig;
use crate::error::AudioError;

/// Anything the analysis worker can pull samples from.
pub trait SampleSource {
    /// Sample rate of the produced samples in Hz.
    fn sample_rate(&self) -> u32;

    /// Move every sample currently available into `out`.
    fn drain_into(&mut self, out: &mut Vec<f32>);
}

/// Keeps the cpal input stream alive; dropping it stops capture.
/// Not `Send`: it stays on the thread that opened the device.
pub struct MicCapture {
    _stream: cpal::Stream,
    device_name: String,
    sample_rate: u32,
}

impl MicCapture {
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

/// Consumer half of the capture ring, fed by the device callback.
pub struct RingSource {
    consumer: Consumer<f32, Arc<HeapRb<f32>>>,
    sample_rate: u32,
}

impl SampleSource for RingSource {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn drain_into(&mut self, out: &mut Vec<f32>) {
        while let Some(sample) = self.consumer.pop() {
            out.push(sample);
        }
    }
}

/// Open the default input device and start pushing mono `f32` samples into
/// a ring of `ring_multiple * buffer_size` capacity. When the ring is full,
/// new samples are dropped until the worker drains it.
pub fn start_capture(
    capture: &CaptureConfig,
    buffer_size: usize,
) -> Result<(MicCapture, RingSource), AudioError> {
    let host = cpal::default_host();

    if let Ok(devices) = host.input_devices() {
        for (index, device) in devices.enumerate() {
            let name = device.name().unwrap_or_else(|_| "unknown".into());
            tracing::debug!(index, name = %name, "input device");
        }
    }

    let device = host.default_input_device().ok_or(AudioError::NoInputDevice)?;
    let device_name = device.name().unwrap_or_else(|_| "unknown".into());

    let supported = device
        .default_input_config()
        .map_err(|e| AudioError::StreamError(e.to_string()))?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();
    let channels = config.channels as usize;
    let sample_rate = config.sample_rate.0;
    let ring_capacity = buffer_size * capture.ring_multiple;

    let (mut producer, consumer) = HeapRb::<f32>::new(ring_capacity).split();

    // Stereo averages the pair; anything wider keeps the first channel.
    let mut push_mono = move |data: &[f32]| {
        if channels == 1 {
            let _ = producer.push_slice(data);
        } else if channels == 2 {
            for pair in data.chunks_exact(2) {
                let _ = producer.push((pair[0] + pair[1]) * 0.5);
            }
        } else {
            for frame in data.chunks_exact(channels) {
                let _ = producer.push(frame[0]);
            }
        }
    };

    let err_fn = |err: cpal::StreamError| tracing::error!("audio input stream error: {err}");

    let stream = match sample_format {
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| push_mono(data),
            err_fn,
            None,
        ),
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let converted: Vec<f32> = data.iter().map(|&s| s as f32 / 32768.0).collect();
                push_mono(&converted);
            },
            err_fn,
            None,
        ),
        SampleFormat::U16 => device.build_input_stream(
            &config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                let converted: Vec<f32> = data
                    .iter()
                    .map(|&s| (s as f32 - 32768.0) / 32768.0)
                    .collect();
                push_mono(&converted);
            },
            err_fn,
            None,
        ),
        other => {
            return Err(AudioError::StreamError(format!(
                "unsupported sample format {other:?}"
            )))
        }
    }
    .map_err(|e| AudioError::StreamError(e.to_string()))?;

    stream.play().map_err(|e| AudioError::StreamError(e.to_string()))?;

    tracing::info!(
        device = %device_name,
        format = ?sample_format,
        sample_rate,
        channels,
        ring_capacity,
        "microphone capture started"
    );

    Ok((
        MicCapture {
            _stream: stream,
            device_name,
            sample_rate,
        },
        RingSource {
            consumer,
            sample_rate,
        },
    ))
}

/// Fixed-length window over the freshest samples, zero-padded until warm.
pub struct SlidingWindow {
    window: Vec<f32>,
    seen: usize,
}

impl SlidingWindow {
    pub fn new(len: usize) -> Self {
        Self {
            window: vec![0.0; len],
            seen: 0,
        }
    }

    /// Shift the window left and append `samples`, keeping only the
    /// freshest `len()` values.
    pub fn push(&mut self, samples: &[f32]) {
        let len = self.window.len();
        let incoming = samples.len();
        if incoming >= len {
            self.window.copy_from_slice(&samples[incoming - len..]);
        } else if incoming > 0 {
            self.window.copy_within(incoming.., 0);
            self.window[len - incoming..].copy_from_slice(samples);
        }
        self.seen = self.seen.saturating_add(incoming);
    }

    /// Whether a full window of real samples has arrived.
    pub fn is_warm(&self) -> bool {
        self.seen >= self.window.len()
    }

    pub fn samples(&self) -> &[f32] {
        &self.window
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}
