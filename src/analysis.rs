//! Per-frame scalar analytics over one audio window.
//!
//! Pure functions: the batched local-maximum peak search over a magnitude
//! spectrum, and the RMS / decibel level of the time-domain window.

use std::fmt;

use crate::utils::format_hz;

/// Smallest operand ever fed to `log10` when converting to decibels.
/// Keeps silent input at -200 dB instead of negative infinity.
pub const DB_FLOOR: f32 = 1e-10;

/// A single spectral peak: bin index, center frequency, magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    pub bin: usize,
    pub frequency_hz: f32,
    pub magnitude_db: f32,
}

impl fmt::Display for SpectralPeak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.1} dB)",
            format_hz(self.frequency_hz),
            self.magnitude_db
        )
    }
}

/// The two loudest batch maxima of one spectrum frame.
///
/// `first` is the global argmax whenever the spectrum is non-empty.
/// `second` is the loudest remaining batch winner; it can sit in the batch
/// right next to `first` when a wide lobe straddles a batch boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeakPair {
    pub first: Option<SpectralPeak>,
    pub second: Option<SpectralPeak>,
}

/// Batched local-maximum search for the two loudest peaks.
///
/// The spectrum is walked in contiguous runs of `batch_size` bins (the last
/// run may be shorter). Each run contributes its argmax, and the two largest
/// run winners are kept, ordered by magnitude. Ties keep the earlier bin.
pub fn find_top_peaks(spectrum_db: &[f32], batch_size: usize, resolution_hz: f32) -> PeakPair {
    let mut peaks = PeakPair::default();
    if spectrum_db.is_empty() || batch_size == 0 {
        return peaks;
    }

    for (batch_idx, batch) in spectrum_db.chunks(batch_size).enumerate() {
        let mut local_best = 0;
        for (i, &magnitude) in batch.iter().enumerate() {
            if magnitude > batch[local_best] {
                local_best = i;
            }
        }

        let bin = batch_idx * batch_size + local_best;
        let winner = SpectralPeak {
            bin,
            frequency_hz: bin as f32 * resolution_hz,
            magnitude_db: spectrum_db[bin],
        };

        if peaks
            .first
            .map_or(true, |p| winner.magnitude_db > p.magnitude_db)
        {
            peaks.second = peaks.first;
            peaks.first = Some(winner);
        } else if peaks
            .second
            .map_or(true, |p| winner.magnitude_db > p.magnitude_db)
        {
            peaks.second = Some(winner);
        }
    }

    peaks
}

/// Root-mean-square of a window; `0.0` for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|&s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Window level in decibels relative to full scale, floored at -200 dB.
pub fn level_db(samples: &[f32]) -> f32 {
    20.0 * rms(samples).max(DB_FLOOR).log10()
}
