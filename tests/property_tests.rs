//! Algebraic properties of the peak search, level math, and sliding window.

use audiolab::analysis::{find_top_peaks, rms};
use audiolab::capture::SlidingWindow;
use proptest::prelude::*;

proptest! {
    #[test]
    fn first_peak_is_the_global_argmax(
        spectrum in prop::collection::vec(-200.0f32..0.0, 1..512),
        batch_size in 1usize..64,
    ) {
        let peaks = find_top_peaks(&spectrum, batch_size, 1.0);
        let first = peaks.first.expect("non-empty spectrum yields a first peak");

        let max = spectrum.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        prop_assert_eq!(first.magnitude_db, max);
        prop_assert_eq!(spectrum[first.bin], max);
    }

    #[test]
    fn peaks_are_ordered_and_in_distinct_batches(
        spectrum in prop::collection::vec(-200.0f32..0.0, 2..512),
        batch_size in 1usize..64,
    ) {
        let peaks = find_top_peaks(&spectrum, batch_size, 1.0);
        if let (Some(first), Some(second)) = (peaks.first, peaks.second) {
            prop_assert!(first.magnitude_db >= second.magnitude_db);
            prop_assert!(first.bin / batch_size != second.bin / batch_size);
            prop_assert!(first.bin < spectrum.len());
            prop_assert!(second.bin < spectrum.len());
        }
    }

    #[test]
    fn second_peak_exists_iff_there_are_two_batches(
        spectrum in prop::collection::vec(-200.0f32..0.0, 1..256),
        batch_size in 1usize..64,
    ) {
        let peaks = find_top_peaks(&spectrum, batch_size, 1.0);
        let batches = spectrum.len().div_ceil(batch_size);
        prop_assert_eq!(peaks.second.is_some(), batches >= 2);
    }

    #[test]
    fn peak_frequency_follows_the_bin(
        spectrum in prop::collection::vec(-200.0f32..0.0, 1..256),
        batch_size in 1usize..32,
    ) {
        let resolution = 12.5f32;
        let peaks = find_top_peaks(&spectrum, batch_size, resolution);
        let first = peaks.first.expect("first peak");
        prop_assert_eq!(first.frequency_hz, first.bin as f32 * resolution);
    }

    #[test]
    fn rms_scales_linearly(
        samples in prop::collection::vec(-1.0f32..1.0, 1..256),
        scale in 0.0f32..4.0,
    ) {
        let scaled: Vec<f32> = samples.iter().map(|&s| s * scale).collect();
        let expected = rms(&samples) * scale;
        prop_assert!((rms(&scaled) - expected).abs() < 1e-3);
    }

    #[test]
    fn rms_is_bounded_by_the_peak_amplitude(
        samples in prop::collection::vec(-1.0f32..1.0, 1..256),
    ) {
        let peak = samples.iter().fold(0.0f32, |a, &s| a.max(s.abs()));
        prop_assert!(rms(&samples) <= peak + 1e-6);
    }

    #[test]
    fn sliding_window_keeps_the_freshest_samples(
        chunks in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 0..64), 1..16),
        window_len in 1usize..64,
    ) {
        let mut window = SlidingWindow::new(window_len);
        let mut all: Vec<f32> = Vec::new();
        for chunk in &chunks {
            window.push(chunk);
            all.extend(chunk);
        }

        if all.len() >= window_len {
            prop_assert!(window.is_warm());
            prop_assert_eq!(window.samples(), &all[all.len() - window_len..]);
        } else {
            prop_assert!(!window.is_warm());
        }
    }
}
