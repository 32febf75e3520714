//! Analysis worker over scripted sources: warm-up, reporting, shutdown.

use std::time::Duration;

use audiolab::config::{AnalyzerConfig, GestureConfig};
use audiolab::doppler::Gesture;
use audiolab::pipeline::FrameAnalyzer;
use audiolab::test_fixtures::{generate_sine_wave, ScriptedSource};
use audiolab::worker::spawn_analysis_worker;

const SAMPLE_RATE: u32 = 8192;

fn test_analyzer(buffer_size: usize) -> FrameAnalyzer {
    let analyzer = AnalyzerConfig {
        buffer_size,
        batch_size: 16,
        fps: 5.0,
    };
    // reference tone must sit below the 4096 Hz Nyquist of the test rate
    let gesture = GestureConfig {
        tone_hz: 1000.0,
        tolerance_hz: 10.0,
    };
    FrameAnalyzer::new(&analyzer, &gesture, SAMPLE_RATE as f32).expect("valid analyzer")
}

#[test]
fn reports_frames_with_increasing_sequence_numbers() {
    // half a second of 400 Hz fills the 1024-sample window on the first tick
    let signal = generate_sine_wave(400.0, 0.5, SAMPLE_RATE, 0.5);
    let source = ScriptedSource::new(SAMPLE_RATE, vec![signal]);

    let (reports, handle) = spawn_analysis_worker(source, test_analyzer(1024), 100.0);

    let first = reports
        .recv_timeout(Duration::from_secs(5))
        .expect("first report");
    assert_eq!(first.seq, 0);

    let peak = first.analysis.peaks.first.expect("a peak");
    let resolution = SAMPLE_RATE as f32 / 1024.0; // 8 Hz
    assert!((peak.frequency_hz - 400.0).abs() <= resolution);
    assert!(first.analysis.previous_peaks.first.is_none());

    // 400 Hz dominant against a 1 kHz reference reads as away
    let reading = first.analysis.gesture.expect("gesture reading");
    assert_eq!(reading.gesture, Gesture::Away);

    let second = reports
        .recv_timeout(Duration::from_secs(5))
        .expect("second report");
    assert_eq!(second.seq, 1);
    assert_eq!(second.analysis.previous_peaks.first, first.analysis.peaks.first);

    drop(reports);
    handle.join().expect("worker exits cleanly");
}

#[test]
fn warmup_ticks_produce_no_reports() {
    // first chunk only half-fills the window; the first report must come
    // from a fully warm window, not a zero-padded one
    let half = generate_sine_wave(400.0, 0.0625, SAMPLE_RATE, 0.5); // 512 samples
    let full = generate_sine_wave(400.0, 0.125, SAMPLE_RATE, 0.5); // 1024 samples
    let source = ScriptedSource::new(SAMPLE_RATE, vec![half, full]);

    let (reports, handle) = spawn_analysis_worker(source, test_analyzer(1024), 200.0);

    let first = reports
        .recv_timeout(Duration::from_secs(5))
        .expect("report after warm-up");
    assert_eq!(first.seq, 0);

    // the window holds the second chunk whole, a clean half-amplitude sine
    let peak = first.analysis.peaks.first.expect("a peak");
    assert!(peak.magnitude_db > -40.0, "peak at {} dB", peak.magnitude_db);
    assert!(first.analysis.level_db > -15.0);

    drop(reports);
    handle.join().expect("worker exits cleanly");
}

#[test]
fn worker_shuts_down_when_receiver_drops() {
    let signal = generate_sine_wave(250.0, 0.25, SAMPLE_RATE, 0.4);
    let source = ScriptedSource::new(SAMPLE_RATE, vec![signal]);

    let (reports, handle) = spawn_analysis_worker(source, test_analyzer(1024), 200.0);

    reports
        .recv_timeout(Duration::from_secs(5))
        .expect("one report");
    drop(reports);

    handle.join().expect("worker notices the closed channel");
}

#[test]
fn dry_source_keeps_reporting_the_last_window() {
    // a single chunk larger than the window, then silence from the source;
    // the sliding window retains its content, so reports keep coming
    let signal = generate_sine_wave(400.0, 0.25, SAMPLE_RATE, 0.5); // 2048 samples
    let source = ScriptedSource::new(SAMPLE_RATE, vec![signal]);

    let (reports, handle) = spawn_analysis_worker(source, test_analyzer(1024), 200.0);

    let first = reports.recv_timeout(Duration::from_secs(5)).expect("first");
    let _second = reports.recv_timeout(Duration::from_secs(5)).expect("second");
    let third = reports.recv_timeout(Duration::from_secs(5)).expect("third");

    assert_eq!(third.seq, 2);
    assert_eq!(third.analysis.peaks.first, first.analysis.peaks.first);

    drop(reports);
    handle.join().expect("worker exits cleanly");
}
