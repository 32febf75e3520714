//! Utility functions for formatting and display

/// Format duration in seconds to MM:SS.SS format
pub fn format_duration(duration_secs: f32) -> String {
    let minutes = (duration_secs / 60.0) as u32;
    let seconds = duration_secs % 60.0;
    format!("{minutes:02}:{seconds:05.2}")
}

/// Format a frequency with a unit matched to its magnitude.
pub fn format_hz(hz: f32) -> String {
    if hz >= 1000.0 {
        format!("{:.2} kHz", hz / 1000.0)
    } else {
        format!("{hz:.1} Hz")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_zero() {
        assert_eq!(format_duration(0.0), "00:00.00");
    }

    #[test]
    fn test_format_duration_seconds_only() {
        assert_eq!(format_duration(45.5), "00:45.50");
    }

    #[test]
    fn test_format_duration_with_minutes() {
        assert_eq!(format_duration(125.25), "02:05.25");
    }

    #[test]
    fn test_format_duration_large() {
        assert_eq!(format_duration(3661.0), "61:01.00");
    }

    #[test]
    fn test_format_hz_sub_kilohertz() {
        assert_eq!(format_hz(440.0), "440.0 Hz");
        assert_eq!(format_hz(0.0), "0.0 Hz");
    }

    #[test]
    fn test_format_hz_kilohertz() {
        assert_eq!(format_hz(21000.0), "21.00 kHz");
        assert_eq!(format_hz(1195.3), "1.20 kHz");
    }
}
