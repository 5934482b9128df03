use std::time::Duration;

/// Convert milliseconds to an MPRIS time value in microseconds
pub fn to_mpris_micros(millis: u64) -> i64 {
    i64::try_from(Duration::from_millis(millis).as_micros()).unwrap_or(i64::MAX)
}

/// Convert a 0-100 group volume to the MPRIS 0.0-1.0 range
///
/// A muted group reports zero.
pub fn to_mpris_volume(volume: u8, muted: bool) -> f64 {
    if muted {
        return 0.0;
    }
    f64::from(volume.min(100)) / 100.0
}

/// Convert an MPRIS volume to a 0-100 group volume
pub fn from_mpris_volume(volume: f64) -> u8 {
    if volume.is_nan() {
        return 0;
    }
    // Clamped to 0..=100 before the cast.
    (volume.clamp(0.0, 1.0) * 100.0).round() as u8
}
