//! Miscellaneous utilities.

pub fn clamp<T: PartialOrd>(val: T, low: T, high: T) -> T {
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Rounds a color channel computed in floating point to the nearest `u8`.
///
/// Values are clamped to `[0, 255]` first.
#[inline]
pub fn round_channel(x: f64) -> u8 {
    (clamp(x, 0.0, 255.0) + 0.5) as u8
}
