//! The displayed serial number and its seven-segment strip.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Segment masks for 0-9, ordered top, upper-left, upper-right, middle,
/// lower-left, lower-right, bottom
const SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, false, true, true, true],
    [false, false, true, false, false, true, false],
    [true, false, true, true, true, false, true],
    [true, false, true, true, false, true, true],
    [false, true, true, true, false, true, false],
    [true, true, false, true, false, true, true],
    [true, true, false, true, true, true, true],
    [true, false, true, false, false, true, false],
    [true, true, true, true, true, true, true],
    [true, true, true, true, false, true, true],
];

/// The displayed puzzle number.
///
/// Encodes the solve order and every target state; see the encoder module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PuzzleSerial(u64);

impl PuzzleSerial {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Number of decimal digits (`0` has one)
    pub fn digit_count(self) -> u32 {
        decimal_digits(self.0)
    }

    /// Number of trailing zero decimal digits (`0` has one)
    pub fn trailing_zeros(self) -> u32 {
        if self.0 == 0 {
            return 1;
        }
        let mut n = self.0;
        let mut zeros = 0;
        while n % 10 == 0 {
            zeros += 1;
            n /= 10;
        }
        zeros
    }

    /// Fixed-width digit strip, blank in unused leading positions
    pub fn digit_strip(self, width: usize) -> DigitStrip {
        let text = self.0.to_string();
        let digits: Vec<u8> = text.bytes().map(|b| b - b'0').collect();
        let mut strip = vec![None; width.saturating_sub(digits.len())];
        // Digits beyond the strip width are cut from the left
        let skip = digits.len().saturating_sub(width);
        strip.extend(digits[skip..].iter().map(|&d| Some(d)));
        DigitStrip { digits: strip }
    }
}

impl fmt::Display for PuzzleSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) fn decimal_digits(value: u64) -> u32 {
    match value.checked_ilog10() {
        Some(log) => log + 1,
        None => 1,
    }
}

/// One digit position per slot of the physical display; `None` is a dark position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitStrip {
    digits: Vec<Option<u8>>,
}

impl DigitStrip {
    pub fn digits(&self) -> &[Option<u8>] {
        &self.digits
    }

    pub fn width(&self) -> usize {
        self.digits.len()
    }

    /// Lit segments for every position; dark positions have none lit
    pub fn segments(&self) -> Vec<[bool; 7]> {
        self.digits
            .iter()
            .map(|d| d.map(segments).unwrap_or([false; 7]))
            .collect()
    }
}

impl fmt::Display for DigitStrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in &self.digits {
            match digit {
                Some(d) => write!(f, "{}", d)?,
                None => write!(f, " ")?,
            }
        }
        Ok(())
    }
}

/// Seven-segment mask of a decimal digit
pub fn segments(digit: u8) -> [bool; 7] {
    SEGMENTS[(digit % 10) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_count() {
        assert_eq!(PuzzleSerial::new(0).digit_count(), 1);
        assert_eq!(PuzzleSerial::new(9).digit_count(), 1);
        assert_eq!(PuzzleSerial::new(10).digit_count(), 2);
        assert_eq!(PuzzleSerial::new(99_999_999_999_999_999).digit_count(), 17);
        assert_eq!(PuzzleSerial::new(u64::MAX).digit_count(), 20);
    }

    #[test]
    fn test_trailing_zeros() {
        assert_eq!(PuzzleSerial::new(0).trailing_zeros(), 1);
        assert_eq!(PuzzleSerial::new(7).trailing_zeros(), 0);
        assert_eq!(PuzzleSerial::new(1200).trailing_zeros(), 2);
        assert_eq!(PuzzleSerial::new(1_000_000).trailing_zeros(), 6);
    }

    #[test]
    fn test_strip_blanks_leading_positions() {
        let strip = PuzzleSerial::new(4096).digit_strip(8);
        assert_eq!(strip.width(), 8);
        assert_eq!(
            strip.digits(),
            &[None, None, None, None, Some(4), Some(0), Some(9), Some(6)]
        );
        assert_eq!(strip.to_string(), "    4096");
    }

    #[test]
    fn test_strip_zero_serial() {
        let strip = PuzzleSerial::new(0).digit_strip(3);
        assert_eq!(strip.digits(), &[None, None, Some(0)]);
    }

    #[test]
    fn test_blank_positions_are_dark() {
        let segs = PuzzleSerial::new(8).digit_strip(2).segments();
        assert_eq!(segs[0], [false; 7]);
        assert_eq!(segs[1], [true; 7]);
    }

    #[test]
    fn test_one_lights_right_side() {
        assert_eq!(segments(1), [false, false, true, false, false, true, false]);
    }
}
