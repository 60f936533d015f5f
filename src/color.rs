// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps escape counts onto a color wheel.

use crate::error::{Error, Result};

/// An 8-bit RGBA color, laid out the way the presenter uploads it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(C)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// The color of the set itself.
    pub const BLACK: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };

    /// Constructor.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    /// Convert from hue (degrees), saturation and value.  `value` may
    /// run past 1.0, in which case channels clip at 255.
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Color {
        let channel = |offset: f32| -> u8 {
            let k = (offset + hue / 60.0) % 6.0;
            let k = k.min(4.0 - k).max(0.0).min(1.0);
            ((value - value * saturation * k) * 255.0) as u8
        };
        Color::rgba(channel(5.0), channel(3.0), channel(1.0), 255)
    }
}

/// The two knobs of the palette.  The defaults are deliberately
/// over-bright, which washes the wheel out into high-contrast pastels.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorConfig {
    /// HSV saturation, usually in 0..=1.
    pub saturation: f64,
    /// HSV value; anything above 1.0 clips.
    pub value: f64,
}

impl Default for ColorConfig {
    fn default() -> ColorConfig {
        ColorConfig {
            saturation: 0.5,
            value: 1.2,
        }
    }
}

impl ColorConfig {
    /// Both parameters must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if ok(self.saturation) && ok(self.value) {
            Ok(())
        } else {
            Err(Error::InvalidColor(self.saturation, self.value))
        }
    }

    /// Color for an escape count.  Interior points are black;
    /// everything else gets a hue of `255·n / max_iter` degrees.
    #[inline]
    pub fn colorize(&self, n: u32, max_iter: u32) -> Color {
        if n >= max_iter {
            return Color::BLACK;
        }
        let hue = (255 * u64::from(n) / u64::from(max_iter)) as f32;
        Color::from_hsv(hue, self.saturation as f32, self.value as f32)
    }
}

/// Colorize with the default palette.
#[inline]
pub fn colorize(n: u32, max_iter: u32) -> Color {
    ColorConfig::default().colorize(n, max_iter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_is_black() {
        assert_eq!(colorize(100, 100), Color::BLACK);
        assert_eq!(colorize(1, 1), Color::BLACK);
    }

    #[test]
    fn zero_iterations_is_red_leaning() {
        // Hue 0 at s = 0.5, v = 1.2: red clips, green and blue sit at
        // 1.2 * 0.5 * 255 = 153.
        assert_eq!(colorize(0, 100), Color::rgba(255, 153, 153, 255));
    }

    #[test]
    fn plain_hsv_primaries() {
        assert_eq!(Color::from_hsv(0.0, 1.0, 1.0), Color::rgba(255, 0, 0, 255));
        assert_eq!(Color::from_hsv(120.0, 1.0, 1.0), Color::rgba(0, 255, 0, 255));
        assert_eq!(Color::from_hsv(240.0, 1.0, 1.0), Color::rgba(0, 0, 255, 255));
        assert_eq!(Color::from_hsv(60.0, 0.0, 0.5), Color::rgba(127, 127, 127, 255));
    }

    #[test]
    fn same_count_same_color() {
        for n in 0..50 {
            assert_eq!(colorize(n, 50), colorize(n, 50));
            assert_eq!(colorize(n, 50).a, 255);
        }
    }

    #[test]
    fn hue_is_truncated() {
        // 255 * 1 / 100 = 2.55 degrees truncates to 2.
        assert_eq!(colorize(1, 100), Color::from_hsv(2.0, 0.5, 1.2));
        assert_ne!(colorize(1, 100), colorize(60, 100));
    }

    #[test]
    fn rejects_bad_palette() {
        assert!(ColorConfig::default().validate().is_ok());
        let bad = ColorConfig {
            saturation: -0.1,
            value: 1.0,
        };
        assert!(bad.validate().is_err());
    }
}
