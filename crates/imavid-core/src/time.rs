//! Frame rate representation.
//!
//! Rates are kept as numerator/denominator pairs so common broadcast rates
//! (24000/1001, 30000/1001) stay exact.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Playback rate of a clip, `numerator / denominator` frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FrameRate {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Build a frame rate from a real-valued fps as reported by a decoder.
    ///
    /// Returns `None` for non-finite or non-positive values.
    pub fn from_fps_f64(fps: f64) -> Option<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return None;
        }
        for known in Self::KNOWN {
            if (known.to_fps_f64() - fps).abs() < 0.001 {
                return Some(known);
            }
        }
        let ratio = Rational64::approximate_float(fps)?;
        let numerator = u32::try_from(*ratio.numer()).ok()?;
        let denominator = u32::try_from(*ratio.denom()).ok()?;
        if numerator == 0 || denominator == 0 {
            return None;
        }
        Some(Self::new(numerator, denominator))
    }

    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Both terms positive.
    pub const fn is_valid(self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Wall-clock time one frame stays on screen. A rate with a zero term
    /// plays at the default rate.
    #[inline]
    pub fn frame_interval(self) -> Duration {
        let rate = if self.is_valid() { self } else { Self::default() };
        Duration::from_secs_f64(rate.denominator as f64 / rate.numerator as f64)
    }

    // NTSC rates carry the 1001 denominator
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_50: Self = Self::new(50, 1);
    pub const FPS_59_94: Self = Self::new(60000, 1001);
    pub const FPS_60: Self = Self::new(60, 1);

    const KNOWN: [Self; 8] = [
        Self::FPS_23_976,
        Self::FPS_24,
        Self::FPS_25,
        Self::FPS_29_97,
        Self::FPS_30,
        Self::FPS_50,
        Self::FPS_59_94,
        Self::FPS_60,
    ];
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator != 0 && self.numerator % self.denominator == 0 {
            write!(f, "{} fps", self.numerator / self.denominator)
        } else {
            write!(f, "{:.3} fps", self.to_fps_f64())
        }
    }
}
