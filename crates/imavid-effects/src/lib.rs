//! ImaVid Effects - CPU frame effects
//!
//! Every effect is a pure `Frame -> Frame` transform. Effects are tagged
//! variants of [`Effect`] dispatched through [`Effect::apply`]; the kernels
//! behind them live in the submodules and run row-parallel on rayon.

pub mod blur;
pub mod cartoon;
pub mod color;
pub mod convolve;
pub mod sketch;

use imavid_core::{Frame, ImavidError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Scale used by "resize bigger".
pub const RESIZE_BIGGER: f64 = 1.5;
/// Scale used by "resize smaller".
pub const RESIZE_SMALLER: f64 = 0.5;
/// Saturation factor used by "enhance colors".
pub const COLOR_BOOST: f32 = 1.5;

/// A frame transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum Effect {
    /// 3x3 sharpening kernel.
    Sharpen,
    /// Uniform scale of both axes.
    Resize { scale: f64 },
    /// Saturation multiplier.
    EnhanceColor { factor: f32 },
    /// Single-channel luminance.
    Grayscale,
    /// Bilateral smoothing with adaptive-threshold outlines.
    Cartoonize,
    /// Pencil sketch, always RGB.
    Sketch,
}

impl Effect {
    /// Apply the effect, leaving `frame` untouched.
    ///
    /// Fails with `InvalidFrame` for zero-area input and `InvalidParameter`
    /// for out-of-range constants.
    pub fn apply(&self, frame: &Frame) -> Result<Frame> {
        frame.validate()?;
        self.validate()?;
        trace!(effect = %self, width = frame.width(), height = frame.height(), "Applying effect");
        match *self {
            Self::Sharpen => convolve::sharpen(frame),
            Self::Resize { scale } => {
                let (w, h) = resized_dimensions(frame.width(), frame.height(), scale)?;
                Ok(frame.resized(w, h))
            }
            Self::EnhanceColor { factor } => color::enhance_color(frame, factor),
            Self::Grayscale => color::grayscale(frame),
            Self::Cartoonize => cartoon::cartoonize(frame),
            Self::Sketch => sketch::sketch(frame),
        }
    }

    /// Check the effect's own constants without touching a frame.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Resize { scale } if !scale.is_finite() || scale <= 0.0 => {
                Err(ImavidError::InvalidParameter(format!(
                    "resize scale must be positive, got {scale}"
                )))
            }
            Self::EnhanceColor { factor } if !factor.is_finite() || factor < 0.0 => {
                Err(ImavidError::InvalidParameter(format!(
                    "color factor must be a non-negative number, got {factor}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Command name of the effect.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sharpen => "sharpen",
            Self::Resize { .. } => "resize",
            Self::EnhanceColor { .. } => "enhance-color",
            Self::Grayscale => "grayscale",
            Self::Cartoonize => "cartoonize",
            Self::Sketch => "sketch",
        }
    }

    /// Parse an effect from its command name and optional parameter.
    ///
    /// Preset names (`resize-bigger`, `resize-smaller`, `enhance-colors`) take
    /// no parameter, and neither do the fixed effects.
    pub fn parse(name: &str, param: Option<&str>) -> Result<Self> {
        let name = name.trim().to_ascii_lowercase();
        if let Some(preset) = PRESETS.iter().find(|p| p.name == name) {
            if param.is_none() {
                return Ok(preset.effect);
            }
        }
        let effect = match name.as_str() {
            "sharpen" => no_param(&name, param, Self::Sharpen)?,
            "grayscale" | "greyscale" => no_param(&name, param, Self::Grayscale)?,
            "cartoonize" | "cartoon" => no_param(&name, param, Self::Cartoonize)?,
            "sketch" => no_param(&name, param, Self::Sketch)?,
            "resize" => Self::Resize {
                scale: parse_param(&name, param)?,
            },
            "enhance-color" | "enhance-colors" => Self::EnhanceColor {
                factor: parse_param(&name, param)?,
            },
            _ => {
                return Err(ImavidError::InvalidParameter(format!(
                    "unknown effect '{name}'"
                )))
            }
        };
        Ok(effect)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resize { scale } => write!(f, "resize({scale})"),
            Self::EnhanceColor { factor } => write!(f, "enhance-color({factor})"),
            other => f.write_str(other.name()),
        }
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, param: Option<&str>) -> Result<T> {
    let raw = param.ok_or_else(|| {
        ImavidError::InvalidParameter(format!("effect '{name}' needs a parameter"))
    })?;
    raw.trim().parse().map_err(|_| {
        ImavidError::InvalidParameter(format!("bad parameter '{raw}' for effect '{name}'"))
    })
}

fn no_param(name: &str, param: Option<&str>, effect: Effect) -> Result<Effect> {
    match param {
        None => Ok(effect),
        Some(raw) => Err(ImavidError::InvalidParameter(format!(
            "effect '{name}' takes no parameter, got '{raw}'"
        ))),
    }
}

/// Target size of a `scale` resize: each edge rounded, at least 1 pixel.
///
/// Any size is accepted as long as an RGB buffer of it can be addressed;
/// beyond that the scale is rejected as `InvalidParameter`.
pub fn resized_dimensions(width: u32, height: u32, scale: f64) -> Result<(u32, u32)> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(ImavidError::InvalidParameter(format!(
            "resize scale must be positive, got {scale}"
        )));
    }
    let w = (width as f64 * scale).round().max(1.0);
    let h = (height as f64 * scale).round().max(1.0);
    if w > u32::MAX as f64 || h > u32::MAX as f64 || w * h * 3.0 > isize::MAX as f64 {
        return Err(ImavidError::InvalidParameter(format!(
            "resize scale {scale} gives an unaddressable {w}x{h} frame"
        )));
    }
    Ok((w as u32, h as u32))
}

/// A named effect with fixed constants, as offered in the editor menus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectPreset {
    pub name: &'static str,
    pub display_name: &'static str,
    pub effect: Effect,
}

/// Built-in presets.
pub const PRESETS: &[EffectPreset] = &[
    EffectPreset {
        name: "sharpen",
        display_name: "Sharpen",
        effect: Effect::Sharpen,
    },
    EffectPreset {
        name: "resize-bigger",
        display_name: "Resize Bigger",
        effect: Effect::Resize {
            scale: RESIZE_BIGGER,
        },
    },
    EffectPreset {
        name: "resize-smaller",
        display_name: "Resize Smaller",
        effect: Effect::Resize {
            scale: RESIZE_SMALLER,
        },
    },
    EffectPreset {
        name: "enhance-colors",
        display_name: "Enhance Colors",
        effect: Effect::EnhanceColor {
            factor: COLOR_BOOST,
        },
    },
    EffectPreset {
        name: "grayscale",
        display_name: "Convert to Grayscale",
        effect: Effect::Grayscale,
    },
    EffectPreset {
        name: "cartoonize",
        display_name: "Cartoonish Effect",
        effect: Effect::Cartoonize,
    },
    EffectPreset {
        name: "sketch",
        display_name: "Sketch Effect",
        effect: Effect::Sketch,
    },
];
