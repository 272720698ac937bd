//! Luminance conversion and saturation adjustment.

use imavid_core::{ChannelLayout, Frame, Result};
use rayon::prelude::*;

/// Rec.601 luma in 8.8 fixed point. The weights sum to 256 so a neutral
/// pixel `(v, v, v)` maps back to exactly `v`.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
}

/// Single-channel luminance. Gray frames come back unchanged.
pub fn grayscale(frame: &Frame) -> Result<Frame> {
    match frame.layout() {
        ChannelLayout::Gray => Ok(frame.clone()),
        ChannelLayout::Rgb => {
            let data = frame
                .data()
                .par_chunks_exact(3)
                .map(|px| luma(px[0], px[1], px[2]))
                .collect();
            Frame::new(frame.width(), frame.height(), ChannelLayout::Gray, data)
        }
    }
}

/// Scale HSV saturation by `factor`, keeping hue and value.
///
/// With hue and value fixed every channel sits on the line from the value
/// (the max channel) towards gray, so scaling saturation is scaling each
/// channel's distance from the max. Saturation is capped at 1.
pub fn enhance_color(frame: &Frame, factor: f32) -> Result<Frame> {
    if frame.layout() == ChannelLayout::Gray {
        return Ok(frame.clone());
    }
    let mut data = frame.data().to_vec();
    data.par_chunks_exact_mut(3).for_each(|px| {
        let max = px.iter().copied().max().unwrap_or(0) as f32;
        let min = px.iter().copied().min().unwrap_or(0) as f32;
        if max <= 0.0 || max == min {
            return;
        }
        let saturation = (max - min) / max;
        let boosted = (saturation * factor).min(1.0);
        let ratio = boosted / saturation;
        for c in px.iter_mut() {
            let v = max - (max - *c as f32) * ratio;
            *c = v.round().clamp(0.0, 255.0) as u8;
        }
    });
    Frame::new(frame.width(), frame.height(), ChannelLayout::Rgb, data)
}
