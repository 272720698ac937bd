//! Pencil sketch via a color-dodge blend of luminance and its blurred negative.

use imavid_core::{ChannelLayout, Frame, Result};
use rayon::prelude::*;

use crate::blur::gaussian_blur;
use crate::color::grayscale;

/// Size of the Gaussian applied to the inverted luminance.
pub const SKETCH_BLUR_SIZE: usize = 21;

/// `round(a * 256 / b)` saturated to 255; zero divisors give 0.
#[inline]
pub fn divide_blend(a: u8, b: u8) -> u8 {
    if b == 0 {
        return 0;
    }
    (a as f32 * 256.0 / b as f32).round().min(255.0) as u8
}

/// Render `frame` as a pencil sketch, always returned as RGB.
pub fn sketch(frame: &Frame) -> Result<Frame> {
    let gray = grayscale(frame)?;
    let inverted = invert(&gray)?;
    let blurred = gaussian_blur(&inverted, SKETCH_BLUR_SIZE, 0.0)?;

    let data = gray
        .data()
        .par_iter()
        .zip(blurred.data().par_iter())
        .map(|(&g, &b)| divide_blend(g, 255 - b))
        .collect();

    Ok(Frame::new(gray.width(), gray.height(), ChannelLayout::Gray, data)?.into_rgb())
}

fn invert(frame: &Frame) -> Result<Frame> {
    let data = frame.data().iter().map(|v| 255 - v).collect();
    Frame::new(frame.width(), frame.height(), frame.layout(), data)
}
