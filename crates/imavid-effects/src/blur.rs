//! Smoothing filters: Gaussian, median and bilateral.
//!
//! All filters work on any channel count and never change dimensions.

use image::{GrayImage, RgbImage};
use imageproc::filter::median_filter;
use imavid_core::{ChannelLayout, Frame, ImavidError, Result};
use rayon::prelude::*;

/// Mirror an out-of-range index without repeating the edge sample
/// (`dcb|abcd|cba`).
#[inline]
pub(crate) fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut i = i;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }
    i as usize
}

/// Clamp an out-of-range index to the nearest edge sample.
#[inline]
pub(crate) fn replicate(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

/// Sigma picked for a kernel size when none is given (`0.3*((k-1)/2 - 1) + 0.8`).
pub fn auto_sigma(ksize: usize) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian weights of odd length `ksize`.
pub fn gaussian_kernel(ksize: usize, sigma: f32) -> Vec<f32> {
    let ksize = ksize.max(1) | 1;
    let sigma = if sigma > 0.0 { sigma } else { auto_sigma(ksize) };
    let r = (ksize / 2) as isize;
    let denom = 2.0 * sigma * sigma;
    let mut weights: Vec<f32> = (-r..=r)
        .map(|i| {
            let x = i as f32;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

/// Separable Gaussian blur with a `ksize x ksize` kernel, reflect-101 border.
pub fn gaussian_blur(frame: &Frame, ksize: usize, sigma: f32) -> Result<Frame> {
    let kernel = gaussian_kernel(ksize, sigma);
    let r = (kernel.len() / 2) as isize;
    let (w, h) = (frame.width() as usize, frame.height() as usize);
    let ch = frame.channels();
    let stride = w * ch;
    let src = frame.data();

    let mut tmp = vec![0f32; src.len()];
    tmp.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        let src_row = &src[y * stride..(y + 1) * stride];
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0.0;
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = reflect101(x as isize + k as isize - r, w);
                    acc += weight * src_row[sx * ch + c] as f32;
                }
                row[x * ch + c] = acc;
            }
        }
    });

    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        for x in 0..w {
            for c in 0..ch {
                let mut acc = 0.0;
                for (k, weight) in kernel.iter().enumerate() {
                    let sy = reflect101(y as isize + k as isize - r, h);
                    acc += weight * tmp[sy * stride + x * ch + c];
                }
                row[x * ch + c] = acc.round().clamp(0.0, 255.0) as u8;
            }
        }
    });

    rebuild(frame, out)
}

/// Median of a `ksize x ksize` window per channel, edge replicated.
pub fn median_blur(frame: &Frame, ksize: usize) -> Result<Frame> {
    let radius = (ksize.max(1) / 2) as u32;
    let (w, h) = frame.dimensions();
    let data = frame.data().to_vec();
    let filtered = match frame.layout() {
        ChannelLayout::Gray => {
            let image = GrayImage::from_raw(w, h, data).ok_or_else(|| buffer_mismatch(frame))?;
            median_filter(&image, radius, radius).into_raw()
        }
        ChannelLayout::Rgb => {
            let image = RgbImage::from_raw(w, h, data).ok_or_else(|| buffer_mismatch(frame))?;
            median_filter(&image, radius, radius).into_raw()
        }
    };
    rebuild(frame, filtered)
}

fn buffer_mismatch(frame: &Frame) -> ImavidError {
    ImavidError::InvalidFrame(format!(
        "{}x{} buffer does not match its layout",
        frame.width(),
        frame.height()
    ))
}

/// Edge-preserving bilateral filter over a circular window of `diameter`.
///
/// Color distance is the sum of absolute channel differences.
pub fn bilateral_filter(
    frame: &Frame,
    diameter: usize,
    sigma_color: f32,
    sigma_space: f32,
) -> Result<Frame> {
    let r = (diameter.max(1) / 2) as isize;
    let (w, h) = (frame.width() as usize, frame.height() as usize);
    let ch = frame.channels();
    let stride = w * ch;
    let src = frame.data();

    let color_weight: Vec<f32> = (0..=255 * ch)
        .map(|d| {
            let d = d as f32;
            (-(d * d) / (2.0 * sigma_color * sigma_color)).exp()
        })
        .collect();
    let taps: Vec<(isize, isize, f32)> = (-r..=r)
        .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
        .filter(|&(dx, dy)| dx * dx + dy * dy <= r * r)
        .map(|(dx, dy)| {
            let d2 = (dx * dx + dy * dy) as f32;
            (dx, dy, (-d2 / (2.0 * sigma_space * sigma_space)).exp())
        })
        .collect();

    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        let mut acc = vec![0f32; ch];
        for x in 0..w {
            let center = &src[y * stride + x * ch..y * stride + (x + 1) * ch];
            acc.iter_mut().for_each(|a| *a = 0.0);
            let mut weight_sum = 0.0;
            for &(dx, dy, space_weight) in &taps {
                let sx = reflect101(x as isize + dx, w);
                let sy = reflect101(y as isize + dy, h);
                let sample = &src[sy * stride + sx * ch..sy * stride + (sx + 1) * ch];
                let dist: usize = sample
                    .iter()
                    .zip(center)
                    .map(|(&a, &b)| (a as i32 - b as i32).unsigned_abs() as usize)
                    .sum();
                let weight = space_weight * color_weight[dist];
                for (a, &s) in acc.iter_mut().zip(sample) {
                    *a += weight * s as f32;
                }
                weight_sum += weight;
            }
            for c in 0..ch {
                row[x * ch + c] = (acc[c] / weight_sum).round().clamp(0.0, 255.0) as u8;
            }
        }
    });

    rebuild(frame, out)
}

/// A frame with the same geometry as `like` and new samples.
pub(crate) fn rebuild(like: &Frame, data: Vec<u8>) -> Result<Frame> {
    Frame::new(like.width(), like.height(), like.layout(), data)
}
