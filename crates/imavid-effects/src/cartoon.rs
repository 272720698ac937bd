//! Cartoon look: flattened colors outlined by detected edges.

use imavid_core::{ChannelLayout, Frame, Result};
use rayon::prelude::*;

use crate::blur::{bilateral_filter, median_blur, replicate};
use crate::color::grayscale;

/// Bilateral window diameter.
pub const SMOOTH_DIAMETER: usize = 9;
/// Bilateral color and space sigma.
pub const SMOOTH_SIGMA: f32 = 300.0;
/// Median window applied to luminance before edge detection.
pub const EDGE_MEDIAN_SIZE: usize = 7;
/// Neighbourhood used for the adaptive threshold.
pub const EDGE_BLOCK_SIZE: usize = 9;
/// Offset subtracted from the local mean.
pub const EDGE_OFFSET: i32 = 9;

/// Binary mask: 255 where a gray sample is brighter than its local mean minus
/// `offset`, 0 elsewhere. The mean is taken over a `block x block` window
/// with replicated edges, summed as a horizontal then a vertical pass.
pub fn adaptive_threshold_mean(gray: &Frame, block: usize, offset: i32) -> Result<Frame> {
    let r = (block.max(1) / 2) as isize;
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let src = gray.data();
    let area = ((2 * r + 1) * (2 * r + 1)) as u32;

    let mut row_sums = vec![0u32; src.len()];
    row_sums
        .par_chunks_mut(w)
        .zip(src.par_chunks(w))
        .for_each(|(dst, row)| {
            for (x, sum) in dst.iter_mut().enumerate() {
                *sum = (-r..=r)
                    .map(|dx| row[replicate(x as isize + dx, w)] as u32)
                    .sum();
            }
        });

    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, dst) in row.iter_mut().enumerate() {
            let sum: u32 = (-r..=r)
                .map(|dy| row_sums[replicate(y as isize + dy, h) * w + x])
                .sum();
            let mean = ((sum + area / 2) / area) as i32;
            *dst = if src[y * w + x] as i32 > mean - offset {
                255
            } else {
                0
            };
        }
    });

    Frame::new(gray.width(), gray.height(), ChannelLayout::Gray, out)
}

/// Smooth colors with a bilateral filter and black out detected edges.
pub fn cartoonize(frame: &Frame) -> Result<Frame> {
    let color = bilateral_filter(frame, SMOOTH_DIAMETER, SMOOTH_SIGMA, SMOOTH_SIGMA)?;
    let gray = median_blur(&grayscale(frame)?, EDGE_MEDIAN_SIZE)?;
    let edges = adaptive_threshold_mean(&gray, EDGE_BLOCK_SIZE, EDGE_OFFSET)?;

    let ch = color.channels();
    let mask = edges.data();
    let mut data = color.into_data();
    data.par_chunks_exact_mut(ch)
        .zip(mask.par_iter())
        .for_each(|(px, &m)| {
            if m == 0 {
                px.fill(0);
            }
        });

    Frame::new(frame.width(), frame.height(), frame.layout(), data)
}
