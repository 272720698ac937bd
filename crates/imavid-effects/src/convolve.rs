//! 3x3 convolution and the sharpen kernel.

use imavid_core::{Frame, Result};
use rayon::prelude::*;

use crate::blur::{rebuild, reflect101};

/// Classic unsharp 3x3 kernel: boosts the center against its 4-neighbours.
pub const SHARPEN_KERNEL: [[i32; 3]; 3] = [[0, -1, 0], [-1, 5, -1], [0, -1, 0]];

/// Convolve every channel with an integer 3x3 kernel.
///
/// Borders are mirrored without repeating the edge sample; results saturate
/// to `0..=255`.
pub fn convolve3x3(frame: &Frame, kernel: &[[i32; 3]; 3]) -> Result<Frame> {
    let (w, h) = (frame.width() as usize, frame.height() as usize);
    let ch = frame.channels();
    let stride = w * ch;
    let src = frame.data();

    let mut out = vec![0u8; src.len()];
    out.par_chunks_mut(stride).enumerate().for_each(|(y, row)| {
        let rows = [
            reflect101(y as isize - 1, h),
            y,
            reflect101(y as isize + 1, h),
        ];
        for x in 0..w {
            let cols = [
                reflect101(x as isize - 1, w),
                x,
                reflect101(x as isize + 1, w),
            ];
            for c in 0..ch {
                let mut acc = 0i32;
                for (ky, &sy) in rows.iter().enumerate() {
                    for (kx, &sx) in cols.iter().enumerate() {
                        let k = kernel[ky][kx];
                        if k != 0 {
                            acc += k * src[sy * stride + sx * ch + c] as i32;
                        }
                    }
                }
                row[x * ch + c] = acc.clamp(0, 255) as u8;
            }
        }
    });

    rebuild(frame, out)
}

/// Increase local contrast at edges.
pub fn sharpen(frame: &Frame) -> Result<Frame> {
    convolve3x3(frame, &SHARPEN_KERNEL)
}
