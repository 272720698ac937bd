//! Frame buffer type for decoded still images and video frames.
//!
//! A [`Frame`] is a tightly packed, row-major, 8-bit raster. Its pixel data
//! can only be reached through shared borrows or by consuming the frame, so a
//! frame handed to another component is never changed underneath it.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::{ImavidError, Result};

/// Channel layout of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelLayout {
    /// Single luminance channel
    Gray,
    /// 8-bit red, green, blue
    #[default]
    Rgb,
}

impl ChannelLayout {
    /// Samples per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
        }
    }

    /// Layout for a channel count, if supported.
    pub fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(Self::Gray),
            3 => Some(Self::Rgb),
            _ => None,
        }
    }

    /// Bytes needed for a frame of this layout.
    #[inline]
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.channels()
    }
}

/// A decoded raster image in CPU memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap an existing pixel buffer.
    ///
    /// Fails with `InvalidFrame` when the buffer length does not match
    /// `width * height * channels`.
    pub fn new(width: u32, height: u32, layout: ChannelLayout, data: Vec<u8>) -> Result<Self> {
        let expected = layout.frame_size(width, height);
        if data.len() != expected {
            return Err(ImavidError::InvalidFrame(format!(
                "{}x{} {:?} frame needs {} bytes, got {}",
                width,
                height,
                layout,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// A frame with every sample set to `value`.
    pub fn filled(width: u32, height: u32, layout: ChannelLayout, value: u8) -> Self {
        Self {
            width,
            height,
            layout,
            data: vec![value; layout.frame_size(width, height)],
        }
    }

    /// Build a frame by evaluating `f(x, y, channel)` for every sample.
    pub fn from_fn(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        mut f: impl FnMut(u32, u32, usize) -> u8,
    ) -> Self {
        let channels = layout.channels();
        let mut data = Vec::with_capacity(layout.frame_size(width, height));
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Self {
            width,
            height,
            layout,
            data,
        }
    }

    /// Create a test pattern frame (color bars).
    pub fn test_pattern(width: u32, height: u32) -> Self {
        const BARS: [[u8; 3]; 8] = [
            [255, 255, 255], // White
            [255, 255, 0],   // Yellow
            [0, 255, 255],   // Cyan
            [0, 255, 0],     // Green
            [255, 0, 255],   // Magenta
            [255, 0, 0],     // Red
            [0, 0, 255],     // Blue
            [0, 0, 0],       // Black
        ];
        Self::from_fn(width, height, ChannelLayout::Rgb, |x, _, c| {
            BARS[(x * 8 / width.max(1)) as usize][c]
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)` in pixels.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Raw row-major samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the raw samples.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels()
    }

    /// True when the frame has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Reject zero-area frames.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ImavidError::InvalidFrame(format!(
                "zero-area frame ({}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Samples of one row.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Samples of one pixel.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let channels = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.data[start..start + channels]
    }

    /// Memory used by the pixel buffer in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len()
    }

    /// This frame in RGB layout, replicating the luminance of gray frames.
    pub fn to_rgb(&self) -> Cow<'_, Frame> {
        match self.layout {
            ChannelLayout::Rgb => Cow::Borrowed(self),
            ChannelLayout::Gray => Cow::Owned(self.expand_gray()),
        }
    }

    /// Consuming variant of [`Frame::to_rgb`].
    pub fn into_rgb(self) -> Frame {
        match self.layout {
            ChannelLayout::Rgb => self,
            ChannelLayout::Gray => self.expand_gray(),
        }
    }

    fn expand_gray(&self) -> Frame {
        let data = self.data.iter().flat_map(|&v| [v, v, v]).collect();
        Frame {
            width: self.width,
            height: self.height,
            layout: ChannelLayout::Rgb,
            data,
        }
    }

    /// Bilinear resample to `width x height` (each clamped to at least 1).
    ///
    /// Sample positions are pixel-center aligned and clamped at the edges.
    pub fn resized(&self, width: u32, height: u32) -> Frame {
        let width = width.max(1);
        let height = height.max(1);
        if (width, height) == self.dimensions() || self.is_empty() {
            return Frame {
                width,
                height,
                layout: self.layout,
                data: if self.is_empty() {
                    vec![0; self.layout.frame_size(width, height)]
                } else {
                    self.data.clone()
                },
            };
        }

        let channels = self.channels();
        let xs = sample_taps(self.width, width);
        let ys = sample_taps(self.height, height);
        let dst_stride = width as usize * channels;
        let mut data = vec![0u8; dst_stride * height as usize];

        data.par_chunks_mut(dst_stride)
            .zip(ys.par_iter())
            .for_each(|(dst_row, &(y0, y1, wy))| {
                let top = self.row(y0);
                let bottom = self.row(y1);
                for (dx, &(x0, x1, wx)) in xs.iter().enumerate() {
                    for c in 0..channels {
                        let a = top[x0 as usize * channels + c] as f32;
                        let b = top[x1 as usize * channels + c] as f32;
                        let d = bottom[x0 as usize * channels + c] as f32;
                        let e = bottom[x1 as usize * channels + c] as f32;
                        let upper = a + (b - a) * wx;
                        let lower = d + (e - d) * wx;
                        let v = upper + (lower - upper) * wy;
                        dst_row[dx * channels + c] = v.round().clamp(0.0, 255.0) as u8;
                    }
                }
            });

        Frame {
            width,
            height,
            layout: self.layout,
            data,
        }
    }

    /// Shrink to fit inside a `max x max` box, keeping the aspect ratio.
    ///
    /// Frames already inside the box are returned unchanged; this never
    /// enlarges.
    pub fn thumbnail(&self, max: u32) -> Cow<'_, Frame> {
        let max = max.max(1);
        if self.width <= max && self.height <= max {
            return Cow::Borrowed(self);
        }
        let scale = f64::min(
            max as f64 / self.width as f64,
            max as f64 / self.height as f64,
        );
        let w = ((self.width as f64 * scale).round() as u32).clamp(1, max);
        let h = ((self.height as f64 * scale).round() as u32).clamp(1, max);
        Cow::Owned(self.resized(w, h))
    }
}

/// For each destination coordinate: the two source taps and the weight of the
/// second one.
fn sample_taps(src_len: u32, dst_len: u32) -> Vec<(u32, u32, f32)> {
    let ratio = src_len as f32 / dst_len as f32;
    let last = src_len.saturating_sub(1);
    (0..dst_len)
        .map(|d| {
            let pos = ((d as f32 + 0.5) * ratio - 0.5).clamp(0.0, last as f32);
            let p0 = pos.floor() as u32;
            let p1 = (p0 + 1).min(last);
            (p0, p1, pos - p0 as f32)
        })
        .collect()
}
