//! Still-image reading and writing through the `image` crate.

use image::{ColorType, DynamicImage, ImageFormat};
use imavid_core::{ChannelLayout, Frame, ImavidError, MediaKind, Result};
use std::path::Path;
use tracing::info;

use crate::format::MediaFormat;
use crate::ImageCodec;

/// PNG and JPEG codec. The format follows the file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileCodec;

impl ImageFileCodec {
    pub fn new() -> Self {
        Self
    }
}

/// Gray sources stay single-channel, everything else becomes RGB.
fn frame_from_image(image: DynamicImage) -> Result<Frame> {
    let (width, height) = (image.width(), image.height());
    match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => Frame::new(
            width,
            height,
            ChannelLayout::Gray,
            image.into_luma8().into_raw(),
        ),
        _ => Frame::new(width, height, ChannelLayout::Rgb, image.into_rgb8().into_raw()),
    }
}

impl ImageCodec for ImageFileCodec {
    fn read_image(&self, path: &Path) -> Result<Frame> {
        MediaFormat::from_path(path, MediaKind::Image)?;
        let image = image::open(path)
            .map_err(|e| ImavidError::Decode(format!("{}: {e}", path.display())))?;
        let frame = frame_from_image(image)?;
        frame.validate()?;
        info!(
            "Loaded image {} ({}x{}, {:?})",
            path.display(),
            frame.width(),
            frame.height(),
            frame.layout()
        );
        Ok(frame)
    }

    fn write_image(&self, frame: &Frame, path: &Path) -> Result<()> {
        let format = match MediaFormat::from_path(path, MediaKind::Image)? {
            MediaFormat::Jpeg => ImageFormat::Jpeg,
            _ => ImageFormat::Png,
        };
        frame.validate()?;
        let color = match frame.layout() {
            ChannelLayout::Gray => ColorType::L8,
            ChannelLayout::Rgb => ColorType::Rgb8,
        };
        image::save_buffer_with_format(
            path,
            frame.data(),
            frame.width(),
            frame.height(),
            color,
            format,
        )
        .map_err(|e| ImavidError::Encode(format!("{}: {e}", path.display())))?;
        info!("Saved image {}", path.display());
        Ok(())
    }
}
