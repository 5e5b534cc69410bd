/// Image decoding collaborator
///
/// The pipeline only needs "file → width, height, channel count, bytes".
/// [`ImageCrateDecoder`] provides that through the `image` crate; tests
/// inject their own decoder through the render context.

use std::path::Path;

use crate::error::{Error, Result};

/// Decoded 8-bit image, rows tightly packed, first row at the top
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub pixels: Vec<u8>,
}

/// Decodes image files into raw pixels
pub trait ImageDecoder {
    /// # Errors
    ///
    /// `Error::Texture` with the decoder's reason when the file is missing
    /// or cannot be decoded.
    fn decode(&self, path: &Path) -> Result<DecodedImage>;
}

/// Decoder backed by the `image` crate
///
/// Keeps the file's channel count (1, 2, 3 or 4) and converts every
/// sample to 8 bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let image = image::open(path).map_err(|e| Error::Texture(e.to_string()))?;
        let (width, height) = (image.width(), image.height());
        let channels = u32::from(image.color().channel_count());

        let pixels = match channels {
            1 => image.into_luma8().into_raw(),
            2 => image.into_luma_alpha8().into_raw(),
            3 => image.into_rgb8().into_raw(),
            _ => image.into_rgba8().into_raw(),
        };

        Ok(DecodedImage { width, height, channels: channels.min(4), pixels })
    }
}
