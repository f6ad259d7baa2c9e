// image crate: decoded pixels -> JPEG bytes at a given quality

use super::ImageData;
use crate::compress::Encoder;
use crate::error::SmartCompressError;
use image::RgbImage;
use std::io::Cursor;

/// Lowest quality the JPEG encoder understands. Requests for 0 encode at this.
pub const MIN_ENCODER_QUALITY: u8 = 1;

/// Encode an RGB image to JPEG bytes at `quality` (0-100).
pub fn encode_rgb_to_jpeg(rgb: &RgbImage, quality: u8) -> crate::error::Result<Vec<u8>> {
    if quality > 100 {
        return Err(SmartCompressError::encode(format!(
            "JPEG quality must be 0-100, got {}",
            quality
        )));
    }
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(SmartCompressError::encode("cannot encode an empty image"));
    }

    let mut buf = Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
        &mut buf,
        quality.max(MIN_ENCODER_QUALITY),
    );
    rgb.write_with_encoder(encoder)?;

    Ok(buf.into_inner())
}

/// [`Encoder`] that re-encodes an [`ImageData`] as baseline JPEG.
///
/// Any format the `image` crate can decode is accepted as a source; the
/// output is always JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegRecompressor;

impl Encoder for JpegRecompressor {
    type Image = ImageData;

    fn compress_at_quality(
        &self,
        source: &ImageData,
        quality: u8,
    ) -> crate::error::Result<ImageData> {
        let pixels = source.pixels()?;
        let bytes = encode_rgb_to_jpeg(pixels, quality)?;
        Ok(ImageData::from_bytes(bytes))
    }
}
