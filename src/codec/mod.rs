pub mod jpeg;

use std::sync::OnceLock;
use std::path::Path;

use image::RgbImage;

use crate::compress::SizeProbe;
use crate::error::SmartCompressError;

/// An encoded image held in memory.
///
/// Decoded pixels are computed on first use and kept for the lifetime of the
/// handle, so repeated encodes of the same source decode it only once.
#[derive(Clone)]
pub struct ImageData {
    bytes: Vec<u8>,
    pixels: OnceLock<RgbImage>,
}

impl ImageData {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            pixels: OnceLock::new(),
        }
    }

    pub fn open(path: &Path) -> crate::error::Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode to 8-bit RGB, dropping any alpha channel.
    pub fn pixels(&self) -> crate::error::Result<&RgbImage> {
        if let Some(pixels) = self.pixels.get() {
            return Ok(pixels);
        }
        if self.bytes.is_empty() {
            return Err(SmartCompressError::decode("image data is empty"));
        }
        let decoded = image::load_from_memory(&self.bytes)?.to_rgb8();
        Ok(self.pixels.get_or_init(|| decoded))
    }

    pub fn write_to(&self, path: &Path) -> crate::error::Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("len", &self.bytes.len())
            .field("decoded", &self.pixels.get().is_some())
            .finish()
    }
}

/// Size probe reporting the encoded byte length of an [`ImageData`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteSizeProbe;

impl SizeProbe<ImageData> for ByteSizeProbe {
    fn size_of(&self, image: &ImageData) -> crate::error::Result<u64> {
        if image.is_empty() {
            return Err(SmartCompressError::size_probe("image has no data"));
        }
        Ok(image.len() as u64)
    }
}
