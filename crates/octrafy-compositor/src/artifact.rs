//! The composited profile picture and its PNG serialization.

use image::ImageEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use crate::data_url::DataUrl;
use crate::types::{ComposeError, Dimensions, RgbaImage};

/// MIME type of every serialized artifact.
pub const PNG_MIME: &str = "image/png";

/// A finished composition in straight (non-premultiplied) RGBA.
///
/// Built fresh for every export and dropped once serialized.
#[derive(Debug, Clone)]
pub struct CompositeArtifact {
    image: RgbaImage,
}

impl CompositeArtifact {
    pub(crate) const fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Pixel dimensions of the artifact.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    /// The composited pixels.
    #[must_use]
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the artifact and return the composited pixels.
    #[must_use]
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Serialize to an RGBA PNG using the strongest compression level.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::PngEncode`] if the encoder fails.
    pub fn to_png(&self) -> Result<Vec<u8>, ComposeError> {
        let mut png = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut png, CompressionType::Best, FilterType::Adaptive);
        encoder.write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(png)
    }

    /// Serialize to PNG and wrap it in a data URL for inline preview.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::PngEncode`] if the encoder fails.
    pub fn to_data_url(&self) -> Result<DataUrl, ComposeError> {
        Ok(DataUrl::encode(PNG_MIME, &self.to_png()?))
    }
}
