//! Input stage: MIME checking and data URL encoding of uploads.
//!
//! The browser hands over a file name, an optional MIME type and (after
//! an asynchronous read) the file bytes. This module decides whether
//! the file is acceptable and turns it into a [`DecodedImage`] that the
//! UI can display and the compositor can load.

use image::ImageFormat;
use tracing::debug;

use crate::data_url::DataUrl;
use crate::types::{ComposeError, InputError, RgbaImage};

/// Prefix every accepted MIME type must carry.
const IMAGE_MIME_PREFIX: &str = "image/";

/// Determine the MIME type of an upload and check that it is an image.
///
/// The type reported by the browser wins when present and non-empty.
/// Otherwise the type is inferred from the file extension, as some
/// platforms report an empty type for perfectly valid images.
///
/// # Errors
///
/// Returns [`InputError::InvalidFileType`] if the resolved type does
/// not start with `image/`, or if no type can be determined.
pub fn resolve_mime(file_name: &str, reported: Option<&str>) -> Result<String, InputError> {
    let mime = match reported.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime.to_ascii_lowercase(),
        None => ImageFormat::from_path(file_name)
            .map(|format| format.to_mime_type().to_owned())
            .unwrap_or_default(),
    };

    if mime.starts_with(IMAGE_MIME_PREFIX) {
        Ok(mime)
    } else {
        debug!(file_name, %mime, "rejected upload with non-image type");
        Err(InputError::InvalidFileType { mime })
    }
}

/// An uploaded image held entirely in memory as a data URL.
///
/// Replaced wholesale on every new upload; never partially filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    file_name: String,
    mime: String,
    data_url: DataUrl,
}

impl DecodedImage {
    /// Validate the upload's type and encode its bytes as a data URL.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidFileType`] under the same rules as
    /// [`resolve_mime`].
    pub fn from_upload(
        file_name: &str,
        reported_mime: Option<&str>,
        bytes: &[u8],
    ) -> Result<Self, InputError> {
        let mime = resolve_mime(file_name, reported_mime)?;
        let data_url = DataUrl::encode(&mime, bytes);
        debug!(file_name, %mime, len = bytes.len(), "encoded upload as data URL");
        Ok(Self {
            file_name: file_name.to_owned(),
            mime,
            data_url,
        })
    }

    /// Name of the uploaded file.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Resolved MIME type (always `image/...`).
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// The displayable data URL.
    #[must_use]
    pub const fn data_url(&self) -> &DataUrl {
        &self.data_url
    }

    /// Load the image pixels back out of the data URL.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::ImageLoad`] if the payload is empty, is
    /// not valid base64, or is not an image the `image` crate decodes.
    pub fn load(&self) -> Result<RgbaImage, ComposeError> {
        let bytes = self.data_url.decode()?;
        if bytes.is_empty() {
            return Err(ComposeError::ImageLoad("image data is empty".into()));
        }
        // Magic bytes first; TGA has none, so fall back to the type.
        let format = image::guess_format(&bytes)
            .ok()
            .or_else(|| ImageFormat::from_mime_type(&self.mime))
            .or_else(|| ImageFormat::from_path(&self.file_name).ok());
        let image = match format {
            Some(format) => image::load_from_memory_with_format(&bytes, format),
            None => image::load_from_memory(&bytes),
        }
        .map_err(|e| ComposeError::ImageLoad(e.to_string()))?;
        Ok(image.to_rgba8())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn reported_image_mime_is_accepted() {
        assert_eq!(
            resolve_mime("photo.bin", Some("image/jpeg")).unwrap(),
            "image/jpeg"
        );
    }

    #[test]
    fn reported_mime_is_normalized() {
        assert_eq!(
            resolve_mime("a.png", Some(" Image/PNG ")).unwrap(),
            "image/png"
        );
    }

    #[test]
    fn text_mime_is_rejected_even_with_image_extension() {
        let err = resolve_mime("notes.png", Some("text/plain")).unwrap_err();
        assert_eq!(
            err,
            InputError::InvalidFileType {
                mime: "text/plain".into()
            }
        );
    }

    #[test]
    fn missing_mime_falls_back_to_extension() {
        assert_eq!(resolve_mime("cat.JPG", None).unwrap(), "image/jpeg");
        assert_eq!(resolve_mime("cat.webp", Some("")).unwrap(), "image/webp");
    }

    #[test]
    fn missing_mime_with_unknown_extension_is_rejected() {
        let err = resolve_mime("notes.txt", None).unwrap_err();
        assert_eq!(err, InputError::InvalidFileType { mime: String::new() });
    }

    #[test]
    fn from_upload_encodes_data_url() {
        let bytes = png_bytes(3, 2);
        let decoded = DecodedImage::from_upload("tiny.png", Some("image/png"), &bytes).unwrap();
        assert_eq!(decoded.file_name(), "tiny.png");
        assert_eq!(decoded.mime(), "image/png");
        assert!(
            decoded
                .data_url()
                .as_str()
                .starts_with("data:image/png;base64,")
        );
        assert_eq!(decoded.data_url().decode().unwrap(), bytes);
    }

    #[test]
    fn load_restores_pixels() {
        let decoded =
            DecodedImage::from_upload("tiny.png", Some("image/png"), &png_bytes(3, 2)).unwrap();
        let image = decoded.load().unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(1, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn load_decodes_every_enabled_format() {
        let img = image::RgbaImage::from_pixel(4, 3, image::Rgba([200, 100, 50, 255]));
        for (format, mime) in [
            (image::ImageFormat::Png, "image/png"),
            (image::ImageFormat::Ico, "image/x-icon"),
            (image::ImageFormat::Tiff, "image/tiff"),
            (image::ImageFormat::Tga, "image/x-tga"),
            (image::ImageFormat::Qoi, "image/qoi"),
        ] {
            let mut buf = std::io::Cursor::new(Vec::new());
            image::DynamicImage::ImageRgba8(img.clone())
                .write_to(&mut buf, format)
                .unwrap();
            let name = format!("upload.{}", format.extensions_str()[0]);
            let decoded = DecodedImage::from_upload(&name, Some(mime), buf.get_ref()).unwrap();
            let loaded = decoded.load().unwrap();
            assert_eq!(loaded.dimensions(), (4, 3), "{format:?}");
            assert_eq!(loaded.get_pixel(2, 1).0, [200, 100, 50, 255], "{format:?}");
        }
    }

    #[test]
    fn svg_upload_is_accepted_but_cannot_be_loaded() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#;
        let decoded = DecodedImage::from_upload("logo.svg", Some("image/svg+xml"), svg).unwrap();
        assert!(matches!(decoded.load(), Err(ComposeError::ImageLoad(_))));
    }

    #[test]
    fn load_of_non_image_bytes_fails() {
        let decoded =
            DecodedImage::from_upload("fake.png", Some("image/png"), b"definitely not a png")
                .unwrap();
        assert!(matches!(decoded.load(), Err(ComposeError::ImageLoad(_))));
    }

    #[test]
    fn load_of_empty_file_fails() {
        let decoded = DecodedImage::from_upload("empty.png", Some("image/png"), &[]).unwrap();
        assert!(matches!(decoded.load(), Err(ComposeError::ImageLoad(_))));
    }
}
