//! octrafy-compositor: profile-picture compositing core (sans-IO).
//!
//! Turns an uploaded image into a circular, bordered PNG:
//! data URL -> decode -> circle-clipped draw -> border stroke -> PNG,
//! and names the result after the user.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. File pickers, downloads and
//! alerts live in `octrafy-io`; the filesystem lives in `octrafy-render`.

pub mod artifact;
pub mod data_url;
pub mod fault;
pub mod filename;
pub mod input;
pub mod session;
pub mod surface;
pub mod types;

pub use artifact::{CompositeArtifact, PNG_MIME};
pub use data_url::DataUrl;
pub use fault::IgnoreList;
pub use input::DecodedImage;
pub use session::{ExportRequest, ExportState, Phase, Session, SessionError};
pub use types::{ComposeError, ConfigError, Dimensions, InputError, PfpConfig, Rgb, RgbaImage};

use tracing::debug;

/// A serialized profile picture ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PfpExport {
    /// Download name, `<sanitized-username><suffix>`.
    pub file_name: String,
    /// PNG bytes.
    pub png: Vec<u8>,
}

/// Composite an already loaded image onto a fresh surface.
///
/// # Errors
///
/// Returns [`ComposeError::InvalidConfig`] for an invalid `config`,
/// [`ComposeError::SurfaceUnavailable`] if the surface cannot be
/// allocated, and [`ComposeError::ImageLoad`] for an image with no
/// pixels.
pub fn compose(source: &RgbaImage, config: &PfpConfig) -> Result<CompositeArtifact, ComposeError> {
    Ok(surface::Surface::allocate(config)?
        .clear()
        .draw_clipped(source)?
        .stroke_border()
        .into_artifact())
}

/// Load `source`, composite it, and serialize the result as a named PNG.
///
/// # Steps
///
/// 1. Allocate and clear a `canvas_size` square surface
/// 2. Load the image from its data URL
/// 3. Draw it stretched to the circle's bounding square, clipped to the circle
/// 4. Stroke the circle outline (unclipped)
/// 5. Encode PNG at the strongest compression level
/// 6. Derive the file name from `username`
///
/// Saving the bytes is left to the caller.
///
/// # Errors
///
/// Returns [`ComposeError::ImageLoad`] if the image cannot be loaded,
/// [`ComposeError::SurfaceUnavailable`] if the surface cannot be
/// allocated, [`ComposeError::PngEncode`] if encoding fails, and
/// [`ComposeError::InvalidConfig`] for an invalid `config`.
pub fn export_circular_pfp(
    source: &DecodedImage,
    username: &str,
    config: &PfpConfig,
) -> Result<PfpExport, ComposeError> {
    let surface = surface::Surface::allocate(config)?.clear();
    let image = source.load()?;
    let artifact = surface
        .draw_clipped(&image)?
        .stroke_border()
        .into_artifact();
    let png = artifact.to_png()?;
    let file_name = filename::download_name(username, &config.file_suffix);
    debug!(%file_name, bytes = png.len(), "exported profile picture");
    Ok(PfpExport { file_name, png })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn png_upload(width: u32, height: u32) -> DecodedImage {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([40, 90, 160, 255]));
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
        DecodedImage::from_upload("me.png", Some("image/png"), &buf).unwrap()
    }

    #[test]
    fn export_names_file_after_username() {
        let export = export_circular_pfp(&png_upload(8, 8), "ray@0x!", &PfpConfig::default())
            .unwrap();
        assert_eq!(export.file_name, "ray_0x_-octrafied-pfp.png");
    }

    #[test]
    fn export_produces_canvas_sized_png() {
        let export =
            export_circular_pfp(&png_upload(300, 120), "alice", &PfpConfig::default()).unwrap();
        let decoded = image::load_from_memory(&export.png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 200));
    }

    #[test]
    fn export_of_undecodable_image_is_image_load_error() {
        let broken = DecodedImage::from_upload("x.png", Some("image/png"), b"nope").unwrap();
        let result = export_circular_pfp(&broken, "alice", &PfpConfig::default());
        assert!(matches!(result, Err(ComposeError::ImageLoad(_))));
    }

    #[test]
    fn export_with_invalid_config_fails_before_loading() {
        let broken = DecodedImage::from_upload("x.png", Some("image/png"), b"nope").unwrap();
        let config = PfpConfig {
            radius: 0.0,
            ..PfpConfig::default()
        };
        let result = export_circular_pfp(&broken, "alice", &config);
        assert!(matches!(result, Err(ComposeError::InvalidConfig(_))));
    }

    #[test]
    fn compose_matches_export_pixels() {
        let upload = png_upload(16, 16);
        let artifact = compose(&upload.load().unwrap(), &PfpConfig::default()).unwrap();
        let export = export_circular_pfp(&upload, "alice", &PfpConfig::default()).unwrap();
        let decoded = image::load_from_memory(&export.png).unwrap().to_rgba8();
        assert_eq!(decoded.as_raw(), artifact.image().as_raw());
    }
}
