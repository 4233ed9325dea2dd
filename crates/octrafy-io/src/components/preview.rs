//! Composited preview of the profile picture.

use dioxus::prelude::*;
use octrafy_compositor::{ComposeError, DataUrl, DecodedImage, PfpConfig};
use tracing::warn;

/// Props for the [`PfpPreview`] component.
#[derive(Props, Clone, PartialEq)]
pub struct PfpPreviewProps {
    /// The uploaded image.
    image: DecodedImage,
    /// Compositing parameters, the same ones the export uses.
    config: PfpConfig,
}

/// Load and composite `image`, returning the result as a PNG data URL.
fn render_preview(image: &DecodedImage, config: &PfpConfig) -> Result<DataUrl, ComposeError> {
    let source = image.load()?;
    octrafy_compositor::compose(&source, config)?.to_data_url()
}

/// Shows the exact picture the download will contain.
///
/// The composite is memoized on the image and config, so typing or
/// other re-renders do not repeat the work.
#[component]
pub fn PfpPreview(props: PfpPreviewProps) -> Element {
    let image = props.image.clone();
    let config = props.config.clone();
    let rendered = use_memo(use_reactive!(|(image, config)| {
        render_preview(&image, &config).map_err(|e| {
            warn!(%e, "preview failed");
            e.to_string()
        })
    }));

    let size = props.config.canvas_size;

    rsx! {
        div { class: "preview",
            match &*rendered.read() {
                Ok(url) => rsx! {
                    img {
                        class: "preview-image",
                        src: "{url}",
                        width: "{size}",
                        height: "{size}",
                        alt: "Profile picture preview",
                    }
                },
                Err(message) => rsx! {
                    p { class: "text-error", "Preview unavailable: {message}" }
                },
            }
        }
    }
}
