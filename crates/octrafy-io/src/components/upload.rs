//! Image picker with drag-and-drop.

use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdUpload;
use octrafy_compositor::{DecodedImage, InputError, input};
use tracing::{info, warn};

use crate::alert;

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// Name of the image currently held by the session, if any.
    current: Option<String>,
    /// Called with the encoded image after a successful upload.
    on_upload: EventHandler<DecodedImage>,
}

/// Check the type, read the bytes, and encode them as a data URL.
///
/// The type is checked before reading so non-images are never loaded.
async fn read_upload(file: &FileData) -> Result<DecodedImage, InputError> {
    let name = file.name();
    let reported = file.content_type();
    let mime = input::resolve_mime(&name, reported.as_deref())?;
    let bytes = file
        .read_bytes()
        .await
        .map_err(|e| InputError::FileRead(e.to_string()))?;
    DecodedImage::from_upload(&name, Some(&mime), &bytes)
}

/// A drop zone with an `image/*` file picker.
///
/// A non-image file or a failed read raises an alert and leaves the
/// current image untouched.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);

    // Shared by the picker and drag-and-drop paths.
    let process_files = move |files: Vec<FileData>| async move {
        let Some(file) = files.first() else {
            return;
        };
        match read_upload(file).await {
            Ok(image) => {
                info!(file_name = image.file_name(), "upload read");
                props.on_upload.call(image);
            }
            Err(e) => {
                warn!(%e, "upload rejected");
                alert::notify(&upload_message(&e));
            }
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        process_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        process_files(evt.files()).await;
    };

    let zone_class = if dragging() {
        "drop-zone drop-zone-active"
    } else {
        "drop-zone"
    };

    rsx! {
        div {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            if let Some(ref name) = props.current {
                p { class: "upload-loaded", "Loaded: {name}" }
            }

            label { class: "btn btn-secondary",
                input {
                    r#type: "file",
                    accept: "image/*",
                    class: "hidden",
                    onchange: handle_files,
                }
                Icon { width: 16, height: 16, icon: LdUpload }
                "Choose image"
            }

            p { class: "hint", "or drop one here" }
        }
    }
}

/// User-facing text for a rejected upload.
fn upload_message(error: &InputError) -> String {
    match error {
        InputError::InvalidFileType { .. } => "Please upload an image file".to_owned(),
        InputError::FileRead(_) => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_type_message_matches_prompt() {
        let e = InputError::InvalidFileType {
            mime: "text/plain".into(),
        };
        assert_eq!(upload_message(&e), "Please upload an image file");
    }

    #[test]
    fn read_failure_message_carries_cause() {
        let e = InputError::FileRead("disk gone".into());
        assert!(upload_message(&e).contains("disk gone"));
    }
}
