//! Username field, image picker, and the submit button.

use dioxus::prelude::*;
use octrafy_compositor::Session;

use super::upload::FileUpload;

/// Props for the [`ProfileForm`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ProfileFormProps {
    /// The page's session.
    session: Signal<Session>,
    /// Longest username the field accepts.
    max_username_len: usize,
}

/// The editing half of the page.
///
/// Submitting moves the session to previewing; the button stays
/// disabled until the username is non-blank and an image is loaded.
#[component]
pub fn ProfileForm(props: ProfileFormProps) -> Element {
    let mut session = props.session;
    let username = session.read().username().to_owned();
    let current = session
        .read()
        .source_image()
        .map(|image| image.file_name().to_owned());
    let ready = session.read().can_submit();

    rsx! {
        form {
            class: "card",
            onsubmit: move |evt: FormEvent| {
                evt.prevent_default();
                session.write().submit();
            },

            label { class: "field-label", r#for: "username", "Username" }
            input {
                id: "username",
                class: "text-input",
                r#type: "text",
                placeholder: "your handle",
                maxlength: "{props.max_username_len}",
                autocomplete: "off",
                value: "{username}",
                oninput: move |evt: FormEvent| session.write().set_username(&evt.value()),
            }

            FileUpload {
                current,
                on_upload: move |image| session.write().set_image(image),
            }

            button {
                class: if ready { "btn btn-primary" } else { "btn btn-disabled" },
                r#type: "submit",
                disabled: !ready,
                "Octrafy"
            }
        }
    }
}
