//! Download and start-over controls for the previewing half.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdDownload, LdRotateCcw};
use octrafy_compositor::{PfpConfig, Session};

use crate::export::run_export;

/// Props for the [`ExportPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ExportPanelProps {
    /// The page's session.
    session: Signal<Session>,
    /// Compositing parameters for the download.
    config: PfpConfig,
}

/// Download button and start-over button.
///
/// The download button is disabled while an export is in flight; a
/// click that races past it is refused by the session anyway.
#[component]
pub fn ExportPanel(props: ExportPanelProps) -> Element {
    let mut session = props.session;
    let busy = session.read().is_exporting();
    let username = session.read().username().to_owned();

    let download_click = {
        let config = props.config.clone();
        move |_| {
            let config = config.clone();
            spawn(async move {
                run_export(session, config).await;
            });
        }
    };

    rsx! {
        div { class: "card export-panel",
            p { class: "greeting", "Looking good, {username}!" }

            div { class: "button-row",
                button {
                    class: if busy { "btn btn-disabled" } else { "btn btn-primary" },
                    disabled: busy,
                    onclick: download_click,
                    Icon { width: 16, height: 16, icon: LdDownload }
                    if busy { "Preparing…" } else { "Download PFP" }
                }
                button {
                    class: "btn btn-secondary",
                    disabled: busy,
                    onclick: move |_| session.write().reset(),
                    Icon { width: 16, height: 16, icon: LdRotateCcw }
                    "Start over"
                }
            }
        }
    }
}
