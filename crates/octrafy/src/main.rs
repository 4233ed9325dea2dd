use dioxus::prelude::*;
use octrafy_compositor::{IgnoreList, PfpConfig, Phase, Session};
use octrafy_io::{ExportPanel, FaultBoundary, PfpPreview, ProfileForm};

fn main() {
    dioxus::launch(app);
}

/// Root application component.
///
/// Owns the single [`Session`] signal and the compositing config, and
/// shows either the editing form or the preview depending on the phase.
fn app() -> Element {
    let config = use_hook(PfpConfig::default);
    let session = use_signal(|| Session::new(&config));

    use_hook(|| tracing::info!(canvas = config.canvas_size, "octrafy started"));

    rsx! {
        // Plain stylesheet; no build step.
        style { dangerous_inner_html: include_str!("../assets/theme.css") }

        div { class: "page",
            header { class: "page-header",
                h1 { class: "title-brand", "octrafy" }
                p { class: "hint", "Circular, bordered profile pictures. Nothing leaves your browser." }
            }

            main { class: "page-main",
                FaultBoundary { ignore: IgnoreList::default(),
                    Workspace { session, config: config.clone() }
                }
            }

            footer { class: "page-footer",
                "Made for the Octra community"
            }
        }
    }
}

/// Props for the [`Workspace`] component.
#[derive(Props, Clone, PartialEq)]
struct WorkspaceProps {
    session: Signal<Session>,
    config: PfpConfig,
}

/// The form or the preview, by phase.
#[component]
fn Workspace(props: WorkspaceProps) -> Element {
    let session = props.session;
    let phase = session.read().phase();
    let image = session.read().source_image().cloned();

    match (phase, image) {
        (Phase::Previewing, Some(image)) => rsx! {
            PfpPreview { image, config: props.config.clone() }
            ExportPanel { session, config: props.config }
        },
        _ => rsx! {
            ProfileForm { session, max_username_len: props.config.max_username_len }
        },
    }
}
