//! Page-level recovery screen.

use std::cell::Cell;
use std::rc::Rc;

use dioxus::prelude::*;
use octrafy_compositor::IgnoreList;
use tracing::error;

use crate::fault::{IgnoreLatch, RenderVerdict, UnexpectedError, WindowFaultListener};

/// Props for the [`FaultBoundary`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FaultBoundaryProps {
    /// Faults whose message matches are ignored.
    #[props(default)]
    ignore: IgnoreList,
    children: Element,
}

/// Wraps the page and swaps it for a recovery screen when a fault
/// escapes every closer handler.
///
/// Render faults come from Dioxus's `ErrorBoundary`; script errors and
/// unhandled promise rejections come from window listeners that live as
/// long as this component.
#[component]
pub fn FaultBoundary(props: FaultBoundaryProps) -> Element {
    let mut window_fault = use_signal(|| Option::<UnexpectedError>::None);
    // Not a signal: `handle_error` updates it during render.
    let latch = use_hook(|| Rc::new(Cell::new(IgnoreLatch::default())));

    let ignore = props.ignore.clone();
    use_hook(move || {
        Rc::new(
            WindowFaultListener::install(&ignore, window_fault)
                .map_err(|e| error!(%e, "could not install fault listeners"))
                .ok(),
        )
    });

    if let Some(fault) = window_fault() {
        return rsx! {
            RecoveryScreen {
                message: fault.to_string(),
                on_retry: move |()| window_fault.set(None),
            }
        };
    }

    let ignore = props.ignore;
    rsx! {
        ErrorBoundary {
            handle_error: move |errors: ErrorContext| {
                let mut judged = latch.get();
                let verdict =
                    judged.judge(format!("{errors:?}"), &ignore, web_time::Instant::now());
                latch.set(judged);
                match verdict {
                    RenderVerdict::Recover(fault) => {
                        let latch = Rc::clone(&latch);
                        rsx! {
                            RecoveryScreen {
                                message: fault.to_string(),
                                on_retry: move |()| {
                                    latch.set(IgnoreLatch::default());
                                    errors.clear_errors();
                                },
                            }
                        }
                    }
                    RenderVerdict::Dismiss => rsx! {
                        IgnoredFault { on_dismiss: move |()| errors.clear_errors() }
                    },
                }
            },
            {props.children}
        }
    }
}

/// Props for the [`RecoveryScreen`] component.
#[derive(Props, Clone, PartialEq)]
struct RecoveryScreenProps {
    message: String,
    on_retry: EventHandler<()>,
}

/// Generic fallback with a manual retry.
#[component]
fn RecoveryScreen(props: RecoveryScreenProps) -> Element {
    rsx! {
        div { class: "card recovery",
            h2 { "Something went wrong" }
            p { class: "hint", "The page hit an unexpected error. Your picture never left this device." }
            details {
                summary { "Details" }
                pre { class: "fault-detail", "{props.message}" }
            }
            button {
                class: "btn btn-primary",
                onclick: move |_| props.on_retry.call(()),
                "Try again"
            }
        }
    }
}

/// Props for the [`IgnoredFault`] component.
#[derive(Props, Clone, PartialEq)]
struct IgnoredFaultProps {
    on_dismiss: EventHandler<()>,
}

/// Clears an ignored render fault after mounting, so the page renders
/// again without the boundary writing state mid-render. The latch keeps
/// this from looping on a fault that comes straight back.
#[component]
fn IgnoredFault(props: IgnoredFaultProps) -> Element {
    use_effect(move || props.on_dismiss.call(()));
    rsx! {}
}
