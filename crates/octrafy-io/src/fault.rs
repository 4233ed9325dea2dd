//! Page-level fault capture.
//!
//! Render faults reach the [`FaultBoundary`](crate::FaultBoundary)
//! through Dioxus's `ErrorBoundary`. Everything else (uncaught script
//! errors and unhandled promise rejections) is picked up by
//! [`WindowFaultListener`]. Both paths run messages through the same
//! [`IgnoreList`] before anything is shown to the user.

use std::fmt;
use std::time::Duration;

use dioxus::prelude::*;
use octrafy_compositor::IgnoreList;
use tracing::{error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_time::Instant;

/// Where a fault was caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultOrigin {
    /// A component returned an error while rendering.
    Render,
    /// An uncaught `error` event on the window.
    Script,
    /// An `unhandledrejection` event on the window.
    Rejection,
}

impl fmt::Display for FaultOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Render => "render",
            Self::Script => "script",
            Self::Rejection => "unhandled rejection",
        })
    }
}

/// A fault nothing closer to its origin handled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected {origin} error: {message}")]
pub struct UnexpectedError {
    /// Where it was caught.
    pub origin: FaultOrigin,
    /// The fault's own description.
    pub message: String,
}

impl UnexpectedError {
    /// Build a fault, or `None` if `ignore` says it belongs to someone
    /// else (a browser extension, typically).
    #[must_use]
    pub fn admit(origin: FaultOrigin, message: String, ignore: &IgnoreList) -> Option<Self> {
        if ignore.should_ignore(&message) {
            warn!(%origin, %message, "ignoring fault");
            return None;
        }
        error!(%origin, %message, "unexpected fault");
        Some(Self { origin, message })
    }
}

/// What the boundary does with a caught render fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderVerdict {
    /// Replace the page with the recovery screen.
    Recover(UnexpectedError),
    /// Clear the fault and render the page again.
    Dismiss,
}

/// Dismisses ignored render faults, but only once per
/// [`WINDOW`](Self::WINDOW).
///
/// An ignored fault raised by the page's own render comes straight back
/// after it is cleared; the second one inside the window is shown
/// instead of cleared again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IgnoreLatch {
    last_dismissed: Option<Instant>,
}

impl IgnoreLatch {
    /// How soon a repeat counts as the same fault.
    pub const WINDOW: Duration = Duration::from_secs(5);

    /// Decide what to do with a render fault caught at `now`.
    pub fn judge(&mut self, message: String, ignore: &IgnoreList, now: Instant) -> RenderVerdict {
        if !ignore.should_ignore(&message) {
            return UnexpectedError::admit(FaultOrigin::Render, message, ignore)
                .map_or(RenderVerdict::Dismiss, RenderVerdict::Recover);
        }
        let recurring = self
            .last_dismissed
            .is_some_and(|at| now.saturating_duration_since(at) < Self::WINDOW);
        if recurring {
            error!(%message, "ignored render fault keeps recurring");
            return RenderVerdict::Recover(UnexpectedError {
                origin: FaultOrigin::Render,
                message,
            });
        }
        warn!(%message, "dismissing ignored render fault");
        self.last_dismissed = Some(now);
        RenderVerdict::Dismiss
    }

    /// Forget earlier dismissals.
    pub const fn reset(&mut self) {
        self.last_dismissed = None;
    }
}

/// Errors that can occur when installing the window listeners.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// There is no `window` to listen on.
    #[error("no global window")]
    NoWindow,

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for ListenerError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

type EventClosure = Closure<dyn FnMut(web_sys::Event)>;

/// Window `error` and `unhandledrejection` listeners that record
/// admitted faults into a signal. Removed again on drop.
pub struct WindowFaultListener {
    window: web_sys::Window,
    on_error: EventClosure,
    on_rejection: EventClosure,
}

impl WindowFaultListener {
    /// Install both listeners. Admitted faults are written to `fault`.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] if there is no window or a listener
    /// cannot be attached.
    pub fn install(
        ignore: &IgnoreList,
        fault: Signal<Option<UnexpectedError>>,
    ) -> Result<Self, ListenerError> {
        let window = web_sys::window().ok_or(ListenerError::NoWindow)?;

        let on_error = {
            let ignore = ignore.clone();
            let mut fault = fault;
            EventClosure::new(move |event: web_sys::Event| {
                let message = event
                    .dyn_ref::<web_sys::ErrorEvent>()
                    .map_or_else(|| event.type_(), web_sys::ErrorEvent::message);
                if let Some(e) = UnexpectedError::admit(FaultOrigin::Script, message, &ignore) {
                    fault.set(Some(e));
                }
            })
        };

        let on_rejection = {
            let ignore = ignore.clone();
            let mut fault = fault;
            EventClosure::new(move |event: web_sys::Event| {
                let message = event
                    .dyn_ref::<web_sys::PromiseRejectionEvent>()
                    .map_or_else(|| event.type_(), |e| describe(&e.reason()));
                if let Some(e) = UnexpectedError::admit(FaultOrigin::Rejection, message, &ignore) {
                    fault.set(Some(e));
                }
            })
        };

        window.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback(
            "unhandledrejection",
            on_rejection.as_ref().unchecked_ref(),
        )?;

        Ok(Self {
            window,
            on_error,
            on_rejection,
        })
    }
}

impl Drop for WindowFaultListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("error", self.on_error.as_ref().unchecked_ref());
        let _ = self.window.remove_event_listener_with_callback(
            "unhandledrejection",
            self.on_rejection.as_ref().unchecked_ref(),
        );
    }
}

/// Best-effort text for a rejection reason.
fn describe(reason: &JsValue) -> String {
    if let Some(s) = reason.as_string() {
        return s;
    }
    if let Some(e) = reason.dyn_ref::<js_sys::Error>() {
        return String::from(e.message());
    }
    format!("{reason:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_faults_are_not_admitted() {
        let ignore = IgnoreList::default();
        let admitted = UnexpectedError::admit(
            FaultOrigin::Rejection,
            "MetaMask: Wallet provider not found".into(),
            &ignore,
        );
        assert_eq!(admitted, None);
    }

    #[test]
    fn other_faults_are_admitted() {
        let ignore = IgnoreList::default();
        let admitted =
            UnexpectedError::admit(FaultOrigin::Script, "x is undefined".into(), &ignore);
        assert_eq!(
            admitted,
            Some(UnexpectedError {
                origin: FaultOrigin::Script,
                message: "x is undefined".into(),
            })
        );
    }

    #[test]
    fn empty_ignore_list_admits_everything() {
        let admitted = UnexpectedError::admit(
            FaultOrigin::Render,
            "Sender failed".into(),
            &IgnoreList::empty(),
        );
        assert!(admitted.is_some());
    }

    #[test]
    fn ignored_render_fault_is_dismissed_once() {
        let ignore = IgnoreList::default();
        let mut latch = IgnoreLatch::default();
        let start = Instant::now();

        assert_eq!(
            latch.judge("wallet not connected".into(), &ignore, start),
            RenderVerdict::Dismiss
        );
        // Straight back after clearing: stop looping and show it.
        let again = latch.judge(
            "wallet not connected".into(),
            &ignore,
            start + Duration::from_millis(16),
        );
        assert_eq!(
            again,
            RenderVerdict::Recover(UnexpectedError {
                origin: FaultOrigin::Render,
                message: "wallet not connected".into(),
            })
        );
    }

    #[test]
    fn ignored_render_fault_after_window_is_dismissed_again() {
        let ignore = IgnoreList::default();
        let mut latch = IgnoreLatch::default();
        let start = Instant::now();

        assert_eq!(latch.judge("Sender gone".into(), &ignore, start), RenderVerdict::Dismiss);
        let later = start + IgnoreLatch::WINDOW + Duration::from_secs(1);
        assert_eq!(latch.judge("Sender gone".into(), &ignore, later), RenderVerdict::Dismiss);
    }

    #[test]
    fn reset_latch_dismisses_again() {
        let ignore = IgnoreList::default();
        let mut latch = IgnoreLatch::default();
        let now = Instant::now();

        assert_eq!(latch.judge("wallet".into(), &ignore, now), RenderVerdict::Dismiss);
        latch.reset();
        assert_eq!(latch.judge("wallet".into(), &ignore, now), RenderVerdict::Dismiss);
    }

    #[test]
    fn render_fault_outside_ignore_list_recovers() {
        let mut latch = IgnoreLatch::default();
        let verdict = latch.judge(
            "index out of bounds".into(),
            &IgnoreList::default(),
            Instant::now(),
        );
        assert!(matches!(verdict, RenderVerdict::Recover(_)));
    }

    #[test]
    fn display_names_origin() {
        let e = UnexpectedError {
            origin: FaultOrigin::Rejection,
            message: "boom".into(),
        };
        assert_eq!(e.to_string(), "unexpected unhandled rejection error: boom");
    }
}
