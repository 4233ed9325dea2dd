//! Blocking user notifications via `window.alert()`.

use tracing::warn;
use wasm_bindgen::JsValue;

/// Errors that can occur when showing an alert.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// There is no `window` to alert on (e.g. inside a worker).
    #[error("no global window")]
    NoWindow,

    /// The browser refused to show the dialog.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for AlertError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Show `message` in a blocking browser alert.
///
/// # Errors
///
/// Returns [`AlertError::NoWindow`] outside a window context and
/// [`AlertError::JsError`] if the dialog cannot be shown.
pub fn alert(message: &str) -> Result<(), AlertError> {
    let window = web_sys::window().ok_or(AlertError::NoWindow)?;
    window.alert_with_message(message)?;
    Ok(())
}

/// Show `message`, falling back to a log line if no dialog can be shown.
pub fn notify(message: &str) {
    if let Err(e) = alert(message) {
        warn!(%e, message, "could not show alert");
    }
}
