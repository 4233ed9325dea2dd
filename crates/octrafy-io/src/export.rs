//! Export orchestration: busy flag, compositing, and download.
//!
//! The busy flag lives in the shared [`Session`] signal. [`ExportGuard`]
//! sets it when an export begins and clears it when dropped, so the
//! flag returns to idle on success, on error, and if the export task is
//! dropped mid-flight.

use dioxus::prelude::*;
use octrafy_compositor::{ComposeError, ExportRequest, PNG_MIME, PfpConfig, Session, SessionError};
use tracing::{error, info};

use crate::alert;
use crate::download::{self, DownloadError};

/// Errors that can end an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The profile picture could not be composited or encoded.
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// The browser refused to start the download.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

/// Holds the session's export flag for the lifetime of one export.
pub struct ExportGuard {
    session: Signal<Session>,
}

impl ExportGuard {
    /// Mark `session` as exporting and snapshot the export inputs.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] if an export is already running
    /// and [`SessionError::NotPreviewing`] outside the preview phase.
    pub fn begin(mut session: Signal<Session>) -> Result<(Self, ExportRequest), SessionError> {
        let request = session.write().begin_export()?;
        Ok((Self { session }, request))
    }
}

impl Drop for ExportGuard {
    fn drop(&mut self) {
        // The signal is gone if the page was torn down mid-export.
        if let Ok(mut session) = self.session.try_write() {
            session.finish_export();
        }
    }
}

/// Composite `request` and hand the PNG to the browser's download
/// mechanism. Returns the download name.
///
/// Yields to the event loop first so the busy state can paint before
/// the synchronous compositing work runs.
///
/// # Errors
///
/// Returns [`ExportError::Compose`] if the image cannot be loaded or
/// composited and [`ExportError::Download`] if the download cannot be
/// triggered.
#[allow(clippy::future_not_send)] // WASM is single-threaded; Send is not needed
pub async fn download_pfp(
    request: &ExportRequest,
    config: &PfpConfig,
) -> Result<String, ExportError> {
    gloo_timers::future::TimeoutFuture::new(0).await;

    let started = web_time::Instant::now();
    let export =
        octrafy_compositor::export_circular_pfp(&request.image, &request.username, config)?;
    download::trigger_download(&export.png, &export.file_name, PNG_MIME)?;
    info!(
        file_name = %export.file_name,
        bytes = export.png.len(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "profile picture downloaded"
    );
    Ok(export.file_name)
}

/// Run one complete export for `session`: guard, composite, download,
/// and alert on failure.
///
/// A request made while another export is in flight is dropped.
#[allow(clippy::future_not_send)]
pub async fn run_export(session: Signal<Session>, config: PfpConfig) {
    let (guard, request) = match ExportGuard::begin(session) {
        Ok(started) => started,
        Err(e) => {
            info!(%e, "export not started");
            return;
        }
    };

    if let Err(e) = download_pfp(&request, &config).await {
        error!(%e, "export failed");
        alert::notify(&format!("Failed to download PFP: {e}"));
    }

    drop(guard);
}
