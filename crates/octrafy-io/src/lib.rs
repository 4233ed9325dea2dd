//! octrafy-io: Browser I/O and Dioxus component library.
//!
//! Handles file uploads, Blob downloads, alerts, export orchestration and
//! page-level fault capture, and provides the UI components for the
//! octrafy web application.

pub mod alert;
pub mod components;
pub mod download;
pub mod export;
pub mod fault;

pub use components::{ExportPanel, FaultBoundary, FileUpload, PfpPreview, ProfileForm};
pub use export::{ExportError, ExportGuard};
pub use fault::{FaultOrigin, UnexpectedError};
