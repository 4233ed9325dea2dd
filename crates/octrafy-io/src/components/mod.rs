//! Dioxus UI components for octrafy.
//!
//! Provides the editing form with its image picker, the composited
//! preview, the export panel, and the page-level fault boundary.

mod export;
mod fault_boundary;
mod preview;
mod profile_form;
mod upload;

pub use export::ExportPanel;
pub use fault_boundary::FaultBoundary;
pub use preview::PfpPreview;
pub use profile_form::ProfileForm;
pub use upload::FileUpload;
