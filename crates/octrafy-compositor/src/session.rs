//! Form state: username, uploaded image, phase, and export flag.
//!
//! [`Session`] is the single owner of everything the page knows. All
//! changes go through its methods, which keep two invariants:
//!
//! - the phase is [`Phase::Previewing`] only while the username is not
//!   blank and an image is present;
//! - an export can only begin from [`ExportState::Idle`], so at most
//!   one export is in flight.

use tracing::{debug, info};

use crate::input::DecodedImage;
use crate::types::{InputError, PfpConfig};

/// Which half of the form the user is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Entering a username and choosing an image.
    #[default]
    Editing,
    /// Looking at the composited result, ready to download.
    Previewing,
}

/// Whether a download is being prepared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportState {
    /// No export in flight.
    #[default]
    Idle,
    /// An export has begun and has not finished yet.
    Exporting,
}

/// Errors raised when an export cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Another export is still running.
    #[error("an export is already in progress")]
    Busy,

    /// The session has not been submitted for preview.
    #[error("enter a username and upload an image first")]
    NotPreviewing,
}

/// Snapshot of the inputs an export needs, taken when it begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// The image to composite.
    pub image: DecodedImage,
    /// The username the download is named after.
    pub username: String,
}

/// In-memory state of one page instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
    source_image: Option<DecodedImage>,
    phase: Phase,
    export: ExportState,
    max_username_len: usize,
}

impl Session {
    /// Create an empty session honouring `config.max_username_len`.
    #[must_use]
    pub const fn new(config: &PfpConfig) -> Self {
        Self {
            username: String::new(),
            source_image: None,
            phase: Phase::Editing,
            export: ExportState::Idle,
            max_username_len: config.max_username_len,
        }
    }

    /// The username exactly as entered.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The current uploaded image, if any.
    #[must_use]
    pub const fn source_image(&self) -> Option<&DecodedImage> {
        self.source_image.as_ref()
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current export state.
    #[must_use]
    pub const fn export_state(&self) -> ExportState {
        self.export
    }

    /// Whether an export is in flight.
    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.export == ExportState::Exporting
    }

    /// Store `value` verbatim, keeping at most `max_username_len`
    /// UTF-16 code units.
    ///
    /// Units, not chars, so the cap agrees with the field's HTML
    /// `maxlength`. A character that would straddle the cap is dropped
    /// whole. Trimming only happens when validating, never here.
    pub fn set_username(&mut self, value: &str) {
        let mut units = 0;
        let cut = value
            .char_indices()
            .find(|&(_, c)| {
                units += c.len_utf16();
                units > self.max_username_len
            })
            .map_or(value.len(), |(cut, _)| cut);
        self.username = value[..cut].to_owned();
        self.settle_phase();
    }

    /// Validate an upload and, if it is an image, make it the source.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::InvalidFileType`] for non-image files; the
    /// current image is left untouched.
    pub fn upload_image(
        &mut self,
        file_name: &str,
        reported_mime: Option<&str>,
        bytes: &[u8],
    ) -> Result<(), InputError> {
        let image = DecodedImage::from_upload(file_name, reported_mime, bytes)?;
        self.set_image(image);
        Ok(())
    }

    /// Replace the source image with an already decoded one.
    pub fn set_image(&mut self, image: DecodedImage) {
        info!(file_name = image.file_name(), mime = image.mime(), "image accepted");
        self.source_image = Some(image);
    }

    /// Whether [`submit`](Self::submit) would move to previewing.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.username.trim().is_empty() && self.source_image.is_some()
    }

    /// Move from editing to previewing if the form is complete.
    ///
    /// Returns `true` if the session is previewing afterwards. An
    /// incomplete form is left unchanged.
    pub fn submit(&mut self) -> bool {
        if self.can_submit() {
            self.phase = Phase::Previewing;
            debug!(username = %self.username, "session submitted");
            true
        } else {
            debug!("submit ignored: incomplete form");
            false
        }
    }

    /// Restore the empty defaults and clear the export flag.
    pub fn reset(&mut self) {
        self.username.clear();
        self.source_image = None;
        self.phase = Phase::Editing;
        self.export = ExportState::Idle;
    }

    /// Mark an export as started and snapshot its inputs.
    ///
    /// Every successful call must be paired with
    /// [`finish_export`](Self::finish_export), whatever the outcome of
    /// the export.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Busy`] while another export is in flight
    /// and [`SessionError::NotPreviewing`] outside the preview phase.
    pub fn begin_export(&mut self) -> Result<ExportRequest, SessionError> {
        if self.is_exporting() {
            return Err(SessionError::Busy);
        }
        let image = match (&self.source_image, self.phase) {
            (Some(image), Phase::Previewing) => image.clone(),
            _ => return Err(SessionError::NotPreviewing),
        };
        self.export = ExportState::Exporting;
        Ok(ExportRequest {
            image,
            username: self.username.clone(),
        })
    }

    /// Return to [`ExportState::Idle`]. Safe to call when already idle.
    pub fn finish_export(&mut self) {
        self.export = ExportState::Idle;
    }

    /// Fall back to editing if an edit made the form incomplete.
    fn settle_phase(&mut self) {
        if self.phase == Phase::Previewing && !self.can_submit() {
            self.phase = Phase::Editing;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&PfpConfig::default())
    }
}
