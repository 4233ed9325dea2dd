//! `data:` URLs: base64-encoded file contents usable directly as an
//! `<img src>`.
//!
//! Only the `;base64` form is produced and accepted; that is what the
//! input stage generates and what the compositor loads back.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::types::ComposeError;

/// An owned `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl(String);

impl DataUrl {
    /// Encode `bytes` as a data URL with the given MIME type.
    #[must_use]
    pub fn encode(mime: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }

    /// The full URL string, ready to be used as an image source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The MIME type declared in the URL header.
    ///
    /// Returns `None` if the URL is not a well-formed base64 data URL.
    #[must_use]
    pub fn mime(&self) -> Option<&str> {
        split(&self.0).map(|(mime, _)| mime)
    }

    /// Decode the payload back into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::ImageLoad`] if the URL lacks the
    /// `data:...;base64,` header or the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, ComposeError> {
        let (_, payload) = split(&self.0)
            .ok_or_else(|| ComposeError::ImageLoad("not a base64 data URL".into()))?;
        STANDARD
            .decode(payload)
            .map_err(|e| ComposeError::ImageLoad(format!("invalid base64 payload: {e}")))
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<DataUrl> for String {
    fn from(value: DataUrl) -> Self {
        value.0
    }
}

impl TryFrom<String> for DataUrl {
    type Error = ComposeError;

    /// Accept an externally produced data URL after checking its header.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if split(&value).is_none() {
            return Err(ComposeError::ImageLoad("not a base64 data URL".into()));
        }
        Ok(Self(value))
    }
}

/// Split `data:<mime>;base64,<payload>` into `(mime, payload)`.
fn split(url: &str) -> Option<(&str, &str)> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    Some((mime, payload))
}
