//! Shared types for the octrafy compositor.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can reference the loaded
/// source image and the composited artifact without depending on
/// `image` directly.
pub use image::RgbaImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An opaque RGB color, written and parsed as a CSS hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Red channel.
    #[must_use]
    pub const fn r(self) -> u8 {
        self.0[0]
    }

    /// Green channel.
    #[must_use]
    pub const fn g(self) -> u8 {
        self.0[1]
    }

    /// Blue channel.
    #[must_use]
    pub const fn b(self) -> u8 {
        self.0[2]
    }

    /// Parse a CSS hex color (`"#0d0bda"` or short form `"#fff"`).
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidColor`] if the string is not a
    /// `#`-prefixed 3- or 6-digit hex color.
    pub fn parse_hex(s: &str) -> Result<Self, ConfigError> {
        let s = s.trim();
        let invalid = || ConfigError::InvalidColor(s.to_owned());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, ch) in hex.chars().enumerate() {
                    let n = ch.to_digit(16).ok_or_else(invalid)?;
                    #[expect(clippy::cast_possible_truncation)]
                    {
                        rgb[i] = (n * 17) as u8;
                    }
                }
                Ok(Self(rgb))
            }
            6 if hex.is_ascii() => {
                let channel = |range: std::ops::Range<usize>| {
                    u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
                };
                Ok(Self([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Geometry and naming parameters of a generated profile picture.
///
/// The defaults produce a 200x200 canvas holding a circle of radius 90
/// (10px inset on every side) outlined by a 6px `#0d0bda` border.
///
/// Fields are public for struct-update syntax; call
/// [`validate`](Self::validate) before handing a hand-built config to
/// the compositor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PfpConfig {
    /// Width and height of the square output canvas in pixels.
    pub canvas_size: u32,

    /// Radius of the circular crop, centered on the canvas.
    pub radius: f32,

    /// Width of the stroked border in pixels.
    pub border_width: f32,

    /// Color of the stroked border.
    pub border_color: Rgb,

    /// Appended to the sanitized username to form the download name.
    pub file_suffix: String,

    /// Maximum number of UTF-16 code units kept by
    /// [`Session::set_username`](crate::Session::set_username).
    pub max_username_len: usize,
}

impl PfpConfig {
    /// Default output canvas edge length.
    pub const DEFAULT_CANVAS_SIZE: u32 = 200;
    /// Default crop radius.
    pub const DEFAULT_RADIUS: f32 = 90.0;
    /// Default border stroke width.
    pub const DEFAULT_BORDER_WIDTH: f32 = 6.0;
    /// Default border color, `#0d0bda`.
    pub const DEFAULT_BORDER_COLOR: Rgb = Rgb([0x0d, 0x0b, 0xda]);
    /// Default file name suffix.
    pub const DEFAULT_FILE_SUFFIX: &'static str = "-octrafied-pfp.png";
    /// Default username length limit.
    pub const DEFAULT_MAX_USERNAME_LEN: usize = 20;

    /// Center of the canvas (both axes).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(&self) -> f32 {
        self.canvas_size as f32 / 2.0
    }

    /// Distance from each canvas edge to the bounding square of the
    /// circle. The source image is drawn into that square.
    #[must_use]
    pub fn inset(&self) -> f32 {
        self.center() - self.radius
    }

    /// Check the invariants the compositor relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCanvas`] for a zero-sized canvas,
    /// [`ConfigError::InvalidRadius`] if the circle is not strictly
    /// positive or does not fit inside the canvas,
    /// [`ConfigError::InvalidBorderWidth`] for a negative or non-finite
    /// border, [`ConfigError::EmptySuffix`] for an empty suffix, and
    /// [`ConfigError::NoUsernameRoom`] for a zero username limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_size == 0 {
            return Err(ConfigError::EmptyCanvas);
        }
        if !self.radius.is_finite() || self.radius <= 0.0 || self.radius > self.center() {
            return Err(ConfigError::InvalidRadius {
                radius: self.radius,
                canvas_size: self.canvas_size,
            });
        }
        if !self.border_width.is_finite() || self.border_width < 0.0 {
            return Err(ConfigError::InvalidBorderWidth(self.border_width));
        }
        if self.file_suffix.is_empty() {
            return Err(ConfigError::EmptySuffix);
        }
        if self.max_username_len == 0 {
            return Err(ConfigError::NoUsernameRoom);
        }
        Ok(())
    }
}

impl Default for PfpConfig {
    fn default() -> Self {
        Self {
            canvas_size: Self::DEFAULT_CANVAS_SIZE,
            radius: Self::DEFAULT_RADIUS,
            border_width: Self::DEFAULT_BORDER_WIDTH,
            border_color: Self::DEFAULT_BORDER_COLOR,
            file_suffix: Self::DEFAULT_FILE_SUFFIX.to_owned(),
            max_username_len: Self::DEFAULT_MAX_USERNAME_LEN,
        }
    }
}

/// Errors raised by [`PfpConfig::validate`] and color parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The canvas has no pixels.
    #[error("canvas size must be at least 1 pixel")]
    EmptyCanvas,

    /// The crop circle is degenerate or does not fit the canvas.
    #[error("radius {radius} does not fit a {canvas_size}px canvas")]
    InvalidRadius {
        /// Offending radius.
        radius: f32,
        /// Canvas edge length it was checked against.
        canvas_size: u32,
    },

    /// The border width is negative or not a number.
    #[error("invalid border width: {0}")]
    InvalidBorderWidth(f32),

    /// The download suffix is empty.
    #[error("file suffix must not be empty")]
    EmptySuffix,

    /// No username could ever be entered.
    #[error("maximum username length must be at least 1")]
    NoUsernameRoom,

    /// A color string is not a CSS hex color.
    #[error("invalid hex color: {0:?}")]
    InvalidColor(String),
}

/// Errors raised by the input stage while accepting an upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// The uploaded file is not an image.
    #[error("please upload an image file (got {mime:?})")]
    InvalidFileType {
        /// The MIME type that was reported or inferred. Empty when none
        /// could be determined.
        mime: String,
    },

    /// The file contents could not be read.
    #[error("failed to read file: {0}")]
    FileRead(String),
}

/// Errors raised while compositing a profile picture.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The offscreen drawing surface could not be allocated.
    #[error("drawing surface {0} is unavailable")]
    SurfaceUnavailable(Dimensions),

    /// The source image could not be loaded from its data URL.
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    /// The finished surface could not be serialized to PNG.
    #[error("PNG encoding failed: {0}")]
    PngEncode(#[from] image::ImageError),

    /// The compositor was handed an invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
