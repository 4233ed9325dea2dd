//! Offscreen drawing surface: circular clip, image draw, border stroke.
//!
//! The compositing routine is expressed as a short sequence of typed
//! stages. Each stage method consumes `self` and returns the next
//! stage, so the border can only be stroked after the image has been
//! drawn, and the surface can only be exported once both are done:
//!
//! ```rust
//! # use octrafy_compositor::{ComposeError, PfpConfig};
//! # use octrafy_compositor::surface::Surface;
//! # fn run(source: &image::RgbaImage) -> Result<(), ComposeError> {
//! let config = PfpConfig::default();
//! let artifact = Surface::allocate(&config)?
//!     .clear()
//!     .draw_clipped(source)?
//!     .stroke_border()
//!     .into_artifact();
//! # Ok(())
//! # }
//! ```
//!
//! Drawing happens on a premultiplied `tiny-skia` pixmap; the clip is a
//! separate anti-aliased [`Mask`] handed to the image draw only, so the
//! border stroke is never clipped.

use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    Stroke, Transform,
};
use tracing::debug;

use crate::artifact::CompositeArtifact;
use crate::types::{ComposeError, Dimensions, PfpConfig, RgbaImage};

// ───────────────────────── Stage 0: Allocated ─────────────────────────

/// A freshly allocated surface. Call [`clear`](Self::clear) next.
#[must_use = "surface stages are consumed by advancing — call .clear() to continue"]
pub struct Surface {
    pixmap: Pixmap,
    circle: Path,
    config: PfpConfig,
}

impl Surface {
    /// Allocate a square RGBA surface of `config.canvas_size` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::InvalidConfig`] if `config` fails
    /// [`PfpConfig::validate`], and [`ComposeError::SurfaceUnavailable`]
    /// if the pixmap or the circle path cannot be created.
    pub fn allocate(config: &PfpConfig) -> Result<Self, ComposeError> {
        config.validate()?;
        let size = config.canvas_size;
        let unavailable = || {
            ComposeError::SurfaceUnavailable(Dimensions {
                width: size,
                height: size,
            })
        };
        let pixmap = Pixmap::new(size, size).ok_or_else(unavailable)?;
        let circle =
            PathBuilder::from_circle(config.center(), config.center(), config.radius)
                .ok_or_else(unavailable)?;
        debug!(size, "allocated drawing surface");
        Ok(Self {
            pixmap,
            circle,
            config: config.clone(),
        })
    }

    /// Clear every pixel to fully transparent.
    pub fn clear(mut self) -> Cleared {
        self.pixmap.fill(Color::TRANSPARENT);
        Cleared { inner: self }
    }
}

// ───────────────────────── Stage 1: Cleared ──────────────────────────

/// A transparent surface. Call [`draw_clipped`](Self::draw_clipped) next.
#[must_use = "surface stages are consumed by advancing — call .draw_clipped() to continue"]
pub struct Cleared {
    inner: Surface,
}

impl Cleared {
    /// Draw `source` stretched onto the circle's bounding square, clipped
    /// to the circle.
    ///
    /// The aspect ratio of `source` is not preserved.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::ImageLoad`] if `source` has no pixels,
    /// and [`ComposeError::SurfaceUnavailable`] if the clip mask cannot
    /// be allocated.
    pub fn draw_clipped(self, source: &RgbaImage) -> Result<Drawn, ComposeError> {
        let Self { mut inner } = self;
        let size = inner.config.canvas_size;

        let source_pixmap = to_pixmap(source).ok_or_else(|| {
            ComposeError::ImageLoad(format!(
                "image has no pixels ({}x{})",
                source.width(),
                source.height()
            ))
        })?;

        let mut clip = Mask::new(size, size).ok_or(ComposeError::SurfaceUnavailable(
            Dimensions {
                width: size,
                height: size,
            },
        ))?;
        clip.fill_path(&inner.circle, FillRule::Winding, true, Transform::identity());

        let inset = inner.config.inset();
        let extent = inner.config.radius * 2.0;
        #[allow(clippy::cast_precision_loss)]
        let (scale_x, scale_y) = (
            extent / source.width() as f32,
            extent / source.height() as f32,
        );
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        inner.pixmap.draw_pixmap(
            0,
            0,
            source_pixmap.as_ref(),
            &paint,
            Transform::from_row(scale_x, 0.0, 0.0, scale_y, inset, inset),
            Some(&clip),
        );
        debug!(
            source_width = source.width(),
            source_height = source.height(),
            scale_x,
            scale_y,
            "drew clipped source image"
        );
        Ok(Drawn { inner })
    }
}

// ───────────────────────── Stage 2: Drawn ────────────────────────────

/// The image has been drawn. Call [`stroke_border`](Self::stroke_border)
/// next.
#[must_use = "surface stages are consumed by advancing — call .stroke_border() to continue"]
pub struct Drawn {
    inner: Surface,
}

impl Drawn {
    /// Stroke the circle outline with the configured width and color.
    ///
    /// A zero border width leaves the surface untouched.
    pub fn stroke_border(self) -> Bordered {
        let Self { mut inner } = self;
        let color = inner.config.border_color;
        if inner.config.border_width > 0.0 {
            let mut paint = Paint::default();
            paint.set_color_rgba8(color.r(), color.g(), color.b(), 255);
            paint.anti_alias = true;
            let stroke = Stroke {
                width: inner.config.border_width,
                ..Stroke::default()
            };
            inner
                .pixmap
                .stroke_path(&inner.circle, &paint, &stroke, Transform::identity(), None);
        }
        debug!(width = inner.config.border_width, %color, "stroked border");
        Bordered { inner }
    }
}

// ───────────────────────── Stage 3: Bordered ─────────────────────────

/// The finished composition.
#[must_use = "call .into_artifact() to take the composited pixels"]
pub struct Bordered {
    inner: Surface,
}

impl Bordered {
    /// Convert the surface into a straight-alpha [`CompositeArtifact`].
    pub fn into_artifact(self) -> CompositeArtifact {
        CompositeArtifact::new(from_pixmap(&self.inner.pixmap))
    }
}

/// Convert a straight-alpha `RgbaImage` into a premultiplied pixmap.
///
/// Returns `None` for an image with no pixels.
fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Convert a premultiplied pixmap into a straight-alpha `RgbaImage`.
fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}
