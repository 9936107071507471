//! Thumbnail capture and content-aware auto-crop
//!
//! The render context itself (GPU surface, camera, gizmo overlay) lives
//! outside this crate; it is modeled by the [`FrameRenderer`] trait. What
//! lives here is the capture protocol — hide helpers, render transparent,
//! read back, restore — and the alpha-threshold crop that trims the frame to
//! its visible content.

use image::{imageops, RgbaImage};

use crate::error::{Error, Result};

/// Tunable auto-crop parameters
#[derive(Debug, Clone, Copy)]
pub struct CropOptions {
    /// Alpha values at or below this are treated as background noise.
    ///
    /// Anti-aliased edges carry partial alpha, so the cutoff is not zero.
    /// The default of 10 is a tuned constant, not a load-bearing one; tune it
    /// against real renders if edges get clipped.
    pub alpha_threshold: u8,
    /// Padding in pixels added around the tight content rectangle
    pub padding: u32,
}

impl Default for CropOptions {
    fn default() -> Self {
        Self {
            alpha_threshold: 10,
            padding: 16,
        }
    }
}

/// The external render context the capture protocol drives
///
/// Implementations are expected to make `begin_capture`/`end_capture`
/// symmetric: hide the gizmo and grid and switch to a fully transparent
/// background on begin, then restore the previous state and redraw on end,
/// so a capture side-trip never leaves the live preview altered.
pub trait FrameRenderer {
    /// Prepare for capture: hide helper visuals, clear to transparent
    fn begin_capture(&mut self);

    /// Render one frame and read it back with per-pixel alpha
    fn render_frame(&mut self) -> Result<RgbaImage>;

    /// Restore the pre-capture state and redraw
    fn end_capture(&mut self);
}

/// Capture a cropped, transparent-background thumbnail.
///
/// Renders exactly one frame between `begin_capture` and `end_capture`;
/// restoration runs even when the render fails. Repeated captures over an
/// unchanged scene produce identical output.
pub fn capture<R: FrameRenderer>(renderer: &mut R, options: &CropOptions) -> Result<RgbaImage> {
    renderer.begin_capture();
    let frame = renderer.render_frame();
    renderer.end_capture();
    Ok(auto_crop(&frame?, options))
}

/// Crop a frame to the tight bounding rectangle of its visible pixels.
///
/// A pixel is visible when its alpha exceeds the noise threshold. The tight
/// rectangle is expanded by the configured padding, clamped to the frame.
/// A frame with no visible pixel at all is returned uncropped — an
/// empty-frame capture is the caller's no-content case, not an error.
pub fn auto_crop(frame: &RgbaImage, options: &CropOptions) -> RgbaImage {
    let Some((min_x, min_y, max_x, max_y)) = content_rect(frame, options.alpha_threshold) else {
        return frame.clone();
    };

    let left = min_x.saturating_sub(options.padding);
    let top = min_y.saturating_sub(options.padding);
    let right = (max_x + options.padding).min(frame.width() - 1);
    let bottom = (max_y + options.padding).min(frame.height() - 1);

    imageops::crop_imm(frame, left, top, right - left + 1, bottom - top + 1).to_image()
}

/// Encode an image as PNG bytes (the storage/cache payload format)
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .map_err(|e| Error::capture_failed(e.to_string()))?;
    Ok(bytes)
}

/// Tight rectangle of pixels whose alpha exceeds the threshold
fn content_rect(frame: &RgbaImage, alpha_threshold: u8) -> Option<(u32, u32, u32, u32)> {
    let mut rect: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in frame.enumerate_pixels() {
        if pixel.0[3] <= alpha_threshold {
            continue;
        }
        rect = Some(match rect {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }
    rect
}
