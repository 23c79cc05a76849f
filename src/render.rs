//! Certificate renderer – composes a template image, participant text and
//! optional logo/signature assets into a finished PNG.
//!
//! Layers are applied in a fixed order on one working buffer:
//!
//! 1. normalize the template to opaque RGB
//! 2. logo (top-left anchored)
//! 3. name (centered, bold face)
//! 4. date (centered, `offset_px` below the name)
//! 5. signature (center/top anchored) and its label
//! 6. PNG encode
//!
//! Only an undecodable template (or a failed encode) fails the call. A bad
//! logo or signature is logged and that layer is left out.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::color::Color;
use crate::composite::{fit_to_width, normalize, paste, percent_of};
use crate::error::{AssetError, AssetKind, RenderError, RenderResult};
use crate::fonts::{FontResolver, FontWeight, Typeface};
use crate::participant::ParticipantContext;
use crate::template_config::TemplateConfig;

/// Gap between the bottom of the signature image and its label.
pub const SIGNATURE_LABEL_GAP_PX: i64 = 10;

/// A text run as placed on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPlacement {
    pub text: String,
    /// Left edge of the ink box.
    pub x: i64,
    /// Top of the line box.
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl TextPlacement {
    /// Horizontal center of the ink box, in half-pixel units doubled
    /// (`2 * center`) so odd widths stay exact.
    pub fn center_x2(&self) -> i64 {
        2 * self.x + self.width as i64
    }
}

/// An image asset as placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePlacement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Where every layer ended up. Layers that were hidden or skipped are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLayout {
    pub width: u32,
    pub height: u32,
    pub logo: Option<ImagePlacement>,
    pub name: TextPlacement,
    pub date: Option<TextPlacement>,
    pub signature: Option<ImagePlacement>,
    pub signature_label: Option<TextPlacement>,
}

/// Finished certificate: encoded PNG plus its layout.
#[derive(Debug, Clone)]
pub struct Certificate {
    pub png: Vec<u8>,
    pub layout: RenderedLayout,
}

/// Stateless renderer. One instance can serve any number of calls, from
/// any number of threads.
#[derive(Debug, Clone)]
pub struct CertificateRenderer {
    fonts: FontResolver,
}

impl Default for CertificateRenderer {
    fn default() -> Self {
        Self::new(FontResolver::system())
    }
}

impl CertificateRenderer {
    pub fn new(fonts: FontResolver) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontResolver {
        &self.fonts
    }

    /// Render a certificate and return the PNG bytes.
    pub fn render(
        &self,
        template: &[u8],
        config: &TemplateConfig,
        participant: &ParticipantContext,
    ) -> RenderResult<Vec<u8>> {
        self.compose(template, config, participant).map(|c| c.png)
    }

    /// Render a certificate and report where each layer was placed.
    pub fn compose(
        &self,
        template: &[u8],
        config: &TemplateConfig,
        participant: &ParticipantContext,
    ) -> RenderResult<Certificate> {
        let rref = participant.log_ref();

        let decoded = image::load_from_memory(template).map_err(|e| {
            log::error!("[{rref}] template decode failed: {e}");
            RenderError::Decode(e)
        })?;
        log::debug!(
            "[{rref}] template decoded: {}x{} {:?}",
            decoded.width(),
            decoded.height(),
            decoded.color()
        );
        let mut canvas = normalize(decoded);
        let (img_w, img_h) = canvas.dimensions();

        let logo = config.logo.active_image().and_then(|bytes| {
            let anchor = (
                percent_of(img_w, config.logo.position_x_pct),
                percent_of(img_h, config.logo.position_y_pct),
            );
            let placed = place_asset(&mut canvas, bytes, config.logo.width_px, AssetKind::Logo, |_| {
                anchor
            });
            log_layer(rref, AssetKind::Logo, placed)
        });

        let bold = self.fonts.resolve(FontWeight::Bold);
        let name_y = percent_of(img_h, config.name.position_y_pct);
        let name = draw_centered(
            &mut canvas,
            &bold,
            participant.resolved_name(),
            name_y,
            config.name.font_size,
            config.name.color,
        );
        log::debug!(
            "[{rref}] name layer at ({}, {}) with {}",
            name.x,
            name.y,
            bold.name()
        );

        // Date and signature label share the regular face.
        let needs_regular = config.date.show
            || (config.signature.active_image().is_some()
                && config.signature.active_label().is_some());
        let regular = needs_regular.then(|| self.fonts.resolve(FontWeight::Regular));

        let date = match (&regular, config.date.show) {
            (Some(face), true) => {
                let placed = draw_centered(
                    &mut canvas,
                    face,
                    &participant.formatted_date(),
                    name.y + config.date.offset_px as i64,
                    config.date.font_size,
                    config.date.color,
                );
                log::debug!("[{rref}] date layer at ({}, {})", placed.x, placed.y);
                Some(placed)
            }
            _ => None,
        };

        let signature = config.signature.active_image().and_then(|bytes| {
            let center_x = percent_of(img_w, config.signature.position_x_pct);
            let top = percent_of(img_h, config.signature.position_y_pct);
            let placed = place_asset(
                &mut canvas,
                bytes,
                config.signature.width_px,
                AssetKind::Signature,
                |(w, _)| (center_x - (w / 2) as i64, top),
            );
            log_layer(rref, AssetKind::Signature, placed)
        });

        let signature_label = match (signature, config.signature.active_label(), &regular) {
            (Some(sig), Some(label), Some(face)) => {
                let size = config.date.font_size as f32;
                let ext = face.measure(label, size);
                let x = sig.x + (sig.width as i64 - ext.width as i64).div_euclid(2);
                let y = sig.y + sig.height as i64 + SIGNATURE_LABEL_GAP_PX;
                face.draw(&mut canvas, label, x - ext.min_x, y, size, Color::BLACK.to_rgb());
                Some(TextPlacement {
                    text: label.to_string(),
                    x,
                    y,
                    width: ext.width,
                    height: ext.height,
                })
            }
            _ => None,
        };

        let png = encode_png(canvas).map_err(|e| {
            log::error!("[{rref}] png encode failed: {e}");
            e
        })?;
        log::info!("[{rref}] certificate rendered: {img_w}x{img_h}, {} bytes", png.len());

        Ok(Certificate {
            png,
            layout: RenderedLayout {
                width: img_w,
                height: img_h,
                logo,
                name,
                date,
                signature,
                signature_label,
            },
        })
    }
}

/// Decode, resize and paste one optional asset. `anchor` maps the resized
/// `(width, height)` to the top-left paste position.
fn place_asset<F>(
    canvas: &mut RgbImage,
    bytes: &[u8],
    width_px: u32,
    kind: AssetKind,
    anchor: F,
) -> Result<ImagePlacement, AssetError>
where
    F: FnOnce((u32, u32)) -> (i64, i64),
{
    let asset = image::load_from_memory(bytes).map_err(|source| AssetError::Decode { kind, source })?;
    let resized = fit_to_width(&asset, width_px, kind)?;
    let (w, h) = (resized.width(), resized.height());
    let (x, y) = anchor((w, h));
    paste(canvas, &resized, x, y);
    Ok(ImagePlacement {
        x,
        y,
        width: w,
        height: h,
    })
}

fn log_layer(
    rref: &str,
    kind: AssetKind,
    placed: Result<ImagePlacement, AssetError>,
) -> Option<ImagePlacement> {
    match placed {
        Ok(p) => {
            log::debug!(
                "[{rref}] {kind} layer at ({}, {}) size {}x{}",
                p.x,
                p.y,
                p.width,
                p.height
            );
            Some(p)
        }
        Err(e) => {
            log::warn!("[{rref}] skipping {kind} layer: {e}");
            None
        }
    }
}

/// Draw `text` horizontally centered with its line top at `y`.
fn draw_centered(
    canvas: &mut RgbImage,
    face: &Typeface,
    text: &str,
    y: i64,
    font_size: u32,
    color: Color,
) -> TextPlacement {
    let size = font_size as f32;
    let ext = face.measure(text, size);
    let x = (canvas.width() as i64 - ext.width as i64).div_euclid(2);
    face.draw(canvas, text, x - ext.min_x, y, size, color.to_rgb());
    TextPlacement {
        text: text.to_string(),
        x,
        y,
        width: ext.width,
        height: ext.height,
    }
}

fn encode_png(canvas: RgbImage) -> RenderResult<Vec<u8>> {
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(canvas)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(RenderError::Encode)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn white_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, image::Rgb([255, 255, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn participant() -> ParticipantContext {
        ParticipantContext::new("Jane Doe", NaiveDate::from_ymd_opt(2025, 1, 5).unwrap())
    }

    #[test]
    fn render_basic() {
        let renderer = CertificateRenderer::new(FontResolver::builtin_only());
        let cert = renderer
            .compose(&white_png(1000, 700), &TemplateConfig::default(), &participant())
            .unwrap();
        assert_eq!(&cert.png[1..4], b"PNG");
        assert_eq!(cert.layout.name.y, 315);
        assert_eq!(cert.layout.date.as_ref().unwrap().y, 415);
        assert_eq!(cert.layout.date.as_ref().unwrap().text, "January 05, 2025");
        assert!(cert.layout.logo.is_none());
        assert!(cert.layout.signature.is_none());
    }

    #[test]
    fn renderer_keeps_its_font_chain() {
        assert!(CertificateRenderer::new(FontResolver::builtin_only())
            .fonts()
            .candidates()
            .is_empty());
        assert!(!CertificateRenderer::default().fonts().candidates().is_empty());
    }

    #[test]
    fn name_is_centered() {
        let renderer = CertificateRenderer::new(FontResolver::builtin_only());
        let cert = renderer
            .compose(&white_png(999, 300), &TemplateConfig::default(), &participant())
            .unwrap();
        assert!((cert.layout.name.center_x2() - 999).abs() <= 1);
    }

    #[test]
    fn garbage_template_is_decode_error() {
        let renderer = CertificateRenderer::new(FontResolver::builtin_only());
        let err = renderer
            .render(b"definitely not a png", &TemplateConfig::default(), &participant())
            .unwrap_err();
        assert!(matches!(err, RenderError::Decode(_)));
    }
}
