//! Font resolution, text measurement and text drawing.
//!
//! A [`FontResolver`] walks an ordered list of candidate fonts and returns
//! the first one that loads. Candidate files are validated and inspected
//! with `ttf-parser`, then handed to `rusttype` for rasterization. When
//! nothing loads the resolver returns the built-in bitmap face, so text is
//! always drawn even on a machine with no fonts installed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};

use crate::builtin_font;
use crate::error::FontError;

/// Which face a text layer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Where a candidate font comes from.
#[derive(Debug, Clone)]
pub enum FontSource {
    Path(PathBuf),
    Bytes(Arc<Vec<u8>>),
}

#[derive(Debug, Clone)]
pub struct FontCandidate {
    pub weight: FontWeight,
    pub source: FontSource,
}

/// System locations probed by [`FontResolver::system`], in order.
const SYSTEM_BOLD: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

const SYSTEM_REGULAR: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Ordered font fallback chain.
#[derive(Debug, Clone, Default)]
pub struct FontResolver {
    candidates: Vec<FontCandidate>,
}

impl FontResolver {
    /// Probe the usual system font locations.
    pub fn system() -> Self {
        let mut resolver = Self::default();
        for path in SYSTEM_BOLD {
            resolver = resolver.with_path(FontWeight::Bold, path);
        }
        for path in SYSTEM_REGULAR {
            resolver = resolver.with_path(FontWeight::Regular, path);
        }
        resolver
    }

    /// No candidates at all: every lookup yields the built-in face.
    /// Output is then identical on every machine.
    pub fn builtin_only() -> Self {
        Self::default()
    }

    pub fn with_candidate(mut self, candidate: FontCandidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    pub fn with_path(self, weight: FontWeight, path: impl AsRef<Path>) -> Self {
        self.with_candidate(FontCandidate {
            weight,
            source: FontSource::Path(path.as_ref().to_path_buf()),
        })
    }

    pub fn with_bytes(self, weight: FontWeight, bytes: Vec<u8>) -> Self {
        self.with_candidate(FontCandidate {
            weight,
            source: FontSource::Bytes(Arc::new(bytes)),
        })
    }

    pub fn candidates(&self) -> &[FontCandidate] {
        &self.candidates
    }

    /// First loadable candidate of `weight`, else the built-in face.
    pub fn resolve(&self, weight: FontWeight) -> Typeface {
        for candidate in self.candidates.iter().filter(|c| c.weight == weight) {
            match load_candidate(&candidate.source) {
                Ok(face) => return face,
                Err(e) => log::debug!("font fallback ({weight:?}): {e}"),
            }
        }
        log::debug!("no {weight:?} font available, using built-in bitmap face");
        Typeface::Builtin
    }
}

fn load_candidate(source: &FontSource) -> Result<Typeface, FontError> {
    let (bytes, origin) = match source {
        FontSource::Path(path) => {
            let bytes = std::fs::read(path).map_err(|source| FontError::Io {
                path: path.clone(),
                source,
            })?;
            (bytes, path.display().to_string())
        }
        FontSource::Bytes(bytes) => (bytes.to_vec(), "<memory>".to_string()),
    };

    let family = {
        let face = ttf_parser::Face::parse(&bytes, 0).map_err(|_| FontError::Parse {
            path: origin.clone(),
        })?;
        family_name(&face).unwrap_or_else(|| origin.clone())
    };

    let font = Font::try_from_vec(bytes).ok_or(FontError::Parse { path: origin })?;
    log::debug!("loaded font '{family}'");
    Ok(Typeface::TrueType { font, family })
}

fn family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|n| n.name_id == ttf_parser::name_id::FAMILY && n.is_unicode())
        .find_map(|n| n.to_string())
}

/// Ink box of a run of text, relative to its pen origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
    /// Offset of the leftmost lit pixel from the pen origin.
    pub min_x: i64,
    pub width: u32,
    /// Line height from the ascender line to the descender line.
    pub height: u32,
}

/// A resolved face ready to measure and draw.
#[derive(Clone)]
pub enum Typeface {
    TrueType { font: Font<'static>, family: String },
    Builtin,
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typeface::TrueType { family, .. } => write!(f, "TrueType({family})"),
            Typeface::Builtin => f.write_str("Builtin"),
        }
    }
}

impl Typeface {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Typeface::Builtin)
    }

    pub fn name(&self) -> &str {
        match self {
            Typeface::TrueType { family, .. } => family,
            Typeface::Builtin => "builtin-5x7",
        }
    }

    /// Measure the ink bounding box of `text` at `px` pixels.
    pub fn measure(&self, text: &str, px: f32) -> TextExtent {
        match self {
            Typeface::TrueType { font, .. } => {
                let scale = Scale::uniform(px);
                let v = font.v_metrics(scale);
                let height = (v.ascent - v.descent).ceil().max(0.0) as u32;
                let mut span: Option<(i32, i32)> = None;
                for g in font.layout(text, scale, point(0.0, v.ascent)) {
                    if let Some(bb) = g.pixel_bounding_box() {
                        span = Some(match span {
                            Some((l, r)) => (l.min(bb.min.x), r.max(bb.max.x)),
                            None => (bb.min.x, bb.max.x),
                        });
                    }
                }
                match span {
                    Some((l, r)) => TextExtent {
                        min_x: l as i64,
                        width: clamp_px(r as i64 - l as i64),
                        height,
                    },
                    None => {
                        let advance: f32 = font
                            .layout(text, scale, point(0.0, 0.0))
                            .map(|g| g.unpositioned().h_metrics().advance_width)
                            .sum();
                        TextExtent {
                            min_x: 0,
                            width: advance.round().max(0.0) as u32,
                            height,
                        }
                    }
                }
            }
            Typeface::Builtin => {
                let scale = builtin_font::scale_for(px);
                let height = builtin_font::GLYPH_ROWS.saturating_mul(scale);
                match builtin_font::ink_span(text, scale) {
                    Some((l, r)) => TextExtent {
                        min_x: l,
                        width: clamp_px(r.saturating_sub(l)),
                        height,
                    },
                    None => TextExtent {
                        min_x: 0,
                        width: builtin_font::advance(text, scale),
                        height,
                    },
                }
            }
        }
    }

    /// Draw `text` with the top-left of its line box at `(x, y)`.
    /// Glyph coverage is blended over the existing pixels.
    pub fn draw(&self, canvas: &mut RgbImage, text: &str, x: i64, y: i64, px: f32, color: Rgb<u8>) {
        match self {
            Typeface::TrueType { font, .. } => {
                // Beyond this, f32 pen positions are no longer exact pixels
                // and the text is far off any canvas anyway.
                let exact = -MAX_EXACT_F32..=MAX_EXACT_F32;
                if !exact.contains(&x) || !exact.contains(&y) {
                    return;
                }
                let scale = Scale::uniform(px);
                let v = font.v_metrics(scale);
                let origin = point(x as f32, y as f32 + v.ascent);
                let (w, h) = (canvas.width() as i64, canvas.height() as i64);
                for glyph in font.layout(text, scale, origin) {
                    let Some(bb) = glyph.pixel_bounding_box() else {
                        continue;
                    };
                    glyph.draw(|gx, gy, coverage| {
                        let cx = gx as i64 + bb.min.x as i64;
                        let cy = gy as i64 + bb.min.y as i64;
                        if cx < 0 || cy < 0 || cx >= w || cy >= h || coverage <= 0.0 {
                            return;
                        }
                        let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
                        blend(dst, color, coverage.min(1.0));
                    });
                }
            }
            Typeface::Builtin => {
                builtin_font::draw(canvas, text, x, y, builtin_font::scale_for(px), color);
            }
        }
    }
}

const MAX_EXACT_F32: i64 = 1 << 24;

/// Pixel length as `u32`, saturating instead of truncating.
fn clamp_px(len: i64) -> u32 {
    u32::try_from(len.max(0)).unwrap_or(u32::MAX)
}

fn blend(dst: &mut Rgb<u8>, color: Rgb<u8>, alpha: f32) {
    let inv = 1.0 - alpha;
    for i in 0..3 {
        dst.0[i] = (color.0[i] as f32 * alpha + dst.0[i] as f32 * inv).round() as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_resolver_yields_builtin() {
        let resolver = FontResolver::builtin_only();
        assert!(resolver.resolve(FontWeight::Bold).is_builtin());
        assert!(resolver.resolve(FontWeight::Regular).is_builtin());
    }

    #[test]
    fn broken_candidates_fall_through() {
        let resolver = FontResolver::builtin_only()
            .with_path(FontWeight::Bold, "/definitely/not/here.ttf")
            .with_bytes(FontWeight::Bold, b"not a font".to_vec());
        assert_eq!(resolver.candidates().len(), 2);
        assert!(resolver.resolve(FontWeight::Bold).is_builtin());
    }

    #[test]
    fn system_resolver_lists_both_weights() {
        let resolver = FontResolver::system();
        assert!(resolver.candidates().iter().any(|c| c.weight == FontWeight::Bold));
        assert!(resolver.candidates().iter().any(|c| c.weight == FontWeight::Regular));
        // Whatever is installed, resolution never fails.
        let _ = resolver.resolve(FontWeight::Bold).measure("Hello", 24.0);
    }

    #[test]
    fn builtin_measure_is_ink_box() {
        let face = Typeface::Builtin;
        let ext = face.measure("I", 16.0);
        // scale 2, 'I' lights columns 1..=3
        assert_eq!(ext, TextExtent { min_x: 2, width: 6, height: 14 });
        let blank = face.measure("  ", 16.0);
        assert_eq!(blank.min_x, 0);
        assert_eq!(blank.width, 22);
    }

    #[test]
    fn builtin_draw_marks_pixels() {
        let mut img = RgbImage::from_pixel(40, 20, Rgb([255, 255, 255]));
        Typeface::Builtin.draw(&mut img, "T", 0, 0, 8.0, Rgb([255, 0, 0]));
        // 'T' top bar spans every column on row 0.
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(4, 0), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(0, 1), &Rgb([255, 255, 255]));
    }

    #[test]
    fn huge_builtin_sizes_saturate() {
        let ext = Typeface::Builtin.measure("Jane Doe", f32::MAX);
        assert_eq!(ext.width, u32::MAX);
        assert_eq!(ext.height, u32::MAX);
        assert_eq!(clamp_px(-5), 0);
        assert_eq!(clamp_px(i64::MAX), u32::MAX);
    }

    #[test]
    fn blend_is_coverage_weighted() {
        let mut px = Rgb([255, 255, 255]);
        blend(&mut px, Rgb([0, 0, 0]), 0.5);
        assert_eq!(px, Rgb([128, 128, 128]));
    }
}
