//! Raster helpers: colour-mode normalization, aspect-preserving resize,
//! alpha-masked pasting and percentage anchoring.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, RgbaImage};

use crate::error::{AssetError, AssetKind};

/// Convert any decoded image to opaque RGB.
///
/// Images with an alpha channel are composited over white using alpha as
/// the blend weight, so fully transparent areas come out white rather than
/// whatever colour the transparent pixels happened to store.
pub fn normalize(img: DynamicImage) -> RgbImage {
    if img.color().has_alpha() {
        flatten_onto_white(&img.to_rgba8())
    } else {
        img.to_rgb8()
    }
}

pub fn flatten_onto_white(src: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::from_pixel(src.width(), src.height(), Rgb([255, 255, 255]));
    for (dst, px) in out.pixels_mut().zip(src.pixels()) {
        let a = px.0[3] as u32;
        for i in 0..3 {
            dst.0[i] = ((px.0[i] as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        }
    }
    out
}

/// Height for `target_width` that keeps the source aspect ratio.
pub fn scaled_height(src_w: u32, src_h: u32, target_width: u32) -> u32 {
    let h = (src_h as f64 * target_width as f64 / src_w as f64).round() as u32;
    h.max(1)
}

/// Resize `asset` to `width_px` wide, keeping its aspect ratio.
pub fn fit_to_width(
    asset: &DynamicImage,
    width_px: u32,
    kind: AssetKind,
) -> Result<DynamicImage, AssetError> {
    if width_px == 0 {
        return Err(AssetError::ZeroWidth { kind });
    }
    let (w, h) = (asset.width(), asset.height());
    if w == 0 || h == 0 {
        return Err(AssetError::Empty { kind });
    }
    let height = scaled_height(w, h, width_px);
    Ok(asset.resize_exact(width_px, height, FilterType::Lanczos3))
}

/// Paste `asset` with its top-left at `(x, y)`. Negative or oversized
/// offsets are clipped. When the asset has an alpha channel it is used as
/// the paste mask; otherwise the asset overwrites the canvas.
pub fn paste(canvas: &mut RgbImage, asset: &DynamicImage, x: i64, y: i64) {
    if asset.color().has_alpha() {
        let rgba = asset.to_rgba8();
        for_each_visible(canvas, rgba.width(), rgba.height(), x, y, |dst, ax, ay| {
            let p = rgba.get_pixel(ax, ay);
            let a = p.0[3] as u32;
            if a == 0 {
                return;
            }
            for i in 0..3 {
                dst.0[i] = ((p.0[i] as u32 * a + dst.0[i] as u32 * (255 - a) + 127) / 255) as u8;
            }
        });
    } else {
        let rgb = asset.to_rgb8();
        // Fully on-canvas opaque pastes can take the bulk copy path.
        if x >= 0
            && y >= 0
            && x.saturating_add(rgb.width() as i64) <= canvas.width() as i64
            && y.saturating_add(rgb.height() as i64) <= canvas.height() as i64
        {
            imageops::replace(canvas, &rgb, x, y);
            return;
        }
        for_each_visible(canvas, rgb.width(), rgb.height(), x, y, |dst, ax, ay| {
            *dst = *rgb.get_pixel(ax, ay);
        });
    }
}

fn for_each_visible<F>(canvas: &mut RgbImage, aw: u32, ah: u32, x: i64, y: i64, mut f: F)
where
    F: FnMut(&mut Rgb<u8>, u32, u32),
{
    let (cw, ch) = (canvas.width() as i64, canvas.height() as i64);
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = x.saturating_add(aw as i64).min(cw);
    let y1 = y.saturating_add(ah as i64).min(ch);
    for cy in y0..y1 {
        for cx in x0..x1 {
            let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
            f(dst, (cx - x) as u32, (cy - y) as u32);
        }
    }
}

/// Coordinates further than this beyond the canvas are clamped. Any asset,
/// label or offset added later stays far from `i64` overflow.
const OFF_CANVAS_LIMIT: i64 = 1 << 32;

/// `round(extent * pct / 100)`. Out-of-range percentages give off-canvas
/// coordinates, clamped to `±(4 * extent + 2^32)`; non-finite ones collapse to 0.
pub fn percent_of(extent: u32, pct: f32) -> i64 {
    let v = (extent as f64 * pct as f64 / 100.0).round();
    if !v.is_finite() {
        return 0;
    }
    let limit = 4 * extent as i64 + OFF_CANVAS_LIMIT;
    v.clamp(-limit as f64, limit as f64) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn transparent_becomes_white_and_half_alpha_blends() {
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        src.put_pixel(1, 0, Rgba([0, 0, 0, 128]));
        let out = flatten_onto_white(&src);
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([127, 127, 127]));
    }

    #[test]
    fn normalize_keeps_opaque_pixels() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(3, 2, image::Luma([50])));
        let out = normalize(img);
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(out.get_pixel(2, 1), &Rgb([50, 50, 50]));
    }

    #[test]
    fn height_follows_aspect_ratio() {
        assert_eq!(scaled_height(300, 100, 150), 50);
        assert_eq!(scaled_height(3, 2, 10), 7);
        assert_eq!(scaled_height(1000, 1, 10), 1);
    }

    #[test]
    fn fit_rejects_zero_width() {
        let img = DynamicImage::new_rgb8(4, 4);
        assert!(matches!(
            fit_to_width(&img, 0, AssetKind::Logo),
            Err(AssetError::ZeroWidth { .. })
        ));
        let out = fit_to_width(&img, 8, AssetKind::Logo).unwrap();
        assert_eq!((out.width(), out.height()), (8, 8));
    }

    #[test]
    fn alpha_paste_leaves_transparent_area_untouched() {
        let mut canvas = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        let mut logo = RgbaImage::new(2, 1);
        logo.put_pixel(0, 0, Rgba([0, 0, 255, 0]));
        logo.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        paste(&mut canvas, &DynamicImage::ImageRgba8(logo), 1, 1);
        assert_eq!(canvas.get_pixel(1, 1), &Rgb([255, 255, 255]));
        assert_eq!(canvas.get_pixel(2, 1), &Rgb([0, 0, 255]));
    }

    #[test]
    fn paste_clips_negative_offsets() {
        let mut canvas = RgbImage::from_pixel(3, 3, Rgb([255, 255, 255]));
        let block = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([9, 9, 9])));
        paste(&mut canvas, &block, -1, -1);
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([9, 9, 9]));
        assert_eq!(canvas.get_pixel(1, 1), &Rgb([255, 255, 255]));
        paste(&mut canvas, &block, 2, 2);
        assert_eq!(canvas.get_pixel(2, 2), &Rgb([9, 9, 9]));
        paste(&mut canvas, &block, 50, -50);
    }

    #[test]
    fn percent_rounds_and_tolerates_range() {
        assert_eq!(percent_of(700, 45.0), 315);
        assert_eq!(percent_of(1000, 50.0), 500);
        assert_eq!(percent_of(1000, 150.0), 1500);
        assert_eq!(percent_of(1000, -10.0), -100);
        assert_eq!(percent_of(1000, f32::NAN), 0);
    }

    #[test]
    fn huge_percentages_are_clamped() {
        let limit = 4 * 1000 + (1i64 << 32);
        assert_eq!(percent_of(1000, 1e30), limit);
        assert_eq!(percent_of(1000, -1e30), -limit);
        assert_eq!(percent_of(1000, f32::MAX), limit);
        assert_eq!(percent_of(0, 1e30), 1i64 << 32);
    }

    #[test]
    fn paste_at_extreme_offsets_is_a_no_op() {
        let mut canvas = RgbImage::from_pixel(3, 3, Rgb([255, 255, 255]));
        let block = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([9, 9, 9])));
        paste(&mut canvas, &block, i64::MAX, i64::MIN);
        paste(&mut canvas, &block, i64::MIN, i64::MAX);
        let mut rgba = RgbaImage::new(2, 2);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        paste(&mut canvas, &DynamicImage::ImageRgba8(rgba), i64::MAX - 1, 0);
        assert!(canvas.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }
}
