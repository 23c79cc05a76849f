//! PDF export – wraps a rendered certificate PNG in a single-page PDF
//! using `printpdf` (v0.8 ops-based API).

use printpdf::*;

use crate::error::{RenderError, RenderResult};

/// Resolution the PNG is placed at. Determines the physical page size.
pub const EXPORT_DPI: f32 = 150.0;

const MM_PER_INCH: f32 = 25.4;

/// Output formats a caller can serve a certificate in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertificateFormat {
    #[default]
    Png,
    Pdf,
}

impl CertificateFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            CertificateFormat::Png => "image/png",
            CertificateFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            CertificateFormat::Png => "png",
            CertificateFormat::Pdf => "pdf",
        }
    }

    /// File name for an inline `Content-Disposition`, e.g. `certificate.png`.
    pub fn file_name(self, stem: &str) -> String {
        format!("{stem}.{}", self.extension())
    }

    /// Convert rendered PNG bytes into this format.
    pub fn encode(self, png: Vec<u8>, title: &str) -> RenderResult<Vec<u8>> {
        match self {
            CertificateFormat::Png => Ok(png),
            CertificateFormat::Pdf => export_pdf(&png, title),
        }
    }
}

/// Page side length in mm for `px` pixels at [`EXPORT_DPI`].
fn px_to_mm(px: u32) -> Mm {
    Mm(px as f32 / EXPORT_DPI * MM_PER_INCH)
}

/// Embed `png` as the only content of a page sized to the image.
pub fn export_pdf(png: &[u8], title: &str) -> RenderResult<Vec<u8>> {
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    let raw = RawImage::decode_from_bytes(png, &mut warnings)
        .map_err(|e| RenderError::export(format!("cannot embed image: {e}")))?;
    if !warnings.is_empty() {
        log::debug!("pdf image decode produced {} warning(s)", warnings.len());
    }
    let (px_w, px_h) = (raw.width as u32, raw.height as u32);
    if px_w == 0 || px_h == 0 {
        return Err(RenderError::export("image has no pixels"));
    }

    let mut doc = PdfDocument::new(title);
    let xobj_id = doc.add_image(&raw);

    let ops = vec![Op::UseXobject {
        id: xobj_id,
        transform: XObjectTransform {
            translate_x: Some(Pt(0.0)),
            translate_y: Some(Pt(0.0)),
            dpi: Some(EXPORT_DPI),
            scale_x: None,
            scale_y: None,
            rotate: None,
        },
    }];

    let page = PdfPage::new(px_to_mm(px_w), px_to_mm(px_h), ops);
    doc.with_pages(vec![page]);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());
    log::debug!("exported {px_w}x{px_h} certificate as pdf ({} bytes)", bytes.len());
    Ok(bytes)
}
