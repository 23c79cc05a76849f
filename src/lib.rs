//! # cert-forge – certificate composition engine
//!
//! Overlays a participant's name and completion date, plus an optional
//! logo and signature, onto a certificate background image. The stages of
//! one render call are:
//!
//! 1. **Normalize** – decode the template and flatten it to opaque RGB ([`composite`])
//! 2. **Logo** – resize and paste, top-left anchored ([`render`])
//! 3. **Name / date** – resolve fonts and draw centered text ([`fonts`])
//! 4. **Signature** – resize and paste, center anchored, with label
//! 5. **Encode** – PNG bytes, optionally wrapped in a PDF ([`pdf`])
//!
//! Settings come from a [`TemplateConfig`], either built directly, parsed
//! from JSON, mapped from a stored [`TemplateRecord`] or edited through an
//! [`EditorLayout`] payload.

pub mod builtin_font;
pub mod color;
pub mod composite;
pub mod editor;
pub mod encoding;
pub mod error;
pub mod fonts;
pub mod participant;
pub mod pdf;
pub mod provider;
pub mod record;
pub mod render;
pub mod template_config;

// Re-exports for convenience
pub use color::Color;
pub use editor::EditorLayout;
pub use error::{AssetError, FontError, RenderError, RenderResult};
pub use fonts::{FontResolver, FontWeight};
pub use participant::{resolve_display_name, ParticipantContext, SurveyAnswer};
pub use pdf::{export_pdf, CertificateFormat};
pub use provider::{
    CertificateImageProvider, CertificateProvider, CustomTemplateProvider, DefaultProvider,
};
pub use record::TemplateRecord;
pub use render::{Certificate, CertificateRenderer, RenderedLayout};
pub use template_config::TemplateConfig;
