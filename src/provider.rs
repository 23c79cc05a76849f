//! Certificate image providers.
//!
//! A survey either has a custom template configured, in which case the
//! [`CustomTemplateProvider`] renders it, or it does not, in which case the
//! [`DefaultProvider`] delegates to whatever legacy generator the host
//! application supplies. [`CertificateProvider`] picks between the two.

use std::fmt;

use crate::participant::ParticipantContext;
use crate::record::TemplateRecord;
use crate::render::CertificateRenderer;

/// Produces a certificate image for a participant, or `None` when no image
/// can be produced.
pub trait CertificateImageProvider {
    fn certificate_image(&self, participant: &ParticipantContext) -> Option<Vec<u8>>;
}

/// Renders a stored [`TemplateRecord`].
#[derive(Debug, Clone)]
pub struct CustomTemplateProvider {
    template: TemplateRecord,
    renderer: CertificateRenderer,
}

impl CustomTemplateProvider {
    pub fn new(template: TemplateRecord, renderer: CertificateRenderer) -> Self {
        Self { template, renderer }
    }

    pub fn template(&self) -> &TemplateRecord {
        &self.template
    }
}

impl CertificateImageProvider for CustomTemplateProvider {
    fn certificate_image(&self, participant: &ParticipantContext) -> Option<Vec<u8>> {
        log::info!(
            "[{}] rendering custom certificate with template '{}'",
            participant.log_ref(),
            self.template.name
        );
        let config = self.template.config();
        match self.renderer.render(&self.template.file, &config, participant) {
            Ok(png) => Some(png),
            Err(e) => {
                log::error!(
                    "[{}] template '{}' failed to render: {e}",
                    participant.log_ref(),
                    self.template.name
                );
                None
            }
        }
    }
}

type LegacyGenerator =
    dyn Fn(&ParticipantContext) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>
        + Send
        + Sync;

/// Wraps the host application's own certificate generator.
pub struct DefaultProvider {
    generate: Box<LegacyGenerator>,
}

impl DefaultProvider {
    pub fn new<F>(generate: F) -> Self
    where
        F: Fn(&ParticipantContext) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            generate: Box::new(generate),
        }
    }

    /// A provider that never produces an image.
    pub fn unavailable() -> Self {
        Self::new(|_| Err("no default certificate generator configured".into()))
    }
}

impl fmt::Debug for DefaultProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultProvider")
    }
}

impl CertificateImageProvider for DefaultProvider {
    fn certificate_image(&self, participant: &ParticipantContext) -> Option<Vec<u8>> {
        match (self.generate)(participant) {
            Ok(bytes) if !bytes.is_empty() => Some(bytes),
            Ok(_) => None,
            Err(e) => {
                log::warn!("[{}] default certificate unavailable: {e}", participant.log_ref());
                None
            }
        }
    }
}

/// Conditional dispatch between the custom and default providers.
#[derive(Debug)]
pub enum CertificateProvider {
    Custom(CustomTemplateProvider),
    Default(DefaultProvider),
}

impl CertificateProvider {
    /// Use the custom template when one is configured and usable.
    pub fn select(
        template: Option<TemplateRecord>,
        renderer: CertificateRenderer,
        fallback: DefaultProvider,
    ) -> Self {
        match template {
            Some(t) if t.is_usable() => Self::Custom(CustomTemplateProvider::new(t, renderer)),
            Some(t) => {
                log::debug!("template '{}' is inactive or empty, using default provider", t.name);
                Self::Default(fallback)
            }
            None => Self::Default(fallback),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl CertificateImageProvider for CertificateProvider {
    fn certificate_image(&self, participant: &ParticipantContext) -> Option<Vec<u8>> {
        match self {
            Self::Custom(p) => p.certificate_image(participant),
            Self::Default(p) => p.certificate_image(participant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontResolver;
    use chrono::NaiveDate;

    fn participant() -> ParticipantContext {
        ParticipantContext::new("Ada", NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
            .with_reference("input-7")
    }

    fn renderer() -> CertificateRenderer {
        CertificateRenderer::new(FontResolver::builtin_only())
    }

    fn legacy() -> DefaultProvider {
        DefaultProvider::new(|_| Ok(b"legacy".to_vec()))
    }

    #[test]
    fn no_template_selects_default() {
        let provider = CertificateProvider::select(None, renderer(), legacy());
        assert!(!provider.is_custom());
        assert_eq!(provider.certificate_image(&participant()), Some(b"legacy".to_vec()));
    }

    #[test]
    fn inactive_template_selects_default() {
        let mut rec = TemplateRecord::new("Old", vec![1, 2, 3]);
        rec.active = false;
        let provider = CertificateProvider::select(Some(rec), renderer(), legacy());
        assert!(!provider.is_custom());
    }

    #[test]
    fn custom_provider_keeps_its_record() {
        let rec = TemplateRecord::new("Spring cohort", vec![9, 9]);
        let provider = CustomTemplateProvider::new(rec, renderer());
        assert_eq!(provider.template().name, "Spring cohort");
        assert_eq!(provider.template().file, vec![9, 9]);
    }

    #[test]
    fn broken_template_yields_none_not_fallback() {
        let rec = TemplateRecord::new("Broken", b"not an image".to_vec());
        let provider = CertificateProvider::select(Some(rec), renderer(), legacy());
        assert!(provider.is_custom());
        assert_eq!(provider.certificate_image(&participant()), None);
    }

    #[test]
    fn failing_default_yields_none() {
        let provider = CertificateProvider::select(None, renderer(), DefaultProvider::unavailable());
        assert_eq!(provider.certificate_image(&participant()), None);
    }
}
