//! The flat template record handed over by template storage.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::encoding::{base64_bytes, base64_opt};
use crate::error::{RenderError, RenderResult};
use crate::template_config::{
    DateSettings, LogoSettings, NameSettings, SignatureSettings, TemplateConfig,
};

/// A stored certificate template: background file plus overlay settings,
/// one column per setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default = "TemplateRecord::default_active")]
    pub active: bool,
    #[serde(with = "base64_bytes")]
    pub file: Vec<u8>,

    #[serde(default = "defaults::name_position_y")]
    pub name_position_y: f32,
    #[serde(default = "defaults::name_font_size")]
    pub name_font_size: u32,
    #[serde(default)]
    pub name_color: Color,

    #[serde(default = "defaults::show_date")]
    pub show_date: bool,
    #[serde(default = "defaults::date_position_offset")]
    pub date_position_offset: i32,
    #[serde(default = "defaults::date_font_size")]
    pub date_font_size: u32,
    #[serde(default)]
    pub date_color: Color,

    #[serde(default)]
    pub show_logo: bool,
    #[serde(default, with = "base64_opt", skip_serializing_if = "Option::is_none")]
    pub logo_image: Option<Vec<u8>>,
    #[serde(default = "defaults::logo_position")]
    pub logo_position_x: f32,
    #[serde(default = "defaults::logo_position")]
    pub logo_position_y: f32,
    #[serde(default = "defaults::logo_width")]
    pub logo_width: u32,

    #[serde(default)]
    pub show_signature: bool,
    #[serde(default, with = "base64_opt", skip_serializing_if = "Option::is_none")]
    pub signature_image: Option<Vec<u8>>,
    #[serde(default = "defaults::signature_position_x")]
    pub signature_position_x: f32,
    #[serde(default = "defaults::signature_position_y")]
    pub signature_position_y: f32,
    #[serde(default = "defaults::signature_width")]
    pub signature_width: u32,
    #[serde(default, deserialize_with = "label_or_false")]
    pub signature_label: Option<String>,
}

mod defaults {
    use crate::template_config::*;

    pub fn name_position_y() -> f32 {
        NameSettings::default().position_y_pct
    }
    pub fn name_font_size() -> u32 {
        NameSettings::default().font_size
    }
    pub fn show_date() -> bool {
        DateSettings::default().show
    }
    pub fn date_position_offset() -> i32 {
        DateSettings::default().offset_px
    }
    pub fn date_font_size() -> u32 {
        DateSettings::default().font_size
    }
    pub fn logo_position() -> f32 {
        LogoSettings::default().position_x_pct
    }
    pub fn logo_width() -> u32 {
        LogoSettings::default().width_px
    }
    pub fn signature_position_x() -> f32 {
        SignatureSettings::default().position_x_pct
    }
    pub fn signature_position_y() -> f32 {
        SignatureSettings::default().position_y_pct
    }
    pub fn signature_width() -> u32 {
        SignatureSettings::default().width_px
    }
}

/// Storage writes `false` for unset text columns.
fn label_or_false<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum Field {
        Text(String),
        Flag(bool),
    }
    Ok(match Option::<Field>::deserialize(deserializer)? {
        Some(Field::Text(s)) => Some(s),
        Some(Field::Flag(_)) | None => None,
    })
}

impl TemplateRecord {
    fn default_active() -> bool {
        true
    }

    /// A record with the given background and every setting at its default.
    pub fn new(name: impl Into<String>, file: Vec<u8>) -> Self {
        Self::from_config(name, file, &TemplateConfig::default())
    }

    pub fn from_config(name: impl Into<String>, file: Vec<u8>, config: &TemplateConfig) -> Self {
        Self {
            name: name.into(),
            active: true,
            file,
            name_position_y: config.name.position_y_pct,
            name_font_size: config.name.font_size,
            name_color: config.name.color,
            show_date: config.date.show,
            date_position_offset: config.date.offset_px,
            date_font_size: config.date.font_size,
            date_color: config.date.color,
            show_logo: config.logo.show,
            logo_image: config.logo.image.clone(),
            logo_position_x: config.logo.position_x_pct,
            logo_position_y: config.logo.position_y_pct,
            logo_width: config.logo.width_px,
            show_signature: config.signature.show,
            signature_image: config.signature.image.clone(),
            signature_position_x: config.signature.position_x_pct,
            signature_position_y: config.signature.position_y_pct,
            signature_width: config.signature.width_px,
            signature_label: config.signature.label.clone(),
        }
    }

    /// Map the flat columns onto a [`TemplateConfig`].
    pub fn config(&self) -> TemplateConfig {
        TemplateConfig {
            name: NameSettings {
                position_y_pct: self.name_position_y,
                font_size: self.name_font_size,
                color: self.name_color,
            },
            date: DateSettings {
                show: self.show_date,
                offset_px: self.date_position_offset,
                font_size: self.date_font_size,
                color: self.date_color,
            },
            logo: LogoSettings {
                show: self.show_logo,
                image: self.logo_image.clone(),
                position_x_pct: self.logo_position_x,
                position_y_pct: self.logo_position_y,
                width_px: self.logo_width,
            },
            signature: SignatureSettings {
                show: self.show_signature,
                image: self.signature_image.clone(),
                position_x_pct: self.signature_position_x,
                position_y_pct: self.signature_position_y,
                width_px: self.signature_width,
                label: self.signature_label.clone(),
            },
        }
    }

    /// Only active records with a background file take part in rendering.
    pub fn is_usable(&self) -> bool {
        self.active && !self.file.is_empty()
    }

    pub fn from_json(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json).map_err(|e| RenderError::config(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
