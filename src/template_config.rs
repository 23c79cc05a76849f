//! Template config – positions and styles for the overlay elements.
//!
//! Every percentage is measured against the background template's pixel
//! dimensions, so one config can be reused across templates of different
//! resolutions. Values outside `0..=100` are accepted; they simply place
//! the element off-canvas.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::encoding::base64_opt;
use crate::error::{RenderError, RenderResult};

/// Complete overlay configuration for one template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub name: NameSettings,
    pub date: DateSettings,
    pub logo: LogoSettings,
    pub signature: SignatureSettings,
}

/// Participant name. Always drawn, always horizontally centered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameSettings {
    /// Top of the text line, as % of image height.
    pub position_y_pct: f32,
    pub font_size: u32,
    pub color: Color,
}

/// Completion date, placed relative to the resolved name position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateSettings {
    pub show: bool,
    /// Pixels below the name's resolved y (may be negative).
    pub offset_px: i32,
    pub font_size: u32,
    pub color: Color,
}

/// Logo, anchored by its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoSettings {
    pub show: bool,
    #[serde(with = "base64_opt", skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    pub position_x_pct: f32,
    pub position_y_pct: f32,
    /// Target width; height follows the asset's aspect ratio.
    pub width_px: u32,
}

/// Signature, anchored by its horizontal center and its top edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureSettings {
    pub show: bool,
    #[serde(with = "base64_opt", skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
    /// Horizontal center, as % of image width.
    pub position_x_pct: f32,
    /// Top edge, as % of image height.
    pub position_y_pct: f32,
    pub width_px: u32,
    /// Caption under the signature, drawn in the date font and always black.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Default for NameSettings {
    fn default() -> Self {
        Self {
            position_y_pct: 45.0,
            font_size: 60,
            color: Color::BLACK,
        }
    }
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            show: true,
            offset_px: 100,
            font_size: 30,
            color: Color::BLACK,
        }
    }
}

impl Default for LogoSettings {
    fn default() -> Self {
        Self {
            show: false,
            image: None,
            position_x_pct: 5.0,
            position_y_pct: 5.0,
            width_px: 150,
        }
    }
}

impl Default for SignatureSettings {
    fn default() -> Self {
        Self {
            show: false,
            image: None,
            position_x_pct: 50.0,
            position_y_pct: 75.0,
            width_px: 200,
            label: None,
        }
    }
}

impl LogoSettings {
    /// The asset to draw, if the layer is enabled and has one.
    pub fn active_image(&self) -> Option<&[u8]> {
        self.image.as_deref().filter(|_| self.show)
    }
}

impl SignatureSettings {
    pub fn active_image(&self) -> Option<&[u8]> {
        self.image.as_deref().filter(|_| self.show)
    }

    /// The label text, if any non-blank label is configured.
    pub fn active_label(&self) -> Option<&str> {
        self.label.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}

impl TemplateConfig {
    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json).map_err(|e| RenderError::config(e.to_string()))
    }
}
