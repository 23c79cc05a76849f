//! Layout-editor payloads.
//!
//! The drag-and-drop editor posts a list of positioned elements. Each one
//! overwrites only the settings it carries; everything else in the
//! [`TemplateConfig`] is left alone.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{RenderError, RenderResult};
use crate::template_config::TemplateConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Name,
    Date,
    Logo,
    Signature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorElement {
    pub kind: ElementKind,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub x_pct: Option<f32>,
    #[serde(default)]
    pub y_pct: Option<f32>,
    #[serde(default)]
    pub width_px: Option<u32>,
    #[serde(default)]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub offset_px: Option<i32>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorLayout {
    #[serde(default)]
    pub elements: Vec<EditorElement>,
}

impl EditorLayout {
    pub fn from_json(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json).map_err(|e| RenderError::config(e.to_string()))
    }

    /// Fold every element into `config`, in payload order.
    pub fn apply(&self, config: &mut TemplateConfig) {
        for el in &self.elements {
            el.apply(config);
        }
    }
}

impl EditorElement {
    fn apply(&self, config: &mut TemplateConfig) {
        match self.kind {
            ElementKind::Name => {
                let name = &mut config.name;
                if !self.visible.unwrap_or(true) {
                    log::warn!("editor payload tried to hide the name element; ignored");
                }
                set(&mut name.position_y_pct, self.y_pct);
                set(&mut name.font_size, self.font_size);
                set(&mut name.color, self.color);
            }
            ElementKind::Date => {
                let date = &mut config.date;
                set(&mut date.show, self.visible);
                set(&mut date.offset_px, self.offset_px);
                set(&mut date.font_size, self.font_size);
                set(&mut date.color, self.color);
            }
            ElementKind::Logo => {
                let logo = &mut config.logo;
                set(&mut logo.show, self.visible);
                set(&mut logo.position_x_pct, self.x_pct);
                set(&mut logo.position_y_pct, self.y_pct);
                set(&mut logo.width_px, self.width_px);
            }
            ElementKind::Signature => {
                let sig = &mut config.signature;
                set(&mut sig.show, self.visible);
                set(&mut sig.position_x_pct, self.x_pct);
                set(&mut sig.position_y_pct, self.y_pct);
                set(&mut sig.width_px, self.width_px);
                if let Some(label) = &self.label {
                    sig.label = Some(label.clone()).filter(|l| !l.trim().is_empty());
                }
            }
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}
