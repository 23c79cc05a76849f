//! Error taxonomy for certificate rendering.
//!
//! Only [`RenderError`] ever reaches a caller. [`AssetError`] and
//! [`FontError`] are absorbed where they happen: the affected layer is
//! skipped, or the font resolver moves on to its next candidate.

use std::fmt;
use std::path::PathBuf;

pub type RenderResult<T> = Result<T, RenderError>;

/// Failures that abort a render call. No image bytes are produced.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("template decode error: {0}")]
    Decode(#[source] image::ImageError),

    #[error("png encode error: {0}")]
    Encode(#[source] image::ImageError),

    #[error("pdf export error: {0}")]
    Export(String),

    #[error("config error: {0}")]
    Config(String),
}

impl RenderError {
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Which optional image layer an [`AssetError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Logo,
    Signature,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Logo => f.write_str("logo"),
            AssetKind::Signature => f.write_str("signature"),
        }
    }
}

/// A logo or signature could not be placed. The layer is omitted.
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("{kind} decode error: {source}")]
    Decode {
        kind: AssetKind,
        #[source]
        source: image::ImageError,
    },

    #[error("{kind} target width is zero")]
    ZeroWidth { kind: AssetKind },

    #[error("{kind} image has no pixels")]
    Empty { kind: AssetKind },
}

/// A font candidate could not be used. The resolver tries the next one.
#[derive(thiserror::Error, Debug)]
pub enum FontError {
    #[error("cannot read font {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `path` is the file path, or `<memory>` for in-memory candidates.
    #[error("cannot parse font {path}")]
    Parse { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(RenderError::export("x").to_string().contains("pdf export error:"));
        assert!(RenderError::config("x").to_string().contains("config error:"));
    }

    #[test]
    fn asset_errors_name_their_layer() {
        let err = AssetError::ZeroWidth {
            kind: AssetKind::Signature,
        };
        assert_eq!(err.to_string(), "signature target width is zero");
        let err = AssetError::Empty {
            kind: AssetKind::Logo,
        };
        assert!(err.to_string().starts_with("logo"));
    }

    #[test]
    fn font_io_error_mentions_path() {
        let err = FontError::Io {
            path: PathBuf::from("/nope/Font.ttf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/nope/Font.ttf"));
        let err = FontError::Parse {
            path: "<memory>".to_string(),
        };
        assert_eq!(err.to_string(), "cannot parse font <memory>");
    }
}
