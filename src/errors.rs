//! Error types.
//!
//! [`ShowroomError`] covers every failure the interaction core can report.
//! None of them is fatal: the controller surfaces them to the UI through
//! [`crate::ui::UiSink::notice`] and leaves selection and materials untouched.
//!
//! Loaders work with `anyhow::Result` internally and are converted into
//! [`ShowroomError::AssetLoadFailed`] / [`ShowroomError::TextureLoadFailed`] at
//! the boundary so that the path of the failing asset is never lost.

use thiserror::Error;

use crate::data_structures::surface::{SurfaceId, SurfaceKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShowroomError {
    /// A tile dimension was zero, negative or NaN.
    #[error("Invalid tile spec {width}x{height}: both dimensions must be positive")]
    InvalidTileSpec { width: f32, height: f32 },

    /// A tile border wider than the longer side of the texture it frames.
    #[error("Invalid tile border of {width_px}px: at most {max_px}px fits this texture")]
    InvalidBorder { width_px: u32, max_px: u32 },

    /// The texture behind a swatch could not be fetched or decoded.
    #[error("Failed to load texture {path}: {reason}")]
    TextureLoadFailed { path: String, reason: String },

    /// A model or environment map could not be fetched or decoded.
    #[error("Failed to load asset {path}: {reason}")]
    AssetLoadFailed { path: String, reason: String },

    /// Tiling is only defined for walls and floors.
    #[error("Surfaces of kind {0:?} cannot be retextured")]
    UnsupportedSurface(SurfaceKind),

    /// The scene has no material slot for this surface.
    #[error("Unknown surface {0:?}")]
    UnknownSurface(SurfaceId),

    /// The catalog has no swatch with this id.
    #[error("Unknown swatch {0}")]
    UnknownSwatch(String),
}

impl ShowroomError {
    pub(crate) fn asset(path: &str, err: &anyhow::Error) -> Self {
        Self::AssetLoadFailed {
            path: path.to_string(),
            reason: format!("{:#}", err),
        }
    }

    pub(crate) fn texture(path: &str, err: &anyhow::Error) -> Self {
        Self::TextureLoadFailed {
            path: path.to_string(),
            reason: format!("{:#}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShowroomError>;
