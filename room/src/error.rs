//! Error types for the room engine.
//!
//! Nothing here is fatal to the render loop. Layout and color errors come
//! from malformed input, asset errors are surfaced to the UI and recoverable
//! by retrying the selection, and export errors leave the scene untouched.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors decoding or encoding a persisted [`crate::grid::Layout`].
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The layout JSON could not be parsed or produced.
    #[error("layout JSON invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// A color string that is not `#RGB` or `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
}

/// Errors from resolving, fetching or parsing a model asset.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    /// The model repository could not resolve the reference.
    #[error("model reference {reference:?} could not be resolved: {reason}")]
    Resolve { reference: String, reason: String },

    /// The asset bytes could not be fetched.
    #[error("asset fetch failed for {location}: {reason}")]
    Fetch { location: String, reason: String },

    /// The asset bytes are not a usable glTF model.
    #[error("asset parse failed: {0}")]
    Parse(String),

    /// The model has no vertical extent, so it cannot be normalized.
    #[error("model has degenerate bounds (height {height})")]
    DegenerateBounds { height: f64 },

    /// The load was requested outside a Tokio runtime, so it could not start.
    #[error("no async runtime available to load the model")]
    NoRuntime,
}

impl AssetError {
    /// Stable machine-readable code for the UI layer.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Resolve { .. } => "E_ASSET_RESOLVE",
            Self::Fetch { .. } => "E_ASSET_FETCH",
            Self::Parse(_) => "E_ASSET_PARSE",
            Self::DegenerateBounds { .. } => "E_ASSET_BOUNDS",
            Self::NoRuntime => "E_ASSET_RUNTIME",
        }
    }

    /// Whether retrying the same selection could succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Resolve { .. } | Self::Fetch { .. })
    }
}

/// Errors producing the export collage.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The renderer failed to produce a capture.
    #[error("render failed: {0}")]
    Render(String),

    /// The four captures do not share one size.
    #[error("capture size mismatch: expected {expected:?}, got {actual:?}")]
    TileSizeMismatch { expected: (u32, u32), actual: (u32, u32) },

    /// A zero-sized capture was requested or produced.
    #[error("capture has zero area")]
    EmptyCapture,

    /// A frame edge exceeds the supported maximum.
    #[error("frame {width}x{height} exceeds {max} px per side")]
    FrameTooLarge { width: u32, height: u32, max: u32 },

    /// Encoding or writing the PNG failed.
    #[error("image encode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// An environment value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({expected})")]
    Invalid { key: &'static str, value: String, expected: &'static str },
}
