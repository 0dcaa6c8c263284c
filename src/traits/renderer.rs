//! Artifact rendering trait abstraction.

use bytes::Bytes;

/// Rendering errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Payload does not fit the encoding
    PayloadTooLong(usize),
    /// Encoder failed
    Encode(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::PayloadTooLong(len) => {
                write!(f, "Payload of {} bytes is too long to render", len)
            }
            RenderError::Encode(msg) => write!(f, "Failed to encode artifact: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// One-way "render secret link to shareable artifact" collaborator.
///
/// Rendering is CPU-only and short, so the trait is synchronous.
pub trait ArtifactRenderer: Send + Sync {
    /// Render `payload` into artifact bytes.
    fn render(&self, payload: &str) -> Result<Bytes, RenderError>;

    /// File extension for rendered artifacts (e.g. `"png"`).
    fn extension(&self) -> &'static str;

    /// MIME type for rendered artifacts (e.g. `"image/png"`).
    fn content_type(&self) -> &'static str;
}
