//! Diagram rendering seam.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// A rendered diagram image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub data: Vec<u8>,
    /// Link shown under the photo, usually an editor URL for the diagram.
    pub caption: String,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("diagram request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("diagram service returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("diagram service returned {len} bytes that are not an image")]
    NotAnImage { len: usize },

    #[error("failed to encode diagram payload: {0}")]
    Encode(String),

    #[error("diagram rendering timed out after {0:?}")]
    Timeout(Duration),

    #[error("diagram rendering was cancelled")]
    Cancelled,

    #[error("diagram rendering is disabled")]
    Disabled,
}

/// Turns diagram source into an image.
///
/// Implementations do not need to handle timeouts or cancellation; the
/// pipeline races every call against both.
pub trait DiagramRenderer: Sync {
    fn render(
        &self,
        source: &str,
    ) -> impl Future<Output = Result<RenderedDiagram, RenderError>> + Send;
}

/// Renderer that always fails, so every diagram falls back to a text file.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRenderer;

impl DiagramRenderer for DisabledRenderer {
    async fn render(&self, _source: &str) -> Result<RenderedDiagram, RenderError> {
        Err(RenderError::Disabled)
    }
}
