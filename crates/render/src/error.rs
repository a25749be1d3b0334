//! Render error types

use thiserror::Error;

/// Render operation result type
pub type RenderResult<T> = Result<T, RenderError>;

/// Render errors
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SDL error: {0}")]
    Sdl(String),

    #[error("Failed to parse font: {0}")]
    Font(&'static str),

    #[error("Failed to read font file: {0}")]
    FontFile(#[from] std::io::Error),
}
