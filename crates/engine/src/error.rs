//! Engine error types

use thiserror::Error;

/// Errors raised while starting an engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Fixed step must be greater than zero")]
    InvalidStep,

    #[error("Max frame delta ({max_ms} ms) is shorter than the fixed step ({step_ms} ms)")]
    InvalidFrameDelta { max_ms: u128, step_ms: u128 },
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Why an asset never became ready
///
/// Stored inside failed cache entries, so it carries messages rather than
/// the underlying error values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Loader task ended before replying")]
    Cancelled,
}

/// Errors from the audio output
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device: {0}")]
    NoDevice(#[from] rodio::StreamError),

    #[error("Audio playback failed: {0}")]
    Play(#[from] rodio::PlayError),

    #[error("Audio decode failed: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}
