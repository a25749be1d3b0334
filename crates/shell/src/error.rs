//! Shell error types

use std::path::PathBuf;

use easel_engine::EngineError;
use easel_net::NetError;
use easel_render::RenderError;
use thiserror::Error;

pub type ShellResult<T> = Result<T, ShellError>;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Asset loader error: {0}")]
    Net(#[from] NetError),

    #[error("Failed to load font {path}: {source}")]
    Font {
        path: PathBuf,
        #[source]
        source: RenderError,
    },
}
