//! Easel Network Layer
//!
//! Fetches asset bytes from the local asset directory or over HTTP(S).

mod client;
mod error;
mod loader;
mod response;

pub use client::{ClientConfig, HttpClient};
pub use error::{NetError, NetResult};
pub use loader::{AssetLoader, AssetLocation, ResourceType};
pub use response::Response;
