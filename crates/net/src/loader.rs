//! Asset source resolution and fetching
//!
//! Game scripts refer to assets by web-style paths such as
//! `/public/minesweeper.png`. Those resolve against a local asset root, or
//! against a base URL when one is configured.

use std::path::{Path, PathBuf};

use log::debug;
use url::Url;

use crate::client::HttpClient;
use crate::error::{NetError, NetResult};

/// Type of resource being loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Audio,
    Other,
}

impl ResourceType {
    /// Detect resource type from Content-Type header
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.to_lowercase();
        if ct.contains("image/") {
            ResourceType::Image
        } else if ct.contains("audio/") {
            ResourceType::Audio
        } else {
            ResourceType::Other
        }
    }

    /// Detect resource type from a path or URL extension
    pub fn from_path(path: &str) -> Self {
        let path = path.to_lowercase();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        if [".png", ".jpg", ".jpeg", ".gif", ".webp"]
            .iter()
            .any(|ext| path.ends_with(ext))
        {
            ResourceType::Image
        } else if [".wav", ".ogg", ".mp3", ".flac"]
            .iter()
            .any(|ext| path.ends_with(ext))
        {
            ResourceType::Audio
        } else {
            ResourceType::Other
        }
    }
}

/// Where an asset source string points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    /// A file on the local filesystem
    File(PathBuf),
    /// A remote http(s) resource
    Remote(Url),
}

impl AssetLocation {
    /// Resolve an asset source string
    ///
    /// Absolute URLs are used as-is (`file://` URLs become paths). Relative
    /// sources join the base URL when there is one, otherwise the asset root.
    pub fn resolve(src: &str, root: &Path, base_url: Option<&Url>) -> NetResult<Self> {
        if src.is_empty() {
            return Err(NetError::EmptySource);
        }

        if src.contains("://") {
            let url = Url::parse(src)?;
            if url.scheme() == "file" {
                let path = url
                    .to_file_path()
                    .map_err(|_| NetError::InvalidUrl(src.to_string()))?;
                return Ok(AssetLocation::File(path));
            }
            return Ok(AssetLocation::Remote(url));
        }

        if let Some(base) = base_url {
            if base.cannot_be_a_base() {
                return Err(NetError::NoBaseUrl(src.to_string()));
            }
            return Ok(AssetLocation::Remote(base.join(src)?));
        }

        Ok(AssetLocation::File(root.join(src.trim_start_matches('/'))))
    }
}

/// Fetches raw asset bytes
#[derive(Clone)]
pub struct AssetLoader {
    client: HttpClient,
    root: PathBuf,
    base_url: Option<Url>,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>, base_url: Option<Url>) -> NetResult<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            root: root.into(),
            base_url,
        })
    }

    /// Asset root used for relative sources
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, src: &str) -> NetResult<AssetLocation> {
        AssetLocation::resolve(src, &self.root, self.base_url.as_ref())
    }

    /// Read or download the bytes behind an asset source
    pub async fn fetch(&self, src: &str) -> NetResult<Vec<u8>> {
        match self.resolve(src)? {
            AssetLocation::File(path) => {
                debug!("Reading asset file: {}", path.display());
                Ok(tokio::fs::read(&path).await?)
            }
            AssetLocation::Remote(url) => {
                let response = self.client.get(&url).await?;
                if response.resource_type() == ResourceType::Other {
                    debug!("Asset {} has no image or audio type", url);
                }
                let status = response.status;
                response.into_body().ok_or(NetError::HttpError { status })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_from_path() {
        assert_eq!(ResourceType::from_path("/public/minesweeper.png"), ResourceType::Image);
        assert_eq!(ResourceType::from_path("/public/explosion.WAV"), ResourceType::Audio);
        assert_eq!(ResourceType::from_path("/sheet.png?v=2"), ResourceType::Image);
        assert_eq!(ResourceType::from_path("/notes.txt"), ResourceType::Other);
    }

    #[test]
    fn test_resource_type_from_content_type() {
        assert_eq!(ResourceType::from_content_type("image/png"), ResourceType::Image);
        assert_eq!(ResourceType::from_content_type("audio/wav"), ResourceType::Audio);
        assert_eq!(ResourceType::from_content_type("text/html"), ResourceType::Other);
    }

    #[test]
    fn test_resolve_relative_to_root() {
        let location = AssetLocation::resolve("/public/cards.png", Path::new("assets"), None).unwrap();
        assert_eq!(location, AssetLocation::File(PathBuf::from("assets/public/cards.png")));
    }

    #[test]
    fn test_resolve_relative_to_base_url() {
        let base = Url::parse("https://games.example.com/").unwrap();
        let location =
            AssetLocation::resolve("/public/cards.png", Path::new("assets"), Some(&base)).unwrap();
        assert_eq!(
            location,
            AssetLocation::Remote(Url::parse("https://games.example.com/public/cards.png").unwrap())
        );
    }

    #[test]
    fn test_resolve_absolute_url() {
        let location =
            AssetLocation::resolve("https://cdn.example.com/a.wav", Path::new("assets"), None).unwrap();
        assert!(matches!(location, AssetLocation::Remote(_)));
    }

    #[test]
    fn test_resolve_empty_source() {
        assert!(matches!(
            AssetLocation::resolve("", Path::new("assets"), None),
            Err(NetError::EmptySource)
        ));
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let loader = AssetLoader::new("/nonexistent-easel-root", None).unwrap();
        let result = loader.fetch("/missing.png").await;
        assert!(matches!(result, Err(NetError::Io(_))));
    }
}
