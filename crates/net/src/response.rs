//! HTTP response representation

use url::Url;

use crate::loader::ResourceType;

/// A downloaded asset
#[derive(Debug)]
pub struct Response {
    /// Final URL after redirects
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(url: Url, status: u16, content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            url,
            status,
            content_type,
            body,
        }
    }

    /// Check if the response was successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Kind of asset, from the Content-Type header or else the URL
    pub fn resource_type(&self) -> ResourceType {
        match self.content_type.as_deref().map(ResourceType::from_content_type) {
            Some(ResourceType::Other) | None => ResourceType::from_path(self.url.path()),
            Some(kind) => kind,
        }
    }

    /// Consume the response, returning the body if the status was 2xx
    pub fn into_body(self) -> Option<Vec<u8>> {
        if self.is_success() {
            Some(self.body)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: Option<&str>) -> Response {
        Response::new(
            Url::parse("https://example.com/public/explosion.wav").unwrap(),
            status,
            content_type.map(str::to_string),
            vec![1, 2, 3],
        )
    }

    #[test]
    fn test_success_range() {
        assert!(response(200, None).is_success());
        assert!(response(204, None).is_success());
        assert!(!response(304, None).is_success());
        assert!(!response(404, None).is_success());
    }

    #[test]
    fn test_resource_type() {
        assert_eq!(response(200, Some("image/png")).resource_type(), ResourceType::Image);
        // generic content types fall back to the extension
        assert_eq!(
            response(200, Some("application/octet-stream")).resource_type(),
            ResourceType::Audio
        );
        assert_eq!(response(200, None).resource_type(), ResourceType::Audio);
    }

    #[test]
    fn test_into_body() {
        assert_eq!(response(200, None).into_body(), Some(vec![1, 2, 3]));
        assert_eq!(response(500, None).into_body(), None);
    }
}
