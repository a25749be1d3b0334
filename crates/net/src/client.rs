//! HTTP client for remote assets

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE, USER_AGENT};
use url::Url;

use crate::error::{NetError, NetResult};
use crate::response::Response;

const DEFAULT_USER_AGENT: &str = concat!("Easel/", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bodies larger than this are refused, before download when the length is
/// announced and mid-stream otherwise
const DEFAULT_MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

const MAX_REDIRECTS: usize = 10;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub max_body_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// HTTP client for fetching remote assets
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    max_body_bytes: u64,
}

impl HttpClient {
    pub fn new() -> NetResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> NetResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("image/*,audio/*;q=0.9,*/*;q=0.8"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| NetError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Download a URL
    pub async fn get(&self, url: &Url) -> NetResult<Response> {
        debug!("Fetching asset: {}", url);
        let mut response = self.client.get(url.clone()).send().await?;

        if let Some(length) = response.content_length() {
            if length > self.max_body_bytes {
                return Err(NetError::TooLarge {
                    url: url.to_string(),
                    bytes: length,
                });
            }
        }

        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let mut body = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
        while let Some(chunk) = response.chunk().await? {
            append_capped(&mut body, &chunk, self.max_body_bytes).map_err(|bytes| NetError::TooLarge {
                url: url.to_string(),
                bytes,
            })?;
        }
        debug!("Received {} bytes ({}) from {}", body.len(), status, final_url);

        Ok(Response::new(final_url, status, content_type, body))
    }
}

/// Append `chunk` unless the body would grow past `cap`, returning the
/// would-be length on overflow
fn append_capped(body: &mut Vec<u8>, chunk: &[u8], cap: u64) -> Result<(), u64> {
    let total = body.len() as u64 + chunk.len() as u64;
    if total > cap {
        return Err(total);
    }
    body.extend_from_slice(chunk);
    Ok(())
}
