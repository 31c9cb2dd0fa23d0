//! Reference-image fetcher: downloads an image and inlines it as a
//! base64 `data:` URL so image backends don't need to reach our storage.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use panelforge_core::adapter::ImageFetcher;
use panelforge_core::error::ProviderError;
use tracing::debug;

pub struct HttpImageFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

/// Build a `data:` URL. Parameters after the media type (`; charset=...`)
/// are dropped; an empty media type becomes `image/png`.
fn data_url(content_type: Option<&str>, bytes: &[u8]) -> String {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or("image/png");
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_data_url(&self, url: &str) -> Result<String, ProviderError> {
        if url.starts_with("data:") {
            return Ok(url.to_string());
        }

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(format!("Fetching {url}"))
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: format!("Fetching {url} failed"),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!(url, bytes = bytes.len(), "Fetched reference image");
        Ok(data_url(content_type.as_deref(), &bytes))
    }
}
