use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

/// Fetches thumbnails as raw bytes. A failed fetch is an absent image.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>>;
}

/// Plain HTTP GET against the thumbnail URL.
pub struct HttpImages {
    client: reqwest::Client,
}

impl HttpImages {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        HttpImages { client }
    }

    async fn download(&self, url: &str) -> reqwest::Result<Vec<u8>> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

impl Default for HttpImages {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for HttpImages {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        if url.is_empty() {
            return None;
        }
        match self.download(url).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(%url, error = %e, "thumbnail fetch failed");
                None
            }
        }
    }
}
