use crate::{DiscoveryError, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use routefog_protocol::{manifest_request_url, ManifestPatch, UrlOverflow};
use url::Url;

/// Result of asking a patch source for a batch of paths.
#[derive(Debug)]
pub enum FetchOutcome {
    Patch(ManifestPatch),
    /// The encoded request URL would exceed the GET ceiling. No request was
    /// issued; the caller resets its pending set and waits for click-time
    /// resolution instead.
    UrlTooLong,
}

/// Where patches come from. The production implementation is
/// [`HttpPatchSource`]; tests substitute their own.
#[async_trait]
pub trait PatchSource: Send + Sync {
    async fn fetch(&self, paths: &[String], version: &str) -> Result<FetchOutcome>;
}

/// Fetches patches from the `__manifest` endpoint over HTTP.
///
/// No retries and no timeout beyond the transport's defaults.
pub struct HttpPatchSource {
    client: Client,
    base: Url,
}

impl HttpPatchSource {
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }
}

#[async_trait]
impl PatchSource for HttpPatchSource {
    async fn fetch(&self, paths: &[String], version: &str) -> Result<FetchOutcome> {
        let url = match manifest_request_url(&self.base, version, paths) {
            Ok(url) => url,
            Err(UrlOverflow) => return Ok(FetchOutcome::UrlTooLong),
        };

        debug!("fetching manifest patch for {} path(s)", paths.len());
        let response = self.client.get(url).send().await?;
        let status = response.status();
        // Any status >= 400 is a failure, regardless of what an `ok`-style
        // check would say about the body.
        if status.as_u16() >= 400 {
            let message = match response.text().await {
                Ok(body) if !body.is_empty() => body,
                _ => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            return Err(DiscoveryError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let payload: ManifestPatch = serde_json::from_str(&body)?;
        Ok(FetchOutcome::Patch(payload))
    }
}
