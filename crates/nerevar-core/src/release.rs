use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, IoContext};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Body of `GET {base}/releases/{channel}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub version: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ReleaseClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ReleaseClient {
    pub fn new(cfg: &CoreConfig) -> CoreResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nerevar/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.api.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(cfg.api.request_timeout_secs),
        })
    }

    pub fn release_url(&self, channel: &str) -> String {
        format!("{}/releases/{}", self.base_url, channel)
    }

    pub async fn fetch(&self, channel: &str) -> CoreResult<ReleaseInfo> {
        let url = self.release_url(channel);
        tracing::debug!(%url, "fetching release metadata");
        let resp = self.http.get(&url).timeout(self.timeout).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Like [`fetch`](Self::fetch) but never fails: any error yields empty
    /// fields, and the caller's download step reports the failure instead.
    pub async fn fetch_lenient(&self, channel: &str) -> ReleaseInfo {
        match self.fetch(channel).await {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(channel, error = %err, "release metadata unavailable");
                ReleaseInfo::default()
            }
        }
    }

    /// Streams `url` into `dest`, returning the number of bytes written.
    pub async fn download_to(&self, url: &str, dest: &Path) -> CoreResult<u64> {
        if url.trim().is_empty() {
            return Err(CoreError::Network("no download URL available".to_string()));
        }
        tracing::info!(%url, dest = %dest.display(), "downloading");
        let mut resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .io_context("create download file", dest)?;
        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk)
                .await
                .io_context("write download file", dest)?;
            written += chunk.len() as u64;
        }
        file.flush().await.io_context("flush download file", dest)?;
        tracing::info!(bytes = written, "download complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_url_joins_channel() {
        let mut cfg = CoreConfig::default();
        cfg.api.base_url = "http://localhost:9000/api/".to_string();
        let client = ReleaseClient::new(&cfg).unwrap();
        assert_eq!(client.release_url("tes3mp"), "http://localhost:9000/api/releases/tes3mp");
    }

    #[tokio::test]
    async fn lenient_fetch_degrades_to_empty() {
        let mut cfg = CoreConfig::default();
        // Nothing listens on port 1.
        cfg.api.base_url = "http://127.0.0.1:1".to_string();
        let client = ReleaseClient::new(&cfg).unwrap();
        assert_eq!(client.fetch_lenient("tes3mp").await, ReleaseInfo::default());
        assert!(client.fetch("tes3mp").await.is_err());
    }

    #[tokio::test]
    async fn empty_url_is_a_download_failure() {
        let client = ReleaseClient::new(&CoreConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = client.download_to("", &dir.path().join("a.zip")).await.unwrap_err();
        assert!(matches!(err, CoreError::Network(_)));
        assert!(!dir.path().join("a.zip").exists());
    }
}
