// SPDX-License-Identifier: Apache-2.0

use crate::paths::{object_url, shard_key, validate_key, GUIDE_FILE, MEMBERS_FILE};
use crate::retry::{BackoffPolicy, RetryPolicy};
use crate::{StoreError, StoreErrorCode};
use async_trait::async_trait;
use feedvault_model::MonthKey;
use reqwest::StatusCode;
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::instrument;

/// Read-only access to the static site that hosts the archive.
#[async_trait]
pub trait ShardSource: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn fetch_object(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    async fn fetch_members(&self) -> Result<Vec<u8>, StoreError> {
        self.fetch_object(MEMBERS_FILE).await
    }

    async fn fetch_shard(&self, month: MonthKey) -> Result<Vec<u8>, StoreError> {
        self.fetch_object(&shard_key(month)).await
    }

    async fn fetch_guide(&self) -> Result<Vec<u8>, StoreError> {
        self.fetch_object(GUIDE_FILE).await
    }
}

pub struct LocalFsShardSource {
    root: PathBuf,
}

impl LocalFsShardSource {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait]
impl ShardSource for LocalFsShardSource {
    fn backend_tag(&self) -> &'static str {
        "localfs"
    }

    async fn fetch_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        validate_key(key)?;
        let path = self.root.join(key);
        tokio::fs::read(&path).await.map_err(|e| {
            let code = if e.kind() == std::io::ErrorKind::NotFound {
                StoreErrorCode::NotFound
            } else {
                StoreErrorCode::Io
            };
            StoreError::new(code, format!("read {} failed: {e}", path.display()))
        })
    }
}

pub struct HttpShardSource {
    base_url: String,
    retry: RetryPolicy,
    allow_private_hosts: bool,
    client: reqwest::Client,
}

impl HttpShardSource {
    #[must_use]
    pub fn new(base_url: String, retry: RetryPolicy, allow_private_hosts: bool) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
            allow_private_hosts,
            client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn validate_url(&self, url: &str) -> Result<(), StoreError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| StoreError::new(StoreErrorCode::Validation, format!("invalid url: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| StoreError::new(StoreErrorCode::Validation, "url missing host"))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_ascii_lowercase();
        if self.allow_private_hosts {
            return Ok(());
        }
        if host == "localhost" || host.ends_with(".localhost") {
            return Err(StoreError::new(
                StoreErrorCode::Validation,
                "blocked host: localhost",
            ));
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            let private = match ip {
                IpAddr::V4(v4) => {
                    v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_broadcast()
                }
                IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
            };
            if private {
                return Err(StoreError::new(
                    StoreErrorCode::Validation,
                    "blocked private host",
                ));
            }
        }
        Ok(())
    }

    #[instrument(name = "shard_http_get_with_retry", skip(self))]
    async fn get_with_retry(&self, url: &str) -> Result<Vec<u8>, StoreError> {
        self.validate_url(url)?;
        let max_attempts = self.retry.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp.bytes().await.map(|b| b.to_vec()).map_err(|e| {
                        StoreError::new(StoreErrorCode::Network, format!("read body failed: {e}"))
                    });
                }
                Ok(resp) if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::GONE) => {
                    return Err(StoreError::new(
                        StoreErrorCode::NotFound,
                        format!("status={} url={url}", resp.status()),
                    ));
                }
                Ok(resp) if resp.status().is_client_error() => {
                    return Err(StoreError::new(
                        StoreErrorCode::Validation,
                        format!("status={} url={url}", resp.status()),
                    ));
                }
                Ok(resp) => {
                    if attempt >= max_attempts {
                        return Err(StoreError::new(
                            StoreErrorCode::Network,
                            format!("download failed status={} url={url}", resp.status()),
                        ));
                    }
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        return Err(StoreError::new(
                            StoreErrorCode::Network,
                            format!("download failed url={url}: {e}"),
                        ));
                    }
                }
            }
            tokio::time::sleep(self.retry.delay_for_attempt(attempt)).await;
        }
    }
}

#[async_trait]
impl ShardSource for HttpShardSource {
    fn backend_tag(&self) -> &'static str {
        "http"
    }

    async fn fetch_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        validate_key(key)?;
        self.get_with_retry(&object_url(&self.base_url, key)).await
    }
}
