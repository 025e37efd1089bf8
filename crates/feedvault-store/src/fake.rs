// SPDX-License-Identifier: Apache-2.0

use crate::paths::{shard_key, GUIDE_FILE, MEMBERS_FILE};
use crate::{ShardSource, StoreError, StoreErrorCode};
use async_trait::async_trait;
use feedvault_model::MonthKey;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// In-memory site used by tests and demos.
#[derive(Default)]
pub struct FakeShardSource {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<String>>,
    fetch_calls: AtomicU64,
    delay: Duration,
}

impl FakeShardSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn put_object(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.objects.lock().await.insert(key.to_string(), bytes.into());
    }

    pub async fn put_members(&self, json: &str) {
        self.put_object(MEMBERS_FILE, json).await;
    }

    pub async fn put_guide(&self, json: &str) {
        self.put_object(GUIDE_FILE, json).await;
    }

    pub async fn put_shard(&self, month: MonthKey, json: &str) {
        self.put_object(&shard_key(month), json).await;
    }

    /// Subsequent fetches of `key` fail with a network error.
    pub async fn fail_object(&self, key: &str) {
        self.failing.lock().await.insert(key.to_string());
    }

    #[must_use]
    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    pub async fn fetched_keys(&self) -> Vec<String> {
        self.fetched.lock().await.clone()
    }
}

#[async_trait]
impl ShardSource for FakeShardSource {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    async fn fetch_object(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.fetched.lock().await.push(key.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.lock().await.contains(key) {
            return Err(StoreError::new(
                StoreErrorCode::Network,
                format!("injected failure for {key}"),
            ));
        }
        self.objects
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::new(StoreErrorCode::NotFound, format!("{key} missing")))
    }
}
