// SPDX-License-Identifier: Apache-2.0

use crate::{ShardSource, StoreError};
use feedvault_model::{GuideDocument, Member, MemberDirectory, MonthKey, Post, RawPost};
use futures::future::join_all;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub shards_requested: u64,
    pub shards_loaded: u64,
    pub shards_missing: u64,
    pub shards_failed: u64,
    pub records_loaded: u64,
    pub records_skipped: u64,
}

#[derive(Debug, Default)]
pub struct LoadStatsCollector {
    inner: Mutex<LoadStats>,
}

impl LoadStatsCollector {
    #[must_use]
    pub fn snapshot(&self) -> LoadStats {
        self.inner.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record<F: FnOnce(&mut LoadStats)>(&self, update: F) {
        if let Ok(mut stats) = self.inner.lock() {
            update(&mut stats);
        }
    }
}

/// Decodes one shard body. The body must be a JSON array; entries that do
/// not decode as posts are dropped and counted.
pub fn decode_shard(month: MonthKey, bytes: &[u8]) -> Result<(Vec<Post>, usize), String> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| format!("shard {month} is not JSON: {e}"))?;
    let serde_json::Value::Array(items) = value else {
        return Err(format!("shard {month} is not a JSON array"));
    };
    let mut posts = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for (position, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawPost>(item) {
            Ok(raw) => posts.push(Post::stamp(raw, month)),
            Err(e) => {
                skipped += 1;
                warn!(%month, position, error = %e, "skipping undecodable post");
            }
        }
    }
    Ok((posts, skipped))
}

/// Fetches and decodes site documents. Nothing here returns an error: a
/// missing or broken document contributes nothing.
#[derive(Clone)]
pub struct ShardLoader {
    source: Arc<dyn ShardSource>,
    stats: Arc<LoadStatsCollector>,
}

impl ShardLoader {
    #[must_use]
    pub fn new(source: Arc<dyn ShardSource>) -> Self {
        Self {
            source,
            stats: Arc::new(LoadStatsCollector::default()),
        }
    }

    #[must_use]
    pub fn backend_tag(&self) -> &'static str {
        self.source.backend_tag()
    }

    #[must_use]
    pub fn stats(&self) -> LoadStats {
        self.stats.snapshot()
    }

    /// Every returned post carries `month`.
    #[instrument(name = "load_shard", skip(self), fields(backend = self.source.backend_tag()))]
    pub async fn load_shard(&self, month: MonthKey) -> Vec<Post> {
        self.stats.record(|s| s.shards_requested += 1);
        let bytes = match self.source.fetch_shard(month).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.note_fetch_failure(month, &err);
                return Vec::new();
            }
        };
        match decode_shard(month, &bytes) {
            Ok((posts, skipped)) => {
                debug!(%month, records = posts.len(), skipped, "shard loaded");
                self.stats.record(|s| {
                    s.shards_loaded += 1;
                    s.records_loaded += posts.len() as u64;
                    s.records_skipped += skipped as u64;
                });
                posts
            }
            Err(reason) => {
                warn!(%month, %reason, "malformed shard ignored");
                self.stats.record(|s| s.shards_failed += 1);
                Vec::new()
            }
        }
    }

    /// Issues all fetches at once and returns when every one has settled,
    /// in the order the months were given.
    pub async fn load_shards(&self, months: &[MonthKey]) -> Vec<(MonthKey, Vec<Post>)> {
        let loads = months.iter().map(|&month| async move {
            let posts = self.load_shard(month).await;
            (month, posts)
        });
        join_all(loads).await
    }

    #[instrument(name = "load_members", skip(self))]
    pub async fn load_members(&self) -> MemberDirectory {
        let bytes = match self.source.fetch_members().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "member list unavailable");
                return MemberDirectory::default();
            }
        };
        match serde_json::from_slice::<Vec<Member>>(&bytes) {
            Ok(members) => {
                debug!(members = members.len(), "member list loaded");
                MemberDirectory::from_members(members)
            }
            Err(e) => {
                warn!(error = %e, "member list malformed");
                MemberDirectory::default()
            }
        }
    }

    #[instrument(name = "load_guide", skip(self))]
    pub async fn load_guide(&self) -> Option<GuideDocument> {
        let bytes = self
            .source
            .fetch_guide()
            .await
            .map_err(|err| warn!(error = %err, "guide unavailable"))
            .ok()?;
        serde_json::from_slice(&bytes)
            .map_err(|e| warn!(error = %e, "guide malformed"))
            .ok()
    }

    fn note_fetch_failure(&self, month: MonthKey, err: &StoreError) {
        if err.is_not_found() {
            warn!(%month, "no shard for month");
            self.stats.record(|s| s.shards_missing += 1);
        } else {
            warn!(%month, error = %err, "shard fetch failed");
            self.stats.record(|s| s.shards_failed += 1);
        }
    }
}
