// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod aggregate;
mod backend;
mod error;
mod fake;
mod loader;
mod paths;
mod retry;

pub use aggregate::AggregateStore;
pub use backend::{HttpShardSource, LocalFsShardSource, ShardSource};
pub use error::{StoreError, StoreErrorCode};
pub use fake::FakeShardSource;
pub use loader::{decode_shard, LoadStats, LoadStatsCollector, ShardLoader};
pub use paths::{object_url, shard_key, validate_key, GUIDE_FILE, MEMBERS_FILE, SHARD_DIR};
pub use retry::{BackoffPolicy, RetryPolicy};

pub const CRATE_NAME: &str = "feedvault-store";
