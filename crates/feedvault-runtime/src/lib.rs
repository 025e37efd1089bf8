// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod config;
mod plan;
mod render;
mod runtime;
mod session;
pub mod telemetry;

pub use config::{
    ConfigError, ConfigErrorCode, FeedConfig, DEFAULT_BACKFILL_BATCH_SIZE,
    DEFAULT_EAGER_WINDOW_MONTHS, DEFAULT_RETAIN_MONTHS, DEFAULT_START_MONTH,
};
pub use plan::{current_month, BackfillQueue, LoadPlan};
pub use render::{resolve_author, FeedRenderer, NullRenderer};
pub use runtime::{FeedCommand, FeedRuntime};
pub use session::FeedSession;

pub const CRATE_NAME: &str = "feedvault-runtime";
