// SPDX-License-Identifier: Apache-2.0

use feedvault_core::{
    resolve_feedvault_config_path, ENV_FEEDVAULT_BASE_URL, ENV_FEEDVAULT_PAGE_SIZE,
};
use feedvault_model::MonthKey;
use feedvault_query::PageLimits;
use feedvault_store::{HttpShardSource, LocalFsShardSource, RetryPolicy, ShardSource};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// First month the archive has shards for.
pub const DEFAULT_START_MONTH: MonthKey = MonthKey::new_const(2024, 1);
pub const DEFAULT_EAGER_WINDOW_MONTHS: usize = 6;
pub const DEFAULT_RETAIN_MONTHS: usize = 3;
pub const DEFAULT_BACKFILL_BATCH_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigErrorCode {
    Read,
    Parse,
    Invalid,
}

impl ConfigErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "config_read",
            Self::Parse => "config_parse",
            Self::Invalid => "config_invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub code: ConfigErrorCode,
    pub message: String,
}

impl ConfigError {
    #[must_use]
    pub fn new(code: ConfigErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorCode::Invalid, message)
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Runtime settings for a feed session.
///
/// Layering is defaults, then an optional TOML file, then environment
/// overrides, then whatever the caller sets afterwards (CLI flags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub base_url: String,
    pub local_root: Option<PathBuf>,
    pub start_month: MonthKey,
    pub eager_window_months: usize,
    pub retain_months: usize,
    pub backfill_batch_size: usize,
    pub page_size: usize,
    pub retry: RetryPolicy,
    pub allow_private_hosts: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            local_root: None,
            start_month: DEFAULT_START_MONTH,
            eager_window_months: DEFAULT_EAGER_WINDOW_MONTHS,
            retain_months: DEFAULT_RETAIN_MONTHS,
            backfill_batch_size: DEFAULT_BACKFILL_BATCH_SIZE,
            page_size: PageLimits::default().page_size,
            retry: RetryPolicy::default(),
            allow_private_hosts: false,
        }
    }
}

impl FeedConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::new(ConfigErrorCode::Parse, e.to_string()))
    }

    /// Reads `path` when given (it must exist). Otherwise tries the user
    /// config location and falls back to defaults when nothing is there.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (resolve_feedvault_config_path(), false),
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_toml_str(&text).map_err(|e| {
                ConfigError::new(e.code, format!("{}: {}", path.display(), e.message))
            }),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::new(
                ConfigErrorCode::Read,
                format!("{}: {e}", path.display()),
            )),
        }
    }

    /// Applies `FEEDVAULT_BASE_URL` and `FEEDVAULT_PAGE_SIZE` through `lookup`
    /// so callers decide where the environment comes from.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_FEEDVAULT_BASE_URL) {
            let url = url.trim();
            if !url.is_empty() {
                self.base_url = url.to_string();
            }
        }
        if let Some(raw) = lookup(ENV_FEEDVAULT_PAGE_SIZE) {
            self.page_size = raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::invalid(format!("{ENV_FEEDVAULT_PAGE_SIZE}={raw:?}: {e}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local_root.is_none() && self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid(
                "base_url must be set when no local_root is configured",
            ));
        }
        if self.eager_window_months == 0 {
            return Err(ConfigError::invalid("eager_window_months must be > 0"));
        }
        if self.retain_months == 0 {
            return Err(ConfigError::invalid("retain_months must be > 0"));
        }
        if self.retain_months > self.eager_window_months {
            return Err(ConfigError::invalid(format!(
                "retain_months ({}) must not exceed eager_window_months ({})",
                self.retain_months, self.eager_window_months
            )));
        }
        if self.backfill_batch_size == 0 {
            return Err(ConfigError::invalid("backfill_batch_size must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts must be > 0"));
        }
        PageLimits::with_page_size(self.page_size)
            .validate()
            .map_err(|e| ConfigError::invalid(e.to_string()))?;
        Ok(())
    }

    /// Builds the shard source this configuration points at.
    pub fn shard_source(&self) -> Result<Arc<dyn ShardSource>, ConfigError> {
        self.validate()?;
        Ok(match &self.local_root {
            Some(root) => Arc::new(LocalFsShardSource::new(root.clone())),
            None => Arc::new(HttpShardSource::new(
                self.base_url.trim().to_string(),
                self.retry.clone(),
                self.allow_private_hosts,
            )),
        })
    }
}
