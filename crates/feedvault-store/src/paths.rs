// SPDX-License-Identifier: Apache-2.0

use crate::{StoreError, StoreErrorCode};
use feedvault_model::MonthKey;

pub const MEMBERS_FILE: &str = "members.json";
pub const GUIDE_FILE: &str = "guide.json";
pub const SHARD_DIR: &str = "data";

/// `data/<YYYY>-<MM>.json`
#[must_use]
pub fn shard_key(month: MonthKey) -> String {
    format!("{SHARD_DIR}/{}", month.shard_file_name())
}

#[must_use]
pub fn object_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

pub fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.trim().is_empty() {
        return Err(StoreError::new(
            StoreErrorCode::Validation,
            "object key must not be empty",
        ));
    }
    if key.starts_with('/') || key.contains("..") || key.contains('\\') {
        return Err(StoreError::new(
            StoreErrorCode::Validation,
            "object key must be relative and normalized",
        ));
    }
    Ok(())
}
