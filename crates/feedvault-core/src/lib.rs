// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod config;
mod errors;

pub use config::{
    resolve_feedvault_config_path, ENV_FEEDVAULT_BASE_URL, ENV_FEEDVAULT_CONFIG,
    ENV_FEEDVAULT_LOG_JSON, ENV_FEEDVAULT_PAGE_SIZE,
};
pub use errors::{ExitCode, MachineError};

pub const CRATE_NAME: &str = "feedvault-core";
