// SPDX-License-Identifier: Apache-2.0

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the process-wide subscriber with an `info` default.
pub fn init_tracing(json: bool) {
    init_tracing_with_default(json, "info");
}

/// `RUST_LOG` wins over `default_directive`. Output goes to stderr so it
/// never mixes with rendered feed output. A second call is a no-op.
pub fn init_tracing_with_default(json: bool, default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
