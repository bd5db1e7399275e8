// Copyright 2026 the Grove Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Log subscriber installation.

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Directive used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

static INSTALLED: Once = Once::new();

/// Installs a global fmt subscriber filtered by `RUST_LOG`.
///
/// Idempotent. If another global subscriber is already set, it is left in
/// place.
pub fn init() {
    INSTALLED.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let result = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .with(filter)
            .try_init();
        if result.is_err() {
            tracing::debug!("a global subscriber was already installed");
        }
    });
}
