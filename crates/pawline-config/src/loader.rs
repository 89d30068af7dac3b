// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./pawline.toml` > `~/.config/pawline/pawline.toml`
//! > `/etc/pawline/pawline.toml` with environment variable overrides via
//! the `PAWLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::PawlineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/pawline/pawline.toml` (system-wide)
/// 3. `~/.config/pawline/pawline.toml` (user XDG config)
/// 4. `./pawline.toml` (local directory)
/// 5. `PAWLINE_*` environment variables
pub fn load_config() -> Result<PawlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PawlineConfig::default()))
        .merge(Toml::file("/etc/pawline/pawline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("pawline/pawline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("pawline.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<PawlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PawlineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PawlineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PawlineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `PAWLINE_CARRIER_AUTH_TOKEN` must map
/// to `carrier.auth_token`, not `carrier.auth.token`.
fn env_provider() -> Env {
    Env::prefixed("PAWLINE_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("carrier_", "carrier.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
