// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Pawline routing engine.
//!
//! Layered TOML + environment configuration built on Figment, with
//! strict unknown-key rejection.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{CarrierConfig, GatewayConfig, PawlineConfig, ServiceConfig, StorageConfig};
