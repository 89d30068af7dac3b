// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Pawline routing engine.
//!
//! Serves the carrier webhook route (always 200/TwiML) and the
//! bearer-authenticated `/v1` admin API: routing simulate, offer actions,
//! assignment window CRUD, and conflict resolution.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod state;

pub use auth::AuthConfig;
pub use server::{ServerConfig, build_router, start_server};
pub use state::AppState;
