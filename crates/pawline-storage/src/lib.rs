// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Pawline routing engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, typed query
//! modules per entity, and the [`MessageStore`] implementation the engine
//! crates program against.
//!
//! [`MessageStore`]: pawline_core::MessageStore

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

#[cfg(test)]
pub(crate) mod test_support;

pub use adapter::SqliteStore;
pub use database::Database;
