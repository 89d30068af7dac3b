// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offer command processing for the Pawline routing engine.
//!
//! Covers the accept/decline state machine (shared by the SMS grammar and
//! the authenticated HTTP actions), the rolling metrics aggregator, and
//! the expiry sweep.

pub mod commands;
pub mod metrics;
pub mod processor;
pub mod sweep;

pub use commands::{OfferCommand, parse_command};
pub use processor::{CommandReply, CommandSource, OfferOutcome, OfferProcessor};
