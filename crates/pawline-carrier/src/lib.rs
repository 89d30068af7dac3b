// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio carrier provider for the Pawline routing engine.
//!
//! Implements webhook signature verification, outbound sends via the
//! Messages API, and TwiML response rendering.

pub mod twilio;
pub mod twiml;

pub use twilio::{TwilioCarrier, TwilioConfig};
