// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound SMS webhook ingress for the Pawline routing engine.
//!
//! Normalizes carrier webhook deliveries into message events: signature
//! verification, org/thread resolution, dedup, and sitter command
//! dispatch. The HTTP layer lives in `pawline-gateway`; this crate is
//! transport-agnostic and returns plain reply bodies.

pub mod ingress;
pub mod payload;
pub mod resolve;

pub use ingress::{IngressHandler, REPLY_FAILED, REPLY_UNMATCHED, REPLY_UNVERIFIED};
pub use payload::InboundSms;
