// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound SMS carrier collaborator.

use async_trait::async_trait;

use crate::error::PawlineError;
use crate::types::DeliveryStatus;

/// Receipt returned by the carrier for an outbound send.
#[derive(Debug, Clone, PartialEq)]
pub struct SendReceipt {
    pub provider_message_sid: String,
    pub delivery_status: DeliveryStatus,
}

/// SMS carrier operations the engine needs: webhook authentication and
/// outbound delivery. Implemented by `pawline-carrier` for Twilio.
#[async_trait]
pub trait CarrierProvider: Send + Sync {
    /// Verify an inbound webhook signature against the configured callback
    /// URL using the provider's canonicalization.
    ///
    /// Synchronous and infallible by design: any malformed input is simply
    /// an invalid signature.
    fn verify_signature(&self, raw_body: &str, signature: &str, url: &str) -> bool;

    /// Send one SMS. `correlation_id` ties the send to the triggering
    /// request in logs.
    async fn send(
        &self,
        from_e164: &str,
        to_e164: &str,
        body: &str,
        correlation_id: &str,
    ) -> Result<SendReceipt, PawlineError>;
}
