// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared state for axum request handlers.

use std::sync::Arc;
use std::time::Instant;

use pawline_core::MessageStore;
use pawline_ingress::IngressHandler;
use pawline_offers::OfferProcessor;

use crate::auth::AuthConfig;

/// Shared state for the gateway's request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The transactional store the admin handlers read and mutate.
    pub store: Arc<dyn MessageStore>,
    /// Webhook ingress orchestration.
    pub ingress: Arc<IngressHandler>,
    /// Offer processor for the authenticated HTTP actions.
    pub processor: Arc<OfferProcessor>,
    /// Admin API authentication.
    pub auth: AuthConfig,
    /// Process start time for uptime reporting.
    pub started_at: Instant,
}
