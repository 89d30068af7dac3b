// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offer expiry sweep, run from cron or the admin API.

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use pawline_core::types::{ActorType, AuditEvent, OfferEvent, event_types};
use pawline_core::{MessageStore, PawlineError};

/// Flip every overdue `sent` offer to `expired` and audit each one.
///
/// The store performs the flips and per-sitter metrics recomputes in one
/// transaction; audit rows are appended afterwards, best-effort.
pub async fn expire_overdue(
    store: &dyn MessageStore,
    now: DateTime<Utc>,
) -> Result<Vec<OfferEvent>, PawlineError> {
    let expired = store.expire_overdue_offers(now).await?;
    if expired.is_empty() {
        return Ok(expired);
    }

    info!(count = expired.len(), "expired overdue offers");
    for offer in &expired {
        let audit = AuditEvent {
            org_id: offer.org_id.clone(),
            event_type: event_types::OFFER_EXPIRED.to_string(),
            actor_type: ActorType::System,
            actor_id: None,
            entity_type: Some("offer".to_string()),
            entity_id: Some(offer.id.clone()),
            correlation_id: None,
            metadata: json!({
                "booking_id": offer.booking_id,
                "sitter_id": offer.sitter_id,
                "expires_at": offer.expires_at.to_rfc3339(),
            }),
            created_at: now,
        };
        if let Err(e) = store.record_audit(&audit).await {
            warn!(offer_id = %offer.id, error = %e, "expiry audit write failed");
        }
    }
    Ok(expired)
}
