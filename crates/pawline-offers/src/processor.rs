// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offer command processor.
//!
//! State machine per offer: `sent -> {accepted, declined, expired}`,
//! terminal. Idempotency is structural: only `sent` offers are
//! addressable, the store's guarded update is the single write that flips
//! status, and a duplicate command short-circuits at the already-terminal
//! check. The SMS grammar path and the authenticated HTTP actions both
//! funnel into the same transition functions here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use pawline_core::traits::{OfferResolution, ResolutionApplied};
use pawline_core::types::{
    ActorType, AuditEvent, Booking, DeliveryStatus, Direction, MessageEvent, OfferEvent,
    OfferStatus, event_types,
};
use pawline_core::{CalendarSync, MessageStore, PawlineError};

/// Where a command arrived from; recorded in audit metadata and the
/// outcome summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Sms,
    Api,
}

impl CommandSource {
    fn as_str(self) -> &'static str {
        match self {
            CommandSource::Sms => "sms",
            CommandSource::Api => "api",
        }
    }

    fn label(self) -> &'static str {
        match self {
            CommandSource::Sms => "SMS",
            CommandSource::Api => "the app",
        }
    }
}

/// How a command resolved. Every variant is an expected outcome, not an
/// error; duplicate SMS delivery makes the "already" variants routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferOutcome {
    Accepted,
    Declined,
    /// A decline that arrived after the offer's expiry; recorded as
    /// `expired`, not `declined`.
    Expired,
    AlreadyAccepted,
    AlreadyDeclined,
    AlreadyExpired,
    NoActiveOffer,
    BookingAssignedElsewhere,
}

impl OfferOutcome {
    /// Stable label for API responses and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferOutcome::Accepted => "accepted",
            OfferOutcome::Declined => "declined",
            OfferOutcome::Expired => "expired",
            OfferOutcome::AlreadyAccepted => "already_accepted",
            OfferOutcome::AlreadyDeclined => "already_declined",
            OfferOutcome::AlreadyExpired => "already_expired",
            OfferOutcome::NoActiveOffer => "no_active_offer",
            OfferOutcome::BookingAssignedElsewhere => "booking_assigned_elsewhere",
        }
    }
}

/// The user-facing result of processing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub outcome: OfferOutcome,
    pub message: String,
}

impl CommandReply {
    fn new(outcome: OfferOutcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
        }
    }
}

const NO_ACTIVE_OFFER: &str =
    "No active offer found. Please check the app for available bookings.";

/// Processes accept/decline commands against the offer state machine.
pub struct OfferProcessor {
    store: Arc<dyn MessageStore>,
    calendar: Arc<dyn CalendarSync>,
}

impl OfferProcessor {
    pub fn new(store: Arc<dyn MessageStore>, calendar: Arc<dyn CalendarSync>) -> Self {
        Self { store, calendar }
    }

    /// Accept the sitter's most recent addressable offer (SMS path).
    pub async fn accept_latest(
        &self,
        org_id: &str,
        sitter_id: &str,
        now: DateTime<Utc>,
        source: CommandSource,
    ) -> Result<CommandReply, PawlineError> {
        let Some(offer) = self.store.latest_offer_for_sitter(org_id, sitter_id).await? else {
            return Ok(CommandReply::new(OfferOutcome::NoActiveOffer, NO_ACTIVE_OFFER));
        };
        self.accept_offer(offer, now, source).await
    }

    /// Decline the sitter's most recent addressable offer (SMS path).
    pub async fn decline_latest(
        &self,
        org_id: &str,
        sitter_id: &str,
        now: DateTime<Utc>,
        source: CommandSource,
    ) -> Result<CommandReply, PawlineError> {
        let Some(offer) = self.store.latest_offer_for_sitter(org_id, sitter_id).await? else {
            return Ok(CommandReply::new(OfferOutcome::NoActiveOffer, NO_ACTIVE_OFFER));
        };
        self.decline_offer(offer, now, source).await
    }

    /// Accept a specific offer (authenticated HTTP path).
    pub async fn accept_by_id(
        &self,
        offer_id: &str,
        now: DateTime<Utc>,
        source: CommandSource,
    ) -> Result<CommandReply, PawlineError> {
        let offer = self.require_offer(offer_id).await?;
        self.accept_offer(offer, now, source).await
    }

    /// Decline a specific offer (authenticated HTTP path).
    pub async fn decline_by_id(
        &self,
        offer_id: &str,
        now: DateTime<Utc>,
        source: CommandSource,
    ) -> Result<CommandReply, PawlineError> {
        let offer = self.require_offer(offer_id).await?;
        self.decline_offer(offer, now, source).await
    }

    async fn require_offer(&self, offer_id: &str) -> Result<OfferEvent, PawlineError> {
        self.store
            .get_offer(offer_id)
            .await?
            .ok_or_else(|| PawlineError::NotFound {
                entity: "offer",
                id: offer_id.to_string(),
            })
    }

    async fn accept_offer(
        &self,
        offer: OfferEvent,
        now: DateTime<Utc>,
        source: CommandSource,
    ) -> Result<CommandReply, PawlineError> {
        let booking = self.require_booking(&offer).await?;

        if let Some(reply) = already_terminal_reply(&offer, &booking) {
            return Ok(reply);
        }
        // Accept only addresses unexpired offers; the sweep records the
        // expiry terminal state.
        if offer.is_expired_at(now) {
            return Ok(CommandReply::new(OfferOutcome::NoActiveOffer, NO_ACTIVE_OFFER));
        }
        if let Some(ref assigned) = booking.sitter_id {
            if assigned != &offer.sitter_id {
                return Ok(CommandReply::new(
                    OfferOutcome::BookingAssignedElsewhere,
                    "This booking has already been assigned to another sitter.",
                ));
            }
        }

        let response_seconds = (now - offer.offered_at).num_seconds();
        let resolution = OfferResolution {
            offer_id: offer.id.clone(),
            org_id: offer.org_id.clone(),
            sitter_id: offer.sitter_id.clone(),
            booking_id: offer.booking_id.clone(),
            new_status: OfferStatus::Accepted,
            resolved_at: now,
            decline_reason: None,
            assign_booking: true,
            response_seconds,
            audit: offer_audit(
                &offer,
                event_types::OFFER_ACCEPTED,
                source,
                response_seconds,
                None,
                now,
            ),
        };

        match self.store.apply_offer_resolution(&resolution).await? {
            ResolutionApplied::AlreadyResolved => {
                // A concurrent command won; re-read for the honest reply.
                let current = self.require_offer(&offer.id).await?;
                Ok(already_terminal_reply(&current, &booking).unwrap_or_else(|| {
                    CommandReply::new(OfferOutcome::NoActiveOffer, NO_ACTIVE_OFFER)
                }))
            }
            ResolutionApplied::Applied => {
                info!(
                    offer_id = %offer.id,
                    sitter_id = %offer.sitter_id,
                    response_seconds,
                    "offer accepted"
                );
                let reply = CommandReply::new(
                    OfferOutcome::Accepted,
                    format!(
                        "Offer accepted! You've been assigned to {}'s {}. \
                         Check the app for details.",
                        booking.client_name, booking.service
                    ),
                );
                self.post_commit_accept(&offer, &reply, now, source).await;
                Ok(reply)
            }
        }
    }

    async fn decline_offer(
        &self,
        offer: OfferEvent,
        now: DateTime<Utc>,
        source: CommandSource,
    ) -> Result<CommandReply, PawlineError> {
        let booking = self.require_booking(&offer).await?;

        if let Some(reply) = already_terminal_reply(&offer, &booking) {
            return Ok(reply);
        }

        // A decline that arrives after expiry records the timeout, not an
        // active refusal.
        let expired = offer.is_expired_at(now);
        let (new_status, reason, outcome) = if expired {
            (OfferStatus::Expired, "expired", OfferOutcome::Expired)
        } else {
            (OfferStatus::Declined, "declined", OfferOutcome::Declined)
        };

        let response_seconds = (now - offer.offered_at).num_seconds();
        let resolution = OfferResolution {
            offer_id: offer.id.clone(),
            org_id: offer.org_id.clone(),
            sitter_id: offer.sitter_id.clone(),
            booking_id: offer.booking_id.clone(),
            new_status,
            resolved_at: now,
            decline_reason: Some(reason.to_string()),
            assign_booking: false,
            response_seconds,
            audit: offer_audit(
                &offer,
                event_types::OFFER_DECLINED,
                source,
                response_seconds,
                Some(reason),
                now,
            ),
        };

        match self.store.apply_offer_resolution(&resolution).await? {
            ResolutionApplied::AlreadyResolved => {
                let current = self.require_offer(&offer.id).await?;
                Ok(already_terminal_reply(&current, &booking).unwrap_or_else(|| {
                    CommandReply::new(OfferOutcome::NoActiveOffer, NO_ACTIVE_OFFER)
                }))
            }
            ResolutionApplied::Applied => {
                info!(
                    offer_id = %offer.id,
                    sitter_id = %offer.sitter_id,
                    reason,
                    "offer declined"
                );
                let reply = CommandReply::new(
                    outcome,
                    "Offer declined. We'll notify you of new opportunities.",
                );
                self.write_outcome_summary(&offer, "declined", &reply, now, source)
                    .await;
                Ok(reply)
            }
        }
    }

    async fn require_booking(&self, offer: &OfferEvent) -> Result<Booking, PawlineError> {
        self.store
            .get_booking(&offer.booking_id)
            .await?
            .ok_or_else(|| PawlineError::NotFound {
                entity: "booking",
                id: offer.booking_id.clone(),
            })
    }

    /// Post-commit side effects of an accept. Both are fail-open: a
    /// calendar or summary failure is logged and never unwinds the
    /// committed assignment.
    async fn post_commit_accept(
        &self,
        offer: &OfferEvent,
        reply: &CommandReply,
        now: DateTime<Utc>,
        source: CommandSource,
    ) {
        if let Err(e) = self
            .calendar
            .sync_booking(
                &offer.org_id,
                &offer.booking_id,
                &offer.sitter_id,
                "Booking accepted",
            )
            .await
        {
            warn!(offer_id = %offer.id, error = %e, "calendar sync failed (fail-open)");
        }
        self.write_outcome_summary(offer, "accepted", reply, now, source)
            .await;
    }

    /// Best-effort system message into the sitter's most recent eligible
    /// thread summarizing the outcome.
    async fn write_outcome_summary(
        &self,
        offer: &OfferEvent,
        verb: &str,
        reply: &CommandReply,
        now: DateTime<Utc>,
        source: CommandSource,
    ) {
        let thread = match self
            .store
            .latest_sitter_thread(&offer.org_id, &offer.sitter_id)
            .await
        {
            Ok(Some(thread)) => thread,
            Ok(None) => return,
            Err(e) => {
                warn!(offer_id = %offer.id, error = %e, "outcome summary thread lookup failed");
                return;
            }
        };

        let event = MessageEvent {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread.id.clone(),
            org_id: offer.org_id.clone(),
            direction: Direction::Outbound,
            actor_type: ActorType::System,
            body: format!("Offer {verb} via {}: {}", source.label(), reply.message),
            provider_message_sid: None,
            delivery_status: DeliveryStatus::Sent,
            responsible_sitter_id: thread.assigned_sitter_id.clone(),
            created_at: now,
        };
        if let Err(e) = self.store.insert_event(&event).await {
            warn!(offer_id = %offer.id, error = %e, "outcome summary write failed");
        }
    }
}

fn already_terminal_reply(offer: &OfferEvent, booking: &Booking) -> Option<CommandReply> {
    match offer.status {
        OfferStatus::Accepted => Some(CommandReply::new(
            OfferOutcome::AlreadyAccepted,
            format!(
                "Offer already accepted for {}'s {}.",
                booking.client_name, booking.service
            ),
        )),
        OfferStatus::Declined => Some(CommandReply::new(
            OfferOutcome::AlreadyDeclined,
            "This offer was already declined. Please check the app for new offers.",
        )),
        OfferStatus::Expired => Some(CommandReply::new(
            OfferOutcome::AlreadyExpired,
            "This offer has expired. Please check the app for new offers.",
        )),
        OfferStatus::Sent => None,
    }
}

fn offer_audit(
    offer: &OfferEvent,
    event_type: &str,
    source: CommandSource,
    response_seconds: i64,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> AuditEvent {
    let mut metadata = json!({
        "source": source.as_str(),
        "response_seconds": response_seconds,
        "offer_id": offer.id,
        "booking_id": offer.booking_id,
    });
    if let Some(reason) = reason {
        metadata["reason"] = json!(reason);
    }
    AuditEvent {
        org_id: offer.org_id.clone(),
        event_type: event_type.to_string(),
        actor_type: ActorType::Sitter,
        actor_id: Some(offer.sitter_id.clone()),
        entity_type: Some("offer".to_string()),
        entity_id: Some(offer.id.clone()),
        correlation_id: None,
        metadata,
        created_at: now,
    }
}
