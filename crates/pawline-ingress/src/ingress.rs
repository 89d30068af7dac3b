// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound webhook handling.
//!
//! Every path out of [`IngressHandler::handle_inbound`] is a reply body the
//! gateway wraps in TwiML with HTTP 200 — authentication failures,
//! unmapped numbers, and internal errors all answer neutrally so the
//! carrier never retries. Internal failures become audit entries with a
//! remediation hint, keyed by the provider message sid.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, error, warn};

use pawline_core::types::{
    ActorType, AuditEvent, DeliveryStatus, Direction, MessageEvent, MessageNumber, NumberClass,
    ThreadScope, event_types,
};
use pawline_core::{CarrierProvider, InsertOutcome, MessageStore, PawlineError};
use pawline_offers::{CommandSource, OfferCommand, OfferProcessor, parse_command};
use pawline_routing::{RoutingContext, evaluate};

use crate::payload::InboundSms;
use crate::resolve;

/// Neutral reply for signature verification failures.
pub const REPLY_UNVERIFIED: &str =
    "We couldn't verify this message. Please contact support.";
/// Neutral reply for unresolvable destination numbers.
pub const REPLY_UNMATCHED: &str = "We couldn't match this message. Please contact support.";
/// Neutral reply for internal failures.
pub const REPLY_FAILED: &str = "We couldn't process this message. Please contact support.";

const REMEDIATION_SIGNATURE: &str =
    "Verify the webhook URL and carrier auth token configuration. \
     Check the configured URL matches the carrier's callback.";

/// Orchestrates one inbound webhook delivery end to end.
pub struct IngressHandler {
    store: Arc<dyn MessageStore>,
    carrier: Arc<dyn CarrierProvider>,
    processor: OfferProcessor,
    webhook_url: String,
}

impl IngressHandler {
    pub fn new(
        store: Arc<dyn MessageStore>,
        carrier: Arc<dyn CarrierProvider>,
        processor: OfferProcessor,
        webhook_url: String,
    ) -> Self {
        Self {
            store,
            carrier,
            processor,
            webhook_url,
        }
    }

    /// Handle one webhook delivery and return the reply body (empty =
    /// suppress the auto-reply). Never fails: the webhook path answers
    /// 200 whatever happens.
    pub async fn handle_inbound(
        &self,
        raw_body: &str,
        signature: &str,
        now: DateTime<Utc>,
    ) -> String {
        let sms = match InboundSms::parse(raw_body) {
            Ok(sms) => sms,
            Err(e) => {
                error!(error = %e, "unparseable webhook payload");
                return REPLY_FAILED.to_string();
            }
        };

        // Signatures are computed against the *configured* callback URL,
        // never a caller-supplied one.
        if !self
            .carrier
            .verify_signature(raw_body, signature, &self.webhook_url)
        {
            warn!(correlation_id = %sms.message_sid, "invalid webhook signature");
            self.audit_routing_failed(
                &sms,
                "invalid webhook signature",
                REMEDIATION_SIGNATURE,
                now,
            )
            .await;
            return REPLY_UNVERIFIED.to_string();
        }

        match self.process(&sms, now).await {
            Ok(reply) => reply,
            Err(PawlineError::RoutingFailed { reason, remediation }) => {
                warn!(correlation_id = %sms.message_sid, %reason, "inbound routing failed");
                self.audit_routing_failed(&sms, &reason, &remediation, now).await;
                REPLY_UNMATCHED.to_string()
            }
            Err(e) => {
                error!(correlation_id = %sms.message_sid, error = %e, "inbound handling failed");
                REPLY_FAILED.to_string()
            }
        }
    }

    async fn process(&self, sms: &InboundSms, now: DateTime<Utc>) -> Result<String, PawlineError> {
        let number = resolve::resolve_org_by_number(self.store.as_ref(), &sms.to).await?;
        let org_id = number.org_id.clone();

        // Dedup before any state mutation: a carrier redelivery must not
        // create a second event or re-trigger offer side effects.
        if !sms.message_sid.is_empty()
            && self
                .store
                .find_event_by_sid(&org_id, &sms.message_sid)
                .await?
                .is_some()
        {
            debug!(correlation_id = %sms.message_sid, "duplicate delivery absorbed");
            return Ok(String::new());
        }

        if sms.media_count() > 0 {
            debug!(
                correlation_id = %sms.message_sid,
                media = sms.media_count(),
                "ignoring media attachments"
            );
        }

        // Recognized sitter + command grammar bypasses normal routing.
        if let Some(sitter) = self.store.find_sitter_by_phone(&org_id, &sms.from).await? {
            if let Some(command) = parse_command(&sms.body) {
                let reply = match command {
                    OfferCommand::Accept => {
                        self.processor
                            .accept_latest(&org_id, &sitter.id, now, CommandSource::Sms)
                            .await?
                    }
                    OfferCommand::Decline => {
                        self.processor
                            .decline_latest(&org_id, &sitter.id, now, CommandSource::Sms)
                            .await?
                    }
                };
                return Ok(reply.message);
            }
        }

        self.route_message(&number, sms, now).await
    }

    async fn route_message(
        &self,
        number: &MessageNumber,
        sms: &InboundSms,
        now: DateTime<Utc>,
    ) -> Result<String, PawlineError> {
        let store = self.store.as_ref();
        let org_id = &number.org_id;

        let client = store.find_client_by_phone(org_id, &sms.from).await?;

        // Thread scope follows the number class: a sitter-class number with
        // an assignment binds the client to that sitter; everything else
        // lands in the owner inbox.
        let (scope, sitter_id) = match (number.class, &number.assigned_sitter_id) {
            (NumberClass::Sitter, Some(sitter_id)) => {
                (ThreadScope::ClientBooking, Some(sitter_id.clone()))
            }
            _ => (ThreadScope::Internal, None),
        };

        let thread = match client {
            Some(ref client) => {
                resolve::resolve_or_create_thread(
                    store,
                    org_id,
                    Some(&client.id),
                    sitter_id.as_deref(),
                    scope,
                    Some(&sms.to),
                    now,
                )
                .await?
            }
            // Unknown sender: deliver to the org's internal owner inbox.
            None => {
                resolve::resolve_or_create_thread(
                    store,
                    org_id,
                    None,
                    None,
                    ThreadScope::Internal,
                    Some(&sms.to),
                    now,
                )
                .await?
            }
        };

        // Evaluate routing with a full trace and persist it with the event,
        // so the decision stays auditable across ruleset versions.
        let windows = store.list_windows_for_thread(&thread.id).await?;
        let overrides = store.list_overrides_for_thread(&thread.id).await?;
        let decision = evaluate(
            &RoutingContext {
                thread: thread.clone(),
                windows,
                overrides,
            },
            now,
            Direction::Inbound,
        );

        let event = MessageEvent {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread.id.clone(),
            org_id: org_id.clone(),
            direction: Direction::Inbound,
            actor_type: ActorType::Client,
            body: sms.body.clone(),
            provider_message_sid: (!sms.message_sid.is_empty())
                .then(|| sms.message_sid.clone()),
            delivery_status: DeliveryStatus::Received,
            responsible_sitter_id: thread.assigned_sitter_id.clone(),
            created_at: now,
        };
        if store.insert_event(&event).await? == InsertOutcome::Duplicate {
            // A concurrent redelivery slipped past the read check; the
            // unique index absorbed it.
            debug!(correlation_id = %sms.message_sid, "duplicate insert absorbed");
            return Ok(String::new());
        }

        store.touch_thread(&thread.id, now, true).await?;
        if let Some(ref client) = client {
            store
                .ensure_participant(&thread.id, ActorType::Client, &client.phone_e164, now)
                .await?;
        }

        self.audit_best_effort(AuditEvent {
            org_id: org_id.clone(),
            event_type: event_types::MESSAGE_ROUTED.to_string(),
            actor_type: ActorType::System,
            actor_id: None,
            entity_type: Some("thread".to_string()),
            entity_id: Some(thread.id.clone()),
            correlation_id: (!sms.message_sid.is_empty()).then(|| sms.message_sid.clone()),
            metadata: json!({
                "decision": decision,
                "event_id": event.id,
            }),
            created_at: now,
        })
        .await;

        self.audit_best_effort(AuditEvent {
            org_id: org_id.clone(),
            event_type: event_types::INBOUND_RECEIVED.to_string(),
            actor_type: ActorType::System,
            actor_id: Some(sms.from.clone()),
            entity_type: Some("thread".to_string()),
            entity_id: Some(thread.id.clone()),
            correlation_id: (!sms.message_sid.is_empty()).then(|| sms.message_sid.clone()),
            metadata: json!({
                "from": sms.from,
                "to": sms.to,
                "scope": thread.scope,
                "client_known": client.is_some(),
            }),
            created_at: now,
        })
        .await;

        // No auto-reply for ordinary messages.
        Ok(String::new())
    }

    /// Audit the routing failure itself; the org is resolved best-effort
    /// for context and falls back to "unknown".
    async fn audit_routing_failed(
        &self,
        sms: &InboundSms,
        reason: &str,
        remediation: &str,
        now: DateTime<Utc>,
    ) {
        let org_id = match self.store.find_active_number(&sms.to).await {
            Ok(Some(number)) => number.org_id,
            _ => "unknown".to_string(),
        };
        self.audit_best_effort(AuditEvent {
            org_id,
            event_type: event_types::ROUTING_FAILED.to_string(),
            actor_type: ActorType::System,
            actor_id: Some("system".to_string()),
            entity_type: Some("message".to_string()),
            entity_id: None,
            correlation_id: (!sms.message_sid.is_empty()).then(|| sms.message_sid.clone()),
            metadata: json!({
                "from": sms.from,
                "to": sms.to,
                "reason": reason,
                "remediation": remediation,
            }),
            created_at: now,
        })
        .await;
    }

    /// Audit failures are logged, never propagated: losing an audit row
    /// must not turn a handled webhook into a carrier retry.
    async fn audit_best_effort(&self, event: AuditEvent) {
        if let Err(e) = self.store.record_audit(&event).await {
            error!(event_type = %event.event_type, error = %e, "audit write failed");
        }
    }
}
