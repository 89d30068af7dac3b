// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Pawline workspace.
//!
//! Enum string forms are `snake_case` in strum, serde, and SQL text columns
//! alike, so logs, audit metadata, and stored rows always agree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Class of a provisioned phone number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NumberClass {
    FrontDesk,
    Sitter,
    Pool,
}

/// Lifecycle status of a provisioned phone number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NumberStatus {
    Active,
    Quarantined,
    Inactive,
}

/// Conversation scope of a thread.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ThreadScope {
    ClientBooking,
    ClientGeneral,
    Internal,
}

/// Lifecycle status of a thread. Threads are never deleted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ThreadStatus {
    Open,
    Closed,
    Archived,
}

/// Direction of a message event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Who produced a message or audit event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    Client,
    Sitter,
    Owner,
    System,
}

/// Carrier delivery status for a message event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Received,
    Queued,
    Sent,
    Delivered,
    Failed,
}

/// Status of a sitter offer. Once it leaves `Sent` it is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Sent,
    Accepted,
    Declined,
    Expired,
}

/// Booking lifecycle status (the slice the engine touches).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

/// Derived temporal status of an assignment window. Never stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WindowStatus {
    Active,
    Future,
    Past,
}

/// Delivery target of a routing decision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
    OwnerInbox,
    Sitter,
    Client,
}

/// A provisioned phone number owned by an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageNumber {
    pub id: String,
    pub org_id: String,
    pub e164: String,
    pub class: NumberClass,
    /// Set only for sitter-class numbers; at most one sitter at a time.
    pub assigned_sitter_id: Option<String>,
    pub status: NumberStatus,
    pub created_at: DateTime<Utc>,
}

/// A conversation scoped to an org, optionally to a client and/or sitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub org_id: String,
    pub client_id: Option<String>,
    pub assigned_sitter_id: Option<String>,
    pub scope: ThreadScope,
    pub status: ThreadStatus,
    /// Assigned exactly once, at thread creation.
    pub masked_number_e164: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_inbound_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A role bound to a thread with a real phone number. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub thread_id: String,
    pub role: ActorType,
    pub phone_e164: String,
    pub created_at: DateTime<Utc>,
}

/// An immutable, append-only record of one inbound or outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub id: String,
    pub thread_id: String,
    pub org_id: String,
    pub direction: Direction,
    pub actor_type: ActorType,
    pub body: String,
    /// Unique per org; the webhook dedup key.
    pub provider_message_sid: Option<String>,
    pub delivery_status: DeliveryStatus,
    /// Snapshot of the thread's assigned sitter at write time, never recomputed.
    pub responsible_sitter_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A time interval during which a sitter is the routing target for a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentWindow {
    pub id: String,
    pub org_id: String,
    pub thread_id: String,
    pub sitter_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub booking_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AssignmentWindow {
    /// Half-open containment: active iff `starts_at <= at < ends_at`.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.starts_at <= at && at < self.ends_at
    }

    /// Derived status relative to `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> WindowStatus {
        if self.is_active_at(now) {
            WindowStatus::Active
        } else if self.starts_at > now {
            WindowStatus::Future
        } else {
            WindowStatus::Past
        }
    }
}

/// A manual directive that preempts rule-based routing while active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingOverride {
    pub id: String,
    pub org_id: String,
    pub thread_id: String,
    pub target: RouteTarget,
    pub target_sitter_id: Option<String>,
    pub starts_at: DateTime<Utc>,
    /// `None` means indefinite until manually removed.
    pub ends_at: Option<DateTime<Utc>>,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl RoutingOverride {
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.starts_at <= at && self.ends_at.is_none_or(|end| at < end)
    }
}

/// The slice of the booking aggregate the engine reads and assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub org_id: String,
    pub client_name: String,
    pub service: String,
    pub sitter_id: Option<String>,
    pub status: BookingStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// A time-boxed invitation for a sitter to accept a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferEvent {
    pub id: String,
    pub org_id: String,
    pub sitter_id: String,
    pub booking_id: String,
    pub status: OfferStatus,
    pub offered_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub declined_at: Option<DateTime<Utc>>,
    pub decline_reason: Option<String>,
    /// Excluded offers never count toward metrics and are not addressable.
    pub excluded: bool,
}

impl OfferEvent {
    pub fn is_terminal(&self) -> bool {
        self.status != OfferStatus::Sent
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Time the sitter responded, for resolved offers only.
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at.or(self.declined_at)
    }
}

/// Rolling 7-day offer statistics for one sitter. Upserted in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitterMetricsWindow {
    pub id: String,
    pub org_id: String,
    pub sitter_id: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub window_type: String,
    pub avg_response_seconds: Option<f64>,
    pub median_response_seconds: Option<f64>,
    pub offer_accept_rate: Option<f64>,
    pub offer_decline_rate: Option<f64>,
    pub offer_expire_rate: Option<f64>,
    pub last_offer_responded_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// The only metrics window type currently computed.
pub const WINDOW_TYPE_WEEKLY_7D: &str = "weekly_7d";

/// A client known to an organization, keyed by phone for sender resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub phone_e164: String,
}

/// A sitter known to an organization, keyed by phone for command dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sitter {
    pub id: String,
    pub org_id: String,
    pub name: String,
    pub phone_e164: String,
}

/// One row in the append-only audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub org_id: String,
    pub event_type: String,
    pub actor_type: ActorType,
    pub actor_id: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    /// Correlation key for reconstructing one request's full trace;
    /// the provider message sid on the webhook path.
    pub correlation_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Audit event type strings, matching what operators filter on.
pub mod event_types {
    pub const ROUTING_FAILED: &str = "messaging.routing_failed";
    pub const INBOUND_RECEIVED: &str = "message.inbound_received";
    pub const MESSAGE_ROUTED: &str = "message.routed";
    pub const OFFER_ACCEPTED: &str = "offer.accepted";
    pub const OFFER_DECLINED: &str = "offer.declined";
    pub const OFFER_EXPIRED: &str = "offer.expired";
    pub const WINDOW_DELETED: &str = "assignment.window_deleted";
    pub const CONFLICT_RESOLVED: &str = "assignment.conflict_resolved";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, h, 0, 0).unwrap()
    }

    fn window(start_h: u32, end_h: u32) -> AssignmentWindow {
        AssignmentWindow {
            id: "w1".into(),
            org_id: "org1".into(),
            thread_id: "t1".into(),
            sitter_id: "s1".into(),
            starts_at: at(start_h),
            ends_at: at(end_h),
            booking_ref: None,
            created_at: at(0),
        }
    }

    #[test]
    fn window_status_is_half_open() {
        let w = window(10, 12);
        assert_eq!(w.status_at(at(9)), WindowStatus::Future);
        assert_eq!(w.status_at(at(10)), WindowStatus::Active);
        assert_eq!(w.status_at(at(11)), WindowStatus::Active);
        // The end bound is exclusive.
        assert_eq!(w.status_at(at(12)), WindowStatus::Past);
    }

    #[test]
    fn override_without_end_is_indefinite() {
        let o = RoutingOverride {
            id: "o1".into(),
            org_id: "org1".into(),
            thread_id: "t1".into(),
            target: RouteTarget::OwnerInbox,
            target_sitter_id: None,
            starts_at: at(8),
            ends_at: None,
            reason: "escalation".into(),
            created_at: at(8),
        };
        assert!(!o.is_active_at(at(7)));
        assert!(o.is_active_at(at(8)));
        assert!(o.is_active_at(at(23)));
    }

    #[test]
    fn offer_terminal_and_resolution() {
        let mut offer = OfferEvent {
            id: "of1".into(),
            org_id: "org1".into(),
            sitter_id: "s1".into(),
            booking_id: "b1".into(),
            status: OfferStatus::Sent,
            offered_at: at(10),
            expires_at: at(11),
            accepted_at: None,
            declined_at: None,
            decline_reason: None,
            excluded: false,
        };
        assert!(!offer.is_terminal());
        assert!(offer.resolved_at().is_none());
        assert!(offer.is_expired_at(at(11)));
        assert!(!offer.is_expired_at(at(10)));

        offer.status = OfferStatus::Accepted;
        offer.accepted_at = Some(at(10));
        assert!(offer.is_terminal());
        assert_eq!(offer.resolved_at(), Some(at(10)));
    }

    #[test]
    fn enum_string_forms_are_snake_case() {
        assert_eq!(NumberClass::FrontDesk.to_string(), "front_desk");
        assert_eq!(ThreadScope::ClientBooking.to_string(), "client_booking");
        assert_eq!(RouteTarget::OwnerInbox.to_string(), "owner_inbox");
        assert_eq!(
            "client_general".parse::<ThreadScope>().unwrap(),
            ThreadScope::ClientGeneral
        );
    }
}
