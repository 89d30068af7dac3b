// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for query module tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use pawline_core::types::{
    ActorType, AssignmentWindow, AuditEvent, Booking, BookingStatus, DeliveryStatus, Direction,
    MessageEvent, MessageNumber, NumberClass, NumberStatus, OfferEvent, OfferStatus, Thread,
    ThreadScope, ThreadStatus,
};

use crate::database::Database;

pub(crate) async fn open_test_db() -> (Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
    (db, dir)
}

pub(crate) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
}

pub(crate) fn sample_number(
    id: &str,
    org_id: &str,
    e164: &str,
    class: NumberClass,
) -> MessageNumber {
    MessageNumber {
        id: id.into(),
        org_id: org_id.into(),
        e164: e164.into(),
        class,
        assigned_sitter_id: None,
        status: NumberStatus::Active,
        created_at: fixed_now(),
    }
}

pub(crate) fn sample_thread(id: &str, org_id: &str, scope: ThreadScope) -> Thread {
    Thread {
        id: id.into(),
        org_id: org_id.into(),
        client_id: None,
        assigned_sitter_id: None,
        scope,
        status: ThreadStatus::Open,
        masked_number_e164: None,
        last_message_at: None,
        last_inbound_at: None,
        created_at: fixed_now(),
    }
}

pub(crate) fn sample_event(
    id: &str,
    thread_id: &str,
    org_id: &str,
    sid: Option<&str>,
) -> MessageEvent {
    MessageEvent {
        id: id.into(),
        thread_id: thread_id.into(),
        org_id: org_id.into(),
        direction: Direction::Inbound,
        actor_type: ActorType::Client,
        body: "hello".into(),
        provider_message_sid: sid.map(str::to_string),
        delivery_status: DeliveryStatus::Received,
        responsible_sitter_id: None,
        created_at: fixed_now(),
    }
}

pub(crate) fn sample_window(
    id: &str,
    thread_id: &str,
    sitter_id: &str,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> AssignmentWindow {
    AssignmentWindow {
        id: id.into(),
        org_id: "org1".into(),
        thread_id: thread_id.into(),
        sitter_id: sitter_id.into(),
        starts_at,
        ends_at,
        booking_ref: None,
        created_at: fixed_now(),
    }
}

pub(crate) fn sample_booking(id: &str, org_id: &str) -> Booking {
    Booking {
        id: id.into(),
        org_id: org_id.into(),
        client_name: "Jordan Diaz".into(),
        service: "Dog Walking".into(),
        sitter_id: None,
        status: BookingStatus::Pending,
        starts_at: fixed_now() + Duration::days(1),
        ends_at: fixed_now() + Duration::days(1) + Duration::hours(1),
    }
}

pub(crate) fn sample_offer(
    id: &str,
    org_id: &str,
    sitter_id: &str,
    booking_id: &str,
    offered_at: DateTime<Utc>,
) -> OfferEvent {
    OfferEvent {
        id: id.into(),
        org_id: org_id.into(),
        sitter_id: sitter_id.into(),
        booking_id: booking_id.into(),
        status: OfferStatus::Sent,
        offered_at,
        expires_at: offered_at + Duration::hours(1),
        accepted_at: None,
        declined_at: None,
        decline_reason: None,
        excluded: false,
    }
}

pub(crate) fn sample_audit(org_id: &str, event_type: &str) -> AuditEvent {
    AuditEvent {
        org_id: org_id.into(),
        event_type: event_type.into(),
        actor_type: ActorType::System,
        actor_id: None,
        entity_type: None,
        entity_id: None,
        correlation_id: None,
        metadata: serde_json::Value::Null,
        created_at: fixed_now(),
    }
}
