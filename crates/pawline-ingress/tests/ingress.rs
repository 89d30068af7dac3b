// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook ingress tests over the real SQLite store with a stub carrier.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use pawline_config::StorageConfig;
use pawline_core::traits::{CarrierProvider, LoggingCalendarSync, SendReceipt};
use pawline_core::types::{
    AssignmentWindow, Booking, BookingStatus, Client, DeliveryStatus, MessageNumber, NumberClass,
    NumberStatus, OfferEvent, OfferStatus, Sitter,
};
use pawline_core::{MessageStore, PawlineError};
use pawline_ingress::{IngressHandler, REPLY_UNMATCHED, REPLY_UNVERIFIED};
use pawline_offers::OfferProcessor;
use pawline_storage::SqliteStore;

const WEBHOOK_URL: &str = "https://hooks.example.com/webhooks/sms";
const FRONT_DESK: &str = "+15550002222";
const CLIENT_PHONE: &str = "+15550001111";
const SITTER_PHONE: &str = "+15550003333";

/// Carrier stub with a switchable verification verdict.
struct StubCarrier {
    valid: bool,
}

#[async_trait]
impl CarrierProvider for StubCarrier {
    fn verify_signature(&self, _raw_body: &str, _signature: &str, _url: &str) -> bool {
        self.valid
    }

    async fn send(
        &self,
        _from_e164: &str,
        _to_e164: &str,
        _body: &str,
        _correlation_id: &str,
    ) -> Result<SendReceipt, PawlineError> {
        Ok(SendReceipt {
            provider_message_sid: "SM-stub".into(),
            delivery_status: DeliveryStatus::Queued,
        })
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap()
}

async fn open_store() -> (Arc<SqliteStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        database_path: dir.path().join("ingress.db").to_str().unwrap().to_string(),
        wal_mode: true,
    };
    (Arc::new(SqliteStore::open(&config).await.unwrap()), dir)
}

async fn seed_org(store: &SqliteStore) {
    store
        .create_number(&MessageNumber {
            id: "n1".into(),
            org_id: "org1".into(),
            e164: FRONT_DESK.into(),
            class: NumberClass::FrontDesk,
            assigned_sitter_id: None,
            status: NumberStatus::Active,
            created_at: now(),
        })
        .await
        .unwrap();
    store
        .create_client(&Client {
            id: "c1".into(),
            org_id: "org1".into(),
            name: "Jordan Diaz".into(),
            phone_e164: CLIENT_PHONE.into(),
        })
        .await
        .unwrap();
    store
        .create_sitter(&Sitter {
            id: "s1".into(),
            org_id: "org1".into(),
            name: "Avery".into(),
            phone_e164: SITTER_PHONE.into(),
        })
        .await
        .unwrap();
}

fn handler(store: Arc<SqliteStore>, valid_signature: bool) -> IngressHandler {
    let processor = OfferProcessor::new(store.clone(), Arc::new(LoggingCalendarSync));
    IngressHandler::new(
        store,
        Arc::new(StubCarrier {
            valid: valid_signature,
        }),
        processor,
        WEBHOOK_URL.to_string(),
    )
}

fn payload(from: &str, to: &str, body: &str, sid: &str) -> String {
    serde_urlencoded::to_string([
        ("From", from),
        ("To", to),
        ("Body", body),
        ("MessageSid", sid),
        ("NumMedia", "0"),
    ])
    .unwrap()
}

#[tokio::test]
async fn invalid_signature_answers_neutrally_and_audits() {
    let (store, _dir) = open_store().await;
    seed_org(&store).await;

    let reply = handler(store.clone(), false)
        .handle_inbound(&payload(CLIENT_PHONE, FRONT_DESK, "hi", "SM1"), "bad", now())
        .await;
    assert_eq!(reply, REPLY_UNVERIFIED);

    // One routing_failed audit row with a remediation hint, zero events.
    let audits = store
        .list_audit("org1", Some("messaging.routing_failed"))
        .await
        .unwrap();
    assert_eq!(audits.len(), 1);
    assert!(
        audits[0].metadata["remediation"]
            .as_str()
            .unwrap()
            .contains("auth token")
    );

    let routed = store.list_audit("org1", Some("message.routed")).await.unwrap();
    assert!(routed.is_empty());

    store.close().await.unwrap();
}

#[tokio::test]
async fn unmapped_number_answers_neutrally_and_audits_with_remediation() {
    let (store, _dir) = open_store().await;

    let reply = handler(store.clone(), true)
        .handle_inbound(
            &payload(CLIENT_PHONE, "+15559990000", "hi", "SM1"),
            "sig",
            now(),
        )
        .await;
    assert_eq!(reply, REPLY_UNMATCHED);

    let audits = store
        .list_audit("unknown", Some("messaging.routing_failed"))
        .await
        .unwrap();
    assert_eq!(audits.len(), 1);
    assert!(
        audits[0].metadata["remediation"]
            .as_str()
            .unwrap()
            .contains("provisioning")
    );

    store.close().await.unwrap();
}

#[tokio::test]
async fn client_message_creates_thread_and_exactly_one_event() {
    let (store, _dir) = open_store().await;
    seed_org(&store).await;
    let h = handler(store.clone(), true);

    let reply = h
        .handle_inbound(
            &payload(CLIENT_PHONE, FRONT_DESK, "Is Rex okay?", "SM1"),
            "sig",
            now(),
        )
        .await;
    assert_eq!(reply, "", "ordinary messages suppress the auto-reply");

    // Redelivery of the identical payload creates zero additional events.
    let reply = h
        .handle_inbound(
            &payload(CLIENT_PHONE, FRONT_DESK, "Is Rex okay?", "SM1"),
            "sig",
            now() + Duration::seconds(30),
        )
        .await;
    assert_eq!(reply, "");

    let event = store.find_event_by_sid("org1", "SM1").await.unwrap().unwrap();
    assert_eq!(event.body, "Is Rex okay?");
    let events = store.list_events_for_thread(&event.thread_id).await.unwrap();
    assert_eq!(events.len(), 1);

    // Thread timestamps were bumped and the decision trace persisted.
    let thread = store.get_thread(&event.thread_id).await.unwrap().unwrap();
    assert_eq!(thread.last_inbound_at, Some(now()));

    let routed = store.list_audit("org1", Some("message.routed")).await.unwrap();
    assert_eq!(routed.len(), 1);
    let decision = &routed[0].metadata["decision"];
    assert_eq!(decision["target"], "owner_inbox");
    assert!(decision["trace"].as_array().unwrap().len() >= 2);

    store.close().await.unwrap();
}

#[tokio::test]
async fn unknown_sender_routes_to_owner_inbox_thread() {
    let (store, _dir) = open_store().await;
    seed_org(&store).await;

    handler(store.clone(), true)
        .handle_inbound(
            &payload("+15558887777", FRONT_DESK, "New customer here", "SM2"),
            "sig",
            now(),
        )
        .await;

    let event = store.find_event_by_sid("org1", "SM2").await.unwrap().unwrap();
    let thread = store.get_thread(&event.thread_id).await.unwrap().unwrap();
    assert!(thread.client_id.is_none());
    assert_eq!(thread.scope.to_string(), "internal");

    store.close().await.unwrap();
}

#[tokio::test]
async fn sitter_yes_accepts_the_latest_offer() {
    let (store, _dir) = open_store().await;
    seed_org(&store).await;
    store
        .create_booking(&Booking {
            id: "b1".into(),
            org_id: "org1".into(),
            client_name: "Jordan Diaz".into(),
            service: "Dog Walking".into(),
            sitter_id: None,
            status: BookingStatus::Pending,
            starts_at: now() + Duration::days(1),
            ends_at: now() + Duration::days(1) + Duration::hours(1),
        })
        .await
        .unwrap();
    store
        .create_offer(&OfferEvent {
            id: "of1".into(),
            org_id: "org1".into(),
            sitter_id: "s1".into(),
            booking_id: "b1".into(),
            status: OfferStatus::Sent,
            offered_at: now() - Duration::seconds(2),
            expires_at: now() + Duration::seconds(58),
            accepted_at: None,
            declined_at: None,
            decline_reason: None,
            excluded: false,
        })
        .await
        .unwrap();

    let reply = handler(store.clone(), true)
        .handle_inbound(&payload(SITTER_PHONE, FRONT_DESK, "YES", "SM3"), "sig", now())
        .await;
    assert!(reply.contains("Offer accepted"));

    let offer = store.get_offer("of1").await.unwrap().unwrap();
    assert_eq!(offer.status, OfferStatus::Accepted);
    let booking = store.get_booking("b1").await.unwrap().unwrap();
    assert_eq!(booking.status, BookingStatus::Confirmed);

    // The command path never persisted the inbound "YES" as a client
    // message event.
    assert!(store.find_event_by_sid("org1", "SM3").await.unwrap().is_none());

    store.close().await.unwrap();
}

#[tokio::test]
async fn sitter_chatter_routes_as_an_ordinary_message() {
    let (store, _dir) = open_store().await;
    seed_org(&store).await;

    let reply = handler(store.clone(), true)
        .handle_inbound(
            &payload(SITTER_PHONE, FRONT_DESK, "running 10 min late", "SM4"),
            "sig",
            now(),
        )
        .await;
    assert_eq!(reply, "");
    assert!(store.find_event_by_sid("org1", "SM4").await.unwrap().is_some());

    store.close().await.unwrap();
}

#[tokio::test]
async fn active_window_routes_decision_to_sitter() {
    let (store, _dir) = open_store().await;
    seed_org(&store).await;

    // First message creates the thread.
    let h = handler(store.clone(), true);
    h.handle_inbound(&payload(CLIENT_PHONE, FRONT_DESK, "hello", "SM5"), "sig", now())
        .await;
    let event = store.find_event_by_sid("org1", "SM5").await.unwrap().unwrap();

    store
        .create_window(&AssignmentWindow {
            id: "w1".into(),
            org_id: "org1".into(),
            thread_id: event.thread_id.clone(),
            sitter_id: "s1".into(),
            starts_at: now() - Duration::hours(1),
            ends_at: now() + Duration::hours(1),
            booking_ref: None,
            created_at: now(),
        })
        .await
        .unwrap();

    h.handle_inbound(
        &payload(CLIENT_PHONE, FRONT_DESK, "second message", "SM6"),
        "sig",
        now() + Duration::minutes(1),
    )
    .await;

    let routed = store.list_audit("org1", Some("message.routed")).await.unwrap();
    // Newest first: the second message's decision targets the sitter.
    assert_eq!(routed[0].metadata["decision"]["target"], "sitter");
    assert_eq!(routed[0].metadata["decision"]["target_id"], "s1");

    store.close().await.unwrap();
}
