// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MessageStore trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use pawline_config::StorageConfig;
use pawline_core::traits::{
    InsertOutcome, MessageStore, OfferResolution, ResolutionApplied, WindowFilter, WindowPatch,
};
use pawline_core::types::{
    ActorType, AssignmentWindow, AuditEvent, Booking, Client, MessageEvent, MessageNumber,
    OfferEvent, RoutingOverride, Sitter, SitterMetricsWindow, Thread, ThreadScope,
};
use pawline_core::PawlineError;

use crate::database::Database;
use crate::queries;

/// SQLite-backed message store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the database at the configured path and run migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, PawlineError> {
        let db = Database::open(&config.database_path, config.wal_mode).await?;
        debug!(path = %config.database_path, "SQLite store initialized");
        Ok(Self { db })
    }

    /// Checkpoint and release the store.
    pub async fn close(&self) -> Result<(), PawlineError> {
        self.db.close().await
    }

    /// The underlying database handle, for provisioning and tests.
    pub fn database(&self) -> &Database {
        &self.db
    }

    // --- Provisioning operations (ops/seed path, not part of the trait) ---

    pub async fn create_number(&self, number: &MessageNumber) -> Result<(), PawlineError> {
        queries::numbers::create_number(&self.db, number).await
    }

    pub async fn create_client(&self, client: &Client) -> Result<(), PawlineError> {
        queries::directory::create_client(&self.db, client).await
    }

    pub async fn create_sitter(&self, sitter: &Sitter) -> Result<(), PawlineError> {
        queries::directory::create_sitter(&self.db, sitter).await
    }

    pub async fn create_booking(&self, booking: &Booking) -> Result<(), PawlineError> {
        queries::bookings::create_booking(&self.db, booking).await
    }

    pub async fn create_offer(&self, offer: &OfferEvent) -> Result<(), PawlineError> {
        queries::offers::create_offer(&self.db, offer).await
    }

    pub async fn create_override(&self, o: &RoutingOverride) -> Result<(), PawlineError> {
        queries::overrides::create_override(&self.db, o).await
    }

    pub async fn list_events_for_thread(
        &self,
        thread_id: &str,
    ) -> Result<Vec<MessageEvent>, PawlineError> {
        queries::events::list_events_for_thread(&self.db, thread_id).await
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    // --- Number and directory lookups ---

    async fn find_active_number(
        &self,
        e164: &str,
    ) -> Result<Option<MessageNumber>, PawlineError> {
        queries::numbers::find_active_number(&self.db, e164).await
    }

    async fn find_client_by_phone(
        &self,
        org_id: &str,
        e164: &str,
    ) -> Result<Option<Client>, PawlineError> {
        queries::directory::find_client_by_phone(&self.db, org_id, e164).await
    }

    async fn find_sitter_by_phone(
        &self,
        org_id: &str,
        e164: &str,
    ) -> Result<Option<Sitter>, PawlineError> {
        queries::directory::find_sitter_by_phone(&self.db, org_id, e164).await
    }

    // --- Threads and participants ---

    async fn find_open_thread(
        &self,
        org_id: &str,
        client_id: Option<&str>,
        sitter_id: Option<&str>,
        scope: ThreadScope,
    ) -> Result<Option<Thread>, PawlineError> {
        queries::threads::find_open_thread(&self.db, org_id, client_id, sitter_id, scope).await
    }

    async fn create_thread(&self, thread: &Thread) -> Result<(), PawlineError> {
        queries::threads::create_thread(&self.db, thread).await
    }

    async fn get_thread(&self, id: &str) -> Result<Option<Thread>, PawlineError> {
        queries::threads::get_thread(&self.db, id).await
    }

    async fn touch_thread(
        &self,
        id: &str,
        at: DateTime<Utc>,
        inbound: bool,
    ) -> Result<(), PawlineError> {
        queries::threads::touch_thread(&self.db, id, at, inbound).await
    }

    async fn latest_sitter_thread(
        &self,
        org_id: &str,
        sitter_id: &str,
    ) -> Result<Option<Thread>, PawlineError> {
        queries::threads::latest_sitter_thread(&self.db, org_id, sitter_id).await
    }

    async fn ensure_participant(
        &self,
        thread_id: &str,
        role: ActorType,
        phone_e164: &str,
        at: DateTime<Utc>,
    ) -> Result<(), PawlineError> {
        queries::threads::ensure_participant(&self.db, thread_id, role, phone_e164, at).await
    }

    // --- Message events ---

    async fn find_event_by_sid(
        &self,
        org_id: &str,
        provider_message_sid: &str,
    ) -> Result<Option<MessageEvent>, PawlineError> {
        queries::events::find_event_by_sid(&self.db, org_id, provider_message_sid).await
    }

    async fn insert_event(&self, event: &MessageEvent) -> Result<InsertOutcome, PawlineError> {
        queries::events::insert_event(&self.db, event).await
    }

    // --- Assignment windows ---

    async fn list_windows_for_thread(
        &self,
        thread_id: &str,
    ) -> Result<Vec<AssignmentWindow>, PawlineError> {
        queries::windows::list_windows_for_thread(&self.db, thread_id).await
    }

    async fn list_windows(
        &self,
        org_id: &str,
        filter: &WindowFilter,
    ) -> Result<Vec<AssignmentWindow>, PawlineError> {
        queries::windows::list_windows(&self.db, org_id, filter).await
    }

    async fn get_window(&self, id: &str) -> Result<Option<AssignmentWindow>, PawlineError> {
        queries::windows::get_window(&self.db, id).await
    }

    async fn create_window(&self, window: &AssignmentWindow) -> Result<(), PawlineError> {
        queries::windows::create_window(&self.db, window).await
    }

    async fn update_window(
        &self,
        id: &str,
        patch: &WindowPatch,
    ) -> Result<AssignmentWindow, PawlineError> {
        queries::windows::update_window(&self.db, id, patch).await
    }

    async fn delete_window(&self, id: &str) -> Result<bool, PawlineError> {
        queries::windows::delete_window(&self.db, id).await
    }

    // --- Routing overrides ---

    async fn list_overrides_for_thread(
        &self,
        thread_id: &str,
    ) -> Result<Vec<RoutingOverride>, PawlineError> {
        queries::overrides::list_overrides_for_thread(&self.db, thread_id).await
    }

    // --- Offers and bookings ---

    async fn latest_offer_for_sitter(
        &self,
        org_id: &str,
        sitter_id: &str,
    ) -> Result<Option<OfferEvent>, PawlineError> {
        queries::offers::latest_offer_for_sitter(&self.db, org_id, sitter_id).await
    }

    async fn get_offer(&self, id: &str) -> Result<Option<OfferEvent>, PawlineError> {
        queries::offers::get_offer(&self.db, id).await
    }

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, PawlineError> {
        queries::bookings::get_booking(&self.db, id).await
    }

    async fn apply_offer_resolution(
        &self,
        resolution: &OfferResolution,
    ) -> Result<ResolutionApplied, PawlineError> {
        queries::offers::apply_offer_resolution(&self.db, resolution).await
    }

    async fn list_offers_in_window(
        &self,
        org_id: &str,
        sitter_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OfferEvent>, PawlineError> {
        queries::offers::list_offers_in_window(&self.db, org_id, sitter_id, from, to).await
    }

    async fn expire_overdue_offers(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<OfferEvent>, PawlineError> {
        queries::offers::expire_overdue_offers(&self.db, now).await
    }

    // --- Metrics ---

    async fn upsert_metrics_window(
        &self,
        window: &SitterMetricsWindow,
    ) -> Result<(), PawlineError> {
        queries::metrics::upsert_metrics_window(&self.db, window).await
    }

    async fn get_metrics_window(
        &self,
        org_id: &str,
        sitter_id: &str,
        window_type: &str,
    ) -> Result<Option<SitterMetricsWindow>, PawlineError> {
        queries::metrics::get_metrics_window(&self.db, org_id, sitter_id, window_type).await
    }

    // --- Audit log ---

    async fn record_audit(&self, event: &AuditEvent) -> Result<(), PawlineError> {
        queries::audit::record_audit(&self.db, event).await
    }

    async fn list_audit(
        &self,
        org_id: &str,
        event_type: Option<&str>,
    ) -> Result<Vec<AuditEvent>, PawlineError> {
        queries::audit::list_audit(&self.db, org_id, event_type).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_booking, sample_offer, sample_thread};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn open_creates_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("store.db");
        let store = SqliteStore::open(&make_config(db_path.to_str().unwrap()))
            .await
            .unwrap();
        assert!(db_path.exists(), "database file should be created");
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn full_offer_lifecycle_through_the_trait() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("lifecycle.db");
        let store = SqliteStore::open(&make_config(db_path.to_str().unwrap()))
            .await
            .unwrap();

        store.create_booking(&sample_booking("b1", "org1")).await.unwrap();
        store
            .create_offer(&sample_offer("of1", "org1", "s1", "b1", now()))
            .await
            .unwrap();

        let store_ref: &dyn MessageStore = &store;
        let offer = store_ref
            .latest_offer_for_sitter("org1", "s1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(offer.id, "of1");

        let mut thread = sample_thread("t1", "org1", ThreadScope::ClientBooking);
        thread.assigned_sitter_id = Some("s1".into());
        store_ref.create_thread(&thread).await.unwrap();
        let found = store_ref
            .find_open_thread("org1", None, Some("s1"), ThreadScope::ClientBooking)
            .await
            .unwrap();
        assert!(found.is_some());

        store.close().await.unwrap();
    }
}
