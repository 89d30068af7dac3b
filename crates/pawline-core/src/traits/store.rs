// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Narrow repository interface over the transactional store.
//!
//! The engine never issues raw queries; every operation it needs from
//! persistence is a typed method here. `pawline-storage` provides the
//! SQLite implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PawlineError;
use crate::types::{
    ActorType, AssignmentWindow, AuditEvent, Booking, Client, MessageEvent, MessageNumber,
    OfferEvent, OfferStatus, RoutingOverride, Sitter, SitterMetricsWindow, Thread, ThreadScope,
    WindowStatus,
};

/// Outcome of an append that rides a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The dedup key already existed; the write was absorbed, not an error.
    Duplicate,
}

/// Outcome of a guarded offer transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionApplied {
    Applied,
    /// The `WHERE status='sent'` guard matched zero rows: a concurrent
    /// command already resolved this offer.
    AlreadyResolved,
}

/// One multi-step offer resolution, executed atomically by the store:
/// guarded status flip, optional booking assignment, metrics recompute,
/// and the audit row — all in a single transaction.
#[derive(Debug, Clone)]
pub struct OfferResolution {
    pub offer_id: String,
    pub org_id: String,
    pub sitter_id: String,
    pub booking_id: String,
    pub new_status: OfferStatus,
    pub resolved_at: DateTime<Utc>,
    pub decline_reason: Option<String>,
    /// True on accept: assigns the booking to the sitter and confirms it.
    pub assign_booking: bool,
    pub response_seconds: i64,
    pub audit: AuditEvent,
}

/// Filters for listing assignment windows.
#[derive(Debug, Clone, Default)]
pub struct WindowFilter {
    pub thread_id: Option<String>,
    pub sitter_id: Option<String>,
    /// Derived-status filter evaluated against `at`.
    pub status: Option<WindowStatus>,
    pub at: Option<DateTime<Utc>>,
}

/// Partial update for an assignment window.
#[derive(Debug, Clone, Default)]
pub struct WindowPatch {
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub sitter_id: Option<String>,
    pub booking_ref: Option<Option<String>>,
}

/// Repository operations the routing/offer engine needs from persistence.
#[async_trait]
pub trait MessageStore: Send + Sync {
    // --- Number and directory lookups ---

    /// Resolve an active provisioned number by its E.164 form.
    async fn find_active_number(&self, e164: &str)
    -> Result<Option<MessageNumber>, PawlineError>;

    async fn find_client_by_phone(
        &self,
        org_id: &str,
        e164: &str,
    ) -> Result<Option<Client>, PawlineError>;

    async fn find_sitter_by_phone(
        &self,
        org_id: &str,
        e164: &str,
    ) -> Result<Option<Sitter>, PawlineError>;

    // --- Threads and participants ---

    /// Lookup by `(org, client, sitter, scope)` restricted to non-closed,
    /// non-archived threads.
    async fn find_open_thread(
        &self,
        org_id: &str,
        client_id: Option<&str>,
        sitter_id: Option<&str>,
        scope: ThreadScope,
    ) -> Result<Option<Thread>, PawlineError>;

    async fn create_thread(&self, thread: &Thread) -> Result<(), PawlineError>;

    async fn get_thread(&self, id: &str) -> Result<Option<Thread>, PawlineError>;

    /// Bump `last_message_at` (and `last_inbound_at` when `inbound`).
    async fn touch_thread(
        &self,
        id: &str,
        at: DateTime<Utc>,
        inbound: bool,
    ) -> Result<(), PawlineError>;

    /// The sitter's most recently active client-facing thread, used for
    /// the best-effort system message after an offer command.
    async fn latest_sitter_thread(
        &self,
        org_id: &str,
        sitter_id: &str,
    ) -> Result<Option<Thread>, PawlineError>;

    /// Insert-if-absent; participants are immutable per
    /// `(thread, role, number)`.
    async fn ensure_participant(
        &self,
        thread_id: &str,
        role: ActorType,
        phone_e164: &str,
        at: DateTime<Utc>,
    ) -> Result<(), PawlineError>;

    // --- Message events ---

    async fn find_event_by_sid(
        &self,
        org_id: &str,
        provider_message_sid: &str,
    ) -> Result<Option<MessageEvent>, PawlineError>;

    /// Append one event. A `(org_id, provider_message_sid)` uniqueness
    /// conflict is reported as [`InsertOutcome::Duplicate`], never an error.
    async fn insert_event(&self, event: &MessageEvent) -> Result<InsertOutcome, PawlineError>;

    // --- Assignment windows ---

    async fn list_windows_for_thread(
        &self,
        thread_id: &str,
    ) -> Result<Vec<AssignmentWindow>, PawlineError>;

    async fn list_windows(
        &self,
        org_id: &str,
        filter: &WindowFilter,
    ) -> Result<Vec<AssignmentWindow>, PawlineError>;

    async fn get_window(&self, id: &str) -> Result<Option<AssignmentWindow>, PawlineError>;

    async fn create_window(&self, window: &AssignmentWindow) -> Result<(), PawlineError>;

    async fn update_window(
        &self,
        id: &str,
        patch: &WindowPatch,
    ) -> Result<AssignmentWindow, PawlineError>;

    /// Returns false when the window did not exist.
    async fn delete_window(&self, id: &str) -> Result<bool, PawlineError>;

    // --- Routing overrides ---

    async fn list_overrides_for_thread(
        &self,
        thread_id: &str,
    ) -> Result<Vec<RoutingOverride>, PawlineError>;

    // --- Offers and bookings ---

    /// Most recent (`offered_at desc`) non-excluded offer for the pair,
    /// regardless of status, so callers can produce "already resolved"
    /// replies.
    async fn latest_offer_for_sitter(
        &self,
        org_id: &str,
        sitter_id: &str,
    ) -> Result<Option<OfferEvent>, PawlineError>;

    async fn get_offer(&self, id: &str) -> Result<Option<OfferEvent>, PawlineError>;

    async fn get_booking(&self, id: &str) -> Result<Option<Booking>, PawlineError>;

    /// Apply one offer resolution atomically. See [`OfferResolution`].
    async fn apply_offer_resolution(
        &self,
        resolution: &OfferResolution,
    ) -> Result<ResolutionApplied, PawlineError>;

    /// Non-excluded offers with `offered_at` in `[from, to]`.
    async fn list_offers_in_window(
        &self,
        org_id: &str,
        sitter_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OfferEvent>, PawlineError>;

    /// Flip every still-`sent`, non-excluded offer past its expiry to
    /// `expired` and return the affected offers.
    async fn expire_overdue_offers(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<OfferEvent>, PawlineError>;

    // --- Metrics ---

    async fn upsert_metrics_window(
        &self,
        window: &SitterMetricsWindow,
    ) -> Result<(), PawlineError>;

    async fn get_metrics_window(
        &self,
        org_id: &str,
        sitter_id: &str,
        window_type: &str,
    ) -> Result<Option<SitterMetricsWindow>, PawlineError>;

    // --- Audit log ---

    async fn record_audit(&self, event: &AuditEvent) -> Result<(), PawlineError>;

    async fn list_audit(
        &self,
        org_id: &str,
        event_type: Option<&str>,
    ) -> Result<Vec<AuditEvent>, PawlineError>;
}
