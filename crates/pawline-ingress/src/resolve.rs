// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Number and thread resolution.
//!
//! Resolution never guesses: an unmapped destination number is a typed
//! [`PawlineError::RoutingFailed`] the ingress handler converts into an
//! audit entry and a neutral response, not a retry.

use chrono::{DateTime, Utc};

use pawline_core::types::{MessageNumber, Thread, ThreadScope, ThreadStatus};
use pawline_core::{MessageStore, PawlineError};

/// Resolve the org-owning active number for an inbound destination.
pub async fn resolve_org_by_number(
    store: &dyn MessageStore,
    e164: &str,
) -> Result<MessageNumber, PawlineError> {
    store
        .find_active_number(e164)
        .await?
        .ok_or_else(|| PawlineError::RoutingFailed {
            reason: format!("no active number mapping for {e164}"),
            remediation: "Check number provisioning and organization mapping. \
                          Verify the number exists and is active."
                .to_string(),
        })
}

/// Find or lazily create the thread for `(org, client, sitter, scope)`.
///
/// Lookup is restricted to non-closed, non-archived threads; creation is
/// the only path that assigns `masked_number_e164`.
pub async fn resolve_or_create_thread(
    store: &dyn MessageStore,
    org_id: &str,
    client_id: Option<&str>,
    sitter_id: Option<&str>,
    scope: ThreadScope,
    masked_number_e164: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Thread, PawlineError> {
    if let Some(thread) = store
        .find_open_thread(org_id, client_id, sitter_id, scope)
        .await?
    {
        return Ok(thread);
    }

    let thread = Thread {
        id: uuid::Uuid::new_v4().to_string(),
        org_id: org_id.to_string(),
        client_id: client_id.map(str::to_string),
        assigned_sitter_id: sitter_id.map(str::to_string),
        scope,
        status: ThreadStatus::Open,
        masked_number_e164: masked_number_e164.map(str::to_string),
        last_message_at: None,
        last_inbound_at: None,
        created_at: now,
    };
    store.create_thread(&thread).await?;
    Ok(thread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeZone;
    use pawline_config::StorageConfig;
    use pawline_core::types::{NumberClass, NumberStatus};
    use pawline_storage::SqliteStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap()
    }

    async fn open_store() -> (Arc<SqliteStore>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("resolve.db").to_str().unwrap().to_string(),
            wal_mode: true,
        };
        (Arc::new(SqliteStore::open(&config).await.unwrap()), dir)
    }

    #[tokio::test]
    async fn unmapped_number_is_a_typed_routing_failure() {
        let (store, _dir) = open_store().await;
        let err = resolve_org_by_number(store.as_ref(), "+15550000000")
            .await
            .unwrap_err();
        match err {
            PawlineError::RoutingFailed { reason, remediation } => {
                assert!(reason.contains("+15550000000"));
                assert!(remediation.contains("provisioning"));
            }
            other => panic!("expected RoutingFailed, got {other:?}"),
        }
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn mapped_number_resolves_to_its_org() {
        let (store, _dir) = open_store().await;
        store
            .create_number(&MessageNumber {
                id: "n1".into(),
                org_id: "org1".into(),
                e164: "+15550002222".into(),
                class: NumberClass::FrontDesk,
                assigned_sitter_id: None,
                status: NumberStatus::Active,
                created_at: now(),
            })
            .await
            .unwrap();

        let number = resolve_org_by_number(store.as_ref(), "+15550002222")
            .await
            .unwrap();
        assert_eq!(number.org_id, "org1");
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn thread_is_created_once_and_reused() {
        let (store, _dir) = open_store().await;

        let first = resolve_or_create_thread(
            store.as_ref(),
            "org1",
            Some("c1"),
            None,
            ThreadScope::ClientGeneral,
            Some("+15550002222"),
            now(),
        )
        .await
        .unwrap();
        assert_eq!(first.masked_number_e164.as_deref(), Some("+15550002222"));

        let second = resolve_or_create_thread(
            store.as_ref(),
            "org1",
            Some("c1"),
            None,
            ThreadScope::ClientGeneral,
            Some("+15550009999"),
            now(),
        )
        .await
        .unwrap();
        // The existing thread is reused; the masked number is not rewritten.
        assert_eq!(second.id, first.id);
        assert_eq!(second.masked_number_e164.as_deref(), Some("+15550002222"));

        store.close().await.unwrap();
    }
}
