// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message event operations. Events are append-only and never mutated.

use rusqlite::{OptionalExtension, params};

use pawline_core::traits::InsertOutcome;
use pawline_core::types::MessageEvent;
use pawline_core::PawlineError;

use crate::database::{Database, enum_from_sql, map_tr_err, ts_from_sql, ts_to_sql};

const EVENT_COLS: &str = "id, thread_id, org_id, direction, actor_type, body, \
     provider_message_sid, delivery_status, responsible_sitter_id, created_at";

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageEvent> {
    Ok(MessageEvent {
        id: row.get(0)?,
        thread_id: row.get(1)?,
        org_id: row.get(2)?,
        direction: enum_from_sql(row.get::<_, String>(3)?)?,
        actor_type: enum_from_sql(row.get::<_, String>(4)?)?,
        body: row.get(5)?,
        provider_message_sid: row.get(6)?,
        delivery_status: enum_from_sql(row.get::<_, String>(7)?)?,
        responsible_sitter_id: row.get(8)?,
        created_at: ts_from_sql(row.get::<_, String>(9)?)?,
    })
}

/// Find an event by its dedup key.
pub async fn find_event_by_sid(
    db: &Database,
    org_id: &str,
    provider_message_sid: &str,
) -> Result<Option<MessageEvent>, PawlineError> {
    let org_id = org_id.to_string();
    let sid = provider_message_sid.to_string();
    db.connection()
        .call(move |conn| {
            let event = conn
                .query_row(
                    &format!(
                        "SELECT {EVENT_COLS} FROM message_events
                         WHERE org_id = ?1 AND provider_message_sid = ?2"
                    ),
                    params![org_id, sid],
                    row_to_event,
                )
                .optional()?;
            Ok(event)
        })
        .await
        .map_err(map_tr_err)
}

/// Append one event. A `(org_id, provider_message_sid)` uniqueness conflict
/// is the dedup hit for a redelivered webhook, reported as `Duplicate`.
pub async fn insert_event(
    db: &Database,
    event: &MessageEvent,
) -> Result<InsertOutcome, PawlineError> {
    let e = event.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO message_events
                   (id, thread_id, org_id, direction, actor_type, body,
                    provider_message_sid, delivery_status, responsible_sitter_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    e.id,
                    e.thread_id,
                    e.org_id,
                    e.direction.to_string(),
                    e.actor_type.to_string(),
                    e.body,
                    e.provider_message_sid,
                    e.delivery_status.to_string(),
                    e.responsible_sitter_id,
                    ts_to_sql(e.created_at),
                ],
            );
            match result {
                Ok(_) => Ok(InsertOutcome::Inserted),
                Err(err) if is_dedup_conflict(&err) => Ok(InsertOutcome::Duplicate),
                Err(err) => Err(err.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Events for a thread in chronological order.
pub async fn list_events_for_thread(
    db: &Database,
    thread_id: &str,
) -> Result<Vec<MessageEvent>, PawlineError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {EVENT_COLS} FROM message_events
                 WHERE thread_id = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![thread_id], row_to_event)?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?);
            }
            Ok(events)
        })
        .await
        .map_err(map_tr_err)
}

fn is_dedup_conflict(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && msg.contains("provider_message_sid")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::threads::create_thread;
    use crate::test_support::{open_test_db, sample_event, sample_thread};
    use pawline_core::types::ThreadScope;

    #[tokio::test]
    async fn redelivered_sid_is_absorbed_as_duplicate() {
        let (db, _dir) = open_test_db().await;
        create_thread(&db, &sample_thread("t1", "org1", ThreadScope::ClientGeneral))
            .await
            .unwrap();

        let first = sample_event("m1", "t1", "org1", Some("SM100"));
        assert_eq!(
            insert_event(&db, &first).await.unwrap(),
            InsertOutcome::Inserted
        );

        // Identical provider sid, fresh row id: the carrier redelivered.
        let redelivery = sample_event("m2", "t1", "org1", Some("SM100"));
        assert_eq!(
            insert_event(&db, &redelivery).await.unwrap(),
            InsertOutcome::Duplicate
        );

        let events = list_events_for_thread(&db, "t1").await.unwrap();
        assert_eq!(events.len(), 1, "exactly one event per provider sid");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_sid_in_different_orgs_is_not_a_conflict() {
        let (db, _dir) = open_test_db().await;
        create_thread(&db, &sample_thread("t1", "org1", ThreadScope::ClientGeneral))
            .await
            .unwrap();
        create_thread(&db, &sample_thread("t2", "org2", ThreadScope::ClientGeneral))
            .await
            .unwrap();

        let a = sample_event("m1", "t1", "org1", Some("SM100"));
        let b = sample_event("m2", "t2", "org2", Some("SM100"));
        assert_eq!(insert_event(&db, &a).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(insert_event(&db, &b).await.unwrap(), InsertOutcome::Inserted);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn events_without_sid_never_collide() {
        let (db, _dir) = open_test_db().await;
        create_thread(&db, &sample_thread("t1", "org1", ThreadScope::ClientGeneral))
            .await
            .unwrap();

        // System-generated events carry no provider sid.
        let a = sample_event("m1", "t1", "org1", None);
        let b = sample_event("m2", "t1", "org1", None);
        assert_eq!(insert_event(&db, &a).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(insert_event(&db, &b).await.unwrap(), InsertOutcome::Inserted);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_by_sid_round_trips() {
        let (db, _dir) = open_test_db().await;
        create_thread(&db, &sample_thread("t1", "org1", ThreadScope::ClientGeneral))
            .await
            .unwrap();

        let event = sample_event("m1", "t1", "org1", Some("SM200"));
        insert_event(&db, &event).await.unwrap();

        let found = find_event_by_sid(&db, "org1", "SM200").await.unwrap().unwrap();
        assert_eq!(found, event);

        assert!(find_event_by_sid(&db, "org1", "SM999").await.unwrap().is_none());

        db.close().await.unwrap();
    }
}
