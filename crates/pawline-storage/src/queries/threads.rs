// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread and participant operations.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};

use pawline_core::types::{ActorType, Thread, ThreadScope};
use pawline_core::PawlineError;

use crate::database::{
    Database, enum_from_sql, map_tr_err, opt_ts_from_sql, ts_from_sql, ts_to_sql,
};

const THREAD_COLS: &str = "id, org_id, client_id, assigned_sitter_id, scope, status, \
     masked_number_e164, last_message_at, last_inbound_at, created_at";

fn row_to_thread(row: &rusqlite::Row<'_>) -> rusqlite::Result<Thread> {
    Ok(Thread {
        id: row.get(0)?,
        org_id: row.get(1)?,
        client_id: row.get(2)?,
        assigned_sitter_id: row.get(3)?,
        scope: enum_from_sql(row.get::<_, String>(4)?)?,
        status: enum_from_sql(row.get::<_, String>(5)?)?,
        masked_number_e164: row.get(6)?,
        last_message_at: opt_ts_from_sql(row.get(7)?)?,
        last_inbound_at: opt_ts_from_sql(row.get(8)?)?,
        created_at: ts_from_sql(row.get::<_, String>(9)?)?,
    })
}

/// Lookup by `(org, client, sitter, scope)` restricted to non-closed,
/// non-archived threads. `IS ?` matches NULL client/sitter columns exactly.
pub async fn find_open_thread(
    db: &Database,
    org_id: &str,
    client_id: Option<&str>,
    sitter_id: Option<&str>,
    scope: ThreadScope,
) -> Result<Option<Thread>, PawlineError> {
    let org_id = org_id.to_string();
    let client_id = client_id.map(str::to_string);
    let sitter_id = sitter_id.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let thread = conn
                .query_row(
                    &format!(
                        "SELECT {THREAD_COLS} FROM threads
                         WHERE org_id = ?1 AND client_id IS ?2
                           AND assigned_sitter_id IS ?3 AND scope = ?4
                           AND status NOT IN ('closed', 'archived')
                         ORDER BY created_at ASC LIMIT 1"
                    ),
                    params![org_id, client_id, sitter_id, scope.to_string()],
                    row_to_thread,
                )
                .optional()?;
            Ok(thread)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new thread.
pub async fn create_thread(db: &Database, thread: &Thread) -> Result<(), PawlineError> {
    let t = thread.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO threads
                   (id, org_id, client_id, assigned_sitter_id, scope, status,
                    masked_number_e164, last_message_at, last_inbound_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    t.id,
                    t.org_id,
                    t.client_id,
                    t.assigned_sitter_id,
                    t.scope.to_string(),
                    t.status.to_string(),
                    t.masked_number_e164,
                    t.last_message_at.map(ts_to_sql),
                    t.last_inbound_at.map(ts_to_sql),
                    ts_to_sql(t.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a thread by id.
pub async fn get_thread(db: &Database, id: &str) -> Result<Option<Thread>, PawlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let thread = conn
                .query_row(
                    &format!("SELECT {THREAD_COLS} FROM threads WHERE id = ?1"),
                    params![id],
                    row_to_thread,
                )
                .optional()?;
            Ok(thread)
        })
        .await
        .map_err(map_tr_err)
}

/// Bump `last_message_at` (and `last_inbound_at` for inbound traffic).
pub async fn touch_thread(
    db: &Database,
    id: &str,
    at: DateTime<Utc>,
    inbound: bool,
) -> Result<(), PawlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            if inbound {
                conn.execute(
                    "UPDATE threads SET last_message_at = ?2, last_inbound_at = ?2
                     WHERE id = ?1",
                    params![id, ts_to_sql(at)],
                )?;
            } else {
                conn.execute(
                    "UPDATE threads SET last_message_at = ?2 WHERE id = ?1",
                    params![id, ts_to_sql(at)],
                )?;
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// The sitter's most recently active client-facing thread.
pub async fn latest_sitter_thread(
    db: &Database,
    org_id: &str,
    sitter_id: &str,
) -> Result<Option<Thread>, PawlineError> {
    let org_id = org_id.to_string();
    let sitter_id = sitter_id.to_string();
    db.connection()
        .call(move |conn| {
            let thread = conn
                .query_row(
                    &format!(
                        "SELECT {THREAD_COLS} FROM threads
                         WHERE org_id = ?1 AND assigned_sitter_id = ?2
                           AND scope IN ('client_booking', 'client_general')
                         ORDER BY last_message_at DESC LIMIT 1"
                    ),
                    params![org_id, sitter_id],
                    row_to_thread,
                )
                .optional()?;
            Ok(thread)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert-if-absent: participants are immutable per `(thread, role, number)`.
pub async fn ensure_participant(
    db: &Database,
    thread_id: &str,
    role: ActorType,
    phone_e164: &str,
    at: DateTime<Utc>,
) -> Result<(), PawlineError> {
    let thread_id = thread_id.to_string();
    let phone_e164 = phone_e164.to_string();
    let id = uuid::Uuid::new_v4().to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO participants
                   (id, thread_id, role, phone_e164, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, thread_id, role.to_string(), phone_e164, ts_to_sql(at)],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
