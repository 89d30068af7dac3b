// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only audit log operations.

use rusqlite::params;

use pawline_core::types::{ActorType, AuditEvent};
use pawline_core::PawlineError;

use crate::database::{Database, enum_from_sql, map_tr_err, ts_from_sql, ts_to_sql};

/// Insert one audit row on an open connection or transaction.
pub(crate) fn insert_conn(
    conn: &rusqlite::Connection,
    event: &AuditEvent,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO event_log
           (org_id, event_type, actor_type, actor_id, entity_type, entity_id,
            correlation_id, metadata, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            event.org_id,
            event.event_type,
            event.actor_type.to_string(),
            event.actor_id,
            event.entity_type,
            event.entity_id,
            event.correlation_id,
            event.metadata.to_string(),
            ts_to_sql(event.created_at),
        ],
    )?;
    Ok(())
}

/// Record one audit event.
pub async fn record_audit(db: &Database, event: &AuditEvent) -> Result<(), PawlineError> {
    let event = event.clone();
    db.connection()
        .call(move |conn| {
            insert_conn(conn, &event)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Audit rows for an org, newest first, optionally filtered by event type.
pub async fn list_audit(
    db: &Database,
    org_id: &str,
    event_type: Option<&str>,
) -> Result<Vec<AuditEvent>, PawlineError> {
    let org_id = org_id.to_string();
    let event_type = event_type.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let sql = "SELECT org_id, event_type, actor_type, actor_id, entity_type,
                              entity_id, correlation_id, metadata, created_at
                       FROM event_log
                       WHERE org_id = ?1 AND (?2 IS NULL OR event_type = ?2)
                       ORDER BY id DESC";
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt.query_map(params![org_id, event_type], |row| {
                let metadata: String = row.get(7)?;
                Ok(AuditEvent {
                    org_id: row.get(0)?,
                    event_type: row.get(1)?,
                    actor_type: enum_from_sql::<ActorType>(row.get::<_, String>(2)?)?,
                    actor_id: row.get(3)?,
                    entity_type: row.get(4)?,
                    entity_id: row.get(5)?,
                    correlation_id: row.get(6)?,
                    metadata: serde_json::from_str(&metadata).unwrap_or(serde_json::Value::Null),
                    created_at: ts_from_sql(row.get::<_, String>(8)?)?,
                })
            })?;
            let mut events = Vec::new();
            for row in rows {
                events.push(row?);
            }
            Ok(events)
        })
        .await
        .map_err(map_tr_err)
}
