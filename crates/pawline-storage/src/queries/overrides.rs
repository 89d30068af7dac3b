// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing override operations.

use rusqlite::params;

use pawline_core::types::RoutingOverride;
use pawline_core::PawlineError;

use crate::database::{
    Database, enum_from_sql, map_tr_err, opt_ts_from_sql, ts_from_sql, ts_to_sql,
};

const OVERRIDE_COLS: &str =
    "id, org_id, thread_id, target, target_sitter_id, starts_at, ends_at, reason, created_at";

fn row_to_override(row: &rusqlite::Row<'_>) -> rusqlite::Result<RoutingOverride> {
    Ok(RoutingOverride {
        id: row.get(0)?,
        org_id: row.get(1)?,
        thread_id: row.get(2)?,
        target: enum_from_sql(row.get::<_, String>(3)?)?,
        target_sitter_id: row.get(4)?,
        starts_at: ts_from_sql(row.get::<_, String>(5)?)?,
        ends_at: opt_ts_from_sql(row.get(6)?)?,
        reason: row.get(7)?,
        created_at: ts_from_sql(row.get::<_, String>(8)?)?,
    })
}

/// All overrides for a thread ordered by start time; activity windows are
/// evaluated by the routing engine, not here.
pub async fn list_overrides_for_thread(
    db: &Database,
    thread_id: &str,
) -> Result<Vec<RoutingOverride>, PawlineError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {OVERRIDE_COLS} FROM routing_overrides
                 WHERE thread_id = ?1 ORDER BY starts_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![thread_id], row_to_override)?;
            let mut overrides = Vec::new();
            for row in rows {
                overrides.push(row?);
            }
            Ok(overrides)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a manual routing directive (operator path).
pub async fn create_override(db: &Database, o: &RoutingOverride) -> Result<(), PawlineError> {
    let o = o.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO routing_overrides
                   (id, org_id, thread_id, target, target_sitter_id,
                    starts_at, ends_at, reason, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    o.id,
                    o.org_id,
                    o.thread_id,
                    o.target.to_string(),
                    o.target_sitter_id,
                    ts_to_sql(o.starts_at),
                    o.ends_at.map(ts_to_sql),
                    o.reason,
                    ts_to_sql(o.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::threads::create_thread;
    use crate::test_support::{open_test_db, sample_thread};
    use chrono::{TimeZone, Utc};
    use pawline_core::types::{RouteTarget, ThreadScope};

    #[tokio::test]
    async fn indefinite_override_round_trips_with_null_end() {
        let (db, _dir) = open_test_db().await;
        create_thread(&db, &sample_thread("t1", "org1", ThreadScope::ClientGeneral))
            .await
            .unwrap();

        let starts = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        create_override(
            &db,
            &RoutingOverride {
                id: "ov1".into(),
                org_id: "org1".into(),
                thread_id: "t1".into(),
                target: RouteTarget::OwnerInbox,
                target_sitter_id: None,
                starts_at: starts,
                ends_at: None,
                reason: "escalated complaint".into(),
                created_at: starts,
            },
        )
        .await
        .unwrap();

        let overrides = list_overrides_for_thread(&db, "t1").await.unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[0].target, RouteTarget::OwnerInbox);
        assert!(overrides[0].ends_at.is_none());

        db.close().await.unwrap();
    }
}
