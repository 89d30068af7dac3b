// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assignment window CRUD.

use rusqlite::{OptionalExtension, params};

use pawline_core::traits::{WindowFilter, WindowPatch};
use pawline_core::types::{AssignmentWindow, WindowStatus};
use pawline_core::PawlineError;

use crate::database::{Database, map_tr_err, ts_from_sql, ts_to_sql};

const WINDOW_COLS: &str =
    "id, org_id, thread_id, sitter_id, starts_at, ends_at, booking_ref, created_at";

fn row_to_window(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssignmentWindow> {
    Ok(AssignmentWindow {
        id: row.get(0)?,
        org_id: row.get(1)?,
        thread_id: row.get(2)?,
        sitter_id: row.get(3)?,
        starts_at: ts_from_sql(row.get::<_, String>(4)?)?,
        ends_at: ts_from_sql(row.get::<_, String>(5)?)?,
        booking_ref: row.get(6)?,
        created_at: ts_from_sql(row.get::<_, String>(7)?)?,
    })
}

/// All windows for a thread ordered by start time.
pub async fn list_windows_for_thread(
    db: &Database,
    thread_id: &str,
) -> Result<Vec<AssignmentWindow>, PawlineError> {
    let thread_id = thread_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {WINDOW_COLS} FROM assignment_windows
                 WHERE thread_id = ?1 ORDER BY starts_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![thread_id], row_to_window)?;
            let mut windows = Vec::new();
            for row in rows {
                windows.push(row?);
            }
            Ok(windows)
        })
        .await
        .map_err(map_tr_err)
}

/// Windows for an org, filtered by thread/sitter and derived status.
pub async fn list_windows(
    db: &Database,
    org_id: &str,
    filter: &WindowFilter,
) -> Result<Vec<AssignmentWindow>, PawlineError> {
    let org_id = org_id.to_string();
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let mut sql = format!(
                "SELECT {WINDOW_COLS} FROM assignment_windows WHERE org_id = ?1"
            );
            let mut args: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(org_id)];

            if let Some(ref thread_id) = filter.thread_id {
                args.push(Box::new(thread_id.clone()));
                sql.push_str(&format!(" AND thread_id = ?{}", args.len()));
            }
            if let Some(ref sitter_id) = filter.sitter_id {
                args.push(Box::new(sitter_id.clone()));
                sql.push_str(&format!(" AND sitter_id = ?{}", args.len()));
            }
            if let Some(status) = filter.status {
                let at = ts_to_sql(filter.at.unwrap_or_else(chrono::Utc::now));
                args.push(Box::new(at));
                let n = args.len();
                match status {
                    WindowStatus::Active => {
                        sql.push_str(&format!(" AND starts_at <= ?{n} AND ends_at > ?{n}"));
                    }
                    WindowStatus::Future => sql.push_str(&format!(" AND starts_at > ?{n}")),
                    WindowStatus::Past => sql.push_str(&format!(" AND ends_at <= ?{n}")),
                }
            }
            sql.push_str(" ORDER BY starts_at DESC, id ASC");

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(args), row_to_window)?;
            let mut windows = Vec::new();
            for row in rows {
                windows.push(row?);
            }
            Ok(windows)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a window by id.
pub async fn get_window(
    db: &Database,
    id: &str,
) -> Result<Option<AssignmentWindow>, PawlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let window = conn
                .query_row(
                    &format!("SELECT {WINDOW_COLS} FROM assignment_windows WHERE id = ?1"),
                    params![id],
                    row_to_window,
                )
                .optional()?;
            Ok(window)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new window. Bounds are validated by the caller and the schema's
/// CHECK constraint.
pub async fn create_window(db: &Database, window: &AssignmentWindow) -> Result<(), PawlineError> {
    let w = window.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO assignment_windows
                   (id, org_id, thread_id, sitter_id, starts_at, ends_at, booking_ref, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    w.id,
                    w.org_id,
                    w.thread_id,
                    w.sitter_id,
                    ts_to_sql(w.starts_at),
                    ts_to_sql(w.ends_at),
                    w.booking_ref,
                    ts_to_sql(w.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial update and return the updated row.
pub async fn update_window(
    db: &Database,
    id: &str,
    patch: &WindowPatch,
) -> Result<AssignmentWindow, PawlineError> {
    let id = id.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut window = tx
                .query_row(
                    &format!("SELECT {WINDOW_COLS} FROM assignment_windows WHERE id = ?1"),
                    params![id],
                    row_to_window,
                )
                .optional()?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;

            if let Some(starts_at) = patch.starts_at {
                window.starts_at = starts_at;
            }
            if let Some(ends_at) = patch.ends_at {
                window.ends_at = ends_at;
            }
            if let Some(ref sitter_id) = patch.sitter_id {
                window.sitter_id = sitter_id.clone();
            }
            if let Some(ref booking_ref) = patch.booking_ref {
                window.booking_ref = booking_ref.clone();
            }

            tx.execute(
                "UPDATE assignment_windows
                 SET starts_at = ?2, ends_at = ?3, sitter_id = ?4, booking_ref = ?5
                 WHERE id = ?1",
                params![
                    window.id,
                    ts_to_sql(window.starts_at),
                    ts_to_sql(window.ends_at),
                    window.sitter_id,
                    window.booking_ref,
                ],
            )?;
            tx.commit()?;
            Ok(window)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a window; returns false when it did not exist.
pub async fn delete_window(db: &Database, id: &str) -> Result<bool, PawlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.execute("DELETE FROM assignment_windows WHERE id = ?1", params![id])?;
            Ok(n > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::threads::create_thread;
    use crate::test_support::{open_test_db, sample_thread, sample_window};
    use chrono::{TimeZone, Utc};
    use pawline_core::types::ThreadScope;

    fn hour(h: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, h, 0, 0).unwrap()
    }

    async fn seed_thread(db: &Database) {
        create_thread(db, &sample_thread("t1", "org1", ThreadScope::ClientBooking))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn degenerate_bounds_are_rejected_by_schema() {
        let (db, _dir) = open_test_db().await;
        seed_thread(&db).await;

        let mut bad = sample_window("w1", "t1", "s1", hour(12), hour(12));
        bad.ends_at = hour(12);
        let result = create_window(&db, &bad).await;
        assert!(result.is_err(), "starts_at < ends_at is a schema invariant");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn status_filter_is_half_open() {
        let (db, _dir) = open_test_db().await;
        seed_thread(&db).await;

        create_window(&db, &sample_window("w1", "t1", "s1", hour(10), hour(12)))
            .await
            .unwrap();
        create_window(&db, &sample_window("w2", "t1", "s2", hour(14), hour(16)))
            .await
            .unwrap();

        let filter_at = |status, at| WindowFilter {
            status: Some(status),
            at: Some(at),
            ..Default::default()
        };

        let active = list_windows(&db, "org1", &filter_at(WindowStatus::Active, hour(11)))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "w1");

        // At the end bound the window is already past.
        let at_end = list_windows(&db, "org1", &filter_at(WindowStatus::Active, hour(12)))
            .await
            .unwrap();
        assert!(at_end.is_empty());

        let future = list_windows(&db, "org1", &filter_at(WindowStatus::Future, hour(12)))
            .await
            .unwrap();
        assert_eq!(future.len(), 1);
        assert_eq!(future[0].id, "w2");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_patches_only_supplied_fields() {
        let (db, _dir) = open_test_db().await;
        seed_thread(&db).await;

        create_window(&db, &sample_window("w1", "t1", "s1", hour(10), hour(12)))
            .await
            .unwrap();

        let updated = update_window(
            &db,
            "w1",
            &WindowPatch {
                ends_at: Some(hour(13)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.starts_at, hour(10));
        assert_eq!(updated.ends_at, hour(13));
        assert_eq!(updated.sitter_id, "s1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let (db, _dir) = open_test_db().await;
        seed_thread(&db).await;

        create_window(&db, &sample_window("w1", "t1", "s1", hour(10), hour(12)))
            .await
            .unwrap();

        assert!(delete_window(&db, "w1").await.unwrap());
        assert!(!delete_window(&db, "w1").await.unwrap());

        db.close().await.unwrap();
    }
}
