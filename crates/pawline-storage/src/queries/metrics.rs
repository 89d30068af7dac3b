// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sitter metrics window persistence.
//!
//! The window is always recomputed from scratch over the trailing seven
//! days and upserted by `(org_id, sitter_id, window_type)`. The sync
//! helpers run equally on a plain connection or inside an open transaction.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{OptionalExtension, params};

use pawline_core::metrics::compute_metrics;
use pawline_core::types::{OfferEvent, SitterMetricsWindow, WINDOW_TYPE_WEEKLY_7D};
use pawline_core::PawlineError;

use crate::database::{
    Database, map_tr_err, opt_ts_from_sql, ts_from_sql, ts_to_sql,
};
use crate::queries::offers::{OFFER_COLS, row_to_offer};

/// Non-excluded offers with `offered_at` in `[from, to]`, oldest first.
pub(crate) fn offers_in_window_conn(
    conn: &rusqlite::Connection,
    org_id: &str,
    sitter_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> rusqlite::Result<Vec<OfferEvent>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {OFFER_COLS} FROM offer_events
         WHERE org_id = ?1 AND sitter_id = ?2 AND excluded = 0
           AND offered_at >= ?3 AND offered_at <= ?4
         ORDER BY offered_at ASC, id ASC"
    ))?;
    let rows = stmt.query_map(
        params![org_id, sitter_id, ts_to_sql(from), ts_to_sql(to)],
        row_to_offer,
    )?;
    let mut offers = Vec::new();
    for row in rows {
        offers.push(row?);
    }
    Ok(offers)
}

/// Upsert one metrics window row.
pub(crate) fn upsert_conn(
    conn: &rusqlite::Connection,
    window: &SitterMetricsWindow,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO sitter_metrics_windows
           (id, org_id, sitter_id, window_start, window_end, window_type,
            avg_response_seconds, median_response_seconds, offer_accept_rate,
            offer_decline_rate, offer_expire_rate, last_offer_responded_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
         ON CONFLICT(org_id, sitter_id, window_type) DO UPDATE SET
           window_start = excluded.window_start,
           window_end = excluded.window_end,
           avg_response_seconds = excluded.avg_response_seconds,
           median_response_seconds = excluded.median_response_seconds,
           offer_accept_rate = excluded.offer_accept_rate,
           offer_decline_rate = excluded.offer_decline_rate,
           offer_expire_rate = excluded.offer_expire_rate,
           last_offer_responded_at =
             COALESCE(excluded.last_offer_responded_at, last_offer_responded_at),
           updated_at = excluded.updated_at",
        params![
            window.id,
            window.org_id,
            window.sitter_id,
            ts_to_sql(window.window_start),
            ts_to_sql(window.window_end),
            window.window_type,
            window.avg_response_seconds,
            window.median_response_seconds,
            window.offer_accept_rate,
            window.offer_decline_rate,
            window.offer_expire_rate,
            window.last_offer_responded_at.map(ts_to_sql),
            ts_to_sql(window.updated_at),
        ],
    )?;
    Ok(())
}

/// Recompute the trailing 7-day window for a sitter and upsert it.
///
/// `responded_at` is recorded when the recompute was triggered by an offer
/// response; the expiry sweep passes `None`.
pub(crate) fn recompute_conn(
    conn: &rusqlite::Connection,
    org_id: &str,
    sitter_id: &str,
    now: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
) -> rusqlite::Result<SitterMetricsWindow> {
    let window_start = now - Duration::days(7);
    let offers = offers_in_window_conn(conn, org_id, sitter_id, window_start, now)?;
    let m = compute_metrics(&offers, now);

    let window = SitterMetricsWindow {
        id: uuid::Uuid::new_v4().to_string(),
        org_id: org_id.to_string(),
        sitter_id: sitter_id.to_string(),
        window_start,
        window_end: now,
        window_type: WINDOW_TYPE_WEEKLY_7D.to_string(),
        avg_response_seconds: m.avg_response_seconds,
        median_response_seconds: m.median_response_seconds,
        offer_accept_rate: m.offer_accept_rate,
        offer_decline_rate: m.offer_decline_rate,
        offer_expire_rate: m.offer_expire_rate,
        last_offer_responded_at: responded_at,
        updated_at: now,
    };
    upsert_conn(conn, &window)?;
    Ok(window)
}

/// Upsert one metrics window row.
pub async fn upsert_metrics_window(
    db: &Database,
    window: &SitterMetricsWindow,
) -> Result<(), PawlineError> {
    let window = window.clone();
    db.connection()
        .call(move |conn| {
            upsert_conn(conn, &window)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch the current metrics window for a sitter, if one was ever computed.
pub async fn get_metrics_window(
    db: &Database,
    org_id: &str,
    sitter_id: &str,
    window_type: &str,
) -> Result<Option<SitterMetricsWindow>, PawlineError> {
    let org_id = org_id.to_string();
    let sitter_id = sitter_id.to_string();
    let window_type = window_type.to_string();
    db.connection()
        .call(move |conn| {
            let window = conn
                .query_row(
                    "SELECT id, org_id, sitter_id, window_start, window_end, window_type,
                            avg_response_seconds, median_response_seconds, offer_accept_rate,
                            offer_decline_rate, offer_expire_rate, last_offer_responded_at,
                            updated_at
                     FROM sitter_metrics_windows
                     WHERE org_id = ?1 AND sitter_id = ?2 AND window_type = ?3",
                    params![org_id, sitter_id, window_type],
                    |row| {
                        Ok(SitterMetricsWindow {
                            id: row.get(0)?,
                            org_id: row.get(1)?,
                            sitter_id: row.get(2)?,
                            window_start: ts_from_sql(row.get::<_, String>(3)?)?,
                            window_end: ts_from_sql(row.get::<_, String>(4)?)?,
                            window_type: row.get(5)?,
                            avg_response_seconds: row.get(6)?,
                            median_response_seconds: row.get(7)?,
                            offer_accept_rate: row.get(8)?,
                            offer_decline_rate: row.get(9)?,
                            offer_expire_rate: row.get(10)?,
                            last_offer_responded_at: opt_ts_from_sql(row.get(11)?)?,
                            updated_at: ts_from_sql(row.get::<_, String>(12)?)?,
                        })
                    },
                )
                .optional()?;
            Ok(window)
        })
        .await
        .map_err(map_tr_err)
}
