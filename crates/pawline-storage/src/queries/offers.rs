// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offer event operations, including the guarded terminal transition.
//!
//! An offer leaves `sent` exactly once. The transition, the booking
//! assignment, the metrics recompute, and the audit row all commit in one
//! transaction; a concurrent duplicate command loses the `WHERE
//! status='sent'` guard and is reported as already resolved.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};

use pawline_core::traits::{OfferResolution, ResolutionApplied};
use pawline_core::types::{OfferEvent, OfferStatus};
use pawline_core::PawlineError;

use crate::database::{
    Database, enum_from_sql, map_tr_box_err, map_tr_err, opt_ts_from_sql, ts_from_sql, ts_to_sql,
};
use crate::queries::{audit, metrics};

pub(crate) const OFFER_COLS: &str = "id, org_id, sitter_id, booking_id, status, offered_at, \
     expires_at, accepted_at, declined_at, decline_reason, excluded";

pub(crate) fn row_to_offer(row: &rusqlite::Row<'_>) -> rusqlite::Result<OfferEvent> {
    Ok(OfferEvent {
        id: row.get(0)?,
        org_id: row.get(1)?,
        sitter_id: row.get(2)?,
        booking_id: row.get(3)?,
        status: enum_from_sql(row.get::<_, String>(4)?)?,
        offered_at: ts_from_sql(row.get::<_, String>(5)?)?,
        expires_at: ts_from_sql(row.get::<_, String>(6)?)?,
        accepted_at: opt_ts_from_sql(row.get(7)?)?,
        declined_at: opt_ts_from_sql(row.get(8)?)?,
        decline_reason: row.get(9)?,
        excluded: row.get(10)?,
    })
}

/// Most recent non-excluded offer for the `(org, sitter)` pair, regardless
/// of status. Callers inspect the status to produce "already resolved"
/// replies instead of errors.
pub async fn latest_offer_for_sitter(
    db: &Database,
    org_id: &str,
    sitter_id: &str,
) -> Result<Option<OfferEvent>, PawlineError> {
    let org_id = org_id.to_string();
    let sitter_id = sitter_id.to_string();
    db.connection()
        .call(move |conn| {
            let offer = conn
                .query_row(
                    &format!(
                        "SELECT {OFFER_COLS} FROM offer_events
                         WHERE org_id = ?1 AND sitter_id = ?2 AND excluded = 0
                         ORDER BY offered_at DESC, id DESC LIMIT 1"
                    ),
                    params![org_id, sitter_id],
                    row_to_offer,
                )
                .optional()?;
            Ok(offer)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch an offer by id.
pub async fn get_offer(db: &Database, id: &str) -> Result<Option<OfferEvent>, PawlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let offer = conn
                .query_row(
                    &format!("SELECT {OFFER_COLS} FROM offer_events WHERE id = ?1"),
                    params![id],
                    row_to_offer,
                )
                .optional()?;
            Ok(offer)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new offer (dispatch/ops path).
pub async fn create_offer(db: &Database, offer: &OfferEvent) -> Result<(), PawlineError> {
    let o = offer.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO offer_events
                   (id, org_id, sitter_id, booking_id, status, offered_at, expires_at,
                    accepted_at, declined_at, decline_reason, excluded)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    o.id,
                    o.org_id,
                    o.sitter_id,
                    o.booking_id,
                    o.status.to_string(),
                    ts_to_sql(o.offered_at),
                    ts_to_sql(o.expires_at),
                    o.accepted_at.map(ts_to_sql),
                    o.declined_at.map(ts_to_sql),
                    o.decline_reason,
                    o.excluded,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Apply one offer resolution atomically.
///
/// The status flip is the single write that takes the offer out of `sent`;
/// everything else in the transaction hangs off its success.
pub async fn apply_offer_resolution(
    db: &Database,
    resolution: &OfferResolution,
) -> Result<ResolutionApplied, PawlineError> {
    let res = resolution.clone();
    db.connection()
        .call(move |conn| -> Result<ResolutionApplied, Box<dyn std::error::Error + Send + Sync>> {
            let tx = conn.transaction()?;

            let (accepted_at, declined_at) = match res.new_status {
                OfferStatus::Accepted => (Some(ts_to_sql(res.resolved_at)), None),
                OfferStatus::Declined | OfferStatus::Expired => {
                    (None, Some(ts_to_sql(res.resolved_at)))
                }
                OfferStatus::Sent => {
                    return Err("sent is not a terminal offer status".into());
                }
            };

            let flipped = tx.execute(
                "UPDATE offer_events
                 SET status = ?2,
                     accepted_at = COALESCE(?3, accepted_at),
                     declined_at = COALESCE(?4, declined_at),
                     decline_reason = COALESCE(?5, decline_reason)
                 WHERE id = ?1 AND status = 'sent'",
                params![
                    res.offer_id,
                    res.new_status.to_string(),
                    accepted_at,
                    declined_at,
                    res.decline_reason,
                ],
            )?;

            if flipped == 0 {
                // A concurrent command won the race; nothing was written.
                tx.commit()?;
                return Ok(ResolutionApplied::AlreadyResolved);
            }

            if res.assign_booking {
                tx.execute(
                    "UPDATE bookings SET sitter_id = ?2, status = 'confirmed' WHERE id = ?1",
                    params![res.booking_id, res.sitter_id],
                )?;
            }

            metrics::recompute_conn(
                &tx,
                &res.org_id,
                &res.sitter_id,
                res.resolved_at,
                Some(res.resolved_at),
            )?;

            audit::insert_conn(&tx, &res.audit)?;

            tx.commit()?;
            Ok(ResolutionApplied::Applied)
        })
        .await
        .map_err(map_tr_box_err)
}

/// Non-excluded offers with `offered_at` in `[from, to]`.
pub async fn list_offers_in_window(
    db: &Database,
    org_id: &str,
    sitter_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<OfferEvent>, PawlineError> {
    let org_id = org_id.to_string();
    let sitter_id = sitter_id.to_string();
    db.connection()
        .call(move |conn| {
            let offers = metrics::offers_in_window_conn(conn, &org_id, &sitter_id, from, to)?;
            Ok(offers)
        })
        .await
        .map_err(map_tr_err)
}

/// Flip every still-`sent`, non-excluded offer past its expiry to `expired`,
/// recompute each affected sitter's metrics window, and return the offers.
pub async fn expire_overdue_offers(
    db: &Database,
    now: DateTime<Utc>,
) -> Result<Vec<OfferEvent>, PawlineError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let mut overdue = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {OFFER_COLS} FROM offer_events
                     WHERE status = 'sent' AND excluded = 0 AND expires_at <= ?1
                     ORDER BY offered_at ASC, id ASC"
                ))?;
                let rows = stmt.query_map(params![ts_to_sql(now)], row_to_offer)?;
                let mut offers = Vec::new();
                for row in rows {
                    offers.push(row?);
                }
                offers
            };

            for offer in &mut overdue {
                tx.execute(
                    "UPDATE offer_events
                     SET status = 'expired', decline_reason = 'expired'
                     WHERE id = ?1 AND status = 'sent'",
                    params![offer.id],
                )?;
                offer.status = OfferStatus::Expired;
                offer.decline_reason = Some("expired".to_string());
            }

            let mut pairs: Vec<(String, String)> = overdue
                .iter()
                .map(|o| (o.org_id.clone(), o.sitter_id.clone()))
                .collect();
            pairs.sort();
            pairs.dedup();
            for (org_id, sitter_id) in &pairs {
                metrics::recompute_conn(&tx, org_id, sitter_id, now, None)?;
            }

            tx.commit()?;
            Ok(overdue)
        })
        .await
        .map_err(map_tr_err)
}
