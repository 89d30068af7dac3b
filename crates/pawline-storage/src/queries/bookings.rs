// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Booking lookups. Assignment happens inside the offer resolution
//! transaction in `queries::offers`, never here.

use rusqlite::{OptionalExtension, params};

use pawline_core::types::Booking;
use pawline_core::PawlineError;

use crate::database::{Database, enum_from_sql, map_tr_err, ts_from_sql, ts_to_sql};

const BOOKING_COLS: &str =
    "id, org_id, client_name, service, sitter_id, status, starts_at, ends_at";

pub(crate) fn row_to_booking(row: &rusqlite::Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        org_id: row.get(1)?,
        client_name: row.get(2)?,
        service: row.get(3)?,
        sitter_id: row.get(4)?,
        status: enum_from_sql(row.get::<_, String>(5)?)?,
        starts_at: ts_from_sql(row.get::<_, String>(6)?)?,
        ends_at: ts_from_sql(row.get::<_, String>(7)?)?,
    })
}

/// Fetch a booking by id.
pub async fn get_booking(db: &Database, id: &str) -> Result<Option<Booking>, PawlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let booking = conn
                .query_row(
                    &format!("SELECT {BOOKING_COLS} FROM bookings WHERE id = ?1"),
                    params![id],
                    row_to_booking,
                )
                .optional()?;
            Ok(booking)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a booking (provisioning/ops path).
pub async fn create_booking(db: &Database, booking: &Booking) -> Result<(), PawlineError> {
    let b = booking.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO bookings
                   (id, org_id, client_name, service, sitter_id, status, starts_at, ends_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    b.id,
                    b.org_id,
                    b.client_name,
                    b.service,
                    b.sitter_id,
                    b.status.to_string(),
                    ts_to_sql(b.starts_at),
                    ts_to_sql(b.ends_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
