// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provisioned phone number lookups.

use rusqlite::{OptionalExtension, params};

use pawline_core::types::MessageNumber;
use pawline_core::PawlineError;

use crate::database::{Database, enum_from_sql, map_tr_err, ts_from_sql, ts_to_sql};

fn row_to_number(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageNumber> {
    Ok(MessageNumber {
        id: row.get(0)?,
        org_id: row.get(1)?,
        e164: row.get(2)?,
        class: enum_from_sql(row.get::<_, String>(3)?)?,
        assigned_sitter_id: row.get(4)?,
        status: enum_from_sql(row.get::<_, String>(5)?)?,
        created_at: ts_from_sql(row.get::<_, String>(6)?)?,
    })
}

const NUMBER_COLS: &str = "id, org_id, e164, class, assigned_sitter_id, status, created_at";

/// Resolve the single active number row for an E.164 address.
pub async fn find_active_number(
    db: &Database,
    e164: &str,
) -> Result<Option<MessageNumber>, PawlineError> {
    let e164 = e164.to_string();
    db.connection()
        .call(move |conn| {
            let number = conn
                .query_row(
                    &format!(
                        "SELECT {NUMBER_COLS} FROM message_numbers
                         WHERE e164 = ?1 AND status = 'active'"
                    ),
                    params![e164],
                    row_to_number,
                )
                .optional()?;
            Ok(number)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a provisioned number (provisioning/ops path).
pub async fn create_number(db: &Database, number: &MessageNumber) -> Result<(), PawlineError> {
    let n = number.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO message_numbers
                   (id, org_id, e164, class, assigned_sitter_id, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    n.id,
                    n.org_id,
                    n.e164,
                    n.class.to_string(),
                    n.assigned_sitter_id,
                    n.status.to_string(),
                    ts_to_sql(n.created_at),
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
    use crate::test_support::{open_test_db, sample_number};
    use pawline_core::types::{NumberClass, NumberStatus};

    #[tokio::test]
    async fn active_number_resolves_and_inactive_does_not() {
        let (db, _dir) = open_test_db().await;

        let mut active = sample_number("n1", "org1", "+15550001111", NumberClass::FrontDesk);
        active.status = NumberStatus::Active;
        create_number(&db, &active).await.unwrap();

        let mut retired = sample_number("n2", "org1", "+15550002222", NumberClass::Sitter);
        retired.status = NumberStatus::Inactive;
        create_number(&db, &retired).await.unwrap();

        let found = find_active_number(&db, "+15550001111").await.unwrap();
        assert_eq!(found.unwrap().org_id, "org1");

        let missing = find_active_number(&db, "+15550002222").await.unwrap();
        assert!(missing.is_none(), "inactive numbers must not resolve");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_active_e164_is_rejected() {
        let (db, _dir) = open_test_db().await;

        let first = sample_number("n1", "org1", "+15550001111", NumberClass::Pool);
        create_number(&db, &first).await.unwrap();

        let second = sample_number("n2", "org2", "+15550001111", NumberClass::Pool);
        let result = create_number(&db, &second).await;
        assert!(result.is_err(), "one active owning org per number");

        db.close().await.unwrap();
    }
}
