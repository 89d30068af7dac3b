// SPDX-FileCopyrightText: 2026 Pawline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client and sitter lookups for sender resolution.

use rusqlite::{OptionalExtension, params};

use pawline_core::types::{Client, Sitter};
use pawline_core::PawlineError;

use crate::database::{Database, map_tr_err};

/// Find a client by phone number within an org.
pub async fn find_client_by_phone(
    db: &Database,
    org_id: &str,
    e164: &str,
) -> Result<Option<Client>, PawlineError> {
    let org_id = org_id.to_string();
    let e164 = e164.to_string();
    db.connection()
        .call(move |conn| {
            let client = conn
                .query_row(
                    "SELECT id, org_id, name, phone_e164 FROM clients
                     WHERE org_id = ?1 AND phone_e164 = ?2",
                    params![org_id, e164],
                    |row| {
                        Ok(Client {
                            id: row.get(0)?,
                            org_id: row.get(1)?,
                            name: row.get(2)?,
                            phone_e164: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(client)
        })
        .await
        .map_err(map_tr_err)
}

/// Find a sitter by phone number within an org.
pub async fn find_sitter_by_phone(
    db: &Database,
    org_id: &str,
    e164: &str,
) -> Result<Option<Sitter>, PawlineError> {
    let org_id = org_id.to_string();
    let e164 = e164.to_string();
    db.connection()
        .call(move |conn| {
            let sitter = conn
                .query_row(
                    "SELECT id, org_id, name, phone_e164 FROM sitters
                     WHERE org_id = ?1 AND phone_e164 = ?2",
                    params![org_id, e164],
                    |row| {
                        Ok(Sitter {
                            id: row.get(0)?,
                            org_id: row.get(1)?,
                            name: row.get(2)?,
                            phone_e164: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok(sitter)
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a client (provisioning/ops path).
pub async fn create_client(db: &Database, client: &Client) -> Result<(), PawlineError> {
    let c = client.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO clients (id, org_id, name, phone_e164) VALUES (?1, ?2, ?3, ?4)",
                params![c.id, c.org_id, c.name, c.phone_e164],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a sitter (provisioning/ops path).
pub async fn create_sitter(db: &Database, sitter: &Sitter) -> Result<(), PawlineError> {
    let s = sitter.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sitters (id, org_id, name, phone_e164) VALUES (?1, ?2, ?3, ?4)",
                params![s.id, s.org_id, s.name, s.phone_e164],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::open_test_db;

    #[tokio::test]
    async fn lookups_are_scoped_to_org() {
        let (db, _dir) = open_test_db().await;

        create_sitter(
            &db,
            &Sitter {
                id: "s1".into(),
                org_id: "org1".into(),
                name: "Avery".into(),
                phone_e164: "+15550003333".into(),
            },
        )
        .await
        .unwrap();

        let hit = find_sitter_by_phone(&db, "org1", "+15550003333").await.unwrap();
        assert_eq!(hit.unwrap().name, "Avery");

        let cross_org = find_sitter_by_phone(&db, "org2", "+15550003333").await.unwrap();
        assert!(cross_org.is_none());

        let no_client = find_client_by_phone(&db, "org1", "+15550003333").await.unwrap();
        assert!(no_client.is_none());

        db.close().await.unwrap();
    }
}
