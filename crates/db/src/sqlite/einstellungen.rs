//! SQLite-Implementierung des RaumEinstellungenRepository

use chrono::Utc;
use raumwart_core::types::{ServerId, UserId};

use crate::error::DbError;
use crate::models::{EinstellungenUpdate, RaumEinstellungenRecord, STANDARD_BITRATE, STANDARD_LIMIT};
use crate::repository::{DbResult, RaumEinstellungenRepository};
use crate::sqlite::konfig::{uuid_spalte, zeit_spalte};
use crate::sqlite::pool::SqliteDb;

impl RaumEinstellungenRepository for SqliteDb {
    async fn laden(
        &self,
        server_id: ServerId,
        owner_id: UserId,
    ) -> DbResult<Option<RaumEinstellungenRecord>> {
        let row = sqlx::query(
            "SELECT server_id, owner_id, name, user_limit, bitrate, gesperrt, updated_at
             FROM raum_einstellungen WHERE server_id = ? AND owner_id = ?",
        )
        .bind(server_id.inner().to_string())
        .bind(owner_id.inner().to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_einstellungen(&r)).transpose()
    }

    async fn laden_oder_anlegen(
        &self,
        server_id: ServerId,
        owner_id: UserId,
    ) -> DbResult<RaumEinstellungenRecord> {
        sqlx::query(
            "INSERT INTO raum_einstellungen
                 (server_id, owner_id, name, user_limit, bitrate, gesperrt, updated_at)
             VALUES (?, ?, NULL, ?, ?, 0, ?)
             ON CONFLICT(server_id, owner_id) DO NOTHING",
        )
        .bind(server_id.inner().to_string())
        .bind(owner_id.inner().to_string())
        .bind(STANDARD_LIMIT)
        .bind(STANDARD_BITRATE)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.laden(server_id, owner_id).await?.ok_or_else(|| {
            DbError::intern(format!(
                "Einstellungen nach Anlegen nicht gefunden: {server_id}/{owner_id}"
            ))
        })
    }

    async fn aktualisieren(
        &self,
        server_id: ServerId,
        owner_id: UserId,
        update: EinstellungenUpdate,
    ) -> DbResult<RaumEinstellungenRecord> {
        if update.ist_leer() {
            return self.laden(server_id, owner_id).await?.ok_or_else(|| {
                DbError::nicht_gefunden(format!("Einstellungen {server_id}/{owner_id}"))
            });
        }

        let mut sets: Vec<String> = Vec::new();
        if update.name.is_some() {
            sets.push("name = ?".into());
        }
        if update.user_limit.is_some() {
            sets.push("user_limit = ?".into());
        }
        if update.bitrate.is_some() {
            sets.push("bitrate = ?".into());
        }
        if update.gesperrt.is_some() {
            sets.push("gesperrt = ?".into());
        }
        sets.push("updated_at = ?".into());

        let sql = format!(
            "UPDATE raum_einstellungen SET {} WHERE server_id = ? AND owner_id = ?",
            sets.join(", ")
        );
        let mut q = sqlx::query(&sql);

        if let Some(ref v) = update.name {
            q = q.bind(v.as_deref());
        }
        if let Some(v) = update.user_limit {
            q = q.bind(v);
        }
        if let Some(v) = update.bitrate {
            q = q.bind(v);
        }
        if let Some(v) = update.gesperrt {
            q = q.bind(v as i64);
        }
        q = q.bind(Utc::now().to_rfc3339());
        q = q.bind(server_id.inner().to_string());
        q = q.bind(owner_id.inner().to_string());

        let affected = q.execute(&self.pool).await?.rows_affected();
        if affected == 0 {
            return Err(DbError::nicht_gefunden(format!(
                "Einstellungen {server_id}/{owner_id}"
            )));
        }

        self.laden(server_id, owner_id).await?.ok_or_else(|| {
            DbError::intern("Einstellungen nach Update nicht gefunden".to_string())
        })
    }

    async fn zuruecksetzen(
        &self,
        server_id: ServerId,
        owner_id: UserId,
    ) -> DbResult<RaumEinstellungenRecord> {
        self.aktualisieren(
            server_id,
            owner_id,
            EinstellungenUpdate {
                name: Some(None),
                user_limit: Some(STANDARD_LIMIT),
                bitrate: Some(STANDARD_BITRATE),
                gesperrt: Some(false),
            },
        )
        .await
    }
}

fn row_to_einstellungen(row: &sqlx::sqlite::SqliteRow) -> DbResult<RaumEinstellungenRecord> {
    use sqlx::Row as _;

    let gesperrt: i64 = row.try_get("gesperrt")?;

    Ok(RaumEinstellungenRecord {
        server_id: ServerId(uuid_spalte(row, "server_id")?),
        owner_id: UserId(uuid_spalte(row, "owner_id")?),
        name: row.try_get("name")?,
        user_limit: row.try_get("user_limit")?,
        bitrate: row.try_get("bitrate")?,
        gesperrt: gesperrt != 0,
        updated_at: zeit_spalte(row, "updated_at")?,
    })
}
