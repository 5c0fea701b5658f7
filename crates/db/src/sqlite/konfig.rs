//! SQLite-Implementierung des RaumKonfigRepository

use chrono::Utc;
use raumwart_core::types::{ChannelId, ServerId};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::{NeuerRaumKonfig, RaumKonfigRecord};
use crate::repository::{DbResult, RaumKonfigRepository};
use crate::sqlite::pool::SqliteDb;

impl RaumKonfigRepository for SqliteDb {
    async fn laden(&self, server_id: ServerId) -> DbResult<Option<RaumKonfigRecord>> {
        let row = sqlx::query(
            "SELECT server_id, erstellerkanal_id, kategorie_id, created_at
             FROM raum_konfig WHERE server_id = ?",
        )
        .bind(server_id.inner().to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_konfig(&r)).transpose()
    }

    async fn anlegen(&self, data: NeuerRaumKonfig) -> DbResult<RaumKonfigRecord> {
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO raum_konfig (server_id, erstellerkanal_id, kategorie_id, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(server_id) DO UPDATE SET
                 erstellerkanal_id = excluded.erstellerkanal_id,
                 kategorie_id = excluded.kategorie_id",
        )
        .bind(data.server_id.inner().to_string())
        .bind(data.erstellerkanal_id.inner().to_string())
        .bind(data.kategorie_id.inner().to_string())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(RaumKonfigRecord {
            server_id: data.server_id,
            erstellerkanal_id: data.erstellerkanal_id,
            kategorie_id: data.kategorie_id,
            created_at: now,
        })
    }

    async fn loeschen(&self, server_id: ServerId) -> DbResult<bool> {
        let affected = sqlx::query("DELETE FROM raum_konfig WHERE server_id = ?")
            .bind(server_id.inner().to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }
}

fn row_to_konfig(row: &sqlx::sqlite::SqliteRow) -> DbResult<RaumKonfigRecord> {
    Ok(RaumKonfigRecord {
        server_id: ServerId(uuid_spalte(row, "server_id")?),
        erstellerkanal_id: ChannelId(uuid_spalte(row, "erstellerkanal_id")?),
        kategorie_id: ChannelId(uuid_spalte(row, "kategorie_id")?),
        created_at: zeit_spalte(row, "created_at")?,
    })
}

/// Liest eine TEXT-Spalte als UUID
pub(crate) fn uuid_spalte(row: &sqlx::sqlite::SqliteRow, spalte: &str) -> DbResult<Uuid> {
    use sqlx::Row as _;

    let wert: String = row.try_get(spalte)?;
    Uuid::parse_str(&wert)
        .map_err(|e| DbError::intern(format!("Ungueltige UUID in '{spalte}' ('{wert}'): {e}")))
}

/// Liest eine TEXT-Spalte als RFC3339-Zeitstempel
pub(crate) fn zeit_spalte(
    row: &sqlx::sqlite::SqliteRow,
    spalte: &str,
) -> DbResult<chrono::DateTime<Utc>> {
    use sqlx::Row as _;

    let wert: String = row.try_get(spalte)?;
    chrono::DateTime::parse_from_rfc3339(&wert)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::intern(format!("Ungueltiger Zeitstempel in '{spalte}' ('{wert}'): {e}")))
}
