//! SQLite-Implementierung des FreigabeRepository

use chrono::Utc;
use raumwart_core::types::{ServerId, UserId};

use crate::error::DbError;
use crate::models::{FreigabeRecord, FreigabeStufe};
use crate::repository::{DbResult, FreigabeRepository};
use crate::sqlite::konfig::{uuid_spalte, zeit_spalte};
use crate::sqlite::pool::SqliteDb;

impl FreigabeRepository for SqliteDb {
    async fn alle(&self, server_id: ServerId, owner_id: UserId) -> DbResult<Vec<FreigabeRecord>> {
        let rows = sqlx::query(
            "SELECT server_id, owner_id, user_id, stufe, created_at
             FROM freigaben WHERE server_id = ? AND owner_id = ?
             ORDER BY created_at",
        )
        .bind(server_id.inner().to_string())
        .bind(owner_id.inner().to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_freigabe).collect()
    }

    async fn laden(
        &self,
        server_id: ServerId,
        owner_id: UserId,
        user_id: UserId,
    ) -> DbResult<Option<FreigabeRecord>> {
        let row = sqlx::query(
            "SELECT server_id, owner_id, user_id, stufe, created_at
             FROM freigaben WHERE server_id = ? AND owner_id = ? AND user_id = ?",
        )
        .bind(server_id.inner().to_string())
        .bind(owner_id.inner().to_string())
        .bind(user_id.inner().to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| row_to_freigabe(&r)).transpose()
    }

    async fn setzen(
        &self,
        server_id: ServerId,
        owner_id: UserId,
        user_id: UserId,
        stufe: FreigabeStufe,
    ) -> DbResult<FreigabeRecord> {
        if stufe == FreigabeStufe::Standard {
            return Err(DbError::UngueltigeDaten(
                "Stufe 'standard' wird nicht gespeichert, Freigabe stattdessen entfernen".into(),
            ));
        }

        let now = Utc::now();
        sqlx::query(
            "INSERT INTO freigaben (server_id, owner_id, user_id, stufe, created_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(server_id, owner_id, user_id) DO UPDATE SET stufe = excluded.stufe",
        )
        .bind(server_id.inner().to_string())
        .bind(owner_id.inner().to_string())
        .bind(user_id.inner().to_string())
        .bind(stufe.als_str())
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(FreigabeRecord {
            server_id,
            owner_id,
            user_id,
            stufe,
            created_at: now,
        })
    }

    async fn entfernen(
        &self,
        server_id: ServerId,
        owner_id: UserId,
        user_id: UserId,
    ) -> DbResult<bool> {
        let affected = sqlx::query(
            "DELETE FROM freigaben WHERE server_id = ? AND owner_id = ? AND user_id = ?",
        )
        .bind(server_id.inner().to_string())
        .bind(owner_id.inner().to_string())
        .bind(user_id.inner().to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(affected > 0)
    }

    async fn alle_entfernen(&self, server_id: ServerId, owner_id: UserId) -> DbResult<u64> {
        let affected = sqlx::query("DELETE FROM freigaben WHERE server_id = ? AND owner_id = ?")
            .bind(server_id.inner().to_string())
            .bind(owner_id.inner().to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected)
    }
}

fn row_to_freigabe(row: &sqlx::sqlite::SqliteRow) -> DbResult<FreigabeRecord> {
    use sqlx::Row as _;

    let stufe_str: String = row.try_get("stufe")?;
    let stufe = stufe_str.parse::<FreigabeStufe>().map_err(DbError::intern)?;

    Ok(FreigabeRecord {
        server_id: ServerId(uuid_spalte(row, "server_id")?),
        owner_id: UserId(uuid_spalte(row, "owner_id")?),
        user_id: UserId(uuid_spalte(row, "user_id")?),
        stufe,
        created_at: zeit_spalte(row, "created_at")?,
    })
}
