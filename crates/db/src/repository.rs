//! Repository-Trait-Definitionen
//!
//! Das Repository-Pattern entkoppelt die Engine von der konkreten
//! Datenbank-Implementierung. Die Engine erhaelt die Repositories
//! explizit injiziert; es gibt keinen globalen Verbindungs-Handle.

use raumwart_core::types::{ServerId, UserId};

use crate::error::DbError;
use crate::models::{
    EinstellungenUpdate, FreigabeRecord, FreigabeStufe, NeuerRaumKonfig, RaumEinstellungenRecord,
    RaumKonfigRecord,
};

/// Result-Alias fuer alle Repository-Operationen
pub type DbResult<T> = Result<T, DbError>;

/// Konfiguration fuer die Datenbankverbindung
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Verbindungs-URL (z.B. "sqlite://raumwart.db")
    pub url: String,
    /// Maximale Anzahl gleichzeitiger Verbindungen im Pool
    pub max_verbindungen: u32,
    /// Ob WAL-Modus bei SQLite aktiviert werden soll
    pub sqlite_wal: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://raumwart.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Repository fuer die Server-Konfiguration (Erstellerkanal pro Server)
#[allow(async_fn_in_trait)]
pub trait RaumKonfigRepository: Send + Sync {
    /// Laedt die Konfiguration eines Servers
    async fn laden(&self, server_id: ServerId) -> DbResult<Option<RaumKonfigRecord>>;

    /// Legt die Konfiguration an oder ersetzt eine bestehende
    async fn anlegen(&self, data: NeuerRaumKonfig) -> DbResult<RaumKonfigRecord>;

    /// Loescht die Konfiguration. Gibt false zurueck wenn keine existierte.
    async fn loeschen(&self, server_id: ServerId) -> DbResult<bool>;
}

/// Repository fuer die persistierten Raumeinstellungen eines Besitzers
#[allow(async_fn_in_trait)]
pub trait RaumEinstellungenRepository: Send + Sync {
    /// Laedt die Einstellungen eines Besitzers
    async fn laden(
        &self,
        server_id: ServerId,
        owner_id: UserId,
    ) -> DbResult<Option<RaumEinstellungenRecord>>;

    /// Laedt die Einstellungen oder legt sie mit Standardwerten an
    async fn laden_oder_anlegen(
        &self,
        server_id: ServerId,
        owner_id: UserId,
    ) -> DbResult<RaumEinstellungenRecord>;

    /// Aktualisiert einzelne Felder. Fehler wenn kein Datensatz existiert.
    async fn aktualisieren(
        &self,
        server_id: ServerId,
        owner_id: UserId,
        update: EinstellungenUpdate,
    ) -> DbResult<RaumEinstellungenRecord>;

    /// Setzt alle vier Einstellungsfelder auf die Standardwerte zurueck
    async fn zuruecksetzen(
        &self,
        server_id: ServerId,
        owner_id: UserId,
    ) -> DbResult<RaumEinstellungenRecord>;
}

/// Repository fuer persistierte Freigabe-Entscheidungen
#[allow(async_fn_in_trait)]
pub trait FreigabeRepository: Send + Sync {
    /// Alle Freigaben eines Besitzers
    async fn alle(&self, server_id: ServerId, owner_id: UserId) -> DbResult<Vec<FreigabeRecord>>;

    /// Eine einzelne Freigabe laden
    async fn laden(
        &self,
        server_id: ServerId,
        owner_id: UserId,
        user_id: UserId,
    ) -> DbResult<Option<FreigabeRecord>>;

    /// Setzt eine Freigabe (Upsert). `Standard` ist keine speicherbare
    /// Stufe; dafuer ist `entfernen` zustaendig.
    async fn setzen(
        &self,
        server_id: ServerId,
        owner_id: UserId,
        user_id: UserId,
        stufe: FreigabeStufe,
    ) -> DbResult<FreigabeRecord>;

    /// Entfernt eine Freigabe. Gibt false zurueck wenn keine existierte.
    async fn entfernen(
        &self,
        server_id: ServerId,
        owner_id: UserId,
        user_id: UserId,
    ) -> DbResult<bool>;

    /// Entfernt alle Freigaben eines Besitzers, gibt die Anzahl zurueck
    async fn alle_entfernen(&self, server_id: ServerId, owner_id: UserId) -> DbResult<u64>;
}
