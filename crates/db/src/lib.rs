//! raumwart-db – Datenbank-Abstraktion
//!
//! Dieses Crate stellt das Repository-Pattern fuer die drei persistierten
//! Raumwart-Entitaeten bereit: Server-Konfiguration, Raumeinstellungen und
//! Freigaben. Die SQLite-Implementierung (WAL-Modus, sqlx-Migrationen) ist
//! die Standard-Implementierung; fuer Tests existiert eine
//! In-Memory-Variante.

pub mod error;
pub mod models;
pub mod repository;
pub mod sqlite;

pub use error::DbError;
pub use repository::{
    DatabaseConfig, DbResult, FreigabeRepository, RaumEinstellungenRepository,
    RaumKonfigRepository,
};
pub use sqlite::SqliteDb;
