//! SQLite-Implementierungen aller Repository-Traits

mod einstellungen;
mod freigaben;
mod konfig;
mod pool;

pub use pool::SqliteDb;
