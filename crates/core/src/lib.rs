//! raumwart-core – Gemeinsame Typen fuer alle Raumwart-Crates
//!
//! Enthaelt die Newtype-IDs der Plattform sowie das eingehende
//! Ereignismodell. Keine Geschaeftslogik, keine I/O-Abhaengigkeiten.

pub mod event;
pub mod types;

pub use event::PlattformEvent;
pub use types::{ChannelId, RaumSchluessel, ServerId, UserId};
