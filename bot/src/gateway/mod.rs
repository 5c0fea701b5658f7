//! JSON-Lines-Gateway zwischen Bot und Plattform-Adapter
//!
//! Der Adapter (die plattformspezifische Anbindung) verbindet sich per
//! TCP mit dem Bot. Ueber die eine Verbindung laufen drei Stroeme:
//! Ereignisse und Befehle vom Adapter zum Bot, Provider-Anfragen vom
//! Bot zum Adapter und die jeweiligen Antworten.

pub mod protokoll;
pub mod provider;
pub mod server;

use std::sync::Arc;

use raumwart_db::SqliteDb;
use raumwart_engine::RaumEngine;

pub use provider::GatewayProvider;
pub use server::GatewayServer;

/// Konkreter Engine-Typ des Bots
pub type BotEngine = Arc<RaumEngine<SqliteDb, SqliteDb, SqliteDb, GatewayProvider>>;
