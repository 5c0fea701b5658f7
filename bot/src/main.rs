//! Raumwart Bot – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging, oeffnet die
//! Datenbank und startet das Gateway fuer den Plattform-Adapter.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use raumwart_db::{DatabaseConfig, SqliteDb};
use raumwart_engine::RaumEngine;

use crate::config::BotConfig;
use crate::gateway::{GatewayProvider, GatewayServer};

mod config;
mod gateway;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("RAUMWART_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = BotConfig::laden(&config_pfad)?;

    // Logging initialisieren
    logging_initialisieren(&config.logging.level, &config.logging.format);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Raumwart wird initialisiert"
    );

    // Datenbank oeffnen (fuehrt Migrationen aus)
    let db = Arc::new(
        SqliteDb::oeffnen(&DatabaseConfig {
            url: config.datenbank.url.clone(),
            max_verbindungen: config.datenbank.max_verbindungen,
            sqlite_wal: config.datenbank.sqlite_wal,
        })
        .await?,
    );

    // Provider und Engine verdrahten
    let provider = Arc::new(GatewayProvider::neu(Duration::from_millis(
        config.gateway.anfrage_timeout_ms,
    )));
    let engine = RaumEngine::mit_bestaetigungs_fenster(
        db.clone(),
        db.clone(),
        db,
        provider.clone(),
        chrono::Duration::seconds(config.raeume.bestaetigung_ttl_secs),
    );

    // Gateway starten (laeuft bis zum Abbruch)
    let server = GatewayServer::neu(config.gateway.clone());
    server.starten(engine, provider).await?;

    Ok(())
}

/// Initialisiert tracing-subscriber mit dem konfigurierten Level und Format
fn logging_initialisieren(level: &str, format: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}
