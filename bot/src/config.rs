//! Bot-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Bot ohne Konfigurationsdatei
//! lauffaehig ist.

use serde::{Deserialize, Serialize};

/// Vollstaendige Bot-Konfiguration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct BotConfig {
    /// Datenbank-Einstellungen
    pub datenbank: DatenbankEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Gateway-Einstellungen (Adapter-Verbindung)
    pub gateway: GatewayEinstellungen,
    /// Einstellungen der Raumverwaltung
    pub raeume: RaeumeEinstellungen,
}

/// Datenbank-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatenbankEinstellungen {
    /// Verbindungs-URL
    pub url: String,
    /// Maximale Verbindungspool-Groesse
    pub max_verbindungen: u32,
    /// WAL-Modus fuer SQLite
    pub sqlite_wal: bool,
}

impl Default for DatenbankEinstellungen {
    fn default() -> Self {
        Self {
            url: "sqlite://raumwart.db".into(),
            max_verbindungen: 5,
            sqlite_wal: true,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Gateway-Einstellungen fuer die Adapter-Verbindung
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayEinstellungen {
    /// Bind-Adresse des Gateways
    pub bind_adresse: String,
    /// Port des Gateways
    pub port: u16,
    /// Maximale Zeilenlaenge einer Adapter-Nachricht in Bytes
    pub zeilenlimit_bytes: usize,
    /// Zeitueberschreitung fuer Provider-Anfragen in Millisekunden
    pub anfrage_timeout_ms: u64,
}

impl Default for GatewayEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "127.0.0.1".into(),
            port: 9400,
            zeilenlimit_bytes: 65536,
            anfrage_timeout_ms: 5000,
        }
    }
}

/// Einstellungen der Raumverwaltung
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaeumeEinstellungen {
    /// Zeitfenster fuer die Deaktivierungs-Bestaetigung in Sekunden
    pub bestaetigung_ttl_secs: i64,
}

impl Default for RaeumeEinstellungen {
    fn default() -> Self {
        Self {
            bestaetigung_ttl_secs: 30,
        }
    }
}

impl BotConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Gibt die vollstaendige Bind-Adresse des Gateways zurueck
    pub fn gateway_bind_adresse(&self) -> String {
        format!("{}:{}", self.gateway.bind_adresse, self.gateway.port)
    }
}
