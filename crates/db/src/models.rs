//! Datensatz- und Update-Typen fuer die drei Raumwart-Entitaeten
//!
//! `RaumKonfig` (pro Server), `RaumEinstellungen` (pro Server+Besitzer)
//! und `Freigabe` (pro Server+Besitzer+Benutzer). Ein fehlender
//! Freigabe-Datensatz entspricht der Stufe `Standard` und wird nie
//! als Zeile gespeichert.

use chrono::{DateTime, Utc};
use raumwart_core::types::{ChannelId, ServerId, UserId};
use serde::{Deserialize, Serialize};

/// Standard-Benutzerlimit eines Privatraums (0 = unbegrenzt)
pub const STANDARD_LIMIT: i64 = 0;

/// Standard-Bitrate eines Privatraums in kbit/s
pub const STANDARD_BITRATE: i64 = 64;

/// Persistierte Freigabestufe eines Benutzers fuer einen fremden Raum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreigabeStufe {
    /// Zutritt verweigert
    Gebannt,
    /// Keine explizite Entscheidung (entspricht: keine Zeile)
    Standard,
    /// Zutritt auch bei gesperrtem Raum erlaubt
    Erlaubt,
}

impl FreigabeStufe {
    pub fn als_str(&self) -> &'static str {
        match self {
            Self::Gebannt => "gebannt",
            Self::Standard => "standard",
            Self::Erlaubt => "erlaubt",
        }
    }
}

impl std::str::FromStr for FreigabeStufe {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gebannt" => Ok(Self::Gebannt),
            "standard" => Ok(Self::Standard),
            "erlaubt" => Ok(Self::Erlaubt),
            other => Err(format!("Unbekannte Freigabestufe: {other}")),
        }
    }
}

/// Konfigurations-Datensatz: markiert den Erstellerkanal eines Servers.
/// Die Kategorie wird beim Aktivieren festgehalten, damit ein spaeteres
/// Verschieben des Erstellerkanals erkennbar ist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaumKonfigRecord {
    pub server_id: ServerId,
    pub erstellerkanal_id: ChannelId,
    pub kategorie_id: ChannelId,
    pub created_at: DateTime<Utc>,
}

/// Eingabedaten fuer einen neuen Konfigurations-Datensatz
#[derive(Debug, Clone, Copy)]
pub struct NeuerRaumKonfig {
    pub server_id: ServerId,
    pub erstellerkanal_id: ChannelId,
    pub kategorie_id: ChannelId,
}

/// Persistierte Raumeinstellungen eines Besitzers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaumEinstellungenRecord {
    pub server_id: ServerId,
    pub owner_id: UserId,
    /// `None` = Anzeigename des Besitzers wird beim Erstellen verwendet
    pub name: Option<String>,
    pub user_limit: i64,
    pub bitrate: i64,
    pub gesperrt: bool,
    pub updated_at: DateTime<Utc>,
}

impl RaumEinstellungenRecord {
    /// Gibt true zurueck wenn alle vier Einstellungsfelder auf den
    /// Standardwerten stehen
    pub fn ist_standard(&self) -> bool {
        self.name.is_none()
            && self.user_limit == STANDARD_LIMIT
            && self.bitrate == STANDARD_BITRATE
            && !self.gesperrt
    }
}

/// Partielles Update der Raumeinstellungen.
/// `name` ist doppelt optional: `Some(None)` setzt den Namen explizit
/// auf den Standardwert zurueck.
#[derive(Debug, Clone, Default)]
pub struct EinstellungenUpdate {
    pub name: Option<Option<String>>,
    pub user_limit: Option<i64>,
    pub bitrate: Option<i64>,
    pub gesperrt: Option<bool>,
}

impl EinstellungenUpdate {
    /// Gibt true zurueck wenn das Update kein Feld anfasst
    pub fn ist_leer(&self) -> bool {
        self.name.is_none()
            && self.user_limit.is_none()
            && self.bitrate.is_none()
            && self.gesperrt.is_none()
    }
}

/// Persistierte Freigabe-Entscheidung eines Besitzers fuer einen Benutzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreigabeRecord {
    pub server_id: ServerId,
    pub owner_id: UserId,
    pub user_id: UserId,
    pub stufe: FreigabeStufe,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freigabestufe_roundtrip() {
        for stufe in [
            FreigabeStufe::Gebannt,
            FreigabeStufe::Standard,
            FreigabeStufe::Erlaubt,
        ] {
            let geparst: FreigabeStufe = stufe.als_str().parse().unwrap();
            assert_eq!(geparst, stufe);
        }
    }

    #[test]
    fn freigabestufe_unbekannt() {
        assert!("verboten".parse::<FreigabeStufe>().is_err());
    }

    #[test]
    fn einstellungen_ist_standard() {
        let record = RaumEinstellungenRecord {
            server_id: ServerId::new(),
            owner_id: UserId::new(),
            name: None,
            user_limit: STANDARD_LIMIT,
            bitrate: STANDARD_BITRATE,
            gesperrt: false,
            updated_at: Utc::now(),
        };
        assert!(record.ist_standard());

        let mut gesperrt = record.clone();
        gesperrt.gesperrt = true;
        assert!(!gesperrt.ist_standard());

        let mut benannt = record;
        benannt.name = Some("Mein Raum".into());
        assert!(!benannt.ist_standard());
    }

    #[test]
    fn update_ist_leer() {
        assert!(EinstellungenUpdate::default().ist_leer());
        let update = EinstellungenUpdate {
            name: Some(None),
            ..Default::default()
        };
        assert!(!update.ist_leer());
    }
}
