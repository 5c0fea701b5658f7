//! Befehlstypen
//!
//! `RaumBefehl` ist das serialisierte Drahtformat, ueber das der
//! Plattform-Adapter Befehle einliefert. Die Engine kennt weder Prefixe
//! noch Slash-Commands; das Parsen ist Sache des Adapters.

use raumwart_core::types::{ChannelId, ServerId, UserId};
use serde::{Deserialize, Serialize};

/// Alle Befehle der Raumverwaltung
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "befehl", rename_all = "snake_case")]
pub enum RaumBefehl {
    /// Aktuelle Einstellungen und Freigaben anzeigen (einziger Befehl
    /// ohne Raum-Voraussetzung)
    Status,
    /// Raum fuer die Everyone-Rolle schliessen
    Sperren,
    /// Raum wieder oeffnen
    Entsperren,
    /// Benutzerlimit setzen (0 = unbegrenzt)
    Limit { limit: u32 },
    /// Raum umbenennen; `None` setzt auf den Anzeigenamen zurueck
    Name { name: Option<String> },
    /// Bitrate in kbit/s setzen
    Bitrate { kbps: u32 },
    /// Benutzer aus dem lebenden Raum werfen (keine Persistenz)
    Kick { user_id: UserId },
    /// Benutzer dauerhaft erlauben
    Erlauben { user_id: UserId },
    /// Benutzer dauerhaft bannen
    Bannen { user_id: UserId },
    /// Persistierte Freigabe eines Benutzers entfernen
    FreigabeEntfernen { user_id: UserId },
    /// Alle Einstellungen und Freigaben auf den Standard zuruecksetzen
    Zuruecksetzen,
    /// Raumfunktion aktivieren: Kanal als Erstellerkanal markieren
    Aktivieren { kanal_id: ChannelId },
    /// Deaktivierung anfordern (erster Schritt)
    Deaktivieren,
    /// Angeforderte Deaktivierung ausfuehren (zweiter Schritt)
    DeaktivierenBestaetigen,
    /// Angeforderte Deaktivierung verwerfen
    DeaktivierenAbbrechen,
}

/// Kontext eines Befehlsaufrufs
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BefehlsKontext {
    pub server_id: ServerId,
    pub aufrufer: UserId,
}
