//! Abstraktion der Echtzeit-Plattform (Voice Session Provider)
//!
//! Die Engine nimmt keinerlei Annahmen ueber das Drahtprotokoll der
//! Plattform. Alle Operationen sind fehlbar; die Engine behandelt
//! Provider-Fehler als nicht-fatal und bricht die laufende Transition ab.
//!
//! Die Besitzer-Zuordnung ist eine explizite Faehigkeit des Providers
//! (`besitzer_von` / `raum_von_besitzer`): der Provider merkt sich beim
//! Erstellen, fuer welchen Besitzer ein Raum angelegt wurde, statt dass
//! die Engine die Override-Liste nach dem Vollzugriff-Eintrag absucht.

use raumwart_core::types::{ChannelId, ServerId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Fehler einer Plattform-Operation
#[derive(Debug, Clone, Error)]
pub enum ProviderFehler {
    #[error("Nicht gefunden: {0}")]
    NichtGefunden(String),

    #[error("Zugriff verweigert: {0}")]
    Verweigert(String),

    #[error("E/A-Fehler: {0}")]
    Io(String),
}

/// Result-Alias fuer Provider-Operationen
pub type ProviderResult<T> = Result<T, ProviderFehler>;

/// Ziel eines Berechtigungs-Overrides auf einem Kanal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideZiel {
    /// Ein einzelnes Mitglied
    Mitglied(UserId),
    /// Die Everyone-Rolle des Servers
    Alle,
}

/// Ein Connect-Override auf einem Kanal.
/// `connect = None` bedeutet: kein expliziter Eintrag (neutral).
/// `vollzugriff` markiert den Eintrag des Raum-Besitzers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEintrag {
    pub ziel: OverrideZiel,
    pub connect: Option<bool>,
    pub vollzugriff: bool,
}

/// Momentaufnahme eines Kanals auf der Plattform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanalDaten {
    pub id: ChannelId,
    pub name: String,
    pub user_limit: u32,
    pub bitrate: u32,
    /// Kategorie, unter der der Kanal haengt (None = Wurzelebene)
    pub kategorie: Option<ChannelId>,
    pub overrides: Vec<OverrideEintrag>,
}

impl KanalDaten {
    /// Gibt true zurueck wenn die Everyone-Rolle explizit ausgesperrt ist
    pub fn ist_gesperrt(&self) -> bool {
        self.overrides
            .iter()
            .find(|o| o.ziel == OverrideZiel::Alle)
            .map(|o| o.connect == Some(false))
            .unwrap_or(false)
    }

    /// Liefert die Mitglieds-Overrides ohne den Vollzugriff-Eintrag des
    /// Besitzers und ohne den Everyone-Eintrag. Eintraege mit
    /// `connect = None` bleiben enthalten; die Diff-Logik behandelt sie
    /// als abwesend.
    pub fn freigabe_overrides(&self) -> HashMap<UserId, Option<bool>> {
        self.overrides
            .iter()
            .filter(|o| !o.vollzugriff)
            .filter_map(|o| match o.ziel {
                OverrideZiel::Mitglied(user_id) => Some((user_id, o.connect)),
                OverrideZiel::Alle => None,
            })
            .collect()
    }
}

/// Bauplan fuer einen neuen Kanal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanalEntwurf {
    pub name: String,
    pub user_limit: u32,
    pub bitrate: u32,
    pub overrides: Vec<OverrideEintrag>,
}

/// Partielle Attributaenderung eines Kanals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KanalAenderung {
    pub name: Option<String>,
    pub user_limit: Option<u32>,
    pub bitrate: Option<u32>,
}

impl KanalAenderung {
    pub fn ist_leer(&self) -> bool {
        self.name.is_none() && self.user_limit.is_none() && self.bitrate.is_none()
    }
}

/// Schnittstelle zur Echtzeit-Plattform
#[allow(async_fn_in_trait)]
pub trait VoiceProvider: Send + Sync {
    /// Laedt die Momentaufnahme eines Kanals
    async fn kanal_laden(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
    ) -> ProviderResult<Option<KanalDaten>>;

    /// Aktuelle Mitglieder eines Voice-Kanals
    async fn mitglieder(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
    ) -> ProviderResult<Vec<UserId>>;

    /// Alle Kanaele unterhalb einer Kategorie
    async fn kanaele_in_kategorie(
        &self,
        server_id: ServerId,
        kategorie_id: ChannelId,
    ) -> ProviderResult<Vec<ChannelId>>;

    /// Erstellt einen Kanal unter der Kategorie. Der Provider merkt sich
    /// die Zuordnung `(server, besitzer) -> kanal`.
    async fn kanal_erstellen(
        &self,
        server_id: ServerId,
        kategorie_id: ChannelId,
        besitzer_id: UserId,
        entwurf: KanalEntwurf,
    ) -> ProviderResult<ChannelId>;

    /// Loescht einen Kanal
    async fn kanal_loeschen(&self, server_id: ServerId, kanal_id: ChannelId)
        -> ProviderResult<()>;

    /// Aendert Attribute eines Kanals
    async fn kanal_bearbeiten(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
        aenderung: KanalAenderung,
    ) -> ProviderResult<()>;

    /// Setzt oder entfernt einen Connect-Override (`connect = None`
    /// entfernt den Eintrag)
    async fn override_setzen(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
        ziel: OverrideZiel,
        connect: Option<bool>,
    ) -> ProviderResult<()>;

    /// Verschiebt ein Mitglied in einen Kanal (`None` = aus Voice trennen)
    async fn verschieben(
        &self,
        server_id: ServerId,
        user_id: UserId,
        kanal_id: Option<ChannelId>,
    ) -> ProviderResult<()>;

    /// Besitzer eines verwalteten Raums, None fuer fremde Kanaele
    async fn besitzer_von(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
    ) -> ProviderResult<Option<UserId>>;

    /// Der lebende Raum eines Besitzers, falls vorhanden
    async fn raum_von_besitzer(
        &self,
        server_id: ServerId,
        besitzer_id: UserId,
    ) -> ProviderResult<Option<ChannelId>>;

    /// Der Voice-Kanal, in dem sich ein Benutzer gerade befindet
    async fn aufenthalt(
        &self,
        server_id: ServerId,
        user_id: UserId,
    ) -> ProviderResult<Option<ChannelId>>;

    /// Ob ein Benutzer auf der Plattform noch aufloesbar ist
    async fn mitglied_aufloesbar(
        &self,
        server_id: ServerId,
        user_id: UserId,
    ) -> ProviderResult<bool>;

    /// Anzeigename eines Benutzers (Standard-Raumname)
    async fn anzeigename(&self, server_id: ServerId, user_id: UserId) -> ProviderResult<String>;

    /// Maximale Bitrate des Servers in kbit/s
    async fn max_bitrate(&self, server_id: ServerId) -> ProviderResult<u32>;
}
