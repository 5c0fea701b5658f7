//! Fehlertypen der Raum-Engine
//!
//! Die vier Fehlerklassen entsprechen der Behandlungsstrategie:
//! Voraussetzungs- und Validierungsfehler gehen als Nachricht an den
//! aufrufenden Benutzer zurueck, Remote-Fehler brechen die laufende
//! Transition ab, Integritaetsfehler fuehren zu Aufraeumarbeiten statt
//! zu einem Absturz.

use raumwart_db::DbError;
use thiserror::Error;

use crate::provider::ProviderFehler;

/// Result-Alias fuer alle Engine-Operationen
pub type RaumResult<T> = Result<T, RaumFehler>;

/// Alle Fehlerzustaende der Raum-Engine
#[derive(Debug, Error)]
pub enum RaumFehler {
    /// Der Befehl ist in diesem Zustand nicht ausfuehrbar
    /// (Funktion deaktiviert, kein Raum vorhanden, Ziel fehlt)
    #[error("{0}")]
    Voraussetzung(String),

    /// Ungueltige oder wirkungslose Eingabe; es wurde nichts veraendert
    #[error("{0}")]
    Validierung(String),

    /// Eine Plattform-Operation ist fehlgeschlagen
    #[error("Remote-Operation fehlgeschlagen: {0}")]
    Remote(String),

    /// Eine referenzierte Ressource ist nicht mehr aufloesbar
    #[error("Referenz nicht mehr aufloesbar: {0}")]
    Integritaet(String),

    /// Fehler aus der Persistenzschicht
    #[error("Datenbankfehler: {0}")]
    Datenbank(#[from] DbError),
}

impl RaumFehler {
    pub fn voraussetzung(msg: impl Into<String>) -> Self {
        Self::Voraussetzung(msg.into())
    }

    pub fn validierung(msg: impl Into<String>) -> Self {
        Self::Validierung(msg.into())
    }

    /// Gibt true zurueck wenn der Fehler dem Benutzer als normale
    /// Antwort angezeigt werden soll (kein Systemfehler)
    pub fn ist_benutzerfehler(&self) -> bool {
        matches!(self, Self::Voraussetzung(_) | Self::Validierung(_))
    }
}

impl From<ProviderFehler> for RaumFehler {
    fn from(fehler: ProviderFehler) -> Self {
        match fehler {
            ProviderFehler::NichtGefunden(msg) => Self::Integritaet(msg),
            ProviderFehler::Verweigert(msg) | ProviderFehler::Io(msg) => Self::Remote(msg),
        }
    }
}
