//! Zweistufige Bestaetigung fuer destruktive Befehle
//!
//! Das Deaktivieren der Raumfunktion loescht die Server-Konfiguration
//! und alle lebenden Raeume. Der Befehl verlangt deshalb eine explizite
//! Bestaetigung innerhalb eines Zeitfensters.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use raumwart_core::types::RaumSchluessel;

/// Standard-Zeitfenster fuer eine ausstehende Bestaetigung
pub const BESTAETIGUNGS_FENSTER_SEKUNDEN: i64 = 30;

/// Eine angeforderte, noch nicht bestaetigte destruktive Aktion
#[derive(Debug, Clone, Copy)]
pub struct AusstehendeBestaetigung {
    pub angefordert_am: DateTime<Utc>,
    pub laeuft_ab: DateTime<Utc>,
}

/// Ausgang eines Bestaetigungsversuchs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BestaetigungsErgebnis {
    /// Innerhalb des Fensters bestaetigt; Aktion darf ausgefuehrt werden
    Bestaetigt,
    /// Das Fenster war bereits abgelaufen
    Abgelaufen,
    /// Es war keine Bestaetigung angefordert
    KeineAusstehend,
}

/// Register ausstehender Bestaetigungen, eine pro Raum-Schluessel.
/// Eine neue Anforderung ersetzt eine bestehende und startet das
/// Fenster neu.
pub struct BestaetigungsRegister {
    ausstehend: DashMap<RaumSchluessel, AusstehendeBestaetigung>,
    fenster: Duration,
}

impl BestaetigungsRegister {
    pub fn neu() -> Self {
        Self::mit_fenster(Duration::seconds(BESTAETIGUNGS_FENSTER_SEKUNDEN))
    }

    pub fn mit_fenster(fenster: Duration) -> Self {
        Self {
            ausstehend: DashMap::new(),
            fenster,
        }
    }

    /// Fordert eine Bestaetigung an und liefert den Ablaufzeitpunkt
    pub fn anfordern(&self, schluessel: RaumSchluessel) -> AusstehendeBestaetigung {
        self.anfordern_um(schluessel, Utc::now())
    }

    pub fn anfordern_um(
        &self,
        schluessel: RaumSchluessel,
        jetzt: DateTime<Utc>,
    ) -> AusstehendeBestaetigung {
        let eintrag = AusstehendeBestaetigung {
            angefordert_am: jetzt,
            laeuft_ab: jetzt + self.fenster,
        };
        self.ausstehend.insert(schluessel, eintrag);
        eintrag
    }

    /// Loest eine ausstehende Bestaetigung ein. Der Eintrag wird in
    /// jedem Fall entfernt; ein abgelaufenes Fenster wird gemeldet.
    pub fn bestaetigen(&self, schluessel: RaumSchluessel) -> BestaetigungsErgebnis {
        self.bestaetigen_um(schluessel, Utc::now())
    }

    pub fn bestaetigen_um(
        &self,
        schluessel: RaumSchluessel,
        jetzt: DateTime<Utc>,
    ) -> BestaetigungsErgebnis {
        match self.ausstehend.remove(&schluessel) {
            None => BestaetigungsErgebnis::KeineAusstehend,
            Some((_, eintrag)) if jetzt > eintrag.laeuft_ab => BestaetigungsErgebnis::Abgelaufen,
            Some(_) => BestaetigungsErgebnis::Bestaetigt,
        }
    }

    /// Bricht eine ausstehende Bestaetigung ab. Gibt false zurueck wenn
    /// keine ausstehend war.
    pub fn abbrechen(&self, schluessel: RaumSchluessel) -> bool {
        self.ausstehend.remove(&schluessel).is_some()
    }
}
