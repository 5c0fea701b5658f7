//! Pro-Raum-Serialisierung aller Zustandsuebergaenge
//!
//! Jede Transition (Betreten, Verlassen, Befehl, Abgleich) haelt
//! waehrend ihrer gesamten Laufzeit die Sperre des betroffenen
//! `RaumSchluessel`. Transitionen verschiedener Raeume laufen parallel.

use std::sync::Arc;

use dashmap::DashMap;
use raumwart_core::types::RaumSchluessel;
use tokio::sync::Mutex;

/// Register der Raum-Sperren. Sperren werden bei der ersten Verwendung
/// angelegt und nie wieder entfernt; die Anzahl ist durch die Zahl der
/// jemals aktiven (Server, Besitzer)-Paare begrenzt.
#[derive(Default)]
pub struct SperrRegister {
    sperren: DashMap<RaumSchluessel, Arc<Mutex<()>>>,
}

impl SperrRegister {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Liefert die Sperre fuer einen Raum-Schluessel
    pub fn sperre(&self, schluessel: RaumSchluessel) -> Arc<Mutex<()>> {
        self.sperren
            .entry(schluessel)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
