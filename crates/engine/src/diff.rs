//! Berechnung der Differenz zwischen Live-Overrides und persistierten
//! Freigaben
//!
//! Die Diff-Funktion ist rein: sie vergleicht zwei Zuordnungen und
//! liefert die minimale Menge an Aenderungen, die die Persistenz auf
//! den Stand des lebenden Kanals bringt. Der Kanal ist die Quelle der
//! Wahrheit; externe Overrides gewinnen. Ein Override mit
//! `connect = None` traegt keine Entscheidung und zaehlt als abwesend.

use std::collections::HashMap;

use raumwart_core::types::UserId;
use raumwart_db::models::FreigabeStufe;

/// Ergebnis eines Freigaben-Abgleichs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreigabenDiff {
    /// Live vorhanden, aber nicht persistiert: Freigabe anlegen
    pub hinzugefuegt: Vec<(UserId, FreigabeStufe)>,
    /// Persistiert, aber live ohne Entscheidung: Freigabe loeschen
    pub entfernt: Vec<UserId>,
    /// Beide vorhanden, aber mit anderem Vorzeichen: Freigabe auf den
    /// Live-Wert setzen
    pub geaendert: Vec<(UserId, FreigabeStufe)>,
}

impl FreigabenDiff {
    pub fn ist_leer(&self) -> bool {
        self.hinzugefuegt.is_empty() && self.entfernt.is_empty() && self.geaendert.is_empty()
    }

    /// Gesamtzahl der noetigen Freigabe-Aenderungen
    pub fn anzahl(&self) -> usize {
        self.hinzugefuegt.len() + self.entfernt.len() + self.geaendert.len()
    }
}

/// Uebersetzt eine persistierte Stufe in den Connect-Wert des Overrides
pub(crate) fn stufe_zu_connect(stufe: FreigabeStufe) -> Option<bool> {
    match stufe {
        FreigabeStufe::Erlaubt => Some(true),
        FreigabeStufe::Gebannt => Some(false),
        FreigabeStufe::Standard => None,
    }
}

/// Uebersetzt den Connect-Wert eines Live-Overrides in die Stufe
pub(crate) fn connect_zu_stufe(connect: bool) -> FreigabeStufe {
    if connect {
        FreigabeStufe::Erlaubt
    } else {
        FreigabeStufe::Gebannt
    }
}

/// Vergleicht die Live-Overrides eines Kanals mit den persistierten
/// Freigaben. Der lebende Kanal ist die Quelle der Wahrheit; das
/// Ergebnis beschreibt, wie die Persistenz nachzuziehen ist.
///
/// Die Ausgabelisten sind nach Benutzer-ID sortiert, damit der Abgleich
/// deterministisch ablaeuft.
pub fn freigaben_diff(
    live: &HashMap<UserId, Option<bool>>,
    persistiert: &HashMap<UserId, FreigabeStufe>,
) -> FreigabenDiff {
    let mut diff = FreigabenDiff::default();

    for (&user_id, &connect) in live {
        let Some(ist) = connect else {
            // Neutraler Override zaehlt als abwesend
            continue;
        };
        let stufe = connect_zu_stufe(ist);
        match persistiert.get(&user_id).copied() {
            None => diff.hinzugefuegt.push((user_id, stufe)),
            Some(alt) if stufe_zu_connect(alt) != Some(ist) => {
                diff.geaendert.push((user_id, stufe))
            }
            Some(_) => {}
        }
    }

    for &user_id in persistiert.keys() {
        if live.get(&user_id).copied().flatten().is_none() {
            diff.entfernt.push(user_id);
        }
    }

    diff.hinzugefuegt.sort_by_key(|(u, _)| u.inner());
    diff.geaendert.sort_by_key(|(u, _)| u.inner());
    diff.entfernt.sort_by_key(|u| u.inner());
    diff
}
