//! Einstellungs-Aufloeser: ermittelt die massgeblichen Raumeinstellungen
//!
//! Prioritaet: lebender Raum vor persistierter Zeile vor Standardwerten.
//! Liest der Aufloeser aus dem lebenden Raum, schreibt er Abweichungen
//! in die Persistenz zurueck, damit externe Aenderungen einen Neustart
//! des Raums ueberleben.

use std::collections::HashMap;

use chrono::Utc;
use raumwart_core::types::{ChannelId, ServerId, UserId};
use raumwart_db::models::{
    EinstellungenUpdate, FreigabeStufe, RaumEinstellungenRecord, STANDARD_BITRATE, STANDARD_LIMIT,
};
use raumwart_db::{FreigabeRepository, RaumEinstellungenRepository, RaumKonfigRepository};

use crate::diff::FreigabenDiff;
use crate::engine::RaumEngine;
use crate::error::RaumResult;
use crate::provider::{KanalDaten, VoiceProvider};

/// Woher die aufgeloesten Einstellungen stammen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quelle {
    /// Aus dem lebenden Raum gelesen (und zurueckgeschrieben)
    Live,
    /// Aus der Datenbank, kein lebender Raum vorhanden
    Persistiert,
    /// Weder Raum noch Zeile; reine Standardwerte
    Standard,
}

/// Momentaufnahme des lebenden Raums eines Besitzers
#[derive(Debug, Clone)]
pub struct LiveRaum {
    pub kanal_id: ChannelId,
    pub daten: KanalDaten,
}

/// Ergebnis der Aufloesung
#[derive(Debug, Clone)]
pub struct AufgeloesteEinstellungen {
    pub quelle: Quelle,
    pub einstellungen: RaumEinstellungenRecord,
    pub live: Option<LiveRaum>,
}

impl<K, E, F, P> RaumEngine<K, E, F, P>
where
    K: RaumKonfigRepository,
    E: RaumEinstellungenRepository,
    F: FreigabeRepository,
    P: VoiceProvider,
{
    /// Loest die Einstellungen eines Besitzers auf.
    ///
    /// Der Standard-Zweig legt nie eine Zeile an; der Live-Zweig
    /// schreibt abweichende Live-Werte in die Persistenz zurueck.
    pub async fn aufloesen(
        &self,
        server_id: ServerId,
        besitzer_id: UserId,
    ) -> RaumResult<AufgeloesteEinstellungen> {
        if let Some(live) = self.live_raum(server_id, besitzer_id).await? {
            let einstellungen = self
                .einstellungen_angleichen(server_id, besitzer_id, &live.daten)
                .await?;
            return Ok(AufgeloesteEinstellungen {
                quelle: Quelle::Live,
                einstellungen,
                live: Some(live),
            });
        }

        match self.einstellungen.laden(server_id, besitzer_id).await? {
            Some(record) => Ok(AufgeloesteEinstellungen {
                quelle: Quelle::Persistiert,
                einstellungen: record,
                live: None,
            }),
            None => Ok(AufgeloesteEinstellungen {
                quelle: Quelle::Standard,
                einstellungen: RaumEinstellungenRecord {
                    server_id,
                    owner_id: besitzer_id,
                    name: None,
                    user_limit: STANDARD_LIMIT,
                    bitrate: STANDARD_BITRATE,
                    gesperrt: false,
                    updated_at: Utc::now(),
                },
                live: None,
            }),
        }
    }

    /// Findet den lebenden Raum, in dem der Besitzer gerade sitzt
    pub(crate) async fn live_raum(
        &self,
        server_id: ServerId,
        besitzer_id: UserId,
    ) -> RaumResult<Option<LiveRaum>> {
        let Some(kanal_id) = self.provider.aufenthalt(server_id, besitzer_id).await? else {
            return Ok(None);
        };
        if self.provider.besitzer_von(server_id, kanal_id).await? != Some(besitzer_id) {
            return Ok(None);
        }
        let Some(daten) = self.provider.kanal_laden(server_id, kanal_id).await? else {
            return Ok(None);
        };
        Ok(Some(LiveRaum { kanal_id, daten }))
    }

    /// Schreibt die Live-Attribute eines Raums in die Persistenz zurueck
    /// und liefert den aktuellen Datensatz.
    ///
    /// Traegt der Raum den Anzeigenamen des Besitzers, wird der Name als
    /// Standardwert (NULL) gespeichert, damit `zuruecksetzen` und die
    /// Standard-Erkennung nach einem Live-Roundtrip stimmen.
    pub(crate) async fn einstellungen_angleichen(
        &self,
        server_id: ServerId,
        besitzer_id: UserId,
        daten: &KanalDaten,
    ) -> RaumResult<RaumEinstellungenRecord> {
        let anzeigename = self.provider.anzeigename(server_id, besitzer_id).await?;
        let name = if daten.name == anzeigename {
            None
        } else {
            Some(daten.name.clone())
        };
        let user_limit = i64::from(daten.user_limit);
        let bitrate = i64::from(daten.bitrate);
        let gesperrt = daten.ist_gesperrt();

        let record = self
            .einstellungen
            .laden_oder_anlegen(server_id, besitzer_id)
            .await?;

        let update = EinstellungenUpdate {
            name: (record.name != name).then(|| name.clone()),
            user_limit: (record.user_limit != user_limit).then_some(user_limit),
            bitrate: (record.bitrate != bitrate).then_some(bitrate),
            gesperrt: (record.gesperrt != gesperrt).then_some(gesperrt),
        };
        if update.ist_leer() {
            return Ok(record);
        }

        tracing::debug!(
            server = %server_id,
            besitzer = %besitzer_id,
            "Live-Einstellungen in Persistenz zurueckgeschrieben"
        );
        Ok(self
            .einstellungen
            .aktualisieren(server_id, besitzer_id, update)
            .await?)
    }

    /// Laedt die persistierten Freigaben eines Besitzers und entfernt
    /// dabei Eintraege, deren Benutzer auf der Plattform nicht mehr
    /// aufloesbar ist. Die Bereinigung ist ein Nebeneffekt des Ladens
    /// und taucht in keinem Diff auf.
    pub(crate) async fn freigaben_bereinigt(
        &self,
        server_id: ServerId,
        besitzer_id: UserId,
    ) -> RaumResult<HashMap<UserId, FreigabeStufe>> {
        let mut stufen = HashMap::new();
        for freigabe in self.freigaben.alle(server_id, besitzer_id).await? {
            if self
                .provider
                .mitglied_aufloesbar(server_id, freigabe.user_id)
                .await?
            {
                stufen.insert(freigabe.user_id, freigabe.stufe);
            } else {
                tracing::debug!(
                    server = %server_id,
                    besitzer = %besitzer_id,
                    benutzer = %freigabe.user_id,
                    "Verwaiste Freigabe entfernt"
                );
                self.freigaben
                    .entfernen(server_id, besitzer_id, freigabe.user_id)
                    .await?;
            }
        }
        Ok(stufen)
    }

    /// Uebernimmt einen berechneten Freigaben-Diff in die Persistenz.
    /// Der lebende Kanal hat den Zielzustand bereits; nachgezogen wird
    /// nur der Datenbestand.
    pub(crate) async fn diff_persistieren(
        &self,
        server_id: ServerId,
        besitzer_id: UserId,
        diff: &FreigabenDiff,
    ) -> RaumResult<()> {
        for (user_id, stufe) in diff.hinzugefuegt.iter().chain(diff.geaendert.iter()) {
            self.freigaben
                .setzen(server_id, besitzer_id, *user_id, *stufe)
                .await?;
        }
        for user_id in &diff.entfernt {
            self.freigaben
                .entfernen(server_id, besitzer_id, *user_id)
                .await?;
        }
        Ok(())
    }
}
