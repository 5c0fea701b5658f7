//! Befehlsausfuehrung
//!
//! Pruefreihenfolge fuer Raumbefehle: Funktion aktiviert, Raum
//! vorhanden, Wertebereich, Wirkungslosigkeit. Erst danach wird
//! persistiert und anschliessend der lebende Raum nachgezogen.
//! Wirkungslose Befehle schlagen fehl, ohne etwas zu veraendern.

use raumwart_core::types::{ChannelId, RaumSchluessel, ServerId, UserId};
use raumwart_db::models::{
    EinstellungenUpdate, FreigabeStufe, NeuerRaumKonfig, STANDARD_BITRATE, STANDARD_LIMIT,
};
use raumwart_db::{FreigabeRepository, RaumEinstellungenRepository, RaumKonfigRepository};

use crate::aufloeser::{AufgeloesteEinstellungen, LiveRaum, Quelle};
use crate::befehle::{BefehlsKontext, RaumBefehl};
use crate::bestaetigung::BestaetigungsErgebnis;
use crate::engine::RaumEngine;
use crate::error::{RaumFehler, RaumResult};
use crate::provider::{KanalAenderung, OverrideZiel, VoiceProvider};

/// Hoechstes zulaessiges Benutzerlimit (0 = unbegrenzt)
const LIMIT_MAX: u32 = 99;

/// Maximale Laenge eines Raumnamens in Zeichen
const NAME_MAX_ZEICHEN: usize = 32;

/// Niedrigste zulaessige Bitrate in kbit/s
const BITRATE_MIN: u32 = 8;

impl<K, E, F, P> RaumEngine<K, E, F, P>
where
    K: RaumKonfigRepository,
    E: RaumEinstellungenRepository,
    F: FreigabeRepository,
    P: VoiceProvider,
{
    /// Fuehrt einen Befehl aus und liefert den Antworttext fuer den
    /// Aufrufer. Voraussetzungs- und Validierungsfehler sind ebenfalls
    /// fuer den Aufrufer bestimmt (`RaumFehler::ist_benutzerfehler`).
    pub async fn ausfuehren(
        &self,
        befehl: RaumBefehl,
        kontext: BefehlsKontext,
    ) -> RaumResult<String> {
        let server_id = kontext.server_id;

        // Verwaltungsbefehle arbeiten auf Server-Ebene und brauchen
        // keinen eigenen Raum.
        match befehl {
            RaumBefehl::Aktivieren { kanal_id } => {
                return self.aktivieren(server_id, kanal_id).await;
            }
            RaumBefehl::Deaktivieren => {
                return self.deaktivieren_anfordern(server_id, kontext.aufrufer).await;
            }
            RaumBefehl::DeaktivierenBestaetigen => {
                return self.deaktivieren_bestaetigen(server_id, kontext.aufrufer).await;
            }
            RaumBefehl::DeaktivierenAbbrechen => {
                return self.deaktivieren_abbrechen(server_id, kontext.aufrufer);
            }
            _ => {}
        }

        if self.konfig.laden(server_id).await?.is_none() {
            return Err(RaumFehler::voraussetzung(
                "Die Raumfunktion ist auf diesem Server nicht aktiviert.",
            ));
        }

        let aufrufer = kontext.aufrufer;
        let sperre = self
            .sperren
            .sperre(RaumSchluessel::neu(server_id, aufrufer));
        let _guard = sperre.lock().await;

        let aufgeloest = self.aufloesen(server_id, aufrufer).await?;

        if let RaumBefehl::Status = befehl {
            return self.status_text(server_id, aufrufer, &aufgeloest).await;
        }
        if aufgeloest.quelle == Quelle::Standard {
            return Err(RaumFehler::voraussetzung(
                "Du hast noch keinen Raum. Betritt den Erstellerkanal, um einen zu erhalten.",
            ));
        }

        match befehl {
            RaumBefehl::Sperren => self.sperren_setzen(server_id, aufrufer, &aufgeloest, true).await,
            RaumBefehl::Entsperren => {
                self.sperren_setzen(server_id, aufrufer, &aufgeloest, false).await
            }
            RaumBefehl::Limit { limit } => {
                self.limit_setzen(server_id, aufrufer, &aufgeloest, limit).await
            }
            RaumBefehl::Name { name } => {
                self.name_setzen(server_id, aufrufer, &aufgeloest, name).await
            }
            RaumBefehl::Bitrate { kbps } => {
                self.bitrate_setzen(server_id, aufrufer, &aufgeloest, kbps).await
            }
            RaumBefehl::Kick { user_id } => {
                self.kick(server_id, aufrufer, &aufgeloest, user_id).await
            }
            RaumBefehl::Erlauben { user_id } => {
                self.freigabe_setzen(server_id, aufrufer, &aufgeloest, user_id, FreigabeStufe::Erlaubt)
                    .await
            }
            RaumBefehl::Bannen { user_id } => {
                self.freigabe_setzen(server_id, aufrufer, &aufgeloest, user_id, FreigabeStufe::Gebannt)
                    .await
            }
            RaumBefehl::FreigabeEntfernen { user_id } => {
                self.freigabe_entfernen(server_id, aufrufer, &aufgeloest, user_id).await
            }
            RaumBefehl::Zuruecksetzen => {
                self.zuruecksetzen(server_id, aufrufer, &aufgeloest).await
            }
            // Oben bereits behandelt
            RaumBefehl::Status
            | RaumBefehl::Aktivieren { .. }
            | RaumBefehl::Deaktivieren
            | RaumBefehl::DeaktivierenBestaetigen
            | RaumBefehl::DeaktivierenAbbrechen => unreachable!(),
        }
    }

    // ---- Verwaltung ----

    async fn aktivieren(&self, server_id: ServerId, kanal_id: ChannelId) -> RaumResult<String> {
        let Some(daten) = self.provider.kanal_laden(server_id, kanal_id).await? else {
            return Err(RaumFehler::validierung(
                "Der angegebene Kanal existiert nicht.",
            ));
        };
        let Some(kategorie_id) = daten.kategorie else {
            return Err(RaumFehler::validierung(
                "Der Erstellerkanal muss unter einer Kategorie liegen.",
            ));
        };

        self.konfig
            .anlegen(NeuerRaumKonfig {
                server_id,
                erstellerkanal_id: kanal_id,
                kategorie_id,
            })
            .await?;
        tracing::info!(server = %server_id, kanal = %kanal_id, "Raumfunktion aktiviert");
        Ok(format!(
            "Raumfunktion aktiviert. Wer \"{}\" betritt, erhaelt einen eigenen Raum.",
            daten.name
        ))
    }

    async fn deaktivieren_anfordern(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
    ) -> RaumResult<String> {
        if self.konfig.laden(server_id).await?.is_none() {
            return Err(RaumFehler::voraussetzung(
                "Die Raumfunktion ist auf diesem Server nicht aktiviert.",
            ));
        }
        let eintrag = self
            .bestaetigungen
            .anfordern(RaumSchluessel::neu(server_id, aufrufer));
        let sekunden = (eintrag.laeuft_ab - eintrag.angefordert_am).num_seconds();
        Ok(format!(
            "Das Deaktivieren loescht alle Privatraeume dieses Servers. \
             Bestaetige innerhalb von {sekunden} Sekunden."
        ))
    }

    async fn deaktivieren_bestaetigen(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
    ) -> RaumResult<String> {
        match self
            .bestaetigungen
            .bestaetigen(RaumSchluessel::neu(server_id, aufrufer))
        {
            BestaetigungsErgebnis::KeineAusstehend => Err(RaumFehler::voraussetzung(
                "Es ist keine Deaktivierung angefordert.",
            )),
            BestaetigungsErgebnis::Abgelaufen => Err(RaumFehler::validierung(
                "Die Bestaetigungsfrist ist abgelaufen. Fordere die Deaktivierung erneut an.",
            )),
            BestaetigungsErgebnis::Bestaetigt => {
                let Some(konfig) = self.konfig.laden(server_id).await? else {
                    return Err(RaumFehler::voraussetzung(
                        "Die Raumfunktion ist auf diesem Server nicht aktiviert.",
                    ));
                };

                let mut geloescht = 0usize;
                for kanal_id in self
                    .provider
                    .kanaele_in_kategorie(server_id, konfig.kategorie_id)
                    .await?
                {
                    // Nur verwaltete Raeume; der Erstellerkanal und
                    // fremde Kanaele haben keinen Besitzer.
                    if self.provider.besitzer_von(server_id, kanal_id).await?.is_some() {
                        self.provider.kanal_loeschen(server_id, kanal_id).await?;
                        geloescht += 1;
                    }
                }
                self.konfig.loeschen(server_id).await?;
                tracing::info!(
                    server = %server_id,
                    raeume = geloescht,
                    "Raumfunktion auf Anforderung deaktiviert"
                );
                Ok(format!(
                    "Raumfunktion deaktiviert, {geloescht} Raeume entfernt."
                ))
            }
        }
    }

    fn deaktivieren_abbrechen(&self, server_id: ServerId, aufrufer: UserId) -> RaumResult<String> {
        if self
            .bestaetigungen
            .abbrechen(RaumSchluessel::neu(server_id, aufrufer))
        {
            Ok("Deaktivierung abgebrochen.".into())
        } else {
            Err(RaumFehler::voraussetzung(
                "Es ist keine Deaktivierung angefordert.",
            ))
        }
    }

    // ---- Raumbefehle ----

    async fn status_text(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
        aufgeloest: &AufgeloesteEinstellungen,
    ) -> RaumResult<String> {
        let e = &aufgeloest.einstellungen;
        let zustand = match aufgeloest.quelle {
            Quelle::Live => "aktiv",
            Quelle::Persistiert => "gespeichert",
            Quelle::Standard => "keiner",
        };
        let name = match &e.name {
            Some(name) => name.clone(),
            None => self.provider.anzeigename(server_id, aufrufer).await?,
        };
        let limit = if e.user_limit == 0 {
            "unbegrenzt".to_string()
        } else {
            e.user_limit.to_string()
        };
        let freigaben = self.freigaben.alle(server_id, aufrufer).await?;
        let erlaubt = freigaben
            .iter()
            .filter(|f| f.stufe == FreigabeStufe::Erlaubt)
            .count();
        let gebannt = freigaben.len() - erlaubt;

        Ok(format!(
            "Raum: {zustand}\nName: {name}\nLimit: {limit}\nBitrate: {} kbit/s\n\
             Gesperrt: {}\nFreigaben: {erlaubt} erlaubt, {gebannt} gebannt",
            e.bitrate,
            if e.gesperrt { "ja" } else { "nein" },
        ))
    }

    async fn sperren_setzen(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
        aufgeloest: &AufgeloesteEinstellungen,
        gesperrt: bool,
    ) -> RaumResult<String> {
        if aufgeloest.einstellungen.gesperrt == gesperrt {
            return Err(RaumFehler::validierung(if gesperrt {
                "Dein Raum ist bereits gesperrt."
            } else {
                "Dein Raum ist nicht gesperrt."
            }));
        }

        self.einstellungen
            .aktualisieren(
                server_id,
                aufrufer,
                EinstellungenUpdate {
                    gesperrt: Some(gesperrt),
                    ..Default::default()
                },
            )
            .await?;
        if let Some(live) = &aufgeloest.live {
            self.provider
                .override_setzen(
                    server_id,
                    live.kanal_id,
                    OverrideZiel::Alle,
                    Some(!gesperrt),
                )
                .await?;
        }
        Ok(if gesperrt {
            "Dein Raum ist jetzt gesperrt.".into()
        } else {
            "Dein Raum ist wieder offen.".into()
        })
    }

    async fn limit_setzen(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
        aufgeloest: &AufgeloesteEinstellungen,
        limit: u32,
    ) -> RaumResult<String> {
        if limit > LIMIT_MAX {
            return Err(RaumFehler::validierung(format!(
                "Das Limit muss zwischen 0 und {LIMIT_MAX} liegen."
            )));
        }
        if aufgeloest.einstellungen.user_limit == i64::from(limit) {
            return Err(RaumFehler::validierung(
                "Dein Raum hat dieses Limit bereits.",
            ));
        }

        self.einstellungen
            .aktualisieren(
                server_id,
                aufrufer,
                EinstellungenUpdate {
                    user_limit: Some(i64::from(limit)),
                    ..Default::default()
                },
            )
            .await?;
        self.live_bearbeiten(
            server_id,
            aufgeloest,
            KanalAenderung {
                user_limit: Some(limit),
                ..Default::default()
            },
        )
        .await?;

        Ok(if limit == 0 {
            "Limit entfernt, dein Raum ist unbegrenzt.".into()
        } else {
            format!("Limit auf {limit} gesetzt.")
        })
    }

    async fn name_setzen(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
        aufgeloest: &AufgeloesteEinstellungen,
        name: Option<String>,
    ) -> RaumResult<String> {
        match name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(RaumFehler::validierung("Der Name darf nicht leer sein."));
                }
                if name.chars().count() > NAME_MAX_ZEICHEN {
                    return Err(RaumFehler::validierung(format!(
                        "Der Name darf hoechstens {NAME_MAX_ZEICHEN} Zeichen lang sein."
                    )));
                }
                if aufgeloest.einstellungen.name.as_deref() == Some(name.as_str()) {
                    return Err(RaumFehler::validierung("Dein Raum heisst bereits so."));
                }

                self.einstellungen
                    .aktualisieren(
                        server_id,
                        aufrufer,
                        EinstellungenUpdate {
                            name: Some(Some(name.clone())),
                            ..Default::default()
                        },
                    )
                    .await?;
                self.live_bearbeiten(
                    server_id,
                    aufgeloest,
                    KanalAenderung {
                        name: Some(name.clone()),
                        ..Default::default()
                    },
                )
                .await?;
                Ok(format!("Dein Raum heisst jetzt \"{name}\"."))
            }
            None => {
                if aufgeloest.einstellungen.name.is_none() {
                    return Err(RaumFehler::validierung(
                        "Dein Raum traegt bereits den Standardnamen.",
                    ));
                }
                self.einstellungen
                    .aktualisieren(
                        server_id,
                        aufrufer,
                        EinstellungenUpdate {
                            name: Some(None),
                            ..Default::default()
                        },
                    )
                    .await?;
                let anzeigename = self.provider.anzeigename(server_id, aufrufer).await?;
                self.live_bearbeiten(
                    server_id,
                    aufgeloest,
                    KanalAenderung {
                        name: Some(anzeigename),
                        ..Default::default()
                    },
                )
                .await?;
                Ok("Dein Raum traegt wieder den Standardnamen.".into())
            }
        }
    }

    async fn bitrate_setzen(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
        aufgeloest: &AufgeloesteEinstellungen,
        kbps: u32,
    ) -> RaumResult<String> {
        let max = self.provider.max_bitrate(server_id).await?;
        if kbps < BITRATE_MIN || kbps > max {
            return Err(RaumFehler::validierung(format!(
                "Die Bitrate muss zwischen {BITRATE_MIN} und {max} kbit/s liegen."
            )));
        }
        if aufgeloest.einstellungen.bitrate == i64::from(kbps) {
            return Err(RaumFehler::validierung(
                "Dein Raum hat diese Bitrate bereits.",
            ));
        }

        self.einstellungen
            .aktualisieren(
                server_id,
                aufrufer,
                EinstellungenUpdate {
                    bitrate: Some(i64::from(kbps)),
                    ..Default::default()
                },
            )
            .await?;
        self.live_bearbeiten(
            server_id,
            aufgeloest,
            KanalAenderung {
                bitrate: Some(kbps),
                ..Default::default()
            },
        )
        .await?;
        Ok(format!("Bitrate auf {kbps} kbit/s gesetzt."))
    }

    async fn kick(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
        aufgeloest: &AufgeloesteEinstellungen,
        ziel: UserId,
    ) -> RaumResult<String> {
        let Some(live) = &aufgeloest.live else {
            return Err(RaumFehler::voraussetzung(
                "Dein Raum ist gerade nicht aktiv.",
            ));
        };
        if ziel == aufrufer {
            return Err(RaumFehler::validierung(
                "Du kannst dich nicht selbst rauswerfen.",
            ));
        }
        let mitglieder = self.provider.mitglieder(server_id, live.kanal_id).await?;
        if !mitglieder.contains(&ziel) {
            return Err(RaumFehler::validierung(
                "Dieser Benutzer ist nicht in deinem Raum.",
            ));
        }

        self.provider.verschieben(server_id, ziel, None).await?;
        Ok("Benutzer aus deinem Raum entfernt.".into())
    }

    async fn freigabe_setzen(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
        aufgeloest: &AufgeloesteEinstellungen,
        ziel: UserId,
        stufe: FreigabeStufe,
    ) -> RaumResult<String> {
        if ziel == aufrufer {
            return Err(RaumFehler::validierung(match stufe {
                FreigabeStufe::Gebannt => "Du kannst dich nicht selbst bannen.",
                _ => "Du brauchst fuer deinen eigenen Raum keine Freigabe.",
            }));
        }
        let bestehend = self.freigaben.laden(server_id, aufrufer, ziel).await?;
        if bestehend.map(|f| f.stufe) == Some(stufe) {
            return Err(RaumFehler::validierung(match stufe {
                FreigabeStufe::Gebannt => "Dieser Benutzer ist bereits gebannt.",
                _ => "Dieser Benutzer ist bereits erlaubt.",
            }));
        }

        self.freigaben.setzen(server_id, aufrufer, ziel, stufe).await?;

        if let Some(live) = &aufgeloest.live {
            self.provider
                .override_setzen(
                    server_id,
                    live.kanal_id,
                    OverrideZiel::Mitglied(ziel),
                    crate::diff::stufe_zu_connect(stufe),
                )
                .await?;
            // Ein Bann wirft den Benutzer auch aus dem lebenden Raum;
            // der Override allein entfernt ihn nicht.
            if stufe == FreigabeStufe::Gebannt
                && self.provider.aufenthalt(server_id, ziel).await? == Some(live.kanal_id)
            {
                self.provider.verschieben(server_id, ziel, None).await?;
            }
        }

        Ok(match stufe {
            FreigabeStufe::Gebannt => "Benutzer gebannt.".into(),
            _ => "Benutzer erlaubt.".into(),
        })
    }

    async fn freigabe_entfernen(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
        aufgeloest: &AufgeloesteEinstellungen,
        ziel: UserId,
    ) -> RaumResult<String> {
        if !self.freigaben.entfernen(server_id, aufrufer, ziel).await? {
            return Err(RaumFehler::validierung(
                "Fuer diesen Benutzer ist keine Freigabe gespeichert.",
            ));
        }
        if let Some(live) = &aufgeloest.live {
            self.provider
                .override_setzen(server_id, live.kanal_id, OverrideZiel::Mitglied(ziel), None)
                .await?;
        }
        Ok("Freigabe entfernt.".into())
    }

    async fn zuruecksetzen(
        &self,
        server_id: ServerId,
        aufrufer: UserId,
        aufgeloest: &AufgeloesteEinstellungen,
    ) -> RaumResult<String> {
        let freigaben = self.freigaben.alle(server_id, aufrufer).await?;
        let live_overrides = aufgeloest
            .live
            .as_ref()
            .map(|l| {
                l.daten
                    .freigabe_overrides()
                    .values()
                    .filter(|c| c.is_some())
                    .count()
            })
            .unwrap_or(0);
        if aufgeloest.einstellungen.ist_standard() && freigaben.is_empty() && live_overrides == 0 {
            return Err(RaumFehler::validierung(
                "Dein Raum steht bereits auf den Standardwerten.",
            ));
        }

        self.einstellungen.zuruecksetzen(server_id, aufrufer).await?;
        self.freigaben.alle_entfernen(server_id, aufrufer).await?;

        if let Some(live) = &aufgeloest.live {
            let anzeigename = self.provider.anzeigename(server_id, aufrufer).await?;
            self.provider
                .kanal_bearbeiten(
                    server_id,
                    live.kanal_id,
                    KanalAenderung {
                        name: Some(anzeigename),
                        user_limit: Some(STANDARD_LIMIT as u32),
                        bitrate: Some(STANDARD_BITRATE as u32),
                    },
                )
                .await?;
            self.provider
                .override_setzen(server_id, live.kanal_id, OverrideZiel::Alle, Some(true))
                .await?;
            for (user_id, connect) in live.daten.freigabe_overrides() {
                if connect.is_some() {
                    self.provider
                        .override_setzen(
                            server_id,
                            live.kanal_id,
                            OverrideZiel::Mitglied(user_id),
                            None,
                        )
                        .await?;
                }
            }
        }

        tracing::info!(server = %server_id, besitzer = %aufrufer, "Raum zurueckgesetzt");
        Ok("Dein Raum wurde auf die Standardwerte zurueckgesetzt.".into())
    }

    /// Zieht den lebenden Raum nach einer persistierten Aenderung nach
    async fn live_bearbeiten(
        &self,
        server_id: ServerId,
        aufgeloest: &AufgeloesteEinstellungen,
        aenderung: KanalAenderung,
    ) -> RaumResult<()> {
        if let Some(LiveRaum { kanal_id, .. }) = &aufgeloest.live {
            if !aenderung.ist_leer() {
                self.provider
                    .kanal_bearbeiten(server_id, *kanal_id, aenderung)
                    .await?;
            }
        }
        Ok(())
    }
}
