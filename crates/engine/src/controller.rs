//! Lebenszyklus-Handler fuer Plattform-Ereignisse
//!
//! Drei Ereignisse treiben den Raum-Lebenszyklus: Presence-Wechsel
//! (Betreten des Erstellerkanals, Verlassen eines Raums), geloeschte
//! Kanaele und aktualisierte Kanaele. Jeder Uebergang laeuft unter der
//! Sperre des betroffenen (Server, Besitzer)-Paars.

use raumwart_core::event::PlattformEvent;
use raumwart_core::types::{ChannelId, RaumSchluessel, ServerId, UserId};
use raumwart_db::models::RaumKonfigRecord;
use raumwart_db::{FreigabeRepository, RaumEinstellungenRepository, RaumKonfigRepository};

use crate::diff::freigaben_diff;
use crate::engine::RaumEngine;
use crate::error::RaumResult;
use crate::provider::{KanalEntwurf, OverrideEintrag, OverrideZiel, VoiceProvider};

impl<K, E, F, P> RaumEngine<K, E, F, P>
where
    K: RaumKonfigRepository,
    E: RaumEinstellungenRepository,
    F: FreigabeRepository,
    P: VoiceProvider,
{
    /// Verteilt ein Plattform-Ereignis auf die Handler
    pub async fn ereignis_verarbeiten(&self, event: PlattformEvent) -> RaumResult<()> {
        match event {
            PlattformEvent::PresenceWechsel {
                server_id,
                user_id,
                von,
                nach,
            } => self.presence_wechsel(server_id, user_id, von, nach).await,
            PlattformEvent::KanalGeloescht {
                server_id,
                kanal_id,
            } => self.kanal_geloescht(server_id, kanal_id).await,
            PlattformEvent::KanalAktualisiert {
                server_id,
                kanal_id,
            } => self.kanal_aktualisiert(server_id, kanal_id).await,
        }
    }

    /// Ein Benutzer hat den Voice-Kanal gewechselt
    pub async fn presence_wechsel(
        &self,
        server_id: ServerId,
        user_id: UserId,
        von: Option<ChannelId>,
        nach: Option<ChannelId>,
    ) -> RaumResult<()> {
        if von == nach {
            return Ok(());
        }
        let Some(konfig) = self.konfig.laden(server_id).await? else {
            return Ok(());
        };

        // Eintritt zuerst: sitzt der Besitzer bereits wieder in seinem
        // Raum, findet der Abbau-Check danach einen belegten Kanal vor.
        if nach == Some(konfig.erstellerkanal_id) {
            self.erstellerkanal_betreten(&konfig, user_id).await?;
        }

        if let Some(verlassen) = von {
            if verlassen != konfig.erstellerkanal_id {
                self.raum_ggf_abbauen(server_id, verlassen).await?;
            }
        }
        Ok(())
    }

    /// Ein Kanal wurde auf der Plattform geloescht
    pub async fn kanal_geloescht(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
    ) -> RaumResult<()> {
        let Some(konfig) = self.konfig.laden(server_id).await? else {
            return Ok(());
        };
        if konfig.erstellerkanal_id == kanal_id {
            self.konfig_verwerfen(server_id, "Erstellerkanal wurde geloescht")
                .await?;
        }
        Ok(())
    }

    /// Ein Kanal wurde auf der Plattform veraendert
    pub async fn kanal_aktualisiert(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
    ) -> RaumResult<()> {
        let Some(konfig) = self.konfig.laden(server_id).await? else {
            return Ok(());
        };

        if konfig.erstellerkanal_id == kanal_id {
            let Some(daten) = self.provider.kanal_laden(server_id, kanal_id).await? else {
                self.konfig_verwerfen(server_id, "Erstellerkanal nicht mehr auffindbar")
                    .await?;
                return Ok(());
            };
            if daten.kategorie != Some(konfig.kategorie_id) {
                self.konfig_verwerfen(server_id, "Erstellerkanal wurde aus der Kategorie verschoben")
                    .await?;
            }
            return Ok(());
        }

        let Some(besitzer_id) = self.provider.besitzer_von(server_id, kanal_id).await? else {
            return Ok(());
        };

        let sperre = self
            .sperren
            .sperre(RaumSchluessel::neu(server_id, besitzer_id));
        let _guard = sperre.lock().await;

        let Some(daten) = self.provider.kanal_laden(server_id, kanal_id).await? else {
            return Ok(());
        };

        // Attribute zurueckschreiben, dann externe Override-Aenderungen
        // als Freigaben uebernehmen: der lebende Kanal gewinnt. Stammt
        // das Ereignis von einer eigenen Aenderung, ist der Diff leer.
        self.einstellungen_angleichen(server_id, besitzer_id, &daten)
            .await?;
        let persistiert = self.freigaben_bereinigt(server_id, besitzer_id).await?;
        let diff = freigaben_diff(&daten.freigabe_overrides(), &persistiert);
        if !diff.ist_leer() {
            tracing::info!(
                server = %server_id,
                besitzer = %besitzer_id,
                aenderungen = diff.anzahl(),
                "Externe Override-Aenderungen in Freigaben uebernommen"
            );
            self.diff_persistieren(server_id, besitzer_id, &diff).await?;
        }
        Ok(())
    }

    /// Ein Besitzer hat den Erstellerkanal betreten: Raum erstellen
    /// oder in den bestehenden verschieben
    async fn erstellerkanal_betreten(
        &self,
        konfig: &RaumKonfigRecord,
        besitzer_id: UserId,
    ) -> RaumResult<()> {
        let server_id = konfig.server_id;
        let sperre = self
            .sperren
            .sperre(RaumSchluessel::neu(server_id, besitzer_id));
        let _guard = sperre.lock().await;

        // Hoechstens ein Raum pro Besitzer: existiert schon einer,
        // wird der Besitzer dorthin verschoben.
        if let Some(bestehend) = self
            .provider
            .raum_von_besitzer(server_id, besitzer_id)
            .await?
        {
            tracing::debug!(
                server = %server_id,
                besitzer = %besitzer_id,
                kanal = %bestehend,
                "Besitzer in bestehenden Raum verschoben"
            );
            self.provider
                .verschieben(server_id, besitzer_id, Some(bestehend))
                .await?;
            return Ok(());
        }

        // Erstellerkanal und Kategorie muessen noch intakt sein; sonst
        // wird die Konfiguration still verworfen.
        match self
            .provider
            .kanal_laden(server_id, konfig.erstellerkanal_id)
            .await?
        {
            Some(daten) if daten.kategorie == Some(konfig.kategorie_id) => {}
            _ => {
                self.konfig_verwerfen(server_id, "Erstellerkanal nicht mehr intakt")
                    .await?;
                return Ok(());
            }
        }

        let einstellungen = self
            .einstellungen
            .laden_oder_anlegen(server_id, besitzer_id)
            .await?;
        let freigaben = self.freigaben_bereinigt(server_id, besitzer_id).await?;

        let name = match einstellungen.name.clone() {
            Some(name) => name,
            None => self.provider.anzeigename(server_id, besitzer_id).await?,
        };
        let mut overrides = vec![
            OverrideEintrag {
                ziel: OverrideZiel::Mitglied(besitzer_id),
                connect: Some(true),
                vollzugriff: true,
            },
            OverrideEintrag {
                ziel: OverrideZiel::Alle,
                connect: Some(!einstellungen.gesperrt),
                vollzugriff: false,
            },
        ];
        for (user_id, stufe) in &freigaben {
            overrides.push(OverrideEintrag {
                ziel: OverrideZiel::Mitglied(*user_id),
                connect: crate::diff::stufe_zu_connect(*stufe),
                vollzugriff: false,
            });
        }

        let kanal_id = self
            .provider
            .kanal_erstellen(
                server_id,
                konfig.kategorie_id,
                besitzer_id,
                KanalEntwurf {
                    name,
                    user_limit: einstellungen.user_limit as u32,
                    bitrate: einstellungen.bitrate as u32,
                    overrides,
                },
            )
            .await?;

        if let Err(fehler) = self
            .provider
            .verschieben(server_id, besitzer_id, Some(kanal_id))
            .await
        {
            // Der Besitzer konnte nicht verschoben werden; der leere
            // Raum wird nach Moeglichkeit gleich wieder entfernt.
            tracing::warn!(
                server = %server_id,
                besitzer = %besitzer_id,
                fehler = %fehler,
                "Besitzer konnte nicht in neuen Raum verschoben werden"
            );
            let _ = self.provider.kanal_loeschen(server_id, kanal_id).await;
            return Err(fehler.into());
        }

        tracing::info!(
            server = %server_id,
            besitzer = %besitzer_id,
            kanal = %kanal_id,
            "Privatraum erstellt"
        );
        Ok(())
    }

    /// Prueft nach einem Austritt, ob ein verwalteter Raum leer ist,
    /// und loescht ihn gegebenenfalls
    async fn raum_ggf_abbauen(&self, server_id: ServerId, kanal_id: ChannelId) -> RaumResult<()> {
        let Some(besitzer_id) = self.provider.besitzer_von(server_id, kanal_id).await? else {
            return Ok(());
        };

        let sperre = self
            .sperren
            .sperre(RaumSchluessel::neu(server_id, besitzer_id));
        let _guard = sperre.lock().await;

        // Mitgliederzahl und Loeschung unter derselben Sperre, damit
        // kein gleichzeitiger Beitritt dazwischenfunkt.
        let mitglieder = self.provider.mitglieder(server_id, kanal_id).await?;
        if mitglieder.is_empty() {
            tracing::info!(
                server = %server_id,
                besitzer = %besitzer_id,
                kanal = %kanal_id,
                "Leeren Privatraum entfernt"
            );
            self.provider.kanal_loeschen(server_id, kanal_id).await?;
        }
        Ok(())
    }

    /// Entfernt die Server-Konfiguration (stille Deaktivierung).
    /// Lebende Raeume bleiben stehen und laufen natuerlich leer.
    pub(crate) async fn konfig_verwerfen(
        &self,
        server_id: ServerId,
        grund: &str,
    ) -> RaumResult<()> {
        tracing::warn!(server = %server_id, grund, "Raumfunktion deaktiviert");
        self.konfig.loeschen(server_id).await?;
        Ok(())
    }
}
