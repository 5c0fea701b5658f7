//! `VoiceProvider` ueber die Gateway-Verbindung
//!
//! Jede Provider-Operation wird als JSON-Zeile an den verbundenen
//! Adapter geschickt und blockiert, bis dessen Antwort mit derselben
//! `id` eintrifft oder die Zeitueberschreitung greift. Ohne verbundenen
//! Adapter schlagen alle Operationen mit einem E/A-Fehler fehl.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use raumwart_core::types::{ChannelId, ServerId, UserId};
use raumwart_engine::provider::{
    KanalAenderung, KanalDaten, KanalEntwurf, OverrideZiel, ProviderFehler, ProviderResult,
    VoiceProvider,
};
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::gateway::protokoll::{AntwortFehler, BotNachricht, ProviderAnfrage};

type AntwortErgebnis = Result<serde_json::Value, ProviderFehler>;

/// Provider-Seite des Gateways
pub struct GatewayProvider {
    naechste_id: AtomicU64,
    ausstehend: DashMap<u64, oneshot::Sender<AntwortErgebnis>>,
    /// Schreibkanal der aktuellen Adapter-Verbindung
    sender: RwLock<Option<mpsc::UnboundedSender<String>>>,
    timeout: Duration,
}

impl GatewayProvider {
    pub fn neu(timeout: Duration) -> Self {
        Self {
            naechste_id: AtomicU64::new(1),
            ausstehend: DashMap::new(),
            sender: RwLock::new(None),
            timeout,
        }
    }

    /// Hinterlegt den Schreibkanal einer neuen Adapter-Verbindung
    pub async fn verbinden(&self, sender: mpsc::UnboundedSender<String>) {
        *self.sender.write().await = Some(sender);
    }

    /// Entfernt den Schreibkanal und bricht alle ausstehenden Anfragen ab
    pub async fn trennen(&self) {
        *self.sender.write().await = None;
        let ids: Vec<u64> = self.ausstehend.iter().map(|e| *e.key()).collect();
        for id in ids {
            if let Some((_, tx)) = self.ausstehend.remove(&id) {
                let _ = tx.send(Err(ProviderFehler::Io("Adapter-Verbindung getrennt".into())));
            }
        }
    }

    /// Liefert eine Adapter-Antwort an die wartende Anfrage aus
    pub fn antwort_einliefern(
        &self,
        id: u64,
        fehler: Option<AntwortFehler>,
        daten: serde_json::Value,
    ) {
        let Some((_, tx)) = self.ausstehend.remove(&id) else {
            tracing::debug!(id, "Antwort ohne ausstehende Anfrage verworfen");
            return;
        };
        let ergebnis = match fehler {
            None => Ok(daten),
            Some(f) => Err(match f.art.as_str() {
                "nicht_gefunden" => ProviderFehler::NichtGefunden(f.nachricht),
                "verweigert" => ProviderFehler::Verweigert(f.nachricht),
                _ => ProviderFehler::Io(f.nachricht),
            }),
        };
        let _ = tx.send(ergebnis);
    }

    /// Schickt eine Anfrage und wartet auf die dekodierte Antwort
    async fn anfrage<T: DeserializeOwned>(&self, anfrage: ProviderAnfrage) -> ProviderResult<T> {
        let sender = {
            let guard = self.sender.read().await;
            guard
                .clone()
                .ok_or_else(|| ProviderFehler::Io("Kein Adapter verbunden".into()))?
        };

        let id = self.naechste_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.ausstehend.insert(id, tx);

        let zeile = match serde_json::to_string(&BotNachricht::Anfrage { id, anfrage }) {
            Ok(zeile) => zeile,
            Err(e) => {
                self.ausstehend.remove(&id);
                return Err(ProviderFehler::Io(format!("Anfrage nicht kodierbar: {e}")));
            }
        };
        if sender.send(zeile).is_err() {
            self.ausstehend.remove(&id);
            return Err(ProviderFehler::Io("Adapter-Verbindung getrennt".into()));
        }

        let daten = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(ergebnis)) => ergebnis?,
            Ok(Err(_)) => {
                return Err(ProviderFehler::Io("Adapter-Verbindung getrennt".into()));
            }
            Err(_) => {
                self.ausstehend.remove(&id);
                return Err(ProviderFehler::Io(format!(
                    "Zeitueberschreitung nach {}ms",
                    self.timeout.as_millis()
                )));
            }
        };

        serde_json::from_value(daten)
            .map_err(|e| ProviderFehler::Io(format!("Ungueltige Adapter-Antwort: {e}")))
    }
}

impl VoiceProvider for GatewayProvider {
    async fn kanal_laden(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
    ) -> ProviderResult<Option<KanalDaten>> {
        self.anfrage(ProviderAnfrage::KanalLaden {
            server_id,
            kanal_id,
        })
        .await
    }

    async fn mitglieder(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
    ) -> ProviderResult<Vec<UserId>> {
        self.anfrage(ProviderAnfrage::Mitglieder {
            server_id,
            kanal_id,
        })
        .await
    }

    async fn kanaele_in_kategorie(
        &self,
        server_id: ServerId,
        kategorie_id: ChannelId,
    ) -> ProviderResult<Vec<ChannelId>> {
        self.anfrage(ProviderAnfrage::KanaeleInKategorie {
            server_id,
            kategorie_id,
        })
        .await
    }

    async fn kanal_erstellen(
        &self,
        server_id: ServerId,
        kategorie_id: ChannelId,
        besitzer_id: UserId,
        entwurf: KanalEntwurf,
    ) -> ProviderResult<ChannelId> {
        self.anfrage(ProviderAnfrage::KanalErstellen {
            server_id,
            kategorie_id,
            besitzer_id,
            entwurf,
        })
        .await
    }

    async fn kanal_loeschen(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
    ) -> ProviderResult<()> {
        self.anfrage(ProviderAnfrage::KanalLoeschen {
            server_id,
            kanal_id,
        })
        .await
    }

    async fn kanal_bearbeiten(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
        aenderung: KanalAenderung,
    ) -> ProviderResult<()> {
        self.anfrage(ProviderAnfrage::KanalBearbeiten {
            server_id,
            kanal_id,
            aenderung,
        })
        .await
    }

    async fn override_setzen(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
        ziel: OverrideZiel,
        connect: Option<bool>,
    ) -> ProviderResult<()> {
        self.anfrage(ProviderAnfrage::OverrideSetzen {
            server_id,
            kanal_id,
            ziel,
            connect,
        })
        .await
    }

    async fn verschieben(
        &self,
        server_id: ServerId,
        user_id: UserId,
        kanal_id: Option<ChannelId>,
    ) -> ProviderResult<()> {
        self.anfrage(ProviderAnfrage::Verschieben {
            server_id,
            user_id,
            kanal_id,
        })
        .await
    }

    async fn besitzer_von(
        &self,
        server_id: ServerId,
        kanal_id: ChannelId,
    ) -> ProviderResult<Option<UserId>> {
        self.anfrage(ProviderAnfrage::BesitzerVon {
            server_id,
            kanal_id,
        })
        .await
    }

    async fn raum_von_besitzer(
        &self,
        server_id: ServerId,
        besitzer_id: UserId,
    ) -> ProviderResult<Option<ChannelId>> {
        self.anfrage(ProviderAnfrage::RaumVonBesitzer {
            server_id,
            besitzer_id,
        })
        .await
    }

    async fn aufenthalt(
        &self,
        server_id: ServerId,
        user_id: UserId,
    ) -> ProviderResult<Option<ChannelId>> {
        self.anfrage(ProviderAnfrage::Aufenthalt { server_id, user_id })
            .await
    }

    async fn mitglied_aufloesbar(
        &self,
        server_id: ServerId,
        user_id: UserId,
    ) -> ProviderResult<bool> {
        self.anfrage(ProviderAnfrage::MitgliedAufloesbar { server_id, user_id })
            .await
    }

    async fn anzeigename(&self, server_id: ServerId, user_id: UserId) -> ProviderResult<String> {
        self.anfrage(ProviderAnfrage::Anzeigename { server_id, user_id })
            .await
    }

    async fn max_bitrate(&self, server_id: ServerId) -> ProviderResult<u32> {
        self.anfrage(ProviderAnfrage::MaxBitrate { server_id }).await
    }
}
