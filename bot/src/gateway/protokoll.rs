//! Drahtformat des Gateways
//!
//! JSON-Lines ueber TCP: jede Zeile ist eine Nachricht. Der Adapter
//! schiebt Ereignisse und Befehle zum Bot und beantwortet dessen
//! Provider-Anfragen; der Bot schickt Anfragen und Befehlsergebnisse
//! zurueck. Anfragen und Antworten werden ueber die `id` korreliert.

use raumwart_core::event::PlattformEvent;
use raumwart_core::types::{ChannelId, ServerId, UserId};
use raumwart_engine::befehle::{BefehlsKontext, RaumBefehl};
use raumwart_engine::provider::{KanalAenderung, KanalEntwurf, OverrideZiel};
use serde::{Deserialize, Serialize};

/// Nachrichten vom Adapter zum Bot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "snake_case")]
pub enum AdapterNachricht {
    /// Ein Plattform-Ereignis
    Event { event: PlattformEvent },
    /// Ein Benutzerbefehl; das Ergebnis wird unter derselben `id`
    /// zurueckgemeldet
    Befehl {
        id: u64,
        kontext: BefehlsKontext,
        befehl: RaumBefehl,
    },
    /// Antwort auf eine Provider-Anfrage des Bots
    Antwort {
        id: u64,
        #[serde(default)]
        fehler: Option<AntwortFehler>,
        #[serde(default)]
        daten: serde_json::Value,
    },
}

/// Fehlerteil einer Adapter-Antwort
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntwortFehler {
    /// "nicht_gefunden", "verweigert" oder "io"
    pub art: String,
    pub nachricht: String,
}

/// Nachrichten vom Bot zum Adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "snake_case")]
pub enum BotNachricht {
    /// Eine Provider-Anfrage; der Adapter antwortet mit `Antwort`
    Anfrage {
        id: u64,
        anfrage: ProviderAnfrage,
    },
    /// Ergebnis eines Befehls
    BefehlsErgebnis {
        id: u64,
        erfolg: bool,
        text: String,
    },
}

/// Alle Provider-Operationen im Drahtformat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ProviderAnfrage {
    KanalLaden {
        server_id: ServerId,
        kanal_id: ChannelId,
    },
    Mitglieder {
        server_id: ServerId,
        kanal_id: ChannelId,
    },
    KanaeleInKategorie {
        server_id: ServerId,
        kategorie_id: ChannelId,
    },
    KanalErstellen {
        server_id: ServerId,
        kategorie_id: ChannelId,
        besitzer_id: UserId,
        entwurf: KanalEntwurf,
    },
    KanalLoeschen {
        server_id: ServerId,
        kanal_id: ChannelId,
    },
    KanalBearbeiten {
        server_id: ServerId,
        kanal_id: ChannelId,
        aenderung: KanalAenderung,
    },
    OverrideSetzen {
        server_id: ServerId,
        kanal_id: ChannelId,
        ziel: OverrideZiel,
        connect: Option<bool>,
    },
    Verschieben {
        server_id: ServerId,
        user_id: UserId,
        kanal_id: Option<ChannelId>,
    },
    BesitzerVon {
        server_id: ServerId,
        kanal_id: ChannelId,
    },
    RaumVonBesitzer {
        server_id: ServerId,
        besitzer_id: UserId,
    },
    Aufenthalt {
        server_id: ServerId,
        user_id: UserId,
    },
    MitgliedAufloesbar {
        server_id: ServerId,
        user_id: UserId,
    },
    Anzeigename {
        server_id: ServerId,
        user_id: UserId,
    },
    MaxBitrate {
        server_id: ServerId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use raumwart_core::types::ServerId;

    #[test]
    fn anfrage_drahtformat() {
        let nachricht = BotNachricht::Anfrage {
            id: 7,
            anfrage: ProviderAnfrage::MaxBitrate {
                server_id: ServerId::new(),
            },
        };
        let json = serde_json::to_value(&nachricht).unwrap();
        assert_eq!(json["typ"], "anfrage");
        assert_eq!(json["id"], 7);
        assert_eq!(json["anfrage"]["op"], "max_bitrate");
    }

    #[test]
    fn antwort_ohne_fehler_und_daten() {
        let zeile = r#"{"typ":"antwort","id":3}"#;
        let nachricht: AdapterNachricht = serde_json::from_str(zeile).unwrap();
        match nachricht {
            AdapterNachricht::Antwort { id, fehler, daten } => {
                assert_eq!(id, 3);
                assert!(fehler.is_none());
                assert!(daten.is_null());
            }
            other => panic!("Unerwartete Nachricht: {other:?}"),
        }
    }

    #[test]
    fn befehl_drahtformat() {
        let zeile = format!(
            r#"{{"typ":"befehl","id":1,"kontext":{{"server_id":"{}","aufrufer":"{}"}},"befehl":{{"befehl":"sperren"}}}}"#,
            uuid::Uuid::new_v4(),
            uuid::Uuid::new_v4(),
        );
        let nachricht: AdapterNachricht = serde_json::from_str(&zeile).unwrap();
        assert!(matches!(
            nachricht,
            AdapterNachricht::Befehl {
                befehl: RaumBefehl::Sperren,
                ..
            }
        ));
    }
}
