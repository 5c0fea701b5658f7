//! TCP-Server des Gateways
//!
//! Es ist genau eine Adapter-Verbindung zur Zeit aktiv; der Server
//! nimmt die naechste erst nach dem Ende der aktuellen an. Antworten
//! auf Provider-Anfragen werden direkt in der Leseschleife zugestellt,
//! Ereignisse und Befehle laufen als eigene Tasks, damit deren
//! Provider-Anfragen die Leseschleife nicht blockieren.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::GatewayEinstellungen;
use crate::gateway::protokoll::{AdapterNachricht, BotNachricht};
use crate::gateway::{BotEngine, GatewayProvider};

/// Gateway-Server
pub struct GatewayServer {
    konfig: GatewayEinstellungen,
}

impl GatewayServer {
    pub fn neu(konfig: GatewayEinstellungen) -> Self {
        Self { konfig }
    }

    /// Startet den Server und bedient Adapter-Verbindungen, eine nach
    /// der anderen
    pub async fn starten(
        self,
        engine: BotEngine,
        provider: Arc<GatewayProvider>,
    ) -> Result<()> {
        let adresse = format!("{}:{}", self.konfig.bind_adresse, self.konfig.port);
        let listener = TcpListener::bind(&adresse).await?;
        tracing::info!(adresse = %adresse, "Gateway gestartet");

        loop {
            let (stream, peer) = listener.accept().await?;
            tracing::info!(peer = %peer, "Adapter verbunden");

            let (lesehaelfte, mut schreibhaelfte) = stream.into_split();
            let (tx, mut rx) = mpsc::unbounded_channel::<String>();
            provider.verbinden(tx.clone()).await;

            let schreiber = tokio::spawn(async move {
                while let Some(zeile) = rx.recv().await {
                    if schreibhaelfte.write_all(zeile.as_bytes()).await.is_err()
                        || schreibhaelfte.write_all(b"\n").await.is_err()
                    {
                        break;
                    }
                }
            });

            self.lese_schleife(lesehaelfte, &engine, &provider, &tx).await;

            provider.trennen().await;
            schreiber.abort();
            tracing::info!(peer = %peer, "Adapter getrennt");
        }
    }

    async fn lese_schleife(
        &self,
        lesehaelfte: OwnedReadHalf,
        engine: &BotEngine,
        provider: &Arc<GatewayProvider>,
        tx: &mpsc::UnboundedSender<String>,
    ) {
        let mut leser = BufReader::new(lesehaelfte);
        let mut zeile = String::new();

        loop {
            zeile.clear();
            match leser.read_line(&mut zeile).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(fehler = %e, "Lesefehler auf Gateway-Verbindung");
                    break;
                }
            }
            if zeile.len() > self.konfig.zeilenlimit_bytes {
                tracing::warn!(
                    laenge = zeile.len(),
                    limit = self.konfig.zeilenlimit_bytes,
                    "Zeilenlimit ueberschritten, Verbindung wird beendet"
                );
                break;
            }
            let gekuerzt = zeile.trim();
            if gekuerzt.is_empty() {
                continue;
            }

            let nachricht: AdapterNachricht = match serde_json::from_str(gekuerzt) {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(fehler = %e, "Ungueltige Adapter-Nachricht verworfen");
                    continue;
                }
            };

            match nachricht {
                AdapterNachricht::Antwort { id, fehler, daten } => {
                    provider.antwort_einliefern(id, fehler, daten);
                }
                AdapterNachricht::Event { event } => {
                    let engine = engine.clone();
                    tokio::spawn(async move {
                        let server = event.server_id();
                        if let Err(fehler) = engine.ereignis_verarbeiten(event).await {
                            tracing::warn!(
                                server = %server,
                                fehler = %fehler,
                                "Ereignisverarbeitung fehlgeschlagen"
                            );
                        }
                    });
                }
                AdapterNachricht::Befehl {
                    id,
                    kontext,
                    befehl,
                } => {
                    let engine = engine.clone();
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let (erfolg, text) = match engine.ausfuehren(befehl, kontext).await {
                            Ok(text) => (true, text),
                            Err(fehler) if fehler.ist_benutzerfehler() => {
                                (false, fehler.to_string())
                            }
                            Err(fehler) => {
                                tracing::error!(
                                    server = %kontext.server_id,
                                    aufrufer = %kontext.aufrufer,
                                    fehler = %fehler,
                                    "Befehl fehlgeschlagen"
                                );
                                (
                                    false,
                                    "Da ist etwas schiefgelaufen. Versuche es spaeter erneut."
                                        .into(),
                                )
                            }
                        };
                        let ergebnis = BotNachricht::BefehlsErgebnis { id, erfolg, text };
                        if let Ok(zeile) = serde_json::to_string(&ergebnis) {
                            let _ = tx.send(zeile);
                        }
                    });
                }
            }
        }
    }
}
