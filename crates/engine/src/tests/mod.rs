//! Engine-Tests mit In-Memory-Datenbank und Fake-Provider


mod befehle_tests;
mod controller_tests;

use std::sync::Arc;

use raumwart_core::types::{ChannelId, ServerId, UserId};
use raumwart_db::SqliteDb;

use crate::befehle::{BefehlsKontext, RaumBefehl};
use crate::engine::RaumEngine;
use fake_provider::FakeProvider;

type TestEngine = Arc<RaumEngine<SqliteDb, SqliteDb, SqliteDb, FakeProvider>>;

/// Engine mit In-Memory-SQLite und Fake-Provider
async fn test_engine() -> (TestEngine, Arc<FakeProvider>, Arc<SqliteDb>) {
    let db = Arc::new(
        SqliteDb::in_memory()
            .await
            .expect("In-Memory DB konnte nicht erstellt werden"),
    );
    let provider = Arc::new(FakeProvider::neu());
    let engine = RaumEngine::neu(db.clone(), db.clone(), db.clone(), provider.clone());
    (engine, provider, db)
}

/// Legt Kategorie und Erstellerkanal an und aktiviert die Raumfunktion
async fn server_aktivieren(
    engine: &TestEngine,
    provider: &FakeProvider,
    admin: UserId,
) -> (ServerId, ChannelId, ChannelId) {
    let server = ServerId::new();
    let kategorie = ChannelId::new();
    let ersteller = provider.kanal_anlegen("Raum erstellen", Some(kategorie));

    engine
        .ausfuehren(
            RaumBefehl::Aktivieren {
                kanal_id: ersteller,
            },
            BefehlsKontext {
                server_id: server,
                aufrufer: admin,
            },
        )
        .await
        .expect("Aktivieren fehlgeschlagen");

    (server, ersteller, kategorie)
}

/// Laesst einen Benutzer den Erstellerkanal betreten und liefert die
/// ID des danach existierenden Privatraums
async fn raum_erstellen(
    engine: &TestEngine,
    provider: &FakeProvider,
    server: ServerId,
    ersteller: ChannelId,
    besitzer: UserId,
) -> ChannelId {
    provider.setze_aufenthalt(besitzer, Some(ersteller));
    engine
        .presence_wechsel(server, besitzer, None, Some(ersteller))
        .await
        .expect("Presence-Wechsel fehlgeschlagen");
    provider
        .raum_von(besitzer)
        .expect("Es wurde kein Raum erstellt")
}
