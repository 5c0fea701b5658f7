//! Integration-Tests fuer RaumKonfigRepository (In-Memory SQLite)

use raumwart_core::types::{ChannelId, ServerId};
use raumwart_db::{models::NeuerRaumKonfig, RaumKonfigRepository, SqliteDb};

async fn db() -> SqliteDb {
    SqliteDb::in_memory()
        .await
        .expect("In-Memory DB konnte nicht erstellt werden")
}

#[tokio::test]
async fn konfig_anlegen_und_laden() {
    let db = db().await;
    let server = ServerId::new();
    let ersteller = ChannelId::new();
    let kategorie = ChannelId::new();

    let konfig = db
        .anlegen(NeuerRaumKonfig {
            server_id: server,
            erstellerkanal_id: ersteller,
            kategorie_id: kategorie,
        })
        .await
        .unwrap();

    assert_eq!(konfig.server_id, server);
    assert_eq!(konfig.erstellerkanal_id, ersteller);
    assert_eq!(konfig.kategorie_id, kategorie);

    let geladen = db.laden(server).await.unwrap().unwrap();
    assert_eq!(geladen.erstellerkanal_id, ersteller);
    assert_eq!(geladen.kategorie_id, kategorie);
}

#[tokio::test]
async fn konfig_fehlt_fuer_unbekannten_server() {
    let db = db().await;
    let geladen = db.laden(ServerId::new()).await.unwrap();
    assert!(geladen.is_none());
}

#[tokio::test]
async fn konfig_erneut_anlegen_ersetzt() {
    let db = db().await;
    let server = ServerId::new();

    db.anlegen(NeuerRaumKonfig {
        server_id: server,
        erstellerkanal_id: ChannelId::new(),
        kategorie_id: ChannelId::new(),
    })
    .await
    .unwrap();

    let neuer_kanal = ChannelId::new();
    let neue_kategorie = ChannelId::new();
    db.anlegen(NeuerRaumKonfig {
        server_id: server,
        erstellerkanal_id: neuer_kanal,
        kategorie_id: neue_kategorie,
    })
    .await
    .unwrap();

    let geladen = db.laden(server).await.unwrap().unwrap();
    assert_eq!(geladen.erstellerkanal_id, neuer_kanal);
    assert_eq!(geladen.kategorie_id, neue_kategorie);
}

#[tokio::test]
async fn konfig_loeschen() {
    let db = db().await;
    let server = ServerId::new();

    db.anlegen(NeuerRaumKonfig {
        server_id: server,
        erstellerkanal_id: ChannelId::new(),
        kategorie_id: ChannelId::new(),
    })
    .await
    .unwrap();

    assert!(db.loeschen(server).await.unwrap());
    assert!(db.laden(server).await.unwrap().is_none());

    // Zweites Loeschen meldet false
    assert!(!db.loeschen(server).await.unwrap());
}
