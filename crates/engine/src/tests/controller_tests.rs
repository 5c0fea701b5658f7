//! Tests fuer die Lebenszyklus-Handler

use raumwart_core::types::{ChannelId, UserId};
use raumwart_db::models::{EinstellungenUpdate, FreigabeStufe};
use raumwart_db::{FreigabeRepository, RaumEinstellungenRepository, RaumKonfigRepository};

use crate::provider::{KanalAenderung, OverrideEintrag, OverrideZiel, VoiceProvider};

use super::{raum_erstellen, server_aktivieren, test_engine};

#[tokio::test]
async fn betreten_erstellt_raum_und_verschiebt_besitzer() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, kategorie) =
        server_aktivieren(&engine, &provider, UserId::new()).await;

    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    let daten = provider.kanal(raum).unwrap();
    assert_eq!(daten.kategorie, Some(kategorie));
    assert!(!daten.ist_gesperrt());
    // Besitzer-Eintrag mit Vollzugriff
    assert!(daten
        .overrides
        .iter()
        .any(|o| o.ziel == OverrideZiel::Mitglied(besitzer) && o.vollzugriff));
    // Besitzer sitzt im neuen Raum
    assert_eq!(
        provider.aufenthalt(server, besitzer).await.unwrap(),
        Some(raum)
    );
}

#[tokio::test]
async fn zweiter_eintritt_erzeugt_keinen_zweiten_raum() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    // Besitzer laeuft zurueck in den Erstellerkanal
    provider.setze_aufenthalt(besitzer, Some(ersteller));
    engine
        .presence_wechsel(server, besitzer, Some(raum), Some(ersteller))
        .await
        .unwrap();

    assert_eq!(provider.anzahl_raeume(besitzer), 1);
    assert_eq!(provider.raum_von(besitzer), Some(raum));
    // Besitzer wurde in den bestehenden Raum zurueckverschoben
    assert_eq!(
        provider.aufenthalt(server, besitzer).await.unwrap(),
        Some(raum)
    );
}

#[tokio::test]
async fn gesperrte_einstellungen_erzeugen_gesperrten_raum() {
    let (engine, provider, db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;

    db.laden_oder_anlegen(server, besitzer).await.unwrap();
    db.aktualisieren(
        server,
        besitzer,
        EinstellungenUpdate {
            gesperrt: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;
    assert!(provider.kanal(raum).unwrap().ist_gesperrt());
}

#[tokio::test]
async fn leerer_raum_wird_nach_austritt_entfernt() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    provider.setze_aufenthalt(besitzer, None);
    engine
        .presence_wechsel(server, besitzer, Some(raum), None)
        .await
        .unwrap();

    assert!(!provider.kanal_existiert(raum));
    assert_eq!(provider.raum_von(besitzer), None);
}

#[tokio::test]
async fn belegter_raum_bleibt_nach_austritt_bestehen() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let gast = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    provider.setze_aufenthalt(gast, Some(raum));
    provider.setze_aufenthalt(besitzer, None);
    engine
        .presence_wechsel(server, besitzer, Some(raum), None)
        .await
        .unwrap();

    assert!(provider.kanal_existiert(raum));

    // Erst wenn der letzte Gast geht, verschwindet der Raum
    provider.setze_aufenthalt(gast, None);
    engine
        .presence_wechsel(server, gast, Some(raum), None)
        .await
        .unwrap();
    assert!(!provider.kanal_existiert(raum));
}

#[tokio::test]
async fn erstellerkanal_wird_nie_abgebaut() {
    let (engine, provider, db) = test_engine().await;
    let besucher = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;

    provider.setze_aufenthalt(besucher, Some(ersteller));
    provider.setze_aufenthalt(besucher, None);
    engine
        .presence_wechsel(server, besucher, Some(ersteller), None)
        .await
        .unwrap();

    assert!(provider.kanal_existiert(ersteller));
    assert!(RaumKonfigRepository::laden(&*db, server)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn geloeschter_erstellerkanal_deaktiviert_funktion() {
    let (engine, provider, db) = test_engine().await;
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;

    engine.kanal_geloescht(server, ersteller).await.unwrap();

    assert!(RaumKonfigRepository::laden(&*db, server)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn verschobener_erstellerkanal_deaktiviert_funktion() {
    let (engine, provider, db) = test_engine().await;
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;

    provider.extern_kategorie(ersteller, Some(ChannelId::new()));
    engine.kanal_aktualisiert(server, ersteller).await.unwrap();

    assert!(RaumKonfigRepository::laden(&*db, server)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn externe_umbenennung_wird_uebernommen() {
    let (engine, provider, db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    provider.extern_bearbeiten(
        raum,
        KanalAenderung {
            name: Some("Handkante".into()),
            ..Default::default()
        },
    );
    engine.kanal_aktualisiert(server, raum).await.unwrap();

    let record = RaumEinstellungenRepository::laden(&*db, server, besitzer)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.name.as_deref(), Some("Handkante"));
}

#[tokio::test]
async fn externer_override_wird_als_freigabe_uebernommen() {
    let (engine, provider, db) = test_engine().await;
    let besitzer = UserId::new();
    let gast = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    // Bann direkt in der Plattform-Oberflaeche gesetzt
    provider.extern_override(
        raum,
        OverrideEintrag {
            ziel: OverrideZiel::Mitglied(gast),
            connect: Some(false),
            vollzugriff: false,
        },
    );
    engine.kanal_aktualisiert(server, raum).await.unwrap();

    // Die externe Aenderung gewinnt: sie wird persistiert und bleibt
    // auf dem Kanal stehen
    let freigabe = FreigabeRepository::laden(&*db, server, besitzer, gast)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(freigabe.stufe, FreigabeStufe::Gebannt);
    let daten = provider.kanal(raum).unwrap();
    assert!(daten
        .overrides
        .iter()
        .any(|o| o.ziel == OverrideZiel::Mitglied(gast) && o.connect == Some(false)));
}

#[tokio::test]
async fn abgeraeumter_override_loescht_freigabe() {
    let (engine, provider, db) = test_engine().await;
    let besitzer = UserId::new();
    let gast = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    db.setzen(server, besitzer, gast, FreigabeStufe::Erlaubt)
        .await
        .unwrap();
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    // Der Override wird extern auf neutral gestellt
    provider.extern_override(
        raum,
        OverrideEintrag {
            ziel: OverrideZiel::Mitglied(gast),
            connect: None,
            vollzugriff: false,
        },
    );
    engine.kanal_aktualisiert(server, raum).await.unwrap();

    assert!(FreigabeRepository::laden(&*db, server, besitzer, gast)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn unauffindbarer_erstellerkanal_deaktiviert_funktion() {
    let (engine, provider, db) = test_engine().await;
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;

    // Kanal verschwindet, ohne dass ein Loesch-Ereignis eintrifft
    provider.kanal_loeschen(server, ersteller).await.unwrap();
    engine.kanal_aktualisiert(server, ersteller).await.unwrap();

    assert!(RaumKonfigRepository::laden(&*db, server)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn provider_fehler_bricht_transition_ab() {
    let (engine, provider, db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;

    provider.fehlschlag_aktivieren();
    provider.setze_aufenthalt(besitzer, Some(ersteller));
    let ergebnis = engine
        .presence_wechsel(server, besitzer, None, Some(ersteller))
        .await;

    assert!(ergebnis.is_err());
    // Die Konfiguration bleibt bestehen; nur die Transition scheitert
    assert!(RaumKonfigRepository::laden(&*db, server)
        .await
        .unwrap()
        .is_some());
}
