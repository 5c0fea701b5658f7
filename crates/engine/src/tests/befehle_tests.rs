//! Tests fuer die Befehlsflaeche

use raumwart_core::types::{ServerId, UserId};
use raumwart_db::models::FreigabeStufe;
use raumwart_db::{FreigabeRepository, RaumEinstellungenRepository, RaumKonfigRepository};

use crate::aufloeser::Quelle;
use crate::befehle::{BefehlsKontext, RaumBefehl};
use crate::error::RaumFehler;
use crate::provider::{OverrideZiel, VoiceProvider};

use super::{raum_erstellen, server_aktivieren, test_engine, TestEngine};

fn kontext(server_id: ServerId, aufrufer: UserId) -> BefehlsKontext {
    BefehlsKontext {
        server_id,
        aufrufer,
    }
}

async fn befehl(
    engine: &TestEngine,
    server: ServerId,
    aufrufer: UserId,
    befehl: RaumBefehl,
) -> Result<String, RaumFehler> {
    engine.ausfuehren(befehl, kontext(server, aufrufer)).await
}

#[tokio::test]
async fn befehl_ohne_aktivierung_schlaegt_fehl() {
    let (engine, _provider, _db) = test_engine().await;

    let ergebnis = befehl(&engine, ServerId::new(), UserId::new(), RaumBefehl::Sperren).await;
    assert!(matches!(ergebnis, Err(RaumFehler::Voraussetzung(_))));
}

#[tokio::test]
async fn sperren_ohne_raum_legt_keine_zeile_an() {
    let (engine, provider, db) = test_engine().await;
    let benutzer = UserId::new();
    let (server, _, _) = server_aktivieren(&engine, &provider, UserId::new()).await;

    let ergebnis = befehl(&engine, server, benutzer, RaumBefehl::Sperren).await;

    assert!(matches!(ergebnis, Err(RaumFehler::Voraussetzung(_))));
    assert!(RaumEinstellungenRepository::laden(&*db, server, benutzer)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn status_funktioniert_ohne_raum() {
    let (engine, provider, _db) = test_engine().await;
    let benutzer = UserId::new();
    provider.setze_anzeigename(benutzer, "Moritz");
    let (server, _, _) = server_aktivieren(&engine, &provider, UserId::new()).await;

    let text = befehl(&engine, server, benutzer, RaumBefehl::Status)
        .await
        .unwrap();
    assert!(text.contains("Raum: keiner"));
    assert!(text.contains("Moritz"));
    assert!(text.contains("unbegrenzt"));
}

#[tokio::test]
async fn sperren_und_entsperren_spiegeln_live() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    befehl(&engine, server, besitzer, RaumBefehl::Sperren)
        .await
        .unwrap();
    assert!(provider.kanal(raum).unwrap().ist_gesperrt());

    // Wiederholtes Sperren ist wirkungslos und wird abgelehnt
    let nochmal = befehl(&engine, server, besitzer, RaumBefehl::Sperren).await;
    assert!(matches!(nochmal, Err(RaumFehler::Validierung(_))));

    befehl(&engine, server, besitzer, RaumBefehl::Entsperren)
        .await
        .unwrap();
    assert!(!provider.kanal(raum).unwrap().ist_gesperrt());
}

#[tokio::test]
async fn limit_grenzen_und_wirkungslosigkeit() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    // 100 liegt ausserhalb des Wertebereichs
    let zu_gross = befehl(&engine, server, besitzer, RaumBefehl::Limit { limit: 100 }).await;
    assert!(matches!(zu_gross, Err(RaumFehler::Validierung(_))));

    // 0 ist der aktuelle Wert und damit wirkungslos
    let wirkungslos = befehl(&engine, server, besitzer, RaumBefehl::Limit { limit: 0 }).await;
    assert!(matches!(wirkungslos, Err(RaumFehler::Validierung(_))));

    // 99 ist die obere Grenze
    befehl(&engine, server, besitzer, RaumBefehl::Limit { limit: 99 })
        .await
        .unwrap();
    assert_eq!(provider.kanal(raum).unwrap().user_limit, 99);

    // 0 ist jetzt eine echte Aenderung
    befehl(&engine, server, besitzer, RaumBefehl::Limit { limit: 0 })
        .await
        .unwrap();
    assert_eq!(provider.kanal(raum).unwrap().user_limit, 0);
}

#[tokio::test]
async fn name_validierung() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    let leer = befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Name {
            name: Some("   ".into()),
        },
    )
    .await;
    assert!(matches!(leer, Err(RaumFehler::Validierung(_))));

    let zu_lang = befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Name {
            name: Some("x".repeat(33)),
        },
    )
    .await;
    assert!(matches!(zu_lang, Err(RaumFehler::Validierung(_))));

    // Ruecksetzen ohne eigenen Namen ist wirkungslos
    let zuruecksetzen = befehl(&engine, server, besitzer, RaumBefehl::Name { name: None }).await;
    assert!(matches!(zuruecksetzen, Err(RaumFehler::Validierung(_))));
}

#[tokio::test]
async fn einstellungen_roundtrip_ueber_lebenden_raum() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Name {
            name: Some("Geheimtreff".into()),
        },
    )
    .await
    .unwrap();
    befehl(&engine, server, besitzer, RaumBefehl::Limit { limit: 5 })
        .await
        .unwrap();
    befehl(&engine, server, besitzer, RaumBefehl::Bitrate { kbps: 96 })
        .await
        .unwrap();
    befehl(&engine, server, besitzer, RaumBefehl::Sperren)
        .await
        .unwrap();

    // Der lebende Kanal traegt alle vier Einstellungen
    let daten = provider.kanal(raum).unwrap();
    assert_eq!(daten.name, "Geheimtreff");
    assert_eq!(daten.user_limit, 5);
    assert_eq!(daten.bitrate, 96);
    assert!(daten.ist_gesperrt());

    // Die Aufloesung liefert dieselben Werte aus dem Live-Zweig
    let aufgeloest = engine.aufloesen(server, besitzer).await.unwrap();
    assert_eq!(aufgeloest.quelle, Quelle::Live);
    assert_eq!(aufgeloest.einstellungen.name.as_deref(), Some("Geheimtreff"));
    assert_eq!(aufgeloest.einstellungen.user_limit, 5);
    assert_eq!(aufgeloest.einstellungen.bitrate, 96);
    assert!(aufgeloest.einstellungen.gesperrt);
}

#[tokio::test]
async fn bitrate_grenzen() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    let zu_klein = befehl(&engine, server, besitzer, RaumBefehl::Bitrate { kbps: 7 }).await;
    assert!(matches!(zu_klein, Err(RaumFehler::Validierung(_))));

    // Fake-Server erlaubt maximal 128 kbit/s
    let zu_gross = befehl(&engine, server, besitzer, RaumBefehl::Bitrate { kbps: 129 }).await;
    assert!(matches!(zu_gross, Err(RaumFehler::Validierung(_))));

    befehl(&engine, server, besitzer, RaumBefehl::Bitrate { kbps: 128 })
        .await
        .unwrap();
}

#[tokio::test]
async fn kick_entfernt_nur_anwesende() {
    let (engine, provider, _db) = test_engine().await;
    let besitzer = UserId::new();
    let gast = UserId::new();
    let abwesend = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;
    provider.setze_aufenthalt(gast, Some(raum));

    let nicht_da = befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Kick { user_id: abwesend },
    )
    .await;
    assert!(matches!(nicht_da, Err(RaumFehler::Validierung(_))));

    let selbst = befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Kick { user_id: besitzer },
    )
    .await;
    assert!(matches!(selbst, Err(RaumFehler::Validierung(_))));

    befehl(&engine, server, besitzer, RaumBefehl::Kick { user_id: gast })
        .await
        .unwrap();
    assert_eq!(provider.aufenthalt(server, gast).await.unwrap(), None);
}

#[tokio::test]
async fn bannen_setzt_override_und_trennt_ziel() {
    let (engine, provider, db) = test_engine().await;
    let besitzer = UserId::new();
    let gast = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;
    provider.setze_aufenthalt(gast, Some(raum));

    befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Bannen { user_id: gast },
    )
    .await
    .unwrap();

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
    // Der Gebannte wurde aus dem Raum getrennt
    assert_eq!(provider.aufenthalt(server, gast).await.unwrap(), None);

    // Zweiter Bann ist wirkungslos
    let nochmal = befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Bannen { user_id: gast },
    )
    .await;
    assert!(matches!(nochmal, Err(RaumFehler::Validierung(_))));
}

#[tokio::test]
async fn freigabe_entfernen_loescht_zeile_und_override() {
    let (engine, provider, db) = test_engine().await;
    let besitzer = UserId::new();
    let gast = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Erlauben { user_id: gast },
    )
    .await
    .unwrap();
    befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::FreigabeEntfernen { user_id: gast },
    )
    .await
    .unwrap();

    assert!(FreigabeRepository::laden(&*db, server, besitzer, gast)
        .await
        .unwrap()
        .is_none());
    assert!(!provider
        .kanal(raum)
        .unwrap()
        .overrides
        .iter()
        .any(|o| o.ziel == OverrideZiel::Mitglied(gast)));

    // Ohne gespeicherte Freigabe ist das Entfernen wirkungslos
    let nochmal = befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::FreigabeEntfernen { user_id: gast },
    )
    .await;
    assert!(matches!(nochmal, Err(RaumFehler::Validierung(_))));
}

#[tokio::test]
async fn zuruecksetzen_stellt_standard_her() {
    let (engine, provider, db) = test_engine().await;
    let besitzer = UserId::new();
    let gast = UserId::new();
    provider.setze_anzeigename(besitzer, "Moritz");
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, UserId::new()).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Name {
            name: Some("Geheimtreff".into()),
        },
    )
    .await
    .unwrap();
    befehl(&engine, server, besitzer, RaumBefehl::Limit { limit: 5 })
        .await
        .unwrap();
    befehl(
        &engine,
        server,
        besitzer,
        RaumBefehl::Erlauben { user_id: gast },
    )
    .await
    .unwrap();

    befehl(&engine, server, besitzer, RaumBefehl::Zuruecksetzen)
        .await
        .unwrap();

    let aufgeloest = engine.aufloesen(server, besitzer).await.unwrap();
    assert!(aufgeloest.einstellungen.ist_standard());
    assert!(db.alle(server, besitzer).await.unwrap().is_empty());

    let daten = provider.kanal(raum).unwrap();
    assert_eq!(daten.name, "Moritz");
    assert_eq!(daten.user_limit, 0);
    assert_eq!(daten.bitrate, 64);
    assert!(!daten.ist_gesperrt());
    assert!(!daten
        .overrides
        .iter()
        .any(|o| o.ziel == OverrideZiel::Mitglied(gast)));

    // Alles steht auf Standard; erneutes Zuruecksetzen ist wirkungslos
    let nochmal = befehl(&engine, server, besitzer, RaumBefehl::Zuruecksetzen).await;
    assert!(matches!(nochmal, Err(RaumFehler::Validierung(_))));
}

#[tokio::test]
async fn deaktivieren_verlangt_bestaetigung() {
    let (engine, provider, db) = test_engine().await;
    let admin = UserId::new();
    let besitzer = UserId::new();
    let (server, ersteller, _) = server_aktivieren(&engine, &provider, admin).await;
    let raum = raum_erstellen(&engine, &provider, server, ersteller, besitzer).await;

    // Bestaetigen ohne Anforderung
    let ohne = befehl(&engine, server, admin, RaumBefehl::DeaktivierenBestaetigen).await;
    assert!(matches!(ohne, Err(RaumFehler::Voraussetzung(_))));

    befehl(&engine, server, admin, RaumBefehl::Deaktivieren)
        .await
        .unwrap();
    // Die Anforderung allein aendert nichts
    assert!(RaumKonfigRepository::laden(&*db, server)
        .await
        .unwrap()
        .is_some());
    assert!(provider.kanal_existiert(raum));

    befehl(&engine, server, admin, RaumBefehl::DeaktivierenBestaetigen)
        .await
        .unwrap();
    assert!(RaumKonfigRepository::laden(&*db, server)
        .await
        .unwrap()
        .is_none());
    // Verwaltete Raeume sind weg, der Erstellerkanal bleibt
    assert!(!provider.kanal_existiert(raum));
    assert!(provider.kanal_existiert(ersteller));
}

#[tokio::test]
async fn deaktivieren_abbrechen_verwirft_anforderung() {
    let (engine, provider, db) = test_engine().await;
    let admin = UserId::new();
    let (server, _, _) = server_aktivieren(&engine, &provider, admin).await;

    let ohne = befehl(&engine, server, admin, RaumBefehl::DeaktivierenAbbrechen).await;
    assert!(matches!(ohne, Err(RaumFehler::Voraussetzung(_))));

    befehl(&engine, server, admin, RaumBefehl::Deaktivieren)
        .await
        .unwrap();
    befehl(&engine, server, admin, RaumBefehl::DeaktivierenAbbrechen)
        .await
        .unwrap();

    // Nach dem Abbruch ist die Bestaetigung verbraucht
    let danach = befehl(&engine, server, admin, RaumBefehl::DeaktivierenBestaetigen).await;
    assert!(matches!(danach, Err(RaumFehler::Voraussetzung(_))));
    assert!(RaumKonfigRepository::laden(&*db, server)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn aktivieren_verlangt_kategorie() {
    let (engine, provider, _db) = test_engine().await;
    let server = ServerId::new();
    let ohne_kategorie = provider.kanal_anlegen("Lobby", None);

    let ergebnis = engine
        .ausfuehren(
            RaumBefehl::Aktivieren {
                kanal_id: ohne_kategorie,
            },
            kontext(server, UserId::new()),
        )
        .await;
    assert!(matches!(ergebnis, Err(RaumFehler::Validierung(_))));
}
