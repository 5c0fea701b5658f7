//! Die Raum-Engine: haelt Repositories, Provider und die beiden Register
//!
//! Die Engine ist generisch ueber ihre Abhaengigkeiten und wird als
//! `Arc<Self>` konstruiert. Die eigentliche Logik verteilt sich auf
//! drei Impl-Bloecke: Einstellungs-Aufloeser (`aufloeser`),
//! Lebenszyklus-Handler (`controller`) und Befehlsausfuehrung
//! (`befehle::executor`).

use std::sync::Arc;

use chrono::Duration;
use raumwart_db::{FreigabeRepository, RaumEinstellungenRepository, RaumKonfigRepository};

use crate::bestaetigung::BestaetigungsRegister;
use crate::provider::VoiceProvider;
use crate::sperren::SperrRegister;

/// Zentrale Engine fuer alle Raum-Transitionen und Befehle
pub struct RaumEngine<K, E, F, P>
where
    K: RaumKonfigRepository,
    E: RaumEinstellungenRepository,
    F: FreigabeRepository,
    P: VoiceProvider,
{
    pub(crate) konfig: Arc<K>,
    pub(crate) einstellungen: Arc<E>,
    pub(crate) freigaben: Arc<F>,
    pub(crate) provider: Arc<P>,
    pub(crate) sperren: SperrRegister,
    pub(crate) bestaetigungen: BestaetigungsRegister,
}

impl<K, E, F, P> RaumEngine<K, E, F, P>
where
    K: RaumKonfigRepository,
    E: RaumEinstellungenRepository,
    F: FreigabeRepository,
    P: VoiceProvider,
{
    /// Erstellt eine neue Engine mit dem Standard-Bestaetigungsfenster
    pub fn neu(
        konfig: Arc<K>,
        einstellungen: Arc<E>,
        freigaben: Arc<F>,
        provider: Arc<P>,
    ) -> Arc<Self> {
        Arc::new(Self {
            konfig,
            einstellungen,
            freigaben,
            provider,
            sperren: SperrRegister::neu(),
            bestaetigungen: BestaetigungsRegister::neu(),
        })
    }

    /// Wie `neu`, aber mit konfigurierbarem Bestaetigungsfenster
    pub fn mit_bestaetigungs_fenster(
        konfig: Arc<K>,
        einstellungen: Arc<E>,
        freigaben: Arc<F>,
        provider: Arc<P>,
        fenster: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            konfig,
            einstellungen,
            freigaben,
            provider,
            sperren: SperrRegister::neu(),
            bestaetigungen: BestaetigungsRegister::mit_fenster(fenster),
        })
    }
}
