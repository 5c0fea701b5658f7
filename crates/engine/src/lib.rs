//! Raumwart Engine
//!
//! Kernlogik der Privatraum-Verwaltung: Einstellungs-Aufloeser,
//! Freigaben-Diff, Lebenszyklus-Handler und Befehlsflaeche. Die Engine
//! spricht mit der Plattform ausschliesslich ueber den `VoiceProvider`
//! und mit der Persistenz ueber die Repository-Traits aus `raumwart-db`.

pub mod aufloeser;
pub mod befehle;
pub mod bestaetigung;
pub mod diff;
pub mod error;
pub mod provider;
pub mod sperren;

mod controller;
mod engine;

pub use aufloeser::{AufgeloesteEinstellungen, LiveRaum, Quelle};
pub use befehle::{BefehlsKontext, RaumBefehl};
pub use engine::RaumEngine;
pub use error::{RaumFehler, RaumResult};
pub use provider::{
    KanalAenderung, KanalDaten, KanalEntwurf, OverrideEintrag, OverrideZiel, ProviderFehler,
    ProviderResult, VoiceProvider,
};

#[cfg(test)]
mod tests;
