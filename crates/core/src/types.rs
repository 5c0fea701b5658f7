//! Gemeinsame Identifikationstypen fuer Raumwart
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen. Die IDs stammen
//! von der Plattform und werden hier nur getragen, nie interpretiert.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Server-ID (ein Server = eine Community auf der Plattform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerId(pub Uuid);

impl ServerId {
    /// Erstellt eine neue zufaellige ServerId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ServerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "server:{}", self.0)
    }
}

/// Eindeutige Kanal-ID (Voice-Kanaele und Kategorien)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub Uuid);

impl ChannelId {
    /// Erstellt eine neue zufaellige ChannelId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "channel:{}", self.0)
    }
}

/// Eindeutige Benutzer-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Erstellt eine neue zufaellige UserId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.0)
    }
}

/// Schluessel eines Privatraums: pro (Server, Besitzer) existiert hoechstens
/// ein lebender Raum. Saemtliche Sperren und persistierten Datensaetze sind
/// unter diesem Schluessel abgelegt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RaumSchluessel {
    pub server_id: ServerId,
    pub besitzer_id: UserId,
}

impl RaumSchluessel {
    pub fn neu(server_id: ServerId, besitzer_id: UserId) -> Self {
        Self {
            server_id,
            besitzer_id,
        }
    }
}

impl std::fmt::Display for RaumSchluessel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "raum:{}/{}", self.server_id.0, self.besitzer_id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_id_eindeutig() {
        let a = ServerId::new();
        let b = ServerId::new();
        assert_ne!(a, b, "Zwei neue ServerIds muessen verschieden sein");
    }

    #[test]
    fn channel_id_display() {
        let id = ChannelId(Uuid::nil());
        assert!(id.to_string().starts_with("channel:"));
    }

    #[test]
    fn ids_sind_serde_kompatibel() {
        let uid = UserId::new();
        let json = serde_json::to_string(&uid).unwrap();
        let uid2: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(uid, uid2);
    }

    #[test]
    fn raumschluessel_gleichheit() {
        let server = ServerId::new();
        let besitzer = UserId::new();
        let a = RaumSchluessel::neu(server, besitzer);
        let b = RaumSchluessel::neu(server, besitzer);
        assert_eq!(a, b);
        assert_ne!(a, RaumSchluessel::neu(server, UserId::new()));
    }
}
