//! Eingehende Plattform-Ereignisse
//!
//! Die Engine reagiert auf drei Rohereignisse der Echtzeit-Plattform:
//! Presence-Wechsel (Voice-Kanal betreten/verlassen/gewechselt),
//! Kanal geloescht und Kanal aktualisiert. Jedes Ereignis wird von der
//! Dispatch-Schicht hoechstens einmal zugestellt, ohne Batching.

use crate::types::{ChannelId, ServerId, UserId};
use serde::{Deserialize, Serialize};

/// Ein Rohereignis der Plattform, wie es der Gateway-Adapter zustellt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "snake_case")]
pub enum PlattformEvent {
    /// Ein Benutzer hat den Voice-Kanal gewechselt.
    /// `von = None` bedeutet: war vorher in keinem Kanal,
    /// `nach = None` bedeutet: hat Voice komplett verlassen.
    PresenceWechsel {
        server_id: ServerId,
        user_id: UserId,
        von: Option<ChannelId>,
        nach: Option<ChannelId>,
    },

    /// Ein Kanal wurde geloescht (auch ausserhalb der Bot-Befehle)
    KanalGeloescht {
        server_id: ServerId,
        kanal_id: ChannelId,
    },

    /// Attribute oder Overrides eines Kanals wurden geaendert
    KanalAktualisiert {
        server_id: ServerId,
        kanal_id: ChannelId,
    },
}

impl PlattformEvent {
    /// Gibt die Server-ID zurueck, zu der das Ereignis gehoert
    pub fn server_id(&self) -> ServerId {
        match self {
            Self::PresenceWechsel { server_id, .. } => *server_id,
            Self::KanalGeloescht { server_id, .. } => *server_id,
            Self::KanalAktualisiert { server_id, .. } => *server_id,
        }
    }
}
