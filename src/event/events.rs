use serde::Serialize;

use crate::game::{FailureReason, RoleKind};
use crate::shared::ParticipantId;

/// Events that can occur in the counting game
///
/// Events represent facts about things that have already happened. They are
/// used to communicate state changes between different parts of the system
/// without tight coupling.
#[derive(Debug, Clone, Serialize)]
pub enum GameEvent {
    /// A submission was accepted and the count moved forward
    CountAdvanced {
        participant_id: ParticipantId,
        count: u32,
        emoji: String,
    },

    /// A submission broke the count; the game reset to zero
    CountBroken {
        participant_id: ParticipantId,
        reason: FailureReason,
        high_score: u32,
    },

    /// A role directive was delivered to the platform
    RoleGranted {
        participant_id: ParticipantId,
        role: RoleKind,
    },

    /// A role was taken back
    RoleRevoked {
        participant_id: ParticipantId,
        role: RoleKind,
    },
}

impl GameEvent {
    /// Get a human-readable description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::CountAdvanced { .. } => "count_advanced",
            GameEvent::CountBroken { .. } => "count_broken",
            GameEvent::RoleGranted { .. } => "role_granted",
            GameEvent::RoleRevoked { .. } => "role_revoked",
        }
    }
}
