use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::shared::{ChannelId, MessageId, ParticipantId, RoleId};

pub const EMOJI_CELEBRATION: &str = "🎉";
pub const EMOJI_HUNDRED: &str = "💯";
pub const EMOJI_SMIRK: &str = "😏";
pub const EMOJI_OMINOUS: &str = "👹";
pub const EMOJI_CHECK: &str = "✅";
pub const EMOJI_CROSS: &str = "❌";

/// Inbound chat event as delivered by the platform gateway.
///
/// `member_role_ids` is the gateway's snapshot of the roles the author held
/// when the message arrived; the engine reads role membership from here
/// rather than keeping its own copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEvent {
    pub participant_id: ParticipantId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub text: String,
    #[serde(default)]
    pub member_role_ids: Vec<RoleId>,
    pub sent_at: DateTime<Utc>,
}

/// What the engine decided about one processed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// The count advanced; `emoji` is the reaction to put on the message.
    Accepted { count: u32, emoji: String },
    /// The submitted value was not `expected`; the count has been reset.
    WrongNumber { expected: u32 },
    /// Same participant twice in a row; the count has been reset.
    WrongContributor,
    /// The message did not read as a submission and was ignored.
    NotAnAttempt,
}

/// Why a count was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    WrongNumber,
    WrongContributor,
}

/// The two roles the game manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Failed,
    Reliable,
}

/// Role change requested by the engine, applied by the notifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RoleDirective {
    Grant {
        role: RoleKind,
        participant_id: ParticipantId,
    },
    Revoke {
        role: RoleKind,
        participant_id: ParticipantId,
    },
}

impl RoleDirective {
    pub fn role(&self) -> RoleKind {
        match self {
            RoleDirective::Grant { role, .. } => *role,
            RoleDirective::Revoke { role, .. } => *role,
        }
    }

    pub fn participant_id(&self) -> ParticipantId {
        match self {
            RoleDirective::Grant { participant_id, .. } => *participant_id,
            RoleDirective::Revoke { participant_id, .. } => *participant_id,
        }
    }
}

/// Engine verdict for one submission: the outcome plus any role changes that
/// follow from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub outcome: SubmissionOutcome,
    pub directives: Vec<RoleDirective>,
}

impl Submission {
    pub fn ignored() -> Self {
        Self {
            outcome: SubmissionOutcome::NotAnAttempt,
            directives: Vec::new(),
        }
    }
}
