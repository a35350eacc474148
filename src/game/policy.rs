//! Role-transition rules.
//!
//! Pure functions from the current settings, game state, and submission
//! context to role directives. All I/O — persisting the state, delivering
//! the grants and revokes — belongs to the engine and the notifier.

use crate::settings::GameSettings;
use crate::shared::{ParticipantId, RoleId};

use super::models::{RoleDirective, RoleKind};
use super::state::GameState;

/// Consecutive correct submissions a failed participant needs to shed the
/// failed role.
pub const REDEMPTION_TARGET: u32 = 30;

/// Cumulative score at which the reliable role is granted, and below which
/// it is taken back.
pub const RELIABLE_SCORE_THRESHOLD: i32 = 100;

/// Failure transition: tag the offender with the failed role (when the
/// feature is configured), releasing the previous holder, then reset the
/// count.
pub fn apply_failure(
    settings: &GameSettings,
    state: &mut GameState,
    offender: ParticipantId,
) -> Vec<RoleDirective> {
    let mut directives = Vec::new();

    if settings.failed_role_id.is_some() {
        if let Some(previous) = state.failed_participant {
            if previous != offender {
                directives.push(RoleDirective::Revoke {
                    role: RoleKind::Failed,
                    participant_id: previous,
                });
            }
        }
        directives.push(RoleDirective::Grant {
            role: RoleKind::Failed,
            participant_id: offender,
        });
        state.failed_participant = Some(offender);
    }

    state.reset();
    directives
}

/// Redemption progress for a currently-failed participant who just counted
/// correctly. Thirty in a row lifts the role.
pub fn apply_redemption(
    settings: &GameSettings,
    state: &mut GameState,
    participant: ParticipantId,
    member_roles: &[RoleId],
) -> Option<RoleDirective> {
    let failed_role_id = settings.failed_role_id?;
    if !member_roles.contains(&failed_role_id) {
        return None;
    }

    state.redemption_progress += 1;
    if state.redemption_progress < REDEMPTION_TARGET {
        return None;
    }

    state.failed_participant = None;
    state.redemption_progress = 0;
    Some(RoleDirective::Revoke {
        role: RoleKind::Failed,
        participant_id: participant,
    })
}

/// Reliable-role threshold check, evaluated against the score after this
/// submission's increment. At most one directive.
pub fn reliable_directive(
    settings: &GameSettings,
    participant: ParticipantId,
    updated_score: i32,
    member_roles: &[RoleId],
) -> Option<RoleDirective> {
    let reliable_role_id = settings.reliable_role_id?;
    let holds_role = member_roles.contains(&reliable_role_id);

    if updated_score >= RELIABLE_SCORE_THRESHOLD && !holds_role {
        Some(RoleDirective::Grant {
            role: RoleKind::Reliable,
            participant_id: participant,
        })
    } else if updated_score < RELIABLE_SCORE_THRESHOLD && holds_role {
        Some(RoleDirective::Revoke {
            role: RoleKind::Reliable,
            participant_id: participant,
        })
    } else {
        None
    }
}
