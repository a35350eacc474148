use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::event::{EventBus, GameEvent};
use crate::expr;
use crate::notify::Notifier;
use crate::settings::{GameSettings, SettingsStore};
use crate::shared::{AppError, ParticipantId};

use super::engine::CountingEngine;
use super::models::{
    ChatEvent, FailureReason, RoleDirective, Submission, SubmissionOutcome, EMOJI_CROSS,
};

/// Front door for gateway events.
///
/// Filters events down to the configured game channel, drives the engine,
/// and turns its verdicts into outbound traffic: reactions, channel
/// messages, and role changes. Delivery failures are logged and dropped —
/// the engine's transition already happened and is the authoritative
/// outcome.
pub struct CountingService {
    engine: Arc<CountingEngine>,
    settings: Arc<dyn SettingsStore>,
    notifier: Arc<dyn Notifier>,
    event_bus: EventBus,
}

impl CountingService {
    pub fn new(
        engine: Arc<CountingEngine>,
        settings: Arc<dyn SettingsStore>,
        notifier: Arc<dyn Notifier>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            engine,
            settings,
            notifier,
            event_bus,
        }
    }

    /// Process one inbound chat message.
    ///
    /// Returns `None` when the message is outside the game channel (or no
    /// channel is configured yet) and was not looked at.
    #[instrument(skip(self, event), fields(participant_id = event.participant_id))]
    pub async fn handle_message(&self, event: &ChatEvent) -> Result<Option<Submission>, AppError> {
        let settings = self.settings.get().await;
        if !settings.is_game_channel(event.channel_id) {
            return Ok(None);
        }

        let submission = self
            .engine
            .submit(
                &settings,
                event.participant_id,
                &event.text,
                &event.member_role_ids,
            )
            .await?;

        match &submission.outcome {
            SubmissionOutcome::NotAnAttempt => {}
            SubmissionOutcome::Accepted { count, emoji } => {
                self.react(event, emoji).await;
                self.event_bus.emit(GameEvent::CountAdvanced {
                    participant_id: event.participant_id,
                    count: *count,
                    emoji: emoji.clone(),
                });
            }
            SubmissionOutcome::WrongNumber { expected } => {
                let high_score = self.engine.snapshot().await.high_score;
                self.react(event, EMOJI_CROSS).await;
                self.send(
                    event,
                    &wrong_number_message(event.participant_id, *expected, high_score),
                )
                .await;
                self.event_bus.emit(GameEvent::CountBroken {
                    participant_id: event.participant_id,
                    reason: FailureReason::WrongNumber,
                    high_score,
                });
            }
            SubmissionOutcome::WrongContributor => {
                let state = self.engine.snapshot().await;
                self.react(event, EMOJI_CROSS).await;
                self.send(
                    event,
                    &wrong_contributor_message(event.participant_id, state.high_score),
                )
                .await;
                self.event_bus.emit(GameEvent::CountBroken {
                    participant_id: event.participant_id,
                    reason: FailureReason::WrongContributor,
                    high_score: state.high_score,
                });
            }
        }

        self.apply_directives(&settings, &submission.directives)
            .await;

        Ok(Some(submission))
    }

    /// Post a notice when a reacted-to submission disappears.
    #[instrument(skip(self, event), fields(participant_id = event.participant_id))]
    pub async fn handle_message_deleted(&self, event: &ChatEvent) -> Result<bool, AppError> {
        self.handle_retraction(event, "deleted").await
    }

    /// Post a notice when a reacted-to submission changes.
    #[instrument(skip(self, event), fields(participant_id = event.participant_id))]
    pub async fn handle_message_edited(&self, event: &ChatEvent) -> Result<bool, AppError> {
        self.handle_retraction(event, "edited").await
    }

    async fn handle_retraction(&self, event: &ChatEvent, verb: &str) -> Result<bool, AppError> {
        let settings = self.settings.get().await;
        if !settings.is_game_channel(event.channel_id) {
            return Ok(false);
        }
        if !expr::is_candidate(&event.text) {
            return Ok(false);
        }

        let next = self.engine.snapshot().await.next_expected();
        self.send(
            event,
            &format!(
                "<@{}> {verb} their number! The **next** number is **{next}**.",
                event.participant_id
            ),
        )
        .await;
        Ok(true)
    }

    /// Announce on startup where the count stands, when there is a game in
    /// progress to resume.
    pub async fn announce_online(&self) {
        let settings = self.settings.get().await;
        let state = self.engine.snapshot().await;

        let (Some(channel), Some(contributor)) = (settings.channel_id, state.current_contributor)
        else {
            return;
        };

        let content = format!(
            "I'm now online! Last counted by <@{contributor}>. The **next** number is **{}**.",
            state.next_expected()
        );
        if let Err(error) = self.notifier.send_message(channel, &content).await {
            warn!(%error, channel, "Online announcement dropped");
        }
    }

    async fn react(&self, event: &ChatEvent, emoji: &str) {
        if let Err(error) = self
            .notifier
            .add_reaction(event.channel_id, event.message_id, emoji)
            .await
        {
            warn!(%error, message_id = event.message_id, emoji, "Reaction dropped");
        }
    }

    async fn send(&self, event: &ChatEvent, content: &str) {
        if let Err(error) = self.notifier.send_message(event.channel_id, content).await {
            warn!(%error, channel_id = event.channel_id, "Message dropped");
        }
    }

    /// Forward role changes to the platform. Failures (missing permissions,
    /// departed members) are non-fatal: the directive is dropped and the
    /// game state keeps the transition it already made.
    async fn apply_directives(&self, settings: &GameSettings, directives: &[RoleDirective]) {
        for directive in directives {
            let kind = directive.role();
            let participant = directive.participant_id();

            let Some(role_id) = settings.role_id(kind) else {
                warn!(participant, role = %kind, "Role no longer configured, directive dropped");
                continue;
            };

            let result = match directive {
                RoleDirective::Grant { .. } => self.notifier.grant_role(participant, role_id).await,
                RoleDirective::Revoke { .. } => {
                    self.notifier.revoke_role(participant, role_id).await
                }
            };

            match result {
                Ok(()) => {
                    debug!(participant, role = %kind, "Role directive applied");
                    self.event_bus.emit(match directive {
                        RoleDirective::Grant { .. } => GameEvent::RoleGranted {
                            participant_id: participant,
                            role: kind,
                        },
                        RoleDirective::Revoke { .. } => GameEvent::RoleRevoked {
                            participant_id: participant,
                            role: kind,
                        },
                    });
                }
                Err(error) => {
                    warn!(%error, participant, role = %kind, "Role directive dropped");
                }
            }
        }
    }
}

fn wrong_number_message(participant: ParticipantId, expected: u32, high_score: u32) -> String {
    format!(
        "<@{participant}> messed up the count! The correct number was {expected}.\n\
         Restart from **1** and try to beat the current high score of **{high_score}**!"
    )
}

fn wrong_contributor_message(participant: ParticipantId, high_score: u32) -> String {
    format!(
        "<@{participant}> messed up the count! You cannot count two numbers in a row!\n\
         Restart from **1** and try to beat the current high score of **{high_score}**!"
    )
}
