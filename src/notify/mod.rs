//! Outbound notification boundary.
//!
//! The engine and service never talk to the chat platform directly; they
//! hand reactions, messages, and role changes to a [`Notifier`]. Delivery is
//! best-effort: a failure here never rolls back a game-state transition that
//! already happened.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::shared::{ChannelId, MessageId, ParticipantId, RoleId};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Participant {0} is no longer a member")]
    UnknownParticipant(ParticipantId),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), NotifyError>;

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), NotifyError>;

    async fn grant_role(
        &self,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), NotifyError>;

    async fn revoke_role(
        &self,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), NotifyError>;
}

/// Stand-in gateway adapter that logs outbound traffic.
///
/// A deployment wires the chat platform's client here; this implementation
/// keeps the service runnable without one.
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), NotifyError> {
        info!(channel, content, "Outbound message");
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), NotifyError> {
        info!(channel, message, emoji, "Outbound reaction");
        Ok(())
    }

    async fn grant_role(
        &self,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), NotifyError> {
        info!(participant, role, "Outbound role grant");
        Ok(())
    }

    async fn revoke_role(
        &self,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), NotifyError> {
        info!(participant, role, "Outbound role revoke");
        Ok(())
    }
}
