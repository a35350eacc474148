use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use countup::event::EventBus;
use countup::game::{
    ChatEvent, CountingEngine, CountingService, GameState, InMemoryGameStateStore, Submission,
};
use countup::ledger::{InMemoryLedgerRepository, ParticipantRecord};
use countup::notify::{Notifier, NotifyError};
use countup::settings::{GameSettings, InMemorySettingsStore};
use countup::shared::{ChannelId, MessageId, ParticipantId, RoleId};

pub const GAME_CHANNEL: ChannelId = 1001;
pub const OTHER_CHANNEL: ChannelId = 2002;
pub const FAILED_ROLE: RoleId = 500;
pub const RELIABLE_ROLE: RoleId = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleChange {
    Granted(ParticipantId, RoleId),
    Revoked(ParticipantId, RoleId),
}

/// Notifier double that records all outbound traffic.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(ChannelId, String)>>,
    reactions: Mutex<Vec<(MessageId, String)>>,
    role_changes: Mutex<Vec<RoleChange>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(ChannelId, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn reactions(&self) -> Vec<(MessageId, String)> {
        self.reactions.lock().unwrap().clone()
    }

    pub fn role_changes(&self) -> Vec<RoleChange> {
        self.role_changes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, channel: ChannelId, content: &str) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .unwrap()
            .push((channel, content.to_string()));
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), NotifyError> {
        self.reactions
            .lock()
            .unwrap()
            .push((message, emoji.to_string()));
        Ok(())
    }

    async fn grant_role(
        &self,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), NotifyError> {
        self.role_changes
            .lock()
            .unwrap()
            .push(RoleChange::Granted(participant, role));
        Ok(())
    }

    async fn revoke_role(
        &self,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), NotifyError> {
        self.role_changes
            .lock()
            .unwrap()
            .push(RoleChange::Revoked(participant, role));
        Ok(())
    }
}

/// A wired-up counting game over in-memory stores.
pub struct TestSetup {
    pub service: CountingService,
    pub engine: Arc<CountingEngine>,
    pub ledger: Arc<InMemoryLedgerRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub event_bus: EventBus,
    next_message_id: AtomicU64,
}

impl TestSetup {
    /// Deliver a plain chat message to the game channel.
    pub async fn send(&self, participant: ParticipantId, text: &str) -> Option<Submission> {
        self.send_with_roles(participant, text, &[]).await
    }

    /// Deliver a chat message whose author holds the given roles.
    pub async fn send_with_roles(
        &self,
        participant: ParticipantId,
        text: &str,
        roles: &[RoleId],
    ) -> Option<Submission> {
        let event = self.chat_event(participant, text, roles, GAME_CHANNEL);
        self.service.handle_message(&event).await.unwrap()
    }

    /// Deliver a chat message to a channel other than the game channel.
    pub async fn send_off_channel(
        &self,
        participant: ParticipantId,
        text: &str,
    ) -> Option<Submission> {
        let event = self.chat_event(participant, text, &[], OTHER_CHANNEL);
        self.service.handle_message(&event).await.unwrap()
    }

    pub fn chat_event(
        &self,
        participant: ParticipantId,
        text: &str,
        roles: &[RoleId],
        channel: ChannelId,
    ) -> ChatEvent {
        ChatEvent {
            participant_id: participant,
            channel_id: channel,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
            text: text.to_string(),
            member_role_ids: roles.to_vec(),
            sent_at: Utc::now(),
        }
    }
}

/// Builder for wiring a test game with overrides.
pub struct TestSetupBuilder {
    settings: GameSettings,
    state: GameState,
    records: Vec<ParticipantRecord>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            settings: GameSettings {
                channel_id: Some(GAME_CHANNEL),
                ..GameSettings::default()
            },
            state: GameState::default(),
            records: Vec::new(),
        }
    }

    pub fn with_failed_role(mut self) -> Self {
        self.settings.failed_role_id = Some(FAILED_ROLE);
        self
    }

    pub fn with_reliable_role(mut self) -> Self {
        self.settings.reliable_role_id = Some(RELIABLE_ROLE);
        self
    }

    pub fn with_state(mut self, state: GameState) -> Self {
        self.state = state;
        self
    }

    pub fn with_record(mut self, record: ParticipantRecord) -> Self {
        self.records.push(record);
        self
    }

    pub async fn build(self) -> TestSetup {
        let ledger = Arc::new(InMemoryLedgerRepository::new());
        for record in self.records {
            ledger.insert_record(record).await;
        }

        let store = Arc::new(InMemoryGameStateStore::with_state(self.state));
        let engine = Arc::new(
            CountingEngine::restore(store, ledger.clone())
                .await
                .unwrap(),
        );

        let notifier = Arc::new(RecordingNotifier::default());
        let event_bus = EventBus::new(64);
        let service = CountingService::new(
            engine.clone(),
            Arc::new(InMemorySettingsStore::with_settings(self.settings)),
            notifier.clone(),
            event_bus.clone(),
        );

        TestSetup {
            service,
            engine,
            ledger,
            notifier,
            event_bus,
            next_message_id: AtomicU64::new(9000),
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
