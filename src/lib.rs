// Library crate for the counting game server
// This file exposes the public API for integration tests

pub mod event;
pub mod expr;
pub mod game;
pub mod ledger;
pub mod notify;
pub mod settings;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use event::{EventBus, GameEvent};
pub use game::{
    ChatEvent, CountingEngine, CountingService, GameState, RoleDirective, RoleKind, Submission,
    SubmissionOutcome,
};
pub use ledger::{InMemoryLedgerRepository, LedgerRepository, ParticipantRecord};
pub use notify::{Notifier, NotifyError};
pub use settings::{GameSettings, InMemorySettingsStore, SettingsStore};
pub use shared::AppError;
pub use stats::StatsService;
