// Public API
pub use engine::CountingEngine;
pub use models::{
    ChatEvent, FailureReason, RoleDirective, RoleKind, Submission, SubmissionOutcome,
};
pub use service::CountingService;
pub use state::{
    GameState, GameStateStore, InMemoryGameStateStore, JsonFileGameStateStore,
};

pub mod handlers;
pub mod models;
pub mod policy;
pub mod state;

mod engine;
mod service;
