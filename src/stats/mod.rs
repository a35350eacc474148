pub mod handlers;
pub mod models;
pub mod service;

pub use models::{LeaderboardEntry, ParticipantStats, ServerStats};
pub use service::StatsService;
