pub mod models;
pub mod repository;

pub use models::ParticipantRecord;
pub use repository::{InMemoryLedgerRepository, LedgerRepository, PostgresLedgerRepository};
