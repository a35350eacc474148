pub mod handlers;
pub mod models;
pub mod store;

pub use models::GameSettings;
pub use store::{InMemorySettingsStore, JsonFileSettingsStore, SettingsStore};
