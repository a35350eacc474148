use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::shared::{AppError, ChannelId, RoleId};

use super::models::GameSettings;

/// Trait for reading and mutating the game settings
///
/// `get` is infallible: stores keep a cached snapshot and only touch their
/// backing medium on mutation.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self) -> GameSettings;
    async fn set_channel(&self, channel: ChannelId) -> Result<GameSettings, AppError>;
    async fn set_failed_role(&self, role: Option<RoleId>) -> Result<GameSettings, AppError>;
    async fn set_reliable_role(&self, role: Option<RoleId>) -> Result<GameSettings, AppError>;
}

/// JSON-file implementation of [`SettingsStore`].
///
/// The file is the durable copy; an in-process cache serves reads. Mutations
/// persist first (temp file + rename) and only then replace the cache, so
/// the cache never gets ahead of the file.
pub struct JsonFileSettingsStore {
    path: PathBuf,
    cached: RwLock<GameSettings>,
}

impl JsonFileSettingsStore {
    /// Read settings from `path`, writing defaults on first run.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let settings = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                warn!(error = %e, path = %path.display(), "Failed to parse settings");
                AppError::Storage(e.to_string())
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file, writing defaults");
                let settings = GameSettings::default();
                persist_to(&path, &settings).await?;
                settings
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to read settings");
                return Err(AppError::Storage(e.to_string()));
            }
        };

        Ok(Self {
            path,
            cached: RwLock::new(settings),
        })
    }

    #[instrument(skip(self, mutate))]
    async fn update<F>(&self, mutate: F) -> Result<GameSettings, AppError>
    where
        F: FnOnce(&mut GameSettings) + Send,
    {
        let mut cached = self.cached.write().await;
        let mut next = cached.clone();
        mutate(&mut next);
        persist_to(&self.path, &next).await?;
        *cached = next.clone();

        debug!(path = %self.path.display(), "Settings updated");
        Ok(next)
    }
}

async fn persist_to(path: &Path, settings: &GameSettings) -> Result<(), AppError> {
    let contents = serde_json::to_vec_pretty(settings).map_err(|e| {
        warn!(error = %e, "Failed to serialize settings");
        AppError::Storage(e.to_string())
    })?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &contents).await.map_err(|e| {
        warn!(error = %e, path = %tmp.display(), "Failed to write settings");
        AppError::Storage(e.to_string())
    })?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| {
        warn!(error = %e, path = %path.display(), "Failed to replace settings file");
        AppError::Storage(e.to_string())
    })?;
    Ok(())
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn get(&self) -> GameSettings {
        self.cached.read().await.clone()
    }

    async fn set_channel(&self, channel: ChannelId) -> Result<GameSettings, AppError> {
        self.update(|settings| settings.channel_id = Some(channel))
            .await
    }

    async fn set_failed_role(&self, role: Option<RoleId>) -> Result<GameSettings, AppError> {
        self.update(|settings| settings.failed_role_id = role).await
    }

    async fn set_reliable_role(&self, role: Option<RoleId>) -> Result<GameSettings, AppError> {
        self.update(|settings| settings.reliable_role_id = role)
            .await
    }
}

/// In-memory implementation of [`SettingsStore`] for development and testing
pub struct InMemorySettingsStore {
    settings: RwLock<GameSettings>,
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(GameSettings::default()),
        }
    }

    /// Creates a store pre-populated with the given settings
    pub fn with_settings(settings: GameSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self) -> GameSettings {
        self.settings.read().await.clone()
    }

    async fn set_channel(&self, channel: ChannelId) -> Result<GameSettings, AppError> {
        let mut settings = self.settings.write().await;
        settings.channel_id = Some(channel);
        Ok(settings.clone())
    }

    async fn set_failed_role(&self, role: Option<RoleId>) -> Result<GameSettings, AppError> {
        let mut settings = self.settings.write().await;
        settings.failed_role_id = role;
        Ok(settings.clone())
    }

    async fn set_reliable_role(&self, role: Option<RoleId>) -> Result<GameSettings, AppError> {
        let mut settings = self.settings.write().await;
        settings.reliable_role_id = role;
        Ok(settings.clone())
    }
}
