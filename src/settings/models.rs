use serde::{Deserialize, Serialize};

use crate::game::RoleKind;
use crate::shared::{ChannelId, RoleId};

/// Admin-set configuration, read by the engine as a snapshot per event.
///
/// Each role feature is enabled by configuring its id and disabled by
/// clearing it. Settings are read-mostly and live in their own store, apart
/// from the write-heavy game state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub channel_id: Option<ChannelId>,
    pub failed_role_id: Option<RoleId>,
    pub reliable_role_id: Option<RoleId>,
}

impl GameSettings {
    /// The configured platform role id behind a managed role, if enabled
    pub fn role_id(&self, kind: RoleKind) -> Option<RoleId> {
        match kind {
            RoleKind::Failed => self.failed_role_id,
            RoleKind::Reliable => self.reliable_role_id,
        }
    }

    /// Whether `channel` is the configured game channel
    pub fn is_game_channel(&self, channel: ChannelId) -> bool {
        self.channel_id == Some(channel)
    }
}
