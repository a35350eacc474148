use tokio::sync::broadcast;
use tracing::debug;

use super::events::GameEvent;

/// Event bus for distributing game events throughout the application
///
/// One deployment runs one game, so a single broadcast channel is enough;
/// subscribers that lag past the capacity lose the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GameEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emits an event to all subscribers
    pub fn emit(&self, event: GameEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receiver_count) => {
                debug!(event_type, receivers = receiver_count, "Game event emitted");
            }
            Err(_) => {
                debug!(event_type, "Game event emitted with no receivers");
            }
        }
    }

    /// Subscribe to game events
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }
}
