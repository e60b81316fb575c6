//! Broadcasts session expiry so owners can re-authenticate out-of-band.

use crate::error::Error;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Fan-out channel for session expiry events.
///
/// Any call which expects an authenticated response and instead observes a
/// not-logged-in marker emits one event here before returning its own error. Each
/// detection emits independently; if several concurrent calls notice the expiry, each
/// produces an event. This type only reports, it never attempts recovery.
#[derive(Debug, Clone, Default)]
pub struct SessionExpiryNotifier {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<Arc<Error>>>>>,
}

impl SessionExpiryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber. Dropping the receiver unregisters it.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Arc<Error>> {
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// Sends the error to every live subscriber. Closed subscribers are pruned.
    pub fn notify(&self, error: Error) {
        let error = Arc::new(error);
        let mut subscribers = self.subscribers.lock().unwrap();

        subscribers.retain(|tx| tx.send(Arc::clone(&error)).is_ok());
    }
}
