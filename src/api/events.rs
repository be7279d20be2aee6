use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    SignedIn { email: String },
    SignedOut,
}

/// Fan-out of session changes to every screen that cares (the conversation
/// list refreshes on sign-in and clears on sign-out).
#[derive(Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: SessionEvent) {
        log::debug!("session event: {:?}", event);
        // No subscribers is fine: nothing is listening yet.
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events_in_order() {
        let events = SessionEvents::new();
        let mut rx = events.subscribe();
        events.publish(SessionEvent::SignedIn { email: "a@b.c".into() });
        events.publish(SessionEvent::SignedOut);
        assert_eq!(
            rx.recv().await.unwrap(),
            SessionEvent::SignedIn { email: "a@b.c".into() }
        );
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedOut);
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        SessionEvents::new().publish(SessionEvent::SignedOut);
    }
}
