//! Process-local feed of committed ledger events.

use std::sync::{Mutex, mpsc};

use crate::bus::{EventBus, Subscription};

#[derive(Debug)]
pub enum InMemoryBusError {
    /// The feed list lock was poisoned by a panicking publisher. The write that triggered
    /// the publish is already committed; only the notification is lost.
    Poisoned,
}

/// Ledger event feed kept in process memory.
///
/// The service layer publishes here only after a registration or sale has been committed
/// to the backend, so a message always describes a record that exists. Delivery is
/// best-effort:
///
/// - each live subscription gets its own copy, in publish order
/// - a subscription sees only events published after it was taken; there is no replay
/// - a subscription whose receiver was dropped is detached on the next publish
///
/// Nothing here is durable. A restart, or a poisoned lock, loses notifications but never
/// ledger records.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    feeds: Mutex<Vec<mpsc::Sender<M>>>,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscriptions still attached as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.feeds.lock().map(|feeds| feeds.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            feeds: Mutex::new(Vec::new()),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    /// Hand `message` to every attached subscription. Succeeds with no subscribers at all.
    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut feeds = self.feeds.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        feeds.retain(|feed| feed.send(message.clone()).is_ok());
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (feed, receiver) = mpsc::channel();

        // Poisoned: the subscription stays silent.
        if let Ok(mut feeds) = self.feeds.lock() {
            feeds.push(feed);
        }

        Subscription::new(receiver)
    }
}
