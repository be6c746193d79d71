//! The mailbox: a single-consumer, multi-producer FIFO of envelopes feeding one actor's receive
//! loop (§3 "Mailbox", §4.6). Put is non-blocking (bounded capacity applies backpressure via a
//! [`MailboxError::Full`] rather than blocking the producer); get is blocking (awaits the next
//! item). The `Poison` sentinel travels as an ordinary [`Envelope`] so strict FIFO ordering holds
//! even across the shutdown boundary (§8 S6).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use crate::message::Envelope;

/// Failures putting an envelope into a mailbox.
#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("mailbox is at capacity {capacity}")]
    Full { capacity: usize },
    #[error("mailbox is closed")]
    Closed,
}

/// The producer half of a mailbox. Cheaply `Clone`-able; any number of actors may hold one.
#[derive(Debug, Clone)]
pub struct MailboxSender {
    tx: mpsc::Sender<Envelope>,
    capacity: usize,
}

impl MailboxSender {
    /// Enqueue without waiting. Fails immediately if the mailbox is full or closed.
    pub fn put(&self, envelope: Envelope) -> Result<(), MailboxError> {
        self.tx.try_send(envelope).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => MailboxError::Full {
                capacity: self.capacity,
            },
            mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The single-consumer half of a mailbox. Owned exclusively by the actor that reads from it.
#[derive(Debug)]
pub struct MailboxReceiver {
    rx: mpsc::Receiver<Envelope>,
}

impl MailboxReceiver {
    /// Block until the next envelope arrives, or return `None` once every sender has dropped.
    pub async fn get(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Close the receiving half; further `put` calls from senders will observe
    /// [`MailboxError::Closed`].
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// Construct a bounded mailbox with the given capacity (§3 "ActorConfig::mailbox_capacity").
pub fn mailbox(capacity: usize) -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (MailboxSender { tx, capacity }, MailboxReceiver { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::message::EnvelopeKind;

    fn envelope() -> Envelope {
        let sender = Address::new_root("127.0.0.1", 9000);
        let target = Address::child(&sender);
        Envelope::new(sender, Some(target), EnvelopeKind::StopActor)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let (sender, mut receiver) = mailbox(4);
        sender.put(envelope()).unwrap();
        let got = receiver.get().await;
        assert!(got.is_some());
    }

    #[test]
    fn put_beyond_capacity_fails_without_blocking() {
        let (sender, _receiver) = mailbox(1);
        sender.put(envelope()).unwrap();
        let result = sender.put(envelope());
        assert!(matches!(result, Err(MailboxError::Full { capacity: 1 })));
    }

    #[tokio::test]
    async fn fifo_ordering_is_preserved() {
        let (sender, mut receiver) = mailbox(8);
        for _ in 0..3 {
            sender.put(envelope()).unwrap();
        }
        let mut seen = 0;
        while seen < 3 {
            receiver.get().await.unwrap();
            seen += 1;
        }
    }

    #[tokio::test]
    async fn get_returns_none_after_all_senders_dropped() {
        let (sender, mut receiver) = mailbox(4);
        drop(sender);
        assert!(receiver.get().await.is_none());
    }
}
