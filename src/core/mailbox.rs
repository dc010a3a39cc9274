//! Bounded FIFO mailboxes between control loops
//!
//! Each consuming loop owns one mailbox. Producers hold a [`MailboxSender`]
//! whose [`OverflowPolicy`] decides what happens when the mailbox is full:
//!
//! | Policy | Full mailbox |
//! |--------|--------------|
//! | `Block` | wait up to the send timeout, then `Error::MailboxFull` |
//! | `DropNewest` | discard the message being sent |
//! | `DropOldest` | evict the head of the queue, then enqueue |
//!
//! Senders for the same mailbox may carry different policies, so a timer
//! can drop ticks while sensor traffic applies backpressure.

use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Behavior of a send into a full mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    #[default]
    Block,
    DropNewest,
    DropOldest,
}

/// Outcome of a successful send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// Mailbox was full and the message was discarded
    Dropped,
    /// Mailbox was full and its oldest message was discarded
    Evicted,
}

/// Create a mailbox with the given capacity
///
/// `timeout` of `None` blocks indefinitely under the `Block` policy.
pub fn mailbox<T>(
    name: &'static str,
    capacity: usize,
    policy: OverflowPolicy,
    timeout: Option<Duration>,
) -> (MailboxSender<T>, MailboxReceiver<T>) {
    let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
    // An eviction handle keeps the channel alive, so only hold one when needed
    let evict = (policy == OverflowPolicy::DropOldest).then(|| rx.clone());
    let sender = MailboxSender {
        name,
        tx,
        evict,
        policy,
        timeout,
    };
    (sender, MailboxReceiver { name, rx })
}

/// Producer handle of a mailbox
pub struct MailboxSender<T> {
    name: &'static str,
    tx: Sender<T>,
    /// Receiver clone used only to evict under `DropOldest`
    evict: Option<Receiver<T>>,
    policy: OverflowPolicy,
    timeout: Option<Duration>,
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
            evict: self.evict.clone(),
            policy: self.policy,
            timeout: self.timeout,
        }
    }
}

impl<T> MailboxSender<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Same mailbox, different overflow policy
    ///
    /// `DropOldest` needs a mailbox created with that policy; on any other
    /// mailbox it degrades to `DropNewest`.
    pub fn with_policy(&self, policy: OverflowPolicy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    /// Same mailbox, different send timeout
    pub fn with_timeout(&self, timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn send(&self, msg: T) -> Result<Delivery> {
        match self.policy {
            OverflowPolicy::Block => self.send_blocking(msg),
            OverflowPolicy::DropNewest => match self.tx.try_send(msg) {
                Ok(()) => Ok(Delivery::Queued),
                Err(TrySendError::Full(_)) => {
                    log::trace!("Mailbox '{}' full, dropping newest", self.name);
                    Ok(Delivery::Dropped)
                }
                Err(TrySendError::Disconnected(_)) => Err(Error::MailboxClosed(self.name)),
            },
            OverflowPolicy::DropOldest => self.send_evicting(msg),
        }
    }

    fn send_blocking(&self, msg: T) -> Result<Delivery> {
        match self.timeout {
            None => self
                .tx
                .send(msg)
                .map(|_| Delivery::Queued)
                .map_err(|_| Error::MailboxClosed(self.name)),
            Some(timeout) => match self.tx.send_timeout(msg, timeout) {
                Ok(()) => Ok(Delivery::Queued),
                Err(SendTimeoutError::Timeout(_)) => Err(Error::MailboxFull { mailbox: self.name }),
                Err(SendTimeoutError::Disconnected(_)) => Err(Error::MailboxClosed(self.name)),
            },
        }
    }

    fn send_evicting(&self, mut msg: T) -> Result<Delivery> {
        let Some(evict) = &self.evict else {
            return self.with_policy(OverflowPolicy::DropNewest).send(msg);
        };
        let mut evicted = false;
        loop {
            match self.tx.try_send(msg) {
                Ok(()) => {
                    return Ok(if evicted {
                        Delivery::Evicted
                    } else {
                        Delivery::Queued
                    });
                }
                Err(TrySendError::Full(returned)) => {
                    msg = returned;
                    // Consumer may win the race and empty the slot first
                    if evict.try_recv().is_ok() {
                        log::trace!("Mailbox '{}' full, evicted oldest", self.name);
                        evicted = true;
                    }
                }
                Err(TrySendError::Disconnected(_)) => return Err(Error::MailboxClosed(self.name)),
            }
        }
    }
}

/// Consumer handle of a mailbox
pub struct MailboxReceiver<T> {
    name: &'static str,
    rx: Receiver<T>,
}

impl<T> MailboxReceiver<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Block until a message arrives
    pub fn recv(&self) -> Result<T> {
        self.rx.recv().map_err(|_| Error::MailboxClosed(self.name))
    }

    /// Wait up to `timeout`; `Ok(None)` when nothing arrived
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<T>> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Ok(Some(msg)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::MailboxClosed(self.name)),
        }
    }

    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let (tx, rx) = mailbox::<u32>("test", 4, OverflowPolicy::Block, None);
        for i in 0..4 {
            assert_eq!(tx.send(i).unwrap(), Delivery::Queued);
        }
        for i in 0..4 {
            assert_eq!(rx.recv().unwrap(), i);
        }
        assert!(rx.is_empty());
    }

    #[test]
    fn test_block_policy_times_out() {
        let (tx, _rx) = mailbox::<u32>(
            "full",
            2,
            OverflowPolicy::Block,
            Some(Duration::from_millis(10)),
        );
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        match tx.send(3) {
            Err(Error::MailboxFull { mailbox }) => assert_eq!(mailbox, "full"),
            other => panic!("expected MailboxFull, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_newest() {
        let (tx, rx) = mailbox::<u32>("ticks", 2, OverflowPolicy::DropNewest, None);
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(tx.send(3).unwrap(), Delivery::Dropped);
        assert_eq!(rx.try_recv(), Some(1));
        assert_eq!(rx.try_recv(), Some(2));
        assert_eq!(rx.try_recv(), None);
    }

    #[test]
    fn test_drop_oldest() {
        let (tx, rx) = mailbox::<u32>("ring", 2, OverflowPolicy::DropOldest, None);
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        assert_eq!(tx.send(3).unwrap(), Delivery::Evicted);
        assert_eq!(rx.try_recv(), Some(2));
        assert_eq!(rx.try_recv(), Some(3));
    }

    #[test]
    fn test_per_sender_policy() {
        let (tx, rx) = mailbox::<u32>(
            "shared",
            1,
            OverflowPolicy::Block,
            Some(Duration::from_millis(5)),
        );
        let lossy = tx.with_policy(OverflowPolicy::DropNewest);
        tx.send(1).unwrap();
        assert_eq!(lossy.send(2).unwrap(), Delivery::Dropped);
        assert!(tx.send(3).is_err());
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_closed_mailbox() {
        let (tx, rx) = mailbox::<u32>("gone", 2, OverflowPolicy::Block, None);
        drop(rx);
        assert!(matches!(tx.send(1), Err(Error::MailboxClosed("gone"))));

        let (tx, rx) = mailbox::<u32>("gone2", 2, OverflowPolicy::Block, None);
        drop(tx);
        assert!(matches!(rx.recv(), Err(Error::MailboxClosed("gone2"))));
    }

    #[test]
    fn test_drop_oldest_requires_eviction_handle() {
        let (tx, rx) = mailbox::<u32>("plain", 1, OverflowPolicy::Block, None);
        let ring = tx.with_policy(OverflowPolicy::DropOldest);
        ring.send(1).unwrap();
        assert_eq!(ring.send(2).unwrap(), Delivery::Dropped);
        assert_eq!(rx.try_recv(), Some(1));
    }

    #[test]
    fn test_recv_timeout_empty() {
        let (_tx, rx) = mailbox::<u32>("idle", 2, OverflowPolicy::Block, None);
        assert_eq!(rx.recv_timeout(Duration::from_millis(5)).unwrap(), None);
    }
}
