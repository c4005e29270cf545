use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};

/// Announces a published frame to the render thread.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameToken {
    pub frame: u64,
}

/// Single-slot mailbox. Posting replaces any token that was never collected.
#[derive(Debug, Clone)]
pub struct Mailbox {
    tx: Sender<FrameToken>,
    rx: Receiver<FrameToken>,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub fn new() -> Self {
        let (tx, rx) = bounded(1);
        Self { tx, rx }
    }

    pub fn post(&self, token: FrameToken) {
        let mut token = token;
        loop {
            match self.tx.try_send(token) {
                Ok(()) => return,
                Err(TrySendError::Full(t)) => {
                    if let Ok(stale) = self.rx.try_recv() {
                        log::trace!("dropping uncollected frame token {}", stale.frame);
                    }
                    token = t;
                }
                // Both ends live in `self`, so the channel cannot disconnect.
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    pub fn try_recv(&self) -> Option<FrameToken> {
        match self.rx.try_recv() {
            Ok(token) => Some(token),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FrameToken> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Discards a pending token, if any.
    pub fn drain(&self) {
        while self.rx.try_recv().is_ok() {}
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
