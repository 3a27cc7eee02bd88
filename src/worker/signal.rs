//! One-shot winner coordination.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;

use crossbeam_channel::{bounded, Receiver, Sender};

const OPEN: u8 = 0;
const CLAIMED: u8 = 1;
const CANCELLED: u8 = 2;

/// Terminal state of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    /// Still searching.
    Open,
    /// A worker won the claim.
    Claimed,
    /// Stopped without a winner.
    Cancelled,
}

/// Set-once stop signal with exactly-once claim semantics.
///
/// The state moves from open to claimed or cancelled once and never back.
/// Closing also disconnects a channel so blocking observers can `select!`
/// on [`closed`](FoundSignal::closed) instead of polling.
pub struct FoundSignal {
    state: AtomicU8,
    closer: Mutex<Option<Sender<()>>>,
    closed: Receiver<()>,
}

impl FoundSignal {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            state: AtomicU8::new(OPEN),
            closer: Mutex::new(Some(tx)),
            closed: rx,
        }
    }

    /// Attempts to become the single winner. Returns true exactly once.
    #[inline]
    pub fn try_claim(&self) -> bool {
        self.transition(CLAIMED)
    }

    /// Stops the run without a winner. Returns false if already closed.
    pub fn cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    fn transition(&self, to: u8) -> bool {
        let won = self
            .state
            .compare_exchange(OPEN, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            let mut closer = match self.closer.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            closer.take();
        }
        won
    }

    /// Non-blocking check used by workers on every iteration.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.state.load(Ordering::Acquire) == OPEN
    }

    pub fn state(&self) -> SignalState {
        match self.state.load(Ordering::Acquire) {
            OPEN => SignalState::Open,
            CLAIMED => SignalState::Claimed,
            _ => SignalState::Cancelled,
        }
    }

    /// Receiver that disconnects once the signal closes.
    pub fn closed(&self) -> &Receiver<()> {
        &self.closed
    }
}

impl Default for FoundSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_claim_once() {
        let signal = FoundSignal::new();
        assert!(signal.is_open());
        assert!(signal.try_claim());
        assert!(!signal.try_claim());
        assert!(!signal.cancel());
        assert_eq!(signal.state(), SignalState::Claimed);
    }

    #[test]
    fn test_cancel_blocks_claim() {
        let signal = FoundSignal::new();
        assert!(signal.cancel());
        assert!(!signal.try_claim());
        assert_eq!(signal.state(), SignalState::Cancelled);
    }

    #[test]
    fn test_concurrent_claims_single_winner() {
        const THREADS: usize = 16;

        for _ in 0..50 {
            let signal = Arc::new(FoundSignal::new());
            let barrier = Arc::new(Barrier::new(THREADS));
            let winners = Arc::new(AtomicUsize::new(0));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let signal = signal.clone();
                    let barrier = barrier.clone();
                    let winners = winners.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        if signal.try_claim() {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(winners.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_closed_channel_disconnects() {
        let signal = FoundSignal::new();
        assert!(signal.closed().recv_timeout(Duration::from_millis(10)).is_err());
        assert!(signal.is_open());

        signal.try_claim();
        assert!(matches!(
            signal.closed().recv_timeout(Duration::from_secs(1)),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected)
        ));
    }
}
