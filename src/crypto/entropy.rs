//! Secure entropy supply for the search loop.
//!
//! Two production strategies are supported:
//! - Direct: every call reads fresh bytes from the OS random source
//! - Pooled: a background producer keeps a bounded buffer of blocks filled,
//!   and callers fall back to a direct read whenever the buffer is empty
//!
//! A seeded strategy exists for reproducible runs in tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Size of one entropy unit in bytes.
pub const ENTROPY_LEN: usize = 32;

/// Default number of blocks held by the pool.
pub const DEFAULT_POOL_CAPACITY: usize = 1000;

/// How long the producer waits on a full buffer before rechecking shutdown.
const BACKPRESSURE_WAIT: Duration = Duration::from_millis(10);

/// Pause after a failed read in the producer.
const RETRY_DELAY: Duration = Duration::from_millis(1);

/// One 32-byte block of random material, wiped on drop.
pub type Entropy = Zeroizing<[u8; ENTROPY_LEN]>;

/// The secure random source failed.
#[derive(Debug, thiserror::Error)]
#[error("secure random source failed: {0}")]
pub struct EntropyError(#[from] rand::Error);

/// Reads one block straight from the OS random source.
pub fn read_direct() -> Result<Entropy, EntropyError> {
    let mut block = Zeroizing::new([0u8; ENTROPY_LEN]);
    OsRng.try_fill_bytes(&mut block[..])?;
    Ok(block)
}

/// How workers obtain their entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyStrategy {
    /// Synchronous OS reads on every call.
    Direct,
    /// Shared prefetching pool of the given capacity.
    Pooled { capacity: usize },
    /// Deterministic per-worker generator. Not for real keys.
    Seeded(u64),
}

impl Default for EntropyStrategy {
    fn default() -> Self {
        EntropyStrategy::Pooled {
            capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl std::fmt::Display for EntropyStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntropyStrategy::Direct => write!(f, "direct"),
            EntropyStrategy::Pooled { capacity } => write!(f, "pooled ({} blocks)", capacity),
            EntropyStrategy::Seeded(seed) => write!(f, "seeded ({})", seed),
        }
    }
}

/// Bounded prefetch buffer filled by a background thread.
///
/// Blocks are uniformly random regardless of how long they sat in the buffer,
/// so a stale block is exactly as good as a fresh one.
pub struct EntropyPool {
    rx: Receiver<Entropy>,
    shutdown: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
}

impl EntropyPool {
    /// Creates the pool and starts its producer thread.
    pub fn new(capacity: usize) -> std::io::Result<Self> {
        let (tx, rx) = bounded(capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));

        let producer_shutdown = shutdown.clone();
        let producer = thread::Builder::new()
            .name("vanity-entropy".into())
            .spawn(move || Self::produce(tx, producer_shutdown))?;

        Ok(Self {
            rx,
            shutdown,
            producer: Some(producer),
        })
    }

    fn produce(tx: Sender<Entropy>, shutdown: Arc<AtomicBool>) {
        'outer: while !shutdown.load(Ordering::Relaxed) {
            let mut block = match read_direct() {
                Ok(block) => block,
                Err(e) => {
                    warn!(error = %e, "entropy producer read failed, retrying");
                    thread::sleep(RETRY_DELAY);
                    continue;
                }
            };

            loop {
                match tx.send_timeout(block, BACKPRESSURE_WAIT) {
                    Ok(()) => break,
                    Err(SendTimeoutError::Timeout(returned)) => {
                        if shutdown.load(Ordering::Relaxed) {
                            break 'outer;
                        }
                        block = returned;
                    }
                    Err(SendTimeoutError::Disconnected(_)) => break 'outer,
                }
            }
        }
        debug!("entropy producer stopped");
    }

    /// Takes a pooled block, or reads directly when the buffer is empty.
    pub fn take(&self) -> Result<Entropy, EntropyError> {
        match self.rx.try_recv() {
            Ok(block) => Ok(block),
            Err(_) => read_direct(),
        }
    }

    /// Number of blocks currently buffered.
    pub fn available(&self) -> usize {
        self.rx.len()
    }

    /// Maximum number of buffered blocks.
    pub fn capacity(&self) -> usize {
        self.rx.capacity().unwrap_or(0)
    }
}

impl Drop for EntropyPool {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.producer.take() {
            let _ = handle.join();
        }
    }
}

/// A single worker's view of the entropy supply.
pub enum EntropySource {
    Direct,
    Pooled(Arc<EntropyPool>),
    Seeded(Box<StdRng>),
}

impl EntropySource {
    /// Builds the source for one worker.
    ///
    /// `pool` must be present for the pooled strategy; without it the worker
    /// falls back to direct reads.
    pub fn for_worker(
        strategy: EntropyStrategy,
        pool: Option<&Arc<EntropyPool>>,
        worker_id: usize,
    ) -> Self {
        match (strategy, pool) {
            (EntropyStrategy::Pooled { .. }, Some(pool)) => EntropySource::Pooled(pool.clone()),
            (EntropyStrategy::Seeded(seed), _) => EntropySource::Seeded(Box::new(
                StdRng::seed_from_u64(seed.wrapping_add(worker_id as u64)),
            )),
            _ => EntropySource::Direct,
        }
    }

    /// Returns the next 32-byte block.
    #[inline]
    pub fn next(&mut self) -> Result<Entropy, EntropyError> {
        match self {
            EntropySource::Direct => read_direct(),
            EntropySource::Pooled(pool) => pool.take(),
            EntropySource::Seeded(rng) => {
                let mut block = Zeroizing::new([0u8; ENTROPY_LEN]);
                rng.try_fill_bytes(&mut block[..])?;
                Ok(block)
            }
        }
    }
}
