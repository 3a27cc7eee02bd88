//! Worker pool management.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use tracing::info;
use zeroize::Zeroizing;

use crate::crypto::{
    Address, DerivationMode, EntropyError, EntropyPool, EntropySource, EntropyStrategy, Keypair,
};
use crate::matcher::PrefixMatcher;

use super::cpu::CpuWorker;
use super::signal::FoundSignal;
use super::stats::{self, SearchStats, ThroughputSample};

/// Errors that end a search run without a winner.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error(transparent)]
    Entropy(#[from] EntropyError),
}

/// Library-level search parameters.
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    /// Number of worker threads
    pub workers: usize,
    /// How entropy becomes a keypair
    pub mode: DerivationMode,
    /// Where workers get entropy from
    pub entropy: EntropyStrategy,
    /// Iterations between voluntary yields (0 = never)
    pub yield_every: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            workers: num_cpus::get() * 4,
            mode: DerivationMode::default(),
            entropy: EntropyStrategy::default(),
            yield_every: 500,
        }
    }
}

/// State shared by every thread of one search run.
pub struct SearchContext {
    /// Winner / stop coordination
    pub signal: FoundSignal,
    /// Candidates examined so far
    pub stats: SearchStats,
    started: Instant,
}

impl SearchContext {
    pub fn new() -> Self {
        Self {
            signal: FoundSignal::new(),
            stats: SearchStats::new(),
            started: Instant::now(),
        }
    }

    /// Time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The winning wallet of a search run.
#[derive(Debug, Clone)]
pub struct FoundWallet {
    /// The matching address
    pub address: Address,
    /// The Ed25519 keypair
    pub keypair: Keypair,
    /// BIP-39 phrase, if one could be produced
    pub mnemonic: Option<Zeroizing<String>>,
    /// Derivation mode that produced the keypair
    pub mode: DerivationMode,
    /// The ID of the worker that found this result
    pub worker_id: usize,
    /// Candidates examined when the match was claimed
    pub candidates: u64,
    /// Time from search start to the claim
    pub elapsed: Duration,
}

impl FoundWallet {
    /// Returns the 64-byte keypair as base-58.
    pub fn private_key_base58(&self) -> Zeroizing<String> {
        self.keypair.private_key_base58()
    }

    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref().map(String::as_str)
    }

    /// Average search rate up to the claim.
    pub fn candidates_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.candidates as f64 / secs
        } else {
            0.0
        }
    }
}

/// Manages a pool of workers searching for one matching address.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// The prefix being searched for
    matcher: PrefixMatcher,
    /// Worker and reporter thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Receives the single run outcome
    result_rx: Receiver<Result<FoundWallet, SearchError>>,
    /// Shared signal and statistics
    context: Arc<SearchContext>,
    /// Kept alive for the duration of the run
    entropy_pool: Option<Arc<EntropyPool>>,
}

impl WorkerPool {
    /// Starts a search with the given settings.
    pub fn new(settings: SearchSettings, matcher: PrefixMatcher) -> Result<Self, SearchError> {
        let context = Arc::new(SearchContext::new());
        let entropy_pool = match settings.entropy {
            EntropyStrategy::Pooled { capacity } => Some(Arc::new(EntropyPool::new(capacity)?)),
            _ => None,
        };

        // Capacity one: only the claimant ever sends.
        let (result_tx, result_rx) = bounded(1);
        let num_workers = settings.workers.max(1);

        let mut handles = Vec::with_capacity(num_workers + 1);
        for id in 0..num_workers {
            let worker = CpuWorker::new(
                id,
                matcher.clone(),
                settings.mode,
                EntropySource::for_worker(settings.entropy, entropy_pool.as_ref(), id),
                settings.yield_every,
                result_tx.clone(),
                context.clone(),
            );

            let spawned = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    context.signal.cancel();
                    for handle in handles {
                        let _ = handle.join();
                    }
                    return Err(SearchError::Spawn(e));
                }
            }
        }

        info!(
            workers = num_workers,
            mode = %settings.mode,
            entropy = %settings.entropy,
            prefix = matcher.prefix(),
            "search started"
        );

        Ok(Self {
            num_workers,
            matcher,
            handles: Some(handles),
            result_rx,
            context,
            entropy_pool,
        })
    }

    /// Starts the throughput reporter for this run.
    pub fn spawn_reporter<F>(&mut self, interval: Duration, sink: F) -> Result<(), SearchError>
    where
        F: FnMut(&ThroughputSample) + Send + 'static,
    {
        let handle = stats::spawn_reporter(self.context.clone(), interval, sink)?;
        self.handles.get_or_insert_with(Vec::new).push(handle);
        Ok(())
    }

    /// Blocks until the run ends.
    ///
    /// Returns `Ok(Some(_))` for a winner, `Ok(None)` if the run was cancelled.
    pub fn wait(&self) -> Result<Option<FoundWallet>, SearchError> {
        match self.result_rx.recv() {
            Ok(outcome) => outcome.map(Some),
            // Every worker exited without a claim.
            Err(_) => Ok(None),
        }
    }

    /// Waits for the outcome with a timeout.
    ///
    /// Returns `None` if the timeout expires or every worker has exited without a result.
    pub fn wait_for_result(&self, timeout: Duration) -> Option<Result<FoundWallet, SearchError>> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    /// Stops the search without a winner.
    pub fn cancel(&self) {
        self.context.signal.cancel();
    }

    /// Waits for all workers to complete.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.context.signal.cancel();
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
        self.entropy_pool.take();
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the matcher being searched for.
    pub fn matcher(&self) -> &PrefixMatcher {
        &self.matcher
    }

    /// Returns the total candidates examined across all workers.
    pub fn total_candidates(&self) -> u64 {
        self.context.stats.total()
    }

    /// Returns the elapsed time since the search started.
    pub fn elapsed(&self) -> Duration {
        self.context.elapsed()
    }

    /// Returns the average search rate (candidates per second).
    pub fn candidates_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.total_candidates() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Returns the shared context for external use (e.g., signal handlers).
    pub fn context(&self) -> Arc<SearchContext> {
        self.context.clone()
    }

    /// Returns true if the run has a winner or was cancelled.
    pub fn is_stopped(&self) -> bool {
        !self.context.signal.is_open()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
