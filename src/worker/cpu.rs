//! CPU worker for vanity address search.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;
use tracing::{debug, error, info};

use crate::crypto::{Candidate, DerivationMode, EntropySource};
use crate::matcher::PrefixMatcher;

use super::pool::{FoundWallet, SearchContext, SearchError};

/// A CPU worker that generates and tests candidate wallets.
pub struct CpuWorker {
    /// Worker ID
    id: usize,
    /// The prefix to match against
    matcher: PrefixMatcher,
    /// How entropy becomes a keypair
    mode: DerivationMode,
    /// Per-worker entropy supply
    entropy: EntropySource,
    /// Iterations between voluntary yields (0 = never)
    yield_every: u64,
    /// Channel for the single run outcome
    result_tx: Sender<Result<FoundWallet, SearchError>>,
    /// Shared signal, counter and clock
    context: Arc<SearchContext>,
}

impl CpuWorker {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        matcher: PrefixMatcher,
        mode: DerivationMode,
        entropy: EntropySource,
        yield_every: u64,
        result_tx: Sender<Result<FoundWallet, SearchError>>,
        context: Arc<SearchContext>,
    ) -> Self {
        Self {
            id,
            matcher,
            mode,
            entropy,
            yield_every,
            result_tx,
            context,
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates candidates and tests them against the prefix until:
    /// - This worker claims the signal (sends its result through the channel)
    /// - Another worker claims it, or the search is cancelled
    /// - The entropy source fails
    pub fn run(mut self) {
        let mut iterations: u64 = 0;

        while self.context.signal.is_open() {
            let entropy = match self.entropy.next() {
                Ok(entropy) => entropy,
                Err(e) => {
                    error!(worker = self.id, error = %e, "entropy source failed");
                    if self.context.signal.try_claim() {
                        let _ = self.result_tx.send(Err(SearchError::Entropy(e)));
                    }
                    break;
                }
            };

            let candidate = match self.mode.derive(&entropy) {
                Ok(candidate) => candidate,
                Err(e) => {
                    debug!(worker = self.id, error = %e, "discarding candidate");
                    continue;
                }
            };

            let hit = self.matcher.fast_check(candidate.public_key_bytes())
                && self.matcher.matches(&candidate.keypair.address()).is_match();
            self.context.stats.record();

            if hit {
                if self.context.signal.try_claim() {
                    self.deliver(candidate);
                }
                break;
            }

            iterations += 1;
            if self.yield_every > 0 && iterations % self.yield_every == 0 {
                thread::yield_now();
            }
        }

        debug!(worker = self.id, iterations, "worker stopped");
    }

    /// Packages the winning candidate and hands it to the coordinator.
    fn deliver(&self, mut candidate: Candidate) {
        if let Err(e) = candidate.ensure_mnemonic() {
            debug!(worker = self.id, error = %e, "mnemonic unavailable for winner");
        }

        let wallet = FoundWallet {
            address: candidate.keypair.address(),
            keypair: candidate.keypair,
            mnemonic: candidate.mnemonic,
            mode: candidate.mode,
            worker_id: self.id,
            candidates: self.context.stats.total(),
            elapsed: self.context.elapsed(),
        };

        info!(worker = self.id, address = %wallet.address, "match claimed");
        let _ = self.result_tx.send(Ok(wallet));
    }
}
