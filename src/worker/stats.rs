//! Candidate counting and throughput reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{select, tick};
use tracing::debug;

use super::pool::SearchContext;

/// Shared count of examined candidates.
#[derive(Debug, Default)]
pub struct SearchStats {
    candidates: AtomicU64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one examined candidate and returns the new total.
    #[inline]
    pub fn record(&self) -> u64 {
        self.candidates.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the total candidates examined.
    #[inline]
    pub fn total(&self) -> u64 {
        self.candidates.load(Ordering::Relaxed)
    }
}

/// One throughput observation.
#[derive(Debug, Clone, Copy)]
pub struct ThroughputSample {
    /// Candidates per second since the previous sample
    pub rate: f64,
    /// Counter value at this sample
    pub total: u64,
    /// Time since the search started
    pub elapsed: Duration,
}

/// Turns successive counter readings into rates.
#[derive(Debug)]
pub struct ThroughputSampler {
    last_count: u64,
    last_time: Instant,
}

impl ThroughputSampler {
    pub fn new(count: u64, now: Instant) -> Self {
        Self {
            last_count: count,
            last_time: now,
        }
    }

    /// Returns `(count - last_count) / (now - last_time)` and advances.
    pub fn sample(&mut self, count: u64, now: Instant) -> f64 {
        let delta_count = count.saturating_sub(self.last_count);
        let delta_time = now.saturating_duration_since(self.last_time).as_secs_f64();
        self.last_count = count;
        self.last_time = now;

        if delta_time > 0.0 {
            delta_count as f64 / delta_time
        } else {
            0.0
        }
    }
}

/// Spawns the periodic reporter.
///
/// `sink` receives one sample per tick until the search's signal closes.
pub fn spawn_reporter<F>(
    context: Arc<SearchContext>,
    interval: Duration,
    mut sink: F,
) -> std::io::Result<JoinHandle<()>>
where
    F: FnMut(&ThroughputSample) + Send + 'static,
{
    thread::Builder::new()
        .name("vanity-reporter".into())
        .spawn(move || {
            let ticker = tick(interval);
            let mut sampler = ThroughputSampler::new(context.stats.total(), Instant::now());

            loop {
                select! {
                    recv(ticker) -> msg => {
                        let now = match msg {
                            Ok(now) => now,
                            Err(_) => break,
                        };
                        if !context.signal.is_open() {
                            break;
                        }
                        let total = context.stats.total();
                        let rate = sampler.sample(total, now);
                        sink(&ThroughputSample {
                            rate,
                            total,
                            elapsed: context.elapsed(),
                        });
                    }
                    recv(context.signal.closed()) -> _ => break,
                }
            }
            debug!("reporter stopped");
        })
}
