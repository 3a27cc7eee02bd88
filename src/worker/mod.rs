//! Worker pool for parallel vanity address search.
//!
//! This module provides:
//! - Multi-threaded CPU workers
//! - Exactly-once winner claiming and run cancellation
//! - Shared candidate counting and periodic throughput reports

mod cpu;
mod pool;
mod signal;
mod stats;

pub use cpu::CpuWorker;
pub use pool::{FoundWallet, SearchContext, SearchError, SearchSettings, WorkerPool};
pub use signal::{FoundSignal, SignalState};
pub use stats::{spawn_reporter, SearchStats, ThroughputSample, ThroughputSampler};
