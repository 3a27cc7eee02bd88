//! # sol_vanity
//!
//! High-performance Solana vanity address generator.
//!
//! ## Architecture
//!
//! - `crypto`: Entropy supply, key derivation and address encoding
//! - `matcher`: Two-stage prefix matching
//! - `worker`: Parallel search, winner claiming and throughput reporting
//! - `notify`: Webhook announcement of found wallets
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod notify;
pub mod worker;

pub use config::Config;
pub use crypto::{Address, DerivationMode, EntropyStrategy, Keypair};
pub use matcher::{MatchResult, PrefixMatcher};
pub use worker::{FoundWallet, SearchError, SearchSettings, WorkerPool};
