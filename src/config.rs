//! Runtime configuration for the vanity address generator.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::crypto::{is_base58_char, DerivationMode, EntropyStrategy, MAX_ADDRESS_LEN};
use crate::worker::SearchSettings;

/// Solana Vanity Address Generator
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address prefix to search for (case sensitive, base-58 characters only)
    pub prefix: String,

    /// Webhook URL notified when a wallet is found
    pub webhook_url: Option<String>,

    /// Number of worker threads (default: 4x the number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Key derivation: hd (mnemonic at m/44'/501'/0'/0') or direct (raw seed)
    #[arg(short = 'm', long, value_enum, default_value_t = ModeArg::Hd)]
    pub mode: ModeArg,

    /// Entropy supply: pooled (background prefetch) or direct
    #[arg(short = 'e', long, value_enum, default_value_t = EntropyArg::Pooled)]
    pub entropy: EntropyArg,

    /// Capacity of the entropy prefetch pool
    #[arg(long, default_value = "1000")]
    pub pool_capacity: usize,

    /// Progress report interval in milliseconds
    #[arg(short = 'r', long, default_value = "200")]
    pub report_interval_ms: u64,

    /// Yield the worker thread every N candidates (0 = never)
    #[arg(long, default_value = "500")]
    pub yield_every: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Hd,
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntropyArg {
    Pooled,
    Direct,
}

impl Config {
    /// Returns the number of workers, defaulting to 4x the CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| num_cpus::get() * 4)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(c) = self.prefix.chars().find(|&c| !is_base58_char(c)) {
            return Err(ConfigError::InvalidPrefix(format!(
                "'{}' is not a base-58 character (0, O, I and l never appear in addresses)",
                c
            )));
        }

        if self.prefix.len() > MAX_ADDRESS_LEN {
            return Err(ConfigError::InvalidPrefix(format!(
                "Prefix cannot be longer than {} characters (full address)",
                MAX_ADDRESS_LEN
            )));
        }

        if self.worker_count() == 0 {
            return Err(ConfigError::InvalidOption("Worker count must be at least 1".into()));
        }

        if self.pool_capacity == 0 {
            return Err(ConfigError::InvalidOption("Pool capacity must be at least 1".into()));
        }

        if !(50..=10_000).contains(&self.report_interval_ms) {
            return Err(ConfigError::InvalidOption(
                "Report interval must be between 50 and 10000 ms".into(),
            ));
        }

        if let Some(ref url) = self.webhook_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidWebhook(url.clone()));
            }
        }

        Ok(())
    }

    /// Returns the selected derivation mode.
    pub fn derivation_mode(&self) -> DerivationMode {
        match self.mode {
            ModeArg::Hd => DerivationMode::Hd,
            ModeArg::Direct => DerivationMode::Direct,
        }
    }

    /// Returns the selected entropy strategy.
    pub fn entropy_strategy(&self) -> EntropyStrategy {
        match self.entropy {
            EntropyArg::Pooled => EntropyStrategy::Pooled {
                capacity: self.pool_capacity,
            },
            EntropyArg::Direct => EntropyStrategy::Direct,
        }
    }

    /// Returns the progress report interval.
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    /// Converts the CLI options into library search settings.
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            workers: self.worker_count(),
            mode: self.derivation_mode(),
            entropy: self.entropy_strategy(),
            yield_every: self.yield_every,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid webhook URL: {0}")]
    InvalidWebhook(String),
}
