//! Prefix matching for Solana addresses.
//!
//! Matching is split in two stages:
//! - Fast: compare the first one or two base-58 characters of the raw key
//! - Authoritative: full case-sensitive prefix comparison on the address string

mod pattern;

pub use pattern::{MatchResult, PrefixMatcher};
