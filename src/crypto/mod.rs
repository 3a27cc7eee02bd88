//! Cryptographic operations for Solana key and address generation.
//!
//! This module provides:
//! - Entropy supply (direct OS reads or a prefetching pool)
//! - Ed25519 keypairs from raw seeds or BIP-39 mnemonics
//! - SLIP-0010 hardened derivation along the Solana account path
//! - Base-58 address rendering

mod address;
pub mod entropy;
mod keypair;
pub mod slip10;

pub use address::{is_base58_char, Address, BASE58_ALPHABET, MAX_ADDRESS_LEN};
pub(crate) use address::encode_ascii;
pub use entropy::{Entropy, EntropyError, EntropyPool, EntropySource, EntropyStrategy};
pub use keypair::{Candidate, DerivationMode, DeriveError, Keypair};
