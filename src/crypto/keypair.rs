//! Ed25519 keypair generation for Solana.
//!
//! Two derivation modes turn one 32-byte entropy block into a keypair:
//!
//! - [`DerivationMode::Hd`]: entropy → 24-word BIP-39 mnemonic → PBKDF2 seed
//!   (empty passphrase) → SLIP-0010 walk of `m/44'/501'/0'/0'`. The mnemonic
//!   imports into standard Solana wallets.
//! - [`DerivationMode::Direct`]: entropy is the Ed25519 secret seed. Much faster;
//!   the BIP-39 phrase of the raw seed is only produced for the winner.
//!
//! The two modes give different keys for the same entropy.

use std::fmt;
use std::str::FromStr;

use bip39::Mnemonic;
use ed25519_dalek::{SigningKey, VerifyingKey, KEYPAIR_LENGTH};
use zeroize::Zeroizing;

use super::slip10::{ChainState, SOLANA_PATH};
use super::Address;

/// Errors raised while turning entropy into a keypair.
#[derive(Debug, thiserror::Error)]
pub enum DeriveError {
    #[error("mnemonic construction failed: {0}")]
    Mnemonic(#[from] bip39::Error),

    #[error("invalid HMAC key")]
    HmacKey,
}

/// How entropy is turned into a keypair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DerivationMode {
    /// Mnemonic + SLIP-0010 derivation at `m/44'/501'/0'/0'`.
    #[default]
    Hd,
    /// Entropy used directly as the Ed25519 seed.
    Direct,
}

impl FromStr for DerivationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hd" | "bip44" | "mnemonic" => Ok(DerivationMode::Hd),
            "direct" | "seed" | "raw" => Ok(DerivationMode::Direct),
            _ => Err(format!("Unknown derivation mode: {}", s)),
        }
    }
}

impl fmt::Display for DerivationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivationMode::Hd => write!(f, "hd ({})", ChainState::format_path(&SOLANA_PATH)),
            DerivationMode::Direct => write!(f, "direct seed"),
        }
    }
}

impl DerivationMode {
    /// Derives a candidate wallet from one entropy block.
    #[inline]
    pub fn derive(self, entropy: &[u8; 32]) -> Result<Candidate, DeriveError> {
        match self {
            DerivationMode::Direct => Ok(Candidate {
                keypair: Keypair::from_seed(entropy),
                mnemonic: None,
                mode: self,
            }),
            DerivationMode::Hd => {
                let mnemonic = Mnemonic::from_entropy(entropy)?;
                let keypair = Keypair::from_mnemonic(&mnemonic)?;
                Ok(Candidate {
                    keypair,
                    mnemonic: Some(Zeroizing::new(mnemonic.to_string())),
                    mode: self,
                })
            }
        }
    }
}

/// An Ed25519 keypair (32-byte secret seed + 32-byte public key).
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Keypair {
    /// Builds the keypair whose secret seed is `seed`.
    #[inline]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Derives the Solana account key of a mnemonic (empty passphrase).
    pub fn from_mnemonic(mnemonic: &Mnemonic) -> Result<Self, DeriveError> {
        let seed = Zeroizing::new(mnemonic.to_seed_normalized(""));
        let node = ChainState::derive_path(&*seed, &SOLANA_PATH)?;
        Ok(Self::from_seed(node.key()))
    }

    /// Returns the raw public key bytes.
    #[inline]
    pub fn public_key_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Returns the 32-byte secret seed.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.signing_key.to_bytes())
    }

    /// Returns the 64-byte `secret || public` form used by Solana wallets.
    pub fn to_keypair_bytes(&self) -> Zeroizing<[u8; KEYPAIR_LENGTH]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// Returns the 64-byte keypair as base-58, the format wallets import.
    pub fn private_key_base58(&self) -> Zeroizing<String> {
        Zeroizing::new(bs58::encode(&*self.to_keypair_bytes()).into_string())
    }

    /// Returns the address rendered from the public half of the keypair bytes.
    pub fn address(&self) -> Address {
        let bytes = self.to_keypair_bytes();
        let mut public = [0u8; 32];
        public.copy_from_slice(&bytes[32..]);
        Address::from_bytes(public)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// One generated wallet candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub keypair: Keypair,
    /// Present up front in HD mode; filled in after a match in direct mode.
    pub mnemonic: Option<Zeroizing<String>>,
    pub mode: DerivationMode,
}

impl Candidate {
    #[inline]
    pub fn public_key_bytes(&self) -> &[u8; 32] {
        self.keypair.public_key_bytes()
    }

    /// Produces the mnemonic if it has not been computed yet.
    ///
    /// In direct mode this is the BIP-39 encoding of the raw secret seed; it
    /// restores the seed, not an HD wallet at the Solana path.
    pub fn ensure_mnemonic(&mut self) -> Result<&str, DeriveError> {
        if self.mnemonic.is_none() {
            let seed = self.keypair.secret_bytes();
            let phrase = Mnemonic::from_entropy(&*seed)?.to_string();
            self.mnemonic = Some(Zeroizing::new(phrase));
        }
        Ok(self.mnemonic.as_deref().map(String::as_str).unwrap_or_default())
    }
}
