//! SLIP-0010 hardened derivation for Ed25519.
//!
//! Ed25519 has no public child derivation, so every step is hardened:
//! `I = HMAC-SHA512(chain_code, 0x00 || key || be32(index | 2^31))`,
//! with the left half becoming the child key and the right half its chain code.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::Zeroizing;

use super::DeriveError;

type HmacSha512 = Hmac<Sha512>;

const ED25519_CURVE: &[u8] = b"ed25519 seed";

/// Offset marking an index as hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Solana account path `m/44'/501'/0'/0'` (indices before hardening).
pub const SOLANA_PATH: [u32; 4] = [44, 501, 0, 0];

/// A (key, chain code) pair at one level of the derivation tree.
pub struct ChainState {
    key: Zeroizing<[u8; 32]>,
    chain_code: Zeroizing<[u8; 32]>,
}

impl ChainState {
    /// Master node from a BIP-39 seed.
    pub fn master(seed: &[u8]) -> Result<Self, DeriveError> {
        let mut mac = HmacSha512::new_from_slice(ED25519_CURVE).map_err(|_| DeriveError::HmacKey)?;
        mac.update(seed);
        Ok(Self::split(&mac.finalize().into_bytes()))
    }

    /// Hardened child at `index` (the hardened bit is applied here).
    pub fn derive_hardened(&self, index: u32) -> Result<Self, DeriveError> {
        let mut mac =
            HmacSha512::new_from_slice(&*self.chain_code).map_err(|_| DeriveError::HmacKey)?;
        mac.update(&[0x00]);
        mac.update(&*self.key);
        mac.update(&(index | HARDENED_OFFSET).to_be_bytes());
        Ok(Self::split(&mac.finalize().into_bytes()))
    }

    /// Walks `path` from the master node of `seed`.
    pub fn derive_path(seed: &[u8], path: &[u32]) -> Result<Self, DeriveError> {
        path.iter()
            .try_fold(Self::master(seed)?, |node, &index| node.derive_hardened(index))
    }

    fn split(output: &[u8]) -> Self {
        let mut key = Zeroizing::new([0u8; 32]);
        let mut chain_code = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&output[..32]);
        chain_code.copy_from_slice(&output[32..64]);
        Self { key, chain_code }
    }

    /// The 32-byte key, usable as an Ed25519 seed.
    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Renders a path as `m/a'/b'/...`.
    pub fn format_path(path: &[u32]) -> String {
        path.iter().fold(String::from("m"), |mut out, index| {
            out.push_str(&format!("/{}'", index));
            out
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_key_vector() {
        // SLIP-0010 ed25519 test vector 1, chain m
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let master = ChainState::master(&seed).unwrap();

        assert_eq!(
            hex::encode(master.key()),
            "2b4be7f19ee27bbf30c667b642d5f4aa69fd169872f8fc3059c08ebae2eb19e7"
        );
    }

    #[test]
    fn test_hardened_step_layout() {
        let seed = [7u8; 64];
        let master = ChainState::master(&seed).unwrap();
        let child = master.derive_hardened(44).unwrap();

        let mut mac = HmacSha512::new_from_slice(master.chain_code()).unwrap();
        let mut data = Vec::with_capacity(37);
        data.push(0x00);
        data.extend_from_slice(master.key());
        data.extend_from_slice(&(44u32 + 0x8000_0000).to_be_bytes());
        mac.update(&data);
        let expected = mac.finalize().into_bytes();

        assert_eq!(child.key()[..], expected[..32]);
        assert_eq!(child.chain_code()[..], expected[32..]);
    }

    #[test]
    fn test_already_hardened_index_is_stable() {
        let master = ChainState::master(&[1u8; 64]).unwrap();
        let a = master.derive_hardened(501).unwrap();
        let b = master.derive_hardened(501 | HARDENED_OFFSET).unwrap();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_derive_path_matches_manual_walk() {
        let seed = [0u8; 64];
        let walked = ChainState::derive_path(&seed, &SOLANA_PATH).unwrap();

        let manual = ChainState::master(&seed)
            .and_then(|n| n.derive_hardened(44))
            .and_then(|n| n.derive_hardened(501))
            .and_then(|n| n.derive_hardened(0))
            .and_then(|n| n.derive_hardened(0))
            .unwrap();

        assert_eq!(walked.key(), manual.key());
        assert_eq!(walked.chain_code(), manual.chain_code());
    }

    #[test]
    fn test_hardened_child_vectors() {
        // SLIP-0010 ed25519 test vector 1, chains m/0' and m/0'/1'
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();

        let child = ChainState::derive_path(&seed, &[0]).unwrap();
        assert_eq!(
            hex::encode(child.key()),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
        assert_eq!(
            hex::encode(child.chain_code()),
            "8b59aa11380b624e81507a27fedda59fea6d0b779a778918a2fd3590e16e9c69"
        );

        let grandchild = ChainState::derive_path(&seed, &[0, 1]).unwrap();
        assert_eq!(
            hex::encode(grandchild.key()),
            "b1d0bad404bf35da785a64ca1ac54b2617211d2777696fbffaf208f746ae84f2"
        );
        assert_eq!(
            hex::encode(grandchild.chain_code()),
            "a320425f77d1b5c2505a6b1b27382b37368ee640e3557c315416801243552f14"
        );
    }

    #[test]
    fn test_format_path() {
        assert_eq!(ChainState::format_path(&SOLANA_PATH), "m/44'/501'/0'/0'");
    }
}
