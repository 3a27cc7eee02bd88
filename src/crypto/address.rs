//! Solana address representation and base-58 rendering.

use std::fmt;

/// Longest base-58 rendering of 32 bytes.
pub const MAX_ADDRESS_LEN: usize = 44;

/// The base-58 alphabet used by Solana (Bitcoin ordering).
pub const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// A Solana address: the raw 32-byte Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 32]);

impl Address {
    /// Creates an address from raw public key bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw public key bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the canonical base-58 address string.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Renders the address into a caller-owned buffer without allocating.
    ///
    /// Returns the ASCII bytes written, or `None` if encoding failed.
    #[inline]
    pub fn encode_into<'b>(&self, buf: &'b mut [u8; MAX_ADDRESS_LEN]) -> Option<&'b [u8]> {
        encode_ascii(&self.0, buf)
    }
}

/// Base-58 encodes `bytes` into `buf`, returning the written prefix of `buf`.
#[inline]
pub(crate) fn encode_ascii<'b>(bytes: &[u8; 32], buf: &'b mut [u8; MAX_ADDRESS_LEN]) -> Option<&'b [u8]> {
    let len = bs58::encode(bytes).onto(&mut buf[..]).ok()?;
    Some(&buf[..len])
}

/// Returns true if `c` can appear in a base-58 address.
pub fn is_base58_char(c: char) -> bool {
    BASE58_ALPHABET.contains(c)
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_base58())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}
