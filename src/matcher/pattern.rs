//! Two-stage prefix matching.

use crate::crypto::{encode_ascii, Address, MAX_ADDRESS_LEN};

/// Number of leading characters compared by the fast check.
const FAST_CHECK_CHARS: usize = 2;

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

/// A compiled, case-sensitive address prefix.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    prefix: String,
    /// First one or two prefix bytes, compared by the fast check
    head: [u8; FAST_CHECK_CHARS],
    head_len: usize,
}

impl PrefixMatcher {
    /// Compiles a prefix. An empty prefix matches every address.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let mut head = [0u8; FAST_CHECK_CHARS];
        let head_len = prefix.len().min(FAST_CHECK_CHARS);
        head[..head_len].copy_from_slice(&prefix.as_bytes()[..head_len]);

        Self {
            prefix,
            head,
            head_len,
        }
    }

    /// Returns the prefix string.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Cheap filter on the raw public key.
    ///
    /// Compares only the first one or two characters of the encoding, so it
    /// admits false positives; it never rejects a key that [`matches`] accepts.
    ///
    /// [`matches`]: PrefixMatcher::matches
    #[inline]
    pub fn fast_check(&self, public_key: &[u8; 32]) -> bool {
        if self.head_len == 0 {
            return true;
        }

        let mut buf = [0u8; MAX_ADDRESS_LEN];
        match encode_ascii(public_key, &mut buf) {
            Some(encoded) => {
                encoded.len() >= self.head_len && encoded[..self.head_len] == self.head[..self.head_len]
            }
            // Leave the decision to the authoritative check.
            None => true,
        }
    }

    /// Authoritative check against the full canonical address string.
    #[inline]
    pub fn matches(&self, address: &Address) -> MatchResult {
        if address.to_base58().starts_with(&self.prefix) {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }

    /// Returns the estimated difficulty (number of attempts to find a match).
    ///
    /// Each base-58 character has 58 possible values, so the expected number
    /// of attempts is roughly 58^n. Leading-character bias of base-58 is ignored.
    pub fn estimated_difficulty(&self) -> u64 {
        58u64.saturating_pow(self.prefix.chars().count() as u32)
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=3_364 => "Very Easy (< 1 second)".into(),
            3_365..=195_112 => "Easy (seconds)".into(),
            195_113..=11_316_496 => "Medium (minutes to hours)".into(),
            11_316_497..=656_356_768 => "Hard (days)".into(),
            _ => "Very Hard (weeks or more)".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn address_of(seed: u8) -> Address {
        Keypair::from_seed(&[seed; 32]).address()
    }

    #[test]
    fn test_prefix_match() {
        let addr = address_of(1);
        let rendered = addr.to_base58();
        let matcher = PrefixMatcher::new(&rendered[..3]);
        assert!(matcher.fast_check(addr.as_bytes()));
        assert!(matcher.matches(&addr).is_match());
    }

    #[test]
    fn test_full_address_match() {
        let addr = address_of(2);
        let matcher = PrefixMatcher::new(addr.to_base58());
        assert!(matcher.matches(&addr).is_match());
    }

    #[test]
    fn test_prefix_no_match() {
        let addr = address_of(3);
        let rendered = addr.to_base58();
        let mut wrong = rendered[..4].to_string();
        // Change the last character to a different base-58 digit.
        let replacement = if wrong.ends_with('z') { 'y' } else { 'z' };
        wrong.pop();
        wrong.push(replacement);

        let matcher = PrefixMatcher::new(wrong);
        assert!(!matcher.matches(&addr).is_match());
    }

    #[test]
    fn test_case_sensitive() {
        // First address whose leading character is a letter.
        let (addr, head) = (0..=255u8)
            .map(address_of)
            .find_map(|addr| {
                let head = addr.to_base58().chars().next()?;
                head.is_ascii_alphabetic().then_some((addr, head))
            })
            .unwrap();

        let flipped = if head.is_ascii_uppercase() {
            head.to_ascii_lowercase()
        } else {
            head.to_ascii_uppercase()
        };
        assert_ne!(head, flipped);

        let exact = PrefixMatcher::new(head.to_string());
        let other_case = PrefixMatcher::new(flipped.to_string());
        assert!(exact.matches(&addr).is_match());
        assert!(!other_case.matches(&addr).is_match());
        assert!(!other_case.fast_check(addr.as_bytes()));
    }

    #[test]
    fn test_empty_prefix_always_matches() {
        let matcher = PrefixMatcher::new("");
        let addr = address_of(5);
        assert!(matcher.fast_check(addr.as_bytes()));
        assert!(matcher.matches(&addr).is_match());
    }

    #[test]
    fn test_fast_check_is_superset() {
        for seed in 0..=255u8 {
            let addr = address_of(seed);
            let rendered = addr.to_base58();
            for len in 1..=4 {
                let matcher = PrefixMatcher::new(&rendered[..len]);
                assert!(matcher.matches(&addr).is_match());
                assert!(matcher.fast_check(addr.as_bytes()));
            }
        }
    }

    #[test]
    fn test_fast_check_rejects_wrong_head() {
        let addr = Address::from_bytes([0u8; 32]);
        // All-zero key renders as "111...1".
        assert!(PrefixMatcher::new("1").fast_check(addr.as_bytes()));
        assert!(!PrefixMatcher::new("2").fast_check(addr.as_bytes()));
        assert!(!PrefixMatcher::new("12").fast_check(addr.as_bytes()));
    }

    #[test]
    fn test_fast_check_admits_false_positives() {
        let addr = Address::from_bytes([0u8; 32]);
        let matcher = PrefixMatcher::new("11A");
        assert!(matcher.fast_check(addr.as_bytes()));
        assert!(!matcher.matches(&addr).is_match());
    }

    #[test]
    fn test_difficulty() {
        assert_eq!(PrefixMatcher::new("").estimated_difficulty(), 1);
        assert_eq!(PrefixMatcher::new("SoL").estimated_difficulty(), 195_112); // 58^3
    }
}
