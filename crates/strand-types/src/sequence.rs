use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Length in bytes of a computed sequence digest (128 bits).
pub const DIGEST_LEN: usize = 16;

/// Content-addressed key of an immutable sequence.
///
/// A `SequenceHash` is a lowercase hex string. [`SequenceHash::compute`]
/// derives a 128-bit digest from the sequence text, but callers may also
/// supply a digest they computed themselves; the store never re-hashes
/// content on read or write.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SequenceHash(String);

impl SequenceHash {
    /// Compute the 128-bit digest of a sequence.
    pub fn compute(sequence: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"strand-sequence-v1:");
        hasher.update(sequence.as_bytes());
        let digest = hasher.finalize();
        Self(hex::encode(&digest.as_bytes()[..DIGEST_LEN]))
    }

    /// Parse a caller-supplied hash. Upper-case hex is normalized.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidHash(value.to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SequenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SequenceHash({})", self.0)
    }
}

impl fmt::Display for SequenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SequenceHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SequenceHash {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SequenceHash> for String {
    fn from(hash: SequenceHash) -> Self {
        hash.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(SequenceHash::compute("ACGT"), SequenceHash::compute("ACGT"));
        assert_ne!(SequenceHash::compute("ACGT"), SequenceHash::compute("ACGA"));
    }

    #[test]
    fn computed_digest_is_128_bits() {
        let hash = SequenceHash::compute("ACGTACGT");
        assert_eq!(hash.as_str().len(), DIGEST_LEN * 2);
        assert!(hash.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_accepts_short_caller_digests() {
        let hash = SequenceHash::parse("abcd").unwrap();
        assert_eq!(hash.as_str(), "abcd");
    }

    #[test]
    fn parse_normalizes_case() {
        assert_eq!(SequenceHash::parse("ABCD").unwrap().as_str(), "abcd");
    }

    #[test]
    fn parse_rejects_non_hex() {
        for bad in ["", "xyz", "ab/cd", "../ab", "ab cd"] {
            assert_eq!(
                SequenceHash::parse(bad).unwrap_err(),
                TypeError::InvalidHash(bad.to_string())
            );
        }
    }

    proptest! {
        #[test]
        fn computed_hash_always_parses(seq in "[ACGT]{0,64}") {
            let hash = SequenceHash::compute(&seq);
            prop_assert_eq!(SequenceHash::parse(hash.as_str()).unwrap(), hash);
        }
    }
}
