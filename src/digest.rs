//! Digest sets: every supported algorithm applied to one buffer.

use std::collections::BTreeMap;

use sha1::{Digest, Sha1};

/// Mapping of lower-case algorithm name to raw digest bytes.
///
/// A `BTreeMap` keeps the algorithms sorted, which is the order they are
/// written in manifest sections.
pub type Digests = BTreeMap<String, Vec<u8>>;

/// Digest algorithms computed for archive entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithms {
    /// MD5, 16 bytes
    Md5,
    /// SHA-1, 20 bytes
    Sha1,
}

impl Algorithms {
    /// All algorithms that make up a digest set.
    pub const ALL: [Self; 2] = [Self::Md5, Self::Sha1];

    /// Lower-case name as used in section keys.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
        }
    }

    /// Length of the raw digest in bytes.
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
        }
    }

    /// Hash data
    pub fn hash(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => md5::compute(data).to_vec(),
            Self::Sha1 => {
                let mut hasher = Sha1::new();
                hasher.update(data);
                hasher.finalize().to_vec()
            }
        }
    }
}

impl std::fmt::Display for Algorithms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute the digest set of `data`: `{"md5": ..., "sha1": ...}`.
///
/// Any input is valid, including the empty buffer.
pub fn digest_set(data: &[u8]) -> Digests {
    Algorithms::ALL
        .iter()
        .map(|algo| (algo.name().to_string(), algo.hash(data)))
        .collect()
}
