//! One named digest record of a manifest or signature file.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::digest::{digest_set, Digests};
use crate::manifest::MAX_LINE_LEN;

/// Marker that starts every continuation line.
const CONTINUATION: &str = "\n ";

/// A `Name:` record with its digests.
///
/// Sections are immutable once built. The algorithm names are kept in
/// lower case and always match the keys of the digest map.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Section {
    /// Entry name, never ending in a path separator
    name: String,
    /// Algorithm names, lower case and sorted
    algorithms: Vec<String>,
    /// Raw digests by lower-case algorithm name
    digests: Digests,
}

impl Section {
    /// Create a section from already computed digests.
    pub fn new(name: impl Into<String>, digests: Digests) -> Self {
        let digests = lowercase_keys(digests);
        let algorithms = digests.keys().cloned().collect();
        Self {
            name: name.into(),
            algorithms,
            digests,
        }
    }

    /// Create a section holding the digest set of `data`.
    pub fn from_data(name: impl Into<String>, data: &[u8]) -> Self {
        Self::new(name, digest_set(data))
    }

    /// Entry name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Algorithm names, lower case and sorted
    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    /// Raw digests by lower-case algorithm name
    pub const fn digests(&self) -> &Digests {
        &self.digests
    }

    /// Raw digest of one algorithm, if present.
    pub fn digest(&self, algorithm: &str) -> Option<&[u8]> {
        self.digests
            .get(&algorithm.to_lowercase())
            .map(Vec::as_slice)
    }
}

/// Lower-case every key; the map then iterates in case-insensitive order.
fn lowercase_keys(digests: Digests) -> Digests {
    digests
        .into_iter()
        .map(|(algo, digest)| (algo.to_lowercase(), digest))
        .collect()
}

/// Largest char boundary of `s` that is not past `max` bytes.
fn split_point(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (1..=max)
        .rev()
        .find(|&idx| s.is_char_boundary(idx))
        .unwrap_or(s.len())
}

/// Write `line` folded into physical lines of at most [`MAX_LINE_LEN`] bytes.
///
/// Continuation lines carry one leading space, which counts against the limit.
/// Lines are only cut on char boundaries so every physical line stays UTF-8.
pub(crate) fn write_wrapped(f: &mut impl fmt::Write, line: &str) -> fmt::Result {
    let first = split_point(line, MAX_LINE_LEN);
    let (head, mut rest) = line.split_at(first);
    f.write_str(head)?;
    while !rest.is_empty() {
        let cut = split_point(rest, MAX_LINE_LEN - 1);
        let (head, tail) = rest.split_at(cut);
        f.write_str(CONTINUATION)?;
        f.write_str(head)?;
        rest = tail;
    }
    f.write_str("\n")
}

impl fmt::Display for Section {
    // Newline placement is significant: a signature digests this exact text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_wrapped(f, &format!("Name: {}", self.name))?;
        f.write_str("Digest-Algorithms:")?;
        for algo in self.digests.keys() {
            write!(f, " {}", algo.to_uppercase())?;
        }
        f.write_str("\n")?;
        for (algo, digest) in &self.digests {
            writeln!(f, "{}-Digest: {}", algo.to_uppercase(), STANDARD.encode(digest))?;
        }
        Ok(())
    }
}
