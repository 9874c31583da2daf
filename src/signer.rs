//! Seams to the cryptographic collaborators
//!
//! The detached signature over a signature header and the inspection of a
//! finished signature are done elsewhere; this crate only moves their bytes.

use std::fmt;

use crate::error::{JarError, JarResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque, binary-encoded detached signature (a DER PKCS#7 message for XPI
/// signing). Written verbatim as `META-INF/<name>.rsa`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignatureBlob(Vec<u8>);

impl SignatureBlob {
    /// Wrap raw signature bytes
    pub const fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unwrap the raw bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for SignatureBlob {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl AsRef<[u8]> for SignatureBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Serial number of a signing certificate, big-endian.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialNumber(Vec<u8>);

impl SerialNumber {
    /// Build from big-endian bytes. Leading zero bytes are dropped.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        Self(bytes.get(start..).unwrap_or_default().to_vec())
    }

    /// Big-endian bytes without leading zeros
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Value as an integer, when it fits in 128 bits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0.len() > 16 {
            return None;
        }
        Some(self.0.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b)))
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("00")
        } else {
            f.write_str(&hex::encode(&self.0))
        }
    }
}

/// Produces a detached signature over the signature header.
pub trait Signer {
    /// Error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sign `detached_content`, the exact bytes of the signature header.
    /// # Errors
    /// Returns an error if signing fails
    fn sign(&self, detached_content: &[u8]) -> Result<SignatureBlob, Self::Error>;
}

/// Reads metadata out of a finished signature.
pub trait SignatureInspector {
    /// Error type
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serial number of the certificate that produced `blob`.
    /// # Errors
    /// Returns an error if the blob cannot be decoded
    fn serial_number(&self, blob: &SignatureBlob) -> Result<SerialNumber, Self::Error>;
}

/// Serial number of `blob` read through `inspector`.
/// # Errors
/// Returns [`JarError::Inspection`] wrapping the inspector's error.
pub fn serial_number_of<I: SignatureInspector>(
    inspector: &I,
    blob: &SignatureBlob,
) -> JarResult<SerialNumber> {
    inspector
        .serial_number(blob)
        .map_err(|err| JarError::Inspection(Box::new(err)))
}
