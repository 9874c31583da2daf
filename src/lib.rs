//! # JAR signing files
//! This library produces and reads the `META-INF/manifest.mf` and
//! `META-INF/<name>.sf` files of signed JAR/XPI packages, and rebuilds a
//! package with a detached signature inserted.
//!
//! ```no_run
//! use jarsig::{ExtractorConfig, JarExtractor};
//!
//! # fn main() -> jarsig::JarResult<()> {
//! let jar = JarExtractor::open("addon.xpi", ExtractorConfig::new())?;
//! let to_sign = jar.signature();
//! # let pkcs7 = to_sign.into_bytes();
//! jar.make_signed(&pkcs7, Some("addon-signed.xpi".as_ref()), Some("zigbert.rsa"))?;
//! # Ok(())
//! # }
//! ```
//!
//! CLI usage:
//! ```shell
//! cargo install jarsig
//! jarsig manifest <archive>
//! ```
//!

#![deny(
    missing_docs,
    clippy::all,
    clippy::missing_docs_in_private_items,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    // clippy::arithmetic_side_effects,
    // clippy::pedantic,
    clippy::nursery
)]
#![warn(clippy::multiple_crate_versions)]

pub mod archive;
pub mod digest;
pub mod error;
pub mod extractor;
pub mod manifest;
pub mod ordering;
pub mod signer;

// Conditional modules
#[cfg(feature = "verify")]
pub mod inspect;

// re-export
pub use archive::{is_signature_artifact, ArchiveEntry};
pub use digest::{digest_set, Algorithms, Digests};
pub use error::{JarError, JarResult, OutputConflict, ParsingError, ParsingErrorKind};
pub use extractor::{ExtractorConfig, JarExtractor, DEFAULT_SIGNATURE_NAME};
pub use manifest::{Manifest, Section, Signature, MAX_LINE_LEN};
pub use ordering::{file_key, FileKey, Priority};
pub use signer::{serial_number_of, SerialNumber, SignatureBlob, SignatureInspector, Signer};

#[cfg(feature = "verify")]
pub use inspect::{InspectError, Pkcs7Inspector};

/// Compression methods accepted by [`ExtractorConfig::compression`]
pub use zip::CompressionMethod;
