//! # Manifest and signature files
//!
//! `META-INF/manifest.mf` and `META-INF/<name>.sf` share one line grammar:
//!
//! ```text
//! Manifest-Version: 1.0
//!
//! Name: install.rdf
//! Digest-Algorithms: MD5 SHA1
//! MD5-Digest: <base64>
//! SHA1-Digest: <base64>
//!
//! Name: a/very/long/name/that/does/not/fit/on/one/physical/line/of/seventy-tw
//!  o/bytes.js
//! ...
//! ```
//!
//! A signature file replaces `Manifest-Version` with `Signature-Version`, adds
//! one `<ALGO>-Digest-Manifest` line per algorithm to its header and may leave
//! out its sections entirely.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::digest::Digests;
use crate::error::ParsingError;

pub mod parse;
pub mod section;

pub use section::Section;

/// Maximum length of one physical line, in bytes.
pub const MAX_LINE_LEN: usize = 72;

/// Version written in every header.
pub const DEFAULT_VERSION: &str = "1.0";

/// What sets a document kind apart when it is written.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DocumentKind<'a> {
    /// Prefix of the `-Version` header
    label: &'static str,
    /// Digests written as `<ALGO>-Digest-Manifest` header lines
    header_extra: Option<&'a Digests>,
    /// Only the header is written
    suppress_body: bool,
}

impl DocumentKind<'static> {
    /// Plain manifest
    pub(crate) const MANIFEST: Self = Self {
        label: "Manifest",
        header_extra: None,
        suppress_body: false,
    };
}

impl<'a> DocumentKind<'a> {
    /// Signature file carrying the digest of the whole manifest.
    pub(crate) const fn signature(digest_manifests: &'a Digests, suppress_body: bool) -> Self {
        Self {
            label: "Signature",
            header_extra: Some(digest_manifests),
            suppress_body,
        }
    }
}

/// Write the header lines of a document, without the final newline.
fn write_header(
    f: &mut impl fmt::Write,
    kind: DocumentKind<'_>,
    version: &str,
    extra_newline: bool,
) -> fmt::Result {
    write!(f, "{}-Version: {}", kind.label, version)?;
    if let Some(digests) = kind.header_extra {
        for (algo, digest) in digests {
            write!(
                f,
                "\n{}-Digest-Manifest: {}",
                algo.to_uppercase(),
                STANDARD.encode(digest)
            )?;
        }
        if extra_newline {
            f.write_str("\n")?;
        }
    }
    Ok(())
}

/// Write a whole document: header, one blank line, then the sections
/// separated by blank lines.
pub(crate) fn write_document(
    f: &mut impl fmt::Write,
    kind: DocumentKind<'_>,
    version: &str,
    sections: &[Section],
    extra_newline: bool,
) -> fmt::Result {
    write_header(f, kind, version, extra_newline)?;
    if kind.suppress_body {
        return f.write_str("\n");
    }
    f.write_str("\n\n")?;
    for (idx, section) in sections.iter().enumerate() {
        if idx > 0 {
            f.write_str("\n")?;
        }
        write!(f, "{section}")?;
    }
    if extra_newline {
        f.write_str("\n")?;
    }
    Ok(())
}

/// `META-INF/manifest.mf`: the digests of every archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Manifest {
    /// Value of the `Manifest-Version` header
    version: String,
    /// Sections, in the order they are written
    sections: Vec<Section>,
    /// Whether one blank line ends the document
    extra_newline: bool,
}

impl Manifest {
    /// Create a manifest from sections, keeping their order.
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            sections,
            extra_newline: false,
        }
    }

    /// Set whether a blank line ends the document.
    #[must_use]
    pub const fn with_extra_newline(mut self, extra_newline: bool) -> Self {
        self.extra_newline = extra_newline;
        self
    }

    /// Parse a manifest.
    /// # Errors
    /// Returns a [`ParsingError`] on the first grammar violation.
    pub fn parse(text: &str) -> Result<Self, ParsingError> {
        let doc = parse::parse_document(text)?;
        let extra_newline = doc.extra_newline_after_body(!doc.sections.is_empty());
        Ok(Self {
            version: doc.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            sections: doc.sections,
            extra_newline,
        })
    }

    /// Parse a manifest from raw file contents.
    /// # Errors
    /// Returns a [`ParsingError`] on invalid UTF-8 or any grammar violation.
    pub fn parse_bytes(data: &[u8]) -> Result<Self, ParsingError> {
        Self::parse(parse::decode_utf8(data)?)
    }

    /// Header version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sections in document order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Whether a blank line ends the document
    pub const fn extra_newline(&self) -> bool {
        self.extra_newline
    }

    /// The `Manifest-Version` line.
    pub fn header(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_header(&mut out, DocumentKind::MANIFEST, &self.version, false);
        out
    }

    /// Serialized document as written into the archive.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_document(
            f,
            DocumentKind::MANIFEST,
            &self.version,
            &self.sections,
            self.extra_newline,
        )
    }
}

/// `META-INF/<name>.sf`: digests of the manifest and of each of its sections.
///
/// The header is what gets signed. With `omit_body` set, the sections stay
/// available in memory but only the header is written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Signature {
    /// Value of the `Signature-Version` header
    version: String,
    /// Digests of the manifest sections
    sections: Vec<Section>,
    /// Digests of the whole serialized manifest
    digest_manifests: Digests,
    /// Only the header is written
    omit_body: bool,
    /// Whether blank lines end the header and the document
    extra_newline: bool,
}

impl Signature {
    /// Create a signature document.
    pub fn new(sections: Vec<Section>, digest_manifests: Digests) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            sections,
            digest_manifests: digest_manifests
                .into_iter()
                .map(|(algo, digest)| (algo.to_lowercase(), digest))
                .collect(),
            omit_body: false,
            extra_newline: false,
        }
    }

    /// Set whether the individual sections are left out when written.
    #[must_use]
    pub const fn with_omit_body(mut self, omit_body: bool) -> Self {
        self.omit_body = omit_body;
        self
    }

    /// Set whether blank lines end the header and the document.
    #[must_use]
    pub const fn with_extra_newline(mut self, extra_newline: bool) -> Self {
        self.extra_newline = extra_newline;
        self
    }

    /// Parse a signature file.
    ///
    /// A document without sections is read back with `omit_body` set.
    /// # Errors
    /// Returns a [`ParsingError`] on the first grammar violation.
    pub fn parse(text: &str) -> Result<Self, ParsingError> {
        let doc = parse::parse_document(text)?;
        let (omit_body, extra_newline) = if doc.sections.is_empty() {
            // header + "\n", with one more when the header ends blank
            match doc.trailing_newlines {
                0 | 1 => (true, false),
                2 => (true, true),
                _ => (false, true),
            }
        } else {
            (false, doc.extra_newline_after_body(true))
        };
        Ok(Self {
            version: doc.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            sections: doc.sections,
            digest_manifests: doc.digest_manifests,
            omit_body,
            extra_newline,
        })
    }

    /// Parse a signature file from raw file contents.
    /// # Errors
    /// Returns a [`ParsingError`] on invalid UTF-8 or any grammar violation.
    pub fn parse_bytes(data: &[u8]) -> Result<Self, ParsingError> {
        Self::parse(parse::decode_utf8(data)?)
    }

    /// Header version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sections in document order, present even when `omit_body` is set
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Digests of the whole manifest
    pub const fn digest_manifests(&self) -> &Digests {
        &self.digest_manifests
    }

    /// Whether only the header is written
    pub const fn omit_body(&self) -> bool {
        self.omit_body
    }

    /// Whether blank lines end the header and the document
    pub const fn extra_newline(&self) -> bool {
        self.extra_newline
    }

    /// Document kind used to write this signature.
    const fn kind(&self) -> DocumentKind<'_> {
        DocumentKind::signature(&self.digest_manifests, self.omit_body)
    }

    /// `<ALGO>-Digest-Manifest` lines, sorted by algorithm.
    pub fn digest_manifest_lines(&self) -> Vec<String> {
        self.digest_manifests
            .iter()
            .map(|(algo, digest)| {
                format!(
                    "{}-Digest-Manifest: {}",
                    algo.to_uppercase(),
                    STANDARD.encode(digest)
                )
            })
            .collect()
    }

    /// The version line followed by the digest-manifest lines.
    pub fn header(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_header(&mut out, self.kind(), &self.version, self.extra_newline);
        out
    }

    /// Serialized document as written into the archive.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_document(
            f,
            self.kind(),
            &self.version,
            &self.sections,
            self.extra_newline,
        )
    }
}
