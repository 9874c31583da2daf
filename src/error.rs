//! Error types for manifest parsing, archive digesting and signed archive assembly.

use std::path::PathBuf;

/// Result type used across the crate.
pub type JarResult<T> = Result<T, JarError>;

/// Boxed error returned by external collaborators (signers, inspectors).
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A grammar violation found while parsing a manifest or signature file.
///
/// Parsing never returns a partially recovered document: the first violation
/// aborts the whole parse call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("manifest parsing error at line {line}: {kind}")]
pub struct ParsingError {
    /// 1-based number of the offending physical line.
    pub line: usize,
    /// What went wrong on that line.
    pub kind: ParsingErrorKind,
}

impl ParsingError {
    /// Create a new parsing error for the given line.
    pub const fn new(line: usize, kind: ParsingErrorKind) -> Self {
        Self { line, kind }
    }
}

/// The kinds of grammar violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsingErrorKind {
    /// A physical line is longer than the 72 byte limit.
    #[error("line too long ({0} bytes)")]
    LineTooLong(usize),

    /// A continuation line appeared without a header to continue.
    #[error("continued line without previous header")]
    ContinuationWithoutHeader,

    /// The line is neither blank, a header, nor a continuation.
    #[error("unrecognized line format: \"{0}\"")]
    UnrecognizedLine(String),

    /// A digest value is not valid base64.
    #[error("invalid base64 value for {header}")]
    InvalidDigest {
        /// Header whose value failed to decode.
        header: String,
    },
}

/// Assembly was asked to write somewhere it must not.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputConflict {
    /// Neither the call nor the configuration named an output file.
    #[error("no output file specified")]
    Unspecified,

    /// The output file already exists and is never overwritten.
    #[error("file already exists: {}", .0.display())]
    Exists(PathBuf),
}

/// Crate-wide error.
#[derive(Debug, thiserror::Error)]
pub enum JarError {
    /// Manifest or signature text could not be parsed.
    #[error(transparent)]
    Parsing(#[from] ParsingError),

    /// The output path of a signed archive is missing or taken.
    #[error("output conflict: {0}")]
    OutputConflict(#[from] OutputConflict),

    /// Filesystem I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Reading or writing the zip container failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The external signer failed.
    #[error("signer error: {0}")]
    Signer(CollaboratorError),

    /// The signature blob could not be inspected.
    #[error("signature inspection error: {0}")]
    Inspection(CollaboratorError),
}
