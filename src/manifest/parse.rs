//! Line parser shared by manifest and signature files.

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::debug;

use crate::archive::is_directory;
use crate::digest::Digests;
use crate::error::{ParsingError, ParsingErrorKind};
use crate::manifest::{Section, MAX_LINE_LEN};

/// A recognized header name.
#[derive(Debug, Clone, PartialEq, Eq)]
enum HeaderKey {
    /// `Manifest-Version` or `Signature-Version`
    Version,
    /// `Name`
    Name,
    /// `Digest-Algorithms`
    DigestAlgorithms,
    /// `<ALGO>-Digest`, algorithm in lower case
    Digest(String),
    /// `<ALGO>-Digest-Manifest`, algorithm in lower case
    DigestManifest(String),
}

impl HeaderKey {
    /// Recognize a header name, case-insensitively.
    fn parse(key: &str) -> Option<Self> {
        let key = key.to_lowercase();
        match key.as_str() {
            "manifest-version" | "signature-version" => Some(Self::Version),
            "name" => Some(Self::Name),
            "digest-algorithms" => Some(Self::DigestAlgorithms),
            _ => {
                if let Some(algo) = key.strip_suffix("-digest-manifest") {
                    is_algorithm(algo).then(|| Self::DigestManifest(algo.to_string()))
                } else if let Some(algo) = key.strip_suffix("-digest") {
                    is_algorithm(algo).then(|| Self::Digest(algo.to_string()))
                } else {
                    None
                }
            }
        }
    }
}

/// Algorithm tokens are plain alphanumerics, e.g. `md5`, `sha1`, `sha256`.
fn is_algorithm(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// A header whose value may still grow through continuation lines.
#[derive(Debug)]
struct PendingHeader {
    /// Header name
    key: HeaderKey,
    /// Value accumulated so far
    value: String,
    /// Line the header started on
    line: usize,
}

/// Section being assembled between two blank lines.
#[derive(Debug, Default)]
struct SectionBuilder {
    /// `Name` value
    name: Option<String>,
    /// The `Name` was a directory; the whole section is dropped
    directory: bool,
    /// `Digest-Algorithms` value
    algorithms: Option<Vec<String>>,
    /// `<ALGO>-Digest` values
    digests: Digests,
}

impl SectionBuilder {
    /// Whether any section header was seen.
    fn is_empty(&self) -> bool {
        self.name.is_none() && !self.directory && self.algorithms.is_none() && self.digests.is_empty()
    }

    /// Turn the collected headers into a section, if it has a usable name.
    fn finish(self, line: usize) -> Option<Section> {
        if self.directory {
            return None;
        }
        let Some(name) = self.name else {
            debug!(line, "dropping manifest section without a name");
            return None;
        };
        if let Some(announced) = &self.algorithms {
            let mut announced = announced.clone();
            announced.sort();
            announced.dedup();
            if !announced.iter().eq(self.digests.keys()) {
                debug!(line, name = %name, ?announced, "digest algorithms differ from digest lines");
            }
        }
        Some(Section::new(name, self.digests))
    }
}

/// Everything read from one document.
#[derive(Debug, Default)]
pub(crate) struct ParsedDocument {
    /// `*-Version` value, if any
    pub(crate) version: Option<String>,
    /// Sections in document order
    pub(crate) sections: Vec<Section>,
    /// `<ALGO>-Digest-Manifest` values
    pub(crate) digest_manifests: Digests,
    /// Number of newline characters ending the text
    pub(crate) trailing_newlines: usize,
}

impl ParsedDocument {
    /// Whether the text ends with the optional blank line after the body.
    ///
    /// A document with sections normally ends in a single newline. An empty
    /// body already leaves a blank line after the header, so one more is needed.
    pub(crate) const fn extra_newline_after_body(&self, has_sections: bool) -> bool {
        if has_sections {
            self.trailing_newlines >= 2
        } else {
            self.trailing_newlines >= 3
        }
    }
}

/// Document-level state while walking the lines.
#[derive(Debug, Default)]
struct Parser {
    /// Result so far
    doc: ParsedDocument,
    /// Current section
    section: SectionBuilder,
    /// Header that continuation lines extend
    pending: Option<PendingHeader>,
}

impl Parser {
    /// Store the pending header, if any.
    fn flush_header(&mut self) -> Result<(), ParsingError> {
        let Some(PendingHeader { key, value, line }) = self.pending.take() else {
            return Ok(());
        };
        match key {
            HeaderKey::Version => self.doc.version = Some(value),
            HeaderKey::DigestManifest(algo) => {
                let digest = decode_digest(&value, line, &algo, "-Digest-Manifest")?;
                self.doc.digest_manifests.insert(algo, digest);
            }
            HeaderKey::Name => {
                if is_directory(&value) {
                    debug!(line, name = %value, "ignoring directory entry in manifest");
                    self.section.directory = true;
                } else {
                    self.section.name = Some(value);
                }
            }
            HeaderKey::DigestAlgorithms => {
                self.section.algorithms = Some(
                    value
                        .split_whitespace()
                        .map(str::to_lowercase)
                        .collect(),
                );
            }
            HeaderKey::Digest(algo) => {
                let digest = decode_digest(&value, line, &algo, "-Digest")?;
                self.section.digests.insert(algo, digest);
            }
        }
        Ok(())
    }

    /// A blank line ends the current header and section.
    fn end_section(&mut self, line: usize) -> Result<(), ParsingError> {
        self.flush_header()?;
        let section = std::mem::take(&mut self.section);
        if !section.is_empty() {
            if let Some(section) = section.finish(line) {
                self.doc.sections.push(section);
            }
        }
        Ok(())
    }

    /// Handle one physical line, without its line terminator.
    fn line(&mut self, lineno: usize, line: &str) -> Result<(), ParsingError> {
        if line.len() > MAX_LINE_LEN {
            return Err(ParsingError::new(
                lineno,
                ParsingErrorKind::LineTooLong(line.len()),
            ));
        }
        if let Some(rest) = line.strip_prefix(' ') {
            return match self.pending.as_mut() {
                Some(pending) => {
                    pending.value.push_str(rest);
                    Ok(())
                }
                None => Err(ParsingError::new(
                    lineno,
                    ParsingErrorKind::ContinuationWithoutHeader,
                )),
            };
        }
        if line.is_empty() {
            return self.end_section(lineno);
        }
        // Values keep everything after the single space that follows the colon.
        let header = line.split_once(':').and_then(|(key, value)| {
            HeaderKey::parse(key.trim_end())
                .map(|key| (key, value.strip_prefix(' ').unwrap_or(value)))
        });
        let Some((key, value)) = header else {
            return Err(ParsingError::new(
                lineno,
                ParsingErrorKind::UnrecognizedLine(line.to_string()),
            ));
        };
        self.flush_header()?;
        self.pending = Some(PendingHeader {
            key,
            value: value.to_string(),
            line: lineno,
        });
        Ok(())
    }
}

/// Decode a base64 digest value.
fn decode_digest(
    value: &str,
    line: usize,
    algo: &str,
    suffix: &str,
) -> Result<Vec<u8>, ParsingError> {
    STANDARD.decode(value.trim()).map_err(|_| {
        ParsingError::new(
            line,
            ParsingErrorKind::InvalidDigest {
                header: format!("{}{}", algo.to_uppercase(), suffix),
            },
        )
    })
}

/// Parse the line grammar into its parts.
///
/// The grammar wants two blank lines at the end of the text; they are always
/// appended here, which is harmless when the text already has them.
pub(crate) fn parse_document(text: &str) -> Result<ParsedDocument, ParsingError> {
    let mut parser = Parser::default();
    let lines = text.split('\n').chain(["", ""]);
    let mut last = 0;
    for (idx, raw) in lines.enumerate() {
        last = idx + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        parser.line(last, line)?;
    }
    parser.end_section(last)?;
    let mut doc = parser.doc;
    doc.trailing_newlines = trailing_newlines(text);
    Ok(doc)
}

/// Number of line terminators ending `text`, counting `\r\n` as one.
fn trailing_newlines(text: &str) -> usize {
    let mut rest = text;
    let mut count = 0;
    while let Some(head) = rest.strip_suffix('\n') {
        rest = head.strip_suffix('\r').unwrap_or(head);
        count += 1;
    }
    count
}

/// Interpret raw file contents as UTF-8, reporting the line of the first bad byte.
pub(crate) fn decode_utf8(data: &[u8]) -> Result<&str, ParsingError> {
    std::str::from_utf8(data).map_err(|err| {
        let valid = data.get(..err.valid_up_to()).unwrap_or_default();
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        let start = valid
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        let rest = data.get(start..).unwrap_or_default();
        let text = rest.split(|&b| b == b'\n').next().unwrap_or_default();
        ParsingError::new(
            line,
            ParsingErrorKind::UnrecognizedLine(String::from_utf8_lossy(text).into_owned()),
        )
    })
}
