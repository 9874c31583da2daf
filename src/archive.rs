//! Zip container access - JAR and XPI packages are zip files
//!
//! Reading hands out every entry in central directory order together with its
//! full contents; writing takes entries one by one. Both are whole-buffer
//! operations.

use std::io::{Read, Seek, Write};

use tracing::debug;
use zip::{write::SimpleFileOptions, CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::JarResult;

/// Directory holding the manifest and signature files
pub const META_INF: &str = "META-INF";

/// Path of the manifest inside the archive
pub const MANIFEST_PATH: &str = "META-INF/manifest.mf";

/// Path of the optional ids payload inside the archive
pub const IDS_PATH: &str = "META-INF/ids.json";

/// Files left behind by a previous signing pass, lower case. They are never
/// digested and never copied, so an archive only ever carries one signature.
const SIGNATURE_ARTIFACTS: [&str; 5] = [
    "meta-inf/manifest.mf",
    "meta-inf/*.sf",
    "meta-inf/*.rsa",
    "meta-inf/*.dsa",
    "meta-inf/ids.json",
];

/// One entry of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Full name inside the archive
    pub name: String,
    /// Uncompressed contents
    pub data: Vec<u8>,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Modification time, if recorded
    pub last_modified: Option<DateTime>,
    /// Unix permission bits, if recorded
    pub unix_mode: Option<u32>,
}

impl ArchiveEntry {
    /// Create a file entry without timestamp or permissions.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let is_dir = is_directory(&name);
        Self {
            name,
            data,
            is_dir,
            last_modified: None,
            unix_mode: None,
        }
    }
}

/// Whether a name denotes a directory pseudo-entry.
pub fn is_directory(name: &str) -> bool {
    name.ends_with('/') || name.ends_with('\\')
}

/// Whether a name is one of the signature artifacts of a previous signing pass.
///
/// Matching ignores case: `META-INF/MANIFEST.MF` and `META-INF/manifest.mf`
/// are the same file to every consumer of these archives.
pub fn is_signature_artifact(name: &str) -> bool {
    let name = name.to_lowercase();
    SIGNATURE_ARTIFACTS
        .iter()
        .any(|pattern| glob_match(pattern.as_bytes(), name.as_bytes()))
}

/// Match `name` against `pattern`, where `*` stands for any run of bytes
/// within one path component.
fn glob_match(pattern: &[u8], name: &[u8]) -> bool {
    match pattern.split_first() {
        None => name.is_empty(),
        Some((b'*', rest)) => {
            let component = name.iter().position(|&b| b == b'/').unwrap_or(name.len());
            (0..=component).any(|skip| {
                name.get(skip..)
                    .is_some_and(|tail| glob_match(rest, tail))
            })
        }
        Some((&expected, rest)) => match name.split_first() {
            Some((&actual, tail)) => actual == expected && glob_match(rest, tail),
            None => false,
        },
    }
}

/// Read every entry of an archive in central directory order.
/// # Errors
/// Returns an error if the container is invalid or cannot be read.
pub fn read_entries<R: Read + Seek>(reader: R) -> JarResult<Vec<ArchiveEntry>> {
    let mut archive = ZipArchive::new(reader)?;
    let mut entries = Vec::with_capacity(archive.len());
    for idx in 0..archive.len() {
        let mut file = archive.by_index(idx)?;
        let mut data = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
        file.read_to_end(&mut data)?;
        entries.push(ArchiveEntry {
            name: file.name().to_string(),
            is_dir: file.is_dir(),
            last_modified: file.last_modified(),
            unix_mode: file.unix_mode(),
            data,
        });
    }
    debug!(entries = entries.len(), "read archive");
    Ok(entries)
}

/// Writes a new archive entry by entry.
pub struct ArchiveWriter<W: Write + Seek> {
    /// Underlying zip writer
    inner: ZipWriter<W>,
    /// Compression applied to every file entry
    compression: CompressionMethod,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    /// Start a new archive.
    pub fn new(writer: W, compression: CompressionMethod) -> Self {
        Self {
            inner: ZipWriter::new(writer),
            compression,
        }
    }

    /// Options for a new entry, keeping timestamp and permissions of the source.
    fn options(&self, last_modified: Option<DateTime>, unix_mode: Option<u32>) -> SimpleFileOptions {
        let mut options = SimpleFileOptions::default().compression_method(self.compression);
        if let Some(time) = last_modified {
            options = options.last_modified_time(time);
        }
        if let Some(mode) = unix_mode {
            options = options.unix_permissions(mode);
        }
        options
    }

    /// Add a file with the given contents.
    /// # Errors
    /// Returns an error if the entry cannot be written.
    pub fn write_file(&mut self, name: &str, data: &[u8]) -> JarResult<()> {
        let options = self.options(None, None);
        self.inner.start_file(name, options)?;
        self.inner.write_all(data)?;
        Ok(())
    }

    /// Copy an entry read from another archive.
    /// # Errors
    /// Returns an error if the entry cannot be written.
    pub fn write_entry(&mut self, entry: &ArchiveEntry) -> JarResult<()> {
        let options = self.options(entry.last_modified, entry.unix_mode);
        if entry.is_dir {
            self.inner.add_directory(entry.name.as_str(), options)?;
        } else {
            self.inner.start_file(entry.name.as_str(), options)?;
            self.inner.write_all(&entry.data)?;
        }
        Ok(())
    }

    /// Write the central directory and hand back the underlying writer.
    /// # Errors
    /// Returns an error if the archive cannot be finished.
    pub fn finish(self) -> JarResult<W> {
        Ok(self.inner.finish()?)
    }
}
