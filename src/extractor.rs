//! Digest collection over an archive and assembly of the signed archive.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::{debug, info, warn};
use zip::CompressionMethod;

use crate::archive::{
    is_directory, is_signature_artifact, read_entries, ArchiveEntry, ArchiveWriter, IDS_PATH,
    MANIFEST_PATH, META_INF,
};
use crate::digest::digest_set;
use crate::error::{JarError, JarResult, OutputConflict};
use crate::manifest::{Manifest, Section, Signature};
use crate::ordering::sort_by_file_key;
use crate::signer::{SignatureBlob, Signer};

/// Basename of the signature files when the caller names none.
pub const DEFAULT_SIGNATURE_NAME: &str = "zigbert";

/// Configuration for digest collection and assembly
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Output used by [`JarExtractor::make_signed`] when the call names none
    output: Option<PathBuf>,
    /// Payload stored as `META-INF/ids.json`
    ids: Option<Vec<u8>>,
    /// Leave the individual sections out of the signature file
    omit_signature_sections: bool,
    /// End manifest and signature files with an extra blank line
    extra_newlines: bool,
    /// Compression of the written archive
    compression: CompressionMethod,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractorConfig {
    /// Default configuration: no ids payload, full signature file, deflate.
    pub const fn new() -> Self {
        Self {
            output: None,
            ids: None,
            omit_signature_sections: false,
            extra_newlines: false,
            compression: CompressionMethod::Deflated,
        }
    }

    /// Set the default output path
    #[must_use]
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Set the `META-INF/ids.json` payload
    #[must_use]
    pub fn ids(mut self, ids: impl Into<Vec<u8>>) -> Self {
        self.ids = Some(ids.into());
        self
    }

    /// Leave the individual sections out of the signature file
    #[must_use]
    pub const fn omit_signature_sections(mut self, omit: bool) -> Self {
        self.omit_signature_sections = omit;
        self
    }

    /// End manifest and signature files with an extra blank line
    #[must_use]
    pub const fn extra_newlines(mut self, extra: bool) -> Self {
        self.extra_newlines = extra;
        self
    }

    /// Set the compression of the written archive
    #[must_use]
    pub const fn compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }
}

/// Walks an archive and derives its manifest and signature files.
///
/// All digests are computed when the extractor is built. The manifest and
/// the signature are derived from them on first access and cached.
#[derive(Debug)]
pub struct JarExtractor {
    /// Source entries in archive order
    entries: Vec<ArchiveEntry>,
    /// One section per digested entry, in load order
    sections: Box<[Section]>,
    /// Configuration
    config: ExtractorConfig,
    /// Cached manifest
    manifest: OnceLock<Manifest>,
    /// Cached signature
    signatures: OnceLock<Signature>,
}

impl JarExtractor {
    /// Read and digest the archive at `path`.
    /// # Errors
    /// Returns an error if the file is missing or not a valid archive.
    pub fn open(path: impl AsRef<Path>, config: ExtractorConfig) -> JarResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening archive");
        Self::from_reader(BufReader::new(File::open(path)?), config)
    }

    /// Read and digest an archive.
    /// # Errors
    /// Returns an error if the archive cannot be read.
    pub fn from_reader<R: Read + Seek>(reader: R, config: ExtractorConfig) -> JarResult<Self> {
        Ok(Self::from_entries(read_entries(reader)?, config))
    }

    /// Digest entries that were already read, given in archive order.
    pub fn from_entries(entries: Vec<ArchiveEntry>, config: ExtractorConfig) -> Self {
        let mut digestible: Vec<&ArchiveEntry> = entries
            .iter()
            .filter(|entry| {
                if entry.is_dir || is_directory(&entry.name) {
                    return false;
                }
                if is_signature_artifact(&entry.name) {
                    debug!(name = %entry.name, "skipping signature artifact");
                    return false;
                }
                true
            })
            .collect();
        sort_by_file_key(&mut digestible, |entry| entry.name.as_str());

        let mut sections = digest_entries(&digestible);
        if let Some(ids) = &config.ids {
            sections.push(Section::from_data(IDS_PATH, ids));
        }
        info!(
            entries = entries.len(),
            sections = sections.len(),
            "collected archive digests"
        );

        Self {
            entries,
            sections: sections.into_boxed_slice(),
            config,
            manifest: OnceLock::new(),
            signatures: OnceLock::new(),
        }
    }

    /// Sections in load order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Source entries in archive order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Configuration
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The `META-INF/manifest.mf` document.
    pub fn manifest(&self) -> &Manifest {
        self.manifest.get_or_init(|| {
            Manifest::new(self.sections.to_vec()).with_extra_newline(self.config.extra_newlines)
        })
    }

    /// The `META-INF/<name>.sf` document.
    ///
    /// Each section holds the digests of the serialized manifest section of the
    /// same name, not of the entry itself.
    pub fn signatures(&self) -> &Signature {
        self.signatures.get_or_init(|| {
            let sections = self
                .sections
                .iter()
                .map(|section| Section::from_data(section.name(), section.to_string().as_bytes()))
                .collect();
            let digest_manifests = digest_set(&self.manifest().to_bytes());
            Signature::new(sections, digest_manifests)
                .with_omit_body(self.config.omit_signature_sections)
                .with_extra_newline(self.config.extra_newlines)
        })
    }

    /// The signature header, always newline terminated. This is the content
    /// a detached signature is computed over.
    pub fn signature(&self) -> String {
        format!("{}\n", self.signatures().header())
    }

    /// Sign the signature header with `signer` and write the signed archive.
    /// # Errors
    /// Returns an error if signing or assembly fails.
    pub fn sign_and_assemble<S: Signer>(
        &self,
        signer: &S,
        outpath: Option<&Path>,
        sigpath: Option<&str>,
    ) -> JarResult<SignatureBlob> {
        let blob = signer
            .sign(self.signature().as_bytes())
            .map_err(|err| JarError::Signer(Box::new(err)))?;
        self.make_signed(blob.as_bytes(), outpath, sigpath)?;
        Ok(blob)
    }

    /// Write the signed archive to a new file and return its path.
    ///
    /// `sigpath` is reduced to its file stem and placed in `META-INF/`.
    /// An existing file is never overwritten. If writing fails the partial
    /// output is removed.
    /// # Errors
    /// Returns an [`OutputConflict`] when no output is given or it exists,
    /// or the underlying I/O or archive error.
    pub fn make_signed(
        &self,
        signature: &[u8],
        outpath: Option<&Path>,
        sigpath: Option<&str>,
    ) -> JarResult<PathBuf> {
        let outpath = outpath
            .or(self.config.output.as_deref())
            .ok_or(OutputConflict::Unspecified)?;
        if outpath.exists() {
            return Err(OutputConflict::Exists(outpath.to_path_buf()).into());
        }
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(outpath)
            .map_err(|err| match err.kind() {
                io::ErrorKind::AlreadyExists => {
                    JarError::from(OutputConflict::Exists(outpath.to_path_buf()))
                }
                _ => JarError::from(err),
            })?;

        let sigpath = signature_path(sigpath.unwrap_or(DEFAULT_SIGNATURE_NAME));
        if let Err(err) = self.write_signed(BufWriter::new(file), signature, &sigpath) {
            warn!(path = %outpath.display(), error = %err, "removing partial signed archive");
            if let Err(rm_err) = fs::remove_file(outpath) {
                warn!(path = %outpath.display(), error = %rm_err, "failed to remove partial output");
            }
            return Err(err);
        }
        info!(path = %outpath.display(), signature = %sigpath, "wrote signed archive");
        Ok(outpath.to_path_buf())
    }

    /// Write the signed archive into `writer`.
    ///
    /// Entry order: `<sigpath>.rsa` first so streaming consumers see the
    /// signature before anything else, then the source entries in archive
    /// order minus old signature artifacts, then `META-INF/manifest.mf`,
    /// `<sigpath>.sf` and, if configured, `META-INF/ids.json`.
    /// # Errors
    /// Returns an error if any entry cannot be written.
    pub fn write_signed<W: Write + Seek>(
        &self,
        writer: W,
        signature: &[u8],
        sigpath: &str,
    ) -> JarResult<W> {
        let mut out = ArchiveWriter::new(writer, self.config.compression);
        out.write_file(&format!("{sigpath}.rsa"), signature)?;
        let mut copied = 0usize;
        for entry in self.entries.iter().filter(|e| !is_signature_artifact(&e.name)) {
            out.write_entry(entry)?;
            copied += 1;
        }
        out.write_file(MANIFEST_PATH, &self.manifest().to_bytes())?;
        out.write_file(&format!("{sigpath}.sf"), &self.signatures().to_bytes())?;
        if let Some(ids) = &self.config.ids {
            out.write_file(IDS_PATH, ids)?;
        }
        let mut writer = out.finish()?;
        writer.flush()?;
        debug!(copied, "assembled signed archive");
        Ok(writer)
    }
}

/// `META-INF/<stem>` for a user supplied signature name such as `foo/bar.rsa`.
pub fn signature_path(sigpath: &str) -> String {
    let stem = Path::new(sigpath)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(DEFAULT_SIGNATURE_NAME);
    format!("{META_INF}/{stem}")
}

/// Digest entries, keeping their order.
#[cfg(not(feature = "parallel"))]
fn digest_entries(entries: &[&ArchiveEntry]) -> Vec<Section> {
    entries
        .iter()
        .map(|entry| Section::from_data(entry.name.as_str(), &entry.data))
        .collect()
}

/// Digest entries on the rayon pool, keeping their order.
#[cfg(feature = "parallel")]
fn digest_entries(entries: &[&ArchiveEntry]) -> Vec<Section> {
    use rayon::prelude::*;
    entries
        .par_iter()
        .map(|entry| Section::from_data(entry.name.as_str(), &entry.data))
        .collect()
}
