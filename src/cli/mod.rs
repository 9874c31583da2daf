//! Command-line interface for jarsig

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jarsig::ExtractorConfig;
use tracing_subscriber::EnvFilter;

pub mod assemble;
pub mod manifest;
#[cfg(feature = "verify")]
pub mod serial;

/// JAR/XPI manifest and signature tool
#[derive(Parser)]
#[command(name = "jarsig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the manifest of an archive
    Manifest(manifest::ManifestArgs),

    /// Print the signature file, or just the header to be signed
    Signature(manifest::SignatureArgs),

    /// Build a signed archive from a detached signature
    Assemble(assemble::AssembleArgs),

    /// Print the signer serial number of a signature (requires verify feature)
    #[cfg(feature = "verify")]
    Serial(serial::SerialArgs),
}

/// Options shared by every command that digests an archive
#[derive(Args)]
pub struct ArchiveArgs {
    /// Input archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// File stored as META-INF/ids.json
    #[arg(long = "ids", value_name = "FILE")]
    pub ids: Option<PathBuf>,

    /// End manifest and signature with an extra blank line
    #[arg(long = "extra-newlines")]
    pub extra_newlines: bool,

    /// Leave individual sections out of the signature file
    #[arg(long = "omit-sections")]
    pub omit_sections: bool,
}

impl ArchiveArgs {
    /// Build the extractor configuration
    pub fn config(&self) -> Result<ExtractorConfig, Box<dyn std::error::Error>> {
        let mut config = ExtractorConfig::new()
            .extra_newlines(self.extra_newlines)
            .omit_signature_sections(self.omit_sections);
        if let Some(ids) = &self.ids {
            config = config.ids(std::fs::read(ids)?);
        }
        Ok(config)
    }
}

/// Log to stderr, `info` unless `RUST_LOG` says otherwise
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Execute command
    pub fn execute(self) -> Result<(), Box<dyn std::error::Error>> {
        match self.command {
            Commands::Manifest(args) => manifest::execute_manifest(args),
            Commands::Signature(args) => manifest::execute_signature(args),
            Commands::Assemble(args) => assemble::execute(args),
            #[cfg(feature = "verify")]
            Commands::Serial(args) => serial::execute(args),
        }
    }
}
