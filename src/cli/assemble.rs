//! Assemble command - Write a signed archive from a detached signature

use std::path::PathBuf;

use clap::Args;
use jarsig::{CompressionMethod, JarExtractor, DEFAULT_SIGNATURE_NAME};

use super::ArchiveArgs;

/// Arguments for the assemble command
#[derive(Args)]
pub struct AssembleArgs {
    /// Archive options
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Output archive, must not exist
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Detached signature (DER) produced over `jarsig signature` output
    #[arg(long = "signature", value_name = "BLOB")]
    pub signature: PathBuf,

    /// Basename of the .rsa/.sf files inside META-INF
    #[arg(long = "name", default_value = DEFAULT_SIGNATURE_NAME)]
    pub name: String,

    /// Store entries without compression
    #[arg(long = "store")]
    pub store: bool,
}

/// Execute the assemble command
pub fn execute(args: AssembleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = args.archive.config()?;
    if args.store {
        config = config.compression(CompressionMethod::Stored);
    }
    let blob = std::fs::read(&args.signature)?;
    let jar = JarExtractor::open(&args.archive.archive, config)?;
    let output = jar.make_signed(&blob, Some(args.output.as_path()), Some(args.name.as_str()))?;
    println!("{}", output.display());
    Ok(())
}
