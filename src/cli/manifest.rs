//! Manifest and signature commands - print the generated files

use std::io::Write;

use clap::Args;
use jarsig::JarExtractor;

use super::ArchiveArgs;

/// Arguments for the manifest command
#[derive(Args)]
pub struct ManifestArgs {
    /// Archive options
    #[command(flatten)]
    pub archive: ArchiveArgs,
}

/// Arguments for the signature command
#[derive(Args)]
pub struct SignatureArgs {
    /// Archive options
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Print the whole .sf file instead of the header to be signed
    #[arg(long = "full")]
    pub full: bool,
}

/// Execute the manifest command
pub fn execute_manifest(args: ManifestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let jar = JarExtractor::open(&args.archive.archive, args.archive.config()?)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&jar.manifest().to_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Execute the signature command
pub fn execute_signature(args: SignatureArgs) -> Result<(), Box<dyn std::error::Error>> {
    let jar = JarExtractor::open(&args.archive.archive, args.archive.config()?)?;
    let text = if args.full {
        jar.signatures().to_string()
    } else {
        jar.signature()
    };
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
