//! Serial command - Print the signer serial number of a signature

use std::path::PathBuf;

use clap::Args;
use jarsig::{serial_number_of, Pkcs7Inspector, SignatureBlob};

/// Arguments for the serial command
#[derive(Args)]
pub struct SerialArgs {
    /// DER encoded PKCS#7 signature, e.g. META-INF/zigbert.rsa
    #[arg(value_name = "BLOB")]
    pub blob: PathBuf,
}

/// Execute the serial command
pub fn execute(args: SerialArgs) -> Result<(), Box<dyn std::error::Error>> {
    let blob = SignatureBlob::new(std::fs::read(&args.blob)?);
    let serial = serial_number_of(&Pkcs7Inspector::new(), &blob)?;
    println!("{serial}");
    Ok(())
}
