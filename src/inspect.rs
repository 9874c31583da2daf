//! Signer serial numbers of DER encoded PKCS#7 signatures

use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::{SignedData, SignerIdentifier};
use x509_cert::der::{Decode, Encode};

use crate::signer::{SerialNumber, SignatureBlob, SignatureInspector};

/// Error type for inspection
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    /// The blob is not a DER `ContentInfo` wrapping `SignedData`
    #[error("invalid PKCS#7 structure: {0}")]
    Der(#[from] x509_cert::der::Error),

    /// The signature names no signer
    #[error("no signer found in signature")]
    NoSigner,
}

/// Inspector for detached PKCS#7 `SignedData` signatures.
///
/// A single signer is expected. Its serial number comes from the
/// issuer-and-serial identifier of the first signer info, or from the first
/// embedded certificate when the signer is identified by key identifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pkcs7Inspector;

impl Pkcs7Inspector {
    /// Create an inspector
    pub const fn new() -> Self {
        Self
    }

    /// Decode the `SignedData` carried by a `ContentInfo`.
    /// # Errors
    /// Returns an error if the blob is not valid DER.
    pub fn signed_data(blob: &[u8]) -> Result<SignedData, InspectError> {
        let content_info = ContentInfo::from_der(blob)?;
        let inner = content_info.content.to_der()?;
        Ok(SignedData::from_der(&inner)?)
    }
}

impl SignatureInspector for Pkcs7Inspector {
    type Error = InspectError;

    fn serial_number(&self, blob: &SignatureBlob) -> Result<SerialNumber, Self::Error> {
        let signed_data = Self::signed_data(blob.as_bytes())?;
        let signer = signed_data
            .signer_infos
            .0
            .iter()
            .next()
            .ok_or(InspectError::NoSigner)?;
        if let SignerIdentifier::IssuerAndSerialNumber(id) = &signer.sid {
            return Ok(SerialNumber::from_be_bytes(id.serial_number.as_bytes()));
        }
        signed_data
            .certificates
            .as_ref()
            .and_then(|set| {
                set.0.iter().find_map(|choice| match choice {
                    CertificateChoices::Certificate(cert) => Some(SerialNumber::from_be_bytes(
                        cert.tbs_certificate.serial_number.as_bytes(),
                    )),
                    _ => None,
                })
            })
            .ok_or(InspectError::NoSigner)
    }
}
