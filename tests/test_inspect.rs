#![cfg(feature = "verify")]

use jarsig::{
    serial_number_of, InspectError, JarError, Pkcs7Inspector, SerialNumber, SignatureBlob,
    SignatureInspector,
};

#[test]
fn serial_number_formatting() {
    let serial = SerialNumber::from_be_bytes(&[0, 0, 1, 2]);
    assert_eq!(serial.as_bytes(), [1, 2]);
    assert_eq!(serial.to_u128(), Some(258));
    assert_eq!(serial.to_string(), "0102");

    let zero = SerialNumber::from_be_bytes(&[0]);
    assert_eq!(zero.to_u128(), Some(0));
    assert_eq!(zero.to_string(), "00");

    let wide = SerialNumber::from_be_bytes(&[0xff; 17]);
    assert_eq!(wide.to_u128(), None);
}

#[test]
fn garbage_is_rejected() {
    let inspector = Pkcs7Inspector::new();
    for blob in [Vec::new(), b"not a signature".to_vec(), vec![0x30, 0x03, 0x02]] {
        let err = inspector
            .serial_number(&SignatureBlob::new(blob))
            .unwrap_err();
        assert!(matches!(err, InspectError::Der(_)));
    }
}

#[test]
fn inspection_errors_are_wrapped() {
    let blob = SignatureBlob::new(b"garbage".to_vec());
    let err = serial_number_of(&Pkcs7Inspector::new(), &blob).unwrap_err();
    assert!(matches!(err, JarError::Inspection(_)));
    assert!(err.to_string().starts_with("signature inspection error"));
}

/// Detached signatures over `fixtures/signed_header.sf`, made by a
/// self-signed certificate with serial 0x0BADC0DE.
const ISSUER_SERIAL: &[u8] = include_bytes!("fixtures/issuer_serial.rsa");
const KEY_IDENTIFIER: &[u8] = include_bytes!("fixtures/key_identifier.rsa");
const KEY_IDENTIFIER_NO_CERTS: &[u8] = include_bytes!("fixtures/key_identifier_no_certs.rsa");

#[test]
fn serial_from_issuer_and_serial_number() {
    let blob = SignatureBlob::new(ISSUER_SERIAL.to_vec());
    let serial = Pkcs7Inspector::new().serial_number(&blob).unwrap();
    assert_eq!(serial.to_u128(), Some(0x0BAD_C0DE));
    assert_eq!(serial.to_u128(), Some(195_936_478));
    assert_eq!(serial.to_string(), "0badc0de");
}

#[test]
fn serial_from_embedded_certificate() {
    let blob = SignatureBlob::new(KEY_IDENTIFIER.to_vec());
    let signed_data = Pkcs7Inspector::signed_data(blob.as_bytes()).unwrap();
    assert_eq!(signed_data.signer_infos.0.len(), 1);
    assert!(signed_data.encap_content_info.econtent.is_none());

    let serial = serial_number_of(&Pkcs7Inspector::new(), &blob).unwrap();
    assert_eq!(serial.to_u128(), Some(0x0BAD_C0DE));
}

#[test]
fn key_identifier_without_certificates_has_no_serial() {
    let blob = SignatureBlob::new(KEY_IDENTIFIER_NO_CERTS.to_vec());
    let err = Pkcs7Inspector::new().serial_number(&blob).unwrap_err();
    assert!(matches!(err, InspectError::NoSigner));
}
