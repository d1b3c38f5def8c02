#![forbid(unsafe_code)]

//! Sender certificate handling.
//!
//! The encrypted document embeds the sender certificate as the bare base64
//! body of its PEM. The certificate's public key can also stand in for the
//! recipient key when encrypting to the certificate holder.

use rsa::RsaPublicKey;
use ulriksdal_core::Error;

const BEGIN_CERT: &str = "-----BEGIN CERTIFICATE-----";
const END_CERT: &str = "-----END CERTIFICATE-----";

/// Return the base64 text between the certificate PEM delimiters, with line
/// breaks removed.
pub fn extract_certificate_body(pem: &str) -> Result<String, Error> {
    let start = pem
        .find(BEGIN_CERT)
        .ok_or_else(|| Error::CertificateFormat(format!("missing {BEGIN_CERT}")))?
        + BEGIN_CERT.len();
    let len = pem[start..]
        .find(END_CERT)
        .ok_or_else(|| Error::CertificateFormat(format!("missing {END_CERT}")))?;

    let body: String = pem[start..start + len]
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect();
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::CertificateFormat("empty certificate body".into()));
    }
    Ok(body.to_owned())
}

/// Load the RSA public key from a PEM-encoded X.509 certificate.
pub fn load_x509_cert_pem(pem_data: &[u8]) -> Result<RsaPublicKey, Error> {
    let pem_str = std::str::from_utf8(pem_data)
        .map_err(|e| Error::CertificateFormat(format!("invalid PEM encoding: {e}")))?;

    let (label, der_bytes) = pem_rfc7468::decode_vec(pem_str.trim().as_bytes())
        .map_err(|e| Error::CertificateFormat(format!("failed to decode certificate PEM: {e}")))?;

    if label != "CERTIFICATE" {
        return Err(Error::CertificateFormat(format!(
            "expected CERTIFICATE PEM label, got: {label}"
        )));
    }

    load_x509_cert_der(&der_bytes)
}

/// Load the RSA public key from a DER-encoded X.509 certificate.
pub fn load_x509_cert_der(data: &[u8]) -> Result<RsaPublicKey, Error> {
    use der::{Decode, Encode};
    use spki::DecodePublicKey;
    use x509_cert::Certificate;

    let cert = Certificate::from_der(data)
        .map_err(|e| Error::CertificateFormat(format!("failed to parse X.509 certificate: {e}")))?;

    let spki_der = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::CertificateFormat(format!("failed to encode SPKI: {e}")))?;

    RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| Error::Key(format!("certificate does not hold an RSA key: {e}")))
}
