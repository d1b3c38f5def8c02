#![forbid(unsafe_code)]

/// Errors produced by the Ulriksdal XML Encryption library.
///
/// Every pipeline stage returns this type; a failure aborts the whole
/// encrypt or decrypt call and no partial output is produced.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required option (key, certificate, algorithm) was not supplied.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A required XMLENC element or attribute is missing.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Cipher or RSA failure, including an invalid padding length.
    #[error("cryptographic error: {0}")]
    Crypto(String),

    /// The certificate PEM has no `BEGIN/END CERTIFICATE` delimiters.
    #[error("certificate format error: {0}")]
    CertificateFormat(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("text encoding error: {0}")]
    Encoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = Error::UnsupportedAlgorithm("cipher: http://example.com/x".into());
        assert_eq!(e.to_string(), "unsupported algorithm: cipher: http://example.com/x");

        let e = Error::Configuration("rsa public key is required".into());
        assert_eq!(e.to_string(), "configuration error: rsa public key is required");
    }

    #[test]
    fn test_io_error_converts() {
        fn open_missing() -> Result<()> {
            std::fs::read("/nonexistent/ulriksdal/input.xml")?;
            Ok(())
        }
        assert!(matches!(open_missing(), Err(Error::Io(_))));
    }
}
