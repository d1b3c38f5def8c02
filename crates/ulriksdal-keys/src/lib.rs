#![forbid(unsafe_code)]

//! Key material for Ulriksdal: RSA keys from PEM and the sender certificate.

pub mod loader;
pub mod x509;

pub use loader::{load_rsa_private_pem, load_rsa_public_pem};
pub use x509::{extract_certificate_body, load_x509_cert_der, load_x509_cert_pem};
