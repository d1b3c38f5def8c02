#![forbid(unsafe_code)]

//! Algorithm URI constants for XML Encryption.
//!
//! Each constant is the exact, case-sensitive string that appears in an
//! `Algorithm` attribute.

// ── Block cipher algorithms ──────────────────────────────────────────

pub const AES128_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes128-cbc";
pub const AES256_CBC: &str = "http://www.w3.org/2001/04/xmlenc#aes256-cbc";
pub const TRIPLEDES_CBC: &str = "http://www.w3.org/2001/04/xmlenc#tripledes-cbc";

// ── Key transport algorithms ─────────────────────────────────────────

pub const RSA_PKCS1: &str = "http://www.w3.org/2001/04/xmlenc#rsa-1_5";
pub const RSA_OAEP: &str = "http://www.w3.org/2001/04/xmlenc#rsa-oaep-mgf1p";

// ── Digest algorithms ────────────────────────────────────────────────

/// Digest advertised under the OAEP `EncryptionMethod`.
pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
