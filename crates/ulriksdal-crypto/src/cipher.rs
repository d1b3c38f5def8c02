#![forbid(unsafe_code)]

//! CBC content encryption (AES-128, AES-256, 3DES).
//!
//! The cipher payload carried in `<CipherValue>` is the IV followed by the
//! ciphertext. Padding is applied here rather than by the block mode so that
//! decryption can accept the padding variants found in the wild.

use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use log::warn;
use rand::{CryptoRng, RngCore};
use ulriksdal_core::Error;
use zeroize::Zeroizing;

use crate::registry::ContentAlgorithm;

/// A content-encryption key whose length always matches its algorithm.
///
/// The bytes are wiped when the key is dropped.
pub struct SymmetricKey {
    algorithm: ContentAlgorithm,
    bytes: Zeroizing<Vec<u8>>,
}

impl SymmetricKey {
    /// Draw a fresh key for `algorithm` from a secure random source.
    pub fn generate<R: RngCore + CryptoRng>(algorithm: ContentAlgorithm, rng: &mut R) -> Self {
        let mut bytes = Zeroizing::new(vec![0u8; algorithm.key_size()]);
        rng.fill_bytes(&mut bytes);
        Self { algorithm, bytes }
    }

    /// Wrap existing key material, checking its length against `algorithm`.
    pub fn from_bytes(algorithm: ContentAlgorithm, bytes: &[u8]) -> Result<Self, Error> {
        check_key_len(algorithm, bytes)?;
        Ok(Self {
            algorithm,
            bytes: Zeroizing::new(bytes.to_vec()),
        })
    }

    pub fn algorithm(&self) -> ContentAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey({}, {} bytes)", self.algorithm, self.bytes.len())
    }
}

fn check_key_len(algorithm: ContentAlgorithm, key: &[u8]) -> Result<(), Error> {
    if key.len() != algorithm.key_size() {
        return Err(Error::Crypto(format!(
            "{algorithm}: expected {} byte key, got {}",
            algorithm.key_size(),
            key.len()
        )));
    }
    Ok(())
}

macro_rules! cbc_encrypt {
    ($cipher:ty, $key:expr, $iv:expr, $buf:expr, $alg:expr) => {{
        let len = $buf.len();
        cbc::Encryptor::<$cipher>::new_from_slices($key, $iv)
            .map_err(|e| Error::Crypto(format!("{} init: {e}", $alg)))?
            .encrypt_padded_mut::<NoPadding>($buf, len)
            .map_err(|e| Error::Crypto(format!("{} encrypt: {e}", $alg)))?;
    }};
}

macro_rules! cbc_decrypt {
    ($cipher:ty, $key:expr, $iv:expr, $buf:expr, $alg:expr) => {{
        cbc::Decryptor::<$cipher>::new_from_slices($key, $iv)
            .map_err(|e| Error::Crypto(format!("{} init: {e}", $alg)))?
            .decrypt_padded_mut::<NoPadding>($buf)
            .map_err(|e| Error::Crypto(format!("{} decrypt: {e}", $alg)))?;
    }};
}

/// Encrypt `plaintext` and return `IV || ciphertext`.
///
/// A fresh IV of `algorithm.iv_size()` bytes is drawn from `rng` and the
/// plaintext is PKCS#7 padded to the block size.
pub fn encrypt<R: RngCore + CryptoRng>(
    algorithm: ContentAlgorithm,
    key: &[u8],
    plaintext: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>, Error> {
    check_key_len(algorithm, key)?;

    let mut iv = vec![0u8; algorithm.iv_size()];
    rng.fill_bytes(&mut iv);

    let mut buf = pkcs7_pad(plaintext, algorithm.block_size());
    match algorithm {
        ContentAlgorithm::Aes128Cbc => cbc_encrypt!(aes::Aes128, key, &iv, &mut buf, algorithm),
        ContentAlgorithm::Aes256Cbc => cbc_encrypt!(aes::Aes256, key, &iv, &mut buf, algorithm),
        ContentAlgorithm::TripleDesCbc => {
            cbc_encrypt!(des::TdesEde3, key, &iv, &mut buf, algorithm)
        }
    }

    let mut payload = iv;
    payload.extend_from_slice(&buf);
    Ok(payload)
}

/// Decrypt an `IV || ciphertext` payload.
///
/// With `auto_padding` the XML Encryption padding is removed; without it the
/// padding bytes stay in the output for the caller to strip. AES-128-CBC
/// output then goes through [`aes128_bracket_fallback`].
pub fn decrypt(
    algorithm: ContentAlgorithm,
    key: &[u8],
    payload: &[u8],
    auto_padding: bool,
) -> Result<Vec<u8>, Error> {
    check_key_len(algorithm, key)?;

    let iv_size = algorithm.iv_size();
    if payload.len() < iv_size {
        return Err(Error::Crypto(format!(
            "{algorithm}: payload of {} bytes is shorter than the {iv_size} byte IV",
            payload.len()
        )));
    }
    let (iv, ciphertext) = payload.split_at(iv_size);
    if ciphertext.is_empty() {
        return Err(Error::Crypto(format!(
            "{algorithm}: payload holds an IV but no ciphertext blocks"
        )));
    }
    if ciphertext.len() % algorithm.block_size() != 0 {
        return Err(Error::Crypto(format!(
            "{algorithm}: ciphertext length {} is not a multiple of the block size",
            ciphertext.len()
        )));
    }

    let mut buf = ciphertext.to_vec();
    match algorithm {
        ContentAlgorithm::Aes128Cbc => cbc_decrypt!(aes::Aes128, key, iv, &mut buf, algorithm),
        ContentAlgorithm::Aes256Cbc => cbc_decrypt!(aes::Aes256, key, iv, &mut buf, algorithm),
        ContentAlgorithm::TripleDesCbc => {
            cbc_decrypt!(des::TdesEde3, key, iv, &mut buf, algorithm)
        }
    }

    if auto_padding {
        xmlenc_unpad(&mut buf, algorithm.block_size())?;
    }

    match algorithm {
        ContentAlgorithm::Aes128Cbc => Ok(aes128_bracket_fallback(buf)),
        ContentAlgorithm::Aes256Cbc | ContentAlgorithm::TripleDesCbc => Ok(buf),
    }
}

/// Compatibility fallback for AES-128-CBC producers that emit malformed padding.
///
/// Some SAML identity providers leave filler bytes behind that a pad-length
/// unpad does not remove. The decrypted content is XML, so everything after
/// the last `>` is dropped. A `>` at offset 0, or none at all, leaves the data
/// untouched. Only ever applied to AES-128-CBC.
pub fn aes128_bracket_fallback(mut data: Vec<u8>) -> Vec<u8> {
    if let Some(pos) = data.iter().rposition(|&b| b == b'>') {
        if pos > 0 && pos + 1 < data.len() {
            warn!(
                "aes-128-cbc: discarding {} trailing bytes after the last '>'",
                data.len() - pos - 1
            );
            data.truncate(pos + 1);
        }
    }
    data
}

// ── Padding ──────────────────────────────────────────────────────────

fn pkcs7_pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let pad_len = block_size - (data.len() % block_size);
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.extend(std::iter::repeat(pad_len as u8).take(pad_len));
    padded
}

/// Remove W3C XML Encryption padding in place.
///
/// Only the last byte is trusted as the padding length, which accepts both
/// PKCS#7 and ISO 10126 (random filler) padding. The length is checked
/// against the block size before anything is removed.
fn xmlenc_unpad(data: &mut Vec<u8>, block_size: usize) -> Result<(), Error> {
    let Some(&pad_byte) = data.last() else {
        return Ok(());
    };
    let pad_len = pad_byte as usize;
    if pad_len == 0 || pad_len > block_size || pad_len > data.len() {
        return Err(Error::Crypto(format!(
            "invalid padding length {pad_len} for {block_size} byte blocks"
        )));
    }
    data.truncate(data.len() - pad_len);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x756c_7269)
    }

    fn key_for(algorithm: ContentAlgorithm) -> Vec<u8> {
        (0..algorithm.key_size()).map(|i| i as u8).collect()
    }

    /// Encrypt an already padded buffer, so tests can plant arbitrary padding.
    fn encrypt_raw(algorithm: ContentAlgorithm, key: &[u8], iv: &[u8], block_aligned: &[u8]) -> Vec<u8> {
        let mut buf = block_aligned.to_vec();
        let len = buf.len();
        match algorithm {
            ContentAlgorithm::Aes128Cbc => {
                cbc::Encryptor::<aes::Aes128>::new_from_slices(key, iv)
                    .unwrap()
                    .encrypt_padded_mut::<NoPadding>(&mut buf, len)
                    .unwrap();
            }
            ContentAlgorithm::Aes256Cbc => {
                cbc::Encryptor::<aes::Aes256>::new_from_slices(key, iv)
                    .unwrap()
                    .encrypt_padded_mut::<NoPadding>(&mut buf, len)
                    .unwrap();
            }
            ContentAlgorithm::TripleDesCbc => {
                cbc::Encryptor::<des::TdesEde3>::new_from_slices(key, iv)
                    .unwrap()
                    .encrypt_padded_mut::<NoPadding>(&mut buf, len)
                    .unwrap();
            }
        }
        let mut payload = iv.to_vec();
        payload.extend_from_slice(&buf);
        payload
    }

    #[test]
    fn test_pkcs7_roundtrip() {
        let mut padded = pkcs7_pad(b"hello", 16);
        assert_eq!(padded.len(), 16);
        xmlenc_unpad(&mut padded, 16).unwrap();
        assert_eq!(padded, b"hello");
    }

    #[test]
    fn test_pkcs7_full_block_when_aligned() {
        let padded = pkcs7_pad(b"Exactly16bytes!!", 16);
        assert_eq!(padded.len(), 32);
        assert_eq!(padded[31], 16);
    }

    #[test]
    fn test_iso10126_unpad() {
        let mut data = b"hello world!".to_vec();
        data.extend_from_slice(&[0xAB, 0xCD, 0xEF, 0x04]);
        xmlenc_unpad(&mut data, 16).unwrap();
        assert_eq!(data, b"hello world!");
    }

    #[test]
    fn test_unpad_rejects_length_above_block_size() {
        let mut data = b"content".to_vec();
        data.extend_from_slice(&[0x20; 9]);
        let err = xmlenc_unpad(&mut data, 16).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[test]
    fn test_unpad_rejects_zero_length() {
        let mut data = vec![b'a'; 15];
        data.push(0);
        assert!(xmlenc_unpad(&mut data, 16).is_err());
    }

    #[rstest]
    #[case(ContentAlgorithm::Aes128Cbc)]
    #[case(ContentAlgorithm::Aes256Cbc)]
    #[case(ContentAlgorithm::TripleDesCbc)]
    fn test_cbc_roundtrip(#[case] algorithm: ContentAlgorithm) {
        let key = key_for(algorithm);
        let plaintexts: &[&[u8]] = &[
            b"A",
            b"content to encrypt",
            b"Exactly16bytes!!",
            "Gnügge Gnügge Gnügge Gnügge Gnügge".as_bytes(),
            b"<saml:Assertion>This spans several blocks of the cipher.</saml:Assertion>",
        ];
        let mut rng = rng();
        for &pt in plaintexts {
            let payload = encrypt(algorithm, &key, pt, &mut rng).unwrap();
            let decrypted = decrypt(algorithm, &key, &payload, true).unwrap();
            assert_eq!(decrypted, pt, "roundtrip failed for {algorithm}, pt_len={}", pt.len());
        }
    }

    #[rstest]
    #[case(ContentAlgorithm::Aes128Cbc, 16)]
    #[case(ContentAlgorithm::Aes256Cbc, 16)]
    #[case(ContentAlgorithm::TripleDesCbc, 8)]
    fn test_payload_layout(#[case] algorithm: ContentAlgorithm, #[case] iv_size: usize) {
        let key = key_for(algorithm);
        let mut rng = rng();
        let pt = b"0123456789";
        let payload = encrypt(algorithm, &key, pt, &mut rng).unwrap();
        // IV plus one padded block
        assert_eq!(payload.len(), iv_size + iv_size * (pt.len() / iv_size + 1));

        let other = encrypt(algorithm, &key, pt, &mut rng).unwrap();
        assert_ne!(payload[..iv_size], other[..iv_size], "IV must be fresh per call");
    }

    #[test]
    fn test_wrong_key_length() {
        let mut rng = rng();
        let err = encrypt(ContentAlgorithm::Aes256Cbc, &[0u8; 16], b"data", &mut rng).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
        let err = decrypt(ContentAlgorithm::TripleDesCbc, &[0u8; 16], &[0u8; 16], true).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[test]
    fn test_payload_shorter_than_iv() {
        let key = key_for(ContentAlgorithm::Aes256Cbc);
        let err = decrypt(ContentAlgorithm::Aes256Cbc, &key, &[0u8; 10], true).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[rstest]
    #[case(ContentAlgorithm::Aes128Cbc, true)]
    #[case(ContentAlgorithm::Aes256Cbc, true)]
    #[case(ContentAlgorithm::TripleDesCbc, true)]
    #[case(ContentAlgorithm::Aes256Cbc, false)]
    fn test_iv_only_payload_is_rejected(#[case] algorithm: ContentAlgorithm, #[case] auto_padding: bool) {
        let key = key_for(algorithm);
        let mut rng = rng();
        let payload = encrypt(algorithm, &key, b"secret assertion", &mut rng).unwrap();
        let iv_only = &payload[..algorithm.iv_size()];
        let err = decrypt(algorithm, &key, iv_only, auto_padding).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[test]
    fn test_ciphertext_not_block_aligned() {
        let key = key_for(ContentAlgorithm::TripleDesCbc);
        let err = decrypt(ContentAlgorithm::TripleDesCbc, &key, &[0u8; 8 + 12], true).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[rstest]
    #[case(ContentAlgorithm::Aes256Cbc)]
    #[case(ContentAlgorithm::Aes128Cbc)]
    fn test_padding_length_above_block_size_is_rejected(#[case] algorithm: ContentAlgorithm) {
        let key = key_for(algorithm);
        let mut block = b"content".to_vec();
        block.extend_from_slice(&[0x20; 9]);
        let payload = encrypt_raw(algorithm, &key, &[7u8; 16], &block);
        let err = decrypt(algorithm, &key, &payload, true).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[test]
    fn test_auto_padding_disabled_keeps_padding() {
        let algorithm = ContentAlgorithm::Aes256Cbc;
        let key = key_for(algorithm);
        let mut rng = rng();
        let payload = encrypt(algorithm, &key, b"content", &mut rng).unwrap();
        let raw = decrypt(algorithm, &key, &payload, false).unwrap();
        assert_eq!(raw.len(), 16);
        assert_eq!(&raw[..7], b"content");
        assert!(raw[7..].iter().all(|&b| b == 9));
    }

    #[test]
    fn test_auto_padding_disabled_aes128_strips_padding_after_xml() {
        let algorithm = ContentAlgorithm::Aes128Cbc;
        let key = key_for(algorithm);
        let mut rng = rng();
        let payload = encrypt(algorithm, &key, b"<a>ok</a>", &mut rng).unwrap();
        let raw = decrypt(algorithm, &key, &payload, false).unwrap();
        assert_eq!(raw, b"<a>ok</a>");
    }

    #[test]
    fn test_aes128_fallback_drops_filler_after_last_bracket() {
        let algorithm = ContentAlgorithm::Aes128Cbc;
        let key = key_for(algorithm);
        // Filler bytes that are not the pad length; the last byte claims 1.
        let mut block = b"<a>ok</a>".to_vec();
        block.extend_from_slice(&[0x0b; 6]);
        block.push(0x01);
        let payload = encrypt_raw(algorithm, &key, &[3u8; 16], &block);
        let decrypted = decrypt(algorithm, &key, &payload, true).unwrap();
        assert_eq!(decrypted, b"<a>ok</a>");
    }

    #[test]
    fn test_fallback_is_not_applied_to_aes256() {
        let algorithm = ContentAlgorithm::Aes256Cbc;
        let key = key_for(algorithm);
        let mut block = b"<a>ok</a>".to_vec();
        block.extend_from_slice(&[0x0b; 6]);
        block.push(0x01);
        let payload = encrypt_raw(algorithm, &key, &[3u8; 16], &block);
        let decrypted = decrypt(algorithm, &key, &payload, true).unwrap();
        assert_eq!(decrypted.len(), 15);
        assert!(decrypted.starts_with(b"<a>ok</a>"));
    }

    #[test]
    fn test_bracket_fallback_edge_cases() {
        assert_eq!(aes128_bracket_fallback(b"no brackets".to_vec()), b"no brackets");
        assert_eq!(aes128_bracket_fallback(b">leading".to_vec()), b">leading");
        assert_eq!(aes128_bracket_fallback(b"<x/>".to_vec()), b"<x/>");
        assert_eq!(aes128_bracket_fallback(b"<x/>\x0b\x0b".to_vec()), b"<x/>");
        assert!(aes128_bracket_fallback(Vec::new()).is_empty());
    }

    #[rstest]
    #[case(ContentAlgorithm::Aes128Cbc)]
    #[case(ContentAlgorithm::Aes256Cbc)]
    #[case(ContentAlgorithm::TripleDesCbc)]
    fn test_generated_key_matches_algorithm(#[case] algorithm: ContentAlgorithm) {
        let mut rng = rng();
        let key = SymmetricKey::generate(algorithm, &mut rng);
        assert_eq!(key.as_bytes().len(), algorithm.key_size());
        assert_eq!(key.algorithm(), algorithm);
        let again = SymmetricKey::generate(algorithm, &mut rng);
        assert_ne!(key.as_bytes(), again.as_bytes());
    }

    #[test]
    fn test_key_from_bytes_checks_length() {
        assert!(SymmetricKey::from_bytes(ContentAlgorithm::TripleDesCbc, &[1u8; 24]).is_ok());
        let err = SymmetricKey::from_bytes(ContentAlgorithm::TripleDesCbc, &[1u8; 32]).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[test]
    fn test_key_debug_hides_material() {
        let key = SymmetricKey::from_bytes(ContentAlgorithm::Aes128Cbc, &[0xAA; 16]).unwrap();
        let shown = format!("{key:?}");
        assert_eq!(shown, "SymmetricKey(aes-128-cbc, 16 bytes)");
    }
}
