#![forbid(unsafe_code)]

//! RSA key transport (RSA-OAEP with MGF1-SHA1, RSA PKCS#1 v1.5).
//!
//! The raw content key is encrypted directly: no IV, no block mode.

use rand::{CryptoRng, RngCore};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use ulriksdal_core::Error;
use zeroize::Zeroizing;

use crate::b64;
use crate::registry::KeyTransport;

impl KeyTransport {
    /// RSA-encrypt `key_data` for the holder of `public_key`.
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        public_key: &RsaPublicKey,
        key_data: &[u8],
        rng: &mut R,
    ) -> Result<Vec<u8>, Error> {
        match self {
            Self::RsaOaepMgf1p => public_key
                .encrypt(rng, Oaep::new::<sha1::Sha1>(), key_data)
                .map_err(|e| Error::Crypto(format!("RSA-OAEP encrypt: {e}"))),
            Self::RsaPkcs1v15 => public_key
                .encrypt(rng, Pkcs1v15Encrypt, key_data)
                .map_err(|e| Error::Crypto(format!("RSA PKCS#1 encrypt: {e}"))),
        }
    }

    /// RSA-decrypt a transported key.
    pub fn decrypt(
        &self,
        private_key: &RsaPrivateKey,
        encrypted: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        let key = match self {
            Self::RsaOaepMgf1p => private_key
                .decrypt(Oaep::new::<sha1::Sha1>(), encrypted)
                .map_err(|e| Error::Crypto(format!("RSA-OAEP decrypt: {e}")))?,
            Self::RsaPkcs1v15 => private_key
                .decrypt(Pkcs1v15Encrypt, encrypted)
                .map_err(|e| Error::Crypto(format!("RSA PKCS#1 decrypt: {e}")))?,
        };
        Ok(Zeroizing::new(key))
    }
}

/// Wrap a content key and return the base64 text for `<CipherValue>`.
pub fn wrap<R: RngCore + CryptoRng>(
    key: &[u8],
    public_key: &RsaPublicKey,
    scheme: KeyTransport,
    rng: &mut R,
) -> Result<String, Error> {
    let encrypted = scheme.encrypt(public_key, key, rng)?;
    Ok(b64::encode(&encrypted))
}

/// Inverse of [`wrap`]: decode the base64 text and RSA-decrypt the key.
pub fn unwrap(
    wrapped_b64: &str,
    private_key: &RsaPrivateKey,
    scheme: KeyTransport,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let encrypted = b64::decode(wrapped_b64)?;
    scheme.decrypt(private_key, &encrypted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkcs8::DecodePrivateKey;
    use rstest::rstest;

    const RSA_KEY_PEM: &str = include_str!("../../../test-data/keys/rsakey.pem");
    const OTHER_KEY_PEM: &str = include_str!("../../../test-data/keys/otherkey.pem");

    fn private_key(pem: &str) -> RsaPrivateKey {
        RsaPrivateKey::from_pkcs8_pem(pem).unwrap()
    }

    #[rstest]
    fn test_wrap_unwrap_roundtrip(
        #[values(KeyTransport::RsaOaepMgf1p, KeyTransport::RsaPkcs1v15)] scheme: KeyTransport,
        #[values(16, 24, 32)] key_size: usize,
    ) {
        let sk = private_key(RSA_KEY_PEM);
        let pk = sk.to_public_key();
        let key: Vec<u8> = (0..key_size).map(|i| (i * 7) as u8).collect();

        let wrapped = wrap(&key, &pk, scheme, &mut rand::thread_rng()).unwrap();
        let unwrapped = unwrap(&wrapped, &sk, scheme).unwrap();
        assert_eq!(unwrapped.as_slice(), key.as_slice());
    }

    #[test]
    fn test_wrapped_key_is_one_rsa_block() {
        let sk = private_key(RSA_KEY_PEM);
        let pk = sk.to_public_key();
        let wrapped = wrap(&[1u8; 32], &pk, KeyTransport::RsaOaepMgf1p, &mut rand::thread_rng())
            .unwrap();
        // 2048-bit modulus, no IV
        assert_eq!(b64::decode(&wrapped).unwrap().len(), 256);
    }

    #[test]
    fn test_unwrap_with_wrong_private_key_fails() {
        let sk = private_key(RSA_KEY_PEM);
        let other = private_key(OTHER_KEY_PEM);
        let wrapped = wrap(
            &[9u8; 16],
            &sk.to_public_key(),
            KeyTransport::RsaOaepMgf1p,
            &mut rand::thread_rng(),
        )
        .unwrap();
        let err = unwrap(&wrapped, &other, KeyTransport::RsaOaepMgf1p).unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[test]
    fn test_scheme_mismatch_fails() {
        let sk = private_key(RSA_KEY_PEM);
        let wrapped = wrap(
            &[9u8; 24],
            &sk.to_public_key(),
            KeyTransport::RsaPkcs1v15,
            &mut rand::thread_rng(),
        )
        .unwrap();
        assert!(unwrap(&wrapped, &sk, KeyTransport::RsaOaepMgf1p).is_err());
    }

    #[test]
    fn test_payload_too_large_for_modulus() {
        let sk = private_key(RSA_KEY_PEM);
        // OAEP-SHA1 on a 2048-bit key carries at most 214 bytes.
        let err = wrap(
            &[0u8; 215],
            &sk.to_public_key(),
            KeyTransport::RsaOaepMgf1p,
            &mut rand::thread_rng(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Crypto(_)));
    }

    #[test]
    fn test_unwrap_rejects_bad_base64() {
        let sk = private_key(RSA_KEY_PEM);
        let err = unwrap("%%%", &sk, KeyTransport::RsaPkcs1v15).unwrap_err();
        assert!(matches!(err, Error::Base64(_)));
    }
}
