//! ECIES-style share decryption.
//!
//! A node encrypts its share to the client's ephemeral public key with its own
//! ephemeral key: ECDH on the curve, SHA-512 of the shared X coordinate, and
//! AES-256-CBC keyed with the first half of the digest.
//!
//! The share travels with an extra layer of encoding: the ciphertext is read as
//! a big integer, written as hex text, and that text is base64 encoded. Decoding
//! must undo exactly that to interoperate with the node network.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha512};

use crate::{
    keys::{PrivateKey, PublicKey},
    rpc::KeyAssignment,
    serialization::{hex_to_be_bytes, split_coordinates, strip_leading_zeros},
    Ciphersuite, DecryptionError,
};

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Length of the AES-256 key taken from the KDF output.
const KEY_LENGTH: usize = 32;

/// Length of the CBC initialization vector.
const IV_LENGTH: usize = 16;

/// Computes the ECDH shared secret: the X coordinate of `public * secret` as a
/// minimal big-endian integer.
fn shared_secret<C: Ciphersuite>(
    secret: &PrivateKey<C>,
    public: &PublicKey<C>,
) -> Result<Vec<u8>, DecryptionError> {
    let shared = PublicKey::<C>::new(public.to_element() * secret.to_scalar());
    let encoded = shared
        .serialize()
        .map_err(|_| DecryptionError::InvalidEphemeralKey)?;
    let (x, _) = split_coordinates(&encoded).map_err(|_| DecryptionError::InvalidEphemeralKey)?;
    Ok(strip_leading_zeros(x).to_vec())
}

/// Derives the AES-256 key from the shared secret.
fn derive_key(shared_secret: &[u8]) -> [u8; KEY_LENGTH] {
    let digest = Sha512::digest(shared_secret);
    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(&digest[..KEY_LENGTH]);
    key
}

/// Undoes the share wire encoding: base64 of the hex text of the ciphertext integer.
pub fn decode_share_ciphertext(share: &str) -> Result<Vec<u8>, DecryptionError> {
    let hex_text = STANDARD
        .decode(share.trim())
        .map_err(|_| DecryptionError::InvalidEncoding)?;
    let hex_text = String::from_utf8(hex_text).map_err(|_| DecryptionError::InvalidEncoding)?;
    hex_to_be_bytes(hex_text.trim()).map_err(|_| DecryptionError::InvalidEncoding)
}

/// Decrypts one node's share with the call's ephemeral private key.
///
/// Returns the plaintext share bytes, big-endian and unreduced.
pub fn decrypt_share<C: Ciphersuite>(
    secret: &PrivateKey<C>,
    assignment: &KeyAssignment,
) -> Result<Vec<u8>, DecryptionError> {
    let metadata = assignment
        .metadata
        .as_ref()
        .ok_or(DecryptionError::MissingMetadata)?;
    let node_public = PublicKey::<C>::from_uncompressed_hex(&metadata.ephem_public_key)
        .map_err(|_| DecryptionError::InvalidEphemeralKey)?;
    let iv = hex::decode(&metadata.iv).map_err(|_| DecryptionError::InvalidIv)?;
    if iv.len() != IV_LENGTH {
        return Err(DecryptionError::InvalidIv);
    }
    let key = derive_key(&shared_secret(secret, &node_public)?);
    let ciphertext = decode_share_ciphertext(&assignment.share)?;

    Aes256CbcDec::new_from_slices(&key, &iv)
        .map_err(|_| DecryptionError::Cipher)?
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| DecryptionError::Cipher)
}

/// Node-side encryption, used to simulate nodes in tests.
#[cfg(any(test, feature = "test-impl"))]
pub mod encrypt {
    use aes::cipher::BlockEncryptMut;
    use rand_core::{CryptoRng, RngCore};

    use super::*;
    use crate::{rpc::EciesMetadata, serialization::to_minimal_hex};

    type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

    /// Encrypts `plaintext` to `recipient` the way a node does and returns the
    /// wire-encoded share together with its metadata.
    ///
    /// The wire encoding cannot carry a ciphertext whose first byte is zero, so
    /// a fresh IV is drawn until the first byte is nonzero.
    pub fn encrypt_share<C: Ciphersuite, R: RngCore + CryptoRng>(
        recipient: &PublicKey<C>,
        plaintext: &[u8],
        rng: &mut R,
    ) -> (String, EciesMetadata) {
        let node_secret = PrivateKey::<C>::new(rng);
        let key = derive_key(&shared_secret(&node_secret, recipient).unwrap());
        loop {
            let mut iv = [0u8; IV_LENGTH];
            rng.fill_bytes(&mut iv);
            let ciphertext = Aes256CbcEnc::new_from_slices(&key, &iv)
                .unwrap()
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
            if ciphertext[0] == 0 {
                continue;
            }
            let share = STANDARD.encode(to_minimal_hex(&ciphertext));
            let metadata = EciesMetadata {
                iv: hex::encode(iv),
                ephem_public_key: hex::encode(node_secret.public_key().serialize().unwrap()),
                mac: None,
                mode: Some("AES256".to_string()),
            };
            return (share, metadata);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_encoding_is_base64_of_hex_text() {
        // base64("0abc") and base64("abc") both mean the integer 0xabc.
        assert_eq!(decode_share_ciphertext("MGFiYw==").unwrap(), vec![0x0a, 0xbc]);
        assert_eq!(decode_share_ciphertext("YWJj").unwrap(), vec![0x0a, 0xbc]);
        assert_eq!(
            decode_share_ciphertext("not base64!"),
            Err(DecryptionError::InvalidEncoding)
        );
        // base64("xyz") is valid base64 but not hex text.
        assert_eq!(
            decode_share_ciphertext("eHl6"),
            Err(DecryptionError::InvalidEncoding)
        );
    }

    #[test]
    fn kdf_takes_first_half_of_sha512() {
        let key = derive_key(b"");
        // SHA-512("") starts with cf83e135...
        assert_eq!(&key[..4], &[0xcf, 0x83, 0xe1, 0x35]);
    }
}
