//! Ciphersuite-generic test functions.

use std::collections::HashMap;

use rand_core::{CryptoRng, RngCore};

use crate::{
    ecies::{decrypt_share, encrypt::encrypt_share},
    keys::{generate_address_from_priv_key, PrivateKey, PublicKey},
    rpc::{KeyAssignment, PubKey},
    share::{compute_lagrange_coefficient, interpolate, reconstruct},
    tests::helpers::{generate_shares, indexes},
    Ciphersuite, DecryptionError, Error, IndexList, NodeDetails, NodeIndex, Threshold,
};

/// Test that `k` shares interpolate to the secret, in any order.
pub fn check_interpolation<C: Ciphersuite, R: RngCore + CryptoRng>(mut rng: R) {
    let secret = PrivateKey::<C>::new(&mut rng);
    let n = 9;
    let k = *Threshold::new(n as usize).k();
    let shares = generate_shares(&secret, k, &NodeIndex::default_indexes(n), &mut rng);

    assert_eq!(interpolate(&shares[..k]).unwrap(), secret.to_scalar());
    assert_eq!(interpolate(&shares[n as usize - k..]).unwrap(), secret.to_scalar());

    let mut reversed = shares[..k].to_vec();
    reversed.reverse();
    assert_eq!(interpolate(&reversed).unwrap(), secret.to_scalar());

    // Fewer than `k` shares interpolate to some other value.
    assert_ne!(interpolate(&shares[..k - 1]).unwrap(), secret.to_scalar());
}

/// Test that custom, non-contiguous indexes work like the default ones.
pub fn check_interpolation_with_custom_indexes<C: Ciphersuite, R: RngCore + CryptoRng>(
    mut rng: R,
) {
    let secret = PrivateKey::<C>::new(&mut rng);
    let indexes = indexes::<C>(&[3, 17, 42, 1000, 65535]);
    let k = *Threshold::new(indexes.len()).k();
    let shares = generate_shares(&secret, k, &indexes, &mut rng);

    let recovered = reconstruct(&shares, k, &secret.public_key()).unwrap();
    assert_eq!(recovered, secret);
}

/// Test that duplicated indexes are rejected.
pub fn check_duplicated_indexes<C: Ciphersuite>() {
    let repeated = indexes::<C>(&[1, 2, 2]);
    assert_eq!(
        compute_lagrange_coefficient(&repeated, &repeated[0]),
        Err(Error::DuplicatedShares)
    );
    assert_eq!(
        compute_lagrange_coefficient(&repeated, &repeated[1]),
        Err(Error::DuplicatedShares)
    );

    // The repeat is caught even when it is not the index being computed.
    let repeated = indexes::<C>(&[1, 5, 2, 5]);
    assert_eq!(
        compute_lagrange_coefficient(&repeated, &repeated[0]),
        Err(Error::DuplicatedShares)
    );

    // Over {1, 2, 3}: λ_1 = (-2)(-3) / ((1 - 2)(1 - 3)) = 3.
    let distinct = indexes::<C>(&[1, 2, 3]);
    let three = NodeIndex::<C>::try_from(3u16).unwrap().to_scalar();
    assert_eq!(
        compute_lagrange_coefficient(&distinct, &distinct[0]),
        Ok(three)
    );

    // Custom node indexes must be distinct as well.
    let nodes = NodeDetails::new(
        ["https://a.test", "https://b.test", "https://c.test"],
        IndexList::Custom(&indexes::<C>(&[4, 9, 4])),
    );
    assert!(matches!(nodes, Err(Error::InvalidNodeDetails)));
}

/// Test the failure modes of reconstruction.
pub fn check_reconstruct<C: Ciphersuite, R: RngCore + CryptoRng>(mut rng: R) {
    let secret = PrivateKey::<C>::new(&mut rng);
    let n = 5;
    let k = *Threshold::new(n as usize).k();
    let mut shares = generate_shares(&secret, k, &NodeIndex::default_indexes(n), &mut rng);

    assert_eq!(
        reconstruct(&shares[..k - 1], k, &secret.public_key()),
        Err(Error::InsufficientShares {
            available: k - 1,
            required: k,
        })
    );

    let other = PrivateKey::<C>::new(&mut rng).public_key();
    assert_eq!(
        reconstruct(&shares, k, &other),
        Err(Error::CouldNotDerivePrivateKey)
    );

    // A bad share in the first position is skipped over.
    shares[0] = crate::DecryptedShare::new(*shares[0].index(), vec![0xff; 32]);
    assert_eq!(reconstruct(&shares, k, &secret.public_key()).unwrap(), secret);

    // Too many bad shares leave no valid combination.
    for share in shares.iter_mut().take(n as usize - k + 1) {
        *share = crate::DecryptedShare::new(*share.index(), vec![0x01]);
    }
    assert_eq!(
        reconstruct(&shares, k, &secret.public_key()),
        Err(Error::CouldNotDerivePrivateKey)
    );
}

fn key_assignment<C: Ciphersuite, R: RngCore + CryptoRng>(
    recipient: &PublicKey<C>,
    plaintext: &[u8],
    rng: &mut R,
) -> KeyAssignment {
    let (share, metadata) = encrypt_share(recipient, plaintext, rng);
    KeyAssignment {
        index: "1".to_string(),
        public_key: PubKey {
            x: "1".to_string(),
            y: "2".to_string(),
        },
        threshold: 1,
        verifiers: HashMap::new(),
        share,
        metadata: Some(metadata),
    }
}

/// Test that a share encrypted by a node decrypts with the ephemeral key.
pub fn check_share_decryption<C: Ciphersuite, R: RngCore + CryptoRng>(mut rng: R) {
    let ephemeral = PrivateKey::<C>::new(&mut rng);
    let mut plaintext = [0u8; 32];
    rng.fill_bytes(&mut plaintext);

    let assignment = key_assignment(&ephemeral.public_key(), &plaintext, &mut rng);
    assert_eq!(decrypt_share(&ephemeral, &assignment).unwrap(), plaintext);

    let other = PrivateKey::<C>::new(&mut rng);
    assert_ne!(
        decrypt_share(&other, &assignment).ok(),
        Some(plaintext.to_vec())
    );
}

/// Test that malformed share metadata is reported per field.
pub fn check_share_decryption_errors<C: Ciphersuite, R: RngCore + CryptoRng>(mut rng: R) {
    let ephemeral = PrivateKey::<C>::new(&mut rng);
    let assignment = key_assignment(&ephemeral.public_key(), b"share", &mut rng);

    let mut missing = assignment.clone();
    missing.metadata = None;
    assert_eq!(
        decrypt_share(&ephemeral, &missing),
        Err(DecryptionError::MissingMetadata)
    );

    let mut short_iv = assignment.clone();
    short_iv.metadata.as_mut().unwrap().iv = "00112233".to_string();
    assert_eq!(
        decrypt_share(&ephemeral, &short_iv),
        Err(DecryptionError::InvalidIv)
    );

    let mut bad_key = assignment.clone();
    bad_key.metadata.as_mut().unwrap().ephem_public_key = "04deadbeef".to_string();
    assert_eq!(
        decrypt_share(&ephemeral, &bad_key),
        Err(DecryptionError::InvalidEphemeralKey)
    );

    let mut bad_share = assignment;
    bad_share.share = "%%%".to_string();
    assert_eq!(
        decrypt_share(&ephemeral, &bad_share),
        Err(DecryptionError::InvalidEncoding)
    );
}

/// Test private and public key encodings.
pub fn check_key_encodings<C: Ciphersuite, R: RngCore + CryptoRng>(mut rng: R) {
    let secret = PrivateKey::<C>::new(&mut rng);
    let public = secret.public_key();

    let hex = secret.to_hex();
    assert!(!hex.starts_with('0'));
    assert_eq!(PrivateKey::<C>::from_hex(&hex).unwrap(), secret);
    assert_eq!(
        PrivateKey::<C>::from_hex(&format!("0x000{hex}")).unwrap(),
        secret
    );
    assert_eq!(
        generate_address_from_priv_key::<C>(&hex).unwrap(),
        public.address().unwrap()
    );
    assert_eq!(
        PrivateKey::<C>::from_hex("00"),
        Err(Error::MalformedPrivateKey)
    );
    assert_eq!(PrivateKey::<C>::from_hex("xyz"), Err(Error::MalformedHex));

    let (x, y) = public.coordinates_hex().unwrap();
    assert_eq!(PublicKey::<C>::from_coordinates(&x, &y).unwrap(), public);
    assert!(public
        .matches_coordinates(&format!("0x{x}"), &format!("000{y}"))
        .unwrap());
    assert!(!public.matches_coordinates(&y, &x).unwrap());

    let address = public.address().unwrap();
    assert_eq!(address.len(), 42);
    assert!(address.starts_with("0x"));
    assert_eq!(address, address.to_lowercase());
}
