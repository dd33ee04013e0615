#![allow(non_snake_case)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![doc = document_features::document_features!()]

use k256::{
    elliptic_curve::{
        group::prime::PrimeCurveAffine,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        Field as FFField,
    },
    AffinePoint, ProjectivePoint, Scalar,
};
use rand_core::{CryptoRng, RngCore};
use sha3::{Digest, Keccak256};


// Re-exports in our public API
pub use rand_core;
#[cfg(feature = "http")]
pub use torus_core::transport::HttpTransport;
pub use torus_core::{
    Ciphersuite, DecryptionError, Error, Field, FieldError, Group, GroupError, Phase,
    RetrieveSharesResponse, Threshold, TorusNodePub, TorusPublicKey, Transport, VerifierArgs,
};

/// An implementation of the secp256k1 scalar field.
#[derive(Clone, Copy)]
pub struct Secp256K1ScalarField;

impl Field for Secp256K1ScalarField {
    type Scalar = Scalar;

    type Serialization = [u8; 32];

    fn zero() -> Self::Scalar {
        Scalar::ZERO
    }

    fn one() -> Self::Scalar {
        Scalar::ONE
    }

    fn invert(scalar: &Self::Scalar) -> Result<Self::Scalar, FieldError> {
        // [`Scalar`]'s Eq/PartialEq does a constant-time comparison
        if *scalar == <Self as Field>::zero() {
            Err(FieldError::InvalidZeroScalar)
        } else {
            Option::<Scalar>::from(scalar.invert()).ok_or(FieldError::InvalidZeroScalar)
        }
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar {
        Scalar::random(rng)
    }

    fn serialize(scalar: &Self::Scalar) -> Self::Serialization {
        scalar.to_bytes().into()
    }
}

/// An implementation of the secp256k1 group.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Secp256K1Group;

impl Group for Secp256K1Group {
    type Field = Secp256K1ScalarField;

    type Element = ProjectivePoint;

    /// [SEC 1][1] serialization of an uncompressed point in secp256k1 takes 65 bytes
    /// (the `0x04` prefix and 32 bytes for each coordinate).
    ///
    /// The identity has no such encoding and is never serialized; trying to is an error.
    ///
    /// [1]: https://secg.org/sec1-v2.pdf
    type Serialization = [u8; 65];

    fn identity() -> Self::Element {
        ProjectivePoint::IDENTITY
    }

    fn generator() -> Self::Element {
        ProjectivePoint::GENERATOR
    }

    fn serialize(element: &Self::Element) -> Result<Self::Serialization, GroupError> {
        if *element == Self::identity() {
            return Err(GroupError::InvalidIdentityElement);
        }
        let mut fixed_serialized = [0; 65];
        let serialized_point = element.to_affine().to_encoded_point(false);
        let serialized = serialized_point.as_bytes();
        fixed_serialized.copy_from_slice(serialized);
        Ok(fixed_serialized)
    }

    fn deserialize(buf: &Self::Serialization) -> Result<Self::Element, GroupError> {
        let encoded_point =
            k256::EncodedPoint::from_bytes(buf).map_err(|_| GroupError::MalformedElement)?;

        match Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded_point)) {
            Some(point) => {
                if point.is_identity().into() {
                    Err(GroupError::InvalidIdentityElement)
                } else {
                    Ok(ProjectivePoint::from(point))
                }
            }
            None => Err(GroupError::MalformedElement),
        }
    }
}

/// The Torus ciphersuite: secp256k1 with Keccak-256 token commitments and
/// Ethereum addresses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Secp256K1Keccak256;

impl Ciphersuite for Secp256K1Keccak256 {
    type Group = Secp256K1Group;

    type HashOutput = [u8; 32];

    /// Keccak-256 as used by Ethereum, not the standardized SHA3-256.
    fn H(m: &[u8]) -> Self::HashOutput {
        let mut output = [0u8; 32];
        output.copy_from_slice(Keccak256::digest(m).as_slice());
        output
    }
}

type S = Secp256K1Keccak256;

/// The index of a node.
pub type NodeIndex = torus_core::NodeIndex<S>;

/// A secp256k1 private key.
pub type PrivateKey = torus_core::PrivateKey<S>;

/// A secp256k1 public key.
pub type PublicKey = torus_core::PublicKey<S>;

/// The one-time keypair nodes encrypt shares to.
pub type EphemeralKeyPair = torus_core::EphemeralKeyPair<S>;

/// The node list of a call.
pub type NodeDetails = torus_core::NodeDetails<S>;

/// The indexes to assign to the nodes.
pub type IndexList<'a> = torus_core::IndexList<'a, S>;

/// A decrypted share.
pub type DecryptedShare = torus_core::DecryptedShare<S>;

/// Retrieves the user's shares from `nodes` and reconstructs their private key.
///
/// See [`torus_core::retrieve_shares`].
pub async fn retrieve_shares<T: Transport, R: RngCore + CryptoRng>(
    transport: &T,
    nodes: &NodeDetails,
    verifier: &str,
    verifier_id: &str,
    id_token: &str,
    rng: R,
) -> Result<RetrieveSharesResponse, Error> {
    torus_core::retrieve_shares::<S, T, R>(transport, nodes, verifier, verifier_id, id_token, rng)
        .await
}

/// Resolves the address of `verifier_args`, assigning a key first if needed.
///
/// See [`torus_core::get_public_address`].
pub async fn get_public_address<T: Transport, R: RngCore + CryptoRng>(
    transport: &T,
    nodes: &NodeDetails,
    verifier_args: &VerifierArgs,
    extended: bool,
    rng: R,
) -> Result<TorusPublicKey, Error> {
    torus_core::get_public_address::<S, T, R>(transport, nodes, verifier_args, extended, rng).await
}

/// Derives the Ethereum address of a hex-encoded private key.
pub fn generate_address_from_priv_key(private_key: &str) -> Result<String, Error> {
    torus_core::generate_address_from_priv_key::<S>(private_key)
}

/// Reconstruction of a key from decrypted shares.
pub mod share {
    use super::*;

    /// Searches the `k`-subsets of `shares` for one that interpolates to `expected`.
    pub fn reconstruct(
        shares: &[DecryptedShare],
        k: usize,
        expected: &PublicKey,
    ) -> Result<PrivateKey, Error> {
        torus_core::share::reconstruct::<S>(shares, k, expected)
    }
}
