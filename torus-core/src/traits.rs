//! Traits used to abstract Ciphersuites.

use core::{
    fmt::Debug,
    ops::{Add, Mul, Sub},
};

use rand_core::{CryptoRng, RngCore};

use crate::{FieldError, GroupError};

/// A prime order finite field GF(q) over which all scalar values for our prime order group can be
/// multiplied are defined.
///
/// For a Torus network this is the field of integers modulo the curve's group order; shares and
/// Lagrange coefficients live here. This trait does not have to be implemented for a finite field
/// scalar itself, it can be a pass-through implemented for a type just for the ciphersuite.
pub trait Field: Copy + Clone {
    /// An element of the scalar field GF(q).
    /// The Eq/PartialEq implementation MUST be constant-time.
    type Scalar: Add<Output = Self::Scalar>
        + Copy
        + Clone
        + Debug
        + Eq
        + Mul<Output = Self::Scalar>
        + PartialEq
        + Sub<Output = Self::Scalar>;

    /// A unique byte array buf of fixed length N, big-endian.
    type Serialization: AsRef<[u8]> + AsMut<[u8]> + Debug + Default + TryFrom<Vec<u8>>;

    /// Returns the zero element of the field, the additive identity.
    fn zero() -> Self::Scalar;

    /// Returns the one element of the field, the multiplicative identity.
    fn one() -> Self::Scalar;

    /// Computes the multiplicative inverse of an element of the scalar field, failing if the
    /// element is zero.
    fn invert(scalar: &Self::Scalar) -> Result<Self::Scalar, FieldError>;

    /// Generate a random scalar from the entire space [0, q-1]
    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self::Scalar;

    /// Maps a scalar to its canonical big-endian byte encoding.
    fn serialize(scalar: &Self::Scalar) -> Self::Serialization;
}

/// An element of the [`Ciphersuite`] `C`'s [`Group`]'s scalar [`Field`].
pub type Scalar<C> = <<<C as Ciphersuite>::Group as Group>::Field as Field>::Scalar;

/// A prime-order elliptic curve group used both for ECDH share transport and for deriving public
/// keys from reconstructed secrets.
pub trait Group: Copy + Clone + PartialEq {
    /// The scalar field of the group.
    type Field: Field;

    /// An element of our group that we will be computing over.
    type Element: Add<Output = Self::Element>
        + Copy
        + Clone
        + Eq
        + Mul<<Self::Field as Field>::Scalar, Output = Self::Element>
        + PartialEq
        + Sub<Output = Self::Element>;

    /// The uncompressed SEC 1 encoding of an element: `0x04 || X || Y`, where both
    /// coordinates are big-endian and have the byte length of a [`Field::Serialization`].
    type Serialization: AsRef<[u8]> + Debug + TryFrom<Vec<u8>>;

    /// Additive identity of the prime order group.
    fn identity() -> Self::Element;

    /// The fixed generator element of the prime order group.
    fn generator() -> Self::Element;

    /// Maps an [`Element`](Group::Element) to its uncompressed encoding. This function raises an
    /// error if the element is the identity element of the group, which has no affine coordinates.
    fn serialize(element: &Self::Element) -> Result<Self::Serialization, GroupError>;

    /// Attempts to map an uncompressed encoding to an [`Element`](Group::Element).
    ///
    /// Fails if the point is not on the curve or is the identity.
    fn deserialize(buf: &Self::Serialization) -> Result<Self::Element, GroupError>;
}

/// An element of the [`Ciphersuite`] `C`'s [`Group`].
pub type Element<C> = <<C as Ciphersuite>::Group as Group>::Element;

/// A Torus ciphersuite: the curve the node network shares keys over and the hash function used
/// for token commitments and addresses.
pub trait Ciphersuite: Copy + Clone + PartialEq + Debug + 'static {
    /// The prime order group that this ciphersuite operates over.
    type Group: Group;

    /// A unique byte array of fixed length.
    type HashOutput: AsRef<[u8]>;

    /// The ciphersuite hash function.
    ///
    /// Used to commit to the identity token and to derive addresses from public keys.
    fn H(m: &[u8]) -> Self::HashOutput;
}

/// Generates a random nonzero scalar.
///
/// It assumes that the Scalar Eq/PartialEq implementation is constant-time.
pub(crate) fn random_nonzero<C: Ciphersuite, R: RngCore + CryptoRng>(rng: &mut R) -> Scalar<C> {
    loop {
        let scalar = <<C::Group as Group>::Field>::random(rng);

        if scalar != <<C::Group as Group>::Field>::zero() {
            return scalar;
        }
    }
}
