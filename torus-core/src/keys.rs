//! Private keys, public keys and address derivation.

use core::fmt;

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::{
    random_nonzero,
    serialization::{
        hex_to_be_bytes, join_coordinates, reduce_be_bytes, split_coordinates,
        strip_leading_zeros, to_minimal_hex,
    },
    Ciphersuite, Element, Error, Field, Group, Scalar,
};

/// Number of trailing hash bytes that form an address.
const ADDRESS_LENGTH: usize = 20;

/// A secp256k1-style private key: a nonzero scalar modulo the group order.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct PrivateKey<C>
where
    C: Ciphersuite,
{
    pub(crate) scalar: Scalar<C>,
}

impl<C> PrivateKey<C>
where
    C: Ciphersuite,
{
    /// Generate a new random private key.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> PrivateKey<C> {
        PrivateKey {
            scalar: random_nonzero::<C, R>(rng),
        }
    }

    /// Creates a private key from a scalar, rejecting zero.
    pub fn from_scalar(scalar: Scalar<C>) -> Result<Self, Error> {
        if scalar == <<C::Group as Group>::Field>::zero() {
            return Err(Error::MalformedPrivateKey);
        }
        Ok(Self { scalar })
    }

    /// Parses a hex private key, reducing it modulo the group order.
    pub fn from_hex(hex: &str) -> Result<Self, Error> {
        let bytes = hex_to_be_bytes(hex)?;
        Self::from_scalar(reduce_be_bytes::<C>(&bytes))
    }

    /// Return the underlying scalar.
    pub fn to_scalar(self) -> Scalar<C> {
        self.scalar
    }

    /// Serialize to the fixed-width big-endian scalar encoding.
    pub fn serialize(&self) -> <<C::Group as Group>::Field as Field>::Serialization {
        <<C::Group as Group>::Field>::serialize(&self.scalar)
    }

    /// Lowercase hex of the key with leading zeros removed.
    pub fn to_hex(&self) -> String {
        to_minimal_hex(self.serialize().as_ref())
    }

    /// The public key `G * self`.
    pub fn public_key(&self) -> PublicKey<C> {
        PublicKey {
            element: C::Group::generator() * self.scalar,
        }
    }
}

impl<C> fmt::Debug for PrivateKey<C>
where
    C: Ciphersuite,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivateKey").field(&"<redacted>").finish()
    }
}

impl<C> Zeroize for PrivateKey<C>
where
    C: Ciphersuite,
{
    fn zeroize(&mut self) {
        self.scalar = <<C::Group as Group>::Field>::zero();
    }
}

/// A public key: a non-identity group element with affine coordinates.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct PublicKey<C>
where
    C: Ciphersuite,
{
    pub(crate) element: Element<C>,
}

impl<C> PublicKey<C>
where
    C: Ciphersuite,
{
    /// Wraps a group element.
    pub fn new(element: Element<C>) -> Self {
        Self { element }
    }

    /// Parses an uncompressed SEC 1 encoding (`04 || X || Y`) given as hex.
    pub fn from_uncompressed_hex(hex: &str) -> Result<Self, Error> {
        let bytes = hex::decode(hex.strip_prefix("0x").unwrap_or(hex))
            .map_err(|_| Error::MalformedHex)?;
        Self::deserialize(bytes)
    }

    /// Builds a public key from hex coordinates as nodes report them.
    pub fn from_coordinates(x: &str, y: &str) -> Result<Self, Error> {
        Self::deserialize(join_coordinates::<C>(x, y)?)
    }

    fn deserialize(bytes: Vec<u8>) -> Result<Self, Error> {
        let serialization = bytes
            .try_into()
            .map_err(|_| crate::GroupError::MalformedElement)?;
        Ok(Self {
            element: C::Group::deserialize(&serialization)?,
        })
    }

    /// Return the underlying group element.
    pub fn to_element(self) -> Element<C> {
        self.element
    }

    /// The uncompressed SEC 1 encoding.
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        Ok(C::Group::serialize(&self.element)?.as_ref().to_vec())
    }

    /// The X and Y coordinates as zero-padded lowercase hex.
    pub fn coordinates_hex(&self) -> Result<(String, String), Error> {
        let encoded = self.serialize()?;
        let (x, y) = split_coordinates(&encoded)?;
        Ok((hex::encode(x), hex::encode(y)))
    }

    /// Whether this key's coordinates equal the given hex coordinates as integers.
    ///
    /// Leading zeros and a `0x` prefix in the inputs are ignored.
    pub fn matches_coordinates(&self, x: &str, y: &str) -> Result<bool, Error> {
        let encoded = self.serialize()?;
        let (own_x, own_y) = split_coordinates(&encoded)?;
        Ok(strip_leading_zeros(own_x) == hex_to_be_bytes(x)?.as_slice()
            && strip_leading_zeros(own_y) == hex_to_be_bytes(y)?.as_slice())
    }

    /// The Ethereum-style address: `0x` followed by the last 20 bytes of
    /// `H(X || Y)` in lowercase hex.
    pub fn address(&self) -> Result<String, Error> {
        let encoded = self.serialize()?;
        let (_, coordinates) = encoded
            .split_first()
            .ok_or(crate::GroupError::MalformedElement)?;
        address_from_digest(C::H(coordinates).as_ref())
    }
}

/// `0x` followed by the last 20 bytes of `digest`.
fn address_from_digest(digest: &[u8]) -> Result<String, Error> {
    let start = digest
        .len()
        .checked_sub(ADDRESS_LENGTH)
        .ok_or(Error::HashTooShort)?;
    Ok(format!("0x{}", hex::encode(&digest[start..])))
}

impl<C> fmt::Debug for PublicKey<C>
where
    C: Ciphersuite,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey")
            .field(
                &self
                    .serialize()
                    .map(hex::encode)
                    .unwrap_or("<invalid>".to_string()),
            )
            .finish()
    }
}

impl<C> From<&PrivateKey<C>> for PublicKey<C>
where
    C: Ciphersuite,
{
    fn from(private_key: &PrivateKey<C>) -> Self {
        private_key.public_key()
    }
}

/// A one-time keypair that nodes encrypt their shares to.
///
/// Created fresh for every retrieval and zeroized when dropped. It is
/// deliberately not `Clone`.
pub struct EphemeralKeyPair<C>
where
    C: Ciphersuite,
{
    secret: PrivateKey<C>,
    public: PublicKey<C>,
}

impl<C> EphemeralKeyPair<C>
where
    C: Ciphersuite,
{
    /// Generate a fresh keypair.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secret = PrivateKey::new(rng);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// The public half, sent to nodes in the commitment request.
    pub fn public(&self) -> &PublicKey<C> {
        &self.public
    }

    pub(crate) fn secret(&self) -> &PrivateKey<C> {
        &self.secret
    }
}

impl<C> Drop for EphemeralKeyPair<C>
where
    C: Ciphersuite,
{
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

impl<C> fmt::Debug for EphemeralKeyPair<C>
where
    C: Ciphersuite,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralKeyPair")
            .field("secret", &self.secret)
            .field("public", &self.public)
            .finish()
    }
}

/// Derives the address of a hex-encoded private key.
pub fn generate_address_from_priv_key<C: Ciphersuite>(private_key: &str) -> Result<String, Error> {
    PrivateKey::<C>::from_hex(private_key)?.public_key().address()
}
