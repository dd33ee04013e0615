//! Node indexes

use core::{
    fmt::{self, Debug},
    hash::{Hash, Hasher},
};

use crate::{serialization::scalar_from_u64, Ciphersuite, Error, Field, FieldError, Group, Scalar};

/// The index of a node in the network.
///
/// The index is the x-coordinate at which the node's share of the secret polynomial was
/// evaluated. MUST NOT be zero in the field, as f(0) is the secret itself.
#[derive(Copy, Clone, PartialEq)]
pub struct NodeIndex<C: Ciphersuite>(Scalar<C>);

impl<C> NodeIndex<C>
where
    C: Ciphersuite,
{
    /// Create a new index from a scalar.
    pub fn new(scalar: Scalar<C>) -> Result<Self, Error> {
        if scalar == <<C::Group as Group>::Field>::zero() {
            Err(FieldError::InvalidZeroScalar.into())
        } else {
            Ok(Self(scalar))
        }
    }

    /// Get the inner scalar.
    pub fn to_scalar(&self) -> Scalar<C> {
        self.0
    }

    /// Serialize the index as a big-endian field element.
    pub fn serialize(&self) -> Vec<u8> {
        <<C::Group as Group>::Field>::serialize(&self.0)
            .as_ref()
            .to_vec()
    }

    /// The default indexes `1..=n` for a network of `n` nodes.
    pub fn default_indexes(n: u16) -> Vec<Self> {
        (1..=n)
            .map(|i| Self(scalar_from_u64::<C>(u64::from(i))))
            .collect()
    }
}

impl<C> Eq for NodeIndex<C> where C: Ciphersuite {}

impl<C> Debug for NodeIndex<C>
where
    C: Ciphersuite,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("NodeIndex")
            .field(&hex::encode(self.serialize()))
            .finish()
    }
}

#[allow(clippy::derived_hash_with_manual_eq)]
impl<C> Hash for NodeIndex<C>
where
    C: Ciphersuite,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialize().hash(state)
    }
}

impl<C> TryFrom<u16> for NodeIndex<C>
where
    C: Ciphersuite,
{
    type Error = Error;

    fn try_from(n: u16) -> Result<NodeIndex<C>, Self::Error> {
        Self::new(scalar_from_u64::<C>(u64::from(n)))
    }
}
