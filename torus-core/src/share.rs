//! Decrypted shares and reconstruction of the secret from them.

use derive_getters::Getters;
use itertools::Itertools;
use tracing::debug;

use crate::{
    keys::{PrivateKey, PublicKey},
    serialization::reduce_be_bytes,
    Ciphersuite, Error, Field, Group, NodeIndex, Scalar,
};

/// One node's decrypted share: the point `(index, value)` on the secret polynomial.
#[derive(Clone, PartialEq, Eq, Getters)]
pub struct DecryptedShare<C: Ciphersuite> {
    /// The node's index, its x-coordinate.
    index: NodeIndex<C>,
    /// The share value as an unsigned big-endian integer, not yet reduced.
    value: Vec<u8>,
}

impl<C> DecryptedShare<C>
where
    C: Ciphersuite,
{
    /// Create a share from a node index and its big-endian value.
    pub fn new(index: NodeIndex<C>, value: Vec<u8>) -> Self {
        Self { index, value }
    }

    /// The value reduced modulo the group order.
    pub fn to_scalar(&self) -> Scalar<C> {
        reduce_be_bytes::<C>(&self.value)
    }
}

impl<C> core::fmt::Debug for DecryptedShare<C>
where
    C: Ciphersuite,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DecryptedShare")
            .field("index", &self.index)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Computes the Lagrange coefficient of `index` for interpolating at x = 0
/// over `indexes`: the product over every other `j` of `-x_j / (x_i - x_j)`.
///
/// Fails with [`Error::DuplicatedShares`] if any index appears twice.
pub fn compute_lagrange_coefficient<C: Ciphersuite>(
    indexes: &[NodeIndex<C>],
    index: &NodeIndex<C>,
) -> Result<Scalar<C>, Error> {
    if !indexes.iter().all_unique() {
        return Err(Error::DuplicatedShares);
    }

    let zero = <<C::Group as Group>::Field>::zero();
    let mut num = <<C::Group as Group>::Field>::one();
    let mut den = <<C::Group as Group>::Field>::one();

    for other in indexes.iter().filter(|other| *other != index) {
        num = num * (zero - other.to_scalar());
        den = den * (index.to_scalar() - other.to_scalar());
    }

    Ok(num * <<C::Group as Group>::Field>::invert(&den)?)
}

/// Interpolates the secret polynomial at x = 0 from the given shares.
///
/// All arithmetic is modulo the group order. The result does not depend on the
/// order of `shares`.
pub fn interpolate<C: Ciphersuite>(shares: &[DecryptedShare<C>]) -> Result<Scalar<C>, Error> {
    let indexes: Vec<NodeIndex<C>> = shares.iter().map(|share| share.index).collect();
    shares.iter().try_fold(
        <<C::Group as Group>::Field>::zero(),
        |secret, share| {
            let lagrange_coefficient = compute_lagrange_coefficient(&indexes, &share.index)?;
            Ok(secret + lagrange_coefficient * share.to_scalar())
        },
    )
}

/// Searches the `k`-subsets of `shares` for one whose interpolated secret has
/// public key `expected`.
///
/// Subsets are visited in lexicographic order of positions in `shares` and the
/// search stops at the first match.
pub fn reconstruct<C: Ciphersuite>(
    shares: &[DecryptedShare<C>],
    k: usize,
    expected: &PublicKey<C>,
) -> Result<PrivateKey<C>, Error> {
    if k == 0 || shares.len() < k {
        return Err(Error::InsufficientShares {
            available: shares.len(),
            required: k,
        });
    }

    for combination in shares.iter().cloned().combinations(k) {
        let secret = match interpolate(&combination) {
            Ok(secret) => secret,
            Err(e) => {
                debug!(error = %e, "skipping share combination");
                continue;
            }
        };
        let Ok(candidate) = PrivateKey::from_scalar(secret) else {
            continue;
        };
        if candidate.public_key() == *expected {
            return Ok(candidate);
        }
    }

    Err(Error::CouldNotDerivePrivateKey)
}
