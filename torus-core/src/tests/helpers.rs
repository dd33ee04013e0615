//! Helper functions for testing

use rand_core::{CryptoRng, RngCore};

use crate::{keys::PrivateKey, Ciphersuite, DecryptedShare, Field, Group, NodeIndex, Scalar};

/// Generates `size` random polynomial coefficients.
pub fn generate_coefficients<C: Ciphersuite, R: RngCore + CryptoRng>(
    size: usize,
    rng: &mut R,
) -> Vec<Scalar<C>> {
    (0..size)
        .map(|_| <<C::Group as Group>::Field>::random(rng))
        .collect()
}

/// Evaluate the polynomial with the given coefficients (constant term first)
/// at `index` using Horner's method.
pub fn evaluate_polynomial<C: Ciphersuite>(
    index: &NodeIndex<C>,
    coefficients: &[Scalar<C>],
) -> Scalar<C> {
    coefficients
        .iter()
        .rev()
        .fold(<<C::Group as Group>::Field>::zero(), |value, coeff| {
            value * index.to_scalar() + *coeff
        })
}

/// Splits `secret` into one share per index with a random polynomial of degree `k - 1`.
pub fn generate_shares<C: Ciphersuite, R: RngCore + CryptoRng>(
    secret: &PrivateKey<C>,
    k: usize,
    indexes: &[NodeIndex<C>],
    rng: &mut R,
) -> Vec<DecryptedShare<C>> {
    let mut coefficients = vec![secret.to_scalar()];
    coefficients.extend(generate_coefficients::<C, R>(k - 1, rng));

    indexes
        .iter()
        .map(|index| {
            let value = evaluate_polynomial(index, &coefficients);
            DecryptedShare::new(
                *index,
                <<C::Group as Group>::Field>::serialize(&value)
                    .as_ref()
                    .to_vec(),
            )
        })
        .collect()
}

/// Indexes built from small integers.
pub fn indexes<C: Ciphersuite>(values: &[u16]) -> Vec<NodeIndex<C>> {
    values
        .iter()
        .map(|value| NodeIndex::try_from(*value).unwrap())
        .collect()
}
