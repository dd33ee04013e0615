//! Hex and big-integer encoding helpers.
//!
//! Nodes speak in loosely formatted hex: coordinates may drop leading zeros,
//! keys may or may not carry a `0x` prefix. Everything here treats hex text as
//! an unsigned big-endian integer rather than as a fixed-width byte string.

use crate::{Ciphersuite, Error, Field, Group, Scalar};

/// Strips leading zero bytes, keeping the minimal big-endian form of an integer.
pub(crate) fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

/// Parses hex text as an unsigned integer and returns its minimal big-endian bytes.
///
/// Accepts an optional `0x` prefix and an odd number of digits. Zero parses to an
/// empty vector.
pub(crate) fn hex_to_be_bytes(s: &str) -> Result<Vec<u8>, Error> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Err(Error::MalformedHex);
    }
    let bytes = if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    }
    .map_err(|_| Error::MalformedHex)?;
    Ok(strip_leading_zeros(&bytes).to_vec())
}

/// Encodes bytes as lowercase hex without leading zero digits; zero encodes as `"0"`.
pub(crate) fn to_minimal_hex(bytes: &[u8]) -> String {
    let encoded = hex::encode(strip_leading_zeros(bytes));
    match encoded.trim_start_matches('0') {
        "" => "0".to_string(),
        digits => digits.to_string(),
    }
}

/// Converts a small integer into a scalar.
pub(crate) fn scalar_from_u64<C: Ciphersuite>(n: u64) -> Scalar<C> {
    let one = <<C::Group as Group>::Field>::one();
    let mut sum = <<C::Group as Group>::Field>::zero();
    // Left-to-right double-and-add.
    for i in (0..u64::BITS).rev() {
        sum = sum + sum;
        if n & (1 << i) != 0 {
            sum = sum + one;
        }
    }
    sum
}

/// Reduces an arbitrary-length big-endian integer modulo the group order.
///
/// Uses Horner's rule over the scalar field, so the result is exact for any input length.
pub(crate) fn reduce_be_bytes<C: Ciphersuite>(bytes: &[u8]) -> Scalar<C> {
    let radix = scalar_from_u64::<C>(256);
    bytes
        .iter()
        .fold(<<C::Group as Group>::Field>::zero(), |acc, b| {
            acc * radix + scalar_from_u64::<C>(u64::from(*b))
        })
}

/// Splits an uncompressed group element encoding into its X and Y coordinates.
pub(crate) fn split_coordinates(encoded: &[u8]) -> Result<(&[u8], &[u8]), Error> {
    match encoded.split_first() {
        Some((0x04, coordinates)) if coordinates.len() % 2 == 0 && !coordinates.is_empty() => {
            Ok(coordinates.split_at(coordinates.len() / 2))
        }
        _ => Err(crate::GroupError::MalformedElement.into()),
    }
}

/// Builds an uncompressed group element encoding from coordinate hex strings,
/// left-padding each coordinate to the field width.
pub(crate) fn join_coordinates<C: Ciphersuite>(x: &str, y: &str) -> Result<Vec<u8>, Error> {
    let width = <<<C::Group as Group>::Field as Field>::Serialization>::default()
        .as_ref()
        .len();
    let mut encoded = Vec::with_capacity(1 + 2 * width);
    encoded.push(0x04);
    for coordinate in [x, y] {
        let bytes = hex_to_be_bytes(coordinate)?;
        if bytes.len() > width {
            return Err(Error::MalformedHex);
        }
        encoded.resize(encoded.len() + width - bytes.len(), 0);
        encoded.extend_from_slice(&bytes);
    }
    Ok(encoded)
}
