//! Torus error types

use core::fmt;

use thiserror::Error;

/// The stage of the retrieval pipeline at which a quorum was not reached.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    /// Not enough nodes acknowledged the commitment request.
    Commitment,
    /// Not enough nodes returned a share.
    ShareRequest,
    /// Not enough nodes returned the same public key.
    PublicKeyAgreement,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Commitment => f.write_str("commitment"),
            Phase::ShareRequest => f.write_str("share request"),
            Phase::PublicKeyAgreement => f.write_str("public key agreement"),
        }
    }
}

/// An error related to retrieving or reconstructing a key.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// Fewer nodes than required answered (or agreed) in some phase.
    #[error("quorum not reached during {phase}: got {received}, need {required}")]
    QuorumNotReached {
        /// The phase that failed.
        phase: Phase,
        /// How many usable responses were received.
        received: usize,
        /// How many were required.
        required: usize,
    },
    /// Not enough shares were decrypted to attempt reconstruction.
    #[error("insufficient shares: got {available}, need {required}")]
    InsufficientShares {
        /// Number of decrypted shares.
        available: usize,
        /// The reconstruction threshold k.
        required: usize,
    },
    /// No k-subset of the decrypted shares matches the agreed public key.
    #[error("could not derive private key")]
    CouldNotDerivePrivateKey,
    /// Two shares in one interpolation set have the same index.
    #[error("Duplicated shares provided.")]
    DuplicatedShares,
    /// The public key resolver could not produce a key.
    #[error("lookup failed: {0}")]
    LookupFailed(&'static str),
    /// The node list is empty or its parts have different lengths.
    #[error("Invalid node details: endpoints, indexes and node keys must be non-empty and of equal length.")]
    InvalidNodeDetails,
    /// A hex string could not be parsed.
    #[error("Malformed hex encoding.")]
    MalformedHex,
    /// The private key is zero or otherwise unusable.
    #[error("Malformed private key.")]
    MalformedPrivateKey,
    /// The HTTP client could not be built.
    #[error("Could not build the HTTP client: {0}")]
    HttpClient(String),
    /// The ciphersuite hash is shorter than an address.
    #[error("Hash output is too short to derive an address.")]
    HashTooShort,
    /// A JSON-RPC payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error in scalar Field.
    #[error("Error in scalar Field.")]
    Field(#[from] FieldError),
    /// Error in elliptic curve Group.
    #[error("Error in elliptic curve Group.")]
    Group(#[from] GroupError),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// An error related to a scalar Field.
#[non_exhaustive]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum FieldError {
    /// This scalar MUST NOT be zero.
    #[error("Invalid for this scalar to be zero.")]
    InvalidZeroScalar,
}

/// An error related to a Group (usually an elliptic curve or constructed from one) or one of its Elements.
#[non_exhaustive]
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum GroupError {
    /// The encoding of a group element was malformed.
    #[error("Malformed group element encoding.")]
    MalformedElement,
    /// This element MUST NOT be the identity.
    #[error("Invalid for this element to be the identity.")]
    InvalidIdentityElement,
}

/// Why a single node's share was dropped.
///
/// These never abort a retrieval; they only shrink the set of shares
/// available for reconstruction.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum DecryptionError {
    /// The node did not answer, or answered without a usable result.
    #[error("no usable response")]
    NoResponse,
    /// The key assignment carried no ECIES metadata.
    #[error("missing share metadata")]
    MissingMetadata,
    /// The node's ephemeral public key is not a valid point.
    #[error("invalid ephemeral public key")]
    InvalidEphemeralKey,
    /// The IV is not 16 bytes of hex.
    #[error("invalid iv")]
    InvalidIv,
    /// The share is not base64 wrapping hex text.
    #[error("invalid share encoding")]
    InvalidEncoding,
    /// AES-CBC decryption or padding removal failed.
    #[error("cipher failure")]
    Cipher,
}
