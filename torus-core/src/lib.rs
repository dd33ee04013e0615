#![allow(non_snake_case)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![doc = document_features::document_features!()]

mod error;
mod identifier;
mod serialization;
mod traits;

pub mod ecies;
pub mod keys;
pub mod lookup;
pub mod nodes;
pub mod quorum;
pub mod retrieve;
pub mod rpc;
pub mod share;
pub mod threshold;
pub mod transport;


pub use error::{DecryptionError, Error, FieldError, GroupError, Phase};
pub use identifier::NodeIndex;
pub use keys::{generate_address_from_priv_key, EphemeralKeyPair, PrivateKey, PublicKey};
pub use lookup::{get_public_address, TorusPublicKey, VerifierArgs};
pub use nodes::{IndexList, NodeDetails, TorusNodePub};
pub use retrieve::{retrieve_shares, RetrieveSharesResponse};
pub use share::DecryptedShare;
pub use threshold::Threshold;
pub(crate) use traits::random_nonzero;
pub use traits::{Ciphersuite, Element, Field, Group, Scalar};
pub use transport::Transport;
