//! The set of nodes a call talks to.

use derive_getters::Getters;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{Ciphersuite, Error, NodeIndex, Threshold};

/// A node's long-term public key, as published by the network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorusNodePub {
    /// X coordinate, hex.
    #[serde(rename = "X")]
    pub x: String,
    /// Y coordinate, hex.
    #[serde(rename = "Y")]
    pub y: String,
}

impl TorusNodePub {
    /// Create a node public key from hex coordinates.
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// The indexes to assign to the nodes.
#[derive(Clone, Debug)]
pub enum IndexList<'a, C: Ciphersuite> {
    /// Nodes are indexed `1..=n` in endpoint order.
    Default,
    /// Explicit indexes, one per endpoint, in endpoint order.
    Custom(&'a [NodeIndex<C>]),
}

/// The ordered list of nodes for one call.
///
/// Position `i` of every list describes the same node. The lists never change
/// once built.
#[derive(Clone, Debug, Getters)]
pub struct NodeDetails<C: Ciphersuite> {
    /// Node JSON-RPC endpoints.
    endpoints: Vec<String>,
    /// Node indexes (x-coordinates of their shares).
    indexes: Vec<NodeIndex<C>>,
    /// Node public keys; empty when not known.
    node_pub_keys: Vec<TorusNodePub>,
}

impl<C> NodeDetails<C>
where
    C: Ciphersuite,
{
    /// Describe a network by its endpoints and indexes.
    pub fn new<S: Into<String>>(
        endpoints: impl IntoIterator<Item = S>,
        indexes: IndexList<C>,
    ) -> Result<Self, Error> {
        let endpoints: Vec<String> = endpoints.into_iter().map(Into::into).collect();
        if endpoints.is_empty() {
            return Err(Error::InvalidNodeDetails);
        }
        let indexes = match indexes {
            IndexList::Default => {
                let n = u16::try_from(endpoints.len()).map_err(|_| Error::InvalidNodeDetails)?;
                NodeIndex::default_indexes(n)
            }
            IndexList::Custom(indexes) => {
                if indexes.len() != endpoints.len() || !indexes.iter().all_unique() {
                    return Err(Error::InvalidNodeDetails);
                }
                indexes.to_vec()
            }
        };
        Ok(Self {
            endpoints,
            indexes,
            node_pub_keys: Vec::new(),
        })
    }

    /// Attach the nodes' public keys, one per endpoint.
    pub fn with_node_pub_keys(mut self, node_pub_keys: Vec<TorusNodePub>) -> Result<Self, Error> {
        if node_pub_keys.len() != self.endpoints.len() {
            return Err(Error::InvalidNodeDetails);
        }
        self.node_pub_keys = node_pub_keys;
        Ok(self)
    }

    /// The number of nodes.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false; a node list has at least one node.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// The thresholds for this network size.
    pub fn threshold(&self) -> Threshold {
        Threshold::new(self.len())
    }
}
