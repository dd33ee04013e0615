//! Resolving a user's public address without reconstructing their key.

use derive_getters::Getters;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument, warn};

use crate::{
    quorum::gather,
    rpc::{
        methods, JsonRpcRequest, JsonRpcResponse, KeyAssignParams, VerifierLookupResult,
        VerifierParams,
    },
    threshold::threshold_same,
    Ciphersuite, Error, NodeDetails, TorusNodePub, Transport,
};

/// The identity whose key is looked up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierArgs {
    /// The verifier name.
    pub verifier: String,
    /// The user's id within the verifier.
    pub verifier_id: String,
}

impl VerifierArgs {
    /// Create verifier arguments.
    pub fn new(verifier: impl Into<String>, verifier_id: impl Into<String>) -> Self {
        Self {
            verifier: verifier.into(),
            verifier_id: verifier_id.into(),
        }
    }

    fn params(&self) -> VerifierParams {
        VerifierParams {
            verifier: self.verifier.clone(),
            verifier_id: self.verifier_id.clone(),
        }
    }

    fn assign_params(&self, node_pub_key: Option<&TorusNodePub>) -> KeyAssignParams {
        KeyAssignParams {
            verifier: self.verifier.clone(),
            verifier_id: self.verifier_id.clone(),
            node_pub_key: node_pub_key.cloned(),
        }
    }
}

/// A user's public address, and optionally their public key coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
pub struct TorusPublicKey {
    /// The user's address.
    address: String,
    /// X coordinate, present for extended lookups.
    x: Option<String>,
    /// Y coordinate, present for extended lookups.
    y: Option<String>,
}

/// What a majority of nodes answered to a lookup.
///
/// At least one of the two is present.
#[derive(Clone, Debug, PartialEq, Eq, Getters)]
pub struct KeyLookupResult {
    /// The agreed result, as canonical JSON.
    key_result: Option<String>,
    /// The agreed error, as canonical JSON.
    err_result: Option<String>,
}

/// Asks every node for the key of `verifier_args` and returns the answer a
/// majority of them agree on.
pub async fn key_lookup<C, T>(
    transport: &T,
    nodes: &NodeDetails<C>,
    verifier_args: &VerifierArgs,
) -> Result<KeyLookupResult, Error>
where
    C: Ciphersuite,
    T: Transport,
{
    let body =
        JsonRpcRequest::new(methods::VERIFIER_LOOKUP_REQUEST, verifier_args.params()).to_json()?;
    let required = nodes.threshold().lookup_quorum();

    gather(
        nodes
            .endpoints()
            .iter()
            .map(|endpoint| transport.post(endpoint, &body)),
        |responses| {
            let parsed: Vec<Option<JsonRpcResponse>> = responses
                .iter()
                .map(|response| response.as_deref().and_then(JsonRpcResponse::parse))
                .collect();
            let errors: Vec<Option<String>> = parsed
                .iter()
                .map(|response| response.as_ref().and_then(JsonRpcResponse::error_json))
                .collect();
            let keys: Vec<Option<String>> = parsed
                .iter()
                .map(|response| response.as_ref().and_then(JsonRpcResponse::result_json))
                .collect();

            let err_result = threshold_same(&errors, required);
            let key_result = threshold_same(&keys, required);
            if err_result.is_none() && key_result.is_none() {
                return Err(Error::LookupFailed("invalid results"));
            }
            Ok(KeyLookupResult {
                key_result,
                err_result,
            })
        },
    )
    .await
}

/// Asks one node to assign a key to `verifier_args`.
///
/// Starts at a random node and moves on to the next one whenever a node fails,
/// giving up once every node has been tried. Each request carries the public
/// key of the node it is sent to, if `nodes` has them.
pub async fn key_assign<C, T, R>(
    transport: &T,
    nodes: &NodeDetails<C>,
    verifier_args: &VerifierArgs,
    rng: &mut R,
) -> Result<JsonRpcResponse, Error>
where
    C: Ciphersuite,
    T: Transport,
    R: RngCore + CryptoRng,
{
    let n = nodes.len();
    let first = rng.next_u32() as usize % n;

    for offset in 0..n {
        let node = (first + offset) % n;
        let endpoint = &nodes.endpoints()[node];
        let node_pub_key = nodes.node_pub_keys().get(node);
        let body = JsonRpcRequest::new(
            methods::KEY_ASSIGN,
            verifier_args.assign_params(node_pub_key),
        )
        .to_json()?;
        debug!(endpoint = %endpoint, "assigning key");
        let response = transport
            .post(endpoint, &body)
            .await
            .as_deref()
            .and_then(JsonRpcResponse::parse);
        match response {
            Some(response) if response.error.is_none() => return Ok(response),
            Some(response) => {
                warn!(endpoint = %endpoint, error = ?response.error, "key assignment rejected")
            }
            None => warn!(endpoint = %endpoint, "key assignment failed"),
        }
    }

    Err(Error::LookupFailed("looped through all nodes"))
}

fn first_lookup_item(key_result: &str) -> Result<crate::rpc::VerifierLookupItem, Error> {
    let result: VerifierLookupResult = serde_json::from_str(key_result)
        .map_err(|_| Error::LookupFailed("could not get lookup, no keys"))?;
    result
        .keys
        .into_iter()
        .next()
        .ok_or(Error::LookupFailed("could not get lookup, no keys"))
}

/// Resolves the address of `verifier_args`, assigning a key first if the
/// network does not have one yet.
///
/// With `extended` the public key coordinates are returned as well.
#[instrument(skip_all, fields(verifier = %verifier_args.verifier, extended = extended))]
pub async fn get_public_address<C, T, R>(
    transport: &T,
    nodes: &NodeDetails<C>,
    verifier_args: &VerifierArgs,
    extended: bool,
    mut rng: R,
) -> Result<TorusPublicKey, Error>
where
    C: Ciphersuite,
    T: Transport,
    R: RngCore + CryptoRng,
{
    let lookup = key_lookup(transport, nodes, verifier_args).await?;

    let key_result = match (lookup.key_result, lookup.err_result) {
        (_, Some(err_result)) => {
            debug!(error = %err_result, "no key assigned yet");
            key_assign(transport, nodes, verifier_args, &mut rng).await?;
            key_lookup(transport, nodes, verifier_args)
                .await?
                .key_result
                .ok_or(Error::LookupFailed("could not get lookup, no results"))?
        }
        (Some(key_result), None) => key_result,
        (None, None) => {
            return Err(Error::LookupFailed(
                "could not get lookup, no valid key result or error result",
            ))
        }
    };

    let item = first_lookup_item(&key_result)?;
    Ok(if extended {
        TorusPublicKey {
            address: item.address,
            x: Some(item.pub_key_x),
            y: Some(item.pub_key_y),
        }
    } else {
        TorusPublicKey {
            address: item.address,
            x: None,
            y: None,
        }
    })
}
