//! Retrieving and reconstructing a user's private key from the node network.
//!
//! The retrieval is a pipeline of stages, each consuming the previous stage's
//! validated output:
//!
//! 1. [`commitment_phase`]: every node acknowledges a commitment to the identity
//!    token and a fresh ephemeral public key; `k + t` acknowledgements needed.
//! 2. [`share_request_phase`]: every node is asked for its encrypted share.
//! 3. [`threshold_public_key`]: `k` nodes must answer and agree on the public key.
//! 4. [`decrypt_shares`]: each share is decrypted on its own; failures drop the node.
//! 5. [`reconstruct`]: a `k`-subset of shares must interpolate to the agreed key.

use std::time::{SystemTime, UNIX_EPOCH};

use derive_getters::Getters;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument, warn};

use crate::{
    ecies::decrypt_share,
    keys::{EphemeralKeyPair, PrivateKey, PublicKey},
    quorum::{gather, non_empty, settle_all},
    rpc::{
        methods, CommitmentRequestParams, JsonRpcRequest, JsonRpcResponse, KeyAssignResult,
        NodeSignature, PubKey, ShareRequestItem, ShareRequestParams,
    },
    share::{reconstruct, DecryptedShare},
    threshold::threshold_same,
    Ciphersuite, DecryptionError, Error, NodeDetails, NodeIndex, Phase, Threshold, Transport,
};

/// The message prefix of commitment requests.
const MESSAGE_PREFIX: &str = "mug00";

/// The outcome of a successful retrieval.
#[derive(Clone, PartialEq, Eq, Getters)]
pub struct RetrieveSharesResponse {
    /// The user's address, `0x` followed by 40 lowercase hex digits.
    eth_address: String,
    /// The reconstructed private key, lowercase hex without leading zeros.
    priv_key: String,
}

impl RetrieveSharesResponse {
    /// Builds the response for a reconstructed key.
    pub fn new<C: Ciphersuite>(private_key: &PrivateKey<C>) -> Result<Self, Error> {
        Ok(Self {
            eth_address: private_key.public_key().address()?,
            priv_key: private_key.to_hex(),
        })
    }
}

impl core::fmt::Debug for RetrieveSharesResponse {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RetrieveSharesResponse")
            .field("eth_address", &self.eth_address)
            .field("priv_key", &"<redacted>")
            .finish()
    }
}

/// Why one node contributed no share.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareFailure<C: Ciphersuite> {
    /// The node's index.
    pub index: NodeIndex<C>,
    /// What went wrong.
    pub error: DecryptionError,
}

/// Milliseconds since the Unix epoch.
fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// Retrieves the user's shares from `nodes` and reconstructs their private key.
///
/// A fresh ephemeral keypair is drawn from `rng` for this call only. The call
/// succeeds only if the reconstructed key matches the public key a quorum of
/// nodes agreed on.
#[instrument(skip_all, fields(verifier = %verifier, nodes = nodes.len()))]
pub async fn retrieve_shares<C, T, R>(
    transport: &T,
    nodes: &NodeDetails<C>,
    verifier: &str,
    verifier_id: &str,
    id_token: &str,
    mut rng: R,
) -> Result<RetrieveSharesResponse, Error>
where
    C: Ciphersuite,
    T: Transport,
    R: RngCore + CryptoRng,
{
    let threshold = nodes.threshold();
    let ephemeral = EphemeralKeyPair::<C>::new(&mut rng);

    let signatures = commitment_phase(
        transport,
        nodes,
        ephemeral.public(),
        verifier,
        id_token,
        timestamp_millis(),
    )
    .await?;

    let responses =
        share_request_phase(transport, nodes, signatures, verifier, verifier_id, id_token)
            .await?;

    let agreed = threshold_public_key::<C>(&responses, &threshold)?;

    let shares: Vec<DecryptedShare<C>> = decrypt_shares(nodes, &responses, &ephemeral)
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    debug!(decrypted = shares.len(), "decrypted shares");

    let private_key = reconstruct(&shares, *threshold.k(), &agreed)?;
    RetrieveSharesResponse::new(&private_key)
}

/// Sends the commitment request to every node and returns the collected node
/// signatures once at least `k + t` nodes have answered.
pub async fn commitment_phase<C, T>(
    transport: &T,
    nodes: &NodeDetails<C>,
    ephemeral_public: &PublicKey<C>,
    verifier: &str,
    id_token: &str,
    timestamp: u128,
) -> Result<Vec<NodeSignature>, Error>
where
    C: Ciphersuite,
    T: Transport,
{
    let (temppubx, temppuby) = ephemeral_public.coordinates_hex()?;
    let params = CommitmentRequestParams {
        messageprefix: MESSAGE_PREFIX.to_string(),
        tokencommitment: hex::encode(C::H(id_token.as_bytes())),
        temppubx,
        temppuby,
        timestamp: timestamp.to_string(),
        verifieridentifier: verifier.to_string(),
    };
    let body = JsonRpcRequest::new(methods::COMMITMENT_REQUEST, params).to_json()?;
    let required = nodes.threshold().commitment_quorum();

    let completed = gather(
        nodes
            .endpoints()
            .iter()
            .map(|endpoint| transport.post(endpoint, &body)),
        |responses| {
            let completed = non_empty(responses);
            if completed.len() >= required {
                Ok(completed)
            } else {
                Err(Error::QuorumNotReached {
                    phase: Phase::Commitment,
                    received: completed.len(),
                    required,
                })
            }
        },
    )
    .await?;
    debug!(responses = completed.len(), required, "commitment quorum reached");

    Ok(completed
        .iter()
        .filter_map(|response| JsonRpcResponse::parse(response))
        .filter_map(|response| response.result_as::<NodeSignature>())
        .collect())
}

/// Requests the encrypted shares from every node, including nodes that did not
/// answer the commitment request.
///
/// The result is aligned with the node list; `None` marks a node that failed or
/// answered with something that is not a JSON-RPC response.
pub async fn share_request_phase<C, T>(
    transport: &T,
    nodes: &NodeDetails<C>,
    node_signatures: Vec<NodeSignature>,
    verifier: &str,
    verifier_id: &str,
    id_token: &str,
) -> Result<Vec<Option<JsonRpcResponse>>, Error>
where
    C: Ciphersuite,
    T: Transport,
{
    let params = ShareRequestParams {
        encrypted: "yes".to_string(),
        item: vec![ShareRequestItem {
            verifieridentifier: verifier.to_string(),
            verifier_id: verifier_id.to_string(),
            idtoken: id_token.to_string(),
            nodesignatures: node_signatures,
        }],
    };
    let body = JsonRpcRequest::new(methods::SHARE_REQUEST, params).to_json()?;

    let responses = settle_all(
        nodes
            .endpoints()
            .iter()
            .map(|endpoint| transport.post(endpoint, &body)),
    )
    .await;

    Ok(responses
        .into_iter()
        .map(|response| response.as_deref().and_then(JsonRpcResponse::parse))
        .collect())
}

/// The public key reported by a share response, serialized for exact comparison.
fn reported_public_key(response: &JsonRpcResponse) -> Option<String> {
    let result: KeyAssignResult = response.result_as()?;
    serde_json::to_string(&result.first_key()?.public_key).ok()
}

/// Checks that at least `k` nodes answered the share request and that `k` of
/// them report the same public key, which is returned.
pub fn threshold_public_key<C: Ciphersuite>(
    responses: &[Option<JsonRpcResponse>],
    threshold: &Threshold,
) -> Result<PublicKey<C>, Error> {
    let k = *threshold.k();
    let completed: Vec<&JsonRpcResponse> = responses
        .iter()
        .flatten()
        .filter(|response| response.result_json().is_some())
        .collect();
    if completed.len() < k {
        return Err(Error::QuorumNotReached {
            phase: Phase::ShareRequest,
            received: completed.len(),
            required: k,
        });
    }

    let public_keys: Vec<Option<String>> = completed
        .iter()
        .map(|response| reported_public_key(response))
        .collect();
    let agreed = threshold_same(&public_keys, k).ok_or(Error::QuorumNotReached {
        phase: Phase::PublicKeyAgreement,
        received: public_keys.iter().flatten().count(),
        required: k,
    })?;
    let agreed: PubKey = serde_json::from_str(&agreed)?;
    debug!(x = %agreed.x, y = %agreed.y, "nodes agree on public key");

    PublicKey::from_coordinates(&agreed.x, &agreed.y)
}

/// Decrypts every node's share independently.
///
/// The outcome of each node is kept, aligned with the node list, so that a bad
/// node only removes its own share.
pub fn decrypt_shares<C: Ciphersuite>(
    nodes: &NodeDetails<C>,
    responses: &[Option<JsonRpcResponse>],
    ephemeral: &EphemeralKeyPair<C>,
) -> Vec<Result<DecryptedShare<C>, ShareFailure<C>>> {
    nodes
        .indexes()
        .iter()
        .zip(nodes.endpoints())
        .zip(responses)
        .map(|((index, endpoint), response)| {
            decrypt_response(response.as_ref(), ephemeral)
                .map(|value| DecryptedShare::new(*index, value))
                .map_err(|error| {
                    warn!(endpoint = %endpoint, error = %error, "dropping share");
                    ShareFailure {
                        index: *index,
                        error,
                    }
                })
        })
        .collect()
}

fn decrypt_response<C: Ciphersuite>(
    response: Option<&JsonRpcResponse>,
    ephemeral: &EphemeralKeyPair<C>,
) -> Result<Vec<u8>, DecryptionError> {
    let result: KeyAssignResult = response
        .and_then(JsonRpcResponse::result_as::<KeyAssignResult>)
        .ok_or(DecryptionError::NoResponse)?;
    let assignment = result.first_key().ok_or(DecryptionError::NoResponse)?;
    decrypt_share(ephemeral.secret(), assignment)
}
