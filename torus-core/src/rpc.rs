//! JSON-RPC messages exchanged with the nodes.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{Error, TorusNodePub};

/// The request id every call uses; nodes echo it back.
const REQUEST_ID: u64 = 10;

/// A JSON-RPC 2.0 request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest<P> {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// The remote method name.
    pub method: String,
    /// The request id.
    pub id: u64,
    /// Method parameters.
    pub params: P,
}

impl<P: Serialize> JsonRpcRequest<P> {
    /// Build a request for `method`.
    pub fn new(method: &str, params: P) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            id: REQUEST_ID,
            params,
        }
    }

    /// Serialize the request body.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// A JSON-RPC error object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human readable message.
    pub message: String,
    /// Optional extra data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A JSON-RPC 2.0 response with an untyped result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version.
    #[serde(default)]
    pub jsonrpc: String,
    /// The echoed request id.
    #[serde(default)]
    pub id: serde_json::Value,
    /// The result, if the call succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// The error, if the call failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Parses a raw response body. Returns `None` for empty or malformed bodies.
    pub fn parse(body: &str) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        serde_json::from_str(body).ok()
    }

    /// The result re-serialized to canonical JSON, used for exact-match agreement.
    pub fn result_json(&self) -> Option<String> {
        self.result
            .as_ref()
            .filter(|result| !result.is_null())
            .and_then(|result| serde_json::to_string(result).ok())
    }

    /// The error re-serialized to canonical JSON, used for exact-match agreement.
    pub fn error_json(&self) -> Option<String> {
        self.error
            .as_ref()
            .and_then(|error| serde_json::to_string(error).ok())
    }

    /// Deserialize the result into `T`. Returns `None` when absent or of the wrong shape.
    pub fn result_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.result
            .as_ref()
            .filter(|result| !result.is_null())
            .and_then(|result| serde_json::from_value(result.clone()).ok())
    }
}

/// Parameters of `CommitmentRequest`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentRequestParams {
    /// Fixed message prefix.
    pub messageprefix: String,
    /// Hash of the identity token, hex without `0x`.
    pub tokencommitment: String,
    /// X coordinate of the ephemeral public key.
    pub temppubx: String,
    /// Y coordinate of the ephemeral public key.
    pub temppuby: String,
    /// Milliseconds since the Unix epoch, as a decimal string.
    pub timestamp: String,
    /// The verifier name.
    pub verifieridentifier: String,
}

/// A node's signed acknowledgement of a commitment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSignature {
    /// The node's signature.
    pub signature: String,
    /// The signed data.
    pub data: String,
    /// X coordinate of the node's public key.
    pub nodepubx: String,
    /// Y coordinate of the node's public key.
    pub nodepuby: String,
}

/// One item of a `ShareRequest`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequestItem {
    /// The verifier name.
    pub verifieridentifier: String,
    /// The user's id within the verifier.
    pub verifier_id: String,
    /// The identity token.
    pub idtoken: String,
    /// Every commitment acknowledgement collected.
    pub nodesignatures: Vec<NodeSignature>,
}

/// Parameters of `ShareRequest`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRequestParams {
    /// Asks nodes to encrypt shares to the ephemeral key.
    pub encrypted: String,
    /// The requested items.
    pub item: Vec<ShareRequestItem>,
}

/// Hex coordinates of a public key as reported by nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKey {
    /// X coordinate.
    #[serde(rename = "X")]
    pub x: String,
    /// Y coordinate.
    #[serde(rename = "Y")]
    pub y: String,
}

/// ECIES parameters a node used to encrypt its share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EciesMetadata {
    /// CBC initialization vector, hex.
    pub iv: String,
    /// The node's ephemeral public key, uncompressed SEC 1 hex.
    pub ephem_public_key: String,
    /// Message authentication code, hex. Not checked by this client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    /// Cipher mode label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// One node's share of a key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyAssignment {
    /// The key's index, hex.
    #[serde(default)]
    pub index: String,
    /// The public key the share belongs to.
    pub public_key: PubKey,
    /// The network threshold the node believes in.
    #[serde(default)]
    pub threshold: u32,
    /// Verifier names and ids bound to the key.
    #[serde(default)]
    pub verifiers: HashMap<String, Vec<String>>,
    /// The encrypted share: base64 of the hex text of the ciphertext.
    pub share: String,
    /// ECIES parameters. Absent metadata means the share cannot be decrypted.
    #[serde(default)]
    pub metadata: Option<EciesMetadata>,
}

/// The `KeyAssign` result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAssignResult {
    /// The assigned keys; only the first is used.
    #[serde(default)]
    pub keys: Vec<KeyAssignment>,
}

impl KeyAssignResult {
    /// The first key assignment, if any.
    pub fn first_key(&self) -> Option<&KeyAssignment> {
        self.keys.first()
    }
}

/// Parameters of `VerifierLookupRequest`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierParams {
    /// The verifier name.
    pub verifier: String,
    /// The user's id within the verifier.
    pub verifier_id: String,
}

/// Parameters of `KeyAssign`, addressed to one node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAssignParams {
    /// The verifier name.
    pub verifier: String,
    /// The user's id within the verifier.
    pub verifier_id: String,
    /// Public key of the node asked to assign, when the network publishes them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_pub_key: Option<TorusNodePub>,
}

/// One key returned by a lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierLookupItem {
    /// X coordinate of the user's public key.
    #[serde(rename = "pub_key_X")]
    pub pub_key_x: String,
    /// Y coordinate of the user's public key.
    #[serde(rename = "pub_key_Y")]
    pub pub_key_y: String,
    /// The user's address.
    pub address: String,
}

/// The `VerifierLookupRequest` result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierLookupResult {
    /// The keys assigned to the verifier/verifier-id pair.
    #[serde(default)]
    pub keys: Vec<VerifierLookupItem>,
}

/// JSON-RPC method names.
pub mod methods {
    /// Commit to an identity token and ephemeral key.
    pub const COMMITMENT_REQUEST: &str = "CommitmentRequest";
    /// Request encrypted shares.
    pub const SHARE_REQUEST: &str = "ShareRequest";
    /// Look up the key of a verifier/verifier-id pair.
    pub const VERIFIER_LOOKUP_REQUEST: &str = "VerifierLookupRequest";
    /// Ask a node to assign a key to a verifier/verifier-id pair.
    pub const KEY_ASSIGN: &str = "KeyAssign";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_and_garbage() {
        assert_eq!(JsonRpcResponse::parse(""), None);
        assert_eq!(JsonRpcResponse::parse("not json"), None);
        let parsed = JsonRpcResponse::parse(r#"{"jsonrpc":"2.0","id":10,"result":null}"#).unwrap();
        assert_eq!(parsed.result_json(), None);
    }

    #[test]
    fn key_assignment_uses_node_field_names() {
        let body = r#"{"jsonrpc":"2.0","id":10,"result":{"keys":[{
            "Index":"1","PublicKey":{"X":"ab","Y":"cd"},"Threshold":1,
            "Verifiers":{"google":["alice@example.com"]},"Share":"c2hhcmU=",
            "Metadata":{"iv":"00","ephemPublicKey":"04","mac":"ff","mode":"AES256"}}]}}"#;
        let response = JsonRpcResponse::parse(body).unwrap();
        let result: KeyAssignResult = response.result_as().unwrap();
        let key = result.first_key().unwrap();
        assert_eq!(key.public_key.x, "ab");
        assert_eq!(key.share, "c2hhcmU=");
        assert_eq!(key.metadata.as_ref().unwrap().ephem_public_key, "04");
        assert_eq!(key.verifiers["google"], vec!["alice@example.com".to_string()]);
    }

    #[test]
    fn error_json_is_stable_for_identical_errors() {
        let a = JsonRpcResponse::parse(
            r#"{"jsonrpc":"2.0","id":10,"error":{"code":-32602,"message":"Input error","data":"no key"}}"#,
        )
        .unwrap();
        let b = JsonRpcResponse::parse(
            r#"{"id":10,"error":{"data":"no key","message":"Input error","code":-32602},"jsonrpc":"2.0"}"#,
        )
        .unwrap();
        assert_eq!(a.error_json(), b.error_json());
        assert!(a.error_json().is_some());
    }
}
