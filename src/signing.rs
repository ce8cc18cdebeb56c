//! Ed25519 response signing.
//!
//! The signed message is the method name, immediately followed by the compact
//! JSON of the unsigned response, followed by one NUL byte. The base64
//! signature is stored in the response's `signature` member.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde_json::Value;

use crate::server::ResponseHook;
use crate::types::JsonRpcResponse;

/// Response member holding the signature.
pub const SIGNATURE_MEMBER: &str = "signature";

/// Signs every answered response with an Ed25519 key.
pub struct Ed25519Signer {
    key: SigningKey,
}

impl Ed25519Signer {
    pub fn new(key: SigningKey) -> Self {
        Ed25519Signer { key }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(SigningKey::from_bytes(seed))
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    /// Sign `response` in place.
    pub fn sign(&self, method: &str, response: &mut JsonRpcResponse) -> Result<(), serde_json::Error> {
        let message = signing_message(method, response)?;
        let signature = self.key.sign(&message);
        response.extensions.insert(
            SIGNATURE_MEMBER.into(),
            Value::String(BASE64.encode(signature.to_bytes())),
        );
        Ok(())
    }
}

impl<S> ResponseHook<S> for Ed25519Signer {
    fn transform(&self, _state: &S, method: &str, mut response: JsonRpcResponse) -> JsonRpcResponse {
        if let Err(e) = self.sign(method, &mut response) {
            tracing::error!(method, error = %e, "failed to sign response, sending it unsigned");
        }
        response
    }
}

/// Bytes covered by the signature of `response`.
///
/// Any existing `signature` member is left out.
pub fn signing_message(method: &str, response: &JsonRpcResponse) -> Result<Vec<u8>, serde_json::Error> {
    let dump = if response.extensions.contains_key(SIGNATURE_MEMBER) {
        let mut unsigned = response.clone();
        unsigned.extensions.remove(SIGNATURE_MEMBER);
        serde_json::to_vec(&unsigned)?
    } else {
        serde_json::to_vec(response)?
    };

    let mut message = Vec::with_capacity(method.len() + dump.len() + 1);
    message.extend_from_slice(method.as_bytes());
    message.extend_from_slice(&dump);
    message.push(0);
    Ok(message)
}

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("response has no string `signature` member")]
    Missing,
    #[error("signature is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("signature rejected: {0}")]
    Invalid(#[from] ed25519_dalek::SignatureError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Check the signature carried by a response for `method`.
pub fn verify_response(
    key: &VerifyingKey,
    method: &str,
    response: &JsonRpcResponse,
) -> Result<(), SignatureError> {
    let encoded = response
        .extensions
        .get(SIGNATURE_MEMBER)
        .and_then(Value::as_str)
        .ok_or(SignatureError::Missing)?;
    let raw = BASE64.decode(encoded)?;
    let signature = Signature::from_slice(&raw)?;
    let message = signing_message(method, response)?;
    key.verify(&message, &signature)?;
    Ok(())
}
