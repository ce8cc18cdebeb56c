use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON-RPC 2.0 error codes.
pub const ERR_CODE_PARSE: i32 = -32700;
pub const ERR_CODE_INVALID_REQ: i32 = -32600;
pub const ERR_CODE_NO_METHOD: i32 = -32601;
pub const ERR_CODE_BAD_PARAMS: i32 = -32602;
pub const ERR_CODE_INTERNAL: i32 = -32603;

/// Bounds of the implementation-defined server error range.
pub const ERR_CODE_SERVER_MIN: i32 = -32099;
pub const ERR_CODE_SERVER_MAX: i32 = -32000;

/// The only protocol version this crate speaks.
pub const JSONRPC_VERSION: &str = "2.0";

// ── Response ──

/// JSON-RPC 2.0 response document.
///
/// Exactly one of `result` / `error` is set. `id` is always present on the
/// wire; it is `null` when the request id could not be determined.
///
/// `extensions` carries extra top-level members added after dispatch, e.g.
/// the `signature` member written by [`Ed25519Signer`](crate::Ed25519Signer).
/// They are serialized after the standard members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl JsonRpcResponse {
    /// Successful response carrying a handler result.
    pub fn ok(jsonrpc: impl Into<String>, id: Value, result: Value) -> Self {
        JsonRpcResponse {
            jsonrpc: jsonrpc.into(),
            id,
            result: Some(result),
            error: None,
            extensions: Map::new(),
        }
    }

    /// Error response. A missing id is written as `null`.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        JsonRpcResponse {
            jsonrpc: JSONRPC_VERSION.into(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
            extensions: Map::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Error code, if this is an error response.
    pub fn error_code(&self) -> Option<i32> {
        self.error.as_ref().map(|e| e.code)
    }
}

/// A `"result": null` member is a present, null result.
fn present<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ── Dispatch flags ──

/// Per-request bitset handed to every handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DispatchFlags(u8);

impl DispatchFlags {
    /// `params` is an array.
    pub const ARRAY_PARAMS: Self = Self(1);
    /// `params` is an object.
    pub const KEYED_PARAMS: Self = Self(1 << 2);
    /// The request carried no `id`; no response will be sent for it.
    pub const NOTIFICATION: Self = Self(1 << 3);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_notification(self) -> bool {
        self.contains(Self::NOTIFICATION)
    }
}

impl BitOr for DispatchFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DispatchFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

// ── Reply ──

/// Outcome of handling one top-level request document.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A single response object.
    Single(JsonRpcResponse),
    /// Responses for a batch, in request order. May be empty when every
    /// element was a notification.
    Batch(Vec<JsonRpcResponse>),
    /// Nothing to send back (a lone notification).
    Empty,
}

impl Reply {
    /// True when there is no response body to send.
    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty)
    }

    /// The single response, if this is not a batch.
    pub fn into_single(self) -> Option<JsonRpcResponse> {
        match self {
            Reply::Single(resp) => Some(resp),
            _ => None,
        }
    }

    /// The batch responses, if this was a batch.
    pub fn into_batch(self) -> Option<Vec<JsonRpcResponse>> {
        match self {
            Reply::Batch(responses) => Some(responses),
            _ => None,
        }
    }
}

/// `Empty` serializes as `null`; callers should check [`Reply::is_empty`]
/// and send nothing instead.
impl Serialize for Reply {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reply::Single(resp) => resp.serialize(serializer),
            Reply::Batch(responses) => responses.serialize(serializer),
            Reply::Empty => serializer.serialize_unit(),
        }
    }
}

// ── Errors ──

/// Failure signalled by a method handler.
///
/// Returning `Ok(None)` from a handler is the notification acknowledgement
/// and is not an error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HandlerError {
    #[error("method not found")]
    MethodNotFound,
    #[error("invalid request")]
    InvalidRequest,
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Why a single request was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("request is not an object")]
    NotAnObject,
    #[error("jsonrpc must be \"2.0\"")]
    InvalidVersion,
    #[error("id must be a string, a number or null")]
    InvalidId,
    #[error("method must be a string")]
    InvalidMethod,
    #[error("method not found: {0}")]
    MethodNotFound(String),
    #[error("params must be an array or an object")]
    MalformedParams,
    #[error("handler for {method} failed: {source}")]
    Handler {
        method: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Whether the request id may be echoed in the error response.
    ///
    /// The id is only trusted once the version and the id itself passed
    /// validation.
    pub fn echoes_id(&self) -> bool {
        !matches!(
            self,
            DispatchError::NotAnObject | DispatchError::InvalidVersion | DispatchError::InvalidId
        )
    }

    /// Build the catalogue error document for this failure.
    pub fn to_response(&self, id: Option<Value>) -> JsonRpcResponse {
        let id = if self.echoes_id() { id } else { None };
        match self {
            DispatchError::MethodNotFound(_)
            | DispatchError::Handler {
                source: HandlerError::MethodNotFound,
                ..
            } => crate::errors::method_not_found(id),
            DispatchError::Handler {
                source: HandlerError::InvalidParams(_),
                ..
            } => crate::errors::invalid_params(id),
            DispatchError::Handler {
                source: HandlerError::Internal(_),
                ..
            } => crate::errors::internal_error(id),
            _ => crate::errors::invalid_request(id),
        }
    }
}

/// A rejected request: the reason plus the error document to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub error: DispatchError,
    pub response: JsonRpcResponse,
}

impl Rejection {
    pub fn new(error: DispatchError, id: Option<Value>) -> Self {
        let response = error.to_response(id);
        Rejection { error, response }
    }
}

/// Error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum RpcServerError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response needs {required} bytes but the buffer holds {capacity}")]
    BufferTooSmall { required: usize, capacity: usize },
}
