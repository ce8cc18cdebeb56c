//! Canonical JSON-RPC 2.0 error responses.
//!
//! Every constructor is total: a missing `id` becomes `null`.

use serde_json::Value;

use crate::types::*;

/// `-32700`: the request body was not valid JSON.
pub fn parse_error() -> JsonRpcResponse {
    JsonRpcResponse::error(None, ERR_CODE_PARSE, "Parse error")
}

/// `-32600`: the document is not a valid request object.
pub fn invalid_request(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::error(id, ERR_CODE_INVALID_REQ, "Invalid Request")
}

/// `-32601`: no handler is registered under the method name.
pub fn method_not_found(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::error(id, ERR_CODE_NO_METHOD, "Method not found")
}

/// `-32602`
pub fn invalid_params(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::error(id, ERR_CODE_BAD_PARAMS, "Invalid params")
}

/// `-32603`
pub fn internal_error(id: Option<Value>) -> JsonRpcResponse {
    JsonRpcResponse::error(id, ERR_CODE_INTERNAL, "Internal error")
}

/// Server-defined error. `code` is kept when it lies in
/// `-32099..=-32000`, anything else is reported as `-32603`.
pub fn server_error(code: i32, id: Option<Value>) -> JsonRpcResponse {
    let code = if (ERR_CODE_SERVER_MIN..=ERR_CODE_SERVER_MAX).contains(&code) {
        code
    } else {
        ERR_CODE_INTERNAL
    };
    JsonRpcResponse::error(id, code, "Server error")
}
