//! `jsonrpc_server` — server-side request handling for JSON-RPC 2.0.
//!
//! A pure protocol handler: it validates request documents, resolves them to
//! registered method handlers, handles batches and builds spec-compliant
//! responses and error objects. Transport is up to you: feed it a parsed
//! `serde_json::Value` or raw request text from any HTTP framework, socket or
//! test harness.
//!
//! # Quick start
//!
//! ```rust
//! use jsonrpc_server::{FnHandler, HandlerError, Server};
//! use serde_json::{json, Value};
//!
//! let server = Server::builder()
//!     .method("hello", FnHandler::new(|_: &(), _, _| Ok(Some(json!("world!")))))
//!     .method("echo", FnHandler::new(|_: &(), _, params: Value| match params {
//!         Value::Null => Err(HandlerError::InvalidParams("params required".into())),
//!         params => Ok(Some(params)),
//!     }))
//!     .build();
//!
//! let out = server
//!     .handle_str(r#"{"jsonrpc":"2.0","id":1,"method":"hello"}"#)
//!     .unwrap();
//! assert_eq!(out.as_deref(), Some(r#"{"jsonrpc":"2.0","id":1,"result":"world!"}"#));
//!
//! // Notifications are executed but never answered.
//! let out = server.handle_str(r#"{"jsonrpc":"2.0","method":"hello"}"#).unwrap();
//! assert!(out.is_none());
//! ```

pub mod batch;
pub mod errors;
pub mod registry;
pub mod server;
pub mod signing;
mod transport;
pub mod types;
mod validate;

// Re-export the most commonly used items at the crate root.
pub use batch::BatchErrors;
pub use registry::Registry;
pub use server::{FnHandler, Handler, HandlerResult, ResponseHook, Server, ServerBuilder};
pub use signing::{verify_response, Ed25519Signer, SignatureError, SIGNATURE_MEMBER};
pub use types::{
    DispatchError, DispatchFlags, HandlerError, JsonRpcResponse, Rejection, Reply, RpcError,
    RpcServerError, JSONRPC_VERSION,
};
