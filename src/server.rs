use std::sync::Arc;

use serde_json::Value;

use crate::batch::BatchErrors;
use crate::registry::Registry;
use crate::types::*;
use crate::validate;

/// What a handler hands back.
///
/// `Ok(Some(result))` answers the call, `Ok(None)` acknowledges it as a
/// notification and suppresses the response even if the request carried an
/// id. Errors are turned into the matching catalogue response.
pub type HandlerResult = Result<Option<Value>, HandlerError>;

/// Handler trait for JSON-RPC methods. Implement this or use closures.
///
/// `params` is `null` when the request had none; `flags` says which shape
/// it has and whether the caller expects an answer.
pub trait Handler<S = ()>: Send + Sync {
    fn call(&self, state: &S, flags: DispatchFlags, params: Value) -> HandlerResult;
}

/// Post-processing step applied to every successful, answered response.
///
/// Implementations may mutate or replace the response. On internal
/// failure they must return the response they were given.
pub trait ResponseHook<S = ()>: Send + Sync {
    fn transform(&self, state: &S, method: &str, response: JsonRpcResponse) -> JsonRpcResponse;
}

/// Wraps a closure into a Handler.
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    pub fn new<S>(f: F) -> Arc<dyn Handler<S>>
    where
        F: Fn(&S, DispatchFlags, Value) -> HandlerResult + Send + Sync + 'static,
    {
        Arc::new(Self { f })
    }
}

impl<S, F> Handler<S> for FnHandler<F>
where
    F: Fn(&S, DispatchFlags, Value) -> HandlerResult + Send + Sync,
{
    fn call(&self, state: &S, flags: DispatchFlags, params: Value) -> HandlerResult {
        (self.f)(state, flags, params)
    }
}

/// The JSON-RPC server. Create with `ServerBuilder`, register handlers, then
/// feed it requests.
///
/// `S` is application state passed by reference to every handler and to the
/// response hook.
pub struct Server<S = ()> {
    pub(crate) state: S,
    pub(crate) registry: Registry<S>,
    pub(crate) hook: Option<Arc<dyn ResponseHook<S>>>,
    pub(crate) batch_errors: BatchErrors,
}

impl Server {
    /// Create a new server builder without application state.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new(())
    }
}

impl<S> Server<S> {
    /// Create a new server builder carrying `state`.
    pub fn with_state(state: S) -> ServerBuilder<S> {
        ServerBuilder::new(state)
    }

    /// Register a method handler. A later registration of the same name
    /// replaces this one.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler<S>>) {
        self.registry.register(name, handler);
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Acquire per-server resources. Nothing to acquire yet.
    pub fn open(&self) -> Result<(), RpcServerError> {
        tracing::debug!(methods = self.registry.len(), "jsonrpc server opened");
        Ok(())
    }

    /// Release per-server resources.
    pub fn close(self) -> Result<(), RpcServerError> {
        tracing::debug!("jsonrpc server closed");
        Ok(())
    }

    /// Validate, resolve and invoke one request object.
    ///
    /// Returns `Ok(None)` when no response is due: the request had no id,
    /// or the handler acknowledged it as a notification. A rejection
    /// carries the error document for the caller to send.
    ///
    /// Once the envelope is valid, a request without an id is never
    /// answered, not even when lookup, params or the handler fail.
    pub fn handle_single(&self, request: Value) -> Result<Option<JsonRpcResponse>, Rejection> {
        let validate::Envelope {
            jsonrpc,
            id,
            method,
            params,
            mut flags,
        } = validate::envelope(request).inspect_err(|r| {
            tracing::debug!(error = %r.error, "rejecting request");
        })?;

        let Some(handler) = self.registry.get(&method) else {
            tracing::debug!(method = %method, "method not found");
            return reject(DispatchError::MethodNotFound(method), id, flags);
        };

        let params = match validate::params(params) {
            Ok((params, shape)) => {
                flags |= shape;
                params
            }
            Err(error) => {
                tracing::debug!(method = %method, error = %error, "rejecting request");
                return reject(error, id, flags);
            }
        };

        let result = match handler.call(&self.state, flags, params) {
            Ok(Some(result)) => result,
            Ok(None) => {
                tracing::debug!(method = %method, "handler acknowledged as notification");
                return Ok(None);
            }
            Err(source) => {
                tracing::debug!(method = %method, error = %source, "handler failed");
                return reject(DispatchError::Handler { method, source }, id, flags);
            }
        };

        // The caller asked for no answer, whatever the handler produced.
        if flags.is_notification() {
            return Ok(None);
        }

        let response = JsonRpcResponse::ok(jsonrpc, id.unwrap_or(Value::Null), result);
        let response = match &self.hook {
            Some(hook) => hook.transform(&self.state, &method, response),
            None => response,
        };
        Ok(Some(response))
    }
}

/// Turn a post-envelope failure into a rejection, or into silence for a
/// notification.
fn reject(
    error: DispatchError,
    id: Option<Value>,
    flags: DispatchFlags,
) -> Result<Option<JsonRpcResponse>, Rejection> {
    if flags.is_notification() {
        tracing::debug!(error = %error, "dropping failed notification");
        return Ok(None);
    }
    Err(Rejection::new(error, id))
}

/// Builder for constructing a Server.
pub struct ServerBuilder<S = ()> {
    state: S,
    registry: Registry<S>,
    hook: Option<Arc<dyn ResponseHook<S>>>,
    batch_errors: BatchErrors,
}

impl<S> ServerBuilder<S> {
    pub fn new(state: S) -> Self {
        ServerBuilder {
            state,
            registry: Registry::new(),
            hook: None,
            batch_errors: BatchErrors::default(),
        }
    }

    /// Register a method handler.
    pub fn method(mut self, name: impl Into<String>, handler: Arc<dyn Handler<S>>) -> Self {
        self.registry.register(name, handler);
        self
    }

    /// Set the hook applied to every answered response.
    pub fn response_hook(mut self, hook: impl ResponseHook<S> + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Choose what happens to rejected elements of a batch.
    pub fn batch_errors(mut self, policy: BatchErrors) -> Self {
        self.batch_errors = policy;
        self
    }

    /// Build the server.
    pub fn build(self) -> Server<S> {
        Server {
            state: self.state,
            registry: self.registry,
            hook: self.hook,
            batch_errors: self.batch_errors,
        }
    }
}
