use serde_json::Value;

use crate::errors;
use crate::server::Server;
use crate::types::*;

/// What to do with batch elements that were rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchErrors {
    /// Log the rejection and leave the element out of the response array.
    #[default]
    Suppress,
    /// Put the element's error document into the response array.
    Report,
}

impl<S> Server<S> {
    /// Route a parsed request document: a single object or a batch array.
    ///
    /// Batch elements are handled one after another in array order, and
    /// responses keep that order. Notifications never produce an entry.
    pub fn handle(&self, request: Value) -> Reply {
        match request {
            Value::Object(_) => match self.handle_single(request) {
                Ok(Some(response)) => Reply::Single(response),
                Ok(None) => Reply::Empty,
                Err(rejection) => Reply::Single(rejection.response),
            },
            Value::Array(requests) if requests.is_empty() => {
                tracing::debug!("rejecting empty batch");
                Reply::Single(errors::invalid_request(None))
            }
            Value::Array(requests) => Reply::Batch(self.handle_batch(requests)),
            _ => {
                tracing::debug!("rejecting request that is neither object nor array");
                Reply::Single(errors::invalid_request(None))
            }
        }
    }

    fn handle_batch(&self, requests: Vec<Value>) -> Vec<JsonRpcResponse> {
        let mut responses = Vec::with_capacity(requests.len());

        for (index, request) in requests.into_iter().enumerate() {
            match self.handle_single(request) {
                Ok(Some(response)) => responses.push(response),
                Ok(None) => {}
                Err(rejection) => match self.batch_errors {
                    BatchErrors::Suppress => {
                        tracing::warn!(index, error = %rejection.error, "dropping rejected batch element");
                    }
                    BatchErrors::Report => responses.push(rejection.response),
                },
            }
        }

        responses
    }
}
