//! Text-in, text-out entry points for embedding the server behind any
//! transport (HTTP body, socket frame, pipe line).

use serde_json::Value;

use crate::errors;
use crate::server::Server;
use crate::types::*;

impl<S> Server<S> {
    /// Parse a raw request body, dispatch it and serialize the reply.
    ///
    /// Unparseable input is answered with the Parse error document.
    /// Returns `Ok(None)` when there is nothing to send back.
    pub fn handle_bytes(&self, body: &[u8]) -> Result<Option<String>, RpcServerError> {
        let reply = match serde_json::from_slice::<Value>(body) {
            Ok(request) => self.handle(request),
            Err(e) => {
                tracing::debug!(error = %e, "request body is not valid json");
                Reply::Single(errors::parse_error())
            }
        };

        if reply.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::to_string(&reply)?))
    }

    /// Same as [`handle_bytes`](Self::handle_bytes) for text input.
    pub fn handle_str(&self, body: &str) -> Result<Option<String>, RpcServerError> {
        self.handle_bytes(body.as_bytes())
    }

    /// Write the serialized reply into a caller-owned buffer, followed by a
    /// NUL terminator. Returns the reply length without the terminator.
    ///
    /// An empty reply writes just the terminator. If the reply does not fit
    /// the buffer is left untouched and `BufferTooSmall` reports the size
    /// needed.
    pub fn handle_into(&self, body: &[u8], buf: &mut [u8]) -> Result<usize, RpcServerError> {
        let serialized = self.handle_bytes(body)?.unwrap_or_default();
        let len = serialized.len();

        if len + 1 > buf.len() {
            return Err(RpcServerError::BufferTooSmall {
                required: len + 1,
                capacity: buf.len(),
            });
        }

        buf[..len].copy_from_slice(serialized.as_bytes());
        buf[len] = 0;
        Ok(len)
    }
}
