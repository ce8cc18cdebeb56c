use serde_json::Value;

use crate::types::*;

/// Request members that passed the envelope checks.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
    pub flags: DispatchFlags,
}

/// Check `jsonrpc`, `id` and `method`, in that order.
///
/// Members are moved out of the request, so the `id` handed back is the
/// instance that was received.
pub(crate) fn envelope(request: Value) -> Result<Envelope, Rejection> {
    let Value::Object(mut obj) = request else {
        return Err(Rejection::new(DispatchError::NotAnObject, None));
    };

    let jsonrpc = match obj.remove("jsonrpc") {
        Some(Value::String(v)) if v == JSONRPC_VERSION => v,
        _ => return Err(Rejection::new(DispatchError::InvalidVersion, None)),
    };

    let mut flags = DispatchFlags::empty();
    let id = match obj.remove("id") {
        Some(id @ (Value::String(_) | Value::Number(_) | Value::Null)) => Some(id),
        Some(_) => return Err(Rejection::new(DispatchError::InvalidId, None)),
        None => {
            flags |= DispatchFlags::NOTIFICATION;
            None
        }
    };

    let method = match obj.remove("method") {
        Some(Value::String(m)) => m,
        _ => return Err(Rejection::new(DispatchError::InvalidMethod, id)),
    };

    Ok(Envelope {
        jsonrpc,
        id,
        method,
        params: obj.remove("params"),
        flags,
    })
}

/// Classify `params`. Absent params become `null` with no flag set.
pub(crate) fn params(params: Option<Value>) -> Result<(Value, DispatchFlags), DispatchError> {
    match params {
        None => Ok((Value::Null, DispatchFlags::empty())),
        Some(p @ Value::Array(_)) => Ok((p, DispatchFlags::ARRAY_PARAMS)),
        Some(p @ Value::Object(_)) => Ok((p, DispatchFlags::KEYED_PARAMS)),
        Some(_) => Err(DispatchError::MalformedParams),
    }
}
