use jsonrpc_server::{
    types::{ERR_CODE_INVALID_REQ, ERR_CODE_NO_METHOD},
    verify_response, DispatchFlags, Ed25519Signer, FnHandler, HandlerError, HandlerResult,
    JsonRpcResponse, Server,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn version(_: &(), flags: DispatchFlags, _params: Value) -> HandlerResult {
    if flags.is_notification() {
        return Ok(None);
    }
    Ok(Some(json!("idk")))
}

fn hello(_: &(), flags: DispatchFlags, _params: Value) -> HandlerResult {
    if flags.is_notification() {
        return Ok(None);
    }
    Ok(Some(json!("world!")))
}

fn do_crc32(_: &(), flags: DispatchFlags, params: Value) -> HandlerResult {
    if flags.is_notification() {
        return Ok(None);
    }
    let text = if flags.contains(DispatchFlags::ARRAY_PARAMS) {
        params.get(0)
    } else if flags.contains(DispatchFlags::KEYED_PARAMS) {
        params.get("text")
    } else {
        None
    };
    let text = text.and_then(Value::as_str).ok_or(HandlerError::InvalidRequest)?;
    Ok(Some(json!(format!("{:#x}", crc32fast::hash(text.as_bytes())))))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_test_writer()
        .try_init();
}

fn test_server() -> Server {
    init_tracing();
    Server::builder()
        .method("version", FnHandler::new(version))
        .method("hello", FnHandler::new(hello))
        .method("do_crc32", FnHandler::new(do_crc32))
        .build()
}

fn call(srv: &Server, body: &str) -> Option<Value> {
    srv.handle_str(body)
        .unwrap()
        .map(|out| serde_json::from_str(&out).unwrap())
}

#[test]
fn test_hello_round_trip() {
    let out = test_server()
        .handle_str(r#"{"jsonrpc":"2.0","id":1,"method":"hello"}"#)
        .unwrap();
    assert_eq!(out.as_deref(), Some(r#"{"jsonrpc":"2.0","id":1,"result":"world!"}"#));
}

#[test]
fn test_crc32_positional_and_keyed() {
    let srv = test_server();
    let out = call(&srv, r#"{"jsonrpc":"2.0","id":0,"method":"do_crc32","params":["hi"]}"#).unwrap();
    assert_eq!(out["result"], json!("0xd8932aac"));
    assert_eq!(out["id"], json!(0));

    let out = call(
        &srv,
        r#"{"jsonrpc":"2.0","id":0.0,"method":"do_crc32","params":{"text":"hello world jsonrpc"}}"#,
    )
    .unwrap();
    assert_eq!(out["result"], json!("0xde6fb502"));
}

#[test]
fn test_crc32_without_text_is_invalid_request() {
    let srv = test_server();
    let out = call(&srv, r#"{"jsonrpc":"2.0","id":4,"method":"do_crc32"}"#).unwrap();
    assert_eq!(out["error"]["code"], json!(ERR_CODE_INVALID_REQ));
    assert_eq!(out["id"], json!(4));
}

#[test]
fn test_id_type_fidelity() {
    let srv = test_server();
    let cases = [
        (r#""abc""#, r#""abc""#),
        ("7", "7"),
        ("3.0", "3.0"),
        ("2.5", "2.5"),
        ("null", "null"),
    ];
    for (id, echoed) in cases {
        let body = format!(r#"{{"jsonrpc":"2.0","id":{id},"method":"version"}}"#);
        let out = srv.handle_str(&body).unwrap().unwrap();
        assert_eq!(out, format!(r#"{{"jsonrpc":"2.0","id":{echoed},"result":"idk"}}"#));
    }
}

#[test]
fn test_bad_version_always_null_id() {
    let srv = test_server();
    for body in [
        r#"{"jsonrpc":"1.0","id":1,"method":"hello"}"#,
        r#"{"jsonrpc":2,"id":1,"method":"hello"}"#,
        r#"{"id":1,"method":"hello"}"#,
    ] {
        let out = call(&srv, body).unwrap();
        assert_eq!(out["error"]["code"], json!(ERR_CODE_INVALID_REQ));
        assert_eq!(out["id"], Value::Null);
    }
}

#[test]
fn test_unknown_method() {
    let out = call(&test_server(), r#"{"jsonrpc":"2.0","id":"x-1","method":"HELLO"}"#).unwrap();
    assert_eq!(out["error"]["code"], json!(ERR_CODE_NO_METHOD));
    assert_eq!(out["error"]["message"], json!("Method not found"));
    assert_eq!(out["id"], json!("x-1"));
}

#[test]
fn test_notifications_never_answered() {
    let srv = test_server();
    assert!(call(&srv, r#"{"jsonrpc":"2.0","method":"hello"}"#).is_none());
    assert!(call(&srv, r#"{"jsonrpc":"2.0","method":"do_crc32","params":["hi"]}"#).is_none());
    assert!(call(&srv, r#"{"jsonrpc":"2.0","method":"nope"}"#).is_none());
    assert!(call(&srv, r#"{"jsonrpc":"2.0","method":"do_crc32"}"#).is_none());
    assert_eq!(
        srv.handle_str(r#"[{"jsonrpc":"2.0","method":"hello"}]"#).unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn test_empty_array_is_invalid_request() {
    let out = call(&test_server(), "[]").unwrap();
    assert!(out.is_object());
    assert_eq!(out["error"]["code"], json!(ERR_CODE_INVALID_REQ));
    assert_eq!(out["id"], Value::Null);
}

#[test]
fn test_batch_keeps_order_of_answered_requests() {
    let body = r#"[
        {"jsonrpc":"2.0","id":1,"method":"hello"},
        {"jsonrpc":"2.0","method":"version"},
        {"jsonrpc":"2.0","id":"two","method":"version"},
        {"jsonrpc":"2.0","method":"do_crc32","params":["hi"]},
        {"jsonrpc":"2.0","id":3.5,"method":"do_crc32","params":["hi"]}
    ]"#;
    let out = call(&test_server(), body).unwrap();
    let entries = out.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["id"], json!(1));
    assert_eq!(entries[1]["id"], json!("two"));
    assert_eq!(entries[2]["id"], json!(3.5));
    assert_eq!(entries[2]["result"], json!("0xd8932aac"));
}

#[test]
fn test_parse_error() {
    let out = call(&test_server(), "{not json").unwrap();
    assert_eq!(out["error"]["code"], json!(-32700));
    assert_eq!(out["id"], Value::Null);
}

#[test]
fn test_signed_responses_verify() {
    init_tracing();
    let signer = Ed25519Signer::from_seed(&[42; 32]);
    let key = signer.verifying_key();
    let srv = Server::builder()
        .method("do_crc32", FnHandler::new(do_crc32))
        .response_hook(signer)
        .build();

    let out = srv
        .handle_str(r#"[{"jsonrpc":"2.0","id":0,"method":"do_crc32","params":["hi"]},{"jsonrpc":"2.0","id":1,"method":"nope"}]"#)
        .unwrap()
        .unwrap();
    let responses: Vec<JsonRpcResponse> = serde_json::from_str(&out).unwrap();
    assert_eq!(responses.len(), 1);
    verify_response(&key, "do_crc32", &responses[0]).unwrap();
}
