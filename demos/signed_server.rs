//! Signed JSON-RPC server example.
//!
//! Run with: `cargo run --example signed_server`
//!
//! Loads the Ed25519 seed from `ed25519.key` (base64), creating it on first
//! run, then answers a fixed set of requests and prints every reply. Each
//! answered response carries a `signature` over method name + response.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jsonrpc_server::{
    DispatchFlags, Ed25519Signer, FnHandler, HandlerError, HandlerResult, Server,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::{json, Value};

const KEY_FILE: &str = "ed25519.key";

fn version(_: &(), flags: DispatchFlags, _params: Value) -> HandlerResult {
    if flags.is_notification() {
        return Ok(None);
    }
    Ok(Some(json!(env!("CARGO_PKG_VERSION"))))
}

fn hello(_: &(), flags: DispatchFlags, _params: Value) -> HandlerResult {
    if flags.is_notification() {
        return Ok(None);
    }
    Ok(Some(json!("world!")))
}

/// CRC-32 of `params[0]` or `params.text`, as `0x`-prefixed lowercase hex.
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
    let text = text
        .and_then(Value::as_str)
        .ok_or(HandlerError::InvalidRequest)?;

    Ok(Some(json!(format!("{:#x}", crc32fast::hash(text.as_bytes())))))
}

fn load_or_create_seed(path: &Path) -> Result<[u8; 32], Box<dyn std::error::Error>> {
    if path.exists() {
        let encoded = std::fs::read_to_string(path)?;
        let raw = BASE64.decode(encoded.trim())?;
        let seed: [u8; 32] = raw
            .try_into()
            .map_err(|_| format!("{} must hold a 32-byte seed", path.display()))?;
        return Ok(seed);
    }

    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    std::fs::write(path, BASE64.encode(seed))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
            tracing::warn!(error = %e, "could not restrict key file permissions");
        }
    }

    tracing::info!(path = %path.display(), "generated new signing key");
    Ok(seed)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let seed = match load_or_create_seed(Path::new(KEY_FILE)) {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!(error = %e, "failed to load signing key");
            std::process::exit(1);
        }
    };
    let signer = Ed25519Signer::from_seed(&seed);
    tracing::info!(
        public_key = %BASE64.encode(signer.verifying_key().to_bytes()),
        "signing responses"
    );

    let server = Server::builder()
        .method("version", FnHandler::new(version))
        .method("hello", FnHandler::new(hello))
        .method("do_crc32", FnHandler::new(do_crc32))
        .response_hook(signer)
        .build();

    if let Err(e) = server.open() {
        tracing::error!(error = %e, "failed to open server");
        std::process::exit(1);
    }

    let requests = [
        r#"{"jsonrpc":"2.0","id":3.0,"method":"version","params":[]}"#,
        r#"{"jsonrpc":"2.0","id":2.0,"method":"version"}"#,
        r#"{"jsonrpc":"2.0","id":1.0,"method":"hello"}"#,
        r#"{"jsonrpc":"2.0","id":0.0,"method":"do_crc32","params":["hi"]}"#,
        r#"[{"jsonrpc":"2.0","id":1.0,"method":"hello"}]"#,
        r#"[{"jsonrpc":"2.0","method":"hello"}]"#,
        r#"[]"#,
        r#"{"jsonrpc":"2.0","id":0.0,"method":"do_crc32","params":["hello world jsonrpc"]}"#,
    ];

    for request in requests {
        match server.handle_str(request) {
            Ok(Some(reply)) => println!("{reply}"),
            Ok(None) => println!("(no response)"),
            Err(e) => tracing::error!(error = %e, "failed to serialize reply"),
        }
    }

    if let Err(e) = server.close() {
        tracing::error!(error = %e, "failed to close server");
    }
}
