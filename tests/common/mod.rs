//! Shared utilities for integration testing: a programmable mock JSON-RPC node.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use solana_sdk::hash::Hash;
use solana_sdk::transaction::Transaction;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// How the node answers one request.
pub enum Reply {
    /// `{"result": ...}`
    Result(Value),
    /// `{"error": {"code", "message"}}`
    Error(i64, String),
    /// Bare HTTP status with no JSON-RPC body.
    Status(u16),
    /// Answer after a delay.
    Slow(Duration, Value),
}

type RpcHandler = Arc<dyn Fn(&str, &Value) -> Reply + Send + Sync>;

/// Start a node on an ephemeral port and return its URL.
pub async fn start_rpc_node<F>(handler: F) -> String
where
    F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
{
    let handler: RpcHandler = Arc::new(handler);
    let app = Router::new().route("/", post(handle)).with_state(handler);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}

async fn handle(State(handler): State<RpcHandler>, Json(request): Json<Value>) -> (StatusCode, Json<Value>) {
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let id = request["id"].clone();

    // The client asks for the node version before its first commitment-bearing call.
    let reply = if method == "getVersion" {
        Reply::Result(json!({ "solana-core": "1.18.26", "feature-set": 0 }))
    } else {
        handler(&method, &request["params"])
    };

    match reply {
        Reply::Result(result) => (
            StatusCode::OK,
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })),
        ),
        Reply::Error(code, message) => (
            StatusCode::OK,
            Json(json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })),
        ),
        Reply::Status(status) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(json!({ "message": "unavailable" })),
        ),
        Reply::Slow(delay, result) => {
            tokio::time::sleep(delay).await;
            (
                StatusCode::OK,
                Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })),
            )
        }
    }
}

/// URL of a port nothing listens on.
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Wrap `value` in the RPC `{context, value}` envelope.
pub fn with_context(value: Value) -> Value {
    json!({ "context": { "slot": 1 }, "value": value })
}

/// `getSignatureStatuses` result for one signature.
pub fn signature_status(confirmation_status: Option<&str>, err: Value) -> Value {
    let status = if err.is_null() {
        json!({ "Ok": null })
    } else {
        json!({ "Err": err })
    };
    match confirmation_status {
        Some(level) => with_context(json!([{
            "slot": 100,
            "confirmations": 1,
            "status": status,
            "err": err,
            "confirmationStatus": level,
        }])),
        None => with_context(json!([null])),
    }
}

/// Blockhash served by [`latest_blockhash`].
pub fn node_blockhash() -> Hash {
    Hash::new_from_array([7u8; 32])
}

/// `getLatestBlockhash` result with a fixed blockhash.
pub fn latest_blockhash(last_valid_block_height: u64) -> Value {
    with_context(json!({
        "blockhash": node_blockhash().to_string(),
        "lastValidBlockHeight": last_valid_block_height,
    }))
}

/// Decode the base64 transaction in `params[0]` of a send or simulate call.
pub fn submitted_transaction(params: &Value) -> Transaction {
    let wire = BASE64_STANDARD
        .decode(params[0].as_str().unwrap_or_default())
        .unwrap();
    bincode::deserialize(&wire).unwrap()
}
