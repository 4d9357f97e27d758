//! An in-process HTTP ledger and certificate authority for integration tests.
//!
//! Accepted batches are verified and their payloads written to state the way
//! the ledger's transaction processor does: at the transaction's output
//! address, in a CBOR map keyed by payload hash. Individual endpoints can be
//! forced to answer with a fixed status or body.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ciborium::value::Value;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use air_anchor_core::canonical::encode_cbor_value_canonical;
use air_anchor_core::decode_batch_list;

/// A forced response for one endpoint.
#[derive(Debug, Clone)]
pub struct Override {
    pub status: StatusCode,
    pub body: String,
    /// How many requests the override applies to. `None` means all.
    pub remaining: Option<u32>,
}

impl Override {
    pub fn status(status: u16) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: String::new(),
            remaining: None,
        }
    }

    /// A 200 with a fixed body.
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
            remaining: None,
        }
    }

    /// Apply to the next `n` requests only.
    pub fn times(mut self, n: u32) -> Self {
        self.remaining = Some(n);
        self
    }
}

#[derive(Default)]
struct Ledger {
    /// address -> (payload hash -> stored value)
    state: BTreeMap<String, BTreeMap<String, Value>>,
    submissions: Vec<Vec<u8>>,
    ca_requests: Vec<serde_json::Value>,
    state_reads: u32,
    submit_override: Option<Override>,
    state_override: Option<Override>,
    ca_override: Option<Override>,
}

fn take_override(slot: &mut Option<Override>) -> Option<Response> {
    let current = slot.take()?;
    let response = (current.status, current.body.clone()).into_response();
    match current.remaining {
        Some(0) => return None,
        Some(1) => {}
        Some(n) => {
            *slot = Some(Override {
                remaining: Some(n - 1),
                ..current
            })
        }
        None => *slot = Some(current),
    }
    Some(response)
}

type Shared = Arc<Mutex<Ledger>>;

/// A running mock ledger. The server stops when this is dropped.
pub struct MockLedger {
    addr: SocketAddr,
    ledger: Shared,
    handle: JoinHandle<()>,
}

impl MockLedger {
    /// Bind to an ephemeral local port and start serving.
    pub async fn start() -> std::io::Result<Self> {
        let ledger: Shared = Arc::default();
        let router = Router::new()
            .route("/batches", post(submit_batches))
            .route("/state", get(list_state))
            .route("/state/:address", get(get_state))
            .route("/api/v1/sign", post(sign_request))
            .with_state(Arc::clone(&ledger));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::warn!(error = %e, "mock ledger stopped");
            }
        });

        Ok(Self {
            addr,
            ledger,
            handle,
        })
    }

    /// Base URL with scheme.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `host:port` without a scheme.
    pub fn host_port(&self) -> String {
        self.addr.to_string()
    }

    pub async fn override_submit(&self, o: Override) {
        self.ledger.lock().await.submit_override = Some(o);
    }

    pub async fn override_state(&self, o: Override) {
        self.ledger.lock().await.state_override = Some(o);
    }

    pub async fn override_ca(&self, o: Override) {
        self.ledger.lock().await.ca_override = Some(o);
    }

    /// Raw bodies of every batch submission received, in order.
    pub async fn submissions(&self) -> Vec<Vec<u8>> {
        self.ledger.lock().await.submissions.clone()
    }

    /// Bodies of every signing request the authority received.
    pub async fn ca_requests(&self) -> Vec<serde_json::Value> {
        self.ledger.lock().await.ca_requests.clone()
    }

    /// Number of state reads served, overrides included.
    pub async fn state_reads(&self) -> u32 {
        self.ledger.lock().await.state_reads
    }

    /// Addresses currently holding state.
    pub async fn addresses(&self) -> Vec<String> {
        self.ledger.lock().await.state.keys().cloned().collect()
    }
}

impl Drop for MockLedger {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn submit_batches(State(ledger): State<Shared>, body: Bytes) -> Response {
    let mut ledger = ledger.lock().await;
    ledger.submissions.push(body.to_vec());

    if let Some(forced) = take_override(&mut ledger.submit_override) {
        return forced;
    }

    let batches = match decode_batch_list(&body) {
        Ok(batches) => batches,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    for batch in &batches {
        if let Err(e) = batch.verify() {
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    }

    let mut ids = Vec::new();
    for batch in batches {
        ids.push(batch.id());
        for txn in batch.transactions {
            let Some(address) = txn.address().map(str::to_string) else {
                return (StatusCode::BAD_REQUEST, "transaction has no outputs").into_response();
            };
            let value = ciborium::from_reader::<Value, _>(txn.payload.as_ref())
                .unwrap_or_else(|_| Value::Bytes(txn.payload.to_vec()));
            ledger
                .state
                .entry(address)
                .or_default()
                .insert(txn.header.payload_sha512.clone(), value);
        }
    }

    let link = format!("/batch_statuses?id={}", ids.join(","));
    (StatusCode::ACCEPTED, Json(serde_json::json!({ "link": link }))).into_response()
}

fn encode_entry(entries: &BTreeMap<String, Value>) -> Option<String> {
    let map = Value::Map(
        entries
            .iter()
            .map(|(k, v)| (Value::Text(k.clone()), v.clone()))
            .collect(),
    );
    encode_cbor_value_canonical(&map)
        .ok()
        .map(|bytes| STANDARD.encode(bytes))
}

async fn get_state(State(ledger): State<Shared>, Path(address): Path<String>) -> Response {
    let mut ledger = ledger.lock().await;
    ledger.state_reads += 1;

    if let Some(forced) = take_override(&mut ledger.state_override) {
        return forced;
    }

    match ledger.state.get(&address).and_then(encode_entry) {
        Some(data) => Json(serde_json::json!({ "data": data, "head": "mock" })).into_response(),
        None => (StatusCode::NOT_FOUND, "no such address").into_response(),
    }
}

#[derive(Deserialize)]
struct PrefixQuery {
    address: String,
}

async fn list_state(State(ledger): State<Shared>, Query(query): Query<PrefixQuery>) -> Response {
    let mut ledger = ledger.lock().await;
    ledger.state_reads += 1;

    if let Some(forced) = take_override(&mut ledger.state_override) {
        return forced;
    }

    let data: Vec<_> = ledger
        .state
        .iter()
        .filter(|(address, _)| address.starts_with(&query.address))
        .filter_map(|(address, entries)| {
            encode_entry(entries)
                .map(|data| serde_json::json!({ "address": address, "data": data }))
        })
        .collect();

    Json(serde_json::json!({ "data": data, "head": "mock" })).into_response()
}

async fn sign_request(
    State(ledger): State<Shared>,
    Json(request): Json<serde_json::Value>,
) -> Response {
    let mut ledger = ledger.lock().await;
    ledger.ca_requests.push(request.clone());

    if let Some(forced) = take_override(&mut ledger.ca_override) {
        return forced;
    }

    let signature = request
        .pointer("/signature")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();

    Json(serde_json::json!({
        "issuer": "mock-ca",
        "csr_signature": signature,
    }))
    .into_response()
}
