//! # REST + JSON-RPC + WebSocket API
//!
//! Builds the axum router that exposes the token over HTTP. All endpoints
//! share application state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                              | Description                     |
//! |--------|-----------------------------------|---------------------------------|
//! | GET    | `/health`                         | Liveness check                  |
//! | GET    | `/token`                          | Metadata, supply, roles, pause  |
//! | GET    | `/accounts/:address`              | Balance and whitelist status    |
//! | GET    | `/allowances/:owner/:spender`     | Allowance                       |
//! | GET    | `/events?since=N&limit=M`         | Up to M events from sequence N  |
//! | POST   | `/rpc`                            | JSON-RPC 2.0 gateway            |
//! | GET    | `/ws`                             | WebSocket for new events        |
//!
//! Every mutating request takes the write lock on the service for the whole
//! operation, so operations are applied one at a time in lock order.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use jpeth_contracts::amount::{self, Amount};
use jpeth_contracts::{Address, Call, ErrorKind, EventRecord, TokenError, TokenService};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// The hosted token. The lock is the serialization point for mutations.
    pub token: Arc<RwLock<TokenService>>,
    /// Broadcast channel for newly emitted events.
    pub event_tx: broadcast::Sender<EventRecord>,
    /// Reference to Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/token", get(token_handler))
        .route("/accounts/:address", get(account_handler))
        .route("/allowances/:owner/:spender", get(allowance_handler))
        .route("/events", get(events_handler))
        .route("/rpc", post(rpc_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// JSON-RPC Types
// ---------------------------------------------------------------------------

/// The `jsonrpc` field did not say "2.0".
pub const INVALID_REQUEST: i32 = -32600;
/// No such method.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Params missing or malformed.
pub const INVALID_PARAMS: i32 = -32602;
/// [`ErrorKind::Authorization`].
pub const UNAUTHORIZED: i32 = -32010;
/// [`ErrorKind::Validation`].
pub const REJECTED: i32 = -32011;
/// [`ErrorKind::State`].
pub const WRONG_STATE: i32 = -32012;

/// A JSON-RPC 2.0 request envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version. Must be "2.0".
    pub jsonrpc: String,
    /// The method to invoke.
    pub method: String,
    /// Named method parameters.
    pub params: Option<Value>,
    /// Request identifier. Echoed back in the response.
    pub id: Value,
}

/// A JSON-RPC 2.0 response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version. Always "2.0".
    pub jsonrpc: String,
    /// The result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Request identifier, echoed from the request.
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i32,
    /// Short human-readable error description.
    pub message: String,
    /// Optional structured error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn invalid_params(detail: impl std::fmt::Display) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: format!("Invalid params: {detail}"),
            data: None,
        }
    }
}

impl From<TokenError> for JsonRpcError {
    fn from(err: TokenError) -> Self {
        let kind = err.kind();
        let code = match kind {
            ErrorKind::Authorization => UNAUTHORIZED,
            ErrorKind::Validation => REJECTED,
            ErrorKind::State => WRONG_STATE,
        };
        Self {
            code,
            message: err.to_string(),
            data: Some(serde_json::json!({ "kind": kind })),
        }
    }
}

/// Params of `token_balanceOf` and `token_isWhitelisted`.
#[derive(Debug, Deserialize)]
struct AccountParams {
    account: Address,
}

/// Params of `token_allowance`.
#[derive(Debug, Deserialize)]
struct AllowanceParams {
    owner: Address,
    spender: Address,
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /token`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(with = "amount::as_string")]
    pub total_supply: Amount,
    pub owner: Address,
    pub manager: Address,
    pub whitelister: Address,
    pub paused: bool,
    pub holders: usize,
    pub whitelisted: usize,
    /// Sequence number the next event will carry.
    pub next_event_sequence: u64,
    /// ISO-8601 timestamp of the response.
    pub timestamp: String,
}

/// Response payload for `GET /accounts/:address`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub address: Address,
    #[serde(with = "amount::as_string")]
    pub balance: Amount,
    pub whitelisted: bool,
}

/// Response payload for `GET /allowances/:owner/:spender`.
#[derive(Debug, Serialize, Deserialize)]
pub struct AllowanceResponse {
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "amount::as_string")]
    pub allowance: Amount,
}

/// Page size of `GET /events` when `limit` is absent.
pub const DEFAULT_EVENT_PAGE: usize = 100;

/// Largest page `GET /events` will return; larger limits are clamped.
pub const MAX_EVENT_PAGE: usize = 1_000;

/// Query string of `GET /events`.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
    pub limit: Option<usize>,
}

impl EventsQuery {
    fn page_size(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_EVENT_PAGE).min(MAX_EVENT_PAGE)
    }
}

/// Generic error body returned by REST endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn bad_address(raw: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: format!("invalid address: {raw}"),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: returns 200 if the node is alive.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "version": state.version })),
    )
}

/// `GET /token`: metadata and global state.
async fn token_handler(State(state): State<AppState>) -> impl IntoResponse {
    let token = state.token.read().await;
    Json(TokenResponse {
        name: token.name().to_string(),
        symbol: token.symbol().to_string(),
        decimals: token.decimals(),
        total_supply: token.total_supply(),
        owner: token.owner(),
        manager: token.get_manager(),
        whitelister: token.get_whitelister(),
        paused: token.is_paused(),
        holders: token.holder_count(),
        whitelisted: token.whitelist().len(),
        next_event_sequence: token.next_event_sequence(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `GET /accounts/:address`: balance and whitelist status.
///
/// Unknown accounts report a zero balance.
async fn account_handler(
    Path(raw): Path<String>,
    State(state): State<AppState>,
) -> axum::response::Response {
    let Ok(address) = raw.parse::<Address>() else {
        return bad_address(&raw);
    };
    let token = state.token.read().await;
    Json(AccountResponse {
        address,
        balance: token.balance_of(&address),
        whitelisted: token.is_whitelisted(&address),
    })
    .into_response()
}

/// `GET /allowances/:owner/:spender`
async fn allowance_handler(
    Path((raw_owner, raw_spender)): Path<(String, String)>,
    State(state): State<AppState>,
) -> axum::response::Response {
    let Ok(owner) = raw_owner.parse::<Address>() else {
        return bad_address(&raw_owner);
    };
    let Ok(spender) = raw_spender.parse::<Address>() else {
        return bad_address(&raw_spender);
    };
    let token = state.token.read().await;
    Json(AllowanceResponse {
        owner,
        spender,
        allowance: token.allowance(&owner, &spender),
    })
    .into_response()
}

/// `GET /events?since=N&limit=M`: one page of the event log from sequence
/// `N` on. Clients page forward by passing the last sequence seen plus one.
async fn events_handler(
    Query(query): Query<EventsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let token = state.token.read().await;
    Json(token.events_page(query.since, query.page_size()).to_vec())
}

/// `POST /rpc`: JSON-RPC 2.0 gateway.
///
/// View methods take the read lock; mutating methods take the write lock
/// and require a `caller` param. Unknown methods return -32601.
async fn rpc_handler(
    State(state): State<AppState>,
    Json(req): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    state.metrics.rpc_requests_total.inc();

    if req.jsonrpc != "2.0" {
        return Json(JsonRpcResponse {
            jsonrpc: "2.0".into(),
            result: None,
            error: Some(JsonRpcError {
                code: INVALID_REQUEST,
                message: "Invalid Request: jsonrpc must be \"2.0\"".into(),
                data: None,
            }),
            id: req.id,
        });
    }

    let outcome = match mutating_op(&req.method) {
        Some(op) => match parse_call(op, req.params) {
            Ok((caller, call)) => apply_call(&state, caller, call).await,
            Err(e) => Err(e),
        },
        None => query(&state, &req.method, req.params).await,
    };

    let (result, error) = match outcome {
        Ok(value) => (Some(value), None),
        Err(e) => (None, Some(e)),
    };
    Json(JsonRpcResponse {
        jsonrpc: "2.0".into(),
        result,
        error,
        id: req.id,
    })
}

/// Maps a mutating RPC method to the `op` tag of its [`Call`].
fn mutating_op(method: &str) -> Option<&'static str> {
    let op = match method {
        "token_updateManager" => "update_manager",
        "token_transferOwnership" => "transfer_ownership",
        "token_unpause" => "unpause",
        "token_pause" => "pause",
        "token_addWhitelist" => "add_whitelist",
        "token_mint" => "mint",
        "token_burn" => "burn",
        "token_managerRedeem" => "manager_redeem",
        "token_transfer" => "transfer",
        "token_transferFrom" => "transfer_from",
        "token_approve" => "approve",
        "token_increaseAllowance" => "increase_allowance",
        "token_decreaseAllowance" => "decrease_allowance",
        _ => return None,
    };
    Some(op)
}

/// Splits `{"caller": ..., <call fields>}` into the caller and a [`Call`].
fn parse_call(op: &'static str, params: Option<Value>) -> Result<(Address, Call), JsonRpcError> {
    let mut fields = match params {
        Some(Value::Object(fields)) => fields,
        _ => return Err(JsonRpcError::invalid_params("expected a named params object")),
    };
    let caller = fields
        .remove("caller")
        .ok_or_else(|| JsonRpcError::invalid_params("missing caller"))?;
    let caller: Address = serde_json::from_value(caller).map_err(JsonRpcError::invalid_params)?;

    fields.insert("op".into(), Value::String(op.into()));
    let call: Call =
        serde_json::from_value(Value::Object(fields)).map_err(JsonRpcError::invalid_params)?;
    Ok((caller, call))
}

/// Applies one call under the write lock, records metrics and publishes
/// the events it emitted.
async fn apply_call(
    state: &AppState,
    caller: Address,
    call: Call,
) -> Result<Value, JsonRpcError> {
    let operation = call.name();
    let mut token = state.token.write().await;
    let first_new = token.next_event_sequence();

    let started = Instant::now();
    let result = token.execute(caller, call);
    state
        .metrics
        .record_operation(operation, &result, started.elapsed());

    result?;
    state.metrics.observe_ledger(&token);

    let emitted = token.events_since(first_new).to_vec();
    drop(token);

    for record in &emitted {
        // No subscribers is fine.
        let _ = state.event_tx.send(record.clone());
    }
    tracing::info!(operation, %caller, events = emitted.len(), "operation committed");

    Ok(serde_json::json!({ "committed": true, "events": emitted }))
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, JsonRpcError> {
    let params = params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?;
    serde_json::from_value(params).map_err(JsonRpcError::invalid_params)
}

/// Read-only methods.
async fn query(
    state: &AppState,
    method: &str,
    params: Option<Value>,
) -> Result<Value, JsonRpcError> {
    let token = state.token.read().await;
    let value = match method {
        "token_name" => Value::from(token.name()),
        "token_symbol" => Value::from(token.symbol()),
        "token_decimals" => Value::from(token.decimals()),
        "token_totalSupply" => Value::from(token.total_supply().to_string()),
        "token_getManager" => Value::from(token.get_manager().to_hex()),
        "token_getWhitelister" => Value::from(token.get_whitelister().to_hex()),
        "token_owner" => Value::from(token.owner().to_hex()),
        "token_paused" => Value::from(token.is_paused()),
        "token_balanceOf" => {
            let p: AccountParams = parse_params(params)?;
            Value::from(token.balance_of(&p.account).to_string())
        }
        "token_isWhitelisted" => {
            let p: AccountParams = parse_params(params)?;
            Value::from(token.is_whitelisted(&p.account))
        }
        "token_allowance" => {
            let p: AllowanceParams = parse_params(params)?;
            Value::from(token.allowance(&p.owner, &p.spender).to_string())
        }
        _ => {
            return Err(JsonRpcError {
                code: METHOD_NOT_FOUND,
                message: format!("Method not found: {method}"),
                data: None,
            })
        }
    };
    Ok(value)
}

/// `GET /ws`: WebSocket upgrade for live event streaming.
///
/// Clients receive each newly emitted [`EventRecord`] as a JSON text frame.
/// The connection is push-only; client messages are ignored.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state))
}

/// Drives a single WebSocket connection, forwarding broadcast events
/// until the client disconnects or the channel is closed.
async fn handle_ws_connection(mut socket: WebSocket, state: AppState) {
    let mut rx = state.event_tx.subscribe();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(record) => {
                        let payload = match serde_json::to_string(&record) {
                            Ok(s) => s,
                            Err(e) => {
                                tracing::warn!("failed to serialize ws event: {}", e);
                                continue;
                            }
                        };
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        // Missed records are still available from /events.
                        tracing::warn!("ws subscriber lagged by {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(_)) => {}
                    _ => break,
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use jpeth_contracts::{TokenConfig, TokenEvent};
    use tower::ServiceExt;

    const OWNER: Address = Address::from_bytes([0x0a; 20]);
    const MANAGER: Address = Address::from_bytes([0x0b; 20]);
    const ALICE: Address = Address::from_bytes([0xa1; 20]);
    const BOB: Address = Address::from_bytes([0xb0; 20]);

    /// Creates a test AppState around a freshly deployed token.
    fn test_app_state() -> AppState {
        let token = TokenService::new(TokenConfig::template(MANAGER, OWNER)).expect("deploy");
        let (event_tx, _) = broadcast::channel(16);
        let metrics = Arc::new(crate::metrics::TokenMetrics::new().expect("metrics"));

        AppState {
            version: "0.1.0-test".into(),
            token: Arc::new(RwLock::new(token)),
            event_tx,
            metrics,
        }
    }

    /// Sends a GET request and returns the (status, body_bytes).
    async fn get(router: &Router, path: &str) -> (StatusCode, Vec<u8>) {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, body)
    }

    /// Sends a POST request with JSON body and returns (status, body_bytes).
    async fn post_json(router: &Router, path: &str, body: Value) -> (StatusCode, Vec<u8>) {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec();
        (status, body)
    }

    /// Issues one JSON-RPC call and decodes the envelope.
    async fn rpc(router: &Router, method: &str, params: Value) -> JsonRpcResponse {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        let (status, body) = post_json(router, "/rpc", body).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_slice(&body).unwrap()
    }

    fn error_code(resp: &JsonRpcResponse) -> i32 {
        resp.error.as_ref().expect("an error").code
    }

    // -- REST ----------------------------------------------------------------

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], "0.1.0-test");
    }

    #[tokio::test]
    async fn token_endpoint_reports_deployment() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, "/token").await;

        assert_eq!(status, StatusCode::OK);
        let token: TokenResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(token.name, "JpEthStakingFundSp");
        assert_eq!(token.symbol, "JPETH");
        assert_eq!(token.decimals, 6);
        assert_eq!(token.total_supply, 0);
        assert_eq!(token.owner, OWNER);
        assert_eq!(token.manager, MANAGER);
        assert_eq!(token.whitelister, MANAGER);
        assert!(token.paused);
    }

    #[tokio::test]
    async fn account_endpoint_defaults_to_zero() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, &format!("/accounts/{ALICE}")).await;

        assert_eq!(status, StatusCode::OK);
        let account: AccountResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(account.address, ALICE);
        assert_eq!(account.balance, 0);
        assert!(!account.whitelisted);
    }

    #[tokio::test]
    async fn account_endpoint_rejects_bad_address() {
        let router = create_router(test_app_state());
        let (status, body) = get(&router, "/accounts/0xnothex").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(err.error.contains("invalid address"));
    }

    #[tokio::test]
    async fn allowance_endpoint_reflects_approve() {
        let state = test_app_state();
        state.token.write().await.approve(ALICE, BOB, 75).unwrap();
        let router = create_router(state);

        let (status, body) = get(&router, &format!("/allowances/{ALICE}/{BOB}")).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["allowance"], "75");
    }

    #[tokio::test]
    async fn events_endpoint_filters_by_sequence() {
        let state = test_app_state();
        {
            let mut token = state.token.write().await;
            token.mint(MANAGER, ALICE, 10).unwrap();
            token.mint(MANAGER, BOB, 20).unwrap();
            token.unpause(MANAGER).unwrap();
        }
        let router = create_router(state);

        let (_, body) = get(&router, "/events").await;
        let all: Vec<EventRecord> = serde_json::from_slice(&body).unwrap();
        assert_eq!(all.len(), 3);

        let (_, body) = get(&router, "/events?since=1").await;
        let tail: Vec<EventRecord> = serde_json::from_slice(&body).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 1);
        assert_eq!(tail[1].event, TokenEvent::Unpaused { account: MANAGER });
    }

    #[tokio::test]
    async fn events_endpoint_pages_with_a_cap() {
        let state = test_app_state();
        {
            let mut token = state.token.write().await;
            for i in 0..(MAX_EVENT_PAGE as u128 + 5) {
                token.mint(MANAGER, ALICE, i + 1).unwrap();
            }
        }
        let router = create_router(state);

        let (_, body) = get(&router, "/events").await;
        let first: Vec<EventRecord> = serde_json::from_slice(&body).unwrap();
        assert_eq!(first.len(), DEFAULT_EVENT_PAGE);
        assert_eq!(first[0].sequence, 0);

        let (_, body) = get(&router, "/events?since=3&limit=2").await;
        let page: Vec<EventRecord> = serde_json::from_slice(&body).unwrap();
        let sequences: Vec<u64> = page.iter().map(|r| r.sequence).collect();
        assert_eq!(sequences, vec![3, 4]);

        let (_, body) = get(&router, "/events?limit=999999").await;
        let capped: Vec<EventRecord> = serde_json::from_slice(&body).unwrap();
        assert_eq!(capped.len(), MAX_EVENT_PAGE);

        let (_, body) = get(&router, "/events?since=1000&limit=50").await;
        let tail: Vec<EventRecord> = serde_json::from_slice(&body).unwrap();
        assert_eq!(tail.len(), 5);
    }

    // -- JSON-RPC: views -----------------------------------------------------

    #[tokio::test]
    async fn rpc_views_report_metadata() {
        let router = create_router(test_app_state());

        let resp = rpc(&router, "token_name", Value::Null).await;
        assert_eq!(resp.result.unwrap(), "JpEthStakingFundSp");
        let resp = rpc(&router, "token_decimals", Value::Null).await;
        assert_eq!(resp.result.unwrap(), 6);
        let resp = rpc(&router, "token_paused", Value::Null).await;
        assert_eq!(resp.result.unwrap(), true);
        let resp = rpc(&router, "token_getWhitelister", Value::Null).await;
        assert_eq!(resp.result.unwrap(), MANAGER.to_hex());
    }

    #[tokio::test]
    async fn rpc_unknown_method_returns_error() {
        let router = create_router(test_app_state());
        let resp = rpc(&router, "token_selfDestruct", Value::Null).await;
        assert_eq!(error_code(&resp), METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn rpc_invalid_version_returns_error() {
        let router = create_router(test_app_state());
        let rpc_body = serde_json::json!({
            "jsonrpc": "1.0",
            "method": "token_name",
            "id": 20
        });
        let (_, body) = post_json(&router, "/rpc", rpc_body).await;
        let resp: JsonRpcResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error_code(&resp), INVALID_REQUEST);
        assert_eq!(resp.id, 20);
    }

    #[tokio::test]
    async fn rpc_balance_of_requires_account() {
        let router = create_router(test_app_state());
        let resp = rpc(&router, "token_balanceOf", serde_json::json!({})).await;
        assert_eq!(error_code(&resp), INVALID_PARAMS);
    }

    // -- JSON-RPC: mutations -------------------------------------------------

    #[tokio::test]
    async fn rpc_mint_then_balance_of() {
        let state = test_app_state();
        let router = create_router(state.clone());

        let resp = rpc(
            &router,
            "token_mint",
            serde_json::json!({ "caller": MANAGER, "to": ALICE, "amount": "500000000000" }),
        )
        .await;
        assert!(resp.error.is_none(), "{:?}", resp.error);
        let result = resp.result.unwrap();
        assert_eq!(result["committed"], true);
        assert_eq!(result["events"][0]["event"]["type"], "transfer");

        let resp = rpc(&router, "token_balanceOf", serde_json::json!({ "account": ALICE })).await;
        assert_eq!(resp.result.unwrap(), "500000000000");

        let resp = rpc(&router, "token_totalSupply", Value::Null).await;
        assert_eq!(resp.result.unwrap(), "500000000000");
        assert_eq!(state.metrics.total_supply.get(), 500_000_000_000);
        assert_eq!(
            state.metrics.operations_total.with_label_values(&["mint"]).get(),
            1
        );
    }

    #[tokio::test]
    async fn rpc_mutation_requires_caller() {
        let router = create_router(test_app_state());
        let resp = rpc(
            &router,
            "token_mint",
            serde_json::json!({ "to": ALICE, "amount": "1" }),
        )
        .await;
        assert_eq!(error_code(&resp), INVALID_PARAMS);
    }

    #[tokio::test]
    async fn rpc_mint_by_stranger_is_unauthorized() {
        let state = test_app_state();
        let router = create_router(state.clone());
        let resp = rpc(
            &router,
            "token_mint",
            serde_json::json!({ "caller": ALICE, "to": ALICE, "amount": "1" }),
        )
        .await;
        let err = resp.error.unwrap();
        assert_eq!(err.code, UNAUTHORIZED);
        assert_eq!(err.data.unwrap()["kind"], "authorization");
        assert_eq!(state.token.read().await.total_supply(), 0);
        assert_eq!(
            state
                .metrics
                .rejections_total
                .with_label_values(&["authorization"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn rpc_transfer_walks_the_gates() {
        let router = create_router(test_app_state());
        let mint = serde_json::json!({ "caller": MANAGER, "to": ALICE, "amount": "100" });
        assert!(rpc(&router, "token_mint", mint).await.error.is_none());

        let transfer = serde_json::json!({ "caller": ALICE, "to": BOB, "amount": "100" });
        let resp = rpc(&router, "token_transfer", transfer.clone()).await;
        assert_eq!(error_code(&resp), WRONG_STATE);

        let unpause = serde_json::json!({ "caller": MANAGER });
        assert!(rpc(&router, "token_unpause", unpause).await.error.is_none());
        let resp = rpc(&router, "token_transfer", transfer.clone()).await;
        assert_eq!(error_code(&resp), REJECTED);

        for account in [ALICE, BOB] {
            let add = serde_json::json!({ "caller": MANAGER, "account": account });
            assert!(rpc(&router, "token_addWhitelist", add).await.error.is_none());
        }
        let resp = rpc(&router, "token_transfer", transfer).await;
        assert!(resp.error.is_none(), "{:?}", resp.error);

        let (_, body) = get(&router, &format!("/accounts/{BOB}")).await;
        let account: AccountResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(account.balance, 100);
        assert!(account.whitelisted);
    }

    #[tokio::test]
    async fn rpc_update_manager_is_owner_only() {
        let router = create_router(test_app_state());
        let params = serde_json::json!({ "caller": MANAGER, "new_manager": BOB });
        let resp = rpc(&router, "token_updateManager", params).await;
        assert_eq!(error_code(&resp), UNAUTHORIZED);

        let params = serde_json::json!({ "caller": OWNER, "new_manager": BOB });
        assert!(rpc(&router, "token_updateManager", params).await.error.is_none());
        let resp = rpc(&router, "token_getManager", Value::Null).await;
        assert_eq!(resp.result.unwrap(), BOB.to_hex());
    }

    #[tokio::test]
    async fn committed_events_are_broadcast() {
        let state = test_app_state();
        let mut rx = state.event_tx.subscribe();
        let router = create_router(state);

        let params = serde_json::json!({ "caller": MANAGER, "from": ALICE, "amount": "0" });
        assert!(rpc(&router, "token_managerRedeem", params).await.error.is_none());

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert!(matches!(first.event, TokenEvent::Transfer { .. }));
        assert_eq!(
            second.event,
            TokenEvent::ManagerRedeem {
                from: ALICE,
                manager: MANAGER,
                value: 0
            }
        );
    }

    #[tokio::test]
    async fn rejected_calls_broadcast_nothing() {
        let state = test_app_state();
        let mut rx = state.event_tx.subscribe();
        let router = create_router(state);

        let params = serde_json::json!({ "caller": MANAGER });
        let resp = rpc(&router, "token_pause", params).await;
        assert_eq!(error_code(&resp), WRONG_STATE);
        assert!(rx.try_recv().is_err());
    }
}
