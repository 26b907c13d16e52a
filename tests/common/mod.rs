//! In-process mock of the FxMarket backend for integration tests.
//!
//! Access tokens are `access-<n>`; the server accepts exactly one at a time.
//! [`Backend::expire_access`] rotates it so the client's token is rejected
//! with `401` on its next request, the way a real expiry would.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use fxmarket_sdk::auth::store::{StoredTokens, TokenStore};
use fxmarket_sdk::error::SdkError;
use fxmarket_sdk::prelude::FxMarketClient;

pub const PASSWORD: &str = "secret";
pub const REFRESH_TOKEN: &str = "refresh-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    Accept,
    Reject,
    Hang,
}

pub struct Backend {
    valid_access: Mutex<String>,
    generation: AtomicUsize,
    current_user: Mutex<Value>,
    refresh_mode: Mutex<RefreshMode>,
    refresh_delay: Mutex<Duration>,
    reject_everything: AtomicBool,
    fail_next_reads: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub requests: Mutex<Vec<(String, String)>>,
    pub bodies: Mutex<Vec<Value>>,
    pub queries: Mutex<Vec<String>>,
}

impl Backend {
    fn new() -> Self {
        Self {
            valid_access: Mutex::new("access-1".into()),
            generation: AtomicUsize::new(1),
            current_user: Mutex::new(profile_for("anna")),
            refresh_mode: Mutex::new(RefreshMode::Accept),
            refresh_delay: Mutex::new(Duration::ZERO),
            reject_everything: AtomicBool::new(false),
            fail_next_reads: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            bodies: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Invalidate the current access token without telling the client.
    pub fn expire_access(&self) {
        let n = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.valid_access.lock().unwrap() = format!("access-{n}");
    }

    pub fn set_refresh_mode(&self, mode: RefreshMode) {
        *self.refresh_mode.lock().unwrap() = mode;
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock().unwrap() = delay;
    }

    /// Reject every bearer token, even freshly refreshed ones.
    pub fn reject_everything(&self) {
        self.reject_everything.store(true, Ordering::SeqCst);
    }

    /// Answer the next `n` order listings with `503`.
    pub fn fail_next_reads(&self, n: usize) {
        self.fail_next_reads.store(n, Ordering::SeqCst);
    }

    pub fn last_body(&self) -> Value {
        self.bodies.lock().unwrap().last().cloned().unwrap_or(Value::Null)
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Number of requests seen for `method path`.
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p)| m == method && p == path)
            .count()
    }

    fn take_failure(&self) -> bool {
        self.fail_next_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn record(&self, method: &str, path: &str) {
        self.requests
            .lock()
            .unwrap()
            .push((method.to_string(), path.to_string()));
    }

    fn authorized(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        if self.reject_everything.load(Ordering::SeqCst) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some(got) if got == expected => Ok(()),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

fn profile_for(username: &str) -> Value {
    match username {
        "admin" => json!({"userId": 1, "username": "admin", "role": "admin", "verified": true}),
        "petr" => json!({"userId": 3, "username": "petr", "role": "seller", "verified": true}),
        "olga" => json!({"userId": 5, "username": "olga", "role": "seller", "verified": true}),
        "boris" => json!({"userId": 6, "username": "boris", "role": "buyer", "verified": false}),
        _ => json!({"userId": 4, "username": username, "role": "buyer", "verified": true}),
    }
}

fn sample_orders() -> Value {
    json!({
        "data": [
            {
                "id": 12, "currencyPair": "USD/RUB", "operationType": "sell",
                "price": "60.00", "amount": "100.00", "reservedAmount": "30.00",
                "status": "open", "seller": {"id": 3, "username": "petr"}
            },
            {
                "id": 13, "currencyPair": "RUB/USD", "operationType": "sell",
                "price": 0.0125, "amount": 5000, "status": "open",
                "seller": {"id": 5, "username": "olga"}
            }
        ],
        "total": 2
    })
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn login(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    b.record("POST", "/api/auth/login");
    if body["password"] != PASSWORD {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let username = body["username"].as_str().unwrap_or_default();
    *b.current_user.lock().unwrap() = profile_for(username);
    let access = b.valid_access.lock().unwrap().clone();
    Ok(Json(json!({"accessToken": access, "refreshToken": REFRESH_TOKEN})))
}

async fn register(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> Json<Value> {
    b.record("POST", "/api/auth/register");
    Json(json!({"id": 10, "username": body["username"]}))
}

async fn refresh(State(b): State<Arc<Backend>>, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    b.record("POST", "/api/auth/refresh");
    b.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let delay = *b.refresh_delay.lock().unwrap();
    tokio::time::sleep(delay).await;

    let mode = *b.refresh_mode.lock().unwrap();
    match mode {
        RefreshMode::Reject => return Err(StatusCode::UNAUTHORIZED),
        RefreshMode::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            return Err(StatusCode::GATEWAY_TIMEOUT);
        }
        RefreshMode::Accept => {}
    }
    if body["refreshToken"] != REFRESH_TOKEN {
        return Err(StatusCode::UNAUTHORIZED);
    }
    b.expire_access();
    let access = b.valid_access.lock().unwrap().clone();
    Ok(Json(json!({"accessToken": access})))
}

async fn me(State(b): State<Arc<Backend>>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    b.record("GET", "/api/auth/me");
    b.authorized(&headers)?;
    Ok(Json(b.current_user.lock().unwrap().clone()))
}

async fn list_orders(State(b): State<Arc<Backend>>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    b.record("GET", "/api/orders");
    b.authorized(&headers)?;
    if b.take_failure() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(sample_orders()))
}

async fn create_order(
    State(b): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    b.record("POST", "/api/orders");
    b.authorized(&headers)?;
    b.bodies.lock().unwrap().push(body.clone());
    Ok(Json(json!({"id": 14})))
}

async fn update_order(
    State(b): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    b.record("PATCH", &format!("/api/orders/{id}"));
    b.authorized(&headers)?;
    b.bodies.lock().unwrap().push(body.clone());
    Ok(Json(json!({"id": id})))
}

async fn delete_order(
    State(b): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    b.record("DELETE", &format!("/api/orders/{id}"));
    b.authorized(&headers)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_transaction(
    State(b): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    b.record("POST", "/api/transactions");
    b.authorized(&headers)?;
    b.bodies.lock().unwrap().push(body.clone());
    Ok(Json(json!({"id": 77, "status": "pending"})))
}

async fn list_transactions(State(b): State<Arc<Backend>>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    b.record("GET", "/api/transactions");
    b.authorized(&headers)?;
    Ok(Json(json!({
        "data": [{"id": 77, "amount": 10, "exchangeRate": 60, "status": "pending",
                  "buyer": {"username": "anna"}, "seller": {"username": "petr"}}],
        "total": 1
    })))
}

async fn my_transactions(
    State(b): State<Arc<Backend>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, StatusCode> {
    b.record("GET", "/api/transactions/user");
    b.authorized(&headers)?;
    b.queries.lock().unwrap().push(query.unwrap_or_default());
    Ok(Json(json!({"data": [], "total": 0})))
}

async fn cancel_transaction(
    State(b): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    b.record("PATCH", &format!("/api/transactions/{id}/cancel"));
    b.authorized(&headers)?;
    Ok(Json(json!({"id": id, "status": "cancelled"})))
}

async fn list_users(State(b): State<Arc<Backend>>, headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    b.record("GET", "/api/users");
    b.authorized(&headers)?;
    Ok(Json(json!([
        {"id": 1, "username": "admin", "role": "admin", "verified": true},
        {"id": 4, "username": "anna", "role": "buyer", "verified": false}
    ])))
}

async fn get_user(
    State(b): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    b.record("GET", &format!("/api/users/{id}"));
    b.authorized(&headers)?;
    match id {
        4 => Ok(Json(json!({
            "id": 4, "username": "anna", "phone": "+70000000004",
            "role": "buyer", "verified": false, "passwordHash": "$2b$10$hash"
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn update_user(
    State(b): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    b.record("PUT", &format!("/api/users/{id}"));
    b.authorized(&headers)?;
    b.bodies.lock().unwrap().push(body.clone());
    Ok(Json(json!({"id": id})))
}

async fn delete_user(
    State(b): State<Arc<Backend>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<StatusCode, StatusCode> {
    b.record("DELETE", &format!("/api/users/{id}"));
    b.authorized(&headers)?;
    Ok(StatusCode::NO_CONTENT)
}

fn router(backend: Arc<Backend>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/me", get(me))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/{id}", patch(update_order).delete(delete_order))
        .route("/api/transactions", get(list_transactions).post(create_transaction))
        .route("/api/transactions/user", get(my_transactions))
        .route("/api/transactions/{id}/cancel", patch(cancel_transaction))
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(backend)
}

/// Start the mock on an ephemeral port. Returns its origin and state.
pub async fn spawn_backend() -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    let app = router(backend.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock backend");
    });
    (format!("http://{addr}"), backend)
}

// ── Token store that counts writes ───────────────────────────────────────────

#[derive(Default)]
pub struct CountingStore {
    tokens: Mutex<StoredTokens>,
    pub saves: AtomicUsize,
    pub clears: AtomicUsize,
}

impl CountingStore {
    pub fn snapshot(&self) -> StoredTokens {
        self.tokens.lock().unwrap().clone()
    }

    pub fn preload(&self, tokens: StoredTokens) {
        *self.tokens.lock().unwrap() = tokens;
    }
}

impl TokenStore for CountingStore {
    fn load(&self) -> Result<StoredTokens, SdkError> {
        Ok(self.tokens.lock().unwrap().clone())
    }

    fn save(&self, tokens: &StoredTokens) -> Result<(), SdkError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.tokens.lock().unwrap() = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), SdkError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.tokens.lock().unwrap() = StoredTokens::default();
        Ok(())
    }
}

/// A client pointed at `origin` using `store`.
pub fn client(origin: &str, store: Arc<CountingStore>) -> FxMarketClient {
    FxMarketClient::builder()
        .base_url(origin)
        .refresh_timeout(Duration::from_secs(2))
        .token_store(store)
        .build()
        .expect("client")
}

/// A logged-in client for `username` plus its store.
pub async fn logged_in(origin: &str, username: &str) -> (FxMarketClient, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::default());
    let client = client(origin, store.clone());
    client
        .auth()
        .login(username, PASSWORD)
        .await
        .expect("login");
    (client, store)
}
