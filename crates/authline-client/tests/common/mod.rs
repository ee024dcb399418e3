//! A small in-process auth service for integration tests.
//!
//! One account: `alice` / `Secret123`, token `tok-alice`. Every request
//! records its path and `Authorization` header so tests can check what
//! the client actually sent.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use authline_client::{AuthApi, AuthorizedClient, AuthorizedClientBuilder};
use authline_session::UnauthorizedSignal;
use authline_store::MemoryTokenStore;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const TOKEN: &str = "tok-alice";
pub const PASSWORD: &str = "Secret123";
pub const INVITATION: &str = "INVITE-0001";
pub const RESET_TOKEN: &str = "reset-abc";

#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct Backend {
    seen: Mutex<Vec<Seen>>,
    revoked: AtomicBool,
    email: Mutex<Option<String>>,
}

impl Backend {
    fn record(&self, path: &str, headers: &HeaderMap) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push(Seen {
            path: path.to_string(),
            authorization,
        });
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Seen {
        self.seen().last().cloned().expect("no request recorded")
    }

    pub fn hits(&self, path: &str) -> usize {
        self.seen().iter().filter(|s| s.path == path).count()
    }

    /// Makes the server reject `tok-alice` from now on.
    pub fn revoke(&self) {
        self.revoked.store(true, Ordering::SeqCst);
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {TOKEN}");
        !self.revoked.load(Ordering::SeqCst)
            && headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                == Some(expected.as_str())
    }

    fn alice(&self) -> Value {
        json!({
            "id": 1,
            "username": "alice",
            "email": self.email.lock().unwrap().clone(),
            "role": "user",
            "created_at": "2024-01-01T00:00:00",
            "updated_at": "2024-01-01T00:00:00",
        })
    }
}

fn detail(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn token_invalid() -> Response {
    detail(StatusCode::UNAUTHORIZED, "无效的认证令牌")
}

fn str_field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

// =========================================================================
// Handlers
// =========================================================================

async fn login(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("/auth/login", &headers);
    let username = str_field(&body, "username");
    let password = str_field(&body, "password");

    if username.is_empty() {
        let errors = json!({ "detail": [{ "loc": ["body", "username"], "msg": "field required" }] });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response();
    }
    if username == "crash" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    if username != "alice" || password != PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "用户名或密码错误");
    }

    backend.revoked.store(false, Ordering::SeqCst);
    Json(json!({
        "access_token": TOKEN,
        "token_type": "bearer",
        "user": backend.alice(),
    }))
    .into_response()
}

async fn register(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("/auth/register", &headers);
    if str_field(&body, "invitation_code") != INVITATION {
        return detail(StatusCode::BAD_REQUEST, "邀请码无效");
    }
    if str_field(&body, "username") == "alice" {
        return detail(StatusCode::BAD_REQUEST, "用户名已存在");
    }
    let user = json!({
        "id": 2,
        "username": str_field(&body, "username"),
        "email": null,
        "role": "user",
        "created_at": "2024-02-01T00:00:00",
        "updated_at": "2024-02-01T00:00:00",
    });
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn me(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.record("/auth/me", &headers);
    if !headers.contains_key(header::AUTHORIZATION) {
        return detail(StatusCode::UNAUTHORIZED, "未提供认证令牌");
    }
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some("Bearer crash") {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    if !backend.authorized(&headers) {
        return token_invalid();
    }
    Json(backend.alice()).into_response()
}

async fn change_password(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("/auth/password", &headers);
    if !backend.authorized(&headers) {
        return token_invalid();
    }
    if str_field(&body, "old_password") != PASSWORD {
        return detail(StatusCode::BAD_REQUEST, "原密码错误");
    }
    backend.revoke();
    Json(json!({ "message": "密码修改成功，请重新登录" })).into_response()
}

async fn bind_email(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("/auth/email", &headers);
    if !backend.authorized(&headers) {
        return token_invalid();
    }
    let email = str_field(&body, "email");
    if !email.contains('@') {
        return detail(StatusCode::BAD_REQUEST, "邮箱格式不正确");
    }
    *backend.email.lock().unwrap() = Some(email.to_string());
    Json(json!({ "message": "邮箱绑定成功" })).into_response()
}

async fn forgot_password(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("/auth/forgot-password", &headers);
    if str_field(&body, "username") != "alice" {
        return detail(StatusCode::NOT_FOUND, "用户名或邮箱不匹配");
    }
    Json(json!({
        "message": "重置链接已生成",
        "reset_token": RESET_TOKEN,
    }))
    .into_response()
}

async fn reset_password(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record("/auth/reset-password", &headers);
    if str_field(&body, "token") != RESET_TOKEN {
        return detail(StatusCode::BAD_REQUEST, "重置令牌无效或已过期");
    }
    Json(json!({ "message": "密码重置成功" })).into_response()
}

/// Needs a valid token, then refuses anyway: alice isn't an admin.
async fn admin_stats(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.record("/admin/stats", &headers);
    if !backend.authorized(&headers) {
        return token_invalid();
    }
    detail(StatusCode::FORBIDDEN, "权限不足")
}

/// Always 401, whoever asks.
async fn locked(State(backend): State<Arc<Backend>>, headers: HeaderMap) -> Response {
    backend.record("/locked", &headers);
    (StatusCode::UNAUTHORIZED, "go away").into_response()
}

// =========================================================================
// Setup
// =========================================================================

/// Starts the service on an ephemeral port. Returns its base URL.
pub async fn start_backend() -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/me", get(me))
        .route("/auth/password", put(change_password))
        .route("/auth/email", put(bind_email))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/admin/stats", get(admin_stats))
        .route("/locked", get(locked))
        .with_state(Arc::clone(&backend));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    (format!("http://{addr}"), backend)
}

/// An address nothing listens on.
pub fn dead_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn client(
    base_url: &str,
    store: &Arc<MemoryTokenStore>,
    signal: &UnauthorizedSignal,
) -> AuthorizedClient<Arc<MemoryTokenStore>> {
    AuthorizedClientBuilder::new(base_url)
        .timeout(Duration::from_secs(5))
        .build(Arc::clone(store), signal.clone())
        .unwrap()
}

pub fn api(
    base_url: &str,
    store: &Arc<MemoryTokenStore>,
    signal: &UnauthorizedSignal,
) -> AuthApi<Arc<MemoryTokenStore>> {
    AuthApi::new(client(base_url, store, signal))
}

/// Counts publications on `signal`. Keep the subscription alive.
pub fn count_publications(
    signal: &UnauthorizedSignal,
) -> (Arc<std::sync::atomic::AtomicUsize>, authline_session::Subscription) {
    let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let subscription = signal.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (count, subscription)
}
