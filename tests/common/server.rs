//! Mock AudioNorm backend
//!
//! An axum app serving the endpoints the client talks to, backed by an
//! in-memory state. Every request (except the readiness probe) is recorded
//! so tests can assert on what the client actually sent.

use super::constants::*;
use super::fixtures::{seed_feedback, seed_library};
use axum::body::Bytes;
use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string.
    pub uri: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or_default()
    }
}

#[derive(Default)]
pub struct BackendState {
    pub requests: Vec<RecordedRequest>,
    pub originals: Vec<Value>,
    pub normalized: Vec<Value>,
    /// Full feedback records, replies included.
    pub feedback: Vec<Value>,
    pub uploaded_names: Vec<String>,
    /// Canned responses keyed by (method, path).
    failures: HashMap<(String, String), (StatusCode, Value)>,
    /// Upload of this file name is rejected.
    reject_upload: Option<String>,
    next_id: usize,
}

impl BackendState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-new-{}", prefix, self.next_id)
    }
}

type Shared = Arc<Mutex<BackendState>>;

/// Mock backend instance on a random local port.
///
/// When dropped, the server gracefully shuts down.
pub struct MockBackend {
    /// Base URL for the client (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    state: Shared,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockBackend {
    /// Spawns an empty backend: known user, no files, no feedback.
    pub async fn spawn() -> Self {
        Self::spawn_with(BackendState::default()).await
    }

    /// Spawns a backend seeded with the fixture library and feedback.
    pub async fn spawn_seeded() -> Self {
        let mut state = BackendState::default();
        seed_library(&mut state);
        seed_feedback(&mut state);
        Self::spawn_with(state).await
    }

    async fn spawn_with(state: BackendState) -> Self {
        let state: Shared = Arc::new(Mutex::new(state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = make_app(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock backend failed");
        });

        let backend = Self {
            base_url,
            port,
            state,
            _shutdown_tx: Some(shutdown_tx),
        };
        backend.wait_for_ready().await;
        backend
    }

    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Mock backend did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }
            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await
                }
            }
        }
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Recorded requests with the given method whose path starts with `prefix`.
    pub fn requests_to(&self, method: &str, prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path().starts_with(prefix))
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    /// Makes `method path` answer with `status` and `body` from now on.
    pub fn fail(&self, method: &str, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).expect("Invalid status code");
        self.state()
            .failures
            .insert((method.to_string(), path.to_string()), (status, body));
    }

    pub fn reject_upload_of(&self, file_name: &str) {
        self.state().reject_upload = Some(file_name.to_string());
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.state().uploaded_names.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// ============================================================================
// App
// ============================================================================

fn make_app(state: Shared) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/verify/verify-email", get(verify_email))
        .route("/users/profile", get(profile))
        .route("/audio/upload", post(upload))
        .route("/audio/files/original", get(list_originals))
        .route("/audio/files/normalized", get(list_normalized))
        .route("/audio/files/original/{id}", delete(delete_original))
        .route("/audio/files/normalized/{id}", delete(delete_normalized))
        .route("/audio/normalize-uploaded/{id}/{target}", post(normalize))
        .route("/audio/export/{id}", get(export_file))
        .route("/audio/export-all", get(export_all))
        .route("/audio/status", get(status))
        .route("/audio/history", get(history))
        .route("/audio/dependencies", get(dependencies))
        .route("/audio/stream/{id}", get(stream_normalized))
        .route("/audio/stream-upload/{id}", get(stream_original))
        .route("/feedback/", get(list_feedback))
        .route("/feedback/submit", post(submit_feedback))
        .route("/feedback/respond", post(respond))
        .route("/feedback/user/my-feedback", get(my_feedback))
        .route("/feedback/{id}", get(feedback_detail))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

/// Records the request, then serves a canned failure if one is configured.
async fn record(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let recorded = {
        let header_str = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            method: request.method().to_string(),
            uri: request.uri().to_string(),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
        }
    };
    let key = (recorded.method.clone(), recorded.path().to_string());

    let canned = {
        let mut state = state.lock().unwrap();
        state.requests.push(recorded);
        state.failures.get(&key).cloned()
    };
    match canned {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => next.run(request).await,
    }
}

fn error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn test_user() -> Value {
    json!({
        "username": TEST_USER,
        "email": TEST_EMAIL,
        "auth_provider": "local",
        "created_at": "2025-06-01T09:00:00"
    })
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TEST_TOKEN))
}

fn unauthorized() -> Response {
    error(StatusCode::UNAUTHORIZED, "Could not validate credentials")
}

fn id_of(value: &Value) -> &str {
    value["_id"].as_str().or(value["id"].as_str()).unwrap_or_default()
}

// ============================================================================
// Auth
// ============================================================================

async fn register(Json(body): Json<Value>) -> Response {
    if body["username"] == TEST_USER {
        return error(StatusCode::BAD_REQUEST, "Username already registered");
    }
    Json(json!({
        "username": body["username"],
        "email": body["email"],
        "auth_provider": "local"
    }))
    .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == TEST_USER && body["password"] == TEST_PASS {
        Json(json!({
            "access_token": TEST_TOKEN,
            "token_type": "bearer",
            "user": test_user()
        }))
        .into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Incorrect username or password")
    }
}

async fn forgot_password(Json(_body): Json<Value>) -> Response {
    Json(json!({ "message": "Password reset email sent" })).into_response()
}

async fn reset_password(Json(body): Json<Value>) -> Response {
    if body["token"] == RESET_TOKEN {
        Json(json!({ "message": "Password has been reset" })).into_response()
    } else {
        error(StatusCode::BAD_REQUEST, "Invalid or expired reset token")
    }
}

async fn verify_email(Query(query): Query<HashMap<String, String>>) -> Response {
    match query.get("token").map(String::as_str) {
        Some(VERIFY_TOKEN) => Json(json!({ "message": "Email verified successfully" })).into_response(),
        _ => error(StatusCode::BAD_REQUEST, "Invalid or expired verification token"),
    }
}

async fn profile(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    Json(test_user()).into_response()
}

// ============================================================================
// Audio
// ============================================================================

async fn upload(State(state): State<Shared>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let mut received = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("unnamed").to_string();
            let bytes = field.bytes().await.unwrap_or_default();
            received = Some((name, bytes.len()));
        }
    }
    let Some((name, size)) = received else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "No file part");
    };

    let mut state = state.lock().unwrap();
    state.uploaded_names.push(name.clone());
    if state.reject_upload.as_deref() == Some(name.as_str()) {
        return error(StatusCode::BAD_REQUEST, "Unsupported audio format");
    }
    let id = state.next_id("orig");
    state.originals.push(json!({
        "_id": id,
        "original_filename": name,
        "file_size": size,
        "duration": 12.5,
        "created_at": "2025-06-08T10:30:00"
    }));
    Json(json!({
        "file_id": id,
        "filename": name,
        "message": "File uploaded successfully"
    }))
    .into_response()
}

async fn list_originals(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().unwrap();
    Json(json!({ "original_files": state.originals })).into_response()
}

async fn list_normalized(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().unwrap();
    Json(json!({ "normalized_files": state.normalized })).into_response()
}

async fn delete_original(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    let before = state.originals.len();
    state.originals.retain(|f| id_of(f) != id);
    if state.originals.len() == before {
        return error(StatusCode::NOT_FOUND, "File not found");
    }
    Json(json!({ "message": "File deleted" })).into_response()
}

async fn delete_normalized(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    let before = state.normalized.len();
    state.normalized.retain(|f| id_of(f) != id);
    if state.normalized.len() == before {
        return error(StatusCode::NOT_FOUND, "File not found");
    }
    Json(json!({ "message": "File deleted" })).into_response()
}

async fn normalize(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((id, target)): Path<(String, f64)>,
) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    let Some(original) = state.originals.iter().find(|f| id_of(f) == id).cloned() else {
        return error(StatusCode::NOT_FOUND, "File not found");
    };
    let original_name = original["original_filename"]
        .as_str()
        .unwrap_or("audio.wav")
        .to_string();
    let normalized_id = state.next_id("norm");
    state.normalized.push(json!({
        "_id": normalized_id,
        "normalized_filename": format!("normalized_{}", original_name),
        "original_filename": original_name,
        "original_file_id": id,
        "target_lufs": target,
        "final_lufs": target - 0.1,
        "normalization_method": "ffmpeg_loudnorm",
        "created_at": "2025-06-08T10:31:00",
        "gridfs_id": "64f1c2d3e4f5a6b7c8d9e0f1"
    }));
    Json(json!({
        "message": "Normalization completed",
        "normalized_file_id": normalized_id,
        "target_lufs": target
    }))
    .into_response()
}

fn audio_body(bytes: &'static [u8], content_type: &'static str) -> Response {
    ([(header::CONTENT_TYPE, content_type)], Bytes::from_static(bytes)).into_response()
}

async fn export_file(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().unwrap();
    if !state.normalized.iter().any(|f| id_of(f) == id) {
        return error(StatusCode::NOT_FOUND, "File not found");
    }
    audio_body(EXPORT_BYTES, "audio/wav")
}

async fn export_all(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    audio_body(ZIP_BYTES, "application/zip")
}

async fn status(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "status": "ok", "ffmpeg": true })).into_response()
}

async fn history(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().unwrap();
    Json(json!({ "history": state.normalized })).into_response()
}

async fn dependencies(headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "ffmpeg": "6.0", "pyloudnorm": "0.1.1" })).into_response()
}

fn stream(list: &[Value], id: &str, query: &HashMap<String, String>) -> Response {
    if query.get("token").map(String::as_str) != Some(TEST_TOKEN) {
        return unauthorized();
    }
    if !list.iter().any(|f| id_of(f) == id) {
        return error(StatusCode::NOT_FOUND, "File not found");
    }
    audio_body(EXPORT_BYTES, "audio/wav")
}

async fn stream_normalized(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    stream(&state.normalized, &id, &query)
}

async fn stream_original(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    stream(&state.originals, &id, &query)
}

// ============================================================================
// Feedback
// ============================================================================

/// List shape: replies stripped, count kept.
fn summary(item: &Value) -> Value {
    let mut item = item.clone();
    item["responses"] = json!([]);
    item
}

async fn list_feedback(State(state): State<Shared>) -> Response {
    let state = state.lock().unwrap();
    let items: Vec<Value> = state.feedback.iter().map(summary).collect();
    Json(items).into_response()
}

async fn my_feedback(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().unwrap();
    let items: Vec<Value> = state
        .feedback
        .iter()
        .filter(|f| f["user_name"] == TEST_USER)
        .map(summary)
        .collect();
    Json(items).into_response()
}

async fn feedback_detail(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().unwrap();
    match state.feedback.iter().find(|f| f["id"] == id.as_str()) {
        Some(item) => Json(item.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Feedback not found"),
    }
}

async fn submit_feedback(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    let id = state.next_id("fb");
    let item = json!({
        "id": id,
        "feedback_text": body["feedback_text"],
        "rating": body["rating"],
        "user_id": "user-1",
        "user_name": TEST_USER,
        "created_at": "2025-06-08T11:00:00",
        "responses": [],
        "response_count": 0
    });
    state.feedback.push(item.clone());
    Json(item).into_response()
}

async fn respond(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !is_authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    let reply_id = state.next_id("reply");
    let feedback_id = body["feedback_id"].as_str().unwrap_or_default().to_string();
    let Some(item) = state.feedback.iter_mut().find(|f| f["id"] == feedback_id.as_str()) else {
        return error(StatusCode::NOT_FOUND, "Feedback not found");
    };
    let reply = json!({
        "id": reply_id,
        "response_text": body["response_text"],
        "feedback_id": feedback_id,
        "user_id": "user-1",
        "user_name": TEST_USER,
        "created_at": "2025-06-08T11:05:00"
    });
    if let Some(responses) = item["responses"].as_array_mut() {
        responses.push(reply.clone());
    }
    let count = item["responses"].as_array().map(Vec::len).unwrap_or(0);
    item["response_count"] = json!(count);
    Json(reply).into_response()
}
