//! HTTP client for the AudioNorm backend.
//!
//! Every call is a single attempt: no retries, no timeouts. Failed responses
//! are turned into [`ApiError::Status`] carrying the server's detail message.

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::ApiError;
use super::models::{
    Feedback, FeedbackReply, FeedbackSubmission, ForgotPasswordRequest, LoginRequest,
    LoginResponse, NormalizationResult, NormalizedFile, NormalizedFilesEnvelope, OriginalFile,
    OriginalFilesEnvelope, RegisterRequest, ReplySubmission, ResetPasswordRequest, StreamKind,
    UploadResult, User,
};
use crate::lufs::LufsTarget;
use crate::storage::{ClientStorage, TOKEN_KEY};

pub type ApiResult<T> = Result<T, ApiError>;

/// What the backend told us about a preview stream, without its body.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Authenticated client for the AudioNorm REST API.
///
/// Cheap to clone: the underlying connection pool and storage are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    storage: Arc<dyn ClientStorage>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the backend (e.g., "http://localhost:8000")
    /// * `storage` - Client storage holding the bearer token
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn ClientStorage>) -> ApiResult<Self> {
        let client = reqwest::Client::builder().build()?;

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            storage,
        })
    }

    /// Get the base URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The currently persisted bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// JSON request: content type always set, bearer header when logged in.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}", method, path);
        let builder = self
            .client
            .request(method, self.url(path))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.with_auth(builder)
    }

    /// Request without the JSON content type (multipart and binary downloads).
    fn raw_request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("{} {}", method, path);
        self.with_auth(self.client.request(method, self.url(path)))
    }

    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.bytes().await.unwrap_or_default();
        let err = ApiError::from_status(status, &body);
        warn!("Request failed with status {}: {}", status, err);
        Err(err)
    }

    async fn send(&self, builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        Self::check(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn send_bytes(&self, builder: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = self.send(builder).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send_json(self.request(Method::GET, path)).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send_json(self.request(Method::POST, path).json(body))
            .await
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// POST /auth/register
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<User> {
        self.post_json("/auth/register", request).await
    }

    /// POST /auth/login
    ///
    /// Only returns the token; persisting it is the session store's job.
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.post_json("/auth/login", request).await
    }

    /// URL the browser should navigate to for Google sign-in.
    pub fn google_login_url(&self) -> String {
        self.url("/auth/google/login")
    }

    /// GET /verify/verify-email?token=
    pub async fn verify_email(&self, token: &str) -> ApiResult<Value> {
        let path = format!(
            "/verify/verify-email?token={}",
            urlencoding::encode(token)
        );
        self.get_json(&path).await
    }

    /// POST /auth/forgot-password
    pub async fn forgot_password(&self, email: &str) -> ApiResult<Value> {
        self.post_json("/auth/forgot-password", &ForgotPasswordRequest { email })
            .await
    }

    /// POST /auth/reset-password
    pub async fn reset_password(&self, token: &str, password: &str) -> ApiResult<Value> {
        self.post_json(
            "/auth/reset-password",
            &ResetPasswordRequest { token, password },
        )
        .await
    }

    /// GET /users/profile
    pub async fn profile(&self) -> ApiResult<User> {
        self.get_json("/users/profile").await
    }

    // ========================================================================
    // Audio library
    // ========================================================================

    /// POST /audio/upload, one file per call.
    pub async fn upload_file(&self, path: &Path) -> ApiResult<UploadResult> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let bytes = tokio::fs::read(path).await?;
        info!("Uploading {} ({} bytes)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(audio_mime_type(&file_name))?;
        let form = Form::new().part("file", part);

        self.send_json(self.raw_request(Method::POST, "/audio/upload").multipart(form))
            .await
    }

    /// GET /audio/files/original
    pub async fn original_files(&self) -> ApiResult<Vec<OriginalFile>> {
        let envelope: OriginalFilesEnvelope = self.get_json("/audio/files/original").await?;
        Ok(envelope.original_files)
    }

    /// GET /audio/files/normalized
    pub async fn normalized_files(&self) -> ApiResult<Vec<NormalizedFile>> {
        let envelope: NormalizedFilesEnvelope = self.get_json("/audio/files/normalized").await?;
        Ok(envelope.normalized_files)
    }

    /// POST /audio/normalize-uploaded/{fileId}/{targetLufs}
    pub async fn normalize_uploaded(
        &self,
        file_id: &str,
        target: LufsTarget,
    ) -> ApiResult<NormalizationResult> {
        let path = format!(
            "/audio/normalize-uploaded/{}/{}",
            urlencoding::encode(file_id),
            target
        );
        info!("Normalizing {} to {} LUFS", file_id, target);
        self.send_json(self.raw_request(Method::POST, &path)).await
    }

    /// GET /audio/export/{fileId}
    pub async fn export_file(&self, file_id: &str) -> ApiResult<Vec<u8>> {
        let path = format!("/audio/export/{}", urlencoding::encode(file_id));
        self.send_bytes(self.raw_request(Method::GET, &path)).await
    }

    /// GET /audio/export-all
    pub async fn export_all(&self) -> ApiResult<Vec<u8>> {
        self.send_bytes(self.raw_request(Method::GET, "/audio/export-all"))
            .await
    }

    /// DELETE /audio/files/original/{fileId}
    pub async fn delete_original(&self, file_id: &str) -> ApiResult<()> {
        let path = format!("/audio/files/original/{}", urlencoding::encode(file_id));
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    /// DELETE /audio/files/normalized/{fileId}
    pub async fn delete_normalized(&self, file_id: &str) -> ApiResult<()> {
        let path = format!("/audio/files/normalized/{}", urlencoding::encode(file_id));
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }

    /// GET /audio/status
    pub async fn audio_status(&self) -> ApiResult<Value> {
        self.get_json("/audio/status").await
    }

    /// GET /audio/history
    pub async fn normalization_history(&self) -> ApiResult<Value> {
        self.get_json("/audio/history").await
    }

    /// GET /audio/dependencies
    pub async fn audio_dependencies(&self) -> ApiResult<Value> {
        self.get_json("/audio/dependencies").await
    }

    /// Streaming URL for previews; the token travels as a query parameter
    /// because media players cannot set headers.
    pub fn stream_url(&self, kind: StreamKind, file_id: &str) -> String {
        let prefix = match kind {
            StreamKind::Original => "/audio/stream-upload",
            StreamKind::Normalized => "/audio/stream",
        };
        let token = self.token().unwrap_or_default();
        format!(
            "{}/{}?token={}",
            self.url(prefix),
            urlencoding::encode(file_id),
            urlencoding::encode(&token)
        )
    }

    /// Opens a preview stream and reports its headers, dropping the body.
    pub async fn probe_stream(&self, kind: StreamKind, file_id: &str) -> ApiResult<StreamInfo> {
        let response = self
            .send(self.client.get(self.stream_url(kind, file_id)))
            .await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(StreamInfo {
            content_type,
            content_length: response.content_length(),
        })
    }

    // ========================================================================
    // Feedback
    // ========================================================================

    /// POST /feedback/submit
    pub async fn submit_feedback(&self, submission: &FeedbackSubmission) -> ApiResult<Feedback> {
        self.post_json("/feedback/submit", submission).await
    }

    /// GET /feedback/
    pub async fn all_feedback(&self) -> ApiResult<Vec<Feedback>> {
        self.get_json("/feedback/").await
    }

    /// GET /feedback/{id}, with the response thread expanded.
    pub async fn feedback_detail(&self, feedback_id: &str) -> ApiResult<Feedback> {
        let path = format!("/feedback/{}", urlencoding::encode(feedback_id));
        self.get_json(&path).await
    }

    /// POST /feedback/respond
    pub async fn respond_to_feedback(&self, reply: &ReplySubmission) -> ApiResult<FeedbackReply> {
        self.post_json("/feedback/respond", reply).await
    }

    /// GET /feedback/user/my-feedback
    pub async fn my_feedback(&self) -> ApiResult<Vec<Feedback>> {
        self.get_json("/feedback/user/my-feedback").await
    }
}

/// Best effort MIME type for an audio file name; the backend sniffs anyway.
pub fn audio_mime_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "ogg" | "opus" => "audio/ogg",
        "m4a" | "aac" => "audio/mp4",
        "aif" | "aiff" => "audio/aiff",
        "wma" => "audio/x-ms-wma",
        _ => "application/octet-stream",
    }
}
