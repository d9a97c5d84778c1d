//! Wire and domain models for the AudioNorm backend.
//!
//! Library entries arrive in a loosely shaped JSON record (MongoDB ids,
//! alternate field names depending on the endpoint version). They are
//! mapped once, at deserialization time, into the domain shapes below.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Auth
// =============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub auth_provider: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub password: &'a str,
}

/// Extracts a human readable message from a backend acknowledgement, which
/// is either a bare JSON string or an object with a `message` field.
pub fn message_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

// =============================================================================
// Audio library
// =============================================================================

/// A file as uploaded by the user, before any normalization.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(try_from = "OriginalFileRecord")]
pub struct OriginalFile {
    pub id: String,
    pub filename: String,
    pub user_id: Option<String>,
    pub upload_date: Option<String>,
    /// Seconds.
    pub duration: Option<f64>,
    /// Bytes.
    pub file_size: Option<u64>,
    pub can_normalize: bool,
    pub gridfs_id: Option<String>,
}

#[derive(Deserialize)]
struct OriginalFileRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    original_filename: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    upload_date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    file_size: Option<u64>,
    #[serde(default)]
    can_normalize: Option<bool>,
    #[serde(default)]
    gridfs_id: Option<String>,
}

impl TryFrom<OriginalFileRecord> for OriginalFile {
    type Error = String;

    fn try_from(record: OriginalFileRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .or(record.mongo_id)
            .ok_or_else(|| "original file without id".to_string())?;
        let filename = record
            .filename
            .or(record.original_filename)
            .unwrap_or_else(|| id.clone());
        Ok(OriginalFile {
            id,
            filename,
            user_id: record.user_id,
            upload_date: record.upload_date.or(record.created_at),
            duration: record.duration,
            file_size: record.file_size,
            can_normalize: record.can_normalize.unwrap_or(true),
            gridfs_id: record.gridfs_id,
        })
    }
}

/// A derived file produced by a normalization run.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(try_from = "NormalizedFileRecord")]
pub struct NormalizedFile {
    pub id: String,
    pub filename: String,
    pub original_filename: String,
    /// Id of the original upload this file was derived from.
    pub source_file_id: Option<String>,
    pub target_lufs: f64,
    pub final_lufs: Option<f64>,
    pub original_lufs: Option<f64>,
    pub method: Option<String>,
    pub created_at: Option<String>,
    pub processed_at: Option<String>,
    pub download_count: u64,
    pub last_downloaded_at: Option<String>,
    pub gridfs_id: Option<String>,
}

#[derive(Deserialize)]
struct NormalizedFileRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    normalized_filename: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    original_filename: Option<String>,
    #[serde(default)]
    original_file_id: Option<String>,
    #[serde(default)]
    original_upload_id: Option<String>,
    #[serde(default)]
    target_lufs: Option<f64>,
    #[serde(default)]
    final_lufs: Option<f64>,
    #[serde(default)]
    original_lufs: Option<f64>,
    #[serde(default)]
    normalization_method: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    processed_at: Option<String>,
    #[serde(default)]
    download_count: Option<u64>,
    #[serde(default)]
    last_downloaded_at: Option<String>,
    #[serde(default)]
    gridfs_id: Option<String>,
}

impl TryFrom<NormalizedFileRecord> for NormalizedFile {
    type Error = String;

    fn try_from(record: NormalizedFileRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .or(record.mongo_id)
            .ok_or_else(|| "normalized file without id".to_string())?;
        let target_lufs = record
            .target_lufs
            .ok_or_else(|| format!("normalized file {} without target_lufs", id))?;
        let filename = record
            .normalized_filename
            .or(record.filename)
            .unwrap_or_else(|| id.clone());
        let original_filename = record
            .original_filename
            .unwrap_or_else(|| filename.clone());
        Ok(NormalizedFile {
            id,
            filename,
            original_filename,
            source_file_id: record.original_file_id.or(record.original_upload_id),
            target_lufs,
            final_lufs: record.final_lufs,
            original_lufs: record.original_lufs,
            method: record.normalization_method,
            created_at: record.created_at,
            processed_at: record.processed_at,
            download_count: record.download_count.unwrap_or(0),
            last_downloaded_at: record.last_downloaded_at,
            gridfs_id: record.gridfs_id,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct OriginalFilesEnvelope {
    #[serde(default)]
    pub original_files: Vec<OriginalFile>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct NormalizedFilesEnvelope {
    #[serde(default)]
    pub normalized_files: Vec<NormalizedFile>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct UploadResult {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct NormalizationResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub normalized_file_id: Option<String>,
    #[serde(default)]
    pub target_lufs: Option<f64>,
    #[serde(default)]
    pub final_lufs: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which stream endpoint a preview plays from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Original,
    Normalized,
}

// =============================================================================
// Feedback
// =============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Feedback {
    pub id: String,
    pub feedback_text: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub responses: Vec<FeedbackReply>,
    #[serde(default)]
    pub response_count: usize,
}

impl Feedback {
    pub fn author(&self) -> &str {
        author_of(&self.user_name, &self.user_email)
    }

    /// True once the full thread has been fetched for this item.
    pub fn thread_loaded(&self) -> bool {
        self.responses.len() >= self.response_count
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FeedbackReply {
    pub id: String,
    pub response_text: String,
    #[serde(default)]
    pub feedback_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl FeedbackReply {
    pub fn author(&self) -> &str {
        author_of(&self.user_name, &self.user_email)
    }
}

fn author_of<'a>(name: &'a Option<String>, email: &'a Option<String>) -> &'a str {
    name.as_deref()
        .or(email.as_deref())
        .unwrap_or("Anonymous")
}

#[derive(Clone, Debug, Serialize)]
pub struct FeedbackSubmission {
    pub feedback_text: String,
    pub rating: u8,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplySubmission {
    pub response_text: String,
    pub feedback_id: String,
}
