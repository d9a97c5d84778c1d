//! Typed access to the AudioNorm REST backend.

mod client;
mod error;
pub mod models;

pub use client::{audio_mime_type, ApiClient, ApiResult, StreamInfo};
pub use error::ApiError;
pub use models::{
    Feedback, FeedbackReply, LoginRequest, LoginResponse, NormalizationResult, NormalizedFile,
    OriginalFile, RegisterRequest, StreamKind, UploadResult, User,
};
