//! Feature screens.
//!
//! Each view owns its local interaction state and an `error` slot. Failures
//! of any kind are converted to a display string there and cleared at the
//! start of the next attempt; nothing here is fatal to the process.

pub mod auth;
pub mod feedback;
pub mod library;
pub mod player;
pub mod upload;

use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;

use crate::lufs::LufsError;

/// Client-side checks that fail before any request is sent.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingField(&'static str),

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Rating must be between 1 and 5 stars.")]
    RatingOutOfRange(u8),

    #[error(transparent)]
    Lufs(#[from] LufsError),

    #[error("No files selected.")]
    NothingSelected,

    #[error("{0} is not an audio file.")]
    NotAudio(String),

    #[error("{0}")]
    Refused(String),
}

/// Renders a backend timestamp as e.g. "Sunday, 8 June 2025".
///
/// The backend emits ISO timestamps with or without an offset; anything
/// unparseable is shown verbatim.
pub fn format_date(raw: &str) -> String {
    const FORMAT: &str = "%A, %-d %B %Y";
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(FORMAT).to_string();
    }
    raw.to_string()
}

/// Formats seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// GridFS ids are long; the library only shows their head.
pub fn truncate_id(id: &str) -> String {
    const SHOWN: usize = 8;
    if id.chars().count() <= SHOWN {
        id.to_string()
    } else {
        format!("{}…", id.chars().take(SHOWN).collect::<String>())
    }
}
