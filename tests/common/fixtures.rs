//! Seed data for the mock backend and local files for uploads.

use super::constants::*;
use super::server::BackendState;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Two originals, one of which already has a -14 LUFS derivative.
pub fn seed_library(state: &mut BackendState) {
    state.originals = vec![
        json!({
            "_id": ORIGINAL_1_ID,
            "original_filename": ORIGINAL_1_NAME,
            "file_size": 5 * 1024 * 1024,
            "duration": 222.5,
            "created_at": "2025-06-06T10:00:00"
        }),
        json!({
            "_id": ORIGINAL_2_ID,
            "original_filename": ORIGINAL_2_NAME,
            "file_size": 800 * 1024,
            "duration": 61.0,
            "created_at": "2025-06-07T08:15:00"
        }),
    ];
    state.normalized = vec![json!({
        "_id": NORMALIZED_1_ID,
        "normalized_filename": "song_normalized_-14.wav",
        "original_filename": ORIGINAL_1_NAME,
        "original_file_id": ORIGINAL_1_ID,
        "target_lufs": -14.0,
        "final_lufs": -14.1,
        "original_lufs": -19.8,
        "normalization_method": "ffmpeg_loudnorm",
        "created_at": "2025-06-06T10:05:00",
        "download_count": 2,
        "gridfs_id": "6842b1f0c3a4d5e6f7a8b9c0"
    })];
}

/// One item without replies and one with a two-reply thread.
pub fn seed_feedback(state: &mut BackendState) {
    state.feedback = vec![
        json!({
            "id": FEEDBACK_QUIET_ID,
            "feedback_text": "Exports are fast",
            "rating": 5,
            "user_id": "user-2",
            "user_name": "alice",
            "created_at": "2025-06-05T12:00:00",
            "responses": [],
            "response_count": 0
        }),
        json!({
            "id": FEEDBACK_THREAD_ID,
            "feedback_text": "Please add a true peak limiter",
            "rating": 3,
            "user_id": "user-1",
            "user_name": TEST_USER,
            "created_at": "2025-06-04T09:30:00",
            "responses": [
                {
                    "id": "reply-1",
                    "response_text": "Agreed",
                    "feedback_id": FEEDBACK_THREAD_ID,
                    "user_id": "user-3",
                    "user_name": "bob",
                    "created_at": "2025-06-04T10:00:00"
                },
                {
                    "id": "reply-2",
                    "response_text": "On the roadmap",
                    "feedback_id": FEEDBACK_THREAD_ID,
                    "user_id": "user-4",
                    "user_email": "team@audionorm.dev",
                    "created_at": "2025-06-04T11:00:00"
                }
            ],
            "response_count": 2
        }),
    ];
}

/// Writes small placeholder audio files into `dir`, in the given order.
pub fn write_audio_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, format!("fake audio for {}", name)).unwrap();
            path
        })
        .collect()
}
