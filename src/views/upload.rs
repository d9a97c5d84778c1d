//! Batch upload of local audio files.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::ValidationError;
use crate::api::{ApiClient, UploadResult};

const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "mp3", "flac", "ogg", "m4a", "aac", "aiff", "aif", "opus", "wma",
];

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.as_str()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[derive(Debug, Default)]
pub struct UploadView {
    selected: Vec<PathBuf>,
    /// Names dropped by the last `select` because they are not audio.
    skipped: Vec<String>,
    pub uploading: bool,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl UploadView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[PathBuf] {
        &self.selected
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Replaces the selection. Non-audio files are skipped and reported in
    /// `error`; the accepted count is returned.
    pub fn select<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.error = None;
        self.message = None;
        self.selected.clear();
        self.skipped.clear();

        for path in paths.into_iter().map(Into::into) {
            if is_audio_file(&path) {
                self.selected.push(path);
            } else {
                self.skipped.push(display_name(&path));
            }
        }

        if let Some(first) = self.skipped.first() {
            self.error = Some(ValidationError::NotAudio(first.clone()).to_string());
        }
        self.selected.len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.skipped.clear();
        self.error = None;
        self.message = None;
    }

    /// Uploads the selection one file at a time, in order, and stops at the
    /// first failure. Returns the results of the files sent before it.
    /// Files skipped at selection are listed again in the summary.
    pub async fn upload_all(&mut self, api: &ApiClient) -> Vec<UploadResult> {
        self.error = None;
        self.message = None;
        if self.selected.is_empty() {
            self.error = Some(ValidationError::NothingSelected.to_string());
            return Vec::new();
        }

        self.uploading = true;
        let mut results = Vec::with_capacity(self.selected.len());
        let mut failed = false;
        for path in &self.selected {
            match api.upload_file(path).await {
                Ok(result) => results.push(result),
                Err(err) => {
                    let name = display_name(path);
                    warn!("Upload of {} failed: {}", name, err);
                    self.error = Some(format!("Upload failed for {}: {}", name, err));
                    failed = true;
                    break;
                }
            }
        }
        self.uploading = false;

        // Keep whatever did not make it so the user can retry.
        self.selected.drain(..results.len());
        if !failed {
            info!("Uploaded {} file(s)", results.len());
            let mut summary = format!("Uploaded {} file(s).", results.len());
            for name in self.skipped.drain(..) {
                summary.push(' ');
                summary.push_str(&ValidationError::NotAudio(name).to_string());
            }
            self.message = Some(summary);
        }
        results
    }
}
