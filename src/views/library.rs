//! The user's library: originals, their normalized derivatives, and the
//! per-file normalization workflow.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::ValidationError;
use crate::api::{ApiClient, ApiResult, NormalizationResult, NormalizedFile, OriginalFile};
use crate::lufs::LufsTarget;

pub const EXPORT_ALL_FILE_NAME: &str = "normalized_files.zip";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LibraryTab {
    #[default]
    Original,
    Normalized,
}

impl LibraryTab {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "original" | "originals" => Some(LibraryTab::Original),
            "normalized" => Some(LibraryTab::Normalized),
            _ => None,
        }
    }
}

/// Where an original upload is in the normalization workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileState {
    Uploaded,
    Normalizing,
    Normalized,
}

/// Backend diagnostics shown on demand.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    pub status: Option<Value>,
    pub history: Option<Value>,
    pub dependencies: Option<Value>,
}

#[derive(Debug)]
pub struct LibraryView {
    pub originals: Vec<OriginalFile>,
    pub normalized: Vec<NormalizedFile>,
    pub tab: LibraryTab,
    pub search: String,
    pub error: Option<String>,
    pub message: Option<String>,
    targets: HashMap<String, LufsTarget>,
    busy: HashSet<String>,
    default_target: LufsTarget,
}

impl Default for LibraryView {
    fn default() -> Self {
        Self::new(LufsTarget::default())
    }
}

impl LibraryView {
    pub fn new(default_target: LufsTarget) -> Self {
        Self {
            originals: Vec::new(),
            normalized: Vec::new(),
            tab: LibraryTab::default(),
            search: String::new(),
            error: None,
            message: None,
            targets: HashMap::new(),
            busy: HashSet::new(),
            default_target,
        }
    }

    pub fn file_state(&self, original_id: &str) -> FileState {
        if self.busy.contains(original_id) {
            FileState::Normalizing
        } else if self
            .normalized
            .iter()
            .any(|n| n.source_file_id.as_deref() == Some(original_id))
        {
            FileState::Normalized
        } else {
            FileState::Uploaded
        }
    }

    pub fn is_busy(&self, original_id: &str) -> bool {
        self.busy.contains(original_id)
    }

    pub fn target(&self, original_id: &str) -> LufsTarget {
        self.targets
            .get(original_id)
            .copied()
            .unwrap_or(self.default_target)
    }

    pub fn set_target(&mut self, original_id: &str, target: LufsTarget) {
        self.targets.insert(original_id.to_string(), target);
    }

    /// Parses and stores a typed target. Out-of-range input is refused here
    /// and never reaches the network.
    pub fn set_target_str(&mut self, original_id: &str, raw: &str) -> Result<LufsTarget, ValidationError> {
        self.error = None;
        match raw.parse::<LufsTarget>() {
            Ok(target) => {
                self.set_target(original_id, target);
                Ok(target)
            }
            Err(err) => {
                let err = ValidationError::from(err);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn apply_preset(&mut self, original_id: &str, preset: &str) -> Result<LufsTarget, ValidationError> {
        self.error = None;
        match LufsTarget::preset(preset) {
            Some(target) => {
                self.set_target(original_id, target);
                Ok(target)
            }
            None => {
                let err = ValidationError::Refused(format!("Unknown preset '{}'.", preset));
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Refetches originals, then normalized files.
    pub async fn refresh(&mut self, api: &ApiClient) -> ApiResult<()> {
        self.originals = api.original_files().await?;
        self.normalized = api.normalized_files().await?;
        debug!(
            "Library has {} original and {} normalized files",
            self.originals.len(),
            self.normalized.len()
        );
        Ok(())
    }

    /// [`LibraryView::refresh`] with the failure routed to `error`.
    pub async fn load(&mut self, api: &ApiClient) -> bool {
        self.error = None;
        match self.refresh(api).await {
            Ok(()) => true,
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    /// Normalizes one original to its selected target.
    ///
    /// A file that is already normalizing is refused without a request. On
    /// success both lists are refetched and the tab switches to the
    /// normalized list; on failure the file goes back to `Uploaded`.
    pub async fn normalize(
        &mut self,
        api: &ApiClient,
        original_id: &str,
    ) -> Option<NormalizationResult> {
        self.error = None;
        self.message = None;
        if self.busy.contains(original_id) {
            self.error = Some(
                ValidationError::Refused("This file is already being normalized.".to_string())
                    .to_string(),
            );
            return None;
        }

        let target = self.target(original_id);
        self.busy.insert(original_id.to_string());
        let result = api.normalize_uploaded(original_id, target).await;

        match result {
            Ok(result) => {
                info!("Normalized {} to {} LUFS", original_id, target);
                if let Err(err) = self.refresh(api).await {
                    warn!("Refresh after normalization failed: {}", err);
                    self.error = Some(err.to_string());
                }
                self.busy.remove(original_id);
                self.tab = LibraryTab::Normalized;
                self.message = Some(
                    result
                        .message
                        .clone()
                        .unwrap_or_else(|| format!("Normalized to {} LUFS.", target)),
                );
                Some(result)
            }
            Err(err) => {
                self.busy.remove(original_id);
                self.error = Some(err.to_string());
                None
            }
        }
    }

    pub fn find_normalized(&self, id: &str) -> Option<&NormalizedFile> {
        self.normalized.iter().find(|n| n.id == id)
    }

    /// Downloads a normalized file into `dir`, named after the original.
    pub async fn export(&mut self, api: &ApiClient, normalized_id: &str, dir: &Path) -> Option<PathBuf> {
        self.error = None;
        self.message = None;
        let Some(file) = self.find_normalized(normalized_id).cloned() else {
            self.error = Some(
                ValidationError::Refused(format!("No normalized file with id {}.", normalized_id))
                    .to_string(),
            );
            return None;
        };

        let name = export_filename(&file.original_filename, file.target_lufs);
        let destination = dir.join(name);
        match write_download(api.export_file(&file.id).await, &destination).await {
            Ok(()) => {
                info!("Exported {} to {}", file.id, destination.display());
                self.message = Some(format!("Saved {}", destination.display()));
                Some(destination)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    pub async fn export_all(&mut self, api: &ApiClient, dir: &Path) -> Option<PathBuf> {
        self.error = None;
        self.message = None;
        let destination = dir.join(EXPORT_ALL_FILE_NAME);
        match write_download(api.export_all().await, &destination).await {
            Ok(()) => {
                self.message = Some(format!("Saved {}", destination.display()));
                Some(destination)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    pub async fn delete_original(&mut self, api: &ApiClient, id: &str) -> bool {
        self.error = None;
        let result = api.delete_original(id).await;
        self.after_delete(api, result).await
    }

    pub async fn delete_normalized(&mut self, api: &ApiClient, id: &str) -> bool {
        self.error = None;
        let result = api.delete_normalized(id).await;
        self.after_delete(api, result).await
    }

    async fn after_delete(&mut self, api: &ApiClient, result: ApiResult<()>) -> bool {
        let outcome = match result {
            Ok(()) => self.refresh(api).await,
            Err(err) => Err(err),
        };
        match outcome {
            Ok(()) => true,
            Err(err) => {
                self.error = Some(err.to_string());
                false
            }
        }
    }

    /// Originals whose name contains the search text, case-insensitively.
    pub fn filtered_originals(&self) -> Vec<&OriginalFile> {
        let needle = self.search.trim().to_lowercase();
        self.originals
            .iter()
            .filter(|f| needle.is_empty() || f.filename.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn filtered_normalized(&self) -> Vec<&NormalizedFile> {
        let needle = self.search.trim().to_lowercase();
        self.normalized
            .iter()
            .filter(|f| {
                needle.is_empty()
                    || f.filename.to_lowercase().contains(&needle)
                    || f.original_filename.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Fetches backend status, history and dependency reports. Each one is
    /// independent; failures leave that slot empty.
    pub async fn diagnostics(&mut self, api: &ApiClient) -> Diagnostics {
        self.error = None;
        let mut report = Diagnostics::default();
        let mut failures = Vec::new();

        match api.audio_status().await {
            Ok(v) => report.status = Some(v),
            Err(err) => failures.push(format!("status: {}", err)),
        }
        match api.normalization_history().await {
            Ok(v) => report.history = Some(v),
            Err(err) => failures.push(format!("history: {}", err)),
        }
        match api.audio_dependencies().await {
            Ok(v) => report.dependencies = Some(v),
            Err(err) => failures.push(format!("dependencies: {}", err)),
        }

        if !failures.is_empty() {
            self.error = Some(failures.join("; "));
        }
        report
    }
}

async fn write_download(download: ApiResult<Vec<u8>>, destination: &Path) -> ApiResult<()> {
    let bytes = download?;
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(destination, bytes).await?;
    Ok(())
}

/// `song.wav` at -14 becomes `song (-14 LUFS).wav`.
pub fn export_filename(original_filename: &str, target_lufs: f64) -> String {
    let path = Path::new(original_filename);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| original_filename.to_string());
    let target = match LufsTarget::new(target_lufs) {
        Ok(t) => t.to_string(),
        Err(_) => target_lufs.to_string(),
    };
    match path.extension() {
        Some(ext) => format!("{} ({} LUFS).{}", stem, target, ext.to_string_lossy()),
        None => format!("{} ({} LUFS)", stem, target),
    }
}
