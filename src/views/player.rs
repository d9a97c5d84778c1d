//! Preview player for originals and normalized files.
//!
//! The shell has no audio output, so the player keeps a playback clock
//! against the probed stream and the duration the library reported.

use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::format_time;
use crate::api::{ApiClient, StreamInfo, StreamKind};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MediaError {
    #[error("Failed to load audio file")]
    LoadFailed,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlayerStatus {
    Loading,
    Ready(StreamInfo),
    Failed(MediaError),
}

#[derive(Debug)]
pub struct PreviewPlayer {
    pub file_id: String,
    pub filename: String,
    pub kind: StreamKind,
    pub status: PlayerStatus,
    playing: bool,
    position: f64,
    /// `None` when the library did not report a length.
    duration: Option<f64>,
}

impl PreviewPlayer {
    pub fn new(
        kind: StreamKind,
        file_id: impl Into<String>,
        filename: impl Into<String>,
        duration: Option<f64>,
    ) -> Self {
        Self {
            file_id: file_id.into(),
            filename: filename.into(),
            kind,
            status: PlayerStatus::Loading,
            playing: false,
            position: 0.0,
            duration: duration.filter(|d| d.is_finite() && *d > 0.0),
        }
    }

    pub fn stream_url(&self, api: &ApiClient) -> String {
        api.stream_url(self.kind, &self.file_id)
    }

    pub async fn load(&mut self, api: &ApiClient) -> Result<(), MediaError> {
        self.status = PlayerStatus::Loading;
        self.reset();
        match api.probe_stream(self.kind, &self.file_id).await {
            Ok(info) => {
                debug!("Stream for {} ready: {:?}", self.file_id, info);
                self.status = PlayerStatus::Ready(info);
                Ok(())
            }
            Err(err) => {
                warn!("Could not open stream for {}: {}", self.file_id, err);
                self.status = PlayerStatus::Failed(MediaError::LoadFailed);
                Err(MediaError::LoadFailed)
            }
        }
    }

    pub fn error(&self) -> Option<&MediaError> {
        match &self.status {
            PlayerStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, PlayerStatus::Ready(_))
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Play/pause. Has no effect until the stream is ready.
    pub fn toggle_play(&mut self) -> bool {
        if self.is_ready() {
            self.playing = !self.playing;
        }
        self.playing
    }

    pub fn seek(&mut self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let position = seconds.max(0.0);
        self.position = match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        };
    }

    pub fn reset(&mut self) {
        self.playing = false;
        self.position = 0.0;
    }

    /// Moves the clock forward while playing. Reaching a known end stops
    /// playback and rewinds to the start; with no duration the clock runs
    /// until stopped.
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.playing {
            return;
        }
        self.position += elapsed.as_secs_f64();
        if self.duration.is_some_and(|duration| self.position >= duration) {
            self.reset();
        }
    }

    /// `0:42 / 3:15`, or `0:42 / --:--` when the length is unknown.
    pub fn progress_label(&self) -> String {
        let total = match self.duration {
            Some(duration) => format_time(duration),
            None => "--:--".to_string(),
        };
        format!("{} / {}", format_time(self.position), total)
    }
}
