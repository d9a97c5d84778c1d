//! AudioNorm client library
//!
//! Talks to the AudioNorm backend (upload, loudness normalization, export,
//! feedback) and exposes the screen state the interactive shell renders.

pub mod api;
pub mod cli_style;
pub mod config;
pub mod lufs;
pub mod router;
pub mod session;
pub mod shell;
pub mod storage;
pub mod theme;
pub mod views;

// Re-export commonly used types for convenience
pub use api::{ApiClient, ApiError, ApiResult};
pub use config::{AppConfig, CliConfig, FileConfig};
pub use lufs::LufsTarget;
pub use router::{NavSelection, Route, View};
pub use session::{SessionPhase, SessionState, SessionStore};
pub use storage::{ClientStorage, FileStorage, MemoryStorage};
pub use theme::{Theme, ThemeStore};
