//! Shared constants for end-to-end tests
//!
//! Credentials, tokens and seeded ids used by the mock backend and the tests.
//! When test data changes, update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user name
pub const TEST_USER: &str = "testuser";

/// Regular test user password
pub const TEST_PASS: &str = "testpass123";

/// Regular test user email
pub const TEST_EMAIL: &str = "testuser@example.com";

/// Bearer token the mock backend accepts
pub const TEST_TOKEN: &str = "valid-token-123";

/// A token the backend rejects
pub const STALE_TOKEN: &str = "expired-token";

/// Token accepted by the verify-email endpoint
pub const VERIFY_TOKEN: &str = "verify-abc";

/// Token accepted by the reset-password endpoint
pub const RESET_TOKEN: &str = "reset-xyz";

// ============================================================================
// Seeded Library
// ============================================================================

/// Original upload that already has a normalized derivative
pub const ORIGINAL_1_ID: &str = "orig-1";
pub const ORIGINAL_1_NAME: &str = "song.wav";

/// Original upload without derivatives
pub const ORIGINAL_2_ID: &str = "orig-2";
pub const ORIGINAL_2_NAME: &str = "voice.mp3";

/// Normalized derivative of ORIGINAL_1 at -14 LUFS
pub const NORMALIZED_1_ID: &str = "norm-1";

/// Body served for every single-file export
pub const EXPORT_BYTES: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt ";

/// Body served for export-all
pub const ZIP_BYTES: &[u8] = b"PK\x03\x04normalized";

// ============================================================================
// Seeded Feedback
// ============================================================================

/// Feedback item without replies
pub const FEEDBACK_QUIET_ID: &str = "fb-1";

/// Feedback item with two replies
pub const FEEDBACK_THREAD_ID: &str = "fb-2";

// ============================================================================
// Timeouts
// ============================================================================

/// Max time to wait for the mock backend to start
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval while waiting for the mock backend
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;
