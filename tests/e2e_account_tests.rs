//! End-to-end tests for account screens, persisted client state and the
//! preview player

mod common;

use audionorm_client::api::StreamKind;
use audionorm_client::storage::{ClientStorage, FileStorage};
use audionorm_client::theme::{Theme, ThemeStore};
use audionorm_client::views::auth::{
    ForgotPasswordForm, LoginForm, Notice, RegisterForm, ResetPasswordForm, VerifyEmailPage,
    VerifyStatus,
};
use audionorm_client::views::player::{MediaError, PreviewPlayer};
use common::{
    MockBackend, TestContext, NORMALIZED_1_ID, ORIGINAL_1_ID, RESET_TOKEN, TEST_PASS, TEST_TOKEN,
    TEST_USER, VERIFY_TOKEN,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Login and registration
// ============================================================================

#[tokio::test]
async fn test_login_form_signs_in() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut form = LoginForm {
        username: TEST_USER.to_string(),
        password: TEST_PASS.to_string(),
        ..Default::default()
    };
    let user = form.submit(&context.session).await;

    assert_eq!(user.map(|u| u.username).as_deref(), Some(TEST_USER));
    assert!(form.error.is_none());
    assert!(form.password.is_empty());
    assert!(!form.busy);
}

#[tokio::test]
async fn test_login_form_shows_server_message() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut form = LoginForm {
        username: TEST_USER.to_string(),
        password: "nope".to_string(),
        ..Default::default()
    };

    assert!(form.submit(&context.session).await.is_none());
    assert_eq!(form.error.as_deref(), Some("Incorrect username or password"));
}

#[tokio::test]
async fn test_login_form_requires_fields() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut form = LoginForm::default();

    assert!(form.submit(&context.session).await.is_none());
    assert!(form.error.is_some());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_register_password_mismatch_sends_nothing() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut form = RegisterForm {
        username: "newbie".to_string(),
        email: "newbie@example.com".to_string(),
        password: "secret-1".to_string(),
        confirm_password: "secret-2".to_string(),
        ..Default::default()
    };

    assert!(form.submit(&context.api).await.is_none());
    assert_eq!(
        form.notice,
        Some(Notice::Error("Passwords do not match.".to_string()))
    );
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_register_success_and_duplicate() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut form = RegisterForm {
        username: "newbie".to_string(),
        email: "newbie@example.com".to_string(),
        password: "secret-1".to_string(),
        confirm_password: "secret-1".to_string(),
        ..Default::default()
    };
    let user = form.submit(&context.api).await;
    assert_eq!(user.map(|u| u.email).as_deref(), Some("newbie@example.com"));
    assert!(matches!(form.notice, Some(Notice::Success(_))));
    assert!(!context.session.is_logged_in());

    form.username = TEST_USER.to_string();
    form.password = "secret-1".to_string();
    form.confirm_password = "secret-1".to_string();
    assert!(form.submit(&context.api).await.is_none());
    assert_eq!(
        form.notice.as_ref().map(Notice::text),
        Some("Username already registered")
    );
}

// ============================================================================
// Token pages
// ============================================================================

#[tokio::test]
async fn test_verify_email_success() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut page = VerifyEmailPage::new(Some(VERIFY_TOKEN.to_string()));
    assert_eq!(page.status, VerifyStatus::Pending);

    assert_eq!(page.run(&context.api).await, VerifyStatus::Success);
    assert_eq!(page.message, "Email verified successfully");

    let request = &backend.requests_to("GET", "/verify/verify-email")[0];
    assert_eq!(
        request.uri,
        format!("/verify/verify-email?token={}", VERIFY_TOKEN)
    );
}

#[tokio::test]
async fn test_verify_email_bad_token() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut page = VerifyEmailPage::new(Some("bogus".to_string()));

    assert_eq!(page.run(&context.api).await, VerifyStatus::Error);
    assert_eq!(page.message, "Invalid or expired verification token");
}

#[tokio::test]
async fn test_verify_email_without_token_sends_nothing() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut page = VerifyEmailPage::new(None);

    assert_eq!(page.run(&context.api).await, VerifyStatus::Error);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_forgot_password_confirms_generically() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut form = ForgotPasswordForm {
        email: "someone@example.com".to_string(),
        ..Default::default()
    };

    assert!(form.submit(&context.api).await);
    assert!(matches!(form.notice, Some(Notice::Success(_))));
    assert_eq!(backend.requests_to("POST", "/auth/forgot-password").len(), 1);
}

#[tokio::test]
async fn test_reset_password_flow() {
    let backend = MockBackend::spawn().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut missing = ResetPasswordForm::new(None);
    missing.password = "fresh-pass".to_string();
    missing.confirm_password = "fresh-pass".to_string();
    assert!(!missing.submit(&context.api).await);
    assert_eq!(
        missing.notice.as_ref().map(Notice::text),
        Some("Invalid or missing token.")
    );
    assert!(backend.requests().is_empty());

    let mut expired = ResetPasswordForm::new(Some("old-token".to_string()));
    expired.password = "fresh-pass".to_string();
    expired.confirm_password = "fresh-pass".to_string();
    assert!(!expired.submit(&context.api).await);
    assert_eq!(
        expired.notice.as_ref().map(Notice::text),
        Some("Invalid or expired reset token")
    );

    let mut valid = ResetPasswordForm::new(Some(RESET_TOKEN.to_string()));
    valid.password = "fresh-pass".to_string();
    valid.confirm_password = "fresh-pass".to_string();
    assert!(valid.submit(&context.api).await);
    assert!(matches!(valid.notice, Some(Notice::Success(_))));
    assert!(valid.password.is_empty());
}

// ============================================================================
// Persisted state
// ============================================================================

#[tokio::test]
async fn test_token_survives_restart() {
    let backend = MockBackend::spawn().await;
    let dir = TempDir::new().unwrap();

    {
        let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::in_dir(dir.path()).unwrap());
        let context = TestContext::with_storage(&backend.base_url, storage);
        assert!(context.session.login(TEST_TOKEN).await);
    }

    let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::in_dir(dir.path()).unwrap());
    let context = TestContext::with_storage(&backend.base_url, storage);
    context.session.initialize().await;

    assert!(context.session.is_logged_in());
}

#[test]
fn test_theme_survives_restart() {
    let dir = TempDir::new().unwrap();

    {
        let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::in_dir(dir.path()).unwrap());
        let themes = ThemeStore::new(storage, Theme::Light);
        assert_eq!(themes.toggle(), Theme::Dark);
    }

    let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::in_dir(dir.path()).unwrap());
    let themes = ThemeStore::new(storage, Theme::Light);

    assert_eq!(themes.theme(), Theme::Dark);
    assert_eq!(themes.root_class(), "dark");
}

// ============================================================================
// Preview player
// ============================================================================

#[tokio::test]
async fn test_player_loads_stream_with_query_token() {
    let backend = MockBackend::spawn_seeded().await;
    let context = TestContext::authenticated(&backend.base_url).await;

    let mut player = PreviewPlayer::new(StreamKind::Normalized, NORMALIZED_1_ID, "song.wav", Some(3.0));
    player.load(&context.api).await.unwrap();

    assert!(player.is_ready());
    assert!(player.toggle_play());
    player.advance(Duration::from_secs(5));
    assert!(!player.is_playing());
    assert_eq!(player.position(), 0.0);

    let request = &backend.requests_to("GET", "/audio/stream/")[0];
    assert_eq!(
        request.uri,
        format!("/audio/stream/{}?token={}", NORMALIZED_1_ID, TEST_TOKEN)
    );
    assert!(request.authorization.is_none());
}

#[tokio::test]
async fn test_player_reports_load_failure() {
    let backend = MockBackend::spawn_seeded().await;
    let context = TestContext::anonymous(&backend.base_url);

    let mut player = PreviewPlayer::new(StreamKind::Original, ORIGINAL_1_ID, "song.wav", None);
    let err = player.load(&context.api).await.unwrap_err();

    assert_eq!(err, MediaError::LoadFailed);
    assert_eq!(err.to_string(), "Failed to load audio file");
    assert_eq!(player.error(), Some(&MediaError::LoadFailed));
    assert!(!player.toggle_play());
}
