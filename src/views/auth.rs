//! Login, registration, email verification and password recovery screens.

use tracing::{info, warn};

use super::ValidationError;
use crate::api::{models::message_of, ApiClient, ApiError, RegisterRequest, User};
use crate::session::SessionStore;

const GENERIC_FAILURE: &str = "Something went wrong.";

/// Outcome line shown under a form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Server detail if there was one, the generic line otherwise.
fn detail_or_generic(err: &ApiError, generic: &str) -> String {
    err.detail().unwrap_or(generic).to_string()
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub error: Option<String>,
    pub busy: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.username, "User name")?;
        require(&self.password, "Password")
    }

    /// Signs in through the session store. Returns the user on success;
    /// on failure the reason is left in `error`.
    pub async fn submit(&mut self, session: &SessionStore) -> Option<User> {
        self.error = None;
        if let Err(err) = self.validate() {
            self.error = Some(err.to_string());
            return None;
        }

        self.busy = true;
        let result = session.sign_in(self.username.trim(), &self.password).await;
        self.busy = false;

        match result {
            Ok(Some(user)) => {
                self.password.clear();
                Some(user)
            }
            Ok(None) => {
                self.error = Some("Login failed. Please try again.".to_string());
                None
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

#[derive(Debug, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub notice: Option<Notice>,
    pub busy: bool,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.username, "User name")?;
        require(&self.email, "Email")?;
        require(&self.password, "Password")?;
        require(&self.confirm_password, "Confirm password")?;
        if self.password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }

    pub async fn submit(&mut self, api: &ApiClient) -> Option<User> {
        self.notice = None;
        if let Err(err) = self.validate() {
            self.notice = Some(Notice::Error(err.to_string()));
            return None;
        }

        self.busy = true;
        let result = api
            .register(&RegisterRequest {
                username: self.username.trim().to_string(),
                email: self.email.trim().to_string(),
                password: self.password.clone(),
                confirm_password: self.confirm_password.clone(),
            })
            .await;
        self.busy = false;

        match result {
            Ok(user) => {
                info!("Registered {}", user.username);
                self.password.clear();
                self.confirm_password.clear();
                self.notice = Some(Notice::Success(
                    "Registration successful! Please check your email to verify your account."
                        .to_string(),
                ));
                Some(user)
            }
            Err(err) => {
                warn!("Registration failed: {}", err);
                self.notice = Some(Notice::Error(err.to_string()));
                None
            }
        }
    }
}

// =============================================================================
// Email verification
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyStatus {
    Pending,
    Success,
    Error,
}

#[derive(Debug)]
pub struct VerifyEmailPage {
    pub token: Option<String>,
    pub status: VerifyStatus,
    pub message: String,
}

impl VerifyEmailPage {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            status: VerifyStatus::Pending,
            message: "Verifying your email...".to_string(),
        }
    }

    pub async fn run(&mut self, api: &ApiClient) -> VerifyStatus {
        let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) else {
            self.status = VerifyStatus::Error;
            self.message = "Invalid verification link.".to_string();
            return self.status;
        };

        match api.verify_email(token).await {
            Ok(body) => {
                self.status = VerifyStatus::Success;
                self.message = message_of(&body).unwrap_or_else(|| {
                    "Email verified successfully! You can now log in.".to_string()
                });
            }
            Err(err) => {
                self.status = VerifyStatus::Error;
                self.message = detail_or_generic(
                    &err,
                    "Verification failed. The link may be invalid or expired.",
                );
            }
        }
        self.status
    }
}

// =============================================================================
// Password recovery
// =============================================================================

#[derive(Debug, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
    pub notice: Option<Notice>,
    pub busy: bool,
}

impl ForgotPasswordForm {
    pub async fn submit(&mut self, api: &ApiClient) -> bool {
        self.notice = None;
        if let Err(err) = require(&self.email, "Email") {
            self.notice = Some(Notice::Error(err.to_string()));
            return false;
        }

        self.busy = true;
        let result = api.forgot_password(self.email.trim()).await;
        self.busy = false;

        match result {
            Ok(_) => {
                self.notice = Some(Notice::Success(
                    "If your email is registered, a password reset link has been sent."
                        .to_string(),
                ));
                true
            }
            Err(err) => {
                self.notice = Some(Notice::Error(detail_or_generic(&err, GENERIC_FAILURE)));
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ResetPasswordForm {
    pub token: Option<String>,
    pub password: String,
    pub confirm_password: String,
    pub notice: Option<Notice>,
    pub busy: bool,
}

impl ResetPasswordForm {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            ..Default::default()
        }
    }

    pub async fn submit(&mut self, api: &ApiClient) -> bool {
        self.notice = None;
        let Some(token) = self.token.clone().filter(|t| !t.is_empty()) else {
            self.notice = Some(Notice::Error("Invalid or missing token.".to_string()));
            return false;
        };
        if let Err(err) = require(&self.password, "New password") {
            self.notice = Some(Notice::Error(err.to_string()));
            return false;
        }
        if self.password != self.confirm_password {
            self.notice = Some(Notice::Error(
                ValidationError::PasswordMismatch.to_string(),
            ));
            return false;
        }

        self.busy = true;
        let result = api.reset_password(&token, &self.password).await;
        self.busy = false;

        match result {
            Ok(_) => {
                self.password.clear();
                self.confirm_password.clear();
                self.notice = Some(Notice::Success(
                    "Password reset successful! You can now log in.".to_string(),
                ));
                true
            }
            Err(err) => {
                self.notice = Some(Notice::Error(detail_or_generic(&err, GENERIC_FAILURE)));
                false
            }
        }
    }
}
