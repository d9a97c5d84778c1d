//! Maps locations and the in-memory navigation selection to the view to render.

use crate::session::{take_query_param, SessionState};

/// A location the client was opened at (deep links from emails, OAuth).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    VerifyEmail { token: Option<String> },
    ForgotPassword,
    ResetPassword { token: Option<String> },
}

impl Route {
    /// Parses a path with an optional query string, e.g.
    /// `/reset-password?token=abc`. A full URL is accepted too.
    pub fn parse(location: &str) -> Self {
        let path_and_query = strip_origin(location);
        let (_, token) = take_query_param(path_and_query, "token");
        let path = path_and_query
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');

        match path {
            "/verify-email" | "/verify/verify-email" => Route::VerifyEmail { token },
            "/forgot-password" => Route::ForgotPassword,
            "/reset-password" => Route::ResetPassword { token },
            _ => Route::Home,
        }
    }
}

/// Drops `scheme://host` when the location starts with one. A `://` inside
/// the path or query is left alone.
fn strip_origin(location: &str) -> &str {
    match location.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !scheme.contains(['/', '?', '#']) => {
            rest.find(['/', '?', '#']).map(|i| &rest[i..]).unwrap_or("/")
        }
        _ => location,
    }
}

/// Sidebar / auth-screen selection held in memory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NavSelection {
    #[default]
    Upload,
    Library,
    Feedback,
    Login,
    Register,
}

impl NavSelection {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "upload" => Some(NavSelection::Upload),
            "library" => Some(NavSelection::Library),
            "feedback" => Some(NavSelection::Feedback),
            "login" => Some(NavSelection::Login),
            "register" => Some(NavSelection::Register),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScreen {
    Login,
    Register,
}

/// The screen to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Loading,
    Auth(AuthScreen),
    Upload,
    Library,
    Feedback,
    VerifyEmail { token: Option<String> },
    ForgotPassword,
    ResetPassword { token: Option<String> },
}

/// Token pages are reachable without a session. Everything else waits for
/// the session to load, then shows auth screens or the selected feature.
pub fn resolve(route: &Route, session: &SessionState, selection: NavSelection) -> View {
    match route {
        Route::VerifyEmail { token } => View::VerifyEmail {
            token: token.clone(),
        },
        Route::ForgotPassword => View::ForgotPassword,
        Route::ResetPassword { token } => View::ResetPassword {
            token: token.clone(),
        },
        Route::Home if session.is_loading() => View::Loading,
        Route::Home if !session.is_logged_in() => match selection {
            NavSelection::Register => View::Auth(AuthScreen::Register),
            NavSelection::Login
            | NavSelection::Upload
            | NavSelection::Library
            | NavSelection::Feedback => View::Auth(AuthScreen::Login),
        },
        Route::Home => match selection {
            NavSelection::Upload | NavSelection::Login | NavSelection::Register => View::Upload,
            NavSelection::Library => View::Library,
            NavSelection::Feedback => View::Feedback,
        },
    }
}
