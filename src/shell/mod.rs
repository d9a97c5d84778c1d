//! Interactive front end: parses command lines, drives the views and renders
//! the resolved screen after every command.

mod commands;
mod helper;
mod render;

pub use commands::{command_help, InnerCli, InnerCommand, PreviewSource};
pub use helper::ShellHelper;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::api::{ApiClient, ApiResult};
use crate::config::AppConfig;
use crate::router::{self, NavSelection, Route, View};
use crate::session::SessionStore;
use crate::storage::ClientStorage;
use crate::theme::{Theme, ThemeStore};
use crate::views::auth::{
    ForgotPasswordForm, LoginForm, Notice, RegisterForm, ResetPasswordForm, VerifyEmailPage,
};
use crate::views::feedback::FeedbackBoard;
use crate::views::library::{Diagnostics, LibraryTab, LibraryView};
use crate::views::player::PreviewPlayer;
use crate::views::upload::UploadView;

#[derive(Debug, Clone, PartialEq)]
pub enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

/// Output of a command that is not part of any screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Flash {
    Success(String),
    Info(String),
    Error(String),
}

pub struct App {
    config: AppConfig,
    api: ApiClient,
    session: SessionStore,
    theme: ThemeStore,
    route: Route,
    selection: NavSelection,
    pub login: LoginForm,
    pub register: RegisterForm,
    pub forgot: ForgotPasswordForm,
    pub reset: ResetPasswordForm,
    pub verify: Option<VerifyEmailPage>,
    pub upload: UploadView,
    pub library: LibraryView,
    pub feedback: FeedbackBoard,
    pub player: Option<PreviewPlayer>,
    pub diagnostics: Option<Diagnostics>,
    flash: Vec<Flash>,
    clock: Instant,
}

impl App {
    pub fn new(config: AppConfig, storage: Arc<dyn ClientStorage>) -> ApiResult<Self> {
        let api = ApiClient::new(config.api_url.clone(), storage.clone())?;
        let session = SessionStore::new(api.clone(), storage.clone());
        let theme = ThemeStore::new(storage, config.default_theme);
        let library = LibraryView::new(config.default_target);
        Ok(Self {
            config,
            api,
            session,
            theme,
            route: Route::Home,
            selection: NavSelection::default(),
            login: LoginForm::default(),
            register: RegisterForm::default(),
            forgot: ForgotPasswordForm::default(),
            reset: ResetPasswordForm::default(),
            verify: None,
            upload: UploadView::new(),
            library,
            feedback: FeedbackBoard::new(),
            player: None,
            diagnostics: None,
            flash: Vec::new(),
            clock: Instant::now(),
        })
    }

    /// Restores the session and, when started from a link, opens it.
    pub async fn start(&mut self, location: Option<&str>) {
        self.session.initialize().await;
        if let Some(location) = location {
            self.open(location).await;
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn theme(&self) -> &ThemeStore {
        &self.theme
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn view(&self) -> View {
        router::resolve(&self.route, &self.session.snapshot(), self.selection)
    }

    /// Messages produced by the last command.
    pub fn flash(&self) -> &[Flash] {
        &self.flash
    }

    fn export_dir(&self, dir: Option<PathBuf>) -> PathBuf {
        dir.unwrap_or_else(|| self.config.export_dir.clone())
    }

    /// Handles a link. On the home route a `token` parameter is an OAuth
    /// redirect and is captured first; email links keep theirs.
    pub async fn open(&mut self, location: &str) {
        self.route = match Route::parse(location) {
            Route::Home => {
                let scrubbed = self.session.capture_oauth_redirect(location).await;
                Route::parse(&scrubbed)
            }
            route => route,
        };
        debug!("Opened {:?}", self.route);
        match &self.route {
            Route::VerifyEmail { token } => {
                let mut page = VerifyEmailPage::new(token.clone());
                page.run(&self.api).await;
                self.verify = Some(page);
            }
            Route::ResetPassword { token } => {
                self.reset = ResetPasswordForm::new(token.clone());
            }
            Route::ForgotPassword | Route::Home => {}
        }
    }

    /// Selects a screen and loads what it shows.
    pub async fn navigate(&mut self, selection: NavSelection) {
        self.route = Route::Home;
        self.selection = selection;
        if !self.session.is_logged_in() {
            return;
        }
        match selection {
            NavSelection::Library => {
                self.library.load(&self.api).await;
            }
            NavSelection::Feedback => {
                self.feedback.load(&self.api).await;
            }
            NavSelection::Upload | NavSelection::Login | NavSelection::Register => {}
        }
    }

    fn require_login(&self) -> Result<(), String> {
        if self.session.is_logged_in() {
            Ok(())
        } else {
            Err("Please log in first.".to_string())
        }
    }

    fn notice_flash(notice: &Option<Notice>) -> Option<Flash> {
        notice.as_ref().map(|n| match n {
            Notice::Success(text) => Flash::Success(text.clone()),
            Notice::Error(text) => Flash::Error(text.clone()),
        })
    }

    fn tick_player(&mut self) {
        let elapsed = self.clock.elapsed();
        self.clock = Instant::now();
        if let Some(player) = self.player.as_mut() {
            player.advance(elapsed);
        }
    }

    /// Parses and runs one command line.
    pub async fn execute_line(&mut self, line: &str) -> CommandExecutionResult {
        self.flash.clear();
        let line = line.trim();
        if line.is_empty() {
            return CommandExecutionResult::Ok;
        }
        let args = shlex::split(line)
            .unwrap_or_else(|| line.split_whitespace().map(String::from).collect());
        match InnerCli::try_parse_from(args) {
            Ok(cli) => self.execute(cli.command).await,
            Err(err) => CommandExecutionResult::Error(err.to_string()),
        }
    }

    pub async fn execute(&mut self, command: InnerCommand) -> CommandExecutionResult {
        self.flash.clear();
        self.tick_player();
        match self.dispatch(command).await {
            Ok(true) => CommandExecutionResult::Exit,
            Ok(false) => CommandExecutionResult::Ok,
            Err(message) => {
                self.flash.push(Flash::Error(message.clone()));
                CommandExecutionResult::Error(message)
            }
        }
    }

    /// Returns `Ok(true)` when the shell should exit.
    async fn dispatch(&mut self, command: InnerCommand) -> Result<bool, String> {
        match command {
            InnerCommand::Login { username, password } => {
                self.login.username = username;
                self.login.password = password;
                match self.login.submit(&self.session).await {
                    Some(user) => {
                        self.flash
                            .push(Flash::Success(format!("Welcome, {}!", user.username)));
                        self.navigate(NavSelection::Upload).await;
                    }
                    None => {
                        return Err(self.login.error.clone().unwrap_or_default());
                    }
                }
            }
            InnerCommand::Register {
                username,
                email,
                password,
                confirm_password,
            } => {
                self.selection = NavSelection::Register;
                self.register.username = username;
                self.register.email = email;
                self.register.password = password;
                self.register.confirm_password = confirm_password;
                self.register.submit(&self.api).await;
                self.flash.extend(Self::notice_flash(&self.register.notice));
            }
            InnerCommand::GoogleLogin => {
                self.flash.push(Flash::Info(format!(
                    "Open {} in a browser, then paste the address you land on with `open <url>`.",
                    self.api.google_login_url()
                )));
            }
            InnerCommand::Logout => {
                self.session.logout();
                self.player = None;
                self.library = LibraryView::new(self.config.default_target);
                self.upload = UploadView::new();
                self.feedback = FeedbackBoard::new();
                self.diagnostics = None;
                self.selection = NavSelection::Login;
                self.flash.push(Flash::Info("Logged out.".to_string()));
            }
            InnerCommand::ForgotPassword { email } => {
                self.route = Route::ForgotPassword;
                self.forgot.email = email;
                self.forgot.submit(&self.api).await;
                self.flash.extend(Self::notice_flash(&self.forgot.notice));
            }
            InnerCommand::ResetPassword {
                token,
                password,
                confirm_password,
            } => {
                self.route = Route::ResetPassword {
                    token: Some(token.clone()),
                };
                self.reset = ResetPasswordForm::new(Some(token));
                self.reset.password = password;
                self.reset.confirm_password = confirm_password;
                self.reset.submit(&self.api).await;
                self.flash.extend(Self::notice_flash(&self.reset.notice));
            }
            InnerCommand::VerifyEmail { token } => {
                self.open(&format!("/verify-email?token={}", urlencoding::encode(&token)))
                    .await;
            }
            InnerCommand::Open { url } => self.open(&url).await,
            InnerCommand::Home => self.route = Route::Home,
            InnerCommand::Nav { screen } => {
                let selection = NavSelection::parse(&screen)
                    .ok_or_else(|| format!("Unknown screen '{}'.", screen))?;
                self.navigate(selection).await;
            }
            InnerCommand::Upload { paths } => {
                self.require_login()?;
                self.navigate(NavSelection::Upload).await;
                self.upload.select(paths);
                if self.upload.selected().is_empty() {
                    return Err(self.upload.error.clone().unwrap_or_default());
                }
                let results = self.upload.upload_all(&self.api).await;
                info!("Upload batch finished with {} file(s) sent", results.len());
                if let Some(error) = self.upload.error.clone() {
                    return Err(error);
                }
            }
            InnerCommand::Library => {
                self.require_login()?;
                self.navigate(NavSelection::Library).await;
            }
            InnerCommand::Tab { tab } => {
                self.library.tab =
                    LibraryTab::parse(&tab).ok_or_else(|| format!("Unknown tab '{}'.", tab))?;
                self.selection = NavSelection::Library;
            }
            InnerCommand::Target { file_id, lufs } => {
                self.library
                    .set_target_str(&file_id, &lufs)
                    .map_err(|e| e.to_string())?;
            }
            InnerCommand::Preset { file_id, name } => {
                self.library
                    .apply_preset(&file_id, &name)
                    .map_err(|e| e.to_string())?;
            }
            InnerCommand::Normalize { file_id } => {
                self.require_login()?;
                self.selection = NavSelection::Library;
                if self.library.normalize(&self.api, &file_id).await.is_none() {
                    return Err(self.library.error.clone().unwrap_or_default());
                }
            }
            InnerCommand::Export { normalized_id, dir } => {
                self.require_login()?;
                let dir = self.export_dir(dir);
                if self.library.normalized.is_empty() {
                    self.library.load(&self.api).await;
                }
                match self.library.export(&self.api, &normalized_id, &dir).await {
                    Some(path) => self
                        .flash
                        .push(Flash::Success(format!("Saved {}", path.display()))),
                    None => return Err(self.library.error.clone().unwrap_or_default()),
                }
            }
            InnerCommand::ExportAll { dir } => {
                self.require_login()?;
                let dir = self.export_dir(dir);
                match self.library.export_all(&self.api, &dir).await {
                    Some(path) => self
                        .flash
                        .push(Flash::Success(format!("Saved {}", path.display()))),
                    None => return Err(self.library.error.clone().unwrap_or_default()),
                }
            }
            InnerCommand::DeleteOriginal { file_id } => {
                self.require_login()?;
                if !self.library.delete_original(&self.api, &file_id).await {
                    return Err(self.library.error.clone().unwrap_or_default());
                }
            }
            InnerCommand::DeleteNormalized { file_id } => {
                self.require_login()?;
                if !self.library.delete_normalized(&self.api, &file_id).await {
                    return Err(self.library.error.clone().unwrap_or_default());
                }
            }
            InnerCommand::Search { text } => {
                self.library.search = text.join(" ");
                self.selection = NavSelection::Library;
            }
            InnerCommand::Preview { source, file_id } => {
                self.require_login()?;
                let (filename, duration) = match source {
                    PreviewSource::Original => self
                        .library
                        .originals
                        .iter()
                        .find(|f| f.id == file_id)
                        .map(|f| (f.filename.clone(), f.duration))
                        .unwrap_or_else(|| (file_id.clone(), None)),
                    PreviewSource::Normalized => self
                        .library
                        .find_normalized(&file_id)
                        .map(|f| {
                            let duration = f
                                .source_file_id
                                .as_deref()
                                .and_then(|source| {
                                    self.library.originals.iter().find(|o| o.id == source)
                                })
                                .and_then(|o| o.duration);
                            (f.filename.clone(), duration)
                        })
                        .unwrap_or_else(|| (file_id.clone(), None)),
                };
                let mut player = PreviewPlayer::new(source.into(), file_id, filename, duration);
                let loaded = player.load(&self.api).await;
                self.player = Some(player);
                loaded.map_err(|e| e.to_string())?;
            }
            InnerCommand::Play => {
                let player = self.player.as_mut().ok_or("No preview is open.")?;
                if player.error().is_some() {
                    return Err("Failed to load audio file".to_string());
                }
                player.toggle_play();
            }
            InnerCommand::Seek { seconds } => {
                self.player
                    .as_mut()
                    .ok_or("No preview is open.")?
                    .seek(seconds);
            }
            InnerCommand::Stop => {
                self.player.as_mut().ok_or("No preview is open.")?.reset();
            }
            InnerCommand::Feedback => self.navigate(NavSelection::Feedback).await,
            InnerCommand::MyFeedback => {
                self.require_login()?;
                self.selection = NavSelection::Feedback;
                if !self.feedback.load_mine(&self.api).await {
                    return Err(self.feedback.error.clone().unwrap_or_default());
                }
            }
            InnerCommand::Rate { stars } => self.feedback.form.rating = Some(stars),
            InnerCommand::Comment { text } => self.feedback.form.text = text.join(" "),
            InnerCommand::Submit => {
                self.require_login()?;
                self.selection = NavSelection::Feedback;
                if !self.feedback.submit(&self.api).await {
                    return Err(self.feedback.error.clone().unwrap_or_default());
                }
                if let Some(notice) = self.feedback.notice.clone() {
                    self.flash.push(Flash::Success(notice));
                }
            }
            InnerCommand::Expand { feedback_id } => {
                self.selection = NavSelection::Feedback;
                self.feedback.toggle_expand(&self.api, &feedback_id).await;
                if let Some(error) = self.feedback.error.clone() {
                    return Err(error);
                }
            }
            InnerCommand::Reply { feedback_id, text } => {
                self.require_login()?;
                self.selection = NavSelection::Feedback;
                self.feedback.open_reply(&feedback_id);
                self.feedback.set_draft(&feedback_id, &text.join(" "));
                if !self.feedback.submit_reply(&self.api).await {
                    return Err(self.feedback.error.clone().unwrap_or_default());
                }
            }
            InnerCommand::Status => {
                self.require_login()?;
                self.diagnostics = Some(self.library.diagnostics(&self.api).await);
            }
            InnerCommand::Theme { name } => {
                let theme = match name {
                    Some(name) => self.theme.set(name.parse::<Theme>()?),
                    None => self.theme.toggle(),
                };
                self.flash.push(Flash::Info(format!("Theme: {}", theme)));
            }
            InnerCommand::Whoami => match self.session.user() {
                Some(user) => self
                    .flash
                    .push(Flash::Info(format!("{} <{}>", user.username, user.email))),
                None => self.flash.push(Flash::Info("Not logged in.".to_string())),
            },
            InnerCommand::Help => self.print_help(),
            InnerCommand::Exit => return Ok(true),
        }
        Ok(false)
    }
}
