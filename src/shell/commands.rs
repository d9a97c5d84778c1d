use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::api::StreamKind;
use crate::cli_style::{get_styles, CommandHelp};

#[derive(Parser, Debug)]
#[command(
    styles = get_styles(),
    name = "",
    no_binary_name = true,
    disable_help_subcommand = true
)]
pub struct InnerCli {
    #[command(subcommand)]
    pub command: InnerCommand,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PreviewSource {
    Original,
    Normalized,
}

impl From<PreviewSource> for StreamKind {
    fn from(source: PreviewSource) -> Self {
        match source {
            PreviewSource::Original => StreamKind::Original,
            PreviewSource::Normalized => StreamKind::Normalized,
        }
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum InnerCommand {
    /// Signs in with user name and password.
    Login { username: String, password: String },

    /// Creates an account; a verification email follows.
    Register {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
    },

    /// Prints the URL to open for Google sign-in.
    GoogleLogin,

    /// Forgets the stored session token.
    Logout,

    /// Requests a password reset email.
    ForgotPassword { email: String },

    /// Sets a new password with the token from the reset email.
    ResetPassword {
        token: String,
        password: String,
        confirm_password: String,
    },

    /// Confirms an email address with the token from the verification email.
    VerifyEmail { token: String },

    /// Opens a link, e.g. an OAuth redirect or an email link.
    Open { url: String },

    /// Goes back to the main screen.
    Home,

    /// Selects a screen: upload, library, feedback, login or register.
    Nav { screen: String },

    /// Uploads one or more audio files.
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Shows the library, refreshed from the server.
    Library,

    /// Switches the library tab: original or normalized.
    Tab { tab: String },

    /// Sets the loudness target of an uploaded file.
    Target {
        file_id: String,
        #[arg(allow_hyphen_values = true)]
        lufs: String,
    },

    /// Applies a preset (streaming, podcast, broadcast) to an uploaded file.
    Preset { file_id: String, name: String },

    /// Normalizes an uploaded file to its target.
    Normalize { file_id: String },

    /// Downloads a normalized file.
    Export {
        normalized_id: String,
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Downloads every normalized file as one zip.
    ExportAll {
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Deletes an uploaded file.
    DeleteOriginal { file_id: String },

    /// Deletes a normalized file.
    DeleteNormalized { file_id: String },

    /// Filters the library by file name. No argument clears the filter.
    Search { text: Vec<String> },

    /// Opens the preview player on a file.
    Preview {
        #[arg(value_enum)]
        source: PreviewSource,
        file_id: String,
    },

    /// Toggles preview playback.
    Play,

    /// Moves the preview to a position in seconds.
    Seek { seconds: f64 },

    /// Stops the preview and rewinds.
    Stop,

    /// Shows the feedback board.
    Feedback,

    /// Shows only your own feedback.
    MyFeedback,

    /// Sets the star rating of the feedback form.
    Rate { stars: u8 },

    /// Sets the comment of the feedback form.
    Comment {
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Sends the feedback form.
    Submit,

    /// Expands or collapses a feedback thread.
    Expand { feedback_id: String },

    /// Replies to a feedback item.
    Reply {
        feedback_id: String,
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Shows backend status, history and dependencies.
    Status,

    /// Toggles the theme, or sets it to light or dark.
    Theme { name: Option<String> },

    /// Shows the signed in user.
    Whoami,

    /// Lists commands.
    Help,

    /// Closes this program.
    Exit,
}

pub fn command_help() -> Vec<CommandHelp> {
    fn cmd(
        group: &'static str,
        name: &'static str,
        args: &'static str,
        description: &'static str,
    ) -> CommandHelp {
        CommandHelp {
            group,
            name,
            args,
            description,
        }
    }

    vec![
        cmd("Account", "login", "<user> <password>", "Sign in"),
        cmd("Account", "register", "<user> <email> <pw> <pw>", "Create an account"),
        cmd("Account", "google-login", "", "Sign in with Google"),
        cmd("Account", "logout", "", "Sign out"),
        cmd("Account", "forgot-password", "<email>", "Request a reset link"),
        cmd("Account", "reset-password", "<token> <pw> <pw>", "Set a new password"),
        cmd("Account", "verify-email", "<token>", "Confirm your email"),
        cmd("Account", "whoami", "", "Show the signed in user"),
        cmd("Audio", "upload", "<files…>", "Upload audio files"),
        cmd("Audio", "library", "", "Show your files"),
        cmd("Audio", "tab", "<original|normalized>", "Switch library tab"),
        cmd("Audio", "search", "[text]", "Filter by file name"),
        cmd("Audio", "target", "<id> <lufs>", "Set a target (-30 to -6)"),
        cmd("Audio", "preset", "<id> <name>", "streaming, podcast or broadcast"),
        cmd("Audio", "normalize", "<id>", "Normalize to the target"),
        cmd("Audio", "export", "<id> [--dir]", "Download a normalized file"),
        cmd("Audio", "export-all", "[--dir]", "Download everything as a zip"),
        cmd("Audio", "delete-original", "<id>", "Delete an upload"),
        cmd("Audio", "delete-normalized", "<id>", "Delete a normalized file"),
        cmd("Audio", "status", "", "Backend diagnostics"),
        cmd("Preview", "preview", "<original|normalized> <id>", "Open the player"),
        cmd("Preview", "play", "", "Play or pause"),
        cmd("Preview", "seek", "<seconds>", "Jump to a position"),
        cmd("Preview", "stop", "", "Stop and rewind"),
        cmd("Feedback", "feedback", "", "Show the board"),
        cmd("Feedback", "my-feedback", "", "Show your own feedback"),
        cmd("Feedback", "rate", "<1-5>", "Set your rating"),
        cmd("Feedback", "comment", "<text…>", "Set your comment"),
        cmd("Feedback", "submit", "", "Send your feedback"),
        cmd("Feedback", "expand", "<id>", "Show or hide replies"),
        cmd("Feedback", "reply", "<id> <text…>", "Reply to feedback"),
        cmd("System", "nav", "<screen>", "Select a screen"),
        cmd("System", "open", "<url>", "Open a link"),
        cmd("System", "home", "", "Back to the main screen"),
        cmd("System", "theme", "[light|dark]", "Toggle or set the theme"),
        cmd("System", "help", "", "Show this list"),
        cmd("System", "exit", "", "Close this program"),
    ]
}
