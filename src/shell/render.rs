use crossterm::style::Stylize;
use serde_json::Value;

use super::{command_help, App, Flash};
use crate::cli_style::{
    self, box_chars, lufs_gauge, print_empty_list, print_error, print_info, print_key_value,
    print_list_item, print_section_footer, print_section_header, print_success, print_warning,
    stars, Palette, TableBuilder,
};
use crate::router::{AuthScreen, NavSelection, View};
use crate::views::auth::{Notice, VerifyStatus};
use crate::views::library::{FileState, LibraryTab};
use crate::views::player::PlayerStatus;
use crate::views::{format_date, format_size, format_time, truncate_id};

const SIDEBAR: [(NavSelection, &str); 3] = [
    (NavSelection::Upload, "Upload"),
    (NavSelection::Library, "Library"),
    (NavSelection::Feedback, "Feedback"),
];

impl App {
    pub fn palette(&self) -> Palette {
        Palette::for_theme(self.theme.theme())
    }

    pub fn prompt(&self) -> String {
        let user = self.session.user();
        cli_style::get_prompt(&self.palette(), user.as_ref().map(|u| u.username.as_str()))
    }

    pub fn print_help(&self) {
        cli_style::print_help(&self.palette(), &command_help());
    }

    pub fn print_welcome(&self) {
        let palette = self.palette();
        cli_style::print_banner(&palette);
        print_key_value(&palette, "Server", self.api.base_url());
        print_key_value(&palette, "Theme", self.theme.root_class());
        print_info(&palette, "Type 'help' for available commands");
        println!();
    }

    /// Draws the chrome and the screen the router resolves to.
    pub fn render(&self) {
        let palette = self.palette();
        let view = self.view();

        self.render_header(&palette, &view);
        match &view {
            View::Loading => print_info(&palette, "Loading..."),
            View::Auth(AuthScreen::Login) => self.render_login(&palette),
            View::Auth(AuthScreen::Register) => self.render_register(&palette),
            View::Upload => self.render_upload(&palette),
            View::Library => self.render_library(&palette),
            View::Feedback => self.render_feedback(&palette),
            View::VerifyEmail { .. } => self.render_verify(&palette),
            View::ForgotPassword => self.render_forgot(&palette),
            View::ResetPassword { token } => self.render_reset(&palette, token.is_some()),
        }
        if matches!(view, View::Upload | View::Library) {
            self.render_player(&palette);
        }

        for flash in &self.flash {
            match flash {
                Flash::Success(m) => print_success(&palette, m),
                Flash::Info(m) => print_info(&palette, m),
                Flash::Error(m) => print_error(&palette, m),
            }
        }
        println!();
    }

    fn render_header(&self, palette: &Palette, view: &View) {
        let user = self
            .session
            .user()
            .map(|u| u.username)
            .unwrap_or_else(|| "not signed in".to_string());
        println!(
            "{}  {}  {}",
            "AudioNorm".with(palette.accent).bold(),
            user.with(palette.dim),
            format!("[{}]", self.theme.root_class()).with(palette.dim)
        );

        if matches!(view, View::Upload | View::Library | View::Feedback) {
            let tabs: Vec<String> = SIDEBAR
                .iter()
                .map(|(selection, label)| {
                    if *selection == self.selection {
                        format!("{} {}", box_chars::BULLET, label)
                            .with(palette.accent)
                            .bold()
                            .to_string()
                    } else {
                        format!("{} {}", box_chars::BULLET_EMPTY, label)
                            .with(palette.dim)
                            .to_string()
                    }
                })
                .collect();
            println!("{}", tabs.join("   "));
        }
    }

    fn render_notice(palette: &Palette, notice: &Option<Notice>) {
        match notice {
            Some(Notice::Success(text)) => print_success(palette, text),
            Some(Notice::Error(text)) => print_error(palette, text),
            None => {}
        }
    }

    fn render_login(&self, palette: &Palette) {
        print_section_header(palette, "Sign in");
        print_list_item(palette, "login <username> <password>", 1);
        print_list_item(palette, "google-login", 1);
        print_list_item(palette, "nav register  |  forgot-password <email>", 1);
        print_section_footer(palette);
        if let Some(error) = &self.login.error {
            print_error(palette, error);
        }
    }

    fn render_register(&self, palette: &Palette) {
        print_section_header(palette, "Create account");
        print_list_item(
            palette,
            "register <username> <email> <password> <confirm-password>",
            1,
        );
        print_list_item(palette, "nav login", 1);
        print_section_footer(palette);
        Self::render_notice(palette, &self.register.notice);
    }

    fn render_verify(&self, palette: &Palette) {
        print_section_header(palette, "Email verification");
        match &self.verify {
            None => print_info(palette, "Verifying your email..."),
            Some(page) => match page.status {
                VerifyStatus::Pending => print_info(palette, &page.message),
                VerifyStatus::Success => print_success(palette, &page.message),
                VerifyStatus::Error => print_error(palette, &page.message),
            },
        }
        print_section_footer(palette);
    }

    fn render_forgot(&self, palette: &Palette) {
        print_section_header(palette, "Forgot password");
        print_list_item(palette, "forgot-password <email>", 1);
        print_section_footer(palette);
        Self::render_notice(palette, &self.forgot.notice);
    }

    fn render_reset(&self, palette: &Palette, has_token: bool) {
        print_section_header(palette, "Reset password");
        if has_token {
            print_list_item(palette, "reset-password <token> <password> <confirm>", 1);
        } else {
            print_error(palette, "Invalid or missing token.");
        }
        print_section_footer(palette);
        Self::render_notice(palette, &self.reset.notice);
    }

    fn render_upload(&self, palette: &Palette) {
        print_section_header(palette, "Upload");
        if self.upload.uploading {
            print_info(palette, "Uploading...");
        }
        if self.upload.selected().is_empty() {
            print_empty_list(palette, "No files selected. Use: upload <files…>");
        } else {
            for path in self.upload.selected() {
                print_list_item(palette, &path.display().to_string(), 1);
            }
        }
        print_section_footer(palette);
        if let Some(message) = &self.upload.message {
            print_success(palette, message);
        }
    }

    fn render_library(&self, palette: &Palette) {
        let library = &self.library;
        let title = match library.tab {
            LibraryTab::Original => "Library · Original",
            LibraryTab::Normalized => "Library · Normalized",
        };
        print_section_header(palette, title);
        if !library.search.is_empty() {
            print_key_value(palette, "Search", &library.search);
        }

        match library.tab {
            LibraryTab::Original => {
                let files = library.filtered_originals();
                if files.is_empty() {
                    print_empty_list(palette, "No uploaded files.");
                } else {
                    let mut table =
                        TableBuilder::new(&["ID", "File", "Length", "Size", "Target", "State"]);
                    for file in files {
                        let state = match library.file_state(&file.id) {
                            FileState::Uploaded => "uploaded",
                            FileState::Normalizing => "normalizing…",
                            FileState::Normalized => "normalized",
                        };
                        table.add_row(vec![
                            file.id.clone(),
                            file.filename.clone(),
                            file.duration.map(format_time).unwrap_or_default(),
                            file.file_size.map(format_size).unwrap_or_default(),
                            format!("{} LUFS", library.target(&file.id)),
                            state.to_string(),
                        ]);
                    }
                    table.print(palette);
                }
            }
            LibraryTab::Normalized => {
                let files = library.filtered_normalized();
                if files.is_empty() {
                    print_empty_list(palette, "No normalized files yet.");
                } else {
                    let mut table =
                        TableBuilder::new(&["ID", "File", "Target", "Measured", "Created", "Blob"]);
                    for file in files {
                        table.add_row(vec![
                            file.id.clone(),
                            file.filename.clone(),
                            format!("{} LUFS", file.target_lufs),
                            file.final_lufs
                                .map(|l| format!("{:.1} LUFS", l))
                                .unwrap_or_default(),
                            file.created_at
                                .as_deref()
                                .map(format_date)
                                .unwrap_or_default(),
                            file.gridfs_id
                                .as_deref()
                                .map(truncate_id)
                                .unwrap_or_default(),
                        ]);
                    }
                    table.print(palette);
                }
            }
        }
        print_key_value(
            palette,
            "Default target",
            &lufs_gauge(self.config.default_target, 25),
        );
        print_section_footer(palette);

        if let Some(message) = &library.message {
            print_success(palette, message);
        }
        if let Some(error) = &library.error {
            print_error(palette, error);
        }
        if let Some(diagnostics) = &self.diagnostics {
            print_section_header(palette, "Diagnostics");
            for (name, value) in [
                ("Status", &diagnostics.status),
                ("History", &diagnostics.history),
                ("Dependencies", &diagnostics.dependencies),
            ] {
                print_key_value(palette, name, &summarize(value.as_ref()));
            }
            print_section_footer(palette);
        }
    }

    fn render_player(&self, palette: &Palette) {
        let Some(player) = &self.player else {
            return;
        };
        print_section_header(palette, "Preview");
        print_key_value(palette, "File", &player.filename);
        match &player.status {
            PlayerStatus::Loading => print_info(palette, "Loading audio..."),
            PlayerStatus::Failed(err) => print_error(palette, &err.to_string()),
            PlayerStatus::Ready(info) => {
                let state = if player.is_playing() { "▶ playing" } else { "❚❚ paused" };
                print_key_value(palette, state, &player.progress_label());
                if let Some(kind) = &info.content_type {
                    print_key_value(palette, "Format", kind);
                }
                print_key_value(palette, "Stream", &player.stream_url(&self.api));
            }
        }
        print_section_footer(palette);
    }

    fn render_feedback(&self, palette: &Palette) {
        let board = &self.feedback;
        print_section_header(palette, "Feedback");
        let form = &board.form;
        print_key_value(
            palette,
            "Your rating",
            &form.rating.map(stars).unwrap_or_else(|| "rate <1-5>".to_string()),
        );
        print_key_value(
            palette,
            "Your comment",
            if form.text.is_empty() {
                "comment <text…>"
            } else {
                form.text.as_str()
            },
        );
        println!();

        if board.items.is_empty() {
            print_empty_list(palette, "No feedback yet.");
        }
        for item in &board.items {
            println!(
                "  {} {}  {}  {}",
                item.id.clone().with(palette.dim),
                item.rating.map(stars).unwrap_or_default().with(palette.warn),
                item.author().with(palette.accent_alt).bold(),
                format_date(&item.created_at).with(palette.dim)
            );
            println!("    {}", item.feedback_text.clone().with(palette.text));
            if board.is_expanded(&item.id) {
                for reply in &item.responses {
                    print_list_item(
                        palette,
                        &format!("{}: {}", reply.author(), reply.response_text),
                        2,
                    );
                }
                if board.reply_target() == Some(item.id.as_str()) {
                    print_info(palette, "Replying...");
                }
            } else if item.response_count > 0 {
                println!(
                    "    {}",
                    format!("{} replies (expand {})", item.response_count, item.id)
                        .with(palette.dim)
                );
            }
        }
        print_section_footer(palette);

        if let Some(notice) = &board.notice {
            print_success(palette, notice);
        }
        if let Some(error) = &board.error {
            print_warning(palette, error);
        }
    }
}

fn summarize(value: Option<&Value>) -> String {
    match value {
        None => "unavailable".to_string(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}={}", k, s),
                Value::Bool(_) | Value::Number(_) => format!("{}={}", k, v),
                Value::Array(items) => format!("{}=[{}]", k, items.len()),
                Value::Object(_) | Value::Null => k.clone(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::Array(items)) => format!("{} entries", items.len()),
        Some(other) => other.to_string(),
    }
}
