use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Color as CtColor, Stylize};
use unicode_width::UnicodeWidthStr;

use crate::lufs::{LufsTarget, MAX_TARGET_LUFS, MIN_TARGET_LUFS};
use crate::theme::Theme;

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    let heading = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Blue)));
    Styles::styled()
        .usage(heading)
        .header(heading)
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Palette
// ═══════════════════════════════════════════════════════════════════════════════

/// Terminal colors for one presentation theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub accent: CtColor,
    pub accent_alt: CtColor,
    pub text: CtColor,
    pub dim: CtColor,
    pub ok: CtColor,
    pub warn: CtColor,
    pub err: CtColor,
}

const fn rgb(r: u8, g: u8, b: u8) -> CtColor {
    CtColor::Rgb { r, g, b }
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        accent: rgb(37, 99, 235),
        accent_alt: rgb(124, 58, 237),
        text: rgb(30, 41, 59),
        dim: rgb(100, 116, 139),
        ok: rgb(22, 163, 74),
        warn: rgb(217, 119, 6),
        err: rgb(220, 38, 38),
    };

    pub const DARK: Palette = Palette {
        accent: rgb(96, 165, 250),
        accent_alt: rgb(192, 132, 252),
        text: rgb(241, 245, 249),
        dim: rgb(148, 163, 184),
        ok: rgb(74, 222, 128),
        warn: rgb(251, 191, 36),
        err: rgb(248, 113, 113),
    };

    pub fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Light => Palette::LIGHT,
            Theme::Dark => Palette::DARK,
        }
    }
}

pub mod box_chars {
    pub const ROUND_TOP_LEFT: &str = "╭";
    pub const ROUND_TOP_RIGHT: &str = "╮";
    pub const ROUND_BOTTOM_LEFT: &str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &str = "╯";
    pub const HORIZONTAL: &str = "─";
    pub const VERTICAL: &str = "│";
    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";

    pub const ARROW_RIGHT: &str = "▶";
    pub const BULLET: &str = "●";
    pub const BULLET_EMPTY: &str = "○";
    pub const DIAMOND: &str = "◆";
    pub const STAR: &str = "★";
    pub const STAR_EMPTY: &str = "☆";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

// ═══════════════════════════════════════════════════════════════════════════════
// Banner
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_banner(palette: &Palette) {
    let banner = r#"
     _             _ _       _   _
    / \  _   _  __| (_) ___ | \ | | ___  _ __ _ __ ___
   / _ \| | | |/ _` | |/ _ \|  \| |/ _ \| '__| '_ ` _ \
  / ___ \ |_| | (_| | | (_) | |\  | (_) | |  | | | | | |
 /_/   \_\__,_|\__,_|_|\___/|_| \_|\___/|_|  |_| |_| |_|
"#;
    for (i, line) in banner.lines().enumerate() {
        let color = if i < 3 { palette.accent } else { palette.accent_alt };
        println!("{}", line.with(color).bold());
    }
    println!(
        "{}",
        format!("  loudness normalization client  v{}", env!("APP_VERSION")).with(palette.dim)
    );
    println!();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status Indicators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(palette: &Palette, message: &str) {
    println!(
        " {} {}",
        box_chars::CHECK.with(palette.ok).bold(),
        message.with(palette.ok)
    );
}

pub fn print_error(palette: &Palette, message: &str) {
    println!(
        " {} {}",
        box_chars::CROSS_MARK.with(palette.err).bold(),
        message.with(palette.err)
    );
}

pub fn print_warning(palette: &Palette, message: &str) {
    println!(
        " {} {}",
        "⚠".with(palette.warn).bold(),
        message.with(palette.warn)
    );
}

pub fn print_info(palette: &Palette, message: &str) {
    println!(
        " {} {}",
        "ℹ".with(palette.accent).bold(),
        message.with(palette.text)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════════════════════════

const SECTION_WIDTH: usize = 60;

pub fn print_section_header(palette: &Palette, title: &str) {
    let title_len = title.width();
    let padding = SECTION_WIDTH.saturating_sub(title_len + 4) / 2;
    let rest = SECTION_WIDTH.saturating_sub(title_len + 4 + padding);

    println!();
    println!(
        "{}{} {} {}{}",
        box_chars::ROUND_TOP_LEFT.with(palette.accent),
        box_chars::HORIZONTAL.repeat(padding).with(palette.accent),
        title.with(palette.accent).bold().attribute(Attribute::Italic),
        box_chars::HORIZONTAL.repeat(rest).with(palette.accent),
        box_chars::ROUND_TOP_RIGHT.with(palette.accent)
    );
}

pub fn print_section_footer(palette: &Palette) {
    println!(
        "{}{}{}",
        box_chars::ROUND_BOTTOM_LEFT.with(palette.accent),
        box_chars::HORIZONTAL.repeat(SECTION_WIDTH).with(palette.accent),
        box_chars::ROUND_BOTTOM_RIGHT.with(palette.accent)
    );
    println!();
}

pub fn print_key_value(palette: &Palette, key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(palette.accent_alt),
        format!("{}:", key).with(palette.dim),
        value.with(palette.text)
    );
}

pub fn print_list_item(palette: &Palette, item: &str, indent: usize) {
    println!(
        "{}{}  {}",
        "  ".repeat(indent),
        box_chars::ARROW_RIGHT.with(palette.accent),
        item.with(palette.text)
    );
}

pub fn print_empty_list(palette: &Palette, message: &str) {
    println!(
        "  {} {}",
        box_chars::BULLET_EMPTY.with(palette.dim),
        message.with(palette.dim).attribute(Attribute::Italic)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Domain widgets
// ═══════════════════════════════════════════════════════════════════════════════

/// `★★★☆☆` for a 1-5 rating.
pub fn stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!(
        "{}{}",
        box_chars::STAR.repeat(filled),
        box_chars::STAR_EMPTY.repeat(5 - filled)
    )
}

/// Plain text gauge of a target inside the allowed LUFS range, e.g.
/// `-30 [──────●─────────] -6`.
pub fn lufs_gauge(target: LufsTarget, width: usize) -> String {
    let width = width.max(2);
    let span = MAX_TARGET_LUFS - MIN_TARGET_LUFS;
    let ratio = (target.value() - MIN_TARGET_LUFS) / span;
    let marker = (ratio * (width - 1) as f64).round() as usize;
    let track: String = (0..width)
        .map(|i| {
            if i == marker {
                box_chars::BULLET
            } else {
                box_chars::HORIZONTAL
            }
        })
        .collect();
    format!("{} [{}] {}", MIN_TARGET_LUFS, track, MAX_TARGET_LUFS)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tables
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl TableBuilder {
    pub fn new(headers: &[&str]) -> Self {
        TableBuilder {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            col_widths: headers.iter().map(|h| h.width()).collect(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = self.col_widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn border(&self, palette: &Palette, left: &str, join: &str, right: &str) -> String {
        let inner = self
            .col_widths
            .iter()
            .map(|w| box_chars::HORIZONTAL.repeat(w + 2))
            .collect::<Vec<_>>()
            .join(join);
        format!("{}{}{}", left, inner, right)
            .with(palette.accent)
            .to_string()
    }

    fn line(&self, palette: &Palette, cells: &[String], header: bool) -> String {
        let bar = box_chars::VERTICAL.with(palette.accent).to_string();
        let mut out = bar.clone();
        for (i, width) in self.col_widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let padding = " ".repeat(width.saturating_sub(cell.width()));
            let styled = if header {
                cell.with(palette.accent).bold().to_string()
            } else {
                cell.with(palette.text).to_string()
            };
            out.push_str(&format!(" {}{} ", styled, padding));
            out.push_str(&bar);
        }
        out
    }

    pub fn render(&self, palette: &Palette) -> String {
        let mut lines = vec![
            self.border(
                palette,
                box_chars::ROUND_TOP_LEFT,
                box_chars::T_TOP,
                box_chars::ROUND_TOP_RIGHT,
            ),
            self.line(palette, &self.headers, true),
            self.border(palette, box_chars::T_LEFT, box_chars::CROSS, box_chars::T_RIGHT),
        ];
        lines.extend(self.rows.iter().map(|row| self.line(palette, row, false)));
        lines.push(self.border(
            palette,
            box_chars::ROUND_BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::ROUND_BOTTOM_RIGHT,
        ));
        lines.join("\n")
    }

    pub fn print(&self, palette: &Palette) {
        println!("{}", self.render(palette));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Prompt & help
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_prompt(palette: &Palette, username: Option<&str>) -> String {
    let who = username.unwrap_or("guest");
    format!(
        "{}{} ",
        who.with(palette.accent_alt),
        "❯".with(palette.accent).bold()
    )
}

pub struct CommandHelp {
    pub group: &'static str,
    pub name: &'static str,
    pub args: &'static str,
    pub description: &'static str,
}

pub fn print_help(palette: &Palette, commands: &[CommandHelp]) {
    print_section_header(palette, "Available Commands");
    let mut groups: Vec<&str> = Vec::new();
    for cmd in commands {
        if !groups.contains(&cmd.group) {
            groups.push(cmd.group);
        }
    }
    for group in groups {
        println!(
            "  {} {}",
            box_chars::DIAMOND.with(palette.accent_alt),
            group.with(palette.accent_alt).bold()
        );
        for cmd in commands.iter().filter(|c| c.group == group) {
            println!(
                "      {} {}  {}",
                cmd.name.with(palette.ok).bold(),
                cmd.args.with(palette.dim),
                cmd.description.with(palette.text)
            );
        }
        println!();
    }
    print_section_footer(palette);
}

pub fn print_goodbye(palette: &Palette) {
    println!();
    println!("  {}", "Goodbye!".with(palette.accent_alt).bold());
    println!();
}
