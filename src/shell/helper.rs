use clap::CommandFactory;
use rustyline::{
    completion::Completer, highlight::Highlighter, validate::Validator, Context, Helper,
};

use super::commands::InnerCli;

/// Completes command names, plus the fixed values a few commands take.
#[derive(rustyline_derive::Hinter)]
pub struct ShellHelper {
    command_names: Vec<String>,
}

impl ShellHelper {
    pub fn new() -> Self {
        let command_names = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();
        ShellHelper { command_names }
    }

    fn argument_values(command: &str) -> &'static [&'static str] {
        match command {
            "nav" => &["upload", "library", "feedback", "login", "register"],
            "tab" => &["original", "normalized"],
            "theme" => &["light", "dark"],
            "preview" => &["original", "normalized"],
            _ => &[],
        }
    }
}

impl Default for ShellHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let line = &line[..pos];
        match line.split_once(' ') {
            None => {
                let matches = self
                    .command_names
                    .iter()
                    .filter(|c| c.starts_with(line))
                    .cloned()
                    .collect();
                Ok((0, matches))
            }
            Some((command, rest)) if !rest.contains(' ') => {
                let matches = Self::argument_values(command)
                    .iter()
                    .filter(|v| v.starts_with(rest))
                    .map(|v| v.to_string())
                    .collect();
                Ok((command.len() + 1, matches))
            }
            Some(_) => Ok((pos, Vec::new())),
        }
    }
}

impl Highlighter for ShellHelper {}
impl Validator for ShellHelper {}
impl Helper for ShellHelper {}
