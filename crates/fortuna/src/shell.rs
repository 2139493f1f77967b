// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `fortuna shell` command implementation.
//!
//! An interactive loop over the same handlers the one-shot commands use.
//! Auto-save runs for the lifetime of the shell and status transitions are
//! printed as they happen.

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::app::FortuneApp;
use crate::commands;
use crate::format;

const HELP: &str = "\
commands:
  crack, c            crack a cookie
  history [QUERY]     list fortunes, optionally filtered
  fav N               toggle favorite on fortune N
  delete N            delete fortune N
  filter [on|off]     show or set favorites-only history
  fill                refill the queue now
  status              show queue and API status
  online | offline    report host connectivity
  help                this text
  /quit               leave";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Crack,
    History(Option<String>),
    Favorite(usize),
    Delete(usize),
    Filter(Option<bool>),
    Fill,
    Status,
    Connectivity(bool),
    Help,
    Quit,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        let position = || rest.parse::<usize>().ok();

        match head {
            "" | "c" | "crack" => ShellCommand::Crack,
            "h" | "history" => {
                ShellCommand::History((!rest.is_empty()).then(|| rest.to_string()))
            }
            "f" | "fav" | "favorite" => position()
                .map(ShellCommand::Favorite)
                .unwrap_or_else(|| ShellCommand::Unknown(line.to_string())),
            "d" | "del" | "delete" => position()
                .map(ShellCommand::Delete)
                .unwrap_or_else(|| ShellCommand::Unknown(line.to_string())),
            "filter" => match rest {
                "" => ShellCommand::Filter(None),
                "on" => ShellCommand::Filter(Some(true)),
                "off" => ShellCommand::Filter(Some(false)),
                _ => ShellCommand::Unknown(line.to_string()),
            },
            "fill" => ShellCommand::Fill,
            "status" => ShellCommand::Status,
            "online" => ShellCommand::Connectivity(true),
            "offline" => ShellCommand::Connectivity(false),
            "help" | "?" => ShellCommand::Help,
            "/quit" | "/exit" | "quit" | "exit" => ShellCommand::Quit,
            _ => ShellCommand::Unknown(line.to_string()),
        }
    }
}

/// Runs the interactive shell until `/quit`, Ctrl+C or Ctrl+D.
pub async fn run_shell(app: FortuneApp) -> Result<(), ReadlineError> {
    let saver = app.start_auto_save();

    let mut status_rx = app.subscribe_status();
    let status_printer = tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            let status = *status_rx.borrow_and_update();
            eprintln!("{}", format::status_label(status));
        }
    });

    // Warm the queue in the background.
    app.manager().trigger_refill();

    let mut rl = DefaultEditor::new()?;
    println!("{}", "fortuna shell".bold().green());
    println!(
        "Press {} to crack a cookie, {} for commands, {} to exit.\n",
        "Enter".yellow(),
        "help".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "fortuna".green());
    let result = loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = rl.add_history_entry(&line);
                }
                let command = ShellCommand::parse(&line);
                debug!(?command, "shell command");
                if command == ShellCommand::Quit {
                    break Ok(());
                }
                println!("{}\n", execute(&app, command).await);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break Ok(()),
            Err(e) => break Err(e),
        }
    };

    status_printer.abort();
    app.shutdown(saver).await;
    println!(
        "{}",
        format!("{} fortunes served", app.manager().fortune_count()).dimmed()
    );
    result
}

async fn execute(app: &FortuneApp, command: ShellCommand) -> String {
    let outcome = match command {
        ShellCommand::Crack => Ok(commands::crack(app, false).await),
        ShellCommand::History(query) => Ok(commands::history(app, false, query.as_deref())),
        ShellCommand::Favorite(position) => commands::favorite(app, position),
        ShellCommand::Delete(position) => commands::delete(app, position),
        ShellCommand::Filter(enabled) => Ok(commands::filter(app, enabled)),
        ShellCommand::Fill => Ok(commands::fill(app).await),
        ShellCommand::Status => commands::status(app, false),
        ShellCommand::Connectivity(online) => {
            app.set_connectivity(online);
            Ok(String::new())
        }
        ShellCommand::Help => Ok(HELP.to_string()),
        ShellCommand::Quit => Ok(String::new()),
        ShellCommand::Unknown(line) => Ok(format!(
            "{}: unknown command `{line}`, try {}",
            "error".red(),
            "help".yellow()
        )),
    };
    outcome.unwrap_or_else(|e| format!("{}: {e}", "error".red()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_cracks_a_cookie() {
        assert_eq!(ShellCommand::parse(""), ShellCommand::Crack);
        assert_eq!(ShellCommand::parse("  c "), ShellCommand::Crack);
    }

    #[test]
    fn positional_commands_need_a_number() {
        assert_eq!(ShellCommand::parse("fav 3"), ShellCommand::Favorite(3));
        assert_eq!(ShellCommand::parse("delete  12"), ShellCommand::Delete(12));
        assert_eq!(
            ShellCommand::parse("fav x"),
            ShellCommand::Unknown("fav x".into())
        );
    }

    #[test]
    fn history_keeps_the_whole_query() {
        assert_eq!(
            ShellCommand::parse("history plant a tree"),
            ShellCommand::History(Some("plant a tree".into()))
        );
        assert_eq!(ShellCommand::parse("h"), ShellCommand::History(None));
    }

    #[test]
    fn filter_and_connectivity() {
        assert_eq!(ShellCommand::parse("filter on"), ShellCommand::Filter(Some(true)));
        assert_eq!(ShellCommand::parse("filter"), ShellCommand::Filter(None));
        assert_eq!(ShellCommand::parse("offline"), ShellCommand::Connectivity(false));
        assert_eq!(ShellCommand::parse("/quit"), ShellCommand::Quit);
    }
}
