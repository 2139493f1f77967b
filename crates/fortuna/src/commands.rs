// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot command implementations.
//!
//! Each command returns the text to print so it can be checked in tests;
//! `main` writes it to stdout. History positions are 1-based on the command
//! line and converted to 0-based indices here.

use colored::Colorize;
use fortuna_core::{Clock, SystemClock};
use thiserror::Error;

use crate::app::FortuneApp;
use crate::format;

/// Errors reported back to the command line user.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("history positions start at 1")]
    InvalidPosition,

    #[error("no fortune at position {0}")]
    NoSuchEntry(usize),

    #[error("failed to serialize status: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `crack`: serve one fortune, optionally waiting for the refill it starts.
pub async fn crack(app: &FortuneApp, wait: bool) -> String {
    let fortune = app.handle_cookie_click();
    if wait {
        app.manager().wait_for_background().await;
    }
    format::fortune(&fortune)
}

/// `fill`: refill the queue to capacity.
pub async fn fill(app: &FortuneApp) -> String {
    let before = app.manager().queue_len();
    match app.initialize().await {
        Some(report) => format!(
            "queue {} -> {} ({} added in {} attempts)",
            before,
            app.manager().queue_len(),
            report.added,
            report.attempts
        ),
        None => "a refill is already running".yellow().to_string(),
    }
}

/// `history`: list entries, newest first.
pub fn history(app: &FortuneApp, favorites: bool, search: Option<&str>) -> String {
    let query = search.unwrap_or("");
    let favorites_only = favorites || app.favorites_only();
    let matches = app.manager().filter_history(query, favorites_only);

    if matches.is_empty() {
        let reason = if !query.trim().is_empty() {
            format!("no fortunes match \"{}\"", query.trim())
        } else if favorites_only {
            "no favorite fortunes yet".to_string()
        } else {
            "no fortunes yet, crack a cookie first".to_string()
        };
        return reason.dimmed().to_string();
    }

    let now = SystemClock::new().now_ms();
    let rows: Vec<String> = matches
        .iter()
        .map(|m| format::history_row(m.index + 1, &m.entry, now))
        .collect();
    format!(
        "{}\n{}",
        rows.join("\n"),
        format!(
            "{} of {} fortunes, {} served in total",
            matches.len(),
            app.history().len(),
            app.manager().fortune_count()
        )
        .dimmed()
    )
}

/// `favorite <N>`: toggle the favorite flag.
pub fn favorite(app: &FortuneApp, position: usize) -> Result<String, CommandError> {
    let index = to_index(position)?;
    match app.handle_toggle_favorite(index) {
        Some(true) => Ok(format!("fortune {position} added to favorites")),
        Some(false) => Ok(format!("fortune {position} removed from favorites")),
        None => Err(no_such_entry(position)),
    }
}

/// `delete <N>`: remove a history entry.
pub fn delete(app: &FortuneApp, position: usize) -> Result<String, CommandError> {
    let index = to_index(position)?;
    if app.handle_delete(index) {
        Ok(format!(
            "fortune {position} deleted, {} served in total",
            app.manager().fortune_count()
        ))
    } else {
        Err(no_such_entry(position))
    }
}

/// `filter [on|off]`: show or set the favorites-only preference.
pub fn filter(app: &FortuneApp, enabled: Option<bool>) -> String {
    if let Some(enabled) = enabled {
        app.set_favorites_only(enabled);
    }
    if app.favorites_only() {
        "history shows favorites only".to_string()
    } else {
        "history shows all fortunes".to_string()
    }
}

/// `status`: human or JSON status report.
pub fn status(app: &FortuneApp, json: bool) -> Result<String, CommandError> {
    let report = app.status_report();
    if json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(format::status_report(&report))
    }
}

fn to_index(position: usize) -> Result<usize, CommandError> {
    position.checked_sub(1).ok_or(CommandError::InvalidPosition)
}

fn no_such_entry(position: usize) -> CommandError {
    CommandError::NoSuchEntry(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fortuna_config::FortunaConfig;
    use fortuna_storage::{KeyValueStore, MemoryBackend};
    use fortuna_test_utils::MockAdviceSource;

    fn app() -> FortuneApp {
        colored::control::set_override(false);
        FortuneApp::new(
            FortunaConfig::default(),
            Arc::new(KeyValueStore::new(Arc::new(MemoryBackend::new()), 10)),
            Arc::new(MockAdviceSource::new()),
        )
    }

    #[test]
    fn history_lists_one_based_positions() {
        let app = app();
        app.handle_cookie_click();
        app.handle_cookie_click();
        let out = history(&app, false, None);
        assert!(out.contains("  1. "), "{out}");
        assert!(out.contains("  2. "), "{out}");
        assert!(out.contains("2 of 2 fortunes, 2 served in total"), "{out}");
    }

    #[test]
    fn history_reports_empty_filters() {
        let app = app();
        assert!(history(&app, false, None).contains("crack a cookie"));
        app.handle_cookie_click();
        assert!(history(&app, true, None).contains("no favorite"));
        assert!(history(&app, false, Some("zebra")).contains("no fortunes match \"zebra\""));
    }

    #[test]
    fn favorite_and_delete_validate_positions() {
        let app = app();
        app.handle_cookie_click();
        assert!(matches!(favorite(&app, 0), Err(CommandError::InvalidPosition)));
        assert!(matches!(favorite(&app, 2), Err(CommandError::NoSuchEntry(2))));
        assert_eq!(favorite(&app, 1).unwrap(), "fortune 1 added to favorites");
        assert_eq!(favorite(&app, 1).unwrap(), "fortune 1 removed from favorites");
        assert!(delete(&app, 1).unwrap().contains("0 served"));
        assert!(delete(&app, 1).is_err());
    }

    #[test]
    fn filter_toggles_preference() {
        let app = app();
        assert_eq!(filter(&app, None), "history shows all fortunes");
        assert_eq!(filter(&app, Some(true)), "history shows favorites only");
        assert!(app.favorites_only());
    }

    #[test]
    fn status_json_is_parseable() {
        let app = app();
        let out = status(&app, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["queue_len"], 10);
        assert_eq!(value["api_status"], "healthy");
    }
}
