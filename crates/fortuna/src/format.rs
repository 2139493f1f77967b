// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of fortunes, history rows and status.

use chrono::DateTime;
use colored::Colorize;
use fortuna_core::{ApiStatus, HistoryEntry};

use crate::app::{Fortune, StatusReport};

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Human-friendly age of `timestamp_ms` relative to `now_ms`.
///
/// Anything a week or older is shown as a calendar date.
pub fn relative_time(now_ms: i64, timestamp_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms).max(0);
    let minutes = diff / MINUTE_MS;
    let hours = diff / HOUR_MS;
    let days = diff / DAY_MS;

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} minute{} ago", plural(minutes))
    } else if hours < 24 {
        format!("{hours} hour{} ago", plural(hours))
    } else if days < 7 {
        format!("{days} day{} ago", plural(days))
    } else {
        DateTime::from_timestamp_millis(timestamp_ms)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "a long time ago".to_string())
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

pub fn fortune(fortune: &Fortune) -> String {
    format!(
        "{}\n{} {}\n{}",
        fortune.message.bold(),
        "Lucky numbers:".dimmed(),
        fortune.lucky_numbers.to_string().yellow(),
        format!("fortune #{}", fortune.fortune_count).dimmed()
    )
}

/// One history row. `position` is 1-based.
pub fn history_row(position: usize, entry: &HistoryEntry, now_ms: i64) -> String {
    let star = if entry.is_favorite {
        "★".yellow()
    } else {
        "☆".dimmed()
    };
    format!(
        "{:>3}. {} {}\n     {} {}",
        position,
        star,
        entry.message,
        relative_time(now_ms, entry.timestamp).dimmed(),
        format!("[{}]", entry.lucky_numbers).dimmed()
    )
}

pub fn status_label(status: ApiStatus) -> String {
    match status {
        ApiStatus::Healthy => "API status: connected".green().to_string(),
        ApiStatus::Degraded => "API status: connection issues, using cached messages"
            .yellow()
            .to_string(),
        ApiStatus::Offline => "API status: offline, using cached messages"
            .red()
            .to_string(),
    }
}

pub fn status_report(report: &StatusReport) -> String {
    let storage = if report.storage_available {
        report.storage_backend.green()
    } else {
        "unavailable".red()
    };
    let mut lines = vec![
        status_label(report.api_status),
        format!("storage:        {storage}"),
        format!("queue:          {}/{}", report.queue_len, report.queue_capacity),
        format!("history:        {}", report.history_len),
        format!("fortunes:       {}", report.fortune_count),
        format!("known ids:      {}", report.known_ids),
        format!("favorites only: {}", report.favorites_only),
    ];
    if report.api_state.consecutive_failures > 0 {
        lines.push(format!(
            "failures:       {} (backoff {} ms)",
            report.api_state.consecutive_failures, report.api_state.backoff_delay_ms
        ));
    }
    if report.retry_in_ms > 0 {
        lines.push(format!("next call in:   {} ms", report.retry_in_ms));
    }
    lines.join("\n")
}
