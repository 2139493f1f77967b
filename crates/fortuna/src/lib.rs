// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fortuna - a fortune cookie that refills itself from a remote advice service.
//!
//! [`FortuneApp`](app::FortuneApp) is the composition root: it wires the
//! key-value store, throttle controller, advice client, and message manager
//! and exposes the handlers the command line and shell call into.

pub mod app;
pub mod commands;
pub mod format;
pub mod shell;

pub use app::{Fortune, FortuneApp, StatusReport};
