// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the queue manager and its collaborators.

pub mod source;

pub use source::AdviceSource;
