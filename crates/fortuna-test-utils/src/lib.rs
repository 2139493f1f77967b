// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Fortuna integration tests.
//!
//! Provides a scripted advice source and a harness that wires the whole core
//! over an in-memory store, so tests run without network or disk.
//!
//! # Components
//!
//! - [`MockAdviceSource`] - Advice source with pre-configured outcomes
//! - [`TestHarness`] - Store, controller, client and manager, assembled

pub mod harness;
pub mod mock_source;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_source::MockAdviceSource;
