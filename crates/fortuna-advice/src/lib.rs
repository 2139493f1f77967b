// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote advice client for the Fortuna engine.
//!
//! [`HttpAdviceSource`] performs one GET against the advice endpoint and
//! reports the raw outcome. [`AdviceClient`] wraps any [`AdviceSource`],
//! collapses failures into `None`, and feeds each outcome to the
//! [`ThrottleController`](fortuna_resilience::ThrottleController).

pub mod client;
pub mod http;
pub mod types;

pub use client::AdviceClient;
pub use http::HttpAdviceSource;

#[doc(no_inline)]
pub use fortuna_core::AdviceSource;
