// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call pacing for the remote advice endpoint.
//!
//! The [`ThrottleController`] decides whether a remote call is permitted right
//! now. Under normal conditions calls are spaced by a fixed throttle interval
//! chosen above the endpoint's response cache window; after failures the
//! spacing grows exponentially up to a ceiling and snaps back on success.

pub mod state;
pub mod throttle;

pub use state::{ApiCallState, BackoffPolicy};
pub use throttle::{StatusListener, ThrottleController};
