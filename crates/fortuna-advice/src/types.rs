// SPDX-FileCopyrightText: 2026 Fortuna Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the advice endpoint.

use fortuna_core::{FortunaError, QueueItem, RemoteId};
use serde::Deserialize;

/// Success body: `{ "slip": { "id": ..., "advice": "..." } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlipResponse {
    pub slip: Slip,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slip {
    pub id: RemoteId,
    pub advice: String,
}

impl SlipResponse {
    /// Parse a response body into a queue item.
    pub fn parse(body: &str) -> Result<QueueItem, FortunaError> {
        let response: SlipResponse = serde_json::from_str(body)
            .map_err(|e| FortunaError::MalformedPayload(format!("unexpected body shape: {e}")))?;
        response.into_item()
    }

    fn into_item(self) -> Result<QueueItem, FortunaError> {
        let advice = self.slip.advice.trim();
        if advice.is_empty() {
            return Err(FortunaError::MalformedPayload("slip has no advice text".into()));
        }
        Ok(QueueItem::remote(self.slip.id, advice))
    }
}
