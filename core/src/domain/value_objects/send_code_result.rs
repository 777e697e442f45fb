//! Outcome of a send-code request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a successful send-code request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendCodeResult {
    /// Always true for a returned result; failures surface as errors
    pub success: bool,

    /// Human readable message
    pub message: String,

    /// When the issued code expires
    pub expires_at: DateTime<Utc>,
}

impl SendCodeResult {
    pub fn sent(expires_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            message: "Verification code sent successfully".to_string(),
            expires_at,
        }
    }
}
