use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::SessionId;

/// Result of a request from the control window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub success: bool,
    pub message: String,
}

impl Reply {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Snapshot of the control window's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStatus {
    pub secure: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Milliseconds since the session was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_access_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_log_entries: Option<usize>,
}

impl SecurityStatus {
    pub(super) fn insecure(message: impl Into<String>) -> Self {
        Self {
            secure: false,
            message: message.into(),
            session_id: None,
            session_age: None,
            data_access_count: None,
            access_log_entries: None,
        }
    }
}

/// Requests the control window can invoke, keyed by channel name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "channel", content = "payload", rename_all = "kebab-case")]
pub enum IpcRequest {
    OpenCeac,
    InjectFormData(Value),
    GetSecurityStatus,
    ClearSensitiveData,
}
