//! Append-only, in-memory audit trail.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::clock::Clock;
use crate::config::SecurityConfig;
use crate::types::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum AuditEventType {
    WindowCreated,
    WindowClosed,
    /// A lapsed control session was replaced by a fresh one.
    SessionRenewed,
    CeacWindowOpened,
    CeacWindowFocused,
    CeacWindowClosed,
    RateLimitExceeded,
    ValidationFailed,
    FormDataReceived,
    FormFillInitiated,
    SensitiveDataCleared,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// An event before it is stamped by [`AuditLogger::log`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Event-specific extras, flattened into the record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuditEvent {
    #[must_use]
    pub fn new(event_type: AuditEventType, message: impl Into<String>) -> Self {
        Self {
            event_type,
            message: message.into(),
            session_id: None,
            severity: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_session(mut self, id: &SessionId) -> Self {
        self.session_id = Some(id.clone());
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(flatten)]
    pub event: AuditEvent,
}

pub struct AuditLogger<C> {
    clock: C,
    capacity: usize,
    last_timestamp: Option<OffsetDateTime>,
    logs: VecDeque<AuditRecord>,
}

impl<C: Clock> AuditLogger<C> {
    #[must_use]
    pub fn new(config: &SecurityConfig, clock: C) -> Self {
        Self {
            clock,
            capacity: config.audit_capacity.max(1),
            last_timestamp: None,
            logs: VecDeque::new(),
        }
    }

    /// Stamps and appends an event. Evicts the oldest record when full.
    pub fn log(&mut self, event: AuditEvent) {
        // Never step backwards even if the wall clock does.
        let now = self.clock.now();
        let timestamp = self.last_timestamp.map_or(now, |last| last.max(now));
        self.last_timestamp = Some(timestamp);

        if self.logs.len() == self.capacity {
            self.logs.pop_front();
        }
        tracing::debug!(event_type = ?event.event_type, message = %event.message, "Audit event");
        self.logs.push_back(AuditRecord { timestamp, event });
    }

    /// All retained records in insertion order.
    pub fn get_logs(&self) -> impl ExactSizeIterator<Item = &AuditRecord> + DoubleEndedIterator {
        self.logs.iter()
    }

    /// The last `n` records, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<&AuditRecord> {
        let skip = self.logs.len().saturating_sub(n);
        self.logs.iter().skip(skip).collect()
    }

    pub fn clear_logs(&mut self) {
        self.logs.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}
