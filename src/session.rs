//! Per-window session records with lazy and swept expiry.
//!
//! A session is live while `now - created_at <= max_age`. Expiry is measured
//! from creation, not from last activity, so touching a session never
//! extends it. Once removed, a session id only comes back through an
//! explicit [`SessionManager::create_session`].

use std::collections::HashMap;

use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::clock::Clock;
use crate::config::SecurityConfig;
use crate::types::SessionId;

/// Access-log action that bumps [`Session::data_access_count`].
pub const DATA_ACCESS: &str = "data-access";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub action: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity: OffsetDateTime,
    pub access_log: Vec<AccessEntry>,
    pub data_access_count: u64,
}

impl Session {
    fn new(id: SessionId, now: OffsetDateTime) -> Self {
        Self {
            id,
            created_at: now,
            last_activity: now,
            access_log: Vec::new(),
            data_access_count: 0,
        }
    }

    #[must_use]
    pub fn age(&self, now: OffsetDateTime) -> Duration {
        now - self.created_at
    }

    fn is_expired(&self, now: OffsetDateTime, max_age: Duration) -> bool {
        self.age(now) > max_age
    }
}

pub struct SessionManager<C> {
    clock: C,
    max_age: Duration,
    sessions: HashMap<SessionId, Session>,
}

impl<C: Clock> SessionManager<C> {
    #[must_use]
    pub fn new(config: &SecurityConfig, clock: C) -> Self {
        Self {
            clock,
            max_age: config.session_max_age,
            sessions: HashMap::new(),
        }
    }

    /// Inserts a fresh session, replacing any record with the same id.
    pub fn create_session(&mut self, id: SessionId) -> &Session {
        let now = self.clock.now();
        tracing::info!(session_id = %id, "Session created");
        self.sessions.insert(id.clone(), Session::new(id.clone(), now));
        &self.sessions[&id]
    }

    /// Looks up a live session and marks it active.
    ///
    /// An expired session is removed on discovery and reported as absent.
    pub fn get_session(&mut self, id: &SessionId) -> Option<&Session> {
        self.live_session(id).map(|s| &*s)
    }

    /// Appends to the session's access log; no-op if the session is gone.
    pub fn log_access(&mut self, id: &SessionId, action: &str, details: &str) {
        let now = self.clock.now();
        let Some(session) = self.live_session(id) else {
            return;
        };
        session.access_log.push(AccessEntry {
            timestamp: now,
            action: action.to_owned(),
            details: details.to_owned(),
        });
        if action == DATA_ACCESS {
            session.data_access_count += 1;
        }
    }

    pub fn destroy_session(&mut self, id: &SessionId) {
        if self.sessions.remove(id).is_some() {
            tracing::info!(session_id = %id, "Session destroyed");
        }
    }

    /// Removes every session past `max_age`. Returns how many were removed.
    pub fn cleanup_expired_sessions(&mut self) -> usize {
        let now = self.clock.now();
        let max_age = self.max_age;
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let keep = !session.is_expired(now, max_age);
            if !keep {
                tracing::debug!(session_id = %id, "Expired session swept");
            }
            keep
        });
        before - self.sessions.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    fn live_session(&mut self, id: &SessionId) -> Option<&mut Session> {
        let now = self.clock.now();
        let expired = match self.sessions.get(id) {
            None => {
                tracing::warn!(session_id = %id, "Session not found");
                return None;
            }
            Some(session) => session.is_expired(now, self.max_age),
        };
        if expired {
            tracing::warn!(session_id = %id, "Session expired");
            self.sessions.remove(id);
            return None;
        }
        let session = self.sessions.get_mut(id)?;
        session.last_activity = now;
        Some(session)
    }
}
