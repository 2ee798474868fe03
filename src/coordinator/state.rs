use parking_lot::Mutex;

use crate::audit::{AuditEvent, AuditLogger};
use crate::clock::Clock;
use crate::config::SecurityConfig;
use crate::rate_limit::RateLimiter;
use crate::session::SessionManager;
use crate::types::SessionId;

/// Which session each window is bound to.
#[derive(Debug, Default)]
pub(super) struct WindowBindings {
    pub(super) control: Option<SessionId>,
    pub(super) target: Option<SessionId>,
}

/// Everything the request handlers share.
///
/// Each lock is taken for one synchronous step and never held across an
/// `.await`, so every mutation is atomic with respect to other requests.
pub(super) struct CoordinatorState<C> {
    pub(super) sessions: Mutex<SessionManager<C>>,
    pub(super) rate_limiter: Mutex<RateLimiter<C>>,
    pub(super) audit: Mutex<AuditLogger<C>>,
    pub(super) windows: Mutex<WindowBindings>,
    /// Serialises window opening so two requests cannot both open one.
    pub(super) opening: tokio::sync::Mutex<()>,
}

impl<C: Clock + Clone> CoordinatorState<C> {
    pub(super) fn new(config: &SecurityConfig, clock: C) -> Self {
        Self {
            sessions: Mutex::new(SessionManager::new(config, clock.clone())),
            rate_limiter: Mutex::new(RateLimiter::new(config, clock.clone())),
            audit: Mutex::new(AuditLogger::new(config, clock)),
            windows: Mutex::new(WindowBindings::default()),
            opening: tokio::sync::Mutex::new(()),
        }
    }

    pub(super) fn audit(&self, event: AuditEvent) {
        self.audit.lock().log(event);
    }

    pub(super) fn control_session(&self) -> Option<SessionId> {
        self.windows.lock().control.clone()
    }

    pub(super) fn target_session(&self) -> Option<SessionId> {
        self.windows.lock().target.clone()
    }

    /// Periodic expiry pass over sessions and rate windows.
    pub(super) fn sweep(&self) -> (usize, usize) {
        let sessions = self.sessions.lock().cleanup_expired_sessions();
        let windows = self.rate_limiter.lock().prune_expired();
        (sessions, windows)
    }
}
