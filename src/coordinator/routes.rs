use std::sync::Arc;
use std::time::Duration as StdDuration;

use serde_json::Value;

use super::config::CoordinatorConfig;
use super::state::CoordinatorState;
use super::traits::WindowHost;
use super::types::{IpcRequest, Reply, SecurityStatus};
use crate::audit::{AuditEvent, AuditEventType, AuditRecord, Severity};
use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::session::DATA_ACCESS;
use crate::types::{FormData, SessionId};
use crate::validation::validate_form_data;

/// Records kept in the shutdown summary.
const SUMMARY_LEN: usize = 10;

/// Sweep period used when the configured interval is not positive.
const FALLBACK_CLEANUP_PERIOD: StdDuration = StdDuration::from_secs(60);

/// Privileged side of the two-window shell.
///
/// Owns the session, rate-limit and audit state and answers requests from
/// the control window. Cheap to clone; clones share state.
pub struct Coordinator<H, C = SystemClock> {
    host: Arc<H>,
    state: Arc<CoordinatorState<C>>,
    config: Arc<CoordinatorConfig>,
}

// Manual Clone: avoid derive adding `H: Clone, C: Clone` bounds.
impl<H, C> Clone for Coordinator<H, C> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            state: self.state.clone(),
            config: self.config.clone(),
        }
    }
}

impl<H: WindowHost> Coordinator<H> {
    #[must_use]
    pub fn new(config: CoordinatorConfig, host: H) -> Self {
        Self::with_clock(config, host, SystemClock)
    }
}

impl<H: WindowHost, C: Clock + Clone> Coordinator<H, C> {
    #[must_use]
    pub fn with_clock(config: CoordinatorConfig, host: H, clock: C) -> Self {
        Self {
            state: Arc::new(CoordinatorState::new(&config.security, clock)),
            host: Arc::new(host),
            config: Arc::new(config),
        }
    }

    // ── Window lifecycle ───────────────────────────────────────────

    /// The control window opened; binds a fresh session to it.
    pub fn control_window_created(&self) -> SessionId {
        let session_id = SessionId::generate("main");
        self.state.sessions.lock().create_session(session_id.clone());
        self.state.windows.lock().control = Some(session_id.clone());
        self.state.audit(
            AuditEvent::new(AuditEventType::WindowCreated, "Main control panel window created")
                .with_session(&session_id),
        );
        session_id
    }

    pub fn control_window_closed(&self) {
        let Some(session_id) = self.state.windows.lock().control.take() else {
            return;
        };
        self.state.sessions.lock().destroy_session(&session_id);
        self.state.audit(
            AuditEvent::new(AuditEventType::WindowClosed, "Main control panel window closed")
                .with_session(&session_id),
        );
    }

    pub fn target_window_closed(&self) {
        let Some(target) = self.state.windows.lock().target.take() else {
            return;
        };
        self.state.sessions.lock().destroy_session(&target);

        let mut event =
            AuditEvent::new(AuditEventType::CeacWindowClosed, "CEAC website window closed");
        if let Some(control) = self.state.control_session() {
            event = event.with_session(&control);
        }
        self.state.audit(event);
    }

    /// Logs and returns the most recent audit records.
    pub fn shutdown_summary(&self) -> Vec<AuditRecord> {
        let audit = self.state.audit.lock();
        let recent: Vec<AuditRecord> = audit.recent(SUMMARY_LEN).into_iter().cloned().collect();
        for record in &recent {
            tracing::info!(
                timestamp = %record.timestamp,
                event_type = ?record.event.event_type,
                message = %record.event.message,
                "Audit trail"
            );
        }
        recent
    }

    // ── Requests ───────────────────────────────────────────────────

    /// Opens the target window, or focuses it if it is already open.
    pub async fn open_site(&self) -> Reply {
        let session_id = match self.live_control_session() {
            Ok(id) => id,
            Err(e) => return e.into_reply(),
        };

        let _opening = self.state.opening.lock().await;

        if self.state.target_session().is_some() {
            self.host.focus_target().await;
            self.state.audit(
                AuditEvent::new(
                    AuditEventType::CeacWindowFocused,
                    "CEAC window already open, focused",
                )
                .with_session(&session_id),
            );
            return Reply::ok("CEAC website window already open");
        }

        if let Err(e) = self.host.open_target(&self.config.target_url).await {
            tracing::error!(error = %e, "Opening CEAC website failed");
            self.state.audit(
                AuditEvent::new(
                    AuditEventType::Error,
                    format!("Error opening CEAC website: {e}"),
                )
                .with_severity(Severity::High),
            );
            return Reply::failed("Failed to open CEAC website");
        }

        let target_id = SessionId::generate("ceac");
        self.state.sessions.lock().create_session(target_id.clone());
        self.state.windows.lock().target = Some(target_id.clone());
        self.state.audit(
            AuditEvent::new(AuditEventType::CeacWindowOpened, "CEAC website window opened")
                .with_session(&session_id)
                .with_field("ceacSessionId", target_id.as_str()),
        );

        tracing::info!(session_id = %session_id, target = %target_id, "CEAC website opened");
        Reply::ok("CEAC website opened")
    }

    /// Validates, rate-limits and relays field values to the target page.
    pub async fn submit_form_data(&self, payload: Value) -> Reply {
        match self.try_submit(payload).await {
            Ok(reply) => reply,
            Err(e @ (Error::Window(_) | Error::Crypto(_) | Error::Config(_))) => {
                self.state.audit(
                    AuditEvent::new(AuditEventType::Error, format!("Form injection error: {e}"))
                        .with_severity(Severity::High),
                );
                e.into_reply()
            }
            Err(e) => e.into_reply(),
        }
    }

    async fn try_submit(&self, payload: Value) -> Result<Reply, Error> {
        let session_id = self.live_control_session()?;

        let object = payload.as_object().ok_or(Error::InvalidData)?;

        // Validation runs first so rejected input never spends an attempt.
        let report = validate_form_data(object);
        if !report.valid {
            self.state.audit(
                AuditEvent::new(
                    AuditEventType::ValidationFailed,
                    format!("Invalid form data: {}", report.errors.join(", ")),
                )
                .with_session(&session_id)
                .with_field("errors", report.errors.clone()),
            );
            let first = report.first_error().unwrap_or_default().to_owned();
            return Err(Error::ValidationFailed(first));
        }

        if !self.state.rate_limiter.lock().check_limit(session_id.as_str()) {
            self.state.audit(
                AuditEvent::new(
                    AuditEventType::RateLimitExceeded,
                    "Too many form submission attempts",
                )
                .with_session(&session_id),
            );
            return Err(Error::RateLimitExceeded);
        }

        if self.state.target_session().is_none() {
            tracing::warn!(session_id = %session_id, "CEAC window not open");
            return Err(Error::TargetWindowNotOpen);
        }

        let form = FormData::from(object);
        self.state
            .sessions
            .lock()
            .log_access(&session_id, DATA_ACCESS, "Form data submission");
        self.state.audit(
            AuditEvent::new(AuditEventType::FormDataReceived, "Form data received and validated")
                .with_session(&session_id),
        );

        tokio::time::sleep(self.config.settle_delay).await;

        if self.state.target_session().is_none() {
            tracing::warn!(session_id = %session_id, "CEAC window closed before relay");
            return Err(Error::TargetWindowNotOpen);
        }
        self.host
            .send_fill(&form)
            .await
            .map_err(|e| Error::Window(e.to_string()))?;
        self.host.focus_target().await;

        self.state.audit(
            AuditEvent::new(AuditEventType::FormFillInitiated, "Form fill initiated on CEAC website")
                .with_session(&session_id),
        );
        tracing::info!(session_id = %session_id, fields = form.len(), "Form fill initiated");
        Ok(Reply::ok("Form data sent to CEAC website"))
    }

    pub fn get_security_status(&self) -> SecurityStatus {
        let Ok(session_id) = self.live_control_session() else {
            return SecurityStatus::insecure(Error::InvalidSession.to_string());
        };

        let mut sessions = self.state.sessions.lock();
        let now = sessions.now();
        let Some(session) = sessions.get_session(&session_id) else {
            return SecurityStatus::insecure(Error::InvalidSession.to_string());
        };

        let age_ms = session.age(now).whole_milliseconds();
        SecurityStatus {
            secure: true,
            message: "Application is secure".into(),
            session_id: Some(session_id.clone()),
            session_age: Some(i64::try_from(age_ms).unwrap_or(i64::MAX)),
            data_access_count: Some(session.data_access_count),
            access_log_entries: Some(session.access_log.len()),
        }
    }

    /// Drops the in-memory audit trail. Nothing sensitive is persisted.
    pub fn clear_sensitive_data(&self) -> Reply {
        let mut audit = self.state.audit.lock();
        audit.clear_logs();
        audit.log(AuditEvent::new(
            AuditEventType::SensitiveDataCleared,
            "Sensitive data cleared from memory",
        ));
        Reply::ok("Sensitive data cleared")
    }

    /// Routes a control-window request to its handler.
    pub async fn dispatch(&self, request: IpcRequest) -> Value {
        let result = match request {
            IpcRequest::OpenCeac => serde_json::to_value(self.open_site().await),
            IpcRequest::InjectFormData(payload) => {
                serde_json::to_value(self.submit_form_data(payload).await)
            }
            IpcRequest::GetSecurityStatus => serde_json::to_value(self.get_security_status()),
            IpcRequest::ClearSensitiveData => serde_json::to_value(self.clear_sensitive_data()),
        };
        result.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Reply serialization failed");
            Value::Null
        })
    }

    /// Parses a raw `{channel, payload}` message and dispatches it.
    pub async fn dispatch_json(&self, message: Value) -> Value {
        match serde_json::from_value::<IpcRequest>(message) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Unrecognised request");
                serde_json::to_value(Reply::failed("Unknown request")).unwrap_or(Value::Null)
            }
        }
    }

    // ── Inspection ─────────────────────────────────────────────────

    #[must_use]
    pub fn audit_logs(&self) -> Vec<AuditRecord> {
        self.state.audit.lock().get_logs().cloned().collect()
    }

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Starts the periodic session and rate-window sweep.
    ///
    /// Must be called inside a Tokio runtime. Abort the handle to stop it.
    /// A zero or negative `cleanup_interval` sweeps every 60 seconds.
    pub fn spawn_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let state = self.state.clone();
        let period = cleanup_period(self.config.security.cleanup_interval);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let (sessions, windows) = state.sweep();
                if sessions > 0 || windows > 0 {
                    tracing::debug!(sessions, windows, "Expired state swept");
                }
            }
        })
    }

    // ── Helpers ────────────────────────────────────────────────────

    /// The control window's session, renewed if it has lapsed.
    ///
    /// A lapsed session is replaced by a fresh `main-*` session bound to the
    /// same window, and the renewal is audited.
    fn live_control_session(&self) -> Result<SessionId, Error> {
        let mut windows = self.state.windows.lock();
        let Some(current) = windows.control.clone() else {
            tracing::error!("Request without a control session");
            return Err(Error::InvalidSession);
        };

        let mut sessions = self.state.sessions.lock();
        if sessions.get_session(&current).is_some() {
            return Ok(current);
        }
        let renewed = SessionId::generate("main");
        sessions.create_session(renewed.clone());
        windows.control = Some(renewed.clone());
        drop(sessions);
        drop(windows);

        tracing::info!(previous = %current, session_id = %renewed, "Control session renewed");
        self.state.audit(
            AuditEvent::new(AuditEventType::SessionRenewed, "Control session lapsed, renewed")
                .with_session(&renewed)
                .with_field("previousSessionId", current.as_str()),
        );
        Ok(renewed)
    }
}

fn cleanup_period(interval: time::Duration) -> StdDuration {
    match StdDuration::try_from(interval) {
        Ok(period) if !period.is_zero() => period,
        _ => {
            tracing::warn!(%interval, "Cleanup interval not positive, using 60s");
            FALLBACK_CLEANUP_PERIOD
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::json;
    use time::Duration;
    use url::Url;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SecurityConfig;

    #[derive(Default)]
    struct RecordingHost {
        fail_open: bool,
        opened: Mutex<Vec<Url>>,
        focused: Mutex<usize>,
        relayed: Mutex<Vec<FormData>>,
    }

    impl WindowHost for Arc<RecordingHost> {
        async fn open_target(
            &self,
            url: &Url,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if self.fail_open {
                return Err("display unavailable".into());
            }
            self.opened.lock().push(url.clone());
            Ok(())
        }

        async fn focus_target(&self) {
            *self.focused.lock() += 1;
        }

        async fn send_fill(
            &self,
            data: &FormData,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.relayed.lock().push(data.clone());
            Ok(())
        }
    }

    type TestCoordinator = Coordinator<Arc<RecordingHost>, ManualClock>;

    fn coordinator() -> (TestCoordinator, Arc<RecordingHost>, ManualClock) {
        let host = Arc::new(RecordingHost::default());
        let clock = ManualClock::default();
        let coordinator =
            Coordinator::with_clock(CoordinatorConfig::default(), host.clone(), clock.clone());
        (coordinator, host, clock)
    }

    fn event_types(coordinator: &TestCoordinator) -> Vec<AuditEventType> {
        coordinator
            .audit_logs()
            .iter()
            .map(|r| r.event.event_type)
            .collect()
    }

    #[tokio::test]
    async fn requests_without_control_session_are_rejected() {
        let (coordinator, host, _) = coordinator();
        assert_eq!(coordinator.open_site().await, Reply::failed("Invalid session"));
        assert_eq!(
            coordinator.submit_form_data(json!({"country": "FRANCE"})).await,
            Reply::failed("Invalid session")
        );
        assert!(!coordinator.get_security_status().secure);
        assert!(host.opened.lock().is_empty());
    }

    #[tokio::test]
    async fn open_site_is_idempotent() {
        let (coordinator, host, _) = coordinator();
        coordinator.control_window_created();

        assert_eq!(coordinator.open_site().await, Reply::ok("CEAC website opened"));
        assert_eq!(
            coordinator.open_site().await,
            Reply::ok("CEAC website window already open")
        );

        assert_eq!(host.opened.lock().len(), 1);
        assert_eq!(host.opened.lock()[0].as_str(), "https://ceac.state.gov/genniv/");
        assert_eq!(*host.focused.lock(), 1);
        assert_eq!(
            event_types(&coordinator),
            [
                AuditEventType::WindowCreated,
                AuditEventType::CeacWindowOpened,
                AuditEventType::CeacWindowFocused
            ]
        );
        let opened = &coordinator.audit_logs()[1];
        assert!(
            opened.event.extra["ceacSessionId"]
                .as_str()
                .unwrap()
                .starts_with("ceac-")
        );
    }

    #[tokio::test]
    async fn failed_open_is_audited() {
        let host = Arc::new(RecordingHost {
            fail_open: true,
            ..RecordingHost::default()
        });
        let coordinator = Coordinator::with_clock(
            CoordinatorConfig::default(),
            host.clone(),
            ManualClock::default(),
        );
        coordinator.control_window_created();

        assert_eq!(coordinator.open_site().await, Reply::failed("Failed to open CEAC website"));
        let logs = coordinator.audit_logs();
        let last = logs.last().unwrap();
        assert_eq!(last.event.event_type, AuditEventType::Error);
        assert_eq!(last.event.severity, Some(Severity::High));
    }

    #[tokio::test(start_paused = true)]
    async fn submission_is_relayed_after_settle_delay() {
        let (coordinator, host, _) = coordinator();
        let session_id = coordinator.control_window_created();
        coordinator.open_site().await;

        let start = tokio::time::Instant::now();
        let reply = coordinator
            .submit_form_data(json!({"country": "FRANCE, PARIS", "captcha": "AB12", "note": 7}))
            .await;

        assert_eq!(reply, Reply::ok("Form data sent to CEAC website"));
        assert!(start.elapsed() >= StdDuration::from_secs(3));
        let relayed = host.relayed.lock();
        assert_eq!(relayed.len(), 1);
        assert_eq!(relayed[0].get("country"), Some("FRANCE, PARIS"));
        assert_eq!(relayed[0].get("note"), None);
        drop(relayed);
        assert_eq!(*host.focused.lock(), 1);

        let status = coordinator.get_security_status();
        assert_eq!(status.session_id, Some(session_id));
        assert_eq!(status.data_access_count, Some(1));
        assert_eq!(status.access_log_entries, Some(1));

        let types = event_types(&coordinator);
        assert_eq!(
            &types[types.len() - 2..],
            [AuditEventType::FormDataReceived, AuditEventType::FormFillInitiated]
        );
    }

    #[tokio::test]
    async fn validation_failure_spends_no_attempt_and_relays_nothing() {
        let (coordinator, host, _) = coordinator();
        let session_id = coordinator.control_window_created();
        coordinator.open_site().await;

        let reply = coordinator
            .submit_form_data(json!({"country": "FRANCE", "captcha": "x$"}))
            .await;

        assert_eq!(reply, Reply::failed("CAPTCHA contains invalid characters"));
        assert_eq!(coordinator.state.rate_limiter.lock().attempts(session_id.as_str()), None);
        assert!(host.relayed.lock().is_empty());
        let logs = coordinator.audit_logs();
        let last = logs.last().unwrap();
        assert_eq!(last.event.event_type, AuditEventType::ValidationFailed);
        assert_eq!(last.event.extra["errors"], json!(["CAPTCHA contains invalid characters"]));
    }

    #[tokio::test]
    async fn non_object_payload_is_rejected() {
        let (coordinator, _, _) = coordinator();
        coordinator.control_window_created();
        assert_eq!(
            coordinator.submit_form_data(json!("country=FRANCE")).await,
            Reply::failed("Invalid data format")
        );
    }

    #[tokio::test]
    async fn submission_requires_open_target() {
        let (coordinator, _, _) = coordinator();
        coordinator.control_window_created();
        assert_eq!(
            coordinator.submit_form_data(json!({"country": "FRANCE"})).await,
            Reply::failed("CEAC website window is not open")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn eleventh_submission_in_window_is_rate_limited() {
        let (coordinator, host, clock) = coordinator();
        coordinator.control_window_created();
        coordinator.open_site().await;

        for _ in 0..10 {
            let reply = coordinator.submit_form_data(json!({"country": "FRANCE"})).await;
            assert!(reply.success);
        }
        let reply = coordinator.submit_form_data(json!({"country": "FRANCE"})).await;
        assert_eq!(
            reply,
            Reply::failed("Rate limit exceeded. Please wait before trying again.")
        );
        assert_eq!(host.relayed.lock().len(), 10);
        assert_eq!(
            event_types(&coordinator).last(),
            Some(&AuditEventType::RateLimitExceeded)
        );

        clock.advance(Duration::seconds(61));
        assert!(coordinator.submit_form_data(json!({"country": "FRANCE"})).await.success);
    }

    #[tokio::test]
    async fn status_reports_session_age() {
        let (coordinator, _, clock) = coordinator();
        let session_id = coordinator.control_window_created();
        clock.advance(Duration::minutes(10));
        let status = coordinator.get_security_status();
        assert!(status.secure);
        assert_eq!(status.session_id, Some(session_id));
        assert_eq!(status.session_age, Some(600_000));
    }

    #[tokio::test(start_paused = true)]
    async fn lapsed_control_session_is_renewed_for_every_request() {
        let (coordinator, host, clock) = coordinator();
        let original = coordinator.control_window_created();
        clock.advance(Duration::minutes(31));

        assert_eq!(coordinator.open_site().await, Reply::ok("CEAC website opened"));
        let logs = coordinator.audit_logs();
        let renewal = &logs[1];
        assert_eq!(renewal.event.event_type, AuditEventType::SessionRenewed);
        assert_eq!(renewal.event.extra["previousSessionId"], original.as_str());
        let renewed = renewal.event.session_id.clone().unwrap();
        assert_ne!(renewed, original);
        assert!(renewed.as_str().starts_with("main-"));

        let reply = coordinator.submit_form_data(json!({"country": "FRANCE"})).await;
        assert_eq!(reply, Reply::ok("Form data sent to CEAC website"));

        clock.advance(Duration::hours(5));
        let reply = coordinator.submit_form_data(json!({"country": "FRANCE"})).await;
        assert_eq!(reply, Reply::ok("Form data sent to CEAC website"));
        assert_eq!(host.relayed.lock().len(), 2);

        let status = coordinator.get_security_status();
        assert!(status.secure);
        assert_eq!(status.session_age, Some(0));
        assert_eq!(status.data_access_count, Some(1));
        let renewals = event_types(&coordinator)
            .into_iter()
            .filter(|t| *t == AuditEventType::SessionRenewed)
            .count();
        assert_eq!(renewals, 2);
    }

    #[tokio::test]
    async fn live_session_is_not_renewed() {
        let (coordinator, _, clock) = coordinator();
        let session_id = coordinator.control_window_created();
        clock.advance(Duration::minutes(30));
        assert_eq!(coordinator.get_security_status().session_id, Some(session_id));
        assert!(!event_types(&coordinator).contains(&AuditEventType::SessionRenewed));
    }

    #[tokio::test]
    async fn target_close_destroys_its_session() {
        let (coordinator, _, _) = coordinator();
        coordinator.control_window_created();
        coordinator.open_site().await;
        assert_eq!(coordinator.state.sessions.lock().len(), 2);

        coordinator.target_window_closed();
        assert_eq!(coordinator.state.sessions.lock().len(), 1);
        assert_eq!(
            event_types(&coordinator).last(),
            Some(&AuditEventType::CeacWindowClosed)
        );

        coordinator.control_window_closed();
        assert!(coordinator.state.sessions.lock().is_empty());
    }

    #[tokio::test]
    async fn control_close_is_audited_once() {
        let (coordinator, _, _) = coordinator();
        let session_id = coordinator.control_window_created();

        coordinator.control_window_closed();
        coordinator.control_window_closed();

        let logs = coordinator.audit_logs();
        assert_eq!(
            logs.iter().map(|r| r.event.event_type).collect::<Vec<_>>(),
            [AuditEventType::WindowCreated, AuditEventType::WindowClosed]
        );
        assert_eq!(logs[1].event.session_id, Some(session_id));
        assert_eq!(
            coordinator.get_security_status(),
            SecurityStatus::insecure("Invalid session")
        );
    }

    #[tokio::test]
    async fn clear_sensitive_data_leaves_only_its_own_record() {
        let (coordinator, _, _) = coordinator();
        coordinator.control_window_created();
        coordinator.open_site().await;

        assert_eq!(coordinator.clear_sensitive_data(), Reply::ok("Sensitive data cleared"));
        assert_eq!(event_types(&coordinator), [AuditEventType::SensitiveDataCleared]);
    }

    #[tokio::test]
    async fn shutdown_summary_keeps_last_ten() {
        let (coordinator, _, _) = coordinator();
        coordinator.control_window_created();
        for _ in 0..12 {
            coordinator.open_site().await;
        }
        let summary = coordinator.shutdown_summary();
        assert_eq!(summary.len(), 10);
        assert!(
            summary
                .iter()
                .all(|r| r.event.event_type == AuditEventType::CeacWindowFocused)
        );
    }

    #[tokio::test]
    async fn dispatch_routes_by_channel() {
        let (coordinator, _, _) = coordinator();
        coordinator.control_window_created();

        let reply = coordinator.dispatch_json(json!({"channel": "open-ceac"})).await;
        assert_eq!(reply, json!({"success": true, "message": "CEAC website opened"}));

        let status = coordinator
            .dispatch_json(json!({"channel": "get-security-status"}))
            .await;
        assert_eq!(status["secure"], true);
        assert!(status["sessionId"].as_str().unwrap().starts_with("main-"));

        let unknown = coordinator.dispatch_json(json!({"channel": "eval"})).await;
        assert_eq!(unknown["success"], false);
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_task_sweeps_expired_sessions() {
        let (coordinator, _, clock) = coordinator();
        coordinator.control_window_created();
        coordinator.open_site().await;
        let handle = coordinator.spawn_cleanup();

        clock.advance(Duration::minutes(31));
        tokio::time::sleep(StdDuration::from_secs(61)).await;

        assert!(coordinator.state.sessions.lock().is_empty());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_cleanup_interval_falls_back_to_default_period() {
        let security = SecurityConfig::default().with_cleanup_interval(Duration::ZERO);
        let clock = ManualClock::default();
        let coordinator = Coordinator::with_clock(
            CoordinatorConfig::default().with_security(security),
            Arc::new(RecordingHost::default()),
            clock.clone(),
        );
        coordinator.control_window_created();
        let handle = coordinator.spawn_cleanup();

        clock.advance(Duration::minutes(31));
        tokio::time::sleep(StdDuration::from_secs(61)).await;

        assert!(!handle.is_finished());
        assert!(coordinator.state.sessions.lock().is_empty());
        handle.abort();
    }

    #[test]
    fn cleanup_period_rejects_non_positive_intervals() {
        assert_eq!(cleanup_period(Duration::seconds(5)), StdDuration::from_secs(5));
        assert_eq!(cleanup_period(Duration::ZERO), FALLBACK_CLEANUP_PERIOD);
        assert_eq!(cleanup_period(Duration::seconds(-30)), FALLBACK_CLEANUP_PERIOD);
    }
}
