#![doc = include_str!("../README.md")]

pub mod audit;
pub mod ceac;
pub mod clock;
pub mod config;
#[cfg(feature = "coordinator")]
pub mod coordinator;
#[cfg(feature = "crypto")]
pub mod crypto;
pub mod dom;
pub mod error;
pub mod fill;
pub mod rate_limit;
pub mod retry;
pub mod session;
pub mod types;
pub mod validation;

// Re-exports for convenient access
pub use audit::{AuditEvent, AuditEventType, AuditLogger, AuditRecord, Severity};
pub use ceac::{field_specs, fill_when_ready};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SecurityConfig;
#[cfg(feature = "coordinator")]
pub use coordinator::{
    Coordinator, CoordinatorConfig, IpcRequest, Reply, SecurityStatus, WindowHost,
};
#[cfg(feature = "crypto")]
pub use crypto::{EncryptedPayload, EncryptionKey, decrypt_data, encrypt_data};
pub use error::Error;
pub use fill::{FieldSpec, FillReport, fill, fill_with_report};
pub use rate_limit::RateLimiter;
pub use retry::RetryPolicy;
pub use session::{Session, SessionManager};
pub use types::{FormData, SessionId};
pub use validation::{ValidationReport, validate_form_data};
