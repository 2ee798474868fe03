//! Privileged coordinator for the two-window autofill shell.
//!
//! The control window sends requests; the coordinator checks the session,
//! validates and rate-limits input, records an audit trail, and asks the
//! [`WindowHost`] to open, focus or fill the target window.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ceac_autofill::coordinator::{Coordinator, CoordinatorConfig};
//!
//! // 1. Implement WindowHost for your browser shell
//! // 2. Configure from environment
//! let config = CoordinatorConfig::from_env()?;
//! let coordinator = Coordinator::new(config, shell);
//!
//! // 3. Wire window lifecycle and start the expiry sweep
//! coordinator.control_window_created();
//! let _sweep = coordinator.spawn_cleanup();
//!
//! // 4. Route control-window messages
//! let reply = coordinator.dispatch_json(message).await;
//! ```

mod config;
mod error;
mod routes;
mod state;
mod traits;
mod types;

pub use config::CoordinatorConfig;
pub use routes::Coordinator;
pub use traits::WindowHost;
pub use types::{IpcRequest, Reply, SecurityStatus};
