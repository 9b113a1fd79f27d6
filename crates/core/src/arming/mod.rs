//! Arming readiness gate
//!
//! - [`check`]: enable mask categories
//! - [`registry`]: the check capability, evaluation context and registry
//! - [`checks`]: built-in checks over the [`collaborators`] traits
//! - [`consistency`]: hysteresis for multi-sensor agreement
//! - [`aux_auth`]: asynchronous external authorisation
//! - [`reporting`]: failure display pacing
//! - [`state`]: the arm/disarm state machine owning all of the above
//!
//! Operator-facing lines go through [`status::StatusSink`].

pub mod aux_auth;
pub mod check;
pub mod checks;
pub mod collaborators;
pub mod consistency;
pub mod error;
pub mod internal_error;
pub mod method;
pub mod mock;
pub mod registry;
pub mod reporting;
pub mod state;
pub mod status;

pub use aux_auth::{AuthResponse, AuxAuthError, AuxAuthStatus, AuxAuthTable, SlotId};
pub use check::CheckCategory;
pub use collaborators::{ArmEvent, Collaborators, HealthCheck};
pub use consistency::ConsistencyTimer;
pub use error::{ArmingError, DisarmError};
pub use internal_error::{InternalErrorKind, InternalErrors};
pub use method::ArmMethod;
pub use registry::{CheckContext, CheckFailure, CheckPhase, CheckRegistry, PreArmCheck};
pub use reporting::ReportingPolicy;
pub use state::{ArmingState, ArmingSystem};
pub use status::{Severity, StatusMessage, StatusQueue, StatusSink};
