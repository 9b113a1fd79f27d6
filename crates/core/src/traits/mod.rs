//! Core traits for platform-agnostic arming functionality.
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - The tokio implementation lives in the sitl crate

pub mod time;

pub use time::{MockTime, TimeSource};
