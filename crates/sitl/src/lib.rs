//! Software-in-the-loop harness for the arming gate.
//!
//! Runs [`armgate_core::arming::ArmingSystem`] against a simulated vehicle
//! on a tokio runtime, with external authorisers on their own tasks.

pub mod authorizer;
pub mod error;
pub mod runner;
pub mod time;
pub mod vehicle;

pub use authorizer::{
    spawn_authorizer, Authorizer, AuthorizerHandle, Decision, FixedDecision, Silent,
};
pub use error::SitlError;
pub use runner::{PrearmLoop, TracingSink, PREARM_PERIOD};
pub use time::TokioTime;
pub use vehicle::SimVehicle;
