use armgate_core::arming::{ArmingError, AuxAuthError, DisarmError};

/// Errors raised by the SITL harness.
#[derive(Debug, thiserror::Error)]
pub enum SitlError {
    #[error("Auxiliary authorisation: {0}")]
    AuxAuth(#[from] AuxAuthError),

    #[error("Arm refused: {0}")]
    Arming(#[from] ArmingError),

    #[error("Disarm refused: {0}")]
    Disarm(#[from] DisarmError),

    #[error("Timeout waiting for {0}")]
    Timeout(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Authoriser task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
