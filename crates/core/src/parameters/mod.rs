//! Parameter management
//!
//! A bounded in-memory [`ParameterStore`] and the typed [`ArmingParams`]
//! view read from it. Loading and saving the store is up to the platform.

pub mod arming;
pub mod error;
pub mod storage;

pub use arming::{ArmingOptions, ArmingParams, ArmingRequired, ArmingRudder};
pub use error::ParameterError;
pub use storage::{ParamFlags, ParamValue, ParameterStore, MAX_PARAMS, PARAM_NAME_LEN};
