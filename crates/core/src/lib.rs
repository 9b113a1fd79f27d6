//! armgate_core - Pure no_std arming readiness gate
//!
//! This crate decides whether a vehicle may arm and governs the arm/disarm
//! transition itself. It is platform-agnostic and tested on host; the only
//! feature flag selects the defmt logging backend.
//!
//! # Design Principles
//!
//! - **Pure no_std + alloc**: no std library dependencies outside tests
//! - **Owned context**: one [`arming::ArmingSystem`] built at startup, passed by reference
//! - **Trait abstractions**: leaf subsystems and platform services injected via traits
//!
//! # Modules
//!
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource)
//! - [`parameters`]: Parameter store and the arming parameter view
//! - [`arming`]: Check registry, consistency timer, auxiliary authorisation,
//!   reporting policy and the arming state machine
//! - [`logging`]: Logging macros (defmt / host)

#![no_std]

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod arming;
pub mod logging;
pub mod parameters;
pub mod traits;
