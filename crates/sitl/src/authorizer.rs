//! External authorisers.
//!
//! An authoriser stands in for a companion computer or a script that takes
//! part in the arm decision. Each one owns a slot in the gate's
//! [`AuxAuthTable`] and reports whenever its decision is ready.

use std::sync::Arc;
use std::time::Duration;

use armgate_core::arming::{AuxAuthTable, SlotId};
use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::error::SitlError;

/// Outcome of an authoriser's deliberation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Approve,
    /// Refusal with an optional operator-facing reason
    Refuse(Option<String>),
}

/// A participant in the arm decision.
///
/// Implementations must be `Send + Sync` so they can run on their own task.
#[async_trait]
pub trait Authorizer: Send + Sync + 'static {
    /// Human-readable name used in logs.
    fn name(&self) -> &str;

    /// Produce a decision. May never complete.
    async fn decide(&self) -> Decision;
}

/// Authoriser that answers with a fixed decision after a delay.
#[derive(Debug, Clone)]
pub struct FixedDecision {
    name: String,
    delay: Duration,
    decision: Decision,
}

impl FixedDecision {
    pub fn approve_after(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            decision: Decision::Approve,
        }
    }

    pub fn refuse_after(name: impl Into<String>, delay: Duration, reason: Option<String>) -> Self {
        Self {
            name: name.into(),
            delay,
            decision: Decision::Refuse(reason),
        }
    }
}

#[async_trait]
impl Authorizer for FixedDecision {
    fn name(&self) -> &str {
        &self.name
    }

    async fn decide(&self) -> Decision {
        tokio::time::sleep(self.delay).await;
        self.decision.clone()
    }
}

/// Authoriser that acquires a slot and never answers.
#[derive(Debug, Clone)]
pub struct Silent {
    name: String,
}

impl Silent {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Authorizer for Silent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn decide(&self) -> Decision {
        std::future::pending().await
    }
}

/// A running authoriser task and the slot it reports to.
#[derive(Debug)]
pub struct AuthorizerHandle {
    pub slot: SlotId,
    task: JoinHandle<()>,
}

impl AuthorizerHandle {
    /// Wait for the decision to be reported.
    pub async fn join(self) -> Result<(), SitlError> {
        self.task.await?;
        Ok(())
    }

    /// Stop a task that has not reported yet.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Acquire a slot for `authorizer` and run it on its own task.
///
/// Slot allocation failures are returned immediately; the table latches
/// them so arming stays blocked until it is reset.
pub fn spawn_authorizer<A: Authorizer>(
    table: Arc<AuxAuthTable>,
    authorizer: A,
) -> Result<AuthorizerHandle, SitlError> {
    let slot = table.acquire_slot().map_err(|e| {
        tracing::warn!(authorizer = authorizer.name(), error = %e, "slot refused");
        e
    })?;
    tracing::info!(authorizer = authorizer.name(), slot = slot.raw(), "authoriser registered");

    let task = tokio::spawn(async move {
        match authorizer.decide().await {
            Decision::Approve => {
                tracing::info!(authorizer = authorizer.name(), slot = slot.raw(), "approved");
                table.report_passed(slot);
            }
            Decision::Refuse(reason) => {
                tracing::warn!(
                    authorizer = authorizer.name(),
                    slot = slot.raw(),
                    reason = reason.as_deref().unwrap_or("none"),
                    "refused"
                );
                table.report_failed(slot, reason.as_deref());
            }
        }
    });

    Ok(AuthorizerHandle { slot, task })
}

#[cfg(test)]
mod tests {
    use super::*;
    use armgate_core::arming::{AuthResponse, AuxAuthError, AuxAuthStatus};

    #[tokio::test(start_paused = true)]
    async fn test_approval_reported_after_delay() {
        let table = Arc::new(AuxAuthTable::new());
        let handle = spawn_authorizer(
            Arc::clone(&table),
            FixedDecision::approve_after("companion", Duration::from_secs(2)),
        )
        .unwrap();
        let slot = handle.slot;

        assert_eq!(table.evaluate(), AuxAuthStatus::Waiting);
        handle.join().await.unwrap();
        assert_eq!(table.response(slot), Some(AuthResponse::Passed));
        assert!(table.evaluate().is_authorised());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refusal_carries_reason() {
        let table = Arc::new(AuxAuthTable::new());
        let handle = spawn_authorizer(
            Arc::clone(&table),
            FixedDecision::refuse_after("geofence", Duration::ZERO, Some("No flight zone".into())),
        )
        .unwrap();
        handle.join().await.unwrap();

        assert_eq!(table.evaluate().message(), "No flight zone");
    }

    #[tokio::test]
    async fn test_fourth_authoriser_refused() {
        let table = Arc::new(AuxAuthTable::new());
        let handles: Vec<_> = (0..3)
            .map(|i| spawn_authorizer(Arc::clone(&table), Silent::new(format!("s{}", i))).unwrap())
            .collect();

        let err = spawn_authorizer(Arc::clone(&table), Silent::new("s3")).unwrap_err();
        assert!(matches!(
            err,
            SitlError::AuxAuth(AuxAuthError::CapacityExceeded)
        ));
        assert_eq!(table.evaluate().message(), "Too many auxiliary authorisers");

        for handle in &handles {
            handle.abort();
        }
    }
}
