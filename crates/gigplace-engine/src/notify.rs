//! Post-commit notification hook.
//!
//! The engine tells the gig creator a proposal arrived and nothing more:
//! delivery transport (email, in-app, push) lives outside the engine. The
//! hook runs after the transaction commits, is best-effort, and must never
//! affect the committed proposal.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use gigplace_state::records::{ProposalRecord, UserId};

/// Fire-and-forget notification seam.
#[async_trait]
pub trait NotificationHook: Send + Sync {
    /// Tell the gig creator a proposal was received.
    async fn proposal_received(
        &self,
        creator: &UserId,
        proposal: &ProposalRecord,
    ) -> anyhow::Result<()>;
}

/// Default hook: emits a structured event and leaves delivery to whatever
/// subscriber is attached to the log pipeline.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationHook for TracingNotifier {
    async fn proposal_received(
        &self,
        creator: &UserId,
        proposal: &ProposalRecord,
    ) -> anyhow::Result<()> {
        info!(
            event = "notify.proposal_received",
            creator = %creator,
            proposal_id = %proposal.id,
            gig_id = %proposal.gig_id,
        );
        Ok(())
    }
}

/// Test hook that records every notification.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<(UserId, ProposalRecord)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications captured so far.
    pub fn received(&self) -> Vec<(UserId, ProposalRecord)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationHook for RecordingNotifier {
    async fn proposal_received(
        &self,
        creator: &UserId,
        proposal: &ProposalRecord,
    ) -> anyhow::Result<()> {
        self.received
            .lock()
            .unwrap()
            .push((*creator, proposal.clone()));
        Ok(())
    }
}

/// Test hook that always fails, for proving the commit survives.
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[async_trait]
impl NotificationHook for FailingNotifier {
    async fn proposal_received(
        &self,
        _creator: &UserId,
        _proposal: &ProposalRecord,
    ) -> anyhow::Result<()> {
        anyhow::bail!("notification transport unavailable")
    }
}
