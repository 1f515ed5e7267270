//! Structured observability hooks for the submission lifecycle.
//!
//! Emission functions for the key events: submission start, acceptance,
//! rejection, lock contention, and notification failure, plus a
//! submission-scoped tracing span. Events are key/value `tracing` records;
//! output format is whatever subscriber the process installs.

use tracing::{info, warn};

use gigplace_state::records::{GigId, ProposalId, UserId};

/// RAII guard that enters a submission-scoped tracing span.
///
/// All tracing calls inside the guard's lifetime are associated with the
/// gig and actor of the submission attempt.
pub struct SubmissionSpan {
    _span: tracing::span::EnteredSpan,
}

impl SubmissionSpan {
    /// Create the submission span tagged with the gig and actor ids,
    /// without entering it (for instrumenting futures, where an entered
    /// guard must not be held across an await point).
    pub fn span(gig_id: &GigId, actor: &UserId) -> tracing::Span {
        tracing::info_span!("proposal.submit", gig_id = %gig_id, actor = %actor)
    }

    /// Create and enter a span tagged with the gig and actor ids.
    pub fn enter(gig_id: &GigId, actor: &UserId) -> Self {
        Self {
            _span: Self::span(gig_id, actor).entered(),
        }
    }
}

/// Emit event: a proposal was committed.
pub fn emit_submission_accepted(gig_id: &GigId, actor: &UserId, proposal_id: &ProposalId) {
    info!(
        event = "proposal.accepted",
        gig_id = %gig_id,
        actor = %actor,
        proposal_id = %proposal_id,
    );
}

/// Emit event: a submission was rejected with a domain failure code.
pub fn emit_submission_rejected(gig_id: &GigId, actor: &UserId, code: &str) {
    info!(event = "proposal.rejected", gig_id = %gig_id, actor = %actor, code = %code);
}

/// Emit event: the gig row lock was contended (warning level — the caller
/// is expected to retry).
pub fn emit_lock_contended(gig_id: &GigId, actor: &UserId) {
    warn!(event = "proposal.lock_contended", gig_id = %gig_id, actor = %actor);
}

/// Emit event: the post-commit notification hook failed. The proposal is
/// already committed; this is log-only.
pub fn emit_notify_failed(proposal_id: &ProposalId, error: &dyn std::fmt::Display) {
    warn!(event = "proposal.notify_failed", proposal_id = %proposal_id, error = %error);
}
