//! Proposal submission orchestrator.
//!
//! `ProposalService` coordinates the end-to-end submission workflow:
//! payload shape check, eligibility policy, bundle validation, the
//! exclusive gig row lock, role-line resolution, atomic persistence, and
//! the post-commit notification. Policies decide, validators check,
//! repositories persist; this service only sequences them.
//!
//! The service is composed once at process startup with its repository
//! capabilities and configuration, then shared across requests.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, Instrument};

use gigplace_state::records::{
    CategoryId, GigRecord, GigRoleRecord, NewDeliverable, NewProposal, NewProposalRole,
    ProposalRecord, RoleLineRef, UserId,
};
use gigplace_state::repos::{CategoryStore, GigStore, ProfileStore, ProposalStore};
use gigplace_state::{GigId, StorageError};

use crate::codes::{ConflictFailure, ValidationFailure};
use crate::config::EngineConfig;
use crate::error::{EngineResult, ProposalError};
use crate::notify::NotificationHook;
use crate::obs;
use crate::payload::SendProposal;
use crate::policy::ProposalPolicy;
use crate::redirects::redirect_for;
use crate::validator::{BundleValidator, TaxonomyIndex};

/// Orchestrates the proposal lifecycle against injected repositories.
pub struct ProposalService {
    gigs: Arc<dyn GigStore>,
    proposals: Arc<dyn ProposalStore>,
    categories: Arc<dyn CategoryStore>,
    profiles: Arc<dyn ProfileStore>,
    notifier: Arc<dyn NotificationHook>,
    config: EngineConfig,
}

impl ProposalService {
    pub fn new(
        gigs: Arc<dyn GigStore>,
        proposals: Arc<dyn ProposalStore>,
        categories: Arc<dyn CategoryStore>,
        profiles: Arc<dyn ProfileStore>,
        notifier: Arc<dyn NotificationHook>,
        config: EngineConfig,
    ) -> Self {
        Self {
            gigs,
            proposals,
            categories,
            profiles,
            notifier,
            config,
        }
    }

    /// Execute the end-to-end proposal submission process.
    ///
    /// Workflow:
    /// 1. Payload shape check (format rules).
    /// 2. Eligibility policy over gig + actor state; the subscription
    ///    failure gets its payment-page redirect attached here.
    /// 3. Bundle validation against the gig and taxonomy. Nothing is
    ///    written before 2-3 pass.
    /// 4. Exclusive, non-blocking gig row lock; contention is a retryable
    ///    conflict, not a queue.
    /// 5. Role-line resolution against the gig's structured roles.
    /// 6. Atomic persistence of proposal + role lines + deliverables; the
    ///    (gig, sender) unique constraint backstops the same-sender race.
    /// 7. Post-commit notification, best-effort.
    pub async fn submit(
        &self,
        actor: UserId,
        gig_id: GigId,
        payload: SendProposal,
    ) -> EngineResult<ProposalRecord> {
        let span = obs::SubmissionSpan::span(&gig_id, &actor);
        async {
            let result = self.submit_inner(actor, gig_id, payload).await;
            match &result {
                Ok(proposal) => obs::emit_submission_accepted(&gig_id, &actor, &proposal.id),
                Err(err) => obs::emit_submission_rejected(&gig_id, &actor, err.code()),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn submit_inner(
        &self,
        actor: UserId,
        gig_id: GigId,
        payload: SendProposal,
    ) -> EngineResult<ProposalRecord> {
        payload.validate_shape()?;

        let gig = self
            .gigs
            .get(&gig_id)
            .await
            .map_err(|err| self.storage_failure(err, &gig_id, &actor))?;
        let gig_roles = self
            .gigs
            .roles_for(&gig_id)
            .await
            .map_err(|err| self.storage_failure(err, &gig_id, &actor))?;
        let profile = self
            .profiles
            .get(&actor)
            .await
            .map_err(|err| self.storage_failure(err, &gig_id, &actor))?;

        let today = Utc::now().date_naive();
        ProposalPolicy::ensure_can_apply(&profile, &gig, &gig_roles, today)
            .map_err(|err| self.attach_redirect(err))?;

        // Early duplicate check; the storage constraint in
        // persist_submission remains the backstop for the race window.
        let already_applied = self
            .proposals
            .exists_for(&gig_id, &actor)
            .await
            .map_err(|err| self.storage_failure(err, &gig_id, &actor))?;
        if already_applied {
            return Err(duplicate_application());
        }

        let taxonomy = self.load_taxonomy(&payload).await?;
        BundleValidator::validate(&payload, &gig, &taxonomy, &self.config)?;

        // Serializes concurrent submissions against this gig; the second
        // caller fails fast instead of queuing behind the first.
        let lock = match self.gigs.try_lock(&gig_id).await {
            Ok(lock) => lock,
            Err(StorageError::LockContended { .. }) => {
                obs::emit_lock_contended(&gig_id, &actor);
                return Err(ProposalError::conflict(
                    ConflictFailure::SUBMISSION_IN_PROGRESS,
                    "Another submission for this project is being processed. Please try again.",
                ));
            }
            Err(err) => return Err(self.storage_failure(err, &gig_id, &actor)),
        };

        // Re-read roles under the lock so resolution sees the latest
        // committed state.
        let gig_roles = self
            .gigs
            .roles_for(&gig_id)
            .await
            .map_err(|err| self.storage_failure(err, &gig_id, &actor))?;

        let role_lines = resolve_role_lines(&gig, &gig_roles, &payload)?;
        let deliverables = positioned_deliverables(&payload);

        let new_proposal = NewProposal {
            gig_id,
            sender: actor,
            total_value: payload.proposal_value,
            is_negotiating: true,
            sent_at: payload.sent_at,
        };

        let proposal = self
            .proposals
            .persist_submission(new_proposal, role_lines, deliverables)
            .await
            .map_err(|err| match err {
                StorageError::DuplicateProposal { .. } => duplicate_application(),
                other => self.storage_failure(other, &gig_id, &actor),
            })?;

        drop(lock);

        // Best-effort: a notification failure never rolls back the
        // committed proposal.
        if let Err(err) = self
            .notifier
            .proposal_received(&gig.creator, &proposal)
            .await
        {
            obs::emit_notify_failed(&proposal.id, &err);
        }

        Ok(proposal)
    }

    /// Fetch the taxonomy slice the payload references and index it.
    async fn load_taxonomy(&self, payload: &SendProposal) -> EngineResult<TaxonomyIndex> {
        let mut industry_ids: Vec<CategoryId> = payload
            .applied_roles
            .iter()
            .map(|role| role.industry_id)
            .collect();
        industry_ids.sort_unstable();
        industry_ids.dedup();

        let mut records = self
            .categories
            .get_many(&industry_ids)
            .await
            .map_err(|err| ProposalError::Internal(err.into()))?;
        for industry_id in &industry_ids {
            let children = self
                .categories
                .active_children(industry_id)
                .await
                .map_err(|err| ProposalError::Internal(err.into()))?;
            records.extend(children);
        }

        Ok(TaxonomyIndex::from_records(records))
    }

    /// Attach the navigation hint to failures the user can resolve
    /// elsewhere; currently only the subscription prerequisite has one.
    fn attach_redirect(&self, err: ProposalError) -> ProposalError {
        match err {
            ProposalError::PermissionDenied {
                detail,
                message,
                redirect_url: None,
            } => {
                let redirect_url = redirect_for(detail.code, &self.config);
                ProposalError::PermissionDenied {
                    detail,
                    message,
                    redirect_url,
                }
            }
            other => other,
        }
    }

    /// Log an unexpected storage failure with its context and return the
    /// opaque variant; raw backend detail never reaches the caller.
    fn storage_failure(
        &self,
        err: StorageError,
        gig_id: &GigId,
        actor: &UserId,
    ) -> ProposalError {
        error!(
            event = "proposal.storage_error",
            gig_id = %gig_id,
            actor = %actor,
            error = %err,
        );
        ProposalError::Internal(err.into())
    }
}

fn duplicate_application() -> ProposalError {
    ProposalError::conflict(
        ConflictFailure::DUPLICATE_APPLICATION,
        "You have already submitted a proposal for this project.",
    )
}

/// Resolve payload role lines into persistable rows.
///
/// On a structured gig every line must match exactly one existing GigRole
/// by niche id: a missing niche is a resolution failure, and two roles
/// answering to the same niche make the reference ambiguous. Both abort
/// the submission; lines are never silently skipped. Unstructured gigs
/// take the line as a freeform category reference.
fn resolve_role_lines(
    gig: &GigRecord,
    gig_roles: &[GigRoleRecord],
    payload: &SendProposal,
) -> EngineResult<Vec<NewProposalRole>> {
    let mut lines = Vec::with_capacity(payload.applied_roles.len());

    for applied in &payload.applied_roles {
        let line_ref = if gig.has_structured_roles {
            let mut matches = gig_roles.iter().filter(|role| role.niche_id == applied.niche_id);
            let first = matches.next();
            let second = matches.next();
            match (first, second) {
                (Some(role), None) => RoleLineRef::Structured(role.id),
                (None, _) => {
                    return Err(ProposalError::validation(
                        ValidationFailure::ROLE_NOT_FOUND,
                        format!(
                            "This project has no role for the selected profession (category {}).",
                            applied.niche_id
                        ),
                    ));
                }
                (Some(_), Some(_)) => {
                    return Err(ProposalError::validation(
                        ValidationFailure::INVALID_ROLE,
                        format!(
                            "The selected profession (category {}) matches more than one role on this project.",
                            applied.niche_id
                        ),
                    ));
                }
            }
        } else {
            RoleLineRef::Freeform(applied.niche_id)
        };

        lines.push(NewProposalRole {
            line_ref,
            role_amount: applied.role_amount,
            proposed_amount: applied.proposed_amount,
            payment_plan: applied.payment_plan,
        });
    }

    Ok(lines)
}

/// Assign explicit positions preserving submission order.
fn positioned_deliverables(payload: &SendProposal) -> Vec<NewDeliverable> {
    payload
        .deliverables
        .iter()
        .enumerate()
        .map(|(position, d)| NewDeliverable {
            title: d.title.trim().to_string(),
            description: d.description.trim().to_string(),
            duration_unit: d.duration_unit,
            duration_value: d.duration_value,
            due_date: d.due_date,
            position: position as u32,
        })
        .collect()
}
