//! Proposal eligibility policy.
//!
//! Stateless decision logic answering "is this actor allowed to apply to
//! this gig right now?". Checks run fail-fast in a fixed order and return
//! the first violation; they never aggregate. Everything operates on data
//! already read by the orchestrator: no storage access, no side effects,
//! safe to call from any number of concurrent requests.
//!
//! Data integrity lives in the bundle validator, persistence in the
//! orchestrator. This module only decides.

use chrono::NaiveDate;

use gigplace_state::records::{GigRecord, GigRoleRecord, GigStatus, ProfileRecord, RoleStatus};

use crate::codes::PolicyFailure;
use crate::error::{EngineResult, ProposalError};

/// Stateless eligibility checks for proposal submission.
pub struct ProposalPolicy;

impl ProposalPolicy {
    /// Run all checks in order. The first violated rule is returned as a
    /// `PermissionDenied`; later rules are not evaluated.
    pub fn ensure_can_apply(
        actor: &ProfileRecord,
        gig: &GigRecord,
        gig_roles: &[GigRoleRecord],
        today: NaiveDate,
    ) -> EngineResult<()> {
        Self::check_gig_open(actor, gig, today)?;
        Self::check_actor_qualified(actor, gig, gig_roles)?;
        Self::check_financial_standing(actor)?;
        Ok(())
    }

    /// Rules 1-4: the gig must be in a state that accepts applications
    /// from this actor.
    pub fn check_gig_open(
        actor: &ProfileRecord,
        gig: &GigRecord,
        today: NaiveDate,
    ) -> EngineResult<()> {
        if gig.creator == actor.user_id {
            return Err(ProposalError::permission(
                PolicyFailure::CANNOT_APPLY_TO_OWN_GIG,
                "You cannot apply to your own projects.",
            ));
        }

        if gig.status == GigStatus::InProgress {
            return Err(ProposalError::permission(
                PolicyFailure::GIG_ALREADY_STARTED,
                "Applications for this gig are closed as the project has already commenced.",
            ));
        }

        if gig.status != GigStatus::Published {
            return Err(ProposalError::permission(
                PolicyFailure::GIG_NOT_PUBLISHED,
                "This project is no longer accepting applications.",
            ));
        }

        if matches!(gig.start_date, Some(start) if today > start) {
            return Err(ProposalError::permission(
                PolicyFailure::GIG_START_DATE_PASSED,
                "The application window for this project has closed as the start date has passed.",
            ));
        }

        Ok(())
    }

    /// Rules 5-6: the actor must be verified and, on a structured gig,
    /// match at least one open role's requirements.
    pub fn check_actor_qualified(
        actor: &ProfileRecord,
        gig: &GigRecord,
        gig_roles: &[GigRoleRecord],
    ) -> EngineResult<()> {
        if !actor.is_verified {
            return Err(ProposalError::permission(
                PolicyFailure::EMAIL_NOT_VERIFIED,
                "Verify your email to ensure your negotiations and contracts remain legally sound.",
            ));
        }

        if gig.has_structured_roles {
            let qualified = gig_roles.iter().any(|role| {
                role.status == RoleStatus::Open
                    && actor.industry_id == Some(role.industry_id)
                    && actor.niche_ids.contains(&role.niche_id)
            });

            if !qualified {
                return Err(ProposalError::permission(
                    PolicyFailure::NOT_QUALIFIED_FOR_ROLES,
                    "Your profile does not match the project role's requirements.",
                ));
            }
        }

        Ok(())
    }

    /// Rule 7: the actor must have satisfied the one-time financial
    /// prerequisite. The redirect mapper attaches the payment-page hint to
    /// this code at the orchestration layer.
    pub fn check_financial_standing(actor: &ProfileRecord) -> EngineResult<()> {
        if !actor.has_paid_onetime_fee {
            return Err(ProposalError::permission(
                PolicyFailure::SUBSCRIPTION_REQUIRED,
                "Please pay the one-time registration fee to apply.",
            ));
        }
        Ok(())
    }
}
