//! Role aggregation and gig-role synchronization.
//!
//! `aggregate_roles` is the pure merge shared by gig authoring and proposal
//! composition: duplicate (industry, niche) entries collapse into one
//! slot-counted record. `GigRoleSync` applies an aggregated set to a gig's
//! persisted roles as an upsert + guarded delete, the gig-editing half of
//! the algorithm.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::info;

use gigplace_state::records::{
    CategoryId, GigId, GigRoleId, GigRoleRecord, GigStatus, PaymentPlan, RoleStatus,
};
use gigplace_state::repos::{CategoryStore, GigStore, ProposalStore};
use gigplace_state::StorageError;
use std::sync::Arc;

use crate::codes::{ConflictFailure, PolicyFailure, ValidationFailure};
use crate::error::{EngineResult, ProposalError};

// ---------------------------------------------------------------------------
// Pure aggregation
// ---------------------------------------------------------------------------

/// One incoming role entry from an authoring payload.
#[derive(Debug, Clone)]
pub struct RoleEntry {
    pub industry_id: CategoryId,
    pub niche_id: CategoryId,
    pub industry_name: String,
    pub niche_name: String,
    pub budget: Decimal,
    pub payment_plan: PaymentPlan,
    pub description: String,
    /// Requested slot count; absent counts as one.
    pub slots: Option<u32>,
}

/// One merged role record, ready to persist or diff.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRole {
    pub industry_id: CategoryId,
    pub niche_id: CategoryId,
    pub industry_name: String,
    pub niche_name: String,
    pub budget: Decimal,
    pub payment_plan: PaymentPlan,
    pub description: String,
    pub slots: u32,
}

impl AggregatedRole {
    /// The composite key entries are grouped by.
    pub fn key(&self) -> (CategoryId, CategoryId) {
        (self.industry_id, self.niche_id)
    }
}

/// Merge duplicate (industry, niche) entries into slot-counted records.
///
/// Slot counts are summed across duplicates (a missing count contributes
/// one). For every other field the last entry for a key wins, and output
/// order is the first-seen order of keys. Last-write-wins for conflicting
/// duplicate fields mirrors the long-standing authoring behavior; callers
/// that want to reject conflicting duplicates must do so before merging.
pub fn aggregate_roles(entries: Vec<RoleEntry>) -> Vec<AggregatedRole> {
    let mut merged: Vec<AggregatedRole> = Vec::new();
    let mut by_key: HashMap<(CategoryId, CategoryId), usize> = HashMap::new();

    for entry in entries {
        let key = (entry.industry_id, entry.niche_id);
        let slots = entry.slots.unwrap_or(1).max(1);

        match by_key.get(&key) {
            Some(&i) => {
                let existing = &mut merged[i];
                existing.slots += slots;
                existing.industry_name = entry.industry_name;
                existing.niche_name = entry.niche_name;
                existing.budget = entry.budget;
                existing.payment_plan = entry.payment_plan;
                existing.description = entry.description;
            }
            None => {
                by_key.insert(key, merged.len());
                merged.push(AggregatedRole {
                    industry_id: entry.industry_id,
                    niche_id: entry.niche_id,
                    industry_name: entry.industry_name,
                    niche_name: entry.niche_name,
                    budget: entry.budget,
                    payment_plan: entry.payment_plan,
                    description: entry.description,
                    slots,
                });
            }
        }
    }

    merged
}

/// The changes needed to bring persisted roles in line with an aggregated
/// set, diffed by the (industry, niche) composite key.
#[derive(Debug, Default)]
pub struct RoleSyncPlan {
    pub insert: Vec<AggregatedRole>,
    pub update: Vec<(GigRoleId, AggregatedRole)>,
    pub delete: Vec<GigRoleId>,
}

/// Diff an aggregated role set against existing persisted records.
pub fn plan_role_sync(
    aggregated: &[AggregatedRole],
    existing: &[GigRoleRecord],
) -> RoleSyncPlan {
    let existing_by_key: HashMap<(CategoryId, CategoryId), &GigRoleRecord> = existing
        .iter()
        .map(|role| ((role.industry_id, role.niche_id), role))
        .collect();

    let mut plan = RoleSyncPlan::default();

    for role in aggregated {
        match existing_by_key.get(&role.key()) {
            Some(current) => plan.update.push((current.id, role.clone())),
            None => plan.insert.push(role.clone()),
        }
    }

    let incoming: HashMap<(CategoryId, CategoryId), ()> =
        aggregated.iter().map(|r| (r.key(), ())).collect();
    for role in existing {
        if !incoming.contains_key(&(role.industry_id, role.niche_id)) {
            plan.delete.push(role.id);
        }
    }

    plan
}

// ---------------------------------------------------------------------------
// GigRoleSync — gig-editing service
// ---------------------------------------------------------------------------

/// Applies an authored role set to a gig's persisted roles.
///
/// Locks the gig, validates category references, aggregates duplicates,
/// and upserts the result. Deleting a role that already has linked
/// proposals fails the whole operation instead of orphaning the proposal.
pub struct GigRoleSync {
    gigs: Arc<dyn GigStore>,
    proposals: Arc<dyn ProposalStore>,
    categories: Arc<dyn CategoryStore>,
}

impl GigRoleSync {
    pub fn new(
        gigs: Arc<dyn GigStore>,
        proposals: Arc<dyn ProposalStore>,
        categories: Arc<dyn CategoryStore>,
    ) -> Self {
        Self {
            gigs,
            proposals,
            categories,
        }
    }

    /// Replace the gig's required roles with the aggregated entry set.
    pub async fn apply(&self, gig_id: &GigId, entries: Vec<RoleEntry>) -> EngineResult<()> {
        let _lock = self
            .gigs
            .try_lock(gig_id)
            .await
            .map_err(|err| map_storage_error(err, gig_id))?;

        let gig = self
            .gigs
            .get(gig_id)
            .await
            .map_err(|err| map_storage_error(err, gig_id))?;

        if !matches!(gig.status, GigStatus::Draft | GigStatus::Pending) {
            return Err(ProposalError::permission(
                PolicyFailure::GIG_EDIT_NOT_ALLOWED,
                "Live gigs can only be edited using the live update workflow.",
            ));
        }

        let existing = self
            .gigs
            .roles_for(gig_id)
            .await
            .map_err(|err| map_storage_error(err, gig_id))?;
        let referenced = self
            .proposals
            .roles_with_proposals(gig_id)
            .await
            .map_err(|err| map_storage_error(err, gig_id))?;

        self.check_category_refs(&entries).await?;

        let aggregated = aggregate_roles(entries);
        let plan = plan_role_sync(&aggregated, &existing);

        if plan.delete.iter().any(|id| referenced.contains(id)) {
            return Err(ProposalError::conflict(
                ConflictFailure::ROLE_HAS_PROPOSALS,
                "Cannot remove roles that have active proposals.",
            ));
        }

        let inserts: Vec<GigRoleRecord> = plan
            .insert
            .into_iter()
            .map(|role| to_record(&gig.id, gig.is_negotiable, GigRoleId::new(), role))
            .collect();
        let updates: Vec<GigRoleRecord> = plan
            .update
            .into_iter()
            .map(|(role_id, role)| to_record(&gig.id, gig.is_negotiable, role_id, role))
            .collect();

        let inserted = inserts.len();
        let updated = updates.len();
        let deleted = plan.delete.len();

        // Single transactional call: a mid-edit failure leaves the
        // persisted role set untouched.
        self.gigs
            .sync_roles(gig_id, inserts, updates, plan.delete)
            .await
            .map_err(|err| map_storage_error(err, gig_id))?;

        info!(
            event = "gig.roles_synced",
            gig_id = %gig_id,
            inserted,
            updated,
            deleted,
        );
        Ok(())
    }

    /// Every referenced industry and niche id must resolve to a real
    /// category.
    async fn check_category_refs(&self, entries: &[RoleEntry]) -> EngineResult<()> {
        let mut ids: Vec<CategoryId> = entries
            .iter()
            .flat_map(|e| [e.industry_id, e.niche_id])
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let found = self
            .categories
            .get_many(&ids)
            .await
            .map_err(|err| ProposalError::Internal(err.into()))?;
        if found.len() != ids.len() {
            return Err(ProposalError::validation(
                ValidationFailure::INVALID_ROLE,
                "One or more selected categories are invalid or no longer available.",
            ));
        }
        Ok(())
    }
}

fn to_record(
    gig_id: &GigId,
    is_negotiable: bool,
    id: GigRoleId,
    role: AggregatedRole,
) -> GigRoleRecord {
    GigRoleRecord {
        id,
        gig_id: *gig_id,
        industry_id: role.industry_id,
        niche_id: role.niche_id,
        industry_name: role.industry_name,
        niche_name: role.niche_name,
        budget: role.budget,
        payment_plan: role.payment_plan,
        description: role.description,
        slots: role.slots,
        status: RoleStatus::Open,
        is_negotiable,
    }
}

fn map_storage_error(err: StorageError, gig_id: &GigId) -> ProposalError {
    match err {
        StorageError::LockContended { .. } => ProposalError::conflict(
            ConflictFailure::SUBMISSION_IN_PROGRESS,
            "This project is being updated by another request. Please try again shortly.",
        ),
        other => {
            tracing::error!(event = "gig.sync_storage_error", gig_id = %gig_id, error = %other);
            ProposalError::Internal(other.into())
        }
    }
}
