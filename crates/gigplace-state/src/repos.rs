//! Repository trait definitions for gigplace
//!
//! These traits define the engine's persistence capabilities:
//! - `GigStore`: gig + gig-role reads, row locking, role maintenance
//! - `ProposalStore`: atomic proposal persistence and reads
//! - `CategoryStore`: taxonomy reads
//! - `ProfileStore`: applicant profile reads
//!
//! All traits are async and backend-agnostic. In-memory fakes honoring
//! the full contracts are provided via the `fakes` module.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::records::*;

// ---------------------------------------------------------------------------
// GigLock — exclusive row lock guard
// ---------------------------------------------------------------------------

/// RAII guard for an exclusive lock on a gig row.
///
/// Returned by [`GigStore::try_lock`]; the lock is held until the guard is
/// dropped. Backends map this to `SELECT ... FOR UPDATE NOWAIT` (or an
/// equivalent non-blocking exclusive acquisition) so concurrent submissions
/// against the same gig serialize instead of interleaving.
pub struct GigLock {
    gig_id: GigId,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl GigLock {
    /// Build a guard that runs `release` exactly once on drop.
    pub fn new(gig_id: GigId, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            gig_id,
            release: Some(Box::new(release)),
        }
    }

    /// The gig this guard locks.
    pub fn gig_id(&self) -> &GigId {
        &self.gig_id
    }
}

impl Drop for GigLock {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl std::fmt::Debug for GigLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GigLock").field("gig_id", &self.gig_id).finish()
    }
}

// ---------------------------------------------------------------------------
// GigStore
// ---------------------------------------------------------------------------

/// Gig and gig-role persistence.
///
/// Guarantees:
/// - `try_lock` never blocks: it either acquires the exclusive row lock
///   immediately or fails with `StorageError::LockContended`.
/// - A held [`GigLock`] excludes every other `try_lock` on the same gig
///   until dropped.
/// - `sync_roles` applies its inserts, updates, and deletes in a single
///   transaction: either the whole edit lands or none of it does. It is
///   only called by code that holds the gig's lock.
#[async_trait]
pub trait GigStore: Send + Sync {
    /// Fetch a gig by id. `StorageError::GigNotFound` if absent.
    async fn get(&self, gig_id: &GigId) -> StorageResult<GigRecord>;

    /// All staffing roles declared on the gig.
    async fn roles_for(&self, gig_id: &GigId) -> StorageResult<Vec<GigRoleRecord>>;

    /// Acquire the gig's exclusive row lock without waiting.
    async fn try_lock(&self, gig_id: &GigId) -> StorageResult<GigLock>;

    /// Atomically apply a role-set edit: insert new lines, update existing
    /// ones in place, delete the rest. `StorageError::RoleNotFound` if an
    /// update or delete targets an absent role, in which case nothing is
    /// written.
    async fn sync_roles(
        &self,
        gig_id: &GigId,
        inserts: Vec<GigRoleRecord>,
        updates: Vec<GigRoleRecord>,
        deletes: Vec<GigRoleId>,
    ) -> StorageResult<()>;
}

// ---------------------------------------------------------------------------
// ProposalStore
// ---------------------------------------------------------------------------

/// Proposal persistence.
///
/// Guarantees:
/// - `persist_submission` writes the proposal, its role lines, and its
///   deliverables in a single transaction: either all rows land or none do.
/// - The (gig, sender) uniqueness constraint is enforced inside
///   `persist_submission` and surfaces as `StorageError::DuplicateProposal`.
/// - `deliverables` returns rows ordered by their explicit `position`.
#[async_trait]
pub trait ProposalStore: Send + Sync {
    /// Atomically insert a proposal with its role lines and deliverables.
    async fn persist_submission(
        &self,
        proposal: NewProposal,
        roles: Vec<NewProposalRole>,
        deliverables: Vec<NewDeliverable>,
    ) -> StorageResult<ProposalRecord>;

    /// Fetch a proposal by id.
    async fn get(&self, proposal_id: &ProposalId) -> StorageResult<ProposalRecord>;

    /// Whether the sender already has a proposal on the gig.
    async fn exists_for(&self, gig_id: &GigId, sender: &UserId) -> StorageResult<bool>;

    /// Role lines of a proposal.
    async fn role_lines(&self, proposal_id: &ProposalId)
        -> StorageResult<Vec<ProposalRoleRecord>>;

    /// Deliverables of a proposal, ordered by position.
    async fn deliverables(&self, proposal_id: &ProposalId)
        -> StorageResult<Vec<DeliverableRecord>>;

    /// Ids of the gig's roles that are referenced by at least one proposal.
    /// Used by gig editing to refuse deleting a role somebody already bid on.
    async fn roles_with_proposals(&self, gig_id: &GigId) -> StorageResult<HashSet<GigRoleId>>;
}

// ---------------------------------------------------------------------------
// CategoryStore
// ---------------------------------------------------------------------------

/// Read access to the two-level category taxonomy.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Fetch a category by id; `None` if it does not exist.
    async fn get(&self, category_id: &CategoryId) -> StorageResult<Option<CategoryRecord>>;

    /// Fetch the categories matching the given ids. Missing ids are simply
    /// absent from the result; the caller decides whether that is an error.
    async fn get_many(&self, category_ids: &[CategoryId]) -> StorageResult<Vec<CategoryRecord>>;

    /// Active direct children of a category.
    async fn active_children(&self, parent: &CategoryId)
        -> StorageResult<Vec<CategoryRecord>>;
}

// ---------------------------------------------------------------------------
// ProfileStore
// ---------------------------------------------------------------------------

/// Read access to applicant profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile slice the engine needs.
    /// `StorageError::ProfileNotFound` if absent.
    async fn get(&self, user_id: &UserId) -> StorageResult<ProfileRecord>;
}
