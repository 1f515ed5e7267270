//! In-memory fakes for the repository traits (testing only)
//!
//! Provides `MemoryGigStore`, `MemoryProposalStore`, `MemoryCategoryStore`,
//! and `MemoryProfileStore` that satisfy the trait contracts without any
//! external dependencies. The lock and uniqueness semantics are real, not
//! stubbed: `try_lock` genuinely excludes concurrent holders and
//! `persist_submission` genuinely rejects a second (gig, sender) pair, so
//! concurrency tests run against honest behavior.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{StorageError, StorageResult};
use crate::records::*;
use crate::repos::*;

// ---------------------------------------------------------------------------
// MemoryGigStore
// ---------------------------------------------------------------------------

/// In-memory gig store with a real non-blocking lock registry.
#[derive(Debug, Default)]
pub struct MemoryGigStore {
    gigs: Mutex<HashMap<GigId, GigRecord>>,
    roles: Mutex<HashMap<GigRoleId, GigRoleRecord>>,
    locked: Arc<Mutex<HashSet<GigId>>>,
}

impl MemoryGigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a gig row.
    pub fn seed_gig(&self, gig: GigRecord) {
        self.gigs.lock().unwrap().insert(gig.id, gig);
    }

    /// Seed gig role rows.
    pub fn seed_roles(&self, roles: impl IntoIterator<Item = GigRoleRecord>) {
        let mut map = self.roles.lock().unwrap();
        for role in roles {
            map.insert(role.id, role);
        }
    }

    /// Whether the gig's row lock is currently held (test inspection).
    pub fn is_locked(&self, gig_id: &GigId) -> bool {
        self.locked.lock().unwrap().contains(gig_id)
    }
}

#[async_trait]
impl GigStore for MemoryGigStore {
    async fn get(&self, gig_id: &GigId) -> StorageResult<GigRecord> {
        self.gigs
            .lock()
            .unwrap()
            .get(gig_id)
            .cloned()
            .ok_or(StorageError::GigNotFound { gig_id: *gig_id })
    }

    async fn roles_for(&self, gig_id: &GigId) -> StorageResult<Vec<GigRoleRecord>> {
        let roles = self.roles.lock().unwrap();
        Ok(roles
            .values()
            .filter(|r| r.gig_id == *gig_id)
            .cloned()
            .collect())
    }

    async fn try_lock(&self, gig_id: &GigId) -> StorageResult<GigLock> {
        if !self.gigs.lock().unwrap().contains_key(gig_id) {
            return Err(StorageError::GigNotFound { gig_id: *gig_id });
        }
        let mut locked = self.locked.lock().unwrap();
        if !locked.insert(*gig_id) {
            return Err(StorageError::LockContended { gig_id: *gig_id });
        }
        let registry = Arc::clone(&self.locked);
        let id = *gig_id;
        Ok(GigLock::new(id, move || {
            registry.lock().unwrap().remove(&id);
        }))
    }

    async fn sync_roles(
        &self,
        _gig_id: &GigId,
        inserts: Vec<GigRoleRecord>,
        updates: Vec<GigRoleRecord>,
        deletes: Vec<GigRoleId>,
    ) -> StorageResult<()> {
        // One mutex hold is the transaction: the whole edit is validated
        // before the first row changes.
        let mut roles = self.roles.lock().unwrap();

        for role in &updates {
            if !roles.contains_key(&role.id) {
                return Err(StorageError::RoleNotFound { role_id: role.id });
            }
        }
        for role_id in &deletes {
            if !roles.contains_key(role_id) {
                return Err(StorageError::RoleNotFound { role_id: *role_id });
            }
        }

        for role in inserts {
            roles.insert(role.id, role);
        }
        for role in updates {
            roles.insert(role.id, role);
        }
        for role_id in &deletes {
            roles.remove(role_id);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryProposalStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ProposalState {
    proposals: HashMap<ProposalId, ProposalRecord>,
    /// Mirror of the (gig, sender) unique constraint.
    pairs: HashSet<(GigId, UserId)>,
    role_lines: HashMap<ProposalId, Vec<ProposalRoleRecord>>,
    deliverables: HashMap<ProposalId, Vec<DeliverableRecord>>,
}

/// In-memory proposal store with real uniqueness and all-or-nothing persist.
#[derive(Debug, Default)]
pub struct MemoryProposalStore {
    state: Mutex<ProposalState>,
}

impl MemoryProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed proposals (test inspection).
    pub fn committed_count(&self) -> usize {
        self.state.lock().unwrap().proposals.len()
    }
}

#[async_trait]
impl ProposalStore for MemoryProposalStore {
    async fn persist_submission(
        &self,
        proposal: NewProposal,
        roles: Vec<NewProposalRole>,
        deliverables: Vec<NewDeliverable>,
    ) -> StorageResult<ProposalRecord> {
        // Single mutex hold = single transaction: nothing lands unless
        // the uniqueness check passes.
        let mut state = self.state.lock().unwrap();

        let pair = (proposal.gig_id, proposal.sender);
        if !state.pairs.insert(pair) {
            return Err(StorageError::DuplicateProposal {
                gig_id: proposal.gig_id,
                sender: proposal.sender,
            });
        }

        let id = ProposalId::new();
        let record = ProposalRecord {
            id,
            gig_id: proposal.gig_id,
            sender: proposal.sender,
            status: ProposalStatus::Sent,
            total_value: proposal.total_value,
            is_negotiating: proposal.is_negotiating,
            sent_at: proposal.sent_at,
            created_at: Utc::now(),
        };
        state.proposals.insert(id, record.clone());

        let lines = roles
            .into_iter()
            .map(|r| ProposalRoleRecord {
                proposal_id: id,
                line_ref: r.line_ref,
                role_amount: r.role_amount,
                proposed_amount: r.proposed_amount,
                payment_plan: r.payment_plan,
            })
            .collect();
        state.role_lines.insert(id, lines);

        let rows = deliverables
            .into_iter()
            .map(|d| DeliverableRecord {
                proposal_id: id,
                title: d.title,
                description: d.description,
                duration_unit: d.duration_unit,
                duration_value: d.duration_value,
                due_date: d.due_date,
                position: d.position,
                is_completed: false,
            })
            .collect();
        state.deliverables.insert(id, rows);

        Ok(record)
    }

    async fn get(&self, proposal_id: &ProposalId) -> StorageResult<ProposalRecord> {
        self.state
            .lock()
            .unwrap()
            .proposals
            .get(proposal_id)
            .cloned()
            .ok_or(StorageError::ProposalNotFound {
                proposal_id: *proposal_id,
            })
    }

    async fn exists_for(&self, gig_id: &GigId, sender: &UserId) -> StorageResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(state.pairs.contains(&(*gig_id, *sender)))
    }

    async fn role_lines(
        &self,
        proposal_id: &ProposalId,
    ) -> StorageResult<Vec<ProposalRoleRecord>> {
        let state = self.state.lock().unwrap();
        if !state.proposals.contains_key(proposal_id) {
            return Err(StorageError::ProposalNotFound {
                proposal_id: *proposal_id,
            });
        }
        Ok(state.role_lines.get(proposal_id).cloned().unwrap_or_default())
    }

    async fn deliverables(
        &self,
        proposal_id: &ProposalId,
    ) -> StorageResult<Vec<DeliverableRecord>> {
        let state = self.state.lock().unwrap();
        if !state.proposals.contains_key(proposal_id) {
            return Err(StorageError::ProposalNotFound {
                proposal_id: *proposal_id,
            });
        }
        let mut rows = state.deliverables.get(proposal_id).cloned().unwrap_or_default();
        rows.sort_by_key(|d| d.position);
        Ok(rows)
    }

    async fn roles_with_proposals(&self, gig_id: &GigId) -> StorageResult<HashSet<GigRoleId>> {
        let state = self.state.lock().unwrap();
        let mut referenced = HashSet::new();
        for (id, proposal) in &state.proposals {
            if proposal.gig_id != *gig_id {
                continue;
            }
            if let Some(lines) = state.role_lines.get(id) {
                for line in lines {
                    if let RoleLineRef::Structured(role_id) = line.line_ref {
                        referenced.insert(role_id);
                    }
                }
            }
        }
        Ok(referenced)
    }
}

// ---------------------------------------------------------------------------
// MemoryCategoryStore
// ---------------------------------------------------------------------------

/// In-memory taxonomy backed by a `HashMap<CategoryId, CategoryRecord>`.
#[derive(Debug, Default)]
pub struct MemoryCategoryStore {
    categories: Mutex<HashMap<CategoryId, CategoryRecord>>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed taxonomy rows.
    pub fn seed(&self, categories: impl IntoIterator<Item = CategoryRecord>) {
        let mut map = self.categories.lock().unwrap();
        for category in categories {
            map.insert(category.id, category);
        }
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn get(&self, category_id: &CategoryId) -> StorageResult<Option<CategoryRecord>> {
        Ok(self.categories.lock().unwrap().get(category_id).cloned())
    }

    async fn get_many(
        &self,
        category_ids: &[CategoryId],
    ) -> StorageResult<Vec<CategoryRecord>> {
        let map = self.categories.lock().unwrap();
        Ok(category_ids
            .iter()
            .filter_map(|id| map.get(id).cloned())
            .collect())
    }

    async fn active_children(
        &self,
        parent: &CategoryId,
    ) -> StorageResult<Vec<CategoryRecord>> {
        let map = self.categories.lock().unwrap();
        Ok(map
            .values()
            .filter(|c| c.parent == Some(*parent) && c.is_active)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryProfileStore
// ---------------------------------------------------------------------------

/// In-memory profile store.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<UserId, ProfileRecord>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a profile row.
    pub fn seed(&self, profile: ProfileRecord) {
        self.profiles.lock().unwrap().insert(profile.user_id, profile);
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, user_id: &UserId) -> StorageResult<ProfileRecord> {
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or(StorageError::ProfileNotFound { user_id: *user_id })
    }
}
