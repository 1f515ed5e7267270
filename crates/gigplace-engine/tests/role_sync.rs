//! Gig role authoring tests (GigRoleSync against the in-memory
//! repositories): aggregation, upsert planning, and delete protection.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use gigplace_engine::{GigRoleSync, ProposalError, RoleEntry};
use gigplace_state::fakes::{MemoryCategoryStore, MemoryGigStore, MemoryProposalStore};
use gigplace_state::records::*;
use gigplace_state::repos::{GigStore, ProposalStore};

const INDUSTRY: CategoryId = CategoryId(1);
const BACKEND: CategoryId = CategoryId(11);
const FRONTEND: CategoryId = CategoryId(12);

struct Harness {
    gigs: Arc<MemoryGigStore>,
    proposals: Arc<MemoryProposalStore>,
    sync: GigRoleSync,
}

impl Harness {
    fn new() -> Self {
        let gigs = Arc::new(MemoryGigStore::new());
        let proposals = Arc::new(MemoryProposalStore::new());
        let categories = Arc::new(MemoryCategoryStore::new());

        categories.seed([
            CategoryRecord {
                id: INDUSTRY,
                name: "Software".to_string(),
                parent: None,
                is_active: true,
            },
            CategoryRecord {
                id: BACKEND,
                name: "Backend Engineer".to_string(),
                parent: Some(INDUSTRY),
                is_active: true,
            },
            CategoryRecord {
                id: FRONTEND,
                name: "Frontend Engineer".to_string(),
                parent: Some(INDUSTRY),
                is_active: true,
            },
        ]);

        let sync = GigRoleSync::new(gigs.clone(), proposals.clone(), categories);
        Self {
            gigs,
            proposals,
            sync,
        }
    }

    fn seed_gig(&self, status: GigStatus) -> GigRecord {
        let gig = GigRecord {
            id: GigId::new(),
            creator: UserId::new(),
            title: "Platform Build".to_string(),
            status,
            visibility: GigVisibility::Public,
            total_budget: Decimal::new(10_000, 0),
            is_negotiable: true,
            start_date: None,
            end_date: None,
            has_structured_roles: true,
            created_at: Utc::now(),
        };
        self.gigs.seed_gig(gig.clone());
        gig
    }
}

fn entry(niche: CategoryId, budget: i64, slots: Option<u32>) -> RoleEntry {
    RoleEntry {
        industry_id: INDUSTRY,
        niche_id: niche,
        industry_name: "Software".to_string(),
        niche_name: format!("Niche {}", niche),
        budget: Decimal::new(budget, 0),
        payment_plan: PaymentPlan::Split5050,
        description: String::new(),
        slots,
    }
}

#[tokio::test]
async fn duplicate_entries_merge_into_slot_counted_roles() {
    let h = Harness::new();
    let gig = h.seed_gig(GigStatus::Draft);

    h.sync
        .apply(
            &gig.id,
            vec![
                entry(BACKEND, 500, Some(2)),
                entry(FRONTEND, 400, None),
                entry(BACKEND, 600, None),
            ],
        )
        .await
        .expect("apply");

    let mut roles = h.gigs.roles_for(&gig.id).await.expect("roles");
    roles.sort_by_key(|r| r.niche_id.0);
    assert_eq!(roles.len(), 2);

    let backend = &roles[0];
    assert_eq!(backend.niche_id, BACKEND);
    assert_eq!(backend.slots, 3); // 2 + implicit 1
    assert_eq!(backend.budget, Decimal::new(600, 0)); // last entry wins
    assert_eq!(roles[1].slots, 1);
}

#[tokio::test]
async fn reapply_updates_and_deletes_by_composite_key() {
    let h = Harness::new();
    let gig = h.seed_gig(GigStatus::Draft);

    h.sync
        .apply(
            &gig.id,
            vec![entry(BACKEND, 500, Some(1)), entry(FRONTEND, 400, None)],
        )
        .await
        .expect("first apply");
    let before = h.gigs.roles_for(&gig.id).await.expect("roles");
    let backend_id = before
        .iter()
        .find(|r| r.niche_id == BACKEND)
        .map(|r| r.id)
        .expect("backend role");

    // Rewrite: backend stays (new budget), frontend goes away.
    h.sync
        .apply(&gig.id, vec![entry(BACKEND, 900, Some(2))])
        .await
        .expect("second apply");

    let after = h.gigs.roles_for(&gig.id).await.expect("roles");
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, backend_id); // updated in place, not recreated
    assert_eq!(after[0].budget, Decimal::new(900, 0));
    assert_eq!(after[0].slots, 2);
}

#[tokio::test]
async fn delete_is_blocked_while_role_has_proposals() {
    let h = Harness::new();
    let gig = h.seed_gig(GigStatus::Draft);

    h.sync
        .apply(
            &gig.id,
            vec![entry(BACKEND, 500, None), entry(FRONTEND, 400, None)],
        )
        .await
        .expect("apply");
    let roles = h.gigs.roles_for(&gig.id).await.expect("roles");
    let frontend_id = roles
        .iter()
        .find(|r| r.niche_id == FRONTEND)
        .map(|r| r.id)
        .expect("frontend role");

    // A committed proposal bids against the frontend role.
    h.proposals
        .persist_submission(
            NewProposal {
                gig_id: gig.id,
                sender: UserId::new(),
                total_value: Decimal::new(420, 0),
                is_negotiating: true,
                sent_at: Utc::now(),
            },
            vec![NewProposalRole {
                line_ref: RoleLineRef::Structured(frontend_id),
                role_amount: Decimal::new(400, 0),
                proposed_amount: None,
                payment_plan: PaymentPlan::Split5050,
            }],
            vec![],
        )
        .await
        .expect("persist");

    let err = h
        .sync
        .apply(&gig.id, vec![entry(BACKEND, 500, None)])
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ROLE_HAS_PROPOSALS");
    assert!(matches!(err, ProposalError::Conflict { .. }));
    // Nothing was written: both roles are still there.
    assert_eq!(h.gigs.roles_for(&gig.id).await.expect("roles").len(), 2);
}

#[tokio::test]
async fn live_gig_cannot_be_edited() {
    let h = Harness::new();
    let gig = h.seed_gig(GigStatus::Published);

    let err = h
        .sync
        .apply(&gig.id, vec![entry(BACKEND, 500, None)])
        .await
        .unwrap_err();

    assert_eq!(err.code(), "GIG_EDIT_NOT_ALLOWED");
    assert!(matches!(err, ProposalError::PermissionDenied { .. }));
}

#[tokio::test]
async fn unknown_category_reference_fails_validation() {
    let h = Harness::new();
    let gig = h.seed_gig(GigStatus::Draft);

    let mut bad = entry(BACKEND, 500, None);
    bad.niche_id = CategoryId(404);

    let err = h.sync.apply(&gig.id, vec![bad]).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_ROLE");
    assert!(h.gigs.roles_for(&gig.id).await.expect("roles").is_empty());
}

#[tokio::test]
async fn locked_gig_yields_retryable_conflict() {
    let h = Harness::new();
    let gig = h.seed_gig(GigStatus::Draft);

    let _held = h.gigs.try_lock(&gig.id).await.expect("lock");
    let err = h
        .sync
        .apply(&gig.id, vec![entry(BACKEND, 500, None)])
        .await
        .unwrap_err();

    assert_eq!(err.code(), "SUBMISSION_IN_PROGRESS");
    assert!(err.is_retryable());
}
