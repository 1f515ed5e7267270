//! Bundle validator.
//!
//! Enforces domain invariants over the submission payload against the
//! target gig, independent of who the actor is. Pure logic over data the
//! orchestrator already read: no storage access, no side effects.
//!
//! Taxonomy integrity is a hard precondition for the financial checks —
//! a role set that does not resolve to one valid industry has no meaningful
//! role sum — so it always runs first.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::Duration;
use rust_decimal::{Decimal, RoundingStrategy};

use gigplace_state::records::{CategoryId, CategoryRecord, GigRecord};

use crate::codes::ValidationFailure;
use crate::config::EngineConfig;
use crate::error::{EngineResult, ProposalError};
use crate::payload::SendProposal;

// ---------------------------------------------------------------------------
// Money helpers
// ---------------------------------------------------------------------------

/// Round a currency amount to 2 decimal places, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Platform service fee for a summed role amount.
pub fn service_fee(role_sum: Decimal, rate: Decimal) -> Decimal {
    round_money(role_sum * rate)
}

/// The total a proposal must declare: rounded role sum plus service fee.
pub fn expected_total(role_sum: Decimal, rate: Decimal) -> Decimal {
    round_money(role_sum) + service_fee(role_sum, rate)
}

// ---------------------------------------------------------------------------
// TaxonomyIndex
// ---------------------------------------------------------------------------

/// Read-optimized snapshot of the category taxonomy slice a validation
/// needs: the candidate industries plus their active niches.
#[derive(Debug, Default)]
pub struct TaxonomyIndex {
    categories: HashMap<CategoryId, CategoryRecord>,
    /// Active children per parent category.
    active_children: HashMap<CategoryId, HashSet<CategoryId>>,
}

impl TaxonomyIndex {
    /// Build an index from category rows. Both industry rows and their
    /// (active) child rows belong in the input; inactive children are
    /// indexed as categories but never as valid niches.
    pub fn from_records(records: impl IntoIterator<Item = CategoryRecord>) -> Self {
        let mut index = TaxonomyIndex::default();
        for record in records {
            if record.is_active {
                if let Some(parent) = record.parent {
                    index
                        .active_children
                        .entry(parent)
                        .or_default()
                        .insert(record.id);
                }
            }
            index.categories.insert(record.id, record);
        }
        index
    }

    /// Look up a category by id.
    pub fn category(&self, id: &CategoryId) -> Option<&CategoryRecord> {
        self.categories.get(id)
    }

    /// Active niche ids under the given industry.
    pub fn active_niches(&self, industry_id: &CategoryId) -> Option<&HashSet<CategoryId>> {
        self.active_children.get(industry_id)
    }
}

// ---------------------------------------------------------------------------
// BundleValidator
// ---------------------------------------------------------------------------

/// Stateless validator for proposal bundle invariants.
pub struct BundleValidator;

impl BundleValidator {
    /// Ensure the payload is logically consistent with the target gig.
    ///
    /// Check order: taxonomy integrity, minimum role amounts, total-amount
    /// reconciliation, deliverable timeline. Fails on the first violation.
    pub fn validate(
        payload: &SendProposal,
        gig: &GigRecord,
        taxonomy: &TaxonomyIndex,
        config: &EngineConfig,
    ) -> EngineResult<()> {
        Self::check_taxonomy(payload, taxonomy)?;
        Self::check_minimum_amounts(payload, config)?;
        Self::check_reconciliation(payload, config)?;
        Self::check_deliverable_timeline(payload, gig, config)?;
        Ok(())
    }

    /// All role lines must reference exactly one valid, active, top-level
    /// industry, and every niche must be an active child of that industry.
    pub fn check_taxonomy(payload: &SendProposal, taxonomy: &TaxonomyIndex) -> EngineResult<()> {
        // BTreeSet for a deterministic "which industry" pick below.
        let industries: BTreeSet<CategoryId> = payload
            .applied_roles
            .iter()
            .map(|role| role.industry_id)
            .collect();

        if industries.len() > 1 {
            return Err(ProposalError::validation(
                ValidationFailure::MULTIPLE_INDUSTRIES_NOT_ALLOWED,
                "Select professionals from a single industry per proposal.",
            ));
        }
        let industry_id = match industries.first() {
            Some(id) => *id,
            None => return Ok(()), // shape validation already rejects empty role sets
        };

        let industry_ok = taxonomy
            .category(&industry_id)
            .map(|c| c.is_root() && c.is_active)
            .unwrap_or(false);
        if !industry_ok {
            return Err(ProposalError::validation(
                ValidationFailure::INVALID_INDUSTRY,
                "The selected industry is invalid or no longer available.",
            ));
        }

        let empty = HashSet::new();
        let valid_niches = taxonomy.active_niches(&industry_id).unwrap_or(&empty);
        let all_valid = payload
            .applied_roles
            .iter()
            .all(|role| valid_niches.contains(&role.niche_id));
        if !all_valid {
            return Err(ProposalError::validation(
                ValidationFailure::INVALID_ROLE,
                "One or more selected roles do not belong to the chosen industry.",
            ));
        }

        Ok(())
    }

    /// Every role line's effective amount must meet the fair pricing floor.
    pub fn check_minimum_amounts(payload: &SendProposal, config: &EngineConfig) -> EngineResult<()> {
        for role in &payload.applied_roles {
            if role.effective_amount() < config.min_role_amount {
                return Err(ProposalError::validation(
                    ValidationFailure::INVALID_AMOUNT,
                    format!(
                        "Role amounts below {} are not allowed under the fair pricing policy.",
                        config.min_role_amount
                    ),
                ));
            }
        }
        Ok(())
    }

    /// The declared proposal value must equal the summed effective amounts
    /// plus the service fee, to the cent.
    pub fn check_reconciliation(payload: &SendProposal, config: &EngineConfig) -> EngineResult<()> {
        let role_sum = payload.role_sum();
        let expected = expected_total(role_sum, config.service_fee_rate);
        let declared = round_money(payload.proposal_value);

        if declared != expected {
            return Err(ProposalError::validation(
                ValidationFailure::UNBALANCED_BUDGET,
                format!(
                    "Declared proposal value {} does not match the expected total {} \
                     (roles {} + service fee {}).",
                    declared,
                    expected,
                    round_money(role_sum),
                    service_fee(role_sum, config.service_fee_rate),
                ),
            ));
        }
        Ok(())
    }

    /// When the gig has an end date, every deliverable must be due on or
    /// before `end_date - cutoff_days`.
    pub fn check_deliverable_timeline(
        payload: &SendProposal,
        gig: &GigRecord,
        config: &EngineConfig,
    ) -> EngineResult<()> {
        let Some(end_date) = gig.end_date else {
            return Ok(());
        };
        let cutoff = end_date - Duration::days(config.deliverable_cutoff_days);

        for deliverable in &payload.deliverables {
            if deliverable.due_date > cutoff {
                return Err(ProposalError::validation(
                    ValidationFailure::DURATION_EXCEEDS_LIMIT,
                    format!(
                        "Deliverable \"{}\" is due after {}, the latest allowed date for this project.",
                        deliverable.title, cutoff
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use gigplace_state::records::*;
    use crate::payload::{AppliedRole, DeliverableInput};

    fn taxonomy() -> TaxonomyIndex {
        TaxonomyIndex::from_records([
            CategoryRecord {
                id: CategoryId(1),
                name: "Software".to_string(),
                parent: None,
                is_active: true,
            },
            CategoryRecord {
                id: CategoryId(2),
                name: "Design".to_string(),
                parent: None,
                is_active: true,
            },
            CategoryRecord {
                id: CategoryId(3),
                name: "Retired Industry".to_string(),
                parent: None,
                is_active: false,
            },
            CategoryRecord {
                id: CategoryId(11),
                name: "Backend".to_string(),
                parent: Some(CategoryId(1)),
                is_active: true,
            },
            CategoryRecord {
                id: CategoryId(12),
                name: "Frontend".to_string(),
                parent: Some(CategoryId(1)),
                is_active: true,
            },
            CategoryRecord {
                id: CategoryId(13),
                name: "Flash Developer".to_string(),
                parent: Some(CategoryId(1)),
                is_active: false,
            },
            CategoryRecord {
                id: CategoryId(21),
                name: "Illustration".to_string(),
                parent: Some(CategoryId(2)),
                is_active: true,
            },
        ])
    }

    fn gig() -> GigRecord {
        GigRecord {
            id: GigId::new(),
            creator: UserId::new(),
            title: "Test".to_string(),
            status: GigStatus::Published,
            visibility: GigVisibility::Public,
            total_budget: Decimal::new(5000, 0),
            is_negotiable: true,
            start_date: None,
            end_date: Some(NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()),
            has_structured_roles: false,
            created_at: Utc::now(),
        }
    }

    fn role(industry: i64, niche: i64, amount: Decimal) -> AppliedRole {
        AppliedRole {
            industry_id: CategoryId(industry),
            niche_id: CategoryId(niche),
            role_amount: amount,
            proposed_amount: None,
            payment_plan: PaymentPlan::Split5050,
        }
    }

    fn deliverable(due: NaiveDate) -> DeliverableInput {
        DeliverableInput {
            title: "Milestone".to_string(),
            description: "Work".to_string(),
            duration_unit: DurationUnit::Weeks,
            duration_value: 2,
            due_date: due,
        }
    }

    fn payload(roles: Vec<AppliedRole>, value: Decimal) -> SendProposal {
        SendProposal {
            applied_roles: roles,
            deliverables: vec![deliverable(NaiveDate::from_ymd_opt(2025, 6, 27).unwrap())],
            proposal_value: value,
            sent_at: Utc::now(),
        }
    }

    fn code_of(result: EngineResult<()>) -> &'static str {
        result.unwrap_err().code()
    }

    #[test]
    fn test_fee_rounding_half_up() {
        let rate = Decimal::new(5, 2);
        // 100.10 * 0.05 = 5.005 -> rounds up to 5.01
        assert_eq!(
            service_fee(Decimal::new(10010, 2), rate),
            Decimal::new(501, 2)
        );
        assert_eq!(
            expected_total(Decimal::new(100000, 2), rate),
            Decimal::new(105000, 2)
        );
    }

    #[test]
    fn test_spec_scenario_1000_at_5_percent() {
        let config = EngineConfig::default();
        let gig = gig();
        let tax = taxonomy();
        let roles = vec![role(1, 11, Decimal::new(100000, 2))];

        // Exactly 1050.00 passes.
        let ok = payload(roles.clone(), Decimal::new(105000, 2));
        assert!(BundleValidator::validate(&ok, &gig, &tax, &config).is_ok());

        // One cent off in either direction fails.
        for declared in [Decimal::new(104999, 2), Decimal::new(105001, 2)] {
            let bad = payload(roles.clone(), declared);
            let err = BundleValidator::validate(&bad, &gig, &tax, &config).unwrap_err();
            assert_eq!(err.code(), "UNBALANCED_BUDGET");
            // "Naming both figures": message carries declared and expected.
            let msg = err.rejection().message;
            assert!(msg.contains("1050.00"), "{msg}");
            assert!(msg.contains(&declared.to_string()), "{msg}");
        }
    }

    #[test]
    fn test_multiple_industries_rejected_regardless_of_amounts() {
        let config = EngineConfig::default();
        let roles = vec![
            role(1, 11, Decimal::new(1000, 0)),
            role(2, 21, Decimal::new(1000, 0)),
        ];
        let p = payload(roles, Decimal::new(2100, 0));
        assert_eq!(
            code_of(BundleValidator::check_taxonomy(&p, &taxonomy())),
            "MULTIPLE_INDUSTRIES_NOT_ALLOWED"
        );
    }

    #[test]
    fn test_unknown_and_inactive_and_non_root_industries_rejected() {
        for industry in [99, 3, 11] {
            let p = payload(vec![role(industry, 11, Decimal::new(100, 0))], Decimal::new(105, 0));
            assert_eq!(
                code_of(BundleValidator::check_taxonomy(&p, &taxonomy())),
                "INVALID_INDUSTRY",
                "industry {industry}"
            );
        }
    }

    #[test]
    fn test_niche_must_be_active_child_of_industry() {
        // Niche from another industry.
        let p = payload(vec![role(1, 21, Decimal::new(100, 0))], Decimal::new(105, 0));
        assert_eq!(
            code_of(BundleValidator::check_taxonomy(&p, &taxonomy())),
            "INVALID_ROLE"
        );

        // Inactive niche of the right industry.
        let p = payload(vec![role(1, 13, Decimal::new(100, 0))], Decimal::new(105, 0));
        assert_eq!(
            code_of(BundleValidator::check_taxonomy(&p, &taxonomy())),
            "INVALID_ROLE"
        );
    }

    #[test]
    fn test_minimum_amount_uses_effective_amount() {
        let config = EngineConfig::default();

        // role_amount under the floor.
        let p = payload(vec![role(1, 11, Decimal::new(49, 0))], Decimal::new(52, 0));
        assert_eq!(
            code_of(BundleValidator::check_minimum_amounts(&p, &config)),
            "INVALID_AMOUNT"
        );

        // role_amount fine but proposed_amount drops below the floor.
        let mut under = role(1, 11, Decimal::new(500, 0));
        under.proposed_amount = Some(Decimal::new(4999, 2));
        let p = payload(vec![under], Decimal::new(525, 0));
        assert_eq!(
            code_of(BundleValidator::check_minimum_amounts(&p, &config)),
            "INVALID_AMOUNT"
        );

        // Exactly 50 passes.
        let p = payload(vec![role(1, 11, Decimal::new(50, 0))], Decimal::new(525, 1));
        assert!(BundleValidator::check_minimum_amounts(&p, &config).is_ok());
    }

    #[test]
    fn test_reconciliation_uses_proposed_amounts() {
        let config = EngineConfig::default();
        let mut line = role(1, 11, Decimal::new(100000, 2));
        line.proposed_amount = Some(Decimal::new(80000, 2));

        // Expected total follows the proposed amount: 800 + 40 = 840.
        let p = payload(vec![line.clone()], Decimal::new(84000, 2));
        assert!(BundleValidator::check_reconciliation(&p, &config).is_ok());

        // Declaring against the original role amount fails.
        let p = payload(vec![line], Decimal::new(105000, 2));
        assert_eq!(
            code_of(BundleValidator::check_reconciliation(&p, &config)),
            "UNBALANCED_BUDGET"
        );
    }

    #[test]
    fn test_deliverable_cutoff_boundary() {
        let config = EngineConfig::default();
        let gig = gig(); // ends 2025-06-30, cutoff 2025-06-27

        let mut p = payload(vec![role(1, 11, Decimal::new(100, 0))], Decimal::new(105, 0));
        p.deliverables = vec![deliverable(NaiveDate::from_ymd_opt(2025, 6, 27).unwrap())];
        assert!(BundleValidator::check_deliverable_timeline(&p, &gig, &config).is_ok());

        p.deliverables = vec![deliverable(NaiveDate::from_ymd_opt(2025, 6, 28).unwrap())];
        let err = BundleValidator::check_deliverable_timeline(&p, &gig, &config).unwrap_err();
        assert_eq!(err.code(), "DURATION_EXCEEDS_LIMIT");
        assert!(err.rejection().message.contains("2025-06-27"));
    }

    #[test]
    fn test_no_end_date_skips_timeline_check() {
        let config = EngineConfig::default();
        let mut gig = gig();
        gig.end_date = None;
        let mut p = payload(vec![role(1, 11, Decimal::new(100, 0))], Decimal::new(105, 0));
        p.deliverables = vec![deliverable(NaiveDate::from_ymd_opt(2099, 1, 1).unwrap())];
        assert!(BundleValidator::check_deliverable_timeline(&p, &gig, &config).is_ok());
    }
}
