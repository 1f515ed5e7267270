//! Row records and typed identifiers for the gigplace marketplace.
//!
//! These types are the storage-facing view of the domain: one struct per
//! persisted row, plus newtype ids so a gig id can never be handed to a
//! proposal lookup by accident. Enum columns carry their wire names via
//! serde (`snake_case`), matching the database representation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a gig (work listing).
    GigId
);
uuid_id!(
    /// Unique identifier for a staffing line on a gig.
    GigRoleId
);
uuid_id!(
    /// Unique identifier for a proposal.
    ProposalId
);
uuid_id!(
    /// Unique identifier for a platform user.
    UserId
);

/// Identifier for a taxonomy category (industry or niche).
///
/// Taxonomy ids are small integers managed by the admin category tree,
/// not UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Enum columns
// ---------------------------------------------------------------------------

/// Lifecycle status of a gig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GigStatus {
    Draft,
    Pending,
    Published,
    InProgress,
    Completed,
    Cancelled,
    Archived,
}

/// Who can discover a gig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GigVisibility {
    Public,
    Private,
}

/// Staffing status of a gig role line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleStatus {
    Open,
    Assigned,
    Completed,
}

/// Lifecycle status of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Sent,
    Reviewing,
    Negotiating,
    Accepted,
    Rejected,
    Withdrawn,
}

/// Payment schedule for a role: everything upfront, or a fixed percentage
/// split across installments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentPlan {
    #[serde(rename = "full_upfront")]
    FullUpfront,
    #[serde(rename = "split_50_50")]
    Split5050,
    #[serde(rename = "split_60_40")]
    Split6040,
    #[serde(rename = "split_70_30")]
    Split7030,
    #[serde(rename = "split_30_40_30")]
    Split304030,
    #[serde(rename = "split_40_30_30")]
    Split403030,
    #[serde(rename = "split_50_30_20")]
    Split503020,
}

impl PaymentPlan {
    /// Percentage of the role amount released at each installment.
    pub fn percentages(&self) -> &'static [u32] {
        match self {
            PaymentPlan::FullUpfront => &[100],
            PaymentPlan::Split5050 => &[50, 50],
            PaymentPlan::Split6040 => &[60, 40],
            PaymentPlan::Split7030 => &[70, 30],
            PaymentPlan::Split304030 => &[30, 40, 30],
            PaymentPlan::Split403030 => &[40, 30, 30],
            PaymentPlan::Split503020 => &[50, 30, 20],
        }
    }

    /// Whether the plan pays out in more than one installment.
    pub fn is_split(&self) -> bool {
        !matches!(self, PaymentPlan::FullUpfront)
    }

    /// Number of installments.
    pub fn installments(&self) -> usize {
        self.percentages().len()
    }
}

/// Unit for a deliverable's estimated duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Days,
    Weeks,
    Months,
}

impl DurationUnit {
    /// Inclusive (min, max) bounds for a duration value in this unit.
    pub fn value_bounds(&self) -> (u32, u32) {
        match self {
            DurationUnit::Days => (1, 6),
            DurationUnit::Weeks => (1, 4),
            DurationUnit::Months => (1, 12),
        }
    }
}

// ---------------------------------------------------------------------------
// Gig & roles
// ---------------------------------------------------------------------------

/// A posted work listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigRecord {
    pub id: GigId,
    pub creator: UserId,
    pub title: String,
    pub status: GigStatus,
    pub visibility: GigVisibility,
    pub total_budget: Decimal,
    pub is_negotiable: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// True when the gig declares structured staffing roles; proposals must
    /// then bid against specific [`GigRoleRecord`]s.
    pub has_structured_roles: bool,
    pub created_at: DateTime<Utc>,
}

/// One staffing line on a structured gig.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigRoleRecord {
    pub id: GigRoleId,
    pub gig_id: GigId,
    /// Top-level taxonomy category this role belongs to.
    pub industry_id: CategoryId,
    /// Sub-category (profession) within the industry.
    pub niche_id: CategoryId,
    pub industry_name: String,
    pub niche_name: String,
    pub budget: Decimal,
    pub payment_plan: PaymentPlan,
    pub description: String,
    /// Number of identical positions to fill for this line.
    pub slots: u32,
    pub status: RoleStatus,
    pub is_negotiable: bool,
}

// ---------------------------------------------------------------------------
// Proposal aggregate
// ---------------------------------------------------------------------------

/// An applicant's bid against a gig.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub gig_id: GigId,
    pub sender: UserId,
    pub status: ProposalStatus,
    /// Declared worth of the proposal: summed role amounts plus service fee.
    pub total_value: Decimal,
    pub is_negotiating: bool,
    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// What a proposal role line bids against.
///
/// `Structured` references an existing [`GigRoleRecord`]; `Freeform` carries
/// only the niche category, for gigs without structured roles. The enum
/// enforces the exactly-one-of rule at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum RoleLineRef {
    Structured(GigRoleId),
    Freeform(CategoryId),
}

/// One role line inside a persisted proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalRoleRecord {
    pub proposal_id: ProposalId,
    pub line_ref: RoleLineRef,
    pub role_amount: Decimal,
    /// Renegotiated amount, when the applicant counter-offers the role budget.
    pub proposed_amount: Option<Decimal>,
    pub payment_plan: PaymentPlan,
}

impl ProposalRoleRecord {
    /// The amount this line commits to: the renegotiated figure when present,
    /// else the role amount.
    pub fn effective_amount(&self) -> Decimal {
        self.proposed_amount.unwrap_or(self.role_amount)
    }
}

/// A milestone commitment inside a persisted proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableRecord {
    pub proposal_id: ProposalId,
    pub title: String,
    pub description: String,
    pub duration_unit: DurationUnit,
    pub duration_value: u32,
    pub due_date: NaiveDate,
    /// Submission-order index; display order never relies on insertion order.
    pub position: u32,
    pub is_completed: bool,
}

// ---------------------------------------------------------------------------
// New-row inputs (ids and timestamps assigned by the store)
// ---------------------------------------------------------------------------

/// Input for inserting a proposal row.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub gig_id: GigId,
    pub sender: UserId,
    pub total_value: Decimal,
    pub is_negotiating: bool,
    pub sent_at: DateTime<Utc>,
}

/// Input for inserting a proposal role line.
#[derive(Debug, Clone)]
pub struct NewProposalRole {
    pub line_ref: RoleLineRef,
    pub role_amount: Decimal,
    pub proposed_amount: Option<Decimal>,
    pub payment_plan: PaymentPlan,
}

/// Input for inserting a deliverable line.
#[derive(Debug, Clone)]
pub struct NewDeliverable {
    pub title: String,
    pub description: String,
    pub duration_unit: DurationUnit,
    pub duration_value: u32,
    pub due_date: NaiveDate,
    pub position: u32,
}

// ---------------------------------------------------------------------------
// Taxonomy & profiles
// ---------------------------------------------------------------------------

/// A node in the two-level category taxonomy.
///
/// Top-level nodes (`parent == None`) are industries; children are niches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub name: String,
    pub parent: Option<CategoryId>,
    pub is_active: bool,
}

impl CategoryRecord {
    /// True for top-level (industry) categories.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// The slice of a user's profile the engine reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: UserId,
    /// Declared industry; None while onboarding is incomplete.
    pub industry_id: Option<CategoryId>,
    /// Declared niches (professions) within the industry.
    pub niche_ids: Vec<CategoryId>,
    pub is_verified: bool,
    pub has_paid_onetime_fee: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_plan_percentages_sum_to_100() {
        for plan in [
            PaymentPlan::FullUpfront,
            PaymentPlan::Split5050,
            PaymentPlan::Split6040,
            PaymentPlan::Split7030,
            PaymentPlan::Split304030,
            PaymentPlan::Split403030,
            PaymentPlan::Split503020,
        ] {
            assert_eq!(plan.percentages().iter().sum::<u32>(), 100, "{plan:?}");
        }
    }

    #[test]
    fn test_payment_plan_split_detection() {
        assert!(!PaymentPlan::FullUpfront.is_split());
        assert!(PaymentPlan::Split5050.is_split());
        assert_eq!(PaymentPlan::FullUpfront.installments(), 1);
        assert_eq!(PaymentPlan::Split304030.installments(), 3);
    }

    #[test]
    fn test_duration_unit_bounds() {
        assert_eq!(DurationUnit::Days.value_bounds(), (1, 6));
        assert_eq!(DurationUnit::Weeks.value_bounds(), (1, 4));
        assert_eq!(DurationUnit::Months.value_bounds(), (1, 12));
    }

    #[test]
    fn test_effective_amount_prefers_proposed() {
        let line = ProposalRoleRecord {
            proposal_id: ProposalId::new(),
            line_ref: RoleLineRef::Freeform(CategoryId(7)),
            role_amount: Decimal::new(500, 0),
            proposed_amount: Some(Decimal::new(450, 0)),
            payment_plan: PaymentPlan::Split5050,
        };
        assert_eq!(line.effective_amount(), Decimal::new(450, 0));

        let line = ProposalRoleRecord {
            proposed_amount: None,
            ..line
        };
        assert_eq!(line.effective_amount(), Decimal::new(500, 0));
    }

    #[test]
    fn test_enum_wire_names_are_snake_case() {
        assert_eq!(
            serde_json::to_string(&GigStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentPlan::Split5050).unwrap(),
            "\"split_50_50\""
        );
        assert_eq!(
            serde_json::to_string(&DurationUnit::Weeks).unwrap(),
            "\"weeks\""
        );
    }
}
