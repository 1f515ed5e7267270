//! Inbound submission payload.
//!
//! `SendProposal` is the engine's entire inbound surface: the role lines the
//! applicant bids on, the deliverable milestones they commit to, and the
//! declared total value. `validate_shape` enforces the payload-format rules
//! (positivity, length caps, per-unit duration bounds) before the bundle
//! validator ever sees the data; validator rules assume a well-shaped
//! payload.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gigplace_state::records::{CategoryId, DurationUnit, PaymentPlan};

/// Maximum length of a deliverable title.
pub const MAX_TITLE_LEN: usize = 60;

/// Maximum length of a deliverable description.
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Payload-format errors, caught before any domain validation runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("a proposal must include at least one role line")]
    NoRoleLines,

    #[error("role amount must be a positive value")]
    NonPositiveRoleAmount,

    #[error("proposed amount must be a positive value when given")]
    NonPositiveProposedAmount,

    #[error("proposal value must be a positive value")]
    NonPositiveProposalValue,

    #[error("deliverable title must be 1-{MAX_TITLE_LEN} characters, got {len}")]
    TitleLength { len: usize },

    #[error("deliverable description exceeds {MAX_DESCRIPTION_LEN} characters, got {len}")]
    DescriptionTooLong { len: usize },

    #[error("for unit '{unit:?}', duration value must be between {min} and {max}, got {value}")]
    DurationOutOfRange {
        unit: DurationUnit,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// One role line the applicant bids on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedRole {
    /// Top-level taxonomy category.
    pub industry_id: CategoryId,
    /// Sub-category (profession) within the industry.
    pub niche_id: CategoryId,
    /// The role's listed amount.
    pub role_amount: Decimal,
    /// Renegotiated amount when the applicant counter-offers.
    #[serde(default)]
    pub proposed_amount: Option<Decimal>,
    pub payment_plan: PaymentPlan,
}

impl AppliedRole {
    /// The amount this line commits to: proposed if present, else listed.
    pub fn effective_amount(&self) -> Decimal {
        self.proposed_amount.unwrap_or(self.role_amount)
    }
}

/// One milestone commitment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableInput {
    pub title: String,
    pub description: String,
    pub duration_unit: DurationUnit,
    pub duration_value: u32,
    pub due_date: NaiveDate,
}

/// A complete proposal submission request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendProposal {
    pub applied_roles: Vec<AppliedRole>,
    pub deliverables: Vec<DeliverableInput>,
    /// Declared total worth: summed role amounts plus service fee.
    pub proposal_value: Decimal,
    pub sent_at: DateTime<Utc>,
}

impl SendProposal {
    /// Enforce payload-format rules. Fails on the first violation.
    pub fn validate_shape(&self) -> Result<(), PayloadError> {
        if self.applied_roles.is_empty() {
            return Err(PayloadError::NoRoleLines);
        }
        if self.proposal_value <= Decimal::ZERO {
            return Err(PayloadError::NonPositiveProposalValue);
        }
        for role in &self.applied_roles {
            if role.role_amount <= Decimal::ZERO {
                return Err(PayloadError::NonPositiveRoleAmount);
            }
            if matches!(role.proposed_amount, Some(amount) if amount <= Decimal::ZERO) {
                return Err(PayloadError::NonPositiveProposedAmount);
            }
        }
        for deliverable in &self.deliverables {
            let title_len = deliverable.title.trim().chars().count();
            if title_len == 0 || title_len > MAX_TITLE_LEN {
                return Err(PayloadError::TitleLength { len: title_len });
            }
            let description_len = deliverable.description.chars().count();
            if description_len > MAX_DESCRIPTION_LEN {
                return Err(PayloadError::DescriptionTooLong {
                    len: description_len,
                });
            }
            let (min, max) = deliverable.duration_unit.value_bounds();
            if deliverable.duration_value < min || deliverable.duration_value > max {
                return Err(PayloadError::DurationOutOfRange {
                    unit: deliverable.duration_unit,
                    value: deliverable.duration_value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Sum of effective amounts across all role lines.
    pub fn role_sum(&self) -> Decimal {
        self.applied_roles
            .iter()
            .map(AppliedRole::effective_amount)
            .sum()
    }
}
