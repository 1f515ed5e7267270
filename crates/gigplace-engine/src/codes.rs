//! Domain failure code registry.
//!
//! A closed registry of stable `(code, title)` pairs for every failure the
//! proposal engine can report, split into three families: policy
//! (authorization/eligibility), validation (structural/financial), and
//! conflict (lock contention and storage races). Policies, validators, and
//! the orchestrator all reference these constants so error reporting stays
//! consistent across the platform.

use serde::Serialize;

/// A structured representation of a domain failure: a unique
/// machine-readable code plus a brief human-readable title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FailureDetail {
    pub code: &'static str,
    pub title: &'static str,
}

impl FailureDetail {
    pub const fn new(code: &'static str, title: &'static str) -> Self {
        Self { code, title }
    }
}

/// Authorization and business policy violations: the actor or action
/// breaks a marketplace rule (eligibility, project status, subscription).
pub struct PolicyFailure;

impl PolicyFailure {
    pub const CANNOT_APPLY_TO_OWN_GIG: FailureDetail =
        FailureDetail::new("CANNOT_APPLY_TO_OWN_GIG", "Self-Application Restricted");
    pub const EMAIL_NOT_VERIFIED: FailureDetail =
        FailureDetail::new("EMAIL_VERIFICATION_REQUIRED", "Email Verification Pending");
    pub const GIG_NOT_PUBLISHED: FailureDetail =
        FailureDetail::new("GIG_NOT_PUBLISHED", "Project Unavailable");
    pub const GIG_START_DATE_PASSED: FailureDetail =
        FailureDetail::new("GIG_START_DATE_PASSED", "Application Window Closed");
    pub const GIG_ALREADY_STARTED: FailureDetail =
        FailureDetail::new("GIG_ALREADY_STARTED", "Project In Progress");
    pub const NOT_QUALIFIED_FOR_ROLES: FailureDetail =
        FailureDetail::new("NOT_QUALIFIED_FOR_ROLES", "Requirement Mismatch");
    pub const SUBSCRIPTION_REQUIRED: FailureDetail =
        FailureDetail::new("SUBSCRIPTION_REQUIRED", "Subscription Required");
    pub const GIG_EDIT_NOT_ALLOWED: FailureDetail =
        FailureDetail::new("GIG_EDIT_NOT_ALLOWED", "Editing Unavailable");
}

/// Data integrity and business-logic validation errors: the submitted
/// bundle fails the structural or financial requirements of the domain.
pub struct ValidationFailure;

impl ValidationFailure {
    pub const INVALID_AMOUNT: FailureDetail =
        FailureDetail::new("INVALID_AMOUNT", "Fair Pricing Policy");
    pub const UNBALANCED_BUDGET: FailureDetail =
        FailureDetail::new("UNBALANCED_BUDGET", "Budget Allocation Error");
    pub const DURATION_EXCEEDS_LIMIT: FailureDetail =
        FailureDetail::new("DURATION_EXCEEDS_LIMIT", "Duration Too Long");
    pub const INVALID_INDUSTRY: FailureDetail =
        FailureDetail::new("INVALID_INDUSTRY", "Invalid Industry Selected");
    pub const MULTIPLE_INDUSTRIES_NOT_ALLOWED: FailureDetail =
        FailureDetail::new("MULTIPLE_INDUSTRIES_NOT_ALLOWED", "Single Industry Required");
    pub const INVALID_ROLE: FailureDetail =
        FailureDetail::new("INVALID_ROLE", "Invalid Role Selected");
    pub const ROLE_NOT_FOUND: FailureDetail =
        FailureDetail::new("ROLE_NOT_FOUND", "Role Not Found");
    pub const INVALID_PAYLOAD: FailureDetail =
        FailureDetail::new("INVALID_PAYLOAD", "Invalid Submission Data");
}

/// Transient conflicts: the request lost a race it is allowed to retry,
/// or hit the storage-level backstop for one it is not.
pub struct ConflictFailure;

impl ConflictFailure {
    pub const DUPLICATE_APPLICATION: FailureDetail =
        FailureDetail::new("DUPLICATE_APPLICATION", "Proposal Already in Review");
    pub const SUBMISSION_IN_PROGRESS: FailureDetail =
        FailureDetail::new("SUBMISSION_IN_PROGRESS", "Submission In Progress");
    pub const ROLE_HAS_PROPOSALS: FailureDetail =
        FailureDetail::new("ROLE_HAS_PROPOSALS", "Active Proposals Attached");
    pub const INTERNAL_ERROR: FailureDetail =
        FailureDetail::new("INTERNAL_ERROR", "Unable to Submit Proposal");
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[FailureDetail] = &[
        PolicyFailure::CANNOT_APPLY_TO_OWN_GIG,
        PolicyFailure::EMAIL_NOT_VERIFIED,
        PolicyFailure::GIG_NOT_PUBLISHED,
        PolicyFailure::GIG_START_DATE_PASSED,
        PolicyFailure::GIG_ALREADY_STARTED,
        PolicyFailure::NOT_QUALIFIED_FOR_ROLES,
        PolicyFailure::SUBSCRIPTION_REQUIRED,
        PolicyFailure::GIG_EDIT_NOT_ALLOWED,
        ValidationFailure::INVALID_AMOUNT,
        ValidationFailure::UNBALANCED_BUDGET,
        ValidationFailure::DURATION_EXCEEDS_LIMIT,
        ValidationFailure::INVALID_INDUSTRY,
        ValidationFailure::MULTIPLE_INDUSTRIES_NOT_ALLOWED,
        ValidationFailure::INVALID_ROLE,
        ValidationFailure::ROLE_NOT_FOUND,
        ValidationFailure::INVALID_PAYLOAD,
        ConflictFailure::DUPLICATE_APPLICATION,
        ConflictFailure::SUBMISSION_IN_PROGRESS,
        ConflictFailure::ROLE_HAS_PROPOSALS,
        ConflictFailure::INTERNAL_ERROR,
    ];

    #[test]
    fn test_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for detail in ALL {
            assert!(seen.insert(detail.code), "duplicate code: {}", detail.code);
        }
    }

    #[test]
    fn test_detail_serializes_code_and_title() {
        let json = serde_json::to_value(PolicyFailure::SUBSCRIPTION_REQUIRED).unwrap();
        assert_eq!(json["code"], "SUBSCRIPTION_REQUIRED");
        assert_eq!(json["title"], "Subscription Required");
    }
}
