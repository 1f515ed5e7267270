//! Error types for gigplace-state

use thiserror::Error;

use crate::records::{CategoryId, GigId, GigRoleId, ProposalId, UserId};

/// Errors that can occur in the persistence layer.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Gig does not exist.
    #[error("gig not found: {gig_id}")]
    GigNotFound { gig_id: GigId },

    /// Gig role does not exist.
    #[error("gig role not found: {role_id}")]
    RoleNotFound { role_id: GigRoleId },

    /// Proposal does not exist.
    #[error("proposal not found: {proposal_id}")]
    ProposalNotFound { proposal_id: ProposalId },

    /// Taxonomy category does not exist.
    #[error("category not found: {category_id}")]
    CategoryNotFound { category_id: CategoryId },

    /// Profile does not exist for the user.
    #[error("profile not found for user: {user_id}")]
    ProfileNotFound { user_id: UserId },

    /// The gig row is exclusively locked by another in-flight submission.
    /// Non-blocking lock acquisition failed; the caller may retry.
    #[error("gig {gig_id} is locked by a concurrent operation")]
    LockContended { gig_id: GigId },

    /// The (gig, sender) uniqueness constraint rejected the insert.
    #[error("sender {sender} already has a proposal for gig {gig_id}")]
    DuplicateProposal { gig_id: GigId, sender: UserId },

    /// Serialization failure while mapping a record.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other backend failure (connection, query, constraint).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;
