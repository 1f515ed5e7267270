//! Error types for the proposal engine.
//!
//! Failures are explicit in every signature: policy, validation, and
//! orchestration all return `Result<_, ProposalError>` instead of raising
//! through an exception channel. Each variant carries a stable
//! [`FailureDetail`] so the interface layer can render or route the failure
//! without parsing messages; raw storage detail never crosses this boundary.

use serde::Serialize;
use thiserror::Error;

use crate::codes::{ConflictFailure, FailureDetail, ValidationFailure};
use crate::payload::PayloadError;

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, ProposalError>;

/// A domain failure from the proposal engine.
#[derive(Error, Debug)]
pub enum ProposalError {
    /// Authorization / eligibility failure (HTTP-equivalent 403).
    #[error("{message}")]
    PermissionDenied {
        detail: FailureDetail,
        message: String,
        /// Navigation hint for failures the caller can resolve elsewhere
        /// (currently only the subscription prerequisite).
        redirect_url: Option<String>,
    },

    /// Structural / financial validation failure (HTTP-equivalent 400).
    #[error("{message}")]
    Validation {
        detail: FailureDetail,
        message: String,
    },

    /// Transient conflict: lock contention or a storage race
    /// (HTTP-equivalent 409). Retryable unless it is the duplicate backstop.
    #[error("{message}")]
    Conflict {
        detail: FailureDetail,
        message: String,
    },

    /// Payload-format error caught before domain validation.
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// Unexpected failure; full detail is logged, never surfaced.
    #[error("unable to process the proposal submission")]
    Internal(#[source] anyhow::Error),
}

impl ProposalError {
    /// Shorthand for a policy failure without a redirect.
    pub fn permission(detail: FailureDetail, message: impl Into<String>) -> Self {
        ProposalError::PermissionDenied {
            detail,
            message: message.into(),
            redirect_url: None,
        }
    }

    /// Shorthand for a validation failure.
    pub fn validation(detail: FailureDetail, message: impl Into<String>) -> Self {
        ProposalError::Validation {
            detail,
            message: message.into(),
        }
    }

    /// Shorthand for a conflict failure.
    pub fn conflict(detail: FailureDetail, message: impl Into<String>) -> Self {
        ProposalError::Conflict {
            detail,
            message: message.into(),
        }
    }

    /// The stable failure detail for this error.
    pub fn detail(&self) -> FailureDetail {
        match self {
            ProposalError::PermissionDenied { detail, .. }
            | ProposalError::Validation { detail, .. }
            | ProposalError::Conflict { detail, .. } => *detail,
            ProposalError::Payload(_) => ValidationFailure::INVALID_PAYLOAD,
            ProposalError::Internal(_) => ConflictFailure::INTERNAL_ERROR,
        }
    }

    /// The stable machine-readable code.
    pub fn code(&self) -> &'static str {
        self.detail().code
    }

    /// Whether the caller may retry the same request unchanged.
    /// Only transient conflicts qualify; the duplicate backstop is final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProposalError::Conflict { detail, .. }
                if detail.code == ConflictFailure::SUBMISSION_IN_PROGRESS.code
        )
    }

    /// The serializable outbound failure shape.
    pub fn rejection(&self) -> Rejection {
        let detail = self.detail();
        let (message, redirect_url) = match self {
            ProposalError::PermissionDenied {
                message,
                redirect_url,
                ..
            } => (message.clone(), redirect_url.clone()),
            ProposalError::Validation { message, .. }
            | ProposalError::Conflict { message, .. } => (message.clone(), None),
            ProposalError::Payload(err) => (err.to_string(), None),
            // Internal detail stays in the logs.
            ProposalError::Internal(_) => (
                "Something went wrong while submitting your proposal. Please try again shortly."
                    .to_string(),
                None,
            ),
        };
        Rejection {
            code: detail.code,
            title: detail.title,
            message,
            redirect_url,
        }
    }
}

/// Structured failure returned to the calling interface layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub code: &'static str,
    pub title: &'static str,
    pub message: String,
    pub redirect_url: Option<String>,
}
