//! Gigplace Proposal Engine
//!
//! Submission and negotiation workflow for marketplace proposals:
//! eligibility policy, bundle validation, role aggregation, and the
//! transactional submission orchestrator, wired to the repository
//! capabilities defined in `gigplace-state`.

pub mod aggregate;
pub mod codes;
pub mod config;
pub mod error;
pub mod notify;
pub mod obs;
pub mod payload;
pub mod policy;
pub mod redirects;
pub mod service;
pub mod validator;

pub use aggregate::{aggregate_roles, plan_role_sync, AggregatedRole, GigRoleSync, RoleEntry, RoleSyncPlan};
pub use codes::{ConflictFailure, FailureDetail, PolicyFailure, ValidationFailure};
pub use config::EngineConfig;
pub use error::{EngineResult, ProposalError, Rejection};
pub use notify::{NotificationHook, RecordingNotifier, TracingNotifier};
pub use payload::{AppliedRole, DeliverableInput, PayloadError, SendProposal};
pub use policy::ProposalPolicy;
pub use redirects::redirect_for;
pub use service::ProposalService;
pub use validator::{expected_total, round_money, service_fee, BundleValidator, TaxonomyIndex};
