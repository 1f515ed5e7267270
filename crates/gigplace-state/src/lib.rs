//! Gigplace-State: Persistence Layer for the Gigplace Marketplace
//!
//! This crate defines the storage boundary the proposal engine depends on:
//! typed row records, capability repository traits, and the storage error
//! taxonomy. Backends implement the traits; the engine never names a
//! concrete store.
//!
//! ## Key components
//!
//! - `records`: row records and typed identifiers
//! - `repos`: `GigStore`, `ProposalStore`, `CategoryStore`, `ProfileStore`
//!   plus the `GigLock` RAII row-lock guard
//! - `fakes`: in-memory implementations with honest lock/uniqueness
//!   semantics, used by the behavioral test suites

mod error;
pub mod fakes;
pub mod records;
pub mod repos;

pub use error::{StorageError, StorageResult};
pub use records::{
    CategoryId, CategoryRecord, DeliverableRecord, DurationUnit, GigId, GigRecord, GigRoleId,
    GigRoleRecord, GigStatus, GigVisibility, NewDeliverable, NewProposal, NewProposalRole,
    PaymentPlan, ProfileRecord, ProposalId, ProposalRecord, ProposalRoleRecord, ProposalStatus,
    RoleLineRef, RoleStatus, UserId,
};
pub use repos::{CategoryStore, GigLock, GigStore, ProfileStore, ProposalStore};
