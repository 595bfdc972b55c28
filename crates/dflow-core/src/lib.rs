//! # dflow-core — Foundational Types for the Disputeflow Stack
//!
//! This crate is the bedrock of the disputeflow workspace. It defines the
//! type-system primitives every other crate builds on: identifier newtypes,
//! the credit bureau registry, the canonical dispute status lifecycle, and
//! the persisted dispute record. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `DisputeId` and `UserId` are
//!    newtypes over `Uuid` with their own `Display` prefixes. No bare
//!    strings or raw UUIDs cross crate boundaries.
//!
//! 2. **One canonical status vocabulary.** The broader system historically
//!    grew two disjoint status vocabularies for the same lifecycle.
//!    [`DisputeStatus`] is the single source of truth; both legacy
//!    vocabularies map onto it explicitly via
//!    [`DisputeStatus::from_legacy`]. Unknown strings fail closed.
//!
//! 3. **Soft delete only.** A dispute is never removed; `DELETED` and
//!    `CLOSED` are terminal statuses, and terminal records reject further
//!    mutation with a structured error.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dflow-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod bureau;
pub mod dispute;
pub mod identity;
pub mod status;

// Re-export primary types for ergonomic imports.
pub use bureau::{mailing_address_block, Bureau};
pub use dispute::{Dispute, DisputeError};
pub use identity::{DisputeId, UserId};
pub use status::{DisputeStatus, InvestigationOutcome};
