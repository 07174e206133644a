//! # qc-core
//!
//! Core types shared across the quest admin console crates.
//!
//! This crate provides the foundational types every other crate consumes:
//! - The closed [`Role`](role::Role) enumeration
//! - The authenticated [`UserIdentity`](identity::UserIdentity) record
//! - Page and action allow-lists ([`access`])
//! - Cross-cutting error types

pub mod access;
pub mod errors;
pub mod identity;
pub mod role;

pub use access::{Action, MINIMUM_ALLOWLIST, Page};
pub use errors::CoreError;
pub use identity::{UserIdentity, UserStatus};
pub use role::Role;
