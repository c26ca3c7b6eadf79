//! Core data model for the directory transaction engine.
//!
//! This crate defines the foundational types shared by the concurrency and
//! durability layers:
//! - [`DistinguishedName`]: hierarchical DN parsing, normalization, and
//!   ancestor/parent relations.
//! - [`SearchScope`] / [`ScopedSet`]: scope-aware `(dn, scope)` collections
//!   and their intersection predicate.
//! - [`TxnError`] / [`Result`]: the unified error type and alias used
//!   throughout the workspace.
//! - Small identifier newtypes: [`TransactionId`], [`SnapshotId`], [`Lsn`].

#![warn(missing_docs)]

pub mod dn;
pub mod error;
pub mod scope;
pub mod scoped_set;
pub mod types;

pub use dn::{DistinguishedName, Rdn};
pub use error::{Result, TxnError};
pub use scope::{scopes_match, SearchScope};
pub use scoped_set::{ScopedEntry, ScopedSet};
pub use types::{Lsn, OpKind, SnapshotId, TransactionId};
