//! # halo-core — Foundational Types for halo
//!
//! This crate is the leaf of the halo workspace. It defines the pieces the
//! schema engine is built from but that carry no schema semantics of their
//! own:
//!
//! 1. **Structured errors.** [`ValidationError`] aggregates per-attribute
//!    failures to arbitrary depth and renders them as the stable
//!    `{"errors": {field: [...]}}` dictionary that API layers return to
//!    clients. [`AccessError`] and [`SchemaError`] cover host access and
//!    the remaining failure classes.
//!
//! 2. **The `FieldHost` capability.** Accessors never inspect concrete
//!    types; they ask a [`FieldHost`] for a named field. Mapping hosts
//!    (document values, string-keyed maps) and structured hosts
//!    ([`Record`] over serde structs, or hand-written impls) are
//!    interchangeable.
//!
//! 3. **Accessors.** An [`Accessor`] pairs a getter and a setter, each a
//!    dot-separated [`AttrPath`] or a function.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `halo-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Everything here is immutable after construction and `Send + Sync`
//!   where it holds functions, so schemas built on it can be shared
//!   across threads without locking.

pub mod accessor;
pub mod error;
pub mod host;

// Re-export primary types for ergonomic imports.
pub use accessor::{Accessor, AttrPath, Getter, GetterFn, Setter, SetterFn};
pub use error::{
    value_kind, AccessError, SchemaError, ValidationError, MISSING_ATTRIBUTE, NON_FIELD_KEY,
};
pub use host::{lookup_error, FieldHost, HostKind, Record};
