//! # halo-schema — Declarative Object Serialization
//!
//! Describes, once, how a host object maps to a document and back.
//!
//! ## Building Blocks (`validators`, `types`, `attr`)
//!
//! - [`Validator`] — a predicate run during deserialization ([`Length`],
//!   [`Range`]).
//! - [`Type`] — a unit of value conversion ([`Any`], [`Scalar`],
//!   [`DateTime`], [`List`]). `serialize` never validates; `deserialize`
//!   runs the type's validators first.
//! - [`Attr`] — a Type bound to an accessor under a name, with the
//!   required/default policy and the document compartment it lives in.
//!
//! ## Schemas (`schema`)
//!
//! A [`Schema`] is an ordered set of attributes and is itself a Type, so
//! schemas nest. Serialization fails fast; deserialization validates every
//! attribute and reports all failures as one aggregate
//! [`ValidationError`](halo_core::ValidationError).
//!
//! ## Definitions (`definition`)
//!
//! [`SchemaDefinition`] loads schemas from YAML or JSON and compiles them
//! through the same builder used in code.
//!
//! ## Crate Policy
//!
//! - Depends only on `halo-core` internally.
//! - Schemas are immutable after `build()`; all per-call state is local to
//!   the call.
//! - Logging goes through `tracing`; the crate never installs a subscriber.

pub mod attr;
pub mod definition;
pub mod schema;
pub mod types;
pub mod validators;

pub use attr::{Attr, AttrKey, AttrType};
pub use definition::{
    AttrDefinition, DefinitionError, SchemaDefinition, TypeDefinition, ValidatorDefinition,
};
pub use schema::{Schema, SchemaBuilder};
pub use types::{Any, DateTime, List, Scalar, ScalarKind, Type, TypeRef};
pub use validators::{validate_all, Length, Range, Validator, ValidatorRef};
