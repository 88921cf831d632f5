//! # halo-links — HAL Document Conventions
//!
//! Layers the HAL conventions over `halo-schema`. Nothing here adds engine
//! behavior: links and embedded resources compile to ordinary attributes
//! with fixed compartments.
//!
//! - [`Link`] — a relation in `_links`, rendered as
//!   `{href, templated?, type?}` or a list of those. Never deserialized.
//! - [`Embedded`] — a nested resource in `_embedded`.
//! - [`Curie`] — a prefix namespacing relation keys as `prefix:name`.
//! - [`HalSchema`] — a schema that also advertises its curies.
//!
//! ## Crate Policy
//!
//! - Depends on `halo-core` and `halo-schema` only.
//! - Compartment names are fixed by the constants below.

pub mod curie;
pub mod embedded;
pub mod link;
pub mod schema;

pub use curie::Curie;
pub use embedded::Embedded;
pub use link::Link;
pub use schema::{HalSchema, HalSchemaBuilder};

/// Compartment holding links.
pub const LINKS: &str = "_links";

/// Compartment holding embedded resources.
pub const EMBEDDED: &str = "_embedded";

/// Name of the link list advertising curies.
pub const CURIES: &str = "curies";
