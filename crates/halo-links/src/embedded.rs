//! # Embedded Resources
//!
//! An [`Embedded`] attribute lives in the `_embedded` compartment. Unlike
//! links, embedded resources are read back on deserialization.

use std::sync::Arc;

use halo_core::Accessor;
use halo_schema::{Any, Attr, Type, TypeRef};

use crate::curie::Curie;
use crate::EMBEDDED;

/// A resource placed in `_embedded`.
#[derive(Debug, Clone)]
pub struct Embedded {
    attr_type: TypeRef,
    accessor: Option<Accessor>,
    required: bool,
    curie: Option<Curie>,
}

impl Default for Embedded {
    fn default() -> Self {
        Self::with_type_ref(Arc::new(Any::new()))
    }
}

impl Embedded {
    /// A required embedded resource converted by `attr_type`, usually a
    /// nested schema or a list of one.
    pub fn new(attr_type: impl Type + 'static) -> Self {
        Self::with_type_ref(Arc::new(attr_type))
    }

    /// An embedded resource converted by a shared type.
    pub fn with_type_ref(attr_type: TypeRef) -> Self {
        Self {
            attr_type,
            accessor: None,
            required: true,
            curie: None,
        }
    }

    /// Read and write along a dot path instead of the name.
    pub fn path(self, path: &str) -> Self {
        self.accessor(Accessor::path(path))
    }

    /// Use an explicit accessor.
    pub fn accessor(mut self, accessor: Accessor) -> Self {
        self.accessor = Some(accessor);
        self
    }

    /// Shorthand for a resource that may be absent.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Namespace the key with `curie`.
    pub fn curie(mut self, curie: Curie) -> Self {
        self.curie = Some(curie);
        self
    }

    /// The curie namespacing this resource, if any.
    pub fn curie_ref(&self) -> Option<&Curie> {
        self.curie.as_ref()
    }

    /// Compile into an attribute in `_embedded`.
    pub fn into_attr(self) -> Attr {
        let mut attr = Attr::with_type_ref(self.attr_type)
            .required(self.required)
            .compartment(EMBEDDED);
        if let Some(accessor) = self.accessor {
            attr = attr.accessor(accessor);
        }
        match self.curie {
            Some(curie) => attr.namespaced(curie.name),
            None => attr,
        }
    }
}
