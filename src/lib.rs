//! oasdoc - OpenAPI 3.1 document model and canonical serializer
//!
//! oasdoc is the output stage of a code-generation pipeline: an
//! upstream walker derives API structure from a service definition,
//! builds a [`types::Document`] bottom-up, and hands it to the
//! serializer, which emits deterministic YAML or JSON consumed by API
//! tooling (doc viewers, client generators, gateways).
//!
//! # Overview
//!
//! oasdoc provides:
//! - A closed, typed model of every OpenAPI 3.1 entity, with
//!   `Inline | Reference` sum types at every reusable-component slot
//! - An arena-backed schema graph that represents self-referential
//!   schemas without ownership cycles
//! - A violation-collecting validation pass over the whole tree
//! - Canonical serialization: stable declaration-order keys, one
//!   intermediate tree feeding both the YAML and JSON encodings, and
//!   omission of empty/default fields
//! - Re-parsing of serialized output back into the model
//!
//! `$ref` strings are opaque here: resolution against components or
//! external documents belongs to a separate resolver layered on top.
//!
//! # Basic Usage
//!
//! ```
//! use oasdoc::prelude::*;
//!
//! let mut doc = Document::new(Info::new("Pet Store", "1.0.0"));
//! let pet = doc.alloc_schema(Schema::object());
//! doc.register_schema("Pet", pet);
//!
//! let mut response = Response::new("a pet");
//! response.add_content("application/json", MediaType::schema(pet));
//! let mut operation = Operation::new();
//! operation.add_response("200", RefOr::inline(response));
//! let mut item = PathItem::new();
//! item.get = Some(operation);
//! doc.add_path("/pets", RefOr::inline(item));
//!
//! assert!(validate(&doc).is_empty());
//! let yaml = doc.to_yaml().unwrap();
//! assert!(yaml.starts_with("openapi: 3.1.0\n"));
//! ```

pub mod errors;
pub mod parse;
pub mod schema;
pub mod serialize;
pub mod types;
pub mod validate;
pub mod version;

// Re-exports for convenience
pub use errors::{Error, Result};
pub use serialize::{serialize, serialize_unchecked, to_value, Format};
pub use validate::{validate, Violation, ViolationKind};
pub use version::{is_supported, OPENAPI_VERSION};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::{Error, Result};
    pub use crate::parse;
    pub use crate::schema::*;
    pub use crate::serialize::{serialize, serialize_unchecked, to_value, Format};
    pub use crate::types::*;
    pub use crate::validate::{validate, Violation, ViolationKind};
    pub use crate::version::*;
}
