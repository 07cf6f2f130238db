//! Arena-backed JSON Schema representation.
//!
//! Schemas may reference themselves or each other (a property of `Pet`
//! may be a list of `Pet`s), so they cannot be owned sub-trees. Every
//! schema in a document lives in a flat [`SchemaArena`]; schema-valued
//! slots hold copyable [`SchemaIndex`] handles. Cycle detection during
//! validation and serialization is index comparison, never deep value
//! comparison.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::ExternalDocumentation;

/// Handle to a schema stored in a [`SchemaArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaIndex(pub(crate) u32);

impl SchemaIndex {
    /// Raw arena slot, mainly useful for diagnostics
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SchemaIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "schema#{}", self.0)
    }
}

/// Flat storage for every schema in a document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaArena {
    nodes: Vec<Schema>,
}

impl SchemaArena {
    pub fn new() -> Self {
        SchemaArena::default()
    }

    /// Stores a schema and returns its handle. Handles are never
    /// invalidated; the arena only grows.
    pub fn alloc(&mut self, schema: Schema) -> SchemaIndex {
        let index = SchemaIndex(self.nodes.len() as u32);
        self.nodes.push(schema);
        index
    }

    /// Looks up a schema by handle
    pub fn get(&self, index: SchemaIndex) -> Option<&Schema> {
        self.nodes.get(index.index())
    }

    /// Mutable lookup, used by builders to close cycles after
    /// allocation (alloc a placeholder, then patch its properties)
    pub fn get_mut(&mut self, index: SchemaIndex) -> Option<&mut Schema> {
        self.nodes.get_mut(index.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all stored schemas with their handles
    pub fn iter(&self) -> impl Iterator<Item = (SchemaIndex, &Schema)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, schema)| (SchemaIndex(i as u32), schema))
    }
}

/// JSON Schema instance type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    String,
    Integer,
}

impl InstanceType {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            InstanceType::Null => "null",
            InstanceType::Boolean => "boolean",
            InstanceType::Object => "object",
            InstanceType::Array => "array",
            InstanceType::Number => "number",
            InstanceType::String => "string",
            InstanceType::Integer => "integer",
        }
    }

    /// Parses a wire-format type name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "null" => Some(InstanceType::Null),
            "boolean" => Some(InstanceType::Boolean),
            "object" => Some(InstanceType::Object),
            "array" => Some(InstanceType::Array),
            "number" => Some(InstanceType::Number),
            "string" => Some(InstanceType::String),
            "integer" => Some(InstanceType::Integer),
            _ => None,
        }
    }
}

impl std::fmt::Display for InstanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The `additionalProperties` keyword: a blanket allow/deny or a schema
/// that every extra property must match
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(SchemaIndex),
}

/// Discriminator metadata for polymorphic schemas
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discriminator {
    /// Property whose value selects the concrete schema
    #[serde(rename = "propertyName")]
    pub property_name: String,
    /// Maps property values to schema names or references
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub mapping: IndexMap<String, String>,
}

impl Discriminator {
    pub fn new(property_name: impl Into<String>) -> Self {
        Discriminator {
            property_name: property_name.into(),
            mapping: IndexMap::new(),
        }
    }
}

/// XML serialization hints for a schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xml {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub prefix: String,
    #[serde(skip_serializing_if = "crate::types::is_not_true", default)]
    pub attribute: Option<bool>,
    #[serde(skip_serializing_if = "crate::types::is_not_true", default)]
    pub wrapped: Option<bool>,
}

/// A JSON-Schema-2020-12-compatible type description.
///
/// Field order here is wire order. Sub-schema slots are arena handles,
/// except `ref_path`, which is an opaque `$ref` string resolved (if
/// ever) by an external resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// `$ref` pointer; when set, most other keywords are typically
    /// absent, but JSON Schema 2020-12 permits siblings
    pub ref_path: String,
    pub title: String,
    pub description: String,
    /// Allowed instance types; a single entry serializes as a scalar
    pub types: Vec<InstanceType>,
    pub format: String,
    pub enum_values: Vec<serde_json::Value>,
    pub const_value: Option<serde_json::Value>,
    pub default: Option<serde_json::Value>,
    pub multiple_of: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub minimum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub max_length: Option<u64>,
    pub min_length: Option<u64>,
    pub pattern: String,
    pub max_items: Option<u64>,
    pub min_items: Option<u64>,
    pub unique_items: Option<bool>,
    pub max_properties: Option<u64>,
    pub min_properties: Option<u64>,
    /// Names of properties that must be present
    pub required: Vec<String>,
    pub properties: IndexMap<String, SchemaIndex>,
    pub additional_properties: Option<AdditionalProperties>,
    pub items: Option<SchemaIndex>,
    pub all_of: Vec<SchemaIndex>,
    pub any_of: Vec<SchemaIndex>,
    pub one_of: Vec<SchemaIndex>,
    pub not: Option<SchemaIndex>,
    pub examples: Vec<serde_json::Value>,
    pub deprecated: Option<bool>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub discriminator: Option<Discriminator>,
    pub xml: Option<Xml>,
    pub external_docs: Option<ExternalDocumentation>,
}

impl Schema {
    /// Creates the empty schema, which accepts any instance
    pub fn new() -> Self {
        Schema::default()
    }

    /// Creates a schema constrained to one instance type
    pub fn of_type(instance_type: InstanceType) -> Self {
        Schema {
            types: vec![instance_type],
            ..Schema::default()
        }
    }

    pub fn string() -> Self {
        Schema::of_type(InstanceType::String)
    }

    pub fn integer() -> Self {
        Schema::of_type(InstanceType::Integer)
    }

    pub fn number() -> Self {
        Schema::of_type(InstanceType::Number)
    }

    pub fn boolean() -> Self {
        Schema::of_type(InstanceType::Boolean)
    }

    pub fn object() -> Self {
        Schema::of_type(InstanceType::Object)
    }

    /// Creates an array schema with the given item schema
    pub fn array(items: SchemaIndex) -> Self {
        Schema {
            types: vec![InstanceType::Array],
            items: Some(items),
            ..Schema::default()
        }
    }

    /// Creates a pure `$ref` schema
    pub fn reference(ref_path: impl Into<String>) -> Self {
        Schema {
            ref_path: ref_path.into(),
            ..Schema::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a named property schema
    pub fn add_property(&mut self, name: impl Into<String>, schema: SchemaIndex) {
        self.properties.insert(name.into(), schema);
    }

    /// Marks a property name as required
    pub fn require(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
    }

    /// Handles of the sub-schemas this schema points at directly
    pub fn children(&self) -> Vec<SchemaIndex> {
        let mut children = Vec::new();
        children.extend(self.properties.values().copied());
        if let Some(AdditionalProperties::Schema(index)) = self.additional_properties {
            children.push(index);
        }
        children.extend(self.items);
        children.extend(self.all_of.iter().copied());
        children.extend(self.any_of.iter().copied());
        children.extend(self.one_of.iter().copied());
        children.extend(self.not);
        children
    }
}
