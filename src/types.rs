//! Core type definitions for the OpenAPI 3.1 document model.
//!
//! Every entity is a value aggregate owned by its parent. Maps are
//! [`IndexMap`]s so that serialization order is insertion order. Schema
//! slots hold [`SchemaIndex`] handles into the document's arena rather
//! than owned sub-trees, which keeps self-referential schema graphs
//! representable (see [`crate::schema`]).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::schema::{Schema, SchemaArena, SchemaIndex};
use crate::version::OPENAPI_VERSION;

/// Serde helper: skip an optional boolean unless it is explicitly `true`.
///
/// The model distinguishes "unset" (`None`) from "explicitly false"
/// (`Some(false)`), but the wire format omits both. This matches the
/// OpenAPI 3.1 defaults, where every boolean field defaults to `false`.
pub(crate) fn is_not_true(flag: &Option<bool>) -> bool {
    *flag != Some(true)
}

/// Serde helpers: skip optional nested objects that are recursively
/// empty, so the wire never carries `{}` stubs.
pub(crate) fn contact_is_empty(slot: &Option<Contact>) -> bool {
    slot.as_ref().map_or(true, Contact::is_empty)
}

pub(crate) fn license_is_empty(slot: &Option<License>) -> bool {
    slot.as_ref().map_or(true, License::is_empty)
}

pub(crate) fn external_docs_is_empty(slot: &Option<ExternalDocumentation>) -> bool {
    slot.as_ref().map_or(true, ExternalDocumentation::is_empty)
}

pub(crate) fn server_is_empty(slot: &Option<Server>) -> bool {
    slot.as_ref().map_or(true, Server::is_empty)
}

/// Contact information for the exposed API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Identifying name of the contact person or organization
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    /// URL pointing to the contact information
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub url: String,
    /// Email address of the contact person or organization
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub email: String,
}

impl Contact {
    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.url.is_empty() && self.email.is_empty()
    }
}

/// License information for the exposed API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// License name used for the API
    pub name: String,
    /// SPDX license expression; mutually exclusive with `url`
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub identifier: String,
    /// URL to the license text; mutually exclusive with `identifier`
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub url: String,
}

impl License {
    /// Creates a license with the given name
    pub fn new(name: impl Into<String>) -> Self {
        License {
            name: name.into(),
            identifier: String::new(),
            url: String::new(),
        }
    }

    /// Sets the SPDX identifier; fails if `url` is already set
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Result<Self> {
        if !self.url.is_empty() {
            return Err(Error::invalid_combination("identifier", "url"));
        }
        self.identifier = identifier.into();
        Ok(self)
    }

    /// Sets the license URL; fails if `identifier` is already set
    pub fn with_url(mut self, url: impl Into<String>) -> Result<Self> {
        if !self.identifier.is_empty() {
            return Err(Error::invalid_combination("url", "identifier"));
        }
        self.url = url.into();
        Ok(self)
    }

    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.identifier.is_empty() && self.url.is_empty()
    }
}

/// Metadata about the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Title of the API
    pub title: String,
    /// Short summary of the API
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub summary: String,
    /// Description of the API (CommonMark)
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    /// URL to the Terms of Service
    #[serde(
        rename = "termsOfService",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub terms_of_service: String,
    #[serde(skip_serializing_if = "contact_is_empty", default)]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "license_is_empty", default)]
    pub license: Option<License>,
    /// Version of this document (distinct from the OpenAPI version)
    pub version: String,
}

impl Info {
    /// Creates the minimal valid metadata object
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Info {
            title: title.into(),
            version: version.into(),
            ..Info::default()
        }
    }
}

/// Reference to external documentation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalDocumentation {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    /// URL of the external documentation
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub url: String,
}

impl ExternalDocumentation {
    pub fn new(url: impl Into<String>) -> Self {
        ExternalDocumentation {
            description: String::new(),
            url: url.into(),
        }
    }

    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.url.is_empty()
    }
}

/// Metadata for a single documentation tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Name of the tag, referenced by `Operation.tags`
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(
        rename = "externalDocs",
        skip_serializing_if = "external_docs_is_empty",
        default
    )]
    pub external_docs: Option<ExternalDocumentation>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            ..Tag::default()
        }
    }
}

/// Substitutable variable in a server URL template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVariable {
    /// Allowed values; when non-empty, `default` must be a member
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty", default)]
    pub enum_values: Vec<String>,
    /// Value used when the consumer does not supply one
    pub default: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
}

impl ServerVariable {
    pub fn new(default: impl Into<String>) -> Self {
        ServerVariable {
            default: default.into(),
            ..ServerVariable::default()
        }
    }
}

/// A reachable host serving the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Host URL, possibly containing `{variable}` templates
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    /// Bindings for every `{variable}` appearing in `url`
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub variables: IndexMap<String, ServerVariable>,
}

impl Server {
    pub fn new(url: impl Into<String>) -> Self {
        Server {
            url: url.into(),
            ..Server::default()
        }
    }

    /// Binds a template variable to its definition
    pub fn add_variable(&mut self, name: impl Into<String>, variable: ServerVariable) {
        self.variables.insert(name.into(), variable);
    }

    /// True when no field carries a value
    pub fn is_empty(&self) -> bool {
        self.url.is_empty() && self.description.is_empty() && self.variables.is_empty()
    }
}

/// A pointer to a reusable component defined elsewhere.
///
/// The `ref_path` is an opaque URI-shaped string; this crate never
/// dereferences it. `summary` and `description` override the referent's
/// own fields for display purposes only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub ref_path: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
}

impl Reference {
    pub fn new(ref_path: impl Into<String>) -> Self {
        Reference {
            ref_path: ref_path.into(),
            summary: String::new(),
            description: String::new(),
        }
    }

    /// Pointer to a named entry under `#/components/schemas`
    pub fn to_schema(key: &str) -> Self {
        Reference::new(format!("#/components/schemas/{key}"))
    }

    /// Pointer to a named entry under `#/components/responses`
    pub fn to_response(key: &str) -> Self {
        Reference::new(format!("#/components/responses/{key}"))
    }

    /// Pointer to a named entry under `#/components/parameters`
    pub fn to_parameter(key: &str) -> Self {
        Reference::new(format!("#/components/parameters/{key}"))
    }

    /// Pointer to a named entry under `#/components/requestBodies`
    pub fn to_request_body(key: &str) -> Self {
        Reference::new(format!("#/components/requestBodies/{key}"))
    }

    /// Splits a local component pointer into its `(kind, key)` pair.
    ///
    /// Returns `None` for external or non-component references, which
    /// validation treats as opaque.
    pub fn component_target(&self) -> Option<(&str, &str)> {
        let rest = self.ref_path.strip_prefix("#/components/")?;
        let (kind, key) = rest.split_once('/')?;
        if kind.is_empty() || key.is_empty() || key.contains('/') {
            return None;
        }
        Some((kind, key))
    }
}

/// Either an inline value or a pointer to a reusable component.
///
/// This is the polymorphic slot used throughout the model for
/// parameters, headers, request bodies, responses, examples, links,
/// callbacks, and path items. Consumers must match both variants; there
/// is no third case to fall through to.
#[derive(Debug, Clone, PartialEq)]
pub enum RefOr<T> {
    /// The value itself, serialized at the same nesting level
    Inline(T),
    /// A `$ref` pointer standing in for the value
    Ref(Reference),
}

impl<T> RefOr<T> {
    /// Wraps an inline value
    pub fn inline(value: T) -> Self {
        RefOr::Inline(value)
    }

    /// Wraps a reference by pointer string
    pub fn reference(ref_path: impl Into<String>) -> Self {
        RefOr::Ref(Reference::new(ref_path))
    }

    /// Returns the inline value, if present
    pub fn as_inline(&self) -> Option<&T> {
        match self {
            RefOr::Inline(value) => Some(value),
            RefOr::Ref(_) => None,
        }
    }

    /// Returns the reference, if present
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            RefOr::Inline(_) => None,
            RefOr::Ref(reference) => Some(reference),
        }
    }

    /// True when this slot holds a pointer rather than a value
    pub fn is_ref(&self) -> bool {
        matches!(self, RefOr::Ref(_))
    }
}

impl<T> From<Reference> for RefOr<T> {
    fn from(reference: Reference) -> Self {
        RefOr::Ref(reference)
    }
}

/// Location of a parameter within a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

impl ParameterLocation {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Path => "path",
            ParameterLocation::Cookie => "cookie",
        }
    }

    /// Parses a wire-format location name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "path" => Some(ParameterLocation::Path),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single named operation input
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name; for `path` parameters this must match a
    /// `{name}` template in the path string
    pub name: String,
    /// Where the parameter is carried
    pub location: ParameterLocation,
    pub description: String,
    /// Must be `Some(true)` when `location` is `Path`
    pub required: Option<bool>,
    pub deprecated: Option<bool>,
    pub style: String,
    pub explode: Option<bool>,
    /// Schema describing the parameter value
    pub schema: Option<SchemaIndex>,
    pub example: Option<serde_json::Value>,
    pub examples: IndexMap<String, RefOr<Example>>,
}

impl Parameter {
    /// Creates a parameter; `path` parameters are marked required
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        let required = match location {
            ParameterLocation::Path => Some(true),
            _ => None,
        };
        Parameter {
            name: name.into(),
            location,
            description: String::new(),
            required,
            deprecated: None,
            style: String::new(),
            explode: None,
            schema: None,
            example: None,
            examples: IndexMap::new(),
        }
    }

    pub fn query(name: impl Into<String>) -> Self {
        Parameter::new(name, ParameterLocation::Query)
    }

    pub fn path(name: impl Into<String>) -> Self {
        Parameter::new(name, ParameterLocation::Path)
    }

    pub fn with_schema(mut self, schema: SchemaIndex) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// A response or encoding header.
///
/// Shares `Parameter`'s shape minus `name` and `location`, which are
/// carried by the containing map key and fixed to `header` respectively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    pub description: String,
    pub required: Option<bool>,
    pub deprecated: Option<bool>,
    pub style: String,
    pub explode: Option<bool>,
    pub schema: Option<SchemaIndex>,
    pub example: Option<serde_json::Value>,
    pub examples: IndexMap<String, RefOr<Example>>,
}

impl Header {
    pub fn new() -> Self {
        Header::default()
    }

    pub fn with_schema(mut self, schema: SchemaIndex) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// An example value with optional display metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Example {
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    /// Embedded literal example
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<serde_json::Value>,
    /// URI of an example that cannot be embedded
    #[serde(
        rename = "externalValue",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub external_value: String,
}

impl Example {
    pub fn new(value: serde_json::Value) -> Self {
        Example {
            value: Some(value),
            ..Example::default()
        }
    }
}

/// Serialization details for one part of a multipart or form body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Encoding {
    pub content_type: String,
    pub headers: IndexMap<String, RefOr<Header>>,
    pub style: String,
    pub explode: Option<bool>,
    pub allow_reserved: Option<bool>,
}

/// Schema and examples for a single media type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaType {
    /// Schema describing the payload
    pub schema: Option<SchemaIndex>,
    /// Single literal example; mutually exclusive with `examples`
    pub example: Option<serde_json::Value>,
    /// Named examples; mutually exclusive with `example`
    pub examples: IndexMap<String, RefOr<Example>>,
    pub encoding: IndexMap<String, Encoding>,
}

impl MediaType {
    pub fn new() -> Self {
        MediaType::default()
    }

    pub fn schema(schema: SchemaIndex) -> Self {
        MediaType {
            schema: Some(schema),
            ..MediaType::default()
        }
    }

    /// Sets the single literal example; fails if named examples exist
    pub fn with_example(mut self, example: serde_json::Value) -> Result<Self> {
        if !self.examples.is_empty() {
            return Err(Error::invalid_combination("example", "examples"));
        }
        self.example = Some(example);
        Ok(self)
    }

    /// Adds a named example; fails if the single literal example is set
    pub fn with_named_example(
        mut self,
        name: impl Into<String>,
        example: RefOr<Example>,
    ) -> Result<Self> {
        if self.example.is_some() {
            return Err(Error::invalid_combination("examples", "example"));
        }
        self.examples.insert(name.into(), example);
        Ok(self)
    }
}

/// Description of a request payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    pub description: String,
    /// Payload candidates keyed by media-type string; must be non-empty
    pub content: IndexMap<String, MediaType>,
    pub required: Option<bool>,
}

impl RequestBody {
    pub fn new() -> Self {
        RequestBody::default()
    }

    /// Registers a payload shape for one media type
    pub fn add_content(&mut self, media_type: impl Into<String>, content: MediaType) {
        self.content.insert(media_type.into(), content);
    }
}

/// One possible result of an operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Human-readable result description; required
    pub description: String,
    pub headers: IndexMap<String, RefOr<Header>>,
    /// Payload candidates keyed by media type; the most specific key
    /// wins when several patterns match an actual media type
    pub content: IndexMap<String, MediaType>,
    pub links: IndexMap<String, RefOr<Link>>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Response {
            description: description.into(),
            ..Response::default()
        }
    }

    pub fn add_content(&mut self, media_type: impl Into<String>, content: MediaType) {
        self.content.insert(media_type.into(), content);
    }
}

/// A design-time link from a response to another operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// URI reference to the target operation; mutually exclusive with
    /// `operation_id` in spirit, but the OpenAPI spec leaves this to
    /// tooling, so the model accepts either
    #[serde(
        rename = "operationRef",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub operation_ref: String,
    #[serde(
        rename = "operationId",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub operation_id: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub parameters: IndexMap<String, serde_json::Value>,
    #[serde(
        rename = "requestBody",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub request_body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(skip_serializing_if = "server_is_empty", default)]
    pub server: Option<Server>,
}

/// A map of named security schemes to required scopes.
///
/// An empty requirement (`{}`) denotes that security is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecurityRequirement(pub IndexMap<String, Vec<String>>);

impl SecurityRequirement {
    /// Creates the empty, security-optional requirement
    pub fn none() -> Self {
        SecurityRequirement::default()
    }

    /// Requires the named scheme with the given scopes
    pub fn scheme(name: impl Into<String>, scopes: Vec<String>) -> Self {
        let mut map = IndexMap::new();
        map.insert(name.into(), scopes);
        SecurityRequirement(map)
    }
}

/// Configuration for one OAuth 2.0 flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthFlow {
    #[serde(
        rename = "authorizationUrl",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub authorization_url: String,
    #[serde(rename = "tokenUrl", skip_serializing_if = "String::is_empty", default)]
    pub token_url: String,
    #[serde(
        rename = "refreshUrl",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub refresh_url: String,
    /// Scope name to short description
    pub scopes: IndexMap<String, String>,
}

/// The OAuth flows supported by a security scheme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub implicit: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub password: Option<OAuthFlow>,
    #[serde(
        rename = "clientCredentials",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(
        rename = "authorizationCode",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub authorization_code: Option<OAuthFlow>,
}

/// A way to authenticate against the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// One of `apiKey`, `http`, `mutualTLS`, `oauth2`, `openIdConnect`
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    /// Header/query/cookie name, for `apiKey` schemes
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub name: String,
    #[serde(rename = "in", skip_serializing_if = "String::is_empty", default)]
    pub location: String,
    /// HTTP auth scheme name (e.g. `bearer`), for `http` schemes
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub scheme: String,
    #[serde(
        rename = "bearerFormat",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub bearer_format: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub flows: Option<OAuthFlows>,
    #[serde(
        rename = "openIdConnectUrl",
        skip_serializing_if = "String::is_empty",
        default
    )]
    pub open_id_connect_url: String,
}

/// A callback: out-of-band path items keyed by runtime expression
pub type Callback = IndexMap<String, RefOr<PathItem>>;

/// One HTTP method on one path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub tags: Vec<String>,
    pub summary: String,
    pub description: String,
    pub external_docs: Option<ExternalDocumentation>,
    /// Unique operation identifier used by tooling and `Link`s
    pub operation_id: String,
    pub parameters: Vec<RefOr<Parameter>>,
    pub request_body: Option<RefOr<RequestBody>>,
    /// Possible results keyed by status code, range (`2XX`), or
    /// `default`; required and non-empty
    pub responses: IndexMap<String, RefOr<Response>>,
    pub callbacks: IndexMap<String, RefOr<Callback>>,
    pub deprecated: Option<bool>,
    pub security: Vec<SecurityRequirement>,
    pub servers: Vec<Server>,
}

impl Operation {
    pub fn new() -> Self {
        Operation::default()
    }

    /// Registers a possible result under a status key
    pub fn add_response(&mut self, status: impl Into<String>, response: RefOr<Response>) {
        self.responses.insert(status.into(), response);
    }

    /// Appends an operation input
    pub fn add_parameter(&mut self, parameter: RefOr<Parameter>) {
        self.parameters.push(parameter);
    }
}

/// The operations available at a single path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    pub summary: String,
    pub description: String,
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
    pub servers: Vec<Server>,
    /// Parameters shared by every operation on this path
    pub parameters: Vec<RefOr<Parameter>>,
}

impl PathItem {
    pub fn new() -> Self {
        PathItem::default()
    }

    /// Iterates the populated method slots in canonical order
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
            ("trace", &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, slot)| slot.as_ref().map(|op| (method, op)))
    }

    /// Sets the operation for a lowercase HTTP method name.
    ///
    /// Returns the operation back unchanged if the method is unknown.
    pub fn set_operation(
        &mut self,
        method: &str,
        operation: Operation,
    ) -> std::result::Result<(), Operation> {
        let slot = match method {
            "get" => &mut self.get,
            "put" => &mut self.put,
            "post" => &mut self.post,
            "delete" => &mut self.delete,
            "options" => &mut self.options,
            "head" => &mut self.head,
            "patch" => &mut self.patch,
            "trace" => &mut self.trace,
            _ => return Err(operation),
        };
        *slot = Some(operation);
        Ok(())
    }
}

/// Registry of reusable objects, referenced by
/// `#/components/<kind>/<key>` pointers elsewhere in the document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    pub schemas: IndexMap<String, SchemaIndex>,
    pub responses: IndexMap<String, RefOr<Response>>,
    pub parameters: IndexMap<String, RefOr<Parameter>>,
    pub examples: IndexMap<String, RefOr<Example>>,
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,
    pub headers: IndexMap<String, RefOr<Header>>,
    pub security_schemes: IndexMap<String, RefOr<SecurityScheme>>,
    pub links: IndexMap<String, RefOr<Link>>,
    pub callbacks: IndexMap<String, RefOr<Callback>>,
    pub path_items: IndexMap<String, RefOr<PathItem>>,
}

impl Components {
    pub fn new() -> Self {
        Components::default()
    }

    /// True when every registry map is empty
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.responses.is_empty()
            && self.parameters.is_empty()
            && self.examples.is_empty()
            && self.request_bodies.is_empty()
            && self.headers.is_empty()
            && self.security_schemes.is_empty()
            && self.links.is_empty()
            && self.callbacks.is_empty()
            && self.path_items.is_empty()
    }
}

/// Root of an OpenAPI 3.1 document.
///
/// Owns every child entity by value, plus the [`SchemaArena`] that
/// backs all schema slots in the tree. Construction is single-writer;
/// once handed to validation or serialization the document is only read.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// OpenAPI specification version this document conforms to
    pub openapi: String,
    pub info: Info,
    /// Default dialect for schemas in this document
    pub json_schema_dialect: String,
    pub servers: Vec<Server>,
    /// Available paths keyed by template string (`/pets/{petId}`)
    pub paths: IndexMap<String, RefOr<PathItem>>,
    /// Incoming webhooks keyed by arbitrary unique name
    pub webhooks: IndexMap<String, RefOr<PathItem>>,
    pub components: Option<Components>,
    /// Security requirements applied to every operation by default
    pub security: Vec<SecurityRequirement>,
    pub tags: Vec<Tag>,
    pub external_docs: Option<ExternalDocumentation>,
    /// Flat storage for every schema in the document; schema slots
    /// anywhere in the tree hold indices into this arena
    pub arena: SchemaArena,
}

impl Document {
    /// Creates a document targeting the current OpenAPI version
    pub fn new(info: Info) -> Self {
        Document {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            json_schema_dialect: String::new(),
            servers: Vec::new(),
            paths: IndexMap::new(),
            webhooks: IndexMap::new(),
            components: None,
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
            arena: SchemaArena::new(),
        }
    }

    /// Stores a schema in the arena and returns its handle
    pub fn alloc_schema(&mut self, schema: Schema) -> SchemaIndex {
        self.arena.alloc(schema)
    }

    /// Registers an already-allocated schema under
    /// `#/components/schemas/<name>`
    pub fn register_schema(&mut self, name: impl Into<String>, index: SchemaIndex) {
        self.components
            .get_or_insert_with(Components::new)
            .schemas
            .insert(name.into(), index);
    }

    /// Adds a path item under its template string
    pub fn add_path(&mut self, path: impl Into<String>, item: RefOr<PathItem>) {
        self.paths.insert(path.into(), item);
    }

    pub fn add_server(&mut self, server: Server) {
        self.servers.push(server);
    }

    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Mutable access to the component registry, created on demand
    pub fn components_mut(&mut self) -> &mut Components {
        self.components.get_or_insert_with(Components::new)
    }
}

/// Extracts the `{variable}` template names from a path or server URL.
///
/// Unterminated braces yield no variable for the dangling fragment.
pub(crate) fn template_variables(template: &str) -> Vec<&str> {
    let mut variables = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rest = &rest[open + 1..];
        match rest.find('}') {
            Some(close) => {
                if close > 0 {
                    variables.push(&rest[..close]);
                }
                rest = &rest[close + 1..];
            }
            None => break,
        }
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_identifier_and_url_exclusive() {
        let err = License::new("Apache-2.0")
            .with_identifier("Apache-2.0")
            .unwrap()
            .with_url("https://www.apache.org/licenses/LICENSE-2.0")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCombination { .. }));

        let err = License::new("MIT")
            .with_url("https://opensource.org/license/mit")
            .unwrap()
            .with_identifier("MIT")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCombination { .. }));
    }

    #[test]
    fn test_media_type_example_and_examples_exclusive() {
        let err = MediaType::new()
            .with_example(serde_json::json!({"id": 1}))
            .unwrap()
            .with_named_example("first", RefOr::inline(Example::new(serde_json::json!(2))))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCombination { .. }));

        let err = MediaType::new()
            .with_named_example("first", RefOr::inline(Example::new(serde_json::json!(2))))
            .unwrap()
            .with_example(serde_json::json!({"id": 1}))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidCombination { .. }));
    }

    #[test]
    fn test_path_parameter_defaults_to_required() {
        let param = Parameter::path("petId");
        assert_eq!(param.required, Some(true));

        let param = Parameter::query("limit");
        assert_eq!(param.required, None);
    }

    #[test]
    fn test_ref_or_accessors() {
        let slot: RefOr<Response> = RefOr::inline(Response::new("OK"));
        assert!(slot.as_inline().is_some());
        assert!(slot.as_reference().is_none());
        assert!(!slot.is_ref());

        let slot: RefOr<Response> = Reference::to_response("NotFound").into();
        assert!(slot.as_inline().is_none());
        assert_eq!(
            slot.as_reference().unwrap().ref_path,
            "#/components/responses/NotFound"
        );
    }

    #[test]
    fn test_reference_component_target() {
        let reference = Reference::to_schema("Pet");
        assert_eq!(reference.component_target(), Some(("schemas", "Pet")));

        let external = Reference::new("https://example.com/schemas.json#/Pet");
        assert_eq!(external.component_target(), None);

        let nested = Reference::new("#/components/schemas/Pet/properties/id");
        assert_eq!(nested.component_target(), None);
    }

    #[test]
    fn test_path_item_operations_in_canonical_order() {
        let mut item = PathItem::new();
        item.set_operation("post", Operation::new()).unwrap();
        item.set_operation("get", Operation::new()).unwrap();

        let methods: Vec<&str> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(methods, vec!["get", "post"]);

        assert!(item.set_operation("connect", Operation::new()).is_err());
    }

    #[test]
    fn test_template_variables() {
        assert_eq!(
            template_variables("https://{env}.example.com:{port}/v1"),
            vec!["env", "port"]
        );
        assert_eq!(template_variables("/pets/{petId}"), vec!["petId"]);
        assert!(template_variables("/pets").is_empty());
        assert!(template_variables("/broken/{pet").is_empty());
    }
}
