//! Violation-collecting validation of a constructed document.
//!
//! [`validate`] walks the whole tree once and reports every invariant
//! breach it finds instead of failing fast, so one pass surfaces all
//! problems. Cyclic schema graphs terminate via visited-handle
//! tracking; `$ref` strings are checked for dangling local component
//! targets but never dereferenced beyond that.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::schema::{AdditionalProperties, SchemaIndex};
use crate::types::{
    template_variables, Components, Document, ExternalDocumentation, Header, MediaType, Operation,
    Parameter, ParameterLocation, PathItem, RefOr, RequestBody, Response, SecurityRequirement,
    Server,
};
use crate::version;

/// Category of an invariant breach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViolationKind {
    /// A structurally required field is absent or empty
    MissingRequiredField,
    /// A key that must be unique appears more than once
    DuplicateKey,
    /// A local `$ref` names a component that does not exist, or one of
    /// the wrong kind for its usage context
    DanglingReference,
    /// A value falls outside its allowed set
    InvalidEnumValue,
    /// Two mutually exclusive fields are both set
    InvalidCombination,
    /// A schema cycle passes through no component-registered schema
    /// and therefore cannot be represented on the wire
    CyclicSchemaUnbounded,
}

impl ViolationKind {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::MissingRequiredField => "missing-required-field",
            ViolationKind::DuplicateKey => "duplicate-key",
            ViolationKind::DanglingReference => "dangling-reference",
            ViolationKind::InvalidEnumValue => "invalid-enum-value",
            ViolationKind::InvalidCombination => "invalid-combination",
            ViolationKind::CyclicSchemaUnbounded => "cyclic-schema-unbounded",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One invariant breach found by [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Dotted path to the offending entity (e.g. `paths./pets.get`)
    pub location: String,
    pub message: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}: {}", self.kind, self.location, self.message)
    }
}

/// Walks the document and returns every invariant breach found.
///
/// An empty result means the document is structurally valid and safe to
/// serialize. The walk is read-only and terminates on cyclic schema
/// graphs.
pub fn validate(doc: &Document) -> Vec<Violation> {
    let mut validator = Validator::new(doc);
    validator.check_document();
    debug!(
        "validated document '{}': {} violation(s)",
        doc.info.title,
        validator.violations.len()
    );
    validator.violations
}

/// Expected component kind for each reference usage context
const KIND_SCHEMAS: &str = "schemas";
const KIND_RESPONSES: &str = "responses";
const KIND_PARAMETERS: &str = "parameters";
const KIND_EXAMPLES: &str = "examples";
const KIND_REQUEST_BODIES: &str = "requestBodies";
const KIND_HEADERS: &str = "headers";
const KIND_SECURITY_SCHEMES: &str = "securitySchemes";
const KIND_LINKS: &str = "links";
const KIND_CALLBACKS: &str = "callbacks";
const KIND_PATH_ITEMS: &str = "pathItems";

struct Validator<'a> {
    doc: &'a Document,
    violations: Vec<Violation>,
    /// Reverse map of `components.schemas` used as cycle cut points
    named_schemas: HashMap<SchemaIndex, &'a str>,
    /// Schema handles whose subtrees have already been checked
    checked_schemas: HashSet<SchemaIndex>,
}

impl<'a> Validator<'a> {
    fn new(doc: &'a Document) -> Self {
        let named_schemas = doc
            .components
            .iter()
            .flat_map(|c| c.schemas.iter())
            .map(|(name, index)| (*index, name.as_str()))
            .collect();
        Validator {
            doc,
            violations: Vec::new(),
            named_schemas,
            checked_schemas: HashSet::new(),
        }
    }

    fn push(&mut self, kind: ViolationKind, location: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            kind,
            location: location.into(),
            message: message.into(),
        });
    }

    fn check_document(&mut self) {
        let doc = self.doc;

        if doc.openapi.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                "openapi",
                "the `openapi` version field is required",
            );
        } else if !version::is_supported(&doc.openapi) {
            self.push(
                ViolationKind::InvalidEnumValue,
                "openapi",
                format!("unsupported OpenAPI version `{}`", doc.openapi),
            );
        }

        self.check_info();

        for (i, server) in doc.servers.iter().enumerate() {
            self.check_server(server, &format!("servers[{i}]"));
        }

        for (path, item) in &doc.paths {
            let location = format!("paths.{path}");
            if !path.starts_with('/') {
                self.push(
                    ViolationKind::InvalidEnumValue,
                    &location,
                    "path keys must begin with `/`",
                );
            }
            match item {
                RefOr::Inline(item) => self.check_path_item(item, Some(path), &location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_PATH_ITEMS, &location),
            }
        }

        for (name, item) in &doc.webhooks {
            let location = format!("webhooks.{name}");
            match item {
                RefOr::Inline(item) => self.check_path_item(item, None, &location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_PATH_ITEMS, &location),
            }
        }

        for (i, requirement) in doc.security.iter().enumerate() {
            self.check_security_requirement(requirement, &format!("security[{i}]"));
        }

        let mut seen_tags = HashSet::new();
        for (i, tag) in doc.tags.iter().enumerate() {
            if tag.name.is_empty() {
                self.push(
                    ViolationKind::MissingRequiredField,
                    format!("tags[{i}]"),
                    "tag name is required",
                );
            } else if !seen_tags.insert(tag.name.as_str()) {
                self.push(
                    ViolationKind::DuplicateKey,
                    format!("tags[{i}]"),
                    format!("duplicate tag name `{}`", tag.name),
                );
            }
            if let Some(docs) = &tag.external_docs {
                self.check_external_docs(docs, &format!("tags[{i}].externalDocs"));
            }
        }

        if let Some(docs) = &doc.external_docs {
            self.check_external_docs(docs, "externalDocs");
        }

        if let Some(components) = &doc.components {
            self.check_components(components);
        }
    }

    fn check_info(&mut self) {
        let info = &self.doc.info;
        if info.title.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                "info.title",
                "the API title is required",
            );
        }
        if info.version.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                "info.version",
                "the document version is required",
            );
        }
        if let Some(license) = &info.license {
            if license.name.is_empty() {
                self.push(
                    ViolationKind::MissingRequiredField,
                    "info.license.name",
                    "the license name is required",
                );
            }
            if !license.identifier.is_empty() && !license.url.is_empty() {
                self.push(
                    ViolationKind::InvalidCombination,
                    "info.license",
                    "`identifier` and `url` are mutually exclusive",
                );
            }
        }
    }

    fn check_server(&mut self, server: &Server, location: &str) {
        if server.url.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                format!("{location}.url"),
                "server URL is required",
            );
            return;
        }
        for variable in template_variables(&server.url) {
            if !server.variables.contains_key(variable) {
                self.push(
                    ViolationKind::MissingRequiredField,
                    format!("{location}.variables"),
                    format!("template variable `{{{variable}}}` has no binding"),
                );
            }
        }
        for (name, variable) in &server.variables {
            let var_location = format!("{location}.variables.{name}");
            if variable.default.is_empty() {
                self.push(
                    ViolationKind::MissingRequiredField,
                    format!("{var_location}.default"),
                    "server variable default is required",
                );
            } else if !variable.enum_values.is_empty()
                && !variable.enum_values.contains(&variable.default)
            {
                self.push(
                    ViolationKind::InvalidEnumValue,
                    format!("{var_location}.default"),
                    format!("default `{}` is not a member of the enum", variable.default),
                );
            }
        }
    }

    fn check_path_item(&mut self, item: &PathItem, path: Option<&str>, location: &str) {
        self.check_parameter_list(&item.parameters, &format!("{location}.parameters"));
        for (i, server) in item.servers.iter().enumerate() {
            self.check_server(server, &format!("{location}.servers[{i}]"));
        }
        for (method, operation) in item.operations() {
            self.check_operation(operation, item, path, &format!("{location}.{method}"));
        }
    }

    fn check_operation(
        &mut self,
        operation: &Operation,
        parent: &PathItem,
        path: Option<&str>,
        location: &str,
    ) {
        self.check_parameter_list(&operation.parameters, &format!("{location}.parameters"));

        if let Some(docs) = &operation.external_docs {
            self.check_external_docs(docs, &format!("{location}.externalDocs"));
        }

        if let Some(path) = path {
            self.check_template_bindings(operation, parent, path, location);
        }

        if let Some(body) = &operation.request_body {
            let body_location = format!("{location}.requestBody");
            match body {
                RefOr::Inline(body) => self.check_request_body(body, &body_location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_REQUEST_BODIES, &body_location),
            }
        }

        if operation.responses.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                format!("{location}.responses"),
                "an operation must declare at least one response",
            );
        }
        for (status, response) in &operation.responses {
            let response_location = format!("{location}.responses.{status}");
            if !is_valid_status_key(status) {
                self.push(
                    ViolationKind::InvalidEnumValue,
                    &response_location,
                    format!("`{status}` is not a status code, range, or `default`"),
                );
            }
            match response {
                RefOr::Inline(response) => self.check_response(response, &response_location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_RESPONSES, &response_location),
            }
        }

        for (name, callback) in &operation.callbacks {
            let callback_location = format!("{location}.callbacks.{name}");
            match callback {
                RefOr::Inline(callback) => {
                    for (expression, item) in callback {
                        let item_location = format!("{callback_location}.{expression}");
                        match item {
                            RefOr::Inline(item) => self.check_path_item(item, None, &item_location),
                            RefOr::Ref(r) => {
                                self.check_ref(&r.ref_path, KIND_PATH_ITEMS, &item_location)
                            }
                        }
                    }
                }
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_CALLBACKS, &callback_location),
            }
        }

        for (i, requirement) in operation.security.iter().enumerate() {
            self.check_security_requirement(requirement, &format!("{location}.security[{i}]"));
        }
        for (i, server) in operation.servers.iter().enumerate() {
            self.check_server(server, &format!("{location}.servers[{i}]"));
        }
    }

    /// Checks one parameter list for per-entry invariants and
    /// duplicate `(name, location)` pairs within the list
    fn check_parameter_list(&mut self, parameters: &[RefOr<Parameter>], location: &str) {
        let mut seen: HashSet<(String, ParameterLocation)> = HashSet::new();
        for (i, slot) in parameters.iter().enumerate() {
            let param_location = format!("{location}[{i}]");
            let parameter = match slot {
                RefOr::Inline(parameter) => Some(parameter),
                RefOr::Ref(r) => {
                    self.check_ref(&r.ref_path, KIND_PARAMETERS, &param_location);
                    self.resolve_parameter(r.component_target())
                }
            };
            let Some(parameter) = parameter else { continue };

            self.check_parameter(parameter, &param_location);
            if !parameter.name.is_empty()
                && !seen.insert((parameter.name.clone(), parameter.location))
            {
                self.push(
                    ViolationKind::DuplicateKey,
                    &param_location,
                    format!(
                        "duplicate parameter `{}` in `{}`",
                        parameter.name, parameter.location
                    ),
                );
            }
        }
    }

    fn check_parameter(&mut self, parameter: &Parameter, location: &str) {
        if parameter.name.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                format!("{location}.name"),
                "parameter name is required",
            );
        }
        if parameter.location == ParameterLocation::Path && parameter.required != Some(true) {
            self.push(
                ViolationKind::MissingRequiredField,
                format!("{location}.required"),
                "path parameters must set `required: true`",
            );
        }
        if parameter.example.is_some() && !parameter.examples.is_empty() {
            self.push(
                ViolationKind::InvalidCombination,
                location,
                "`example` and `examples` are mutually exclusive",
            );
        }
        if let Some(schema) = parameter.schema {
            self.check_schema(schema, &format!("{location}.schema"));
        }
        self.check_example_map(&parameter.examples, location);
    }

    /// Verifies that every `{var}` in the path template has a matching
    /// `path` parameter and vice versa, considering path-item-level and
    /// operation-level parameters together
    fn check_template_bindings(
        &mut self,
        operation: &Operation,
        parent: &PathItem,
        path: &str,
        location: &str,
    ) {
        let mut declared: Vec<String> = Vec::new();
        for slot in parent.parameters.iter().chain(operation.parameters.iter()) {
            let parameter = match slot {
                RefOr::Inline(parameter) => Some(parameter),
                RefOr::Ref(r) => self.resolve_parameter(r.component_target()),
            };
            if let Some(parameter) = parameter {
                if parameter.location == ParameterLocation::Path {
                    declared.push(parameter.name.clone());
                }
            }
        }

        let template: Vec<&str> = template_variables(path);
        for variable in &template {
            if !declared.iter().any(|name| name == variable) {
                self.push(
                    ViolationKind::MissingRequiredField,
                    format!("{location}.parameters"),
                    format!("path template variable `{{{variable}}}` has no matching parameter"),
                );
            }
        }
        for name in &declared {
            if !template.contains(&name.as_str()) {
                self.push(
                    ViolationKind::DanglingReference,
                    format!("{location}.parameters"),
                    format!("path parameter `{name}` does not appear in the path template"),
                );
            }
        }
    }

    /// Resolves a local component parameter reference one level deep;
    /// references to references stay opaque
    fn resolve_parameter(&self, target: Option<(&str, &str)>) -> Option<&'a Parameter> {
        let (kind, key) = target?;
        if kind != KIND_PARAMETERS {
            return None;
        }
        self.doc
            .components
            .as_ref()?
            .parameters
            .get(key)?
            .as_inline()
    }

    fn check_request_body(&mut self, body: &RequestBody, location: &str) {
        if body.content.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                format!("{location}.content"),
                "a request body must declare at least one media type",
            );
        }
        for (media_type, content) in &body.content {
            self.check_media_type(content, &format!("{location}.content.{media_type}"));
        }
    }

    fn check_response(&mut self, response: &Response, location: &str) {
        if response.description.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                format!("{location}.description"),
                "a response description is required",
            );
        }
        for (name, header) in &response.headers {
            let header_location = format!("{location}.headers.{name}");
            match header {
                RefOr::Inline(header) => self.check_header(header, &header_location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_HEADERS, &header_location),
            }
        }
        for (media_type, content) in &response.content {
            self.check_media_type(content, &format!("{location}.content.{media_type}"));
        }
        for (name, link) in &response.links {
            if let RefOr::Ref(r) = link {
                self.check_ref(&r.ref_path, KIND_LINKS, &format!("{location}.links.{name}"));
            }
        }
    }

    fn check_media_type(&mut self, media_type: &MediaType, location: &str) {
        if media_type.example.is_some() && !media_type.examples.is_empty() {
            self.push(
                ViolationKind::InvalidCombination,
                location,
                "`example` and `examples` are mutually exclusive",
            );
        }
        if let Some(schema) = media_type.schema {
            self.check_schema(schema, &format!("{location}.schema"));
        }
        self.check_example_map(&media_type.examples, location);
        for (name, encoding) in &media_type.encoding {
            for (header_name, header) in &encoding.headers {
                let header_location = format!("{location}.encoding.{name}.headers.{header_name}");
                match header {
                    RefOr::Inline(header) => self.check_header(header, &header_location),
                    RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_HEADERS, &header_location),
                }
            }
        }
    }

    fn check_header(&mut self, header: &Header, location: &str) {
        if header.example.is_some() && !header.examples.is_empty() {
            self.push(
                ViolationKind::InvalidCombination,
                location,
                "`example` and `examples` are mutually exclusive",
            );
        }
        if let Some(schema) = header.schema {
            self.check_schema(schema, &format!("{location}.schema"));
        }
        self.check_example_map(&header.examples, location);
    }

    fn check_example_map(
        &mut self,
        examples: &indexmap::IndexMap<String, RefOr<crate::types::Example>>,
        location: &str,
    ) {
        for (name, example) in examples {
            if let RefOr::Ref(r) = example {
                self.check_ref(
                    &r.ref_path,
                    KIND_EXAMPLES,
                    &format!("{location}.examples.{name}"),
                );
            }
        }
    }

    fn check_security_requirement(&mut self, requirement: &SecurityRequirement, location: &str) {
        for name in requirement.0.keys() {
            let known = self
                .doc
                .components
                .as_ref()
                .map(|c| c.security_schemes.contains_key(name))
                .unwrap_or(false);
            if !known {
                self.push(
                    ViolationKind::DanglingReference,
                    location,
                    format!("security scheme `{name}` is not defined in components"),
                );
            }
        }
    }

    fn check_external_docs(&mut self, docs: &ExternalDocumentation, location: &str) {
        if docs.url.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                format!("{location}.url"),
                "external documentation URL is required",
            );
        }
    }

    fn check_components(&mut self, components: &'a Components) {
        self.check_component_keys(components);

        for (name, index) in &components.schemas {
            self.check_schema_definition(*index, &format!("components.schemas.{name}"));
        }
        for (name, response) in &components.responses {
            let location = format!("components.responses.{name}");
            match response {
                RefOr::Inline(response) => self.check_response(response, &location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_RESPONSES, &location),
            }
        }
        for (name, parameter) in &components.parameters {
            let location = format!("components.parameters.{name}");
            match parameter {
                RefOr::Inline(parameter) => self.check_parameter(parameter, &location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_PARAMETERS, &location),
            }
        }
        for (name, body) in &components.request_bodies {
            let location = format!("components.requestBodies.{name}");
            match body {
                RefOr::Inline(body) => self.check_request_body(body, &location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_REQUEST_BODIES, &location),
            }
        }
        for (name, header) in &components.headers {
            let location = format!("components.headers.{name}");
            match header {
                RefOr::Inline(header) => self.check_header(header, &location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_HEADERS, &location),
            }
        }
        for (name, scheme) in &components.security_schemes {
            let location = format!("components.securitySchemes.{name}");
            match scheme {
                RefOr::Inline(scheme) => {
                    if scheme.scheme_type.is_empty() {
                        self.push(
                            ViolationKind::MissingRequiredField,
                            format!("{location}.type"),
                            "security scheme type is required",
                        );
                    }
                }
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_SECURITY_SCHEMES, &location),
            }
        }
        for (name, item) in &components.path_items {
            let location = format!("components.pathItems.{name}");
            match item {
                RefOr::Inline(item) => self.check_path_item(item, None, &location),
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_PATH_ITEMS, &location),
            }
        }
        for (name, example) in &components.examples {
            if let RefOr::Ref(r) = example {
                self.check_ref(
                    &r.ref_path,
                    KIND_EXAMPLES,
                    &format!("components.examples.{name}"),
                );
            }
        }
        for (name, link) in &components.links {
            if let RefOr::Ref(r) = link {
                self.check_ref(&r.ref_path, KIND_LINKS, &format!("components.links.{name}"));
            }
        }
        for (name, callback) in &components.callbacks {
            let location = format!("components.callbacks.{name}");
            match callback {
                RefOr::Inline(callback) => {
                    for (expression, item) in callback {
                        let item_location = format!("{location}.{expression}");
                        match item {
                            RefOr::Inline(item) => self.check_path_item(item, None, &item_location),
                            RefOr::Ref(r) => {
                                self.check_ref(&r.ref_path, KIND_PATH_ITEMS, &item_location)
                            }
                        }
                    }
                }
                RefOr::Ref(r) => self.check_ref(&r.ref_path, KIND_CALLBACKS, &location),
            }
        }
    }

    /// Component keys must match `[a-zA-Z0-9.\-_]+`
    fn check_component_keys(&mut self, components: &Components) {
        let key_sets: [(&str, Vec<&String>); 10] = [
            (KIND_SCHEMAS, components.schemas.keys().collect()),
            (KIND_RESPONSES, components.responses.keys().collect()),
            (KIND_PARAMETERS, components.parameters.keys().collect()),
            (KIND_EXAMPLES, components.examples.keys().collect()),
            (KIND_REQUEST_BODIES, components.request_bodies.keys().collect()),
            (KIND_HEADERS, components.headers.keys().collect()),
            (
                KIND_SECURITY_SCHEMES,
                components.security_schemes.keys().collect(),
            ),
            (KIND_LINKS, components.links.keys().collect()),
            (KIND_CALLBACKS, components.callbacks.keys().collect()),
            (KIND_PATH_ITEMS, components.path_items.keys().collect()),
        ];
        for (kind, keys) in key_sets {
            for key in keys {
                let ok = !key.is_empty()
                    && key
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
                if !ok {
                    self.push(
                        ViolationKind::InvalidEnumValue,
                        format!("components.{kind}.{key}"),
                        "component keys may only contain alphanumerics, `.`, `-`, and `_`",
                    );
                }
            }
        }
    }

    /// Checks a `$ref` string against its usage context. Only local
    /// `#/components/<kind>/<key>` pointers are resolved; anything else
    /// is opaque by design.
    fn check_ref(&mut self, ref_path: &str, expected_kind: &str, location: &str) {
        if ref_path.is_empty() {
            self.push(
                ViolationKind::MissingRequiredField,
                location,
                "`$ref` must not be empty",
            );
            return;
        }
        if ref_path.chars().any(char::is_whitespace) {
            self.push(
                ViolationKind::InvalidEnumValue,
                location,
                format!("`$ref` value `{ref_path}` is not a URI"),
            );
            return;
        }
        let Some(rest) = ref_path.strip_prefix("#/components/") else {
            return;
        };
        let Some((kind, key)) = rest.split_once('/') else {
            self.push(
                ViolationKind::DanglingReference,
                location,
                format!("malformed component reference `{ref_path}`"),
            );
            return;
        };
        if kind != expected_kind {
            self.push(
                ViolationKind::DanglingReference,
                location,
                format!("reference `{ref_path}` points at `{kind}` where `{expected_kind}` is expected"),
            );
            return;
        }
        let exists = self.doc.components.as_ref().is_some_and(|c| match kind {
            KIND_SCHEMAS => c.schemas.contains_key(key),
            KIND_RESPONSES => c.responses.contains_key(key),
            KIND_PARAMETERS => c.parameters.contains_key(key),
            KIND_EXAMPLES => c.examples.contains_key(key),
            KIND_REQUEST_BODIES => c.request_bodies.contains_key(key),
            KIND_HEADERS => c.headers.contains_key(key),
            KIND_SECURITY_SCHEMES => c.security_schemes.contains_key(key),
            KIND_LINKS => c.links.contains_key(key),
            KIND_CALLBACKS => c.callbacks.contains_key(key),
            KIND_PATH_ITEMS => c.path_items.contains_key(key),
            _ => false,
        });
        if !exists {
            self.push(
                ViolationKind::DanglingReference,
                location,
                format!("reference `{ref_path}` has no target"),
            );
        }
    }

    /// Entry point for a schema reached from a non-definition slot.
    /// Component-registered schemas are validated at their definition
    /// site only, so shared handles are not re-walked.
    fn check_schema(&mut self, index: SchemaIndex, location: &str) {
        if self.named_schemas.contains_key(&index) {
            return;
        }
        let mut stack = Vec::new();
        self.walk_schema(index, location, &mut stack);
    }

    /// Entry point for a `components.schemas` definition
    fn check_schema_definition(&mut self, index: SchemaIndex, location: &str) {
        let mut stack = Vec::new();
        self.walk_schema(index, location, &mut stack);
    }

    fn walk_schema(&mut self, index: SchemaIndex, location: &str, stack: &mut Vec<SchemaIndex>) {
        if stack.contains(&index) {
            // A named node on the cycle would have been cut below
            self.push(
                ViolationKind::CyclicSchemaUnbounded,
                location,
                format!("{index} participates in a cycle with no component-registered schema"),
            );
            return;
        }
        if self.checked_schemas.contains(&index) {
            return;
        }
        let Some(schema) = self.doc.arena.get(index) else {
            self.push(
                ViolationKind::DanglingReference,
                location,
                format!("{index} is not present in the document arena"),
            );
            return;
        };

        if !schema.ref_path.is_empty() {
            self.check_ref(&schema.ref_path, KIND_SCHEMAS, location);
        }
        if let Some(discriminator) = &schema.discriminator {
            if discriminator.property_name.is_empty() {
                self.push(
                    ViolationKind::MissingRequiredField,
                    format!("{location}.discriminator.propertyName"),
                    "discriminator property name is required",
                );
            }
        }
        if let Some(docs) = &schema.external_docs {
            self.check_external_docs(docs, &format!("{location}.externalDocs"));
        }

        self.checked_schemas.insert(index);
        stack.push(index);
        let children: Vec<(String, SchemaIndex)> = {
            let mut out = Vec::new();
            for (name, child) in &schema.properties {
                out.push((format!("{location}.properties.{name}"), *child));
            }
            if let Some(AdditionalProperties::Schema(child)) = schema.additional_properties {
                out.push((format!("{location}.additionalProperties"), child));
            }
            if let Some(child) = schema.items {
                out.push((format!("{location}.items"), child));
            }
            for (i, child) in schema.all_of.iter().enumerate() {
                out.push((format!("{location}.allOf[{i}]"), *child));
            }
            for (i, child) in schema.any_of.iter().enumerate() {
                out.push((format!("{location}.anyOf[{i}]"), *child));
            }
            for (i, child) in schema.one_of.iter().enumerate() {
                out.push((format!("{location}.oneOf[{i}]"), *child));
            }
            if let Some(child) = schema.not {
                out.push((format!("{location}.not"), child));
            }
            out
        };
        for (child_location, child) in children {
            // Named schemas cut the walk: they are validated at their
            // own definition site and serialize as `$ref`, so a cycle
            // closed through one is representable
            if self.named_schemas.contains_key(&child) {
                continue;
            }
            self.walk_schema(child, &child_location, stack);
        }
        stack.pop();
    }
}

/// A response map key is a three-digit status code, a range like `2XX`,
/// or the literal `default`
fn is_valid_status_key(key: &str) -> bool {
    if key == "default" {
        return true;
    }
    let bytes = key.as_bytes();
    if bytes.len() != 3 || !(b'1'..=b'5').contains(&bytes[0]) {
        return false;
    }
    (bytes[1].is_ascii_digit() && bytes[2].is_ascii_digit())
        || (bytes[1] == b'X' && bytes[2] == b'X')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::types::{Info, License, Reference, Response, ServerVariable, Tag};

    fn minimal_doc() -> Document {
        Document::new(Info::new("Pet Store", "1.0.0"))
    }

    fn kinds(violations: &[Violation]) -> Vec<ViolationKind> {
        violations.iter().map(|v| v.kind).collect()
    }

    #[test]
    fn test_minimal_document_is_valid() {
        assert!(validate(&minimal_doc()).is_empty());
    }

    #[test]
    fn test_missing_title_and_version_both_reported() {
        let doc = Document::new(Info::new("", ""));
        let violations = validate(&doc);
        assert_eq!(
            kinds(&violations),
            vec![
                ViolationKind::MissingRequiredField,
                ViolationKind::MissingRequiredField
            ]
        );
        assert_eq!(violations[0].location, "info.title");
        assert_eq!(violations[1].location, "info.version");
    }

    #[test]
    fn test_unsupported_openapi_version() {
        let mut doc = minimal_doc();
        doc.openapi = "3.0.3".to_string();
        assert_eq!(kinds(&validate(&doc)), vec![ViolationKind::InvalidEnumValue]);
    }

    #[test]
    fn test_license_both_fields_reported() {
        let mut doc = minimal_doc();
        doc.info.license = Some(License {
            name: "Apache-2.0".to_string(),
            identifier: "Apache-2.0".to_string(),
            url: "https://www.apache.org/licenses/LICENSE-2.0".to_string(),
        });
        assert_eq!(
            kinds(&validate(&doc)),
            vec![ViolationKind::InvalidCombination]
        );
    }

    #[test]
    fn test_server_template_variable_binding() {
        let mut doc = minimal_doc();
        let mut server = Server::new("https://{env}.example.com");
        server.add_variable("env", ServerVariable::new("api"));
        doc.add_server(server);
        assert!(validate(&doc).is_empty());

        let mut doc = minimal_doc();
        doc.add_server(Server::new("https://{env}.example.com"));
        let violations = validate(&doc);
        assert_eq!(kinds(&violations), vec![ViolationKind::MissingRequiredField]);
        assert!(violations[0].message.contains("{env}"));
    }

    #[test]
    fn test_server_variable_default_outside_enum() {
        let mut doc = minimal_doc();
        let mut variable = ServerVariable::new("staging");
        variable.enum_values = vec!["api".to_string(), "dev".to_string()];
        let mut server = Server::new("https://{env}.example.com");
        server.add_variable("env", variable);
        doc.add_server(server);
        assert_eq!(kinds(&validate(&doc)), vec![ViolationKind::InvalidEnumValue]);
    }

    #[test]
    fn test_operation_requires_responses() {
        let mut doc = minimal_doc();
        let mut item = PathItem::new();
        item.get = Some(Operation::new());
        doc.add_path("/pets", RefOr::inline(item));
        let violations = validate(&doc);
        assert_eq!(kinds(&violations), vec![ViolationKind::MissingRequiredField]);
        assert_eq!(violations[0].location, "paths./pets.get.responses");
    }

    #[test]
    fn test_invalid_status_key() {
        let mut doc = minimal_doc();
        let mut operation = Operation::new();
        operation.add_response("2XX", RefOr::inline(Response::new("okay")));
        operation.add_response("ok", RefOr::inline(Response::new("bad key")));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));
        assert_eq!(kinds(&validate(&doc)), vec![ViolationKind::InvalidEnumValue]);
    }

    #[test]
    fn test_duplicate_parameters() {
        let mut doc = minimal_doc();
        let mut operation = Operation::new();
        operation.add_response("200", RefOr::inline(Response::new("ok")));
        operation.add_parameter(RefOr::inline(Parameter::query("limit")));
        operation.add_parameter(RefOr::inline(Parameter::query("limit")));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));
        assert_eq!(kinds(&validate(&doc)), vec![ViolationKind::DuplicateKey]);
    }

    #[test]
    fn test_path_parameter_must_be_required() {
        let mut doc = minimal_doc();
        let mut parameter = Parameter::path("petId");
        parameter.required = Some(false);
        let mut operation = Operation::new();
        operation.add_response("200", RefOr::inline(Response::new("ok")));
        operation.add_parameter(RefOr::inline(parameter));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets/{petId}", RefOr::inline(item));
        assert_eq!(
            kinds(&validate(&doc)),
            vec![ViolationKind::MissingRequiredField]
        );
    }

    #[test]
    fn test_template_variable_without_parameter() {
        let mut doc = minimal_doc();
        let mut operation = Operation::new();
        operation.add_response("200", RefOr::inline(Response::new("ok")));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets/{petId}", RefOr::inline(item));
        let violations = validate(&doc);
        assert_eq!(kinds(&violations), vec![ViolationKind::MissingRequiredField]);
        assert!(violations[0].message.contains("petId"));
    }

    #[test]
    fn test_dangling_reference_and_kind_mismatch() {
        let mut doc = minimal_doc();
        let mut operation = Operation::new();
        operation.add_response("200", Reference::to_response("Missing").into());
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));
        assert_eq!(
            kinds(&validate(&doc)),
            vec![ViolationKind::DanglingReference]
        );

        // Right key, wrong kind for the context
        let mut doc = minimal_doc();
        doc.register_schema("Pet", SchemaIndex(0));
        doc.arena.alloc(Schema::object());
        let mut operation = Operation::new();
        operation.add_response(
            "200",
            RefOr::reference("#/components/schemas/Pet"),
        );
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));
        assert_eq!(
            kinds(&validate(&doc)),
            vec![ViolationKind::DanglingReference]
        );
    }

    #[test]
    fn test_component_key_charset() {
        let mut doc = minimal_doc();
        doc.components_mut().responses.insert(
            "Not-Found_v1.2".to_string(),
            RefOr::inline(Response::new("ok")),
        );
        assert!(validate(&doc).is_empty());

        let mut doc = minimal_doc();
        doc.components_mut().responses.insert(
            "Not Found".to_string(),
            RefOr::inline(Response::new("ok")),
        );
        assert_eq!(kinds(&validate(&doc)), vec![ViolationKind::InvalidEnumValue]);

        let mut doc = minimal_doc();
        let schema = doc.alloc_schema(Schema::object());
        doc.register_schema("Pet/v2", schema);
        assert_eq!(kinds(&validate(&doc)), vec![ViolationKind::InvalidEnumValue]);
    }

    #[test]
    fn test_whitespace_only_ref_rejected() {
        let mut doc = minimal_doc();
        let mut operation = Operation::new();
        operation.add_response("200", RefOr::reference("   "));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));
        assert_eq!(kinds(&validate(&doc)), vec![ViolationKind::InvalidEnumValue]);
    }

    #[test]
    fn test_external_docs_require_url() {
        let mut doc = minimal_doc();
        let mut tag = Tag::new("pets");
        tag.external_docs = Some(ExternalDocumentation::new(""));
        doc.add_tag(tag);
        let violations = validate(&doc);
        assert_eq!(kinds(&violations), vec![ViolationKind::MissingRequiredField]);
        assert_eq!(violations[0].location, "tags[0].externalDocs.url");
    }

    #[test]
    fn test_security_scheme_must_exist() {
        let mut doc = minimal_doc();
        doc.security
            .push(SecurityRequirement::scheme("api_key", vec![]));
        assert_eq!(
            kinds(&validate(&doc)),
            vec![ViolationKind::DanglingReference]
        );
    }

    #[test]
    fn test_named_self_referential_schema_is_valid() {
        let mut doc = minimal_doc();
        let node = doc.alloc_schema(Schema::object());
        doc.arena.get_mut(node).unwrap().add_property("child", node);
        doc.register_schema("Node", node);
        assert!(validate(&doc).is_empty());
    }

    #[test]
    fn test_unnamed_schema_cycle_is_reported() {
        let mut doc = minimal_doc();
        let node = doc.alloc_schema(Schema::object());
        doc.arena.get_mut(node).unwrap().add_property("child", node);

        let mut response = Response::new("ok");
        response.add_content("application/json", MediaType::schema(node));
        let mut operation = Operation::new();
        operation.add_response("200", RefOr::inline(response));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/nodes", RefOr::inline(item));

        assert_eq!(
            kinds(&validate(&doc)),
            vec![ViolationKind::CyclicSchemaUnbounded]
        );
    }

    #[test]
    fn test_arena_index_out_of_bounds() {
        let mut doc = minimal_doc();
        let mut response = Response::new("ok");
        response.add_content("application/json", MediaType::schema(SchemaIndex(7)));
        let mut operation = Operation::new();
        operation.add_response("200", RefOr::inline(response));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));
        assert_eq!(
            kinds(&validate(&doc)),
            vec![ViolationKind::DanglingReference]
        );
    }
}
