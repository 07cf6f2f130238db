//! Canonical serialization of a document to YAML or JSON.
//!
//! Both encodings are derived from a single ordered intermediate tree
//! (a [`serde_json::Value`] whose maps preserve insertion order), so
//! they always agree on structure and key order. Keys are emitted in
//! declaration order, never alphabetically, to keep diffs of generated
//! documents readable.
//!
//! Omission rules: strings are omitted when empty, booleans unless
//! explicitly `true`, maps and sequences when empty, and nested objects
//! when recursively empty, except entities their parent structurally
//! requires (`info`, a response's `description`).
//!
//! Schema handles registered under `components.schemas` are emitted
//! inline only at their definition site; every other slot naming them
//! serializes as a `#/components/schemas/<key>` reference. That cut is
//! also what makes cyclic schema graphs serializable: a cycle with no
//! component-registered node cannot be represented and fails with
//! [`Error::EncodingFailure`].

use std::collections::HashMap;

use log::debug;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::errors::{Error, Result};
use crate::schema::{AdditionalProperties, Schema, SchemaIndex};
use crate::types::{
    Components, Document, Encoding, Header, MediaType, Operation, Parameter, PathItem, RefOr,
    RequestBody, Response,
};
use crate::validate;

/// Output encoding for a serialized document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validates the document, then encodes it in the requested format.
///
/// Fails with [`Error::ValidationFailed`] carrying every violation when
/// the document is invalid; use [`serialize_unchecked`] for best-effort
/// output of a known-dirty document.
pub fn serialize(doc: &Document, format: Format) -> Result<Vec<u8>> {
    let violations = validate::validate(doc);
    if !violations.is_empty() {
        return Err(Error::validation_failed(violations));
    }
    serialize_unchecked(doc, format)
}

/// Encodes the document without a validation pass
pub fn serialize_unchecked(doc: &Document, format: Format) -> Result<Vec<u8>> {
    let value = to_value(doc)?;
    debug!("serializing document '{}' as {format}", doc.info.title);
    match format {
        Format::Yaml => Ok(serde_yaml::to_string(&value)?.into_bytes()),
        Format::Json => Ok(serde_json::to_vec_pretty(&value)?),
    }
}

/// Builds the canonical ordered tree for a document
pub fn to_value(doc: &Document) -> Result<Value> {
    Serializer::new(doc).document()
}

impl Document {
    /// Serializes to YAML after validating
    pub fn to_yaml(&self) -> Result<String> {
        let bytes = serialize(self, Format::Yaml)?;
        // serialize() only ever produces UTF-8
        String::from_utf8(bytes).map_err(|e| Error::encoding_failure(e.to_string()))
    }

    /// Serializes to pretty-printed JSON after validating
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serialize(self, Format::Json)
    }
}

struct Serializer<'a> {
    doc: &'a Document,
    /// Reverse map of `components.schemas`, the schema cut points
    names: HashMap<SchemaIndex, &'a str>,
    /// Schemas currently being emitted, for cycle refusal
    stack: Vec<SchemaIndex>,
}

impl<'a> Serializer<'a> {
    fn new(doc: &'a Document) -> Self {
        let names = doc
            .components
            .iter()
            .flat_map(|c| c.schemas.iter())
            .map(|(name, index)| (*index, name.as_str()))
            .collect();
        Serializer {
            doc,
            names,
            stack: Vec::new(),
        }
    }

    fn document(&mut self) -> Result<Value> {
        let doc = self.doc;
        let mut map = Map::new();
        map.insert("openapi".into(), Value::String(doc.openapi.clone()));
        // `info` is structurally required and emitted even when empty
        map.insert("info".into(), leaf(&doc.info)?);
        put_str(&mut map, "jsonSchemaDialect", &doc.json_schema_dialect);
        put_leaf_seq(&mut map, "servers", &doc.servers)?;

        let mut paths = Map::new();
        for (path, item) in &doc.paths {
            let value = self.ref_or(item, Self::path_item)?;
            paths.insert(path.clone(), value);
        }
        put_map(&mut map, "paths", paths);

        let mut webhooks = Map::new();
        for (name, item) in &doc.webhooks {
            let value = self.ref_or(item, Self::path_item)?;
            webhooks.insert(name.clone(), value);
        }
        put_map(&mut map, "webhooks", webhooks);

        if let Some(components) = &doc.components {
            let value = self.components(components)?;
            put_map_value(&mut map, "components", value);
        }
        put_leaf_seq(&mut map, "security", &doc.security)?;
        put_leaf_seq(&mut map, "tags", &doc.tags)?;
        put_leaf_opt(&mut map, "externalDocs", &doc.external_docs)?;
        Ok(Value::Object(map))
    }

    fn components(&mut self, components: &Components) -> Result<Value> {
        let mut map = Map::new();

        let mut schemas = Map::new();
        for (name, index) in &components.schemas {
            schemas.insert(name.clone(), self.schema_definition(*index)?);
        }
        put_map(&mut map, "schemas", schemas);

        self.put_ref_or_map(&mut map, "responses", &components.responses, Self::response)?;
        self.put_ref_or_map(
            &mut map,
            "parameters",
            &components.parameters,
            Self::parameter,
        )?;
        self.put_ref_or_map(&mut map, "examples", &components.examples, |_, example| {
            leaf(example)
        })?;
        self.put_ref_or_map(
            &mut map,
            "requestBodies",
            &components.request_bodies,
            Self::request_body,
        )?;
        self.put_ref_or_map(&mut map, "headers", &components.headers, Self::header)?;
        self.put_ref_or_map(
            &mut map,
            "securitySchemes",
            &components.security_schemes,
            |_, scheme| leaf(scheme),
        )?;
        self.put_ref_or_map(&mut map, "links", &components.links, |_, link| leaf(link))?;
        self.put_ref_or_map(&mut map, "callbacks", &components.callbacks, Self::callback)?;
        self.put_ref_or_map(
            &mut map,
            "pathItems",
            &components.path_items,
            Self::path_item,
        )?;
        Ok(Value::Object(map))
    }

    fn path_item(&mut self, item: &PathItem) -> Result<Value> {
        let mut map = Map::new();
        put_str(&mut map, "summary", &item.summary);
        put_str(&mut map, "description", &item.description);
        for (method, operation) in item.operations() {
            let value = self.operation(operation)?;
            map.insert(method.to_string(), value);
        }
        put_leaf_seq(&mut map, "servers", &item.servers)?;
        self.put_parameters(&mut map, &item.parameters)?;
        Ok(Value::Object(map))
    }

    fn operation(&mut self, operation: &Operation) -> Result<Value> {
        let mut map = Map::new();
        put_leaf_seq(&mut map, "tags", &operation.tags)?;
        put_str(&mut map, "summary", &operation.summary);
        put_str(&mut map, "description", &operation.description);
        put_leaf_opt(&mut map, "externalDocs", &operation.external_docs)?;
        put_str(&mut map, "operationId", &operation.operation_id);
        self.put_parameters(&mut map, &operation.parameters)?;
        if let Some(body) = &operation.request_body {
            let value = self.ref_or(body, Self::request_body)?;
            map.insert("requestBody".into(), value);
        }

        let mut responses = Map::new();
        for (status, response) in &operation.responses {
            responses.insert(status.clone(), self.ref_or(response, Self::response)?);
        }
        put_map(&mut map, "responses", responses);

        let mut callbacks = Map::new();
        for (name, callback) in &operation.callbacks {
            callbacks.insert(name.clone(), self.ref_or(callback, Self::callback)?);
        }
        put_map(&mut map, "callbacks", callbacks);

        put_flag(&mut map, "deprecated", operation.deprecated);
        put_leaf_seq(&mut map, "security", &operation.security)?;
        put_leaf_seq(&mut map, "servers", &operation.servers)?;
        Ok(Value::Object(map))
    }

    fn callback(&mut self, callback: &crate::types::Callback) -> Result<Value> {
        let mut map = Map::new();
        for (expression, item) in callback {
            map.insert(expression.clone(), self.ref_or(item, Self::path_item)?);
        }
        Ok(Value::Object(map))
    }

    fn parameter(&mut self, parameter: &Parameter) -> Result<Value> {
        let mut map = Map::new();
        map.insert("name".into(), Value::String(parameter.name.clone()));
        map.insert(
            "in".into(),
            Value::String(parameter.location.as_str().to_string()),
        );
        put_str(&mut map, "description", &parameter.description);
        put_flag(&mut map, "required", parameter.required);
        put_flag(&mut map, "deprecated", parameter.deprecated);
        put_str(&mut map, "style", &parameter.style);
        put_flag(&mut map, "explode", parameter.explode);
        self.put_schema(&mut map, parameter.schema)?;
        put_value(&mut map, "example", &parameter.example);
        self.put_ref_or_map(&mut map, "examples", &parameter.examples, |_, example| {
            leaf(example)
        })?;
        Ok(Value::Object(map))
    }

    fn header(&mut self, header: &Header) -> Result<Value> {
        let mut map = Map::new();
        put_str(&mut map, "description", &header.description);
        put_flag(&mut map, "required", header.required);
        put_flag(&mut map, "deprecated", header.deprecated);
        put_str(&mut map, "style", &header.style);
        put_flag(&mut map, "explode", header.explode);
        self.put_schema(&mut map, header.schema)?;
        put_value(&mut map, "example", &header.example);
        self.put_ref_or_map(&mut map, "examples", &header.examples, |_, example| {
            leaf(example)
        })?;
        Ok(Value::Object(map))
    }

    fn request_body(&mut self, body: &RequestBody) -> Result<Value> {
        let mut map = Map::new();
        put_str(&mut map, "description", &body.description);
        self.put_content(&mut map, &body.content)?;
        put_flag(&mut map, "required", body.required);
        Ok(Value::Object(map))
    }

    fn response(&mut self, response: &Response) -> Result<Value> {
        let mut map = Map::new();
        // Required by the parent response map, emitted even when empty
        map.insert(
            "description".into(),
            Value::String(response.description.clone()),
        );
        self.put_ref_or_map(&mut map, "headers", &response.headers, Self::header)?;
        self.put_content(&mut map, &response.content)?;
        self.put_ref_or_map(&mut map, "links", &response.links, |_, link| leaf(link))?;
        Ok(Value::Object(map))
    }

    fn media_type(&mut self, media_type: &MediaType) -> Result<Value> {
        let mut map = Map::new();
        self.put_schema(&mut map, media_type.schema)?;
        put_value(&mut map, "example", &media_type.example);
        self.put_ref_or_map(&mut map, "examples", &media_type.examples, |_, example| {
            leaf(example)
        })?;
        let mut encodings = Map::new();
        for (name, encoding) in &media_type.encoding {
            encodings.insert(name.clone(), self.encoding(encoding)?);
        }
        put_map(&mut map, "encoding", encodings);
        Ok(Value::Object(map))
    }

    fn encoding(&mut self, encoding: &Encoding) -> Result<Value> {
        let mut map = Map::new();
        put_str(&mut map, "contentType", &encoding.content_type);
        self.put_ref_or_map(&mut map, "headers", &encoding.headers, Self::header)?;
        put_str(&mut map, "style", &encoding.style);
        put_flag(&mut map, "explode", encoding.explode);
        put_flag(&mut map, "allowReserved", encoding.allow_reserved);
        Ok(Value::Object(map))
    }

    /// Emits a schema reached from a non-definition slot
    fn put_schema(&mut self, map: &mut Map<String, Value>, slot: Option<SchemaIndex>) -> Result<()> {
        if let Some(index) = slot {
            let value = self.schema_value(index, false)?;
            map.insert("schema".into(), value);
        }
        Ok(())
    }

    /// Emits a `components.schemas` definition inline
    fn schema_definition(&mut self, index: SchemaIndex) -> Result<Value> {
        self.schema_value(index, true)
    }

    fn schema_value(&mut self, index: SchemaIndex, at_definition: bool) -> Result<Value> {
        if !at_definition {
            if let Some(name) = self.names.get(&index) {
                let mut map = Map::new();
                map.insert(
                    "$ref".into(),
                    Value::String(format!("#/components/schemas/{name}")),
                );
                return Ok(Value::Object(map));
            }
        }
        if self.stack.contains(&index) {
            return Err(Error::encoding_failure(format!(
                "{index} participates in a cycle with no component-registered schema"
            )));
        }
        let schema = self
            .doc
            .arena
            .get(index)
            .ok_or_else(|| Error::encoding_failure(format!("{index} is not in the arena")))?;

        self.stack.push(index);
        let result = self.schema_fields(schema);
        self.stack.pop();
        result
    }

    fn schema_fields(&mut self, schema: &Schema) -> Result<Value> {
        let mut map = Map::new();
        put_str(&mut map, "$ref", &schema.ref_path);
        put_str(&mut map, "title", &schema.title);
        put_str(&mut map, "description", &schema.description);
        match schema.types.as_slice() {
            [] => {}
            [single] => {
                map.insert("type".into(), Value::String(single.as_str().to_string()));
            }
            many => {
                let types = many
                    .iter()
                    .map(|t| Value::String(t.as_str().to_string()))
                    .collect();
                map.insert("type".into(), Value::Array(types));
            }
        }
        put_str(&mut map, "format", &schema.format);
        put_values(&mut map, "enum", &schema.enum_values);
        put_value(&mut map, "const", &schema.const_value);
        put_value(&mut map, "default", &schema.default);
        put_f64(&mut map, "multipleOf", schema.multiple_of)?;
        put_f64(&mut map, "maximum", schema.maximum)?;
        put_f64(&mut map, "exclusiveMaximum", schema.exclusive_maximum)?;
        put_f64(&mut map, "minimum", schema.minimum)?;
        put_f64(&mut map, "exclusiveMinimum", schema.exclusive_minimum)?;
        put_u64(&mut map, "maxLength", schema.max_length);
        put_u64(&mut map, "minLength", schema.min_length);
        put_str(&mut map, "pattern", &schema.pattern);
        put_u64(&mut map, "maxItems", schema.max_items);
        put_u64(&mut map, "minItems", schema.min_items);
        put_flag(&mut map, "uniqueItems", schema.unique_items);
        put_u64(&mut map, "maxProperties", schema.max_properties);
        put_u64(&mut map, "minProperties", schema.min_properties);
        if !schema.required.is_empty() {
            let required = schema
                .required
                .iter()
                .map(|name| Value::String(name.clone()))
                .collect();
            map.insert("required".into(), Value::Array(required));
        }

        let mut properties = Map::new();
        for (name, child) in &schema.properties {
            properties.insert(name.clone(), self.schema_value(*child, false)?);
        }
        put_map(&mut map, "properties", properties);

        match schema.additional_properties {
            Some(AdditionalProperties::Allowed(allowed)) => {
                map.insert("additionalProperties".into(), Value::Bool(allowed));
            }
            Some(AdditionalProperties::Schema(child)) => {
                let value = self.schema_value(child, false)?;
                map.insert("additionalProperties".into(), value);
            }
            None => {}
        }
        if let Some(child) = schema.items {
            let value = self.schema_value(child, false)?;
            map.insert("items".into(), value);
        }
        self.put_schema_seq(&mut map, "allOf", &schema.all_of)?;
        self.put_schema_seq(&mut map, "anyOf", &schema.any_of)?;
        self.put_schema_seq(&mut map, "oneOf", &schema.one_of)?;
        if let Some(child) = schema.not {
            let value = self.schema_value(child, false)?;
            map.insert("not".into(), value);
        }
        put_values(&mut map, "examples", &schema.examples);
        put_flag(&mut map, "deprecated", schema.deprecated);
        put_flag(&mut map, "readOnly", schema.read_only);
        put_flag(&mut map, "writeOnly", schema.write_only);
        put_leaf_opt(&mut map, "discriminator", &schema.discriminator)?;
        put_leaf_opt(&mut map, "xml", &schema.xml)?;
        put_leaf_opt(&mut map, "externalDocs", &schema.external_docs)?;
        Ok(Value::Object(map))
    }

    fn put_schema_seq(
        &mut self,
        map: &mut Map<String, Value>,
        key: &str,
        indices: &[SchemaIndex],
    ) -> Result<()> {
        if indices.is_empty() {
            return Ok(());
        }
        let mut values = Vec::with_capacity(indices.len());
        for index in indices {
            values.push(self.schema_value(*index, false)?);
        }
        map.insert(key.to_string(), Value::Array(values));
        Ok(())
    }

    fn put_parameters(
        &mut self,
        map: &mut Map<String, Value>,
        parameters: &[RefOr<Parameter>],
    ) -> Result<()> {
        if parameters.is_empty() {
            return Ok(());
        }
        let mut values = Vec::with_capacity(parameters.len());
        for slot in parameters {
            values.push(self.ref_or(slot, Self::parameter)?);
        }
        map.insert("parameters".into(), Value::Array(values));
        Ok(())
    }

    fn put_content(
        &mut self,
        map: &mut Map<String, Value>,
        content: &indexmap::IndexMap<String, MediaType>,
    ) -> Result<()> {
        let mut values = Map::new();
        for (media_type, entry) in content {
            values.insert(media_type.clone(), self.media_type(entry)?);
        }
        put_map(map, "content", values);
        Ok(())
    }

    /// Serializes a value-or-reference slot: a reference emits exactly
    /// its own `$ref`/`summary`/`description`, never the referent
    fn ref_or<T>(
        &mut self,
        slot: &RefOr<T>,
        inline: impl FnOnce(&mut Self, &T) -> Result<Value>,
    ) -> Result<Value> {
        match slot {
            RefOr::Inline(value) => inline(self, value),
            RefOr::Ref(reference) => leaf(reference),
        }
    }

    fn put_ref_or_map<T>(
        &mut self,
        map: &mut Map<String, Value>,
        key: &str,
        entries: &indexmap::IndexMap<String, RefOr<T>>,
        mut inline: impl FnMut(&mut Self, &T) -> Result<Value>,
    ) -> Result<()> {
        let mut values = Map::new();
        for (name, slot) in entries {
            let value = match slot {
                RefOr::Inline(entry) => inline(self, entry)?,
                RefOr::Ref(reference) => leaf(reference)?,
            };
            values.insert(name.clone(), value);
        }
        put_map(map, key, values);
        Ok(())
    }
}

/// Serde-encodes a leaf entity into the canonical tree
fn leaf<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn put_str(map: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

fn put_flag(map: &mut Map<String, Value>, key: &str, flag: Option<bool>) {
    // `Some(false)` and `None` are both omitted; every boolean field
    // in OpenAPI 3.1 defaults to false on the wire
    if flag == Some(true) {
        map.insert(key.to_string(), Value::Bool(true));
    }
}

fn put_u64(map: &mut Map<String, Value>, key: &str, value: Option<u64>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::Number(Number::from(value)));
    }
}

fn put_f64(map: &mut Map<String, Value>, key: &str, value: Option<f64>) -> Result<()> {
    if let Some(value) = value {
        let number = Number::from_f64(value)
            .ok_or_else(|| Error::encoding_failure(format!("`{key}` is not a finite number")))?;
        map.insert(key.to_string(), Value::Number(number));
    }
    Ok(())
}

fn put_value(map: &mut Map<String, Value>, key: &str, value: &Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.clone());
    }
}

fn put_values(map: &mut Map<String, Value>, key: &str, values: &[Value]) {
    if !values.is_empty() {
        map.insert(key.to_string(), Value::Array(values.to_vec()));
    }
}

/// Inserts a nested object unless it is empty
fn put_map(map: &mut Map<String, Value>, key: &str, value: Map<String, Value>) {
    if !value.is_empty() {
        map.insert(key.to_string(), Value::Object(value));
    }
}

fn put_map_value(map: &mut Map<String, Value>, key: &str, value: Value) {
    match value {
        Value::Object(object) => put_map(map, key, object),
        other => {
            map.insert(key.to_string(), other);
        }
    }
}

/// Serde-encodes an optional leaf, omitting it when recursively empty
fn put_leaf_opt<T: Serialize>(
    map: &mut Map<String, Value>,
    key: &str,
    value: &Option<T>,
) -> Result<()> {
    if let Some(value) = value {
        let encoded = leaf(value)?;
        put_map_value(map, key, encoded);
    }
    Ok(())
}

/// Serde-encodes a sequence of leaves, omitting the key when empty
fn put_leaf_seq<T: Serialize>(map: &mut Map<String, Value>, key: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Ok(());
    }
    let mut encoded = Vec::with_capacity(values.len());
    for value in values {
        encoded.push(leaf(value)?);
    }
    map.insert(key.to_string(), Value::Array(encoded));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::types::{
        Contact, Example, ExternalDocumentation, Info, License, MediaType, Operation, Parameter,
        PathItem, Reference, Response, Tag,
    };

    fn minimal_doc() -> Document {
        Document::new(Info::new("Pet Store", "1.0.0"))
    }

    #[test]
    fn test_minimal_document_exact_keys() {
        let doc = minimal_doc();
        let yaml = doc.to_yaml().unwrap();
        assert_eq!(
            yaml,
            "openapi: 3.1.0\ninfo:\n  title: Pet Store\n  version: 1.0.0\n"
        );
    }

    #[test]
    fn test_formats_agree_on_structure() {
        let doc = minimal_doc();
        let json: Value = serde_json::from_slice(&doc.to_json().unwrap()).unwrap();
        let yaml: Value =
            serde_yaml::from_slice(&serialize(&doc, Format::Yaml).unwrap()).unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn test_reference_slot_emits_only_pointer_fields() {
        let mut doc = minimal_doc();
        doc.components_mut()
            .responses
            .insert("NotFound".into(), RefOr::inline(Response::new("not found")));
        let mut operation = Operation::new();
        let mut reference = Reference::to_response("NotFound");
        reference.description = "overridden description".to_string();
        operation.add_response("404", reference.into());
        operation.add_response("200", RefOr::inline(Response::new("ok")));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));

        let value = to_value(&doc).unwrap();
        let slot = &value["paths"]["/pets"]["get"]["responses"]["404"];
        let keys: Vec<&String> = slot.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["$ref", "description"]);
        assert_eq!(slot["$ref"], "#/components/responses/NotFound");
    }

    #[test]
    fn test_boolean_omission() {
        let mut doc = minimal_doc();
        let mut required = Parameter::query("limit");
        required.required = Some(true);
        let mut unset = Parameter::query("offset");
        unset.required = None;
        let mut explicit_false = Parameter::query("page");
        explicit_false.required = Some(false);

        let mut operation = Operation::new();
        operation.add_response("200", RefOr::inline(Response::new("ok")));
        operation.add_parameter(RefOr::inline(required));
        operation.add_parameter(RefOr::inline(unset));
        operation.add_parameter(RefOr::inline(explicit_false));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));

        let value = to_value(&doc).unwrap();
        let parameters = value["paths"]["/pets"]["get"]["parameters"]
            .as_array()
            .unwrap();
        assert_eq!(parameters[0]["required"], Value::Bool(true));
        assert!(parameters[1].get("required").is_none());
        assert!(parameters[2].get("required").is_none());
    }

    #[test]
    fn test_recursively_empty_nested_objects_omitted() {
        let mut doc = minimal_doc();
        doc.info.contact = Some(Contact::default());
        doc.info.license = Some(License::default());
        let mut tag = Tag::new("pets");
        tag.external_docs = Some(ExternalDocumentation::new(""));
        doc.add_tag(tag);

        let value = to_value(&doc).unwrap();
        let info = value["info"].as_object().unwrap();
        assert!(info.get("contact").is_none());
        assert!(info.get("license").is_none());
        assert_eq!(value["tags"][0], serde_json::json!({"name": "pets"}));
    }

    #[test]
    fn test_partially_filled_nested_objects_survive() {
        let mut doc = minimal_doc();
        doc.info.contact = Some(Contact {
            email: "api@example.com".to_string(),
            ..Contact::default()
        });

        let value = to_value(&doc).unwrap();
        assert_eq!(
            value["info"]["contact"],
            serde_json::json!({"email": "api@example.com"})
        );
    }

    #[test]
    fn test_named_schema_emitted_inline_once_and_referenced_elsewhere() {
        let mut doc = minimal_doc();
        let pet = doc.alloc_schema(Schema::object());
        doc.register_schema("Pet", pet);

        let mut response = Response::new("a pet");
        response.add_content("application/json", MediaType::schema(pet));
        let mut operation = Operation::new();
        operation.add_response("200", RefOr::inline(response));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets/{petId}", RefOr::inline(item));
        let mut parameter = Parameter::path("petId");
        parameter.schema = Some(doc.alloc_schema(Schema::string()));
        match doc.paths.get_mut("/pets/{petId}").unwrap() {
            RefOr::Inline(item) => item
                .get
                .as_mut()
                .unwrap()
                .add_parameter(RefOr::inline(parameter)),
            RefOr::Ref(_) => unreachable!(),
        }

        let value = to_value(&doc).unwrap();
        let slot =
            &value["paths"]["/pets/{petId}"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
        assert_eq!(slot["$ref"], "#/components/schemas/Pet");
        assert_eq!(value["components"]["schemas"]["Pet"]["type"], "object");
    }

    #[test]
    fn test_self_referential_schema_terminates() {
        let mut doc = minimal_doc();
        let node = doc.alloc_schema(Schema::object());
        doc.arena.get_mut(node).unwrap().add_property("child", node);
        doc.register_schema("Node", node);

        let value = to_value(&doc).unwrap();
        assert_eq!(
            value["components"]["schemas"]["Node"]["properties"]["child"]["$ref"],
            "#/components/schemas/Node"
        );
    }

    #[test]
    fn test_unnamed_cycle_refused() {
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

        let err = serialize_unchecked(&doc, Format::Yaml).unwrap_err();
        assert!(matches!(err, Error::EncodingFailure(_)));
    }

    #[test]
    fn test_serialize_refuses_invalid_document() {
        let doc = Document::new(Info::new("", "1.0.0"));
        let err = serialize(&doc, Format::Yaml).unwrap_err();
        let violations = err.violations().unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location, "info.title");
    }

    #[test]
    fn test_empty_security_requirement_survives() {
        let mut doc = minimal_doc();
        doc.components_mut().security_schemes.insert(
            "api_key".into(),
            RefOr::inline(crate::types::SecurityScheme {
                scheme_type: "apiKey".into(),
                name: "X-Api-Key".into(),
                location: "header".into(),
                ..Default::default()
            }),
        );
        doc.security
            .push(crate::types::SecurityRequirement::scheme(
                "api_key",
                vec![],
            ));
        doc.security.push(crate::types::SecurityRequirement::none());

        let value = to_value(&doc).unwrap();
        let security = value["security"].as_array().unwrap();
        assert_eq!(security.len(), 2);
        assert_eq!(security[1], serde_json::json!({}));
    }

    #[test]
    fn test_media_type_example_round_trips_value() {
        let mut doc = minimal_doc();
        let media = MediaType::new()
            .with_example(serde_json::json!({"id": 1, "name": "dog"}))
            .unwrap();
        let mut response = Response::new("ok");
        response.add_content("application/json", media);
        let mut operation = Operation::new();
        operation.add_response("200", RefOr::inline(response));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));

        let value = to_value(&doc).unwrap();
        assert_eq!(
            value["paths"]["/pets"]["get"]["responses"]["200"]["content"]["application/json"]
                ["example"],
            serde_json::json!({"id": 1, "name": "dog"})
        );
    }

    #[test]
    fn test_named_example_slots() {
        let media = MediaType::new()
            .with_named_example("dog", RefOr::inline(Example::new(serde_json::json!("rex"))))
            .unwrap()
            .with_named_example("cat", Reference::new("#/components/examples/Cat").into())
            .unwrap();
        let mut doc = minimal_doc();
        doc.components_mut()
            .examples
            .insert("Cat".into(), RefOr::inline(Example::new(serde_json::json!("tom"))));
        let mut response = Response::new("ok");
        response.add_content("application/json", media);
        let mut operation = Operation::new();
        operation.add_response("200", RefOr::inline(response));
        let mut item = PathItem::new();
        item.get = Some(operation);
        doc.add_path("/pets", RefOr::inline(item));

        let value = to_value(&doc).unwrap();
        let examples = &value["paths"]["/pets"]["get"]["responses"]["200"]["content"]
            ["application/json"]["examples"];
        assert_eq!(examples["dog"]["value"], "rex");
        assert_eq!(examples["cat"]["$ref"], "#/components/examples/Cat");
    }
}
