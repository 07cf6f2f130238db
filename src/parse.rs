//! Reconstruction of a [`Document`] from previously serialized output.
//!
//! The parser accepts the canonical tree produced by
//! [`crate::serialize`] (or any structurally equivalent OpenAPI 3.1
//! document) and rebuilds the model, including the schema arena.
//! `$ref` strings stay opaque: a reference parses to a reference, never
//! to its target, so parse-then-serialize reproduces the input bytes.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::{Error, Result};
use crate::schema::{AdditionalProperties, InstanceType, Schema, SchemaIndex};
use crate::types::{
    Callback, Components, Document, Encoding, Header, Info, MediaType, Operation, Parameter,
    ParameterLocation, PathItem, RefOr, Reference, RequestBody, Response,
};
use crate::version;

/// Parses a document from JSON bytes
pub fn from_json(bytes: &[u8]) -> Result<Document> {
    let value: Value = serde_json::from_slice(bytes)?;
    document(&value)
}

/// Parses a document from YAML bytes
pub fn from_yaml(bytes: &[u8]) -> Result<Document> {
    let value: Value = serde_yaml::from_slice(bytes)?;
    document(&value)
}

/// Rebuilds a document from a value tree
pub fn document(value: &Value) -> Result<Document> {
    let map = obj(value, "document root")?;

    let openapi = require_str(map, "openapi", "document root")?;
    if !version::is_supported(&openapi) {
        return Err(Error::UnsupportedVersion(openapi));
    }
    let info: Info = leaf(
        map.get("info")
            .ok_or_else(|| Error::invalid_document("missing `info`"))?,
    )?;

    let mut doc = Document::new(info);
    doc.openapi = openapi;
    doc.json_schema_dialect = get_str(map, "jsonSchemaDialect");

    if let Some(servers) = map.get("servers") {
        doc.servers = leaf(servers)?;
    }
    if let Some(paths) = map.get("paths") {
        for (path, item) in obj(paths, "paths")? {
            let item = ref_or(&mut doc, item, parse_path_item)?;
            doc.paths.insert(path.clone(), item);
        }
    }
    if let Some(webhooks) = map.get("webhooks") {
        for (name, item) in obj(webhooks, "webhooks")? {
            let item = ref_or(&mut doc, item, parse_path_item)?;
            doc.webhooks.insert(name.clone(), item);
        }
    }
    if let Some(components) = map.get("components") {
        let components = parse_components(&mut doc, components)?;
        doc.components = Some(components);
    }
    if let Some(security) = map.get("security") {
        doc.security = leaf(security)?;
    }
    if let Some(tags) = map.get("tags") {
        doc.tags = leaf(tags)?;
    }
    if let Some(external_docs) = map.get("externalDocs") {
        doc.external_docs = Some(leaf(external_docs)?);
    }
    Ok(doc)
}

fn parse_components(doc: &mut Document, value: &Value) -> Result<Components> {
    let map = obj(value, "components")?;
    let mut components = Components::new();

    if let Some(schemas) = map.get("schemas") {
        for (name, schema) in obj(schemas, "components.schemas")? {
            let index = parse_schema(doc, schema)?;
            components.schemas.insert(name.clone(), index);
        }
    }
    if let Some(entries) = map.get("responses") {
        for (name, entry) in obj(entries, "components.responses")? {
            let slot = ref_or(doc, entry, parse_response)?;
            components.responses.insert(name.clone(), slot);
        }
    }
    if let Some(entries) = map.get("parameters") {
        for (name, entry) in obj(entries, "components.parameters")? {
            let slot = ref_or(doc, entry, parse_parameter)?;
            components.parameters.insert(name.clone(), slot);
        }
    }
    if let Some(entries) = map.get("examples") {
        for (name, entry) in obj(entries, "components.examples")? {
            let slot = ref_or(doc, entry, |_, v| leaf(v))?;
            components.examples.insert(name.clone(), slot);
        }
    }
    if let Some(entries) = map.get("requestBodies") {
        for (name, entry) in obj(entries, "components.requestBodies")? {
            let slot = ref_or(doc, entry, parse_request_body)?;
            components.request_bodies.insert(name.clone(), slot);
        }
    }
    if let Some(entries) = map.get("headers") {
        for (name, entry) in obj(entries, "components.headers")? {
            let slot = ref_or(doc, entry, parse_header)?;
            components.headers.insert(name.clone(), slot);
        }
    }
    if let Some(entries) = map.get("securitySchemes") {
        for (name, entry) in obj(entries, "components.securitySchemes")? {
            let slot = ref_or(doc, entry, |_, v| leaf(v))?;
            components.security_schemes.insert(name.clone(), slot);
        }
    }
    if let Some(entries) = map.get("links") {
        for (name, entry) in obj(entries, "components.links")? {
            let slot = ref_or(doc, entry, |_, v| leaf(v))?;
            components.links.insert(name.clone(), slot);
        }
    }
    if let Some(entries) = map.get("callbacks") {
        for (name, entry) in obj(entries, "components.callbacks")? {
            let slot = ref_or(doc, entry, parse_callback)?;
            components.callbacks.insert(name.clone(), slot);
        }
    }
    if let Some(entries) = map.get("pathItems") {
        for (name, entry) in obj(entries, "components.pathItems")? {
            let slot = ref_or(doc, entry, parse_path_item)?;
            components.path_items.insert(name.clone(), slot);
        }
    }
    Ok(components)
}

fn parse_path_item(doc: &mut Document, value: &Value) -> Result<PathItem> {
    let map = obj(value, "path item")?;
    let mut item = PathItem::new();
    item.summary = get_str(map, "summary");
    item.description = get_str(map, "description");
    for method in ["get", "put", "post", "delete", "options", "head", "patch", "trace"] {
        if let Some(operation) = map.get(method) {
            let operation = parse_operation(doc, operation)?;
            // Methods come from a fixed list, set_operation cannot fail
            let _ = item.set_operation(method, operation);
        }
    }
    if let Some(servers) = map.get("servers") {
        item.servers = leaf(servers)?;
    }
    item.parameters = parse_parameter_list(doc, map)?;
    Ok(item)
}

fn parse_operation(doc: &mut Document, value: &Value) -> Result<Operation> {
    let map = obj(value, "operation")?;
    let mut operation = Operation::new();
    if let Some(tags) = map.get("tags") {
        operation.tags = leaf(tags)?;
    }
    operation.summary = get_str(map, "summary");
    operation.description = get_str(map, "description");
    if let Some(external_docs) = map.get("externalDocs") {
        operation.external_docs = Some(leaf(external_docs)?);
    }
    operation.operation_id = get_str(map, "operationId");
    operation.parameters = parse_parameter_list(doc, map)?;
    if let Some(body) = map.get("requestBody") {
        operation.request_body = Some(ref_or(doc, body, parse_request_body)?);
    }
    if let Some(responses) = map.get("responses") {
        for (status, response) in obj(responses, "responses")? {
            let slot = ref_or(doc, response, parse_response)?;
            operation.responses.insert(status.clone(), slot);
        }
    }
    if let Some(callbacks) = map.get("callbacks") {
        for (name, callback) in obj(callbacks, "callbacks")? {
            let slot = ref_or(doc, callback, parse_callback)?;
            operation.callbacks.insert(name.clone(), slot);
        }
    }
    operation.deprecated = get_flag(map, "deprecated");
    if let Some(security) = map.get("security") {
        operation.security = leaf(security)?;
    }
    if let Some(servers) = map.get("servers") {
        operation.servers = leaf(servers)?;
    }
    Ok(operation)
}

fn parse_callback(doc: &mut Document, value: &Value) -> Result<Callback> {
    let map = obj(value, "callback")?;
    let mut callback = Callback::new();
    for (expression, item) in map {
        let slot = ref_or(doc, item, parse_path_item)?;
        callback.insert(expression.clone(), slot);
    }
    Ok(callback)
}

fn parse_parameter_list(doc: &mut Document, map: &Map<String, Value>) -> Result<Vec<RefOr<Parameter>>> {
    let Some(parameters) = map.get("parameters") else {
        return Ok(Vec::new());
    };
    let entries = parameters
        .as_array()
        .ok_or_else(|| Error::invalid_document("`parameters` must be an array"))?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        out.push(ref_or(doc, entry, parse_parameter)?);
    }
    Ok(out)
}

fn parse_parameter(doc: &mut Document, value: &Value) -> Result<Parameter> {
    let map = obj(value, "parameter")?;
    let name = require_str(map, "name", "parameter")?;
    let location = require_str(map, "in", "parameter")?;
    let location = ParameterLocation::parse(&location)
        .ok_or_else(|| Error::invalid_document(format!("unknown parameter location `{location}`")))?;

    let mut parameter = Parameter::new(name, location);
    parameter.description = get_str(map, "description");
    parameter.required = get_flag(map, "required");
    parameter.deprecated = get_flag(map, "deprecated");
    parameter.style = get_str(map, "style");
    parameter.explode = get_flag(map, "explode");
    if let Some(schema) = map.get("schema") {
        parameter.schema = Some(parse_schema(doc, schema)?);
    }
    parameter.example = map.get("example").cloned();
    parameter.examples = parse_example_map(doc, map)?;
    Ok(parameter)
}

fn parse_header(doc: &mut Document, value: &Value) -> Result<Header> {
    let map = obj(value, "header")?;
    let mut header = Header::new();
    header.description = get_str(map, "description");
    header.required = get_flag(map, "required");
    header.deprecated = get_flag(map, "deprecated");
    header.style = get_str(map, "style");
    header.explode = get_flag(map, "explode");
    if let Some(schema) = map.get("schema") {
        header.schema = Some(parse_schema(doc, schema)?);
    }
    header.example = map.get("example").cloned();
    header.examples = parse_example_map(doc, map)?;
    Ok(header)
}

fn parse_request_body(doc: &mut Document, value: &Value) -> Result<RequestBody> {
    let map = obj(value, "request body")?;
    let mut body = RequestBody::new();
    body.description = get_str(map, "description");
    body.content = parse_content(doc, map)?;
    body.required = get_flag(map, "required");
    Ok(body)
}

fn parse_response(doc: &mut Document, value: &Value) -> Result<Response> {
    let map = obj(value, "response")?;
    let mut response = Response::new(get_str(map, "description"));
    if let Some(headers) = map.get("headers") {
        for (name, header) in obj(headers, "headers")? {
            let slot = ref_or(doc, header, parse_header)?;
            response.headers.insert(name.clone(), slot);
        }
    }
    response.content = parse_content(doc, map)?;
    if let Some(links) = map.get("links") {
        for (name, link) in obj(links, "links")? {
            let slot = ref_or(doc, link, |_, v| leaf(v))?;
            response.links.insert(name.clone(), slot);
        }
    }
    Ok(response)
}

fn parse_content(
    doc: &mut Document,
    map: &Map<String, Value>,
) -> Result<indexmap::IndexMap<String, MediaType>> {
    let mut content = indexmap::IndexMap::new();
    if let Some(entries) = map.get("content") {
        for (media_type, entry) in obj(entries, "content")? {
            content.insert(media_type.clone(), parse_media_type(doc, entry)?);
        }
    }
    Ok(content)
}

fn parse_media_type(doc: &mut Document, value: &Value) -> Result<MediaType> {
    let map = obj(value, "media type")?;
    let mut media_type = MediaType::new();
    if let Some(schema) = map.get("schema") {
        media_type.schema = Some(parse_schema(doc, schema)?);
    }
    media_type.example = map.get("example").cloned();
    media_type.examples = parse_example_map(doc, map)?;
    if media_type.example.is_some() && !media_type.examples.is_empty() {
        return Err(Error::invalid_combination("example", "examples"));
    }
    if let Some(encodings) = map.get("encoding") {
        for (name, encoding) in obj(encodings, "encoding")? {
            media_type
                .encoding
                .insert(name.clone(), parse_encoding(doc, encoding)?);
        }
    }
    Ok(media_type)
}

fn parse_encoding(doc: &mut Document, value: &Value) -> Result<Encoding> {
    let map = obj(value, "encoding")?;
    let mut encoding = Encoding::default();
    encoding.content_type = get_str(map, "contentType");
    if let Some(headers) = map.get("headers") {
        for (name, header) in obj(headers, "headers")? {
            let slot = ref_or(doc, header, parse_header)?;
            encoding.headers.insert(name.clone(), slot);
        }
    }
    encoding.style = get_str(map, "style");
    encoding.explode = get_flag(map, "explode");
    encoding.allow_reserved = get_flag(map, "allowReserved");
    Ok(encoding)
}

fn parse_example_map(
    doc: &mut Document,
    map: &Map<String, Value>,
) -> Result<indexmap::IndexMap<String, RefOr<crate::types::Example>>> {
    let mut examples = indexmap::IndexMap::new();
    if let Some(entries) = map.get("examples") {
        for (name, entry) in obj(entries, "examples")? {
            examples.insert(name.clone(), ref_or(doc, entry, |_, v| leaf(v))?);
        }
    }
    Ok(examples)
}

/// Parses a schema object into the arena and returns its handle
fn parse_schema(doc: &mut Document, value: &Value) -> Result<SchemaIndex> {
    let map = obj(value, "schema")?;
    let mut schema = Schema::new();
    schema.ref_path = get_str(map, "$ref");
    schema.title = get_str(map, "title");
    schema.description = get_str(map, "description");
    if let Some(types) = map.get("type") {
        schema.types = parse_types(types)?;
    }
    schema.format = get_str(map, "format");
    if let Some(values) = map.get("enum") {
        schema.enum_values = values
            .as_array()
            .ok_or_else(|| Error::invalid_document("`enum` must be an array"))?
            .clone();
    }
    schema.const_value = map.get("const").cloned();
    schema.default = map.get("default").cloned();
    schema.multiple_of = get_f64(map, "multipleOf");
    schema.maximum = get_f64(map, "maximum");
    schema.exclusive_maximum = get_f64(map, "exclusiveMaximum");
    schema.minimum = get_f64(map, "minimum");
    schema.exclusive_minimum = get_f64(map, "exclusiveMinimum");
    schema.max_length = get_u64(map, "maxLength");
    schema.min_length = get_u64(map, "minLength");
    schema.pattern = get_str(map, "pattern");
    schema.max_items = get_u64(map, "maxItems");
    schema.min_items = get_u64(map, "minItems");
    schema.unique_items = get_flag(map, "uniqueItems");
    schema.max_properties = get_u64(map, "maxProperties");
    schema.min_properties = get_u64(map, "minProperties");
    if let Some(required) = map.get("required") {
        schema.required = leaf(required)?;
    }
    if let Some(properties) = map.get("properties") {
        for (name, property) in obj(properties, "properties")? {
            let index = parse_schema(doc, property)?;
            schema.properties.insert(name.clone(), index);
        }
    }
    if let Some(additional) = map.get("additionalProperties") {
        schema.additional_properties = Some(match additional {
            Value::Bool(allowed) => AdditionalProperties::Allowed(*allowed),
            other => AdditionalProperties::Schema(parse_schema(doc, other)?),
        });
    }
    if let Some(items) = map.get("items") {
        schema.items = Some(parse_schema(doc, items)?);
    }
    schema.all_of = parse_schema_array(doc, map, "allOf")?;
    schema.any_of = parse_schema_array(doc, map, "anyOf")?;
    schema.one_of = parse_schema_array(doc, map, "oneOf")?;
    if let Some(not) = map.get("not") {
        schema.not = Some(parse_schema(doc, not)?);
    }
    if let Some(examples) = map.get("examples") {
        schema.examples = examples
            .as_array()
            .ok_or_else(|| Error::invalid_document("`examples` must be an array"))?
            .clone();
    }
    schema.deprecated = get_flag(map, "deprecated");
    schema.read_only = get_flag(map, "readOnly");
    schema.write_only = get_flag(map, "writeOnly");
    if let Some(discriminator) = map.get("discriminator") {
        schema.discriminator = Some(leaf(discriminator)?);
    }
    if let Some(xml) = map.get("xml") {
        schema.xml = Some(leaf(xml)?);
    }
    if let Some(external_docs) = map.get("externalDocs") {
        schema.external_docs = Some(leaf(external_docs)?);
    }
    Ok(doc.alloc_schema(schema))
}

fn parse_schema_array(
    doc: &mut Document,
    map: &Map<String, Value>,
    key: &str,
) -> Result<Vec<SchemaIndex>> {
    let Some(entries) = map.get(key) else {
        return Ok(Vec::new());
    };
    let entries = entries
        .as_array()
        .ok_or_else(|| Error::invalid_document(format!("`{key}` must be an array")))?;
    let mut indices = Vec::with_capacity(entries.len());
    for entry in entries {
        indices.push(parse_schema(doc, entry)?);
    }
    Ok(indices)
}

fn parse_types(value: &Value) -> Result<Vec<InstanceType>> {
    let parse_one = |v: &Value| -> Result<InstanceType> {
        let name = v
            .as_str()
            .ok_or_else(|| Error::invalid_document("`type` entries must be strings"))?;
        InstanceType::parse(name)
            .ok_or_else(|| Error::invalid_document(format!("unknown instance type `{name}`")))
    };
    match value {
        Value::Array(entries) => entries.iter().map(parse_one).collect(),
        single => Ok(vec![parse_one(single)?]),
    }
}

/// Parses a value-or-reference slot: any object carrying `$ref` is a
/// reference, everything else is inline
fn ref_or<T>(
    doc: &mut Document,
    value: &Value,
    inline: impl FnOnce(&mut Document, &Value) -> Result<T>,
) -> Result<RefOr<T>> {
    if let Some(map) = value.as_object() {
        if map.contains_key("$ref") {
            let mut reference = Reference::new(require_str(map, "$ref", "reference")?);
            reference.summary = get_str(map, "summary");
            reference.description = get_str(map, "description");
            return Ok(RefOr::Ref(reference));
        }
    }
    Ok(RefOr::Inline(inline(doc, value)?))
}

fn leaf<T: DeserializeOwned>(value: &Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|e| Error::invalid_document(e.to_string()))
}

fn obj<'v>(value: &'v Value, what: &str) -> Result<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::invalid_document(format!("{what} must be an object")))
}

fn get_str(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn require_str(map: &Map<String, Value>, key: &str, what: &str) -> Result<String> {
    map.get(key)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| Error::invalid_document(format!("{what} is missing `{key}`")))
}

fn get_flag(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(|v| v.as_bool())
}

fn get_u64(map: &Map<String, Value>, key: &str) -> Option<u64> {
    map.get(key).and_then(|v| v.as_u64())
}

fn get_f64(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(|v| v.as_f64())
}
