//! Integration tests covering end-to-end document workflows

use oasdoc::prelude::*;
use serde_json::json;

/// Builds a small but representative pet-store document
fn pet_store() -> Document {
    let mut info = Info::new("Pet Store", "1.0.0");
    info.summary = "Everything about pets".to_string();
    info.license = Some(
        License::new("Apache-2.0")
            .with_identifier("Apache-2.0")
            .unwrap(),
    );
    let mut doc = Document::new(info);

    let mut server = Server::new("https://{env}.example.com/v1");
    let mut env = ServerVariable::new("api");
    env.enum_values = vec!["api".to_string(), "staging".to_string()];
    server.add_variable("env", env);
    doc.add_server(server);
    doc.add_tag(Tag::new("pets"));

    // Pet references itself through `friends`, closed after allocation
    let pet = doc.alloc_schema(Schema::object());
    let id = doc.alloc_schema(Schema::integer().with_format("int64"));
    let name = doc.alloc_schema(Schema::string());
    let friends = doc.alloc_schema(Schema::array(pet));
    {
        let schema = doc.arena.get_mut(pet).unwrap();
        schema.add_property("id", id);
        schema.add_property("name", name);
        schema.add_property("friends", friends);
        schema.require("id");
        schema.require("name");
    }
    doc.register_schema("Pet", pet);

    let pets = doc.alloc_schema(Schema::array(pet));

    doc.components_mut().responses.insert(
        "NotFound".to_string(),
        RefOr::inline(Response::new("the requested pet does not exist")),
    );

    let mut list = Operation::new();
    list.operation_id = "listPets".to_string();
    list.tags = vec!["pets".to_string()];
    let limit = doc.alloc_schema(Schema::integer());
    list.add_parameter(RefOr::inline(
        Parameter::query("limit").with_schema(limit),
    ));
    let mut ok = Response::new("a paged list of pets");
    ok.add_content("application/json", MediaType::schema(pets));
    list.add_response("200", RefOr::inline(ok));

    let mut create = Operation::new();
    create.operation_id = "createPet".to_string();
    let mut body = RequestBody::new();
    body.required = Some(true);
    body.add_content("application/json", MediaType::schema(pet));
    create.request_body = Some(RefOr::inline(body));
    create.add_response("201", RefOr::inline(Response::new("created")));

    let mut collection = PathItem::new();
    collection.get = Some(list);
    collection.post = Some(create);
    doc.add_path("/pets", RefOr::inline(collection));

    let mut get = Operation::new();
    get.operation_id = "getPet".to_string();
    let pet_id = doc.alloc_schema(Schema::string());
    get.add_parameter(RefOr::inline(
        Parameter::path("petId").with_schema(pet_id),
    ));
    let mut found = Response::new("the pet");
    found.add_content("application/json", MediaType::schema(pet));
    get.add_response("200", RefOr::inline(found));
    get.add_response("404", Reference::to_response("NotFound").into());

    let mut single = PathItem::new();
    single.get = Some(get);
    doc.add_path("/pets/{petId}", RefOr::inline(single));

    doc
}

#[test]
fn test_pet_store_validates_cleanly() {
    let violations = validate(&pet_store());
    assert!(violations.is_empty(), "unexpected violations: {violations:?}");
}

#[test]
fn test_pet_store_yaml_structure() {
    let doc = pet_store();
    let value = to_value(&doc).unwrap();

    // Top-level keys in declaration order, nothing extra
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(
        keys,
        vec!["openapi", "info", "servers", "paths", "components", "tags"]
    );

    // The self-reference serializes as a component pointer
    assert_eq!(
        value["components"]["schemas"]["Pet"]["properties"]["friends"]["items"]["$ref"],
        "#/components/schemas/Pet"
    );

    // The reference slot carries only pointer fields
    let not_found = &value["paths"]["/pets/{petId}"]["get"]["responses"]["404"];
    assert_eq!(
        not_found,
        &json!({"$ref": "#/components/responses/NotFound"})
    );

    // Path parameters always serialize `required: true`
    let param = &value["paths"]["/pets/{petId}"]["get"]["parameters"][0];
    assert_eq!(param["required"], json!(true));
}

#[test]
fn test_pet_store_round_trip_is_byte_identical() {
    let doc = pet_store();

    let yaml = serialize(&doc, Format::Yaml).unwrap();
    let reparsed = parse::from_yaml(&yaml).unwrap();
    assert_eq!(serialize(&reparsed, Format::Yaml).unwrap(), yaml);

    let json = serialize(&doc, Format::Json).unwrap();
    let reparsed = parse::from_json(&json).unwrap();
    assert_eq!(serialize(&reparsed, Format::Json).unwrap(), json);
}

#[test]
fn test_yaml_and_json_encode_the_same_tree() {
    let doc = pet_store();
    let from_yaml: serde_json::Value =
        serde_yaml::from_slice(&serialize(&doc, Format::Yaml).unwrap()).unwrap();
    let from_json: serde_json::Value =
        serde_json::from_slice(&serialize(&doc, Format::Json).unwrap()).unwrap();
    assert_eq!(from_yaml, from_json);
}

#[test]
fn test_minimal_document_serializes_exactly() {
    let doc = Document::new(Info::new("Pet Store", "1.0.0"));
    assert_eq!(
        doc.to_yaml().unwrap(),
        "openapi: 3.1.0\ninfo:\n  title: Pet Store\n  version: 1.0.0\n"
    );
}

#[test]
fn test_serialization_refuses_invalid_document() {
    let mut doc = pet_store();
    // Break the server binding: template variable with no entry
    doc.servers[0].variables.clear();

    let err = serialize(&doc, Format::Yaml).unwrap_err();
    let violations = err.violations().expect("expected validation failure");
    assert!(violations
        .iter()
        .any(|v| v.kind == ViolationKind::MissingRequiredField && v.message.contains("{env}")));

    // Best-effort output is still available on request
    let bytes = serialize_unchecked(&doc, Format::Yaml).unwrap();
    assert!(!bytes.is_empty());
}

#[test]
fn test_validation_collects_multiple_violations() {
    let mut doc = pet_store();
    doc.info.version = String::new();
    doc.servers[0].variables.clear();
    doc.security.push(SecurityRequirement::scheme("ghost", vec![]));

    let violations = validate(&doc);
    let kinds: Vec<ViolationKind> = violations.iter().map(|v| v.kind).collect();
    assert!(kinds.contains(&ViolationKind::MissingRequiredField));
    assert!(kinds.contains(&ViolationKind::DanglingReference));
    assert!(violations.len() >= 3);
}

#[test]
fn test_webhooks_serialize_under_their_own_key() {
    let mut doc = Document::new(Info::new("Hooks", "1.0.0"));
    let mut operation = Operation::new();
    operation.add_response("200", RefOr::inline(Response::new("received")));
    let mut item = PathItem::new();
    item.post = Some(operation);
    doc.webhooks.insert("petAdopted".to_string(), RefOr::inline(item));

    let value = to_value(&doc).unwrap();
    assert!(value.get("paths").is_none());
    assert_eq!(
        value["webhooks"]["petAdopted"]["post"]["responses"]["200"]["description"],
        "received"
    );
}

#[test]
fn test_security_schemes_and_requirements() {
    let mut doc = Document::new(Info::new("Secured", "1.0.0"));
    doc.components_mut().security_schemes.insert(
        "petstore_auth".to_string(),
        RefOr::inline(SecurityScheme {
            scheme_type: "oauth2".to_string(),
            flows: Some(OAuthFlows {
                implicit: Some(OAuthFlow {
                    authorization_url: "https://example.com/oauth".to_string(),
                    scopes: [("read:pets".to_string(), "read pets".to_string())]
                        .into_iter()
                        .collect(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
    );
    doc.security.push(SecurityRequirement::scheme(
        "petstore_auth",
        vec!["read:pets".to_string()],
    ));

    assert!(validate(&doc).is_empty());
    let value = to_value(&doc).unwrap();
    assert_eq!(
        value["components"]["securitySchemes"]["petstore_auth"]["flows"]["implicit"]["scopes"]
            ["read:pets"],
        "read pets"
    );
    assert_eq!(value["security"][0]["petstore_auth"][0], "read:pets");
}

#[test]
fn test_callbacks_round_trip() {
    let mut doc = Document::new(Info::new("Callbacks", "1.0.0"));

    let mut hook_op = Operation::new();
    hook_op.add_response("200", RefOr::inline(Response::new("acknowledged")));
    let mut hook_item = PathItem::new();
    hook_item.post = Some(hook_op);
    let mut callback = Callback::new();
    callback.insert(
        "{$request.body#/callbackUrl}".to_string(),
        RefOr::inline(hook_item),
    );

    let mut operation = Operation::new();
    operation.add_response("202", RefOr::inline(Response::new("accepted")));
    operation
        .callbacks
        .insert("onData".to_string(), RefOr::inline(callback));
    let mut item = PathItem::new();
    item.post = Some(operation);
    doc.add_path("/subscribe", RefOr::inline(item));

    assert!(validate(&doc).is_empty());
    let yaml = serialize(&doc, Format::Yaml).unwrap();
    let reparsed = parse::from_yaml(&yaml).unwrap();
    assert_eq!(serialize(&reparsed, Format::Yaml).unwrap(), yaml);
}
