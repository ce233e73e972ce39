//! End-to-end adapter flow against a scripted transport:
//! schema discovery, merged field listing, a composite-value create, and a
//! filtered list, all over one cached schema snapshot.

use crmlink::{
    AdapterError, ConnectionConfig, EndpointKind, FieldIntent, FieldKind, MockTransport,
    OperationExecutor,
};
use serde_json::{json, Map, Value};

const PERSON_ID: &str = "7b1c0a52-9d4e-4d35-b43e-0a4a6f6f9f01";

fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        domain: "crm.example.com".to_string(),
        api_key: "test-key".to_string(),
        ..Default::default()
    }
}

fn field_node(name: &str, kind: &str) -> Value {
    json!({"node": {
        "name": name,
        "label": name,
        "type": kind,
        "isNullable": true,
        "isActive": true,
        "isSystem": false,
        "isUIReadOnly": false
    }})
}

fn metadata_response() -> Value {
    json!({"data": {"objects": {"edges": [
        {"node": {
            "nameSingular": "person",
            "namePlural": "people",
            "labelSingular": "Person",
            "labelPlural": "People",
            "isCustom": false,
            "isSystem": false,
            "isActive": true,
            "fields": {"edges": [
                field_node("id", "UUID"),
                field_node("name", "FULL_NAME"),
                field_node("email", "TEXT"),
                field_node("salary", "CURRENCY")
            ]}
        }}
    ]}}})
}

fn as_map(value: Value) -> Map<String, Value> {
    value.as_object().unwrap().clone()
}

#[tokio::test]
async fn create_then_search_person_over_discovered_schema() {
    let _ = env_logger::builder().is_test(true).try_init();

    let transport = MockTransport::new();
    transport.push_response(Ok(metadata_response()));
    // Introspection for the merged field list.
    transport.push_response(Ok(json!({"data": {"__type": {"fields": [
        {"name": "visibility", "type": {"name": "VisibilityEnum", "kind": "ENUM"}}
    ]}}})));
    // Create, then the filtered list.
    transport.push_response(Ok(json!({"data": {"createPerson": {
        "id": PERSON_ID,
        "name": {"firstName": "John", "lastName": "Doe"},
        "email": "j@x.com",
        "salary": {"amountMicros": "5000000", "currencyCode": "USD"}
    }}})));
    transport.push_response(Ok(json!({"data": {"people": {"edges": [
        {"node": {"id": PERSON_ID, "name": {"firstName": "John", "lastName": "Doe"}}}
    ]}}})));

    let executor = OperationExecutor::new(transport, test_config());

    // Field-selection view: merged, presentation-ordered, name first.
    let fields = executor
        .get_object_schema("person", FieldIntent::Write, false)
        .await
        .expect("merged schema");
    assert_eq!(fields[0].name, "name");
    assert_eq!(fields[0].kind, FieldKind::FullName);
    assert!(fields.iter().any(|f| f.name == "visibility"));

    // Create from a flat map; composites nest and the currency amount is
    // scaled to micros on the way out.
    let flat = as_map(json!({
        "name_firstName": "John",
        "name_lastName": "Doe",
        "email": "j@x.com",
        "salary_amountMicros": 5,
        "salary_currencyCode": "USD"
    }));
    let record = executor
        .create_record("person", &flat)
        .await
        .expect("create");
    assert_eq!(record["id"], json!(PERSON_ID));

    let people = executor
        .list_records("person", 10, Some("doe"))
        .await
        .expect("list");
    assert_eq!(people.len(), 1);

    let requests = executor.transport().requests();
    // One metadata fetch fed the merge, the create and the list.
    let metadata_calls = requests
        .iter()
        .filter(|r| r.kind == EndpointKind::Metadata)
        .count();
    assert_eq!(metadata_calls, 1);

    let create = &requests[2];
    assert!(create.path_or_query.contains("mutation CreatePerson("));
    assert!(create.path_or_query.contains("$data: personCreateInput!"));
    let data = &create.variables.as_ref().unwrap()["data"];
    assert_eq!(data["name"], json!({"firstName": "John", "lastName": "Doe"}));
    assert_eq!(data["salary"]["amountMicros"], json!(5_000_000));

    let list = &requests[3];
    assert!(list.path_or_query.contains("firstName: { ilike: $search }"));
    assert!(list.path_or_query.contains("lastName: { ilike: $search }"));
    assert_eq!(list.variables.as_ref().unwrap()["search"], json!("%doe%"));
}

#[tokio::test]
async fn transport_failures_surface_as_taxonomy_errors() {
    let transport = MockTransport::new();
    transport.push_response(Err(AdapterError::Authentication(
        "token expired".to_string(),
    )));

    let executor = OperationExecutor::new(transport, test_config());
    let result = executor.list_records("person", 10, None).await;
    match result {
        Err(AdapterError::Authentication(message)) => {
            assert!(message.contains("token expired"));
        }
        other => panic!("expected an authentication error, got {:?}", other),
    }
}
