use serde::Deserialize;
use serde_json::json;
use xero_query_core::contract::{MockApplication, MockTransport};
use xero_query_core::{
    Collection, FieldMap, Model, ModelDescriptor, ModelRegistry, Query, QueryError, Record,
    Request, Response, TransportError,
};

fn element(value: serde_json::Value) -> FieldMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("element must be an object, got {other}"),
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Contact {
    #[serde(rename = "ContactID")]
    contact_id: String,
    name: String,
}

impl Model for Contact {
    fn from_field_map(descriptor: &ModelDescriptor, fields: FieldMap) -> Result<Self, QueryError> {
        serde_json::from_value(serde_json::Value::Object(fields)).map_err(|e| QueryError::Mapping {
            model: descriptor.name.clone(),
            message: e.to_string(),
        })
    }
}

#[tokio::test]
async fn execute_maps_elements_in_response_order() {
    let app = ModelRegistry::with_accounting_defaults();
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .times(1)
        .withf(|req: &Request| {
            req.resource_uri == "Contacts"
                && req.parameter("where") == Some("Name==\"Acme\"")
                && req.parameter("page") == Some("1")
        })
        .returning(|_| {
            Ok(Response::new(vec![
                element(json!({"ContactID": "b", "Name": "Acme 2"})),
                element(json!({"ContactID": "a", "Name": "Acme 1"})),
            ]))
        });

    let mut query = Query::new(&app, &transport);
    query
        .from("Contact")
        .unwrap()
        .where_equals("Name", "Acme")
        .page(1)
        .unwrap();

    let contacts: Collection<Contact> = query.execute().await.expect("execute should succeed");
    let names: Vec<&str> = contacts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Acme 2", "Acme 1"]);
    assert_eq!(contacts.first().map(|c| c.contact_id.as_str()), Some("b"));
}

#[tokio::test]
async fn empty_response_yields_empty_collection() {
    let app = ModelRegistry::with_accounting_defaults();
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .returning(|_| Ok(Response::default()));

    let mut query = Query::new(&app, &transport);
    query.from("Invoice").unwrap();

    let records: Collection<Record> = query.execute().await.unwrap();
    assert!(records.is_empty());
    assert_eq!(records.len(), 0);
}

#[tokio::test]
async fn fresh_query_sends_no_optional_parameters() {
    let app = ModelRegistry::with_accounting_defaults();
    let mut transport = MockTransport::new();
    transport
        .expect_send()
        .withf(|req: &Request| req.parameters.is_empty() && req.headers.is_empty())
        .returning(|_| Ok(Response::default()));

    let mut query = Query::new(&app, &transport);
    query.from("Accounting\\Account").unwrap();

    let records: Collection<Record> = query.execute().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn records_carry_model_name_and_fields() {
    let app = ModelRegistry::with_accounting_defaults();
    let mut transport = MockTransport::new();
    transport.expect_send().returning(|_| {
        Ok(Response::new(vec![element(
            json!({"InvoiceNumber": "INV-001", "Total": 12.5}),
        )]))
    });

    let mut query = Query::new(&app, &transport);
    query.from("Invoice").unwrap();

    let records: Collection<Record> = query.execute().await.unwrap();
    let invoice = records.first().expect("one record");
    assert_eq!(invoice.model, "Invoice");
    assert_eq!(invoice.get_str("InvoiceNumber"), Some("INV-001"));
    assert_eq!(invoice.get("Total"), Some(&json!(12.5)));
}

#[tokio::test]
async fn transport_errors_propagate_unchanged() {
    let app = ModelRegistry::with_accounting_defaults();
    let mut transport = MockTransport::new();
    transport.expect_send().returning(|_| {
        Err(TransportError::Status {
            url: "https://api.xero.com/api.xro/2.0/Contacts".into(),
            status: 401,
            body: "Unauthorized".into(),
        })
    });

    let mut query = Query::new(&app, &transport);
    query.from("Contact").unwrap();

    let err = query.execute::<Record>().await.err().expect("send fails");
    match err {
        QueryError::Transport(TransportError::Status { status, body, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "Unauthorized");
        }
        other => panic!("expected transport status error, got {other:?}"),
    }
}

#[tokio::test]
async fn mapping_failure_returns_no_partial_collection() {
    let app = ModelRegistry::with_accounting_defaults();
    let mut transport = MockTransport::new();
    transport.expect_send().returning(|_| {
        Ok(Response::new(vec![
            element(json!({"ContactID": "a", "Name": "Good"})),
            element(json!({"Name": "Missing id"})),
        ]))
    });

    let mut query = Query::new(&app, &transport);
    query.from("Contact").unwrap();

    let result = query.execute::<Contact>().await;
    assert!(matches!(result, Err(QueryError::Mapping { ref model, .. }) if model == "Contact"));
}

#[tokio::test]
async fn execute_without_from_sends_nothing() {
    let app = MockApplication::new();
    let transport = MockTransport::new();
    let query = Query::new(&app, &transport);

    assert!(matches!(
        query.execute::<Record>().await,
        Err(QueryError::NoModel)
    ));
}

#[tokio::test]
async fn query_can_be_executed_again_with_accumulated_state() {
    let app = ModelRegistry::with_accounting_defaults();
    let mut transport = MockTransport::new();
    let mut seq = mockall::Sequence::new();
    transport
        .expect_send()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req: &Request| req.parameter("where") == Some("IsCustomer=true"))
        .returning(|_| Ok(Response::default()));
    transport
        .expect_send()
        .times(1)
        .in_sequence(&mut seq)
        .withf(|req: &Request| {
            req.parameter("where") == Some("IsCustomer=true AND IsSupplier=false")
        })
        .returning(|_| Ok(Response::default()));

    let mut query = Query::new(&app, &transport);
    query.from("Contact").unwrap().where_equals("IsCustomer", true);
    query.execute::<Record>().await.unwrap();

    query.where_equals("IsSupplier", false);
    query.execute::<Record>().await.unwrap();
}

#[test]
fn record_deserializes_into_typed_struct() {
    let record = Record::from_field_map(
        &ModelDescriptor::new("Contact", "Contacts", "api.xro/2.0", true),
        element(json!({"ContactID": "c1", "Name": "Acme"})),
    )
    .unwrap();

    let contact: Contact = record.deserialize().unwrap();
    assert_eq!(
        contact,
        Contact {
            contact_id: "c1".into(),
            name: "Acme".into()
        }
    );
}
