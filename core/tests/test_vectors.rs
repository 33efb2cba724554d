//! Verify request building and reply handling against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each operation vector describes inputs, the expected request, a simulated
//! reply, and the expected result or error. Comparing parsed JSON (not raw
//! strings) avoids false negatives from formatting differences.

use std::cell::RefCell;
use std::rc::Rc;

use pushwoosh_core::{
    build_notification, Content, Error, HttpRequest, HttpResponse, PushwooshClient, TransportError,
    ZoneSpec,
};
use serde_json::{Map, Value};

const BASE_URL: &str = "https://cp.pushwoosh.com/json/1.3";

fn object(value: &Value) -> Option<Map<String, Value>> {
    value.as_object().cloned()
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[test]
fn notification_test_vectors() {
    let raw = include_str!("../../test-vectors/notifications.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let content: Content = serde_json::from_value(case["content"].clone()).unwrap();
        let filters = object(&case["filters"]);
        let params = object(&case["params"]);

        let notification = build_notification(&content, filters.as_ref(), params.as_ref());
        let actual = serde_json::to_value(&notification).unwrap();
        assert_eq!(actual, case["expected"], "{name}");
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Run one operation against a canned reply; return the request that went
/// out and the operation's outcome rendered as JSON.
fn run_case(case: &Value, credentials: &Value) -> (HttpRequest, Result<Value, Error>) {
    let sim = &case["simulated_response"];
    let reply = HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    };

    let seen: Rc<RefCell<Option<HttpRequest>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let transport = move |request: HttpRequest| {
        *sink.borrow_mut() = Some(request);
        Ok::<_, TransportError>(reply.clone())
    };
    let client = PushwooshClient::with_transport(
        credentials["auth"].as_str().unwrap(),
        credentials["application"].as_str().unwrap(),
        transport,
    );

    let input = &case["input"];
    let outcome = match case["operation"].as_str().unwrap() {
        "create_message" => {
            let content: Content = serde_json::from_value(input["content"].clone()).unwrap();
            let params = object(&input["params"]);
            let filters = object(&input["filters"]);
            client
                .create_message(&content, params.as_ref(), filters.as_ref())
                .map(|codes| serde_json::to_value(codes).unwrap())
        }
        "get_clusters" => client
            .get_clusters()
            .map(|clusters| serde_json::to_value(clusters).unwrap()),
        "create_cluster" => client
            .create_cluster(
                input["name"].as_str().unwrap(),
                input["cooldown"].as_u64().unwrap(),
            )
            .map(Value::String),
        "delete_cluster" => client
            .delete_cluster(input["cluster_id"].as_str().unwrap())
            .map(|()| Value::Null),
        "get_zones" => client
            .get_zones()
            .map(|groups| serde_json::to_value(groups).unwrap()),
        "create_zones" => {
            let zones: Vec<ZoneSpec> = serde_json::from_value(input["zones"].clone()).unwrap();
            client
                .create_zones(zones)
                .map(|ids| serde_json::to_value(ids).unwrap())
        }
        "delete_zones" => {
            let ids: Vec<i64> = serde_json::from_value(input["zone_ids"].clone()).unwrap();
            client.delete_zones(&ids).map(|()| Value::Null)
        }
        other => panic!("unknown operation: {other}"),
    };

    let request = seen.borrow_mut().take().expect("no request was sent");
    (request, outcome)
}

fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::Request(_) => "Request",
        Error::Transport(_) => "Transport",
        Error::Serialization(_) => "Serialization",
        Error::Deserialization(_) => "Deserialization",
        Error::MissingField(_) => "MissingField",
        Error::Config(_) => "Config",
    }
}

#[test]
fn operation_test_vectors() {
    let raw = include_str!("../../test-vectors/operations.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let credentials = &vectors["credentials"];

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        let (request, outcome) = run_case(case, credentials);

        // Verify the request
        assert_eq!(
            request.url,
            format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()),
            "{name}: url"
        );
        let body: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body, expected_req["body"], "{name}: body");

        // Verify the outcome
        if let Some(expected_error) = case.get("expected_error") {
            let err = outcome.expect_err(name);
            assert_eq!(error_kind(&err), expected_error["kind"].as_str().unwrap(), "{name}: kind");
            if let Some(message) = expected_error.get("message").and_then(Value::as_str) {
                let Error::Request(request_error) = &err else {
                    panic!("{name}: expected request error, got {err:?}");
                };
                assert_eq!(request_error.to_string(), message, "{name}: message");
            }
        } else {
            let result = outcome.unwrap_or_else(|e| panic!("{name}: {e}"));
            assert_eq!(result, case["expected_result"], "{name}: parsed result");
        }
    }
}
