// Verify the encoded task payload matches what other fleet members (and
// already-persisted tasks) expect. These tests pin the wire format.

use std::collections::HashMap;

use serde_json::json;
use tickwheel_redis::CallbackTask;

fn round_trip(task: &CallbackTask) -> CallbackTask {
    let encoded = serde_json::to_string(task).unwrap();
    serde_json::from_str(&encoded).unwrap()
}

#[test]
fn field_names_are_exact() {
    let task = CallbackTask {
        key: "k1".to_string(),
        callback_url: "https://svc.local/hook".to_string(),
        method: "POST".to_string(),
        req: Some(json!({"order_id": 42})),
        header: Some(HashMap::from([(
            "Authorization".to_string(),
            "Bearer t".to_string(),
        )])),
    };
    let encoded = serde_json::to_string(&task).unwrap();

    assert!(encoded.contains(r#""key":"k1""#));
    assert!(encoded.contains(r#""callback_url":"https://svc.local/hook""#));
    assert!(encoded.contains(r#""method":"POST""#));
    assert!(encoded.contains(r#""req":{"order_id":42}"#));
    assert!(encoded.contains(r#""header":{"Authorization":"Bearer t"}"#));
}

#[test]
fn post_with_json_body_round_trips() {
    let task = CallbackTask {
        key: "order-42".to_string(),
        callback_url: "https://svc.local/hook".to_string(),
        method: "POST".to_string(),
        req: Some(json!({"order_id": 42, "items": ["a", "b"], "amount": 9.5})),
        header: Some(HashMap::from([
            ("Authorization".to_string(), "Bearer t".to_string()),
            ("X-Trace".to_string(), "abc".to_string()),
        ])),
    };
    assert_eq!(round_trip(&task), task);
}

#[test]
fn get_without_body_or_headers_round_trips() {
    let task = CallbackTask {
        key: "ping".to_string(),
        callback_url: "http://svc.local/ping".to_string(),
        method: "GET".to_string(),
        req: None,
        header: None,
    };
    assert_eq!(round_trip(&task), task);
}

#[test]
fn payload_decoded_from_foreign_writer() {
    // As produced by the original encoder: all five fields, nulls for
    // absent options.
    let raw = r#"{"key":"x","callback_url":"http://h/cb","method":"GET","req":null,"header":null}"#;
    let task: CallbackTask = serde_json::from_str(raw).unwrap();

    assert_eq!(task.key, "x");
    assert_eq!(task.callback_url, "http://h/cb");
    assert_eq!(task.method, "GET");
    assert!(task.req.is_none());
    assert!(task.header.is_none());
}

#[test]
fn deeply_nested_body_is_forwarded_verbatim() {
    let body = json!({"a": {"b": [{"c": null}, 2, "three"]}, "unicode": "héllo"});
    let task = CallbackTask {
        key: "n".to_string(),
        callback_url: "https://h/cb".to_string(),
        method: "POST".to_string(),
        req: Some(body.clone()),
        header: None,
    };
    assert_eq!(round_trip(&task).req, Some(body));
}
