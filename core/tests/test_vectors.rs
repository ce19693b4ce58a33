//! Verify operations against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes the expected request, then a list of response
//! bodies with either the expected decoded result or the expected decode
//! error. Bodies are stored as JSON values and re-serialized, so the files
//! stay readable.

use dessert_core::{
    ApiConfig, DecodeError, DessertDetail, GetDessertDetail, GetDesserts, HttpMethod, Ingredient,
    Operation,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn config() -> ApiConfig {
    ApiConfig::new(BASE_URL).unwrap()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        other => panic!("unknown method: {other}"),
    }
}

fn body_bytes(case: &Value) -> Vec<u8> {
    match case.get("raw_body") {
        Some(raw) => raw.as_str().unwrap().as_bytes().to_vec(),
        None => serde_json::to_vec(&case["body"]).unwrap(),
    }
}

fn assert_decode_error(name: &str, err: DecodeError, expected: &str) {
    match expected {
        "Empty" => assert!(matches!(err, DecodeError::Empty), "{name}: expected Empty, got {err:?}"),
        "Malformed" => assert!(
            matches!(err, DecodeError::Malformed(_)),
            "{name}: expected Malformed, got {err:?}"
        ),
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

fn assert_request(op: &impl Operation, expected: &Value) {
    let req = op.request(&config());
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()));
    assert_eq!(
        req.url.as_str(),
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap())
    );
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/list.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    assert_request(&GetDesserts, &vectors["expected_request"]);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = GetDesserts.decode(&body_bytes(case));

        if let Some(expected_error) = case.get("expected_error") {
            assert_decode_error(name, result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let desserts = result.unwrap();
            let ids: Vec<&str> = desserts.iter().map(|d| d.id()).collect();
            let expected: Vec<&str> = case["expected_ids"]
                .as_array()
                .unwrap()
                .iter()
                .map(|id| id.as_str().unwrap())
                .collect();
            assert_eq!(ids, expected, "{name}: ids");
        }
    }
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

fn expected_detail(value: &Value) -> DessertDetail {
    DessertDetail {
        id: value["id"].as_str().unwrap().to_string(),
        name: value["name"].as_str().unwrap().to_string(),
        thumbnail_url: value["thumbnail_url"].as_str().unwrap().to_string(),
        ingredients: value["ingredients"]
            .as_array()
            .unwrap()
            .iter()
            .map(|pair| Ingredient::new(pair[0].as_str().unwrap(), pair[1].as_str().unwrap()))
            .collect(),
        steps: value["steps"]
            .as_array()
            .unwrap()
            .iter()
            .map(|step| step.as_str().unwrap().to_string())
            .collect(),
    }
}

#[test]
fn detail_test_vectors() {
    let raw = include_str!("../../test-vectors/detail.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let op = GetDessertDetail::new("53049");
    assert_request(&op, &vectors["expected_request"]);

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let result = op.decode(&body_bytes(case));

        if let Some(expected_error) = case.get("expected_error") {
            assert_decode_error(name, result.unwrap_err(), expected_error.as_str().unwrap());
        } else {
            let detail = result.unwrap();
            assert_eq!(detail, expected_detail(&case["expected_result"]), "{name}: parsed result");
        }
    }
}
