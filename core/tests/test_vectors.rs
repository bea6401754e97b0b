//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or error kinds. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use student_core::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, ListQuery, PageRequest, PageResponse,
    SortOrder, Student, StudentClient, StudentInput,
};

const BASE_URL: &str = "http://localhost:8080/api";

fn client() -> StudentClient {
    StudentClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap()
}

/// Compare method, URL, headers and (JSON) body against `expected_request`.
fn check_request(name: &str, req: &HttpRequest, expected: &serde_json::Value) {
    assert_eq!(
        req.method,
        parse_method(expected["method"].as_str().unwrap()),
        "{name}: method"
    );
    assert_eq!(
        req.url,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: url"
    );

    let expected_headers: Vec<(String, String)> = expected
        .get("headers")
        .and_then(|h| h.as_array())
        .map(|headers| {
            headers
                .iter()
                .map(|h| {
                    let arr = h.as_array().unwrap();
                    (
                        arr[0].as_str().unwrap().to_string(),
                        arr[1].as_str().unwrap().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let actual: serde_json::Value =
                serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&actual, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &serde_json::Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn check_error(name: &str, err: &ApiError, expected: &str) {
    let matched = match expected {
        "NotFound" => matches!(err, ApiError::NotFound),
        "ValidationFailed" => matches!(err, ApiError::ValidationFailed { .. }),
        "ServerError" => matches!(err, ApiError::ServerError { .. }),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {expected}, got {err:?}");
}

/// Either compare the parsed value with `expected_result` or the error with
/// `expected_error`.
fn check_result<T>(name: &str, case: &serde_json::Value, result: Result<T, ApiError>)
where
    T: serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    if let Some(expected_error) = case.get("expected_error") {
        check_error(name, &result.unwrap_err(), expected_error.as_str().unwrap());
    } else {
        let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/list.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let query = ListQuery {
            page: PageRequest::new(
                input["page"].as_u64().unwrap() as u32,
                input["size"].as_u64().unwrap() as u32,
            ),
            sort: input["sort"].as_str().unwrap().to_string(),
            order: input["order"].as_str().unwrap().parse::<SortOrder>().unwrap(),
        };

        check_request(name, &c.build_list_students(&query), &case["expected_request"]);
        check_result::<PageResponse<Student>>(name, case, c.parse_list_students(simulated(case)));
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn search_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/search.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let term = case["term"].as_str().unwrap();
        let page = PageRequest::new(
            case["page"].as_u64().unwrap() as u32,
            case["size"].as_u64().unwrap() as u32,
        );
        let req = match case["scope"].as_str().unwrap() {
            "keyword" => c.build_search_students(term, page),
            "name" => c.build_search_students_by_name(term, page),
            "phone" => c.build_search_students_by_phone(term, page),
            other => panic!("{name}: unknown scope {other}"),
        };

        check_request(name, &req, &case["expected_request"]);
        check_result::<PageResponse<Student>>(name, case, c.parse_search_students(simulated(case)));
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

#[test]
fn get_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/get.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();

        check_request(name, &c.build_get_student(id), &case["expected_request"]);
        check_result::<Student>(name, case, c.parse_get_student(simulated(case)));
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/create.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: StudentInput = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_create_student(&input).unwrap();
        check_request(name, &req, &case["expected_request"]);
        check_result::<Student>(name, case, c.parse_create_student(simulated(case)));
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/update.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();
        let input: StudentInput = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_update_student(id, &input).unwrap();
        check_request(name, &req, &case["expected_request"]);
        check_result::<Student>(name, case, c.parse_update_student(simulated(case)));
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/delete.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_i64().unwrap();

        check_request(name, &c.build_delete_student(id), &case["expected_request"]);
        let result = c.parse_delete_student(simulated(case));
        match case.get("expected_error") {
            Some(expected) => check_error(name, &result.unwrap_err(), expected.as_str().unwrap()),
            None => assert!(result.is_ok(), "{name}: expected success"),
        }
    }
}
