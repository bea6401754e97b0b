//! Stateless HTTP request builder and response parser for the student API.
//!
//! # Design
//! `StudentClient` holds only the injected `base_url`. Each operation is a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes the matching `HttpResponse`. The host executes the round
//! trip in between, so the client never blocks and never owns a socket.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, QueryString};
use crate::types::{ListQuery, PageRequest, PageResponse, Student, StudentInput, StudentQuery};

/// Synchronous, stateless client for the student API.
#[derive(Debug, Clone)]
pub struct StudentClient {
    base_url: String,
}

impl StudentClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn students_url(&self) -> String {
        format!("{}/students", self.base_url)
    }

    fn student_url(&self, id: i64) -> String {
        format!("{}/students/{id}", self.base_url)
    }

    fn get(&self, url: String, query: QueryString) -> HttpRequest {
        let request = HttpRequest::new(HttpMethod::Get, query.append_to(url));
        debug!(url = %request.url, "built GET request");
        request
    }

    fn with_body<T: Serialize>(
        &self,
        method: HttpMethod,
        url: String,
        body: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        debug!(%method, %url, "built request with JSON body");
        Ok(HttpRequest::new(method, url).with_json_body(body))
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    pub fn build_list_students(&self, query: &ListQuery) -> HttpRequest {
        let params = QueryString::new()
            .push("page", query.page.page)
            .push("size", query.page.size)
            .push("sort", &query.sort)
            .push("order", query.order.as_str());
        self.get(self.students_url(), params)
    }

    pub fn build_get_student(&self, id: i64) -> HttpRequest {
        self.get(self.student_url(id), QueryString::new())
    }

    pub fn build_create_student(&self, input: &StudentInput) -> Result<HttpRequest, ApiError> {
        self.with_body(HttpMethod::Post, self.students_url(), input)
    }

    pub fn build_update_student(
        &self,
        id: i64,
        input: &StudentInput,
    ) -> Result<HttpRequest, ApiError> {
        self.with_body(HttpMethod::Put, self.student_url(id), input)
    }

    pub fn build_delete_student(&self, id: i64) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.student_url(id))
    }

    /// Search by keyword across name, phone and email. A blank keyword means
    /// "no filter" and builds the default listing instead.
    pub fn build_search_students(&self, keyword: &str, page: PageRequest) -> HttpRequest {
        if keyword.trim().is_empty() {
            return self.build_list_students(&ListQuery {
                page,
                ..ListQuery::default()
            });
        }
        self.build_search("search", "keyword", keyword, page)
    }

    pub fn build_search_students_by_name(&self, name: &str, page: PageRequest) -> HttpRequest {
        self.build_search("search/name", "name", name, page)
    }

    pub fn build_search_students_by_phone(&self, phone: &str, page: PageRequest) -> HttpRequest {
        self.build_search("search/phone", "phone", phone, page)
    }

    fn build_search(
        &self,
        route: &str,
        param: &'static str,
        term: &str,
        page: PageRequest,
    ) -> HttpRequest {
        let params = QueryString::new()
            .push(param, term)
            .push("page", page.page)
            .push("size", page.size);
        self.get(format!("{}/students/{route}", self.base_url), params)
    }

    /// Build the page request for whatever collection `query` names.
    pub fn build_query(&self, query: &StudentQuery, page: PageRequest) -> HttpRequest {
        match query {
            StudentQuery::All => self.build_list_students(&ListQuery {
                page,
                ..ListQuery::default()
            }),
            StudentQuery::Keyword(k) => self.build_search_students(k, page),
            StudentQuery::Name(n) => self.build_search_students_by_name(n, page),
            StudentQuery::Phone(p) => self.build_search_students_by_phone(p, page),
        }
    }

    // -----------------------------------------------------------------------
    // Parse
    // -----------------------------------------------------------------------

    /// Parse any page envelope: list and all search variants share it.
    pub fn parse_page(&self, response: HttpResponse) -> Result<PageResponse<Student>, ApiError> {
        check_status(&response, &[200])?;
        parse_json(&response)
    }

    pub fn parse_list_students(
        &self,
        response: HttpResponse,
    ) -> Result<PageResponse<Student>, ApiError> {
        self.parse_page(response)
    }

    pub fn parse_search_students(
        &self,
        response: HttpResponse,
    ) -> Result<PageResponse<Student>, ApiError> {
        self.parse_page(response)
    }

    pub fn parse_get_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        check_status(&response, &[200])?;
        parse_json(&response)
    }

    pub fn parse_create_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        check_status(&response, &[201, 200])?;
        parse_json(&response)
    }

    pub fn parse_update_student(&self, response: HttpResponse) -> Result<Student, ApiError> {
        check_status(&response, &[200])?;
        parse_json(&response)
    }

    pub fn parse_delete_student(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[204, 200])
    }
}

/// Map a status outside `expected` to the matching `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::from_response(response))
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, SortOrder};

    fn client() -> StudentClient {
        StudentClient::new("http://localhost:8080/api")
    }

    fn record(id: i64, name: &str) -> String {
        format!(
            r#"{{"id":{id},"name":"{name}","gender":"男","phone":"1234567890","age":20,"major":"计算机","isDelete":0,"creator":1}}"#
        )
    }

    #[test]
    fn build_list_students_uses_defaults() {
        let req = client().build_list_students(&ListQuery::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.url,
            "http://localhost:8080/api/students?page=0&size=10&sort=id&order=asc"
        );
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_list_students_custom_sort() {
        let query = ListQuery {
            page: PageRequest::new(2, 5),
            sort: "name".to_string(),
            order: SortOrder::Desc,
        };
        let req = client().build_list_students(&query);
        assert_eq!(
            req.url,
            "http://localhost:8080/api/students?page=2&size=5&sort=name&order=desc"
        );
    }

    #[test]
    fn build_get_student_produces_correct_request() {
        let req = client().build_get_student(42);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/api/students/42");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_student_sends_full_record() {
        let input = StudentInput {
            name: "张三".to_string(),
            phone: "1234567890".to_string(),
            age: 20,
            ..StudentInput::default()
        };
        let req = client().build_create_student(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8080/api/students");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "张三");
        assert_eq!(body["gender"], "男");
        assert_eq!(body["age"], 20);
        assert!(body.get("id").is_none());
    }

    #[test]
    fn build_update_student_targets_id() {
        let input = StudentInput {
            name: "李四".to_string(),
            gender: Gender::Female,
            ..StudentInput::default()
        };
        let req = client().build_update_student(9, &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:8080/api/students/9");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["gender"], "女");
    }

    #[test]
    fn build_delete_student_produces_correct_request() {
        let req = client().build_delete_student(3);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:8080/api/students/3");
        assert!(req.body.is_none());
    }

    #[test]
    fn search_keyword_is_percent_encoded() {
        let req = client().build_search_students("张三 a&b", PageRequest::default());
        assert_eq!(
            req.url,
            "http://localhost:8080/api/students/search?keyword=%E5%BC%A0%E4%B8%89%20a%26b&page=0&size=10"
        );
    }

    #[test]
    fn blank_keyword_builds_unfiltered_list() {
        let page = PageRequest::new(1, 10);
        let search = client().build_search_students("   ", page);
        let list = client().build_list_students(&ListQuery {
            page,
            ..ListQuery::default()
        });
        assert_eq!(search, list);
    }

    #[test]
    fn field_scoped_searches() {
        let req = client().build_search_students_by_name("王", PageRequest::new(0, 20));
        assert_eq!(
            req.url,
            "http://localhost:8080/api/students/search/name?name=%E7%8E%8B&page=0&size=20"
        );
        let req = client().build_search_students_by_phone("+86 138", PageRequest::default());
        assert_eq!(
            req.url,
            "http://localhost:8080/api/students/search/phone?phone=%2B86%20138&page=0&size=10"
        );
    }

    #[test]
    fn build_query_dispatches() {
        let c = client();
        let page = PageRequest::default();
        assert_eq!(
            c.build_query(&StudentQuery::Phone("1".to_string()), page),
            c.build_search_students_by_phone("1", page)
        );
        assert_eq!(
            c.build_query(&StudentQuery::All, page),
            c.build_list_students(&ListQuery::default())
        );
    }

    #[test]
    fn parse_list_students_success() {
        let body = format!(
            r#"{{"students":[{}],"currentPage":0,"totalItems":1,"totalPages":1}}"#,
            record(1, "张三")
        );
        let page = client()
            .parse_list_students(HttpResponse::new(200, body))
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "张三");
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn parse_get_student_not_found() {
        let err = client()
            .parse_get_student(HttpResponse::new(404, ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_create_student_success() {
        let student = client()
            .parse_create_student(HttpResponse::new(201, record(5, "新")))
            .unwrap();
        assert_eq!(student.id, 5);
        assert_eq!(student.creator, Some(1));
    }

    #[test]
    fn parse_create_student_validation_failure() {
        let err = client()
            .parse_create_student(HttpResponse::new(
                400,
                r#"{"message":"Name is required"}"#,
            ))
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(matches!(err, ApiError::ValidationFailed { .. }));
    }

    #[test]
    fn parse_create_student_server_error() {
        let err = client()
            .parse_create_student(HttpResponse::new(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::ServerError { status: 500, .. }));
    }

    #[test]
    fn parse_update_student_success() {
        let student = client()
            .parse_update_student(HttpResponse::new(200, record(5, "改")))
            .unwrap();
        assert_eq!(student.name, "改");
    }

    #[test]
    fn parse_delete_student_success() {
        assert!(client()
            .parse_delete_student(HttpResponse::new(204, ""))
            .is_ok());
    }

    #[test]
    fn parse_delete_student_not_found() {
        let err = client()
            .parse_delete_student(HttpResponse::new(404, ""))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = StudentClient::new("http://localhost:8080/api/");
        assert_eq!(
            client.build_get_student(1).url,
            "http://localhost:8080/api/students/1"
        );
    }

    #[test]
    fn parse_page_bad_json() {
        let err = client()
            .parse_page(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn parse_page_rejects_renamed_envelope() {
        let err = client()
            .parse_page(HttpResponse::new(
                200,
                r#"{"items":[],"currentPage":0,"totalItems":0,"totalPages":0}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
